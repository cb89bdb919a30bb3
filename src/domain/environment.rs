//! Marker environment mapping
//!
//! The caller supplies a plain string mapping (usually loaded from a JSON
//! file) of PEP 508 environment variables. Marker evaluation needs a full
//! platform profile, so unsupplied fields default to empty strings and the
//! version-valued fields to "0".

use pep508_rs::{MarkerEnvironment, MarkerEnvironmentBuilder};
use std::collections::HashMap;
use tracing::warn;

/// Environment variables used for marker expression evaluation
pub type Environment = HashMap<String, String>;

/// Build a marker environment from the supplied mapping.
///
/// Returns `None` when the mapping can not be turned into a usable
/// environment, in which case markers are treated as satisfied, the same
/// way an absent environment is.
pub fn marker_environment(environment: &Environment) -> Option<MarkerEnvironment> {
    let lookup = |key: &str| environment.get(key).map(String::as_str);

    let python_version = lookup("python_version").unwrap_or("0");
    let python_full_version = lookup("python_full_version").unwrap_or(python_version);

    let builder = MarkerEnvironmentBuilder {
        implementation_name: lookup("implementation_name").unwrap_or(""),
        implementation_version: lookup("implementation_version").unwrap_or("0"),
        os_name: lookup("os_name").unwrap_or(""),
        platform_machine: lookup("platform_machine").unwrap_or(""),
        platform_python_implementation: lookup("platform_python_implementation").unwrap_or(""),
        platform_release: lookup("platform_release").unwrap_or(""),
        platform_system: lookup("platform_system").unwrap_or(""),
        platform_version: lookup("platform_version").unwrap_or(""),
        python_full_version,
        python_version,
        sys_platform: lookup("sys_platform").unwrap_or(""),
    };

    match MarkerEnvironment::try_from(builder) {
        Ok(marker_env) => Some(marker_env),
        Err(error) => {
            warn!(
                "unusable marker environment, markers are treated as satisfied: {}",
                error
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mapping_builds_an_environment() {
        let environment = Environment::new();
        assert!(marker_environment(&environment).is_some());
    }

    #[test]
    fn test_python_version_is_used() {
        let mut environment = Environment::new();
        environment.insert("python_version".to_string(), "3.11".to_string());
        let marker_env = marker_environment(&environment).unwrap();
        assert_eq!(marker_env.python_version().to_string(), "3.11");
    }

    #[test]
    fn test_full_version_falls_back_to_python_version() {
        let mut environment = Environment::new();
        environment.insert("python_version".to_string(), "3.11".to_string());
        let marker_env = marker_environment(&environment).unwrap();
        assert_eq!(marker_env.python_full_version().to_string(), "3.11");
    }

    #[test]
    fn test_unparseable_version_values_yield_none() {
        let mut environment = Environment::new();
        environment.insert("python_version".to_string(), "not a version".to_string());
        assert!(marker_environment(&environment).is_none());
    }
}
