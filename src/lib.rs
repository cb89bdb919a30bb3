//! deplag - Requirements lateness inspector library
//!
//! This library provides the core functionality for auditing how outdated
//! the declared dependencies of a pip requirements document are:
//! - classify each requirement line (supported syntax or a rejection kind)
//! - resolve eligible requirements against the PyPI registry
//! - compute the resolved release, the latest release and the "lateness"
//!   (final releases published after the resolved one)
//! - render the results as text, CSV or JSON reports

pub mod cli;
pub mod domain;
pub mod error;
pub mod inspector;
pub mod lateness;
pub mod output;
pub mod parser;
pub mod progress;
pub mod registry;
pub mod version;
