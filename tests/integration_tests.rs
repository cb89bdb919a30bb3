//! Integration tests for deplag
//!
//! These tests drive the library pipeline end to end against a local HTTP
//! double of the two PyPI endpoints:
//! - requirement resolution and lateness over a whole document
//! - response cache warm-up and idempotent re-runs
//! - per-item registry failure continuation

use deplag::domain::RequirementStatus;
use deplag::inspector::Inspector;
use deplag::lateness::parse_timestamp;
use deplag::output::{create_formatter, ReportFormat, ReportOptions};
use deplag::registry::{FileCache, HttpClient, PypiRegistry};
use mockito::ServerGuard;
use tempfile::TempDir;

/// Release history served for the `diskette` fixture package
const DISKETTE_RELEASES: &[(&str, &str)] = &[
    ("0.1.0", "2024-01-01T00:00:00Z"),
    ("0.3.3", "2024-03-01T00:00:00Z"),
    ("0.3.4", "2024-03-10T00:00:00Z"),
    ("0.3.5", "2024-03-20T00:00:00Z"),
    ("0.3.6", "2024-04-01T00:00:00.123456Z"),
];

fn detail_body(name: &str, latest: &str) -> String {
    serde_json::json!({
        "info": {
            "name": name,
            "version": latest,
            "package_url": format!("https://pypi.org/project/{name}/"),
            "project_urls": {"Source": format!("https://github.com/sveetch/{name}")}
        }
    })
    .to_string()
}

fn releases_body(name: &str, releases: &[(&str, &str)]) -> String {
    let files: Vec<serde_json::Value> = releases
        .iter()
        .map(|(version, date)| {
            serde_json::json!({
                "filename": format!("{name}-{version}.tar.gz"),
                "upload-time": date
            })
        })
        .collect();
    serde_json::json!({"files": files}).to_string()
}

async fn mount_diskette(server: &mut ServerGuard) {
    server
        .mock("GET", "/pypi/diskette/json")
        .with_status(200)
        .with_body(detail_body("diskette", "0.3.6"))
        .create_async()
        .await;
    server
        .mock("GET", "/simple/diskette/")
        .with_status(200)
        .with_body(releases_body("diskette", DISKETTE_RELEASES))
        .create_async()
        .await;
}

/// Inspector against the fixture server, without chunk pauses
fn fixture_inspector(server: &ServerGuard) -> Inspector {
    let client = HttpClient::new().unwrap().with_max_retries(0);
    let registry = PypiRegistry::with_base_url(client, server.url());
    Inspector::new(Box::new(registry)).with_batching(None, None)
}

mod document_inspection {
    use super::*;

    #[tokio::test]
    async fn test_resolves_highest_matching_release() {
        let mut server = mockito::Server::new_async().await;
        mount_diskette(&mut server).await;

        let records = fixture_inspector(&server)
            .inspect("diskette>=0.1.0,<0.3.4\n", None, false, None)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.status, RequirementStatus::Analyzed);
        assert_eq!(
            record.resolved_version.as_ref().map(|v| v.to_string()),
            Some("0.3.3".to_string())
        );
        assert_eq!(
            record.highest_version.as_ref().map(|v| v.to_string()),
            Some("0.3.6".to_string())
        );
        assert_eq!(
            record.repository_url.as_deref(),
            Some("https://github.com/sveetch/diskette")
        );

        // The three strictly newer final releases, in ascending order
        let lateness: Vec<&str> = record
            .lateness
            .as_ref()
            .unwrap()
            .iter()
            .map(|(version, _)| version.as_str())
            .collect();
        assert_eq!(lateness, vec!["0.3.4", "0.3.5", "0.3.6"]);
    }

    #[tokio::test]
    async fn test_unmatched_specifier_yields_no_resolution() {
        let mut server = mockito::Server::new_async().await;
        mount_diskette(&mut server).await;

        let records = fixture_inspector(&server)
            .inspect("diskette>=2.0.0\n", None, false, None)
            .await
            .unwrap();

        let record = &records[0];
        assert_eq!(record.status, RequirementStatus::Analyzed);
        assert!(record.resolved_version.is_none());
        assert!(record.lateness.is_none());
    }

    #[tokio::test]
    async fn test_failed_lookup_leaves_record_parsed_and_continues() {
        let mut server = mockito::Server::new_async().await;
        mount_diskette(&mut server).await;
        server
            .mock("GET", "/pypi/absent/json")
            .with_status(404)
            .create_async()
            .await;

        let records = fixture_inspector(&server)
            .inspect("absent\ndiskette\n", None, false, None)
            .await
            .unwrap();

        assert_eq!(records[0].status, RequirementStatus::Parsed);
        assert_eq!(records[1].status, RequirementStatus::Analyzed);
    }
}

mod response_cache {
    use super::*;

    #[tokio::test]
    async fn test_second_run_is_served_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let detail = server
            .mock("GET", "/pypi/diskette/json")
            .with_status(200)
            .with_body(detail_body("diskette", "0.3.6"))
            .expect(1)
            .create_async()
            .await;
        let releases = server
            .mock("GET", "/simple/diskette/")
            .with_status(200)
            .with_body(releases_body("diskette", DISKETTE_RELEASES))
            .expect(1)
            .create_async()
            .await;

        let cachedir = TempDir::new().unwrap();
        let inspector_with_cache = || {
            let client = HttpClient::new().unwrap().with_max_retries(0);
            let registry = PypiRegistry::with_base_url(client, server.url())
                .with_cache(Box::new(FileCache::new(cachedir.path())));
            Inspector::new(Box::new(registry)).with_batching(None, None)
        };

        let first = inspector_with_cache()
            .inspect("diskette>=0.1.0,<0.3.4\n", None, false, None)
            .await
            .unwrap();
        let second = inspector_with_cache()
            .inspect("diskette>=0.1.0,<0.3.4\n", None, false, None)
            .await
            .unwrap();

        // Each endpoint was hit exactly once, the warmed run is identical
        detail.assert_async().await;
        releases.assert_async().await;
        assert_eq!(first, second);
    }
}

mod report_rendering {
    use super::*;

    #[tokio::test]
    async fn test_text_report_from_inspection() {
        let mut server = mockito::Server::new_async().await;
        mount_diskette(&mut server).await;

        let records = fixture_inspector(&server)
            .inspect("diskette>=0.1.0,<0.3.4\nfoo>1,foo<=2\n", None, false, None)
            .await
            .unwrap();

        let formatter = create_formatter(
            ReportFormat::Text,
            ReportOptions {
                with_failures: true,
                now: parse_timestamp("2024-04-11T00:00:00Z").unwrap(),
                color: false,
            },
        );
        let mut buffer = Vec::new();
        formatter.format(&records, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("Analyzed"));
        assert!(output.contains("diskette"));
        assert!(output.contains("0.3.3 - a month ago"));
        assert!(output.contains("0.3.6 - 10 days ago"));
        assert!(output.contains("Failures"));
        assert!(output.contains("foo>1,foo<=2"));
    }
}
