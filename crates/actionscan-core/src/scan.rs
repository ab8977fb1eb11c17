use crate::client::{CandidateFile, GithubClient};
use crate::error::Result;
use crate::report::{AggregateReport, UsageRecord};
use crate::workflow::{analyze_workflow, ActionInstance, WorkflowFile};
use std::time::Duration;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// ScanOptions
// ---------------------------------------------------------------------------

/// Configuration for one scan run, threaded by value through the
/// pipeline. Only the CLI entry point reads environment or argv.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Organization to scan.
    pub org: String,
    /// Target action identifier, e.g. `tj-actions/changed-files`.
    pub action: String,
    /// Search all workflow files instead of only those mentioning the
    /// action.
    pub broad_search: bool,
    /// Pause after each candidate file; a fixed courtesy delay so the
    /// contents API is not hammered. Not adaptive.
    pub throttle: Duration,
}

impl ScanOptions {
    pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

    pub fn new(org: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            action: action.into(),
            broad_search: false,
            throttle: Self::DEFAULT_THROTTLE,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full scan: one search, then fetch + analyze each candidate
/// sequentially, aggregating confirmed usages by repository.
///
/// A failing candidate (fetch error, malformed document) is logged and
/// skipped; it never aborts the run. A failing search degrades to zero
/// candidates and therefore an empty report.
pub fn run_scan(client: &GithubClient, options: &ScanOptions) -> AggregateReport {
    let candidates =
        client.search_workflow_files(&options.org, &options.action, options.broad_search);
    info!("found {} workflow files to analyze", candidates.len());

    let mut report = AggregateReport::new();
    let total = candidates.len();

    for (i, candidate) in candidates.iter().enumerate() {
        let repository = &candidate.repository.full_name;
        info!("[{}/{}] analyzing {}/{}", i + 1, total, repository, candidate.path);

        match process_candidate(client, &options.action, candidate) {
            Ok(instances) => {
                if !instances.is_empty() {
                    info!("found {} instances of {}", instances.len(), options.action);
                }
                for instance in instances {
                    report.record(
                        repository,
                        UsageRecord {
                            workflow: candidate.name.clone(),
                            path: candidate.path.clone(),
                            instance,
                        },
                    );
                }
            }
            Err(e) => {
                warn!("error processing {}: {e}", candidate.path);
            }
        }

        if !options.throttle.is_zero() {
            std::thread::sleep(options.throttle);
        }
    }

    report
}

fn process_candidate(
    client: &GithubClient,
    action: &str,
    candidate: &CandidateFile,
) -> Result<Vec<ActionInstance>> {
    let content = client.fetch_content(&candidate.url)?;
    let file = WorkflowFile {
        repository: candidate.repository.full_name.clone(),
        path: candidate.path.clone(),
        name: candidate.name.clone(),
    };
    Ok(analyze_workflow(&content, action, &file))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
