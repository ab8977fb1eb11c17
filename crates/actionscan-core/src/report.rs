use crate::workflow::ActionInstance;
use std::collections::BTreeMap;
use std::fmt::Write as _;

// ---------------------------------------------------------------------------
// UsageRecord
// ---------------------------------------------------------------------------

/// An [`ActionInstance`] tied back to the workflow file it was found in.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    /// Workflow file basename, e.g. `ci.yml`.
    pub workflow: String,
    /// Workflow file path within the repository.
    pub path: String,
    pub instance: ActionInstance,
}

// ---------------------------------------------------------------------------
// AggregateReport
// ---------------------------------------------------------------------------

/// Usage records grouped by repository.
///
/// The map is keyed by repository full name; `BTreeMap` iteration gives
/// the report its lexicographic repository order for free, while records
/// inside a repository stay in discovery order.
#[derive(Debug, Default)]
pub struct AggregateReport {
    usage_by_repo: BTreeMap<String, Vec<UsageRecord>>,
    total_usages: usize,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record under its repository, creating the repository's
    /// list on first use.
    pub fn record(&mut self, repository: &str, record: UsageRecord) {
        self.usage_by_repo
            .entry(repository.to_string())
            .or_default()
            .push(record);
        self.total_usages += 1;
    }

    /// Total usage instances across all repositories.
    pub fn total_usages(&self) -> usize {
        self.total_usages
    }

    /// Number of distinct repositories with at least one usage.
    pub fn repository_count(&self) -> usize {
        self.usage_by_repo.len()
    }

    /// Render the plain-text report.
    pub fn render(&self, action: &str, org: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Usage Report for '{action}' in {org}");
        let _ = writeln!(out, "===============================================");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Repositories using this action: {}",
            self.repository_count()
        );
        let _ = writeln!(out, "Total usages found: {}", self.total_usages);
        let _ = writeln!(out);

        if self.usage_by_repo.is_empty() {
            let _ = writeln!(out, "No instances of this action were found.");
            return out;
        }

        let _ = writeln!(out, "Detailed Usage by Repository:");
        let _ = writeln!(out, "============================");
        let _ = writeln!(out);

        for (repository, records) in &self.usage_by_repo {
            let header = format!("Repository: {repository}");
            let _ = writeln!(out, "{header}");
            let _ = writeln!(out, "{}", "-".repeat(header.len()));

            for (i, record) in records.iter().enumerate() {
                let _ = writeln!(out, "Instance #{}:", i + 1);
                let _ = writeln!(out, "  Workflow: {} ({})", record.workflow, record.path);
                let _ = writeln!(out, "  Job: {}", record.instance.job);
                let _ = writeln!(out, "  Step: {}", record.instance.step_name);
                let _ = writeln!(out, "  Action Reference: {}", record.instance.action_ref);

                if !record.instance.inputs.is_empty() {
                    let _ = writeln!(out, "  Configuration:");
                    for (param, value) in &record.instance.inputs {
                        let _ = writeln!(out, "    {param}: {value}");
                    }
                }

                let _ = writeln!(out);
            }

            let _ = writeln!(out);
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
