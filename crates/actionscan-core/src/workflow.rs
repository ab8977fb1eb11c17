use crate::error::Result;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Descriptor of the workflow file under analysis, used for diagnostics.
#[derive(Debug, Clone)]
pub struct WorkflowFile {
    /// Owning repository, `owner/name`.
    pub repository: String,
    /// Path within the repository.
    pub path: String,
    /// File basename.
    pub name: String,
}

/// One confirmed invocation of the target action within a job step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInstance {
    pub job: String,
    pub step_name: String,
    /// The step's `uses:` value, verbatim (including any `@ref` pin).
    pub action_ref: String,
    /// The step's `with:` inputs in document order, scalars rendered to
    /// strings. Empty when the step has no inputs.
    pub inputs: Vec<(String, String)>,
}

// ---------------------------------------------------------------------------
// Document shape
// ---------------------------------------------------------------------------

// Workflow files are only loosely structured: a job may lack `steps`, a
// step may lack `uses`, `name`, or `with`. Every field is optional and
// every access below states its fallback.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkflowDoc {
    jobs: Option<Mapping>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobConfig {
    steps: Option<Vec<StepConfig>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StepConfig {
    name: Option<String>,
    uses: Option<String>,
    with: Option<Mapping>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Extract every invocation of `action` from one workflow file's text.
///
/// Matching is substring containment on the `uses:` value: a target of
/// `org/action` also matches `org/action@v1`, `org/action-extended` and
/// `x/org/action`.
///
/// Parse failures never propagate: a malformed document yields a warning
/// naming the file and an empty list, and the scan moves on.
pub fn analyze_workflow(content: &str, action: &str, file: &WorkflowFile) -> Vec<ActionInstance> {
    // Cheap containment check before handing the text to the YAML parser.
    // Files that never mention the action can't produce instances, and
    // skipping them also skips their parse failures.
    if !content.contains(action) {
        return Vec::new();
    }

    match extract_instances(content, action) {
        Ok(instances) => instances,
        Err(e) => {
            warn!("error parsing workflow {}: {e}", file.path);
            Vec::new()
        }
    }
}

fn extract_instances(content: &str, action: &str) -> Result<Vec<ActionInstance>> {
    // Empty input parses as an absent document.
    let doc: Option<WorkflowDoc> = serde_yaml::from_str(content)?;
    let Some(jobs) = doc.and_then(|d| d.jobs) else {
        return Ok(Vec::new());
    };

    let mut instances = Vec::new();
    for (job_key, job_value) in jobs {
        // YAML permits non-string keys; those can't name a GitHub job.
        let Some(job_name) = job_key.as_str().map(str::to_string) else {
            continue;
        };
        let job: JobConfig = serde_yaml::from_value(job_value)?;
        let Some(steps) = job.steps else {
            continue;
        };

        for (index, step) in steps.into_iter().enumerate() {
            let Some(action_ref) = step.uses else {
                continue;
            };
            if !action_ref.contains(action) {
                continue;
            }
            let step_name = step
                .name
                .unwrap_or_else(|| format!("Step {}", index + 1));
            let inputs = step.with.map(render_inputs).unwrap_or_default();
            instances.push(ActionInstance {
                job: job_name.clone(),
                step_name,
                action_ref,
                inputs,
            });
        }
    }
    Ok(instances)
}

fn render_inputs(with: Mapping) -> Vec<(String, String)> {
    with.into_iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?.to_string();
            Some((key, scalar_to_string(&value)))
        })
        .collect()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
