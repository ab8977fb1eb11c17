use assert_cmd::Command;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mockito::Matcher;
use predicates::prelude::*;
use tempfile::TempDir;

fn actionscan(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("actionscan").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL");
    cmd
}

// ---------------------------------------------------------------------------
// Argument surface
// ---------------------------------------------------------------------------

#[test]
fn missing_token_fails_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    actionscan(&dir)
        .arg("acme")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("GitHub token is required"));
}

#[test]
fn missing_org_fails() {
    let dir = TempDir::new().unwrap();
    actionscan(&dir).assert().failure();
}

#[test]
fn help_lists_options() {
    let dir = TempDir::new().unwrap();
    actionscan(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--action"))
        .stdout(predicate::str::contains("--token"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--broad-search"));
}

#[test]
fn token_can_come_from_environment() {
    // Token present but the API host is unreachable: the search degrades
    // to zero candidates, so the run still completes with a report.
    let dir = TempDir::new().unwrap();
    actionscan(&dir)
        .arg("acme")
        .env("GITHUB_TOKEN", "t")
        .env("GITHUB_API_URL", "http://127.0.0.1:9")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Found 0 instances of tj-actions/changed-files across 0 repositories",
        ));

    let report =
        std::fs::read_to_string(dir.path().join("action_usage_report.txt")).unwrap();
    assert!(report.contains("No instances of this action were found."));
}

// ---------------------------------------------------------------------------
// Full scan against a mock API
// ---------------------------------------------------------------------------

#[test]
fn full_scan_writes_report() {
    let mut server = mockito::Server::new();

    let workflow = "\
jobs:
  build:
    steps:
      - name: Checkout
        uses: actions/checkout@v3
        with:
          fetch-depth: 0
";
    let content_url = format!("{}/contents/acme/widget/ci.yml", server.url());
    server
        .mock("GET", "/search/code")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("per_page".into(), "100".into()),
            Matcher::UrlEncoded(
                "q".into(),
                "org:acme path:.github/workflows/ actions/checkout".into(),
            ),
        ]))
        .match_header("authorization", "token secret")
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "total_count": 1,
                "items": [{
                    "name": "ci.yml",
                    "path": ".github/workflows/ci.yml",
                    "url": content_url,
                    "repository": { "full_name": "acme/widget" }
                }]
            })
            .to_string(),
        )
        .create();
    server
        .mock("GET", "/contents/acme/widget/ci.yml")
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "content": STANDARD.encode(workflow),
                "encoding": "base64",
            })
            .to_string(),
        )
        .create();

    let dir = TempDir::new().unwrap();
    actionscan(&dir)
        .args(["acme", "--action", "actions/checkout", "--output", "report.txt"])
        .args(["--token", "secret", "--api-url", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Found 1 instances of actions/checkout across 1 repositories",
        ));

    let report = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(report.starts_with("Usage Report for 'actions/checkout' in acme\n"));
    assert!(report.contains("Repositories using this action: 1"));
    assert!(report.contains("Total usages found: 1"));
    assert!(report.contains("Repository: acme/widget"));
    assert!(report.contains("  Workflow: ci.yml (.github/workflows/ci.yml)"));
    assert!(report.contains("  Job: build"));
    assert!(report.contains("  Step: Checkout"));
    assert!(report.contains("  Action Reference: actions/checkout@v3"));
    assert!(report.contains("  Configuration:\n    fetch-depth: 0"));
}

#[test]
fn broad_search_changes_the_query() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/search/code")
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            "org:acme path:.github/workflows/ filename:.yml OR filename:.yaml".into(),
        ))
        .with_header("content-type", "application/json")
        .with_body(r#"{"total_count":0,"items":[]}"#)
        .create();

    let dir = TempDir::new().unwrap();
    actionscan(&dir)
        .args(["acme", "--broad-search", "--output", "report.txt"])
        .args(["--token", "t", "--api-url", &server.url()])
        .assert()
        .success();

    mock.assert();
}
