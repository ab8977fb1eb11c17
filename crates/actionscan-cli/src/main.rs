use actionscan_core::client::GithubClient;
use actionscan_core::scan::{run_scan, ScanOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "actionscan",
    about = "Find GitHub Actions usage in an organization",
    version
)]
struct Cli {
    /// GitHub organization name
    org: String,

    /// Target GitHub Action to find
    #[arg(long, default_value = "tj-actions/changed-files")]
    action: String,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output file path
    #[arg(long, default_value = "action_usage_report.txt")]
    output: PathBuf,

    /// Search all workflow files, not only those mentioning the action
    #[arg(long)]
    broad_search: bool,

    /// GitHub API base URL (override for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = GithubClient::DEFAULT_API_URL)]
    api_url: String,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(token) = cli.token else {
        anyhow::bail!(
            "GitHub token is required. Set GITHUB_TOKEN environment variable or use --token."
        );
    };

    let client = GithubClient::with_base_url(token, &cli.api_url)?;
    let mut options = ScanOptions::new(&cli.org, &cli.action);
    options.broad_search = cli.broad_search;

    let report = run_scan(&client, &options);

    let rendered = report.render(&cli.action, &cli.org);
    actionscan_core::io::atomic_write(&cli.output, rendered.as_bytes())?;

    println!();
    println!("Scan complete! Report written to {}", cli.output.display());
    println!(
        "Found {} instances of {} across {} repositories",
        report.total_usages(),
        cli.action,
        report.repository_count()
    );
    Ok(())
}
