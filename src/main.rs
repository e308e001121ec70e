//! gh-labelset CLI
//!
//! Drives the label reconciler through the same lifecycle an
//! infrastructure engine would: apply, plan, read, destroy

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

use gh_labelset::{
    config::{self, default_labels, RepoId},
    reconcile::{self, LabelOp, ReconcileOutcome},
    state::{self, TrackedState, DEFAULT_STATE_FILE},
    Error, GitHubClient, Label, LabelSet,
};

/// gh-labelset CLI
#[derive(Parser)]
#[command(
    name = "gh-labelset",
    version,
    about = "Declarative GitHub repository label reconciliation",
    long_about = "Reconciles a declared set of issue labels against the labels actually \
    present on a GitHub repository. Tracks the applied state between runs and only \
    issues the create, delete, and update calls needed to converge."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub access token
    #[arg(short = 't', long, global = true)]
    access_token: Option<String>,

    /// Target repository (owner/repo format)
    #[arg(short = 'r', long, global = true)]
    repository: Option<String>,

    /// Take ownership of the full remote label set, including labels this
    /// declaration never created
    #[arg(long, global = true)]
    authoritative: bool,

    /// Declaration file path (JSON/YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Tracked-state file path
    #[arg(long, global = true, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the repository's labels with the declaration
    Apply,

    /// Show the mutations apply would execute, without running them
    Plan,

    /// Refresh the tracked state from the remote without mutating
    Read,

    /// Delete every tracked label and drop the state file
    Destroy,

    /// Display the remote label set
    List {
        /// Output format
        #[arg(long, default_value = "table", value_parser = ["table", "json", "yaml"])]
        format: String,
    },

    /// Output a starter declaration
    Init {
        /// Output format
        #[arg(long, default_value = "json", value_parser = ["json", "yaml"])]
        format: String,

        /// Output file path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Apply => run_apply(&cli).await,
        Commands::Plan => run_plan(&cli),
        Commands::Read => run_read(&cli).await,
        Commands::Destroy => run_destroy(&cli).await,
        Commands::List { format } => run_list(&cli, format).await,
        Commands::Init { format, output } => run_init(format, output.as_deref()),
    }
}

/// Wire `-v` counts into the tracing subscriber
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run one full reconciliation cycle and persist the new tracked state
async fn run_apply(cli: &Cli) -> Result<()> {
    let repo = require_repository(cli.repository.as_deref())?;
    let client = build_client(cli, &repo).await?;

    let previous = load_previous(&cli.state, &repo)?;
    let desired: LabelSet = load_declaration(cli.config.as_deref())?.into();

    let outcome = reconcile::apply(
        &client,
        &repo,
        &previous.label_set(),
        &desired,
        cli.authoritative,
    )
    .await?;

    persist_outcome(&cli.state, &repo, cli.authoritative, &outcome)?;
    display_outcome(&outcome, cli.verbose > 0);

    if cli.verbose > 0 {
        if let Ok(rate) = client.rate_limit().await {
            tracing::info!(remaining = rate.remaining, limit = rate.limit, "rate limit");
        }
    }

    Ok(())
}

/// Show the mutations the next apply would execute
///
/// Diffs the tracked state against the declaration; no remote call is
/// made, so no token is needed.
fn run_plan(cli: &Cli) -> Result<()> {
    let repo = require_repository(cli.repository.as_deref())?;

    let previous = load_previous(&cli.state, &repo)?;
    let desired: LabelSet = load_declaration(cli.config.as_deref())?.into();

    let ops = reconcile::plan(&previous.label_set(), &desired);

    if ops.is_empty() {
        println!("{} No changes required", "✓".green());
        return Ok(());
    }

    println!("{} Planned operations:", "•".blue());
    for (i, op) in ops.iter().enumerate() {
        display_op(i, op);
    }

    Ok(())
}

/// Refresh the tracked state from the remote
async fn run_read(cli: &Cli) -> Result<()> {
    let repo = require_repository(cli.repository.as_deref())?;
    let client = build_client(cli, &repo).await?;

    let previous = load_previous(&cli.state, &repo)?;
    let refreshed = reconcile::project(
        &client,
        &repo,
        &previous.label_set(),
        cli.authoritative,
    )
    .await?;

    let new_state = TrackedState {
        repository: repo.to_string(),
        authoritative: cli.authoritative,
        labels: refreshed.to_vec(),
    };
    state::save_state(&cli.state, &new_state)
        .with_context(|| format!("Failed to write state file {}", cli.state.display()))?;

    println!(
        "{} Tracking {} labels on {}",
        "✓".green(),
        refreshed.len().to_string().cyan(),
        repo.to_string().cyan()
    );
    for label in refreshed.iter() {
        println!("  {} (#{})", label.name, label.color);
    }

    Ok(())
}

/// Delete every tracked label, then drop the state file
async fn run_destroy(cli: &Cli) -> Result<()> {
    let repo = require_repository(cli.repository.as_deref())?;
    let client = build_client(cli, &repo).await?;

    let previous = load_previous(&cli.state, &repo)?;
    let outcome = reconcile::apply(
        &client,
        &repo,
        &previous.label_set(),
        &LabelSet::new(),
        cli.authoritative,
    )
    .await?;

    state::remove_state(&cli.state)
        .with_context(|| format!("Failed to remove state file {}", cli.state.display()))?;
    display_outcome(&outcome, cli.verbose > 0);

    Ok(())
}

/// Display the remote label set
async fn run_list(cli: &Cli, format: &str) -> Result<()> {
    let repo = require_repository(cli.repository.as_deref())?;
    let client = build_client(cli, &repo).await?;

    let labels =
        gh_labelset::github::list_all_labels(&client, &repo, reconcile::DEFAULT_PAGE_SIZE).await?;

    match format {
        "table" => {
            println!(
                "{:<30} {:<8} {:<50}",
                "Name".cyan(),
                "Color".cyan(),
                "Description".cyan()
            );
            println!("{}", "─".repeat(90));

            for label in labels {
                let description = label.description.as_deref().unwrap_or("(none)");
                println!(
                    "{:<30} {:<8} {:<50}",
                    label.name,
                    format!("#{}", label.color),
                    description
                );
            }
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&labels)?);
        }
        "yaml" => {
            println!("{}", serde_yaml::to_string(&labels)?);
        }
        _ => return Err(Error::config_validation("Unsupported format").into()),
    }

    Ok(())
}

/// Write a starter declaration
fn run_init(format: &str, output: Option<&std::path::Path>) -> Result<()> {
    let labels = default_labels();

    let content = match format {
        "json" => serde_json::to_string_pretty(&labels).map_err(Error::Json)?,
        "yaml" => serde_yaml::to_string(&labels).map_err(Error::Yaml)?,
        _ => return Err(Error::config_validation("Unsupported format").into()),
    };

    if let Some(output_path) = output {
        std::fs::write(output_path, content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!(
            "{} Starter declaration written to: {}",
            "✓".green(),
            output_path.display().to_string().cyan()
        );
    } else {
        println!("{}", content);
    }

    Ok(())
}

/// Build an authenticated client and verify the repository exists
async fn build_client(cli: &Cli, repo: &RepoId) -> Result<GitHubClient> {
    let token = get_access_token(cli.access_token.clone())?;
    let client = GitHubClient::new(&token, repo.clone()).await?;

    if !client.repository_exists().await {
        return Err(Error::RepositoryNotFound(repo.to_string()).into());
    }

    Ok(client)
}

/// Load the tracked state, empty on the first cycle
fn load_previous(path: &std::path::Path, repo: &RepoId) -> Result<TrackedState> {
    match state::load_state(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?
    {
        Some(tracked) => {
            if tracked.repository != repo.to_string() {
                anyhow::bail!(
                    "State file {} tracks {}, not {}",
                    path.display(),
                    tracked.repository,
                    repo
                );
            }
            Ok(tracked)
        }
        None => Ok(TrackedState::empty(repo, false)),
    }
}

/// Persist the cycle's projected state as the next tracked state
fn persist_outcome(
    path: &std::path::Path,
    repo: &RepoId,
    authoritative: bool,
    outcome: &ReconcileOutcome,
) -> Result<()> {
    let new_state = TrackedState {
        repository: repo.to_string(),
        authoritative,
        labels: outcome.state.to_vec(),
    };
    state::save_state(path, &new_state)
        .with_context(|| format!("Failed to write state file {}", path.display()))
}

/// Display a cycle's outcome
fn display_outcome(outcome: &ReconcileOutcome, verbose: bool) {
    if outcome.has_changes() {
        println!("\n{} Reconciliation completed:", "✓".green());
    } else {
        println!("\n{} No changes required", "✓".green());
    }

    println!("  Created: {}", outcome.created.to_string().green());
    println!("  Updated: {}", outcome.updated.to_string().yellow());
    println!("  Deleted: {}", outcome.deleted.to_string().red());
    println!("  Tracked: {}", outcome.state.len().to_string().cyan());

    if verbose && !outcome.operations.is_empty() {
        println!("\n{} Executed operations:", "•".blue());
        for (i, op) in outcome.operations.iter().enumerate() {
            display_op(i, op);
        }
    }
}

/// Display one planned or executed operation
fn display_op(index: usize, op: &LabelOp) {
    let prefix = format!("  {}.", index + 1);
    match op {
        LabelOp::Create { label } => {
            println!(
                "{} {} Create label: {} (#{})",
                prefix,
                "+".green(),
                label.name.cyan(),
                label.color
            );
        }
        LabelOp::Delete { name } => {
            println!("{} {} Delete label: {}", prefix, "-".red(), name.red());
        }
        LabelOp::Update {
            old_name,
            label,
            changes,
        } => {
            println!(
                "{} {} Update label: {} -> {}",
                prefix,
                "~".yellow(),
                old_name.cyan(),
                label.name.cyan()
            );
            for change in changes {
                println!("      {}", change.dimmed());
            }
        }
    }
}

/// Require a repository argument
fn require_repository(repo: Option<&str>) -> Result<RepoId> {
    let repo = repo.ok_or_else(|| {
        Error::config_validation("Repository is required. Use -r or --repository flag")
    })?;
    Ok(repo.parse::<RepoId>()?)
}

/// Get access token
fn get_access_token(arg_token: Option<String>) -> Result<String> {
    arg_token
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .ok_or_else(|| {
            Error::config_validation(
                "GitHub access token is required. Set via --access-token or GITHUB_TOKEN env var",
            )
            .into()
        })
}

/// Load the declaration, falling back to the stock label set
fn load_declaration(config_path: Option<&std::path::Path>) -> Result<Vec<Label>> {
    match config_path {
        Some(path) => Ok(config::load_labels_from_file(path)?),
        None => Ok(default_labels()),
    }
}
