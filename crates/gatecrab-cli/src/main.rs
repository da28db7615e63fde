use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use gatecrab_api::{
    EvalInput, PolicySource, RepoConfigLoader, StaticPolicySource, evaluate_automerge,
    evaluate_pull_request, evaluate_readiness, fan_out_status, parse_policy,
};
use gatecrab_core::PrRef;
use gatecrab_github::{GithubApiClient, PrOperations};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "gatecrab-cli")]
#[command(about = "Run gatecrab label evaluations once, from CI or GitHub Actions")]
#[command(version = VERSION)]
struct Cli {
    /// GitHub API base URL, for GitHub Enterprise
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Local policy file used instead of the one in the repository
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one pull request and apply label transitions
    Evaluate {
        /// Repository as owner/name
        #[arg(long, value_parser = parse_repo)]
        repo: (String, String),

        /// Pull request number
        #[arg(long)]
        pr: u64,

        /// Run a single evaluator instead of both
        #[arg(long, value_enum)]
        only: Option<Evaluator>,
    },

    /// Re-evaluate merge readiness for every open PR at a commit
    Status {
        /// Repository as owner/name
        #[arg(long, value_parser = parse_repo)]
        repo: (String, String),

        /// Commit SHA the status event was reported for
        #[arg(long)]
        sha: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Evaluator {
    Automerge,
    Readiness,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let token = std::env::var("GITHUB_TOKEN").context("GITHUB_TOKEN must be set")?;
    let client = match &cli.api_url {
        Some(url) => GithubApiClient::with_base_uri(token, url),
        None => GithubApiClient::new(token),
    }
    .context("Failed to create GitHub API client")?;
    let ops: Arc<dyn PrOperations> = Arc::new(client);

    let policies: Box<dyn PolicySource> = match &cli.policy {
        Some(path) => Box::new(load_local_policy(path)?),
        None => Box::new(RepoConfigLoader::new(ops.clone(), 0)),
    };

    let output = match cli.command {
        Commands::Evaluate { repo, pr, only } => {
            let (owner, name) = repo;
            let pr = PrRef::new(owner, name, pr);
            let policy = policies.load(&pr.owner, &pr.repo).await?;
            let input = EvalInput::new(&pr);

            match only {
                Some(Evaluator::Automerge) => {
                    let outcome = evaluate_automerge(ops.as_ref(), &policy, input).await?;
                    json!({ "pr": pr.to_string(), "automerge": outcome })
                }
                Some(Evaluator::Readiness) => {
                    let outcome = evaluate_readiness(ops.as_ref(), &policy, input).await?;
                    json!({ "pr": pr.to_string(), "merge_readiness": outcome })
                }
                None => serde_json::to_value(
                    evaluate_pull_request(ops.as_ref(), &policy, input).await?,
                )?,
            }
        }
        Commands::Status { repo, sha } => {
            let (owner, name) = repo;
            let report =
                fan_out_status(ops.as_ref(), policies.as_ref(), &owner, &name, &sha).await?;
            serde_json::to_value(report)?
        }
    };

    let output_json =
        serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
    println!("{}", output_json);

    Ok(())
}

/// Split `owner/name` into its two parts
fn parse_repo(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(format!("expected owner/name, got '{}'", value)),
    }
}

fn load_local_policy(path: &Path) -> Result<StaticPolicySource> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file: {:?}", path))?;
    let policy = parse_policy(&content)
        .with_context(|| format!("Invalid policy file: {:?}", path))?;
    if policy.automerge.is_none() && policy.merge_readiness.is_none() {
        bail!("Policy file {:?} enables no evaluators", path);
    }
    info!(path = %path.display(), "Using local policy file");
    Ok(StaticPolicySource(policy))
}
