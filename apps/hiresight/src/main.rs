use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hiresight::{AppState, Config, JobRequirement, ProfileBundle};

/// Command-line arguments for hiresight
#[derive(Parser, Debug)]
#[command(name = "hiresight")]
#[command(about = "Analyze a developer profile bundle and optionally match it against a job")]
#[command(version)]
struct Args {
    /// Profile bundle JSON produced by the ingestion adapter
    #[arg(env = "HIRESIGHT_BUNDLE")]
    bundle: PathBuf,

    /// Job requirement JSON; enables matching and bias detection
    #[arg(short, long, env = "HIRESIGHT_JOB")]
    job: Option<PathBuf>,

    /// Cache key override (defaults to the bundle's username)
    #[arg(short, long)]
    candidate: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    info!("Starting HireSight v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::build(config).await?;

    // Stand-in for the ingestion adapter: the bundle file is the fetch result.
    let bundle: ProfileBundle = read_json(&args.bundle)?;
    let key = args
        .candidate
        .clone()
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| bundle.candidate_key().to_string());
    state.cache.populate(&key, Arc::new(bundle)).await?;

    let analysis = Arc::new(state.engine.analyze_cached(state.cache.as_ref(), &key).await?);

    let output = match &args.job {
        None => serde_json::json!({ "analysis": analysis.as_ref() }),
        Some(path) => {
            let job: Arc<JobRequirement> = Arc::new(read_json(path)?);

            let match_task = {
                let engine = state.engine.clone();
                let analysis = analysis.clone();
                let job = job.clone();
                tokio::task::spawn_blocking(move || engine.match_job(&analysis, &job))
            };
            let bias_task = {
                let engine = state.engine.clone();
                let job = job.clone();
                tokio::task::spawn_blocking(move || engine.detect_bias(&job))
            };
            let (matched, bias) = tokio::try_join!(match_task, bias_task)?;

            info!(
                candidate = %matched.candidate,
                score = matched.overall_score,
                tier = matched.tier.label(),
                fairness = bias.fairness_score,
                "match complete"
            );
            serde_json::json!({
                "analysis": analysis.as_ref(),
                "match": matched,
                "bias": bias,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
