use anyhow::Context;
use clap::{Parser, Subcommand};
use deltaflow_backend::DataflowBackend;
use deltaflow_client::RestJobProvider;
use deltaflow_core::config::JobConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "deltaflow", version, about = "Control jobs on a managed dataflow service")]
struct Cli {
    /// Job configuration file.
    #[arg(
        short,
        long,
        env = "DELTAFLOW_CONFIG",
        default_value = "deltaflow.yaml",
        global = true
    )]
    config: PathBuf,

    /// Service endpoint, e.g. https://dataflow.example.com. Falls back to
    /// `execution.endpoint` in the job configuration.
    #[arg(long, env = "DELTAFLOW_ENDPOINT", global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a starter job specification.
    Init {
        /// Write the template to this path instead of stdout.
        destination: Option<PathBuf>,

        /// Replace the destination if it already exists.
        #[arg(long)]
        overwrite: bool,

        /// Runtime type key: dataFlow (default) or dataFlowNotebook.
        #[arg(long)]
        runtime_type: Option<String>,
    },
    /// Create a job and run from a specification file.
    Apply,
    /// Create a job from configuration (or reuse `execution.ocid`) and submit a run.
    Run,
    /// Cancel the run referenced by `execution.run_id`.
    Cancel,
    /// Delete the job (`execution.id`) or run (`execution.run_id`).
    Delete,
    /// Stream the logs of the run referenced by `execution.run_id`.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| config.execution.endpoint.clone())
        .context("No service endpoint configured, pass --endpoint or set `execution.endpoint`")?;

    let provider = RestJobProvider::from_execution(endpoint, &config.execution)?;
    let backend = DataflowBackend::new(config, provider)?;

    match cli.command {
        Command::Init {
            destination,
            overwrite,
            runtime_type,
        } => {
            let rendered = backend
                .init(destination.as_deref(), overwrite, runtime_type.as_deref())
                .await?;
            if let Some(text) = rendered {
                print!("{text}");
            }
        }
        Command::Apply => backend.apply().await?,
        Command::Run => {
            backend.run().await?;
        }
        Command::Cancel => backend.cancel().await?,
        Command::Delete => backend.delete().await?,
        Command::Watch => {
            tokio::select! {
                result = backend.watch() => result?,
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("watch interrupted");
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read job config '{}'", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Cannot parse job config '{}'", path.display()))
}
