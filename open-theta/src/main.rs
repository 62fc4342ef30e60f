mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use open_theta::{begin, CallContext, CameraControl, HttpCamera};
use tracing::info;
use url::Url;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "theta", version, about = "Talk to a RICOH THETA over the OSC HTTP API")]
struct Cli {
    /// JSON config file with `endpoint` and `timeout_secs`
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Camera base URL
    #[arg(long, env = "THETA_ENDPOINT", global = true)]
    endpoint: Option<Url>,

    /// Give up after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session and switch the camera to API level 2 (default)
    Begin,
    /// Print the camera's /osc/info
    Info,
    /// Print the camera's /osc/state
    State,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = Some(secs);
    }

    let root = CallContext::background();
    let ctx = match config.timeout() {
        Some(timeout) => root.with_timeout(timeout),
        None => root.child(),
    };

    let interrupt = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut camera = HttpCamera::new_custom_address(config.endpoint);
    info!(endpoint = %camera.base(), "connecting");

    match cli.command.unwrap_or(Commands::Begin) {
        Commands::Begin => {
            begin(&ctx, Some(&mut camera)).await.context("begin failed")?;
            let state = camera.state();
            info!(api_level = state.api_level().as_u8(), protocol = ?state.protocol_state(), "camera ready");
        }
        Commands::Info => {
            let info = camera.info(&ctx).await.context("reading /osc/info")?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::State => {
            let state = camera.device_state(&ctx).await.context("reading /osc/state")?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }

    Ok(())
}
