use clap::{Parser, Subcommand};
use snapdial::config;
use snapdial::sys::{runtime, script};
use std::path::PathBuf;
use tokio::io::BufReader;

#[derive(Parser, Debug)]
#[command(name = "snapdial", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read the dial config from this file instead of the user config directory
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Drive a dial from a gesture script and print every signal it emits
    Replay {
        /// Script file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Write the default config file and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { file } => {
            let config = config::load_or_default(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(replay(config, file))
        }
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn replay(config: config::DialConfig, file: Option<PathBuf>) -> anyhow::Result<()> {
    let (event_tx, event_rx) = async_channel::bounded(32);
    let (signal_tx, signal_rx) = async_channel::unbounded();

    let driver = tokio::spawn(runtime::run_dial(config, event_rx, signal_tx));
    let printer = tokio::spawn(async move {
        while let Ok(signal) = signal_rx.recv().await {
            println!("{}", signal);
        }
    });

    let fed = match file {
        Some(path) => {
            let f = tokio::fs::File::open(&path).await.map_err(|e| {
                anyhow::anyhow!("Failed to open script {}: {}", path.display(), e)
            })?;
            script::feed(BufReader::new(f), event_tx).await
        }
        None => script::feed(BufReader::new(tokio::io::stdin()), event_tx).await,
    };

    let state = driver.await?;
    printer.await?;
    let sent = fed?;

    log::info!("Replayed {} events", sent);
    println!(
        "final angle={:.2} radius={:.3} section={}",
        state.angle_y,
        state.radius,
        state
            .section
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    Ok(())
}
