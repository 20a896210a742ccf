/// Orbit Shell - headless player driven from stdin
use clap::{Parser, Subcommand};
use orbit_metadata::TrackScanner;
use orbit_playback::{PlayerRuntime, RepeatMode, StoreAction};
use orbit_shell::{
    library::gather, FileUrlDecoder, LengthTable, Outcome, Shell, ShellConfig, SimulatedElement,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "orbit-shell")]
#[command(about = "Orbit Player playback engine, driven from the command line", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./orbit.toml if present)
    #[arg(short, long, global = true, env = "ORBIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load files, folders or URLs and take commands from stdin
    Play {
        /// Audio files, directories or http(s) URLs
        items: Vec<String>,

        /// Initial repeat mode: off, track or context
        #[arg(short, long)]
        repeat: Option<RepeatMode>,

        /// Do not print store actions as JSON lines
        #[arg(long)]
        no_actions: bool,
    },
    /// Scan files or folders and print the tracks as JSON lines
    Scan {
        /// Audio files or directories
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orbit_shell=info,orbit_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ShellConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play {
            items,
            repeat,
            no_actions,
        } => play(config, items, repeat, !no_actions).await?,
        Commands::Scan { paths } => scan(&config, paths).await?,
    }

    Ok(())
}

async fn play(
    mut config: ShellConfig,
    items: Vec<String>,
    repeat: Option<RepeatMode>,
    print_actions: bool,
) -> anyhow::Result<()> {
    if let Some(repeat) = repeat {
        config.playback.repeat = repeat;
    }

    tracing::info!("Starting Orbit Shell");
    tracing::info!("Repeat: {}", config.playback.repeat);
    tracing::info!("Volume: {}", config.playback.volume);

    let lengths = LengthTable::new();
    let element_lengths = lengths.clone();
    let (runtime, handle) = PlayerRuntime::new(config.playback.clone(), FileUrlDecoder, |sink| {
        SimulatedElement::new(sink).with_lengths(element_lengths)
    });
    let player = tokio::spawn(runtime.run());

    if print_actions {
        tokio::spawn(print_store_actions(handle.subscribe()));
    }

    let scanner = TrackScanner::with_config(
        orbit_metadata::LoftyTagReader::new(),
        config.library.scan_config(),
    );
    let shell = Shell::new(handle, scanner, lengths);

    let mut startup: Vec<String> = config
        .library
        .paths
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    startup.extend(items);
    if !startup.is_empty() {
        let count = shell.add(&startup).await?;
        println!("added {count} track(s), type 'help' for commands");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match shell.execute_line(&line).await {
            Ok(Outcome::Continue(Some(text))) => println!("{text}"),
            Ok(Outcome::Continue(None)) => {}
            Ok(Outcome::Quit) => break,
            Err(err) => eprintln!("error: {err}"),
        }
    }

    // End of input counts as quit
    drop(shell);
    let controller = player.await?;
    tracing::info!(phase = %controller.phase(), "Player stopped");

    Ok(())
}

async fn print_store_actions(mut actions: broadcast::Receiver<StoreAction>) {
    loop {
        match actions.recv().await {
            Ok(action) => match serde_json::to_string(&action) {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::warn!(%err, "Failed to encode store action"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Store action output fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn scan(config: &ShellConfig, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let scanner = TrackScanner::with_config(
        orbit_metadata::LoftyTagReader::new(),
        config.library.scan_config(),
    );
    let tracks = gather(&scanner, &paths, &[], &LengthTable::new()).await?;
    for track in tracks {
        println!("{}", serde_json::to_string(&track)?);
    }

    Ok(())
}
