use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser};

use input_relay::config::{Config, InputConfig};
use input_relay::input::{KeyModifiers, SimulatedInputSource};
use input_relay::recording::{FileStore, LogSummary, read_log};
use input_relay::sink::{EventSink, JsonLinesSink, LogSink};
use input_relay::surface::VirtualSurface;
use input_relay::InputCoordinator;

#[derive(Parser, Debug)]
#[command(name = "input-relay")]
#[command(version, about = "Unified pointer/touch/keyboard input bridge with record and replay")]
struct Cli {
    /// Replay a recorded log and print bridged events as JSON lines
    #[arg(long, value_name = "FILE", conflicts_with_all = ["inspect", "demo"])]
    replay: Option<PathBuf>,

    /// Print a summary of a recorded log
    #[arg(long, value_name = "FILE", conflicts_with = "demo")]
    inspect: Option<PathBuf>,

    /// Record a scripted drag, pinch, and undo shortcut, then save the recording
    #[arg(long, action = ArgAction::SetTrue)]
    demo: bool,

    /// Directory for the demo recording (default: configured output_dir)
    #[arg(long, value_name = "DIR", requires = "demo")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if let Some(path) = cli.replay {
        let runtime = current_thread_runtime()?;
        let dispatched = runtime.block_on(replay(&path))?;
        log::info!("Replayed {dispatched} events from {}", path.display());
    } else if let Some(path) = cli.inspect {
        inspect(&path)?;
    } else if cli.demo {
        let config = load_config();
        let output = cli
            .output
            .unwrap_or_else(|| config.recording.resolved_output_dir());
        let runtime = current_thread_runtime()?;
        let saved = runtime.block_on(demo(&config, output))?;
        println!("{}", saved.display());
    } else {
        // No flags: show usage
        println!("input-relay: Unified pointer/touch/keyboard input bridge with record and replay");
        println!();
        println!("Usage:");
        println!("  input-relay --replay <FILE>          Replay a recording, print events as JSON lines");
        println!("  input-relay --inspect <FILE>         Summarize a recording");
        println!("  input-relay --demo [--output <DIR>]  Record a scripted gesture session");
        println!("  input-relay --help                   Show help");
        println!();
        println!("Recordings are JSON (optionally gzip-compressed) files of the form");
        println!("  {{\"version\": \"1.0\", \"timestamp\": \"...\", \"events\": [...]}}");
    }

    Ok(())
}

fn current_thread_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start async runtime")
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Failed to load config, using defaults: {err:#}");
            Config::default()
        }
    }
}

async fn replay(path: &Path) -> anyhow::Result<usize> {
    let events = read_log(path)?;
    let sink: Rc<dyn EventSink> = Rc::new(JsonLinesSink::new(io::stdout()));
    let coordinator = InputCoordinator::simulated(
        Rc::new(VirtualSurface::new()),
        sink,
        InputConfig::default(),
    );
    coordinator.init().await?;
    let dispatched = coordinator.start_playback(Some(events)).await?;
    coordinator.dispose();
    Ok(dispatched)
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let events = read_log(path)?;
    let summary = LogSummary::from_events(&events);
    println!("events: {}", summary.count);
    println!("duration_ms: {}", summary.duration_ms);
    for (event_type, count) in &summary.per_type {
        println!("{event_type}: {count}");
    }
    Ok(())
}

async fn demo(config: &Config, output: PathBuf) -> anyhow::Result<PathBuf> {
    let mut store = FileStore::new(".", output);
    store.compress = config.recording.compress;

    let coordinator = InputCoordinator::simulated(
        Rc::new(VirtualSurface::new()),
        Rc::new(LogSink),
        config.input.clone(),
    )
    .with_store(Rc::new(store));
    coordinator.init().await?;

    coordinator.start_recording();
    {
        let source = coordinator.source();
        let simulated: &SimulatedInputSource = source
            .as_simulated()
            .ok_or_else(|| anyhow!("demo requires a simulated input source"))?;
        simulated.simulate_drag(0.0, 0.0, 100.0, 100.0, 5)?;
        simulated.simulate_pinch(200.0, 200.0, 50.0, 150.0, 4)?;
        simulated.simulate_key_down("z", KeyModifiers::ctrl())?;
        simulated.simulate_key_up("z")?;
    }
    log::info!("Recorded {} demo events", coordinator.recorded_events().len());

    coordinator
        .dispose()
        .ok_or_else(|| anyhow!("demo recording was not saved"))
}
