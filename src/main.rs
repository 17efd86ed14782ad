//! Application entry point — headless control console.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Locate the settings file ([`AppPaths`], `PARROT_SETTINGS` overrides).
//! 3. Create the [`tokio`] runtime.
//! 4. Build the collaborators: file store, cpal device catalog and the
//!    loopback pipeline.
//! 5. Subscribe the [`StatusProjector`] before anything can emit.
//! 6. Run startup resolution and report any fallbacks taken.
//! 7. Read commands from stdin until `quit` or end of input, then release
//!    the status subscription.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use parrot_control::{
    catalog::SystemDeviceCatalog,
    config::{AppPaths, FileSettingsStore},
    control::{lock_state, new_shared_state, ConfigResolver, StatusProjector},
    pipeline::{LoopbackPipeline, StatusToken},
};

const HELP: &str = "\
commands:
  state            print the current control state as JSON
  start | stop     start or stop the pipeline
  toggle           flip between start and stop
  input <name>     select an input device
  output <name>    select an output device
  voice <id>       select a voice
  silence <ms>     set the silence threshold (300-1200)
  emit <token>     inject a pipeline status token
  help             show this list
  quit             exit";

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Outcome of one console line.
enum Flow {
    Continue,
    Quit,
}

async fn dispatch(
    line: &str,
    resolver: &ConfigResolver,
    pipeline: &LoopbackPipeline,
) -> anyhow::Result<Flow> {
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    match verb {
        "" => {}
        "quit" | "exit" => return Ok(Flow::Quit),
        "help" => println!("{HELP}"),
        "state" => {
            let snapshot = lock_state(resolver.state()).snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        "start" | "stop" => {
            let active = lock_state(resolver.state()).is_active;
            if active == (verb == "start") {
                println!("pipeline already {}", if active { "running" } else { "stopped" });
            } else {
                report(resolver.toggle_pipeline().await.map(|_| ()), resolver);
            }
        }
        "toggle" => report(resolver.toggle_pipeline().await.map(|_| ()), resolver),
        "input" => report(resolver.change_input_device(arg).await, resolver),
        "output" => report(resolver.change_output_device(arg).await, resolver),
        "voice" => report(resolver.change_voice(arg).await, resolver),
        "silence" => {
            let ms: u64 = arg
                .parse()
                .with_context(|| format!("not a duration in milliseconds: {arg:?}"))?;
            report(resolver.change_silence_duration(ms).await, resolver);
        }
        "emit" => pipeline.emit(&StatusToken::parse(arg)),
        other => println!("unknown command {other:?}; type `help`"),
    }

    Ok(Flow::Continue)
}

/// Print the status line after a user action.
fn report<E: std::fmt::Display>(result: Result<(), E>, resolver: &ConfigResolver) {
    let status = lock_state(resolver.state()).display.text();
    match result {
        Ok(()) => println!("ok ({status})"),
        Err(e) => println!("rejected: {e}"),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Parrot control console starting up");

    // 2. Settings location
    let paths = AppPaths::new();
    log::info!("Settings file: {}", paths.settings_file.display());

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(paths))
}

async fn run(paths: AppPaths) -> anyhow::Result<()> {
    // 4. Collaborators
    let devices = Arc::new(SystemDeviceCatalog::new());
    let pipeline = Arc::new(LoopbackPipeline::with_stock_voices(devices.clone()));
    let store = Arc::new(FileSettingsStore::from_paths(&paths));

    let state = new_shared_state();
    let resolver = ConfigResolver::new(
        state.clone(),
        store,
        devices,
        pipeline.clone(),
        pipeline.clone(),
    );

    // 5. Status projection
    let subscription = StatusProjector::subscribe(state.clone(), pipeline.as_ref());

    // 6. Startup resolution
    let startup = resolver.initialize().await;
    for failure in &startup.load_failures {
        log::warn!("Startup fallback: {failure}");
    }
    for failure in &startup.command_failures {
        log::warn!("Startup command rejected: {failure}");
    }
    if startup.is_clean() {
        log::info!(
            "Startup resolved cleanly (stored settings: {})",
            if startup.settings_loaded { "yes" } else { "no" }
        );
    }

    // 7. Console loop
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match dispatch(line.trim(), &resolver, &pipeline).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("error: {e:#}"),
        }
    }

    subscription.unsubscribe().await;
    if pipeline.is_running() {
        resolver.toggle_pipeline().await?;
    }
    log::info!("Parrot control console shut down");
    Ok(())
}
