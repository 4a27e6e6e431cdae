mod commands;
mod config;
mod core;
mod input;
mod playback;
mod render;
mod session;

use anyhow::{Context, Result};
use commands::{Command, HELP};
use config::Settings;
use crate::core::Waypoint;
use playback::PlaybackConfig;
use render::{spawn_render_loop, ConsoleSink, GeoJsonSink};
use session::Simulation;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let stored = Settings::load();

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run(&stored, std::env::args().nth(1)))?;

    // Persist on quit so the file exists for editing
    if let Err(e) = stored.save() {
        warn!("Could not save settings: {:#}", e);
    }
    Ok(())
}

async fn run(stored: &Settings, initial_csv: Option<String>) -> Result<()> {
    let settings = stored.with_env_overrides();
    info!("Tick interval: {:?}", settings.tick_interval());

    let mut sim = Simulation::new(PlaybackConfig::with_tick_interval(settings.tick_interval()));

    let mut renderers = vec![spawn_render_loop(
        ConsoleSink::new(settings.viewport_padding),
        sim.subscribe_path(),
        sim.subscribe_playback(),
    )];
    if let Some(output) = settings.geojson_output.clone() {
        info!("Writing GeoJSON to {:?}", output);
        renderers.push(spawn_render_loop(
            GeoJsonSink::new(output),
            sim.subscribe_path(),
            sim.subscribe_playback(),
        ));
    }

    if let Some(path) = initial_csv {
        import(&mut sim, Path::new(&path));
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(&mut sim, command),
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
    }

    sim.reset();
    for handle in renderers {
        handle.abort();
    }
    Ok(())
}

fn execute(sim: &mut Simulation, command: Command) {
    match command {
        Command::Add { lon, lat } => {
            let added = Waypoint::parse(&lon, &lat)
                .and_then(|wp| sim.add_waypoint(wp.lon(), wp.lat()));
            match added {
                Ok(()) => println!("Added ({}, {}), {} waypoints", lon, lat, sim.waypoints().len()),
                Err(e) => println!("Rejected: {}", e),
            }
        }
        Command::Import(path) => import(sim, &path),
        Command::Start => {
            if let Err(e) = sim.start() {
                println!("Cannot start: {}", e);
            }
        }
        Command::Pause => sim.pause(),
        Command::Resume => sim.resume(),
        Command::Reset => sim.reset(),
        Command::List => {
            let waypoints = sim.waypoints();
            if waypoints.is_empty() {
                println!("No waypoints");
            }
            for (i, wp) in waypoints.iter().enumerate() {
                println!("{:>4}: latitude {}, longitude {}", i, wp.lat(), wp.lon());
            }
        }
        Command::Status => {
            let status = sim.status();
            match status.position {
                Some(position) => println!(
                    "{} at #{} {} of {}",
                    status.state,
                    status.cursor_index(),
                    position,
                    sim.waypoints().len()
                ),
                None => println!("{}, {} waypoints", status.state, sim.waypoints().len()),
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn import(sim: &mut Simulation, path: &Path) {
    match sim.import_file(path) {
        Ok(summary) => println!(
            "Imported {} waypoints from {:?} ({} rows rejected)",
            summary.added, path, summary.rejected
        ),
        Err(e) => println!("Import failed: {}", e),
    }
}
