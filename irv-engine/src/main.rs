//! Incident review engine (irv-engine) - command-line front end
//!
//! Replays a saved analysis result against a simulated transport and prints
//! the render inputs the presentation layer would receive.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use irv_common::ReviewConfig;
use irv_engine::projector::StaticLayout;
use irv_engine::transport::SimulatedTransport;
use irv_engine::{InteractionCoordinator, ReviewSession};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for irv-engine
#[derive(Parser, Debug)]
#[command(name = "irv-engine")]
#[command(about = "Incident review event, timeline and floor-plan sync engine")]
#[command(version)]
struct Args {
    /// Config file (overrides IRV_CONFIG and the platform config file)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the floor-plan overlay as JSON
    Overlay {
        /// Analysis result JSON
        #[arg(long)]
        analysis: PathBuf,

        /// Floor-plan layout JSON
        #[arg(long)]
        layout: PathBuf,

        /// Media length in seconds (defaults to --at when only that is given)
        #[arg(long)]
        duration: Option<f64>,

        /// Playback position in seconds, used for active highlighting
        #[arg(long)]
        at: Option<f64>,
    },

    /// Print the scrub-track view as JSON
    Timeline {
        #[arg(long)]
        analysis: PathBuf,

        #[arg(long)]
        duration: f64,

        #[arg(long)]
        at: Option<f64>,
    },

    /// Simulate clicking a room on the floor plan
    ClickRoom {
        #[arg(long)]
        analysis: PathBuf,

        #[arg(long)]
        layout: PathBuf,

        #[arg(long)]
        duration: f64,

        /// Location identifier of the clicked room
        location: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config first so its log level can seed the filter
    let (config, source) =
        ReviewConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("irv_engine={0},irv_common={0}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Configuration source: {:?}", source);

    let output = match args.command {
        Command::Overlay {
            analysis,
            layout,
            duration,
            at,
        } => {
            let mut session = open_session(&config, &analysis)?;
            install_layout(&mut session, &layout)?;
            if let Some(duration) = duration.or(at) {
                position(&mut session, duration, at);
            }
            let summary = session.incident_summary().to_string();
            json!({
                "incidentSummary": summary,
                "overlay": session.coordinator_mut().overlay(),
            })
        }

        Command::Timeline {
            analysis,
            duration,
            at,
        } => {
            let mut session = open_session(&config, &analysis)?;
            position(&mut session, duration, at);
            match session.coordinator().timeline_view() {
                Some(view) => serde_json::to_value(view)?,
                None => json!({ "note": "duration is 0, no timeline to draw" }),
            }
        }

        Command::ClickRoom {
            analysis,
            layout,
            duration,
            location,
        } => {
            let mut session = open_session(&config, &analysis)?;
            install_layout(&mut session, &layout)?;
            position(&mut session, duration, None);

            let coordinator = session.coordinator_mut();
            let click = coordinator.click_room(&location);
            coordinator.sync_transport();

            json!({
                "click": click,
                "selectedEvent": coordinator.selected_event(),
                "playback": coordinator.playback(),
                "activeEvents": coordinator.active_events(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Build a session holding the saved analysis result
fn open_session(
    config: &ReviewConfig,
    analysis: &Path,
) -> Result<ReviewSession<SimulatedTransport>> {
    let body = fs::read_to_string(analysis)
        .with_context(|| format!("Failed to read analysis result {}", analysis.display()))?;

    let coordinator = InteractionCoordinator::from_config(SimulatedTransport::new(), config)
        .context("Invalid classifier rules")?;
    let mut session = ReviewSession::new(coordinator);
    session
        .complete_json(&body)
        .with_context(|| format!("Failed to parse analysis result {}", analysis.display()))?;

    info!(
        "Loaded {} events from {}",
        session.coordinator().store().len(),
        analysis.display()
    );
    Ok(session)
}

fn install_layout(session: &mut ReviewSession<SimulatedTransport>, layout: &Path) -> Result<()> {
    let text = fs::read_to_string(layout)
        .with_context(|| format!("Failed to read layout {}", layout.display()))?;
    let layout = StaticLayout::from_json(&text).context("Failed to parse layout")?;
    session.coordinator_mut().set_floor_plan(Box::new(layout));
    Ok(())
}

/// Load media of `duration` seconds and optionally seek to `at`
fn position(session: &mut ReviewSession<SimulatedTransport>, duration: f64, at: Option<f64>) {
    let coordinator = session.coordinator_mut();
    coordinator.timeline_mut().transport_mut().load(duration);
    coordinator.sync_transport();

    if let Some(at) = at {
        coordinator.timeline_mut().seek_to(at);
        coordinator.sync_transport();
    }
}
