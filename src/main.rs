//! Interactive harness wiring the alert controller to terminal
//! collaborators and a loopback host stub.
//!
//! Push messages can be injected as JSON lines on stdin; plain keywords
//! drive the operator actions. The stub services the command channel the
//! way the backend would: a test alert comes back around as a
//! `temperature_alert` push message.

use clap::Parser;
use fireguard::alert::AlertController;
use fireguard::audio::RodioAudio;
use fireguard::config::{self, GuardSettings, StaticSettings, TerminationMode};
use fireguard::host::{commands, ChannelTransport, HostRequest};
use fireguard::messages::PLUGIN_ID;
use fireguard::notify::TerminalNotifier;
use fireguard::ui::{PresetConfirm, TerminalModal};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Temperature alert client for a 3D printer host
#[derive(Parser, Debug)]
#[command(name = "fireguard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings snapshot file
    #[arg(short, long, default_value = "fireguard.toml")]
    settings: String,

    /// Confirm the emergency-actions test up front instead of declining it
    #[arg(long)]
    yes: bool,

    /// Disable colored notification output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Fireguard alert client");

    let settings = match config::load_settings_file(&args.settings) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(
                "could not load settings from '{}' ({e}), using defaults",
                args.settings
            );
            GuardSettings::default()
        }
    };
    tracing::info!("Hotend threshold: {}°C", settings.hotend_threshold);
    tracing::info!("Heatbed threshold: {}°C", settings.heatbed_threshold);
    tracing::info!("Termination mode: {}", settings.termination_mode);
    tracing::info!("Monitoring enabled: {}", settings.enable_monitoring);

    let (host_tx, host_rx) = mpsc::channel::<HostRequest>(16);
    let (push_tx, mut push_rx) = mpsc::channel(16);
    tokio::spawn(run_host_stub(host_rx, push_tx, settings.termination_mode));

    let source = StaticSettings::with_plugin(
        PLUGIN_ID,
        serde_json::to_value(&settings).unwrap_or(serde_json::Value::Null),
    );

    let notifier = if args.no_color {
        TerminalNotifier::no_color()
    } else {
        TerminalNotifier::new()
    };
    let mut controller = AlertController::new(
        Arc::new(RodioAudio::spawn()),
        Box::new(notifier),
        Box::new(TerminalModal::new()),
        Box::new(PresetConfirm::new(args.yes)),
        Some(Box::new(ChannelTransport::new(host_tx))),
    );
    controller.load_settings(&source);

    print_help();

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    loop {
        tokio::select! {
            maybe_push = push_rx.recv() => {
                match maybe_push {
                    Some((plugin, payload)) => controller.on_backend_message(&plugin, &payload),
                    None => break,
                }
            }
            maybe_line = lines.next_line() => {
                match maybe_line {
                    Ok(Some(line)) => {
                        if !handle_line(&mut controller, line.trim()).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("could not read input: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    // Make sure no replay ticket outlives the session.
    controller.close_alert();
}

/// Handle one line of operator input. Returns false to quit.
async fn handle_line(controller: &mut AlertController, line: &str) -> bool {
    match line {
        "" => {}
        "q" | "quit" | "exit" => return false,
        "help" => print_help(),
        "test" => controller.test_alert().await,
        "emergency" => controller.test_emergency_actions().await,
        "close" => controller.close_alert(),
        "dismiss" => controller.dismiss_data_timeout_warning(),
        raw if raw.starts_with('{') => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(payload) => controller.on_backend_message(PLUGIN_ID, &payload),
            Err(e) => tracing::warn!("not a valid JSON payload: {e}"),
        },
        other => tracing::warn!("unknown command {other:?}, try \"help\""),
    }
    true
}

fn print_help() {
    eprintln!("commands:");
    eprintln!("  test       ask the backend for a simulated temperature alert");
    eprintln!("  emergency  test the configured emergency actions (needs --yes)");
    eprintln!("  close      acknowledge the active alert");
    eprintln!("  dismiss    clear the data-timeout warning");
    eprintln!("  {{...}}      inject a raw push message as one JSON line");
    eprintln!("  quit       exit");
}

/// Loopback stand-in for the host backend: services the command channel
/// and publishes the push messages the real backend would send.
async fn run_host_stub(
    mut requests: mpsc::Receiver<HostRequest>,
    push: mpsc::Sender<(String, serde_json::Value)>,
    termination_mode: TerminationMode,
) {
    while let Some(request) = requests.recv().await {
        match request.command.as_str() {
            commands::TEST_ALERT => {
                tracing::info!("host stub: publishing simulated temperature alert");
                let alert = json!({
                    "type": "temperature_alert",
                    "sensor": "test",
                    "current_temp": 999,
                    "threshold": 250,
                    "message": "This is a test alert"
                });
                let _ = push.send((PLUGIN_ID.to_string(), alert)).await;
                let _ = request.respond_to.send(Ok(json!({ "success": true })));
            }
            commands::TEST_EMERGENCY_ACTIONS => {
                let reply = json!({
                    "mode": termination_mode.to_string(),
                    "message": "emergency actions simulated"
                });
                let _ = request.respond_to.send(Ok(reply));
            }
            other => {
                let _ = request
                    .respond_to
                    .send(Err(format!("unknown command: {other}")));
            }
        }
    }
}
