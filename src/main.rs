//! monosynth - Monophonic MIDI synthesizer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use monosynth::config;
use monosynth::engine::{self, Engine, MidiListener, Player};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

const STATUS_INTERVAL: Duration = Duration::from_millis(200);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config: config_path,
            port,
            device,
        } => {
            let mut cfg = config::load_config(&config_path)?;

            let device = device.or_else(|| cfg.audio.device.clone());
            let mut player = Player::open(device.as_deref())?;
            if player.sample_rate() != cfg.audio.sample_rate {
                info!(
                    configured = cfg.audio.sample_rate,
                    device = player.sample_rate(),
                    "using the output device's sample rate"
                );
                cfg.audio.sample_rate = player.sample_rate();
            }

            let (controller, renderer) = Engine::new(&cfg).split();
            let board = controller.status_board();

            let port = port.or_else(|| cfg.midi.port.clone());
            let listener = MidiListener::connect(port.as_deref(), controller)?;
            player.start(renderer)?;

            println!("Playing from {} on {}", listener.port_name(), player.device_name());
            println!("  Sample rate: {} Hz", player.sample_rate());
            println!("  Master volume: {:.0}%", cfg.master.volume * 100.0);
            println!("Press Ctrl-C to stop.\n");

            let running = Arc::new(AtomicBool::new(true));
            let handler_flag = running.clone();
            ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

            let mut last_status = None;
            while running.load(Ordering::SeqCst) {
                let status = board.snapshot();
                if last_status.as_ref() != Some(&status) {
                    println!(
                        "{} | {} | notes: {:?}",
                        status.status, status.message, status.active_notes
                    );
                    last_status = Some(status);
                }
                std::thread::sleep(STATUS_INTERVAL);
            }

            player.stop();
            let controller = listener.close();
            if controller.dropped() > 0 {
                warn!(dropped = controller.dropped(), "commands were dropped during playback");
            }
            println!("\nStopped.");
        }

        Commands::Render {
            config: config_path,
            score,
            output,
        } => {
            let cfg = config::load_config(&config_path)?;
            let score = config::load_score(&score)?;

            println!("Rendering {:.2}s to {:?}...", score.duration(), output);
            let summary = engine::render_score(&cfg, &score, &output)?;
            println!(
                "Rendered {} events, {:.2}s ({} frames), peak {:.3}",
                summary.events, summary.seconds, summary.frames, summary.peak
            );
        }

        Commands::Devices => {
            println!("Audio output devices:");
            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (none)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }

            println!("\nMIDI input ports:");
            match engine::list_input_ports() {
                Ok(ports) if ports.is_empty() => println!("  (none)"),
                Ok(ports) => {
                    for port in ports {
                        println!("  - {}", port);
                    }
                }
                Err(e) => println!("  Error listing ports: {}", e),
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    let patch = &cfg.patch;
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Command queue: {}", cfg.audio.command_capacity);
                    println!("  Master volume: {:.0}%", cfg.master.volume * 100.0);
                    match cfg.midi.channel {
                        Some(channel) => println!("  MIDI channel: {}", channel),
                        None => println!("  MIDI channel: all"),
                    }
                    println!(
                        "  Oscillator: {} (octave {}, level {})",
                        patch.oscillator.waveform, patch.oscillator.octave, patch.oscillator.level
                    );
                    println!(
                        "  Sub oscillator: {} (octave {}, level {})",
                        patch.sub_oscillator.waveform,
                        patch.sub_oscillator.octave,
                        patch.sub_oscillator.level
                    );
                    println!(
                        "  Filter: {} at {} Hz, Q {}",
                        patch.filter.filter_type, patch.filter.cutoff, patch.filter.resonance
                    );
                    println!(
                        "  Envelope: A {} D {} S {} R {}",
                        patch.envelope.attack,
                        patch.envelope.decay,
                        patch.envelope.sustain,
                        patch.envelope.release
                    );
                    println!(
                        "  LFO: {} at {} Hz, depth {} Hz",
                        patch.lfo.waveform, patch.lfo.frequency, patch.lfo.level
                    );
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../monosynth.example.yaml");

            let path = "monosynth.yaml";
            if std::path::Path::new(path).exists() {
                println!("monosynth.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created monosynth.yaml with example configuration.");
            }
        }
    }

    Ok(())
}
