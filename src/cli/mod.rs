//! CLI interface for monosynth

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Monophonic MIDI synthesizer
#[derive(Parser)]
#[command(name = "monosynth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play in real time from a MIDI input port
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "monosynth.yaml")]
        config: PathBuf,

        /// MIDI input port name (substring match); overrides the config
        #[arg(short, long)]
        port: Option<String>,

        /// Audio output device name (substring match); overrides the config
        #[arg(short, long)]
        device: Option<String>,
    },

    /// Render a score to a WAV file
    Render {
        /// Configuration file path
        #[arg(short, long, default_value = "monosynth.yaml")]
        config: PathBuf,

        /// Score file path (YAML or JSON)
        #[arg(short, long)]
        score: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List audio output devices and MIDI input ports
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "monosynth.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::parse_from([
            "monosynth", "render", "--score", "demo.yaml", "--output", "out.wav",
        ]);
        match cli.command {
            Commands::Render {
                config,
                score,
                output,
            } => {
                assert_eq!(config, PathBuf::from("monosynth.yaml"));
                assert_eq!(score, PathBuf::from("demo.yaml"));
                assert_eq!(output, PathBuf::from("out.wav"));
            }
            _ => panic!("expected render"),
        }
    }
}
