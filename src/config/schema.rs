//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::synth::{FilterType, Waveform};

/// Main configuration for monosynth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Master output settings
    #[serde(default)]
    pub master: MasterConfig,

    /// MIDI input settings
    #[serde(default)]
    pub midi: MidiConfig,

    /// Initial patch
    #[serde(default)]
    pub patch: PatchConfig,
}

impl SynthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate audio settings
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }
        if self.audio.command_capacity < 16 || self.audio.command_capacity > 65536 {
            bail!("Command capacity must be between 16 and 65536");
        }

        // Validate master settings
        if !(0.0..=1.0).contains(&self.master.volume) {
            bail!("Master volume must be between 0.0 and 1.0");
        }

        if let Some(channel) = self.midi.channel {
            if !(1..=16).contains(&channel) {
                bail!("MIDI channel must be between 1 and 16");
            }
        }

        self.patch.validate()
    }
}

/// Audio output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in frames (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,

    /// Slots in the control-to-audio command queue (default: 1024)
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }
fn default_command_capacity() -> usize { 1024 }

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
            command_capacity: default_command_capacity(),
        }
    }
}

/// Master settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Master volume 0.0-1.0 (default: 0.5)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 { 0.5 }

impl Default for MasterConfig {
    fn default() -> Self {
        Self { volume: default_volume() }
    }
}

/// MIDI input settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MidiConfig {
    /// Input port name or substring (None = first available port)
    #[serde(default)]
    pub port: Option<String>,

    /// Channel 1-16 to listen on (None = all channels)
    #[serde(default)]
    pub channel: Option<u8>,
}

/// Initial module settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConfig {
    #[serde(default)]
    pub oscillator: OscillatorConfig,

    #[serde(default = "OscillatorConfig::sub")]
    pub sub_oscillator: OscillatorConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub envelope: EnvelopeConfig,

    #[serde(default)]
    pub lfo: LfoConfig,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            oscillator: OscillatorConfig::default(),
            sub_oscillator: OscillatorConfig::sub(),
            filter: FilterConfig::default(),
            envelope: EnvelopeConfig::default(),
            lfo: LfoConfig::default(),
        }
    }
}

impl PatchConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, osc) in [("oscillator", &self.oscillator), ("sub_oscillator", &self.sub_oscillator)] {
            if !(0.0..=127.0).contains(&osc.level) {
                bail!("{} level must be between 0 and 127", name);
            }
        }

        let filter = &self.filter;
        if !filter.cutoff.is_finite() || filter.cutoff <= 0.0 {
            bail!("Filter cutoff must be a positive frequency");
        }
        if !filter.resonance.is_finite() || filter.resonance <= 0.0 {
            bail!("Filter resonance must be positive");
        }
        if !filter.gain_db.is_finite() {
            bail!("Filter gain must be finite");
        }

        let env = &self.envelope;
        for (name, value) in [
            ("attack", env.attack),
            ("decay", env.decay),
            ("sustain", env.sustain),
            ("release", env.release),
        ] {
            if value > 127 {
                bail!("Envelope {} must be between 0 and 127", name);
            }
        }

        if !self.lfo.frequency.is_finite() || self.lfo.frequency <= 0.0 {
            bail!("LFO frequency must be positive");
        }
        if !self.lfo.level.is_finite() {
            bail!("LFO level must be finite");
        }

        Ok(())
    }
}

/// Oscillator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorConfig {
    pub waveform: Waveform,
    /// Octave offset; 0 plays at concert pitch, n divides by 2n
    pub octave: i32,
    /// Output level 0-127
    pub level: f64,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sawtooth,
            octave: 0,
            level: 127.0,
        }
    }
}

impl OscillatorConfig {
    /// Sub oscillator defaults: sine, octave offset 1
    pub fn sub() -> Self {
        Self {
            waveform: Waveform::Sine,
            octave: 1,
            level: 127.0,
        }
    }
}

/// Filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub cutoff: f64,
    pub resonance: f64,
    /// Shelf/peaking gain in dB
    pub gain_db: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_type: FilterType::LowPass,
            cutoff: 20000.0,
            resonance: 1.0,
            gain_db: 0.0,
        }
    }
}

/// Envelope settings, each 0-127
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub attack: u8,
    pub decay: u8,
    pub sustain: u8,
    pub release: u8,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0,
            decay: 127,
            sustain: 127,
            release: 0,
        }
    }
}

/// LFO settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LfoConfig {
    pub waveform: Waveform,
    /// Rate in Hz
    pub frequency: f64,
    /// Pitch modulation depth in Hz
    pub level: f64,
}

impl Default for LfoConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency: 3.0,
            level: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_audio_config() {
        let yaml = "sample_rate: 48000";
        let config: AudioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 512); // default
        assert_eq!(config.command_capacity, 1024);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SynthConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SynthConfig::default());
        assert_eq!(config.patch.oscillator.waveform, Waveform::Sawtooth);
        assert_eq!(config.patch.sub_oscillator.waveform, Waveform::Sine);
        assert_eq!(config.patch.sub_oscillator.octave, 1);
        assert_eq!(config.patch.filter.cutoff, 20000.0);
        assert_eq!(config.patch.envelope.decay, 127);
        assert_eq!(config.patch.lfo.frequency, 3.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_patch_config() {
        let yaml = r#"
oscillator:
  waveform: square
  level: 100
filter:
  type: highpass
  cutoff: 800
envelope:
  attack: 10
  release: 64
lfo:
  level: 5
"#;
        let patch: PatchConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(patch.oscillator.waveform, Waveform::Square);
        assert_eq!(patch.oscillator.level, 100.0);
        assert_eq!(patch.filter.filter_type, FilterType::HighPass);
        assert_eq!(patch.filter.resonance, 1.0);
        assert_eq!(patch.envelope.attack, 10);
        assert_eq!(patch.envelope.decay, 127);
        assert_eq!(patch.lfo.level, 5.0);
        assert_eq!(patch.sub_oscillator, OscillatorConfig::sub());
    }

    #[test]
    fn test_unknown_waveform_rejected() {
        let yaml = "waveform: noise";
        assert!(serde_yaml::from_str::<OscillatorConfig>(yaml).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SynthConfig::default();
        config.master.volume = 1.5;
        assert!(config.validate().is_err());

        let mut config = SynthConfig::default();
        config.midi.channel = Some(17);
        assert!(config.validate().is_err());

        let mut config = SynthConfig::default();
        config.patch.envelope.sustain = 200;
        assert!(config.validate().is_err());

        let mut config = SynthConfig::default();
        config.patch.filter.cutoff = 0.0;
        assert!(config.validate().is_err());

        let mut config = SynthConfig::default();
        config.audio.sample_rate = 4000;
        assert!(config.validate().is_err());
    }
}
