//! monosynth - Monophonic MIDI synthesizer engine
//!
//! A sawtooth oscillator and a sine sub-oscillator, an LFO on pitch, a
//! biquad filter and an ADSR envelope, played by last-note-priority MIDI.
//! Control input and audio rendering run on separate threads joined by a
//! lock-free command queue.

pub mod config;
pub mod engine;
pub mod synth;

pub use config::SynthConfig;
pub use engine::{Controller, Engine, Renderer};
pub use synth::Synthesizer;
