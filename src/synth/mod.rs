//! Synthesis modules and the monophonic voice graph
//!
//! Contains the oscillators, LFO, filter, envelope, parameter routing and
//! MIDI handling that make up a [`Synthesizer`].

mod context;
mod envelope;
mod filter;
mod lfo;
pub mod midi;
mod notes;
mod oscillator;
mod param;
mod ramp;
mod synthesizer;
mod voice;
mod waveform;

pub use context::EngineContext;
pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{Filter, FilterType, ParseFilterTypeError};
pub use lfo::Lfo;
pub use midi::{MidiError, MidiEvent, MidiEventKind};
pub use notes::NoteSet;
pub use oscillator::{note_to_frequency, Oscillator};
pub use param::{
    clamp_midi, velocity_to_gain, Destination, EnvelopeParam, FilterParam, LfoParam,
    OscillatorParam, ParamValue, ParameterChange,
};
pub use ramp::{Automation, Segment};
pub use synthesizer::{SynthStatus, Synthesizer, RECEIVING_STATUS, WAITING_STATUS};
pub use voice::Voice;
pub use waveform::{ParseWaveformError, Waveform};
