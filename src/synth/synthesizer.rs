//! Monophonic voice graph and MIDI note state machine
//!
//! Signal chain: oscillator + sub oscillator -> filter -> envelope -> master.
//! The LFO is added to both oscillators' frequency.
//!
//! Note priority is "last note wins" on press. On release, if other notes are
//! still held, pitch falls back to the highest of them without re-triggering
//! the envelope, so held legato lines keep their current ramp.

use crate::config::{PatchConfig, SynthConfig};

use super::context::EngineContext;
use super::envelope::Envelope;
use super::filter::Filter;
use super::lfo::Lfo;
use super::midi::{self, MidiError, MidiEvent};
use super::notes::NoteSet;
use super::oscillator::Oscillator;
use super::param::{ParamValue, ParameterChange};
use super::voice::Voice;
use super::waveform::Waveform;

/// Status line before any MIDI has arrived
pub const WAITING_STATUS: &str = "Waiting for midi";
pub const RECEIVING_STATUS: &str = "Receiving midi";

/// Snapshot for display by an external UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthStatus {
    pub status: String,
    pub message: String,
    pub active_notes: Vec<u8>,
}

/// The complete monophonic synthesizer
pub struct Synthesizer {
    context: EngineContext,
    oscillator: Oscillator,
    sub_oscillator: Oscillator,
    lfo: Lfo,
    filter: Filter,
    envelope: Envelope,

    active_notes: NoteSet,
    status: &'static str,
    message: String,
    midi_channel: Option<u8>,
    volume: f64,
    /// Frames rendered so far
    frame: u64,
}

impl Synthesizer {
    /// Create a synthesizer with the default patch, already started
    pub fn new(context: &EngineContext) -> Self {
        let mut synth = Self {
            context: *context,
            oscillator: Oscillator::new(context, Waveform::Sawtooth, 0),
            sub_oscillator: Oscillator::new(context, Waveform::Sine, 1),
            lfo: Lfo::new(context, Waveform::Sine),
            filter: Filter::new(context),
            envelope: Envelope::new(context),
            active_notes: NoteSet::new(),
            status: WAITING_STATUS,
            message: String::new(),
            midi_channel: None,
            volume: 1.0,
            frame: 0,
        };
        synth.start();
        synth
    }

    /// Create a synthesizer from configuration, already started
    pub fn from_config(config: &SynthConfig) -> Self {
        let context = EngineContext::new(config.audio.sample_rate as f64);
        let mut synth = Self::new(&context);
        synth.apply_patch(&config.patch);
        synth.set_volume(config.master.volume as f64);
        synth.set_midi_channel(config.midi.channel);
        synth
    }

    /// Load initial module settings
    pub fn apply_patch(&mut self, patch: &PatchConfig) {
        for (osc, cfg) in [
            (&mut self.oscillator, &patch.oscillator),
            (&mut self.sub_oscillator, &patch.sub_oscillator),
        ] {
            osc.set_waveform(cfg.waveform);
            osc.set_octave(cfg.octave);
            osc.set_level(cfg.level);
        }

        self.filter.set_type(patch.filter.filter_type);
        self.filter.set_cutoff(patch.filter.cutoff);
        self.filter.set_resonance(patch.filter.resonance);
        self.filter.set_gain_db(patch.filter.gain_db);

        let env = &patch.envelope;
        self.envelope
            .configure(env.attack, env.decay, env.sustain, env.release);

        self.lfo.set_waveform(patch.lfo.waveform);
        self.lfo.set_frequency(patch.lfo.frequency);
        self.lfo.set_level(patch.lfo.level);
    }

    /// Start the oscillators and LFO
    pub fn start(&mut self) {
        self.oscillator.start();
        self.sub_oscillator.start();
        self.lfo.start();
    }

    /// Stop all sound sources; output is silent until restarted
    pub fn stop(&mut self) {
        self.oscillator.stop();
        self.sub_oscillator.stop();
        self.lfo.stop();
        self.filter.reset();
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    pub fn sub_oscillator(&self) -> &Oscillator {
        &self.sub_oscillator
    }

    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Set master volume (0.0-1.0)
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Restrict MIDI input to a 1-based channel, or `None` for all
    pub fn set_midi_channel(&mut self, channel: Option<u8>) {
        self.midi_channel = channel;
    }

    /// Frames rendered so far; ramps are scheduled against this clock
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn active_notes(&self) -> NoteSet {
        self.active_notes
    }

    /// Description of the last MIDI event handled
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> SynthStatus {
        SynthStatus {
            status: self.status.to_string(),
            message: self.message.clone(),
            active_notes: self.active_notes.iter().collect(),
        }
    }

    /// Apply a resolved parameter change to its module
    pub fn apply(&mut self, change: ParameterChange) {
        match change {
            ParameterChange::Oscillator(param) => self.oscillator.change_parameter(param),
            ParameterChange::SubOscillator(param) => self.sub_oscillator.change_parameter(param),
            ParameterChange::Filter(param) => self.filter.change_parameter(param),
            ParameterChange::Envelope(param) => self.envelope.change_parameter(param),
            ParameterChange::Lfo(param) => self.lfo.change_parameter(param),
        }
    }

    /// Parse and apply a raw MIDI message, updating the status message
    pub fn handle_midi(&mut self, bytes: &[u8]) -> Result<Option<MidiEvent>, MidiError> {
        let channel = self.midi_channel;
        let event = midi::dispatch(bytes, channel, self)?;
        if let Some(event) = &event {
            self.status = RECEIVING_STATUS;
            self.message = event.to_string();
        }
        Ok(event)
    }

    /// Generate the next output sample
    pub fn process(&mut self) -> f64 {
        let modulation = self.lfo.process();
        let mixed =
            self.oscillator.generate(modulation) + self.sub_oscillator.generate(modulation);
        let filtered = self.filter.process(mixed);
        let gain = self.envelope.process(self.frame);
        self.frame += 1;

        filtered * gain * self.volume
    }

    /// Fill a buffer with samples
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

impl Voice for Synthesizer {
    fn note_on(&mut self, note: u8, velocity: Option<u8>) {
        let note = note.min(127);
        self.active_notes.insert(note);
        self.oscillator.play_note(note);
        self.sub_oscillator.play_note(note);

        if let Some(velocity) = velocity.filter(|&v| v > 0) {
            self.envelope.trigger_on(velocity.min(127), self.frame);
        }
    }

    fn note_off(&mut self, note: u8) {
        self.active_notes.remove(note.min(127));
        match self.active_notes.highest() {
            None => self.envelope.trigger_off(self.frame),
            Some(highest) => self.note_on(highest, None),
        }
    }

    fn all_notes_off(&mut self) {
        self.active_notes.clear();
        self.envelope.trigger_off(self.frame);
    }

    fn change_parameter(&mut self, destination: &str, parameter: &str, value: ParamValue<'_>) {
        if let Some(change) = ParameterChange::parse(destination, parameter, value) {
            self.apply(change);
        }
    }
}
