//! Low Frequency Oscillator for pitch modulation
//!
//! The LFO is free-running: it starts with the synthesizer and is never
//! re-triggered by notes, so vibrato stays continuous across note changes.
//! Its output is in Hz and is added to the oscillators' base frequency.

use super::context::EngineContext;
use super::param::LfoParam;
use super::waveform::{Phase, Waveform};

const DEFAULT_FREQUENCY: f64 = 3.0;

/// Low Frequency Oscillator
pub struct Lfo {
    waveform: Waveform,
    frequency: f64,
    phase: Phase,
    sample_rate: f64,
    /// Modulation depth in Hz
    level: f64,
    running: bool,
}

impl Lfo {
    /// Create a new LFO at 3 Hz with zero depth
    pub fn new(context: &EngineContext, waveform: Waveform) -> Self {
        Self {
            waveform,
            frequency: DEFAULT_FREQUENCY,
            phase: Phase::default(),
            sample_rate: context.sample_rate(),
            level: 0.0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.phase.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set LFO frequency in Hz
    pub fn set_frequency(&mut self, hz: f64) {
        if hz.is_finite() {
            self.frequency = hz.clamp(0.01, 100.0);
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Set modulation depth in Hz
    pub fn set_level(&mut self, level: f64) {
        if level.is_finite() {
            self.level = level;
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn change_parameter(&mut self, param: LfoParam) {
        match param {
            LfoParam::Level(level) => self.set_level(level),
            LfoParam::Frequency(hz) => self.set_frequency(hz),
        }
    }

    /// Generate next modulation value (-level to +level, in Hz)
    pub fn process(&mut self) -> f64 {
        if !self.running {
            return 0.0;
        }

        let raw = self.waveform.naive(self.phase.get());
        self.phase.advance(self.frequency / self.sample_rate);

        raw * self.level
    }
}
