//! Audible oscillator with octave transposition and output level

use super::context::EngineContext;
use super::param::{velocity_to_gain, OscillatorParam};
use super::waveform::{Phase, Waveform};

/// Reference pitch: A4 = MIDI note 69
const A4_FREQUENCY: f64 = 440.0;
const A4_NOTE: f64 = 69.0;

/// Frequency of a MIDI note for a given octave offset.
///
/// An offset of 0 is unity. Any other offset divides the equal-tempered
/// frequency by `2 * octave`.
pub fn note_to_frequency(note: f64, octave: i32) -> f64 {
    let divider = if octave != 0 { octave as f64 * 2.0 } else { 1.0 };
    A4_FREQUENCY * 2f64.powf((note - A4_NOTE) / 12.0) / divider
}

/// A periodic oscillator that generates band-limited waveforms
pub struct Oscillator {
    waveform: Waveform,
    octave: i32,
    phase: Phase,
    frequency: f64,
    /// Linear output gain (0.0-1.0)
    level: f64,
    sample_rate: f64,
    nyquist: f64,
    running: bool,
}

impl Oscillator {
    /// Create a new oscillator at 440 Hz and full level. It does not sound
    /// until [`start`](Self::start) is called.
    pub fn new(context: &EngineContext, waveform: Waveform, octave: i32) -> Self {
        Self {
            waveform,
            octave,
            phase: Phase::default(),
            frequency: A4_FREQUENCY,
            level: 1.0,
            sample_rate: context.sample_rate(),
            nyquist: context.nyquist(),
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop the oscillator; subsequent samples are silent
    pub fn stop(&mut self) {
        self.running = false;
        self.phase.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set the frequency directly. Stored as given; `generate` limits the
    /// effective pitch to Nyquist.
    pub fn set_frequency(&mut self, frequency: f64) {
        if frequency.is_finite() {
            self.frequency = frequency;
        }
    }

    /// Get the current base frequency (before modulation)
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set the octave offset used by [`note_to_frequency`](Self::note_to_frequency)
    pub fn set_octave(&mut self, octave: i32) {
        self.octave = octave;
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Set the output level from a MIDI-style value (0-127)
    pub fn set_level(&mut self, velocity: f64) {
        self.level = velocity_to_gain(velocity);
    }

    /// Linear output gain
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Frequency of `note` at this oscillator's octave offset
    pub fn note_to_frequency(&self, note: u8) -> f64 {
        note_to_frequency(note as f64, self.octave)
    }

    /// Jump to the pitch of `note` with no glide
    pub fn play_note(&mut self, note: u8) {
        self.set_frequency(self.note_to_frequency(note));
    }

    pub fn change_parameter(&mut self, param: OscillatorParam) {
        match param {
            OscillatorParam::Level(value) => self.set_level(value),
            OscillatorParam::Type(waveform) => self.set_waveform(waveform),
            OscillatorParam::Frequency(hz) => self.set_frequency(hz),
        }
    }

    /// Generate the next sample, with `modulation` Hz added to the base frequency
    pub fn generate(&mut self, modulation: f64) -> f64 {
        if !self.running {
            return 0.0;
        }

        let frequency = (self.frequency + modulation).clamp(-self.nyquist, self.nyquist);
        let increment = frequency / self.sample_rate;
        let sample = self.waveform.band_limited(self.phase.get(), increment);
        self.phase.advance(increment);

        sample * self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(waveform: Waveform, octave: i32, sample_rate: f64) -> Oscillator {
        let ctx = EngineContext::new(sample_rate);
        let mut osc = Oscillator::new(&ctx, waveform, octave);
        osc.start();
        osc
    }

    #[test]
    fn test_reference_pitch() {
        assert_eq!(note_to_frequency(69.0, 0), 440.0);
        assert_eq!(note_to_frequency(81.0, 0), 880.0);
        assert_eq!(note_to_frequency(57.0, 0), 220.0);
    }

    #[test]
    fn test_octave_divides_frequency() {
        for octave in [1, 2, 3, -1] {
            for note in [0.0, 45.0, 60.0, 69.0, 127.0] {
                let expected = note_to_frequency(note, 0) / (2.0 * octave as f64);
                assert_eq!(note_to_frequency(note, octave), expected);
            }
        }
    }

    #[test]
    fn test_play_note_jumps_immediately() {
        let mut osc = started(Waveform::Sawtooth, 0, 44100.0);
        osc.play_note(81);
        assert_eq!(osc.frequency(), 880.0);

        osc.set_octave(1);
        osc.play_note(81);
        assert_eq!(osc.frequency(), 440.0);
    }

    #[test]
    fn test_sine_oscillator() {
        let mut osc = started(Waveform::Sine, 0, 44100.0);

        // First sample should be 0 (sin(0))
        let sample = osc.generate(0.0);
        assert!((sample - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_square_oscillator() {
        let mut osc = started(Waveform::Square, 0, 400.0);
        osc.set_frequency(1.0);

        // Far from the edges the band-limited square is the plain square
        let samples: Vec<f64> = (0..400).map(|_| osc.generate(0.0)).collect();
        assert_eq!(samples[100], 1.0);
        assert_eq!(samples[300], -1.0);
    }

    #[test]
    fn test_output_range_all_waveforms() {
        for waveform in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
            let mut osc = started(waveform, 0, 44100.0);
            osc.play_note(60);
            for _ in 0..2000 {
                let sample = osc.generate(0.0);
                assert!((-1.0..=1.0).contains(&sample), "{waveform}: {sample}");
            }
        }
    }

    #[test]
    fn test_level_scales_output() {
        let mut osc = started(Waveform::Square, 0, 400.0);
        osc.set_frequency(1.0);
        osc.set_level(63.5);
        let sample = osc.generate(0.0);
        assert!(sample.abs() <= 0.5 + 1e-9);

        osc.set_level(0.0);
        assert_eq!(osc.generate(0.0), 0.0);
    }

    #[test]
    fn test_stopped_oscillator_is_silent() {
        let ctx = EngineContext::new(44100.0);
        let mut osc = Oscillator::new(&ctx, Waveform::Square, 0);
        assert!(!osc.is_running());
        assert_eq!(osc.generate(0.0), 0.0);

        osc.start();
        osc.generate(0.0);
        osc.stop();
        assert_eq!(osc.generate(0.0), 0.0);
    }

    #[test]
    fn test_change_parameter() {
        let mut osc = started(Waveform::Sawtooth, 0, 44100.0);

        osc.change_parameter(OscillatorParam::Type(Waveform::Triangle));
        assert_eq!(osc.waveform(), Waveform::Triangle);

        osc.change_parameter(OscillatorParam::Frequency(220.0));
        assert_eq!(osc.frequency(), 220.0);

        osc.change_parameter(OscillatorParam::Level(127.0));
        assert_eq!(osc.level(), 1.0);
    }

    #[test]
    fn test_frequency_above_nyquist_keeps_output_bounded() {
        let mut osc = started(Waveform::Sawtooth, 0, 44100.0);
        osc.set_frequency(100_000.0);
        assert_eq!(osc.frequency(), 100_000.0);
        for _ in 0..1000 {
            let s = osc.generate(0.0);
            assert!(s.is_finite() && (-1.0..=1.0).contains(&s), "sample {} out of range", s);
        }

        osc.set_frequency(f64::NAN);
        assert_eq!(osc.frequency(), 100_000.0);
    }

    #[test]
    fn test_high_note_keeps_its_pitch_at_low_sample_rate() {
        let mut main = started(Waveform::Sawtooth, 0, 8000.0);
        let mut sub = started(Waveform::Sine, 1, 8000.0);
        main.play_note(110);
        sub.play_note(110);

        assert_eq!(main.frequency(), main.note_to_frequency(110));
        assert_eq!(sub.frequency(), sub.note_to_frequency(110));
        assert!(main.frequency() > 4000.0);
        assert_ne!(main.frequency(), sub.frequency());
    }
}
