//! ADSR envelope generator
//!
//! Attack-Decay-Sustain-Release gain envelope. Stage parameters use the MIDI
//! 0-127 range: attack, decay and release scale to 0-5 seconds, sustain to a
//! fraction of the peak gain. All curves are linear in the gain domain.

use super::context::EngineContext;
use super::param::{velocity_to_gain, EnvelopeParam};
use super::ramp::Automation;

/// Length of a stage parameter at 127
const MAX_STAGE_SECONDS: f64 = 5.0;

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR envelope generator
pub struct Envelope {
    context: EngineContext,

    attack: u8,
    decay: u8,
    sustain: u8,
    release: u8,

    gain: Automation,
    gate: bool,
    peak: f64,
    attack_end: u64,
    decay_end: Option<u64>,
}

impl Envelope {
    /// Create a new envelope: instant attack, no decay, full sustain, instant release
    pub fn new(context: &EngineContext) -> Self {
        Self {
            context: *context,
            attack: 0,
            decay: 127,
            sustain: 127,
            release: 0,
            gain: Automation::new(0.0),
            gate: false,
            peak: 0.0,
            attack_end: 0,
            decay_end: None,
        }
    }

    pub fn set_attack(&mut self, value: u8) {
        self.attack = value.min(127);
    }

    pub fn set_decay(&mut self, value: u8) {
        self.decay = value.min(127);
    }

    pub fn set_sustain(&mut self, value: u8) {
        self.sustain = value.min(127);
    }

    pub fn set_release(&mut self, value: u8) {
        self.release = value.min(127);
    }

    /// Configure all ADSR parameters at once
    pub fn configure(&mut self, attack: u8, decay: u8, sustain: u8, release: u8) {
        self.set_attack(attack);
        self.set_decay(decay);
        self.set_sustain(sustain);
        self.set_release(release);
    }

    pub fn attack(&self) -> u8 {
        self.attack
    }

    pub fn decay(&self) -> u8 {
        self.decay
    }

    pub fn sustain(&self) -> u8 {
        self.sustain
    }

    pub fn release(&self) -> u8 {
        self.release
    }

    pub fn change_parameter(&mut self, param: EnvelopeParam) {
        match param {
            EnvelopeParam::Attack(value) => self.set_attack(value),
            EnvelopeParam::Decay(value) => self.set_decay(value),
            EnvelopeParam::Sustain(value) => self.set_sustain(value),
            EnvelopeParam::Release(value) => self.set_release(value),
        }
    }

    fn stage_frames(&self, value: u8) -> u64 {
        self.context
            .seconds_to_frames(value as f64 / 127.0 * MAX_STAGE_SECONDS)
    }

    /// Start the attack (and decay) ramps at frame `now`.
    ///
    /// Any in-flight ramp is dropped and the gain restarts from zero. With
    /// decay at 127 the gain holds at peak until [`trigger_off`](Self::trigger_off).
    pub fn trigger_on(&mut self, velocity: u8, now: u64) {
        let peak = velocity_to_gain(velocity as f64);
        let attack_end = now + self.stage_frames(self.attack);

        self.gain.cancel_and_hold(now);
        self.gain.set_value_at(0.0, now);
        self.gain.linear_ramp_to(peak, attack_end, now);

        self.decay_end = if self.decay < 127 {
            let decay_end = attack_end + self.stage_frames(self.decay);
            let sustain_level = self.sustain as f64 / 127.0 * peak;
            self.gain.linear_ramp_to(sustain_level, decay_end, now);
            Some(decay_end)
        } else {
            None
        };

        self.peak = peak;
        self.attack_end = attack_end;
        self.gate = true;
    }

    /// Ramp from the gain current at `now` down to zero over the release time
    pub fn trigger_off(&mut self, now: u64) {
        self.gain.cancel_and_hold(now);
        let release_end = now + self.stage_frames(self.release);
        self.gain.linear_ramp_to(0.0, release_end, now);
        self.gate = false;
    }

    /// Gain at `frame` without advancing
    pub fn gain_at(&self, frame: u64) -> f64 {
        self.gain.value_at(frame)
    }

    /// Peak gain of the most recent trigger
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Stage the envelope is in at `frame`
    pub fn stage(&self, frame: u64) -> EnvelopeStage {
        if self.gate {
            if frame < self.attack_end {
                EnvelopeStage::Attack
            } else if self.decay_end.is_some_and(|end| frame < end) {
                EnvelopeStage::Decay
            } else {
                EnvelopeStage::Sustain
            }
        } else if self.gain.value_at(frame) > 0.0 {
            EnvelopeStage::Release
        } else {
            EnvelopeStage::Idle
        }
    }

    /// Check if the envelope is producing gain at `frame`
    pub fn is_active(&self, frame: u64) -> bool {
        self.stage(frame) != EnvelopeStage::Idle
    }

    /// Gain for `frame`, retiring finished ramps
    pub fn process(&mut self, frame: u64) -> f64 {
        let gain = self.gain.value_at(frame);
        self.gain.advance(frame);
        gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 1000.0;

    fn envelope() -> Envelope {
        Envelope::new(&EngineContext::new(SR))
    }

    #[test]
    fn test_envelope_creation() {
        let env = envelope();
        assert_eq!(env.stage(0), EnvelopeStage::Idle);
        assert_eq!(env.gain_at(0), 0.0);
        assert!(!env.is_active(0));
        assert_eq!((env.attack(), env.decay(), env.sustain(), env.release()), (0, 127, 127, 0));
    }

    #[test]
    fn test_instant_attack_without_decay_holds_peak() {
        let mut env = envelope();
        env.trigger_on(100, 0);

        let peak = 100.0 / 127.0;
        assert_eq!(env.gain_at(0), peak);
        for frame in 0..10_000 {
            assert_eq!(env.process(frame), peak);
        }
        assert_eq!(env.stage(10_000), EnvelopeStage::Sustain);

        env.trigger_off(10_000);
        assert_eq!(env.gain_at(10_000), 0.0);
        assert_eq!(env.stage(10_000), EnvelopeStage::Idle);
    }

    #[test]
    fn test_attack_ramps_linearly_to_peak() {
        let mut env = envelope();
        env.set_attack(127); // 5 seconds
        env.trigger_on(127, 0);

        assert_eq!(env.stage(0), EnvelopeStage::Attack);
        assert_eq!(env.gain_at(0), 0.0);
        assert!((env.gain_at(2500) - 0.5).abs() < 1e-9);
        assert_eq!(env.gain_at(5000), 1.0);
        assert_eq!(env.stage(5000), EnvelopeStage::Sustain);
    }

    #[test]
    fn test_decay_to_sustain_fraction_of_peak() {
        let mut env = envelope();
        env.configure(0, 127 / 5, 64, 0); // just under one second of decay
        env.trigger_on(127, 0);

        let decay_frames = (25.0 / 127.0 * 5.0 * SR).round() as u64;
        assert_eq!(env.stage(1), EnvelopeStage::Decay);
        assert_eq!(env.stage(decay_frames), EnvelopeStage::Sustain);

        let sustain = 64.0 / 127.0;
        assert!((env.gain_at(decay_frames) - sustain).abs() < 1e-9);
        assert!((env.gain_at(decay_frames * 10) - sustain).abs() < 1e-9);
    }

    #[test]
    fn test_sustain_scales_with_velocity() {
        let mut env = envelope();
        env.configure(0, 0, 64, 0);
        env.trigger_on(64, 0);

        let expected = 64.0 / 127.0 * (64.0 / 127.0);
        assert!((env.gain_at(100) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_release_mid_attack_starts_from_current_gain() {
        let mut env = envelope();
        env.configure(127, 127, 127, 127);
        env.trigger_on(127, 0);

        // One second into a five second attack
        let now = 1000;
        let current = env.gain_at(now);
        assert!((current - 0.2).abs() < 1e-9);

        env.trigger_off(now);
        assert_eq!(env.stage(now), EnvelopeStage::Release);
        assert!((env.gain_at(now) - current).abs() < 1e-12);
        assert!(env.gain_at(now) < env.peak());

        // Halfway through the five second release
        assert!((env.gain_at(now + 2500) - current / 2.0).abs() < 1e-9);
        assert_eq!(env.gain_at(now + 5000), 0.0);
        assert_eq!(env.stage(now + 5000), EnvelopeStage::Idle);
    }

    #[test]
    fn test_release_is_monotonic() {
        let mut env = envelope();
        env.configure(0, 127, 127, 20);
        env.trigger_on(90, 0);
        env.trigger_off(10);

        let mut last = env.process(10);
        for frame in 11..2000 {
            let gain = env.process(frame);
            assert!(gain <= last);
            assert!(gain >= 0.0);
            last = gain;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_retrigger_cancels_release() {
        let mut env = envelope();
        env.configure(0, 127, 127, 127);
        env.trigger_on(127, 0);
        env.trigger_off(100);
        assert_eq!(env.stage(200), EnvelopeStage::Release);

        env.trigger_on(127, 200);
        assert_eq!(env.gain_at(200), 1.0);
        assert_eq!(env.gain_at(20_000), 1.0);
    }

    #[test]
    fn test_change_parameter() {
        let mut env = envelope();
        env.change_parameter(EnvelopeParam::Attack(10));
        env.change_parameter(EnvelopeParam::Decay(20));
        env.change_parameter(EnvelopeParam::Sustain(30));
        env.change_parameter(EnvelopeParam::Release(40));
        assert_eq!((env.attack(), env.decay(), env.sustain(), env.release()), (10, 20, 30, 40));
    }
}
