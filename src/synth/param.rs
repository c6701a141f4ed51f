//! Parameter routing
//!
//! Control surfaces address modules by name: `(destination, parameter, value)`.
//! Names are resolved here into typed, `Copy` changes so that nothing past
//! this point needs to look at strings. Unknown destinations, unknown
//! parameters and values of the wrong kind resolve to `None` and are dropped
//! without error.

use super::filter::FilterType;
use super::waveform::Waveform;

/// Map a MIDI velocity (0-127) to linear gain (0.0-1.0)
pub fn velocity_to_gain(velocity: f64) -> f64 {
    if velocity.is_nan() {
        return 0.0;
    }
    velocity.clamp(0.0, 127.0) / 127.0
}

/// Round and clamp an arbitrary number into the 0-127 MIDI range
pub fn clamp_midi(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 127.0) as u8
}

/// Raw value arriving from a control surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl ParamValue<'_> {
    /// Finite numeric value, parsing text if needed
    pub fn as_number(&self) -> Option<f64> {
        let n = match *self {
            ParamValue::Number(n) => n,
            ParamValue::Text(s) => s.trim().parse().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Text value, if any
    pub fn as_text(&self) -> Option<&str> {
        match *self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }
}

impl From<f64> for ParamValue<'_> {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i32> for ParamValue<'_> {
    fn from(value: i32) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl<'a> From<&'a str> for ParamValue<'a> {
    fn from(value: &'a str) -> Self {
        ParamValue::Text(value)
    }
}

/// Module a parameter change is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Oscillator,
    SubOscillator,
    Filter,
    Envelope,
    Lfo,
}

impl Destination {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "oscillator" => Some(Destination::Oscillator),
            "subOscillator" | "sub_oscillator" => Some(Destination::SubOscillator),
            "filter" => Some(Destination::Filter),
            "envelope" => Some(Destination::Envelope),
            "lfo" => Some(Destination::Lfo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OscillatorParam {
    /// Output level as a MIDI-style value (0-127)
    Level(f64),
    Type(Waveform),
    /// Base frequency in Hz
    Frequency(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterParam {
    Cutoff(f64),
    Resonance(f64),
    Type(FilterType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeParam {
    Attack(u8),
    Decay(u8),
    Sustain(u8),
    Release(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LfoParam {
    /// Modulation depth in Hz
    Level(f64),
    Frequency(f64),
}

/// A fully resolved parameter change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterChange {
    Oscillator(OscillatorParam),
    SubOscillator(OscillatorParam),
    Filter(FilterParam),
    Envelope(EnvelopeParam),
    Lfo(LfoParam),
}

impl ParameterChange {
    /// Resolve a named change. Returns `None` for anything unrecognized.
    pub fn parse(destination: &str, parameter: &str, value: ParamValue<'_>) -> Option<Self> {
        match Destination::from_name(destination)? {
            Destination::Oscillator => parse_oscillator(parameter, value).map(Self::Oscillator),
            Destination::SubOscillator => {
                parse_oscillator(parameter, value).map(Self::SubOscillator)
            }
            Destination::Filter => parse_filter(parameter, value).map(Self::Filter),
            Destination::Envelope => parse_envelope(parameter, value).map(Self::Envelope),
            Destination::Lfo => parse_lfo(parameter, value).map(Self::Lfo),
        }
    }

    pub fn destination(&self) -> Destination {
        match self {
            ParameterChange::Oscillator(_) => Destination::Oscillator,
            ParameterChange::SubOscillator(_) => Destination::SubOscillator,
            ParameterChange::Filter(_) => Destination::Filter,
            ParameterChange::Envelope(_) => Destination::Envelope,
            ParameterChange::Lfo(_) => Destination::Lfo,
        }
    }
}

fn parse_oscillator(parameter: &str, value: ParamValue<'_>) -> Option<OscillatorParam> {
    match parameter {
        "level" => Some(OscillatorParam::Level(value.as_number()?.clamp(0.0, 127.0))),
        "type" => value.as_text()?.parse().ok().map(OscillatorParam::Type),
        "frequency" => Some(OscillatorParam::Frequency(value.as_number()?)),
        _ => None,
    }
}

fn parse_filter(parameter: &str, value: ParamValue<'_>) -> Option<FilterParam> {
    match parameter {
        "cutoff" => Some(FilterParam::Cutoff(value.as_number()?)),
        "resonance" => Some(FilterParam::Resonance(value.as_number()?)),
        "type" => value.as_text()?.parse().ok().map(FilterParam::Type),
        _ => None,
    }
}

fn parse_envelope(parameter: &str, value: ParamValue<'_>) -> Option<EnvelopeParam> {
    let value = clamp_midi(value.as_number()?);
    match parameter {
        "attack" => Some(EnvelopeParam::Attack(value)),
        "decay" => Some(EnvelopeParam::Decay(value)),
        "sustain" => Some(EnvelopeParam::Sustain(value)),
        "release" => Some(EnvelopeParam::Release(value)),
        _ => None,
    }
}

fn parse_lfo(parameter: &str, value: ParamValue<'_>) -> Option<LfoParam> {
    match parameter {
        "level" => Some(LfoParam::Level(value.as_number()?)),
        "frequency" => Some(LfoParam::Frequency(value.as_number()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_to_gain() {
        assert_eq!(velocity_to_gain(0.0), 0.0);
        assert_eq!(velocity_to_gain(127.0), 1.0);
        assert_eq!(velocity_to_gain(200.0), 1.0);
        assert_eq!(velocity_to_gain(-5.0), 0.0);
        assert!(velocity_to_gain(64.0) > velocity_to_gain(63.0));
    }

    #[test]
    fn test_clamp_midi() {
        assert_eq!(clamp_midi(64.4), 64);
        assert_eq!(clamp_midi(300.0), 127);
        assert_eq!(clamp_midi(-3.0), 0);
        assert_eq!(clamp_midi(f64::NAN), 0);
    }

    #[test]
    fn test_parse_known_parameters() {
        assert_eq!(
            ParameterChange::parse("filter", "cutoff", 800.0.into()),
            Some(ParameterChange::Filter(FilterParam::Cutoff(800.0)))
        );
        assert_eq!(
            ParameterChange::parse("subOscillator", "type", "square".into()),
            Some(ParameterChange::SubOscillator(OscillatorParam::Type(Waveform::Square)))
        );
        assert_eq!(
            ParameterChange::parse("envelope", "release", 500.0.into()),
            Some(ParameterChange::Envelope(EnvelopeParam::Release(127)))
        );
        assert_eq!(
            ParameterChange::parse("lfo", "frequency", "5.5".into()),
            Some(ParameterChange::Lfo(LfoParam::Frequency(5.5)))
        );
    }

    #[test]
    fn test_parse_unknown_is_none() {
        assert_eq!(ParameterChange::parse("filter", "bogus", 5.0.into()), None);
        assert_eq!(ParameterChange::parse("reverb", "mix", 5.0.into()), None);
        assert_eq!(ParameterChange::parse("oscillator", "type", 3.0.into()), None);
        assert_eq!(ParameterChange::parse("oscillator", "type", "noise".into()), None);
        assert_eq!(ParameterChange::parse("lfo", "type", "sine".into()), None);
        assert_eq!(ParameterChange::parse("lfo", "level", f64::NAN.into()), None);
    }

    #[test]
    fn test_oscillator_level_is_clamped() {
        assert_eq!(
            ParameterChange::parse("oscillator", "level", 400.0.into()),
            Some(ParameterChange::Oscillator(OscillatorParam::Level(127.0)))
        );
    }
}
