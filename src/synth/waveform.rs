//! Periodic waveform shapes shared by oscillators and LFOs

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Returned when a waveform name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown waveform '{0}'")]
pub struct ParseWaveformError(pub String);

impl Waveform {
    /// Naive shape at `phase` in [0, 1). Output is in [-1, 1].
    pub fn naive(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (phase * 2.0 * PI).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
        }
    }

    /// Shape at `phase` with PolyBLEP correction on the hard edges.
    ///
    /// `increment` is the per-sample phase step; its magnitude sets the
    /// width of the correction window.
    pub fn band_limited(self, phase: f64, increment: f64) -> f64 {
        let dt = increment.abs().min(0.5);
        match self {
            Waveform::Sawtooth => self.naive(phase) - poly_blep(phase, dt),
            Waveform::Square => {
                self.naive(phase) + poly_blep(phase, dt) - poly_blep((phase + 0.5) % 1.0, dt)
            }
            Waveform::Sine | Waveform::Triangle => self.naive(phase),
        }
    }

    /// Name as accepted by [`FromStr`]
    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

/// Polynomial band-limited step residual for a discontinuity at phase 0
fn poly_blep(t: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            other => Err(ParseWaveformError(other.to_string())),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running phase accumulator in [0, 1)
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Phase(f64);

impl Phase {
    pub fn get(self) -> f64 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0.0;
    }

    /// Advance by `increment` cycles, wrapping in either direction
    pub fn advance(&mut self, increment: f64) {
        if increment.is_finite() {
            self.0 = (self.0 + increment).rem_euclid(1.0);
        }
    }
}
