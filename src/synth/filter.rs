//! Biquad filter implementation
//!
//! Single resonant biquad stage using the RBJ audio-EQ cookbook responses.
//! Parameter changes recompute the coefficients immediately; there is no
//! smoothing between old and new settings.

use super::context::EngineContext;
use super::param::FilterParam;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MIN_CUTOFF: f64 = 20.0;
const MAX_CUTOFF: f64 = 20000.0;
const MIN_Q: f64 = 0.0001;
const MAX_Q: f64 = 1000.0;

/// Filter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    LowShelf,
    HighShelf,
    Peaking,
    Notch,
    AllPass,
}

/// Returned when a filter type name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter type '{0}'")]
pub struct ParseFilterTypeError(pub String);

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::LowPass => "lowpass",
            FilterType::HighPass => "highpass",
            FilterType::BandPass => "bandpass",
            FilterType::LowShelf => "lowshelf",
            FilterType::HighShelf => "highshelf",
            FilterType::Peaking => "peaking",
            FilterType::Notch => "notch",
            FilterType::AllPass => "allpass",
        }
    }
}

impl FromStr for FilterType {
    type Err = ParseFilterTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" => Ok(FilterType::LowPass),
            "highpass" => Ok(FilterType::HighPass),
            "bandpass" => Ok(FilterType::BandPass),
            "lowshelf" => Ok(FilterType::LowShelf),
            "highshelf" => Ok(FilterType::HighShelf),
            "peaking" => Ok(FilterType::Peaking),
            "notch" => Ok(FilterType::Notch),
            "allpass" => Ok(FilterType::AllPass),
            other => Err(ParseFilterTypeError(other.to_string())),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Biquad filter coefficients
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

/// Biquad filter for audio processing
pub struct Filter {
    filter_type: FilterType,
    sample_rate: f64,
    max_cutoff: f64,
    cutoff: f64,
    resonance: f64, // Q factor
    /// Shelf and peaking gain in dB
    gain_db: f64,

    coeffs: Coefficients,

    // Filter state (Direct Form II transposed)
    z1: f64,
    z2: f64,
}

impl Filter {
    /// Create a fully open low-pass filter (20 kHz, Q = 1)
    pub fn new(context: &EngineContext) -> Self {
        let sample_rate = context.sample_rate();
        let mut filter = Self {
            filter_type: FilterType::LowPass,
            sample_rate,
            max_cutoff: MAX_CUTOFF.min(sample_rate * 0.49).max(MIN_CUTOFF),
            cutoff: MAX_CUTOFF,
            resonance: 1.0,
            gain_db: 0.0,
            coeffs: Coefficients::default(),
            z1: 0.0,
            z2: 0.0,
        };
        filter.cutoff = filter.cutoff.min(filter.max_cutoff);
        filter.calculate_coefficients();
        filter
    }

    /// Create a filter with specific type
    pub fn with_type(context: &EngineContext, filter_type: FilterType) -> Self {
        let mut filter = Self::new(context);
        filter.set_type(filter_type);
        filter
    }

    /// Set cutoff frequency in Hz
    pub fn set_cutoff(&mut self, hz: f64) {
        if !hz.is_finite() {
            return;
        }
        self.cutoff = hz.clamp(MIN_CUTOFF, self.max_cutoff);
        self.calculate_coefficients();
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Set resonance (Q factor)
    pub fn set_resonance(&mut self, q: f64) {
        if !q.is_finite() {
            return;
        }
        self.resonance = q.clamp(MIN_Q, MAX_Q);
        self.calculate_coefficients();
    }

    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    /// Set shelf/peaking gain in dB; ignored by the other responses
    pub fn set_gain_db(&mut self, gain_db: f64) {
        if !gain_db.is_finite() {
            return;
        }
        self.gain_db = gain_db.clamp(-40.0, 40.0);
        self.calculate_coefficients();
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
        self.calculate_coefficients();
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn change_parameter(&mut self, param: FilterParam) {
        match param {
            FilterParam::Cutoff(hz) => self.set_cutoff(hz),
            FilterParam::Resonance(q) => self.set_resonance(q),
            FilterParam::Type(filter_type) => self.set_type(filter_type),
        }
    }

    /// Reset filter state (clear history)
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Calculate biquad coefficients based on current parameters
    fn calculate_coefficients(&mut self) {
        let omega = 2.0 * PI * self.cutoff / self.sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * self.resonance);
        let a = 10f64.powf(self.gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match self.filter_type {
            FilterType::LowPass => (
                (1.0 - cos_omega) / 2.0,
                1.0 - cos_omega,
                (1.0 - cos_omega) / 2.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            ),
            FilterType::HighPass => (
                (1.0 + cos_omega) / 2.0,
                -(1.0 + cos_omega),
                (1.0 + cos_omega) / 2.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            ),
            FilterType::BandPass => (
                alpha,
                0.0,
                -alpha,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            ),
            FilterType::Notch => (
                1.0,
                -2.0 * cos_omega,
                1.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            ),
            FilterType::AllPass => (
                1.0 - alpha,
                -2.0 * cos_omega,
                1.0 + alpha,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            ),
            FilterType::Peaking => (
                1.0 + alpha * a,
                -2.0 * cos_omega,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_omega,
                1.0 - alpha / a,
            ),
            FilterType::LowShelf => {
                let sq = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_omega + sq),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                    a * ((a + 1.0) - (a - 1.0) * cos_omega - sq),
                    (a + 1.0) + (a - 1.0) * cos_omega + sq,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                    (a + 1.0) + (a - 1.0) * cos_omega - sq,
                )
            }
            FilterType::HighShelf => {
                let sq = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_omega + sq),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                    a * ((a + 1.0) + (a - 1.0) * cos_omega - sq),
                    (a + 1.0) - (a - 1.0) * cos_omega + sq,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                    (a + 1.0) - (a - 1.0) * cos_omega - sq,
                )
            }
        };

        // Normalize by a0
        self.coeffs = Coefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        };
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, input: f64) -> f64 {
        // Direct Form II Transposed
        let output = self.coeffs.b0 * input + self.z1;

        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;

        output
    }

    /// Process a buffer of samples in place
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
