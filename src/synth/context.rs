//! Engine context shared by every synthesis module

/// Timing information every module is constructed against.
///
/// Modules copy what they need at construction; the context itself is
/// never mutated once the engine is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineContext {
    sample_rate: f64,
}

impl EngineContext {
    /// Create a context for the given sample rate in Hz
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
        }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Highest representable frequency
    pub fn nyquist(&self) -> f64 {
        self.sample_rate * 0.5
    }

    /// Convert a duration in seconds to a whole number of frames
    pub fn seconds_to_frames(&self, seconds: f64) -> u64 {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        (seconds * self.sample_rate).round() as u64
    }

    /// Convert a frame count back to seconds
    pub fn frames_to_seconds(&self, frames: u64) -> f64 {
        frames as f64 / self.sample_rate
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_frames() {
        let ctx = EngineContext::new(48000.0);
        assert_eq!(ctx.seconds_to_frames(1.0), 48000);
        assert_eq!(ctx.seconds_to_frames(0.5), 24000);
        assert_eq!(ctx.seconds_to_frames(0.0), 0);
        assert_eq!(ctx.seconds_to_frames(-1.0), 0);
        assert_eq!(ctx.seconds_to_frames(f64::NAN), 0);
    }

    #[test]
    fn test_nyquist() {
        let ctx = EngineContext::new(44100.0);
        assert_eq!(ctx.nyquist(), 22050.0);
        assert_eq!(ctx.frames_to_seconds(44100), 1.0);
    }
}
