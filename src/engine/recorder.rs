//! WAV file recorder
//!
//! Writes rendered blocks to a mono 32-bit float WAV file.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    frames_written: u64,
    peak: f32,
}

impl Recorder {
    /// Create a recorder writing to `path` at `sample_rate`
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            frames_written: 0,
            peak: 0.0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames_written as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample written so far
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Write a block of samples
    pub fn write_block(&mut self, block: &[f32]) -> Result<()> {
        for &sample in block {
            self.writer
                .write_sample(sample)
                .context("failed to write sample")?;
            self.peak = self.peak.max(sample.abs());
        }
        self.frames_written += block.len() as u64;
        Ok(())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_recorder_creation() {
        let file = NamedTempFile::new().unwrap();
        let recorder = Recorder::new(file.path(), 48000).unwrap();

        assert_eq!(recorder.sample_rate(), 48000);
        assert_eq!(recorder.frames_written(), 0);
        assert_eq!(recorder.duration_secs(), 0.0);
        assert_eq!(recorder.peak(), 0.0);
    }

    #[test]
    fn test_recorder_tracks_duration_and_peak() {
        let file = NamedTempFile::new().unwrap();
        let mut recorder = Recorder::new(file.path(), 1000).unwrap();

        recorder.write_block(&[0.1, -0.8, 0.3]).unwrap();
        recorder.write_block(&[0.0; 997]).unwrap();

        assert_eq!(recorder.frames_written(), 1000);
        assert!((recorder.duration_secs() - 1.0).abs() < 1e-9);
        assert_eq!(recorder.peak(), 0.8);
    }

    #[test]
    fn test_recorder_produces_valid_wav() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        {
            let mut recorder = Recorder::new(&path, 44100).unwrap();
            let block: Vec<f32> = (0..1000)
                .map(|i| (i as f32 / 1000.0 * std::f32::consts::PI * 2.0).sin())
                .collect();
            recorder.write_block(&block).unwrap();
            recorder.finalize().unwrap();
        }

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();

        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let samples: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 1000);
    }
}
