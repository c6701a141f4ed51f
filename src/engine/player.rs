//! Real-time audio playback using cpal

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use super::Renderer;

/// Real-time audio player.
///
/// The output device is opened first so the engine can be built at the
/// device's sample rate; the [`Renderer`] is then moved into the stream
/// callback.
pub struct Player {
    device: Device,
    device_name: String,
    stream_config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    /// Open an output device by name (substring match), or the default one
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(wanted) => host
                .output_devices()
                .context("failed to enumerate output devices")?
                .find(|d| d.name().map(|n| n.contains(wanted)).unwrap_or(false))
                .ok_or_else(|| anyhow!("Output device '{}' not found", wanted))?,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow!("No output device available"))?,
        };

        let config = device
            .default_output_config()
            .context("failed to get default output config")?;
        let sample_format = config.sample_format();
        let stream_config: StreamConfig = config.into();
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        Ok(Self {
            device,
            device_name,
            stream_config,
            sample_format,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Sample rate the device runs at
    pub fn sample_rate(&self) -> u32 {
        self.stream_config.sample_rate.0
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Start playing audio from the renderer
    pub fn start(&mut self, renderer: Renderer) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(renderer, running)?,
            SampleFormat::I16 => self.build_stream::<i16>(renderer, running)?,
            SampleFormat::U16 => self.build_stream::<u16>(renderer, running)?,
            other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
        };

        stream.play()?;
        self.stream = Some(stream);

        info!(
            device = %self.device_name,
            sample_rate = self.sample_rate(),
            channels = self.stream_config.channels,
            "audio stream started"
        );
        Ok(())
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
        &self,
        mut renderer: Renderer,
        running: Arc<AtomicBool>,
    ) -> Result<Stream> {
        let channels = self.stream_config.channels as usize;

        let stream = self.device.build_output_stream(
            &self.stream_config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if !running.load(Ordering::Relaxed) {
                    // Fill with silence when stopped
                    data.fill(T::EQUILIBRIUM);
                    return;
                }

                for frame in data.chunks_mut(channels) {
                    let sample = T::from_sample(renderer.process());
                    frame.fill(sample);
                }
                renderer.publish();
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }
}

/// List all available output devices with their default config
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
