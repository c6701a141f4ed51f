//! Offline rendering of a score to a WAV file
//!
//! Drives the same Controller/Renderer pair used for real-time playback,
//! rendering up to each event's frame before queueing it.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use super::{Engine, Recorder, Renderer};
use crate::config::{Score, SynthConfig};

/// Result of an offline render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub frames: u64,
    pub seconds: f64,
    pub events: usize,
    pub peak: f32,
}

/// Render `score` through a fresh engine into a WAV file at `output`
pub fn render_score(config: &SynthConfig, score: &Score, output: &Path) -> Result<RenderSummary> {
    let (mut controller, mut renderer) = Engine::new(config).split();
    let context = *renderer.context();
    let mut recorder = Recorder::new(output, config.audio.sample_rate)?;
    let mut block = vec![0.0f32; config.audio.buffer_size.max(1)];

    let events = score.sorted_events();
    for event in &events {
        let frame = context.seconds_to_frames(event.at);
        render_until(&mut renderer, &mut recorder, &mut block, frame)?;

        if let Some(bytes) = &event.midi {
            if let Err(err) = controller.handle_midi_at(frame, bytes) {
                warn!(at = event.at, %err, "skipping MIDI event");
            }
        }
        if let Some(param) = &event.parameter {
            controller.change_parameter_at(
                frame,
                &param.destination,
                &param.name,
                param.value.as_param(),
            );
        }
    }

    let end = context.seconds_to_frames(score.duration());
    render_until(&mut renderer, &mut recorder, &mut block, end)?;

    let summary = RenderSummary {
        frames: recorder.frames_written(),
        seconds: recorder.duration_secs(),
        events: events.len(),
        peak: recorder.peak(),
    };
    recorder.finalize()?;

    if controller.dropped() > 0 {
        warn!(dropped = controller.dropped(), "some score events were dropped");
    }
    if summary.peak > 1.0 {
        warn!(peak = summary.peak, "output clipped; lower master volume");
    }
    info!(
        frames = summary.frames,
        seconds = summary.seconds,
        events = summary.events,
        "render complete"
    );

    Ok(summary)
}

fn render_until(
    renderer: &mut Renderer,
    recorder: &mut Recorder,
    block: &mut [f32],
    target: u64,
) -> Result<()> {
    while renderer.frame() < target {
        let remaining = (target - renderer.frame()).min(block.len() as u64) as usize;
        let block = &mut block[..remaining];
        renderer.render(block);
        recorder.write_block(block)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const SCORE: &str = r#"
tail: 0.1
events:
  - at: 0.0
    midi: [144, 60, 100]
  - at: 0.05
    parameter:
      destination: filter
      name: cutoff
      value: 2000
  - at: 0.1
    midi: [128, 60, 0]
  - at: 0.1
    midi: [144, 64]
"#;

    fn test_config() -> SynthConfig {
        let mut config = SynthConfig::default();
        config.audio.sample_rate = 8000;
        config.audio.buffer_size = 64;
        config
    }

    #[test]
    fn test_render_score_to_wav() {
        let score: Score = serde_yaml::from_str(SCORE).unwrap();
        let file = NamedTempFile::new().unwrap();

        let summary = render_score(&test_config(), &score, file.path()).unwrap();
        assert_eq!(summary.frames, 1600);
        assert_eq!(summary.events, 4);
        assert!(summary.peak > 0.0);
        assert!((summary.seconds - 0.2).abs() < 1e-9);

        let reader = hound::WavReader::open(file.path()).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        let samples: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 1600);

        // Release is instant, so everything after the note off is silent
        assert!(samples[..800].iter().any(|&s| s != 0.0));
        assert!(samples[800..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_empty_score_renders_tail() {
        let score = Score {
            tail: 0.5,
            events: vec![],
        };
        let file = NamedTempFile::new().unwrap();
        let summary = render_score(&test_config(), &score, file.path()).unwrap();
        assert_eq!(summary.frames, 4000);
        assert_eq!(summary.peak, 0.0);
    }
}
