//! Audio engine for monosynth
//!
//! Splits the synthesizer across two threads. The [`Controller`] takes MIDI
//! and parameter input on the control side and sends time-stamped commands
//! through a lock-free ring buffer; the [`Renderer`] owns the
//! [`Synthesizer`] on the audio thread and applies each command at its frame.

mod command;
mod control;
pub mod midi;
mod offline;
mod player;
mod recorder;
mod render;

pub use command::{Command, CommandKind};
pub use control::{Controller, EngineError, StatusBoard};
pub use midi::{list_input_ports, MidiListener};
pub use offline::{render_score, RenderSummary};
pub use player::{list_output_devices, Player};
pub use recorder::Recorder;
pub use render::Renderer;

use std::sync::Arc;

use ringbuf::traits::Split;
use ringbuf::HeapRb;
use tracing::debug;

use crate::config::SynthConfig;
use crate::synth::Synthesizer;

/// A connected controller/renderer pair
pub struct Engine {
    controller: Controller,
    renderer: Renderer,
}

impl Engine {
    /// Create an engine with the given configuration
    pub fn new(config: &SynthConfig) -> Self {
        let capacity = config.audio.command_capacity.max(1);
        let (producer, consumer) = HeapRb::<Command>::new(capacity).split();
        let board = Arc::new(StatusBoard::new());

        let synth = Synthesizer::from_config(config);
        debug!(
            sample_rate = synth.context().sample_rate(),
            capacity, "engine created"
        );

        Self {
            controller: Controller::new(producer, Arc::clone(&board), config.midi.channel),
            renderer: Renderer::new(synth, consumer, board),
        }
    }

    pub fn controller(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn renderer(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Separate the halves so each can move to its own thread
    pub fn split(self) -> (Controller, Renderer) {
        (self.controller, self.renderer)
    }
}
