//! Audio-thread side of the engine

use std::sync::Arc;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::{Command, CommandKind};
use super::control::StatusBoard;
use crate::synth::{EngineContext, Synthesizer, Voice};

/// Owns the synthesizer and renders it, applying queued commands on time.
///
/// Never blocks, locks or allocates once constructed, so it can live inside
/// an audio callback.
pub struct Renderer {
    synth: Synthesizer,
    commands: HeapCons<Command>,
    board: Arc<StatusBoard>,
}

impl Renderer {
    pub(crate) fn new(
        synth: Synthesizer,
        commands: HeapCons<Command>,
        board: Arc<StatusBoard>,
    ) -> Self {
        Self {
            synth,
            commands,
            board,
        }
    }

    pub fn context(&self) -> &EngineContext {
        self.synth.context()
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synth
    }

    /// Frames rendered so far
    pub fn frame(&self) -> u64 {
        self.synth.frame()
    }

    /// Apply every queued command due at the current frame, in queue order
    fn apply_due(&mut self) {
        let now = self.synth.frame();
        loop {
            match self.commands.try_peek() {
                Some(command) if command.is_due(now) => {}
                _ => break,
            }
            if let Some(command) = self.commands.try_pop() {
                self.apply(command.kind);
            }
        }
    }

    fn apply(&mut self, kind: CommandKind) {
        match kind {
            CommandKind::NoteOn { note, velocity } => self.synth.note_on(note, velocity),
            CommandKind::NoteOff { note } => self.synth.note_off(note),
            CommandKind::AllNotesOff => self.synth.all_notes_off(),
            CommandKind::Parameter(change) => self.synth.apply(change),
        }
    }

    /// Generate the next sample
    pub fn process(&mut self) -> f32 {
        self.apply_due();
        self.synth.process() as f32
    }

    /// Make the clock and held notes visible to the control side
    pub fn publish(&self) {
        self.board
            .publish(self.synth.frame(), self.synth.active_notes());
    }

    /// Fill a mono buffer, then publish
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
        self.publish();
    }

    /// Fill an interleaved buffer, duplicating each sample to every channel
    pub fn render_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        for frame in buffer.chunks_mut(channels.max(1)) {
            frame.fill(self.process());
        }
        self.publish();
    }
}
