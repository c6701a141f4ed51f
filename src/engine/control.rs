//! Control-thread side of the engine

use std::fmt::Write;
use std::sync::atomic::{fence, AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use ringbuf::traits::{Observer, Producer};
use ringbuf::HeapProd;
use thiserror::Error;
use tracing::warn;

use super::command::{Command, CommandKind};
use crate::synth::{
    midi, MidiError, MidiEvent, NoteSet, ParamValue, ParameterChange, SynthStatus, Voice,
    RECEIVING_STATUS, WAITING_STATUS,
};

/// Errors raised by the control side of the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("command queue is full ({capacity} slots)")]
    QueueFull { capacity: usize },
}

/// State shared between the audio thread and the control side.
///
/// The audio thread only ever stores to the atomics. The message string is
/// written and read by control-side threads alone.
///
/// The two note words are guarded by a sequence counter (odd while the audio
/// thread is writing) so readers never see halves of different publishes.
#[derive(Debug, Default)]
pub struct StatusBoard {
    clock: AtomicU64,
    notes_seq: AtomicU64,
    notes_low: AtomicU64,
    notes_high: AtomicU64,
    received: AtomicBool,
    message: Mutex<String>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far, as last published by the audio thread
    pub fn clock(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    /// Notes held on the audio thread at the last publish
    pub fn active_notes(&self) -> NoteSet {
        loop {
            let before = self.notes_seq.load(Ordering::Acquire);
            if before % 2 == 1 {
                std::hint::spin_loop();
                continue;
            }
            let low = self.notes_low.load(Ordering::Relaxed) as u128;
            let high = self.notes_high.load(Ordering::Relaxed) as u128;
            fence(Ordering::Acquire);
            if self.notes_seq.load(Ordering::Relaxed) == before {
                return NoteSet::from_bits(high << 64 | low);
            }
        }
    }

    pub fn message(&self) -> String {
        self.message
            .lock()
            .map(|message| message.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> SynthStatus {
        let status = if self.received.load(Ordering::Relaxed) {
            RECEIVING_STATUS
        } else {
            WAITING_STATUS
        };
        SynthStatus {
            status: status.to_string(),
            message: self.message(),
            active_notes: self.active_notes().iter().collect(),
        }
    }

    /// Called by the audio thread after each block. Single writer only.
    pub(crate) fn publish(&self, clock: u64, notes: NoteSet) {
        let bits = notes.bits();
        let seq = self.notes_seq.load(Ordering::Relaxed);
        self.notes_seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);
        self.notes_low.store(bits as u64, Ordering::Relaxed);
        self.notes_high.store((bits >> 64) as u64, Ordering::Relaxed);
        self.notes_seq.store(seq.wrapping_add(2), Ordering::Release);
        self.clock.store(clock, Ordering::Release);
    }

    fn record_event(&self, event: &MidiEvent) {
        self.received.store(true, Ordering::Relaxed);
        if let Ok(mut message) = self.message.lock() {
            message.clear();
            let _ = write!(message, "{}", event);
        }
    }
}

/// Control-thread handle to a running engine.
///
/// Validates and resolves input into [`Command`]s and pushes them to the
/// audio thread without blocking. Live input is stamped with the latest
/// published clock so it plays as soon as possible; scheduled input carries
/// an explicit frame.
pub struct Controller {
    commands: HeapProd<Command>,
    board: Arc<StatusBoard>,
    midi_channel: Option<u8>,
    /// Frame to stamp on commands sent through [`Voice`]
    schedule: Option<u64>,
    dropped: u64,
}

impl Controller {
    pub(crate) fn new(
        commands: HeapProd<Command>,
        board: Arc<StatusBoard>,
        midi_channel: Option<u8>,
    ) -> Self {
        Self {
            commands,
            board,
            midi_channel,
            schedule: None,
            dropped: 0,
        }
    }

    /// Shared status, for readers on other threads
    pub fn status_board(&self) -> Arc<StatusBoard> {
        Arc::clone(&self.board)
    }

    pub fn status(&self) -> SynthStatus {
        self.board.snapshot()
    }

    /// Commands waiting for the audio thread
    pub fn pending(&self) -> usize {
        self.commands.occupied_len()
    }

    /// Commands lost to a full queue
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Restrict MIDI input to a 1-based channel, or `None` for all
    pub fn set_midi_channel(&mut self, channel: Option<u8>) {
        self.midi_channel = channel;
    }

    fn stamp(&self) -> u64 {
        self.schedule.unwrap_or_else(|| self.board.clock())
    }

    /// Queue a command at an explicit frame
    pub fn try_send_at(&mut self, frame: u64, kind: CommandKind) -> Result<(), EngineError> {
        self.commands
            .try_push(Command::new(frame, kind))
            .map_err(|_| EngineError::QueueFull {
                capacity: self.commands.capacity().get(),
            })
    }

    /// Queue a command for the next sample
    pub fn try_send(&mut self, kind: CommandKind) -> Result<(), EngineError> {
        let frame = self.stamp();
        self.try_send_at(frame, kind)
    }

    fn send(&mut self, kind: CommandKind) {
        if let Err(err) = self.try_send(kind) {
            self.dropped += 1;
            warn!(%err, ?kind, "dropping command");
        }
    }

    /// Queue a resolved parameter change
    pub fn apply(&mut self, change: ParameterChange) {
        self.send(CommandKind::Parameter(change));
    }

    /// Parse a raw MIDI message and queue its effect
    pub fn handle_midi(&mut self, bytes: &[u8]) -> Result<Option<MidiEvent>, MidiError> {
        let channel = self.midi_channel;
        let event = midi::dispatch(bytes, channel, self)?;
        if let Some(event) = &event {
            self.board.record_event(event);
        }
        Ok(event)
    }

    /// Like [`handle_midi`](Self::handle_midi), taking effect at `frame`
    pub fn handle_midi_at(
        &mut self,
        frame: u64,
        bytes: &[u8],
    ) -> Result<Option<MidiEvent>, MidiError> {
        self.schedule = Some(frame);
        let result = self.handle_midi(bytes);
        self.schedule = None;
        result
    }

    /// Route a named parameter change, taking effect at `frame`
    pub fn change_parameter_at(
        &mut self,
        frame: u64,
        destination: &str,
        parameter: &str,
        value: ParamValue<'_>,
    ) {
        self.schedule = Some(frame);
        self.change_parameter(destination, parameter, value);
        self.schedule = None;
    }
}

impl Voice for Controller {
    fn note_on(&mut self, note: u8, velocity: Option<u8>) {
        self.send(CommandKind::NoteOn {
            note: note.min(127),
            velocity: velocity.map(|v| v.min(127)),
        });
    }

    fn note_off(&mut self, note: u8) {
        self.send(CommandKind::NoteOff { note: note.min(127) });
    }

    fn all_notes_off(&mut self) {
        self.send(CommandKind::AllNotesOff);
    }

    fn change_parameter(&mut self, destination: &str, parameter: &str, value: ParamValue<'_>) {
        if let Some(change) = ParameterChange::parse(destination, parameter, value) {
            self.apply(change);
        }
    }
}
