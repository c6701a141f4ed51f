//! Commands sent from the control thread to the audio thread

use crate::synth::ParameterChange;

/// What a command does once it reaches the synthesizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandKind {
    /// Press a note; `None` velocity retunes without re-triggering
    NoteOn { note: u8, velocity: Option<u8> },
    NoteOff { note: u8 },
    AllNotesOff,
    Parameter(ParameterChange),
}

/// A time-stamped command.
///
/// `frame` is the sample clock value at which the command takes effect.
/// Commands stamped in the past are applied before the next sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub frame: u64,
    pub kind: CommandKind,
}

impl Command {
    pub fn new(frame: u64, kind: CommandKind) -> Self {
        Self { frame, kind }
    }

    /// Due at or before `now`
    pub fn is_due(&self, now: u64) -> bool {
        self.frame <= now
    }
}
