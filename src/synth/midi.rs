//! Inbound MIDI message parsing and dispatch
//!
//! Only channel voice note messages drive the synthesizer. Active sensing is
//! dropped before anything else sees it; every other well-formed message is
//! reported back so callers can show it, but changes no state.

use std::fmt;

use thiserror::Error;

use super::voice::Voice;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const ACTIVE_SENSING: u8 = 0xFE;

/// Controller number for "All Notes Off"
const CC_ALL_NOTES_OFF: u8 = 123;

/// Reasons a raw message is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MidiError {
    #[error("empty MIDI message")]
    Empty,
    #[error("MIDI status {status:#04x} needs {expected} bytes, got {len}")]
    Truncated {
        status: u8,
        expected: usize,
        len: usize,
    },
}

/// Decoded meaning of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEventKind {
    /// Note on with non-zero velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note off, or note on with zero velocity
    NoteOff { channel: u8, note: u8 },
    /// Control change 123
    AllNotesOff { channel: u8 },
    ActiveSensing,
    Other,
}

/// A parsed inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub status: u8,
    pub data: [u8; 2],
    pub kind: MidiEventKind,
}

impl MidiEvent {
    /// Parse a raw message. Data bytes above 127 are clamped.
    pub fn parse(bytes: &[u8]) -> Result<Self, MidiError> {
        let (&status, rest) = bytes.split_first().ok_or(MidiError::Empty)?;
        let data1 = rest.first().map_or(0, |&b| b.min(127));
        let data2 = rest.get(1).map_or(0, |&b| b.min(127));
        let channel = status & 0x0F;

        let kind = match status & 0xF0 {
            _ if status == ACTIVE_SENSING => MidiEventKind::ActiveSensing,
            NOTE_ON | NOTE_OFF | CONTROL_CHANGE if bytes.len() < 3 => {
                return Err(MidiError::Truncated {
                    status,
                    expected: 3,
                    len: bytes.len(),
                });
            }
            NOTE_ON if data2 > 0 => MidiEventKind::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            },
            NOTE_ON | NOTE_OFF => MidiEventKind::NoteOff {
                channel,
                note: data1,
            },
            CONTROL_CHANGE if data1 == CC_ALL_NOTES_OFF => MidiEventKind::AllNotesOff { channel },
            _ => MidiEventKind::Other,
        };

        Ok(Self {
            status,
            data: [data1, data2],
            kind,
        })
    }

    /// Zero-based channel for channel voice messages
    pub fn channel(&self) -> Option<u8> {
        match self.kind {
            MidiEventKind::NoteOn { channel, .. }
            | MidiEventKind::NoteOff { channel, .. }
            | MidiEventKind::AllNotesOff { channel } => Some(channel),
            MidiEventKind::ActiveSensing | MidiEventKind::Other => None,
        }
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event: {}", self.status)?;
        if self.status & 0xF0 == NOTE_ON {
            write!(f, ", Note: {}, Velocity: {}", self.data[0], self.data[1])?;
        }
        Ok(())
    }
}

/// Parse `bytes` and apply it to `voice`.
///
/// `channel` is a 1-based channel filter; `None` listens to all channels.
/// Returns the event when it was consumed, `None` when it was ignored.
pub fn dispatch<V: Voice + ?Sized>(
    bytes: &[u8],
    channel: Option<u8>,
    voice: &mut V,
) -> Result<Option<MidiEvent>, MidiError> {
    let event = MidiEvent::parse(bytes)?;

    if event.kind == MidiEventKind::ActiveSensing {
        return Ok(None);
    }
    if let (Some(wanted), Some(actual)) = (channel, event.channel()) {
        if wanted != actual + 1 {
            return Ok(None);
        }
    }

    match event.kind {
        MidiEventKind::NoteOn { note, velocity, .. } => voice.note_on(note, Some(velocity)),
        MidiEventKind::NoteOff { note, .. } => voice.note_off(note),
        MidiEventKind::AllNotesOff { .. } => voice.all_notes_off(),
        MidiEventKind::ActiveSensing | MidiEventKind::Other => {}
    }

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::param::ParamValue;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Voice for Recorder {
        fn note_on(&mut self, note: u8, velocity: Option<u8>) {
            self.calls.push(format!("on {} {:?}", note, velocity));
        }

        fn note_off(&mut self, note: u8) {
            self.calls.push(format!("off {}", note));
        }

        fn all_notes_off(&mut self) {
            self.calls.push("all off".to_string());
        }

        fn change_parameter(&mut self, destination: &str, parameter: &str, _value: ParamValue<'_>) {
            self.calls.push(format!("param {} {}", destination, parameter));
        }
    }

    #[test]
    fn test_parse_note_on() {
        let event = MidiEvent::parse(&[0x90, 60, 100]).unwrap();
        assert_eq!(
            event.kind,
            MidiEventKind::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            }
        );
        assert_eq!(event.to_string(), "Event: 144, Note: 60, Velocity: 100");
    }

    #[test]
    fn test_zero_velocity_note_on_is_note_off() {
        let event = MidiEvent::parse(&[0x90, 60, 0]).unwrap();
        assert_eq!(event.kind, MidiEventKind::NoteOff { channel: 0, note: 60 });
        assert_eq!(event.to_string(), "Event: 144, Note: 60, Velocity: 0");
    }

    #[test]
    fn test_parse_note_off() {
        let event = MidiEvent::parse(&[0x80, 64, 40]).unwrap();
        assert_eq!(event.kind, MidiEventKind::NoteOff { channel: 0, note: 64 });
        assert_eq!(event.to_string(), "Event: 128");
    }

    #[test]
    fn test_active_sensing_any_length() {
        for bytes in [&[0xFE][..], &[0xFE, 1, 2][..], &[0xFE, 200, 200, 200][..]] {
            let event = MidiEvent::parse(bytes).unwrap();
            assert_eq!(event.kind, MidiEventKind::ActiveSensing);
        }
    }

    #[test]
    fn test_malformed_messages() {
        assert_eq!(MidiEvent::parse(&[]), Err(MidiError::Empty));
        assert_eq!(
            MidiEvent::parse(&[0x90, 60]),
            Err(MidiError::Truncated {
                status: 0x90,
                expected: 3,
                len: 2
            })
        );
        assert!(MidiEvent::parse(&[0x80]).is_err());
    }

    #[test]
    fn test_data_bytes_clamped() {
        let event = MidiEvent::parse(&[0x90, 200, 255]).unwrap();
        assert_eq!(
            event.kind,
            MidiEventKind::NoteOn {
                channel: 0,
                note: 127,
                velocity: 127
            }
        );
    }

    #[test]
    fn test_dispatch_routes_notes() {
        let mut voice = Recorder::default();
        dispatch(&[0x90, 60, 100], None, &mut voice).unwrap();
        dispatch(&[0x90, 60, 0], None, &mut voice).unwrap();
        dispatch(&[0x80, 62, 0], None, &mut voice).unwrap();
        dispatch(&[0xB0, 123, 0], None, &mut voice).unwrap();
        assert_eq!(voice.calls, vec!["on 60 Some(100)", "off 60", "off 62", "all off"]);
    }

    #[test]
    fn test_only_controller_123_clears_notes() {
        let mut voice = Recorder::default();
        let event = dispatch(&[0xB0, 7, 100], None, &mut voice).unwrap();
        assert_eq!(event.map(|e| e.kind), Some(MidiEventKind::Other));
        assert!(voice.calls.is_empty());

        let event = dispatch(&[0xB3, 123, 0], None, &mut voice).unwrap();
        assert_eq!(event.map(|e| e.to_string()), Some("Event: 179".to_string()));
        assert_eq!(voice.calls, vec!["all off"]);
    }

    #[test]
    fn test_dispatch_ignores_active_sensing() {
        let mut voice = Recorder::default();
        assert_eq!(dispatch(&[0xFE, 0x90, 60], None, &mut voice), Ok(None));
        assert!(voice.calls.is_empty());
    }

    #[test]
    fn test_dispatch_reports_other_messages_without_effect() {
        let mut voice = Recorder::default();
        let event = dispatch(&[0xC0, 5], None, &mut voice).unwrap();
        assert_eq!(event.map(|e| e.to_string()), Some("Event: 192".to_string()));
        assert!(voice.calls.is_empty());
    }

    #[test]
    fn test_dispatch_channel_filter() {
        let mut voice = Recorder::default();
        assert_eq!(dispatch(&[0x91, 60, 100], Some(1), &mut voice), Ok(None));
        assert!(dispatch(&[0x91, 60, 100], Some(2), &mut voice).unwrap().is_some());
        assert_eq!(voice.calls, vec!["on 60 Some(100)"]);
    }
}
