//! Voice trait for note and parameter control

use super::param::ParamValue;

/// Control surface of a monophonic voice graph.
///
/// Implemented by the [`Synthesizer`](super::Synthesizer) itself and by the
/// engine's control-thread handle, so MIDI dispatch works the same whether
/// events are applied directly or queued for the audio thread.
pub trait Voice {
    /// Press a note. `None` retunes without re-triggering the envelope.
    fn note_on(&mut self, note: u8, velocity: Option<u8>);

    /// Release a note
    fn note_off(&mut self, note: u8);

    /// Release every held note at once
    fn all_notes_off(&mut self);

    /// Route a named parameter change. Unknown names are ignored.
    fn change_parameter(&mut self, destination: &str, parameter: &str, value: ParamValue<'_>);
}
