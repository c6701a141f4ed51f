//! Set of held MIDI notes

use std::fmt;

/// Held MIDI notes (0-127) packed into a bitset.
///
/// `Copy` and allocation-free, so it can be published across threads as a
/// pair of atomics.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoteSet(u128);

impl NoteSet {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u128) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u128 {
        self.0
    }

    /// Add a note; returns false if it was already held
    pub fn insert(&mut self, note: u8) -> bool {
        let mask = Self::mask(note);
        let added = self.0 & mask == 0;
        self.0 |= mask;
        added
    }

    /// Remove a note; returns false if it was not held
    pub fn remove(&mut self, note: u8) -> bool {
        let mask = Self::mask(note);
        let removed = self.0 & mask != 0;
        self.0 &= !mask;
        removed
    }

    pub fn contains(self, note: u8) -> bool {
        self.0 & Self::mask(note) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Highest held note
    pub fn highest(self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(127 - self.0.leading_zeros() as u8)
        }
    }

    /// Lowest held note
    pub fn lowest(self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as u8)
        }
    }

    /// Held notes in ascending order
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0u8..128).filter(move |&note| self.contains(note))
    }

    fn mask(note: u8) -> u128 {
        1u128 << (note & 0x7F)
    }
}

impl fmt::Debug for NoteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u8> for NoteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = NoteSet::new();
        for note in iter {
            set.insert(note);
        }
        set
    }
}
