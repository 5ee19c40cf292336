use super::Note;
use super::NOTE_MAX;

/// Raw pitch-wheel value meaning "no bend".
pub const PITCH_BEND_CENTER: u16 = 0x2000;

/// One semitone, in scaled bend units (13 bits).
const SEMITONE: i32 = 0x2000;
const FRACTION_MASK: i32 = SEMITONE - 1;

/// Pitch-wheel position split into whole semitones and a sub-semitone
/// fraction.
///
/// The effective pitch of a voice is `note + note_offset` semitones plus
/// `fraction / 8192` of the way toward the next semitone up. The fraction is
/// always non-negative; downward bends carry a negative `note_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PitchBend {
    /// Whole-semitone shift, rounded toward negative infinity.
    pub note_offset: i16,
    /// Position within the semitone above `note_offset`, in `0..8192`.
    pub fraction: u16,
}

impl PitchBend {
    /// Neutral bend: no offset, no fraction.
    pub const NONE: Self = Self {
        note_offset: 0,
        fraction: 0,
    };

    /// Convert a 14-bit wheel value into a bend spanning `±scale` semitones.
    ///
    /// # Examples
    ///
    /// ```
    /// use floppotron::voices::PitchBend;
    ///
    /// let full_up = PitchBend::from_raw(16383, 2);
    /// assert_eq!(full_up.note_offset, 1);
    /// assert_eq!(full_up.fraction, 8190);
    ///
    /// assert_eq!(PitchBend::from_raw(8192, 12), PitchBend::NONE);
    /// ```
    pub fn from_raw(value: u16, scale: u8) -> Self {
        let scale = i32::from(scale);
        let scaled = (i32::from(value) - i32::from(PITCH_BEND_CENTER)) * scale;

        let fraction = (scaled & FRACTION_MASK) as u16;
        let note_offset = if scaled >= 0 {
            scaled / SEMITONE
        } else {
            -((-scaled - scale) / SEMITONE) - 1
        };

        Self {
            note_offset: note_offset as i16,
            fraction,
        }
    }

    /// Returns `true` if the bend leaves pitch unchanged.
    pub fn is_neutral(&self) -> bool {
        *self == Self::NONE
    }

    /// Apply the whole-semitone part of the bend to `note`, clamped to the
    /// valid note range.
    pub fn offset_note(&self, note: Note) -> Note {
        (i16::from(note) + self.note_offset).clamp(0, i16::from(NOTE_MAX)) as Note
    }
}
