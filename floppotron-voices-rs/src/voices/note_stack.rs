use super::{Note, NOTE_COUNT};

/// Storage slot for one note value, linked into the priority list while the
/// note is held.
///
/// `up` points toward the top (more recently pressed), `down` toward the
/// bottom. Links are note values, which double as indices into the arena.
#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    up: Option<Note>,
    down: Option<Note>,
    velocity: u8,
    held: bool,
}

/// Held notes ordered by recency, most recently pressed first.
///
/// Backed by a fixed arena of [`NOTE_COUNT`] entries indexed by note value,
/// so a note can appear at most once and insert/remove are O(1). The list
/// is doubly linked through the entries; `top` is `None` exactly when no
/// note is held.
///
/// Out-of-range note values (`>= 128`) are ignored by every operation.
///
/// # Examples
///
/// ```
/// use floppotron::voices::NoteStack;
///
/// let mut stack = NoteStack::new();
/// stack.push(60, 100);
/// stack.push(64, 90);
/// stack.push(60, 70); // re-press moves 60 back to the top
///
/// let mut buf = [0u8; 4];
/// let n = stack.top_n(&mut buf, 4);
/// assert_eq!(&buf[..n], &[60, 64]);
/// assert_eq!(stack.top_velocity(), 70);
/// ```
#[derive(Debug, Clone)]
pub struct NoteStack {
    entries: [Entry; NOTE_COUNT],
    top: Option<Note>,
    len: usize,
}

impl Default for NoteStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStack {
    /// Create an empty stack.
    pub const fn new() -> Self {
        Self {
            entries: [Entry {
                up: None,
                down: None,
                velocity: 0,
                held: false,
            }; NOTE_COUNT],
            top: None,
            len: 0,
        }
    }

    /// Press `note`, making it the new top.
    ///
    /// If the note is already held it is moved to the top rather than
    /// duplicated, and its velocity is replaced.
    pub fn push(&mut self, note: Note, velocity: u8) {
        if usize::from(note) >= NOTE_COUNT {
            return;
        }
        self.remove(note);

        let old_top = self.top;
        let entry = &mut self.entries[usize::from(note)];
        entry.velocity = velocity;
        entry.up = None;
        entry.down = old_top;
        entry.held = true;

        if let Some(old_top) = old_top {
            self.entries[usize::from(old_top)].up = Some(note);
        }
        self.top = Some(note);
        self.len += 1;
    }

    /// Release `note`, unlinking it from wherever it sits.
    ///
    /// No-op if the note is not held or out of range.
    pub fn remove(&mut self, note: Note) {
        let idx = usize::from(note);
        if idx >= NOTE_COUNT || !self.entries[idx].held {
            return;
        }

        let Entry { up, down, .. } = self.entries[idx];
        if let Some(up) = up {
            self.entries[usize::from(up)].down = down;
        }
        if let Some(down) = down {
            self.entries[usize::from(down)].up = up;
        }
        if self.top == Some(note) {
            self.top = down;
        }

        let entry = &mut self.entries[idx];
        entry.up = None;
        entry.down = None;
        entry.held = false;
        self.len -= 1;
    }

    /// Release every held note.
    pub fn clear(&mut self) {
        let mut current = self.top;
        while let Some(note) = current {
            let entry = &mut self.entries[usize::from(note)];
            current = entry.down;
            entry.up = None;
            entry.down = None;
            entry.held = false;
        }
        self.top = None;
        self.len = 0;
    }

    /// Write up to `n` held notes into `buf`, most recently pressed first.
    ///
    /// Writes at most `buf.len()` notes and returns the number written.
    pub fn top_n(&self, buf: &mut [Note], n: usize) -> usize {
        let mut count = 0;
        for (slot, note) in buf.iter_mut().take(n).zip(self.iter()) {
            *slot = note;
            count += 1;
        }
        count
    }

    /// Returns `true` if no note is held.
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of held notes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if `note` is currently held.
    pub fn contains(&self, note: Note) -> bool {
        self.entries
            .get(usize::from(note))
            .is_some_and(|entry| entry.held)
    }

    /// Most recently pressed note, if any.
    pub fn top(&self) -> Option<Note> {
        self.top
    }

    /// Velocity of the most recently pressed note, or 0 if none is held.
    pub fn top_velocity(&self) -> u8 {
        self.top
            .map_or(0, |note| self.entries[usize::from(note)].velocity)
    }

    /// Iterate over held notes, most recently pressed first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self,
            next: self.top,
        }
    }
}

/// Iterator over a [`NoteStack`], most recently pressed first.
pub struct Iter<'a> {
    stack: &'a NoteStack,
    next: Option<Note>,
}

impl Iterator for Iter<'_> {
    type Item = Note;

    fn next(&mut self) -> Option<Self::Item> {
        let note = self.next?;
        self.next = self.stack.entries[usize::from(note)].down;
        Some(note)
    }
}

impl<'a> IntoIterator for &'a NoteStack {
    type Item = Note;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
