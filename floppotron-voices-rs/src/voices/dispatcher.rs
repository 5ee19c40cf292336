//! Per-cycle reconciliation of held notes against the voice array.

use super::note_stack::NoteStack;
use super::oscillator::Voice;
use super::pitch_bend::PitchBend;
use super::Note;

/// Map the `N` most recently pressed notes onto `N` voices.
///
/// 1. The top `N` notes are taken from `notes`; any further held notes are
///    inaudible until enough higher-priority notes are released.
/// 2. A voice whose note is among them keeps playing untouched. A voice
///    whose note is not is stopped.
/// 3. Each remaining note goes to the lowest-indexed free voice.
///
/// A voice is therefore only retriggered when its own note drops out of the
/// top `N`, never because the order within the stack changed.
pub fn reconcile<V, const N: usize>(notes: &NoteStack, voices: &mut [V; N], bend: PitchBend)
where
    V: Voice,
{
    let mut top = [0 as Note; N];
    let count = notes.top_n(&mut top, N);

    let mut unclaimed: [Option<Note>; N] = [None; N];
    for (slot, &note) in unclaimed.iter_mut().zip(&top[..count]) {
        *slot = Some(note);
    }

    for voice in voices.iter_mut() {
        let Some(current) = voice.note() else {
            continue;
        };
        match unclaimed.iter_mut().find(|slot| **slot == Some(current)) {
            Some(slot) => *slot = None,
            None => voice.stop(),
        }
    }

    for &note in unclaimed.iter().flatten() {
        if let Some(voice) = voices.iter_mut().find(|voice| voice.note().is_none()) {
            voice.set_note(note, bend);
        }
    }
}

/// Retune every sounding voice to `bend`, keeping its assigned note.
pub fn apply_pitch_bend<V: Voice>(voices: &mut [V], bend: PitchBend) {
    for voice in voices.iter_mut() {
        if let Some(note) = voice.note() {
            voice.set_note(note, bend);
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy)]
    struct RecordingVoice {
        note: Option<Note>,
        bend: PitchBend,
        set_note_calls: u32,
        stop_calls: u32,
    }

    impl Voice for RecordingVoice {
        fn note(&self) -> Option<Note> {
            self.note
        }

        fn set_note(&mut self, note: Note, bend: PitchBend) {
            self.note = Some(note);
            self.bend = bend;
            self.set_note_calls += 1;
        }

        fn stop(&mut self) {
            self.note = None;
            self.stop_calls += 1;
        }
    }

    fn notes_of<const N: usize>(voices: &[RecordingVoice; N]) -> [Option<Note>; N] {
        voices.map(|voice| voice.note)
    }

    // ── Dispatch scenarios ─────────────────────────────────────────────

    #[test]
    fn single_voice_follows_latest_note() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 1];

        stack.push(60, 100);
        reconcile(&stack, &mut voices, PitchBend::NONE);
        assert_eq!(voices[0].note, Some(60));

        stack.push(64, 80);
        reconcile(&stack, &mut voices, PitchBend::NONE);
        assert_eq!(voices[0].note, Some(64));
        assert_eq!(voices[0].stop_calls, 1);
        assert_eq!(voices[0].set_note_calls, 2);
    }

    #[test]
    fn held_note_keeps_its_voice_untouched() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 2];

        stack.push(60, 100);
        reconcile(&stack, &mut voices, PitchBend::NONE);
        assert_eq!(voices[0].set_note_calls, 1);

        stack.push(67, 90);
        reconcile(&stack, &mut voices, PitchBend::NONE);

        assert_eq!(voices[0].note, Some(60));
        assert_eq!(voices[0].set_note_calls, 1);
        assert_eq!(voices[0].stop_calls, 0);
        assert_eq!(voices[1].note, Some(67));
        assert_eq!(voices[1].set_note_calls, 1);
    }

    // ── Reconciliation behaviour ─────────────────────────────────────

    #[test]
    fn empty_stack_stops_everything() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 3];
        for note in [60, 62, 64] {
            stack.push(note, 100);
        }
        reconcile(&stack, &mut voices, PitchBend::NONE);

        stack.clear();
        reconcile(&stack, &mut voices, PitchBend::NONE);

        assert_eq!(notes_of(&voices), [None; 3]);
        for voice in &voices {
            assert_eq!(voice.stop_calls, 1);
        }
    }

    #[test]
    fn notes_fill_free_voices_first_fit() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 3];
        stack.push(60, 100);
        stack.push(62, 100);

        reconcile(&stack, &mut voices, PitchBend::NONE);

        // Most recent note is handed out first, to the lowest free index.
        assert_eq!(notes_of(&voices), [Some(62), Some(60), None]);
    }

    #[test]
    fn released_voice_is_reused_by_lowest_index() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 3];
        for note in [60, 62, 64] {
            stack.push(note, 100);
        }
        reconcile(&stack, &mut voices, PitchBend::NONE);
        assert_eq!(notes_of(&voices), [Some(64), Some(62), Some(60)]);

        stack.remove(62);
        stack.push(65, 100);
        reconcile(&stack, &mut voices, PitchBend::NONE);

        assert_eq!(notes_of(&voices), [Some(64), Some(65), Some(60)]);
        assert_eq!(voices[0].set_note_calls, 1);
        assert_eq!(voices[2].set_note_calls, 1);
    }

    #[test]
    fn excess_notes_are_dropped_not_queued() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 2];
        for note in [60, 62, 64] {
            stack.push(note, 100);
        }

        reconcile(&stack, &mut voices, PitchBend::NONE);
        assert_eq!(notes_of(&voices), [Some(64), Some(62)]);

        // Releasing a sounding note lets the buried one through.
        stack.remove(64);
        reconcile(&stack, &mut voices, PitchBend::NONE);
        assert_eq!(notes_of(&voices), [Some(60), Some(62)]);
    }

    #[test]
    fn reorder_within_top_does_not_retrigger() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 2];
        stack.push(60, 100);
        stack.push(62, 100);
        reconcile(&stack, &mut voices, PitchBend::NONE);

        // Re-press 60: order changes, membership does not.
        stack.push(60, 50);
        reconcile(&stack, &mut voices, PitchBend::NONE);

        for voice in &voices {
            assert_eq!(voice.set_note_calls, 1);
            assert_eq!(voice.stop_calls, 0);
        }
    }

    #[test]
    fn repeated_cycles_without_changes_are_idle() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 4];
        stack.push(50, 1);
        stack.push(55, 1);

        for _ in 0..10 {
            reconcile(&stack, &mut voices, PitchBend::NONE);
        }

        let calls: u32 = voices.iter().map(|v| v.set_note_calls + v.stop_calls).sum();
        assert_eq!(calls, 2);
    }

    #[test]
    fn new_assignments_use_current_bend() {
        let mut stack = NoteStack::new();
        let mut voices = [RecordingVoice::default(); 1];
        let bend = PitchBend::from_raw(12000, 2);
        stack.push(60, 100);

        reconcile(&stack, &mut voices, bend);
        assert_eq!(voices[0].bend, bend);
    }

    // ── apply_pitch_bend ─────────────────────────────────────────────

    #[test]
    fn pitch_bend_retunes_sounding_voices_only() {
        let mut voices = [RecordingVoice::default(); 3];
        voices[0].note = Some(60);
        voices[2].note = Some(72);

        let bend = PitchBend::from_raw(16383, 2);
        apply_pitch_bend(&mut voices, bend);

        assert_eq!(notes_of(&voices), [Some(60), None, Some(72)]);
        assert_eq!(voices[0].bend, bend);
        assert_eq!(voices[0].set_note_calls, 1);
        assert_eq!(voices[1].set_note_calls, 0);
        assert_eq!(voices[2].bend, bend);
    }
}
