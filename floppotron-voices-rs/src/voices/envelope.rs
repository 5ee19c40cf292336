//! Fixed-point ADSR envelope advanced once per control tick.
//!
//! Levels span the full `u32` range. Rates are per-tick increments, with
//! [`INSTANT`] reserved to mean "skip this phase immediately".

/// Full-scale envelope level.
pub const LEVEL_MAX: u32 = u32::MAX;

/// Rate sentinel: the phase completes without taking a tick.
pub const INSTANT: u32 = u32::MAX;

/// Time and level parameters are 7-bit MIDI-style values.
const PARAM_MAX: u8 = 127;

/// Current phase of an [`Envelope`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnvelopePhase {
    Attack,
    Decay,
    Sustain,
    Release,
    /// Silent. Left only through [`Envelope::trigger`].
    #[default]
    Off,
}

/// User-facing envelope settings, each in `0..=127`.
///
/// Times of 127 or more (and 0) are instantaneous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvelopeConfig {
    pub attack_time: u8,
    pub decay_time: u8,
    pub sustain_level: u8,
    pub release_time: u8,
}

impl Default for EnvelopeConfig {
    /// Gate-like envelope: instantaneous attack, decay and release, full
    /// sustain.
    fn default() -> Self {
        Self {
            attack_time: PARAM_MAX,
            decay_time: PARAM_MAX,
            sustain_level: PARAM_MAX,
            release_time: PARAM_MAX,
        }
    }
}

/// Per-voice ADSR state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Envelope {
    attack_rate: u32,
    decay_rate: u32,
    release_rate: u32,
    sustain_level: u32,
    phase: EnvelopePhase,
    level: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_rate: INSTANT,
            decay_rate: INSTANT,
            release_rate: INSTANT,
            sustain_level: LEVEL_MAX,
            phase: EnvelopePhase::Off,
            level: 0,
        }
    }
}

/// Per-tick rate for a 7-bit time parameter. Wraps in 32 bits.
fn rate_for(time: u8) -> u32 {
    if time == 0 || time >= PARAM_MAX {
        return INSTANT;
    }
    (LEVEL_MAX / u32::from(time)).wrapping_mul(u32::from(PARAM_MAX))
}

impl Envelope {
    /// Create an envelope already configured with `config`.
    pub fn new(config: &EnvelopeConfig) -> Self {
        let mut envelope = Self::default();
        envelope.configure(config);
        envelope
    }

    /// Recompute rates and sustain level. Phase and level are untouched.
    pub fn configure(&mut self, config: &EnvelopeConfig) {
        self.attack_rate = rate_for(config.attack_time);
        self.decay_rate = rate_for(config.decay_time);
        self.release_rate = rate_for(config.release_time);
        self.sustain_level = u32::from(config.sustain_level) << (32 - 7);
    }

    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn attack_rate(&self) -> u32 {
        self.attack_rate
    }

    pub fn decay_rate(&self) -> u32 {
        self.decay_rate
    }

    pub fn release_rate(&self) -> u32 {
        self.release_rate
    }

    pub fn sustain_level(&self) -> u32 {
        self.sustain_level
    }

    /// Returns `true` unless the envelope is [`Off`](EnvelopePhase::Off).
    pub fn is_active(&self) -> bool {
        self.phase != EnvelopePhase::Off
    }

    /// Start a new note.
    ///
    /// Instantaneous attack (and then decay) phases are passed through
    /// within this call, so the envelope may already be in
    /// [`Sustain`](EnvelopePhase::Sustain) when it returns.
    pub fn trigger(&mut self) {
        self.phase = EnvelopePhase::Attack;
        if self.attack_rate != INSTANT {
            return;
        }

        self.level = LEVEL_MAX;
        self.phase = EnvelopePhase::Decay;
        if self.decay_rate != INSTANT {
            return;
        }

        self.level = self.sustain_level;
        self.phase = EnvelopePhase::Sustain;
    }

    /// Advance by one control tick.
    pub fn progress(&mut self) {
        match self.phase {
            EnvelopePhase::Attack => self.attack_step(),
            EnvelopePhase::Decay => self.decay_step(),
            EnvelopePhase::Sustain => {}
            EnvelopePhase::Release => self.release_step(),
            EnvelopePhase::Off => self.level = 0,
        }
    }

    fn attack_step(&mut self) {
        if self.attack_rate == INSTANT {
            self.level = LEVEL_MAX;
            self.phase = EnvelopePhase::Decay;
            self.decay_step();
            return;
        }

        match self.level.checked_add(self.attack_rate) {
            Some(level) => self.level = level,
            None => {
                self.level = LEVEL_MAX;
                self.phase = EnvelopePhase::Decay;
            }
        }
    }

    fn decay_step(&mut self) {
        if self.decay_rate == INSTANT
            || self.level < self.sustain_level
            || self.decay_rate > self.level - self.sustain_level
        {
            self.level = self.sustain_level;
            self.phase = EnvelopePhase::Sustain;
        } else {
            self.level -= self.decay_rate;
        }
    }

    // Release falls at the decay rate; `release_rate` only selects between
    // an instant cut and a release phase in `stop`.
    fn release_step(&mut self) {
        if self.decay_rate > self.level {
            self.level = 0;
            self.phase = EnvelopePhase::Off;
        } else {
            self.level -= self.decay_rate;
        }
    }

    /// Release the note. The level falls from where it is at the decay
    /// rate, or the envelope stops at once if release is instantaneous.
    pub fn stop(&mut self) {
        if self.release_rate == INSTANT {
            self.force_stop();
            return;
        }
        self.phase = EnvelopePhase::Release;
    }

    /// Silence immediately, whatever the phase.
    pub fn force_stop(&mut self) {
        self.phase = EnvelopePhase::Off;
        self.level = 0;
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config(attack: u8, decay: u8, sustain: u8, release: u8) -> EnvelopeConfig {
        EnvelopeConfig {
            attack_time: attack,
            decay_time: decay,
            sustain_level: sustain,
            release_time: release,
        }
    }

    /// Progress until the phase changes or `limit` ticks pass; returns the
    /// number of ticks taken.
    fn run_until_phase_changes(env: &mut Envelope, limit: usize) -> usize {
        let start = env.phase();
        for tick in 1..=limit {
            env.progress();
            if env.phase() != start {
                return tick;
            }
        }
        panic!("phase {:?} did not change within {} ticks", start, limit);
    }

    // ── configure ────────────────────────────────────────────────────

    #[test]
    fn default_envelope_is_off_and_instant() {
        let env = Envelope::default();
        assert_eq!(env.phase(), EnvelopePhase::Off);
        assert_eq!(env.level(), 0);
        assert_eq!(env.attack_rate(), INSTANT);
        assert_eq!(env.decay_rate(), INSTANT);
        assert_eq!(env.release_rate(), INSTANT);
    }

    #[test]
    fn long_times_are_instant() {
        let env = Envelope::new(&config(127, 200, 0, 255));
        assert_eq!(env.attack_rate(), INSTANT);
        assert_eq!(env.decay_rate(), INSTANT);
        assert_eq!(env.release_rate(), INSTANT);
    }

    #[test]
    fn zero_time_is_instant() {
        let env = Envelope::new(&config(0, 0, 64, 0));
        assert_eq!(env.attack_rate(), INSTANT);
        assert_eq!(env.decay_rate(), INSTANT);
        assert_eq!(env.release_rate(), INSTANT);
    }

    #[test]
    fn finite_rate_uses_wrapping_arithmetic() {
        let env = Envelope::new(&config(1, 2, 64, 4));
        assert_eq!(env.attack_rate(), u32::MAX.wrapping_mul(127));
        assert_eq!(env.decay_rate(), (u32::MAX / 2).wrapping_mul(127));
        assert_eq!(env.release_rate(), (u32::MAX / 4).wrapping_mul(127));
        assert_ne!(env.attack_rate(), INSTANT);
    }

    #[test]
    fn sustain_level_is_shifted_to_full_range() {
        assert_eq!(Envelope::new(&config(1, 1, 127, 1)).sustain_level(), 127 << 25);
        assert_eq!(Envelope::new(&config(1, 1, 64, 1)).sustain_level(), 1 << 31);
        assert_eq!(Envelope::new(&config(1, 1, 0, 1)).sustain_level(), 0);
    }

    #[test]
    fn configure_keeps_phase_and_level() {
        let mut env = Envelope::new(&EnvelopeConfig::default());
        env.trigger();
        let level = env.level();

        env.configure(&config(10, 10, 10, 10));
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert_eq!(env.level(), level);
    }

    // ── trigger ──────────────────────────────────────────────────────

    #[test]
    fn instant_attack_and_decay_reach_sustain_without_ticks() {
        let mut env = Envelope::new(&config(127, 127, 100, 127));
        env.trigger();
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert_eq!(env.level(), 100 << 25);
    }

    #[test]
    fn instant_attack_with_finite_decay_stops_in_decay_at_max() {
        let mut env = Envelope::new(&config(127, 5, 64, 127));
        env.trigger();
        assert_eq!(env.phase(), EnvelopePhase::Decay);
        assert_eq!(env.level(), LEVEL_MAX);
    }

    #[test]
    fn finite_attack_starts_in_attack() {
        let mut env = Envelope::new(&config(1, 127, 64, 127));
        env.trigger();
        assert_eq!(env.phase(), EnvelopePhase::Attack);
        assert_eq!(env.level(), 0);
    }

    // ── progress ─────────────────────────────────────────────────────

    #[test]
    fn attack_rises_strictly_until_clamped() {
        let mut env = Envelope::new(&config(1, 127, 64, 127));
        env.trigger();

        let mut previous = env.level();
        loop {
            env.progress();
            if env.phase() != EnvelopePhase::Attack {
                break;
            }
            assert!(env.level() > previous);
            previous = env.level();
        }
        assert_eq!(env.level(), LEVEL_MAX);
        assert_eq!(env.phase(), EnvelopePhase::Decay);
    }

    #[test]
    fn attack_then_decay_settles_on_sustain() {
        let mut env = Envelope::new(&config(3, 3, 32, 127));
        env.trigger();

        run_until_phase_changes(&mut env, 1_000);
        assert_eq!(env.phase(), EnvelopePhase::Decay);

        let mut previous = env.level();
        while env.phase() == EnvelopePhase::Decay {
            env.progress();
            assert!(env.level() <= previous);
            previous = env.level();
        }
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert_eq!(env.level(), 32 << 25);
    }

    #[test]
    fn decay_step_landing_exactly_on_sustain_takes_one_more_tick() {
        let mut env = Envelope::new(&config(127, 127, 0, 127));
        env.decay_rate = 100;
        env.sustain_level = 1_000;
        env.level = 1_100;
        env.phase = EnvelopePhase::Decay;

        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Decay);
        assert_eq!(env.level(), 1_000);

        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert_eq!(env.level(), 1_000);
    }

    #[test]
    fn decay_below_sustain_clamps_up() {
        let mut env = Envelope::new(&config(127, 127, 0, 127));
        env.decay_rate = 10;
        env.sustain_level = 1_000;
        env.level = 500;
        env.phase = EnvelopePhase::Decay;

        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert_eq!(env.level(), 1_000);
    }

    #[test]
    fn instant_attack_in_progress_falls_through_to_decay() {
        let mut env = Envelope::new(&config(127, 127, 64, 127));
        env.phase = EnvelopePhase::Attack;
        env.level = 0;

        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert_eq!(env.level(), 1 << 31);
    }

    #[test]
    fn sustain_holds() {
        let mut env = Envelope::new(&config(127, 127, 90, 127));
        env.trigger();
        for _ in 0..100 {
            env.progress();
        }
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert_eq!(env.level(), 90 << 25);
    }

    #[test]
    fn off_forces_level_to_zero() {
        let mut env = Envelope::default();
        env.level = 12_345;
        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Off);
        assert_eq!(env.level(), 0);
    }

    // ── stop / release ───────────────────────────────────────────────

    #[test]
    fn release_from_sustain_falls_to_zero_then_off() {
        let mut env = Envelope::new(&config(127, 127, 127, 8));
        env.trigger();
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        env.configure(&config(127, 8, 127, 8));

        env.stop();
        assert_eq!(env.phase(), EnvelopePhase::Release);
        assert_eq!(env.level(), 127 << 25);

        let mut previous = env.level();
        let mut ticks = 0;
        while env.phase() == EnvelopePhase::Release {
            env.progress();
            assert!(env.level() <= previous);
            previous = env.level();
            ticks += 1;
            assert!(ticks < 1_000);
        }
        assert_eq!(env.phase(), EnvelopePhase::Off);
        assert_eq!(env.level(), 0);
    }

    #[test]
    fn release_step_landing_on_zero_finishes_next_tick() {
        let mut env = Envelope::new(&config(127, 127, 127, 127));
        env.decay_rate = 50;
        env.level = 100;
        env.phase = EnvelopePhase::Release;

        env.progress();
        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Release);
        assert_eq!(env.level(), 0);

        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Off);
    }

    #[test]
    fn release_steps_at_decay_rate() {
        // Instant decay with a finite release: the release phase is entered,
        // then the first tick drops straight to zero.
        let mut env = Envelope::new(&config(127, 127, 127, 8));
        env.trigger();
        env.stop();
        assert_eq!(env.phase(), EnvelopePhase::Release);

        env.progress();
        assert_eq!(env.phase(), EnvelopePhase::Off);
        assert_eq!(env.level(), 0);
    }

    #[test]
    fn release_ignores_release_rate_when_stepping() {
        let mut env = Envelope::new(&config(127, 127, 127, 127));
        env.decay_rate = 1_000;
        env.release_rate = 1;
        env.level = 5_000;
        env.phase = EnvelopePhase::Release;

        env.progress();
        assert_eq!(env.level(), 4_000);
    }

    #[test]
    fn stop_with_instant_release_forces_off() {
        let mut env = Envelope::new(&config(127, 127, 127, 127));
        env.trigger();
        env.stop();
        assert_eq!(env.phase(), EnvelopePhase::Off);
        assert_eq!(env.level(), 0);
    }

    #[test]
    fn stop_mid_attack_releases_from_current_level() {
        let mut env = Envelope::new(&config(1, 127, 64, 5));
        env.trigger();
        env.progress();
        let level = env.level();
        assert!(level > 0);

        env.stop();
        assert_eq!(env.phase(), EnvelopePhase::Release);
        assert_eq!(env.level(), level);
    }

    #[test]
    fn force_stop_from_every_phase() {
        for phase in [
            EnvelopePhase::Attack,
            EnvelopePhase::Decay,
            EnvelopePhase::Sustain,
            EnvelopePhase::Release,
            EnvelopePhase::Off,
        ] {
            let mut env = Envelope::new(&config(10, 10, 10, 10));
            env.phase = phase;
            env.level = 777;
            env.force_stop();
            assert_eq!(env.phase(), EnvelopePhase::Off);
            assert_eq!(env.level(), 0);
            assert!(!env.is_active());
        }
    }

    #[test]
    fn retrigger_after_off() {
        let mut env = Envelope::new(&config(127, 127, 127, 127));
        env.trigger();
        env.force_stop();
        env.trigger();
        assert_eq!(env.phase(), EnvelopePhase::Sustain);
        assert!(env.is_active());
    }
}
