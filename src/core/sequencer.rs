//! Six-phase divergence transition.
//!
//! The host drives time by calling [`Sequencer::tick`] with a monotonic
//! millisecond clock. Every scheduled wakeup carries the [`RunToken`] of the
//! run that scheduled it; wakeups from superseded or cancelled runs are
//! dropped when they come due.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Peak digit scale reached at the end of the flash.
pub const FLASH_SCALE: f64 = 3.0;
/// Scale the display settles at after the shrink.
pub const SHRUNK_SCALE: f64 = 0.4;

/// Exclusive upper bound of the scramble range.
const SCRAMBLE_MAX_MICROS: u64 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTimings {
    pub flash_ms: u64,
    pub reveal_ms: u64,
    pub scramble_ms: u64,
    pub scramble_tick_ms: u64,
    pub converge_ms: u64,
    pub converge_tick_ms: u64,
    pub shrink_ms: u64,
    pub fade_out_ms: u64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            flash_ms: 500,
            reveal_ms: 3000,
            scramble_ms: 1000,
            scramble_tick_ms: 50,
            converge_ms: 1000,
            converge_tick_ms: 16,
            shrink_ms: 2000,
            fade_out_ms: 2000,
        }
    }
}

impl PhaseTimings {
    pub fn duration(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Flash => self.flash_ms,
            Phase::Reveal => self.reveal_ms,
            Phase::Scramble => self.scramble_ms,
            Phase::Converge => self.converge_ms,
            Phase::Shrink => self.shrink_ms,
            Phase::FadeOut => self.fade_out_ms,
        }
    }

    pub fn total(&self) -> u64 {
        Phase::ALL.iter().map(|&p| self.duration(p)).sum()
    }

    fn frame_period(&self, phase: Phase) -> Option<u64> {
        match phase {
            Phase::Scramble => Some(self.scramble_tick_ms.max(1)),
            Phase::Converge => Some(self.converge_tick_ms.max(1)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Flash,
    Reveal,
    Scramble,
    Converge,
    Shrink,
    FadeOut,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Flash,
        Phase::Reveal,
        Phase::Scramble,
        Phase::Converge,
        Phase::Shrink,
        Phase::FadeOut,
    ];

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Flash => Some(Phase::Reveal),
            Phase::Reveal => Some(Phase::Scramble),
            Phase::Scramble => Some(Phase::Converge),
            Phase::Converge => Some(Phase::Shrink),
            Phase::Shrink => Some(Phase::FadeOut),
            Phase::FadeOut => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Flash => "flash",
            Phase::Reveal => "reveal",
            Phase::Scramble => "scramble",
            Phase::Converge => "converge",
            Phase::Shrink => "shrink",
            Phase::FadeOut => "fade out",
        }
    }
}

/// Identifies one run; compared against the current run on every wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

/// What the meter shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Readout {
    Blank,
    Value(f64),
}

impl Readout {
    /// Six-decimal text, empty while blank.
    pub fn text(&self) -> String {
        match self {
            Readout::Blank => String::new(),
            Readout::Value(v) => format_value(*v),
        }
    }
}

pub fn format_value(value: f64) -> String {
    format!("{value:.6}")
}

/// Interpolated presentation state for the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    pub scale: f64,
    pub opacity: f64,
}

impl Visual {
    pub const IDLE: Visual = Visual {
        scale: 1.0,
        opacity: 1.0,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    PhaseEntered { token: RunToken, phase: Phase },
    Completed { token: RunToken, target: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WakeKind {
    PhaseEnd,
    Frame,
}

#[derive(Debug, Clone, Copy)]
struct Wakeup {
    token: RunToken,
    due_ms: u64,
    /// Insertion order, breaks ties between equal due times.
    seq: u64,
    kind: WakeKind,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    token: RunToken,
    from: f64,
    target: f64,
    phase: Phase,
    phase_start_ms: u64,
}

pub struct Sequencer {
    timings: PhaseTimings,
    generation: u64,
    seq: u64,
    run: Option<Run>,
    queue: Vec<Wakeup>,
    /// Target of the last completed converge.
    settled: f64,
    readout: Readout,
    dropped: u64,
    rng: StdRng,
}

impl Sequencer {
    pub fn new(timings: PhaseTimings, initial: f64) -> Self {
        Self::with_rng(timings, initial, StdRng::from_entropy())
    }

    pub fn with_rng(timings: PhaseTimings, initial: f64, rng: StdRng) -> Self {
        Self {
            timings,
            generation: 0,
            seq: 0,
            run: None,
            queue: Vec::new(),
            settled: initial,
            readout: Readout::Value(initial),
            dropped: 0,
            rng,
        }
    }

    /// Begin a transition toward `target`, superseding any run in flight.
    pub fn start(&mut self, target: f64, now_ms: u64) -> RunToken {
        self.generation += 1;
        let token = RunToken(self.generation);
        info!(to = target, from = self.settled, "divergence transition started");
        self.run = Some(Run {
            token,
            from: self.settled,
            target,
            phase: Phase::Flash,
            phase_start_ms: now_ms,
        });
        self.enter(Phase::Flash, now_ms);
        token
    }

    /// Abandon the current run. Pending wakeups become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if self.run.take().is_some() {
            debug!("divergence transition cancelled");
        }
        self.queue.clear();
        self.readout = Readout::Value(self.settled);
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.run.map(|r| r.phase)
    }

    pub fn current_token(&self) -> Option<RunToken> {
        self.run.map(|r| r.token)
    }

    pub fn readout(&self) -> Readout {
        self.readout
    }

    pub fn settled(&self) -> f64 {
        self.settled
    }

    /// Number of stale wakeups discarded so far.
    pub fn dropped_wakeups(&self) -> u64 {
        self.dropped
    }

    /// True while a wakeup is queued; the host polls faster meanwhile.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Dispatch every wakeup due at or before `now_ms`, in due order.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SequencerEvent> {
        let mut events = Vec::new();
        while let Some(wake) = self.pop_due(now_ms) {
            if self.current_token() != Some(wake.token) {
                self.dropped += 1;
                debug!(due_ms = wake.due_ms, "stale transition wakeup dropped");
                continue;
            }
            self.dispatch(wake, &mut events);
        }
        events
    }

    /// Presentation state at `now_ms`.
    pub fn visual(&self, now_ms: u64) -> Visual {
        let Some(run) = self.run else {
            return Visual::IDLE;
        };
        let duration = self.timings.duration(run.phase);
        let p = if duration == 0 {
            1.0
        } else {
            (now_ms.saturating_sub(run.phase_start_ms) as f64 / duration as f64).clamp(0.0, 1.0)
        };
        match run.phase {
            Phase::Flash => Visual {
                scale: 1.0 + (FLASH_SCALE - 1.0) * p,
                opacity: 1.0,
            },
            Phase::Reveal => Visual {
                scale: FLASH_SCALE - (FLASH_SCALE - 1.0) * p,
                opacity: 1.0,
            },
            Phase::Scramble | Phase::Converge => Visual::IDLE,
            Phase::Shrink => Visual {
                scale: 1.0 - (1.0 - SHRUNK_SCALE) * p,
                opacity: 1.0,
            },
            Phase::FadeOut => Visual {
                scale: SHRUNK_SCALE,
                opacity: 1.0 - p,
            },
        }
    }

    fn pop_due(&mut self, now_ms: u64) -> Option<Wakeup> {
        let idx = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, w)| w.due_ms <= now_ms)
            .min_by_key(|(_, w)| (w.due_ms, w.seq))
            .map(|(i, _)| i)?;
        Some(self.queue.swap_remove(idx))
    }

    fn schedule(&mut self, token: RunToken, due_ms: u64, kind: WakeKind) {
        self.seq += 1;
        self.queue.push(Wakeup {
            token,
            due_ms,
            seq: self.seq,
            kind,
        });
    }

    fn dispatch(&mut self, wake: Wakeup, events: &mut Vec<SequencerEvent>) {
        let Some(run) = self.run else {
            return;
        };
        match wake.kind {
            WakeKind::Frame => {
                self.readout = Readout::Value(self.frame_value(&run, wake.due_ms));
                self.schedule_frame(&run, wake.due_ms);
            }
            WakeKind::PhaseEnd => {
                if run.phase == Phase::Converge {
                    self.readout = Readout::Value(run.target);
                    self.settled = run.target;
                }
                match run.phase.next() {
                    Some(next) => self.enter(next, wake.due_ms),
                    None => {
                        self.run = None;
                        self.readout = Readout::Value(run.target);
                        info!(value = run.target, "divergence transition complete");
                        events.push(SequencerEvent::Completed {
                            token: run.token,
                            target: run.target,
                        });
                    }
                }
            }
        }
        if let Some(current) = self.run
            && current.phase != run.phase
        {
            events.push(SequencerEvent::PhaseEntered {
                token: current.token,
                phase: current.phase,
            });
        }
    }

    /// Switch the current run into `phase` starting at `at_ms`.
    fn enter(&mut self, phase: Phase, at_ms: u64) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        run.phase = phase;
        run.phase_start_ms = at_ms;
        let run = *run;
        debug!(phase = phase.label(), at_ms, "transition phase entered");

        self.readout = match phase {
            Phase::Flash => Readout::Blank,
            Phase::Reveal | Phase::Converge => Readout::Value(run.from),
            Phase::Scramble => Readout::Value(self.scramble_value()),
            Phase::Shrink | Phase::FadeOut => Readout::Value(run.target),
        };
        let end = at_ms + self.timings.duration(phase);
        self.schedule(run.token, end, WakeKind::PhaseEnd);
        self.schedule_frame(&run, at_ms);
    }

    fn schedule_frame(&mut self, run: &Run, after_ms: u64) {
        let Some(period) = self.timings.frame_period(run.phase) else {
            return;
        };
        let end = run.phase_start_ms + self.timings.duration(run.phase);
        let due = after_ms + period;
        if due < end {
            self.schedule(run.token, due, WakeKind::Frame);
        }
    }

    fn frame_value(&mut self, run: &Run, at_ms: u64) -> f64 {
        match run.phase {
            Phase::Scramble => self.scramble_value(),
            Phase::Converge => {
                let duration = self.timings.converge_ms.max(1) as f64;
                let t = (at_ms.saturating_sub(run.phase_start_ms) as f64 / duration).min(1.0);
                converge_value(run.from, run.target, t)
            }
            _ => run.target,
        }
    }

    fn scramble_value(&mut self) -> f64 {
        self.rng.gen_range(0..SCRAMBLE_MAX_MICROS) as f64 / 1_000_000.0
    }
}

/// Cubic ease-out from `start` to `end`; exactly `end` at `t >= 1`.
pub fn converge_value(start: f64, end: f64, t: f64) -> f64 {
    if t >= 1.0 {
        return end;
    }
    let t = t.max(0.0);
    let eased = 1.0 - (1.0 - t).powi(3);
    start + (end - start) * eased
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(initial: f64) -> Sequencer {
        Sequencer::with_rng(PhaseTimings::default(), initial, StdRng::seed_from_u64(7))
    }

    fn phases_entered(events: &[SequencerEvent]) -> Vec<Phase> {
        events
            .iter()
            .filter_map(|e| match e {
                SequencerEvent::PhaseEntered { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn full_run_lands_exactly_on_target() {
        let mut s = seq(0.0);
        s.start(1.130205, 0);
        let events = s.tick(PhaseTimings::default().total());
        assert!(!s.is_active());
        assert_eq!(s.readout(), Readout::Value(1.130205));
        assert_eq!(s.readout().text(), "1.130205");
        assert_eq!(s.settled(), 1.130205);
        assert_eq!(
            phases_entered(&events),
            vec![
                Phase::Reveal,
                Phase::Scramble,
                Phase::Converge,
                Phase::Shrink,
                Phase::FadeOut
            ]
        );
        assert!(matches!(
            events.last(),
            Some(SequencerEvent::Completed { target, .. }) if *target == 1.130205
        ));
    }

    #[test]
    fn phases_follow_declared_boundaries() {
        let mut s = seq(0.5);
        s.start(2.0, 1_000);
        assert_eq!(s.phase(), Some(Phase::Flash));
        assert_eq!(s.readout(), Readout::Blank);
        assert_eq!(s.readout().text(), "");

        s.tick(1_499);
        assert_eq!(s.phase(), Some(Phase::Flash));
        s.tick(1_500);
        assert_eq!(s.phase(), Some(Phase::Reveal));
        assert_eq!(s.readout(), Readout::Value(0.5), "reveal shows the prior value");

        s.tick(4_500);
        assert_eq!(s.phase(), Some(Phase::Scramble));
        s.tick(5_500);
        assert_eq!(s.phase(), Some(Phase::Converge));
        s.tick(6_500);
        assert_eq!(s.phase(), Some(Phase::Shrink));
        assert_eq!(s.readout(), Readout::Value(2.0));
        s.tick(8_500);
        assert_eq!(s.phase(), Some(Phase::FadeOut));
        s.tick(10_499);
        assert!(s.is_active());
        s.tick(10_500);
        assert!(!s.is_active());
    }

    #[test]
    fn scramble_changes_every_tick_within_range() {
        let mut s = seq(0.0);
        s.start(1.0, 0);
        s.tick(3_500);
        assert_eq!(s.phase(), Some(Phase::Scramble));
        let mut seen = vec![s.readout()];
        for t in (3_550..4_500).step_by(50) {
            s.tick(t);
            seen.push(s.readout());
        }
        for pair in seen.windows(2) {
            assert_ne!(pair[0], pair[1], "scramble should change every tick");
        }
        for r in &seen {
            let Readout::Value(v) = r else {
                panic!("scramble should never blank the display");
            };
            assert!((0.0..10.0).contains(v), "{v} out of scramble range");
        }
    }

    #[test]
    fn converge_is_monotonic_and_exact() {
        let mut s = seq(0.0);
        s.start(4.091842, 0);
        s.tick(4_500);
        assert_eq!(s.phase(), Some(Phase::Converge));
        assert_eq!(s.readout(), Readout::Value(0.0));
        let mut last = 0.0;
        for t in (4_516..5_500).step_by(16) {
            s.tick(t);
            let Readout::Value(v) = s.readout() else {
                panic!("converge should show a value");
            };
            assert!(v >= last, "converge went backwards at {t}");
            assert!(v <= 4.091842);
            last = v;
        }
        s.tick(5_500);
        assert_eq!(s.readout(), Readout::Value(4.091842));
    }

    #[test]
    fn second_run_starts_from_previous_target() {
        let mut s = seq(0.0);
        let total = PhaseTimings::default().total();
        s.start(1.0, 0);
        s.tick(total);
        s.start(2.0, total + 10);
        s.tick(total + 10 + 500);
        assert_eq!(s.readout(), Readout::Value(1.0));
    }

    #[test]
    fn superseded_run_wakeups_are_dropped() {
        let mut s = seq(0.0);
        let first = s.start(1.0, 0);
        s.tick(3_800);
        assert_eq!(s.phase(), Some(Phase::Scramble));
        let second = s.start(2.0, 3_800);
        assert_ne!(first, second);

        let events = s.tick(50_000);
        let completed: Vec<&SequencerEvent> = events
            .iter()
            .filter(|e| matches!(e, SequencerEvent::Completed { .. }))
            .collect();
        assert_eq!(completed.len(), 1, "only the live run may complete");
        assert!(matches!(
            completed[0],
            SequencerEvent::Completed { token, target } if *token == second && *target == 2.0
        ));
        assert!(s.dropped_wakeups() >= 1);
        assert!(
            events.iter().all(|e| match e {
                SequencerEvent::PhaseEntered { token, .. } => *token == second,
                SequencerEvent::Completed { token, .. } => *token == second,
            }),
            "no event may carry the superseded token"
        );
        assert_eq!(s.readout(), Readout::Value(2.0));
    }

    #[test]
    fn cancel_silences_pending_work() {
        let mut s = seq(0.25);
        s.start(3.0, 0);
        s.tick(600);
        s.cancel();
        assert!(!s.is_active());
        assert!(!s.has_pending());
        assert!(s.tick(60_000).is_empty());
        assert_eq!(s.readout(), Readout::Value(0.25));
    }

    #[test]
    fn visual_scales_then_fades() {
        let mut s = seq(0.0);
        assert_eq!(s.visual(0), Visual::IDLE);
        s.start(1.0, 0);
        assert_eq!(s.visual(0).scale, 1.0);
        assert_eq!(s.visual(250).scale, 2.0);
        s.tick(500);
        assert_eq!(s.visual(500).scale, FLASH_SCALE);
        assert_eq!(s.visual(3_500).scale, 1.0);
        s.tick(7_500);
        assert_eq!(s.phase(), Some(Phase::FadeOut));
        let mid = s.visual(8_500);
        assert_eq!(mid.scale, SHRUNK_SCALE);
        assert!((mid.opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_length_phases_still_complete() {
        let timings = PhaseTimings {
            flash_ms: 0,
            reveal_ms: 0,
            scramble_ms: 0,
            scramble_tick_ms: 0,
            converge_ms: 0,
            converge_tick_ms: 0,
            shrink_ms: 0,
            fade_out_ms: 0,
        };
        let mut s = Sequencer::with_rng(timings, 0.0, StdRng::seed_from_u64(1));
        s.start(5.5, 10);
        s.tick(10);
        assert!(!s.is_active());
        assert_eq!(s.readout().text(), "5.500000");
    }

    #[test]
    fn converge_value_endpoints() {
        assert_eq!(converge_value(1.0, 3.0, 0.0), 1.0);
        assert_eq!(converge_value(1.0, 3.0, 1.0), 3.0);
        assert_eq!(converge_value(1.0, 3.0, 1.7), 3.0);
        assert!((converge_value(0.0, 1.0, 0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn format_value_uses_six_decimals() {
        assert_eq!(format_value(0.0), "0.000000");
        assert_eq!(format_value(-1.5), "-1.500000");
        assert_eq!(format_value(123.4567891), "123.456789");
    }
}
