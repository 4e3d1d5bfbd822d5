use std::time::{Duration, Instant};

/// The deadlines a gesture can arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Overlay becomes visible when this expires.
    ShowDelay,
    /// Next sample of the live modifier state.
    WatchdogPoll,
    /// Fade-out finished, visibility state can be torn down.
    HideFade,
}

impl TimerKind {
    const ALL: [TimerKind; 3] = [
        TimerKind::ShowDelay,
        TimerKind::WatchdogPoll,
        TimerKind::HideFade,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKind::ShowDelay => 0,
            TimerKind::WatchdogPoll => 1,
            TimerKind::HideFade => 2,
        }
    }
}

/// One optional deadline per [`TimerKind`].
///
/// Arming a kind that is already armed replaces the old deadline, so a stale
/// timer can never fire after the transition that superseded it.
#[derive(Debug, Default, Clone)]
pub struct Timers {
    deadlines: [Option<Instant>; 3],
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: TimerKind, now: Instant, delay: Duration) {
        self.deadlines[kind.slot()] = Some(now + delay);
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 3];
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].is_some()
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Disarms and returns every kind due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<(Instant, TimerKind)> = TimerKind::ALL
            .iter()
            .filter_map(|kind| {
                self.deadlines[kind.slot()]
                    .filter(|deadline| *deadline <= now)
                    .map(|deadline| (deadline, *kind))
            })
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);
        for (_, kind) in &due {
            self.deadlines[kind.slot()] = None;
        }
        due.into_iter().map(|(_, kind)| kind).collect()
    }
}
