use serde::{Deserialize, Serialize};

/// Errors raised when configuring a timer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("work duration must be greater than zero")]
    ZeroWork,

    #[error("rest duration must be greater than zero")]
    ZeroRest,

    #[error("remaining time {remaining}s exceeds the longest phase ({max}s)")]
    RemainingOutOfRange { remaining: u32, max: u32 },

    #[error("round must start at 1")]
    ZeroRound,
}

/// Which half of the interval the timer is in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Work,
    Rest,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Rest,
            Phase::Rest => Phase::Work,
        }
    }

    pub fn is_work(self) -> bool {
        matches!(self, Phase::Work)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Work => "WORK",
            Phase::Rest => "REST",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Validated work/rest lengths in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    work_seconds: u32,
    rest_seconds: u32,
}

impl Durations {
    pub fn new(work_seconds: u32, rest_seconds: u32) -> Result<Self, TimerError> {
        if work_seconds == 0 {
            return Err(TimerError::ZeroWork);
        }
        if rest_seconds == 0 {
            return Err(TimerError::ZeroRest);
        }
        Ok(Self {
            work_seconds,
            rest_seconds,
        })
    }

    pub fn work_seconds(&self) -> u32 {
        self.work_seconds
    }

    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    pub fn for_phase(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_seconds,
            Phase::Rest => self.rest_seconds,
        }
    }

    /// Upper bound for `remaining`
    pub fn longest(&self) -> u32 {
        self.work_seconds.max(self.rest_seconds)
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work_seconds: 40,
            rest_seconds: 20,
        }
    }
}

/// What a single tick did to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is paused; nothing changed
    Idle,
    /// One second was counted down
    Counted,
    /// The phase ended and the timer moved into `Phase`
    Switched(Phase),
}

/// Work/rest interval timer.
///
/// Pure transition logic with no clock attached; something else has to call
/// [`TimerState::tick`] once per second while the timer runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    durations: Durations,
    running: bool,
    remaining: u32,
    phase: Phase,
    round: u32,
}

impl TimerState {
    pub fn new(durations: Durations) -> Self {
        Self {
            durations,
            running: false,
            remaining: durations.work_seconds(),
            phase: Phase::Work,
            round: 1,
        }
    }

    /// Rebuild a timer from mirrored fields, checking the range invariants.
    pub fn restore(
        durations: Durations,
        running: bool,
        remaining: u32,
        phase: Phase,
        round: u32,
    ) -> Result<Self, TimerError> {
        if round == 0 {
            return Err(TimerError::ZeroRound);
        }
        if remaining > durations.longest() {
            return Err(TimerError::RemainingOutOfRange {
                remaining,
                max: durations.longest(),
            });
        }
        Ok(Self {
            durations,
            running,
            remaining,
            phase,
            round,
        })
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Start counting. Returns false if the timer was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        if self.remaining == 0 {
            self.remaining = self.durations.for_phase(self.phase);
        }
        self.running = true;
        true
    }

    /// Stop counting. Returns false if the timer was already paused.
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.round = 1;
        self.remaining = self.durations.work_seconds();
    }

    /// Replace the phase lengths. Always resets.
    pub fn set_durations(&mut self, durations: Durations) {
        self.durations = durations;
        self.reset();
    }

    /// Advance one second.
    ///
    /// The countdown never rests on zero while running: the tick that would
    /// reach zero switches phase and loads the next phase's full duration.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        if self.remaining > 1 {
            self.remaining -= 1;
            return TickOutcome::Counted;
        }

        let next = self.phase.next();
        if next == Phase::Work {
            self.round += 1;
        }
        self.phase = next;
        self.remaining = self.durations.for_phase(next);
        TickOutcome::Switched(next)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}
