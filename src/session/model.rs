use chrono::{DateTime, Duration as ChronoDuration, Utc};

use super::{SessionCode, SessionError};
use crate::catalog::Exercise;
use crate::timer::{Durations, TimerState};

/// How this client takes part in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Unconnected single-device timer
    Solo,
    /// Owns the session and publishes every change
    Coach,
    /// Read-only mirror of a coach
    Athlete,
}

impl Role {
    /// Whether this role may start, pause, reset or reshuffle
    pub fn can_control(&self) -> bool {
        matches!(self, Role::Solo | Role::Coach)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Solo => "SOLO",
            Role::Coach => "COACH",
            Role::Athlete => "ATHLETE",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Settings a coach starts a session with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub participants: usize,
    pub durations: Durations,
    /// Seed for station shuffling; random when `None`
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn new(participants: usize, work_seconds: u32, rest_seconds: u32) -> Result<Self, SessionError> {
        if participants == 0 {
            return Err(SessionError::NoParticipants);
        }
        Ok(Self {
            participants,
            durations: Durations::new(work_seconds, rest_seconds)?,
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            participants: 4,
            durations: Durations::default(),
            seed: None,
        }
    }
}

/// Replicated session state
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    code: SessionCode,
    participants: usize,
    timer: TimerState,
    exercises: Vec<Exercise>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Fresh session: round 1, work phase, paused, no stations yet
    pub fn new(code: SessionCode, participants: usize, durations: Durations) -> Self {
        Self {
            code,
            participants,
            timer: TimerState::new(durations),
            exercises: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Assemble a session from already-validated parts
    pub(crate) fn from_parts(
        code: SessionCode,
        participants: usize,
        timer: TimerState,
        exercises: Vec<Exercise>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            participants,
            timer,
            exercises,
            updated_at,
        }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn participants(&self) -> usize {
        self.participants
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Same replicated fields, ignoring `updated_at`
    pub fn same_state(&self, other: &Session) -> bool {
        self.participants == other.participants
            && self.timer == other.timer
            && self.exercises == other.exercises
    }

    pub(crate) fn timer_mut(&mut self) -> &mut TimerState {
        &mut self.timer
    }

    pub(crate) fn set_participants(&mut self, participants: usize) {
        self.participants = participants;
    }

    pub(crate) fn set_exercises(&mut self, exercises: Vec<Exercise>) {
        self.exercises = exercises;
    }

    /// Stamp the session with `now`, keeping stamps strictly increasing
    /// even when the wall clock has not moved on.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at + ChronoDuration::milliseconds(1);
        self.updated_at = now.max(floor);
    }
}
