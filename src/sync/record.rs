use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Exercise;
use crate::session::{Session, SessionCode};
use crate::timer::{Durations, Phase, TimerError, TimerState};

/// Why an inbound snapshot could not become a session
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid timer fields: {0}")]
    Timer(#[from] TimerError),

    #[error("Snapshot has no participants")]
    NoParticipants,

    #[error("Snapshot lists {exercises} stations for {participants} participants")]
    TooManyExercises {
        exercises: usize,
        participants: usize,
    },

    #[error("Snapshot timestamp {0} is out of range")]
    Timestamp(i64),
}

/// Full session snapshot as stored at `sessions/{code}`.
///
/// Every field is written on every publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub participants: usize,
    pub work_time: u32,
    pub rest_time: u32,
    pub is_running: bool,
    pub time_left: u32,
    pub is_work_phase: bool,
    pub current_round: u32,
    pub exercises: Vec<Exercise>,
    /// Epoch milliseconds of the coach-side change
    pub last_update: i64,
}

impl SessionRecord {
    pub fn to_snapshot(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_snapshot(snapshot: serde_json::Value) -> Result<Self, RecordError> {
        Ok(serde_json::from_value(snapshot)?)
    }

    /// Rebuild the session this record describes
    pub fn into_session(self, code: SessionCode) -> Result<Session, RecordError> {
        if self.participants == 0 {
            return Err(RecordError::NoParticipants);
        }
        if self.exercises.len() > self.participants {
            return Err(RecordError::TooManyExercises {
                exercises: self.exercises.len(),
                participants: self.participants,
            });
        }

        let durations = Durations::new(self.work_time, self.rest_time)?;
        let phase = if self.is_work_phase {
            Phase::Work
        } else {
            Phase::Rest
        };
        let timer = TimerState::restore(
            durations,
            self.is_running,
            self.time_left,
            phase,
            self.current_round,
        )?;
        let updated_at = DateTime::<Utc>::from_timestamp_millis(self.last_update)
            .ok_or(RecordError::Timestamp(self.last_update))?;

        Ok(Session::from_parts(
            code,
            self.participants,
            timer,
            self.exercises,
            updated_at,
        ))
    }
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        let timer = session.timer();
        let durations = timer.durations();
        Self {
            participants: session.participants(),
            work_time: durations.work_seconds(),
            rest_time: durations.rest_seconds(),
            is_running: timer.is_running(),
            time_left: timer.remaining(),
            is_work_phase: timer.phase().is_work(),
            current_round: timer.round(),
            exercises: session.exercises().to_vec(),
            last_update: session.updated_at().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EXERCISES;
    use serde_json::json;

    fn code() -> SessionCode {
        "ABC123".parse().unwrap()
    }

    fn sample() -> SessionRecord {
        SessionRecord {
            participants: 2,
            work_time: 40,
            rest_time: 20,
            is_running: true,
            time_left: 12,
            is_work_phase: false,
            current_round: 3,
            exercises: vec![EXERCISES[0].clone(), EXERCISES[4].clone()],
            last_update: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_wire_field_names() {
        let value = sample().to_snapshot().unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "currentRound",
                "exercises",
                "isRunning",
                "isWorkPhase",
                "lastUpdate",
                "participants",
                "restTime",
                "timeLeft",
                "workTime",
            ]
        );
        assert_eq!(value["exercises"][1]["main"], json!("DB Step-Up"));
    }

    #[test]
    fn test_into_session() {
        let session = sample().into_session(code()).unwrap();
        assert_eq!(session.participants(), 2);
        assert_eq!(session.timer().phase(), Phase::Rest);
        assert_eq!(session.timer().remaining(), 12);
        assert_eq!(session.timer().round(), 3);
        assert!(session.timer().is_running());
        assert_eq!(session.exercises().len(), 2);
        assert_eq!(session.updated_at().timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_record_from_session_matches_fields() {
        let session = sample().into_session(code()).unwrap();
        assert_eq!(SessionRecord::from(&session), sample());
    }

    #[test]
    fn test_rejects_invalid_records() {
        let mut record = sample();
        record.work_time = 0;
        assert!(matches!(
            record.into_session(code()),
            Err(RecordError::Timer(TimerError::ZeroWork))
        ));

        let mut record = sample();
        record.participants = 1;
        assert!(matches!(
            record.into_session(code()),
            Err(RecordError::TooManyExercises { exercises: 2, participants: 1 })
        ));

        let mut record = sample();
        record.time_left = 90;
        assert!(matches!(record.into_session(code()), Err(RecordError::Timer(_))));
    }

    #[test]
    fn test_missing_field_is_decode_error() {
        let mut value = sample().to_snapshot().unwrap();
        value.as_object_mut().unwrap().remove("timeLeft");
        assert!(matches!(
            SessionRecord::from_snapshot(value),
            Err(RecordError::Decode(_))
        ));
    }
}
