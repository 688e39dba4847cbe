use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use tokio::sync::watch;

use super::{Role, Session, SessionCode, SessionError};
use crate::catalog;
use crate::sync::Publisher;
use crate::timer::{Durations, TickOutcome, Ticker};

struct CoachState {
    session: Session,
    /// Bumped whenever the ticker is (re)armed or disarmed, so a tick that
    /// raced a pause cannot count down afterwards
    epoch: u64,
}

struct Shared {
    state: Mutex<CoachState>,
    watch_tx: watch::Sender<Session>,
    publisher: Mutex<Option<Publisher>>,
}

impl Shared {
    /// Stamp, publish and broadcast the current state
    fn commit(&self, state: &mut CoachState) {
        state.session.touch(Utc::now());
        if let Some(publisher) = self.publisher.lock().as_ref() {
            publisher.publish(&state.session);
        }
        self.watch_tx.send_replace(state.session.clone());
    }
}

/// Controlling handle for a session.
///
/// Held by the coach, or by a solo user running the timer unconnected.
/// Every mutation that changes the session is published when a publisher
/// is attached.
pub struct CoachSession {
    role: Role,
    shared: Arc<Shared>,
    ticker: Ticker,
    rng: StdRng,
}

impl CoachSession {
    pub(crate) fn new(
        role: Role,
        mut session: Session,
        publisher: Option<Publisher>,
        mut rng: StdRng,
    ) -> Self {
        let exercises = catalog::randomize(session.participants(), &mut rng);
        session.set_exercises(exercises);
        session.timer_mut().reset();

        let (watch_tx, _) = watch::channel(session.clone());
        let shared = Arc::new(Shared {
            state: Mutex::new(CoachState { session, epoch: 0 }),
            watch_tx,
            publisher: Mutex::new(publisher),
        });

        {
            let mut state = shared.state.lock();
            shared.commit(&mut state);
        }

        Self {
            role,
            shared,
            ticker: Ticker::default(),
            rng,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn code(&self) -> SessionCode {
        self.shared.state.lock().session.code().clone()
    }

    pub fn is_publishing(&self) -> bool {
        self.shared.publisher.lock().is_some()
    }

    /// Current state
    pub fn snapshot(&self) -> Session {
        self.shared.state.lock().session.clone()
    }

    /// Receiver that sees every committed change
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.shared.watch_tx.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    /// Start the countdown. Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        let epoch = {
            let mut state = self.shared.state.lock();
            if !state.session.timer_mut().start() {
                return false;
            }
            state.epoch += 1;
            self.shared.commit(&mut state);
            state.epoch
        };

        let shared = Arc::clone(&self.shared);
        self.ticker.spawn(move || {
            let mut state = shared.state.lock();
            if state.epoch != epoch {
                return ControlFlow::Break(());
            }
            match state.session.timer_mut().tick() {
                TickOutcome::Idle => ControlFlow::Break(()),
                TickOutcome::Counted => {
                    shared.commit(&mut state);
                    ControlFlow::Continue(())
                }
                TickOutcome::Switched(phase) => {
                    tracing::debug!(
                        code = %state.session.code(),
                        %phase,
                        round = state.session.timer().round(),
                        "Phase switched"
                    );
                    shared.commit(&mut state);
                    ControlFlow::Continue(())
                }
            }
        });

        tracing::debug!(code = %self.code(), "Timer started");
        true
    }

    /// Stop the countdown. Returns false if it was already paused.
    pub fn pause(&mut self) -> bool {
        self.ticker.cancel();
        let mut state = self.shared.state.lock();
        state.epoch += 1;
        if !state.session.timer_mut().pause() {
            return false;
        }
        self.shared.commit(&mut state);
        true
    }

    /// Back to round 1, work phase, paused
    pub fn reset(&mut self) {
        self.ticker.cancel();
        let mut state = self.shared.state.lock();
        state.epoch += 1;
        let before = state.session.clone();
        state.session.timer_mut().reset();
        if !state.session.same_state(&before) {
            self.shared.commit(&mut state);
        }
    }

    /// Deal a fresh set of stations and reset the timer
    pub fn randomize(&mut self) {
        self.ticker.cancel();
        let mut state = self.shared.state.lock();
        state.epoch += 1;
        let exercises = catalog::randomize(state.session.participants(), &mut self.rng);
        state.session.set_exercises(exercises);
        state.session.timer_mut().reset();
        self.shared.commit(&mut state);
    }

    /// Change the number of participants, dealing new stations
    pub fn set_participants(&mut self, participants: usize) -> Result<(), SessionError> {
        if participants == 0 {
            return Err(SessionError::NoParticipants);
        }
        self.ticker.cancel();
        let mut state = self.shared.state.lock();
        state.epoch += 1;
        state.session.set_participants(participants);
        let exercises = catalog::randomize(participants, &mut self.rng);
        state.session.set_exercises(exercises);
        state.session.timer_mut().reset();
        self.shared.commit(&mut state);
        Ok(())
    }

    /// Change the phase lengths. Resets the timer.
    pub fn set_durations(&mut self, work_seconds: u32, rest_seconds: u32) -> Result<(), SessionError> {
        let durations = Durations::new(work_seconds, rest_seconds)?;
        self.ticker.cancel();
        let mut state = self.shared.state.lock();
        state.epoch += 1;
        let before = state.session.clone();
        state.session.timer_mut().set_durations(durations);
        if !state.session.same_state(&before) {
            self.shared.commit(&mut state);
        }
        Ok(())
    }

    /// Stop ticking and flush pending snapshots to the store
    pub async fn close(mut self) {
        self.ticker.cancel();
        self.shared.state.lock().epoch += 1;
        let publisher = self.shared.publisher.lock().take();
        if let Some(publisher) = publisher {
            publisher.close().await;
        }
        tracing::debug!(code = %self.code(), "Session closed");
    }
}
