use std::fmt::Write as _;

use crate::catalog::Exercise;
use crate::session::{Role, Session, SessionCode};
use crate::timer::format_clock;

/// Status line for one moment of the session, e.g.
/// `[COACH ABC123 online] WORK 0:38  round 1  running`
pub fn status_line(session: &Session, role: Role, connected: bool) -> String {
    let timer = session.timer();
    let link = if connected { "online" } else { "local" };
    let state = if timer.is_running() {
        "running"
    } else {
        "paused"
    };
    format!(
        "[{} {} {}] {} {}  round {}  {}",
        role,
        session.code(),
        link,
        timer.phase(),
        format_clock(timer.remaining()),
        timer.round(),
        state
    )
}

/// Station assignments, one line per participant
pub fn station_list(exercises: &[Exercise]) -> String {
    let mut out = String::new();
    for (index, exercise) in exercises.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {}  (easier: {} / harder: {})",
            index + 1,
            exercise.main,
            exercise.regression,
            exercise.progression
        );
    }
    out
}

/// Shown to an athlete before the first snapshot arrives
pub fn waiting_line(code: &SessionCode, connected: bool) -> String {
    if connected {
        format!("[ATHLETE {code}] waiting for the coach...")
    } else {
        format!("[ATHLETE {code} local] no shared store; updates will not arrive")
    }
}

pub const CONTROLS_HELP: &str =
    "keys: s start | p pause | r reset | x shuffle | n <count> participants | d <work> <rest> durations | q quit";
