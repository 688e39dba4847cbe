//! Runs the CLI commands: interactive coach/solo controls, the athlete view
//! and the relay.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::catalog::Exercise;
use crate::cli::{Command, TimerArgs};
use crate::config::Config;
use crate::relay::{self, RelayConfig, RelayState};
use crate::session::{CoachSession, Role, Session, SessionCode, SessionManager};
use crate::store::HttpStore;
use crate::sync::ReplicationOrdering;
use crate::ui;

/// One line of coach input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Start,
    Pause,
    Reset,
    Shuffle,
    Participants(usize),
    Durations(u32, u32),
    Quit,
}

/// Parse a line typed by the coach. Unknown or incomplete input is `None`.
pub fn parse_control(line: &str) -> Option<Control> {
    let mut parts = line.split_whitespace();
    let key = parts.next()?.to_ascii_lowercase();
    let control = match key.as_str() {
        "s" => Control::Start,
        "p" => Control::Pause,
        "r" => Control::Reset,
        "x" => Control::Shuffle,
        "q" => Control::Quit,
        "n" => Control::Participants(parts.next()?.parse().ok()?),
        "d" => {
            let work = parts.next()?.parse().ok()?;
            let rest = parts.next()?.parse().ok()?;
            Control::Durations(work, rest)
        }
        _ => return None,
    };
    Some(control)
}

/// Prints the session whenever it changes
struct Renderer {
    role: Role,
    connected: bool,
    stations: Option<Vec<Exercise>>,
}

impl Renderer {
    fn new(role: Role, connected: bool) -> Self {
        Self {
            role,
            connected,
            stations: None,
        }
    }

    fn render(&mut self, session: &Session) {
        if self.stations.as_deref() != Some(session.exercises()) {
            println!("Stations:");
            print!("{}", ui::station_list(session.exercises()));
            self.stations = Some(session.exercises().to_vec());
        }
        println!("{}", ui::status_line(session, self.role, self.connected));
    }
}

pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self, command: Command) -> Result<()> {
        match command {
            Command::Code => {
                println!("{}", SessionCode::generate());
                Ok(())
            }
            Command::Solo(args) => self.run_solo(args).await,
            Command::Coach(args) => self.run_coach(args).await,
            Command::Join {
                code,
                store,
                ordering,
            } => self.run_join(&code, store, ordering).await,
            Command::Relay { host, port } => self.run_relay(host, port).await,
        }
    }

    fn apply_timer_args(&mut self, args: &TimerArgs) {
        if let Some(participants) = args.participants {
            self.config.session.participants = participants;
        }
        if let Some(work) = args.work {
            self.config.session.work_seconds = work;
        }
        if let Some(rest) = args.rest {
            self.config.session.rest_seconds = rest;
        }
        if args.store.is_some() {
            self.config.store.url = args.store.clone();
        }
    }

    async fn manager(&self) -> SessionManager {
        let manager = match &self.config.store.url {
            Some(url) => {
                let store = Arc::new(
                    HttpStore::new(url.clone())
                        .with_retry(self.config.store.retry)
                        .with_write_timeout(self.config.store.write_timeout),
                );
                SessionManager::connect(store, self.config.store.probe_timeout).await
            }
            None => SessionManager::local_only(),
        };
        manager.with_ordering(self.config.sync.ordering)
    }

    async fn run_solo(mut self, args: TimerArgs) -> Result<()> {
        self.apply_timer_args(&args);
        let session_config = self.config.session_config()?;
        let coach = SessionManager::local_only().standalone(&session_config);
        drive_controls(coach, false).await
    }

    async fn run_coach(mut self, args: TimerArgs) -> Result<()> {
        self.apply_timer_args(&args);
        let session_config = self.config.session_config()?;
        let manager = self.manager().await;
        let coach = manager.create_session(&session_config);

        if manager.is_connected() {
            println!("Session code: {}", coach.code());
        } else {
            println!("Session code: {} (store unavailable, not shared)", coach.code());
        }
        drive_controls(coach, manager.is_connected()).await
    }

    async fn run_join(
        mut self,
        code: &str,
        store: Option<String>,
        ordering: Option<ReplicationOrdering>,
    ) -> Result<()> {
        if store.is_some() {
            self.config.store.url = store;
        }
        if let Some(ordering) = ordering {
            self.config.sync.ordering = ordering;
        }

        let manager = self.manager().await;
        let Some(athlete) = manager.join_session(code).await? else {
            println!("No session code given");
            return Ok(());
        };
        tracing::info!(
            code = %athlete.code(),
            ordering = manager.ordering().as_str(),
            "Following session"
        );

        println!("{}", ui::waiting_line(athlete.code(), manager.is_connected()));
        follow(athlete.watch(), manager.is_connected()).await?;
        athlete.leave();
        Ok(())
    }

    async fn run_relay(mut self, host: Option<String>, port: Option<u16>) -> Result<()> {
        if let Some(host) = host {
            self.config.relay.host = host;
        }
        if let Some(port) = port {
            self.config.relay.port = port;
        }
        let config = RelayConfig::from(&self.config.relay);
        relay::run_server(RelayState::default(), config).await
    }
}

/// Apply a control to the coach. Returns false on quit.
fn apply_control(coach: &mut CoachSession, control: Control) -> bool {
    let result = match control {
        Control::Start => {
            coach.start();
            Ok(())
        }
        Control::Pause => {
            coach.pause();
            Ok(())
        }
        Control::Reset => {
            coach.reset();
            Ok(())
        }
        Control::Shuffle => {
            coach.randomize();
            Ok(())
        }
        Control::Participants(count) => coach.set_participants(count),
        Control::Durations(work, rest) => coach.set_durations(work, rest),
        Control::Quit => return false,
    };
    if let Err(err) = result {
        eprintln!("{err}");
    }
    true
}

/// Read controls from stdin until `q`, end of input or Ctrl-C
async fn drive_controls(mut coach: CoachSession, connected: bool) -> Result<()> {
    let mut renderer = Renderer::new(coach.role(), connected);
    let mut rx = coach.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", ui::CONTROLS_HELP);
    renderer.render(&rx.borrow_and_update());

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = rx.borrow_and_update().clone();
                renderer.render(&session);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_control(&line) {
                    Some(control) => {
                        if !apply_control(&mut coach, control) {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("{}", ui::CONTROLS_HELP),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    coach.close().await;
    Ok(())
}

/// Print the mirrored session until `q` or Ctrl-C
async fn follow(mut rx: watch::Receiver<Option<Session>>, connected: bool) -> Result<()> {
    let mut renderer = Renderer::new(Role::Athlete, connected);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = rx.borrow_and_update().clone();
                if let Some(session) = view {
                    renderer.render(&session);
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) if parse_control(&line) == Some(Control::Quit) => break,
                    Some(_) => {}
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
