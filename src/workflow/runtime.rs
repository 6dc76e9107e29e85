//! Kiosk runtime: drives a [`Session`] on a single task.
//!
//! The runtime owns the session and is the only place it is mutated. User
//! events arrive through a [`KioskHandle`]; effects returned by the session
//! are executed on spawned tasks, whose results come back on an internal
//! channel. Requests are never cancelled. Timers are aborted when replaced,
//! cancelled, or when the runtime stops.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::client::KioskBackend;
use crate::config::KioskSettings;
use crate::error::{KioskError, KioskResult};

use super::session::{Effect, Session, SessionEvent, TimerKind, ViewSnapshot};

const COMMAND_BUFFER: usize = 64;

struct Command {
    event: SessionEvent,
    reply: oneshot::Sender<ViewSnapshot>,
}

/// Cloneable handle for feeding events to a running kiosk and watching its view.
#[derive(Clone)]
pub struct KioskHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<ViewSnapshot>,
}

impl KioskHandle {
    /// Applies `event` and returns the view right after it was applied.
    pub async fn dispatch(&self, event: SessionEvent) -> KioskResult<ViewSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command { event, reply })
            .await
            .map_err(|_| KioskError::RuntimeClosed)?;
        response.await.map_err(|_| KioskError::RuntimeClosed)
    }

    /// The most recently published view.
    pub fn view(&self) -> ViewSnapshot {
        self.view.borrow().clone()
    }

    /// Waits until the published view satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> KioskResult<ViewSnapshot>
    where
        F: FnMut(&ViewSnapshot) -> bool,
    {
        let mut view = self.view.clone();
        let snapshot = view
            .wait_for(predicate)
            .await
            .map_err(|_| KioskError::RuntimeClosed)?;
        Ok(snapshot.clone())
    }
}

/// Starts the kiosk runtime on a new task.
///
/// The runtime stops once every [`KioskHandle`] has been dropped.
pub fn spawn_kiosk<B>(backend: Arc<B>, settings: KioskSettings) -> (KioskHandle, JoinHandle<()>)
where
    B: KioskBackend + 'static,
{
    let session = Session::new(settings);
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let (view_tx, view_rx) = watch::channel(session.snapshot());
    let (completions_tx, completions_rx) = mpsc::unbounded_channel();

    let runtime = KioskRuntime {
        session,
        backend,
        completions: completions_tx,
        timers: HashMap::new(),
        view: view_tx,
    };
    let task = tokio::spawn(runtime.run(commands_rx, completions_rx));

    (
        KioskHandle {
            commands: commands_tx,
            view: view_rx,
        },
        task,
    )
}

struct KioskRuntime<B> {
    session: Session,
    backend: Arc<B>,
    completions: mpsc::UnboundedSender<SessionEvent>,
    timers: HashMap<TimerKind, JoinHandle<()>>,
    view: watch::Sender<ViewSnapshot>,
}

impl<B> KioskRuntime<B>
where
    B: KioskBackend + 'static,
{
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        info!("Kiosk runtime started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command { event, reply }) => {
                        self.apply(event);
                        let _ = reply.send(self.session.snapshot());
                    }
                    None => break,
                },
                Some(event) = completions.recv() => self.apply(event),
            }
        }
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        info!("Kiosk runtime stopped");
    }

    fn apply(&mut self, event: SessionEvent) {
        for effect in self.session.handle(event) {
            self.execute(effect);
        }
        self.view.send_replace(self.session.snapshot());
    }

    fn execute(&mut self, effect: Effect) {
        debug!(effect = ?effect, "Executing effect");
        match effect {
            Effect::SubmitPin {
                request_id,
                pin,
                location,
            } => {
                let backend = self.backend.clone();
                let completions = self.completions.clone();
                tokio::spawn(async move {
                    let outcome = backend.submit_pin(&pin, location).await;
                    let _ = completions.send(SessionEvent::ClockResolved {
                        request_id,
                        outcome,
                    });
                });
            }
            Effect::ForceClockOut {
                workflow_id,
                active_record_id,
            } => {
                let backend = self.backend.clone();
                let completions = self.completions.clone();
                tokio::spawn(async move {
                    let result = backend
                        .force_clockout(active_record_id)
                        .await
                        .map_err(|err| err.user_message());
                    let _ = completions.send(SessionEvent::ForceClockOutResolved {
                        workflow_id,
                        result,
                    });
                });
            }
            Effect::ApproveShift {
                workflow_id,
                approval,
            } => {
                let backend = self.backend.clone();
                let completions = self.completions.clone();
                tokio::spawn(async move {
                    let result = backend
                        .approve_shift(approval)
                        .await
                        .map_err(|err| err.user_message());
                    let _ = completions.send(SessionEvent::ApprovalResolved {
                        workflow_id,
                        result,
                    });
                });
            }
            Effect::StartTimer {
                timer,
                token,
                after,
            } => {
                let completions = self.completions.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = completions.send(SessionEvent::TimerExpired { timer, token });
                });
                if let Some(previous) = self.timers.insert(timer, handle) {
                    previous.abort();
                }
            }
            Effect::CancelTimer { timer } => {
                if let Some(previous) = self.timers.remove(&timer) {
                    previous.abort();
                }
            }
        }
    }
}
