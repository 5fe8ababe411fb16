//! Event loop driving a [`GameSession`] against a server and a renderer.

use std::{sync::Arc, time::Instant};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::{
    error::ClientError,
    render::RenderAdapter,
    session::{AnimationId, Effect, GameSession, MoveReply, SessionOptions, SessionSnapshot},
    transport::{dispatch, GameServer},
};

/// Input from the render/input adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Click { column: i64 },
    Hover { column: i64 },
    NewGame,
}

enum Completion {
    Reply(Result<MoveReply, ClientError>),
    AnimationFinished(AnimationId),
}

/// Cloneable sender for input events. The controller stops once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn send(&self, event: SessionEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn click(&self, column: i64) -> bool {
        self.send(SessionEvent::Click { column })
    }

    pub fn hover(&self, column: i64) -> bool {
        self.send(SessionEvent::Hover { column })
    }

    pub fn new_game(&self) -> bool {
        self.send(SessionEvent::NewGame)
    }
}

pub struct GameSessionController<R: RenderAdapter> {
    session: GameSession,
    server: Arc<dyn GameServer>,
    renderer: R,
    warm_on_start: bool,
    input_rx: mpsc::UnboundedReceiver<SessionEvent>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl<R: RenderAdapter> GameSessionController<R> {
    pub fn new(
        options: SessionOptions,
        server: Arc<dyn GameServer>,
        renderer: R,
    ) -> (Self, SessionHandle) {
        let session = GameSession::new(options);
        let (snapshots, _) = watch::channel(session.snapshot());
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let controller = Self {
            session,
            server,
            renderer,
            warm_on_start: true,
            input_rx,
            completion_tx,
            completion_rx,
            snapshots,
        };
        (controller, SessionHandle { tx: input_tx })
    }

    pub fn with_warm_up(mut self, warm_on_start: bool) -> Self {
        self.warm_on_start = warm_on_start;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Runs until every [`SessionHandle`] is dropped, then hands the renderer back.
    pub async fn run(mut self) -> R {
        if self.warm_on_start {
            let server = self.server.clone();
            tokio::spawn(async move {
                match server.warm().await {
                    Ok(()) => debug!("server warm-up sent"),
                    Err(err) => debug!(error = %err, "server warm-up failed"),
                }
            });
        }

        let effects = self.session.start();
        self.apply(effects);

        loop {
            tokio::select! {
                event = self.input_rx.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    let effects = match event {
                        SessionEvent::Click { column } => self.session.click(column, Instant::now()),
                        SessionEvent::Hover { column } => self.session.hover(column),
                        SessionEvent::NewGame => self.session.new_game(),
                    };
                    self.apply(effects);
                }
                Some(completion) = self.completion_rx.recv() => {
                    let effects = match completion {
                        Completion::Reply(reply) => self.session.on_reply(reply),
                        Completion::AnimationFinished(id) => self.session.on_animation_complete(id),
                    };
                    self.apply(effects);
                }
            }
        }

        info!("session closed");
        self.renderer
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(request) => {
                    let server = self.server.clone();
                    let tx = self.completion_tx.clone();
                    tokio::spawn(async move {
                        let reply = dispatch(server.as_ref(), request).await;
                        let _ = tx.send(Completion::Reply(reply));
                    });
                }
                Effect::ClearBoard => self.renderer.clear_board(),
                Effect::DropDisc {
                    id,
                    player,
                    col,
                    row,
                    duration,
                } => {
                    self.renderer.drop_disc(&player, col, row, duration);
                    let tx = self.completion_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(duration).await;
                        let _ = tx.send(Completion::AnimationFinished(id));
                    });
                }
                Effect::ShowMessage(text) => self.renderer.show_message(&text),
                Effect::Alert(text) => self.renderer.alert(&text),
                Effect::MoveIndicator(col) => self.renderer.move_indicator(col),
            }
        }
        self.publish();
    }

    fn publish(&mut self) {
        let snapshot = self.session.snapshot();
        if *self.snapshots.borrow() == snapshot {
            return;
        }
        self.renderer.session_changed(&snapshot);
        self.snapshots.send_replace(snapshot);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
