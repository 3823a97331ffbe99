//! # Dispatcher
//!
//! Serializes the two inbound event sources, selection changes from the
//! host and messages from the surface, onto a single [`Session`].
//!
//! Selection changes are debounced; messages are handled immediately and
//! may produce a [`Response`]. Front ends either drive the dispatcher step
//! by step ([`Dispatcher::handle`], [`Dispatcher::tick`],
//! [`Dispatcher::next_deadline`]) from their own loop, or hand it a channel
//! with [`Dispatcher::run`].

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::debounce::Debouncer;
use crate::host::{ElementId, TextHost};
use crate::protocol::{Response, UiMessage};
use crate::session::{Session, Transition};
use crate::variables::VariableStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectionChanged(Vec<ElementId>),
    Message(UiMessage),
}

pub struct Dispatcher<H, V> {
    host: H,
    vars: V,
    session: Session,
    selection: Debouncer<Vec<ElementId>>,
    closed: bool,
}

impl<H: TextHost, V: VariableStore> Dispatcher<H, V> {
    pub fn new(host: H, vars: V, session: Session, quiet: Duration) -> Self {
        Self {
            host,
            vars,
            session,
            selection: Debouncer::new(quiet),
            closed: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn vars(&self) -> &V {
        &self.vars
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True once a `close` message has been handled.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_parts(self) -> (H, V, Session) {
        (self.host, self.vars, self.session)
    }

    /// Feeds one event in. Selection changes are held back until they
    /// settle; messages are answered right away.
    pub fn handle(&mut self, event: Event, now: Instant) -> Option<Response> {
        match event {
            Event::SelectionChanged(ids) => {
                self.selection.push(ids, now);
                None
            }
            Event::Message(message) => Some(self.handle_message(message)),
        }
    }

    /// Acts on a selection that has settled by `now`.
    pub fn tick(&mut self, now: Instant) -> Option<Transition> {
        let ids = self.selection.poll(now)?;
        Some(self.apply_selection(&ids))
    }

    /// Acts on a pending selection without waiting for it to settle.
    pub fn flush(&mut self) -> Option<Transition> {
        let ids = self.selection.flush()?;
        Some(self.apply_selection(&ids))
    }

    /// When [`Dispatcher::tick`] next has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.selection.deadline()
    }

    /// Handles events until `close` arrives or every sender is gone. A
    /// selection still pending when the senders disconnect is applied
    /// before returning.
    pub fn run(&mut self, events: &Receiver<Event>, replies: &Sender<Response>) {
        while !self.closed {
            let received = match self.next_deadline() {
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match events.recv_timeout(timeout) {
                        Ok(event) => Some(event),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match events.recv() {
                    Ok(event) => Some(event),
                    Err(_) => break,
                },
            };

            let now = Instant::now();
            if let Some(event) = received
                && let Some(response) = self.handle(event, now)
                && replies.send(response).is_err()
            {
                log::debug!("Response dropped, nobody is listening");
            }
            self.tick(now);
        }

        if !self.closed {
            self.flush();
        }
    }

    fn apply_selection(&mut self, ids: &[ElementId]) -> Transition {
        let transition = self
            .session
            .on_selection_changed(&mut self.host, &mut self.vars, ids);
        log::debug!("Selection {ids:?}: {transition:?}");
        transition
    }

    fn handle_message(&mut self, message: UiMessage) -> Response {
        log::debug!("Message {message:?}");
        match message {
            UiMessage::Init => Response::Init {
                collections: self.vars.collection_names(),
                settings: self.session.settings().clone(),
                enabled: self.session.is_enabled(),
            },
            UiMessage::Set(update) => {
                self.session.update_settings(&mut self.host, &update);
                Response::Settings {
                    settings: self.session.settings().clone(),
                    enabled: self.session.is_enabled(),
                }
            }
            UiMessage::RunOnSelection => Response::RunResult {
                results: self.session.run_on_selection(&mut self.host, &mut self.vars),
            },
            UiMessage::RestoreOnSelection => Response::RestoreResult {
                results: self.session.restore_on_selection(&mut self.host),
            },
            UiMessage::Resize { width, height } => Response::Resize { width, height },
            UiMessage::Hide => Response::Hide,
            UiMessage::Close => {
                self.closed = true;
                Response::Close
            }
        }
    }
}
