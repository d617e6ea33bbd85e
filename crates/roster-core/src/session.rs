//! Single-writer presence session.
//!
//! One task owns the [`PresenceStore`] and drains a FIFO command queue, so
//! events are applied strictly in arrival order. Queries travel the same
//! queue and are answered with owned copies.

use crate::snapshot::PresenceSnapshot;
use crate::store::{PresenceStore, StoreStats};
use roster_protocol::{Event, Identity};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Session errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The owning task has stopped.
    #[error("Presence session closed")]
    Closed,
}

/// Commands accepted by the session task.
#[derive(Debug)]
enum Command {
    Apply(Event),
    ConnectionLost,
    BeginResync(String),
    SetOwnNick(String),
    Query(Query),
    Shutdown,
}

#[derive(Debug)]
enum Query {
    Channels(oneshot::Sender<Vec<String>>),
    Members(String, oneshot::Sender<HashSet<String>>),
    IsOperator(String, String, oneshot::Sender<bool>),
    Identity(String, oneshot::Sender<Option<Identity>>),
    Snapshot(oneshot::Sender<PresenceSnapshot>),
    Stats(oneshot::Sender<StoreStats>),
}

/// The presence session task.
pub struct Session {
    store: PresenceStore,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Session {
    /// Spawn a session owning `store`.
    ///
    /// The join handle resolves to the store once every handle is dropped or
    /// [`SessionHandle::shutdown`] is processed.
    #[must_use]
    pub fn spawn(store: PresenceStore) -> (SessionHandle, JoinHandle<PresenceStore>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            store,
            commands: rx,
        };
        let task = tokio::spawn(session.run());
        (SessionHandle { commands: tx }, task)
    }

    async fn run(mut self) -> PresenceStore {
        debug!("Presence session started");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Apply(event) => {
                    if let Err(e) = self.store.apply(&event) {
                        warn!(kind = %event.kind(), error = %e, "Presence event rejected");
                    }
                }
                Command::ConnectionLost => self.store.connection_lost(),
                Command::BeginResync(channel) => self.store.begin_resync(&channel),
                Command::SetOwnNick(nick) => self.store.set_own_nick(nick),
                Command::Query(query) => self.answer(query),
                Command::Shutdown => break,
            }
        }

        debug!("Presence session stopped");
        self.store
    }

    fn answer(&self, query: Query) {
        // Send failures mean the caller stopped waiting.
        match query {
            Query::Channels(reply) => {
                let _ = reply.send(self.store.channels());
            }
            Query::Members(channel, reply) => {
                let _ = reply.send(self.store.channel_members(&channel));
            }
            Query::IsOperator(channel, nick, reply) => {
                let _ = reply.send(self.store.is_operator(&channel, &nick));
            }
            Query::Identity(nick, reply) => {
                let _ = reply.send(self.store.identity(&nick).cloned());
            }
            Query::Snapshot(reply) => {
                let _ = reply.send(self.store.snapshot());
            }
            Query::Stats(reply) => {
                let _ = reply.send(self.store.stats());
            }
        }
    }
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).map_err(|_| SessionError::Closed)
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Query,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Query(make(tx)))?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Queue an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub fn apply(&self, event: Event) -> Result<(), SessionError> {
        self.send(Command::Apply(event))
    }

    /// Queue a reset after the connection dropped.
    ///
    /// Events queued earlier are applied first and then cleared with the
    /// rest of the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub fn connection_lost(&self) -> Result<(), SessionError> {
        self.send(Command::ConnectionLost)
    }

    /// Queue a membership resync for a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub fn begin_resync(&self, channel: impl Into<String>) -> Result<(), SessionError> {
        self.send(Command::BeginResync(channel.into()))
    }

    /// Queue an own-nickname update.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub fn set_own_nick(&self, nick: impl Into<String>) -> Result<(), SessionError> {
        self.send(Command::SetOwnNick(nick.into()))
    }

    /// Get all tracked channel names.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn channels(&self) -> Result<Vec<String>, SessionError> {
        self.query(Query::Channels).await
    }

    /// Get a channel's members, empty if the channel is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn channel_members(
        &self,
        channel: impl Into<String>,
    ) -> Result<HashSet<String>, SessionError> {
        let channel = channel.into();
        self.query(|reply| Query::Members(channel, reply)).await
    }

    /// Check if a nickname holds operator status in a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn is_operator(
        &self,
        channel: impl Into<String>,
        nick: impl Into<String>,
    ) -> Result<bool, SessionError> {
        let (channel, nick) = (channel.into(), nick.into());
        self.query(|reply| Query::IsOperator(channel, nick, reply))
            .await
    }

    /// Get the last observed identity for a nickname.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn identity_of(
        &self,
        nick: impl Into<String>,
    ) -> Result<Option<Identity>, SessionError> {
        let nick = nick.into();
        self.query(|reply| Query::Identity(nick, reply)).await
    }

    /// Get a snapshot of the whole state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn snapshot(&self) -> Result<PresenceSnapshot, SessionError> {
        self.query(Query::Snapshot).await
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn stats(&self) -> Result<StoreStats, SessionError> {
        self.query(Query::Stats).await
    }

    /// Stop the session after the commands already queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has already stopped.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown)
    }
}
