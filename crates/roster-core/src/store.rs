//! The presence store.
//!
//! The store owns the channel membership and nickname identity maps and
//! applies presence events to them in arrival order.

use crate::channel::{Channel, ChannelName};
use crate::snapshot::{ChannelSnapshot, PresenceSnapshot};
use roster_protocol::{CaseMapping, Event, Identity, OpChange};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Privilege markers that may prefix a nickname in a names reply.
pub const PREFIX_MARKERS: [char; 5] = ['~', '&', '@', '%', '+'];

/// Markers that imply channel operator status or higher.
const OPERATOR_MARKERS: [char; 3] = ['~', '&', '@'];

/// Channel field of a who reply for a user sharing no visible channel.
const NO_CHANNEL: &str = "*";

/// Presence errors.
///
/// Every variant is a desynchronization between the server and the local
/// view. They are only returned when the store is strict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    /// Channel is not tracked.
    #[error("Channel not tracked: {0}")]
    UnknownChannel(String),

    /// Nickname is not a member of the channel.
    #[error("{nick} is not a member of {channel}")]
    NotMember {
        /// Channel name.
        channel: String,
        /// Normalized nickname.
        nick: String,
    },

    /// Nickname has never been observed.
    #[error("Nickname not known: {0}")]
    UnknownNick(String),
}

/// Store configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    /// Case-mapping used to normalize nicknames.
    pub casemapping: CaseMapping,
    /// Return desyncs as errors instead of logging them.
    pub strict: bool,
}

/// Store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of tracked channels.
    pub channels: usize,
    /// Number of known nicknames.
    pub nicks: usize,
    /// Desyncs observed since the store was created.
    pub desyncs: u64,
}

/// The presence store.
///
/// Tracks which channels exist, who is in each of them, and the most recent
/// identity observed for every nickname. All mutation goes through the event
/// handlers; queries hand out owned data or shared references that cannot
/// outlive the borrow.
///
/// The bot's own nickname is never added by a join. Names and who replies
/// are taken as the server sends them.
#[derive(Debug, Default)]
pub struct PresenceStore {
    /// Channels indexed by name.
    channels: HashMap<ChannelName, Channel>,
    /// Normalized nickname -> last observed identity.
    nicks: HashMap<String, Identity>,
    /// Our current nickname, original case.
    own_nick: Option<String>,
    /// Desync counter.
    desyncs: u64,
    /// Configuration.
    config: StoreConfig,
}

impl PresenceStore {
    /// Create a new store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store with custom configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        debug!(?config, "Creating presence store");
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get our own nickname.
    #[must_use]
    pub fn own_nick(&self) -> Option<&str> {
        self.own_nick.as_deref()
    }

    /// Set our own nickname.
    pub fn set_own_nick(&mut self, nick: impl Into<String>) {
        let nick = nick.into();
        debug!(nick = %nick, "Own nickname set");
        self.own_nick = Some(nick);
    }

    /// Normalize a nickname under the configured case-mapping.
    #[must_use]
    pub fn normalize(&self, nick: &str) -> String {
        self.config.casemapping.normalize(nick)
    }

    fn is_self(&self, lnick: &str) -> bool {
        self.own_nick
            .as_deref()
            .is_some_and(|own| self.normalize(own) == lnick)
    }

    fn desync(&mut self, error: PresenceError) -> Result<(), PresenceError> {
        self.desyncs += 1;
        if self.config.strict {
            return Err(error);
        }
        warn!(error = %error, "Presence desync ignored");
        Ok(())
    }

    fn in_any_channel(&self, lnick: &str) -> bool {
        self.channels.values().any(|c| c.contains(lnick))
    }

    /// Apply a single event.
    ///
    /// # Errors
    ///
    /// Returns a desync error if the store is strict and the event references
    /// state that is not tracked.
    pub fn apply(&mut self, event: &Event) -> Result<(), PresenceError> {
        trace!(kind = %event.kind(), "Applying event");
        match event {
            Event::Welcome { nick } => {
                self.connection_established();
                self.set_own_nick(nick.clone());
                Ok(())
            }
            Event::Join { who, channel } => {
                self.join(who, channel);
                Ok(())
            }
            Event::Part { who, channel } => self.part(who, channel),
            Event::Kick { channel, nick } => self.kick(channel, nick),
            Event::Quit { who } => {
                self.quit(who);
                Ok(())
            }
            Event::Nick { who, new_nick } => self.nick(who, new_nick),
            Event::Names { channel, nicknames } => {
                self.names_reply(channel, nicknames);
                Ok(())
            }
            Event::Who {
                channel,
                nick,
                user,
                host,
            } => {
                self.who_reply(channel, nick, user, host);
                Ok(())
            }
            Event::Mode { channel, changes } => self.mode(channel, changes),
            Event::Disconnected => {
                self.connection_lost();
                Ok(())
            }
        }
    }

    /// Reset to the empty state at the start of a connection.
    pub fn connection_established(&mut self) {
        self.reset();
        info!("Presence store ready");
    }

    /// Reset to the empty state after the connection dropped.
    pub fn connection_lost(&mut self) {
        self.reset();
        info!("Presence store cleared");
    }

    fn reset(&mut self) {
        self.channels.clear();
        self.nicks.clear();
    }

    /// Handle a user joining a channel.
    ///
    /// Our own joins are ignored.
    pub fn join(&mut self, who: &Identity, channel: &str) {
        let lnick = self.normalize(who.nick());
        if self.is_self(&lnick) {
            trace!(channel = %channel, "Ignoring own join");
            return;
        }

        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| {
                debug!(channel = %channel, "Tracking new channel");
                Channel::new()
            })
            .add(lnick.clone());
        debug!(channel = %channel, nick = %who.nick(), "Joined");
        self.nicks.insert(lnick, who.clone());
    }

    /// Handle a user leaving a channel.
    ///
    /// When we leave, the whole channel is forgotten. When someone else
    /// leaves, their identity is dropped if they share no other channel.
    ///
    /// # Errors
    ///
    /// Returns a desync error (strict stores only) if the user was not a
    /// member of the channel.
    pub fn part(&mut self, who: &Identity, channel: &str) -> Result<(), PresenceError> {
        let lnick = self.normalize(who.nick());
        self.depart(lnick, channel)
    }

    /// Handle a user being kicked from a channel.
    ///
    /// # Errors
    ///
    /// Returns a desync error (strict stores only) if the user was not a
    /// member of the channel.
    pub fn kick(&mut self, channel: &str, nick: &str) -> Result<(), PresenceError> {
        let lnick = self.normalize(nick);
        self.depart(lnick, channel)
    }

    fn depart(&mut self, lnick: String, channel: &str) -> Result<(), PresenceError> {
        if self.is_self(&lnick) {
            if self.channels.remove(channel).is_some() {
                debug!(channel = %channel, "Left channel, membership dropped");
            }
            return Ok(());
        }

        let Some(entry) = self.channels.get_mut(channel) else {
            return self.desync(PresenceError::UnknownChannel(channel.to_string()));
        };
        if !entry.remove(&lnick) {
            return self.desync(PresenceError::NotMember {
                channel: channel.to_string(),
                nick: lnick,
            });
        }
        debug!(channel = %channel, nick = %lnick, "Left");

        if !self.in_any_channel(&lnick) {
            self.nicks.remove(&lnick);
            trace!(nick = %lnick, "Identity no longer observable, dropped");
        }
        Ok(())
    }

    /// Handle a user disconnecting from the network.
    ///
    /// Our own quit clears the store. Repeated quits are no-ops.
    pub fn quit(&mut self, who: &Identity) {
        let lnick = self.normalize(who.nick());
        if self.is_self(&lnick) {
            self.connection_lost();
            return;
        }

        for channel in self.channels.values_mut() {
            channel.remove(&lnick);
        }
        if self.nicks.remove(&lnick).is_some() {
            debug!(nick = %who.nick(), "Quit");
        } else {
            trace!(nick = %who.nick(), "Quit for unknown nickname");
        }
    }

    /// Handle a nickname change.
    ///
    /// Memberships and operator status move to the new nickname; the known
    /// user and host are kept.
    ///
    /// # Errors
    ///
    /// Returns a desync error (strict stores only) if someone else's old
    /// nickname was never observed.
    pub fn nick(&mut self, who: &Identity, new_nick: &str) -> Result<(), PresenceError> {
        let old = self.normalize(who.nick());
        let new = self.normalize(new_nick);
        let ourselves = self.is_self(&old);
        if ourselves {
            self.set_own_nick(new_nick);
        }

        let mut renamed = false;
        for channel in self.channels.values_mut() {
            renamed |= channel.rename(&old, &new);
        }

        match self.nicks.remove(&old) {
            Some(identity) => {
                self.nicks.insert(new, identity.with_nick(new_nick));
            }
            None if renamed => {
                self.nicks.insert(new, who.with_nick(new_nick));
            }
            None if ourselves => {}
            None => return self.desync(PresenceError::UnknownNick(old)),
        }
        debug!(old = %who.nick(), new = %new_nick, "Nick changed");
        Ok(())
    }

    /// Handle one line of a names reply.
    ///
    /// Each space-separated token is a nickname with optional privilege
    /// markers. Members are only ever added, so multi-line replies accumulate.
    /// A nickname with no known identity gets a bare one; an identity that
    /// already carries user and host is kept.
    pub fn names_reply(&mut self, channel: &str, nicknames: &str) {
        let casemapping = self.config.casemapping;
        let entry = self.channels.entry(channel.to_string()).or_default();
        let mut added = 0;

        for token in nicknames.split(' ') {
            let nick = token.trim_start_matches(PREFIX_MARKERS);
            if nick.is_empty() {
                if !token.is_empty() {
                    trace!(channel = %channel, token = %token, "Skipping marker-only token");
                }
                continue;
            }

            let markers = &token[..token.len() - nick.len()];
            let lnick = casemapping.normalize(nick);
            entry.add(lnick.clone());
            if markers.contains(OPERATOR_MARKERS) {
                entry.set_operator(&lnick, true);
            }

            let identity = match self.nicks.get(&lnick) {
                Some(known) if known.is_complete() => known.with_nick(nick),
                _ => Identity::bare(nick),
            };
            self.nicks.insert(lnick, identity);
            added += 1;
        }

        debug!(channel = %channel, count = added, "Names reply applied");
    }

    /// Handle one line of a who reply, recording a complete identity.
    ///
    /// A reply for a user with no visible channel carries `*` in place of the
    /// channel; only the identity is recorded then.
    pub fn who_reply(&mut self, channel: &str, nick: &str, user: &str, host: &str) {
        let lnick = self.normalize(nick);
        if channel != NO_CHANNEL {
            self.channels
                .entry(channel.to_string())
                .or_default()
                .add(lnick.clone());
        }
        self.nicks.insert(lnick, Identity::new(nick, user, host));
        trace!(channel = %channel, nick = %nick, "Who reply applied");
    }

    /// Handle channel operator status changes.
    ///
    /// Our own nickname is only listed through names and who replies, so a
    /// change for it is applied when present and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns the first desync error (strict stores only) if the channel is
    /// not tracked or a target is not a member. Valid changes are still
    /// applied.
    pub fn mode(&mut self, channel: &str, changes: &[OpChange]) -> Result<(), PresenceError> {
        if !self.channels.contains_key(channel) {
            return self.desync(PresenceError::UnknownChannel(channel.to_string()));
        }

        let mut result = Ok(());
        for change in changes {
            let lnick = self.normalize(&change.nick);
            if self.is_self(&lnick) && !self.is_member(channel, &lnick) {
                trace!(channel = %channel, granted = change.granted, "Own operator status not tracked");
                continue;
            }
            let applied = self
                .channels
                .get_mut(channel)
                .is_some_and(|c| c.set_operator(&lnick, change.granted));
            if applied {
                debug!(channel = %channel, nick = %change.nick, granted = change.granted, "Operator status changed");
                continue;
            }
            let outcome = self.desync(PresenceError::NotMember {
                channel: channel.to_string(),
                nick: lnick,
            });
            if result.is_ok() {
                result = outcome;
            }
        }
        result
    }

    /// Forget a channel's members ahead of a fresh names reply.
    ///
    /// Identities are kept; the replies that follow re-establish membership.
    pub fn begin_resync(&mut self, channel: &str) {
        self.channels.entry(channel.to_string()).or_default().clear();
        debug!(channel = %channel, "Channel resync started");
    }

    /// Get all tracked channel names.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Get a tracked channel.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Get a copy of a channel's members, empty if the channel is unknown.
    #[must_use]
    pub fn channel_members(&self, name: &str) -> HashSet<String> {
        self.channels
            .get(name)
            .map(|c| c.members().clone())
            .unwrap_or_default()
    }

    /// Check if a nickname is a member of a channel.
    #[must_use]
    pub fn is_member(&self, channel: &str, nick: &str) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|c| c.contains(&self.normalize(nick)))
    }

    /// Check if a nickname holds operator status in a channel.
    #[must_use]
    pub fn is_operator(&self, channel: &str, nick: &str) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|c| c.is_operator(&self.normalize(nick)))
    }

    /// Get the last observed identity for a nickname.
    #[must_use]
    pub fn identity(&self, nick: &str) -> Option<&Identity> {
        self.nicks.get(&self.normalize(nick))
    }

    /// Get the channels a nickname is a member of.
    #[must_use]
    pub fn nick_channels(&self, nick: &str) -> Vec<String> {
        let lnick = self.normalize(nick);
        self.channels
            .iter()
            .filter(|(_, c)| c.contains(&lnick))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Check if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.nicks.is_empty()
    }

    /// Get store statistics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            channels: self.channels.len(),
            nicks: self.nicks.len(),
            desyncs: self.desyncs,
        }
    }

    /// Get a serializable copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            own_nick: self.own_nick.clone(),
            channels: self
                .channels
                .iter()
                .map(|(name, channel)| (name.clone(), ChannelSnapshot::from(channel)))
                .collect(),
            nicks: self
                .nicks
                .iter()
                .map(|(nick, identity)| (nick.clone(), identity.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(s: &str) -> Identity {
        Identity::parse(s).unwrap()
    }

    fn store() -> PresenceStore {
        let mut store = PresenceStore::new();
        store.set_own_nick("Bot");
        store
    }

    fn strict_store() -> PresenceStore {
        let mut store = PresenceStore::with_config(StoreConfig {
            strict: true,
            ..StoreConfig::default()
        });
        store.set_own_nick("Bot");
        store
    }

    #[test]
    fn test_join_tracks_channel_and_identity() {
        let mut store = store();
        store.join(&mask("GaWeL!user@host"), "#chan");

        assert_eq!(store.channels(), vec!["#chan".to_string()]);
        assert!(store.is_member("#chan", "gawel"));
        assert!(store.is_member("#chan", "GAWEL"));
        assert_eq!(store.identity("gawel"), Some(&mask("GaWeL!user@host")));
    }

    #[test]
    fn test_own_join_ignored() {
        let mut store = store();
        store.join(&mask("bot!me@here"), "#chan");

        assert!(store.channel_members("#chan").is_empty());
        assert!(store.identity("bot").is_none());
    }

    #[test]
    fn test_part_drops_unshared_identity() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#one");
        store.join(&mask("alice!a@h"), "#two");

        store.part(&mask("alice!a@h"), "#one").unwrap();
        assert!(!store.is_member("#one", "alice"));
        assert!(store.identity("alice").is_some());

        store.part(&mask("alice!a@h"), "#two").unwrap();
        assert!(store.identity("alice").is_none());
    }

    #[test]
    fn test_own_part_forgets_channel() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#chan");
        store.part(&mask("BOT!me@here"), "#chan").unwrap();

        assert!(store.channel("#chan").is_none());
        assert!(store.channel_members("#chan").is_empty());
    }

    #[test]
    fn test_part_twice_is_lenient_by_default() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#chan");
        store.join(&mask("bob!b@h"), "#chan");
        store.part(&mask("alice!a@h"), "#chan").unwrap();

        let before = store.snapshot();
        assert!(store.part(&mask("alice!a@h"), "#chan").is_ok());
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.stats().desyncs, 1);
    }

    #[test]
    fn test_part_desync_in_strict_mode() {
        let mut store = strict_store();
        assert_eq!(
            store.part(&mask("alice!a@h"), "#chan"),
            Err(PresenceError::UnknownChannel("#chan".to_string()))
        );
        assert!(store.channel("#chan").is_none());

        store.join(&mask("bob!b@h"), "#chan");
        assert!(matches!(
            store.part(&mask("alice!a@h"), "#chan"),
            Err(PresenceError::NotMember { .. })
        ));
    }

    #[test]
    fn test_quit_removes_everywhere() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#one");
        store.join(&mask("alice!a@h"), "#two");
        store.join(&mask("bob!b@h"), "#two");

        store.quit(&mask("alice!a@h"));
        assert!(!store.is_member("#one", "alice"));
        assert!(!store.is_member("#two", "alice"));
        assert!(store.is_member("#two", "bob"));
        assert!(store.identity("alice").is_none());

        // Duplicate quit
        store.quit(&mask("alice!a@h"));
        assert_eq!(store.stats().desyncs, 0);
    }

    #[test]
    fn test_own_quit_clears_store() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#chan");
        store.quit(&mask("bot!me@here"));

        assert!(store.is_empty());
        assert_eq!(store.own_nick(), Some("Bot"));
    }

    #[test]
    fn test_kick() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#chan");
        store.kick("#chan", "Alice").unwrap();
        assert!(!store.is_member("#chan", "alice"));
        assert!(store.identity("alice").is_none());

        store.join(&mask("carol!c@h"), "#chan");
        store.kick("#chan", "bot").unwrap();
        assert!(store.channel("#chan").is_none());
    }

    #[test]
    fn test_names_reply_strips_markers() {
        let mut store = store();
        store.names_reply("#chan", "@alice +bob carol");

        let expected: HashSet<String> = ["alice", "bob", "carol"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(store.channel_members("#chan"), expected);
        assert_eq!(store.identity("alice"), Some(&Identity::bare("alice")));
        assert!(store.is_operator("#chan", "alice"));
        assert!(!store.is_operator("#chan", "bob"));
    }

    #[test]
    fn test_names_reply_skips_malformed_tokens() {
        let mut store = store();
        store.names_reply("#chan", "  @  +%Dave  @+erin ");

        let members = store.channel_members("#chan");
        assert_eq!(members.len(), 2);
        assert!(members.contains("dave"));
        assert!(members.contains("erin"));
        assert_eq!(store.identity("dave"), Some(&Identity::bare("Dave")));
        assert!(store.is_operator("#chan", "erin"));
    }

    #[test]
    fn test_names_reply_is_additive() {
        let mut store = store();
        store.names_reply("#chan", "alice bob");
        store.names_reply("#chan", "carol");

        assert_eq!(store.channel_members("#chan").len(), 3);
    }

    #[test]
    fn test_names_reply_keeps_complete_identity() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#one");
        store.names_reply("#two", "@alice");

        assert_eq!(store.identity("alice"), Some(&mask("alice!a@h")));
    }

    #[test]
    fn test_who_reply_overwrites_bare_identity() {
        let mut store = store();
        store.names_reply("#chan", "alice");
        store.who_reply("#chan", "alice", "u1", "h1");

        let identity = store.identity("alice").unwrap();
        assert_eq!(identity.nick(), "alice");
        assert_eq!(identity.user(), Some("u1"));
        assert_eq!(identity.host(), Some("h1"));
    }

    #[test]
    fn test_nick_change_moves_membership() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#one");
        store.join(&mask("alice!a@h"), "#two");
        store
            .mode(
                "#one",
                &[OpChange {
                    nick: "alice".into(),
                    granted: true,
                }],
            )
            .unwrap();

        store.nick(&mask("alice!a@h"), "Alicia").unwrap();

        assert!(store.is_member("#one", "alicia"));
        assert!(store.is_member("#two", "alicia"));
        assert!(store.is_operator("#one", "alicia"));
        assert!(store.identity("alice").is_none());
        assert_eq!(store.identity("alicia"), Some(&mask("Alicia!a@h")));
    }

    #[test]
    fn test_own_nick_change() {
        let mut store = store();
        store.nick(&mask("Bot!me@here"), "Bot_").unwrap();
        assert_eq!(store.own_nick(), Some("Bot_"));

        store.join(&mask("bot_!me@here"), "#chan");
        assert!(store.channel_members("#chan").is_empty());
        assert_eq!(store.stats().desyncs, 0);
    }

    #[test]
    fn test_unknown_nick_change_is_desync() {
        let mut store = strict_store();
        assert_eq!(
            store.nick(&mask("ghost!g@h"), "spirit"),
            Err(PresenceError::UnknownNick("ghost".to_string()))
        );
    }

    #[test]
    fn test_mode_requires_membership() {
        let mut store = strict_store();
        store.join(&mask("alice!a@h"), "#chan");

        let result = store.mode(
            "#chan",
            &[
                OpChange {
                    nick: "ghost".into(),
                    granted: true,
                },
                OpChange {
                    nick: "alice".into(),
                    granted: true,
                },
            ],
        );
        assert!(matches!(result, Err(PresenceError::NotMember { .. })));
        assert!(store.is_operator("#chan", "alice"));
        assert!(!store.is_operator("#chan", "ghost"));

        store
            .mode(
                "#chan",
                &[OpChange {
                    nick: "ALICE".into(),
                    granted: false,
                }],
            )
            .unwrap();
        assert!(!store.is_operator("#chan", "alice"));
    }

    #[test]
    fn test_own_operator_status_follows_mode() {
        let mut store = strict_store();
        store.names_reply("#chan", "@Bot alice");
        assert!(store.is_operator("#chan", "bot"));

        store
            .mode(
                "#chan",
                &[OpChange {
                    nick: "Bot".into(),
                    granted: false,
                }],
            )
            .unwrap();
        assert!(!store.is_operator("#chan", "bot"));

        store
            .mode(
                "#chan",
                &[OpChange {
                    nick: "bot".into(),
                    granted: true,
                }],
            )
            .unwrap();
        assert!(store.is_operator("#chan", "bot"));
    }

    #[test]
    fn test_own_mode_without_membership_is_ignored() {
        let mut store = strict_store();
        store.join(&mask("Bot!me@here"), "#chan");
        store.join(&mask("alice!a@h"), "#chan");

        store
            .mode(
                "#chan",
                &[OpChange {
                    nick: "Bot".into(),
                    granted: true,
                }],
            )
            .unwrap();
        assert!(!store.is_operator("#chan", "bot"));
        assert_eq!(store.stats().desyncs, 0);
    }

    #[test]
    fn test_who_reply_without_channel() {
        let mut store = store();
        store.who_reply("*", "alice", "u1", "h1");

        assert!(store.channels().is_empty());
        assert_eq!(store.identity("alice"), Some(&Identity::new("alice", "u1", "h1")));
    }

    #[test]
    fn test_begin_resync() {
        let mut store = store();
        store.names_reply("#chan", "@alice bob");
        store.begin_resync("#chan");
        assert!(store.channel_members("#chan").is_empty());
        assert!(!store.is_operator("#chan", "alice"));

        store.names_reply("#chan", "alice");
        assert_eq!(store.channel_members("#chan").len(), 1);
    }

    #[test]
    fn test_connection_lost_resets() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#chan");
        store.who_reply("#other", "bob", "b", "h");

        store.connection_lost();
        assert!(store.channels().is_empty());
        assert!(store.identity("alice").is_none());
        assert!(store.identity("bob").is_none());

        // Idempotent
        store.connection_lost();
        assert!(store.is_empty());
    }

    #[test]
    fn test_apply_dispatch() {
        let mut store = PresenceStore::new();
        store
            .apply(&Event::Welcome {
                nick: "bot".to_string(),
            })
            .unwrap();
        store.apply(&Event::join(mask("bot!me@h"), "#chan")).unwrap();
        store
            .apply(&Event::names("#chan", "bot @alice"))
            .unwrap();
        store
            .apply(&Event::who("#chan", "alice", "a", "h"))
            .unwrap();

        assert_eq!(store.own_nick(), Some("bot"));
        assert!(store.is_operator("#chan", "alice"));
        assert_eq!(store.nick_channels("alice"), vec!["#chan".to_string()]);

        store.apply(&Event::Disconnected).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_rfc1459_casemapping() {
        let mut store = PresenceStore::with_config(StoreConfig {
            casemapping: CaseMapping::Rfc1459,
            strict: true,
        });
        store.join(&mask("Nick[1]!u@h"), "#chan");

        assert!(store.is_member("#chan", "nick{1}"));
        store.part(&mask("NICK{1}!u@h"), "#chan").unwrap();
        assert!(store.identity("nick[1]").is_none());
    }

    #[test]
    fn test_member_identity_invariant() {
        let mut store = store();
        store.join(&mask("alice!a@h"), "#one");
        store.names_reply("#one", "bob @carol");
        store.who_reply("#two", "dave", "d", "h");
        store.nick(&mask("bob"), "robert").unwrap();
        store.part(&mask("carol!c@h"), "#one").unwrap();

        for name in store.channels() {
            for member in store.channel_members(&name) {
                assert!(store.identity(&member).is_some(), "{member} has no identity");
            }
        }
    }
}
