//! Channel membership.
//!
//! A channel holds the normalized nicknames of its members and the subset of
//! them holding operator status.

use std::collections::HashSet;
use tracing::trace;

/// A channel identifier.
pub type ChannelName = String;

/// Membership of a single channel.
///
/// Nicknames are stored normalized. Operators are always members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    members: HashSet<String>,
    operators: HashSet<String>,
}

impl Channel {
    /// Create an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Check if a normalized nickname is a member.
    #[must_use]
    pub fn contains(&self, nick: &str) -> bool {
        self.members.contains(nick)
    }

    /// Check if a normalized nickname holds operator status.
    #[must_use]
    pub fn is_operator(&self, nick: &str) -> bool {
        self.operators.contains(nick)
    }

    /// Add a member.
    ///
    /// Returns `true` if the nickname was not already present.
    pub fn add(&mut self, nick: impl Into<String>) -> bool {
        let nick = nick.into();
        trace!(nick = %nick, "Channel: member added");
        self.members.insert(nick)
    }

    /// Remove a member, dropping operator status with it.
    ///
    /// Returns `true` if the nickname was a member.
    pub fn remove(&mut self, nick: &str) -> bool {
        self.operators.remove(nick);
        self.members.remove(nick)
    }

    /// Grant or revoke operator status.
    ///
    /// Returns `false` if the nickname is not a member; operator status is
    /// never recorded for non-members.
    pub fn set_operator(&mut self, nick: &str, granted: bool) -> bool {
        if !self.members.contains(nick) {
            return false;
        }
        if granted {
            self.operators.insert(nick.to_string());
        } else {
            self.operators.remove(nick);
        }
        true
    }

    /// Move a member to a new nickname, carrying operator status.
    ///
    /// Returns `true` if the old nickname was a member.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if !self.members.remove(old) {
            return false;
        }
        let was_operator = self.operators.remove(old);
        self.operators.remove(new);
        self.members.insert(new.to_string());
        if was_operator {
            self.operators.insert(new.to_string());
        }
        true
    }

    /// Drop all members and operators.
    pub fn clear(&mut self) {
        self.members.clear();
        self.operators.clear();
    }

    /// Get the member set.
    #[must_use]
    pub fn members(&self) -> &HashSet<String> {
        &self.members
    }

    /// Get the operator set.
    #[must_use]
    pub fn operators(&self) -> &HashSet<String> {
        &self.operators
    }

    /// Check if the channel has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
