//! Point-in-time copies of the presence state.
//!
//! Snapshots are detached from the store, so they can be handed to other
//! tasks and serialized without holding up the writer.

use crate::channel::Channel;
use roster_protocol::Identity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Membership of one channel at snapshot time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Normalized member nicknames.
    pub members: BTreeSet<String>,
    /// Normalized operator nicknames.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub operators: BTreeSet<String>,
}

impl From<&Channel> for ChannelSnapshot {
    fn from(channel: &Channel) -> Self {
        Self {
            members: channel.members().iter().cloned().collect(),
            operators: channel.operators().iter().cloned().collect(),
        }
    }
}

/// The whole presence state at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    /// Our nickname, if registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_nick: Option<String>,
    /// Channels by name.
    pub channels: BTreeMap<String, ChannelSnapshot>,
    /// Identities by normalized nickname.
    pub nicks: BTreeMap<String, Identity>,
}

impl PresenceSnapshot {
    /// Get the number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Get a channel's members, if the channel was tracked.
    #[must_use]
    pub fn members(&self, channel: &str) -> Option<&BTreeSet<String>> {
        self.channels.get(channel).map(|c| &c.members)
    }

    /// Check if the snapshot holds no presence data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.nicks.is_empty()
    }
}
