//! User identity masks.
//!
//! An identity is the `nick!user@host` triple attached to every message a
//! user originates. Names replies only carry the nickname, so the user and
//! host parts are optional until a more specific observation fills them in.

use crate::casemap::CaseMapping;
use crate::codec::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `nick!user@host` identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    nick: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
}

impl Identity {
    /// Create a complete identity.
    #[must_use]
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: Some(user.into()),
            host: Some(host.into()),
        }
    }

    /// Create an identity that only knows the nickname.
    #[must_use]
    pub fn bare(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: None,
            host: None,
        }
    }

    /// Parse a `nick!user@host` mask.
    ///
    /// Parsing is lenient: `nick`, `nick@host` and `nick!user` are accepted
    /// with the missing parts left empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the nickname part is empty.
    pub fn parse(mask: &str) -> Result<Self, ProtocolError> {
        let (rest, host) = match mask.split_once('@') {
            Some((rest, host)) => (rest, Some(host)),
            None => (mask, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user)),
            None => (rest, None),
        };

        if nick.is_empty() {
            return Err(ProtocolError::InvalidMask(mask.to_string()));
        }

        Ok(Self {
            nick: nick.to_string(),
            user: user.filter(|u| !u.is_empty()).map(str::to_string),
            host: host.filter(|h| !h.is_empty()).map(str::to_string),
        })
    }

    /// The nickname, in its original case.
    #[must_use]
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// The username, if known.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The hostname, if known.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The ASCII-lowercased nickname.
    #[must_use]
    pub fn lnick(&self) -> String {
        self.normalized(CaseMapping::Ascii)
    }

    /// The nickname folded under the given case-mapping.
    #[must_use]
    pub fn normalized(&self, casemapping: CaseMapping) -> String {
        casemapping.normalize(&self.nick)
    }

    /// Whether both the user and host parts are known.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.user.is_some() && self.host.is_some()
    }

    /// The same identity under a new nickname.
    #[must_use]
    pub fn with_nick(&self, nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: self.user.clone(),
            host: self.host.clone(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nick)?;
        if let Some(user) = &self.user {
            write!(f, "!{user}")?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{host}")?;
        }
        Ok(())
    }
}

impl FromStr for Identity {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
