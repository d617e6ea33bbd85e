//! Codec for extracting presence events from IRC lines.
//!
//! Lines are CR-LF (or bare LF) terminated. Only lines that affect presence
//! decode to an [`Event`]; everything else decodes to `None`.

use bytes::BytesMut;
use thiserror::Error;

use crate::events::{Event, OpChange};
use crate::line::Line;
use crate::mask::Identity;

/// Maximum line length, tags included.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Numeric for the registration welcome.
pub const RPL_WELCOME: &str = "001";
/// Numeric for a who reply line.
pub const RPL_WHOREPLY: &str = "352";
/// Numeric for a names reply line.
pub const RPL_NAMREPLY: &str = "353";

/// Channel modes that always take a parameter.
const MODES_WITH_PARAM: &str = "beIkovhqa";

/// Protocol errors that can occur while decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Line exceeds the maximum length.
    #[error("Line length {0} exceeds maximum {MAX_LINE_LENGTH}")]
    LineTooLong(usize),

    /// A presence command is missing parameters or its prefix.
    #[error("Malformed {command} line: {reason}")]
    Malformed {
        /// The offending command.
        command: String,
        /// What was missing.
        reason: &'static str,
    },

    /// Identity mask could not be parsed.
    #[error("Invalid identity mask: {0:?}")]
    InvalidMask(String),
}

fn malformed(command: &str, reason: &'static str) -> ProtocolError {
    ProtocolError::Malformed {
        command: command.to_string(),
        reason,
    }
}

/// Whether a target names a channel rather than a user.
#[must_use]
pub fn is_channel(target: &str) -> bool {
    target.starts_with(['#', '&', '+', '!'])
}

/// Decode a single line into a presence event.
///
/// Returns `Ok(None)` for lines that carry no presence information.
///
/// # Errors
///
/// Returns an error if a presence command is missing required parts.
pub fn decode(input: &str) -> Result<Option<Event>, ProtocolError> {
    if input.len() > MAX_LINE_LENGTH {
        return Err(ProtocolError::LineTooLong(input.len()));
    }

    let Some(line) = Line::parse(input) else {
        return Ok(None);
    };

    let command = line.command.to_ascii_uppercase();
    let param = |index: usize, reason: &'static str| {
        line.param(index).ok_or_else(|| malformed(&command, reason))
    };
    let source = || -> Result<Identity, ProtocolError> {
        let prefix = line
            .prefix
            .ok_or_else(|| malformed(&command, "missing source prefix"))?;
        Identity::parse(prefix)
    };

    let event = match command.as_str() {
        RPL_WELCOME => Event::Welcome {
            nick: param(0, "missing nickname")?.to_string(),
        },
        "JOIN" => Event::Join {
            who: source()?,
            channel: param(0, "missing channel")?.to_string(),
        },
        "PART" => Event::Part {
            who: source()?,
            channel: param(0, "missing channel")?.to_string(),
        },
        "KICK" => Event::Kick {
            channel: param(0, "missing channel")?.to_string(),
            nick: param(1, "missing nickname")?.to_string(),
        },
        "QUIT" => Event::Quit { who: source()? },
        "NICK" => Event::Nick {
            who: source()?,
            new_nick: param(0, "missing nickname")?.to_string(),
        },
        RPL_NAMREPLY => {
            // `<me> [<symbol>] <channel> :<names>`, the symbol is optional on old servers.
            let count = line.params.len();
            if count < 3 {
                return Err(malformed(&command, "missing channel or names"));
            }
            Event::Names {
                channel: line.params[count - 2].to_string(),
                nicknames: line.params[count - 1].to_string(),
            }
        }
        RPL_WHOREPLY => Event::Who {
            channel: param(1, "missing channel")?.to_string(),
            user: param(2, "missing username")?.to_string(),
            host: param(3, "missing hostname")?.to_string(),
            nick: param(5, "missing nickname")?.to_string(),
        },
        "MODE" => {
            let target = param(0, "missing target")?;
            if !is_channel(target) {
                return Ok(None);
            }
            let changes = op_changes(param(1, "missing mode string")?, &line.params[2..]);
            if changes.is_empty() {
                return Ok(None);
            }
            Event::Mode {
                channel: target.to_string(),
                changes,
            }
        }
        "ERROR" => Event::Disconnected,
        _ => return Ok(None),
    };

    Ok(Some(event))
}

/// Walk a channel mode string and collect the `o` changes.
fn op_changes(modes: &str, args: &[&str]) -> Vec<OpChange> {
    let mut changes = Vec::new();
    let mut args = args.iter();
    let mut adding = true;

    for mode in modes.chars() {
        match mode {
            '+' => adding = true,
            '-' => adding = false,
            'o' => {
                if let Some(nick) = args.next() {
                    changes.push(OpChange {
                        nick: (*nick).to_string(),
                        granted: adding,
                    });
                }
            }
            'l' if adding => {
                args.next();
            }
            m if MODES_WITH_PARAM.contains(m) => {
                args.next();
            }
            _ => {}
        }
    }

    changes
}

/// Streaming decoder over a read buffer.
///
/// An oversized line is dropped as a whole: once its first
/// [`MAX_LINE_LENGTH`] bytes have been discarded, everything up to and
/// including its terminating newline is discarded as well, even when that
/// newline arrives in a later read.
#[derive(Debug, Default)]
pub struct LineCodec {
    skip_until_newline: bool,
}

impl LineCodec {
    /// Create a new codec instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the codec is dropping the rest of an oversized line.
    #[must_use]
    pub fn is_discarding(&self) -> bool {
        self.skip_until_newline
    }

    /// Split the next complete line out of a read buffer.
    ///
    /// Returns `Ok(None)` if no complete line is buffered yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a line exceeds [`MAX_LINE_LENGTH`]. The oversized
    /// line is discarded so that decoding resumes with the following line.
    pub fn next_line(&mut self, buf: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        if self.skip_until_newline {
            match buf.iter().position(|&b| b == b'\n') {
                Some(newline) => {
                    let _ = buf.split_to(newline + 1);
                    self.skip_until_newline = false;
                }
                None => {
                    buf.clear();
                    return Ok(None);
                }
            }
        }

        let Some(newline) = buf.iter().position(|&b| b == b'\n') else {
            if buf.len() > MAX_LINE_LENGTH {
                let len = buf.len();
                buf.clear();
                self.skip_until_newline = true;
                return Err(ProtocolError::LineTooLong(len));
            }
            return Ok(None);
        };

        let raw = buf.split_to(newline + 1);
        if raw.len() > MAX_LINE_LENGTH {
            return Err(ProtocolError::LineTooLong(raw.len()));
        }

        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    /// Try to decode the next presence event from a buffer, advancing it.
    ///
    /// Complete lines without presence information are consumed and skipped.
    /// Returns `Ok(None)` once no complete line remains.
    ///
    /// # Errors
    ///
    /// Returns an error for an oversized or malformed line. The offending line
    /// has already been consumed, so the caller may keep decoding.
    pub fn decode_from(&mut self, buf: &mut BytesMut) -> Result<Option<Event>, ProtocolError> {
        while let Some(line) = self.next_line(buf)? {
            if let Some(event) = decode(&line)? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}
