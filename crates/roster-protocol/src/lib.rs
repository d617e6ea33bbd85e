//! # roster-protocol
//!
//! Extraction of presence events from IRC protocol lines.
//!
//! This crate turns raw server lines into the typed events consumed by the
//! presence store, and defines the identity and case-mapping types shared by
//! both sides.
//!
//! ## Event Types
//!
//! - `Join` / `Part` / `Kick` / `Quit` - Channel membership changes
//! - `Nick` - Nickname changes
//! - `Names` / `Who` - Bulk membership and full identities
//! - `Mode` - Channel operator status
//! - `Welcome` / `Disconnected` - Connection lifecycle
//!
//! ## Example
//!
//! ```rust
//! use roster_protocol::{codec, Event};
//!
//! let event = codec::decode(":gawel!user@host JOIN #chan").unwrap();
//! assert!(matches!(event, Some(Event::Join { .. })));
//!
//! // Lines without presence information decode to nothing.
//! assert_eq!(codec::decode("PING :irc.example").unwrap(), None);
//! ```

pub mod casemap;
pub mod codec;
pub mod events;
pub mod line;
pub mod mask;

pub use casemap::CaseMapping;
pub use codec::{decode, LineCodec, ProtocolError};
pub use events::{Event, EventKind, OpChange};
pub use line::Line;
pub use mask::Identity;
