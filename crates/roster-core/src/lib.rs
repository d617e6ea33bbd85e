//! # roster-core
//!
//! Channel membership and identity tracking for an IRC client.
//!
//! This crate provides the fundamental building blocks:
//!
//! - **Channel** - Member set with an operator subset
//! - **PresenceStore** - Applies presence events to the channel and nickname maps
//! - **Session** - Single-writer task owning a store, queried over a queue
//! - **PresenceSnapshot** - Detached, serializable copy of the state
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌───────────────┐
//! │    Codec    │────▶│   Session   │────▶│ PresenceStore │
//! └─────────────┘     └─────────────┘     └───────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │  Snapshot   │
//!                     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use roster_core::PresenceStore;
//! use roster_protocol::codec;
//!
//! let mut store = PresenceStore::new();
//! store.set_own_nick("bot");
//!
//! for line in [
//!     ":gawel!user@host JOIN #chan",
//!     ":irc.example 353 bot = #chan :bot @gawel +alice",
//! ] {
//!     if let Some(event) = codec::decode(line).unwrap() {
//!         store.apply(&event).unwrap();
//!     }
//! }
//!
//! assert!(store.is_operator("#chan", "GaWeL"));
//! assert_eq!(store.identity("gawel").unwrap().to_string(), "gawel!user@host");
//! ```

pub mod channel;
pub mod session;
pub mod snapshot;
pub mod store;

pub use channel::{Channel, ChannelName};
pub use session::{Session, SessionError, SessionHandle};
pub use snapshot::{ChannelSnapshot, PresenceSnapshot};
pub use store::{PresenceError, PresenceStore, StoreConfig, StoreStats};
