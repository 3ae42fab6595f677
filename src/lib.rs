//! Lifecycle management for connection IDs issued by a QUIC peer
//!
//! A QUIC endpoint addresses the packets it sends with one of the connection IDs its peer has
//! offered in `NEW_CONNECTION_ID` frames. This crate tracks those offers for a single connection:
//! it decides which ID is currently in use, rotates to a fresh one after a packet budget has been
//! spent, retires IDs when the peer asks for it via `retire_prior_to`, bounds the number of IDs
//! the peer can make us track, and keeps a stateless reset token registry informed of which
//! tokens are live.
//!
//! The crate contains no networking code and performs no I/O. The [`ConnectionIdManager`] is
//! driven by the connection's receive path ([`ConnectionIdManager::on_new_connection_id`]), its
//! send path ([`ConnectionIdManager::on_packet_sent`]) and its teardown
//! ([`ConnectionIdManager::close`]). Its outputs are [`RetireConnectionId`] frames, pushed into
//! any sink implementing [`Extend`], and calls into a [`ResetTokenRegistry`].
//!
//! ```
//! use quinn_remote_cid::{
//!     CidConfig, ConnectionId, ConnectionIdManager, NewConnectionId, ResetToken,
//!     ResetTokenRegistry, RetireConnectionId,
//! };
//!
//! #[derive(Default)]
//! struct Tokens(Vec<ResetToken>);
//!
//! impl ResetTokenRegistry for Tokens {
//!     fn register(&mut self, token: ResetToken) {
//!         self.0.push(token);
//!     }
//!     fn retire(&mut self, token: ResetToken) {
//!         self.0.retain(|t| *t != token);
//!     }
//!     fn remove(&mut self, token: ResetToken) {
//!         self.0.retain(|t| *t != token);
//!     }
//! }
//!
//! let initial = ConnectionId::new(&[1, 1, 1, 1]);
//! let mut cids = ConnectionIdManager::new(
//!     initial,
//!     &CidConfig::default(),
//!     Tokens::default(),
//!     Vec::<RetireConnectionId>::new(),
//! );
//! assert_eq!(cids.active(), initial);
//!
//! cids.on_new_connection_id(NewConnectionId {
//!     sequence: 1,
//!     retire_prior_to: 0,
//!     id: ConnectionId::new(&[2, 2, 2, 2]),
//!     reset_token: Some(ResetToken::from([0xab; 16])),
//! })
//! .unwrap();
//! assert_eq!(cids.active(), ConnectionId::new(&[2, 2, 2, 2]));
//! assert_eq!(cids.registry().0.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![warn(clippy::use_self)]

mod cid_queue;
mod constant_time;
mod range_set;

mod config;
pub use crate::config::{CidConfig, ConfigError};

mod frame;
pub use crate::frame::{NewConnectionId, RetireConnectionId};

mod manager;
pub use crate::manager::{CidError, CidStats, ConnectionIdManager};

mod registry;
pub use crate::registry::ResetTokenRegistry;

mod shared;
pub use crate::shared::{ConnectionId, ConnectionIdTooLong};

mod token;
pub use crate::token::ResetToken;

mod transport_error;
pub use crate::transport_error::{Code as TransportErrorCode, Error as TransportError};

mod varint;
pub use crate::varint::{VarInt, VarIntBoundsExceeded};

//
// Useful internal constants
//

/// Size of a stateless reset token in bytes
pub const RESET_TOKEN_SIZE: usize = 16;
/// Maximum length of a connection ID in bytes
pub const MAX_CID_SIZE: usize = 20;
