//! Frame contents exchanged with the connection's frame layer
//!
//! Encoding and decoding happen elsewhere; these are the already-parsed values.

use std::fmt;

use crate::{ConnectionId, ResetToken};

/// Contents of a `NEW_CONNECTION_ID` frame received from the peer
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NewConnectionId {
    /// Sequence number the peer assigned to `id`
    pub sequence: u64,
    /// All connection IDs with a lower sequence number must be retired
    ///
    /// Zero requests nothing.
    pub retire_prior_to: u64,
    /// The offered connection ID
    pub id: ConnectionId,
    /// Stateless reset token bound to `id`
    ///
    /// Always present on the wire; `None` is reserved for IDs learned outside of
    /// `NEW_CONNECTION_ID`, such as the one established during the handshake.
    pub reset_token: Option<ResetToken>,
}

impl fmt::Display for NewConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NEW_CONNECTION_ID {{ sequence: {}, retire_prior_to: {}, id: {} }}",
            self.sequence, self.retire_prior_to, self.id
        )
    }
}

/// Contents of a `RETIRE_CONNECTION_ID` frame to be sent to the peer
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RetireConnectionId {
    /// Sequence number of the connection ID we stop using
    pub sequence: u64,
}

impl fmt::Display for RetireConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RETIRE_CONNECTION_ID {{ sequence: {} }}", self.sequence)
    }
}
