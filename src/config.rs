use std::fmt;

use thiserror::Error;

use crate::{VarInt, VarIntBoundsExceeded};

/// Parameters governing the use of peer-issued connection IDs
///
/// The defaults track what most QUIC stacks advertise and are suitable for ordinary internet
/// connections.
#[derive(Clone)]
pub struct CidConfig {
    pub(crate) active_connection_id_limit: VarInt,
    pub(crate) packets_per_cid: u64,
}

impl CidConfig {
    /// Maximum number of peer-issued connection IDs we are willing to track at once
    ///
    /// This is the value we advertised in the `active_connection_id_limit` transport parameter. It
    /// counts the ID in use plus all spare ones. When the peer offers more, the spare IDs with
    /// the lowest sequence numbers are retired to make room.
    ///
    /// Must be at least 2.
    pub fn active_connection_id_limit(&mut self, value: VarInt) -> Result<&mut Self, ConfigError> {
        if value.into_inner() < 2 {
            return Err(ConfigError::OutOfBounds);
        }
        self.active_connection_id_limit = value;
        Ok(self)
    }

    /// Number of packets to send with one connection ID before switching to a fresh one
    ///
    /// Rotation only happens when a spare ID is available. The first peer-issued ID replaces the
    /// handshake ID immediately, regardless of this budget.
    pub fn packets_per_cid(&mut self, value: u64) -> Result<&mut Self, ConfigError> {
        if value == 0 {
            return Err(ConfigError::OutOfBounds);
        }
        self.packets_per_cid = value;
        Ok(self)
    }

    /// Get the current value of `active_connection_id_limit`
    ///
    /// Exposed so the handshake layer can advertise the same limit in its transport parameters.
    pub fn get_active_connection_id_limit(&self) -> VarInt {
        self.active_connection_id_limit
    }
}

impl Default for CidConfig {
    fn default() -> Self {
        Self {
            active_connection_id_limit: VarInt::from_u32(4),
            packets_per_cid: 10_000,
        }
    }
}

impl fmt::Debug for CidConfig {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("CidConfig")
            .field(
                "active_connection_id_limit",
                &self.active_connection_id_limit,
            )
            .field("packets_per_cid", &self.packets_per_cid)
            .finish()
    }
}

/// Errors in the configuration of a connection ID manager
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value exceeds supported bounds
    #[error("value exceeds supported bounds")]
    OutOfBounds,
}

impl From<VarIntBoundsExceeded> for ConfigError {
    fn from(_: VarIntBoundsExceeded) -> Self {
        Self::OutOfBounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CidConfig::default();
        assert_eq!(config.get_active_connection_id_limit(), VarInt::from_u32(4));
        assert_eq!(config.packets_per_cid, 10_000);
    }

    #[test]
    fn limit_bounds() {
        let mut config = CidConfig::default();
        assert_eq!(
            config
                .active_connection_id_limit(VarInt::from_u32(1))
                .unwrap_err(),
            ConfigError::OutOfBounds
        );
        config
            .active_connection_id_limit(VarInt::from_u32(2))
            .unwrap()
            .packets_per_cid(1)
            .unwrap();
        assert_eq!(config.get_active_connection_id_limit(), VarInt::from_u32(2));
        assert_eq!(config.packets_per_cid, 1);
    }

    #[test]
    fn limit_from_u64() {
        let mut config = CidConfig::default();
        let err = VarInt::from_u64(u64::MAX)
            .map_err(ConfigError::from)
            .and_then(|limit| config.active_connection_id_limit(limit).map(|_| ()));
        assert_eq!(err, Err(ConfigError::OutOfBounds));
    }

    #[test]
    fn zero_packet_budget() {
        let mut config = CidConfig::default();
        assert!(config.packets_per_cid(0).is_err());
        assert_eq!(config.packets_per_cid, 10_000);
    }
}
