use std::fmt;

use crate::RESET_TOKEN_SIZE;

/// Stateless reset token
///
/// Paired with every connection ID the peer issues after the handshake. A datagram ending in a
/// live token tells us the peer has lost all state for the connection.
#[allow(clippy::derived_hash_with_manual_eq)] // Custom PartialEq impl matches derived semantics
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Copy, Clone, Hash)]
pub struct ResetToken([u8; RESET_TOKEN_SIZE]);

impl PartialEq for ResetToken {
    fn eq(&self, other: &Self) -> bool {
        crate::constant_time::eq(&self.0, &other.0)
    }
}

impl Eq for ResetToken {}

impl From<[u8; RESET_TOKEN_SIZE]> for ResetToken {
    fn from(x: [u8; RESET_TOKEN_SIZE]) -> Self {
        Self(x)
    }
}

impl std::ops::Deref for ResetToken {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_by_value() {
        let a = ResetToken::from([7; RESET_TOKEN_SIZE]);
        let mut bytes = [7; RESET_TOKEN_SIZE];
        assert_eq!(a, ResetToken::from(bytes));
        bytes[RESET_TOKEN_SIZE - 1] = 8;
        assert_ne!(a, ResetToken::from(bytes));
    }

    #[test]
    fn display_hex() {
        let token = ResetToken::from([0xab; RESET_TOKEN_SIZE]);
        assert_eq!(token.to_string(), "ab".repeat(RESET_TOKEN_SIZE));
    }
}
