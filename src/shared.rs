use std::fmt;

use crate::MAX_CID_SIZE;

/// Protocol-level identifier for a connection.
///
/// An opaque string of at most [`MAX_CID_SIZE`] bytes. The peer hands these out in
/// `NEW_CONNECTION_ID` frames and expects to see one of them on every packet we send.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ConnectionId {
    /// Length of the connection ID
    len: u8,
    /// Bytes of the connection ID, zero-padded past `len`
    bytes: [u8; MAX_CID_SIZE],
}

impl ConnectionId {
    /// Construct a connection ID from its bytes
    ///
    /// # Panics
    ///
    /// If `bytes` is longer than [`MAX_CID_SIZE`]. Use [`ConnectionId::try_from`] for input that
    /// hasn't been validated yet.
    pub fn new(bytes: &[u8]) -> Self {
        assert!(bytes.len() <= MAX_CID_SIZE, "connection ID too long");
        let mut res = Self {
            len: bytes.len() as u8,
            bytes: [0; MAX_CID_SIZE],
        };
        res.bytes[..bytes.len()].copy_from_slice(bytes);
        res
    }
}

impl TryFrom<&[u8]> for ConnectionId {
    type Error = ConnectionIdTooLong;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() > MAX_CID_SIZE {
            return Err(ConnectionIdTooLong(bytes.len()));
        }
        Ok(Self::new(bytes))
    }
}

impl ::std::ops::Deref for ConnectionId {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.bytes[0..self.len as usize]
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bytes[0..self.len as usize].fmt(f)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "arbitrary")]
impl<'arbitrary> arbitrary::Arbitrary<'arbitrary> for ConnectionId {
    fn arbitrary(u: &mut arbitrary::Unstructured<'arbitrary>) -> arbitrary::Result<Self> {
        let len = u.int_in_range(0..=MAX_CID_SIZE)?;
        Ok(Self::new(u.bytes(len)?))
    }
}

/// Error returned when a byte string is too long to be a connection ID
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("connection ID of {0} bytes exceeds the 20 byte maximum")]
pub struct ConnectionIdTooLong(pub usize);
