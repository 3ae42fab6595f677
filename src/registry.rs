use crate::ResetToken;

/// Routing table for stateless reset tokens, owned by the endpoint
///
/// The [`ConnectionIdManager`](crate::ConnectionIdManager) reports every change in the liveness of
/// the tokens the peer bound to its connection IDs. Implementations typically map tokens to a
/// connection handle so that incoming stateless resets can be matched.
pub trait ResetTokenRegistry {
    /// `token` is live: datagrams ending in it are stateless resets for this connection
    fn register(&mut self, token: ResetToken);

    /// `token` is no longer guaranteed to be live
    ///
    /// Either we asked the peer to retire the matching connection ID or we rotated away from it.
    /// Packets sent with the old ID may still be in flight, so implementations may keep matching
    /// the token for a little while.
    fn retire(&mut self, token: ResetToken);

    /// `token` must stop matching immediately; the connection is going away
    fn remove(&mut self, token: ResetToken);
}

impl<T: ResetTokenRegistry + ?Sized> ResetTokenRegistry for &mut T {
    fn register(&mut self, token: ResetToken) {
        (**self).register(token)
    }

    fn retire(&mut self, token: ResetToken) {
        (**self).retire(token)
    }

    fn remove(&mut self, token: ResetToken) {
        (**self).remove(token)
    }
}

impl<T: ResetTokenRegistry + ?Sized> ResetTokenRegistry for Box<T> {
    fn register(&mut self, token: ResetToken) {
        (**self).register(token)
    }

    fn retire(&mut self, token: ResetToken) {
        (**self).retire(token)
    }

    fn remove(&mut self, token: ResetToken) {
        (**self).remove(token)
    }
}
