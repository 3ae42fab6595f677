//! Selection and retirement of the connection IDs the peer has issued to us

use std::{fmt, iter, mem};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    cid_queue::{CidData, CidQueue},
    range_set::RangeSet,
    CidConfig, ConnectionId, NewConnectionId, ResetToken, ResetTokenRegistry, RetireConnectionId,
};

/// Tracks the peer's connection IDs and picks the one we send with
///
/// Starts out using the connection ID established during the handshake. The first ID offered in
/// a `NEW_CONNECTION_ID` frame replaces it right away; later rotations happen once
/// [`CidConfig::packets_per_cid`] packets have been sent with the current ID and a spare is
/// available. The peer can force a rotation at any time with `retire_prior_to`.
///
/// `RETIRE_CONNECTION_ID` frames are pushed into `F` in ascending sequence number order, and
/// stateless reset token liveness is reported to `R`. Neither is touched by a call that returns
/// an error.
pub struct ConnectionIdManager<R, F> {
    active: Active,
    /// Spare CIDs, never including the active one
    pending: CidQueue,
    /// Highest `retire_prior_to` received
    retire_prior_to: u64,
    /// Sequence numbers we've stopped tracking
    ///
    /// Holds at most `MAX_RETIRED_RANGES` ranges. Beyond that the gap between the two lowest
    /// ranges is filled in, so never-seen sequence numbers there are treated as retired too.
    retired: RangeSet,
    packets_since_rotation: u64,
    limit: u64,
    packets_per_cid: u64,
    closed: bool,
    stats: CidStats,
    registry: R,
    frames: F,
}

/// The CID stamped on outgoing packets
#[derive(Debug, Copy, Clone)]
struct Active {
    /// Implicitly 0 for the handshake CID
    sequence: u64,
    id: ConnectionId,
    reset_token: Option<ResetToken>,
    /// Whether `id` was issued in a `NEW_CONNECTION_ID` frame
    assigned: bool,
    /// Swept by `retire_prior_to` while no replacement was available
    retired: bool,
}

impl<R, F> ConnectionIdManager<R, F>
where
    R: ResetTokenRegistry,
    F: Extend<RetireConnectionId>,
{
    /// Start tracking the peer's CIDs, beginning with the one used during the handshake
    pub fn new(initial: ConnectionId, config: &CidConfig, registry: R, frames: F) -> Self {
        Self {
            active: Active {
                sequence: 0,
                id: initial,
                reset_token: None,
                assigned: false,
                retired: false,
            },
            pending: CidQueue::new(),
            retire_prior_to: 0,
            retired: RangeSet::new(),
            packets_since_rotation: 0,
            limit: config.active_connection_id_limit.into_inner(),
            packets_per_cid: config.packets_per_cid,
            closed: false,
            stats: CidStats::default(),
            registry,
            frames,
        }
    }

    /// The CID to address outgoing packets with
    pub fn active(&self) -> ConnectionId {
        self.active.id
    }

    /// Sequence number of the active CID, or `None` while the handshake CID is still in use
    pub fn active_seq(&self) -> Option<u64> {
        self.active.assigned.then_some(self.active.sequence)
    }

    /// Stateless reset token bound to the active CID, if any
    pub fn active_reset_token(&self) -> Option<ResetToken> {
        self.active.reset_token
    }

    /// Replace the handshake CID, e.g. after a Retry
    ///
    /// Ignored once the peer's first `NEW_CONNECTION_ID` has taken effect.
    pub fn replace_initial(&mut self, id: ConnectionId) {
        if self.closed || self.active.assigned || self.active.retired {
            warn!(%id, "ignoring replacement of the initial CID");
            return;
        }
        trace!(old = %self.active.id, new = %id, "replacing initial CID");
        self.active.id = id;
    }

    /// Bind the stateless reset token from the peer's transport parameters to the handshake CID
    ///
    /// Registers `token`. Ignored if a token was already set or the handshake CID is no longer in
    /// use.
    pub fn set_initial_reset_token(&mut self, token: ResetToken) {
        if self.closed
            || self.active.assigned
            || self.active.retired
            || self.active.reset_token.is_some()
        {
            warn!(%token, "ignoring reset token for the initial CID");
            return;
        }
        trace!(%token, "initial CID reset token");
        self.active.reset_token = Some(token);
        self.registry.register(token);
    }

    /// Handle a `NEW_CONNECTION_ID` frame
    ///
    /// Conflicting reuse of a sequence number is a protocol violation and must close the
    /// connection. Anything else is accepted: duplicates are ignored, IDs the peer asked us to
    /// retire are retired right away and surplus IDs beyond the configured limit evict the
    /// oldest spares.
    pub fn on_new_connection_id(&mut self, frame: NewConnectionId) -> Result<(), CidError> {
        if self.closed {
            trace!(%frame, "ignoring frame on closed connection");
            return Ok(());
        }
        trace!(%frame);

        let sequence = frame.sequence;
        let known = self.lookup(sequence);
        if let Some((id, token)) = known {
            if id != frame.id {
                return Err(CidError::ConflictingConnectionId { sequence });
            }
            if let (Some(known), Some(offered)) = (token, frame.reset_token) {
                if known != offered {
                    return Err(CidError::ConflictingResetToken { sequence });
                }
            }
            trace!(sequence, "duplicate NEW_CONNECTION_ID");
            self.stats.duplicates += 1;
        } else if self.retired.contains(sequence) {
            trace!(sequence, "discarding already-retired");
            self.stats.duplicates += 1;
        } else {
            self.pending.insert(sequence, (frame.id, frame.reset_token));
        }

        self.retire_prior(frame.retire_prior_to);
        self.enforce_limit();

        // The handshake CID and swept CIDs are replaced regardless of the packet budget. The
        // budget may also have run out earlier, while no spare was available.
        let forced = !self.active.assigned || self.active.retired;
        if forced || self.packets_since_rotation >= self.packets_per_cid {
            self.rotate();
        }
        Ok(())
    }

    /// Account for a packet sent with the active CID, switching to a spare when its budget is
    /// spent
    pub fn on_packet_sent(&mut self) {
        if self.closed {
            return;
        }
        self.packets_since_rotation = self.packets_since_rotation.saturating_add(1);
        if self.packets_since_rotation >= self.packets_per_cid && !self.pending.is_empty() {
            self.rotate();
        }
    }

    /// Stop using the peer's CIDs for good
    ///
    /// Removes the active CID's reset token from the registry, even if the peer already had us
    /// retire it. Spare CIDs are dropped without
    /// notice since their tokens were never registered. Idempotent; later calls on the manager
    /// have no effect.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(token) = self.active.reset_token.take() {
            self.registry.remove(token);
        }
        debug!(
            active = %self.active.id,
            dropped = self.pending.len(),
            "closed"
        );
        self.pending.clear();
        self.retired.clear();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of spare CIDs available for future rotations
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Highest `retire_prior_to` received from the peer
    pub fn retire_prior_to(&self) -> u64 {
        self.retire_prior_to
    }

    /// Packets sent with the active CID so far
    pub fn packets_since_rotation(&self) -> u64 {
        self.packets_since_rotation
    }

    /// Counters describing what the manager has done so far
    pub fn stats(&self) -> CidStats {
        self.stats
    }

    /// The reset token registry
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Mutable access to the reset token registry
    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// The sink `RETIRE_CONNECTION_ID` frames are queued in
    pub fn frames(&self) -> &F {
        &self.frames
    }

    /// Mutable access to the frame sink, e.g. to drain it when building a packet
    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    /// CID and reset token recorded for `sequence`, if it's currently tracked
    fn lookup(&self, sequence: u64) -> Option<CidData> {
        if self.active.sequence == sequence {
            return Some((self.active.id, self.active.reset_token));
        }
        self.pending.get(sequence).copied()
    }

    /// Raise the retirement watermark and retire everything tracked below it
    fn retire_prior(&mut self, retire_prior_to: u64) {
        if retire_prior_to > self.retire_prior_to {
            self.retire_prior_to = retire_prior_to;
        }
        let watermark = self.retire_prior_to;

        let mut retired = self
            .pending
            .drain_below(watermark)
            .map(|(sequence, (_, token))| (sequence, token))
            .collect::<Vec<_>>();
        if !self.active.retired && self.active.sequence < watermark {
            let pos = retired.partition_point(|&(seq, _)| seq < self.active.sequence);
            retired.insert(pos, (self.active.sequence, self.active.reset_token));
            self.active.retired = true;
        }

        for (sequence, token) in retired {
            debug!(sequence, "retiring at peer's request");
            self.retire(sequence, token);
            self.forget(sequence);
            self.stats.retired_by_peer += 1;
        }
    }

    /// Evict the oldest spares until we track no more CIDs than we advertised
    fn enforce_limit(&mut self) {
        let in_use = u64::from(self.active.assigned && !self.active.retired);
        while self.pending.len() as u64 + in_use > self.limit {
            let Some((sequence, (_, token))) = self.pending.pop_front() else {
                break;
            };
            debug!(sequence, limit = self.limit, "peer exceeded CID limit");
            self.retire(sequence, token);
            self.forget(sequence);
            self.stats.evicted += 1;
        }
    }

    /// Queue a `RETIRE_CONNECTION_ID` and stop treating the token as live
    fn retire(&mut self, sequence: u64, token: Option<ResetToken>) {
        self.frames.extend(iter::once(RetireConnectionId { sequence }));
        if let Some(token) = token {
            self.registry.retire(token);
        }
    }

    /// Remember that `sequence` must not be tracked again
    fn forget(&mut self, sequence: u64) {
        self.retired.insert_one(sequence);
        if self.retired.len() > MAX_RETIRED_RANGES {
            self.retired.merge_lowest();
        }
    }

    /// Switch to the lowest spare CID, if any
    ///
    /// A CID we move away from on our own is only retired in the registry: the peer wasn't
    /// asked, so there's no frame to send.
    fn rotate(&mut self) {
        let Some((sequence, (id, reset_token))) = self.pending.pop_front() else {
            return;
        };
        let next = Active {
            sequence,
            id,
            reset_token,
            assigned: true,
            retired: false,
        };
        let prev = mem::replace(&mut self.active, next);
        if !prev.retired {
            if let Some(token) = prev.reset_token {
                self.registry.retire(token);
            }
            self.forget(prev.sequence);
        }
        if let Some(token) = reset_token {
            self.registry.register(token);
        }
        debug!(
            from = %prev.id,
            to = %id,
            sequence,
            packets = self.packets_since_rotation,
            "switching remote CID"
        );
        self.packets_since_rotation = 0;
        self.stats.rotations += 1;
    }
}

impl<R, F> fmt::Debug for ConnectionIdManager<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionIdManager")
            .field("active", &self.active)
            .field("pending", &self.pending.sequences().collect::<Vec<_>>())
            .field("retire_prior_to", &self.retire_prior_to)
            .field("packets_since_rotation", &self.packets_since_rotation)
            .field("limit", &self.limit)
            .field("closed", &self.closed)
            .field("registry", &"[ opaque ]")
            .field("frames", &"[ opaque ]")
            .finish()
    }
}

/// Bound on the distinct runs of sequence numbers remembered as retired
const MAX_RETIRED_RANGES: usize = 16;

/// Connection ID management statistics
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CidStats {
    /// Times the active CID changed, including the switch away from the handshake CID
    pub rotations: u64,
    /// CIDs retired because of the peer's `retire_prior_to`
    pub retired_by_peer: u64,
    /// Spare CIDs evicted because the peer exceeded our limit
    pub evicted: u64,
    /// Offers ignored because we had already seen their sequence number
    pub duplicates: u64,
}

/// Protocol violations detected in the peer's `NEW_CONNECTION_ID` frames
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CidError {
    /// A sequence number was reused for a different connection ID
    #[error("received conflicting connection IDs for sequence number {sequence}")]
    ConflictingConnectionId {
        /// The reused sequence number
        sequence: u64,
    },
    /// A connection ID was offered again with a different stateless reset token
    #[error("received conflicting stateless reset tokens for sequence number {sequence}")]
    ConflictingResetToken {
        /// The reused sequence number
        sequence: u64,
    },
}
