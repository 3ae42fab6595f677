#![no_main]
#[cfg(fuzzing)]
use arbitrary::Arbitrary;
#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

extern crate proto;
#[cfg(fuzzing)]
use proto::{
    CidConfig, ConnectionId, ConnectionIdManager, NewConnectionId, ResetToken,
    ResetTokenRegistry, RetireConnectionId, VarInt,
};

#[cfg(fuzzing)]
#[derive(Arbitrary, Debug)]
enum Op {
    NewConnectionId(NewConnectionId),
    PacketSent(u8),
    ReplaceInitial(ConnectionId),
    InitialResetToken(ResetToken),
    Close,
}

#[cfg(fuzzing)]
#[derive(Arbitrary, Debug)]
struct Params {
    limit: u8,
    packets_per_cid: u8,
    ops: Vec<Op>,
}

/// Live tokens, as a multiset since the peer may reuse token values
#[cfg(fuzzing)]
#[derive(Default)]
struct Live(Vec<ResetToken>);

#[cfg(fuzzing)]
impl ResetTokenRegistry for Live {
    fn register(&mut self, token: ResetToken) {
        self.0.push(token);
    }
    fn retire(&mut self, token: ResetToken) {
        if let Some(i) = self.0.iter().position(|t| *t == token) {
            self.0.swap_remove(i);
        }
    }
    fn remove(&mut self, token: ResetToken) {
        self.retire(token);
    }
}

#[cfg(fuzzing)]
fuzz_target!(|params: Params| {
    let mut config = CidConfig::default();
    let limit = u32::from(params.limit).max(2);
    config
        .active_connection_id_limit(VarInt::from_u32(limit))
        .unwrap()
        .packets_per_cid(u64::from(params.packets_per_cid).max(1))
        .unwrap();
    let mut cids = ConnectionIdManager::new(
        ConnectionId::new(&[0; 8]),
        &config,
        Live::default(),
        Vec::<RetireConnectionId>::new(),
    );

    for op in params.ops {
        let emitted = cids.frames().len();
        match op {
            Op::NewConnectionId(frame) => {
                if cids.on_new_connection_id(frame).is_err() {
                    assert_eq!(cids.frames().len(), emitted);
                    return;
                }
            }
            Op::PacketSent(n) => {
                for _ in 0..n {
                    cids.on_packet_sent();
                }
            }
            Op::ReplaceInitial(id) => cids.replace_initial(id),
            Op::InitialResetToken(token) => cids.set_initial_reset_token(token),
            Op::Close => cids.close(),
        }

        let fresh = &cids.frames()[emitted..];
        assert!(fresh.windows(2).all(|w| w[0].sequence < w[1].sequence));
        let tracked = cids.pending_len() as u64 + u64::from(cids.active_seq().is_some());
        assert!(tracked <= u64::from(limit));
    }
});
