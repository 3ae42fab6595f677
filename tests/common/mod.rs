//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::{
    io::{self, Write},
    str,
};

use quinn_remote_cid::{
    CidConfig, ConnectionId, ConnectionIdManager, NewConnectionId, ResetToken, ResetTokenRegistry,
    RetireConnectionId, RESET_TOKEN_SIZE,
};
use tracing_subscriber::EnvFilter;

pub type Manager = ConnectionIdManager<Tokens, Vec<RetireConnectionId>>;

/// Registry recording every notification in the order it was received
#[derive(Debug, Default)]
pub struct Tokens {
    pub events: Vec<TokenEvent>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenEvent {
    Register(ResetToken),
    Retire(ResetToken),
    Remove(ResetToken),
}

impl Tokens {
    pub fn registered(&self) -> Vec<ResetToken> {
        self.filter(|e| match e {
            TokenEvent::Register(t) => Some(t),
            _ => None,
        })
    }

    pub fn retired(&self) -> Vec<ResetToken> {
        self.filter(|e| match e {
            TokenEvent::Retire(t) => Some(t),
            _ => None,
        })
    }

    pub fn removed(&self) -> Vec<ResetToken> {
        self.filter(|e| match e {
            TokenEvent::Remove(t) => Some(t),
            _ => None,
        })
    }

    fn filter(&self, f: impl Fn(TokenEvent) -> Option<ResetToken>) -> Vec<ResetToken> {
        self.events.iter().copied().filter_map(f).collect()
    }
}

impl ResetTokenRegistry for Tokens {
    fn register(&mut self, token: ResetToken) {
        self.events.push(TokenEvent::Register(token));
    }

    fn retire(&mut self, token: ResetToken) {
        self.events.push(TokenEvent::Retire(token));
    }

    fn remove(&mut self, token: ResetToken) {
        self.events.push(TokenEvent::Remove(token));
    }
}

pub fn manager(config: &CidConfig) -> Manager {
    ConnectionIdManager::new(initial_cid(), config, Tokens::default(), Vec::new())
}

pub fn initial_cid() -> ConnectionId {
    ConnectionId::new(&[1, 1, 1, 1])
}

pub fn token(byte: u8) -> ResetToken {
    ResetToken::from([byte; RESET_TOKEN_SIZE])
}

/// A `NEW_CONNECTION_ID` whose ID and token are derived from the sequence number
pub fn new_cid(sequence: u64, retire_prior_to: u64) -> NewConnectionId {
    let byte = sequence as u8;
    NewConnectionId {
        sequence,
        retire_prior_to,
        id: ConnectionId::new(&[byte; 4]),
        reset_token: Some(token(byte)),
    }
}

pub fn retired_seqs(m: &Manager) -> Vec<u64> {
    m.frames().iter().map(|f| f.sequence).collect()
}

pub fn subscribe() -> tracing::subscriber::DefaultGuard {
    let sub = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(|| TestWriter)
        .finish();
    tracing::subscriber::set_default(sub)
}

struct TestWriter;

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        print!(
            "{}",
            str::from_utf8(buf).expect("tried to log invalid UTF-8")
        );
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
