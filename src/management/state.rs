use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::utils;

/// Length of the anti-forgery state token embedded in authorize URLs.
pub const STATE_LENGTH: usize = 16;

/// How long an issued state stays valid before the callback must present it.
pub const STATE_TTL: Duration = Duration::from_secs(600);

/// Registry of anti-forgery states issued by `/auth/spotify`.
///
/// Each state is a random alphanumeric token recorded together with its issue
/// instant. The callback consumes the state it receives: a state can be
/// redeemed at most once, and only within the TTL. Unknown, expired, or
/// already-consumed states are rejected, which binds every callback to an
/// authorize request this process actually issued.
pub struct AuthStateStore {
    ttl: Duration,
    issued: Mutex<HashMap<String, Instant>>,
}

impl AuthStateStore {
    pub fn new(ttl: Duration) -> Self {
        AuthStateStore {
            ttl,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Generates a fresh state, records it, and returns it.
    ///
    /// Expired entries are purged on the way, so abandoned authorize attempts
    /// do not accumulate.
    pub async fn issue(&self) -> String {
        let state = utils::generate_id(STATE_LENGTH);
        let mut issued = self.issued.lock().await;
        issued.retain(|_, at| at.elapsed() <= self.ttl);
        issued.insert(state.clone(), Instant::now());
        state
    }

    /// Redeems a state presented by the callback.
    ///
    /// Returns `true` only if the state was issued by this store, has not
    /// been consumed before, and is within the TTL. The entry is removed
    /// either way, so a replayed state always fails.
    pub async fn consume(&self, state: &str) -> bool {
        let mut issued = self.issued.lock().await;
        match issued.remove(state) {
            Some(at) => at.elapsed() <= self.ttl,
            None => false,
        }
    }

    /// Number of currently recorded (possibly expired) states.
    pub async fn pending(&self) -> usize {
        self.issued.lock().await.len()
    }
}

impl Default for AuthStateStore {
    fn default() -> Self {
        AuthStateStore::new(STATE_TTL)
    }
}
