use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Builder;

/// Hands out section and task ids, never repeating one within a session.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        IdGenerator::default()
    }

    /// Record an id that already exists (e.g. read back from storage) so it is
    /// never handed out again.
    pub fn register(&mut self, id: &str) {
        self.issued.insert(id.to_string());
    }

    pub fn create_id(&mut self) -> String {
        loop {
            let id = random_id();
            if self.issued.insert(id.clone()) {
                return id;
            }
            log::debug!("id collision on {}, drawing again", id);
        }
    }
}

fn random_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string(),
        Err(err) => {
            log::warn!("os rng unavailable ({}), using fallback id", err);
            fallback_id()
        }
    }
}

fn fallback_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let fraction: f64 = rand::thread_rng().gen();
    format!("id-{}-{}", millis, fraction)
}
