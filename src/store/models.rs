use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ChirpId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password_hash: String,
    #[serde(default)]
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: ChirpId,
    pub author_id: UserId,
    pub body: String,
}

/// Revocation state of one issued refresh token, keyed by the token string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Last id handed out per entity type. Ids are never reused, even after a
/// delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub chirps: u64,
}

/// Everything the service persists. Read and written as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub chirps: BTreeMap<ChirpId, Chirp>,
    #[serde(default)]
    pub users: BTreeMap<UserId, User>,
    #[serde(default)]
    pub refresh_tokens: BTreeMap<String, RefreshTokenRecord>,
    #[serde(default)]
    pub sequences: Sequences,
}

impl Document {
    /// Bring the sequences up to at least the highest stored id. Documents
    /// written before sequences were persisted start from zero counters.
    pub(crate) fn reconcile_sequences(&mut self) {
        let max_user = self.users.keys().next_back().copied().unwrap_or(0);
        let max_chirp = self.chirps.keys().next_back().copied().unwrap_or(0);
        self.sequences.users = self.sequences.users.max(max_user);
        self.sequences.chirps = self.sequences.chirps.max(max_chirp);
    }

    pub(crate) fn next_user_id(&mut self) -> UserId {
        self.sequences.users += 1;
        self.sequences.users
    }

    pub(crate) fn next_chirp_id(&mut self) -> ChirpId {
        self.sequences.chirps += 1;
        self.sequences.chirps
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|user| user.email == email)
    }
}
