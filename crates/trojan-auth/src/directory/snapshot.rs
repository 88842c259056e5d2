//! Immutable directory snapshot and payload decoding.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Deserialize;

use crate::error::DirectoryError;
use crate::result::AuthMetadata;

/// A user as published by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// User identifier used for accounting.
    pub id: String,
    /// Credential the client presents when connecting.
    pub credential: String,
    /// Maximum concurrent devices (0 = unlimited).
    pub device_limit: i64,
    /// Speed limit (0 = unlimited).
    pub speed_limit: i64,
}

impl UserRecord {
    /// Create a record without limits.
    pub fn new(id: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            credential: credential.into(),
            device_limit: 0,
            speed_limit: 0,
        }
    }

    /// Limits of this user as auth metadata.
    #[inline]
    pub fn metadata(&self) -> AuthMetadata {
        AuthMetadata {
            device_limit: self.device_limit,
            speed_limit: self.speed_limit,
        }
    }
}

/// Full set of users from one directory fetch, keyed by credential, plus
/// the change token the remote returned with it.
///
/// Never mutated after construction; a newer fetch produces a new snapshot.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    users: HashMap<String, UserRecord>,
    change_token: Option<String>,
}

impl DirectorySnapshot {
    /// Build a snapshot. When two records share a credential the later one wins.
    pub fn new<I>(users: I, change_token: Option<String>) -> Self
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let users = users
            .into_iter()
            .map(|u| (u.credential.clone(), u))
            .collect();
        Self {
            users,
            change_token: change_token.filter(|t| !t.is_empty()),
        }
    }

    /// Look up a user by credential.
    #[inline]
    pub fn get(&self, credential: &str) -> Option<&UserRecord> {
        self.users.get(credential)
    }

    /// Change token captured with this snapshot, if the remote sent one.
    #[inline]
    pub fn change_token(&self) -> Option<&str> {
        self.change_token.as_deref()
    }

    /// Number of credentials in the snapshot.
    #[inline]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check if the snapshot has no users.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Distinct user ids in the snapshot.
    pub fn user_ids(&self) -> HashSet<&str> {
        self.users.values().map(|u| u.id.as_str()).collect()
    }

    /// User ids present in `previous` but absent here, sorted and deduplicated.
    pub fn removed_since(&self, previous: &DirectorySnapshot) -> Vec<String> {
        let current = self.user_ids();
        previous
            .users
            .values()
            .map(|u| u.id.as_str())
            .filter(|id| !current.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

// ── Wire format ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum WireUserList {
    Wrapped { users: Vec<WireUser> },
    Bare(Vec<WireUser>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct WireUser {
    id: WireId,
    uuid: String,
    #[serde(default)]
    dt: i64,
    #[serde(default)]
    st: i64,
}

impl From<WireUser> for UserRecord {
    fn from(w: WireUser) -> Self {
        Self {
            id: match w.id {
                WireId::Number(n) => n.to_string(),
                WireId::Text(s) => s,
            },
            credential: w.uuid,
            device_limit: w.dt,
            speed_limit: w.st,
        }
    }
}

/// Decode a directory payload.
///
/// Accepts `{"users": [...]}` or a bare array of
/// `{"id": 1, "uuid": "...", "dt": 3, "st": 100}` records.
pub fn parse_users(body: &[u8]) -> Result<Vec<UserRecord>, DirectoryError> {
    let list: WireUserList =
        serde_json::from_slice(body).map_err(|e| DirectoryError::Decode(e.to_string()))?;
    let users = match list {
        WireUserList::Wrapped { users } | WireUserList::Bare(users) => users,
    };
    Ok(users.into_iter().map(UserRecord::from).collect())
}
