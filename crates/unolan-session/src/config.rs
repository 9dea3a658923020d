//! Session configuration and the nickname suggestion list.

use std::path::Path;

use crate::{Nickname, SessionError};

/// Where [`load_nicknames`] looks by default, relative to the working
/// directory.
pub const NICKNAMES_PATH: &str = "assets/nicknames.txt";

/// Offered when no nickname file is available.
pub const DEFAULT_NICKNAMES: [&str; 4] = ["Player1", "Player2", "Player3", "Player4"];

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// How many seats a session has and who hosts it.
///
/// `capacity` counts every seat *including the host's*, so a capacity of
/// 3 admits two remote participants.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    capacity: usize,
    host_nickname: Nickname,
}

impl SessionConfig {
    pub const MIN_CAPACITY: usize = 2;
    pub const MAX_CAPACITY: usize = 4;

    /// # Errors
    /// [`SessionError::InvalidCapacity`] for capacities outside 2..=4, or
    /// [`SessionError::InvalidNickname`] for a malformed host name.
    pub fn new(capacity: usize, host_nickname: &str) -> Result<Self, SessionError> {
        if !(Self::MIN_CAPACITY..=Self::MAX_CAPACITY).contains(&capacity) {
            return Err(SessionError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            host_nickname: Nickname::parse(host_nickname)?,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn host_nickname(&self) -> &Nickname {
        &self.host_nickname
    }

    /// Seats available to remote participants.
    pub fn remote_seats(&self) -> usize {
        self.capacity - 1
    }
}

// ---------------------------------------------------------------------------
// Nickname list
// ---------------------------------------------------------------------------

/// Reads one nickname per line from `path`.
///
/// Lines are trimmed and blank or invalid lines skipped. If the file is
/// missing, unreadable, or yields nothing, [`DEFAULT_NICKNAMES`] is
/// returned instead.
pub fn load_nicknames(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    let names: Vec<String> = match std::fs::read_to_string(path) {
        Ok(text) => text
            .lines()
            .filter_map(|line| Nickname::parse(line.trim()).ok())
            .map(Nickname::into_inner)
            .collect(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "nickname list unavailable");
            Vec::new()
        }
    };

    if names.is_empty() {
        DEFAULT_NICKNAMES.iter().map(|s| s.to_string()).collect()
    } else {
        names
    }
}
