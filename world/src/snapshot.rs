//! Versioned persistence of a running session.

use std::time::Duration;

use maze_escape_core::{Difficulty, Grid, GridError, SessionError, SessionOutcome};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{enemy::Enemy, ensure_playable, player::Player, World};

/// Tag opening every encoded snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"MZES";

/// Snapshot layout version written by [`encode_snapshot`].
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + std::mem::size_of::<u16>();

/// Errors raised while saving or restoring a session.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The blob is shorter than the snapshot header.
    #[error("snapshot is truncated")]
    Truncated,
    /// The blob does not start with the snapshot tag.
    #[error("data is not a maze escape snapshot")]
    BadMagic,
    /// The blob was written by an unsupported format version.
    #[error("snapshot version {0} is not supported")]
    UnsupportedVersion(u16),
    /// The payload could not be serialized.
    #[error("failed to encode snapshot")]
    Encode(#[source] bincode::Error),
    /// The payload could not be deserialized.
    #[error("failed to decode snapshot")]
    Decode(#[source] bincode::Error),
    /// The stored grid violates a structural invariant.
    #[error("snapshot grid is invalid: {0}")]
    InvalidGrid(#[from] GridError),
    /// The stored exit cannot be reached from the start.
    #[error("snapshot exit is unreachable from the start tile")]
    UnreachableExit,
    /// Stored entity state disagrees with the rest of the snapshot.
    #[error("snapshot entity state is inconsistent: {0}")]
    Inconsistent(&'static str),
}

impl From<SessionError> for SnapshotError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::InvalidGrid(grid) => Self::InvalidGrid(grid),
            SessionError::UnreachableExit => Self::UnreachableExit,
        }
    }
}

/// Persistent state of a session, independent of any derived data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    grid: Grid,
    difficulty: Difficulty,
    player: Player,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    clock: Duration,
    tick_index: u64,
    running: bool,
    paused: bool,
    outcome: Option<SessionOutcome>,
    rng: ChaCha8Rng,
}

impl SessionSnapshot {
    /// Grid stored in the snapshot.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Difficulty stored in the snapshot.
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Simulated time stored in the snapshot.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Outcome stored in the snapshot, if the session had ended.
    #[must_use]
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let _ = ensure_playable(&self.grid)?;

        if let Some(map) = &self.player.exploration {
            if !map.matches_dimensions(self.grid.width(), self.grid.height()) {
                return Err(SnapshotError::Inconsistent(
                    "exploration map does not match the grid",
                ));
            }
        }

        if self.player.upgrades.has_map != self.player.exploration.is_some() {
            return Err(SnapshotError::Inconsistent(
                "map ownership disagrees with exploration state",
            ));
        }

        if self
            .enemies
            .iter()
            .any(|enemy| enemy.id.get() >= self.next_enemy_id)
        {
            return Err(SnapshotError::Inconsistent(
                "enemy identifier exceeds the allocator",
            ));
        }

        if self.running && self.outcome.is_some() {
            return Err(SnapshotError::Inconsistent(
                "finished session is marked as running",
            ));
        }

        Ok(())
    }
}

/// Serializes a snapshot into an opaque, versioned blob.
pub fn encode_snapshot(snapshot: &SessionSnapshot) -> Result<Vec<u8>, SnapshotError> {
    let payload = bincode::serialize(snapshot).map_err(SnapshotError::Encode)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&SNAPSHOT_MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Parses and validates a blob produced by [`encode_snapshot`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<SessionSnapshot, SnapshotError> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::Truncated);
    }

    let (magic, rest) = bytes.split_at(SNAPSHOT_MAGIC.len());
    if magic != SNAPSHOT_MAGIC {
        return Err(SnapshotError::BadMagic);
    }

    let (version, payload) = rest.split_at(std::mem::size_of::<u16>());
    let version = u16::from_le_bytes([version[0], version[1]]);
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }

    let snapshot: SessionSnapshot =
        bincode::deserialize(payload).map_err(SnapshotError::Decode)?;
    snapshot.validate()?;
    Ok(snapshot)
}

impl World {
    /// Captures the persistent state of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            grid: self.grid.clone(),
            difficulty: self.difficulty,
            player: self.player.clone(),
            enemies: self.enemies.clone(),
            next_enemy_id: self.next_enemy_id,
            clock: self.clock,
            tick_index: self.tick_index,
            running: self.running,
            paused: self.paused,
            outcome: self.outcome,
            rng: self.rng.clone(),
        }
    }

    /// Rebuilds a world from a snapshot after validating it.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        Ok(Self {
            grid: snapshot.grid,
            difficulty: snapshot.difficulty,
            player: snapshot.player,
            enemies: snapshot.enemies,
            next_enemy_id: snapshot.next_enemy_id,
            clock: snapshot.clock,
            tick_index: snapshot.tick_index,
            running: snapshot.running,
            paused: snapshot.paused,
            outcome: snapshot.outcome,
            rng: snapshot.rng,
        })
    }

    /// Replaces the session with one decoded from `bytes`.
    ///
    /// The blob is decoded and validated in full before any state changes, so
    /// a failure leaves the current session untouched.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        let restored = Self::from_snapshot(decode_snapshot(bytes)?)?;
        *self = restored;
        log::info!("restored session at tick {}", self.tick_index);
        Ok(())
    }
}
