use thiserror::Error;

use crate::{MissionId, MotionKind};

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("mission definition has an empty id")]
    EmptyId,
    #[error("duplicate mission id `{0}`")]
    DuplicateId(MissionId),
    #[error("mission `{id}` difficulty {difficulty} is outside 1..=5")]
    InvalidDifficulty { id: MissionId, difficulty: u8 },
    #[error("mission `{id}` tolerance {tolerance} must be a finite value >= 0")]
    InvalidTolerance { id: MissionId, tolerance: f64 },
    #[error("mission `{id}` target value is not finite")]
    NonFiniteTarget { id: MissionId },
    #[error("mission `{id}` limit `{field}` must be a finite value >= 0")]
    InvalidLimit { id: MissionId, field: &'static str },
    #[error("unknown mission `{0}`")]
    UnknownMission(MissionId),
    #[error("mission `{0}` is locked")]
    MissionLocked(MissionId),
}

#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("setup is for {got} but the mission is {expected}")]
    MotionMismatch { expected: MotionKind, got: MotionKind },
    #[error("setup field `{field}` must be finite")]
    NonFinite { field: &'static str },
    #[error("setup field `{field}` must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("launch angle {0}° is outside 0..=90")]
    AngleOutOfRange(f64),
    #[error("gravity must be > 0 (got {0})")]
    NonPositiveGravity(f64),
    #[error("tick interval must be > 0 ms")]
    ZeroInterval,
}
