//! Error taxonomy for bandit construction and stepping.
//!
//! Two buckets:
//!
//! - **Configuration**: the caller wired things up wrong (empty registry,
//!   unknown/duplicate arm names). These indicate a malformed run and must
//!   fail it immediately rather than silently bias results.
//! - **Domain**: a value fell outside what a policy can accept (out-of-range
//!   parameters, a non-binary reward into Thompson sampling).
//!
//! Numeric edge cases (zero-pull UCB bounds, first-pull means) are handled as
//! policy inside the algorithms and are intentionally *not* represented here.

use thiserror::Error;

/// Coarse classification of a [`BanditError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Malformed wiring: empty or inconsistent registries, unknown arms.
    Configuration,
    /// A value outside a policy's accepted domain.
    Domain,
}

/// Errors surfaced by registry operations, policy construction, and stepping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BanditError {
    /// `select` was called on a registry with no arms.
    #[error("registry has no arms")]
    EmptyRegistry,

    /// An arm name was not present where it was required (registry merge,
    /// environment sampling).
    #[error("unknown arm {0:?}")]
    UnknownArm(String),

    /// The same arm name appeared twice in a registry's creation list.
    #[error("duplicate arm {0:?}")]
    DuplicateArm(String),

    /// A policy parameter failed its constructor's range check.
    #[error("parameter `{name}` = {value} out of range ({constraint})")]
    ParameterOutOfRange {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// Thompson sampling received a reward outside `{0, 1}`.
    #[error("reward {0} outside required domain {{0, 1}}")]
    NonBinaryReward(f64),

    /// A Beta posterior had non-positive or non-finite parameters.
    #[error("invalid Beta posterior (alpha={alpha}, beta={beta})")]
    InvalidPosterior { alpha: f64, beta: f64 },
}

impl BanditError {
    /// Which bucket of the taxonomy this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BanditError::EmptyRegistry
            | BanditError::UnknownArm(_)
            | BanditError::DuplicateArm(_) => ErrorKind::Configuration,
            BanditError::ParameterOutOfRange { .. }
            | BanditError::NonBinaryReward(_)
            | BanditError::InvalidPosterior { .. } => ErrorKind::Domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_partition_the_variants() {
        assert_eq!(BanditError::EmptyRegistry.kind(), ErrorKind::Configuration);
        assert_eq!(
            BanditError::UnknownArm("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            BanditError::NonBinaryReward(0.5).kind(),
            ErrorKind::Domain
        );
        assert_eq!(
            BanditError::ParameterOutOfRange {
                name: "epsilon",
                value: 2.0,
                constraint: "0 <= epsilon <= 1",
            }
            .kind(),
            ErrorKind::Domain
        );
    }

    #[test]
    fn display_is_readable() {
        let e = BanditError::UnknownArm("arm-z".to_string());
        assert_eq!(e.to_string(), "unknown arm \"arm-z\"");
    }
}
