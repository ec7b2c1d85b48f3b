//! Error taxonomy for the tpool workspace.
//!
//! Mirrors the shape of modern `ckb-error`/`ckb-types::core::tx_pool`:
//! a small [`ErrorKind`] distinguishing the broad categories an error can
//! fall into, a [`TPoolError`] that wraps a kind plus its cause, a
//! [`Reject`] enum enumerating every admission-rejection reason the spec
//! names, and an [`InternalErrorKind`]/[`InternalError`] pair for
//! sanity-violation and persistence-layer failures that are logged but
//! never surfaced to a caller as an admission result.

use std::fmt;
use thiserror::Error;

/// The broad category an error belongs to.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    /// Rejected during composition/standardness checks or conflict
    /// resolution, before consensus is ever consulted.
    #[error("Composition")]
    Composition,
    /// Rejected by `consensus.TryTransactionSet`.
    #[error("Consensus")]
    Consensus,
    /// A failure in the pool's own bookkeeping: persistence, or an
    /// invariant that should never be observably false.
    #[error("Internal")]
    Internal,
}

/// The top-level error type returned by fallible pool operations that are
/// not part of the admission-rejection taxonomy (e.g. store setup).
#[derive(Debug)]
pub struct TPoolError {
    kind: ErrorKind,
    cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl TPoolError {
    /// Build an error of `kind` with no further cause.
    pub fn new(kind: ErrorKind) -> Self {
        TPoolError { kind, cause: None }
    }

    /// Attach `cause` as the reason `kind` occurred, mirroring
    /// `ErrorKind::because` from the teacher's newer `ckb-error`.
    pub fn because<E>(kind: ErrorKind, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TPoolError {
            kind,
            cause: Some(Box::new(cause)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for TPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}({})", self.kind, cause),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for TPoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Every reason the admission engine can refuse a transaction set. Every
/// variant here is recoverable: admission errors are returned to the
/// caller and never alter persistent state (see `spec.md` §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Reject {
    /// The incoming transaction sequence was empty.
    #[error("EmptySet: a transaction set must contain at least one transaction")]
    EmptySet,

    /// A set with this id (or, after dedup, with no novel transactions)
    /// is already pooled.
    #[error("DuplicateSet: transaction set is already known")]
    DuplicateSet,

    /// `transactionListSize` would exceed `TransactionPoolSizeLimit`.
    #[error("PoolFull: transaction pool has reached its size limit of {0} bytes")]
    PoolFull(u64),

    /// Pool usage is above `TransactionPoolSizeForFee` and the set's
    /// aggregate miner fee is below the required floor.
    #[error("LowMinerFees: need at least {required} but the set pays {paid}")]
    LowMinerFees { required: u64, paid: u64 },

    /// A single transaction's canonical encoding exceeds
    /// `TransactionSizeLimit`.
    #[error("LargeTransaction: transaction of {0} bytes exceeds the per-transaction size limit")]
    LargeTransaction(u64),

    /// The set's aggregate canonical encoding exceeds
    /// `TransactionSetSizeLimit`.
    #[error("LargeTransactionSet: set of {0} bytes exceeds the set size limit")]
    LargeTransactionSet(u64),

    /// An arbitrary-data blob did not start with a recognized prefix.
    #[error("InvalidArbitraryData: arbitrary data does not start with a recognized prefix")]
    InvalidArbitraryData,

    /// An unlock condition named an unrecognized public-key algorithm.
    #[error("UnrecognizedKeyAlgorithm: unlock condition uses an unrecognized key algorithm {0}")]
    UnrecognizedKeyAlgorithm(u8),

    /// A file contract's start height is not far enough in the future.
    #[error(
        "FileContractStartTooSoon: start height {start} is less than {window} blocks past current height {current}"
    )]
    FileContractStartTooSoon {
        start: u64,
        current: u64,
        window: u64,
    },

    /// `consensus.TryTransactionSet` rejected the (possibly merged) set.
    /// Wraps the consensus engine's message verbatim.
    #[error("ConsensusConflict: {0}")]
    ConsensusConflict(String),
}

/// Errors in the pool's own bookkeeping: persistence failures and
/// sanity-violations. Never constructed from user input; in release
/// builds these are only raised at the strategic checkpoints `spec.md`
/// §7 and §9 name (post-admission, post-reorg), not per-field.
#[derive(Error, Debug)]
pub enum InternalErrorKind {
    /// The persistent key-value store returned an error (disk I/O,
    /// corruption, transaction abort).
    #[error("Database")]
    Database,
    /// An internal lock was poisoned by a panicking holder.
    #[error("Poisoned")]
    Poisoned,
    /// Two in-memory maps that must share a key domain (e.g. `sets` vs.
    /// `set_diffs`) have diverged.
    #[error("DataCorrupted")]
    DataCorrupted,
}

impl InternalErrorKind {
    /// Attach a human-readable cause, producing an [`InternalError`].
    pub fn because<S: Into<String>>(self, reason: S) -> InternalError {
        InternalError {
            kind: self,
            reason: reason.into(),
        }
    }
}

/// A concrete internal error: a kind plus a free-form reason string.
#[derive(Error, Debug)]
#[error("{kind}: {reason}")]
pub struct InternalError {
    kind: InternalErrorKind,
    reason: String,
}

impl InternalError {
    pub fn kind(&self) -> &InternalErrorKind {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_display_is_stable_and_readable() {
        assert_eq!(format!("{}", Reject::EmptySet), "EmptySet: a transaction set must contain at least one transaction");
        assert_eq!(
            format!("{}", Reject::ConsensusConflict("double spend".to_string())),
            "ConsensusConflict: double spend"
        );
    }

    #[test]
    fn internal_error_because_attaches_reason() {
        let err = InternalErrorKind::DataCorrupted.because("set present in `sets` but not `set_diffs`");
        assert_eq!(
            format!("{err}"),
            "DataCorrupted: set present in `sets` but not `set_diffs`"
        );
    }

    #[test]
    fn tpool_error_because_wraps_cause() {
        let cause = InternalErrorKind::Database.because("disk full");
        let err = TPoolError::because(ErrorKind::Internal, cause);
        assert!(err.to_string().starts_with("Internal(Database:"));
    }
}
