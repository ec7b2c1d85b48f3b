//! The unconfirmed transaction pool.
//!
//! This crate is the workspace's analogue of `ckb-tx-pool`: an in-memory
//! admission pipeline (Components A/B/D/H), a reorg handler driven by
//! consensus-change notifications (Component E), a rolling fee estimator
//! (Component F), and a synchronous subscriber bus (Component G), all
//! glued together behind [`service::TxPoolService`] and backed by a
//! small persistent store for confirmed-transaction bookkeeping
//! (Component C).
//!
//! Embedders construct one [`TxPoolService`] at startup, feed it
//! transaction sets from the gossip layer or local wallets via
//! [`TxPoolService::accept_transaction_set`], and feed it consensus
//! notifications via [`TxPoolService::process_consensus_change`].
//! Everything else — conflict resolution, set merging, fee-median
//! bookkeeping, age-based pruning — happens inside those two calls.

pub mod component;
pub mod config;
pub mod consensus;
pub mod service;
pub mod store;
pub mod subscriber;

pub use component::{AdmissionOutcome, PoolState, PooledSet, ReorgOutcome, SubscriberSetView};
pub use config::TxPoolConfig;
pub use consensus::{ConsensusClient, PermissiveConsensusClient};
pub use service::TxPoolService;
pub use store::ConfirmedStore;
pub use subscriber::{Subscriber, SubscriberBus, TransactionPoolDiff};
