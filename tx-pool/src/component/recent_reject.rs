//! Supplemental component (see `SPEC_FULL.md` §3): a small LRU of
//! transaction ids rejected by standardness or consensus checks in the
//! last `capacity` pool generations. Grounded in `ckb-tx-pool`'s own
//! `RecentReject` (`tx-pool/src/component/tests/recent_reject.rs` in the
//! teacher), simplified from that component's sharded on-disk store down
//! to an in-memory LRU — the spec only asks for a read-only observation
//! surface, not persistence, so the simpler shape is the honest one:
//! nothing here outlives a process restart, matching the Non-goal that
//! unconfirmed pool state is not durably persisted.

use lru::LruCache;
use txpool_error::Reject;
use txpool_types::TransactionId;

pub struct RecentReject {
    cache: LruCache<TransactionId, Reject>,
}

impl RecentReject {
    pub fn new(capacity: usize) -> Self {
        RecentReject {
            cache: LruCache::new(capacity.max(1)),
        }
    }

    pub fn record(&mut self, id: TransactionId, reason: Reject) {
        self.cache.put(id, reason);
    }

    pub fn was_recently_rejected(&mut self, id: &TransactionId) -> bool {
        self.cache.get(id).is_some()
    }

    pub fn get(&mut self, id: &TransactionId) -> Option<&Reject> {
        self.cache.get(id)
    }
}
