//! The key ledger.
//!
//! Owns the ordered record collection and its store. Every mutation runs as
//! one read-modify-persist step under the ledger lock; if the store write
//! fails the in-memory change is undone before the error is returned, so a
//! caller never observes state the store does not hold.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::duration::parse_expiration;
use super::record::{Expiration, KeyRecord};
use super::store::{KeyStore, MemoryStore};
use crate::error::{LedgerError, StoreError};

/// Authoritative collection of key redemptions.
pub struct Ledger {
    records: Mutex<Vec<KeyRecord>>,
    store: Box<dyn KeyStore>,
}

impl Ledger {
    /// Load the ledger from `store`. The store is not read again afterwards.
    pub fn open(store: Box<dyn KeyStore>) -> Result<Self, StoreError> {
        let records = store.load()?;
        info!(count = records.len(), "Key ledger loaded");
        Ok(Self {
            records: Mutex::new(records),
            store,
        })
    }

    /// Empty ledger backed by process memory.
    pub fn in_memory() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            store: Box::new(MemoryStore::new()),
        }
    }

    /// Self-service redemption.
    ///
    /// Any existing record for `key` blocks the redemption, even one that
    /// has expired but not yet been swept.
    pub fn redeem(
        &self,
        user: &str,
        key: &str,
        duration: &str,
        now: DateTime<Utc>,
    ) -> Result<Expiration, LedgerError> {
        let mut records = self.records.lock();
        if records.iter().any(|r| r.key == key) {
            return Err(LedgerError::AlreadyRedeemed(key.to_string()));
        }
        let expiration = parse_expiration(duration, now)?;

        records.push(KeyRecord::new(user, key, expiration));
        if let Err(e) = self.store.save(&records) {
            records.pop();
            return Err(e.into());
        }

        debug!(user, key, %expiration, "Key redeemed");
        Ok(expiration)
    }

    /// Administrative grant. Does not check for an existing record.
    pub fn grant(
        &self,
        user: &str,
        key: &str,
        duration: &str,
        now: DateTime<Utc>,
    ) -> Result<Expiration, LedgerError> {
        let expiration = parse_expiration(duration, now)?;

        let mut records = self.records.lock();
        records.push(KeyRecord::new(user, key, expiration));
        if let Err(e) = self.store.save(&records) {
            records.pop();
            return Err(e.into());
        }

        debug!(user, key, %expiration, "Key granted");
        Ok(expiration)
    }

    /// Remove every record owned by `user` for `key`.
    ///
    /// Returns the number removed. Nothing is written when nothing matched.
    pub fn revoke(&self, user: &str, key: &str) -> Result<usize, LedgerError> {
        let mut records = self.records.lock();
        let matches = |r: &KeyRecord| r.user == user && r.key == key;

        let removed = records.iter().filter(|r| matches(r)).count();
        if removed == 0 {
            return Ok(0);
        }

        let kept: Vec<KeyRecord> = records.iter().filter(|r| !matches(r)).cloned().collect();
        self.store.save(&kept)?;
        *records = kept;

        debug!(user, key, removed, "Key revoked");
        Ok(removed)
    }

    /// Drop every record whose expiry is at or before `now`.
    ///
    /// Lifetime records are never touched. Nothing is written when nothing
    /// expired.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<usize, LedgerError> {
        let mut records = self.records.lock();

        let removed = records
            .iter()
            .filter(|r| r.expiration.is_expired_at(now))
            .count();
        if removed == 0 {
            return Ok(0);
        }

        let kept: Vec<KeyRecord> = records
            .iter()
            .filter(|r| !r.expiration.is_expired_at(now))
            .cloned()
            .collect();
        self.store.save(&kept)?;
        *records = kept;
        Ok(removed)
    }

    /// Snapshot of the current records, in insertion order.
    pub fn list(&self) -> Vec<KeyRecord> {
        self.records.lock().clone()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when no key is redeemed.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::store::JsonFileStore;
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Arc;

    struct FailingStore;

    impl KeyStore for FailingStore {
        fn load(&self) -> Result<Vec<KeyRecord>, StoreError> {
            Ok(vec![KeyRecord::new("u0", "OLD", Expiration::Lifetime)])
        }

        fn save(&self, _records: &[KeyRecord]) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn hours(n: i64) -> TimeDelta {
        TimeDelta::hours(n)
    }

    fn tracked() -> (Ledger, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::open(Box::new(Arc::clone(&store))).unwrap();
        (ledger, store)
    }

    #[test]
    fn redeem_then_list_shows_one_record() {
        let ledger = Ledger::in_memory();
        let exp = ledger.redeem("u1", "KEY1", "24hr", t0()).unwrap();
        assert_eq!(exp, Expiration::At(t0() + hours(24)));
        assert_eq!(
            ledger.list(),
            vec![KeyRecord::new("u1", "KEY1", Expiration::At(t0() + hours(24)))]
        );
    }

    #[test]
    fn redeem_rejects_existing_key_without_mutation() {
        let (ledger, store) = tracked();
        ledger.redeem("u1", "KEY1", "24hr", t0()).unwrap();
        assert_eq!(store.writes(), 1);

        let err = ledger.redeem("u2", "KEY1", "1day", t0()).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyRedeemed(ref k) if k == "KEY1"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn expired_but_unswept_key_still_blocks_redeem() {
        let ledger = Ledger::in_memory();
        ledger.redeem("u1", "KEY1", "1hr", t0()).unwrap();
        let later = t0() + hours(5);
        assert!(matches!(
            ledger.redeem("u2", "KEY1", "L", later),
            Err(LedgerError::AlreadyRedeemed(_))
        ));
    }

    #[test]
    fn duplicate_check_precedes_duration_check() {
        let ledger = Ledger::in_memory();
        ledger.redeem("u1", "KEY1", "L", t0()).unwrap();
        assert!(matches!(
            ledger.redeem("u2", "KEY1", "bogus", t0()),
            Err(LedgerError::AlreadyRedeemed(_))
        ));
    }

    #[test]
    fn invalid_duration_does_not_write() {
        let (ledger, store) = tracked();
        let err = ledger.redeem("u1", "KEY1", "forever", t0()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDuration(_)));
        assert!(ledger.is_empty());
        assert_eq!(store.writes(), 0);

        assert!(ledger.grant("u1", "KEY1", "24", t0()).is_err());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn grant_allows_duplicate_keys() {
        let ledger = Ledger::in_memory();
        ledger.redeem("u1", "KEY1", "L", t0()).unwrap();
        ledger.grant("u2", "KEY1", "7day", t0()).unwrap();
        ledger.grant("u2", "KEY1", "7day", t0()).unwrap();
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn revoke_removes_all_matching_records() {
        let (ledger, store) = tracked();
        ledger.grant("u1", "KEY1", "L", t0()).unwrap();
        ledger.grant("u1", "KEY1", "L", t0()).unwrap();
        ledger.grant("u2", "KEY1", "L", t0()).unwrap();
        ledger.grant("u1", "KEY2", "L", t0()).unwrap();

        assert_eq!(ledger.revoke("u1", "KEY1").unwrap(), 2);
        let left: Vec<(String, String)> = ledger
            .list()
            .into_iter()
            .map(|r| (r.user, r.key))
            .collect();
        assert_eq!(
            left,
            vec![
                ("u2".to_string(), "KEY1".to_string()),
                ("u1".to_string(), "KEY2".to_string())
            ]
        );
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn revoke_without_match_is_a_noop() {
        let (ledger, store) = tracked();
        ledger.grant("u1", "KEY1", "L", t0()).unwrap();
        let writes = store.writes();

        assert_eq!(ledger.revoke("u1", "KEY2").unwrap(), 0);
        assert_eq!(ledger.revoke("u2", "KEY1").unwrap(), 0);
        assert_eq!(store.writes(), writes);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn sweep_removes_all_and_only_expired() {
        let (ledger, store) = tracked();
        ledger.grant("a", "LIFE", "L", t0()).unwrap();
        ledger.grant("b", "SHORT", "1hr", t0()).unwrap();
        ledger.grant("c", "EXACT", "2hr", t0()).unwrap();
        ledger.grant("d", "LONG", "1day", t0()).unwrap();
        ledger.grant("e", "ZERO", "0hr", t0()).unwrap();

        assert_eq!(ledger.sweep(t0() + hours(2)).unwrap(), 3);
        let keys: Vec<String> = ledger.list().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["LIFE", "LONG"]);
        assert_eq!(store.snapshot().len(), 2);

        let writes = store.writes();
        assert_eq!(ledger.sweep(t0() + hours(3)).unwrap(), 0);
        assert_eq!(store.writes(), writes);

        assert_eq!(ledger.sweep(DateTime::<Utc>::MAX_UTC).unwrap(), 1);
        assert_eq!(ledger.list()[0].key, "LIFE");
    }

    #[test]
    fn redeem_sweep_redeem_scenario() {
        let ledger = Ledger::in_memory();
        let t = t0();

        let exp = ledger.redeem("u1", "KEY1", "24hr", t).unwrap();
        assert_eq!(exp, Expiration::At(t + hours(24)));

        assert!(matches!(
            ledger.redeem("u2", "KEY1", "1day", t + hours(1)),
            Err(LedgerError::AlreadyRedeemed(_))
        ));

        assert_eq!(ledger.sweep(t + hours(25)).unwrap(), 1);
        assert!(ledger.is_empty());

        let exp = ledger.redeem("u2", "KEY1", "L", t + hours(26)).unwrap();
        assert_eq!(exp, Expiration::Lifetime);
        assert_eq!(ledger.list()[0].user, "u2");
    }

    #[test]
    fn failed_save_leaves_ledger_unchanged() {
        let ledger = Ledger::open(Box::new(FailingStore)).unwrap();
        let before = ledger.list();

        for result in [
            ledger.redeem("u1", "NEW", "L", t0()).map(|_| 0),
            ledger.grant("u1", "NEW", "L", t0()).map(|_| 0),
            ledger.revoke("u0", "OLD"),
        ] {
            assert!(matches!(result, Err(LedgerError::Persistence(_))));
        }
        assert_eq!(ledger.list(), before);
    }

    #[test]
    fn reopen_from_disk_restores_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keylist.json");

        let ledger = Ledger::open(Box::new(JsonFileStore::new(&path))).unwrap();
        ledger.redeem("u1", "KEY1", "24hr", t0()).unwrap();
        ledger.grant("u2", "KEY2", "L", t0()).unwrap();
        let before = ledger.list();
        drop(ledger);

        let reopened = Ledger::open(Box::new(JsonFileStore::new(&path))).unwrap();
        assert_eq!(reopened.list(), before);
    }

    #[test]
    fn list_reflects_state_at_call_time() {
        let ledger = Ledger::in_memory();
        let first = ledger.list();
        ledger.grant("u1", "KEY1", "L", t0()).unwrap();
        assert!(first.is_empty());
        assert_eq!(ledger.list().len(), 1);
    }
}
