use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::PlaylistId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Missing,
    Stale,
    Fresh,
}

#[derive(Debug, Clone)]
struct Entry {
    updated_at: Option<DateTime<Utc>>,
    fetched_at: DateTime<Utc>,
}

/// Remembers when each playlist's full detail (with songs) was fetched.
#[derive(Debug, Clone)]
pub struct PlaylistCache {
    entries: HashMap<PlaylistId, Entry>,
    ttl: TimeDelta,
}

impl Default for PlaylistCache {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(300))
    }
}

impl PlaylistCache {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn record(&mut self, id: PlaylistId, updated_at: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.entries.insert(
            id,
            Entry {
                updated_at,
                fetched_at: now,
            },
        );
    }

    pub fn invalidate(&mut self, id: &PlaylistId) {
        self.entries.remove(id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `remote_updated_at` is the modification time most recently reported
    /// by any listing (feed, discover, library) for the same playlist.
    pub fn freshness(
        &self,
        id: &PlaylistId,
        remote_updated_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Freshness {
        let Some(entry) = self.entries.get(id) else {
            return Freshness::Missing;
        };

        if now.signed_duration_since(entry.fetched_at) > self.ttl {
            return Freshness::Stale;
        }

        match (remote_updated_at, entry.updated_at) {
            (Some(remote), Some(cached)) if remote > cached => Freshness::Stale,
            (Some(_), None) => Freshness::Stale,
            _ => Freshness::Fresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn unknown_playlist_is_missing() {
        let cache = PlaylistCache::default();
        assert_eq!(
            cache.freshness(&PlaylistId::from("p"), None, at(0)),
            Freshness::Missing
        );
    }

    #[test]
    fn newer_remote_timestamp_makes_entry_stale() {
        let mut cache = PlaylistCache::new(Duration::from_secs(300));
        let id = PlaylistId::from("p");
        cache.record(id.clone(), Some(at(0)), at(10));

        assert_eq!(cache.freshness(&id, Some(at(0)), at(20)), Freshness::Fresh);
        assert_eq!(cache.freshness(&id, None, at(20)), Freshness::Fresh);
        assert_eq!(cache.freshness(&id, Some(at(5)), at(20)), Freshness::Stale);
    }

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache = PlaylistCache::new(Duration::from_secs(60));
        let id = PlaylistId::from("p");
        cache.record(id.clone(), Some(at(0)), at(0));

        assert_eq!(cache.freshness(&id, Some(at(0)), at(60)), Freshness::Fresh);
        assert_eq!(cache.freshness(&id, Some(at(0)), at(61)), Freshness::Stale);

        cache.invalidate(&id);
        assert_eq!(cache.freshness(&id, None, at(0)), Freshness::Missing);
    }
}
