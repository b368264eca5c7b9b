use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadMark {
    pub last_read_reply: u32,
    pub last_read_time: DateTime<Utc>,
}

/// Local record of which topics the user has opened
pub trait ReadStore: Send + Sync + std::fmt::Debug {
    fn mark_read(&self, topic_id: u64, replies: u32);
    fn last_read(&self, topic_id: u64) -> Option<ReadMark>;
}

fn mark(marks: &mut HashMap<u64, ReadMark>, topic_id: u64, replies: u32) -> bool {
    // A topic without replies has nothing to remember beyond the in-memory flag.
    if replies == 0 {
        return false;
    }
    marks.insert(
        topic_id,
        ReadMark {
            last_read_reply: replies,
            last_read_time: Utc::now(),
        },
    );
    true
}

#[derive(Debug, Default)]
pub struct MemoryReadStore {
    marks: Mutex<HashMap<u64, ReadMark>>,
}

impl ReadStore for MemoryReadStore {
    fn mark_read(&self, topic_id: u64, replies: u32) {
        if let Ok(mut marks) = self.marks.lock() {
            mark(&mut marks, topic_id, replies);
        }
    }

    fn last_read(&self, topic_id: u64) -> Option<ReadMark> {
        self.marks.lock().ok()?.get(&topic_id).copied()
    }
}

/// Read marks persisted as one JSON file in the cache directory
#[derive(Debug)]
pub struct JsonReadStore {
    path: PathBuf,
    marks: Mutex<HashMap<u64, ReadMark>>,
}

impl JsonReadStore {
    pub fn open(path: PathBuf) -> Self {
        let marks = cache::read_from(&path).unwrap_or_default();
        Self {
            path,
            marks: Mutex::new(marks),
        }
    }

    /// Store under the default cache directory. None if the platform has none.
    pub fn open_default() -> Option<Self> {
        cache::cache_path("read_state").map(Self::open)
    }
}

impl ReadStore for JsonReadStore {
    fn mark_read(&self, topic_id: u64, replies: u32) {
        let Ok(mut marks) = self.marks.lock() else {
            return;
        };
        if mark(&mut marks, topic_id, replies) {
            cache::write_to(&self.path, &*marks);
        }
    }

    fn last_read(&self, topic_id: u64) -> Option<ReadMark> {
        self.marks.lock().ok()?.get(&topic_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_remembers_reply_count() {
        let store = MemoryReadStore::default();
        store.mark_read(7, 12);
        assert_eq!(store.last_read(7).unwrap().last_read_reply, 12);
        assert!(store.last_read(8).is_none());
    }

    #[test]
    fn zero_replies_are_not_recorded() {
        let store = MemoryReadStore::default();
        store.mark_read(7, 0);
        assert!(store.last_read(7).is_none());
    }

    #[test]
    fn json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("read_state.json");

        let store = JsonReadStore::open(path.clone());
        store.mark_read(42, 3);
        drop(store);

        let reopened = JsonReadStore::open(path);
        assert_eq!(reopened.last_read(42).unwrap().last_read_reply, 3);
    }
}
