/*
 * Spanfs
 * Copyright (C) 2023 The Spanfs Authors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::common::read_from_slice;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One cached file body.  `dirty` means the bytes here are newer than the
/// file server's copy; only a successful flush clears it.
pub struct CacheEntry {
    contents: Vec<u8>,
    last_sync: DateTime<Utc>,
    dirty: bool,
}

impl CacheEntry {
    fn new(contents: Vec<u8>) -> Self {
        CacheEntry {
            contents,
            last_sync: Utc::now(),
            dirty: false,
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn last_sync(&self) -> DateTime<Utc> {
        self.last_sync
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Copies `buf` in at `offset`, growing the body as needed.  A gap
    /// between the old end and `offset` stays zero-filled.  Always marks the
    /// entry dirty.
    pub fn write(&mut self, buf: &[u8], offset: usize) -> usize {
        let end = offset + buf.len();
        if self.contents.len() < end {
            self.contents.resize(end, 0);
        }
        self.contents[offset..end].copy_from_slice(buf);
        self.last_sync = Utc::now();
        self.dirty = true;
        buf.len()
    }
}

/// In-memory file bodies keyed by `<org>/<server>/<ref>`.  All access is
/// funneled through closures that run under the cache mutex, so references
/// into the map never escape the lock.
pub struct ContentCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ContentCache {
    pub fn new() -> Self {
        ContentCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Inserts a clean entry.  Returns false (and leaves the existing entry
    /// untouched) if the key is already resident; callers that mean to
    /// overwrite must `drop` first.
    pub fn put(&self, key: &str, contents: Vec<u8>) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(key) {
            return false;
        }
        entries.insert(key.to_owned(), CacheEntry::new(contents));
        true
    }

    pub fn drop_entry(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Runs `f` against the entry under the lock.  `None` if the key isn't
    /// resident.
    pub fn with_entry<F, R>(&self, key: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut CacheEntry) -> R,
    {
        self.entries.lock().get_mut(key).map(f)
    }

    /// `pread` against a cached body; 0 bytes past end-of-file.
    pub fn read_at(&self, key: &str, buf: &mut [u8], offset: usize) -> Option<usize> {
        self.with_entry(key, |entry| read_from_slice(&entry.contents, buf, offset))
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        ContentCache::new()
    }
}
