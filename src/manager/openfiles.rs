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

use crate::common::constants::FIRST_FILE_HANDLE;
use parking_lot::Mutex;
use std::collections::HashMap;

/// A handle the kernel bridge holds on an opened path.  The mode is carried
/// for completeness; the cache, not the handle, is authoritative for bytes.
#[derive(Clone, Debug)]
pub struct OpenFile {
    pub handle: u64,
    pub path: String,
    pub offset: u64,
    pub mode: u32,
}

/// Maps the numeric handles handed to the kernel back to paths.
pub struct OpenFileTable {
    state: Mutex<OpenFilesState>,
}

struct OpenFilesState {
    open_files: HashMap<u64, OpenFile>,
    next_handle: u64,
}

impl OpenFileTable {
    pub fn new() -> Self {
        OpenFileTable {
            state: Mutex::new(OpenFilesState {
                open_files: HashMap::new(),
                next_handle: FIRST_FILE_HANDLE,
            }),
        }
    }

    pub fn open(&self, path: &str, mode: u32) -> u64 {
        let mut state = self.state.lock();
        let handle = state.next_handle;
        state.next_handle += 1;
        state.open_files.insert(
            handle,
            OpenFile {
                handle,
                path: path.to_owned(),
                offset: 0,
                mode,
            },
        );
        handle
    }

    pub fn get(&self, handle: u64) -> Option<OpenFile> {
        self.state.lock().open_files.get(&handle).cloned()
    }

    pub fn close(&self, handle: u64) -> bool {
        self.state.lock().open_files.remove(&handle).is_some()
    }
}

impl Default for OpenFileTable {
    fn default() -> Self {
        OpenFileTable::new()
    }
}
