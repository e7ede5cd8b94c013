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

#![allow(dead_code)]

use parking_lot::Mutex;
use spanfs::api::error::ApiError;
use spanfs::api::models::{FileMetadata, FileServer, Mapping};
use spanfs::api::{FilesApi, IndexApi};
use spanfs::common::settings::config::Config;
use spanfs::manager::catalog::ServerCatalog;
use spanfs::manager::FileManager;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn Error>>;

const TEST_CONFIG: &str = r#"{
    "indexServer": {"url": "https://idx.test", "tokenSource": "env::SPANFS_TEST_TOKEN"},
    "credentials": {"o1": {"s1": {}}}
}"#;

fn api_fail(message: &str) -> ApiError {
    ApiError::Response {
        status: 500,
        message: message.to_owned(),
    }
}

#[derive(Default)]
pub struct IndexState {
    pub mappings: Mutex<Vec<Mapping>>,
    pub servers: Mutex<Vec<FileServer>>,
    pub next_id: Mutex<u32>,
    pub calls: Mutex<Vec<String>>,
}

/// In-memory stand-in for the index server, faithful to its observable
/// contract: ids are assigned on create, updates match by id and apply only
/// the non-empty fields, deletes are by id.
pub struct FakeIndexServer {
    pub state: Arc<IndexState>,
}

impl IndexApi for FakeIndexServer {
    fn get_mappings(&self, force_fresh: bool) -> Result<Vec<Mapping>, ApiError> {
        self.state
            .calls
            .lock()
            .push(format!("get_mappings force={}", force_fresh));
        Ok(self.state.mappings.lock().clone())
    }

    fn create_mapping(&self, mapping: &Mapping) -> Result<Mapping, ApiError> {
        self.state
            .calls
            .lock()
            .push(format!("create_mapping path={}", mapping.path));
        let mut next_id = self.state.next_id.lock();
        *next_id += 1;
        let mut created = mapping.clone();
        created.id = format!("m{}", *next_id);
        self.state.mappings.lock().push(created.clone());
        Ok(created)
    }

    fn update_mapping(&self, mapping: &Mapping) -> Result<Mapping, ApiError> {
        self.state
            .calls
            .lock()
            .push(format!("update_mapping id={} path={}", mapping.id, mapping.path));
        let mut mappings = self.state.mappings.lock();
        let existing = mappings
            .iter_mut()
            .find(|m| m.id == mapping.id)
            .ok_or_else(|| api_fail("no such mapping"))?;
        if !mapping.path.is_empty() {
            existing.path = mapping.path.clone();
        }
        Ok(existing.clone())
    }

    fn delete_mapping(&self, id: &str) -> Result<(), ApiError> {
        self.state.calls.lock().push(format!("delete_mapping id={}", id));
        let mut mappings = self.state.mappings.lock();
        let before = mappings.len();
        mappings.retain(|m| m.id != id);
        if mappings.len() == before {
            return Err(api_fail("no such mapping"));
        }
        Ok(())
    }

    fn get_servers(&self) -> Result<Vec<FileServer>, ApiError> {
        self.state.calls.lock().push("get_servers".to_owned());
        Ok(self.state.servers.lock().clone())
    }
}

#[derive(Default)]
pub struct FilesState {
    pub contents: Mutex<HashMap<String, Vec<u8>>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_writes: Mutex<bool>,
}

/// In-memory stand-in for every file server at once, keyed by
/// `org/server/ref` the same way the content cache is.
pub struct FakeFileServer {
    pub state: Arc<FilesState>,
}

fn file_key(org: &str, server: &str, reference: &str) -> String {
    format!("{}/{}/{}", org, server, reference)
}

impl FilesApi for FakeFileServer {
    fn list(&self, org: &str, server: &str) -> Result<Vec<FileMetadata>, ApiError> {
        self.state.calls.lock().push(format!("list {}/{}", org, server));
        let prefix = format!("{}/{}/", org, server);
        Ok(self
            .state
            .contents
            .lock()
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, bytes)| FileMetadata {
                name: key[prefix.len()..].to_owned(),
                size_bytes: bytes.len() as u64,
                ..FileMetadata::default()
            })
            .collect())
    }

    fn touch(
        &self,
        org: &str,
        server: &str,
        reference: &str,
        _meta: &FileMetadata,
    ) -> Result<(), ApiError> {
        self.state
            .calls
            .lock()
            .push(format!("touch {}", file_key(org, server, reference)));
        self.state
            .contents
            .lock()
            .entry(file_key(org, server, reference))
            .or_insert_with(Vec::new);
        Ok(())
    }

    fn contents(&self, org: &str, server: &str, reference: &str) -> Result<Vec<u8>, ApiError> {
        let key = file_key(org, server, reference);
        self.state.calls.lock().push(format!("contents {}", key));
        self.state
            .contents
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| api_fail("no such file"))
    }

    fn update_contents(
        &self,
        org: &str,
        server: &str,
        reference: &str,
        contents: &[u8],
    ) -> Result<(), ApiError> {
        let key = file_key(org, server, reference);
        self.state
            .calls
            .lock()
            .push(format!("update_contents {} len={}", key, contents.len()));
        if *self.state.fail_writes.lock() {
            return Err(api_fail("injected write failure"));
        }
        self.state.contents.lock().insert(key, contents.to_vec());
        Ok(())
    }
}

pub struct TestHelper {
    pub index: Arc<IndexState>,
    pub files: Arc<FilesState>,
    pub catalog: Arc<ServerCatalog>,
    pub manager: FileManager<FakeIndexServer, FakeFileServer>,
}

impl TestHelper {
    pub fn new() -> TestHelper {
        let config = Config::parse_str(TEST_CONFIG).expect("test config must parse");
        let catalog = Arc::new(ServerCatalog::from_credentials(&config));

        let index = Arc::new(IndexState::default());
        let files = Arc::new(FilesState::default());

        let manager = FileManager::new(
            Arc::clone(&catalog),
            FakeIndexServer {
                state: Arc::clone(&index),
            },
            FakeFileServer {
                state: Arc::clone(&files),
            },
        );

        TestHelper {
            index,
            files,
            catalog,
            manager,
        }
    }

    /// The startup state every scenario builds on: one mapping linked at
    /// `docs/a.txt`, one known file server, and the file's bytes present on
    /// that server.
    pub fn seeded() -> TestHelper {
        let th = TestHelper::new();

        th.index.mappings.lock().push(Mapping {
            id: "m1".to_owned(),
            path: "docs/a.txt".to_owned(),
            organization_name: "o1".to_owned(),
            server_name: "s1".to_owned(),
            reference: "r1".to_owned(),
            size_bytes: 11,
            updated: 1_700_000_000,
        });
        th.index.servers.lock().push(FileServer {
            id: "fs1".to_owned(),
            organization_name: "o1".to_owned(),
            name: "s1".to_owned(),
            file_fetch_url: "https://fs/files".to_owned(),
        });
        th.files
            .contents
            .lock()
            .insert("o1/s1/r1".to_owned(), b"hello world".to_vec());
        // ids handed out by create_mapping continue after the seeded m1
        *th.index.next_id.lock() = 1;

        th.manager.sync().expect("seed sync must succeed");
        th.clear_calls();
        th
    }

    pub fn clear_calls(&self) {
        self.index.calls.lock().clear();
        self.files.calls.lock().clear();
    }

    pub fn index_calls(&self) -> Vec<String> {
        self.index.calls.lock().clone()
    }

    pub fn files_calls(&self) -> Vec<String> {
        self.files.calls.lock().clone()
    }

    pub fn ls_names(&self, path: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .manager
            .list(path)
            .expect("list must succeed")
            .iter()
            .map(|v| v.name().to_owned())
            .collect();
        names.sort();
        names
    }
}
