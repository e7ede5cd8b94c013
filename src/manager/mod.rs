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

//! The FileManager translates each syscall-level operation into the smallest
//! correct sequence of calls against its five collaborators: the mirror
//! tree, the content cache, the open-file table, the server catalog, and the
//! two API clients.  It recovers nothing: collaborator failures are
//! classified into the driver's error taxonomy and surfaced; the next sync
//! reconciles whatever got out of step.

use crate::api::models::{FileMetadata, Mapping};
use crate::api::{FilesApi, IndexApi};
use crate::common::err::{SpanError, SpanResult};
use crate::common::{is_server_path, now_epoch_seconds, parse_server_file_path};
use log::{debug, error, info, warn};
use std::sync::Arc;

pub mod cache;
pub mod catalog;
pub mod mirror;
pub mod openfiles;

use cache::ContentCache;
use catalog::ServerCatalog;
use mirror::{FileDesc, Mirror, NodeView};
use openfiles::{OpenFile, OpenFileTable};

const TAG: &str = "file_manager";

pub struct FileManager<I, F>
where
    I: IndexApi,
    F: FilesApi,
{
    mirror: Mirror,
    cache: ContentCache,
    open_files: OpenFileTable,
    catalog: Arc<ServerCatalog>,
    is_client: I,
    fs_client: F,
}

fn cache_key(desc: &FileDesc) -> String {
    format!("{}/{}/{}", desc.organization, desc.server, desc.reference)
}

impl<I, F> FileManager<I, F>
where
    I: IndexApi,
    F: FilesApi,
{
    pub fn new(catalog: Arc<ServerCatalog>, is_client: I, fs_client: F) -> Self {
        FileManager {
            mirror: Mirror::new(),
            cache: ContentCache::new(),
            open_files: OpenFileTable::new(),
            catalog,
            is_client,
            fs_client,
        }
    }

    pub fn list(&self, path: &str) -> SpanResult<Vec<NodeView>> {
        self.mirror.ls(path).map_err(SpanError::from)
    }

    pub fn stat(&self, path: &str) -> SpanResult<NodeView> {
        self.mirror.info(path).map_err(SpanError::from)
    }

    /// Creates an empty file on its server, then records it in the mirror.
    /// Only full-depth server paths are creatable; everything else in user
    /// territory comes into being through `link`.
    pub fn touch(&self, path: &str) -> SpanResult<()> {
        let (org, server, reference) = parse_server_file_path(path)
            .ok_or_else(|| SpanError::CannotWriteInNonServerPath(path.to_owned()))?;

        let now = now_epoch_seconds();
        let meta = FileMetadata {
            name: reference.to_owned(),
            last_updated: now,
            ..FileMetadata::default()
        };
        self.fs_client
            .touch(org, server, reference, &meta)
            .map_err(SpanError::FailedToWriteFileInServer)?;

        if let Err(e) = self.mirror.add_file(org, server, reference, 0, now) {
            // the server now has a file the mirror doesn't: nothing to undo
            // here, the next sync reconciles
            error!(
                target: TAG,
                "critical: mirror/server desync after touch of {}: {}", path, e
            );
            return Err(e.into());
        }
        Ok(())
    }

    pub fn open(&self, path: &str, mode: u32) -> u64 {
        self.open_files.open(path, mode)
    }

    pub fn open_file(&self, handle: u64) -> Option<OpenFile> {
        self.open_files.get(handle)
    }

    pub fn close(&self, handle: u64) -> bool {
        self.open_files.close(handle)
    }

    /// Copies `[offset, offset+buf.len())` of the file at `path` into `buf`,
    /// clamped to the cached length.  Fills the cache from the file server
    /// on a miss.
    pub fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> SpanResult<usize> {
        let desc = self.resolve_file(path)?;
        self.ensure_cached(&desc)?;
        self.cache
            .read_at(&cache_key(&desc), buf, offset as usize)
            .ok_or(SpanError::InternalCacheError)
    }

    /// Writes into the cached body, growing it as needed and marking it
    /// dirty.  A write to a link lands on the underlying server file; a
    /// write to a file not yet resident starts from an empty body.
    pub fn write(&self, path: &str, buf: &[u8], offset: u64) -> SpanResult<usize> {
        let desc = self.resolve_file(path)?;
        let key = cache_key(&desc);
        if !self.cache.has(&key) {
            // a false return means another write raced us to materialize
            // the entry, which is just as good
            self.cache.put(&key, Vec::new());
        }
        self.cache
            .with_entry(&key, |entry| entry.write(buf, offset as usize))
            .ok_or(SpanError::InternalCacheError)
    }

    /// Pushes dirty contents back to the file server, then drops the entry
    /// and re-syncs so the server's own size/timestamp reappear in the
    /// mirror.  Clean or absent entries are a no-op.
    pub fn flush(&self, path: &str) -> SpanResult<()> {
        let desc = self.resolve_file(path)?;
        let key = cache_key(&desc);

        // clone the bytes out under the lock; the upload must not hold it
        let dirty_bytes = self
            .cache
            .with_entry(&key, |entry| {
                if entry.dirty() {
                    Some(entry.contents().to_vec())
                } else {
                    None
                }
            })
            .unwrap_or(None);

        let bytes = match dirty_bytes {
            Some(bytes) => bytes,
            None => return Ok(()),
        };

        info!(
            target: TAG,
            "flushing {} bytes of {} to its server",
            bytes.len(),
            path
        );
        self.fs_client
            .update_contents(&desc.organization, &desc.server, &desc.reference, &bytes)
            .map_err(SpanError::FailedToWriteFileInServer)?;

        self.cache.drop_entry(&key);
        self.sync()
    }

    pub fn mkdir(&self, path: &str) -> SpanResult<()> {
        self.mirror.mkdir(path).map_err(SpanError::from)
    }

    pub fn rmdir(&self, path: &str) -> SpanResult<()> {
        self.mirror.rmdir(path).map_err(SpanError::from)
    }

    /// Unlinks a user link: deletes its mapping on the index server, then
    /// takes it out of the mirror.  The cached contents survive, keyed by
    /// the server file, which only a sync can remove.
    pub fn remove(&self, path: &str) -> SpanResult<()> {
        if is_server_path(path) {
            return Err(SpanError::ServerTreeManipulation);
        }
        let view = self.mirror.info(path)?;
        let mapping_id = view.mapping_id().ok_or(SpanError::NotALink)?.to_owned();

        self.is_client
            .delete_mapping(&mapping_id)
            .map_err(SpanError::FailedToUpdateRemoteMapping)?;
        self.mirror.remove(path).map_err(SpanError::from)
    }

    /// Moves a link by updating its mapping remotely, then re-linking it
    /// locally under the new path with the id the server handed back.
    pub fn rename(&self, from: &str, to: &str) -> SpanResult<()> {
        if is_server_path(from) {
            return Err(SpanError::ServerTreeManipulation);
        }
        if is_server_path(to) {
            return Err(SpanError::InvalidLinkDestination(to.to_owned()));
        }

        let view = self.mirror.info(from)?;
        let mapping_id = view.mapping_id().ok_or(SpanError::NotALink)?.to_owned();
        let desc = view
            .file_desc()
            .ok_or(SpanError::InternalRepresentationError)?
            .clone();

        let updated = self
            .is_client
            .update_mapping(&Mapping {
                id: mapping_id.clone(),
                path: to.to_owned(),
                ..Mapping::default()
            })
            .map_err(SpanError::FailedToUpdateRemoteMapping)?;

        self.mirror.remove(from)?;
        let new_id = if updated.id.is_empty() {
            mapping_id
        } else {
            updated.id
        };
        self.mirror
            .link_file(
                &new_id,
                &desc.organization,
                &desc.server,
                &desc.reference,
                desc.size_bytes,
                desc.last_updated,
                to,
            )
            .map_err(SpanError::from)
    }

    /// Links a server file into user territory: creates the mapping on the
    /// index server, then inserts the link locally with the assigned id.
    pub fn link(&self, from: &str, to: &str) -> SpanResult<()> {
        let (org, server, reference) = match parse_server_file_path(from) {
            Some(parts) => parts,
            None => return Err(SpanError::InvalidLinkSource(from.to_owned())),
        };
        if is_server_path(to) {
            // refuse before any index-server traffic
            return Err(SpanError::InvalidLinkDestination(to.to_owned()));
        }

        let view = self.mirror.info(from)?;
        let desc = view.file_desc().ok_or(SpanError::NotAFile)?.clone();

        let created = self
            .is_client
            .create_mapping(&Mapping {
                path: to.to_owned(),
                organization_name: org.to_owned(),
                server_name: server.to_owned(),
                reference: reference.to_owned(),
                ..Mapping::default()
            })
            .map_err(SpanError::FailedToUpdateRemoteMapping)?;

        self.mirror
            .link_file(
                &created.id,
                org,
                server,
                reference,
                desc.size_bytes,
                desc.last_updated,
                to,
            )
            .map_err(SpanError::from)
    }

    /// Re-fetches the mapping catalog, rebuilds the mirror wholesale, and
    /// refreshes every configured server's fetch URL.
    pub fn sync(&self) -> SpanResult<()> {
        let mappings = self
            .is_client
            .get_mappings(true)
            .map_err(SpanError::FailedToFetchMappings)?;
        debug!(target: TAG, "resetting mirror from {} mappings", mappings.len());

        for (idx, e) in self.mirror.reset_all(&mappings) {
            warn!(
                target: TAG,
                "mapping #{} ({}) skipped during reset: {}", idx, mappings[idx].id, e
            );
        }

        let servers = self
            .is_client
            .get_servers()
            .map_err(SpanError::FailedToFetchServerInfos)?;
        for server in servers {
            if !self.catalog.update_fetch_url(
                &server.organization_name,
                &server.name,
                &server.file_fetch_url,
            ) {
                debug!(
                    target: TAG,
                    "no credentials for {}/{}, ignoring its fetch url",
                    server.organization_name,
                    server.name
                );
            }
        }
        Ok(())
    }

    /// Resolves `path` to the remote file behind it.  Links canonicalize to
    /// their target triple, so reads and writes through a link land on the
    /// same cache entry as the server path.
    fn resolve_file(&self, path: &str) -> SpanResult<FileDesc> {
        let view = self.mirror.info(path)?;
        match &view {
            NodeView::Folder { .. } => Err(SpanError::NotAFile),
            NodeView::ServerFile { desc } | NodeView::Link { desc, .. } => Ok(desc.clone()),
        }
    }

    /// Fills the cache for a file if it isn't resident.  A failed `put`
    /// after a successful fetch means another fill beat us to it; surfaced
    /// as an internal cache error for the caller to retry against.
    fn ensure_cached(&self, desc: &FileDesc) -> SpanResult<()> {
        let key = cache_key(desc);
        if self.cache.has(&key) {
            return Ok(());
        }

        let contents = self
            .fs_client
            .contents(&desc.organization, &desc.server, &desc.reference)
            .map_err(SpanError::FailedToReadFileFromServer)?;

        if !self.cache.put(&key, contents) {
            return Err(SpanError::InternalCacheError);
        }
        Ok(())
    }
}
