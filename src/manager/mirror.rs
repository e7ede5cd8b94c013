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

//! # Mirror tree
//!
//! The in-memory namespace the kernel bridge resolves paths against.  The
//! tree has two disjoint regions: everything under `servers/` mirrors remote
//! file inventory (folders and server files only, rebuilt wholesale on
//! sync), and everything else is user territory (folders and links only).
//! Links carry a copy of the server-file descriptor rather than a pointer to
//! the server-file node, which is what makes the wholesale rebuild cheap.

use crate::api::models::Mapping;
use crate::common::constants::SERVERS_DIR;
use crate::common::{canonical, is_server_path, split_first};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::error::Error;

pub const IF_FILE: u8 = 1 << 0;
pub const IF_DIR: u8 = 1 << 1;
pub const RECURSIVE: u8 = 1 << 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorError {
    NotFound,
    AlreadyExists,
    NotAFolder,
    NotALink,
    ServerTreeManipulation,
    CannotLinkInServerFolder,
}

impl std::fmt::Display for MirrorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            MirrorError::NotFound => write!(f, "no such entry"),
            MirrorError::AlreadyExists => write!(f, "entry already exists"),
            MirrorError::NotAFolder => write!(f, "not a folder"),
            MirrorError::NotALink => write!(f, "not a link"),
            MirrorError::ServerTreeManipulation => write!(f, "servers tree is not user-mutable"),
            MirrorError::CannotLinkInServerFolder => {
                write!(f, "links cannot live in the servers tree")
            }
        }
    }
}

impl Error for MirrorError {}

/// Descriptor of one remote file.  Embedded by value in both server-file
/// nodes and links.
#[derive(Clone, Debug, PartialEq)]
pub struct FileDesc {
    pub organization: String,
    pub server: String,
    pub reference: String,
    pub size_bytes: u64,
    pub last_updated: i64,
}

enum Node {
    Folder(HashMap<String, Node>),
    ServerFile(FileDesc),
    Link { mapping_id: String, desc: FileDesc },
}

#[derive(PartialEq, Eq)]
enum DropOutcome {
    Dropped,
    Missing,
    Refused,
}

impl Node {
    fn folder() -> Node {
        Node::Folder(HashMap::new())
    }

    fn get(&self, path: &str) -> Option<&Node> {
        if path.is_empty() {
            return Some(self);
        }
        match self {
            Node::Folder(children) => {
                let (head, tail) = split_first(path);
                children.get(head)?.get(tail)
            }
            _ => None,
        }
    }

    fn get_mut(&mut self, path: &str) -> Option<&mut Node> {
        if path.is_empty() {
            return Some(self);
        }
        match self {
            Node::Folder(children) => {
                let (head, tail) = split_first(path);
                children.get_mut(head)?.get_mut(tail)
            }
            _ => None,
        }
    }

    /// Inserts `node` at `path`, auto-creating intermediate folders.  Fails
    /// on a name collision at the final segment or when traversal runs into
    /// a leaf.
    fn insert(&mut self, path: &str, node: Node) -> Result<(), MirrorError> {
        let children = match self {
            Node::Folder(children) => children,
            _ => return Err(MirrorError::NotAFolder),
        };
        let (head, tail) = split_first(path);
        if head.is_empty() {
            return Err(MirrorError::NotAFolder);
        }
        if tail.is_empty() {
            if children.contains_key(head) {
                return Err(MirrorError::AlreadyExists);
            }
            children.insert(head.to_owned(), node);
            return Ok(());
        }
        children
            .entry(head.to_owned())
            .or_insert_with(Node::folder)
            .insert(tail, node)
    }

    fn drop_path(&mut self, path: &str, flags: u8) -> DropOutcome {
        let children = match self {
            Node::Folder(children) => children,
            _ => return DropOutcome::Missing,
        };
        let (head, tail) = split_first(path);
        if tail.is_empty() {
            let accepts = match children.get(head) {
                None => return DropOutcome::Missing,
                Some(child) => child.accepts_drop(flags),
            };
            if accepts {
                children.remove(head);
                return DropOutcome::Dropped;
            }
            return DropOutcome::Refused;
        }
        match children.get_mut(head) {
            None => DropOutcome::Missing,
            Some(child) => child.drop_path(tail, flags),
        }
    }

    /// A leaf accepts deletion only if it's a link and `IF_FILE` is set, so
    /// server files can never be removed from userspace.
    fn accepts_drop(&self, flags: u8) -> bool {
        if flags & RECURSIVE != 0 {
            return true;
        }
        match self {
            Node::Folder(_) => flags & IF_DIR != 0,
            Node::Link { .. } => flags & IF_FILE != 0,
            Node::ServerFile(_) => false,
        }
    }
}

/// Owned snapshot of a single node, safe to hand across the tree lock.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeView {
    Folder {
        name: String,
    },
    ServerFile {
        desc: FileDesc,
    },
    Link {
        name: String,
        mapping_id: String,
        desc: FileDesc,
    },
}

impl NodeView {
    fn from_node(name: &str, node: &Node) -> NodeView {
        match node {
            Node::Folder(_) => NodeView::Folder {
                name: name.to_owned(),
            },
            Node::ServerFile(desc) => NodeView::ServerFile { desc: desc.clone() },
            Node::Link { mapping_id, desc } => NodeView::Link {
                name: name.to_owned(),
                mapping_id: mapping_id.clone(),
                desc: desc.clone(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeView::Folder { name } | NodeView::Link { name, .. } => name,
            NodeView::ServerFile { desc } => &desc.reference,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        match self {
            NodeView::Folder { .. } => 0,
            NodeView::ServerFile { desc } | NodeView::Link { desc, .. } => desc.size_bytes,
        }
    }

    pub fn last_updated_seconds(&self) -> i64 {
        match self {
            NodeView::Folder { .. } => 0,
            NodeView::ServerFile { desc } | NodeView::Link { desc, .. } => desc.last_updated,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, NodeView::Folder { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self, NodeView::Link { .. })
    }

    /// The remote file descriptor, for both leaf flavors.
    pub fn file_desc(&self) -> Option<&FileDesc> {
        match self {
            NodeView::Folder { .. } => None,
            NodeView::ServerFile { desc } | NodeView::Link { desc, .. } => Some(desc),
        }
    }

    pub fn mapping_id(&self) -> Option<&str> {
        match self {
            NodeView::Link { mapping_id, .. } => Some(mapping_id),
            _ => None,
        }
    }
}

fn split_last(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

fn server_file_path(org: &str, server: &str, reference: &str) -> String {
    format!("{}/{}/{}/{}", SERVERS_DIR, org, server, reference)
}

fn add_file_into(root: &mut Node, desc: FileDesc) -> Result<(), MirrorError> {
    let path = server_file_path(&desc.organization, &desc.server, &desc.reference);
    root.insert(&path, Node::ServerFile(desc))
}

fn link_into(
    root: &mut Node,
    mapping_id: &str,
    desc: FileDesc,
    path: &str,
) -> Result<(), MirrorError> {
    let canon = canonical(path);
    if canon.is_empty() {
        return Err(MirrorError::NotAFolder);
    }
    if is_server_path(canon) {
        return Err(MirrorError::CannotLinkInServerFolder);
    }
    root.insert(
        canon,
        Node::Link {
            mapping_id: mapping_id.to_owned(),
            desc,
        },
    )
}

/// The tree itself, behind a single readers-writer lock.  Lookups take
/// shared access, every mutation takes exclusive access.
pub struct Mirror {
    root: RwLock<Node>,
}

impl Mirror {
    pub fn new() -> Self {
        Mirror {
            root: RwLock::new(Node::folder()),
        }
    }

    pub fn mkdir(&self, path: &str) -> Result<(), MirrorError> {
        let canon = canonical(path);
        if canon.is_empty() {
            return Err(MirrorError::AlreadyExists);
        }
        if is_server_path(canon) {
            return Err(MirrorError::ServerTreeManipulation);
        }
        let (parent, name) = split_last(canon);
        let mut root = self.root.write();
        // unlike add_file/link_file, mkdir doesn't auto-create parents
        let parent_node = root.get_mut(parent).ok_or(MirrorError::NotFound)?;
        match parent_node {
            Node::Folder(children) => {
                if children.contains_key(name) {
                    return Err(MirrorError::AlreadyExists);
                }
                children.insert(name.to_owned(), Node::folder());
                Ok(())
            }
            _ => Err(MirrorError::NotAFolder),
        }
    }

    pub fn rmdir(&self, path: &str) -> Result<(), MirrorError> {
        let canon = canonical(path);
        if canon.is_empty() {
            return Err(MirrorError::NotFound);
        }
        if is_server_path(canon) {
            return Err(MirrorError::ServerTreeManipulation);
        }
        match self.root.write().drop_path(canon, IF_DIR) {
            DropOutcome::Dropped => Ok(()),
            DropOutcome::Missing => Err(MirrorError::NotFound),
            DropOutcome::Refused => Err(MirrorError::NotAFolder),
        }
    }

    /// Records a remote file at `servers/<org>/<server>/<ref>`, creating
    /// intermediate folders as needed.
    pub fn add_file(
        &self,
        org: &str,
        server: &str,
        reference: &str,
        size_bytes: u64,
        last_updated: i64,
    ) -> Result<(), MirrorError> {
        let desc = FileDesc {
            organization: org.to_owned(),
            server: server.to_owned(),
            reference: reference.to_owned(),
            size_bytes,
            last_updated,
        };
        add_file_into(&mut self.root.write(), desc)
    }

    /// Inserts a link at `path` pointing at the given remote file.
    #[allow(clippy::too_many_arguments)]
    pub fn link_file(
        &self,
        mapping_id: &str,
        org: &str,
        server: &str,
        reference: &str,
        size_bytes: u64,
        last_updated: i64,
        path: &str,
    ) -> Result<(), MirrorError> {
        let desc = FileDesc {
            organization: org.to_owned(),
            server: server.to_owned(),
            reference: reference.to_owned(),
            size_bytes,
            last_updated,
        };
        link_into(&mut self.root.write(), mapping_id, desc, path)
    }

    /// Removes a link.  Only links come off through this operation; server
    /// files are owned by sync.
    pub fn remove(&self, path: &str) -> Result<(), MirrorError> {
        let canon = canonical(path);
        if canon.is_empty() {
            return Err(MirrorError::NotFound);
        }
        if is_server_path(canon) {
            return Err(MirrorError::ServerTreeManipulation);
        }
        match self.root.write().drop_path(canon, IF_FILE) {
            DropOutcome::Dropped => Ok(()),
            DropOutcome::Missing => Err(MirrorError::NotFound),
            DropOutcome::Refused => Err(MirrorError::NotALink),
        }
    }

    /// Children of a folder, insertion order not preserved.  Listing a leaf
    /// yields the leaf itself, the way `ls` on a file does.
    pub fn ls(&self, path: &str) -> Result<Vec<NodeView>, MirrorError> {
        let canon = canonical(path);
        let root = self.root.read();
        let node = root.get(canon).ok_or(MirrorError::NotFound)?;
        match node {
            Node::Folder(children) => Ok(children
                .iter()
                .map(|(name, child)| NodeView::from_node(name, child))
                .collect()),
            leaf => Ok(vec![NodeView::from_node(split_last(canon).1, leaf)]),
        }
    }

    pub fn info(&self, path: &str) -> Result<NodeView, MirrorError> {
        let canon = canonical(path);
        let root = self.root.read();
        let node = root.get(canon).ok_or(MirrorError::NotFound)?;
        Ok(NodeView::from_node(split_last(canon).1, node))
    }

    /// Atomic wholesale replacement from a fresh mapping list.  The new tree
    /// is assembled off to the side and swapped in under the write lock.
    /// Per-mapping failures are collected, not fatal; a server file already
    /// present just means two mappings share a remote file.
    pub fn reset_all(&self, mappings: &[Mapping]) -> Vec<(usize, MirrorError)> {
        let mut fresh = Node::folder();
        let mut errors = Vec::new();

        for (idx, mapping) in mappings.iter().enumerate() {
            let desc = FileDesc {
                organization: mapping.organization_name.clone(),
                server: mapping.server_name.clone(),
                reference: mapping.reference.clone(),
                size_bytes: mapping.size_bytes,
                last_updated: mapping.updated,
            };

            match add_file_into(&mut fresh, desc.clone()) {
                Ok(()) | Err(MirrorError::AlreadyExists) => {}
                Err(e) => {
                    errors.push((idx, e));
                    continue;
                }
            }

            if !mapping.path.is_empty() {
                if let Err(e) = link_into(&mut fresh, &mapping.id, desc, &mapping.path) {
                    errors.push((idx, e));
                }
            }
        }

        *self.root.write() = fresh;
        errors
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Mirror::new()
    }
}
