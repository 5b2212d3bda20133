//! Arena-backed filesystem tree.
//!
//! Nodes live in a slab indexed by [`NodeId`]; directories hold child maps
//! of `name -> NodeId`. Removing a subtree returns its slots to a free
//! list, so writes never duplicate the whole tree. Names within one
//! directory are unique by construction of the child map.
//!
//! All paths given to the store must already be canonical (`~`-anchored,
//! see [`crate::resolve`]). Segment lookup is purely literal: `.` and `..`
//! are ordinary (and normally absent) names.

use std::collections::BTreeMap;

use vsh_types::FsError;

/// Stable handle to a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Kind of a filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

/// Default permission string for directories.
const DIR_PERMS: &str = "drwxr-xr-x";
/// Default permission string for files.
const FILE_PERMS: &str = "rw-r--r--";
/// Synthetic size reported for directories.
const DIR_SIZE: u64 = 4096;

#[derive(Debug, Clone)]
enum Node {
    Dir {
        children: BTreeMap<String, NodeId>,
        permissions: String,
    },
    File {
        content: String,
        permissions: String,
    },
}

impl Node {
    fn empty_dir() -> Self {
        Node::Dir {
            children: BTreeMap::new(),
            permissions: DIR_PERMS.to_string(),
        }
    }

    fn file(content: String) -> Self {
        Node::File {
            content,
            permissions: FILE_PERMS.to_string(),
        }
    }
}

/// A directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub id: NodeId,
    pub kind: NodeKind,
    /// File content length, or a synthetic 4096 for directories.
    pub size: u64,
    pub permissions: String,
}

/// Arena-backed filesystem tree rooted at `~`.
#[derive(Debug)]
pub struct FsStore {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
}

impl FsStore {
    /// Create a store containing only the home directory.
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Node::empty_dir())],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// The home directory node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        self.slots[id.0]
            .as_ref()
            .unwrap_or_else(|| unreachable!("dangling NodeId"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.0]
            .as_mut()
            .unwrap_or_else(|| unreachable!("dangling NodeId"))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        if let Node::Dir { children, .. } = self.node(id) {
            let child_ids: Vec<NodeId> = children.values().copied().collect();
            for child in child_ids {
                self.free_subtree(child);
            }
        }
        self.slots[id.0] = None;
        self.free.push(id.0);
    }

    /// Split a canonical path into its literal segments.
    fn segments(path: &str) -> impl Iterator<Item = &str> {
        path.split('/').filter(|s| !s.is_empty() && *s != "~")
    }

    /// Look up a node by canonical path.
    ///
    /// Returns `None` if any segment is missing or an intermediate segment
    /// is a file (the traversal cannot descend through a file).
    pub fn get(&self, path: &str) -> Option<NodeId> {
        let mut id = self.root;
        for seg in Self::segments(path) {
            match self.node(id) {
                Node::Dir { children, .. } => id = *children.get(seg)?,
                Node::File { .. } => return None,
            }
        }
        Some(id)
    }

    /// Whether a node exists at the path.
    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Kind of the node.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.node(id) {
            Node::Dir { .. } => NodeKind::Dir,
            Node::File { .. } => NodeKind::File,
        }
    }

    /// File content, or `None` for directories.
    pub fn content(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::File { content, .. } => Some(content),
            Node::Dir { .. } => None,
        }
    }

    /// Permission string of the node.
    pub fn permissions(&self, id: NodeId) -> &str {
        match self.node(id) {
            Node::Dir { permissions, .. } | Node::File { permissions, .. } => permissions,
        }
    }

    /// Content length for files, synthetic 4096 for directories.
    pub fn size(&self, id: NodeId) -> u64 {
        match self.node(id) {
            Node::File { content, .. } => content.len() as u64,
            Node::Dir { .. } => DIR_SIZE,
        }
    }

    /// Children of a directory node, sorted by name.
    pub fn children(&self, id: NodeId) -> Vec<DirEntry> {
        match self.node(id) {
            Node::Dir { children, .. } => children
                .iter()
                .map(|(name, &child)| DirEntry {
                    name: name.clone(),
                    id: child,
                    kind: self.kind(child),
                    size: self.size(child),
                    permissions: self.permissions(child).to_string(),
                })
                .collect(),
            Node::File { .. } => Vec::new(),
        }
    }

    /// Read a file's content by path.
    pub fn read(&self, path: &str) -> Result<&str, FsError> {
        let id = self.get(path).ok_or(FsError::NotFound)?;
        self.content(id).ok_or(FsError::IsADirectory)
    }

    /// List a directory by path.
    pub fn list(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let id = self.get(path).ok_or(FsError::NotFound)?;
        match self.kind(id) {
            NodeKind::Dir => Ok(self.children(id)),
            NodeKind::File => Err(FsError::NotADirectory),
        }
    }

    /// Walk to the parent directory of `path`, creating any missing
    /// intermediate directories, and return `(parent, leaf name)`.
    ///
    /// Fails with `NotADirectory` if an existing intermediate is a file.
    fn ensure_parent<'p>(&mut self, path: &'p str) -> Result<(NodeId, &'p str), FsError> {
        let segs: Vec<&str> = Self::segments(path).collect();
        let (leaf, dirs) = segs.split_last().ok_or(FsError::IsADirectory)?;
        let mut id = self.root;
        for seg in dirs {
            let existing = match self.node(id) {
                Node::Dir { children, .. } => children.get(*seg).copied(),
                Node::File { .. } => return Err(FsError::NotADirectory),
            };
            id = match existing {
                Some(child) => match self.node(child) {
                    Node::Dir { .. } => child,
                    Node::File { .. } => return Err(FsError::NotADirectory),
                },
                None => {
                    let child = self.alloc(Node::empty_dir());
                    match self.node_mut(id) {
                        Node::Dir { children, .. } => {
                            children.insert((*seg).to_string(), child);
                        }
                        Node::File { .. } => unreachable!("checked above"),
                    }
                    child
                }
            };
        }
        Ok((id, leaf))
    }

    /// Attach a node at `path`, replacing (and freeing) whatever was there.
    fn attach(&mut self, path: &str, node: Node) -> Result<NodeId, FsError> {
        let (parent, leaf) = self.ensure_parent(path)?;
        let id = self.alloc(node);
        let previous = match self.node_mut(parent) {
            Node::Dir { children, .. } => children.insert(leaf.to_string(), id),
            Node::File { .. } => unreachable!("ensure_parent yields a directory"),
        };
        if let Some(old) = previous {
            self.free_subtree(old);
        }
        Ok(id)
    }

    /// Write a file at `path`, overwriting any existing node.
    pub fn set_file(&mut self, path: &str, content: &str) -> Result<NodeId, FsError> {
        self.attach(path, Node::file(content.to_string()))
    }

    /// Place a fresh empty directory at `path`.
    ///
    /// An existing node at the path is replaced wholesale; this mirrors the
    /// `mkdir` overwrite semantics (documented limitation). Home itself is
    /// left untouched.
    pub fn set_dir(&mut self, path: &str) -> Result<NodeId, FsError> {
        if Self::segments(path).next().is_none() {
            return Ok(self.root);
        }
        self.attach(path, Node::empty_dir())
    }

    /// Create an empty file only if nothing exists at `path`.
    pub fn touch(&mut self, path: &str) -> Result<(), FsError> {
        if self.get(path).is_none() {
            self.set_file(path, "")?;
        }
        Ok(())
    }

    /// Remove the node (and, for directories, its whole subtree) at `path`.
    pub fn remove(&mut self, path: &str) -> Result<(), FsError> {
        let segs: Vec<&str> = Self::segments(path).collect();
        let (leaf, dirs) = segs.split_last().ok_or(FsError::NotFound)?;
        let mut id = self.root;
        for seg in dirs {
            match self.node(id) {
                Node::Dir { children, .. } => {
                    id = *children.get(*seg).ok_or(FsError::NotFound)?;
                }
                Node::File { .. } => return Err(FsError::NotFound),
            }
        }
        let removed = match self.node_mut(id) {
            Node::Dir { children, .. } => children.remove(*leaf).ok_or(FsError::NotFound)?,
            Node::File { .. } => return Err(FsError::NotFound),
        };
        self.free_subtree(removed);
        Ok(())
    }

    fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        match self.node(id).clone() {
            Node::File {
                content,
                permissions,
            } => self.alloc(Node::File {
                content,
                permissions,
            }),
            Node::Dir {
                children,
                permissions,
            } => {
                let mut copied = BTreeMap::new();
                for (name, child) in children {
                    copied.insert(name, self.clone_subtree(child));
                }
                self.alloc(Node::Dir {
                    children: copied,
                    permissions,
                })
            }
        }
    }

    /// Deep-copy the node at `src` to `dst`, overwriting any existing node.
    pub fn copy(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        let src_id = self.get(src).ok_or(FsError::NotFound)?;
        let copied = self.clone_subtree(src_id);
        let (parent, leaf) = self.ensure_parent(dst)?;
        let previous = match self.node_mut(parent) {
            Node::Dir { children, .. } => children.insert(leaf.to_string(), copied),
            Node::File { .. } => unreachable!("ensure_parent yields a directory"),
        };
        if let Some(old) = previous {
            self.free_subtree(old);
        }
        Ok(())
    }

    /// Set the permission string on the node at `path`.
    pub fn set_permissions(&mut self, path: &str, perms: &str) -> Result<(), FsError> {
        let id = self.get(path).ok_or(FsError::NotFound)?;
        match self.node_mut(id) {
            Node::Dir { permissions, .. } | Node::File { permissions, .. } => {
                *permissions = perms.to_string();
            }
        }
        Ok(())
    }
}

impl Default for FsStore {
    fn default() -> Self {
        Self::new()
    }
}
