//! In-memory filesystem for the vsh virtual shell.
//!
//! The tree is rooted at `~` (there is no separate filesystem root) and
//! lives entirely in memory for the duration of a session. Callers resolve
//! user-typed paths with [`resolve`] first; the store itself never expands
//! `~` or relative segments.

mod path;
mod store;

/// Resolve a raw user-typed path against the current working path.
pub use path::resolve;
/// A directory listing entry.
pub use store::DirEntry;
/// Arena-backed filesystem tree.
pub use store::FsStore;
/// Kind of a filesystem node.
pub use store::NodeKind;
/// Stable handle to a node in the arena.
pub use store::NodeId;
