//! Error types for building tries and restoring traversal state.

use thiserror::Error;

/// Errors reported by [`TrieBuilder`](crate::TrieBuilder),
/// [`TrieMapBuilder`](crate::TrieMapBuilder) and
/// [`Trie::reset_to_state`](crate::Trie::reset_to_state).
///
/// All of these are contract violations by the caller. Traversal itself never
/// fails; a mismatch is reported as [`TrieResult::NoMatch`](crate::TrieResult).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    #[error("duplicate key")]
    DuplicateKey,

    #[error("cannot add (key, value) pairs after build(); call clear() first")]
    AlreadyBuilt,

    #[error("no (key, value) pairs were added")]
    Empty,

    #[error("key of {len} units exceeds the maximum length of 0xffff")]
    KeyTooLong { len: usize },

    #[error("trie state was not saved from this trie")]
    IncompatibleState,
}

pub type Result<T> = std::result::Result<T, TrieError>;
