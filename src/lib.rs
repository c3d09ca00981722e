//! # stringtrie
//!
//! Compact serialized tries mapping byte strings or UTF-16 strings to `i32`
//! values.
//!
//! A [`TrieBuilder`] collects (key, value) pairs and writes them into a flat
//! buffer of units (`u8` or `u16`). The buffer contains no pointers, so it can
//! be persisted as-is and read back later. A [`Trie`] is a small cursor over
//! such a buffer: it matches input one unit at a time, which makes it
//! suitable for longest-match scanning as well as plain lookups.
//!
//! ## Example
//!
//! ```rust
//! use stringtrie::{BuildMode, BytesTrieBuilder, TrieResult};
//!
//! let mut builder = BytesTrieBuilder::new();
//! builder.add(b"ab", 1)?;
//! builder.add(b"abc", 2)?;
//! builder.add_str("b\u{e4}", 3)?;
//!
//! let mut trie = builder.build(BuildMode::Small)?;
//! assert_eq!(trie.next_units(b"ab"), TrieResult::IntermediateValue);
//! assert_eq!(trie.value(), Some(1));
//! assert_eq!(trie.next(b'c'), TrieResult::FinalValue);
//! assert_eq!(trie.value(), Some(2));
//! assert_eq!(trie.get("b\u{e4}".as_bytes()), Some(3));
//!
//! let keys: Vec<_> = trie.reset().iter().map(|e| e.key_str().into_owned()).collect();
//! assert_eq!(keys, ["ab", "abc", "b\u{e4}"]);
//! # Ok::<(), stringtrie::TrieError>(())
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod iter;
pub mod map;
pub mod trie;
pub mod unit;

pub use builder::{BuildMode, TrieBuilder};
pub use error::{Result, TrieError};
pub use iter::{Entry, TrieIter};
pub use map::{Matcher, TrieMap, TrieMapBuilder};
pub use trie::{Trie, TrieResult, TrieState};
pub use unit::Unit;

/// A cursor over a serialized byte trie.
pub type BytesTrie<'a> = Trie<'a, u8>;

/// A cursor over a serialized UTF-16 trie.
pub type CharsTrie<'a> = Trie<'a, u16>;

/// Builder for serialized byte tries.
pub type BytesTrieBuilder = TrieBuilder<u8>;

/// Builder for serialized UTF-16 tries.
pub type CharsTrieBuilder = TrieBuilder<u16>;

#[cfg(test)]
mod test_data;

#[cfg(test)]
mod proptests;
