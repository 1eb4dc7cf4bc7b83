//! C3: prefix trie over dictionary entries.
//!
//! A byte-keyed arena trie. Each node's children are a small sorted `Vec`
//! rather than a `HashMap`/array — dictionary fan-out per node is small in
//! practice and this keeps nodes compact and cache-friendly.
//!
//! Per the REDESIGN FLAGS in the originating design, the "0 means no word"
//! footgun of a raw `payload: int` is split here into `Option<PosSetId>`:
//! presence of a word is `Some`, and the wrapped id is never zero by
//! construction ([`PosSetId`] is a `NonZeroU32`).

use std::num::NonZeroU32;

/// 1-based index into a side table of POS candidate sets (see
/// `crate::pos_table`). Never zero.
pub type PosSetId = NonZeroU32;

#[derive(Debug, Default)]
struct Node {
    /// Sorted by byte; binary-searched on lookup.
    children: Vec<(u8, u32)>,
    payload: Option<PosSetId>,
}

/// The result of a full-word lookup: whether the word ends at this node and
/// whether any child extends past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub payload: Option<PosSetId>,
    pub more_long: bool,
}

impl Match {
    const NONE: Match = Match {
        payload: None,
        more_long: false,
    };
}

/// An incremental pointer into the trie, advanced one byte at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieCursor {
    node: u32,
}

/// Prefix tree over dictionary word byte sequences.
#[derive(Debug, Default)]
pub struct Trie {
    nodes: Vec<Node>,
}

impl Trie {
    pub fn new() -> Self {
        Trie {
            nodes: vec![Node::default()],
        }
    }

    pub fn root(&self) -> TrieCursor {
        TrieCursor { node: 0 }
    }

    pub fn reset(&self, cursor: &mut TrieCursor) {
        cursor.node = 0;
    }

    fn child_of(&self, node: u32, byte: u8) -> Option<u32> {
        let children = &self.nodes[node as usize].children;
        children
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|idx| children[idx].1)
    }

    /// Insert `word` with the given payload. Ambiguity is impossible: a
    /// second insert of the same byte sequence overwrites the payload rather
    /// than creating a duplicate entry.
    pub fn insert(&mut self, word: &[u8], payload: PosSetId) {
        let mut node = 0u32;
        for &b in word {
            node = match self.child_of(node, b) {
                Some(n) => n,
                None => {
                    let new_id = self.nodes.len() as u32;
                    self.nodes.push(Node::default());
                    let children = &mut self.nodes[node as usize].children;
                    let idx = children
                        .binary_search_by_key(&b, |&(bb, _)| bb)
                        .unwrap_err();
                    children.insert(idx, (b, new_id));
                    new_id
                }
            };
        }
        self.nodes[node as usize].payload = Some(payload);
    }

    /// Advance `cursor` by one byte. Returns `false` (leaving `cursor`
    /// untouched) if no child exists for `byte`; this is the `more_long =
    /// false` failure case described in spec §4.6.
    pub fn advance(&self, cursor: &mut TrieCursor, byte: u8) -> bool {
        match self.child_of(cursor.node, byte) {
            Some(n) => {
                cursor.node = n;
                true
            }
            None => false,
        }
    }

    pub fn payload_at(&self, cursor: TrieCursor) -> Option<PosSetId> {
        self.nodes[cursor.node as usize].payload
    }

    pub fn more_long_at(&self, cursor: TrieCursor) -> bool {
        !self.nodes[cursor.node as usize].children.is_empty()
    }

    /// Full-word lookup from the root.
    pub fn search(&self, word: &[u8]) -> Match {
        let mut node = 0u32;
        for &b in word {
            match self.child_of(node, b) {
                Some(n) => node = n,
                None => return Match::NONE,
            }
        }
        Match {
            payload: self.nodes[node as usize].payload,
            more_long: !self.nodes[node as usize].children.is_empty(),
        }
    }

    pub fn contains(&self, word: &[u8]) -> bool {
        self.search(word).payload.is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}
