//! C7: dictionary-merge pass.
//!
//! Re-walks an already tokenized word sequence against the trie and prefers
//! any trie match that spans more than one adjacent token over the
//! tokenizer's own boundary there — e.g. a tagger that splits a known
//! multi-character term into single characters gets corrected back to the
//! dictionary's word. A run of tokens the trie doesn't recognize at all
//! (beyond length 1) passes through unchanged.
//!
//! Per spec §4.6 (and the original `combineRetWithTrie`/`toCombine`), a
//! match only ever *starts* at a token boundary of `words` — never mid-token
//! — so a token whose own first byte fails at the root is emitted whole,
//! rather than being split apart and re-matched byte-by-byte.

use crate::chartype;
use crate::encoding::Encoding;
use crate::trie::Trie;

/// Merge `words` (already split into tokens, e.g. by [`crate::segment`] or
/// a tagger) against `trie`, replacing runs that the trie covers with a
/// longer single entry. Each element of `words` is treated as an atomic
/// token: a match attempt begins only at `words[i]`'s first byte, never
/// partway through a token.
pub fn combine_with_trie(trie: &Trie, words: &[String]) -> Vec<String> {
    let n = words.len();
    if n == 0 {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut i = 0usize;
    while i < n {
        let mut cursor = trie.root();
        let mut last_match_end: Option<usize> = None;
        let mut j = i;
        while j < n {
            let mut advanced = true;
            for &b in words[j].as_bytes() {
                if !trie.advance(&mut cursor, b) {
                    advanced = false;
                    break;
                }
            }
            if !advanced {
                break;
            }
            j += 1;
            if trie.payload_at(cursor).is_some() {
                last_match_end = Some(j);
            }
            if !trie.more_long_at(cursor) {
                break;
            }
        }

        match last_match_end {
            Some(end) if end > i + 1 => {
                out.push(words[i..end].concat());
                i = end;
            }
            _ => {
                // spec §4.6: "emit src[i] verbatim (unless it is a space)".
                if !chartype::is_space(Encoding::Utf8, words[i].as_bytes()) {
                    out.push(words[i].clone());
                }
                i += 1;
            }
        }
    }
    out
}
