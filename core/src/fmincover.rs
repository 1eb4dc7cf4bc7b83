//! Forward minimum-cover segmentation: a dictionary-only strategy that picks
//! the segmentation with the fewest words (rather than maximum-match's
//! greedy longest-word-first rule), via a forward shortest-path scan over the
//! trie's matches. Every position always has a single-character fallback, so
//! the scan never gets stuck on an out-of-dictionary run.

use crate::codepoint::extract_codepoints;
use crate::encoding::Encoding;
use crate::trie::Trie;

pub fn segment(trie: &Trie, encoding: Encoding, sentence: &[u8]) -> Vec<String> {
    // Space codepoints are dropped up front, matching the forward-maximum-match
    // strategy (spec invariant: segmentation output contains no space characters).
    let codepoints: Vec<&[u8]> = extract_codepoints(sentence, encoding)
        .into_iter()
        .filter(|cp| !crate::chartype::is_space(encoding, cp))
        .collect();
    let labels: Vec<String> = codepoints
        .iter()
        .map(|cp| String::from_utf8_lossy(cp).into_owned())
        .collect();
    let n = labels.len();
    if n == 0 {
        return Vec::new();
    }

    const INF: u32 = u32::MAX;
    let mut cost = vec![INF; n + 1];
    let mut back = vec![0usize; n + 1];
    cost[0] = 0;

    for i in 0..n {
        if cost[i] == INF {
            continue;
        }
        let mut cursor = trie.root();
        let mut j = i;
        while j < n {
            let mut advanced = true;
            for &b in labels[j].as_bytes() {
                if !trie.advance(&mut cursor, b) {
                    advanced = false;
                    break;
                }
            }
            if !advanced {
                break;
            }
            j += 1;
            if trie.payload_at(cursor).is_some() && cost[i] + 1 < cost[j] {
                cost[j] = cost[i] + 1;
                back[j] = i;
            }
            if !trie.more_long_at(cursor) {
                break;
            }
        }
        let single = i + 1;
        if cost[i] + 1 < cost[single] {
            cost[single] = cost[i] + 1;
            back[single] = i;
        }
    }

    let mut words = Vec::new();
    let mut i = n;
    while i > 0 {
        let j = back[i];
        words.push(labels[j..i].concat());
        i = j;
    }
    words.reverse();
    words
}
