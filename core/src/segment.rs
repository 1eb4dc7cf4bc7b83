//! C6: character-based segmentation tagger.
//!
//! Scores a lattice of per-character tag assignments with the segmentation
//! [`MaxEntModel`] and searches it for the `N` best legal tag sequences via a
//! bigram-state (second-order) Viterbi beam search, so that `prevtag=` and
//! `prev2tag=` features are both exactly reconstructable along every
//! surviving path.

use crate::chartype::{self, CharType};
use crate::encoding::Encoding;
use crate::feature::{seg_features, SegContext};
use crate::feature_dict::FeatureDict;
use crate::maxent::MaxEntModel;
use std::collections::HashMap;

/// The tag alphabet a segmentation model was trained against.
///
/// `BE` is a two-tag boundary scheme (`B` = this character opens a new word,
/// `E` = it continues/closes the current one) and is the default, matching
/// `USE_BE_TAG_SET` in the original source. `ILMR` is the four-tag
/// Isolated/Left/Middle/Right scheme (equivalent in spirit to the more
/// familiar BMES tagging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScheme {
    BE,
    ILMR,
}

impl TagScheme {
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            TagScheme::BE => &["B", "E"],
            TagScheme::ILMR => &["I", "L", "M", "R"],
        }
    }

    fn is_legal_start(self, tag: &str) -> bool {
        match self {
            TagScheme::BE => tag == "B",
            TagScheme::ILMR => tag == "I" || tag == "L",
        }
    }

    fn is_legal_end(self, tag: &str) -> bool {
        match self {
            TagScheme::BE => true,
            TagScheme::ILMR => tag == "I" || tag == "R",
        }
    }

    fn is_legal_transition(self, prev: &str, cur: &str) -> bool {
        match self {
            TagScheme::BE => true,
            TagScheme::ILMR => matches!(
                (prev, cur),
                ("I", "I") | ("I", "L") | ("R", "I") | ("R", "L")
                    | ("L", "M") | ("L", "R") | ("M", "M") | ("M", "R")
            ),
        }
    }

    /// Whether a character tagged `tag` begins a new word.
    pub fn starts_word(self, tag: &str) -> bool {
        match self {
            TagScheme::BE => tag == "B",
            TagScheme::ILMR => tag == "I" || tag == "L",
        }
    }
}

/// One segmentation hypothesis: the reconstructed words, their per-character
/// tag ids (aligned 1:1 with the input codepoints), and the path score.
#[derive(Debug, Clone, PartialEq)]
pub struct SegResult {
    pub words: Vec<String>,
    pub tags: Vec<usize>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
struct BackRef {
    prev2: Option<usize>,
    rank: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    score: f64,
    back: Option<BackRef>,
}

type StateKey = (usize, Option<usize>);

fn label_for_scoring(feature_dict: Option<&FeatureDict>, raw: &str) -> String {
    match feature_dict {
        Some(fd) if fd.is_rare_word(raw) => "RARE".to_string(),
        _ => raw.to_string(),
    }
}

fn classify_all(bytes: &[u8], encoding: Encoding) -> (Vec<String>, Vec<CharType>) {
    let codepoints: Vec<&[u8]> = crate::codepoint::extract_codepoints(bytes, encoding);
    let labels: Vec<String> = codepoints
        .iter()
        .map(|cp| String::from_utf8_lossy(cp).into_owned())
        .collect();
    let mut types = Vec::with_capacity(codepoints.len());
    let mut prev_type = CharType::Init;
    for (i, cp) in codepoints.iter().enumerate() {
        let next = codepoints.get(i + 1).copied();
        let t = chartype::classify(encoding, prev_type, cp, next);
        types.push(t);
        prev_type = t;
    }
    (labels, types)
}

fn push_truncated(beam: &mut Vec<Entry>, entry: Entry, k: usize) {
    beam.push(entry);
    beam.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    beam.truncate(k.max(1));
}

/// Run the segmentation lattice and return up to `n_best` hypotheses, sorted
/// best-first. Ties break by score descending, then by tag-id sequence
/// compared lexicographically ascending (see DESIGN.md).
pub fn seg_sentence(
    model: &MaxEntModel,
    feature_dict: Option<&FeatureDict>,
    scheme: TagScheme,
    encoding: Encoding,
    sentence: &[u8],
    beam_width: usize,
    n_best: usize,
) -> Vec<SegResult> {
    let (labels, types) = classify_all(sentence, encoding);
    let n = labels.len();
    if n == 0 {
        return Vec::new();
    }
    let tags = scheme.tags();
    let tag_count = tags.len();
    let k = beam_width.max(n_best).max(1);

    let mut cells: Vec<HashMap<StateKey, Vec<Entry>>> = Vec::with_capacity(n);

    // position 0: no transition, state key is (tag, None).
    let mut cell0: HashMap<StateKey, Vec<Entry>> = HashMap::new();
    for (t, tag_name) in tags.iter().enumerate() {
        if !scheme.is_legal_start(tag_name) {
            continue;
        }
        let ctx = SegContext {
            prev2word: None,
            prevword: None,
            curword: &label_for_scoring(feature_dict, &labels[0]),
            nextword: labels.get(1).map(|s| s.as_str()),
            next2word: labels.get(2).map(|s| s.as_str()),
            curtype: types[0].as_str(),
            prevtag: None,
            prev2tag: None,
        };
        let feats = seg_features(&ctx);
        let score = model.score(&feats, t as u32) as f64;
        cell0.insert((t, None), vec![Entry { score, back: None }]);
    }
    cells.push(cell0);

    for i in 1..n {
        let mut cell: HashMap<StateKey, Vec<Entry>> = HashMap::new();
        let prev_cell = &cells[i - 1];

        for t in 0..tag_count {
            for p in 0..tag_count {
                if !scheme.is_legal_transition(tags[p], tags[t]) {
                    continue;
                }
                // gather every predecessor state of the form (p, q)
                let q_candidates: Vec<Option<usize>> = if i == 1 {
                    vec![None]
                } else {
                    (0..tag_count).map(Some).collect()
                };
                let mut candidates: Vec<Entry> = Vec::new();
                for q in q_candidates {
                    let key = (p, q);
                    let Some(pred_beam) = prev_cell.get(&key) else {
                        continue;
                    };
                    let ctx = SegContext {
                        prev2word: (i >= 2).then(|| labels[i - 2].as_str()),
                        prevword: Some(labels[i - 1].as_str()),
                        curword: &label_for_scoring(feature_dict, &labels[i]),
                        nextword: labels.get(i + 1).map(|s| s.as_str()),
                        next2word: labels.get(i + 2).map(|s| s.as_str()),
                        curtype: types[i].as_str(),
                        prevtag: Some(tags[p]),
                        prev2tag: q.map(|qi| tags[qi]),
                    };
                    let feats = seg_features(&ctx);
                    let emit = model.score(&feats, t as u32) as f64;
                    for (rank, pred) in pred_beam.iter().enumerate() {
                        candidates.push(Entry {
                            score: pred.score + emit,
                            back: Some(BackRef { prev2: q, rank }),
                        });
                    }
                }
                if candidates.is_empty() {
                    continue;
                }
                let mut beam = Vec::new();
                for c in candidates {
                    push_truncated(&mut beam, c, k);
                }
                cell.insert((t, Some(p)), beam);
            }
        }
        cells.push(cell);
    }

    // Collect every terminal candidate at the last position whose tag is a
    // legal sentence end.
    let last = &cells[n - 1];
    let mut finals: Vec<(f64, Vec<usize>)> = Vec::new();
    for (&(t, p), beam) in last.iter() {
        if !scheme.is_legal_end(tags[t]) {
            continue;
        }
        for (rank, entry) in beam.iter().enumerate() {
            let path = reconstruct(&cells, n, t, p, rank);
            finals.push((entry.score, path));
        }
    }

    finals.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap()
            .then_with(|| a.1.cmp(&b.1))
    });
    finals.truncate(n_best.max(1));

    finals
        .into_iter()
        .map(|(score, tag_path)| {
            let words = words_from_tags(&labels, &types, scheme, &tag_path);
            SegResult {
                words,
                tags: tag_path,
                score,
            }
        })
        .collect()
}

/// Walk backpointers from the terminal state `(tag, prev)` at `rank` to
/// recover the full per-character tag sequence.
fn reconstruct(
    cells: &[HashMap<StateKey, Vec<Entry>>],
    n: usize,
    tag: usize,
    prev: Option<usize>,
    rank: usize,
) -> Vec<usize> {
    let mut out = vec![0usize; n];
    let mut cur_tag = tag;
    let mut cur_prev = prev;
    let mut cur_rank = rank;
    for i in (0..n).rev() {
        out[i] = cur_tag;
        let entry = &cells[i][&(cur_tag, cur_prev)][cur_rank];
        match entry.back {
            Some(back) => {
                let next_tag = cur_prev.expect("non-root state always has a prev tag");
                cur_tag = next_tag;
                cur_prev = back.prev2;
                cur_rank = back.rank;
            }
            None => break,
        }
    }
    out
}

/// Reassemble words from a per-character tag path, per spec §4.5. A
/// [`CharType::Space`] codepoint contributes no text to the word it falls
/// inside (spec invariant: segmentation output contains no space
/// characters); it still participates in tag scoring upstream, but here it
/// is silently dropped rather than starting or ending a word of its own.
fn words_from_tags(
    labels: &[String],
    types: &[CharType],
    scheme: TagScheme,
    tags: &[usize],
) -> Vec<String> {
    let tag_names = scheme.tags();
    let mut words = Vec::new();
    let mut current = String::new();
    for ((label, &t), &ty) in labels.iter().zip(tags.iter()).zip(types.iter()) {
        if scheme.starts_word(tag_names[t]) && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        if ty != CharType::Space {
            current.push_str(label);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
