//! C9: the analyzer facade — spec §4.8 / §6.4.
//!
//! [`Analyzer`] is the per-thread entry point: it borrows a
//! [`crate::knowledge::KnowledgeHandle`] and owns its own scratch state, so
//! many analyzers (one per thread) can share one knowledge handle (spec §5).

use crate::encoding::Encoding;
use crate::fmincover;
use crate::knowledge::KnowledgeHandle;
use crate::merge::combine_with_trie;
use crate::postag::PosTagger;
use crate::segment::seg_sentence;
use crate::sentence::{morpheme_lists_equal, Morpheme, MorphemeList, Sentence};
use crate::trie::Trie;
use std::collections::HashSet;

/// Segmentation strategy selectable via [`Analyzer::set_option`].
///
/// `ModelMM` is the full statistical pipeline (tagger + dictionary merge +
/// POS tagger). `FMM` and `FMinCover` are dictionary-only strategies; the
/// original source's `analysis_dictb` strategy is deliberately not
/// implemented — its reference loop never populated its result before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ModelMM,
    FMM,
    FMinCover,
}

/// Per-call knobs an analyzer run can override from the knowledge handle's
/// configured defaults.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub strategy: Strategy,
    pub n_best: Option<usize>,
    pub pos_tagging: Option<bool>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        AnalyzeOptions {
            strategy: Strategy::ModelMM,
            n_best: None,
            pos_tagging: None,
        }
    }
}

/// Per-thread analysis handle. Deliberately `!Sync` (it owns mutable scratch
/// state for the current sentence) so that concurrent use requires one
/// instance per thread; [`KnowledgeHandle`] is `Send + Sync` and meant to be
/// shared across them.
pub struct Analyzer {
    knowledge: KnowledgeHandle,
    options: AnalyzeOptions,
    scratch: Sentence,
}

impl Analyzer {
    pub fn new(knowledge: KnowledgeHandle) -> Self {
        Analyzer {
            knowledge,
            options: AnalyzeOptions::default(),
            scratch: Sentence::new(""),
        }
    }

    pub fn set_knowledge(&mut self, knowledge: KnowledgeHandle) {
        self.knowledge = knowledge;
    }

    pub fn set_option(&mut self, options: AnalyzeOptions) {
        self.options = options;
    }

    /// Split a paragraph into sentences (spec §6.4's `split_sentence`): cut
    /// after every sentence-ending codepoint and at runs of whitespace.
    pub fn split_sentence(&self, paragraph: &str) -> Vec<String> {
        let encoding = self.knowledge.config().encoding;
        let codepoints = crate::codepoint::extract_codepoints(paragraph.as_bytes(), encoding);
        let mut sentences = Vec::new();
        let mut current = Vec::new();
        let mut prev_type = crate::chartype::CharType::Init;

        for (i, cp) in codepoints.iter().enumerate() {
            let next = codepoints.get(i + 1).copied();
            let ty = crate::chartype::classify(encoding, prev_type, cp, next);
            prev_type = ty;

            if ty == crate::chartype::CharType::Space {
                if !current.is_empty() {
                    sentences.push(current.concat());
                    current = Vec::new();
                }
                continue;
            }
            current.push(*cp);
            if ty == crate::chartype::CharType::SentenceEnd {
                sentences.push(current.concat());
                current = Vec::new();
            }
        }
        if !current.is_empty() {
            sentences.push(current.concat());
        }

        sentences
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .collect()
    }

    /// Analyze a single sentence, producing up to `n_best` ranked candidates
    /// in `self.scratch`, and return a reference to it.
    pub fn analyze_sentence(&mut self, sentence: &str) -> &Sentence {
        self.scratch.set_string(sentence);
        let n_best = self.knowledge.config().effective_n_best(self.options.n_best);
        let pos_tagging = self
            .options
            .pos_tagging
            .unwrap_or(self.knowledge.config().pos_tagging_default);

        let candidates: Vec<(MorphemeList, f64)> = match self.options.strategy {
            Strategy::ModelMM => self.analyze_model_mm(sentence, n_best, pos_tagging),
            Strategy::FMM => {
                let words = fmm_segment(self.knowledge.trie(), self.knowledge.config().encoding, sentence.as_bytes());
                let list = self.to_morpheme_list(&words, pos_tagging);
                vec![(list, 1.0)]
            }
            Strategy::FMinCover => {
                let words = fmincover::segment(
                    self.knowledge.trie(),
                    self.knowledge.config().encoding,
                    sentence.as_bytes(),
                );
                let list = self.to_morpheme_list(&words, pos_tagging);
                vec![(list, 1.0)]
            }
        };

        // An all-space (or empty) sentence produces candidates whose merged
        // word list is empty; spec §8 requires these to surface as zero
        // candidates rather than one candidate with an empty morpheme list.
        let candidates: Vec<(MorphemeList, f64)> =
            candidates.into_iter().filter(|(list, _)| !list.is_empty()).collect();

        let total: f64 = candidates.iter().map(|(_, s)| s).sum();
        for (list, score) in candidates {
            let normalized = if total > 0.0 { score / total } else { 0.0 };
            self.scratch.add_list(list, normalized);
        }
        &self.scratch
    }

    fn analyze_model_mm(
        &self,
        sentence: &str,
        n_best: usize,
        pos_tagging: bool,
    ) -> Vec<(MorphemeList, f64)> {
        let knowledge = &self.knowledge;
        let results = seg_sentence(
            knowledge.seg_model(),
            knowledge.seg_feature_dict(),
            knowledge.tag_scheme(),
            knowledge.config().encoding,
            sentence.as_bytes(),
            knowledge.config().beam_width,
            n_best,
        );

        let mut seen: Vec<MorphemeList> = Vec::new();
        let mut out = Vec::new();
        for (idx, result) in results.into_iter().enumerate() {
            // spec §4.8: only the top-1 (best-scoring) segmentation is
            // reconciled against the dictionary; the rest of the N-best list
            // is reported exactly as the tagger produced it.
            let words = if idx == 0 {
                combine_with_trie(knowledge.trie(), &result.words)
            } else {
                result.words
            };
            let list = self.to_morpheme_list(&words, pos_tagging);
            if seen.iter().any(|prev| morpheme_lists_equal(prev, &list, pos_tagging)) {
                continue;
            }
            seen.push(list.clone());
            // exp() turns the tagger's additive log-linear score into a
            // positive weight so N-best candidates can be renormalized into
            // a probability-like distribution.
            out.push((list, result.score.exp()));
        }
        out
    }

    fn to_morpheme_list(&self, words: &[String], pos_tagging: bool) -> MorphemeList {
        if !pos_tagging {
            return words.iter().map(Morpheme::new).collect();
        }
        let knowledge = &self.knowledge;
        let candidate_sets: Vec<Option<&HashSet<String>>> = words
            .iter()
            .map(|w| {
                knowledge
                    .trie()
                    .search(w.as_bytes())
                    .payload
                    .map(|id| knowledge.pos_candidates().get(id))
            })
            .collect();
        let tagger = PosTagger::new(
            knowledge.pos_model(),
            knowledge.pos_table(),
            &knowledge.config().default_pos,
        );
        tagger.tag_sentence(words, &candidate_sets)
    }

    /// Analyze free-form text, splitting it into sentences first and
    /// returning the one-best morpheme list per sentence.
    pub fn analyze_string(&mut self, text: &str) -> Vec<MorphemeList> {
        let sentences = self.split_sentence(text);
        let mut out = Vec::with_capacity(sentences.len());
        for s in sentences {
            let sentence = self.analyze_sentence(&s);
            if let Some(idx) = sentence.one_best_index() {
                out.push(sentence.morpheme_list(idx).clone());
            } else {
                out.push(Vec::new());
            }
        }
        out
    }

    /// Analyze a full input stream (e.g. a file's contents), sentence by
    /// sentence, in document order.
    pub fn analyze_stream(&mut self, text: &str) -> Vec<MorphemeList> {
        self.analyze_string(text)
    }
}

/// Forward maximum match: repeatedly take the longest trie-known prefix,
/// falling back to one character when nothing matches. Space codepoints are
/// dropped up front (spec invariant: segmentation output contains no space
/// characters).
fn fmm_segment(trie: &Trie, encoding: Encoding, sentence: &[u8]) -> Vec<String> {
    let codepoints: Vec<&[u8]> = crate::codepoint::extract_codepoints(sentence, encoding)
        .into_iter()
        .filter(|cp| !crate::chartype::is_space(encoding, cp))
        .collect();
    let n = codepoints.len();
    let mut words = Vec::new();
    let mut i = 0;
    while i < n {
        let mut cursor = trie.root();
        let mut best_end = i + 1;
        let mut j = i;
        while j < n {
            let mut advanced = true;
            for &b in codepoints[j] {
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
                best_end = j;
            }
            if !trie.more_long_at(cursor) {
                break;
            }
        }
        words.push(codepoints[i..best_end].concat());
        i = best_end;
    }
    words
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .collect()
}
