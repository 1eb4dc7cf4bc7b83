//! Chinese morphological analysis: character-type classification, a
//! dictionary trie, a MaxEnt character-tagging segmenter, dictionary-merge
//! post-processing, and a POS tagger restricted to each word's dictionary
//! candidate set — wrapped in an [`analyzer::Analyzer`] facade selectable
//! across three strategies (statistical segmentation, forward maximum
//! match, forward minimum-cover).
//!
//! Knowledge (dictionaries, models) loads once into a [`knowledge::KnowledgeHandle`]
//! that many per-thread [`analyzer::Analyzer`]s can share; see the
//! `knowledge` and `analyzer` module docs for the concurrency split.

pub mod analyzer;
pub mod chartype;
pub mod codepoint;
pub mod dict;
pub mod encoding;
pub mod error;
pub mod feature;
pub mod feature_dict;
pub mod fmincover;
pub mod knowledge;
pub mod maxent;
pub mod merge;
pub mod pos_table;
pub mod postag;
pub mod segment;
pub mod sentence;
pub mod trie;

pub use analyzer::{AnalyzeOptions, Analyzer, Strategy};
pub use chartype::CharType;
pub use encoding::Encoding;
pub use error::CmaError;
pub use knowledge::{KnowledgeConfig, KnowledgeHandle, KnowledgePaths};
pub use sentence::{Morpheme, MorphemeList, Sentence};
pub use trie::Trie;
