//! `KnowledgeHandle`: the immutable, `Arc`-shareable bundle of loaded
//! dictionaries and models an [`crate::analyzer::Analyzer`] borrows from.
//!
//! Splitting knowledge out from the per-thread analyzer is the design named
//! in spec §5: many analyzers on many threads can share one handle cheaply,
//! while each analyzer keeps its own scratch state.

use crate::dict::{self, PosCandidates};
use crate::encoding::Encoding;
use crate::error::CmaError;
use crate::feature_dict::FeatureDict;
use crate::maxent::MaxEntModel;
use crate::pos_table::PosTable;
use crate::segment::TagScheme;
use crate::trie::Trie;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runtime-tunable knobs, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub word_delimiter: String,
    pub tag_delimiter: String,
    pub quote_delimiter: String,
    /// Lattice beam width for the segmentation tagger.
    pub beam_width: usize,
    /// Default `N` for N-best analysis when the caller doesn't override it.
    pub n_best: usize,
    pub pos_tagging_default: bool,
    pub encoding: Encoding,
    /// POS assigned to a word the model and dictionary both have nothing to
    /// say about.
    pub default_pos: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        KnowledgeConfig {
            word_delimiter: "/".to_string(),
            tag_delimiter: " ".to_string(),
            quote_delimiter: "\"\"".to_string(),
            beam_width: 8,
            // NBest < 1 is silently treated as 1 (spec §7 policy).
            n_best: 1,
            pos_tagging_default: true,
            encoding: Encoding::Utf8,
            default_pos: "x".to_string(),
        }
    }
}

impl KnowledgeConfig {
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, CmaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CmaError::io(path, e))?;
        toml::from_str(&text).map_err(|e| CmaError::ConfigError(e.to_string()))
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), CmaError> {
        let path = path.as_ref();
        let text = toml::to_string_pretty(self).map_err(|e| CmaError::ConfigError(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| CmaError::io(path, e))
    }

    pub fn effective_n_best(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.n_best).max(1)
    }
}

/// Every file path a full knowledge bundle is loaded from. System/user
/// dictionaries accept shard suffixes (`P`, `P.1`, `P.2`, …) per spec §6.3.
#[derive(Debug, Clone)]
pub struct KnowledgePaths {
    pub pos_names: PathBuf,
    pub system_dict: PathBuf,
    pub user_dict: Option<PathBuf>,
    pub black_words: Option<PathBuf>,
    pub stop_words: Option<PathBuf>,
    pub seg_model: PathBuf,
    pub pos_model: PathBuf,
    pub seg_feature_dict: Option<PathBuf>,
    pub tag_scheme: TagScheme,
}

struct KnowledgeInner {
    trie: Trie,
    pos_table: PosTable,
    pos_candidates: PosCandidates,
    seg_model: MaxEntModel,
    pos_model: MaxEntModel,
    seg_feature_dict: Option<FeatureDict>,
    black_words: HashSet<String>,
    stop_words: HashSet<String>,
    tag_scheme: TagScheme,
    config: KnowledgeConfig,
}

/// Immutable, cheaply clonable (`Arc`-backed) handle to a fully loaded
/// knowledge bundle. `Send + Sync`: many [`crate::analyzer::Analyzer`]s on
/// many threads can share one.
#[derive(Clone)]
pub struct KnowledgeHandle(Arc<KnowledgeInner>);

impl KnowledgeHandle {
    pub fn load(paths: &KnowledgePaths, config: KnowledgeConfig) -> Result<Self, CmaError> {
        let mut pos_table = PosTable::new();
        for name in dict::load_pos_names(&paths.pos_names)? {
            pos_table.add_pos(&name);
        }

        let black_words = match &paths.black_words {
            Some(p) => dict::load_black_words(p)?,
            None => HashSet::new(),
        };

        let mut trie = Trie::new();
        let mut pos_candidates = PosCandidates::new();
        dict::load_system_dict(&paths.system_dict, &mut trie, &mut pos_candidates, &black_words)?;
        if let Some(user_dict) = &paths.user_dict {
            dict::load_user_dict(user_dict, &mut trie, &mut pos_candidates, &black_words);
        }

        let stop_words = match &paths.stop_words {
            Some(p) => dict::load_black_words(p)?,
            None => HashSet::new(),
        };

        let seg_model = MaxEntModel::load(&paths.seg_model)?;
        let pos_model = MaxEntModel::load(&paths.pos_model)?;
        let seg_feature_dict = match &paths.seg_feature_dict {
            Some(p) => Some(FeatureDict::load(p)?),
            None => None,
        };

        tracing::debug!(
            trie_nodes = trie.len(),
            pos_count = pos_table.size(),
            "knowledge bundle loaded"
        );

        Ok(KnowledgeHandle(Arc::new(KnowledgeInner {
            trie,
            pos_table,
            pos_candidates,
            seg_model,
            pos_model,
            seg_feature_dict,
            black_words,
            stop_words,
            tag_scheme: paths.tag_scheme,
            config,
        })))
    }

    pub fn trie(&self) -> &Trie {
        &self.0.trie
    }

    pub fn pos_table(&self) -> &PosTable {
        &self.0.pos_table
    }

    pub fn pos_candidates(&self) -> &PosCandidates {
        &self.0.pos_candidates
    }

    pub fn seg_model(&self) -> &MaxEntModel {
        &self.0.seg_model
    }

    pub fn pos_model(&self) -> &MaxEntModel {
        &self.0.pos_model
    }

    pub fn seg_feature_dict(&self) -> Option<&FeatureDict> {
        self.0.seg_feature_dict.as_ref()
    }

    pub fn black_words(&self) -> &HashSet<String> {
        &self.0.black_words
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.0.stop_words
    }

    pub fn tag_scheme(&self) -> TagScheme {
        self.0.tag_scheme
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.0.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = KnowledgeConfig::default();
        let path = std::env::temp_dir().join("cma_knowledge_config_test.toml");
        cfg.save_toml(&path).unwrap();
        let loaded = KnowledgeConfig::load_toml(&path).unwrap();
        assert_eq!(loaded.word_delimiter, cfg.word_delimiter);
        assert_eq!(loaded.beam_width, cfg.beam_width);
    }

    #[test]
    fn n_best_below_one_is_clamped() {
        let cfg = KnowledgeConfig::default();
        assert_eq!(cfg.effective_n_best(Some(0)), 1);
        assert_eq!(cfg.effective_n_best(None), 1);
        assert_eq!(cfg.effective_n_best(Some(5)), 5);
    }
}
