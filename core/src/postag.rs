//! C8: POS tagger.
//!
//! Scores each word's POS against the dictionary's candidate set for that
//! word when one exists (restricting the search space to plausible tags for
//! a known word), and falls back to scoring the full model tag vocabulary —
//! with a configured default POS as the last resort — for out-of-dictionary
//! words.

use crate::feature::{pos_features, PosContext};
use crate::maxent::MaxEntModel;
use crate::pos_table::PosTable;
use crate::sentence::Morpheme;
use std::collections::HashSet;

pub struct PosTagger<'a> {
    pub model: &'a MaxEntModel,
    pub pos_table: &'a PosTable,
    pub default_pos: &'a str,
}

impl<'a> PosTagger<'a> {
    pub fn new(model: &'a MaxEntModel, pos_table: &'a PosTable, default_pos: &'a str) -> Self {
        PosTagger {
            model,
            pos_table,
            default_pos,
        }
    }

    /// Tag every word in `words`. `candidates[i]` is the set of POS strings
    /// the dictionary allows for `words[i]`, or `None`/empty for an
    /// out-of-dictionary word.
    pub fn tag_sentence(
        &self,
        words: &[String],
        candidates: &[Option<&HashSet<String>>],
    ) -> Vec<Morpheme> {
        let mut out = Vec::with_capacity(words.len());
        let mut prev_pos: Option<String> = None;

        for (i, word) in words.iter().enumerate() {
            let ctx = PosContext {
                prevword: if i > 0 { Some(words[i - 1].as_str()) } else { None },
                curword: word,
                nextword: words.get(i + 1).map(|s| s.as_str()),
                prevpos: prev_pos.as_deref(),
            };
            let feats = pos_features(&ctx);
            let allowed = candidates.get(i).copied().flatten();
            let chosen = self.best_tag(&feats, allowed);

            let mut m = Morpheme::new(word.clone());
            m.pos_code = self.pos_table.get_code_from_str(&chosen);
            m.is_indexed = self.pos_table.is_index_pos(m.pos_code);
            m.pos_str = chosen.clone();
            prev_pos = Some(chosen);
            out.push(m);
        }
        out
    }

    fn best_tag(&self, feats: &[String], allowed: Option<&HashSet<String>>) -> String {
        match allowed {
            Some(set) if !set.is_empty() => {
                let mut best: Option<(u32, f32)> = None;
                for pos_name in set {
                    let Some(tag_id) = self.model.tag_id(pos_name) else {
                        continue;
                    };
                    let score = self.model.score(feats, tag_id);
                    best = Some(match best {
                        None => (tag_id, score),
                        Some(b) if score > b.1 => (tag_id, score),
                        Some(b) => b,
                    });
                }
                match best {
                    Some((tag_id, _)) => self
                        .model
                        .tag_name(tag_id)
                        .unwrap_or(self.default_pos)
                        .to_string(),
                    // the model knows none of the candidate POS strings:
                    // fall back to whichever candidate sorts first so the
                    // result is at least one of the dictionary's choices.
                    None => set.iter().min().cloned().unwrap_or_else(|| self.default_pos.to_string()),
                }
            }
            _ => {
                if self.model.num_tags() == 0 {
                    return self.default_pos.to_string();
                }
                let (tag_id, _) = self.model.best_tag(feats);
                self.model
                    .tag_name(tag_id)
                    .unwrap_or(self.default_pos)
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maxent::write_model;

    fn model() -> MaxEntModel {
        let mut buf = Vec::new();
        write_model(
            &mut buf,
            &["n", "v", "x"],
            &["curword=跑"],
            &[(0, 1, 3.0), (0, 0, -1.0)],
        )
        .unwrap();
        let path = std::env::temp_dir().join("cma_postag_test.model");
        std::fs::write(&path, &buf).unwrap();
        MaxEntModel::load(&path).unwrap()
    }

    #[test]
    fn restricts_to_candidate_set_when_present() {
        let model = model();
        let mut pos_table = PosTable::new();
        pos_table.add_pos("n");
        pos_table.add_pos("v");
        pos_table.add_pos("x");
        let tagger = PosTagger::new(&model, &pos_table, "x");

        let mut allowed = HashSet::new();
        allowed.insert("n".to_string());
        // "v" scores higher but is excluded from the candidate set.
        let words = vec!["跑".to_string()];
        let tagged = tagger.tag_sentence(&words, &[Some(&allowed)]);
        assert_eq!(tagged[0].pos_str, "n");
    }

    #[test]
    fn falls_back_to_best_scoring_tag_without_candidates() {
        let model = model();
        let mut pos_table = PosTable::new();
        pos_table.add_pos("n");
        pos_table.add_pos("v");
        pos_table.add_pos("x");
        let tagger = PosTagger::new(&model, &pos_table, "x");

        let words = vec!["跑".to_string()];
        let tagged = tagger.tag_sentence(&words, &[None]);
        assert_eq!(tagged[0].pos_str, "v");
    }

    #[test]
    fn unknown_word_with_no_model_tags_uses_default_pos() {
        let model = MaxEntModel::default();
        let pos_table = PosTable::new();
        let tagger = PosTagger::new(&model, &pos_table, "x");
        let words = vec!["未知".to_string()];
        let tagged = tagger.tag_sentence(&words, &[None]);
        assert_eq!(tagged[0].pos_str, "x");
    }
}
