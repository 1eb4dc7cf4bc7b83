//! Feature-dictionary membership — the opaque predicate behind rare-word
//! detection (spec §9, Open Question "rare-word detection at inference").
//!
//! The trainer decides rareness from per-word training frequency; at
//! inference we mirror its exact rule by checking membership in the
//! `.tag` file it wrote out, with no attempt to reconstruct frequencies.

use crate::error::CmaError;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct FeatureDict {
    known: HashSet<String>,
}

impl FeatureDict {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CmaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| CmaError::io(path, e))?;
        let known = text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect();
        Ok(FeatureDict { known })
    }

    /// True iff `template=value` was observed during training, i.e. is not
    /// rare/unseen.
    pub fn contains(&self, feature: &str) -> bool {
        self.known.contains(feature)
    }

    /// A word is "rare" iff its `curword=<word>` feature is absent from the
    /// dictionary.
    pub fn is_rare_word(&self, word: &str) -> bool {
        let mut key = String::with_capacity(word.len() + 8);
        key.push_str("curword=");
        key.push_str(word);
        !self.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn membership_and_rare_word_predicate() {
        let path = std::env::temp_dir().join("cma_feature_dict_test.tag");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "curword=中").unwrap();
        writeln!(f, "prevtag=B").unwrap();
        drop(f);

        let dict = FeatureDict::load(&path).unwrap();
        assert!(dict.contains("curword=中"));
        assert!(!dict.contains("curword=国"));
        assert!(!dict.is_rare_word("中"));
        assert!(dict.is_rare_word("国"));
    }
}
