//! C4: POS table — bidirectional mapping between POS strings and dense
//! integer codes, plus a per-code "indexable" flag.
//!
//! The original source keeps this as a process-wide singleton
//! (`POSTable::instance()`); per REDESIGN FLAGS this is instead an ordinary
//! value owned by [`crate::knowledge::KnowledgeHandle`] and passed by
//! reference, avoiding hidden global state.

use std::collections::HashMap;

/// Dense POS tag code. `-1` (via `Option::None`) means "no POS produced".
#[derive(Debug, Clone, Default)]
pub struct PosTable {
    strs: Vec<String>,
    codes: HashMap<String, i32>,
    /// Whether each code counts as an "indexable" POS (e.g. nouns/verbs a
    /// search index would key on, as opposed to function words).
    indexable: Vec<bool>,
}

impl PosTable {
    pub fn new() -> Self {
        PosTable::default()
    }

    /// Register a POS string, assigning it the next dense code if unseen.
    /// Returns the code (new or existing).
    pub fn add_pos(&mut self, pos: &str) -> i32 {
        if let Some(&code) = self.codes.get(pos) {
            return code;
        }
        let code = self.strs.len() as i32;
        self.strs.push(pos.to_string());
        self.indexable.push(true);
        self.codes.insert(pos.to_string(), code);
        code
    }

    pub fn get_code_from_str(&self, pos: &str) -> i32 {
        self.codes.get(pos).copied().unwrap_or(-1)
    }

    pub fn get_str_from_code(&self, code: i32) -> Option<&str> {
        if code < 0 {
            return None;
        }
        self.strs.get(code as usize).map(|s| s.as_str())
    }

    pub fn size(&self) -> usize {
        self.strs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strs.is_empty()
    }

    /// Reset every code's indexable flag to `default_val`.
    pub fn reset_index_pos_list(&mut self, default_val: bool) {
        for v in self.indexable.iter_mut() {
            *v = default_val;
        }
    }

    /// Mark exactly the given POS strings as indexable; any POS not in
    /// `pos_list` is marked non-indexable. Returns the number matched.
    pub fn set_index_pos_list(&mut self, pos_list: &[String]) -> usize {
        self.reset_index_pos_list(false);
        let mut matched = 0;
        for pos in pos_list {
            if let Some(&code) = self.codes.get(pos) {
                self.indexable[code as usize] = true;
                matched += 1;
            }
        }
        matched
    }

    pub fn is_index_pos(&self, code: i32) -> bool {
        if code < 0 {
            return false;
        }
        self.indexable.get(code as usize).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strs.iter().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_dense_codes_in_insertion_order() {
        let mut table = PosTable::new();
        assert_eq!(table.add_pos("n"), 0);
        assert_eq!(table.add_pos("v"), 1);
        assert_eq!(table.add_pos("n"), 0);
        assert_eq!(table.size(), 2);
    }

    #[test]
    fn round_trips_str_and_code() {
        let mut table = PosTable::new();
        table.add_pos("n");
        table.add_pos("v");
        assert_eq!(table.get_code_from_str("v"), 1);
        assert_eq!(table.get_str_from_code(1), Some("v"));
        assert_eq!(table.get_code_from_str("adj"), -1);
        assert_eq!(table.get_str_from_code(-1), None);
    }

    #[test]
    fn indexable_flag_defaults_true_and_can_be_restricted() {
        let mut table = PosTable::new();
        table.add_pos("n");
        table.add_pos("u");
        assert!(table.is_index_pos(0));
        table.set_index_pos_list(&["n".to_string()]);
        assert!(table.is_index_pos(0));
        assert!(!table.is_index_pos(1));
    }
}
