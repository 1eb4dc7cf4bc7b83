//! §6.1/§6.3: dictionary file loading — `.dic`, `.black`, `.pos` text files,
//! the encrypted binary system dictionary, and shard composition (`P`,
//! `P.1`, `P.2`, …).

pub mod codec;

use crate::error::CmaError;
use crate::trie::{PosSetId, Trie};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Outcome of loading a single `.dic`-shaped line into the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Added,
    /// Already known; POS strings (if any) were merged into the existing set.
    Merged,
    Blacklisted,
    Malformed,
}

/// Side table of POS candidate sets, indexed by [`PosSetId`]. Index 0 is a
/// reserved dummy slot so `PosSetId` (a `NonZeroU32`) can index directly.
#[derive(Debug, Default)]
pub struct PosCandidates {
    sets: Vec<HashSet<String>>,
}

impl PosCandidates {
    pub fn new() -> Self {
        PosCandidates {
            sets: vec![HashSet::new()],
        }
    }

    pub fn get(&self, id: PosSetId) -> &HashSet<String> {
        &self.sets[id.get() as usize]
    }

    fn alloc(&mut self) -> PosSetId {
        let idx = self.sets.len() as u32;
        self.sets.push(HashSet::new());
        PosSetId::new(idx).expect("index 0 is reserved before any alloc")
    }

    fn get_mut(&mut self, id: PosSetId) -> &mut HashSet<String> {
        &mut self.sets[id.get() as usize]
    }
}

/// Apply one `.dic`-format line (`word pos1 pos2 ...`, matching the original
/// source's `appendWordPOS`) to `trie`/`pos_candidates`. A leading `_` in the
/// word stands for a literal space (multi-character dictionary terms may
/// contain a space, which whitespace-splitting would otherwise eat).
pub fn append_word_pos(
    trie: &mut Trie,
    pos_candidates: &mut PosCandidates,
    black_words: &HashSet<String>,
    line: &str,
) -> AppendOutcome {
    let mut tokens = line.split_whitespace();
    let raw_word = match tokens.next() {
        Some(w) if !w.is_empty() => w,
        _ => return AppendOutcome::Malformed,
    };
    let word = raw_word.replace('_', " ");

    if black_words.contains(&word) {
        return AppendOutcome::Blacklisted;
    }

    let existing = trie.search(word.as_bytes()).payload;
    let (id, outcome) = match existing {
        Some(id) => (id, AppendOutcome::Merged),
        None => {
            let id = pos_candidates.alloc();
            trie.insert(word.as_bytes(), id);
            (id, AppendOutcome::Added)
        }
    };

    let set = pos_candidates.get_mut(id);
    for pos in tokens {
        set.insert(pos.to_string());
    }

    outcome
}

/// Load `.pos` — one POS name per line, order defines `pos_code` (via
/// `crate::pos_table::PosTable::add_pos` in load order).
pub fn load_pos_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>, CmaError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| CmaError::io(path, e))?;
    Ok(text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect())
}

/// Load `.black` — one word per line; refused at dictionary load.
pub fn load_black_words<P: AsRef<Path>>(path: P) -> Result<HashSet<String>, CmaError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(CmaError::io(path, e)),
    }
}

/// Result of loading a (possibly sharded) text or binary dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadStats {
    pub added: usize,
    pub merged: usize,
    pub blacklisted: usize,
    pub malformed: usize,
    pub shards: usize,
}

impl LoadStats {
    fn record(&mut self, outcome: AppendOutcome) {
        match outcome {
            AppendOutcome::Added => self.added += 1,
            AppendOutcome::Merged => self.merged += 1,
            AppendOutcome::Blacklisted => self.blacklisted += 1,
            AppendOutcome::Malformed => self.malformed += 1,
        }
    }
}

fn shard_path(base: &Path, shard: usize) -> PathBuf {
    if shard == 0 {
        base.to_path_buf()
    } else {
        let mut s = base.as_os_str().to_owned();
        s.push(format!(".{shard}"));
        PathBuf::from(s)
    }
}

/// Load a plain-text `.dic`-format user dictionary, following `P`, `P.1`,
/// `P.2`, … until a shard fails to open (spec §6.3). Malformed lines are
/// logged and skipped, not fatal (spec §7).
pub fn load_user_dict<P: AsRef<Path>>(
    base_path: P,
    trie: &mut Trie,
    pos_candidates: &mut PosCandidates,
    black_words: &HashSet<String>,
) -> LoadStats {
    let base = base_path.as_ref();
    let mut stats = LoadStats::default();
    for shard in 0.. {
        let path = shard_path(base, shard);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => break,
        };
        stats.shards += 1;
        for line in BufReader::new(file).lines().map_while(Result::ok) {
            if line.trim().is_empty() {
                continue;
            }
            let outcome = append_word_pos(trie, pos_candidates, black_words, &line);
            if outcome == AppendOutcome::Malformed {
                tracing::warn!(path = %path.display(), %line, "skipping malformed dictionary line");
            }
            stats.record(outcome);
        }
    }
    stats
}

/// Read one obfuscated record from a binary system dictionary stream.
/// Returns `None` at EOF.
fn read_encrypted_record(r: &mut impl Read) -> std::io::Result<Option<String>> {
    let mut len_buf = [0u8; 4];
    match r.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = codec::decode_length(len_buf) as usize;
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    let decoded = codec::decode_record(&payload);
    Ok(Some(String::from_utf8_lossy(&decoded).into_owned()))
}

/// Load the binary system dictionary (spec §6.2), following shard suffixes
/// exactly as [`load_user_dict`] does for the text form.
pub fn load_system_dict<P: AsRef<Path>>(
    base_path: P,
    trie: &mut Trie,
    pos_candidates: &mut PosCandidates,
    black_words: &HashSet<String>,
) -> Result<LoadStats, CmaError> {
    let base = base_path.as_ref();
    let mut stats = LoadStats::default();
    for shard in 0.. {
        let path = shard_path(base, shard);
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => break,
        };
        stats.shards += 1;
        while let Some(line) = read_encrypted_record(&mut file).map_err(|e| CmaError::io(&path, e))? {
            if line.is_empty() {
                continue;
            }
            let outcome = append_word_pos(trie, pos_candidates, black_words, &line);
            if outcome == AppendOutcome::Malformed {
                tracing::warn!(path = %path.display(), "skipping malformed system-dictionary record");
            }
            stats.record(outcome);
        }
    }
    if stats.shards == 0 {
        return Err(CmaError::io(
            base,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no dictionary shard found"),
        ));
    }
    Ok(stats)
}

/// Encode a plain-text dictionary file into the binary system-dictionary
/// format (the inverse of [`load_system_dict`] for a single, unsharded
/// file) — used by the `encode-dict` tool and by codec round-trip tests.
pub fn encode_system_dict<P: AsRef<Path>, Q: AsRef<Path>>(
    txt_path: P,
    bin_path: Q,
) -> Result<usize, CmaError> {
    let txt_path = txt_path.as_ref();
    let bin_path = bin_path.as_ref();
    let text = std::fs::read_to_string(txt_path).map_err(|e| CmaError::io(txt_path, e))?;
    let mut out = Vec::new();
    let mut count = 0;
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        out.extend_from_slice(&codec::encode_line(line));
        count += 1;
    }
    std::fs::write(bin_path, &out).map_err(|e| CmaError::io(bin_path, e))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_word_pos_adds_new_and_merges_existing() {
        let mut trie = Trie::new();
        let mut pc = PosCandidates::new();
        let black = HashSet::new();

        let outcome = append_word_pos(&mut trie, &mut pc, &black, "中国 ns");
        assert_eq!(outcome, AppendOutcome::Added);

        let outcome = append_word_pos(&mut trie, &mut pc, &black, "中国 n");
        assert_eq!(outcome, AppendOutcome::Merged);

        let id = trie.search("中国".as_bytes()).payload.unwrap();
        let set = pc.get(id);
        assert!(set.contains("ns"));
        assert!(set.contains("n"));
    }

    #[test]
    fn blacklisted_word_is_refused() {
        let mut trie = Trie::new();
        let mut pc = PosCandidates::new();
        let mut black = HashSet::new();
        black.insert("脏话".to_string());

        let outcome = append_word_pos(&mut trie, &mut pc, &black, "脏话 n");
        assert_eq!(outcome, AppendOutcome::Blacklisted);
        assert!(!trie.contains("脏话".as_bytes()));
    }

    #[test]
    fn underscore_in_word_becomes_space() {
        let mut trie = Trie::new();
        let mut pc = PosCandidates::new();
        let black = HashSet::new();

        append_word_pos(&mut trie, &mut pc, &black, "新_加坡 ns");
        assert!(trie.contains("新 加坡".as_bytes()));
    }

    #[test]
    fn shard_composition_matches_single_concatenated_file() {
        let dir = std::env::temp_dir().join(format!("cma_shard_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let base = dir.join("user.dic");
        std::fs::write(&base, "A n\n").unwrap();
        std::fs::write(format!("{}.1", base.display()), "B v\n").unwrap();
        std::fs::write(format!("{}.2", base.display()), "C adj\n").unwrap();

        let mut trie = Trie::new();
        let mut pc = PosCandidates::new();
        let black = HashSet::new();
        let stats = load_user_dict(&base, &mut trie, &mut pc, &black);

        assert_eq!(stats.shards, 3);
        assert!(trie.contains(b"A"));
        assert!(trie.contains(b"B"));
        assert!(trie.contains(b"C"));
    }

    #[test]
    fn encode_then_load_system_dict_round_trips() {
        let dir = std::env::temp_dir().join(format!("cma_sysdict_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let txt = dir.join("sys.txt");
        std::fs::write(&txt, "中国 ns\n人民 n\n").unwrap();
        let bin = dir.join("sys.bin");

        let count = encode_system_dict(&txt, &bin).unwrap();
        assert_eq!(count, 2);

        let mut trie = Trie::new();
        let mut pc = PosCandidates::new();
        let black = HashSet::new();
        let stats = load_system_dict(&bin, &mut trie, &mut pc, &black).unwrap();
        assert_eq!(stats.added, 2);
        assert!(trie.contains("中国".as_bytes()));
        assert!(trie.contains("人民".as_bytes()));
    }
}
