//! End-to-end coverage: build a full knowledge bundle from on-disk fixtures
//! (the same path `tools/segment` takes at startup) and drive `Analyzer`
//! across all three strategies, including POS tagging restricted by
//! dictionary candidate sets.

use libchinese_cma::analyzer::{AnalyzeOptions, Strategy};
use libchinese_cma::knowledge::{KnowledgeConfig, KnowledgePaths};
use libchinese_cma::maxent::write_model;
use libchinese_cma::segment::TagScheme;
use libchinese_cma::{Analyzer, KnowledgeHandle};
use std::path::PathBuf;

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("cma_e2e_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Fixture { dir }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

/// A seg model that strongly favors recognizing "中国"/"人民" as two-character
/// words tagged B/E over any other split, via `curword=` features on the
/// dictionary words themselves.
fn build_seg_model(fixture: &Fixture) -> PathBuf {
    let mut buf = Vec::new();
    write_model(
        &mut buf,
        &["B", "E"],
        &["curword=中", "curword=国", "curword=人", "curword=民"],
        &[
            (0, 0, 2.0), // "中" as B
            (0, 1, -2.0),
            (1, 1, 2.0), // "国" as E
            (1, 0, -2.0),
            (2, 0, 2.0), // "人" as B
            (2, 1, -2.0),
            (3, 1, 2.0), // "民" as E
            (3, 0, -2.0),
        ],
    )
    .unwrap();
    let path = fixture.dir.join("seg.model");
    std::fs::write(&path, &buf).unwrap();
    path
}

fn build_pos_model(fixture: &Fixture) -> PathBuf {
    let mut buf = Vec::new();
    write_model(&mut buf, &["ns", "n"], &[], &[]).unwrap();
    let path = fixture.dir.join("pos.model");
    std::fs::write(&path, &buf).unwrap();
    path
}

fn build_knowledge(fixture: &Fixture, dict_entries: &str) -> KnowledgeHandle {
    let pos_names = fixture.write("names.pos", "ns\nn\nx\n");
    let black_words = fixture.write("black.black", "脏话\n");
    let dict_txt = fixture.write("sys.txt", dict_entries);
    let dict_bin = fixture.dir.join("sys.bin");
    libchinese_cma::dict::encode_system_dict(&dict_txt, &dict_bin).unwrap();

    let paths = KnowledgePaths {
        pos_names,
        system_dict: dict_bin,
        user_dict: None,
        black_words: Some(black_words),
        stop_words: None,
        seg_model: build_seg_model(fixture),
        pos_model: build_pos_model(fixture),
        seg_feature_dict: None,
        tag_scheme: TagScheme::BE,
    };
    KnowledgeHandle::load(&paths, KnowledgeConfig::default()).unwrap()
}

#[test]
fn model_mm_segments_and_tags_against_dictionary_candidates() {
    let fixture = Fixture::new("modelmm");
    let knowledge = build_knowledge(&fixture, "中国 ns\n人民 n\n");
    let mut analyzer = Analyzer::new(knowledge);
    analyzer.set_option(AnalyzeOptions {
        strategy: Strategy::ModelMM,
        n_best: Some(1),
        pos_tagging: Some(true),
    });

    let sentence = analyzer.analyze_sentence("中国人民");
    let idx = sentence.one_best_index().expect("at least one candidate");
    let best = sentence.morpheme_list(idx);

    let words: Vec<&str> = best.iter().map(|m| m.lexicon.as_str()).collect();
    assert_eq!(words, vec!["中国", "人民"]);
    assert_eq!(best[0].pos_str, "ns");
    assert_eq!(best[1].pos_str, "n");
    assert!((sentence.score(idx) - 1.0).abs() < 1e-6, "single surviving candidate normalizes to 1.0");
}

#[test]
fn model_mm_n_best_is_deduplicated_and_normalized() {
    let fixture = Fixture::new("nbest");
    let knowledge = build_knowledge(&fixture, "中国 ns\n人民 n\n");
    let mut analyzer = Analyzer::new(knowledge);
    analyzer.set_option(AnalyzeOptions {
        strategy: Strategy::ModelMM,
        n_best: Some(8),
        pos_tagging: Some(false),
    });

    let sentence = analyzer.analyze_sentence("中国人民");
    let total: f64 = (0..sentence.list_size()).map(|i| sentence.score(i)).sum();
    assert!((total - 1.0).abs() < 1e-6, "normalized scores sum to 1.0, got {total}");

    // every candidate's morpheme list must be distinct (dedup rule).
    for i in 0..sentence.list_size() {
        for j in (i + 1)..sentence.list_size() {
            assert_ne!(sentence.morpheme_list(i), sentence.morpheme_list(j));
        }
    }
}

#[test]
fn fmm_and_fmincover_agree_on_a_greedy_dictionary_split() {
    let fixture = Fixture::new("strategies");
    let knowledge = build_knowledge(&fixture, "中华人民共和国 ns\n中华 ns\n人民 n\n");

    let mut fmm = Analyzer::new(knowledge.clone());
    fmm.set_option(AnalyzeOptions {
        strategy: Strategy::FMM,
        n_best: Some(1),
        pos_tagging: Some(false),
    });
    let fmm_sentence = fmm.analyze_sentence("中华人民共和国");
    let fmm_words: Vec<&str> = fmm_sentence
        .morpheme_list(fmm_sentence.one_best_index().unwrap())
        .iter()
        .map(|m| m.lexicon.as_str())
        .collect();
    assert_eq!(fmm_words, vec!["中华人民共和国"]);

    let mut cover = Analyzer::new(knowledge);
    cover.set_option(AnalyzeOptions {
        strategy: Strategy::FMinCover,
        n_best: Some(1),
        pos_tagging: Some(false),
    });
    let cover_sentence = cover.analyze_sentence("中华人民共和国");
    let cover_words: Vec<&str> = cover_sentence
        .morpheme_list(cover_sentence.one_best_index().unwrap())
        .iter()
        .map(|m| m.lexicon.as_str())
        .collect();
    assert_eq!(cover_words, vec!["中华人民共和国"]);
}

#[test]
fn analyze_string_splits_paragraph_and_segments_each_sentence() {
    let fixture = Fixture::new("paragraph");
    let knowledge = build_knowledge(&fixture, "中国 ns\n人民 n\n");
    let mut analyzer = Analyzer::new(knowledge);
    analyzer.set_option(AnalyzeOptions {
        strategy: Strategy::FMM,
        n_best: Some(1),
        pos_tagging: Some(false),
    });

    let lists = analyzer.analyze_string("中国人民。人民中国！");
    assert_eq!(lists.len(), 2);
    let first: Vec<&str> = lists[0].iter().map(|m| m.lexicon.as_str()).collect();
    let second: Vec<&str> = lists[1].iter().map(|m| m.lexicon.as_str()).collect();
    assert_eq!(first, vec!["中国", "人民", "。"]);
    assert_eq!(second, vec!["人民", "中国", "！"]);
}

#[test]
fn blacklisted_dictionary_word_never_reaches_the_trie() {
    let fixture = Fixture::new("blacklist");
    let knowledge = build_knowledge(&fixture, "脏话 n\n中国 ns\n");
    assert!(!knowledge.trie().contains("脏话".as_bytes()));
    assert!(knowledge.trie().contains("中国".as_bytes()));
}

#[test]
fn knowledge_config_overrides_n_best_through_the_analyzer() {
    let fixture = Fixture::new("config");
    let knowledge = build_knowledge(&fixture, "中国 ns\n人民 n\n");
    let mut analyzer = Analyzer::new(knowledge);
    // leave AnalyzeOptions.n_best unset: falls back to KnowledgeConfig's
    // default of 1.
    analyzer.set_option(AnalyzeOptions {
        strategy: Strategy::ModelMM,
        n_best: None,
        pos_tagging: Some(false),
    });
    let sentence = analyzer.analyze_sentence("中国人民");
    assert_eq!(sentence.list_size(), 1);
}
