//! Thin CLI wrapper around `libchinese_cma::Analyzer`. Loads a knowledge
//! bundle once, then runs `analyze_stream` over stdin or a file, writing one
//! line of `word/pos word/pos ...` per sentence. Contains no training logic.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use libchinese_cma::analyzer::{AnalyzeOptions, Strategy as AnalyzerStrategy};
use libchinese_cma::knowledge::{KnowledgeConfig, KnowledgePaths};
use libchinese_cma::segment::TagScheme;
use libchinese_cma::{Analyzer, Encoding, KnowledgeHandle};
use std::io::Read;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StrategyArg {
    ModelMm,
    Fmm,
    FMinCover,
}

impl From<StrategyArg> for AnalyzerStrategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::ModelMm => AnalyzerStrategy::ModelMM,
            StrategyArg::Fmm => AnalyzerStrategy::FMM,
            StrategyArg::FMinCover => AnalyzerStrategy::FMinCover,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TagSchemeArg {
    Be,
    Ilmr,
}

impl From<TagSchemeArg> for TagScheme {
    fn from(s: TagSchemeArg) -> Self {
        match s {
            TagSchemeArg::Be => TagScheme::BE,
            TagSchemeArg::Ilmr => TagScheme::ILMR,
        }
    }
}

/// Segment and POS-tag text using a loaded dictionary and model bundle.
#[derive(Parser, Debug)]
#[command(name = "segment", author, version, about)]
struct Cli {
    /// `.pos` file: one POS name per line.
    #[arg(long)]
    pos_names: PathBuf,

    /// System dictionary, in the encrypted binary format (see `encode-dict`).
    #[arg(long)]
    system_dict: PathBuf,

    /// Optional plain-text user dictionary (`.dic` format).
    #[arg(long)]
    user_dict: Option<PathBuf>,

    /// Optional `.black` blacklist file.
    #[arg(long)]
    black_words: Option<PathBuf>,

    /// Optional stop-word list.
    #[arg(long)]
    stop_words: Option<PathBuf>,

    /// Segmentation MaxEnt model.
    #[arg(long)]
    seg_model: PathBuf,

    /// POS-tagging MaxEnt model.
    #[arg(long)]
    pos_model: PathBuf,

    /// Optional `.tag` feature dictionary used for rare-word detection.
    #[arg(long)]
    seg_feature_dict: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "be")]
    tag_scheme: TagSchemeArg,

    #[arg(long, value_enum, default_value = "model-mm")]
    strategy: StrategyArg,

    /// Number of ranked candidates per sentence (statistical strategy only).
    #[arg(long)]
    n_best: Option<usize>,

    /// Disable POS tagging, emitting bare words.
    #[arg(long)]
    no_pos: bool,

    #[arg(long, value_enum, default_value = "utf8")]
    encoding: EncodingArg,

    /// Input file; reads stdin when omitted.
    input: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EncodingArg {
    Utf8,
    Gb2312,
    Big5,
    Gb18030,
}

impl From<EncodingArg> for Encoding {
    fn from(e: EncodingArg) -> Self {
        match e {
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Gb2312 => Encoding::Gb2312,
            EncodingArg::Big5 => Encoding::Big5,
            EncodingArg::Gb18030 => Encoding::Gb18030,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let paths = KnowledgePaths {
        pos_names: cli.pos_names,
        system_dict: cli.system_dict,
        user_dict: cli.user_dict,
        black_words: cli.black_words,
        stop_words: cli.stop_words,
        seg_model: cli.seg_model,
        pos_model: cli.pos_model,
        seg_feature_dict: cli.seg_feature_dict,
        tag_scheme: cli.tag_scheme.into(),
    };
    let mut config = KnowledgeConfig::default();
    config.encoding = cli.encoding.into();

    let knowledge = KnowledgeHandle::load(&paths, config).context("loading knowledge bundle")?;
    let mut analyzer = Analyzer::new(knowledge);
    analyzer.set_option(AnalyzeOptions {
        strategy: cli.strategy.into(),
        n_best: cli.n_best,
        pos_tagging: Some(!cli.no_pos),
    });

    let text = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    for list in analyzer.analyze_stream(&text) {
        let line: Vec<String> = list
            .iter()
            .map(|m| {
                if m.has_pos() {
                    format!("{}/{}", m.lexicon, m.pos_str)
                } else {
                    m.lexicon.clone()
                }
            })
            .collect();
        println!("{}", line.join(" "));
    }

    Ok(())
}
