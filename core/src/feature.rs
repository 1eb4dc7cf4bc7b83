//! Feature-string templates shared by the segmentation tagger (C6) and the
//! POS tagger (C8). Every template follows the `name=value` shape the
//! `.tag` feature dictionary ([`crate::feature_dict::FeatureDict`]) was
//! populated with, so a built feature can be looked up directly.

/// Context window for one position in the segmentation lattice: the current
/// codepoint plus up to two neighbors on either side, and the previous one or
/// two assigned tags.
pub struct SegContext<'a> {
    pub prev2word: Option<&'a str>,
    pub prevword: Option<&'a str>,
    pub curword: &'a str,
    pub nextword: Option<&'a str>,
    pub next2word: Option<&'a str>,
    pub curtype: &'a str,
    pub prevtag: Option<&'a str>,
    pub prev2tag: Option<&'a str>,
}

/// Build the feature set for one segmentation-lattice position, per spec
/// §4.5. Absent context slots (sentence boundaries) simply omit their
/// template rather than emitting a placeholder value.
pub fn seg_features(ctx: &SegContext) -> Vec<String> {
    let mut out = Vec::with_capacity(8);
    out.push(format!("curword={}", ctx.curword));
    out.push(format!("curtype={}", ctx.curtype));
    if let Some(w) = ctx.prevword {
        out.push(format!("prevword={w}"));
    }
    if let Some(w) = ctx.prev2word {
        out.push(format!("prev2word={w}"));
    }
    if let Some(w) = ctx.nextword {
        out.push(format!("nextword={w}"));
    }
    if let Some(w) = ctx.next2word {
        out.push(format!("next2word={w}"));
    }
    if let Some(t) = ctx.prevtag {
        out.push(format!("prevtag={t}"));
    }
    if let Some(t) = ctx.prev2tag {
        out.push(format!("prev2tag={t}"));
    }
    out
}

/// Context for one word position during POS tagging: the word itself plus
/// its immediate lexical neighbors and the previous assigned POS.
pub struct PosContext<'a> {
    pub prevword: Option<&'a str>,
    pub curword: &'a str,
    pub nextword: Option<&'a str>,
    pub prevpos: Option<&'a str>,
}

/// Coarse word-length bucket used by `word_len=` per spec §4.7: exact counts
/// up to 4, then a `5+` catch-all, matching the trainer's bucketing (longer
/// words rapidly become too sparse to discriminate on exact length).
fn word_len_bucket(char_count: usize) -> &'static str {
    match char_count {
        0 => "0",
        1 => "1",
        2 => "2",
        3 => "3",
        4 => "4",
        _ => "5+",
    }
}

/// Build the feature set for one POS-tagging position, per spec §4.7.
pub fn pos_features(ctx: &PosContext) -> Vec<String> {
    let mut out = Vec::with_capacity(6);
    out.push(format!("curword={}", ctx.curword));
    out.push(format!(
        "word_has_digit={}",
        ctx.curword.chars().any(|c| c.is_ascii_digit())
    ));
    out.push(format!(
        "word_len={}",
        word_len_bucket(ctx.curword.chars().count())
    ));
    if let Some(w) = ctx.prevword {
        out.push(format!("prevword={w}"));
    }
    if let Some(w) = ctx.nextword {
        out.push(format!("nextword={w}"));
    }
    if let Some(p) = ctx.prevpos {
        out.push(format!("prevpos={p}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seg_features_omit_absent_neighbors() {
        let ctx = SegContext {
            prev2word: None,
            prevword: None,
            curword: "中",
            nextword: Some("国"),
            next2word: None,
            curtype: "chinese",
            prevtag: None,
            prev2tag: None,
        };
        let feats = seg_features(&ctx);
        assert!(feats.contains(&"curword=中".to_string()));
        assert!(feats.contains(&"curtype=chinese".to_string()));
        assert!(feats.contains(&"nextword=国".to_string()));
        assert!(!feats.iter().any(|f| f.starts_with("prevword=")));
        assert!(!feats.iter().any(|f| f.starts_with("prevtag=")));
    }

    #[test]
    fn pos_features_bucket_word_length_and_digit_flag() {
        let ctx = PosContext {
            prevword: Some("在"),
            curword: "2024年",
            nextword: None,
            prevpos: Some("p"),
        };
        let feats = pos_features(&ctx);
        assert!(feats.contains(&"word_has_digit=true".to_string()));
        assert!(feats.contains(&"word_len=5+".to_string()));
        assert!(feats.contains(&"prevpos=p".to_string()));
    }

    #[test]
    fn word_len_bucket_boundaries() {
        assert_eq!(word_len_bucket(1), "1");
        assert_eq!(word_len_bucket(4), "4");
        assert_eq!(word_len_bucket(5), "5+");
        assert_eq!(word_len_bucket(20), "5+");
    }
}
