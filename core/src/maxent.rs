//! C5: MaxEnt (log-linear) model — loads a frozen model file and scores
//! `(context features, candidate tag)` pairs.
//!
//! The on-disk format is a from-scratch, bit-stable re-encoding (spec §6.1
//! permits re-encoding to a native format at load time; the trainer's own
//! binary writer lives in an external maxent library outside this crate's
//! source pack). Layout:
//!
//! ```text
//! magic:        b"CMAM"
//! version:      u8                (currently 1)
//! tag_count:    u32 LE
//! tags:         tag_count * (u16 LE len, utf8 bytes)
//! feature_count: u32 LE
//! features:     feature_count * (u16 LE len, utf8 bytes)
//! weight_count: u32 LE
//! weights:      weight_count * (u32 LE feature_id, u32 LE tag_id, f32 LE weight)
//! ```

use crate::error::CmaError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Dense tag index into the model's tag vocabulary.
pub type TagId = u32;
/// Dense feature index into the model's feature vocabulary.
pub type FeatureId = u32;

const MAGIC: &[u8; 4] = b"CMAM";
const VERSION: u8 = 1;

/// A frozen log-linear model: `score(f, t) = sum_i w[i, t] * 1[f contains i]`.
#[derive(Debug, Clone, Default)]
pub struct MaxEntModel {
    tags: Vec<String>,
    feature_index: HashMap<String, FeatureId>,
    /// Per feature, the (tag, weight) pairs with nonzero weight.
    weights_by_feature: Vec<Vec<(TagId, f32)>>,
}

impl MaxEntModel {
    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    pub fn tag_name(&self, id: TagId) -> Option<&str> {
        self.tags.get(id as usize).map(|s| s.as_str())
    }

    pub fn tag_id(&self, name: &str) -> Option<TagId> {
        self.tags.iter().position(|t| t == name).map(|i| i as TagId)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Score a single `(features, tag)` pair. Higher is better; the value is
    /// a relative log-linear score, not necessarily a normalized log-prob.
    pub fn score(&self, features: &[String], tag: TagId) -> f32 {
        let mut total = 0.0f32;
        for f in features {
            if let Some(&fid) = self.feature_index.get(f.as_str()) {
                if let Some(&(_, w)) = self.weights_by_feature[fid as usize]
                    .iter()
                    .find(|&&(t, _)| t == tag)
                {
                    total += w;
                }
            }
        }
        total
    }

    /// Score every tag in the model's vocabulary for a given context.
    pub fn all_scores(&self, features: &[String]) -> Vec<(TagId, f32)> {
        let mut acc = vec![0f32; self.tags.len()];
        for f in features {
            if let Some(&fid) = self.feature_index.get(f.as_str()) {
                for &(tag, w) in &self.weights_by_feature[fid as usize] {
                    acc[tag as usize] += w;
                }
            }
        }
        acc.into_iter().enumerate().map(|(i, s)| (i as TagId, s)).collect()
    }

    /// The single highest-scoring tag for a context. Ties favor the lower
    /// tag id (a stable, arbitrary-but-documented choice — see
    /// DESIGN.md "tie-breaks in N-best").
    pub fn best_tag(&self, features: &[String]) -> (TagId, f32) {
        self.all_scores(features)
            .into_iter()
            .fold(None, |best: Option<(TagId, f32)>, cur| match best {
                None => Some(cur),
                Some(b) if cur.1 > b.1 => Some(cur),
                Some(b) => Some(b),
            })
            .unwrap_or((0, 0.0))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CmaError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CmaError::io(path, e))?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        read_exact(&mut reader, path, &mut magic)?;
        if &magic != MAGIC {
            return Err(CmaError::corrupt(path, "bad magic header"));
        }

        let version = read_u8(&mut reader, path)?;
        if version != VERSION {
            return Err(CmaError::corrupt(
                path,
                format!("unsupported model version {version}"),
            ));
        }

        let tag_count = read_u32(&mut reader, path)?;
        let mut tags = Vec::with_capacity(tag_count as usize);
        for _ in 0..tag_count {
            tags.push(read_str(&mut reader, path)?);
        }

        let feature_count = read_u32(&mut reader, path)?;
        let mut features = Vec::with_capacity(feature_count as usize);
        let mut feature_index = HashMap::with_capacity(feature_count as usize);
        for i in 0..feature_count {
            let name = read_str(&mut reader, path)?;
            feature_index.insert(name.clone(), i);
            features.push(name);
        }

        let weight_count = read_u32(&mut reader, path)?;
        let mut weights_by_feature: Vec<Vec<(TagId, f32)>> =
            vec![Vec::new(); feature_count as usize];
        for _ in 0..weight_count {
            let feature_id = read_u32(&mut reader, path)?;
            let tag_id = read_u32(&mut reader, path)?;
            let weight = read_f32(&mut reader, path)?;
            if feature_id >= feature_count || tag_id >= tag_count {
                return Err(CmaError::corrupt(
                    path,
                    format!("weight triple out of range (feature {feature_id}, tag {tag_id})"),
                ));
            }
            weights_by_feature[feature_id as usize].push((tag_id, weight));
        }

        let mut trailing = [0u8; 1];
        if reader.read(&mut trailing).map_err(|e| CmaError::io(path, e))? != 0 {
            return Err(CmaError::corrupt(path, "trailing garbage after weights"));
        }

        Ok(MaxEntModel {
            tags,
            feature_index,
            weights_by_feature,
        })
    }
}

fn read_exact(r: &mut impl Read, path: &Path, buf: &mut [u8]) -> Result<(), CmaError> {
    r.read_exact(buf).map_err(|e| io_or_corrupt(path, e))
}

fn io_or_corrupt(path: &Path, e: io::Error) -> CmaError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CmaError::corrupt(path, "truncated model file")
    } else {
        CmaError::io(path, e)
    }
}

fn read_u8(r: &mut impl Read, path: &Path) -> Result<u8, CmaError> {
    let mut b = [0u8; 1];
    read_exact(r, path, &mut b)?;
    Ok(b[0])
}

fn read_u32(r: &mut impl Read, path: &Path) -> Result<u32, CmaError> {
    let mut b = [0u8; 4];
    read_exact(r, path, &mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_f32(r: &mut impl Read, path: &Path) -> Result<f32, CmaError> {
    let mut b = [0u8; 4];
    read_exact(r, path, &mut b)?;
    Ok(f32::from_le_bytes(b))
}

fn read_str(r: &mut impl Read, path: &Path) -> Result<String, CmaError> {
    let mut len_buf = [0u8; 2];
    read_exact(r, path, &mut len_buf)?;
    let len = u16::from_le_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    read_exact(r, path, &mut buf)?;
    String::from_utf8(buf).map_err(|_| CmaError::corrupt(path, "non-utf8 tag/feature name"))
}

/// Serialize a model in this crate's own format — used by tests and by the
/// `encode-dict`-adjacent tooling to build fixtures; the real trainer (out
/// of scope per spec §1) would call this after fitting weights.
pub fn write_model<W: io::Write>(
    mut w: W,
    tags: &[&str],
    features: &[&str],
    weights: &[(FeatureId, TagId, f32)],
) -> io::Result<()> {
    w.write_all(MAGIC)?;
    w.write_all(&[VERSION])?;
    w.write_all(&(tags.len() as u32).to_le_bytes())?;
    for t in tags {
        write_str(&mut w, t)?;
    }
    w.write_all(&(features.len() as u32).to_le_bytes())?;
    for f in features {
        write_str(&mut w, f)?;
    }
    w.write_all(&(weights.len() as u32).to_le_bytes())?;
    for &(fid, tid, weight) in weights {
        w.write_all(&fid.to_le_bytes())?;
        w.write_all(&tid.to_le_bytes())?;
        w.write_all(&weight.to_le_bytes())?;
    }
    Ok(())
}

fn write_str<W: io::Write>(w: &mut W, s: &str) -> io::Result<()> {
    w.write_all(&(s.len() as u16).to_le_bytes())?;
    w.write_all(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> Vec<u8> {
        let mut buf = Vec::new();
        write_model(
            &mut buf,
            &["B", "E"],
            &["curword=A", "curword=B"],
            &[(0, 0, 1.0), (0, 1, -1.0), (1, 1, 2.0)],
        )
        .unwrap();
        buf
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = sample_model();
        buf[0] = b'X';
        let path = std::env::temp_dir().join("cma_bad_magic.model");
        std::fs::write(&path, &buf).unwrap();
        let err = MaxEntModel::load(&path).unwrap_err();
        assert!(matches!(err, CmaError::CorruptModel { .. }));
    }

    #[test]
    fn loads_and_scores() {
        let buf = sample_model();
        let path = std::env::temp_dir().join("cma_ok.model");
        std::fs::write(&path, &buf).unwrap();
        let model = MaxEntModel::load(&path).unwrap();
        assert_eq!(model.num_tags(), 2);

        let features = vec!["curword=A".to_string()];
        let scores = model.all_scores(&features);
        assert_eq!(scores[0].1, 1.0);
        assert_eq!(scores[1].1, -1.0);

        let (best, score) = model.best_tag(&features);
        assert_eq!(best, 0);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut buf = sample_model();
        buf.push(0xFF);
        let path = std::env::temp_dir().join("cma_trailing.model");
        std::fs::write(&path, &buf).unwrap();
        let err = MaxEntModel::load(&path).unwrap_err();
        assert!(matches!(err, CmaError::CorruptModel { .. }));
    }

    #[test]
    fn unknown_feature_contributes_nothing() {
        let buf = sample_model();
        let path = std::env::temp_dir().join("cma_unknown_feat.model");
        std::fs::write(&path, &buf).unwrap();
        let model = MaxEntModel::load(&path).unwrap();
        let features = vec!["curword=ZZZ".to_string()];
        let scores = model.all_scores(&features);
        assert_eq!(scores[0].1, 0.0);
        assert_eq!(scores[1].1, 0.0);
    }
}
