//! Ranking configuration: BM25 constants, stage weights, candidate caps.
//!
//! Weights are grouped per route. Three named presets exist; a JSON file can
//! override any subset of fields on top of a preset.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Query-term-frequency saturation.
    pub k3: f64,
    /// Length normalization, 0 disables it.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, k3: 2.2, b: 0.7 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityWeights {
    pub popularity: f64,
    pub rank: f64,
}

impl Default for AuthorityWeights {
    fn default() -> Self {
        Self { popularity: 0.1, rank: 0.15 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleTermWeights {
    pub title_authority: f64,
    pub title_tf: f64,
}

impl Default for SingleTermWeights {
    fn default() -> Self {
        Self { title_authority: 0.3, title_tf: 0.7 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralWeights {
    pub title_authority: f64,
    pub anchor: f64,
    pub title_tf: f64,
    pub bm25: f64,
    /// Cosine TF-IDF is skipped entirely at 0.
    pub cosine: f64,
}

impl Default for GeneralWeights {
    fn default() -> Self {
        Self { title_authority: 0.1, anchor: 0.15, title_tf: 0.45, bm25: 0.3, cosine: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub bm25: Bm25Params,
    pub authority: AuthorityWeights,
    pub single_term: SingleTermWeights,
    pub general: GeneralWeights,
    /// Candidates kept from the title stage.
    pub title_cap: usize,
    /// Candidates kept from the anchor-text stage.
    pub anchor_cap: usize,
    /// Documents kept by the interrogative route before final selection.
    pub question_cap: usize,
    /// Upper bound on results from the ranked routes.
    pub max_results: usize,
    /// Abort posting-list scans after this many milliseconds.
    pub query_timeout_ms: Option<u64>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            authority: AuthorityWeights::default(),
            single_term: SingleTermWeights::default(),
            general: GeneralWeights::default(),
            title_cap: 100,
            anchor_cap: 200,
            question_cap: 200,
            max_results: 100,
            query_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Default,
    /// BM25 and cosine TF-IDF summed on the general route.
    Hybrid,
    /// Heavier body and title-term signals, wider title candidate pool.
    Precision,
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "hybrid" => Ok(Preset::Hybrid),
            "precision" => Ok(Preset::Precision),
            other => Err(Error::UnknownPreset(other.to_string())),
        }
    }
}

impl RankingConfig {
    pub fn preset(preset: Preset) -> Self {
        let base = RankingConfig::default();
        match preset {
            Preset::Default => base,
            Preset::Hybrid => RankingConfig {
                general: GeneralWeights { bm25: 0.37, cosine: 0.23, ..base.general },
                ..base
            },
            Preset::Precision => RankingConfig {
                general: GeneralWeights { title_tf: 0.75, bm25: 0.6, ..base.general },
                title_cap: 800,
                ..base
            },
        }
    }

    /// Overlay a JSON object onto `self`. Keys absent from `overrides` keep
    /// their current value, nested objects merge recursively.
    pub fn with_overrides(self, overrides: serde_json::Value, source: &Path) -> Result<Self> {
        let json_err = |e| Error::Json { path: source.to_path_buf(), source: e };
        let mut current = serde_json::to_value(&self).map_err(json_err)?;
        merge_json(&mut current, overrides);
        let merged: RankingConfig = serde_json::from_value(current).map_err(json_err)?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_overrides(self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| Error::Json { path: path.to_path_buf(), source })?;
        self.with_overrides(value, path)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("authority.popularity", self.authority.popularity),
            ("authority.rank", self.authority.rank),
            ("single_term.title_authority", self.single_term.title_authority),
            ("single_term.title_tf", self.single_term.title_tf),
            ("general.title_authority", self.general.title_authority),
            ("general.anchor", self.general.anchor),
            ("general.title_tf", self.general.title_tf),
            ("general.bm25", self.general.bm25),
            ("general.cosine", self.general.cosine),
            ("bm25.k1", self.bm25.k1),
            ("bm25.k3", self.bm25.k3),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be a finite non-negative number, got {w}")));
            }
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(Error::InvalidConfig(format!("bm25.b must lie in [0, 1], got {}", self.bm25.b)));
        }
        if self.max_results == 0 {
            return Err(Error::InvalidConfig("max_results must be at least 1".into()));
        }
        Ok(())
    }
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(over)) => {
            for (key, value) in over {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
