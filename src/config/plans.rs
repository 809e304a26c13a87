// src/config/plans.rs
//! Plan tiers (`free` / `pro` / `max`): issue cap, allowed source platforms,
//! and the extra instruction handed to the prompt builder.
//!
//! Built-in table below; an optional TOML file replaces it:
//! 1) $PLANS_CONFIG_PATH
//! 2) config/plans.toml
//! 3) built-in defaults

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::classifier::resolve;
use crate::types::SourceType;

pub const ENV_PLANS_CONFIG_PATH: &str = "PLANS_CONFIG_PATH";
pub const DEFAULT_PLANS_CONFIG_PATH: &str = "config/plans.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Max,
}

impl PlanTier {
    /// Case-insensitive; anything unrecognized (or absent) is `Free`.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("pro") => PlanTier::Pro,
            Some("max") => PlanTier::Max,
            _ => PlanTier::Free,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Max => "max",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub max_issues: usize,
    pub allowed_source_types: Vec<SourceType>,
    /// Source labels the model is told it may cite.
    pub source_labels: Vec<String>,
    #[serde(default)]
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTable {
    pub free: PlanConfig,
    pub pro: PlanConfig,
    pub max: PlanConfig,
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PlanTable {
    fn default() -> Self {
        use SourceType::*;
        Self {
            free: PlanConfig {
                max_issues: 4,
                allowed_source_types: vec![GoogleArticles, YouTube],
                source_labels: labels(&["Google Articles", "YouTube Transcripts"]),
                instruction: "Focus on the most widely reported problems.".into(),
            },
            pro: PlanConfig {
                max_issues: 10,
                allowed_source_types: vec![GoogleArticles, YouTube, Tweets],
                source_labels: labels(&[
                    "Google Articles",
                    "YouTube Transcripts",
                    "YouTube Comments",
                    "Twitter Posts",
                ]),
                instruction: "Include recurring complaints and cite where each one was reported."
                    .into(),
            },
            max: PlanConfig {
                max_issues: 20,
                allowed_source_types: vec![
                    GoogleArticles,
                    YouTube,
                    Tweets,
                    RedditPosts,
                    TrustpilotPosts,
                ],
                source_labels: labels(&[
                    "Google Articles",
                    "YouTube Transcripts",
                    "YouTube Comments",
                    "Twitter Posts",
                    "Reddit Posts",
                    "Trustpilot Reviews",
                ]),
                instruction:
                    "Be exhaustive: include niche and emerging complaints and cite every source."
                        .into(),
            },
        }
    }
}

impl PlanTable {
    pub fn get(&self, tier: PlanTier) -> &PlanConfig {
        match tier {
            PlanTier::Free => &self.free,
            PlanTier::Pro => &self.pro,
            PlanTier::Max => &self.max,
        }
    }

    /// Resolve a raw plan string (case-insensitive, default `free`).
    pub fn resolve(&self, raw: Option<&str>) -> (PlanTier, &PlanConfig) {
        let tier = PlanTier::parse_or_default(raw);
        (tier, self.get(tier))
    }

    /// Load a table from a TOML file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading plan table from {}", path.display()))?;
        let table: PlanTable = toml::from_str(&content)
            .with_context(|| format!("parsing plan table {}", path.display()))?;
        table.validate()?;
        Ok(table)
    }

    /// Env var, then the default path, then built-in defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PLANS_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(anyhow!("{ENV_PLANS_CONFIG_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_PLANS_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from_file(&default_p);
        }
        Ok(Self::default())
    }

    /// Every tier needs a positive cap, at least one platform, and labels
    /// that classify into its allowed platforms.
    pub fn validate(&self) -> Result<()> {
        for tier in [PlanTier::Free, PlanTier::Pro, PlanTier::Max] {
            let cfg = self.get(tier);
            if cfg.max_issues == 0 {
                bail!("plan {tier}: max_issues must be positive");
            }
            if cfg.allowed_source_types.is_empty() {
                bail!("plan {tier}: allowed_source_types is empty");
            }
            for label in &cfg.source_labels {
                match resolve(label) {
                    Some(st) if cfg.allowed_source_types.contains(&st) => {}
                    _ => bail!("plan {tier}: source label '{label}' is not an allowed platform"),
                }
            }
        }
        Ok(())
    }
}
