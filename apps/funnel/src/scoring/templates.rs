//! Scoring templates — named keyword rule sets loaded once from TOML.
//!
//! Templates are immutable during a run. Keyword regexes are compiled at
//! load time so the scorer itself stays allocation-light and deterministic.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::errors::FunnelError;

/// Global qualification thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum total score required to qualify.
    pub min_score: i32,
    /// Minimum distinct trigger keyword count required to qualify.
    pub min_triggers: usize,
    /// Multiplier applied to trigger keywords matched in the title.
    /// 1.5 means a title hit is worth one and a half description hits.
    pub title_bonus_multiplier: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: 30,
            min_triggers: 2,
            title_bonus_multiplier: 1.5,
        }
    }
}

/// A named rule set of trigger, support, and negative keywords with weights.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringTemplate {
    pub name: String,
    #[serde(default)]
    pub trigger_keywords: Vec<String>,
    #[serde(default)]
    pub support_keywords: Vec<String>,
    #[serde(default)]
    pub negative_keywords: Vec<String>,
    #[serde(default = "default_trigger_weight")]
    pub trigger_weight: i32,
    #[serde(default = "default_support_weight")]
    pub support_weight: i32,
    #[serde(default = "default_negative_weight")]
    pub negative_weight: i32,
}

fn default_trigger_weight() -> i32 {
    10
}

fn default_support_weight() -> i32 {
    4
}

fn default_negative_weight() -> i32 {
    -15
}

/// A template with its keyword patterns compiled for whole-word matching.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub template: ScoringTemplate,
    pub triggers: Vec<CompiledKeyword>,
    pub support: Vec<CompiledKeyword>,
    pub negative: Vec<CompiledKeyword>,
}

/// A keyword and its word-boundary-anchored, case-insensitive pattern.
#[derive(Debug, Clone)]
pub struct CompiledKeyword {
    pub keyword: String,
    pattern: Regex,
}

impl CompiledKeyword {
    pub fn compile(keyword: &str) -> Result<Self, FunnelError> {
        let escaped = regex::escape(keyword.trim().to_lowercase().as_str());
        let pattern = Regex::new(&format!(r"\b{escaped}\b"))
            .map_err(|e| FunnelError::Config(format!("bad keyword '{keyword}': {e}")))?;
        Ok(Self {
            keyword: keyword.to_string(),
            pattern,
        })
    }

    /// Whole-word match against already-lowercased text.
    pub fn matches(&self, text_lower: &str) -> bool {
        self.pattern.is_match(text_lower)
    }
}

fn compile_all(keywords: &[String]) -> Result<Vec<CompiledKeyword>, FunnelError> {
    keywords.iter().map(|k| CompiledKeyword::compile(k)).collect()
}

/// All configured templates plus the global thresholds, in file order.
/// Ties between templates keep the first evaluated, so order matters.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    pub templates: Vec<CompiledTemplate>,
    pub config: ScoringConfig,
}

#[derive(Debug, Deserialize)]
struct TemplatesFile {
    #[serde(default)]
    scoring: ScoringConfig,
    #[serde(default)]
    templates: Vec<ScoringTemplate>,
}

impl TemplateSet {
    pub fn load(path: &Path) -> Result<Self, FunnelError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FunnelError::Config(format!("cannot read templates file {}: {e}", path.display()))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, FunnelError> {
        let file: TemplatesFile = toml::from_str(raw)
            .map_err(|e| FunnelError::Config(format!("invalid templates file: {e}")))?;
        Self::compile(file.templates, file.scoring)
    }

    pub fn compile(
        templates: Vec<ScoringTemplate>,
        config: ScoringConfig,
    ) -> Result<Self, FunnelError> {
        let templates = templates
            .into_iter()
            .map(|t| {
                Ok(CompiledTemplate {
                    triggers: compile_all(&t.trigger_keywords)?,
                    support: compile_all(&t.support_keywords)?,
                    negative: compile_all(&t.negative_keywords)?,
                    template: t,
                })
            })
            .collect::<Result<Vec<_>, FunnelError>>()?;
        Ok(Self { templates, config })
    }
}
