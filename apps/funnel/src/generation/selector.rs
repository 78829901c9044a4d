//! Document variant selection — picks which resume variant to tailor for a
//! posting by keyword-scoring the variants against the posting text, with
//! the same whole-word matching discipline as the scoring engine.

use serde::Deserialize;
use std::path::Path;

use crate::errors::FunnelError;
use crate::scoring::templates::CompiledKeyword;

#[derive(Debug, Clone, Deserialize)]
pub struct VariantConfig {
    pub name: String,
    /// Template file the renderer starts from.
    pub template: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// The fallback variant when no keywords match anywhere.
    #[serde(default)]
    pub canonical: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentVariant {
    pub config: VariantConfig,
    keywords: Vec<CompiledKeyword>,
}

impl DocumentVariant {
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// All configured document variants, in file order.
#[derive(Debug, Clone)]
pub struct VariantSet {
    pub variants: Vec<DocumentVariant>,
}

#[derive(Debug, Deserialize)]
struct VariantsFile {
    #[serde(default)]
    variants: Vec<VariantConfig>,
}

impl VariantSet {
    /// Variants live in the same TOML file as the scoring templates.
    pub fn load(path: &Path) -> Result<Self, FunnelError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FunnelError::Config(format!("cannot read variants file {}: {e}", path.display()))
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, FunnelError> {
        let file: VariantsFile = toml::from_str(raw)
            .map_err(|e| FunnelError::Config(format!("invalid variants file: {e}")))?;
        if file.variants.is_empty() {
            return Err(FunnelError::Config(
                "at least one document variant must be configured".to_string(),
            ));
        }
        let variants = file
            .variants
            .into_iter()
            .map(|config| {
                let keywords = config
                    .keywords
                    .iter()
                    .map(|k| CompiledKeyword::compile(k))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DocumentVariant { config, keywords })
            })
            .collect::<Result<Vec<_>, FunnelError>>()?;
        Ok(Self { variants })
    }

    fn canonical(&self) -> &DocumentVariant {
        self.variants
            .iter()
            .find(|v| v.config.canonical)
            .unwrap_or(&self.variants[0])
    }
}

/// Selects the best variant for a posting. Title hits count 3, description
/// hits count 1. A zero-score tie falls back to the canonical variant.
pub fn select_variant<'a>(
    title: &str,
    description: &str,
    set: &'a VariantSet,
) -> &'a DocumentVariant {
    let title_lower = title.to_lowercase();
    let desc_lower = description.to_lowercase();

    let mut best: Option<(&DocumentVariant, i32)> = None;

    for variant in &set.variants {
        let mut score = 0;
        for keyword in &variant.keywords {
            if keyword.matches(&title_lower) {
                score += 3;
            } else if keyword.matches(&desc_lower) {
                score += 1;
            }
        }
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((variant, score)),
        }
    }

    match best {
        Some((variant, score)) if score > 0 => variant,
        _ => set.canonical(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> VariantSet {
        VariantSet::parse(
            r#"
            [[variants]]
            name = "leadership"
            template = "resume_leadership.md"
            keywords = ["ciso", "head of security", "security governance", "iso 27001"]
            canonical = true

            [[variants]]
            name = "technical"
            template = "resume_technical.md"
            keywords = ["security engineer", "vulnerability", "siem", "nessus"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_title_match_outweighs_description_match() {
        let set = set();
        // "security engineer" in title (3) beats "iso 27001" in description (1)
        let variant = select_variant(
            "Security Engineer",
            "familiarity with iso 27001 is a plus",
            &set,
        );
        assert_eq!(variant.name(), "technical");
    }

    #[test]
    fn test_zero_score_falls_back_to_canonical() {
        let set = set();
        let variant = select_variant("Gardener", "prune hedges and mow lawns", &set);
        assert_eq!(variant.name(), "leadership");
    }

    #[test]
    fn test_whole_word_discipline_applies() {
        let set = set();
        // "siem" must not match inside "siemens"
        let variant = select_variant("Plant Operator", "work with siemens controllers", &set);
        assert_eq!(variant.name(), "leadership");
    }

    #[test]
    fn test_description_matches_accumulate() {
        let set = set();
        let variant = select_variant(
            "Open Position",
            "run the siem, drive vulnerability scans with nessus",
            &set,
        );
        assert_eq!(variant.name(), "technical");
    }

    #[test]
    fn test_empty_variants_rejected() {
        assert!(VariantSet::parse("").is_err());
    }
}
