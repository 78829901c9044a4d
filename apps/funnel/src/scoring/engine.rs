//! Keyword scoring engine — the deterministic qualification gate.
//!
//! `score_job` is a pure function: identical inputs always yield an
//! identical `ScoringResult`. Each template is evaluated independently and
//! the highest-scoring result wins; ties keep the first template evaluated.

use serde::{Deserialize, Serialize};

use crate::scoring::templates::{CompiledKeyword, CompiledTemplate, TemplateSet};

/// Outcome of scoring one posting against the configured templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Total weighted score, floored at zero.
    pub score: i32,
    pub matched_triggers: Vec<String>,
    pub matched_support: Vec<String>,
    pub matched_negative: Vec<String>,
    pub passed: bool,
    pub template_name: String,
}

impl ScoringResult {
    /// The zero/failed result returned when no templates are configured.
    fn none() -> Self {
        Self {
            score: 0,
            matched_triggers: Vec::new(),
            matched_support: Vec::new(),
            matched_negative: Vec::new(),
            passed: false,
            template_name: "none".to_string(),
        }
    }
}

/// Scores a posting against every template and keeps the best result.
pub fn score_job(title: &str, description: &str, set: &TemplateSet) -> ScoringResult {
    score_templates(title, description, set, None)
}

/// Scores a posting against a single named template.
pub fn score_with_template(
    title: &str,
    description: &str,
    set: &TemplateSet,
    template_name: &str,
) -> ScoringResult {
    score_templates(title, description, set, Some(template_name))
}

fn score_templates(
    title: &str,
    description: &str,
    set: &TemplateSet,
    only: Option<&str>,
) -> ScoringResult {
    let title_lower = title.to_lowercase();
    let desc_lower = description.to_lowercase();
    let combined_lower = format!("{title_lower}\n{desc_lower}");

    let mut best: Option<ScoringResult> = None;

    for compiled in &set.templates {
        if let Some(name) = only {
            if compiled.template.name != name {
                continue;
            }
        }

        let result = score_one(compiled, set, &title_lower, &desc_lower, &combined_lower);

        // Strictly greater, so ties keep the first evaluated template.
        match &best {
            Some(b) if result.score <= b.score => {}
            _ => best = Some(result),
        }
    }

    best.unwrap_or_else(ScoringResult::none)
}

fn score_one(
    compiled: &CompiledTemplate,
    set: &TemplateSet,
    title_lower: &str,
    desc_lower: &str,
    combined_lower: &str,
) -> ScoringResult {
    let template = &compiled.template;

    let title_triggers = find_matches(&compiled.triggers, title_lower);
    let all_triggers = union_matches(&compiled.triggers, title_lower, desc_lower);
    let all_support = union_matches(&compiled.support, title_lower, desc_lower);
    let all_negative = find_matches(&compiled.negative, combined_lower);

    let trigger_score = all_triggers.len() as i32 * template.trigger_weight
        + title_bonus(
            title_triggers.len(),
            template.trigger_weight,
            set.config.title_bonus_multiplier,
        );
    let support_score = all_support.len() as i32 * template.support_weight;
    let negative_score = all_negative.len() as i32 * template.negative_weight;

    let total = (trigger_score + support_score + negative_score).max(0);

    let passed = all_triggers.len() >= set.config.min_triggers && total >= set.config.min_score;

    ScoringResult {
        score: total,
        matched_triggers: all_triggers,
        matched_support: all_support,
        matched_negative: all_negative,
        passed,
        template_name: template.name.clone(),
    }
}

/// Extra score for trigger keywords found in the title. With the default
/// 1.5 multiplier a title hit is worth half a trigger weight on top of the
/// normal distinct-count score. Truncates toward zero like the reference.
fn title_bonus(title_hits: usize, trigger_weight: i32, multiplier: f32) -> i32 {
    (title_hits as f32 * trigger_weight as f32 * (multiplier - 1.0)) as i32
}

fn find_matches(keywords: &[CompiledKeyword], text_lower: &str) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| k.matches(text_lower))
        .map(|k| k.keyword.clone())
        .collect()
}

/// Distinct keywords matched in either the title or the description,
/// in template keyword order.
fn union_matches(keywords: &[CompiledKeyword], title_lower: &str, desc_lower: &str) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| k.matches(title_lower) || k.matches(desc_lower))
        .map(|k| k.keyword.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::templates::{ScoringConfig, ScoringTemplate};

    fn template(name: &str, triggers: &[&str], support: &[&str], negative: &[&str]) -> ScoringTemplate {
        ScoringTemplate {
            name: name.to_string(),
            trigger_keywords: triggers.iter().map(|s| s.to_string()).collect(),
            support_keywords: support.iter().map(|s| s.to_string()).collect(),
            negative_keywords: negative.iter().map(|s| s.to_string()).collect(),
            trigger_weight: 10,
            support_weight: 4,
            negative_weight: -15,
        }
    }

    fn set_with(templates: Vec<ScoringTemplate>, min_score: i32, min_triggers: usize) -> TemplateSet {
        TemplateSet::compile(
            templates,
            ScoringConfig {
                min_score,
                min_triggers,
                title_bonus_multiplier: 1.5,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let set = set_with(
            vec![template("sec", &["security", "vulnerability"], &["siem"], &[])],
            20,
            1,
        );
        let a = score_job("Security Engineer", "vulnerability work with SIEM", &set);
        let b = score_job("Security Engineer", "vulnerability work with SIEM", &set);
        assert_eq!(a, b);
    }

    #[test]
    fn test_whole_word_matching_ignores_substrings() {
        let set = set_with(vec![template("lang", &["go"], &[], &[])], 0, 1);
        let result = score_job("Backend Developer", "we use go and golang", &set);
        // "go" matches once as a word, never inside "golang"
        assert_eq!(result.matched_triggers, vec!["go".to_string()]);
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_negative_keywords_floor_at_zero() {
        let set = set_with(
            vec![template("sec", &["security"], &[], &["sales", "recruiter", "intern"])],
            30,
            1,
        );
        let result = score_job(
            "Sales Role",
            "security sales recruiter intern position",
            &set,
        );
        // 10 - 45 would be negative; floored to 0
        assert_eq!(result.score, 0);
        assert!(!result.passed);
        assert_eq!(result.matched_negative.len(), 3);
    }

    #[test]
    fn test_min_trigger_gate_blocks_support_heavy_postings() {
        let mut t = template(
            "sec",
            &["security engineer"],
            &["siem", "splunk", "nessus", "qualys", "azure", "aws"],
            &[],
        );
        t.support_weight = 10;
        let set = set_with(vec![t], 30, 2);
        let result = score_job(
            "Platform Role",
            "security engineer siem splunk nessus qualys azure aws",
            &set,
        );
        assert!(result.score > 30, "nominal total is above min_score");
        assert!(!result.passed, "one trigger cannot satisfy min_triggers=2");
    }

    #[test]
    fn test_title_bonus_added_for_title_triggers() {
        let set = set_with(vec![template("sec", &["security engineer"], &[], &[])], 0, 1);
        let in_title = score_job("Security Engineer", "", &set);
        let in_desc = score_job("Open Role", "security engineer wanted", &set);
        // 10 + int(1 * 10 * 0.5) = 15 vs plain 10
        assert_eq!(in_title.score, 15);
        assert_eq!(in_desc.score, 10);
    }

    #[test]
    fn test_trigger_counted_once_across_title_and_description() {
        let set = set_with(vec![template("sec", &["security"], &[], &[])], 0, 1);
        let result = score_job("Security Lead", "security security security", &set);
        // distinct count 1, title bonus 5
        assert_eq!(result.score, 15);
        assert_eq!(result.matched_triggers.len(), 1);
    }

    #[test]
    fn test_best_template_wins() {
        let set = set_with(
            vec![
                template("weak", &["security"], &[], &[]),
                template("strong", &["security", "vulnerability"], &[], &[]),
            ],
            0,
            1,
        );
        let result = score_job("Role", "security and vulnerability management", &set);
        assert_eq!(result.template_name, "strong");
        assert_eq!(result.score, 20);
    }

    #[test]
    fn test_tie_keeps_first_template_in_config_order() {
        let set = set_with(
            vec![
                template("alpha", &["security"], &[], &[]),
                template("beta", &["security"], &[], &[]),
            ],
            0,
            1,
        );
        let result = score_job("Role", "security work", &set);
        assert_eq!(result.template_name, "alpha");
    }

    #[test]
    fn test_no_templates_returns_none_result() {
        let set = set_with(vec![], 30, 2);
        let result = score_job("Security Engineer", "anything", &set);
        assert_eq!(result.template_name, "none");
        assert_eq!(result.score, 0);
        assert!(!result.passed);
    }

    #[test]
    fn test_score_with_named_template_ignores_others() {
        let set = set_with(
            vec![
                template("sec", &["security"], &[], &[]),
                template("net", &["network"], &[], &[]),
            ],
            0,
            1,
        );
        let result = score_with_template("Role", "network security", &set, "net");
        assert_eq!(result.template_name, "net");
        assert_eq!(result.matched_triggers, vec!["network".to_string()]);
    }

    #[test]
    fn test_security_engineer_scenario() {
        let set = set_with(
            vec![template(
                "security",
                &["security engineer", "vulnerability"],
                &["siem", "nessus"],
                &[],
            )],
            20,
            2,
        );
        let result = score_job(
            "Security Engineer",
            "Operate the SIEM, drive vulnerability remediation with Nessus scans.",
            &set,
        );
        assert_eq!(
            result.matched_triggers,
            vec!["security engineer".to_string(), "vulnerability".to_string()]
        );
        assert_eq!(result.matched_support.len(), 2);
        // triggers: 2*10 = 20, title bonus int(1*10*0.5)=5, support 2*4=8
        assert_eq!(result.score, 33);
        assert!(result.passed);
    }
}
