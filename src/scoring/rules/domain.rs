use crate::model::Kind;
use crate::scoring::text::{self, pct};
use crate::scoring::{RuleOutcome, ScoringContext};

pub fn domain_affinity(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let Some(domain) = ctx.domain() else {
        return RuleOutcome::none();
    };
    let Some(affinity) = ctx.tables.affinity(domain) else {
        return RuleOutcome::none();
    };
    if !ctx.has_any(&affinity.sections) {
        return RuleOutcome::none();
    }
    let weight = match affinity.core_package_weight {
        Some(core) if text::is_core_package_type(ctx.definition, ctx.tables) => core,
        _ => affinity.weight,
    };
    RuleOutcome::bonus(
        weight,
        format!("Domain '{}' matches section: {}", domain, pct(weight)),
    )
}

fn is_error_function(name: &str) -> bool {
    (name.starts_with("as") && name.contains("error"))
        || (name.starts_with("get") && name.contains("error"))
        || (name.starts_with("add") && name.contains("error") && name.contains("context"))
        || (name.contains("error") && name.contains("map"))
}

/// Doc comment keywords against the keyword map, at the heading level that fits the kind.
pub fn comment_keywords(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind_conflict() {
        return RuleOutcome::none();
    }
    let level = text::section_level(ctx.section, ctx.kind());
    let (delta, reasons) =
        text::match_keywords_to_section(&ctx.facts.comment_keywords, level, ctx.tables);
    let mut out = RuleOutcome {
        delta,
        reasons,
        blocking: false,
    };
    if ctx.error_flags().helper && is_error_function(&ctx.name_lower) {
        out.add(0.25, format!("Error helper function in error helper section: {}", pct(0.25)));
    }
    out
}

pub fn type_name_suffix(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Type {
        return RuleOutcome::none();
    }
    let Some(rule) = ctx
        .tables
        .type_suffixes
        .iter()
        .find(|rule| ctx.name_lower.ends_with(rule.suffix.as_str()))
    else {
        return RuleOutcome::none();
    };
    if !ctx.has_any(&rule.sections) {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(
        rule.weight,
        format!("Type suffix '{}' fits section: {}", rule.suffix, pct(rule.weight)),
    )
}

/// Types in a "... Type Definitions" subsection whose subject word the name carries.
pub fn domain_type_subsection(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Type || !ctx.has("type") || !ctx.has("definition") {
        return RuleOutcome::none();
    }
    let keywords = text::subsection_keywords(ctx.section, ctx.tables);
    let Some(keyword) = keywords.iter().find(|k| ctx.name_lower.contains(k.as_str())) else {
        return RuleOutcome::none();
    };
    let in_domain = ctx
        .domain()
        .map(|d| ctx.tables.priority_keywords(d).iter().any(|k| k == keyword))
        .unwrap_or(false);
    let weight = if in_domain { 0.30 } else { 0.15 };
    RuleOutcome::bonus(
        weight,
        format!("Type subsection '{}' matches name: {}", keyword, pct(weight)),
    )
}

/// Domains the doc comment talks about, then the first plain comment word the section shares.
pub fn comment_domain(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let comment = &ctx.facts.comment;
    if comment.is_empty() {
        return RuleOutcome::none();
    }
    let domains: Vec<&str> = ctx
        .tables
        .priority_domains
        .iter()
        .filter(|d| text::contains_any_owned(comment, &d.keywords))
        .map(|d| d.domain.as_str())
        .collect();

    let mut out = RuleOutcome::none();
    if domains.contains(&"compression") && ctx.has("compression") {
        out.add(0.15, format!("Comment mentions compression: {}", pct(0.15)));
    }
    if domains.contains(&"encryption") && ctx.has_any(&["encryption", "security"]) {
        out.add(0.15, format!("Comment mentions encryption: {}", pct(0.15)));
    }
    if domains.contains(&"package") && ctx.has("package") {
        let weight = if text::is_core_package_type(ctx.definition, ctx.tables) {
            0.15
        } else {
            0.10
        };
        out.add(weight, format!("Comment mentions package: {}", pct(weight)));
    }

    let kind_words = &ctx.tables.kind_words;
    if let Some(word) = text::comment_words(comment)
        .into_iter()
        .filter(|w| !kind_words.iter().any(|k| k == w))
        .find(|w| ctx.has(w))
    {
        out.add(0.10, format!("Comment word '{}' in section: {}", word, pct(0.10)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Definition;
    use crate::scoring::{DefinitionFacts, SectionLookups};
    use crate::tables::ScoringTables;

    fn eval(
        rule: fn(&ScoringContext<'_>) -> RuleOutcome,
        def: &Definition,
        section: &str,
    ) -> RuleOutcome {
        let tables = ScoringTables::embedded().unwrap();
        let lookups = SectionLookups::default();
        let facts = DefinitionFacts::new(def, &tables);
        let ctx = ScoringContext::new(def, &facts, section, &tables, &lookups);
        rule(&ctx)
    }

    #[test]
    fn detected_domain_rewards_matching_section() {
        let def = Definition::new("BufferPool", Kind::Type, "api_streaming.md");
        let out = eval(domain_affinity, &def, "6. Streaming and Buffer Management");
        assert!((out.delta - 0.30).abs() < 1e-9);
        assert!(eval(domain_affinity, &def, "2. Compression").is_empty());
    }

    #[test]
    fn core_package_types_get_the_larger_package_bonus() {
        let def = Definition::new("PackageReader", Kind::Type, "api_core.md");
        let out = eval(domain_affinity, &def, "3. Package > 3.1 Package Types");
        assert_eq!(out.reasons, vec!["Domain 'package' matches section: +20%"]);
        let def = Definition::new("PackageStats", Kind::Type, "api_core.md");
        let out = eval(domain_affinity, &def, "3. Package > 3.1 Package Types");
        assert_eq!(out.reasons, vec!["Domain 'package' matches section: +10%"]);
    }

    #[test]
    fn comment_keywords_use_method_level_heading() {
        let mut def = Definition::new("Package.EncryptFile", Kind::Method, "api_core.md");
        def.doc_comment = "EncryptFile encrypts a file with AES.".into();
        let out = eval(
            comment_keywords,
            &def,
            "5. Security > 5.2 Encryption and Security Methods",
        );
        assert!(out.delta > 0.0);
        assert!(out.reasons.iter().any(|r| r.contains("'aes'")));
    }

    #[test]
    fn type_suffix_prefers_first_match() {
        let def = Definition::new("CompressionConfig", Kind::Type, "api_misc.md");
        let out = eval(type_name_suffix, &def, "4. Compression > 4.1 Compression Types");
        assert!((out.delta - 0.15).abs() < 1e-9);
    }

    #[test]
    fn comment_domain_adds_plain_word_match() {
        let mut def = Definition::new("Widget.Render", Kind::Method, "api_widgets.md");
        def.doc_comment = "Render draws the widget.".into();
        let out = eval(comment_domain, &def, "1. Widgets > 1.2 Widget Render Methods");
        assert_eq!(out.reasons, vec!["Comment word 'render' in section: +10%"]);
    }
}
