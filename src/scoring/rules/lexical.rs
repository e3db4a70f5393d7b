//! Word overlap between where a definition was written and the section title.

use std::collections::HashSet;

use crate::model::Kind;
use crate::scoring::text::{self, pct};
use crate::scoring::{RuleOutcome, ScoringContext};

pub fn heading_match(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let heading = text::strip_number(&ctx.heading_lower).trim().to_string();
    if heading.is_empty() {
        return RuleOutcome::none();
    }

    let signing_mismatch = heading.contains("signature")
        && !ctx.has_any(&["signature", "sign"])
        && ctx.kind() == Kind::Method
        && ctx.name_lower.contains("file");
    let encryption_mismatch = text::contains_any(&heading, &["encryption", "encrypt"])
        && !ctx.has_any(&["encryption", "encrypt"])
        && ctx.name_lower.contains("file")
        && !ctx.has("file");
    if signing_mismatch || encryption_mismatch {
        return RuleOutcome::bonus(
            -0.20,
            format!("Heading domain differs from section: {}", pct(-0.20)),
        );
    }

    let section_text = ctx.section_text();
    if section_text.contains(&heading) || heading.contains(&section_text) {
        return RuleOutcome::bonus(0.20, format!("Heading matches section: {}", pct(0.20)));
    }

    match ctx.facts.heading_keywords.iter().find(|k| ctx.has(k)) {
        Some(keyword) => RuleOutcome::bonus(
            0.15,
            format!("Heading keyword '{}' in section: {}", keyword, pct(0.15)),
        ),
        None => RuleOutcome::none(),
    }
}

/// camelCase words of the receiver (or type) that the section's own title uses.
pub fn camelcase_overlap(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let source = match ctx.kind() {
        Kind::Method => match ctx.definition.receiver() {
            Some(receiver) => receiver,
            None => return RuleOutcome::none(),
        },
        _ => ctx.tables.interface_for(&ctx.definition.name),
    };
    let tokens = text::leaf_tokens(ctx.section);
    let mut seen = HashSet::new();
    let matches: Vec<String> = text::camel_words(source)
        .into_iter()
        .filter(|w| w.len() >= 4 && tokens.contains(w) && seen.insert(w.clone()))
        .collect();
    if matches.is_empty() {
        return RuleOutcome::none();
    }
    let weight = (0.15 * matches.len() as f64).min(0.30);
    RuleOutcome::bonus(
        weight,
        format!("Name words {} in section title: {}", matches.join(", "), pct(weight)),
    )
}

pub fn parent_heading(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let Some(parent) = ctx.definition.parent_heading.as_deref() else {
        return RuleOutcome::none();
    };
    let parent = text::strip_number(&parent.to_lowercase()).trim().to_string();
    if parent.is_empty() {
        return RuleOutcome::none();
    }
    let section_text = ctx.section_text();
    if ctx.has(&parent) || parent.contains(&section_text) {
        return RuleOutcome::bonus(0.15, format!("Parent heading matches section: {}", pct(0.15)));
    }
    if text::contains_any(&parent, &["path metadata", "pathmetadata", "metadata"]) && ctx.has("metadata") {
        return RuleOutcome::bonus(
            0.15,
            format!("Parent heading is metadata related: {}", pct(0.15)),
        );
    }
    RuleOutcome::none()
}

pub fn prose_keywords(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let kind_words = &ctx.tables.kind_words;
    let hit = ctx
        .facts
        .prose_keywords
        .iter()
        .take(5)
        .filter(|w| !kind_words.contains(w))
        .find(|w| ctx.has(w));
    match hit {
        Some(word) => RuleOutcome::bonus(
            0.15,
            format!("Prose keyword '{}' in section: {}", word, pct(0.15)),
        ),
        None => RuleOutcome::none(),
    }
}

/// Domain words in the name that a well-known top-level section spells out.
pub fn content_keywords(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let mut out = RuleOutcome::none();
    let hits = ctx
        .tables
        .content_keywords
        .iter()
        .filter(|k| ctx.name_lower.contains(k.keyword.as_str()) && ctx.has_any(&k.sections))
        .take(2);
    for hit in hits {
        out.add(0.05, format!("Name keyword '{}' in section: {}", hit.keyword, pct(0.05)));
    }
    out
}

/// Subsection subject words found in the name, else the heading, else the prose.
pub fn subsection_keywords(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let keywords = text::subsection_keywords(ctx.section, ctx.tables);
    if keywords.is_empty() {
        return RuleOutcome::none();
    }
    let words = &ctx.tables.subsection;
    let ambiguous = |k: &str| words.ambiguous.iter().any(|w| w == k);
    let guarded =
        |k: &str| words.domain_guarded.iter().any(|w| w == k) && !ctx.name_lower.contains(k);
    let method = ctx.method_lower();

    let mut out = RuleOutcome::none();
    for keyword in keywords
        .iter()
        .filter(|k| !ambiguous(k.as_str()) && ctx.name_lower.contains(k.as_str()))
        .take(2)
    {
        let weight = if method.contains(keyword.as_str()) { 0.30 } else { 0.20 };
        out.add(weight, format!("Subsection keyword '{}' in name: {}", keyword, pct(weight)));
    }
    if !out.is_empty() {
        return out;
    }

    let eligible: Vec<&String> = keywords
        .iter()
        .filter(|k| !ambiguous(k.as_str()) && !guarded(k.as_str()))
        .collect();
    if let Some(keyword) = eligible.iter().find(|k| ctx.heading_lower.contains(k.as_str())) {
        return RuleOutcome::bonus(
            0.10,
            format!("Subsection keyword '{}' in heading: {}", keyword, pct(0.10)),
        );
    }
    if let Some(keyword) = eligible.iter().find(|k| ctx.prose_lower.contains(k.as_str())) {
        return RuleOutcome::bonus(
            0.05,
            format!("Subsection keyword '{}' in prose: {}", keyword, pct(0.05)),
        );
    }
    RuleOutcome::none()
}

/// Source document name against the sections that document usually feeds.
pub fn file_patterns(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let tokens = text::file_tokens(&ctx.definition.origin);
    let leaf = text::strip_number(text::leaf(&ctx.section_lower));
    if leaf.is_empty() {
        return RuleOutcome::none();
    }
    for rule in &ctx.tables.file_sections {
        if !text::tokens_contain_sequence(&tokens, &text::file_tokens(&rule.pattern)) {
            continue;
        }
        let hit = rule.sections.iter().find(|s| {
            let s = s.to_lowercase();
            leaf.contains(&s) || s.contains(&leaf)
        });
        if let Some(section) = hit {
            return RuleOutcome::bonus(
                0.15,
                format!(
                    "Document '{}' feeds '{}': {}",
                    ctx.definition.origin,
                    section,
                    pct(0.15)
                ),
            );
        }
    }
    RuleOutcome::none()
}
