use crate::model::Kind;
use crate::scoring::text::{self, pct};
use crate::scoring::{RuleOutcome, ScoringContext};

/// Domain types scored against operation sections while a matching type definitions section exists.
pub fn type_operation(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Type || ctx.has("type definition") {
        return RuleOutcome::none();
    }
    let Some(domain) = ctx
        .tables
        .type_domains
        .iter()
        .find(|d| ctx.name_lower.contains(d.needle.as_str()))
        .map(|d| d.domain.as_str())
    else {
        return RuleOutcome::none();
    };
    let home = ctx.lookups.paths().iter().find(|p| {
        let p = p.to_lowercase();
        p.contains("type definition") && p.contains(domain)
    });
    match home {
        Some(home) => RuleOutcome::bonus(
            -0.40,
            format!("{} type belongs in '{}': {}", domain, home, pct(-0.40)),
        ),
        None => RuleOutcome::none(),
    }
}

/// Error types scored outside the error section while one exists.
pub fn misplaced_error_type(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let flags = ctx.error_flags();
    if ctx.kind() != Kind::Type || !flags.definition || flags.section || flags.helper {
        return RuleOutcome::none();
    }
    let error_section_exists = ctx.lookups.paths().iter().any(|p| {
        let p = p.to_lowercase();
        text::error_flags(&p, &ctx.name_lower, Kind::Type).section
    });
    if !error_section_exists {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(-0.10, format!("Error type outside error section: {}", pct(-0.10)))
}

pub fn error_domain(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let flags = ctx.error_flags();
    if !flags.section || !flags.definition {
        return RuleOutcome::none();
    }
    match text::error_domain(&ctx.definition.name, ctx.tables) {
        Some(domain) if ctx.has(domain) => RuleOutcome::bonus(
            0.15,
            format!("Error domain '{}' matches section: {}", domain, pct(0.15)),
        ),
        _ => RuleOutcome::none(),
    }
}

/// Coarse kind-to-section vocabulary, with penalties for the common misfits.
pub fn kind_section_map(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let in_type_definitions = ctx.has("type definition");
    match ctx.kind() {
        Kind::Method if in_type_definitions => {
            return RuleOutcome::bonus(-0.30, format!("Method in type definitions: {}", pct(-0.30)))
        }
        Kind::Function if in_type_definitions => {
            return RuleOutcome::bonus(
                -0.50,
                format!("Function in type definitions: {}", pct(-0.50)),
            )
        }
        Kind::Type if ctx.has("method") && !ctx.has("type") => {
            return RuleOutcome::bonus(-0.30, format!("Type in methods section: {}", pct(-0.30)))
        }
        _ => {}
    }
    if ctx.kind_conflict() {
        return RuleOutcome::none();
    }

    let sections = &ctx.tables.kind_sections;
    let vocabulary = match ctx.kind() {
        Kind::Type => &sections.types,
        Kind::Method => &sections.methods,
        Kind::Function => &sections.functions,
    };
    if !ctx.has_any(vocabulary) {
        return RuleOutcome::none();
    }
    let weight = if ctx.kind() == Kind::Type && in_type_definitions {
        0.20
    } else {
        0.15
    };
    RuleOutcome::bonus(
        weight,
        format!("{} fits section vocabulary: {}", ctx.kind(), pct(weight)),
    )
}
