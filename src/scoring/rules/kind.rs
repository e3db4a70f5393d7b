//! Kind agreement between a definition and a section title, plus the
//! structural checks that can rule a section out entirely.

use crate::model::{strip_generics, Kind};
use crate::scoring::text::{self, pct};
use crate::scoring::{RuleOutcome, ScoringContext};

/// Blocking delta for the hard kind blockers; large enough to show in reasons.
const CRITICAL: f64 = -999.0;

pub fn strict_kind(ctx: &ScoringContext<'_>) -> RuleOutcome {
    match text::section_kind(ctx.section) {
        Some(expected) if expected != ctx.kind() => RuleOutcome::block(
            -1.0,
            format!(
                "STRICT kind mismatch: {} in {} section (blocked)",
                ctx.kind(),
                expected
            ),
        ),
        _ => RuleOutcome::none(),
    }
}

pub fn receiver_structure(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Method {
        return RuleOutcome::none();
    }
    let (Some(receiver), Some(valid)) = (
        ctx.definition.receiver(),
        ctx.lookups.valid_types(ctx.section),
    ) else {
        return RuleOutcome::none();
    };
    let mapped = strip_generics(ctx.tables.interface_for(receiver)).to_lowercase();
    if valid.contains(&mapped) {
        RuleOutcome::bonus(
            0.50,
            format!("Receiver type match (index structure): {} ({})", pct(0.50), receiver),
        )
    } else {
        RuleOutcome::block(
            -1.0,
            format!("Receiver type not allowed by section structure (blocked): {}", receiver),
        )
    }
}

pub fn kind_blockers(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let typeish = ctx.has("type");
    let reason = match ctx.kind() {
        Kind::Method if ctx.is_helper_section() => "Method in Helper Functions section",
        Kind::Method if typeish && !ctx.has("method") => "Method in Types section",
        Kind::Function if typeish && !ctx.has("function") => "Function in Types section",
        Kind::Type if ctx.is_helper_section() => "Type in Helper Functions section",
        Kind::Type if ctx.has("methods") && !typeish => "Type in Methods section",
        _ => return RuleOutcome::none(),
    };
    RuleOutcome::block(CRITICAL, format!("CRITICAL: {} - BLOCKED", reason))
}

pub fn error_section_conflict(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if !ctx.kind_conflict() {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(
        -0.5,
        format!("Non-error {} in Error Types section: {}", ctx.kind(), pct(-0.5)),
    )
}

pub fn kind_agreement(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind_conflict() {
        return RuleOutcome::none();
    }
    let matched = match ctx.kind() {
        Kind::Method => ctx.has("methods"),
        Kind::Function => ctx.is_helper_section(),
        Kind::Type => ctx.has("type"),
    };
    if !matched {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(0.20, format!("Kind {} matches section: {}", ctx.kind(), pct(0.20)))
}

pub fn current_section(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.definition.current_section.as_deref() != Some(ctx.section) {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(0.10, format!("Currently indexed here: {}", pct(0.10)))
}

pub fn function_type_interaction(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Function {
        return RuleOutcome::none();
    }
    let Some(valid) = ctx.lookups.valid_types(ctx.section) else {
        return RuleOutcome::none();
    };
    let mut shared: Vec<&str> = ctx
        .facts
        .function_types
        .iter()
        .filter(|t| valid.contains(*t))
        .map(String::as_str)
        .collect();
    if shared.is_empty() {
        return RuleOutcome::none();
    }
    shared.sort_unstable();
    RuleOutcome::bonus(
        0.60,
        format!("Function works with section type(s) {}: {}", shared.join(", "), pct(0.60)),
    )
}

pub fn exact_type_name(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Type {
        return RuleOutcome::none();
    }
    let leaf = text::leaf(&ctx.section_lower);
    if !text::contains_any(leaf, &[" type", " types", " structure", " struct"]) {
        return RuleOutcome::none();
    }
    let mapped: String = strip_generics(ctx.tables.interface_for(&ctx.definition.name))
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    let primary = text::section_primary_name(ctx.section);
    if primary.is_empty() || mapped != primary {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(0.60, format!("Exact type name match: {}", pct(0.60)))
}

pub fn implementation_mapping(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Type {
        return RuleOutcome::none();
    }
    if let Some(iface) = ctx.facts.implements.as_deref() {
        if names_interface(&ctx.section_lower, iface) {
            return RuleOutcome::bonus(
                0.40,
                format!("Implements {} (from prose): {}", iface, pct(0.40)),
            );
        }
    }
    let mapped = ctx.tables.interface_for(&ctx.definition.name);
    if mapped != ctx.definition.name && names_interface(&ctx.section_lower, mapped) {
        return RuleOutcome::bonus(
            0.30,
            format!("Implementation of {} interface: {}", mapped, pct(0.30)),
        );
    }
    RuleOutcome::none()
}

fn names_interface(section_lower: &str, iface: &str) -> bool {
    text::word_followed_by(section_lower, &iface.to_lowercase(), "interface")
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
    fn constructor_cannot_enter_type_definitions() {
        let def = Definition::new("NewWidget", Kind::Function, "api_widgets.md");
        let out = eval(strict_kind, &def, "1. Widgets > 1.1 Widget Type Definitions");
        assert!(out.blocking);
        assert!(!eval(strict_kind, &def, "1. Widgets > 1.2 Widget Helper Functions").blocking);
    }

    #[test]
    fn blockers_catch_methods_in_helper_sections() {
        let def = Definition::new("Cache.Get", Kind::Method, "api_caching.md");
        let out = eval(kind_blockers, &def, "1. Cache > 1.3 Cache Helper Functions");
        assert!(out.blocking);
        assert_eq!(out.reasons, vec!["CRITICAL: Method in Helper Functions section - BLOCKED"]);
    }

    #[test]
    fn interface_implementation_matches_section() {
        let def = Definition::new("filePackage", Kind::Type, "api_core.md");
        let out = eval(implementation_mapping, &def, "1. Core > 1.1 Package Interface");
        assert!((out.delta - 0.30).abs() < 1e-9);
    }

    #[test]
    fn exact_name_needs_type_leaf() {
        let def = Definition::new("FileEntry", Kind::Type, "api_file_mgmt.md");
        let out = eval(exact_type_name, &def, "2. FileEntry > 2.1 FileEntry Methods");
        assert!(out.is_empty());
        let out = eval(exact_type_name, &def, "2. FileEntry > 2.1 FileEntry Types");
        assert!((out.delta - 0.60).abs() < 1e-9);
    }

    #[test]
    fn error_types_section_penalizes_plain_types() {
        let def = Definition::new("Widget", Kind::Type, "api_widgets.md");
        let out = eval(error_section_conflict, &def, "9. Error Types");
        assert!((out.delta + 0.5).abs() < 1e-9);
        assert!(eval(kind_agreement, &def, "9. Error Types").is_empty());
    }
}
