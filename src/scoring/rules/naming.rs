//! Conventions carried by the definition's own name.

use crate::model::Kind;
use crate::scoring::text::{self, pct};
use crate::scoring::{RuleOutcome, ScoringContext};

pub fn constructor(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Function {
        return RuleOutcome::none();
    }
    let Some(rest) = ctx.definition.name.strip_prefix("New") else {
        return RuleOutcome::none();
    };
    let rest = rest.to_lowercase();
    let mut out = RuleOutcome::none();
    if !rest.is_empty() && ctx.has(&rest) {
        out.add(0.25, format!("Constructor for '{}': {}", rest, pct(0.25)));
    }
    if ctx.is_helper_section() && ctx.has_any(&["constructor", "package"]) {
        out.add(0.15, format!("Constructor in helper functions: {}", pct(0.15)));
    }
    if rest.contains("package") && ctx.has("package") {
        out.add(0.20, format!("Package constructor: {}", pct(0.20)));
    }
    out
}

/// The first stem the method name contains decides; a section without that
/// stem's words gets nothing even if a later stem would have fit.
pub fn method_operation(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Method {
        return RuleOutcome::none();
    }
    let Some(pattern) = ctx.tables.method_pattern(&ctx.method_lower()) else {
        return RuleOutcome::none();
    };
    if !ctx.has_any(&pattern.sections) {
        return RuleOutcome::none();
    }
    let query = ctx.tables.query_stems.contains(&pattern.stem);
    let weight = if query && ctx.has_any(&ctx.tables.query_section_words) {
        0.25
    } else {
        0.15
    };
    RuleOutcome::bonus(
        weight,
        format!("Method '{}' operation fits section: {}", pattern.stem, pct(weight)),
    )
}

fn has_verb_prefix(method: &str, verbs: &[&str]) -> bool {
    verbs.iter().any(|verb| {
        method
            .strip_prefix(verb)
            .is_some_and(|rest| rest.chars().next().map_or(true, |c| c.is_uppercase()))
    })
}

/// Getters belong with query methods, mutators with transformation methods.
pub fn getter_transformation(ctx: &ScoringContext<'_>) -> RuleOutcome {
    let Some(method) = ctx.definition.method_part() else {
        return RuleOutcome::none();
    };
    if has_verb_prefix(method, &["Get", "Is", "Has"]) {
        if ctx.has("query methods") {
            return RuleOutcome::bonus(0.25, format!("Getter in query methods: {}", pct(0.25)));
        }
        if ctx.has("data methods") {
            return RuleOutcome::bonus(0.15, format!("Getter in data methods: {}", pct(0.15)));
        }
        if ctx.has("transformation methods") {
            return RuleOutcome::bonus(
                -0.25,
                format!("Getter in transformation methods: {}", pct(-0.25)),
            );
        }
    } else if has_verb_prefix(method, &["Add", "Update", "Set", "Remove", "Delete", "Modify"]) {
        if ctx.has("transformation methods") {
            return RuleOutcome::bonus(
                0.25,
                format!("Mutator in transformation methods: {}", pct(0.25)),
            );
        }
        if ctx.has_any(&["data methods", "query methods"]) {
            return RuleOutcome::bonus(
                -0.25,
                format!("Mutator outside transformation methods: {}", pct(-0.25)),
            );
        }
    }
    RuleOutcome::none()
}

pub fn method_name_preferences(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Method {
        return RuleOutcome::none();
    }
    let method = ctx.method_lower();
    let mut out = RuleOutcome::none();

    if method.contains("metadata") {
        if ctx.has("metadata") && !ctx.has("compression") {
            out.add(0.30, format!("Metadata method in metadata section: {}", pct(0.30)));
        } else if ctx.has("compression") && !ctx.has("metadata") {
            out.add(-0.30, format!("Metadata method in compression section: {}", pct(-0.30)));
        }
    }

    let getter = ["get", "is", "has"].iter().any(|p| method.starts_with(p));
    if ctx.has("compression") && getter && !method.contains("compress") {
        if ctx.has_any(&["information", "queries"]) {
            out.add(0.20, format!("Query method in compression queries: {}", pct(0.20)));
        } else if ctx.has("method") {
            out.add(
                -0.20,
                format!("Query method is not a compression operation: {}", pct(-0.20)),
            );
        }
    }
    out
}

/// `XxxErrorContext` types live with the error types unless a domain-specific error section exists.
pub fn error_context_type(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Type || !ctx.error_flags().section {
        return RuleOutcome::none();
    }
    let Some(stem) = ctx.name_lower.strip_suffix("errorcontext") else {
        return RuleOutcome::none();
    };
    let more_specific = ctx
        .tables
        .priority_domains
        .iter()
        .flat_map(|d| d.keywords.iter())
        .filter(|k| stem.contains(k.as_str()))
        .any(|k| {
            ctx.lookups.paths().iter().any(|p| {
                let p = p.to_lowercase();
                p != ctx.section_lower && p.contains(k.as_str()) && p.contains("error")
            })
        });
    if more_specific {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(0.35, format!("ErrorContext type in error types: {}", pct(0.35)))
}

pub fn hash_optional_types(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if !text::contains_any_owned(&ctx.name_lower, &ctx.tables.hash_optional_types)
        || !ctx.has("hash and optional data")
    {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(0.30, format!("Hash and optional data type: {}", pct(0.30)))
}

/// Tag helpers go to the metadata helper functions, unless they are FileEntry tag helpers
/// and the index has a FileEntry helper section for them.
pub fn metadata_tag_helpers(ctx: &ScoringContext<'_>) -> RuleOutcome {
    if ctx.kind() != Kind::Function
        || !ctx.name_lower.contains("tag")
        || !ctx.is_helper_section()
        || !ctx.has("metadata")
    {
        return RuleOutcome::none();
    }
    if ctx.name_lower.contains("fileentry")
        && ctx.lookups.paths().iter().any(|p| {
            let p = p.to_lowercase();
            p.contains("fileentry") && p.contains("helper function")
        })
    {
        return RuleOutcome::none();
    }
    RuleOutcome::bonus(0.30, format!("Tag helper in metadata helpers: {}", pct(0.30)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::parse;
    use crate::model::Definition;
    use crate::scoring::{DefinitionFacts, SectionLookups};
    use crate::tables::ScoringTables;

    fn eval_with(
        rule: fn(&ScoringContext<'_>) -> RuleOutcome,
        def: &Definition,
        section: &str,
        lookups: &SectionLookups,
    ) -> RuleOutcome {
        let tables = ScoringTables::embedded().unwrap();
        let facts = DefinitionFacts::new(def, &tables);
        let ctx = ScoringContext::new(def, &facts, section, &tables, lookups);
        rule(&ctx)
    }

    fn eval(
        rule: fn(&ScoringContext<'_>) -> RuleOutcome,
        def: &Definition,
        section: &str,
    ) -> RuleOutcome {
        eval_with(rule, def, section, &SectionLookups::default())
    }

    #[test]
    fn constructor_matches_subject_in_section() {
        let def = Definition::new("NewWidget", Kind::Function, "api_widgets.md");
        let out = eval(constructor, &def, "1. Widgets > 1.2 Widget Helper Functions");
        assert!((out.delta - 0.25).abs() < 1e-9);
        assert!(eval(constructor, &def, "2. Gadgets > 2.2 Gadget Helper Functions").is_empty());
    }

    #[test]
    fn getter_pattern_prefers_query_sections() {
        let def = Definition::new("Cache.Get", Kind::Method, "api_caching.md");
        let out = eval(method_operation, &def, "1. Cache > 1.2 Cache Query Methods");
        assert!((out.delta - 0.25).abs() < 1e-9);
        assert!(eval(method_operation, &def, "1. Cache > 1.1 Cache Methods").is_empty());

        let out = eval(getter_transformation, &def, "1. Cache > 1.2 Cache Query Methods");
        assert!((out.delta - 0.25).abs() < 1e-9);
    }

    #[test]
    fn first_contained_stem_decides_the_operation() {
        let def = Definition::new("Store.ListKeys", Kind::Method, "api_store.md");
        let out = eval(method_operation, &def, "1. Store > 1.3 Store Validation Methods");
        assert_eq!(out.reasons, vec!["Method 'is' operation fits section: +15%"]);

        let def = Definition::new("Archive.GetCompressed", Kind::Method, "api_archive.md");
        assert!(eval(method_operation, &def, "2. Archive > 2.2 Archive Compression Methods").is_empty());
        let def = Definition::new("Archive.Flush", Kind::Method, "api_archive.md");
        assert!(eval(method_operation, &def, "2. Archive > 2.1 Archive Query Methods").is_empty());
    }

    #[test]
    fn mutators_are_pushed_out_of_query_sections() {
        let def = Definition::new("FileEntry.SetTag", Kind::Method, "api_file_mgmt.md");
        let out = eval(getter_transformation, &def, "2. FileEntry > 2.3 FileEntry Query Methods");
        assert!((out.delta + 0.25).abs() < 1e-9);
        let def = Definition::new("FileEntry.Settle", Kind::Method, "api_file_mgmt.md");
        assert!(eval(getter_transformation, &def, "2. FileEntry > 2.3 FileEntry Query Methods").is_empty());
    }

    #[test]
    fn error_context_defers_to_domain_error_section() {
        let def = Definition::new("CompressionErrorContext", Kind::Type, "api_misc.md");
        let out = eval(error_context_type, &def, "13. Error Types");
        assert!((out.delta - 0.35).abs() < 1e-9);

        let doc = "# I\n\n## 4. Compression Error Types\n\n## 13. Error Types\n";
        let lookups = SectionLookups::from_tree(&parse(doc).unwrap());
        assert!(eval_with(error_context_type, &def, "13. Error Types", &lookups).is_empty());
    }

    #[test]
    fn metadata_preference_cuts_both_ways() {
        let def = Definition::new("Package.GetMetadata", Kind::Method, "api_core.md");
        let out = eval(method_name_preferences, &def, "3. Package > 3.6 Package Metadata Methods");
        assert!((out.delta - 0.30).abs() < 1e-9);
        let out = eval(method_name_preferences, &def, "4. Compression > 4.2 Compression Methods");
        assert!((out.delta + 0.50).abs() < 1e-9, "{:?}", out);
    }
}
