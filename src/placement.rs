//! Choosing one index section per definition.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::index::{Entry, IndexTree};
use crate::model::{Definition, Placement};
use crate::scoring::{score_section, DefinitionFacts, ScoringContext, SectionLookups, SectionScore};
use crate::tables::ScoringTables;

/// Scores closer than this are a tie.
const TIE_EPSILON: f64 = 1e-9;

/// Score `def` against every section of `tree` and pick the winner.
///
/// A winning score at or below `threshold` leaves the placement unresolved;
/// the best candidate is still recorded for the report.
pub fn place(
    def: &Definition,
    tree: &IndexTree,
    lookups: &SectionLookups,
    tables: &ScoringTables,
    threshold: f64,
) -> Placement {
    let facts = DefinitionFacts::new(def, tables);
    let mut best: Option<SectionScore> = None;

    for path in tree.paths() {
        let ctx = ScoringContext::new(def, &facts, path, tables, lookups);
        let score = score_section(&ctx);
        if score.blocked {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) => compare(&score, current, def.current_section.as_deref()).is_gt(),
        };
        if better {
            best = Some(score);
        }
    }

    match best {
        Some(best) if best.score > threshold => {
            log::debug!("{} -> {} ({:.2})", def.name, best.section, best.score);
            Placement {
                section: Some(best.section.clone()),
                best_candidate: Some(best.section),
                confidence: best.score,
                reasoning: best.reasons,
            }
        }
        Some(best) => {
            log::debug!(
                "{} unresolved, best {} ({:.2})",
                def.name,
                best.section,
                best.score
            );
            Placement {
                section: None,
                best_candidate: Some(best.section),
                confidence: best.score,
                reasoning: best.reasons,
            }
        }
        None => Placement {
            section: None,
            best_candidate: None,
            confidence: 0.0,
            reasoning: vec!["Every section is blocked for this definition".to_string()],
        },
    }
}

/// Greater means `a` should win over `b`.
fn compare(a: &SectionScore, b: &SectionScore, current: Option<&str>) -> Ordering {
    if (a.score - b.score).abs() > TIE_EPSILON {
        return a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
    }
    let a_current = current == Some(a.section.as_str());
    let b_current = current == Some(b.section.as_str());
    a_current
        .cmp(&b_current)
        .then_with(|| b.section.cmp(&a.section))
}

/// Place every definition and fill the expected view of `tree`.
///
/// Definitions are annotated with their current section and placement.
/// An unresolved definition that the index already lists keeps its
/// current section so a rewrite does not drop it.
pub fn place_all(
    tree: &mut IndexTree,
    definitions: &mut [Definition],
    tables: &ScoringTables,
    threshold: f64,
) {
    let lookups = SectionLookups::from_tree(tree);
    tree.annotate_current_sections(definitions);
    tree.clear_expected();

    let mut placed: HashSet<String> = HashSet::new();
    for def in definitions.iter_mut() {
        let placement = place(def, tree, &lookups, tables, threshold);
        def.placement = Some(placement);

        let target = def
            .resolved_section()
            .or(def.current_section.as_deref())
            .and_then(|path| tree.section_index(path));
        let Some(idx) = target else {
            continue;
        };
        if !placed.insert(def.name.clone()) {
            continue;
        }
        tree.sections[idx].expected.push(Entry::from_definition(def));
    }
    tree.sort_expected();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::parse;
    use crate::model::Kind;
    use pretty_assertions::assert_eq;

    const INDEX: &str = "\
# Index

## 1. Cache Types

- **`Cache`** - [Cache](api_caching.md#cache)

### 1.1 Cache Methods

- **`Cache.Get`** - [Cache](api_caching.md#cache)

### 1.2 Cache Query Methods

### 1.3 Cache Helper Functions

## 2. Widgets

### 2.1 Widget Type Definitions

### 2.2 Widget Helper Functions
";

    fn cache_get() -> Definition {
        let mut def = Definition::new("Cache.Get", Kind::Method, "api_caching.md");
        def.receiver_type = Some("Cache".into());
        def.heading = Some("Cache Query Methods".into());
        def
    }

    fn setup() -> (IndexTree, SectionLookups, ScoringTables) {
        let tree = parse(INDEX).unwrap();
        let lookups = SectionLookups::from_tree(&tree);
        (tree, lookups, ScoringTables::embedded().unwrap())
    }

    #[test]
    fn getter_lands_in_query_methods() {
        let (tree, lookups, tables) = setup();
        let mut def = cache_get();
        def.current_section = Some("1. Cache Types > 1.1 Cache Methods".into());
        let placement = place(&def, &tree, &lookups, &tables, 0.0);
        assert_eq!(
            placement.section.as_deref(),
            Some("1. Cache Types > 1.2 Cache Query Methods")
        );
        assert!(placement.confidence > 1.0);
        assert!(!placement.reasoning.is_empty());
    }

    #[test]
    fn constructor_skips_blocked_type_section() {
        let (tree, lookups, tables) = setup();
        let def = Definition::new("NewWidget", Kind::Function, "api_widgets.md");
        let placement = place(&def, &tree, &lookups, &tables, 0.0);
        assert_eq!(
            placement.section.as_deref(),
            Some("2. Widgets > 2.2 Widget Helper Functions")
        );
    }

    #[test]
    fn placement_is_deterministic() {
        let (tree, lookups, tables) = setup();
        let def = cache_get();
        let first = place(&def, &tree, &lookups, &tables, 0.0);
        for _ in 0..5 {
            assert_eq!(place(&def, &tree, &lookups, &tables, 0.0), first);
        }
    }

    #[test]
    fn ties_prefer_current_then_smallest_path() {
        let score = |section: &str| SectionScore {
            section: section.into(),
            score: 0.5,
            blocked: false,
            reasons: Vec::new(),
        };
        let a = score("1. A");
        let b = score("2. B");
        assert!(compare(&a, &b, None).is_gt());
        assert!(compare(&b, &a, Some("2. B")).is_gt());
    }

    #[test]
    fn threshold_leaves_definition_unresolved() {
        let (tree, lookups, tables) = setup();
        let placement = place(&cache_get(), &tree, &lookups, &tables, 100.0);
        assert_eq!(placement.section, None);
        assert_eq!(
            placement.best_candidate.as_deref(),
            Some("1. Cache Types > 1.2 Cache Query Methods")
        );
    }

    #[test]
    fn place_all_keeps_unresolved_current_entries() {
        let mut tree = parse(INDEX).unwrap();
        let tables = ScoringTables::embedded().unwrap();
        let mut defs = vec![cache_get()];
        place_all(&mut tree, &mut defs, &tables, 100.0);
        let (section, _) = tree.find_expected("Cache.Get").unwrap();
        assert_eq!(section.path, "1. Cache Types > 1.1 Cache Methods");

        place_all(&mut tree, &mut defs, &tables, 0.0);
        let (section, _) = tree.find_expected("Cache.Get").unwrap();
        assert_eq!(section.path, "1. Cache Types > 1.2 Cache Query Methods");
        assert_eq!(tree.expected_count(), 1);
    }
}
