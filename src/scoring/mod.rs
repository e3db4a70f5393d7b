//! Confidence scoring of one definition against one index section.
//!
//! Scoring is a fold over a fixed, ordered registry of rules. Each rule is a
//! pure function of a [`ScoringContext`] and returns a signed delta, its
//! reasons, and whether it blocks the section outright. Blocked sections
//! score negative infinity but keep every reason for the verbose report.

mod context;
mod rules;
mod text;

pub use context::{detect_domain, DefinitionFacts, ScoringContext, SectionLookups};
pub use rules::RULES;

/// Coarse grouping of rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    /// Kind agreement and structural blockers.
    Kind,
    Domain,
    Lexical,
    Naming,
    Penalty,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub delta: f64,
    pub reasons: Vec<String>,
    pub blocking: bool,
}

impl RuleOutcome {
    pub fn none() -> Self {
        RuleOutcome::default()
    }

    pub fn bonus(delta: f64, reason: impl Into<String>) -> Self {
        RuleOutcome {
            delta,
            reasons: vec![reason.into()],
            blocking: false,
        }
    }

    pub fn block(delta: f64, reason: impl Into<String>) -> Self {
        RuleOutcome {
            delta,
            reasons: vec![reason.into()],
            blocking: true,
        }
    }

    pub fn add(&mut self, delta: f64, reason: impl Into<String>) {
        self.delta += delta;
        self.reasons.push(reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.delta == 0.0 && self.reasons.is_empty() && !self.blocking
    }
}

/// A named scoring rule.
pub struct Rule {
    pub name: &'static str,
    pub group: RuleGroup,
    pub eval: fn(&ScoringContext<'_>) -> RuleOutcome,
}

/// Aggregate over every rule for one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionScore {
    pub section: String,
    /// Sum of deltas, or negative infinity when blocked.
    pub score: f64,
    pub blocked: bool,
    pub reasons: Vec<String>,
}

pub fn score_section(ctx: &ScoringContext<'_>) -> SectionScore {
    let mut total = 0.0;
    let mut blocked = false;
    let mut reasons = Vec::new();

    for rule in RULES {
        let outcome = (rule.eval)(ctx);
        if outcome.is_empty() {
            continue;
        }
        log::trace!(
            "{} / {}: {:?} {} {:+.2}",
            ctx.definition.name,
            ctx.section,
            rule.group,
            rule.name,
            outcome.delta
        );
        total += outcome.delta;
        blocked |= outcome.blocking;
        reasons.extend(outcome.reasons);
    }

    SectionScore {
        section: ctx.section.to_string(),
        score: if blocked { f64::NEG_INFINITY } else { total },
        blocked,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::parse;
    use crate::model::{Definition, Kind};
    use crate::tables::ScoringTables;

    const INDEX: &str = "\
# Index

## 1. Cache Types

- **`Cache`** - [Cache](api_caching.md#cache)

### 1.1 Cache Methods

### 1.2 Cache Query Methods

### 1.3 Cache Helper Functions
";

    fn score(def: &Definition, section: &str) -> SectionScore {
        let tables = ScoringTables::embedded().unwrap();
        let tree = parse(INDEX).unwrap();
        let lookups = SectionLookups::from_tree(&tree);
        let facts = DefinitionFacts::new(def, &tables);
        let ctx = ScoringContext::new(def, &facts, section, &tables, &lookups);
        score_section(&ctx)
    }

    fn cache_get() -> Definition {
        let mut def = Definition::new("Cache.Get", Kind::Method, "api_caching.md");
        def.receiver_type = Some("Cache".into());
        def.heading = Some("Cache Query Methods".into());
        def
    }

    #[test]
    fn rule_names_are_unique_and_groups_ordered() {
        let mut names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), RULES.len());

        let order = |g: RuleGroup| g as usize;
        assert!(RULES.windows(2).all(|w| order(w[0].group) <= order(w[1].group)));
    }

    #[test]
    fn blocked_sections_keep_their_reasons() {
        let result = score(&cache_get(), "1. Cache Types > 1.3 Cache Helper Functions");
        assert!(result.blocked);
        assert_eq!(result.score, f64::NEG_INFINITY);
        assert!(result.reasons.iter().any(|r| r.contains("STRICT kind mismatch")));
    }

    #[test]
    fn query_section_beats_plain_methods_for_getter() {
        let plain = score(&cache_get(), "1. Cache Types > 1.1 Cache Methods");
        let query = score(&cache_get(), "1. Cache Types > 1.2 Cache Query Methods");
        assert!(!plain.blocked && !query.blocked);
        assert!(query.score > plain.score, "{:?} vs {:?}", query, plain);
        assert!(query.reasons.iter().any(|r| r.starts_with("Receiver type match")));
    }

    #[test]
    fn foreign_receiver_is_blocked_by_structure() {
        let mut def = cache_get();
        def.name = "Store.Get".into();
        def.receiver_type = Some("Store".into());
        let result = score(&def, "1. Cache Types > 1.2 Cache Query Methods");
        assert!(result.blocked);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.starts_with("Receiver type not allowed by section structure")));
    }

    #[test]
    fn scoring_is_deterministic() {
        let a = score(&cache_get(), "1. Cache Types > 1.2 Cache Query Methods");
        let b = score(&cache_get(), "1. Cache Types > 1.2 Cache Query Methods");
        assert_eq!(a, b);
    }
}
