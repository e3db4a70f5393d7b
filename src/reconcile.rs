//! Diffing the expected index against the one on disk.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Deserialize;

use crate::config::Config;
use crate::describe;
use crate::discovery::LinkResolver;
use crate::index::{entry_line, expected_order, Entry, IndexTree};
use crate::model::Definition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueKind {
    /// Expected but not listed.
    Added,
    /// Listed, but placement picked another section.
    Moved,
    /// Listed, no longer defined, link dead.
    Removed,
    /// Listed, no longer defined, link still resolves.
    Orphaned,
    LinkUpdate,
    Reordered,
    /// Defined, but no section scored above the threshold.
    Unresolved,
    MissingDescription,
    ShortDescription,
    DuplicateDescription,
}

impl IssueKind {
    /// Report heading for a group of issues of this kind.
    pub fn title(&self) -> &'static str {
        match self {
            IssueKind::Added => "Definitions missing from the index",
            IssueKind::Moved => "Definitions in the wrong section",
            IssueKind::Removed => "Entries without a definition",
            IssueKind::Orphaned => "Orphaned entries",
            IssueKind::LinkUpdate => "Incorrect links",
            IssueKind::Reordered => "Incorrect entry order",
            IssueKind::Unresolved => "Definitions with low confidence",
            IssueKind::MissingDescription => "Missing descriptions",
            IssueKind::ShortDescription => "Descriptions too short",
            IssueKind::DuplicateDescription => "Duplicate descriptions",
        }
    }

    /// Whether `--apply` would change the file for this finding.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            IssueKind::Added
                | IssueKind::Moved
                | IssueKind::Removed
                | IssueKind::Orphaned
                | IssueKind::LinkUpdate
                | IssueKind::Reordered
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub name: String,
    /// Section the finding is about: where an entry belongs, or where it sits today.
    pub section: Option<String>,
    /// Section it currently sits in, for moves.
    pub other_section: Option<String>,
    /// Line in the index file, 0 when the entry is not listed.
    pub line: usize,
    pub message: String,
    pub suggestion: Option<String>,
    /// Extra detail lines shown in verbose output.
    pub details: Vec<String>,
}

impl Issue {
    fn new(kind: IssueKind, severity: Severity, name: &str, message: String) -> Self {
        Issue {
            kind,
            severity,
            name: name.to_string(),
            section: None,
            other_section: None,
            line: 0,
            message,
            suggestion: None,
            details: Vec::new(),
        }
    }

    fn in_section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }

    fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Tunable parts of reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub moved_severity: Severity,
    pub reordered_severity: Severity,
    /// Ordering findings per section before the rest collapse into a note.
    pub max_order_warnings: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            moved_severity: Severity::Error,
            reordered_severity: Severity::Warning,
            max_order_warnings: 5,
        }
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Options {
            moved_severity: config.moved_severity,
            reordered_severity: config.reordered_severity,
            max_order_warnings: config.max_order_warnings,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub issues: Vec<Issue>,
    /// Notes that are not findings themselves, such as omitted ordering issues.
    pub notes: Vec<String>,
}

impl Reconciliation {
    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn has_structural_changes(&self) -> bool {
        self.issues.iter().any(|i| i.kind.is_structural())
    }
}

/// Compare the expected view of `tree` with its current view.
///
/// Each name present in either view gets at most one of Added, Moved,
/// Removed or Orphaned; a LinkUpdate can come alongside. Ordering and
/// description findings follow, then the definitions placement gave up on.
pub fn reconcile(
    tree: &IndexTree,
    definitions: &[Definition],
    resolver: &dyn LinkResolver,
    options: &Options,
) -> Reconciliation {
    let mut current: BTreeMap<&str, (&str, &Entry)> = BTreeMap::new();
    let mut expected: BTreeMap<&str, (&str, &Entry)> = BTreeMap::new();
    for section in &tree.sections {
        for entry in &section.current {
            current
                .entry(entry.name.as_str())
                .or_insert((section.path.as_str(), entry));
        }
        for entry in &section.expected {
            expected
                .entry(entry.name.as_str())
                .or_insert((section.path.as_str(), entry));
        }
    }

    let mut out = Reconciliation::default();
    let names: BTreeSet<&str> = current.keys().chain(expected.keys()).copied().collect();
    for name in names {
        match (expected.get(name), current.get(name)) {
            (Some(&(path, entry)), None) => out.issues.push(added(name, path, entry)),
            (Some(&(path, want)), Some(&(listed_in, have))) => {
                if path != listed_in {
                    out.issues.push(moved(name, path, listed_in, have, options));
                }
                if let Some(issue) = link_update(name, listed_in, want, have) {
                    out.issues.push(issue);
                }
            }
            (None, Some(&(listed_in, have))) => out.issues.push(gone(name, listed_in, have, resolver)),
            (None, None) => {}
        }
    }

    check_order(tree, options, &mut out);
    out.issues.extend(describe::check_descriptions(tree));
    out.issues.extend(unresolved(definitions));

    log::debug!(
        "reconciliation: {} errors, {} warnings",
        out.error_count(),
        out.warning_count()
    );
    out
}

fn added(name: &str, path: &str, entry: &Entry) -> Issue {
    let mut issue = Issue::new(
        IssueKind::Added,
        Severity::Error,
        name,
        format!("`{}` is not in the index", name),
    )
    .in_section(path)
    .suggest(format!("Add to '{}': {}", path, entry_line(entry)));
    issue.details.push(format!("Kind: {}", entry.kind));
    if let Some(origin) = &entry.origin {
        issue.details.push(format!("File: {}", origin));
    }
    issue
        .details
        .push(format!("Confidence: {}%", (entry.confidence * 100.0).round() as i64));
    issue
}

fn moved(name: &str, path: &str, listed_in: &str, have: &Entry, options: &Options) -> Issue {
    let mut issue = Issue::new(
        IssueKind::Moved,
        options.moved_severity,
        name,
        format!("`{}` in '{}'", name, listed_in),
    )
    .in_section(path)
    .at_line(have.line)
    .suggest(format!("Move to '{}'", path));
    issue.other_section = Some(listed_in.to_string());
    issue
}

fn link_update(name: &str, listed_in: &str, want: &Entry, have: &Entry) -> Option<Issue> {
    let differs = match &want.link_anchor {
        Some(_) => want.href() != have.href(),
        None => want.link_file != have.link_file,
    };
    if !differs || want.link_file.is_empty() {
        return None;
    }
    Some(
        Issue::new(
            IssueKind::LinkUpdate,
            Severity::Error,
            name,
            format!("`{}`: {}", name, have.href()),
        )
        .in_section(listed_in)
        .at_line(have.line)
        .suggest(format!("Update to: {}", want.href())),
    )
}

fn gone(name: &str, listed_in: &str, have: &Entry, resolver: &dyn LinkResolver) -> Issue {
    let live = resolver.resolves(&have.link_file, have.link_anchor.as_deref());
    let issue = if live {
        Issue::new(
            IssueKind::Orphaned,
            Severity::Error,
            name,
            format!("`{}` not found in any API document", name),
        )
        .suggest(format!(
            "Remove the entry or restore the definition under {}",
            have.href()
        ))
    } else {
        Issue::new(
            IssueKind::Removed,
            Severity::Error,
            name,
            format!("`{}` no longer exists and {} does not resolve", name, have.href()),
        )
        .suggest("Remove the entry")
    };
    issue.in_section(listed_in).at_line(have.line)
}

/// Current entries out of the order rendering would write them in.
fn check_order(tree: &IndexTree, options: &Options, out: &mut Reconciliation) {
    for section in &tree.sections {
        if section.current.len() < 2 {
            continue;
        }
        let mut sorted: Vec<&Entry> = section.current.iter().collect();
        sorted.sort_by(|a, b| expected_order(a, b));
        if section
            .current
            .iter()
            .zip(&sorted)
            .all(|(have, want)| have.name == want.name)
        {
            continue;
        }

        let mut reported = 0;
        for (have, want) in section.current.iter().zip(&sorted) {
            if have.name == want.name {
                continue;
            }
            if reported >= options.max_order_warnings {
                out.notes.push(format!(
                    "Additional ordering issues in '{}' omitted.",
                    section.path
                ));
                break;
            }
            out.issues.push(
                Issue::new(
                    IssueKind::Reordered,
                    options.reordered_severity,
                    &have.name,
                    format!("`{}` appears before `{}`", have.raw_name, want.raw_name),
                )
                .in_section(&section.path)
                .at_line(have.line)
                .suggest("Reorder entries to maintain alphabetical ordering by name."),
            );
            reported += 1;
        }
    }
}

fn unresolved(definitions: &[Definition]) -> Vec<Issue> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for def in definitions {
        let Some(placement) = &def.placement else {
            continue;
        };
        if placement.is_resolved() || !seen.insert(def.name.as_str()) {
            continue;
        }
        let candidate = placement.best_candidate.as_deref().unwrap_or("(none)");
        let mut issue = Issue::new(
            IssueKind::Unresolved,
            Severity::Error,
            &def.name,
            format!(
                "`{}` could not be placed (best: {}, confidence {}%)",
                def.name,
                candidate,
                (placement.confidence * 100.0).round() as i64
            ),
        )
        .suggest("Manual review required - confidence too low for automatic placement");
        if let Some(section) = &def.current_section {
            issue.section = Some(section.clone());
        }
        issue.details.push(format!("File: {}:{}", def.origin, def.line));
        if placement.reasoning.is_empty() {
            issue.details.push("Reasoning: no matches".to_string());
        } else {
            issue
                .details
                .push(format!("Reasoning: {}", placement.reasoning.join(", ")));
        }
        out.push(issue);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::DocumentCatalog;
    use crate::index::parse;
    use crate::model::{Kind, LinkTarget};
    use crate::placement::place_all;
    use crate::tables::ScoringTables;
    use pretty_assertions::assert_eq;

    const INDEX: &str = "\
# Index

## 1. Cache Types

- **`Cache`** - [1. Cache](api_caching.md#1-cache)
  - Cache stores values by key with optional expiry.

### 1.1 Cache Methods

- **`Cache.Get`** - [1.2 Cache Query Methods](api_caching.md#12-cache-query-methods)
  - Cache.Get returns the cached value for a key.
- **`Cache.Evict`** - [Eviction](api_caching.md#eviction)
  - Cache.Evict drops entries past their expiry.
- **`Cache.Dump`** - [Debugging](api_debug.md#debugging)
  - Cache.Dump prints every entry for debugging.

### 1.2 Cache Query Methods

### 1.3 Cache Helper Functions
";

    fn definitions() -> Vec<Definition> {
        let mut cache = Definition::new("Cache", Kind::Type, "api_caching.md");
        cache.canonical = Some(LinkTarget {
            file: "api_caching.md".into(),
            anchor: Some("1-cache".into()),
            text: "1. Cache".into(),
        });
        let mut get = Definition::new("Cache.Get", Kind::Method, "api_caching.md");
        get.receiver_type = Some("Cache".into());
        get.heading = Some("1.2 Cache Query Methods".into());
        get.canonical = Some(LinkTarget {
            file: "api_caching.md".into(),
            anchor: Some("12-cache-query-methods".into()),
            text: "1.2 Cache Query Methods".into(),
        });
        let mut put = Definition::new("Cache.Put", Kind::Method, "api_caching.md");
        put.receiver_type = Some("Cache".into());
        vec![cache, get, put]
    }

    fn reconciled() -> (IndexTree, Reconciliation) {
        let mut tree = parse(INDEX).unwrap();
        let mut defs = definitions();
        place_all(&mut tree, &mut defs, &ScoringTables::embedded().unwrap(), 0.0);
        let mut catalog = DocumentCatalog::default();
        catalog.insert("api_debug.md", vec!["debugging".to_string()]);
        let result = reconcile(&tree, &defs, &catalog, &Options::default());
        (tree, result)
    }

    #[test]
    fn moved_getter_is_one_error_naming_both_sections() {
        let (_, result) = reconciled();
        let moved: Vec<&Issue> = result.of_kind(IssueKind::Moved).collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].name, "Cache.Get");
        assert_eq!(moved[0].severity, Severity::Error);
        assert_eq!(
            moved[0].section.as_deref(),
            Some("1. Cache Types > 1.2 Cache Query Methods")
        );
        assert_eq!(
            moved[0].other_section.as_deref(),
            Some("1. Cache Types > 1.1 Cache Methods")
        );
        assert_eq!(result.count(IssueKind::LinkUpdate), 0);
    }

    #[test]
    fn every_name_gets_at_most_one_presence_finding() {
        let (tree, result) = reconciled();
        let presence = [
            IssueKind::Added,
            IssueKind::Moved,
            IssueKind::Removed,
            IssueKind::Orphaned,
        ];
        let mut names: Vec<&str> = tree
            .sections
            .iter()
            .flat_map(|s| s.current.iter().chain(s.expected.iter()))
            .map(|e| e.name.as_str())
            .collect();
        names.sort();
        names.dedup();
        for name in names {
            let findings = result
                .issues
                .iter()
                .filter(|i| i.name == name && presence.contains(&i.kind))
                .count();
            assert!(findings <= 1, "{} has {} findings", name, findings);
        }

        let kind_of = |name: &str| {
            result
                .issues
                .iter()
                .find(|i| i.name == name && presence.contains(&i.kind))
                .map(|i| i.kind)
        };
        assert_eq!(kind_of("Cache"), None);
        assert_eq!(kind_of("Cache.Put"), Some(IssueKind::Added));
        assert_eq!(kind_of("Cache.Evict"), Some(IssueKind::Removed));
        assert_eq!(kind_of("Cache.Dump"), Some(IssueKind::Orphaned));
    }

    #[test]
    fn ordering_findings_are_capped_per_section() {
        let doc = "\
# I

## 1. Cache Types

### 1.1 Cache Methods

- **`Cache.E`** - [x](a.md)
- **`Cache.D`** - [x](a.md)
- **`Cache.C`** - [x](a.md)
- **`Cache.B`** - [x](a.md)
- **`Cache.A`** - [x](a.md)
";
        let tree = parse(doc).unwrap();
        let options = Options {
            max_order_warnings: 2,
            ..Options::default()
        };
        let mut out = Reconciliation::default();
        check_order(&tree, &options, &mut out);
        assert_eq!(out.issues.len(), 2);
        assert_eq!(out.issues[0].message, "`Cache.E` appears before `Cache.A`");
        assert_eq!(
            out.notes,
            vec!["Additional ordering issues in '1. Cache Types > 1.1 Cache Methods' omitted."]
        );
    }

    #[test]
    fn link_update_compares_anchor_when_known() {
        let mut want = Entry::new("Cache", Kind::Type);
        want.link_file = "api_caching.md".into();
        want.link_anchor = Some("1-cache".into());
        let mut have = want.clone();
        assert!(link_update("Cache", "1. Cache", &want, &have).is_none());
        have.link_anchor = Some("cache".into());
        let issue = link_update("Cache", "1. Cache", &want, &have).unwrap();
        assert_eq!(issue.suggestion.as_deref(), Some("Update to: api_caching.md#1-cache"));
    }

    #[test]
    fn severities_follow_options() {
        let mut tree = parse(INDEX).unwrap();
        let mut defs = definitions();
        place_all(&mut tree, &mut defs, &ScoringTables::embedded().unwrap(), 0.0);
        let options = Options {
            moved_severity: Severity::Warning,
            ..Options::default()
        };
        let result = reconcile(&tree, &defs, &DocumentCatalog::default(), &options);
        assert!(result
            .of_kind(IssueKind::Moved)
            .all(|i| i.severity == Severity::Warning));
        assert_eq!(result.count(IssueKind::Orphaned), 0);
        assert_eq!(result.count(IssueKind::Removed), 2);
    }
}
