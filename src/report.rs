//! Terminal report for a check run.

use colored::{ColoredString, Colorize};

use crate::discovery::Duplicate;
use crate::model::Definition;
use crate::reconcile::{Issue, IssueKind, Reconciliation, Severity};

/// Order findings are reported in.
const SECTIONS: [IssueKind; 10] = [
    IssueKind::Added,
    IssueKind::Orphaned,
    IssueKind::Removed,
    IssueKind::Moved,
    IssueKind::LinkUpdate,
    IssueKind::Unresolved,
    IssueKind::MissingDescription,
    IssueKind::ShortDescription,
    IssueKind::DuplicateDescription,
    IssueKind::Reordered,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Header,
    Success,
    Error,
    Warning,
    Detail,
}

/// Counts shown at the top of the report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub index_file: String,
    pub documents: usize,
    pub definitions: usize,
    pub indexed: usize,
    pub sections: usize,
    /// Names discovered in more than one document.
    pub duplicates: Vec<Duplicate>,
}

/// Report text, kept as styled lines so it can go to a terminal or a plain file.
#[derive(Debug, Default)]
pub struct Report {
    lines: Vec<(Style, String)>,
}

impl Report {
    /// With `verbose`, every definition's placement and its reasons are listed
    /// ahead of the findings.
    pub fn build(
        summary: &Summary,
        definitions: &[Definition],
        result: &Reconciliation,
        verbose: bool,
    ) -> Self {
        let mut report = Report::default();
        report.push(
            Style::Header,
            format!("Checking {}", summary.index_file),
        );
        report.push(
            Style::Detail,
            format!(
                "  {} definitions in {} documents, {} entries in {} sections",
                summary.definitions, summary.documents, summary.indexed, summary.sections
            ),
        );

        if verbose {
            report.placements(definitions);
        }

        for kind in SECTIONS {
            let issues: Vec<&Issue> = result.of_kind(kind).collect();
            if issues.is_empty() {
                continue;
            }
            report.blank();
            let style = match issues[0].severity {
                Severity::Error => Style::Error,
                Severity::Warning => Style::Warning,
            };
            report.push(style, format!("{} ({}):", kind.title(), issues.len()));
            for issue in issues {
                report.issue(issue, verbose);
            }
        }

        if !result.notes.is_empty() || !summary.duplicates.is_empty() {
            report.blank();
            for duplicate in &summary.duplicates {
                report.push(
                    Style::Warning,
                    format!(
                        "WARNING: Definition '{}' found in multiple files ({})",
                        duplicate.name,
                        duplicate.files.join(", ")
                    ),
                );
            }
            for note in &result.notes {
                report.push(Style::Warning, format!("WARNING: {}", note));
            }
        }

        report.blank();
        report.summary(result);
        report
    }

    fn push(&mut self, style: Style, text: impl Into<String>) {
        self.lines.push((style, text.into()));
    }

    fn blank(&mut self) {
        self.push(Style::Plain, String::new());
    }

    fn placements(&mut self, definitions: &[Definition]) {
        let placed: Vec<_> = definitions
            .iter()
            .filter_map(|def| def.placement.as_ref().map(|p| (def, p)))
            .collect();
        if placed.is_empty() {
            return;
        }
        self.blank();
        self.push(Style::Header, format!("Placements ({}):", placed.len()));
        for (def, placement) in placed {
            let target = match (&placement.section, &placement.best_candidate) {
                (Some(section), _) => section.clone(),
                (None, Some(best)) => format!("unresolved (best: {})", best),
                (None, None) => "unresolved".to_string(),
            };
            self.push(
                Style::Plain,
                format!(
                    "  {} -> {}: {}%",
                    def.name,
                    target,
                    (placement.confidence * 100.0).round() as i64
                ),
            );
            if !placement.reasoning.is_empty() {
                self.push(
                    Style::Detail,
                    format!("    ({})", placement.reasoning.join(", ")),
                );
            }
        }
    }

    fn issue(&mut self, issue: &Issue, verbose: bool) {
        let location = match issue.line {
            0 => String::new(),
            line => format!("line {}: ", line),
        };
        self.push(
            Style::Plain,
            format!("  {}{}: {}", location, issue.severity, issue.message),
        );
        if let Some(section) = issue.section.as_deref() {
            if issue.kind == IssueKind::Unresolved || issue.kind == IssueKind::Reordered {
                self.push(Style::Detail, format!("    section: {}", section));
            }
        }
        if let Some(suggestion) = issue.suggestion.as_deref() {
            self.push(Style::Detail, format!("    suggestion: {}", suggestion));
        }
        if verbose {
            for detail in &issue.details {
                self.push(Style::Detail, format!("    {}", detail));
            }
        }
    }

    fn summary(&mut self, result: &Reconciliation) {
        let errors = result.error_count();
        let warnings = result.warning_count();
        if errors == 0 && warnings == 0 {
            self.push(Style::Success, "Index is up to date.");
            return;
        }
        let counts: Vec<String> = SECTIONS
            .iter()
            .map(|kind| (kind, result.count(*kind)))
            .filter(|(_, n)| *n > 0)
            .map(|(kind, n)| format!("{} {}", n, label(*kind)))
            .collect();
        self.push(Style::Header, "Summary");
        self.push(Style::Plain, format!("  {}", counts.join(", ")));
        let style = if errors > 0 { Style::Error } else { Style::Warning };
        self.push(
            style,
            format!("{} error(s), {} warning(s)", errors, warnings),
        );
    }

    /// Report with terminal colors (subject to `colored`'s override).
    pub fn to_colored(&self) -> String {
        self.render(|style, text| paint(style, text).to_string())
    }

    /// Report without escape codes, for `--output`.
    pub fn to_plain(&self) -> String {
        self.render(|_, text| text.to_string())
    }

    fn render(&self, mut paint: impl FnMut(Style, &str) -> String) -> String {
        let mut out = String::new();
        for (style, text) in &self.lines {
            out.push_str(&paint(*style, text));
            out.push('\n');
        }
        out
    }
}

fn paint(style: Style, text: &str) -> ColoredString {
    match style {
        Style::Plain => text.normal(),
        Style::Header => text.cyan().bold(),
        Style::Success => text.green().bold(),
        Style::Error => text.red().bold(),
        Style::Warning => text.yellow(),
        Style::Detail => text.dimmed(),
    }
}

fn label(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::Added => "added",
        IssueKind::Moved => "moved",
        IssueKind::Removed => "removed",
        IssueKind::Orphaned => "orphaned",
        IssueKind::LinkUpdate => "link updates",
        IssueKind::Reordered => "reordered",
        IssueKind::Unresolved => "unresolved",
        IssueKind::MissingDescription => "missing descriptions",
        IssueKind::ShortDescription => "short descriptions",
        IssueKind::DuplicateDescription => "duplicate descriptions",
    }
}

/// Process exit status for a finished run.
pub fn exit_code(result: &Reconciliation, no_fail: bool) -> i32 {
    if result.has_errors() && !no_fail {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::DocumentCatalog;
    use crate::index::parse;
    use crate::model::{Definition, Kind};
    use crate::placement::place_all;
    use crate::reconcile::{reconcile, Options};
    use crate::tables::ScoringTables;

    fn summary() -> Summary {
        Summary {
            index_file: "docs/api_defs_index.md".into(),
            documents: 1,
            definitions: 1,
            indexed: 1,
            sections: 2,
            duplicates: Vec::new(),
        }
    }

    fn result(doc: &str, defs: &mut [Definition]) -> Reconciliation {
        let mut tree = parse(doc).unwrap();
        place_all(&mut tree, defs, &ScoringTables::embedded().unwrap(), 0.0);
        reconcile(&tree, defs, &DocumentCatalog::default(), &Options::default())
    }

    #[test]
    fn clean_run_reports_up_to_date() {
        let doc = "# I\n\n## 1. Cache Types\n\n- **`Cache`** - [Cache](api_caching.md)\n  - Cache stores values by key with expiry.\n";
        let mut defs = vec![Definition::new("Cache", Kind::Type, "api_caching.md")];
        let result = result(doc, &mut defs);
        let text = Report::build(&summary(), &defs, &result, false).to_plain();
        assert!(text.ends_with("Index is up to date.\n"), "{}", text);
        assert!(!text.contains("Placements"));
        assert_eq!(exit_code(&result, false), 0);
    }

    #[test]
    fn findings_are_grouped_and_fail_the_run() {
        let doc = "# I\n\n## 1. Cache Types\n\n- **`Cache`** - [Cache](api_caching.md)\n  - Cache stores values by key with expiry.\n- **`Gone`** - [Gone](api_gone.md)\n  - Gone was removed from the API long ago.\n";
        let mut defs = vec![Definition::new("Cache", Kind::Type, "api_caching.md")];
        let result = result(doc, &mut defs);
        let text = Report::build(&summary(), &defs, &result, false).to_plain();
        assert!(text.contains("Entries without a definition (1):"));
        assert!(text.contains("line 7: error: `Gone` no longer exists"));
        assert!(text.contains("1 error(s), 0 warning(s)"));
        assert!(!text.contains('\u{1b}'));
        assert_eq!(exit_code(&result, false), 1);
        assert_eq!(exit_code(&result, true), 0);
    }

    #[test]
    fn verbose_lists_every_placement_with_reasons() {
        let doc = "# I\n\n## 1. Cache Types\n\n- **`Cache`** - [Cache](api_caching.md)\n  - Cache stores values by key with expiry.\n";
        let mut defs = vec![Definition::new("Cache", Kind::Type, "api_caching.md")];
        let result = result(doc, &mut defs);
        let placement = defs[0].placement.clone().unwrap();
        let text = Report::build(&summary(), &defs, &result, true).to_plain();
        assert!(text.contains("Placements (1):"), "{}", text);
        assert!(text.contains(&format!(
            "  Cache -> 1. Cache Types: {}%",
            (placement.confidence * 100.0).round() as i64
        )));
        assert!(text.contains(&format!("    ({})", placement.reasoning.join(", "))));
    }

    #[test]
    fn duplicate_definitions_are_warned_about() {
        let doc = "# I\n\n## 1. Cache Types\n\n- **`Cache`** - [Cache](api_caching.md)\n  - Cache stores values by key with expiry.\n";
        let mut defs = vec![Definition::new("Cache", Kind::Type, "api_caching.md")];
        let result = result(doc, &mut defs);
        let summary = Summary {
            duplicates: vec![Duplicate {
                name: "Cache".into(),
                files: vec!["api_caching.md".into(), "api_other.md".into()],
            }],
            ..summary()
        };
        let text = Report::build(&summary, &defs, &result, false).to_plain();
        assert!(text.contains(
            "WARNING: Definition 'Cache' found in multiple files (api_caching.md, api_other.md)"
        ));
        assert_eq!(exit_code(&result, false), 0);
    }
}
