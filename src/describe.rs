//! Entry descriptions: checking the ones the index has and deriving missing
//! ones from the definition's doc comment.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::index::{IndexTree, CONTINUATION, MIN_DESCRIPTION_LEN};
use crate::reconcile::{Issue, IssueKind, Severity};

const MAX_BULLETS: usize = 6;
const MAX_LINES: usize = 12;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(Parameters|Returns|Validation|Behavior|Errors|Error|Important|Notes|Constraints|Security|Usage|Examples|Example):",
    )
    .unwrap()
});
static VALIDATION_INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(performs?|performed)\s+(comprehensive\s+)?validation:\s*").unwrap()
});
static IMPERATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Ensure|Verify|Check|Validate|Reject|Detect|Require|Confirm)\b").unwrap()
});
static DASH_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+-\s+").unwrap());
static LEADING_DASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:-\s+)+").unwrap());

/// Derive description lines for an entry from its doc comment.
///
/// Labeled parts of the comment ("Parameters:", "Returns:", ...) become one
/// bullet per listed item; other text becomes one bullet per sentence, with
/// later sentences of a bullet emitted as `CONT: ` lines. Returns `None` when
/// the comment does not yield a description of useful length.
pub fn synthesize(name: &str, raw_name: &str, doc_comment: &str) -> Option<Vec<String>> {
    let cleaned = normalize(doc_comment);
    if cleaned.is_empty() {
        return None;
    }

    let intro = VALIDATION_INTRO_RE.replace_all(&cleaned, "$1 ${2}validation.\nValidation: ");
    let labeled = LABEL_RE.replace_all(&intro, |caps: &Captures| {
        let label = &caps[0];
        match caps.get(0) {
            Some(m) if m.start() > 0 => format!("\n{}", label),
            _ => label.to_string(),
        }
    });

    let mut bullets: Vec<String> = Vec::new();
    for chunk in labeled.split('\n').map(str::trim).filter(|c| !c.is_empty()) {
        let label = LABEL_RE
            .captures(chunk)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
            .map(|caps| caps[1].to_string());
        match label {
            Some(label) => {
                let rest = chunk.split_once(':').map(|(_, r)| r.trim()).unwrap_or("");
                bullets.extend(labeled_bullets(&label, rest));
            }
            None => bullets.extend(unlabeled_bullets(name, chunk)),
        }
    }

    prefix_first_bullet(name, raw_name, &mut bullets);
    let bullets = ensure_min_length(name, &cleaned, bullets);
    let lines = with_continuations(&bullets);
    (!lines.is_empty()).then_some(lines)
}

fn normalize(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(text.trim(), " ")
        .replace('→', "=>")
}

fn ensure_period(text: &str) -> String {
    let t = text.trim();
    match t.chars().last() {
        None => String::new(),
        Some('.' | '!' | '?') => t.to_string(),
        Some(_) => format!("{}.", t),
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(text) {
        // Keep the punctuation, drop the whitespace after it.
        let end = m.start() + 1;
        out.push(text[start..end].trim().to_string());
        start = m.end();
    }
    out.push(text[start..].trim().to_string());
    out.retain(|s| !s.is_empty());
    out
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn looks_like_label(text: &str) -> bool {
    text.trim().find(':').is_some_and(|idx| (2..=40).contains(&idx))
}

fn is_filler(text: &str) -> bool {
    matches!(text, "-" | "-." | ".")
}

/// `- a - b - c` or `a - b` into its items.
fn dash_items(text: &str) -> Vec<String> {
    let t = text.trim().trim_end_matches([' ', '-']);
    let t = DASH_SEPARATOR_RE.replace_all(t, "\n");
    let t = LEADING_DASHES_RE.replace(&t, "");
    t.split('\n')
        .map(|line| LEADING_DASHES_RE.replace(line.trim(), "").trim().to_string())
        .filter(|item| !item.is_empty() && !is_filler(item))
        .collect()
}

fn has_dash_list(text: &str) -> bool {
    let t = text.trim();
    t.starts_with("- ") || t.contains(" - ")
}

/// `key, fallback.` into its items when it reads like a short enumeration.
fn comma_items(text: &str) -> Vec<String> {
    let t = text.trim().trim_end_matches('.');
    if !t.contains(", ") || SENTENCE_END_RE.is_match(t) {
        return Vec::new();
    }
    let items: Vec<String> = t
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    if items.len() < 2 || items.iter().any(|item| item.len() > 40) {
        return Vec::new();
    }
    items
}

/// Long text split at each imperative verb: "Ensure ... Check ..." into two items.
fn imperative_items(text: &str) -> Vec<String> {
    let starts: Vec<usize> = IMPERATIVE_RE.find_iter(text).map(|m| m.start()).collect();
    if starts.len() < 2 {
        return Vec::new();
    }
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim().to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

fn labeled_bullets(label: &str, rest: &str) -> Vec<String> {
    let label = capitalize(label);
    if rest.is_empty() {
        return vec![ensure_period(&label)];
    }
    let item_label = match label.as_str() {
        "Parameters" => "Parameter",
        "Returns" => "Return",
        "Errors" | "Error" => "Error",
        other => other,
    };

    let items = if has_dash_list(rest) {
        dash_items(rest)
    } else {
        comma_items(rest)
    };
    if !items.is_empty() {
        return items
            .iter()
            .map(|item| ensure_period(&format!("{}: {}", item_label, item)))
            .collect();
    }

    if matches!(label.as_str(), "Validation" | "Behavior") && rest.len() >= 80 {
        let items = imperative_items(rest);
        if !items.is_empty() {
            return items
                .iter()
                .map(|item| ensure_period(&format!("{}: {}", label, item)))
                .collect();
        }
    }
    vec![ensure_period(&format!("{}: {}", label, rest))]
}

fn sentence_bullets(text: &str) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return vec![ensure_period(text)];
    }
    sentences.iter().map(|s| ensure_period(s)).collect()
}

fn unlabeled_bullets(name: &str, chunk: &str) -> Vec<String> {
    if chunk.starts_with("- ") {
        return dash_items(chunk).iter().map(|i| ensure_period(i)).collect();
    }
    let Some(dash) = chunk.find(" - ") else {
        return sentence_bullets(chunk);
    };

    if let Some(colon) = chunk[..dash].rfind(':') {
        let prefix = chunk[..colon].trim();
        let rest = chunk[colon + 1..].trim();
        let mut bullets = sentence_bullets(prefix);
        let items = dash_items(rest);
        let context = compact_context(name, prefix);
        for item in items {
            let bullet = if looks_like_label(&item) || context.is_empty() {
                item
            } else {
                format!("{}: {}", context, item)
            };
            bullets.push(ensure_period(&bullet));
        }
        return bullets;
    }

    let items = dash_items(chunk);
    if items.len() >= 2 {
        return items.iter().map(|i| ensure_period(i)).collect();
    }
    sentence_bullets(chunk)
}

/// Shortest useful label for the text that introduces a dash list.
fn compact_context(name: &str, prefix: &str) -> String {
    let mut p = normalize(prefix);
    if let Some((_, last)) = p.rsplit_once('.') {
        p = last.trim().to_string();
    }
    if !name.is_empty()
        && p.is_char_boundary(name.len().min(p.len()))
        && p.to_lowercase().starts_with(&name.to_lowercase())
    {
        p = p[name.len()..].trim_matches([' ', ':', '-']).to_string();
    }
    if let Some((category, _)) = p.split_once(':') {
        let category = category.trim();
        if (3..=50).contains(&category.len()) {
            return category.to_string();
        }
    }
    if p.len() > 80 {
        let mut cut = p.len() - 80;
        while !p.is_char_boundary(cut) {
            cut += 1;
        }
        p = p[cut..].trim_start_matches([' ', ',', ';', '-']).to_string();
    }
    p.trim_matches([' ', ':', '-']).to_string()
}

/// Start the description with the entry name unless it already does or opens with a label.
fn prefix_first_bullet(name: &str, raw_name: &str, bullets: &mut [String]) {
    let Some(first) = bullets.first_mut() else {
        return;
    };
    let lower = first.to_lowercase();
    // `Get returns ...` already names `Cache.Get`.
    let member = name.rsplit('.').next().unwrap_or(name).to_lowercase();
    if name.is_empty()
        || looks_like_label(first)
        || (!raw_name.is_empty() && lower.starts_with(&raw_name.to_lowercase()))
        || lower.starts_with(&name.to_lowercase())
        || lower.starts_with(&format!("{} ", member))
    {
        return;
    }
    *first = ensure_period(&format!("{} {}", name, lowercase_lead(first)));
}

/// Lowercase the first letter unless the word looks like an acronym.
fn lowercase_lead(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_lowercase() => {
            first.to_lowercase().chain(text[first.len_utf8()..].chars()).collect()
        }
        _ => text.to_string(),
    }
}

fn ensure_min_length(name: &str, cleaned: &str, bullets: Vec<String>) -> Vec<String> {
    let combined = bullets.join(" ");
    if combined.trim().chars().count() >= MIN_DESCRIPTION_LEN {
        return bullets;
    }
    let fallback = if !name.is_empty() && !cleaned.to_lowercase().starts_with(&name.to_lowercase()) {
        format!("{} {}", name, cleaned)
    } else {
        cleaned.to_string()
    };
    let fallback = ensure_period(&fallback);
    if fallback.chars().count() >= MIN_DESCRIPTION_LEN {
        vec![fallback]
    } else {
        Vec::new()
    }
}

/// One sentence per line: the lead sentence is the bullet, the rest continue it.
fn with_continuations(bullets: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut count = 0;
    for bullet in bullets.iter().filter(|b| !b.is_empty()) {
        if count >= MAX_BULLETS || out.len() >= MAX_LINES {
            break;
        }
        let sentences = split_sentences(bullet);
        let Some((lead, rest)) = sentences.split_first() else {
            continue;
        };
        if is_filler(lead) {
            continue;
        }
        out.push(ensure_period(lead));
        count += 1;
        for sentence in rest {
            if out.len() >= MAX_LINES {
                break;
            }
            if !is_filler(sentence) {
                out.push(format!("{}{}", CONTINUATION, ensure_period(sentence)));
            }
        }
    }
    out
}

/// Description findings for entries that still have a definition.
pub fn check_descriptions(tree: &IndexTree) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut shared: BTreeMap<String, Vec<(&str, usize)>> = BTreeMap::new();

    for section in &tree.sections {
        for entry in &section.current {
            let Some((_, expected)) = tree.find_expected(&entry.name) else {
                continue;
            };
            if entry.has_description() {
                if let Some(text) = entry.description_text() {
                    shared
                        .entry(text)
                        .or_default()
                        .push((entry.name.as_str(), entry.line));
                }
                continue;
            }

            let suggestion = if expected.doc_comment.trim().is_empty() {
                "Add descriptive text (minimum 20 characters) below this entry.".to_string()
            } else {
                format!(
                    "Review the definition comments for potential summary: {}",
                    normalize(&expected.doc_comment)
                )
            };
            let (kind, message) = match entry.description_text() {
                None => (
                    IssueKind::MissingDescription,
                    format!(
                        "Entry `{}` has no descriptive text (minimum {} characters required)",
                        entry.name, MIN_DESCRIPTION_LEN
                    ),
                ),
                Some(text) => (
                    IssueKind::ShortDescription,
                    format!(
                        "Entry `{}` has descriptive text that is too short ({} characters, minimum {} required)",
                        entry.name,
                        text.chars().count(),
                        MIN_DESCRIPTION_LEN
                    ),
                ),
            };
            issues.push(Issue {
                kind,
                severity: Severity::Error,
                name: entry.name.clone(),
                section: Some(section.path.clone()),
                other_section: None,
                line: entry.line,
                message,
                suggestion: Some(suggestion),
                details: Vec::new(),
            });
        }
    }

    for (_, entries) in shared.into_iter().filter(|(_, e)| e.len() > 1) {
        let names: Vec<String> = entries.iter().map(|(n, _)| format!("`{}`", n)).collect();
        let (first, line) = entries[0];
        issues.push(Issue {
            kind: IssueKind::DuplicateDescription,
            severity: Severity::Error,
            name: first.to_string(),
            section: None,
            other_section: None,
            line,
            message: format!(
                "Multiple entries share the same description: {}",
                names.join(", ")
            ),
            suggestion: Some("Each entry should have a unique description".to_string()),
            details: Vec::new(),
        });
    }
    issues
}

/// Whether `--apply` would write a derived description for some listed entry.
pub fn has_fixable_descriptions(tree: &IndexTree) -> bool {
    tree.sections.iter().any(|section| {
        section.current.iter().any(|entry| {
            !entry.has_description()
                && section.expected_entry(&entry.name).is_some_and(|expected| {
                    synthesize(&expected.name, &expected.raw_name, &expected.doc_comment).is_some()
                })
        })
    })
}

/// Copy the descriptions the index already has onto the expected entries.
pub fn carry_over(tree: &mut IndexTree) {
    let mut existing: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for section in &tree.sections {
        for entry in section.current.iter().filter(|e| !e.description.is_empty()) {
            existing
                .entry(entry.name.clone())
                .or_insert_with(|| entry.description.clone());
        }
    }
    for section in &mut tree.sections {
        for entry in &mut section.expected {
            if let Some(description) = existing.get(&entry.name) {
                entry.description = description.clone();
            }
        }
    }
}

/// Derive descriptions for expected entries that lack a usable one. Returns how many were filled.
pub fn populate_missing(tree: &mut IndexTree) -> usize {
    let mut filled = 0;
    for section in &mut tree.sections {
        for entry in &mut section.expected {
            if entry.has_description() || entry.doc_comment.trim().is_empty() {
                continue;
            }
            if let Some(lines) = synthesize(&entry.name, &entry.raw_name, &entry.doc_comment) {
                entry.description = lines;
                filled += 1;
            }
        }
    }
    log::debug!("derived {} descriptions from doc comments", filled);
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn lead_sentence_then_labeled_items() {
        let lines = synthesize(
            "Cache.Get",
            "Cache.Get",
            "Get returns the cached value. Parameters: key, fallback.",
        )
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "Get returns the cached value.",
                "Parameter: key.",
                "Parameter: fallback.",
            ]
        );
    }

    #[test]
    fn bare_method_word_counts_as_the_name() {
        let lines = synthesize("Cache.Get", "Cache.Get", "Get returns the cached value for key.").unwrap();
        assert_eq!(lines, vec!["Get returns the cached value for key."]);

        let lines = synthesize("Cache.Get", "Cache.Get", "Gets the cached value for key.").unwrap();
        assert_eq!(lines, vec!["Cache.Get gets the cached value for key."]);
    }

    #[test]
    fn name_prefix_and_continuations() {
        let lines = synthesize(
            "Cache.Put",
            "Cache.Put",
            "Stores the value under key.  Existing values are replaced.",
        )
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "Cache.Put stores the value under key.",
                "Existing values are replaced.",
            ]
        );

        let lines = synthesize(
            "Cache.Put",
            "Cache.Put",
            "Returns: - the previous value - whether it existed",
        )
        .unwrap();
        assert_eq!(lines, vec!["Return: the previous value.", "Return: whether it existed."]);
    }

    #[test]
    fn sentences_within_a_bullet_continue() {
        let lines = with_continuations(&["First one. Second one.".to_string()]);
        assert_eq!(lines, vec!["First one.", "CONT: Second one."]);
    }

    #[test]
    fn validation_intro_becomes_label() {
        let lines = synthesize(
            "Package.Validate",
            "Package.Validate",
            "Validate performs comprehensive validation: - headers are present - checksums match",
        )
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "Validate performs comprehensive validation.",
                "Validation: headers are present.",
                "Validation: checksums match.",
            ]
        );
    }

    #[test]
    fn short_comments_yield_nothing() {
        assert_eq!(synthesize("Get", "Get", "Gets."), None);
        assert_eq!(synthesize("Get", "Get", "   "), None);
    }

    #[test]
    fn output_is_capped() {
        let comment = (1..=10)
            .map(|i| format!("- item number {}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let lines = synthesize("Cache", "Cache", &comment).unwrap();
        assert_eq!(lines.len(), MAX_BULLETS);
    }

    #[test]
    fn imperative_verbs_split_long_behavior() {
        let items = imperative_items("Ensure the header is valid and Check every entry offset then Verify the checksum");
        assert_eq!(items.len(), 3);
        assert!(items[1].starts_with("Check"));
    }

    const INDEX: &str = "\
# I

## 1. Cache Types

- **`Cache`** - [1. Cache](api_caching.md#1-cache)
- **`Store`** - [1. Cache](api_caching.md#1-cache)
  - Short.
- **`Entry`** - [1. Cache](api_caching.md#1-cache)
  - Holds a value and its expiry time.
- **`Item`** - [1. Cache](api_caching.md#1-cache)
  - Holds a value and its expiry time.
";

    fn tree_with_expected() -> IndexTree {
        let mut tree = parse(INDEX).unwrap();
        let mut expected = tree.sections[0].current.clone();
        expected[0].doc_comment = "Cache stores values by key with expiry.".into();
        tree.sections[0].expected = expected;
        tree
    }

    #[test]
    fn description_checks_cover_missing_short_and_duplicates() {
        let issues = check_descriptions(&tree_with_expected());
        let kinds: Vec<IssueKind> = issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::MissingDescription,
                IssueKind::ShortDescription,
                IssueKind::DuplicateDescription
            ]
        );
        assert_eq!(
            issues[2].message,
            "Multiple entries share the same description: `Entry`, `Item`"
        );
        assert!(issues[0].suggestion.as_deref().unwrap().contains("Cache stores values"));
    }

    #[test]
    fn populate_fills_only_derivable_gaps() {
        let mut tree = tree_with_expected();
        assert!(has_fixable_descriptions(&tree));
        carry_over(&mut tree);
        assert_eq!(populate_missing(&mut tree), 1);
        let expected = &tree.sections[0].expected;
        assert_eq!(expected[0].description, vec!["Cache stores values by key with expiry."]);
        assert_eq!(expected[1].description, vec!["Short."]);
    }
}
