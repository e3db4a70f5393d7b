//! Keyword extraction and string helpers shared by the scoring rules.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{strip_generics, Definition, Kind};
use crate::tables::ScoringTables;

static NUMBER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s*").unwrap());
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());
static SUBSECTION_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d*\s*").unwrap());
static WORD3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{3,}\b").unwrap());
static WORD4_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{4,}\b").unwrap());
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z0-9]+\b").unwrap());
static CAMEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+[a-z0-9]*|[a-z0-9]+").unwrap());
static RETURN_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\breturns?\s+(?:\*?[A-Z][a-zA-Z0-9]*|error|bool|string|int\d*|uint\d*|float\d*)(?:\s+if|\s+when|\s+on)?[\s,.]*",
    )
    .unwrap()
});
static PAREN_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\*?[A-Z][a-zA-Z0-9]+[^)]*\)").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SUBSECTION_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\-]+").unwrap());
static SUBSECTION_SUFFIX_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\s+types?\s*$",
        r"\s+errors?\s*$",
        r"\s+methods?\s*$",
        r"\s+operations?\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static DOTTED_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d*$").unwrap());

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

pub fn contains_any_owned(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// Signed whole percentage for reasons, e.g. `+25%`.
pub fn pct(delta: f64) -> String {
    format!("{:+}%", (delta * 100.0).round() as i64)
}

/// Drop a leading `3.` / `3.2 ` style number.
pub fn strip_number(text: &str) -> String {
    NUMBER_PREFIX_RE.replace(text, "").into_owned()
}

/// Section path without the first H2 number (`1. a > 1.1 b` => `a > 1.1 b`).
pub fn strip_leading_number(text: &str) -> String {
    LEADING_NUMBER_RE.replace(text, "").into_owned()
}

/// Last component of a ` > ` separated section path.
pub fn leaf(section: &str) -> &str {
    section.rsplit('>').next().unwrap_or(section).trim()
}

/// Kind a section title accepts, when it says so.
pub fn section_kind(section: &str) -> Option<Kind> {
    let s = section.to_lowercase();
    if s.contains("methods") && !s.contains("helper") {
        return Some(Kind::Method);
    }
    if s.contains("helper") && s.contains("function") {
        return Some(Kind::Function);
    }
    if s.contains("type") && !s.contains("method") && !s.contains("function") {
        return Some(Kind::Type);
    }
    if s.contains("interface") && !s.contains("method") {
        return Some(Kind::Type);
    }
    if (s.contains("error") || s.contains("generic")) && s.contains("type") {
        return Some(Kind::Type);
    }
    None
}

/// Heading level that keyword mapping compares against: H2 for types, below for the rest.
pub fn section_level(section: &str, kind: Kind) -> &str {
    match section.split_once(" > ") {
        Some((h2, rest)) => {
            let h2 = h2.trim();
            let rest = rest.trim();
            match kind {
                Kind::Type => h2,
                _ if rest.is_empty() => h2,
                _ => rest,
            }
        }
        None => section,
    }
}

/// Comment text with return-type phrases and typed parentheticals removed.
pub fn clean_comment(comment: &str) -> String {
    let text = RETURN_TYPE_RE.replace_all(comment, "");
    let text = PAREN_TYPE_RE.replace_all(&text, "");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Keywords from the keyword map that appear in a (lowercase) comment, priority phrases first.
pub fn comment_keywords(comment_lower: &str, tables: &ScoringTables) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut push = |kw: String, keywords: &mut Vec<String>| {
        if seen.insert(kw.clone()) {
            keywords.push(kw);
        }
    };

    for phrase in &tables.priority_phrases {
        let compact = phrase.replace(' ', "");
        if word_match(comment_lower, phrase) || comment_lower.contains(&compact) {
            push(compact, &mut keywords);
        }
    }

    for word in WORD3_RE.find_iter(comment_lower) {
        let word = word.as_str().replace('-', "");
        if tables.has_keyword(&word) {
            push(word, &mut keywords);
        }
    }

    for mapping in &tables.keyword_sections {
        let compact = mapping.keyword.replace(' ', "");
        if keywords.contains(&mapping.keyword) || keywords.contains(&compact) {
            continue;
        }
        if comment_lower.contains(&compact) || (mapping.keyword.contains(' ') && loose_phrase_match(comment_lower, &mapping.keyword)) {
            push(compact, &mut keywords);
        }
    }
    keywords
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// End offsets of each occurrence of `needle` that starts a word.
fn word_starts<'a>(text: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let mut from = 0;
    std::iter::from_fn(move || {
        if needle.is_empty() {
            return None;
        }
        while let Some(i) = text.get(from..)?.find(needle) {
            let start = from + i;
            from = start + text[start..].chars().next().map_or(1, char::len_utf8);
            if !text[..start].chars().next_back().is_some_and(is_word_char) {
                return Some(start + needle.len());
            }
        }
        None
    })
}

fn ends_word(text: &str, at: usize) -> bool {
    !text[at..].chars().next().is_some_and(is_word_char)
}

/// Offset past the whitespace run at `at`, if there is one.
fn skip_space(text: &str, at: usize) -> Option<usize> {
    let rest = &text[at..];
    let trimmed = rest.trim_start();
    (trimmed.len() < rest.len()).then(|| at + rest.len() - trimmed.len())
}

/// `phrase` as whole words somewhere in `text`.
pub fn word_match(text: &str, phrase: &str) -> bool {
    word_starts(text, phrase).any(|end| ends_word(text, end))
}

/// `word` as a whole word, then whitespace, then text starting with `next`.
pub fn word_followed_by(text: &str, word: &str, next: &str) -> bool {
    word_starts(text, word)
        .filter_map(|end| skip_space(text, end))
        .any(|at| text[at..].starts_with(next))
}

/// Multi-word keyword with at most one short filler word between its words.
fn loose_phrase_match(text: &str, phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let Some((first, rest)) = words.split_first() else {
        return false;
    };
    word_starts(text, first)
        .filter(|&end| ends_word(text, end))
        .any(|end| phrase_continues(text, end, rest))
}

fn phrase_continues(text: &str, at: usize, words: &[&str]) -> bool {
    const MAX_FILLER: usize = 20;
    let Some((word, rest)) = words.split_first() else {
        return true;
    };
    let Some(gap) = skip_space(text, at) else {
        return false;
    };
    let mut starts = vec![gap];
    let filler: Vec<char> = text[gap..].chars().take_while(|c| is_word_char(*c)).collect();
    if (1..=MAX_FILLER).contains(&filler.len()) {
        let filler_end = gap + filler.iter().map(|c| c.len_utf8()).sum::<usize>();
        starts.extend(skip_space(text, filler_end));
    }
    starts.into_iter().any(|start| {
        let end = start + word.len();
        text[start..].starts_with(word) && ends_word(text, end) && phrase_continues(text, end, rest)
    })
}

/// Score comment keywords against the mapped section names.
pub fn match_keywords_to_section(
    keywords: &[String],
    section_level: &str,
    tables: &ScoringTables,
) -> (f64, Vec<String>) {
    if keywords.is_empty() || section_level.is_empty() {
        return (0.0, Vec::new());
    }
    let section_lower = section_level.to_lowercase();
    let weights = &tables.weights;
    let mut total = 0.0;
    let mut reasons = Vec::new();
    let mut matched_words: HashSet<String> = HashSet::new();

    let score_target = |pattern: &str, strength| -> Option<(f64, bool)> {
        let (matched, partial) = match_section_pattern(&section_lower, pattern);
        if !matched {
            return None;
        }
        let mut weight = weights.of(strength);
        if partial {
            weight *= weights.partial_factor;
        }
        Some((weight, partial))
    };

    for phrase in &tables.priority_phrases {
        let compact = phrase.replace(' ', "");
        if !keywords.iter().any(|k| *k == *phrase || *k == compact) {
            continue;
        }
        let Some(targets) = tables.keyword_targets(phrase) else {
            continue;
        };
        for target in targets {
            if let Some((weight, partial)) = score_target(&target.section, target.weight) {
                total += weight;
                let how = if partial { "partially matches" } else { "matches" };
                reasons.push(format!("Priority phrase '{}' {} section: {}", phrase, how, pct(weight)));
                matched_words.extend(phrase.split_whitespace().map(str::to_lowercase));
                break;
            }
        }
    }

    for keyword in keywords {
        if matched_words.contains(keyword) || tables.is_priority_phrase(keyword) {
            continue;
        }
        let Some(targets) = tables.keyword_targets(keyword) else {
            continue;
        };
        for target in targets {
            if let Some((weight, partial)) = score_target(&target.section, target.weight) {
                total += weight;
                let how = if partial { "partially matches" } else { "matches" };
                reasons.push(format!("Keyword '{}' {} section: {}", keyword, how, pct(weight)));
                break;
            }
        }
    }

    if total > weights.keyword_cap {
        total = weights.keyword_cap;
        if reasons.len() > 1 {
            reasons.push(format!("(capped at {}% total)", (weights.keyword_cap * 100.0).round() as i64));
        }
    }
    (total, reasons)
}

/// Whole pattern contained in the section, or every 4+ letter word of it (partial).
fn match_section_pattern(section_lower: &str, pattern: &str) -> (bool, bool) {
    let pattern_lower = pattern.to_lowercase();
    if section_lower.contains(&pattern_lower) {
        return (true, false);
    }
    let words: Vec<&str> = pattern_lower.split_whitespace().filter(|w| w.len() >= 4).collect();
    if !words.is_empty() && words.iter().all(|w| section_lower.contains(w)) {
        return (true, true);
    }
    (false, false)
}

/// First five meaningful words of a heading.
pub fn heading_keywords(heading: &str, tables: &ScoringTables) -> Vec<String> {
    let cleaned = strip_number(heading).to_lowercase();
    let stop = ScoringTables::word_set(&tables.heading_stopwords);
    WORD3_RE
        .find_iter(&cleaned)
        .map(|m| m.as_str())
        .filter(|w| !stop.contains(w))
        .take(5)
        .map(String::from)
        .collect()
}

/// First ten meaningful words of the prose that precedes the code block.
pub fn prose_keywords(content: &str, tables: &ScoringTables) -> Vec<String> {
    let mut prose: Vec<&str> = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            break;
        }
        if trimmed.starts_with('#') || trimmed.is_empty() {
            continue;
        }
        prose.push(line);
    }
    let text = prose.join(" ").to_lowercase();
    let stop = ScoringTables::word_set(&tables.prose_stopwords);
    WORD3_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|w| !stop.contains(w))
        .take(10)
        .map(String::from)
        .collect()
}

/// Domain-bearing words of a section path, with the ambiguous stoplist applied first.
pub fn subsection_keywords(section: &str, tables: &ScoringTables) -> Vec<String> {
    let words = &tables.subsection;
    let lower = section.to_lowercase();
    let link_section = lower.contains("symlink") || lower.contains("link");
    let path_metadata_section = lower.contains("path metadata") || lower.contains("pathmetadata");

    let mut text = SUBSECTION_NUMBER_RE.replace(&lower, "").into_owned();
    for re in SUBSECTION_SUFFIX_RES.iter() {
        text = re.replace(&text, "").into_owned();
    }

    let mut out = Vec::new();
    for word in SUBSECTION_SPLIT_RE.split(&text) {
        let word = word.trim();
        if word.len() < 3 || tables.short_stopwords.iter().any(|w| w == word) || DOTTED_NUMBER_RE.is_match(word) {
            continue;
        }
        if link_section {
            if words.link_words.iter().any(|w| w == word) {
                out.push(word.to_string());
            }
            continue;
        }
        if path_metadata_section {
            if words.path_metadata_words.iter().any(|w| w == word) {
                out.push(word.to_string());
            }
            continue;
        }
        if words.specific.iter().any(|w| w == word) {
            out.push(word.to_string());
        } else if words.ambiguous.iter().any(|w| w == word) {
            continue;
        } else if word.len() >= 4 && words.promoted.iter().any(|w| w == word) {
            out.push(word.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorFlags {
    pub section: bool,
    pub definition: bool,
    pub helper: bool,
}

pub fn error_flags(section_lower: &str, name_lower: &str, kind: Kind) -> ErrorFlags {
    let helper = section_lower.contains("error")
        && section_lower.contains("helper")
        && section_lower.contains("function");
    let section = (section_lower.contains("error types")
        || (section_lower.contains("error")
            && (section_lower.contains("type") || section_lower.contains("errors"))))
        && !helper;
    let definition = name_lower.starts_with("err")
        || name_lower.contains("error")
        || (kind == Kind::Type && name_lower.contains("err"));
    ErrorFlags {
        section,
        definition,
        helper,
    }
}

/// Subject of an error name: `ErrCompressionFailed` => `compression`.
pub fn error_domain<'a>(name: &str, tables: &'a ScoringTables) -> Option<&'a str> {
    let lower = name.to_lowercase();
    let trimmed = lower.strip_prefix("err").unwrap_or(&lower);
    let trimmed = trimmed.strip_suffix("error").unwrap_or(trimmed);
    tables
        .error_subjects
        .iter()
        .find(|subject| trimmed.contains(subject.as_str()))
        .map(String::as_str)
}

/// Type names a function is likely about: `NewWidget`, `GetWidgetName`, its own leading word.
pub fn function_types(def: &Definition) -> HashSet<String> {
    let mut out = HashSet::new();
    if def.kind != Kind::Function {
        return out;
    }
    let name = def.name.as_str();
    let lower = name.to_lowercase();
    let leading_alnum =
        |s: &str| -> String { s.chars().take_while(|c| c.is_ascii_alphanumeric()).collect() };

    if lower.starts_with("new") && name.len() > 3 {
        let candidate = &name[3..];
        if candidate.chars().next().is_some_and(|c| c.is_uppercase()) {
            out.insert(strip_generics(candidate).to_lowercase());
        }
    }
    for prefix in ["get", "set", "unmarshal", "marshal", "add", "remove", "has", "is"] {
        if lower.starts_with(prefix) && name.len() > prefix.len() {
            let rest = &name[prefix.len()..];
            if rest.chars().next().is_some_and(|c| c.is_uppercase()) {
                let base = leading_alnum(rest);
                if !base.is_empty() {
                    out.insert(strip_generics(&base).to_lowercase());
                }
            }
        }
    }
    if name.chars().next().is_some_and(|c| c.is_uppercase()) {
        let base = leading_alnum(name);
        if !base.is_empty() {
            out.insert(base.to_lowercase());
        }
    }
    out
}

/// Name a section is "about": leaf title without number and trailing kind word, alphanumerics only.
pub fn section_primary_name(section: &str) -> String {
    let leaf = strip_number(leaf(section)).to_lowercase();
    let mut trimmed = leaf.as_str();
    for suffix in ["interface", "type", "types", "structure", "struct", "definition", "definitions"] {
        if let Some(rest) = trimmed.strip_suffix(suffix) {
            if rest.ends_with(' ') {
                trimmed = rest.trim();
                break;
            }
        }
    }
    trimmed.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Lowercase camelCase words of an identifier, generics removed.
pub fn camel_words(text: &str) -> Vec<String> {
    let cleaned: String = strip_generics(text)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    CAMEL_RE
        .find_iter(&cleaned)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Lowercase alphanumeric tokens of a section's leaf title.
pub fn leaf_tokens(section: &str) -> HashSet<String> {
    let leaf = strip_number(leaf(section)).to_lowercase();
    TOKEN_RE
        .find_iter(&leaf)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// First five 4+ letter words of a lowercase comment.
pub fn comment_words(comment_lower: &str) -> Vec<&str> {
    WORD4_RE.find_iter(comment_lower).map(|m| m.as_str()).take(5).collect()
}

pub fn is_core_package_type(def: &Definition, tables: &ScoringTables) -> bool {
    let core = |name: String| tables.core_package_types.contains(&name);
    if core(def.name.to_lowercase()) {
        return true;
    }
    match (def.kind, def.receiver_type.as_deref()) {
        (Kind::Method, Some(receiver)) => core(strip_generics(receiver).to_lowercase()),
        _ => false,
    }
}

/// Underscore-separated tokens of a document file name.
pub fn file_tokens(file_name: &str) -> Vec<String> {
    file_name
        .to_lowercase()
        .replace(".md", "")
        .replace('-', "_")
        .split('_')
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// `pattern` tokens appear in `tokens` in order, gaps allowed.
pub fn tokens_contain_sequence(tokens: &[String], pattern: &[String]) -> bool {
    if tokens.is_empty() || pattern.is_empty() {
        return false;
    }
    let mut start = 0;
    for token in pattern {
        match tokens[start..].iter().position(|t| t == token) {
            Some(found) => start += found + 1,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tables() -> ScoringTables {
        ScoringTables::embedded().unwrap()
    }

    #[test]
    fn section_kind_reads_title_words() {
        assert_eq!(section_kind("1. Widgets > 1.1 Widget Type Definitions"), Some(Kind::Type));
        assert_eq!(section_kind("1. Widgets > 1.2 Widget Helper Functions"), Some(Kind::Function));
        assert_eq!(section_kind("1. Cache > 1.2 Cache Query Methods"), Some(Kind::Method));
        assert_eq!(section_kind("1. Cache"), None);
    }

    #[test]
    fn section_level_depends_on_kind() {
        let section = "4. Compression > 4.2 Compression Methods";
        assert_eq!(section_level(section, Kind::Type), "4. Compression");
        assert_eq!(section_level(section, Kind::Method), "4.2 Compression Methods");
        assert_eq!(section_level("4. Compression", Kind::Method), "4. Compression");
    }

    #[test]
    fn comment_keywords_prefer_priority_phrases() {
        let kws = comment_keywords("adds error context to a packageerror using aes", &tables());
        assert_eq!(kws[0], "errorcontext");
        assert!(kws.contains(&"packageerror".to_string()));
        assert!(kws.contains(&"aes".to_string()));
        assert!(kws.contains(&"error".to_string()));
    }

    #[test]
    fn keyword_scores_are_capped() {
        let keywords: Vec<String> = ["encryption", "security", "aes", "cipher", "decrypt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (score, reasons) =
            match_keywords_to_section(&keywords, "5.2 Encryption and Security Methods", &tables());
        assert!((score - 0.35).abs() < 1e-9);
        assert_eq!(reasons.last().map(String::as_str), Some("(capped at 35% total)"));
    }

    #[test]
    fn partial_pattern_match_is_discounted() {
        let keywords = vec!["compression".to_string()];
        let (score, reasons) =
            match_keywords_to_section(&keywords, "Helper Functions for Compression", &tables());
        assert!((score - 0.15 * 0.8).abs() < 1e-9, "score was {}", score);
        assert!(reasons[0].contains("partially"));
    }

    #[test]
    fn subsection_keywords_skip_ambiguous_words() {
        let kws = subsection_keywords("3. Package > 3.4 Package Information and Queries Methods", &tables());
        assert_eq!(kws, vec!["information", "queries"]);
        let kws = subsection_keywords("1. Cache > 1.2 Cache Query Methods", &tables());
        assert_eq!(kws, vec!["query"]);
    }

    #[test]
    fn primary_name_drops_kind_suffix() {
        assert_eq!(section_primary_name("1. Core > 1.1 Package Interface"), "package");
        assert_eq!(section_primary_name("2. FileEntry Types"), "fileentry");
        assert_eq!(section_primary_name("1. Widgets > 1.1 Widget Type Definitions"), "widgettype");
    }

    #[test]
    fn function_types_cover_constructors_and_accessors() {
        let def = Definition::new("NewWidget", Kind::Function, "api_widgets.md");
        let types = function_types(&def);
        assert!(types.contains("widget"));
        assert!(types.contains("newwidget"));

        let def = Definition::new("GetCacheStats", Kind::Function, "api_caching.md");
        assert!(function_types(&def).contains("cachestats"));
    }

    #[test]
    fn error_domain_strips_affixes() {
        let tables = tables();
        assert_eq!(error_domain("ErrCompressionFailed", &tables), Some("compression"));
        assert_eq!(error_domain("SignatureError", &tables), Some("signature"));
        assert_eq!(error_domain("ErrTimeout", &tables), None);
    }

    #[test]
    fn word_matches_respect_boundaries() {
        assert!(word_match("adds error context here", "error context"));
        assert!(!word_match("adds error contexts here", "error context"));
        assert!(!word_match("packageerror", "error"));
        assert!(word_match("a packageerror, then error", "error"));

        assert!(word_followed_by("1.1 package  interface", "package", "interface"));
        assert!(!word_followed_by("1.1 readpackage interface", "package", "interface"));
        assert!(!word_followed_by("1.1 package methods", "package", "interface"));
    }

    #[test]
    fn loose_phrases_allow_one_filler_word() {
        assert!(loose_phrase_match("checks the access control list", "access control"));
        assert!(loose_phrase_match("checks access and control", "access control"));
        assert!(!loose_phrase_match("access is not under control", "access control"));
        assert!(!loose_phrase_match("accessed control", "access control"));
        assert!(loose_phrase_match("access to control the list", "access control list"));
    }

    #[test]
    fn core_package_types_include_receivers() {
        let tables = tables();
        let def = Definition::new("PackageWriter", Kind::Type, "api_core.md");
        assert!(is_core_package_type(&def, &tables));
        let mut def = Definition::new("filePackage.Close", Kind::Method, "api_core.md");
        assert!(!is_core_package_type(&def, &tables));
        def.receiver_type = Some("filePackage".into());
        assert!(is_core_package_type(&def, &tables));
        let def = Definition::new("PackageStats", Kind::Type, "api_core.md");
        assert!(!is_core_package_type(&def, &tables));
    }

    #[test]
    fn clean_comment_drops_return_types() {
        assert_eq!(
            clean_comment("Open opens the file. Returns *Package if found (see *Options)."),
            "Open opens the file. found ."
        );
    }

    #[test]
    fn token_sequences_allow_gaps() {
        let tokens = file_tokens("api_file_mgmt_removal.md");
        assert!(tokens_contain_sequence(&tokens, &file_tokens("file_mgmt")));
        assert!(!tokens_contain_sequence(&tokens, &file_tokens("mgmt_file")));
    }
}
