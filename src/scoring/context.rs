use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::text::{self, ErrorFlags};
use crate::index::IndexTree;
use crate::model::{strip_generics, Definition, Kind};
use crate::tables::ScoringTables;

static IMPLEMENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)implements\s+([A-Z][A-Za-z0-9]+)").unwrap());

/// How far around an `implements X` mention the struct name may appear.
const IMPLEMENTS_WINDOW: usize = 200;

/// Per-run lookups over the index that rules need beyond the section they score.
#[derive(Debug, Default, Clone)]
pub struct SectionLookups {
    paths: Vec<String>,
    valid_types: HashMap<String, HashSet<String>>,
}

impl SectionLookups {
    pub fn from_tree(tree: &IndexTree) -> Self {
        let mut paths: Vec<String> = tree.paths().map(String::from).collect();
        paths.sort();

        let own: Vec<HashSet<String>> = tree
            .sections
            .iter()
            .map(|section| {
                if section.kind != Kind::Type {
                    return HashSet::new();
                }
                section
                    .current
                    .iter()
                    .filter(|e| !e.name.contains('.'))
                    .map(|e| strip_generics(&e.name).to_lowercase())
                    .collect()
            })
            .collect();

        let mut valid_types = HashMap::new();
        for (idx, section) in tree.sections.iter().enumerate() {
            let types = if section.kind == Kind::Type {
                own[idx].clone()
            } else {
                // Method and function sections take the set of the nearest type section above.
                let mut parent = section.parent;
                let mut inherited = HashSet::new();
                while let Some(p) = parent {
                    if tree.sections[p].kind == Kind::Type {
                        inherited = own[p].clone();
                        break;
                    }
                    parent = tree.sections[p].parent;
                }
                inherited
            };
            if !types.is_empty() {
                valid_types.insert(section.path.clone(), types);
            }
        }

        SectionLookups { paths, valid_types }
    }

    /// Every section path label, sorted.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Receiver types a section's structure admits, when it names any.
    pub fn valid_types(&self, path: &str) -> Option<&HashSet<String>> {
        self.valid_types.get(path)
    }
}

/// Everything about a definition that does not depend on the section being scored.
#[derive(Debug, Clone, Default)]
pub struct DefinitionFacts {
    pub domain: Option<String>,
    /// Doc comment with return types and typed parentheticals removed, lowercased.
    pub comment: String,
    pub comment_keywords: Vec<String>,
    pub heading_keywords: Vec<String>,
    pub prose_keywords: Vec<String>,
    pub function_types: HashSet<String>,
    /// Interface the prose says this type implements.
    pub implements: Option<String>,
}

impl DefinitionFacts {
    pub fn new(def: &Definition, tables: &ScoringTables) -> Self {
        let comment = text::clean_comment(&def.doc_comment).to_lowercase();
        let comment_keywords = text::comment_keywords(&comment, tables);
        let heading_keywords = def
            .heading
            .as_deref()
            .map(|h| text::heading_keywords(h, tables))
            .unwrap_or_default();
        DefinitionFacts {
            domain: detect_domain(def, tables),
            comment,
            comment_keywords,
            heading_keywords,
            prose_keywords: text::prose_keywords(&def.section_prose, tables),
            function_types: text::function_types(def),
            implements: implemented_interface(def),
        }
    }
}

/// Domain a definition belongs to, first match wins.
pub fn detect_domain(def: &Definition, tables: &ScoringTables) -> Option<String> {
    let name = def.name.to_lowercase();
    let receiver = def.receiver_type.as_deref().unwrap_or_default().to_lowercase();
    let heading = def.heading.as_deref().unwrap_or_default().to_lowercase();

    let signing = ["signature", "signing"];
    if text::contains_any(&name, &signing)
        || text::contains_any(&receiver, &signing)
        || text::contains_any(&heading, &signing)
    {
        return Some("signature".to_string());
    }

    if let Some(domain) = tables.domain_files.get(&def.origin) {
        return Some(domain.clone());
    }

    if def.raw_name.contains('[')
        || def.receiver_type.as_deref().is_some_and(|r| r.contains('['))
        || def.generic_parameters.as_deref().is_some_and(|g| !g.is_empty())
    {
        return Some("generic".to_string());
    }

    let dotless = name.replace('.', "");
    for mapping in &tables.keyword_sections {
        let keyword = mapping.keyword.replace(' ', "");
        if !dotless.contains(&keyword) && !(!receiver.is_empty() && receiver.contains(&keyword)) {
            continue;
        }
        let domain = mapping
            .targets
            .first()
            .and_then(|t| tables.domain_of_section_pattern(&t.section));
        if let Some(domain) = domain {
            return Some(domain.to_string());
        }
    }

    if ["strategy", "builder", "validator"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
    {
        if let Some(rule) = tables
            .suffix_domains
            .iter()
            .find(|rule| text::contains_any_owned(&name, &rule.keywords))
        {
            return Some(rule.domain.clone());
        }
    }

    tables
        .fallback_domains
        .iter()
        .find(|rule| text::contains_any_owned(&name, &rule.keywords))
        .map(|rule| rule.domain.clone())
}

/// `implements Foo` in the prose, close enough to the type's own name.
fn implemented_interface(def: &Definition) -> Option<String> {
    if def.kind != Kind::Type || def.section_prose.is_empty() {
        return None;
    }
    let prose = &def.section_prose;
    let prose_lower = prose.to_lowercase();
    let name_lower = def.name.to_lowercase();
    for caps in IMPLEMENTS_RE.captures_iter(prose) {
        let (Some(whole), Some(iface)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let iface = iface.as_str();
        if iface.eq_ignore_ascii_case(&def.name) {
            continue;
        }
        let start = floor_boundary(&prose_lower, whole.start().saturating_sub(IMPLEMENTS_WINDOW));
        let end = floor_boundary(&prose_lower, (whole.end() + IMPLEMENTS_WINDOW).min(prose_lower.len()));
        if prose_lower[start..end].contains(&name_lower) {
            return Some(iface.to_string());
        }
    }
    None
}

fn floor_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Inputs to every rule for one (definition, section) pair.
pub struct ScoringContext<'a> {
    pub definition: &'a Definition,
    pub facts: &'a DefinitionFacts,
    pub tables: &'a ScoringTables,
    pub lookups: &'a SectionLookups,
    /// Section path label being scored.
    pub section: &'a str,
    pub section_lower: String,
    pub name_lower: String,
    pub heading_lower: String,
    pub prose_lower: String,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        definition: &'a Definition,
        facts: &'a DefinitionFacts,
        section: &'a str,
        tables: &'a ScoringTables,
        lookups: &'a SectionLookups,
    ) -> Self {
        ScoringContext {
            definition,
            facts,
            tables,
            lookups,
            section,
            section_lower: section.to_lowercase(),
            name_lower: definition.name.to_lowercase(),
            heading_lower: definition.heading.as_deref().unwrap_or_default().to_lowercase(),
            prose_lower: definition.section_prose.to_lowercase(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.definition.kind
    }

    pub fn domain(&self) -> Option<&str> {
        self.facts.domain.as_deref()
    }

    pub fn has(&self, needle: &str) -> bool {
        self.section_lower.contains(needle)
    }

    pub fn has_any<I>(&self, needles: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        needles
            .into_iter()
            .any(|n| self.section_lower.contains(n.as_ref()))
    }

    /// `helper ... function` sections.
    pub fn is_helper_section(&self) -> bool {
        self.has("helper") && self.has("function")
    }

    pub fn error_flags(&self) -> ErrorFlags {
        text::error_flags(&self.section_lower, &self.name_lower, self.kind())
    }

    /// A non-error definition scored against an Error Types section.
    ///
    /// Rules that reward kind agreement or comment keywords stay silent for these.
    pub fn kind_conflict(&self) -> bool {
        let flags = self.error_flags();
        flags.section
            && !flags.helper
            && match self.kind() {
                Kind::Method | Kind::Function => true,
                Kind::Type => !flags.definition,
            }
    }

    /// Lowercase method part of `Type.Method`, the whole name otherwise.
    pub fn method_lower(&self) -> String {
        self.definition
            .method_part()
            .unwrap_or(&self.definition.name)
            .to_lowercase()
    }

    /// Section path with the leading H2 number removed.
    pub fn section_text(&self) -> String {
        text::strip_leading_number(&self.section_lower)
    }
}
