//! Finding Go definitions in the API documents.
//!
//! Every ` ```go ` block in every markdown file under the docs directory is
//! scanned line by line for exported type, function and method signatures.
//! The heading above the block supplies the link target and the context the
//! scoring rules read.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use regex::Regex;

use crate::error::{Error, Result};
use crate::markdown::{self, AnchorSet, Heading};
use crate::model::{strip_generics, Definition, Kind, LinkTarget};

static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*func\s*\(([^)]*)\)\s*([A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*\(").unwrap()
});
static FUNC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*func\s+([A-Za-z_]\w*)\s*(\[[^\]]*\])?\s*\(").unwrap()
});
static INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:type\s+)?([A-Za-z_]\w*)\s*(\[[^\]]+\])?\s+interface\s*\{\s*$").unwrap()
});
static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*type\s+([A-Za-z_]\w*)\s*(\[[^\]]+\])?\s+\S").unwrap()
});
static DOC_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*//\s?(.*)$").unwrap());
static INLINE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*(.*?)\*/").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Wording that marks a code block as illustration rather than API.
const EXAMPLE_MARKERS: [&str; 13] = [
    "hypothetical",
    "not the actual",
    "this is not",
    "not a real",
    "example only",
    "example type",
    "example interface",
    "example struct",
    "example version",
    "example pattern",
    "illustration only",
    "not an actual",
    "shown for illustration",
];

const EXAMPLE_NAME_PREFIXES: [&str; 4] = ["Example", "Hypothetical", "Mock", "Test"];

/// Answers whether an index link still points somewhere real.
pub trait LinkResolver {
    fn resolves(&self, file: &str, anchor: Option<&str>) -> bool;
}

/// Every document seen during discovery with the anchors its headings produce.
#[derive(Debug, Default, Clone)]
pub struct DocumentCatalog {
    documents: HashMap<String, HashSet<String>>,
}

impl DocumentCatalog {
    pub fn insert(&mut self, file: impl Into<String>, anchors: impl IntoIterator<Item = String>) {
        self.documents
            .entry(file.into())
            .or_default()
            .extend(anchors);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl LinkResolver for DocumentCatalog {
    fn resolves(&self, file: &str, anchor: Option<&str>) -> bool {
        match (self.documents.get(file), anchor) {
            (Some(_), None) => true,
            (Some(anchors), Some(anchor)) => anchors.contains(anchor),
            (None, _) => false,
        }
    }
}

/// Result of scanning the docs directory.
#[derive(Debug, Default)]
pub struct Discovery {
    pub definitions: Vec<Definition>,
    pub catalog: DocumentCatalog,
    /// Names defined in more than one document.
    pub duplicates: Vec<Duplicate>,
}

/// A definition name found in several documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub name: String,
    pub files: Vec<String>,
}

/// Walk `docs_dir` for markdown documents and collect their definitions.
///
/// `index_file` is skipped. `exclude` holds globs matched against paths
/// relative to `docs_dir`.
pub fn discover(docs_dir: &Path, index_file: &Path, exclude: &[String]) -> Result<Discovery> {
    let excludes = build_excludes(exclude)?;
    let index_file = fs::canonicalize(index_file).unwrap_or_else(|_| index_file.to_path_buf());

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    let mut builder = WalkBuilder::new(docs_dir);
    builder.hidden(true).git_ignore(true).git_global(true);
    for entry in builder.build().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if fs::canonicalize(path).is_ok_and(|p| p == index_file) {
            continue;
        }
        let relative = path.strip_prefix(docs_dir).unwrap_or(path);
        if excludes.is_match(relative) {
            log::debug!("excluded {}", relative.display());
            continue;
        }
        files.push((relative_name(relative), path.to_path_buf()));
    }
    files.sort();

    let mut discovery = Discovery::default();
    for (name, path) in &files {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let document = scan_document(name, &content);
        log::debug!("{}: {} definitions", name, document.definitions.len());
        discovery.catalog.insert(name.clone(), document.anchors);
        discovery.definitions.extend(document.definitions);
    }

    discovery.duplicates = find_duplicates(&discovery.definitions);
    if discovery.catalog.is_empty() {
        log::warn!("no markdown documents found under {}", docs_dir.display());
    }
    log::info!(
        "discovered {} definitions in {} documents",
        discovery.definitions.len(),
        files.len()
    );
    Ok(discovery)
}

fn build_excludes(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn relative_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn find_duplicates(definitions: &[Definition]) -> Vec<Duplicate> {
    let mut files: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for def in definitions {
        let seen = files.entry(def.name.as_str()).or_default();
        if !seen.contains(&def.origin.as_str()) {
            seen.push(def.origin.as_str());
        }
    }
    files
        .into_iter()
        .filter(|(_, origins)| origins.len() > 1)
        .map(|(name, origins)| {
            log::debug!("{} defined in {}", name, origins.join(", "));
            Duplicate {
                name: name.to_string(),
                files: origins.into_iter().map(String::from).collect(),
            }
        })
        .collect()
}

/// Definitions and heading anchors of one document.
#[derive(Debug, Default)]
pub struct ScannedDocument {
    pub definitions: Vec<Definition>,
    pub anchors: Vec<String>,
}

/// Scan one markdown document. `file` becomes the definitions' origin and link file.
pub fn scan_document(file: &str, content: &str) -> ScannedDocument {
    let lines: Vec<&str> = content.lines().collect();
    let headings = markdown::headings(content);
    let mut slugs = AnchorSet::new();
    let anchors: Vec<String> = headings.iter().map(|h| slugs.unique(&h.text)).collect();

    let mut definitions = Vec::new();
    for block in go_blocks(&lines) {
        let heading = headings.iter().rposition(|h| h.line < block.start);
        let context = heading.map(|idx| HeadingContext::new(idx, &headings, &anchors, &lines));
        if context.as_ref().is_some_and(|c| c.marks_example(&lines, block.start)) {
            log::debug!("{}:{}: skipping example block", file, block.start);
            continue;
        }

        for (offset, line) in block.code.iter().enumerate() {
            let Some(sig) = parse_signature(line) else {
                continue;
            };
            if !is_exported(&sig.name) || is_example_name(&sig.name) {
                continue;
            }
            if block.code[..offset].iter().rev().take(5).any(|l| has_example_marker(l)) {
                continue;
            }
            let mut def = sig.into_definition(file, block.start);
            def.doc_comment = doc_comment_above(&block.code, offset);
            if let Some(context) = &context {
                context.apply(&mut def, file);
            }
            definitions.push(def);
        }
    }

    ScannedDocument {
        definitions,
        anchors,
    }
}

struct GoBlock<'a> {
    /// 1-based line of the opening fence.
    start: usize,
    code: Vec<&'a str>,
}

fn go_blocks<'a>(lines: &[&'a str]) -> Vec<GoBlock<'a>> {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim() != "```go" {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut code = Vec::new();
        i += 1;
        while i < lines.len() && lines[i].trim() != "```" {
            code.push(lines[i]);
            i += 1;
        }
        // Unterminated blocks are ignored.
        if i < lines.len() {
            blocks.push(GoBlock { start, code });
        }
        i += 1;
    }
    blocks
}

/// The heading a code block sits under, its parent, and that section's prose.
struct HeadingContext {
    text: String,
    parent: Option<String>,
    anchor: String,
    prose: String,
    line: usize,
}

impl HeadingContext {
    fn new(idx: usize, headings: &[Heading], anchors: &[String], lines: &[&str]) -> Self {
        let heading = &headings[idx];
        let parent = headings[..idx]
            .iter()
            .rev()
            .find(|h| h.level < heading.level)
            .map(|h| h.text.clone());
        let end = headings[idx + 1..]
            .iter()
            .find(|h| h.level <= heading.level)
            .map(|h| h.line - 1)
            .unwrap_or(lines.len());
        HeadingContext {
            text: heading.text.clone(),
            parent,
            anchor: anchors[idx].clone(),
            prose: section_prose(&lines[heading.line.min(end)..end]),
            line: heading.line,
        }
    }

    /// Heading text or the prose between the heading and the block announce an example.
    fn marks_example(&self, lines: &[&str], block_start: usize) -> bool {
        if has_example_marker(&self.text) {
            return true;
        }
        let from = self.line.min(block_start - 1);
        lines[from..block_start - 1]
            .iter()
            .any(|line| has_example_marker(line))
    }

    fn apply(&self, def: &mut Definition, file: &str) {
        def.heading = Some(self.text.clone());
        def.parent_heading = self.parent.clone();
        def.section_prose = self.prose.clone();
        def.canonical = Some(LinkTarget {
            file: file.to_string(),
            anchor: Some(self.anchor.clone()),
            text: self.text.clone(),
        });
    }
}

/// Text lines of a section, code blocks and blank lines dropped.
fn section_prose(lines: &[&str]) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || trimmed.is_empty() || markdown::parse_heading(trimmed).is_some() {
            continue;
        }
        out.push(trimmed);
    }
    out.join(" ")
}

fn has_example_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    EXAMPLE_MARKERS.iter().any(|m| lower.contains(m))
}

fn is_example_name(name: &str) -> bool {
    EXAMPLE_NAME_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[derive(Debug, PartialEq)]
struct Signature {
    name: String,
    kind: Kind,
    /// Receiver type as written, pointer removed (`Cache[K, V]`).
    receiver: Option<String>,
    generics: Option<String>,
}

impl Signature {
    fn into_definition(self, file: &str, line: usize) -> Definition {
        let (name, raw_name, receiver_type) = match &self.receiver {
            Some(receiver) => {
                let base = strip_generics(receiver);
                (format!("{}.{}", base, self.name), format!("{}.{}", base, self.name), Some(base))
            }
            None => {
                let raw = match (&self.kind, &self.generics) {
                    (Kind::Type, Some(generics)) => format!("{}{}", self.name, generics),
                    _ => self.name.clone(),
                };
                (self.name.clone(), raw, None)
            }
        };
        let mut def = Definition::new(name, self.kind, file);
        def.raw_name = raw_name;
        def.receiver_type = receiver_type;
        def.generic_parameters = self.generics;
        def.line = line;
        def
    }
}

fn parse_signature(line: &str) -> Option<Signature> {
    if let Some(caps) = METHOD_RE.captures(line) {
        let receiver = receiver_type(&caps[1])?;
        let generics = receiver.find('[').map(|i| receiver[i..].to_string());
        return Some(Signature {
            name: caps[2].to_string(),
            kind: Kind::Method,
            receiver: Some(receiver),
            generics,
        });
    }
    if let Some(caps) = FUNC_RE.captures(line) {
        return Some(Signature {
            name: caps[1].to_string(),
            kind: Kind::Function,
            receiver: None,
            generics: caps.get(2).map(|m| m.as_str().to_string()),
        });
    }
    let caps = INTERFACE_RE.captures(line).or_else(|| TYPE_RE.captures(line))?;
    Some(Signature {
        name: caps[1].to_string(),
        kind: Kind::Type,
        receiver: None,
        generics: caps.get(2).map(|m| m.as_str().trim().to_string()),
    })
}

/// `r *Cache[K, V]` -> `Cache[K, V]`.
fn receiver_type(receiver: &str) -> Option<String> {
    let receiver = receiver.trim();
    let bracket = receiver.find('[').unwrap_or(receiver.len());
    let ty = match receiver.find(char::is_whitespace) {
        Some(space) if space < bracket => &receiver[space..],
        _ => receiver,
    };
    let ty = ty.trim().trim_start_matches('*').trim();
    (!ty.is_empty()).then(|| ty.to_string())
}

fn skip_doc_line(text: &str) -> bool {
    let upper = text.trim().to_uppercase();
    upper.is_empty() || upper.starts_with("TODO:") || upper.starts_with("FIXME:")
}

/// Adjacent `//` lines or a `/* */` block directly above `idx`, joined into one line.
pub fn doc_comment_above(code: &[&str], idx: usize) -> String {
    if idx == 0 || idx >= code.len() {
        return String::new();
    }
    let mut collected: Vec<String> = Vec::new();
    let mut i = idx;
    while i > 0 {
        i -= 1;
        let stripped = code[i].trim();
        if stripped.is_empty() {
            if collected.is_empty() {
                continue;
            }
            break;
        }
        if let Some(caps) = DOC_LINE_RE.captures(stripped) {
            let text = caps[1].trim();
            if !skip_doc_line(text) {
                collected.insert(0, text.to_string());
            }
            continue;
        }
        if stripped.contains("/*") && stripped.contains("*/") {
            let inner = INLINE_BLOCK_RE.replace_all(stripped, "$1");
            let inner = inner.trim();
            if !skip_doc_line(inner) {
                collected.insert(0, inner.to_string());
            }
            continue;
        }
        if stripped.ends_with("*/") {
            let (text, start) = block_comment(code, i);
            if !text.is_empty() {
                collected.insert(0, text);
            }
            i = start;
            continue;
        }
        break;
    }
    WHITESPACE_RE
        .replace_all(collected.join(" ").trim(), " ")
        .into_owned()
}

/// Walk up from the `*/` line at `end` to the matching `/*`; returns the text and the start index.
fn block_comment(code: &[&str], end: usize) -> (String, usize) {
    let mut parts: Vec<String> = Vec::new();
    let mut i = end;
    loop {
        let mut line = code[i].trim();
        let opens = line.starts_with("/*");
        line = line.trim_start_matches("/*").trim_end_matches("*/").trim();
        if !opens {
            line = line.trim_start_matches('*').trim();
        }
        if !skip_doc_line(line) {
            parts.insert(0, line.to_string());
        }
        if opens || i == 0 {
            break;
        }
        i -= 1;
    }
    (parts.join(" "), i)
}

/// Read definitions produced elsewhere, in the same JSON shape `discover` prints.
pub fn load_definitions(path: &Path) -> Result<Vec<Definition>> {
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut definitions: Vec<Definition> =
        serde_json::from_str(&raw).map_err(|source| Error::Definitions {
            path: path.to_path_buf(),
            source,
        })?;
    for def in &mut definitions {
        def.normalize();
    }
    Ok(definitions)
}
