//! The definitions index document: a numbered heading hierarchy whose
//! sections list definitions with a link and a short description.
//!
//! Every section carries two views. `current` is what the file on disk
//! says today; `expected` is filled by placement and is what `--apply`
//! writes back.

mod parse;
mod render;

pub use parse::{load, parse};
pub use render::{entry_line, render};

use crate::model::{strip_generics, Definition, Kind, LinkTarget};

/// Descriptions shorter than this are treated as missing.
pub const MIN_DESCRIPTION_LEN: usize = 20;

/// Prefix marking a description line that continues the previous bullet.
pub const CONTINUATION: &str = "CONT: ";

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub raw_name: String,
    pub kind: Kind,
    pub link_text: String,
    pub link_file: String,
    pub link_anchor: Option<String>,
    pub description: Vec<String>,
    /// Line in the index file, 0 for entries that only exist in the expected view.
    pub line: usize,
    /// Doc comment of the source definition (expected entries).
    pub doc_comment: String,
    /// `file:line` of the source definition (expected entries).
    pub origin: Option<String>,
    pub confidence: f64,
}

impl Entry {
    pub fn new(raw_name: &str, kind: Kind) -> Self {
        Entry {
            name: strip_generics(raw_name),
            raw_name: raw_name.to_string(),
            kind,
            link_text: String::new(),
            link_file: String::new(),
            link_anchor: None,
            description: Vec::new(),
            line: 0,
            doc_comment: String::new(),
            origin: None,
            confidence: 0.0,
        }
    }

    /// Expected entry for a placed definition.
    pub fn from_definition(def: &Definition) -> Self {
        let link = def.canonical.clone().unwrap_or_else(|| LinkTarget {
            file: def.origin.clone(),
            anchor: None,
            text: def.heading.clone().unwrap_or_default(),
        });
        Entry {
            name: def.name.clone(),
            raw_name: def.raw_name.clone(),
            kind: def.kind,
            link_text: link.text,
            link_file: link.file,
            link_anchor: link.anchor,
            description: Vec::new(),
            line: 0,
            doc_comment: def.doc_comment.clone(),
            origin: Some(format!("{}:{}", def.origin, def.line)),
            confidence: def.confidence(),
        }
    }

    /// Description joined into one string, continuation markers removed.
    pub fn description_text(&self) -> Option<String> {
        if self.description.is_empty() {
            return None;
        }
        let joined = self
            .description
            .iter()
            .map(|line| line.strip_prefix(CONTINUATION).unwrap_or(line).trim())
            .collect::<Vec<_>>()
            .join(" ");
        Some(joined.trim().to_string())
    }

    pub fn has_description(&self) -> bool {
        self.description_text()
            .map(|text| text.chars().count() >= MIN_DESCRIPTION_LEN)
            .unwrap_or(false)
    }

    /// `file#anchor` this entry links to.
    pub fn href(&self) -> String {
        match &self.link_anchor {
            Some(anchor) => format!("{}#{}", self.link_file, anchor),
            None => self.link_file.clone(),
        }
    }

    /// Ordering key inside a section: method part for `Type.Method`, else the name.
    pub fn sort_key(&self) -> String {
        match self.name.split_once('.') {
            Some((_, method)) => method.to_lowercase(),
            None => self.name.to_lowercase(),
        }
    }
}

/// Entry order inside a section, shared by rendering and the ordering check:
/// method part first, then the full name case-insensitively, uppercase first on ties.
pub fn expected_order(a: &Entry, b: &Entry) -> std::cmp::Ordering {
    let key = |e: &Entry| {
        let upper_first = if e.name.chars().next().is_some_and(char::is_uppercase) {
            0
        } else {
            1
        };
        (e.sort_key(), e.name.to_lowercase(), upper_first, e.name.clone())
    };
    key(a).cmp(&key(b))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Dotted section number, e.g. `3.2`.
    pub number: String,
    pub title: String,
    pub level: usize,
    pub line: usize,
    pub parent: Option<usize>,
    pub kind: Kind,
    /// Full path label, e.g. `3. Cache > 3.2 Cache Query Methods`.
    pub path: String,
    pub current: Vec<Entry>,
    pub expected: Vec<Entry>,
}

impl Section {
    /// Heading text as written: `3. Cache` for H2, `3.2 Cache Methods` below.
    pub fn label(&self) -> String {
        heading_label(&self.number, &self.title, self.level)
    }

    pub fn current_entry(&self, name: &str) -> Option<&Entry> {
        self.current.iter().find(|e| e.name == name)
    }

    pub fn expected_entry(&self, name: &str) -> Option<&Entry> {
        self.expected.iter().find(|e| e.name == name)
    }
}

pub(crate) fn heading_label(number: &str, title: &str, level: usize) -> String {
    if level == 2 {
        format!("{}. {}", number, title)
    } else {
        format!("{} {}", number, title)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexTree {
    pub title: String,
    /// Prose between the title and the first `##` heading, without the table of contents.
    pub preamble: Vec<String>,
    /// Unnumbered `##` sections before the first numbered one, kept verbatim.
    pub overview: Vec<String>,
    /// Sections in document order.
    pub sections: Vec<Section>,
}

impl IndexTree {
    pub fn section(&self, path: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.path == path)
    }

    pub fn section_index(&self, path: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.path.as_str())
    }

    /// Section currently listing `name`, with the entry.
    pub fn find_current(&self, name: &str) -> Option<(&Section, &Entry)> {
        self.sections
            .iter()
            .find_map(|s| s.current_entry(name).map(|e| (s, e)))
    }

    pub fn find_expected(&self, name: &str) -> Option<(&Section, &Entry)> {
        self.sections
            .iter()
            .find_map(|s| s.expected_entry(name).map(|e| (s, e)))
    }

    pub fn current_count(&self) -> usize {
        self.sections.iter().map(|s| s.current.len()).sum()
    }

    pub fn expected_count(&self) -> usize {
        self.sections.iter().map(|s| s.expected.len()).sum()
    }

    pub fn clear_expected(&mut self) {
        for section in &mut self.sections {
            section.expected.clear();
        }
    }

    pub fn sort_expected(&mut self) {
        for section in &mut self.sections {
            section.expected.sort_by(expected_order);
        }
    }

    /// Record on each definition which section the index lists it under today.
    pub fn annotate_current_sections(&self, definitions: &mut [Definition]) {
        for def in definitions.iter_mut() {
            if let Some((section, _)) = self.find_current(&def.name) {
                def.current_section = Some(section.path.clone());
            }
        }
    }
}
