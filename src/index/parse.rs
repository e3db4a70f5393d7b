use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::Regex;

use super::{heading_label, Entry, IndexTree, Section, CONTINUATION};
use crate::error::{Error, Result};
use crate::markdown::parse_heading;
use crate::model::Kind;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\s+(.+)$").unwrap());
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)(?:\.)?\s+(.+)$").unwrap());
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+\*\*`([^`]+)`\*\*").unwrap());
static TOC_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+\[[^\]]*\]\(#[^)]*\)\s*$").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)#]+)(?:#([^)]+))?\)").unwrap());

/// Read and parse the index file at `path`.
pub fn load(path: &Path) -> Result<IndexTree> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse(&content)
}

/// Parse index markdown into a tree of numbered sections with their current entries.
pub fn parse(content: &str) -> Result<IndexTree> {
    let lines: Vec<&str> = content.lines().collect();
    let mut tree = IndexTree::default();

    // Open section per heading level (2..=4); `None` marks a skipped heading.
    let mut stack: [Option<usize>; 5] = [None; 5];
    let mut seen_paths: HashMap<String, usize> = HashMap::new();
    let mut overview_started = false;
    let mut numbered_started = false;
    let mut current: Option<usize> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if tree.title.is_empty() && !overview_started && !numbered_started {
            if let Some(caps) = TITLE_RE.captures(line) {
                tree.title = caps[1].trim().to_string();
                i += 1;
                continue;
            }
        }

        if let Some((level, text)) = parse_heading(line) {
            let numbered = (2..=4).contains(&level)
                .then(|| NUMBER_RE.captures(text))
                .flatten();

            match numbered {
                Some(caps) => {
                    numbered_started = true;
                    let number = caps[1].to_string();
                    let title = caps[2].trim().to_string();
                    for slot in stack.iter_mut().skip(level) {
                        *slot = None;
                    }
                    current = None;

                    if number.split('.').next() == Some("0") {
                        // Placeholder sections for unsorted definitions are never indexed.
                        stack[level] = None;
                        i += 1;
                        continue;
                    }

                    let parent = (2..level).rev().find_map(|l| stack[l]);
                    if level > 2 && parent.is_none() {
                        log::debug!("skipping orphan heading '{}' at line {}", text, i + 1);
                        stack[level] = None;
                        i += 1;
                        continue;
                    }

                    let label = heading_label(&number, &title, level);
                    let path = match parent {
                        Some(p) => format!("{} > {}", tree.sections[p].path, label),
                        None => label,
                    };
                    if let Some(first) = seen_paths.get(&path) {
                        return Err(Error::DuplicateHeadings(format!(
                            "{} (lines {}, {})",
                            path,
                            first,
                            i + 1
                        )));
                    }
                    seen_paths.insert(path.clone(), i + 1);

                    let idx = tree.sections.len();
                    tree.sections.push(Section {
                        number,
                        kind: Kind::from_heading(&title),
                        title,
                        level,
                        line: i + 1,
                        parent,
                        path,
                        current: Vec::new(),
                        expected: Vec::new(),
                    });
                    stack[level] = Some(idx);
                    current = Some(idx);
                    i += 1;
                    continue;
                }
                None if !numbered_started && level >= 2 => {
                    overview_started = true;
                }
                None => {
                    if (2..=4).contains(&level) {
                        current = None;
                    }
                }
            }
        }

        if overview_started && !numbered_started {
            tree.overview.push(line.to_string());
            i += 1;
            continue;
        }

        if !overview_started && !numbered_started {
            // The table of contents is regenerated on render.
            if !tree.title.is_empty() && !TOC_LINE_RE.is_match(line) && parse_heading(line).is_none() {
                tree.preamble.push(line.to_string());
            }
            i += 1;
            continue;
        }

        if let (Some(idx), Some(caps)) = (current, ENTRY_RE.captures(line)) {
            let kind = tree.sections[idx].kind;
            let mut entry = Entry::new(caps[1].trim(), kind);
            entry.line = i + 1;
            if let Some(link) = LINK_RE.captures(line) {
                entry.link_text = link[1].trim().to_string();
                let file = link[2].trim().to_string();
                check_link_path(&file)?;
                entry.link_file = file;
                entry.link_anchor = link.get(3).map(|m| m.as_str().trim().to_string());
            }
            let (description, next) = parse_description(&lines, i + 1);
            entry.description = description;
            tree.sections[idx].current.push(entry);
            i = next;
            continue;
        }

        i += 1;
    }

    trim_blank_lines(&mut tree.preamble);
    while tree.overview.last().is_some_and(|l| l.trim().is_empty()) {
        tree.overview.pop();
    }
    Ok(tree)
}

fn trim_blank_lines(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.trim().is_empty()).count();
    lines.drain(..leading);
}

/// Collect description bullets under an entry; returns them and the next unread line.
fn parse_description(lines: &[&str], start: usize) -> (Vec<String>, usize) {
    let mut out: Vec<String> = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }
        if ENTRY_RE.is_match(line) || line.trim_start().starts_with("##") {
            break;
        }
        if !line.starts_with(' ') && !line.starts_with('\t') {
            break;
        }
        let trimmed = line.trim();
        if let Some(bullet) = trimmed.strip_prefix("- ") {
            out.push(bullet.trim().to_string());
        } else if out.is_empty() {
            out.push(trimmed.to_string());
        } else {
            out.push(format!("{}{}", CONTINUATION, trimmed));
        }
        i += 1;
    }
    (out, i)
}

fn check_link_path(file: &str) -> Result<()> {
    let path = Path::new(file);
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes || file.contains("://") {
        return Err(Error::UnsafePath(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INDEX: &str = "\
# API Definitions Index

- [Overview](#overview)
- [1. Cache](#1-cache)

## Overview

This index lists every definition.

## 0. Unsorted Types

- **`Leftover`** - [Definition](api_misc.md#misc)

## 1. Cache

### 1.1 Cache Types

- **`Cache[K]`** - [Cache](api_caching.md#11-cache)
  - Cache holds entries keyed by K.
    Entries expire after the TTL.

### 1.2 Cache Methods

- **`Cache.Put`** - [Put](api_caching.md#put)
- **`Cache.Get`** - [Get](api_caching.md)
  - Short.
";

    #[test]
    fn parses_sections_entries_and_descriptions() {
        let tree = parse(INDEX).unwrap();
        assert_eq!(tree.title, "API Definitions Index");
        let paths: Vec<&str> = tree.paths().collect();
        assert_eq!(
            paths,
            vec!["1. Cache", "1. Cache > 1.1 Cache Types", "1. Cache > 1.2 Cache Methods"]
        );

        let types = tree.section("1. Cache > 1.1 Cache Types").unwrap();
        assert_eq!(types.kind, Kind::Type);
        assert_eq!(types.parent, Some(0));
        let cache = &types.current[0];
        assert_eq!(cache.name, "Cache");
        assert_eq!(cache.raw_name, "Cache[K]");
        assert_eq!(cache.link_anchor.as_deref(), Some("11-cache"));
        assert_eq!(
            cache.description,
            vec!["Cache holds entries keyed by K.", "CONT: Entries expire after the TTL."]
        );
        assert!(cache.has_description());

        let methods = tree.section("1. Cache > 1.2 Cache Methods").unwrap();
        assert_eq!(methods.kind, Kind::Method);
        assert_eq!(methods.current.len(), 2);
        assert_eq!(methods.current[1].link_anchor, None);
        assert!(!methods.current[1].has_description());
    }

    #[test]
    fn keeps_overview_and_skips_unsorted_sections() {
        let tree = parse(INDEX).unwrap();
        assert_eq!(tree.overview, vec!["## Overview", "", "This index lists every definition."]);
        assert!(tree.find_current("Leftover").is_none());
    }

    #[test]
    fn keeps_preamble_but_not_table_of_contents() {
        let doc = "# T\n\nGenerated by hand.\nDo not reorder.\n\n- [Overview](#overview)\n  - [1. Cache](#1-cache)\n\n## Overview\n\nText.\n\n## 1. Cache\n";
        let tree = parse(doc).unwrap();
        assert_eq!(tree.preamble, vec!["Generated by hand.", "Do not reorder."]);
        assert_eq!(tree.overview, vec!["## Overview", "", "Text."]);
        assert!(parse(INDEX).unwrap().preamble.is_empty());
    }

    #[test]
    fn duplicate_headings_are_fatal() {
        let doc = "# T\n\n## 1. Cache\n\n### 1.1 Types\n\n### 1.1 Types\n";
        let err = parse(doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate headings detected in index file: 1. Cache > 1.1 Types (lines 5, 7)"
        );
    }

    #[test]
    fn unsafe_link_paths_are_fatal() {
        let doc = "# T\n\n## 1. Cache\n\n- **`Cache`** - [Cache](../secret.md#x)\n";
        assert!(matches!(parse(doc), Err(Error::UnsafePath(_))));
    }

    #[test]
    fn subsection_without_parent_is_skipped() {
        let doc = "# T\n\n### 1.1 Lonely Types\n\n- **`Lonely`** - [L](a.md#l)\n";
        let tree = parse(doc).unwrap();
        assert!(tree.sections.is_empty());
    }
}
