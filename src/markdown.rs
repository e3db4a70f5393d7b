use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub line: usize,
    pub level: usize,
    pub text: String,
}

/// Parse an ATX heading line into (level, text).
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING_RE.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2)?.as_str().trim_end_matches('#').trim();
    Some((level, text))
}

/// Headings outside fenced code blocks, with 1-based line numbers.
pub fn headings(content: &str) -> Vec<Heading> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for (i, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((level, text)) = parse_heading(line) {
            out.push(Heading {
                line: i + 1,
                level,
                text: text.to_string(),
            });
        }
    }
    out
}

/// GitHub-style heading anchor.
///
/// Backticks are dropped but their content kept, ` - ` becomes `---`,
/// punctuation is removed and runs of spaces or hyphens collapse to one hyphen.
pub fn anchor(text: &str) -> String {
    let lower = text.replace('`', "").to_lowercase();
    let parts: Vec<String> = lower
        .split(" - ")
        .map(|part| {
            let cleaned = NON_SLUG_RE.replace_all(part, "");
            SEPARATOR_RE.replace_all(&cleaned, "-").into_owned()
        })
        .collect();
    parts.join("---").trim_matches('-').to_string()
}

/// Tracks anchors already handed out in one document so repeats get `-1`, `-2`.
#[derive(Debug, Default)]
pub struct AnchorSet {
    seen: HashMap<String, usize>,
}

impl AnchorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(&mut self, text: &str) -> String {
        let base = anchor(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}
