use super::{Entry, IndexTree, CONTINUATION};
use crate::markdown::{anchor, parse_heading};

/// Render the expected view of `tree` as a complete index document.
///
/// The table of contents is regenerated from the overview headings and the
/// numbered sections; the preamble and overview prose are written back verbatim.
pub fn render(tree: &IndexTree) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", tree.title));
    lines.push(String::new());
    if !tree.preamble.is_empty() {
        lines.extend(tree.preamble.iter().cloned());
        lines.push(String::new());
    }

    for line in &tree.overview {
        if let Some((2, text)) = parse_heading(line) {
            lines.push(format!("- [{}](#{})", text, anchor(text)));
        }
    }
    for section in &tree.sections {
        let label = section.label();
        let indent = "  ".repeat(section.level.saturating_sub(2));
        lines.push(format!("{}- [{}](#{})", indent, label, anchor(&label)));
    }
    lines.push(String::new());

    if !tree.overview.is_empty() {
        lines.extend(tree.overview.iter().cloned());
        lines.push(String::new());
    }

    for section in &tree.sections {
        lines.push(format!("{} {}", "#".repeat(section.level), section.label()));
        lines.push(String::new());
        if section.expected.is_empty() {
            continue;
        }
        for entry in &section.expected {
            render_entry(entry, &mut lines);
        }
        lines.push(String::new());
    }

    let mut out = lines.join("\n").trim_end().to_string();
    out.push('\n');
    out
}

/// The entry's own line, without its description.
pub fn entry_line(entry: &Entry) -> String {
    let text = if entry.link_text.is_empty() {
        "Definition"
    } else {
        entry.link_text.as_str()
    };
    format!("- **`{}`** - [{}]({})", entry.raw_name, text, entry.href())
}

fn render_entry(entry: &Entry, lines: &mut Vec<String>) {
    lines.push(entry_line(entry));
    for line in &entry.description {
        match line.strip_prefix(CONTINUATION) {
            Some(rest) => lines.push(format!("    {}", rest)),
            None => lines.push(format!("  - {}", line)),
        }
    }
}
