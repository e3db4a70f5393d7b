use std::fmt;

use serde::{Deserialize, Serialize};

/// What a definition is, as far as placement cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "type", alias = "struct", alias = "interface", alias = "alias")]
    Type,
    #[serde(rename = "func", alias = "function")]
    Function,
    #[serde(rename = "method")]
    Method,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Type => "type",
            Kind::Function => "func",
            Kind::Method => "method",
        }
    }

    /// Kind implied by an index heading ("Types", "Functions", otherwise methods).
    pub fn from_heading(heading: &str) -> Kind {
        let lower = heading.to_lowercase();
        let has_word = |word: &str| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == word)
        };
        if has_word("types") || has_word("type") {
            Kind::Type
        } else if has_word("functions") {
            Kind::Function
        } else {
            Kind::Method
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an index entry should link to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Link text, normally the heading the anchor points at.
    #[serde(default)]
    pub text: String,
}

impl LinkTarget {
    pub fn href(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}#{}", self.file, anchor),
            None => self.file.clone(),
        }
    }
}

/// Outcome of scoring one definition against the whole index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Winning section path label, `None` when nothing scored above the threshold.
    pub section: Option<String>,
    /// Best non-blocked section regardless of threshold, for reporting.
    pub best_candidate: Option<String>,
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

impl Placement {
    pub fn is_resolved(&self) -> bool {
        self.section.is_some()
    }
}

/// One definition discovered in the API documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Normalized name, `Type.Method` for methods, generic parameters removed.
    pub name: String,
    /// Name as written in the source, generics included.
    #[serde(default)]
    pub raw_name: String,
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_type: Option<String>,
    /// Document file name the definition was found in.
    pub origin: String,
    #[serde(default)]
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_heading: Option<String>,
    #[serde(default)]
    pub section_prose: String,
    #[serde(default)]
    pub doc_comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<LinkTarget>,
    /// Section path the current index lists this definition under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_section: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl Definition {
    pub fn new(name: impl Into<String>, kind: Kind, origin: impl Into<String>) -> Self {
        let name = name.into();
        Definition {
            raw_name: name.clone(),
            name,
            kind,
            receiver_type: None,
            origin: origin.into(),
            line: 0,
            heading: None,
            parent_heading: None,
            section_prose: String::new(),
            doc_comment: String::new(),
            generic_parameters: None,
            canonical: None,
            current_section: None,
            placement: None,
        }
    }

    /// Part after the receiver for methods (`Get` in `Cache.Get`).
    pub fn method_part(&self) -> Option<&str> {
        match self.kind {
            Kind::Method => self.name.split_once('.').map(|(_, method)| method),
            _ => None,
        }
    }

    /// Receiver type, falling back to the prefix of a dotted method name.
    pub fn receiver(&self) -> Option<&str> {
        if let Some(receiver) = self.receiver_type.as_deref() {
            return Some(receiver);
        }
        match self.kind {
            Kind::Method => self.name.split_once('.').map(|(receiver, _)| receiver),
            _ => None,
        }
    }

    pub fn confidence(&self) -> f64 {
        self.placement.as_ref().map(|p| p.confidence).unwrap_or(0.0)
    }

    pub fn resolved_section(&self) -> Option<&str> {
        self.placement.as_ref().and_then(|p| p.section.as_deref())
    }

    /// Fill in fields an external producer may have left empty.
    pub fn normalize(&mut self) {
        if self.raw_name.is_empty() {
            self.raw_name = self.name.clone();
        }
        self.name = strip_generics(&self.name);
        if self.kind == Kind::Method && self.receiver_type.is_none() {
            if let Some((receiver, _)) = self.name.split_once('.') {
                self.receiver_type = Some(receiver.to_string());
            }
        }
    }
}

/// Remove bracketed generic parameter groups: `Option[T]` becomes `Option`.
pub fn strip_generics(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_generic_groups() {
        assert_eq!(strip_generics("Option[T]"), "Option");
        assert_eq!(strip_generics("Result[Map[K, V]].Unwrap"), "Result.Unwrap");
        assert_eq!(strip_generics("Plain"), "Plain");
    }

    #[test]
    fn kind_aliases_collapse_to_type() {
        let kinds: Vec<Kind> =
            serde_json::from_str(r#"["struct", "interface", "alias", "type", "func", "function", "method"]"#)
                .unwrap();
        assert_eq!(
            kinds,
            vec![
                Kind::Type,
                Kind::Type,
                Kind::Type,
                Kind::Type,
                Kind::Function,
                Kind::Function,
                Kind::Method
            ]
        );
    }

    #[test]
    fn heading_kind_uses_whole_words() {
        assert_eq!(Kind::from_heading("1.1 Cache Types"), Kind::Type);
        assert_eq!(Kind::from_heading("1.1 Widget Type Definitions"), Kind::Type);
        assert_eq!(Kind::from_heading("1.3 Cache Helper Functions"), Kind::Function);
        assert_eq!(Kind::from_heading("1.2 Cache Query Methods"), Kind::Method);
        assert_eq!(Kind::from_heading("2. Typesetting"), Kind::Method);
    }

    #[test]
    fn normalize_fills_receiver_and_raw_name() {
        let mut def = Definition::new("Cache[K].Get", Kind::Method, "api_caching.md");
        def.raw_name.clear();
        def.normalize();
        assert_eq!(def.name, "Cache.Get");
        assert_eq!(def.raw_name, "Cache[K].Get");
        assert_eq!(def.receiver_type.as_deref(), Some("Cache"));
        assert_eq!(def.method_part(), Some("Get"));
    }
}
