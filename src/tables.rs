//! Lookup tables that drive the scoring rules.
//!
//! The tables are plain data, versioned and loaded once per run. The built-in
//! set ships inside the binary; a project can point `tables` in its config at
//! a replacement file with the same layout.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const TABLES_VERSION: u32 = 1;

const EMBEDDED: &str = include_str!("tables.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Medium,
    Weak,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Weights {
    pub strong: f64,
    pub medium: f64,
    pub weak: f64,
    pub partial_factor: f64,
    pub keyword_cap: f64,
}

impl Weights {
    pub fn of(&self, strength: Strength) -> f64 {
        match strength {
            Strength::Strong => self.strong,
            Strength::Medium => self.medium,
            Strength::Weak => self.weak,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionTarget {
    pub section: String,
    pub weight: Strength,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordSections {
    pub keyword: String,
    pub targets: Vec<SectionTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainKeywords {
    pub domain: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSections {
    pub pattern: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubsectionWords {
    pub ambiguous: Vec<String>,
    pub specific: Vec<String>,
    pub promoted: Vec<String>,
    pub domain_guarded: Vec<String>,
    pub link_words: Vec<String>,
    pub path_metadata_words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KindSections {
    pub types: Vec<String>,
    pub methods: Vec<String>,
    pub functions: Vec<String>,
}

/// Section words a detected domain looks for.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainAffinity {
    pub domain: String,
    pub sections: Vec<String>,
    pub weight: f64,
    /// Replaces `weight` for types that are the package itself.
    pub core_package_weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuffixSections {
    pub suffix: String,
    pub sections: Vec<String>,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodPattern {
    pub stem: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDomain {
    pub needle: String,
    pub domain: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentKeyword {
    pub keyword: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringTables {
    pub version: u32,
    pub priority_phrases: Vec<String>,
    pub heading_stopwords: Vec<String>,
    pub prose_stopwords: Vec<String>,
    pub kind_words: Vec<String>,
    pub short_stopwords: Vec<String>,
    pub core_package_types: Vec<String>,
    pub error_subjects: Vec<String>,
    pub hash_optional_types: Vec<String>,
    pub query_stems: Vec<String>,
    pub query_section_words: Vec<String>,
    pub type_domains: Vec<TypeDomain>,
    pub weights: Weights,
    pub implementation_aliases: BTreeMap<String, String>,
    pub domain_files: BTreeMap<String, String>,
    pub subsection: SubsectionWords,
    pub section_domains: Vec<DomainKeywords>,
    pub suffix_domains: Vec<DomainKeywords>,
    pub fallback_domains: Vec<DomainKeywords>,
    pub priority_domains: Vec<DomainKeywords>,
    pub keyword_sections: Vec<KeywordSections>,
    pub file_sections: Vec<FileSections>,
    pub kind_sections: KindSections,
    pub domain_affinity: Vec<DomainAffinity>,
    pub type_suffixes: Vec<SuffixSections>,
    pub method_patterns: Vec<MethodPattern>,
    pub content_keywords: Vec<ContentKeyword>,
}

impl ScoringTables {
    /// Tables compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED)
    }

    /// Replacement tables from `path`, or the built-in set when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                log::debug!("loading scoring tables from {}", path.display());
                Self::parse(&raw)
            }
            None => Self::embedded(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let tables: ScoringTables = toml::from_str(raw)?;
        if tables.version != TABLES_VERSION {
            return Err(Error::TablesVersion {
                found: tables.version,
                expected: TABLES_VERSION,
            });
        }
        Ok(tables)
    }

    /// Interface a private implementation type stands in for (`filePackage` => `Package`).
    pub fn interface_for<'a>(&'a self, name: &'a str) -> &'a str {
        if let Some(mapped) = self.implementation_aliases.get(name) {
            return mapped;
        }
        let lower = name.to_lowercase();
        self.implementation_aliases
            .iter()
            .find(|(alias, _)| alias.to_lowercase() == lower)
            .map(|(_, mapped)| mapped.as_str())
            .unwrap_or(name)
    }

    pub fn keyword_targets(&self, keyword: &str) -> Option<&[SectionTarget]> {
        self.keyword_sections
            .iter()
            .find(|k| k.keyword == keyword)
            .map(|k| k.targets.as_slice())
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keyword_sections.iter().any(|k| k.keyword == keyword)
    }

    pub fn priority_keywords(&self, domain: &str) -> &[String] {
        self.priority_domains
            .iter()
            .find(|d| d.domain == domain)
            .map(|d| d.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Domain a keyword-map section pattern belongs to ("Compression Types" => compression).
    pub fn domain_of_section_pattern(&self, pattern: &str) -> Option<&str> {
        let lower = pattern.trim().to_lowercase();
        self.section_domains
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|rule| rule.domain.as_str())
    }

    pub fn affinity(&self, domain: &str) -> Option<&DomainAffinity> {
        self.domain_affinity.iter().find(|a| a.domain == domain)
    }

    /// First method pattern whose stem the lowercase method name contains.
    pub fn method_pattern(&self, method_lower: &str) -> Option<&MethodPattern> {
        self.method_patterns
            .iter()
            .find(|p| method_lower.contains(p.stem.as_str()))
    }

    pub fn is_priority_phrase(&self, keyword: &str) -> bool {
        self.priority_phrases
            .iter()
            .any(|p| p == keyword || p.replace(' ', "") == keyword)
    }

    pub(crate) fn word_set(words: &[String]) -> HashSet<&str> {
        words.iter().map(String::as_str).collect()
    }
}
