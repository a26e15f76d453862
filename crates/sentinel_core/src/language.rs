//! Heuristic language sniffing for the editor tab.
//!
//! The result only drives the file name, extension and icon shown to the user.
//! It is a guess, not a validated content type.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::IgnoredAny;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    TypeScript,
    JavaScript,
    Css,
    Html,
    Sql,
    Json,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Css => "css",
            Language::Html => "html",
            Language::Sql => "sql",
            Language::Json => "json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::TypeScript => "tsx",
            Language::JavaScript => "js",
            Language::Css => "css",
            Language::Html => "html",
            Language::Sql => "sql",
            Language::Json => "json",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Language::Python => "🐍",
            Language::TypeScript => "⚛",
            Language::JavaScript => "🟨",
            Language::Css => "🎨",
            Language::Html => "🌐",
            Language::Sql => "🐘",
            Language::Json => "📋",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of [`classify`]: the guessed language plus its display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub language: Language,
    pub extension: &'static str,
    pub icon: &'static str,
}

impl Classification {
    pub fn of(language: Language) -> Self {
        Self {
            language,
            extension: language.extension(),
            icon: language.icon(),
        }
    }

    /// Reported when no rule matches.
    pub fn fallback() -> Self {
        Self::of(Language::TypeScript)
    }
}

enum Matcher {
    /// Regex over the lower-cased text.
    Pattern(&'static str),
    /// Looks like a JSON document and parses as one.
    JsonDocument,
}

/// Priority order matters: the first matching rule wins.
const RULES: &[(Language, Matcher)] = &[
    (
        Language::Python,
        Matcher::Pattern(r"def\s+(?-u:\w)+\s*\(|import\s+numpy|import\s+pandas|from\s+fastapi|print\("),
    ),
    (
        Language::TypeScript,
        Matcher::Pattern(
            r"import\s+react|interface\s+(?-u:\w)+|const\s+(?-u:\w)+\s*:\s*react\.fc|export\s+default\s+function",
        ),
    ),
    (
        Language::JavaScript,
        Matcher::Pattern(r"console\.log|const\s+require\s*=|module\.exports"),
    ),
    (Language::Css, Matcher::Pattern(r"\.[a-z-]+\s*\{|@media|:root")),
    (Language::Html, Matcher::Pattern(r"<!doctype html>|<html|<div")),
    (
        Language::Sql,
        Matcher::Pattern(r"select\s+\*\s+from|insert\s+into|create\s+table"),
    ),
    (Language::Json, Matcher::JsonDocument),
];

enum CompiledMatcher {
    Pattern(Regex),
    JsonDocument,
}

static COMPILED_RULES: OnceLock<Vec<(Language, CompiledMatcher)>> = OnceLock::new();

fn compiled_rules() -> &'static [(Language, CompiledMatcher)] {
    COMPILED_RULES.get_or_init(|| {
        RULES
            .iter()
            .map(|(language, matcher)| {
                let compiled = match matcher {
                    Matcher::Pattern(pattern) => CompiledMatcher::Pattern(
                        Regex::new(pattern).expect("classifier patterns are valid"),
                    ),
                    Matcher::JsonDocument => CompiledMatcher::JsonDocument,
                };
                (*language, compiled)
            })
            .collect()
    })
}

impl CompiledMatcher {
    fn matches(&self, original: &str, lower: &str) -> bool {
        match self {
            CompiledMatcher::Pattern(regex) => regex.is_match(lower),
            CompiledMatcher::JsonDocument => looks_like_json(original, lower),
        }
    }
}

fn looks_like_json(original: &str, lower: &str) -> bool {
    let opens_document = lower.trim_start().starts_with(&['{', '['][..]);
    if !opens_document || !(original.contains(':') || original.contains('"')) {
        return false;
    }
    // A parse failure is simply a non-match.
    serde_json::from_str::<IgnoredAny>(original).is_ok()
}

/// Guess the language of `text`. Never fails; falls back to TypeScript/React.
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();
    compiled_rules()
        .iter()
        .find(|(_, matcher)| matcher.matches(text, &lower))
        .map(|(language, _)| Classification::of(*language))
        .unwrap_or_else(Classification::fallback)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{classify, looks_like_json, Language, RULES};

    #[test]
    fn rule_table_has_one_rule_per_language() {
        let seen: HashSet<Language> = RULES.iter().map(|(language, _)| *language).collect();
        assert_eq!(seen.len(), RULES.len());
    }

    #[test]
    fn json_needs_colon_or_quote() {
        assert!(!looks_like_json("[1, 2, 3]", "[1, 2, 3]"));
        assert!(looks_like_json("[\"a\"]", "[\"a\"]"));
        assert!(looks_like_json("  {\"a\": 1}", "  {\"a\": 1}"));
    }

    #[test]
    fn python_wins_over_later_rules() {
        // Contains both a SQL clause and a python def; priority picks python.
        let text = "def load():\n    return 'select * from users'";
        assert_eq!(classify(text).language, Language::Python);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("CREATE TABLE t (id int)").language, Language::Sql);
        assert_eq!(classify("<!DOCTYPE html>").language, Language::Html);
    }
}
