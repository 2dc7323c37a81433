use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::error::{AppError, Result};
use crate::domain::headings::Locale;

const BUNDLED_DICTIONARY: &str = include_str!("../../data/column_headings.json");

static DIGIT_RUN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Replace every run of digits with `*`, turning array indexes into wildcards.
pub fn normalize_column_path(column: &str) -> String {
    DIGIT_RUN_PATTERN.replace_all(column, "*").into_owned()
}

/// Column-path patterns to human readable labels, per locale.
///
/// Built once at start-up and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct HeadingDictionary {
    labels: HashMap<Locale, HashMap<String, String>>,
}

impl HeadingDictionary {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_DICTIONARY)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::IoError(format!(
                "Failed to read heading dictionary {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse `{ "<locale>": { "<pattern>": "<label>" } }`. Unknown locales are skipped.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(content)
            .map_err(|e| AppError::ParseError(format!("Invalid heading dictionary: {}", e)))?;
        let mut labels = HashMap::new();
        for (code, entries) in raw {
            match Locale::from_code(&code) {
                Some(locale) => {
                    labels.insert(locale, entries);
                }
                None => tracing::warn!(locale = %code, "Skipping unsupported heading locale"),
            }
        }
        Ok(Self { labels })
    }

    pub fn from_entries<I, K, V>(locale: Locale, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut dictionary = Self::default();
        dictionary.extend(locale, entries);
        dictionary
    }

    pub fn extend<I, K, V>(&mut self, locale: Locale, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .entry(locale)
            .or_default()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Label for a normalized pattern. A locale without the entry falls back
    /// to the default locale, like an untranslated message would.
    pub fn lookup(&self, locale: Locale, pattern: &str) -> Option<&str> {
        self.labels
            .get(&locale)
            .and_then(|labels| labels.get(pattern))
            .or_else(|| {
                self.labels
                    .get(&Locale::default())
                    .and_then(|labels| labels.get(pattern))
            })
            .map(String::as_str)
    }

    pub fn len(&self, locale: Locale) -> usize {
        self.labels.get(&locale).map_or(0, HashMap::len)
    }
}
