//! Customer-name standardization and keyword extraction.
//!
//! The same customer appears under different spellings across the two
//! ledgers: decorated with an organizational prefix, split by different
//! delimiters, or suffixed with a department tag. Standardization reduces
//! a raw name to a canonical form for equality and containment checks;
//! keyword extraction pulls the core-name tokens for overlap checks.

use std::collections::BTreeSet;

/// Separator characters tried in order when splitting a name into keyword
/// parts. Only the first separator present in the string is used; the
/// split does not cascade across separator kinds.
const SEPARATORS: [char; 7] = ['-', '_', '—', ' ', '·', '(', ')'];

/// CJK unified ideographs, the range the ledger names are written in.
fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

#[derive(Debug, Clone)]
pub struct NameStandardizer {
    prefixes: Vec<String>,
}

impl NameStandardizer {
    pub fn new(prefixes: &[String]) -> Self {
        Self {
            prefixes: prefixes.to_vec(),
        }
    }

    /// Strip each known prefix at most once, anchored at the start.
    fn strip_prefixes<'a>(&self, name: &'a str) -> &'a str {
        let mut rest = name;
        for prefix in &self.prefixes {
            if prefix.is_empty() {
                continue;
            }
            if let Some(stripped) = rest.strip_prefix(prefix.as_str()) {
                rest = stripped;
            }
        }
        rest
    }

    /// Reduce a raw name to its canonical comparable form: known prefixes
    /// stripped, then every character that is not ASCII-alphanumeric, CJK,
    /// or a hyphen removed. Empty input yields an empty string.
    pub fn standardize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        self.strip_prefixes(trimmed)
            .chars()
            .filter(|&c| c.is_ascii_alphanumeric() || c == '-' || is_cjk(c))
            .collect()
    }

    /// Extract the keyword token set of a raw name.
    ///
    /// Splits on the first separator found (see [`SEPARATORS`]); parts
    /// longer than two characters are pushed twice to weight core-name
    /// tokens, which collapses again under set semantics. Without any
    /// separator, falls back to maximal runs of two or more CJK
    /// characters. Single-character tokens are discarded.
    pub fn extract_keywords(&self, raw: &str) -> BTreeSet<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return BTreeSet::new();
        }
        let stripped = self.strip_prefixes(trimmed);

        let mut parts: Vec<String> = Vec::new();
        if let Some(&sep) = SEPARATORS.iter().find(|&&s| stripped.contains(s)) {
            for part in stripped.split(sep) {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                parts.push(part.to_string());
                if part.chars().count() > 2 {
                    parts.push(part.to_string());
                }
            }
        } else {
            parts.extend(cjk_runs(stripped));
        }

        parts
            .into_iter()
            .filter(|p| p.chars().count() >= 2)
            .collect()
    }
}

/// Maximal runs of two or more consecutive CJK characters.
fn cjk_runs(s: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if is_cjk(c) {
            current.push(c);
        } else {
            if current.chars().count() >= 2 {
                runs.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.chars().count() >= 2 {
        runs.push(current);
    }
    runs
}
