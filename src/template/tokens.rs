//! `:name` placeholder substitution
//!
//! Substitution is a two-step affair: [`scan_placeholders`] walks the text once
//! and records every placeholder occurrence, then [`substitute`] stitches the
//! output together from those occurrences. At any `:` the longest matching key
//! wins, so `:yearly` is never mangled by a shorter `year` key, and substituted
//! values are never scanned again.

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern is valid"));

/// Insertion-ordered mapping of placeholder names (no leading colon) to values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    entries: Vec<(String, String)>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token, overwriting the value of an existing key in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Builder-style [`TokenMap::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tokens = TokenMap::new();
        for (name, value) in iter {
            tokens.insert(name, value);
        }
        tokens
    }
}

/// A placeholder occurrence found by [`scan_placeholders`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Token name without the leading colon
    pub name: String,
    /// Byte offset of the leading colon
    pub position: usize,
}

impl Placeholder {
    /// Byte offset just past the placeholder
    pub fn end(&self) -> usize {
        self.position + 1 + self.name.len()
    }
}

/// Find every occurrence of a mapped `:name` in `text`, in text order
///
/// Keys are tried longest first at each colon. Occurrences never overlap.
pub fn scan_placeholders(text: &str, tokens: &TokenMap) -> Vec<Placeholder> {
    let mut names: Vec<&str> = tokens.keys().filter(|name| !name.is_empty()).collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(':') {
        let position = cursor + offset;
        let rest = &text[position + 1..];
        match names.iter().find(|name| rest.starts_with(**name)) {
            Some(name) => {
                let placeholder = Placeholder {
                    name: name.to_string(),
                    position,
                };
                cursor = placeholder.end();
                found.push(placeholder);
            }
            None => cursor = position + 1,
        }
    }
    found
}

/// Replace every mapped `:name` in `text` with its value
///
/// Placeholders without a key are left as they are. No quoting or escaping is
/// applied to values.
pub fn substitute(text: &str, tokens: &TokenMap) -> String {
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut rendered = String::with_capacity(text.len());
    let mut cursor = 0;
    for placeholder in scan_placeholders(text, tokens) {
        rendered.push_str(&text[cursor..placeholder.position]);
        match tokens.get(&placeholder.name) {
            Some(value) => rendered.push_str(value),
            None => rendered.push_str(&text[placeholder.position..placeholder.end()]),
        }
        cursor = placeholder.end();
    }
    rendered.push_str(&text[cursor..]);
    rendered
}

/// Names of `:identifier` placeholders in `template` that no key of `tokens` resolves
///
/// Run against the template rather than the rendered text, so values that
/// contain colons (IAM role ARNs, S3 URIs) are never mistaken for placeholders.
/// Postgres `::type` casts are not reported.
pub fn unresolved_placeholders(template: &str, tokens: &TokenMap) -> Vec<String> {
    let resolved = scan_placeholders(template, tokens);
    let mut resolved = resolved.iter().peekable();

    let mut names = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = template[cursor..].find(':') {
        let position = cursor + offset;
        cursor = position + 1;

        while resolved.next_if(|p| p.position < position).is_some() {}
        if let Some(placeholder) = resolved.next_if(|p| p.position == position) {
            cursor = placeholder.end();
            continue;
        }

        if template[..position].ends_with(':') || template[cursor..].starts_with(':') {
            continue;
        }
        if let Some(ident) = IDENTIFIER.find(&template[cursor..]) {
            names.push(ident.as_str().to_string());
            cursor += ident.end();
        }
    }
    names
}
