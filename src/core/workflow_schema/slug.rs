use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase kebab slug: ASCII alphanumerics separated by single hyphens.
///
/// Input is NFKD-decomposed and combining marks are stripped, so accented
/// letters and compatibility forms fold to their ASCII base.
pub fn slugify(input: &str) -> String {
    static SEPARATORS: OnceLock<Option<Regex>> = OnceLock::new();
    let folded = input
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase();
    let collapsed = match SEPARATORS
        .get_or_init(|| Regex::new(r"[^a-z0-9]+").ok())
        .as_ref()
    {
        Some(pattern) => pattern.replace_all(&folded, "-").into_owned(),
        None => folded
            .split(|ch: char| !ch.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-"),
    };
    collapsed.trim_matches('-').to_string()
}

/// Set of identifiers already handed out within one scope (a step, or a publish run).
#[derive(Debug, Default, Clone)]
pub struct IdentifierSet {
    used: HashSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `base`, appending `-2`, `-3`, ... until the candidate is unused.
    pub fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }

    /// Slugify `raw` (falling back to `fallback`) and reserve the result.
    pub fn claim_slug(&mut self, raw: &str, fallback: &str) -> String {
        let slug = slugify(raw);
        if slug.is_empty() {
            self.claim(fallback)
        } else {
            self.claim(&slug)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
