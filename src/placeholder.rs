/*!
 * Placeholder locking.
 *
 * Substrings that must survive translation untouched (URLs, template
 * variables, format specifiers, codes) are swapped for opaque `__PH<n>__`
 * tokens before text is sent out, and swapped back afterwards.
 */

use std::borrow::Cow;

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::errors::SeedError;
use crate::profile::DomainProfile;

/// Any lock token
pub static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__PH\d+__").expect("valid token regex"));

/// Text with placeholders swapped for tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedText {
    pub text: String,
    /// `(token, original)` pairs in creation order
    pub tokens: Vec<(String, String)>,
}

impl LockedText {
    /// Text that needed no locking
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens: Vec::new(),
        }
    }

    /// Restore the originals in `text` (typically a translation of `self.text`)
    pub fn unlock(&self, text: &str) -> String {
        unlock_with(text, &self.tokens)
    }

    /// Restore the originals in the locked text itself
    pub fn unlock_self(&self) -> String {
        self.unlock(&self.text)
    }

    pub fn has_tokens(&self) -> bool {
        !self.tokens.is_empty()
    }
}

/// Replace tokens longest first; equal lengths go most recent first
fn unlock_with(text: &str, tokens: &[(String, String)]) -> String {
    let mut order: Vec<usize> = (0..tokens.len()).collect();
    order.sort_by(|&a, &b| tokens[b].0.len().cmp(&tokens[a].0.len()).then(b.cmp(&a)));

    let mut result = text.to_string();
    for index in order {
        let (token, original) = &tokens[index];
        if result.contains(token.as_str()) {
            result = result.replace(token.as_str(), original);
        }
    }
    result
}

/// Locks placeholder substrings using an ordered list of patterns
#[derive(Debug, Clone, Default)]
pub struct PlaceholderLocker {
    patterns: Vec<Regex>,
}

impl PlaceholderLocker {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Build a locker from a profile's patterns
    pub fn from_profile(profile: &DomainProfile) -> Result<Self, SeedError> {
        Ok(Self::new(profile.compile_patterns()?))
    }

    /// Lock `input`. Each pattern runs over the output of the previous one,
    /// so earlier patterns win where matches overlap.
    pub fn lock(&self, input: &str) -> LockedText {
        let mut tokens: Vec<(String, String)> = Vec::new();
        let mut next_number = 0usize;
        let mut working = input.to_string();

        for pattern in &self.patterns {
            let snapshot = working.clone();
            let replaced = pattern.replace_all(&snapshot, |caps: &Captures<'_>| {
                let original = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                if original.is_empty() {
                    return original.to_string();
                }
                let token = loop {
                    let candidate = format!("__PH{}__", next_number);
                    next_number += 1;
                    if !input.contains(&candidate) && !snapshot.contains(&candidate) {
                        break candidate;
                    }
                };
                tokens.push((token.clone(), original.to_string()));
                token
            });
            if let Cow::Owned(text) = replaced {
                working = text;
            }
        }

        let locked = LockedText { text: working, tokens };
        if locked.has_tokens() && locked.unlock_self() != input {
            // A token can form across a token boundary and the adjacent text
            debug!("Placeholder locking not reversible, sending text unlocked: {:?}", input);
            return LockedText::plain(input);
        }
        locked
    }
}

/// Lock tokens found in `text`, in order of appearance
pub fn find_tokens(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}
