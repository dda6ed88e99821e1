/*!
 * Placeholder parity.
 *
 * The translated locked text must carry exactly the tokens of the locked
 * source: same tokens, same counts, any order.
 */

use crate::placeholder::find_tokens;

/// Compares lock tokens between locked source and locked target
pub struct PlaceholderValidator;

impl PlaceholderValidator {
    /// Describe the mismatch, `None` when token multisets agree
    pub fn check(source_locked: &str, target_locked: &str) -> Option<String> {
        let mut source_tokens = find_tokens(source_locked);
        let mut target_tokens = find_tokens(target_locked);
        source_tokens.sort_unstable();
        target_tokens.sort_unstable();
        if source_tokens == target_tokens {
            return None;
        }

        let missing: Vec<&str> = difference(&source_tokens, &target_tokens);
        let unexpected: Vec<&str> = difference(&target_tokens, &source_tokens);
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing {}", missing.join(", ")));
        }
        if !unexpected.is_empty() {
            parts.push(format!("unexpected {}", unexpected.join(", ")));
        }
        Some(format!("Locked placeholder tokens mismatch: {}", parts.join("; ")))
    }
}

/// Multiset difference of two sorted token lists
fn difference<'a>(left: &[&'a str], right: &[&str]) -> Vec<&'a str> {
    let mut remaining: Vec<&str> = right.to_vec();
    let mut out = Vec::new();
    for token in left {
        match remaining.iter().position(|t| t == token) {
            Some(pos) => {
                remaining.remove(pos);
            }
            None => out.push(*token),
        }
    }
    out
}
