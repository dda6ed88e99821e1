/*!
 * Length ratio validation.
 *
 * A translation much shorter or much longer than its source usually means
 * the service dropped or invented content. Lengths are counted in
 * characters, not bytes.
 */

/// Default minimum length ratio (translation / source)
pub const DEFAULT_MIN_LENGTH_RATIO: f64 = 0.45;

/// Default maximum length ratio (translation / source)
pub const DEFAULT_MAX_LENGTH_RATIO: f64 = 2.8;

/// Types of length issues
#[derive(Debug, Clone, PartialEq)]
pub enum LengthIssue {
    /// Translation is too short relative to source
    TranslationTooShort {
        ratio: f64,
        min_ratio: f64,
        source_len: usize,
        translated_len: usize,
    },
    /// Translation is too long relative to source
    TranslationTooLong {
        ratio: f64,
        max_ratio: f64,
        source_len: usize,
        translated_len: usize,
    },
}

impl std::fmt::Display for LengthIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthIssue::TranslationTooShort {
                ratio,
                min_ratio,
                source_len,
                translated_len,
            } => {
                write!(
                    f,
                    "Length ratio {:.2} below {:.2} ({} -> {} chars)",
                    ratio, min_ratio, source_len, translated_len
                )
            }
            LengthIssue::TranslationTooLong {
                ratio,
                max_ratio,
                source_len,
                translated_len,
            } => {
                write!(
                    f,
                    "Length ratio {:.2} above {:.2} ({} -> {} chars)",
                    ratio, max_ratio, source_len, translated_len
                )
            }
        }
    }
}

/// Length ratio validator
#[derive(Debug, Clone)]
pub struct LengthValidator {
    min_ratio: f64,
    max_ratio: f64,
}

impl LengthValidator {
    /// Create a validator with the given bounds
    pub fn new(min_ratio: f64, max_ratio: f64) -> Self {
        Self { min_ratio, max_ratio }
    }

    /// Ratio of translated to source length, `None` for an empty source
    pub fn calculate_ratio(source: &str, translated: &str) -> Option<f64> {
        let source_len = source.chars().count();
        if source_len == 0 {
            return None;
        }
        Some(translated.chars().count() as f64 / source_len as f64)
    }

    /// Check one pair; an empty source is never flagged
    pub fn check(&self, source: &str, translated: &str) -> Option<LengthIssue> {
        let ratio = Self::calculate_ratio(source, translated)?;
        let source_len = source.chars().count();
        let translated_len = translated.chars().count();

        if ratio < self.min_ratio {
            Some(LengthIssue::TranslationTooShort {
                ratio,
                min_ratio: self.min_ratio,
                source_len,
                translated_len,
            })
        } else if ratio > self.max_ratio {
            Some(LengthIssue::TranslationTooLong {
                ratio,
                max_ratio: self.max_ratio,
                source_len,
                translated_len,
            })
        } else {
            None
        }
    }
}

impl Default for LengthValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH_RATIO, DEFAULT_MAX_LENGTH_RATIO)
    }
}
