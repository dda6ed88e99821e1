use anyhow::{Result, anyhow};
use isolang::Language;

/// Locale utilities
///
/// Locales are written as `ll`, `ll_RR` or `ll-RR` where `ll` is an
/// ISO 639-1 (2-letter) or ISO 639-2/T (3-letter) language code and `RR`
/// an optional region.
/// Parsed locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    /// Lowercase language code as written
    pub language: String,
    /// Uppercase region code, if any
    pub region: Option<String>,
}

impl Locale {
    /// Parse a locale string, validating the language part
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        let mut parts = code.splitn(2, ['_', '-']);
        let language = parts.next().unwrap_or_default().to_lowercase();
        let region = parts
            .next()
            .map(|r| r.to_uppercase())
            .filter(|r| !r.is_empty());

        language_from_code(&language)
            .ok_or_else(|| anyhow!("Invalid locale: {}", code))?;

        Ok(Self { language, region })
    }

    /// Canonical `ll_RR` form
    pub fn canonical(&self) -> String {
        match &self.region {
            Some(region) => format!("{}_{}", self.language, region),
            None => self.language.clone(),
        }
    }
}

fn language_from_code(code: &str) -> Option<Language> {
    match code.len() {
        2 => Language::from_639_1(code),
        3 => Language::from_639_3(code),
        _ => None,
    }
}

/// Validate a locale code
pub fn validate_locale(code: &str) -> Result<()> {
    Locale::parse(code).map(|_| ())
}

/// Check if two locale codes denote the same locale (`fr-FR` and `fr_fr` match)
pub fn locales_match(code1: &str, code2: &str) -> bool {
    match (Locale::parse(code1), Locale::parse(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Human-readable label for prompts, e.g. `French (France)` for `fr_FR`
pub fn locale_label(code: &str) -> String {
    let Ok(locale) = Locale::parse(code) else {
        return code.to_string();
    };
    let Some(language) = language_from_code(&locale.language) else {
        return code.to_string();
    };

    let name = language.to_name();
    match locale.region.as_deref() {
        Some(region) => match region_name(region) {
            Some(region_name) => format!("{} ({})", name, region_name),
            None => format!("{} ({})", name, region),
        },
        None => name.to_string(),
    }
}

fn region_name(region: &str) -> Option<&'static str> {
    let name = match region {
        "FR" => "France",
        "BE" => "Belgium",
        "CA" => "Canada",
        "CH" => "Switzerland",
        "DE" => "Germany",
        "AT" => "Austria",
        "IT" => "Italy",
        "ES" => "Spain",
        "MX" => "Mexico",
        "AR" => "Argentina",
        "BR" => "Brazil",
        "PT" => "Portugal",
        "NL" => "Netherlands",
        "SE" => "Sweden",
        "NO" => "Norway",
        "DK" => "Denmark",
        "FI" => "Finland",
        "PL" => "Poland",
        "TR" => "Turkey",
        "JP" => "Japan",
        "KR" => "Korea",
        "CN" => "China",
        "HK" => "Hong Kong",
        "TW" => "Taiwan",
        "VN" => "Vietnam",
        "IN" => "India",
        "US" => "United States",
        "GB" => "United Kingdom",
        "AU" => "Australia",
        _ => return None,
    };
    Some(name)
}
