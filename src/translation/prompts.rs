/*!
 * Prompt construction and response parsing for batch translation.
 *
 * The request payload is a JSON array of `{"i": index, "t": text}` objects
 * on the last line of the prompt. Replies are parsed leniently: code fences
 * are stripped and, failing a clean parse, the outermost `[...]` is used.
 */

use serde_json::Value;

use super::translator::{BatchItem, BatchResponse};
use crate::errors::ProviderError;
use crate::language_utils::locale_label;

/// System prompt template for seed data localization
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// The default system prompt
    pub const SEED_LOCALIZER: &'static str = r#"You are a professional software localization specialist.
Translate the English items you are given into {target_language} (locale={locale}).

STRICT RULES
- Do NOT translate codes or identifiers: SKUs, marketplace IDs, emails, URLs, enum-like constants.
- Preserve placeholder tokens exactly as written: __PH0__, __PH1__, and so on.
- Preserve the casing style and separators of the source text.
- Do NOT add, remove, merge or reorder items.
- Output MUST be a JSON array of objects like [{"i": 0, "t": "..."}, {"i": 1, "t": "..."}] and nothing else."#;

    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render for a locale
    pub fn render(&self, locale: &str) -> String {
        self.template
            .replace("{target_language}", &locale_label(locale))
            .replace("{locale}", locale)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(Self::SEED_LOCALIZER)
    }
}

/// Builds the system and user prompts of one batch request
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    locale: String,
    template: PromptTemplate,
    rules: Vec<String>,
}

impl TranslationPromptBuilder {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            template: PromptTemplate::default(),
            rules: Vec::new(),
        }
    }

    /// Append a block of extra rules
    pub fn with_rules(mut self, rules: Option<&str>) -> Self {
        if let Some(rules) = rules.map(str::trim).filter(|r| !r.is_empty()) {
            self.rules.push(rules.to_string());
        }
        self
    }

    pub fn build_system_prompt(&self) -> String {
        let mut prompt = self.template.render(&self.locale);
        for rules in &self.rules {
            prompt.push_str("\n\n");
            prompt.push_str(rules);
        }
        prompt
    }

    /// User prompt with the payload on its last line
    pub fn build_user_prompt(&self, items: &[BatchItem]) -> String {
        let payload = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
        format!(
            "INPUT JSON (array of objects with keys \"i\" and \"t\"):\n{}",
            payload
        )
    }
}

/// Payload of a user prompt built by `TranslationPromptBuilder`
pub fn extract_payload(prompt: &str) -> Option<Vec<BatchItem>> {
    let line = prompt.lines().rev().find(|l| l.trim_start().starts_with('['))?;
    serde_json::from_str(line.trim()).ok()
}

/// Parse a model reply into a batch response
pub fn parse_batch_response(text: &str) -> Result<BatchResponse, ProviderError> {
    let array = match parse_json_lenient(text)? {
        Value::Array(items) => items,
        Value::Object(map) => match map.into_iter().find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items,
            None => return Err(ProviderError::ParseError("Reply is not a JSON array".to_string())),
        },
        _ => return Err(ProviderError::ParseError("Reply is not a JSON array".to_string())),
    };

    if array.iter().any(Value::is_object) {
        let items = array
            .iter()
            .filter_map(|entry| {
                let index = match entry.get("i")? {
                    Value::Number(n) => usize::try_from(n.as_u64()?).ok()?,
                    Value::String(s) => s.trim().parse().ok()?,
                    _ => return None,
                };
                let text = value_text(entry.get("t")?)?;
                Some(BatchItem::new(index, text))
            })
            .collect();
        return Ok(BatchResponse::Indexed(items));
    }

    // Nulls keep their slot so later entries stay aligned with the request
    let texts = array.iter().map(value_text).collect::<Vec<_>>();
    Ok(BatchResponse::Positional(texts))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    for part in trimmed.split("```") {
        let part = part.trim();
        // Drop a language tag such as `json`
        let body = match part.find(['[', '{']) {
            Some(pos) if part[..pos].trim().chars().all(|c| c.is_ascii_alphabetic()) => &part[pos..],
            _ => part,
        };
        if (body.starts_with('[') && body.ends_with(']')) || (body.starts_with('{') && body.ends_with('}')) {
            return body;
        }
    }
    trimmed
}

fn parse_json_lenient(text: &str) -> Result<Value, ProviderError> {
    let body = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }
    match (body.find('['), body.rfind(']')) {
        (Some(first), Some(last)) if last > first => serde_json::from_str(&body[first..=last])
            .map_err(|e| ProviderError::ParseError(format!("Invalid JSON array in reply: {}", e))),
        _ => Err(ProviderError::ParseError("No JSON array found in reply".to_string())),
    }
}
