use serde::Serialize;
use serde_json::Value;

/// Bilingual text as emitted in the published schema. Both locales are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalizedText {
    pub en: String,
    pub fr: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, fr: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            fr: fr.into(),
        }
    }

    /// Same text for both locales.
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            fr: text.clone(),
            en: text,
        }
    }

    /// Resolve an authoring value into bilingual text.
    ///
    /// Accepts a plain string, an object keyed by locale, or a GOV.UK style
    /// `{ "text": ... }` wrapper. A missing locale borrows the other one;
    /// when neither exists both are empty.
    pub fn resolve(value: &Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::String(text) => Self::uniform(text.trim()),
            Value::Bool(_) | Value::Number(_) => Self::uniform(value.to_string()),
            Value::Object(map) => {
                if let Some(inner) = map.get("text") {
                    if !map.contains_key("en") && !map.contains_key("fr") {
                        return Self::resolve(inner);
                    }
                }
                let en = locale_text(map.get("en"));
                let fr = locale_text(map.get("fr"));
                match (en, fr) {
                    (Some(en), Some(fr)) => Self { en, fr },
                    (Some(en), None) => Self::uniform(en),
                    (None, Some(fr)) => Self::uniform(fr),
                    (None, None) => Self::default(),
                }
            }
            Value::Array(_) => Self::default(),
        }
    }

    /// Resolve `value`, falling back to `fallback` when the value carries no text.
    pub fn resolve_or(value: Option<&Value>, fallback: &str) -> Self {
        let resolved = value.map(Self::resolve).unwrap_or_default();
        if resolved.is_empty() {
            Self::uniform(fallback)
        } else {
            resolved
        }
    }

    pub fn is_empty(&self) -> bool {
        self.en.is_empty() && self.fr.is_empty()
    }

    /// Fill empty locales from `fallback`.
    pub fn or_fallback(self, fallback: &str) -> Self {
        let en = if self.en.is_empty() {
            fallback.to_string()
        } else {
            self.en
        };
        let fr = if self.fr.is_empty() { en.clone() } else { self.fr };
        Self { en, fr }
    }
}

fn locale_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
