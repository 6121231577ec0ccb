use serde_json::{Number, Value};

/// Read-only view over a merged property tree.
///
/// Authoring trees are arbitrary JSON; every accessor narrows to a concrete
/// type and treats `null` as absent.
#[derive(Debug, Clone, Copy)]
pub struct Props<'a> {
    root: &'a Value,
}

impl<'a> Props<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.root.get(key).filter(|value| !value.is_null())
    }

    /// Nested lookup, e.g. `["fieldset", "legend", "text"]`.
    pub fn path(&self, keys: &[&str]) -> Option<&'a Value> {
        let mut current = self.root;
        for key in keys {
            current = current.get(*key)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// First present value among several nested paths.
    pub fn first_path(&self, paths: &[&[&str]]) -> Option<&'a Value> {
        paths.iter().find_map(|path| self.path(path))
    }

    /// Trimmed, non-empty scalar text at `key`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text)
    }

    /// First non-empty scalar text among `keys`.
    pub fn text_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    pub fn path_text(&self, keys: &[&str]) -> Option<String> {
        self.path(keys).and_then(scalar_text)
    }

    /// JavaScript-style truthiness of a present flag; `None` when absent.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).map(is_truthy)
    }

    pub fn truthy(&self, key: &str) -> bool {
        self.flag(key).unwrap_or(false)
    }

    pub fn array(&self, key: &str) -> &'a [Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number (or numeric string) at the first present key that satisfies `accept`.
    pub fn number_where(&self, keys: &[&str], accept: impl Fn(f64) -> bool) -> Option<Number> {
        let raw = keys.iter().find_map(|key| self.get(key))?;
        let number = as_number(raw)?;
        number.as_f64().filter(|value| accept(*value)).map(|_| number)
    }
}

/// Scalar value rendered as trimmed text; objects and arrays yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(int) = text.parse::<u64>() {
                Some(Number::from(int))
            } else {
                text.parse::<f64>().ok().and_then(Number::from_f64)
            }
        }
        _ => None,
    }
}
