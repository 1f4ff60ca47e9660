//! Tile URL templates and their expansion.

use crate::{prelude::HashMap, Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, sync::Arc};

/// Matches `{name}`, tolerating whitespace inside the braces
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\s*([\w]+)\s*\}").expect("placeholder pattern is valid")
});

/// User function producing a URL from `(x, y, z, subdomain)`
pub type UrlFunction = Arc<dyn Fn(i64, i64, i32, &str) -> String + Send + Sync>;

/// Values available to a template while it is expanded
#[derive(Debug, Clone, PartialEq)]
pub struct UrlData {
    pub x: i64,
    pub y: i64,
    pub z: i32,
    pub s: Option<String>,
}

/// Where tile URLs come from
#[derive(Clone)]
pub enum UrlTemplate {
    /// A string with `{x}`, `{y}`, `{z}`, `{s}` and custom placeholders
    Pattern(String),
    Function(UrlFunction),
}

impl UrlTemplate {
    pub fn pattern(template: impl Into<String>) -> Self {
        UrlTemplate::Pattern(template.into())
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(i64, i64, i32, &str) -> String + Send + Sync + 'static,
    {
        UrlTemplate::Function(Arc::new(f))
    }

    pub fn is_serializable(&self) -> bool {
        matches!(self, UrlTemplate::Pattern(_))
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        UrlTemplate::Pattern("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string())
    }
}

impl fmt::Debug for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlTemplate::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            UrlTemplate::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl Serialize for UrlTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            UrlTemplate::Pattern(pattern) => serializer.serialize_str(pattern),
            UrlTemplate::Function(_) => Err(ser::Error::custom("url template is a function")),
        }
    }
}

impl<'de> Deserialize<'de> for UrlTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(UrlTemplate::Pattern)
    }
}

/// Function computing a custom placeholder from the tile's values
pub type ParamFunction = Arc<dyn Fn(&UrlData) -> String + Send + Sync>;

/// Value of a custom template placeholder
#[derive(Clone)]
pub enum TemplateParam {
    Text(String),
    Computed(ParamFunction),
}

impl TemplateParam {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&UrlData) -> String + Send + Sync + 'static,
    {
        TemplateParam::Computed(Arc::new(f))
    }

    pub fn is_serializable(&self) -> bool {
        matches!(self, TemplateParam::Text(_))
    }

    fn value(&self, data: &UrlData) -> String {
        match self {
            TemplateParam::Text(text) => text.clone(),
            TemplateParam::Computed(f) => f(data),
        }
    }
}

impl fmt::Debug for TemplateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateParam::Text(text) => f.debug_tuple("Text").field(text).finish(),
            TemplateParam::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl Serialize for TemplateParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TemplateParam::Text(text) => serializer.serialize_str(text),
            TemplateParam::Computed(_) => {
                Err(ser::Error::custom("template parameter is a function"))
            }
        }
    }
}

impl<'de> Deserialize<'de> for TemplateParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(text) => Ok(TemplateParam::Text(text)),
            serde_json::Value::Number(n) => Ok(TemplateParam::Text(n.to_string())),
            serde_json::Value::Bool(b) => Ok(TemplateParam::Text(b.to_string())),
            other => Err(de::Error::custom(format!(
                "template parameter must be a string, got {}",
                other
            ))),
        }
    }
}

/// Index into a subdomain list of length `len` for tile `(x, y)`
pub fn subdomain_index(x: i64, y: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let index = (x + y) % len as i64;
    if index < 0 {
        0
    } else {
        index as usize
    }
}

/// Expands a layer's URL template for individual tiles
pub struct UrlResolver<'a> {
    template: &'a UrlTemplate,
    subdomains: &'a [String],
    params: &'a HashMap<String, TemplateParam>,
}

impl<'a> UrlResolver<'a> {
    pub fn new(
        template: &'a UrlTemplate,
        subdomains: &'a [String],
        params: &'a HashMap<String, TemplateParam>,
    ) -> Self {
        Self {
            template,
            subdomains,
            params,
        }
    }

    /// Subdomain serving tile `(x, y)`, if any are configured
    pub fn subdomain(&self, x: i64, y: i64) -> Option<&'a str> {
        if self.subdomains.is_empty() {
            return None;
        }
        let index = subdomain_index(x, y, self.subdomains.len());
        Some(self.subdomains[index].as_str())
    }

    pub fn resolve(&self, x: i64, y: i64, z: i32) -> Result<String> {
        let subdomain = self.subdomain(x, y);
        let pattern = match self.template {
            UrlTemplate::Function(f) => return Ok(f(x, y, z, subdomain.unwrap_or(""))),
            UrlTemplate::Pattern(pattern) => pattern,
        };

        let data = UrlData {
            x,
            y,
            z,
            s: subdomain.map(str::to_string),
        };

        let mut url = String::with_capacity(pattern.len() + 16);
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(pattern) {
            let (whole, name) = match (caps.get(0), caps.get(1)) {
                (Some(whole), Some(name)) => (whole, name.as_str()),
                _ => continue,
            };
            url.push_str(&pattern[last..whole.start()]);
            url.push_str(&self.value(name, &data)?);
            last = whole.end();
        }
        url.push_str(&pattern[last..]);
        Ok(url)
    }

    fn value(&self, name: &str, data: &UrlData) -> Result<String> {
        let builtin = match name {
            "x" => Some(data.x.to_string()),
            "y" => Some(data.y.to_string()),
            "z" => Some(data.z.to_string()),
            "s" => data.s.clone(),
            _ => None,
        };
        builtin
            .or_else(|| self.params.get(name).map(|param| param.value(data)))
            .ok_or_else(|| Error::Template {
                placeholder: name.to_string(),
            })
    }
}
