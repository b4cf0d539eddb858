//! Path templates and their parameters.
//!
//! Admin endpoints are written as templates such as
//! `/admin/realms/{realm}/users/{userId}`. Every `{name}` token is replaced
//! by the percent-encoded value of the parameter with the same name.

use crate::error::{KcAdminError, Result};

/// Ordered `name -> value` mapping substituted into a path template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](PathParams::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = PathParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Percent-encode a value for use as a single path segment.
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Replace every `{name}` placeholder in `template`.
///
/// Parameters not referenced by the template are ignored. An unterminated
/// `{` is kept literally.
///
/// # Errors
///
/// [`KcAdminError::MissingPathParam`] if a placeholder has no parameter.
pub fn render_path(template: &str, params: &PathParams) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            rendered.push_str(&rest[open..]);
            return Ok(rendered);
        };

        let name = &after[..close];
        let value = params
            .get(name)
            .ok_or_else(|| KcAdminError::MissingPathParam {
                name: name.to_string(),
                template: template.to_string(),
            })?;
        rendered.push_str(&encode_segment(value));
        rest = &after[close + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}
