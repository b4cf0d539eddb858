//! Query-string filters for list and search requests.

use url::form_urlencoded;

/// Ordered `key -> value` filters rendered as a URL query string.
///
/// Insertion order is preserved; setting a key again replaces its value in
/// place. Absent or empty criteria mean "no query string".
///
/// # Example
///
/// ```
/// use kcadmin_core::Criteria;
///
/// let criteria = Criteria::new().with("search", "jane doe").with("max", 20);
/// assert_eq!(criteria.to_query_string().as_deref(), Some("search=jane+doe&max=20"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria(Vec<(String, String)>);

impl Criteria {
    /// Create empty criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Criteria::set).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set a filter. Booleans render as `true`/`false`.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Value of a filter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over filters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// URL-encoded query string, or `None` when there are no filters.
    pub fn to_query_string(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        Some(
            form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.0.iter())
                .finish(),
        )
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        for (k, v) in iter {
            criteria.set(k, v);
        }
        criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_criteria_has_no_query_string() {
        assert_eq!(Criteria::new().to_query_string(), None);
    }

    #[test]
    fn test_query_string_keeps_insertion_order() {
        let criteria = Criteria::new()
            .with("max", 10)
            .with("first", 0)
            .with("briefRepresentation", true);

        assert_eq!(
            criteria.to_query_string().unwrap(),
            "max=10&first=0&briefRepresentation=true"
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut criteria = Criteria::new().with("search", "a").with("max", 5);
        criteria.set("search", "b");

        assert_eq!(criteria.to_query_string().unwrap(), "search=b&max=5");
        assert_eq!(criteria.get("search"), Some("b"));
    }

    #[test]
    fn test_values_are_encoded() {
        let criteria = Criteria::new().with("email", "jane+test@example.com");
        assert_eq!(
            criteria.to_query_string().unwrap(),
            "email=jane%2Btest%40example.com"
        );
    }

    #[test]
    fn test_from_iterator() {
        let criteria: Criteria = [("exact", "true"), ("username", "jane")].into_iter().collect();
        assert_eq!(criteria.to_query_string().unwrap(), "exact=true&username=jane");
    }
}
