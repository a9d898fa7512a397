//! Ordered attribute list for elements.

/// Element attributes in document order.
///
/// Names are stored lowercased (HTML documents are case-insensitive here) and
/// values are stored decoded. Equality ignores order, so two elements with the
/// same attributes written in a different order compare equal.
#[derive(Debug, Clone, Default, Eq)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Get an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Attrs {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Attrs {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut attrs = Attrs::from([("class", "dark"), ("id", "main")]);
        attrs.set("class", "light");

        assert_eq!(attrs.get("class"), Some("light"));
        assert_eq!(attrs.names().collect::<Vec<_>>(), ["class", "id"]);
    }

    #[test]
    fn test_remove() {
        let mut attrs = Attrs::from([("class", "dark"), ("data-route", "/docs")]);

        assert_eq!(attrs.remove("data-route").as_deref(), Some("/docs"));
        assert_eq!(attrs.remove("data-route"), None);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_eq_ignores_order() {
        let a = Attrs::from([("class", "dark"), ("lang", "en")]);
        let b = Attrs::from([("lang", "en"), ("class", "dark")]);
        let c = Attrs::from([("lang", "en")]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
