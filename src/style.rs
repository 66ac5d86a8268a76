use std::collections::BTreeMap;

/// Inline style of a cell, property name to CSS value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style(BTreeMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Copies every property of `other` into this style, overwriting on conflict.
    pub fn merge(&mut self, other: &Style) {
        for (property, value) in &other.0 {
            self.0.insert(property.clone(), value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Style {
    fn from(properties: [(K, V); N]) -> Self {
        Style(
            properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Joins the non-empty class names with a single space.
pub fn class_names<'a>(names: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    let joined = names
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}
