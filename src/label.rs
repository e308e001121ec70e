//! Label Data Model
//!
//! Fixed-field label records and the name-keyed set the reconciler diffs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalize a label name into its set key.
///
/// Name comparison is case-insensitive: `Foo` and `foo` address the same
/// label, so a case-only rename is not treated as drift.
pub fn label_key(name: &str) -> String {
    name.to_lowercase()
}

/// A repository issue label
///
/// `url` is computed by GitHub and is only ever populated from a remote
/// read; user declarations leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,

    /// Label color (6-digit hexadecimal, without #)
    pub color: String,

    /// Label description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Label URL on the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Label {
    /// Create a declared label with no remote-computed fields
    pub fn new<N: Into<String>, C: Into<String>>(name: N, color: C) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: None,
            url: None,
        }
    }

    /// Set key for this label's name
    pub fn key(&self) -> String {
        label_key(&self.name)
    }

    /// Set the description, builder-style
    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An unordered collection of labels scoped to one repository, keyed by
/// normalized name.
///
/// Inserting a label whose key is already present replaces the earlier
/// entry, preserving the one-label-per-key invariant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    entries: BTreeMap<String, Label>,
}

impl LabelSet {
    /// Create an empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, returning the entry it replaced, if any
    pub fn insert(&mut self, label: Label) -> Option<Label> {
        self.entries.insert(label.key(), label)
    }

    /// Look up a label by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.entries.get(&label_key(name))
    }

    /// Whether a label with this name is present (case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&label_key(name))
    }

    /// Number of labels in the set
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the labels in key order
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.entries.values()
    }

    /// Copy the labels out in key order
    pub fn to_vec(&self) -> Vec<Label> {
        self.entries.values().cloned().collect()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

impl From<Vec<Label>> for LabelSet {
    fn from(labels: Vec<Label>) -> Self {
        labels.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_key_lowercases() {
        assert_eq!(label_key("Bug"), "bug");
        assert_eq!(label_key("good first issue"), "good first issue");
        assert_eq!(label_key("HELP WANTED"), "help wanted");
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut set = LabelSet::new();
        set.insert(Label::new("Foo", "000000"));

        assert!(set.contains("foo"));
        assert!(set.contains("FOO"));
        assert_eq!(set.get("foo").unwrap().name, "Foo");
        assert!(!set.contains("bar"));
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut set = LabelSet::new();
        set.insert(Label::new("Foo", "000000"));
        let replaced = set.insert(Label::new("foo", "ffffff"));

        assert_eq!(set.len(), 1);
        assert_eq!(replaced.unwrap().name, "Foo");
        assert_eq!(set.get("foo").unwrap().color, "ffffff");
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let set: LabelSet = vec![
            Label::new("zeta", "000000"),
            Label::new("Alpha", "000000"),
            Label::new("mid", "000000"),
        ]
        .into();

        let names: Vec<&str> = set.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_declared_label_has_no_url() {
        let label = Label::new("bug", "d73a4a").with_description("Something isn't working");
        assert_eq!(label.url, None);
        assert_eq!(label.description.as_deref(), Some("Something isn't working"));
    }
}
