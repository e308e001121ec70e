//! Configuration Management
//!
//! Repository identity and declared-label loading

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::label::{label_key, Label};

/// Repository identity (owner + name)
///
/// Threaded explicitly into every remote call site so logs and traces can
/// name the repository they concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoId {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub name: String,
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(Error::InvalidRepositoryFormat(s.to_string()));
        }
        Ok(Self {
            owner: parts[0].to_string(),
            name: parts[1].to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Validate and normalize a declared label
///
/// Accepts colors with or without a leading `#` and stores them as
/// lowercase 6-digit hex without the prefix. Empty descriptions collapse
/// to `None`, and the computed `url` field is never accepted from a
/// declaration.
///
/// # Errors
/// - If the name is empty
/// - If the color is not 6 hex digits
pub fn normalize_label(mut label: Label) -> Result<Label> {
    if label.name.trim().is_empty() {
        return Err(Error::label_validation("Label name cannot be empty"));
    }

    let color = normalize_color(&label.color);
    if !is_valid_hex_color(&color) {
        return Err(Error::InvalidLabelColor(label.color));
    }
    label.color = color;

    if matches!(label.description.as_deref(), Some("")) {
        label.description = None;
    }
    label.url = None;

    Ok(label)
}

/// Validate and normalize a whole declaration
///
/// # Errors
/// In addition to per-label validation, rejects declarations where two
/// labels share a name after case normalization.
pub fn normalize_labels(labels: Vec<Label>) -> Result<Vec<Label>> {
    let mut seen = std::collections::HashSet::new();
    labels
        .into_iter()
        .map(|label| {
            let label = normalize_label(label)?;
            if !seen.insert(label_key(&label.name)) {
                return Err(Error::label_validation(format!(
                    "Duplicate label name: {}",
                    label.name
                )));
            }
            Ok(label)
        })
        .collect()
}

/// Normalize color (remove # and convert to lowercase)
pub fn normalize_color(color: &str) -> String {
    color.trim_start_matches('#').to_lowercase()
}

/// Validate hex color code
///
/// # Arguments
/// - `color`: Color code (6-digit hex without #)
fn is_valid_hex_color(color: &str) -> bool {
    if color.len() != 6 {
        return false;
    }

    color.chars().all(|c| c.is_ascii_hexdigit())
}

/// Load a label declaration from a JSON file
///
/// # Errors
/// If file reading, parsing, or validation fails
pub fn load_labels_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Label>> {
    let content = std::fs::read_to_string(path)?;
    let labels: Vec<Label> = serde_json::from_str(&content)?;
    normalize_labels(labels)
}

/// Load a label declaration from a YAML file
///
/// # Errors
/// If file reading, parsing, or validation fails
pub fn load_labels_from_yaml<P: AsRef<Path>>(path: P) -> Result<Vec<Label>> {
    let content = std::fs::read_to_string(path)?;
    let labels: Vec<Label> = serde_yaml::from_str(&content)?;
    normalize_labels(labels)
}

/// Load a label declaration from a file, detecting format by extension
///
/// # Arguments
/// - `path`: Path to the declaration file (.json, .yaml, or .yml)
///
/// # Errors
/// If file reading, parsing, or validation fails, or if the extension is
/// unsupported
pub fn load_labels_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Label>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Declaration file not found: {}", path.display()),
        )
        .into());
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_labels_from_json(path),
        Some("yaml") | Some("yml") => load_labels_from_yaml(path),
        _ => Err(Error::config_validation(
            "Declaration file must be .json, .yaml, or .yml",
        )),
    }
}

/// Generate the default label declaration
///
/// Returns GitHub's standard label set
pub fn default_labels() -> Vec<Label> {
    vec![
        Label::new("bug", "d73a4a").with_description("Something isn't working"),
        Label::new("enhancement", "a2eeef").with_description("New feature or request"),
        Label::new("documentation", "0075ca")
            .with_description("Improvements or additions to documentation"),
        Label::new("duplicate", "cfd3d7")
            .with_description("This issue or pull request already exists"),
        Label::new("good first issue", "7057ff").with_description("Good for newcomers"),
        Label::new("help wanted", "008672").with_description("Extra attention is needed"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hex_color() {
        assert!(is_valid_hex_color("ff0000"));
        assert!(is_valid_hex_color("123abc"));

        assert!(!is_valid_hex_color("ff00")); // Too short
        assert!(!is_valid_hex_color("ff0000x")); // Invalid character
        assert!(!is_valid_hex_color("#ff0000")); // With #
    }

    #[test]
    fn test_parse_repository() {
        let repo: RepoId = "owner/repo".parse().unwrap();
        assert_eq!(repo.owner, "owner");
        assert_eq!(repo.name, "repo");
        assert_eq!(repo.to_string(), "owner/repo");

        assert!("repo".parse::<RepoId>().is_err()); // No slash
        assert!("/repo".parse::<RepoId>().is_err()); // No owner
        assert!("owner/".parse::<RepoId>().is_err()); // No repo name
        assert!("owner/repo/sub".parse::<RepoId>().is_err()); // Too many parts
    }

    #[test]
    fn test_normalize_label_strips_hash_and_case() {
        let label = normalize_label(Label::new("bug", "#FF0000")).unwrap();
        assert_eq!(label.color, "ff0000");
    }

    #[test]
    fn test_normalize_label_rejects_bad_input() {
        assert!(normalize_label(Label::new("", "ff0000")).is_err());
        assert!(normalize_label(Label::new("   ", "ff0000")).is_err());
        assert!(normalize_label(Label::new("bug", "red")).is_err());
        assert!(normalize_label(Label::new("bug", "ff00")).is_err());
    }

    #[test]
    fn test_normalize_label_collapses_empty_description() {
        let label = normalize_label(Label::new("bug", "ff0000").with_description("")).unwrap();
        assert_eq!(label.description, None);
    }

    #[test]
    fn test_normalize_label_drops_declared_url() {
        let mut label = Label::new("bug", "ff0000");
        label.url = Some("https://example.invalid/labels/bug".to_string());
        let label = normalize_label(label).unwrap();
        assert_eq!(label.url, None);
    }

    #[test]
    fn test_normalize_labels_rejects_duplicate_keys() {
        let result = normalize_labels(vec![
            Label::new("Bug", "ff0000"),
            Label::new("bug", "00ff00"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, r##"[{"name":"bug","color":"#ff0000"}]"##).unwrap();
        let labels = load_labels_from_json(&path).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].name, "bug");
        assert_eq!(labels[0].color, "ff0000");
    }

    #[test]
    fn test_load_valid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.yaml");
        std::fs::write(&path, "- name: bug\n  color: \"d73a4a\"\n").unwrap();
        let labels = load_labels_from_yaml(&path).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].name, "bug");
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_labels_from_json(&path).is_err());
    }

    #[test]
    fn test_load_json_with_invalid_color() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        std::fs::write(&path, r##"[{"name":"bug","color":"invalid"}]"##).unwrap();
        assert!(load_labels_from_json(&path).is_err());
    }

    #[test]
    fn test_load_labels_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("labels.json");
        std::fs::write(&json, r##"[{"name":"bug","color":"ff0000"}]"##).unwrap();
        assert_eq!(load_labels_from_file(&json).unwrap().len(), 1);

        let yml = dir.path().join("labels.yml");
        std::fs::write(&yml, "- name: bug\n  color: \"ff0000\"\n").unwrap();
        assert_eq!(load_labels_from_file(&yml).unwrap().len(), 1);

        let toml = dir.path().join("labels.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(load_labels_from_file(&toml).is_err());
    }

    #[test]
    fn test_load_labels_from_file_not_found() {
        assert!(load_labels_from_file("/nonexistent/labels.json").is_err());
    }

    #[test]
    fn test_default_labels_are_valid() {
        let labels = normalize_labels(default_labels()).unwrap();
        assert_eq!(labels.len(), 6);
    }
}
