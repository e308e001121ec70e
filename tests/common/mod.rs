//! In-memory label service for driving full reconciliation cycles

use std::sync::Mutex;

use gh_labelset::github::{LabelPage, LabelService};
use gh_labelset::{Error, Label, Result};

/// A label service backed by a plain vector, recording every call it
/// receives.
///
/// Mutations are applied to the vector so a cycle's confirming re-read
/// observes them, the same way a real remote would.
#[derive(Default)]
pub struct FakeLabelService {
    labels: Mutex<Vec<Label>>,
    calls: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
}

impl FakeLabelService {
    pub fn new(seed: Vec<Label>) -> Self {
        Self {
            labels: Mutex::new(seed),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
        }
    }

    /// Seed a remote-side label, url populated as GitHub would
    pub fn remote_label(name: &str, color: &str, description: Option<&str>) -> Label {
        Label {
            name: name.to_string(),
            color: color.to_string(),
            description: description.map(str::to_string),
            url: Some(format!(
                "https://api.github.com/repos/owner/repo/labels/{name}"
            )),
        }
    }

    /// Make the call whose description equals `call` fail
    pub fn fail_on(&self, call: &str) {
        *self.fail_on.lock().unwrap() = Some(call.to_string());
    }

    /// Every call received, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Mutation calls only (listing excluded)
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list"))
            .collect()
    }

    /// Snapshot of the remote label set
    pub fn remote(&self) -> Vec<Label> {
        self.labels.lock().unwrap().clone()
    }

    fn check_failure(&self, call: &str) -> Result<()> {
        if self.fail_on.lock().unwrap().as_deref() == Some(call) {
            return Err(Error::generic(format!("injected failure: {call}")));
        }
        Ok(())
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        self.check_failure(&call)
    }
}

impl LabelService for FakeLabelService {
    async fn list_labels(&self, page: u32, per_page: u8) -> Result<LabelPage> {
        self.record(format!("list page {page}"))?;

        let labels = self.labels.lock().unwrap();
        let start = (page as usize - 1) * per_page as usize;
        let end = (start + per_page as usize).min(labels.len());
        let items = if start < labels.len() {
            labels[start..end].to_vec()
        } else {
            Vec::new()
        };

        Ok(LabelPage {
            items,
            has_next: end < labels.len(),
        })
    }

    async fn create_label(&self, label: &Label) -> Result<Label> {
        self.record(format!("create {}", label.name))?;

        let mut labels = self.labels.lock().unwrap();
        if labels
            .iter()
            .any(|l| l.name.to_lowercase() == label.name.to_lowercase())
        {
            return Err(Error::generic(format!("label already exists: {}", label.name)));
        }

        let created = Label {
            url: Some(format!(
                "https://api.github.com/repos/owner/repo/labels/{}",
                label.name
            )),
            ..label.clone()
        };
        labels.push(created.clone());
        Ok(created)
    }

    async fn edit_label(&self, old_name: &str, label: &Label) -> Result<Label> {
        self.record(format!("update {} -> {}", old_name, label.name))?;

        let mut labels = self.labels.lock().unwrap();
        let entry = labels
            .iter_mut()
            .find(|l| l.name == old_name)
            .ok_or_else(|| Error::generic(format!("label not found: {old_name}")))?;

        entry.name = label.name.clone();
        entry.color = label.color.clone();
        entry.description = label.description.clone();
        entry.url = Some(format!(
            "https://api.github.com/repos/owner/repo/labels/{}",
            label.name
        ));
        Ok(entry.clone())
    }

    async fn delete_label(&self, name: &str) -> Result<()> {
        self.record(format!("delete {name}"))?;

        let mut labels = self.labels.lock().unwrap();
        let before = labels.len();
        labels.retain(|l| l.name != name);
        if labels.len() == before {
            return Err(Error::generic(format!("label not found: {name}")));
        }
        Ok(())
    }
}
