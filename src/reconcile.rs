//! Label Set Reconciliation
//!
//! Diffs the previously tracked label set against the declared one, drives
//! the minimal create/delete/update calls, then re-reads the remote to
//! produce the next tracked state

use crate::config::RepoId;
use crate::error::Result;
use crate::github::{list_all_labels, LabelService};
use crate::label::{Label, LabelSet};

/// Page-size hint used when fetching the full remote set
pub const DEFAULT_PAGE_SIZE: u8 = 100;

/// A single remote mutation the reconciler has planned or executed
#[derive(Debug, Clone, PartialEq)]
pub enum LabelOp {
    /// Create a label
    Create { label: Label },

    /// Delete a label by its previously recorded name
    Delete { name: String },

    /// Update the label addressed by `old_name` to match `label`
    Update {
        old_name: String,
        label: Label,
        changes: Vec<String>,
    },
}

/// Result of one reconciliation cycle
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Executed operations, in execution order
    pub operations: Vec<LabelOp>,

    /// Number of labels created
    pub created: u32,

    /// Number of labels updated
    pub updated: u32,

    /// Number of labels deleted
    pub deleted: u32,

    /// The projected label set, recorded as the next tracked state
    pub state: LabelSet,
}

impl ReconcileOutcome {
    /// Record an executed operation and update statistics
    fn record(&mut self, op: LabelOp) {
        match &op {
            LabelOp::Create { .. } => self.created += 1,
            LabelOp::Delete { .. } => self.deleted += 1,
            LabelOp::Update { .. } => self.updated += 1,
        }
        self.operations.push(op);
    }

    /// Whether any mutation was executed
    pub fn has_changes(&self) -> bool {
        self.created > 0 || self.updated > 0 || self.deleted > 0
    }
}

/// Compute the mutations that move the remote from `previous` toward
/// `desired`.
///
/// Pure function over the two name-keyed sets; ops come out in a fixed
/// order (creates, then deletes, then updates) and within each kind in set
/// key order. A name present on both sides whose color and description
/// already match produces no op. Names are compared case-insensitively, so
/// a name change across keys surfaces as delete-old + create-new while a
/// case-only respelling is not drift.
pub fn plan(previous: &LabelSet, desired: &LabelSet) -> Vec<LabelOp> {
    let mut ops = Vec::new();

    // create
    for label in desired.iter() {
        if !previous.contains(&label.name) {
            ops.push(LabelOp::Create {
                label: label.clone(),
            });
        }
    }

    // delete
    for label in previous.iter() {
        if !desired.contains(&label.name) {
            ops.push(LabelOp::Delete {
                name: label.name.clone(),
            });
        }
    }

    // update
    for label in desired.iter() {
        if let Some(current) = previous.get(&label.name) {
            let changes = field_changes(current, label);
            if !changes.is_empty() {
                ops.push(LabelOp::Update {
                    old_name: current.name.clone(),
                    label: label.clone(),
                    changes,
                });
            }
        }
    }

    ops
}

/// Describe the user-settable fields of `current` that differ from
/// `target`
fn field_changes(current: &Label, target: &Label) -> Vec<String> {
    let mut changes = Vec::new();

    if current.color != target.color {
        changes.push(format!("color: {} -> {}", current.color, target.color));
    }

    if current.description != target.description {
        let old_desc = current.description.as_deref().unwrap_or("(none)");
        let new_desc = target.description.as_deref().unwrap_or("(none)");
        changes.push(format!("description: {} -> {}", old_desc, new_desc));
    }

    changes
}

/// Run one reconciliation cycle.
///
/// Executes the plan sequentially and stops at the first failed mutation;
/// there is no rollback, and the next cycle's diff picks up whatever part
/// of the batch was applied. On success the full remote set is re-fetched
/// and projected into the outcome's `state`:
///
/// - authoritative: the full remote set, pre-existing labels included;
/// - otherwise: only labels named by `previous` or `desired`, so the
///   tracked state never claims labels this declaration has not touched.
pub async fn apply<S: LabelService>(
    service: &S,
    repo: &RepoId,
    previous: &LabelSet,
    desired: &LabelSet,
    authoritative: bool,
) -> Result<ReconcileOutcome> {
    let ops = plan(previous, desired);

    tracing::debug!(
        repository = %repo,
        planned = ops.len(),
        authoritative,
        "reconciling label set"
    );

    let mut outcome = ReconcileOutcome::default();
    for op in ops {
        execute(service, &op).await?;
        outcome.record(op);
    }

    let remote = list_all_labels(service, repo, DEFAULT_PAGE_SIZE).await?;
    outcome.state = project_state(remote, previous, desired, authoritative);

    tracing::debug!(
        repository = %repo,
        created = outcome.created,
        deleted = outcome.deleted,
        updated = outcome.updated,
        tracked = outcome.state.len(),
        "reconciliation cycle complete"
    );

    Ok(outcome)
}

/// Refresh the tracked state without mutating anything.
///
/// Fetches the current remote set and filters it by the previously tracked
/// names; no declared set participates in a plain read. Authoritative
/// state reports the remote set unfiltered.
pub async fn project<S: LabelService>(
    service: &S,
    repo: &RepoId,
    previous: &LabelSet,
    authoritative: bool,
) -> Result<LabelSet> {
    let remote = list_all_labels(service, repo, DEFAULT_PAGE_SIZE).await?;
    Ok(project_state(remote, previous, &LabelSet::new(), authoritative))
}

async fn execute<S: LabelService>(service: &S, op: &LabelOp) -> Result<()> {
    match op {
        LabelOp::Create { label } => {
            service.create_label(label).await?;
        }
        LabelOp::Delete { name } => {
            service.delete_label(name).await?;
        }
        LabelOp::Update {
            old_name, label, ..
        } => {
            service.edit_label(old_name, label).await?;
        }
    }

    Ok(())
}

/// Project the freshly fetched remote set into the reported tracked state
fn project_state(
    remote: Vec<Label>,
    previous: &LabelSet,
    desired: &LabelSet,
    authoritative: bool,
) -> LabelSet {
    if authoritative {
        return remote.into_iter().collect();
    }

    remote
        .into_iter()
        .filter(|label| previous.contains(&label.name) || desired.contains(&label.name))
        .collect()
}
