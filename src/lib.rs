//! # gh-labelset
//!
//! Declarative reconciliation of a GitHub repository's issue label set
//!
//! ## Features
//! - Three-way diff between tracked, declared, and remote label sets
//! - Minimal create/delete/update mutations per cycle
//! - Authoritative and non-authoritative ownership modes
//! - Pagination-aware remote listing

pub mod config;
pub mod error;
pub mod github;
pub mod label;
pub mod reconcile;
pub mod state;

pub use config::RepoId;
pub use error::{Error, Result};
pub use github::{GitHubClient, LabelService};
pub use label::{Label, LabelSet};
pub use reconcile::{LabelOp, ReconcileOutcome};
pub use state::TrackedState;

/// Run one reconciliation cycle against a repository.
///
/// Convenience wrapper over [`reconcile::apply`] that builds the GitHub
/// client and normalizes the declared labels. The returned outcome's
/// `state` is the tracked set to feed into the next cycle as `previous`.
///
/// # Examples
///
/// ```rust,no_run
/// use gh_labelset::{reconcile_repository_labels, Label};
///
/// #[tokio::main]
/// async fn main() -> gh_labelset::Result<()> {
///     let desired = vec![Label::new("bug", "d73a4a").with_description("Something isn't working")];
///
///     let outcome = reconcile_repository_labels(
///         "your_github_token",
///         "owner/repo",
///         Vec::new(), // previous tracked labels; empty on the first cycle
///         desired,
///         false,
///     )
///     .await?;
///
///     println!("created {} labels", outcome.created);
///     Ok(())
/// }
/// ```
pub async fn reconcile_repository_labels(
    access_token: &str,
    repository: &str,
    previous: Vec<Label>,
    desired: Vec<Label>,
    authoritative: bool,
) -> Result<ReconcileOutcome> {
    let repo: RepoId = repository.parse()?;
    let desired = config::normalize_labels(desired)?;

    let client = GitHubClient::new(access_token, repo.clone()).await?;
    reconcile::apply(
        &client,
        &repo,
        &previous.into(),
        &desired.into(),
        authoritative,
    )
    .await
}
