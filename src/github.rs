//! GitHub API Client
//!
//! The label service seam and its octocrab-backed implementation

use octocrab::Octocrab;

use crate::config::RepoId;
use crate::error::{Error, Result};
use crate::label::Label;

/// Encode a string for use in URL path segments (RFC 3986 with UTF-8 support)
///
/// This function properly encodes UTF-8 characters including Japanese text.
/// Only unreserved characters (A-Z, a-z, 0-9, -, ., _, ~) are left unencoded.
///
/// # Arguments
/// - `input`: The string to encode
///
/// # Returns
/// URL-encoded string safe for use in path segments
fn encode_path_segment(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            // RFC 3986 unreserved characters
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => c.to_string(),
            // Everything else gets percent-encoded as UTF-8 bytes
            _ => c
                .to_string()
                .bytes()
                .map(|b| format!("%{:02X}", b))
                .collect::<String>(),
        })
        .collect()
}

/// One page of a label listing
#[derive(Debug, Clone)]
pub struct LabelPage {
    /// Labels on this page
    pub items: Vec<Label>,

    /// Whether the remote reports a further page
    pub has_next: bool,
}

/// The remote label operations the reconciler drives.
///
/// Implemented by [`GitHubClient`] against the real API and by an in-memory
/// service in the test suite. All calls are blocking request/response from
/// the caller's point of view; none of them retry internally.
pub trait LabelService {
    /// Fetch one page of the repository's labels
    fn list_labels(
        &self,
        page: u32,
        per_page: u8,
    ) -> impl std::future::Future<Output = Result<LabelPage>> + Send;

    /// Create a new label
    fn create_label(&self, label: &Label) -> impl std::future::Future<Output = Result<Label>> + Send;

    /// Update the label currently named `old_name` to match `label`
    ///
    /// The old name addresses the label; the payload may carry a new name.
    fn edit_label(
        &self,
        old_name: &str,
        label: &Label,
    ) -> impl std::future::Future<Output = Result<Label>> + Send;

    /// Delete a label by name
    fn delete_label(&self, name: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Retrieve the complete label set of a repository, following pagination.
///
/// Issues successive paged requests starting at page 1 and stops when the
/// response reports no further page. The first failed request aborts the
/// whole fetch; nothing is retried.
///
/// # Arguments
/// - `service`: The label service to read from
/// - `repo`: Repository identity, used for tracing
/// - `per_page`: Page-size hint passed through to the service
pub async fn list_all_labels<S: LabelService>(
    service: &S,
    repo: &RepoId,
    per_page: u8,
) -> Result<Vec<Label>> {
    let mut labels = Vec::new();
    let mut page = 1u32;

    loop {
        let batch = service.list_labels(page, per_page).await?;
        labels.extend(batch.items);

        if !batch.has_next {
            break;
        }
        page += 1;
    }

    tracing::debug!(repository = %repo, count = labels.len(), "fetched remote label set");

    Ok(labels)
}

/// GitHub API Client
///
/// Client responsible for interactions with the GitHub API
pub struct GitHubClient {
    octocrab: Octocrab,
    repo: RepoId,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// # Arguments
    /// - `access_token`: GitHub access token
    /// - `repo`: Target repository
    ///
    /// # Errors
    /// Returns an error if client initialization or the authentication
    /// check fails
    pub async fn new(access_token: &str, repo: RepoId) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(access_token.to_string())
            .build()
            .map_err(|e| Error::generic(format!("Failed to create GitHub client: {}", e)))?;

        // Authentication test
        let _user = octocrab
            .current()
            .user()
            .await
            .map_err(|_| Error::AuthenticationFailed)?;

        Ok(Self { octocrab, repo })
    }

    /// The repository this client addresses
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Check if the repository exists
    pub async fn repository_exists(&self) -> bool {
        self.octocrab
            .repos(&self.repo.owner, &self.repo.name)
            .get()
            .await
            .is_ok()
    }

    /// Get rate limit information
    ///
    /// # Errors
    /// Returns an error if GitHub API fails
    pub async fn rate_limit(&self) -> Result<RateLimitInfo> {
        let rate_limit = self
            .octocrab
            .ratelimit()
            .get()
            .await
            .map_err(Error::GitHubApi)?;

        Ok(RateLimitInfo {
            limit: rate_limit.resources.core.limit as u32,
            remaining: rate_limit.resources.core.remaining as u32,
            reset_at: chrono::DateTime::from_timestamp(rate_limit.resources.core.reset as i64, 0)
                .unwrap_or_else(chrono::Utc::now),
        })
    }
}

impl LabelService for GitHubClient {
    async fn list_labels(&self, page: u32, per_page: u8) -> Result<LabelPage> {
        let response = self
            .octocrab
            .issues(&self.repo.owner, &self.repo.name)
            .list_labels_for_repo()
            .page(page)
            .per_page(per_page)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("Not Found") {
                    Error::RepositoryNotFound(self.repo.to_string())
                } else {
                    Error::GitHubApi(e)
                }
            })?;

        let has_next = response.next.is_some();
        let items = response
            .items
            .into_iter()
            .map(|label| Label {
                name: label.name,
                color: label.color,
                description: label.description,
                url: Some(label.url.to_string()),
            })
            .collect();

        Ok(LabelPage { items, has_next })
    }

    async fn create_label(&self, label: &Label) -> Result<Label> {
        tracing::debug!(repository = %self.repo, label = %label.name, "creating label");

        let response = self
            .octocrab
            .issues(&self.repo.owner, &self.repo.name)
            .create_label(
                &label.name,
                &label.color,
                label.description.as_deref().unwrap_or(""),
            )
            .await
            .map_err(Error::GitHubApi)?;

        Ok(Label {
            name: response.name,
            color: response.color,
            description: response.description,
            url: Some(response.url.to_string()),
        })
    }

    async fn edit_label(&self, old_name: &str, label: &Label) -> Result<Label> {
        tracing::debug!(repository = %self.repo, from = %old_name, to = %label.name, "updating label");

        // octocrab v0.38 has no label-edit endpoint, so an update is
        // realized as delete-old + create-new
        self.delete_label(old_name).await?;
        self.create_label(label).await
    }

    async fn delete_label(&self, name: &str) -> Result<()> {
        tracing::debug!(repository = %self.repo, label = %name, "deleting label");

        // URL encode the label name to handle spaces, special characters, and UTF-8
        let encoded_name = encode_path_segment(name);
        self.octocrab
            .issues(&self.repo.owner, &self.repo.name)
            .delete_label(&encoded_name)
            .await
            .map_err(Error::GitHubApi)?;

        Ok(())
    }
}

/// Rate Limit Information
///
/// Represents GitHub API rate limit status
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Hourly limit
    pub limit: u32,

    /// Remaining usage count
    pub remaining: u32,

    /// Reset time
    pub reset_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_segment() {
        // Basic ASCII characters
        assert_eq!(encode_path_segment("bug"), "bug");
        assert_eq!(encode_path_segment("feature-request"), "feature-request");

        // Spaces and special characters
        assert_eq!(
            encode_path_segment("good first issue"),
            "good%20first%20issue"
        );
        assert_eq!(encode_path_segment("help wanted"), "help%20wanted");

        // Japanese characters (UTF-8)
        assert_eq!(encode_path_segment("バグ"), "%E3%83%90%E3%82%B0");

        // RFC 3986 unreserved characters should remain unchanged
        assert_eq!(
            encode_path_segment("test-label_v1.2~alpha"),
            "test-label_v1.2~alpha"
        );

        // Special characters that need encoding
        assert_eq!(encode_path_segment("test/label"), "test%2Flabel");
        assert_eq!(encode_path_segment("test@label"), "test%40label");
    }
}
