//! GitHub REST implementation of [Provider].
//!
//! Every call is a single blocking request; nothing is retried or cached.

use crate::config::ProviderConfig;
use crate::credentials::AccessToken;
use crate::domain::{Tag, MASTER_BRANCH};
use crate::error::{ReleaseTrainError, Result};
use crate::provider::{archive, BranchCreation, MergeOutcome, PullRequest, Provider};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

const PER_PAGE: usize = 100;
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct ReleaseJson {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct BranchJson {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RefObjectJson {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefJson {
    object: RefObjectJson,
}

#[derive(Debug, Deserialize)]
struct PullRefJson {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullJson {
    number: u64,
    title: String,
    html_url: String,
    head: PullRefJson,
    base: PullRefJson,
}

impl From<PullJson> for PullRequest {
    fn from(pr: PullJson) -> Self {
        PullRequest {
            number: pr.number,
            title: pr.title,
            head: pr.head.name,
            base: pr.base.name,
            url: pr.html_url,
        }
    }
}

/// Provider backed by the GitHub REST API for one `owner/repo`
pub struct GitHubProvider {
    owner: String,
    repo: String,
    api_url: String,
    token: AccessToken,
    client: Client,
    max_archive_bytes: u64,
}

impl GitHubProvider {
    /// Build a provider with its own HTTP client configured from `config`
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: AccessToken,
        config: &ProviderConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(GitHubProvider {
            owner: owner.into(),
            repo: repo.into(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            client,
            max_archive_bytes: config.max_archive_bytes,
        })
    }

    /// Full URL of a repository resource, e.g. `/releases/latest`
    pub fn repo_url(&self, resource: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_url, self.owner, self.repo, resource
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.expose())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn get(&self, resource: &str) -> RequestBuilder {
        let url = self.repo_url(resource);
        tracing::debug!(%url, "GET");
        self.authorized(self.client.get(url))
    }

    fn post(&self, resource: &str, body: serde_json::Value) -> RequestBuilder {
        let url = self.repo_url(resource);
        tracing::debug!(%url, "POST");
        self.authorized(self.client.post(url)).json(&body)
    }

    /// Every item of a paginated list resource
    fn get_all<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<Vec<T>> {
        let per_page = PER_PAGE.to_string();
        collect_pages(PER_PAGE, |page| {
            let page = page.to_string();
            let response = self
                .get(resource)
                .query(params)
                .query(&[("per_page", per_page.as_str()), ("page", page.as_str())])
                .send()?;
            let response = expect_status(response, StatusCode::OK, context)?;
            Ok(response.json()?)
        })
    }

    fn trunk_sha(&self) -> Result<String> {
        let response = self.get(&format!("/git/ref/heads/{}", MASTER_BRANCH)).send()?;
        let response = expect_status(response, StatusCode::OK, "Reading trunk head")?;
        let reference: RefJson = response.json()?;
        Ok(reference.object.sha)
    }
}

/// Fetches pages starting at 1 until one comes back shorter than `per_page`
fn collect_pages<T, F>(per_page: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Result<Vec<T>>,
{
    let mut items = Vec::new();
    for page in 1.. {
        let batch = fetch(page)?;
        let count = batch.len();
        items.extend(batch);
        if count < per_page {
            break;
        }
    }
    Ok(items)
}

/// Body of a failed response, for error messages
fn response_text(response: Response) -> String {
    response
        .text()
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e))
}

fn unexpected(status: StatusCode, context: &str, body: &str) -> ReleaseTrainError {
    ReleaseTrainError::provider(format!(
        "{}: unexpected result code from GitHub ({}): {}",
        context,
        status.as_u16(),
        body
    ))
}

fn expect_status(response: Response, expected: StatusCode, context: &str) -> Result<Response> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }
    Err(unexpected(status, context, &response_text(response)))
}

/// Interprets the status of `POST /merges`
pub fn merge_outcome(status: StatusCode, body: &str) -> Result<MergeOutcome> {
    match status {
        StatusCode::CREATED => Ok(MergeOutcome::Merged),
        StatusCode::NO_CONTENT => Ok(MergeOutcome::NothingToMerge),
        StatusCode::CONFLICT => Ok(MergeOutcome::Conflict {
            detail: body.to_string(),
        }),
        _ => Err(unexpected(status, "Merging", body)),
    }
}

/// Interprets the status of `POST /git/refs`
pub fn branch_creation(status: StatusCode, body: &str) -> Result<BranchCreation> {
    match status {
        StatusCode::CREATED => Ok(BranchCreation::Created),
        StatusCode::UNPROCESSABLE_ENTITY => Ok(BranchCreation::AlreadyExists),
        _ => Err(unexpected(status, "Creating branch", body)),
    }
}

/// Reads a response body, refusing anything larger than `max_size` bytes
fn read_with_limit(response: Response, max_size: u64) -> Result<Vec<u8>> {
    if let Some(content_length) = response.content_length() {
        if content_length > max_size {
            return Err(ReleaseTrainError::provider(format!(
                "Archive of {} bytes exceeds maximum allowed size of {} bytes",
                content_length, max_size
            )));
        }
    }

    let mut bytes = Vec::new();
    response.take(max_size + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > max_size {
        return Err(ReleaseTrainError::provider(format!(
            "Archive exceeds maximum allowed size of {} bytes",
            max_size
        )));
    }
    Ok(bytes)
}

impl Provider for GitHubProvider {
    fn latest_release_tag(&self) -> Result<Tag> {
        let response = self.get("/releases/latest").send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ReleaseTrainError::not_found(format!(
                "No release found for {}/{}",
                self.owner, self.repo
            )));
        }
        let response = expect_status(response, StatusCode::OK, "Reading latest release")?;
        let release: ReleaseJson = response.json()?;
        Ok(Tag::new(release.tag_name))
    }

    fn branch_names(&self) -> Result<Vec<String>> {
        let branches: Vec<BranchJson> = self.get_all("/branches", &[], "Listing branches")?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    fn create_branch_from_trunk(&self, name: &str) -> Result<BranchCreation> {
        let sha = self.trunk_sha()?;
        let body = json!({ "ref": format!("refs/heads/{}", name), "sha": sha });
        let response = self.post("/git/refs", body).send()?;
        let status = response.status();
        branch_creation(status, &response_text(response))
    }

    fn merge(&self, base: &str, head: &str, message: &str) -> Result<MergeOutcome> {
        let body = json!({ "base": base, "head": head, "commit_message": message });
        let response = self.post("/merges", body).send()?;
        let status = response.status();
        merge_outcome(status, &response_text(response))
    }

    fn tag_trunk(&self, tag_name: &str) -> Result<()> {
        let body = json!({
            "tag_name": tag_name,
            "target_commitish": MASTER_BRANCH,
            "name": tag_name,
            "body": "",
            "draft": false,
            "prerelease": false,
        });
        let response = self.post("/releases", body).send()?;
        expect_status(response, StatusCode::CREATED, "Tagging release")?;
        Ok(())
    }

    fn create_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let payload = json!({ "head": head, "base": base, "title": title, "body": body });
        let response = self.post("/pulls", payload).send()?;
        let response = expect_status(response, StatusCode::CREATED, "Creating pull request")?;
        let pr: PullJson = response.json()?;
        Ok(pr.into())
    }

    fn download_and_extract_archive(&self, branch: &str, destination: &Path) -> Result<()> {
        let response = self.get(&format!("/zipball/{}", branch)).send()?;
        let response = expect_status(response, StatusCode::OK, "Downloading archive")?;
        let bytes = read_with_limit(response, self.max_archive_bytes)?;
        tracing::debug!(bytes = bytes.len(), branch, "downloaded archive");
        archive::extract_zip(&bytes, destination)
    }

    fn list_pull_requests(&self, base: &str) -> Result<Vec<PullRequest>> {
        let pulls: Vec<PullJson> = self.get_all(
            "/pulls",
            &[("base", base), ("state", "open")],
            "Listing pull requests",
        )?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_url: &str) -> GitHubProvider {
        let config = ProviderConfig {
            api_url: api_url.to_string(),
            ..ProviderConfig::default()
        };
        GitHubProvider::new(
            "acme",
            "widgets",
            AccessToken::new("token").unwrap(),
            &config,
        )
        .unwrap()
    }

    #[test]
    fn test_repo_url() {
        let github = provider("https://api.github.com");
        assert_eq!(
            github.repo_url("/releases/latest"),
            "https://api.github.com/repos/acme/widgets/releases/latest"
        );
    }

    #[test]
    fn test_repo_url_trims_trailing_slash() {
        let github = provider("https://github.example.com/api/v3/");
        assert_eq!(
            github.repo_url("/merges"),
            "https://github.example.com/api/v3/repos/acme/widgets/merges"
        );
    }

    #[test]
    fn test_merge_outcome_mapping() {
        assert_eq!(
            merge_outcome(StatusCode::CREATED, "").unwrap(),
            MergeOutcome::Merged
        );
        assert_eq!(
            merge_outcome(StatusCode::NO_CONTENT, "").unwrap(),
            MergeOutcome::NothingToMerge
        );
        assert_eq!(
            merge_outcome(StatusCode::CONFLICT, "Merge conflict").unwrap(),
            MergeOutcome::Conflict {
                detail: "Merge conflict".to_string()
            }
        );
        let err = merge_outcome(StatusCode::NOT_FOUND, "Base does not exist").unwrap_err();
        assert!(matches!(err, ReleaseTrainError::Provider(_)));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_branch_creation_mapping() {
        assert_eq!(
            branch_creation(StatusCode::CREATED, "").unwrap(),
            BranchCreation::Created
        );
        assert_eq!(
            branch_creation(StatusCode::UNPROCESSABLE_ENTITY, "Reference already exists").unwrap(),
            BranchCreation::AlreadyExists
        );
        assert!(branch_creation(StatusCode::FORBIDDEN, "").is_err());
    }

    #[test]
    fn test_pull_request_from_json() {
        let pr: PullJson = serde_json::from_str(
            r#"{
                "number": 42,
                "title": "Apply hotfix 'hotfix-1.3.1' to 'develop'",
                "html_url": "https://github.com/acme/widgets/pull/42",
                "head": { "ref": "hotfix-1.3.1", "sha": "abc" },
                "base": { "ref": "develop", "sha": "def" },
                "state": "open"
            }"#,
        )
        .unwrap();
        let pr = PullRequest::from(pr);
        assert_eq!(pr.number, 42);
        assert_eq!(pr.head, "hotfix-1.3.1");
        assert_eq!(pr.base, "develop");
    }

    #[test]
    fn test_collect_pages_follows_full_pages() {
        let mut requested = Vec::new();
        let items = collect_pages(2, |page| {
            requested.push(page);
            Ok(match page {
                1 => vec!["a", "b"],
                2 => vec!["c", "d"],
                _ => vec!["e"],
            })
        })
        .unwrap();
        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[test]
    fn test_collect_pages_stops_on_empty_page() {
        let mut calls = 0;
        let items: Vec<u32> = collect_pages(2, |_| {
            calls += 1;
            Ok(if calls == 1 { vec![1, 2] } else { Vec::new() })
        })
        .unwrap();
        assert_eq!(items, vec![1, 2]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_collect_pages_propagates_errors() {
        let result: Result<Vec<u32>> =
            collect_pages(2, |_| Err(ReleaseTrainError::provider("boom")));
        assert!(result.is_err());
    }

    #[test]
    fn test_release_json_ignores_extra_fields() {
        let release: ReleaseJson =
            serde_json::from_str(r#"{ "tag_name": "v1.3.0", "draft": false, "id": 1 }"#).unwrap();
        assert_eq!(release.tag_name, "v1.3.0");
    }
}
