//
//  tea-cli
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client for the Gitea API
//!
//! This module provides the HTTP client that implements [`ForgeApi`] against
//! `<base URL>/api/v1`.
//!
//! ## Features
//!
//! - Authentication header injection (`Authorization: token ...` or basic auth)
//! - JSON serialization/deserialization
//! - Status codes mapped to [`ApiError`] variants
//! - Custom User-Agent header
//! - Optional TLS certificate verification bypass for self-signed forges

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::forge::{ForgeApi, ForgeConnector};
use super::gitea::repositories::OneOrMany;
use super::gitea::{
    AccessToken, CreateAccessTokenOption, CreatePullRequestOption, GitReference, PublicKey,
    PullRequest, Repository, User,
};
use super::ApiError;
use crate::auth::AuthCredential;

/// Page size for list endpoints.
const PAGE_LIMIT: usize = 50;

/// The Gitea REST client.
///
/// # Example
///
/// ```rust,no_run
/// use tea_cli::api::{ForgeApi, GiteaClient};
/// use tea_cli::auth::AuthCredential;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = GiteaClient::new("https://gitea.com", false)?
///     .with_auth(AuthCredential::Token { token: "your-token".into() });
/// let me = client.whoami().await?;
/// println!("Logged in as {}", me.login);
/// # Ok(())
/// # }
/// ```
pub struct GiteaClient {
    /// The underlying HTTP client
    http: Client,
    /// Forge base URL without trailing slash
    base_url: String,
    /// Optional authentication credentials
    auth: Option<AuthCredential>,
}

impl GiteaClient {
    /// Creates a client for the forge at `base_url`.
    ///
    /// # Parameters
    ///
    /// * `base_url` - Forge root, e.g. `https://gitea.com`
    /// * `insecure` - Accept invalid TLS certificates
    pub fn new(base_url: &str, insecure: bool) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            http: Client::builder()
                .user_agent(format!("tea/{}", crate::VERSION))
                .danger_accept_invalid_certs(insecure)
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: None,
        })
    }

    /// Sets the authentication credentials for this client.
    pub fn with_auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Returns the API root, `<base URL>/api/v1`.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.base_url)
    }

    /// Builds an endpoint URL from path segments, escaping each one.
    ///
    /// A segment containing `/` is split, so a ref like `heads/feature/x`
    /// keeps its structure.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.api_url())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .extend(segments.iter().flat_map(|s| s.split('/')));
        Ok(url)
    }

    /// Makes an HTTP GET request to the endpoint.
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.send(self.http.get(url)).await
    }

    /// Makes an HTTP POST request to the endpoint with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(self.http.post(url).json(body)).await
    }

    /// Fetches every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        for page in 1.. {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("limit", &PAGE_LIMIT.to_string());
            let batch: Vec<T> = self.get(page_url).await?;
            let done = batch.len() < PAGE_LIMIT;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }

    async fn send<T: DeserializeOwned>(&self, mut request: RequestBuilder) -> Result<T, ApiError> {
        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "api response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status, &text));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ForgeApi for GiteaClient {
    async fn whoami(&self) -> Result<User, ApiError> {
        self.get(self.endpoint(&["user"])?).await
    }

    async fn list_access_tokens(&self, user: &str) -> Result<Vec<AccessToken>, ApiError> {
        self.get_all(self.endpoint(&["users", user, "tokens"])?)
            .await
    }

    async fn create_access_token(
        &self,
        user: &str,
        name: &str,
        scopes: &[&str],
    ) -> Result<AccessToken, ApiError> {
        let body = CreateAccessTokenOption {
            name: name.to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        };
        self.post(self.endpoint(&["users", user, "tokens"])?, &body)
            .await
    }

    async fn list_public_keys(&self) -> Result<Vec<PublicKey>, ApiError> {
        self.get_all(self.endpoint(&["user", "keys"])?).await
    }

    async fn get_repo(&self, owner: &str, name: &str) -> Result<Repository, ApiError> {
        self.get(self.endpoint(&["repos", owner, name])?).await
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        index: i64,
    ) -> Result<PullRequest, ApiError> {
        let index = index.to_string();
        self.get(self.endpoint(&["repos", owner, name, "pulls", &index])?)
            .await
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        option: &CreatePullRequestOption,
    ) -> Result<PullRequest, ApiError> {
        self.post(self.endpoint(&["repos", owner, name, "pulls"])?, option)
            .await
    }

    async fn list_repo_refs(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<Vec<GitReference>, ApiError> {
        let git_ref = git_ref.trim_start_matches("refs/");
        let url = self.endpoint(&["repos", owner, name, "git", "refs", git_ref])?;
        match self.get::<OneOrMany<GitReference>>(url).await {
            Ok(refs) => Ok(refs.into()),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// Connects [`GiteaClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct GiteaConnector;

impl ForgeConnector for GiteaConnector {
    fn connect(
        &self,
        base_url: &str,
        credential: AuthCredential,
        insecure: bool,
    ) -> Result<Box<dyn ForgeApi>, ApiError> {
        Ok(Box::new(
            GiteaClient::new(base_url, insecure)?.with_auth(credential),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> GiteaClient {
        GiteaClient::new(&server.url(), false)
            .unwrap()
            .with_auth(AuthCredential::Token {
                token: "t0k3n".to_string(),
            })
    }

    #[tokio::test]
    async fn test_whoami_sends_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/user")
            .match_header("authorization", "token t0k3n")
            .match_header("user-agent", Matcher::Regex(r"^tea/".to_string()))
            .with_status(200)
            .with_body(r#"{"id":1,"login":"alice"}"#)
            .create_async()
            .await;

        let user = client(&server).whoami().await.unwrap();
        assert_eq!(user.login, "alice");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_basic_auth_for_token_creation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/users/alice/tokens")
            .match_header("authorization", "Basic YWxpY2U6c2VjcmV0")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "gitea.com-tea",
                "scopes": ["write:repository"]
            })))
            .with_status(201)
            .with_body(r#"{"id":7,"name":"gitea.com-tea","sha1":"abcdef"}"#)
            .create_async()
            .await;

        let api = GiteaClient::new(&server.url(), false)
            .unwrap()
            .with_auth(AuthCredential::Basic {
                username: "alice".to_string(),
                password: "secret".to_string(),
            });
        let token = api
            .create_access_token("alice", "gitea.com-tea", &["write:repository"])
            .await
            .unwrap();
        assert_eq!(token.sha1, "abcdef");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_tokens_follows_pages() {
        let mut server = mockito::Server::new_async().await;
        let first: Vec<_> = (0..PAGE_LIMIT)
            .map(|i| serde_json::json!({"id": i, "name": format!("t{i}")}))
            .collect();
        let page1 = server
            .mock("GET", "/api/v1/users/alice/tokens")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(serde_json::to_string(&first).unwrap())
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/api/v1/users/alice/tokens")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(r#"[{"id":99,"name":"last"}]"#)
            .create_async()
            .await;

        let tokens = client(&server).list_access_tokens("alice").await.unwrap();
        assert_eq!(tokens.len(), PAGE_LIMIT + 1);
        assert_eq!(tokens.last().unwrap().name, "last");
        page1.assert_async().await;
        page2.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/repos/gitea/missing")
            .with_status(404)
            .with_body(r#"{"message":"The target couldn't be found."}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/v1/repos/gitea/tea/pulls")
            .with_status(409)
            .with_body(r#"{"message":"pull request already exists"}"#)
            .create_async()
            .await;

        let api = client(&server);
        let err = api.get_repo("gitea", "missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "The target couldn't be found."));

        let err = api
            .create_pull_request("gitea", "tea", &CreatePullRequestOption::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn test_list_repo_refs_shapes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/repos/gitea/tea/git/refs/pull/3/head")
            .with_body(r#"{"ref":"refs/pull/3/head","object":{"type":"commit","sha":"deadbeef"}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v1/repos/gitea/tea/git/refs/heads/feat")
            .with_body(r#"[{"ref":"refs/heads/feat-a","object":{"sha":"a"}},{"ref":"refs/heads/feat-b","object":{"sha":"b"}}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v1/repos/gitea/tea/git/refs/heads/gone")
            .with_status(404)
            .create_async()
            .await;

        let api = client(&server);
        let refs = api
            .list_repo_refs("gitea", "tea", "refs/pull/3/head")
            .await
            .unwrap();
        assert_eq!(refs[0].object.sha, "deadbeef");
        assert_eq!(
            api.list_repo_refs("gitea", "tea", "heads/feat")
                .await
                .unwrap()
                .len(),
            2
        );
        assert!(api
            .list_repo_refs("gitea", "tea", "heads/gone")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/user")
            .with_body("<html>login</html>")
            .create_async()
            .await;
        let err = client(&server).whoami().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_endpoint_escaping() {
        let api = GiteaClient::new("https://git.example.com/forge/", false).unwrap();
        assert_eq!(api.api_url(), "https://git.example.com/forge/api/v1");
        let url = api.endpoint(&["repos", "a b", "c"]).unwrap();
        assert_eq!(url.as_str(), "https://git.example.com/forge/api/v1/repos/a%20b/c");
        assert!(GiteaClient::new("not a url", false).is_err());
    }
}
