//! GitHub OAuth 2.0 authorization code flow.
//!
//! Only the pieces needed to identify a user are implemented: building the
//! authorize URL, exchanging the callback code for an access token, and
//! reading the user's id and email.

use crate::auth::models::GithubProfile;
use crate::config::GithubConfig;
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const API_URL: &str = "https://api.github.com";
const SCOPE: &str = "user:email";
const USER_AGENT: &str = concat!("sessionauth/", env!("CARGO_PKG_VERSION"));

/// External identity provider used by the OAuth routes.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL the browser is redirected to in order to start the flow.
    fn authorize_url(&self) -> ServiceResult<String>;

    /// Turns the callback `code` into the provider's profile of the user.
    async fn fetch_profile(&self, code: &str) -> ServiceResult<GithubProfile>;
}

/// GitHub token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Subset of `GET /user`
#[derive(Debug, Deserialize)]
struct GithubUser {
    id: u64,
    email: Option<String>,
}

/// Entry of `GET /user/emails`
#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

pub struct GithubClient {
    config: GithubConfig,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> ServiceResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ServiceError::external_service(format!("HTTP client error: {}", e)))?;

        Ok(Self { config, http })
    }

    async fn exchange_code(&self, code: &str) -> ServiceResult<String> {
        let response: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(github_error)?
            .error_for_status()
            .map_err(github_error)?
            .json()
            .await
            .map_err(github_error)?;

        match response.access_token {
            Some(token) => Ok(token),
            None => Err(ServiceError::external_service(format!(
                "GitHub rejected the authorization code: {}",
                response
                    .error_description
                    .or(response.error)
                    .unwrap_or_else(|| "no access token".to_string())
            ))),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        token: &str,
    ) -> ServiceResult<T> {
        self.http
            .get(format!("{API_URL}{path}"))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(github_error)?
            .error_for_status()
            .map_err(github_error)?
            .json()
            .await
            .map_err(github_error)
    }
}

#[async_trait]
impl OAuthProvider for GithubClient {
    fn authorize_url(&self) -> ServiceResult<String> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("scope", SCOPE),
            ],
        )
        .map_err(|e| ServiceError::external_service(format!("Invalid authorize URL: {}", e)))?;

        Ok(url.into())
    }

    async fn fetch_profile(&self, code: &str) -> ServiceResult<GithubProfile> {
        let token = self.exchange_code(code).await?;
        let user: GithubUser = self.get_json("/user", &token).await?;

        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => Some(email),
            None => {
                let emails: Vec<GithubEmail> = self.get_json("/user/emails", &token).await?;
                pick_email(emails)
            }
        };

        Ok(GithubProfile {
            github_id: user.id.to_string(),
            email,
        })
    }
}

/// Primary verified address first, then any address at all.
fn pick_email(emails: Vec<GithubEmail>) -> Option<String> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.first())
        .map(|e| e.email.clone())
}

fn github_error(error: reqwest::Error) -> ServiceError {
    ServiceError::external_service(format!("GitHub request failed: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GithubClient {
        GithubClient::new(GithubConfig {
            client_id: "abc123".to_string(),
            client_secret: "shh".to_string(),
            callback_url: "http://localhost:3000/api/auth/github/callback".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_authorize_url() {
        let url = Url::parse(&client().authorize_url().unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path(), "/login/oauth/authorize");

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("client_id".to_string(), "abc123".to_string())));
        assert!(params.contains(&("scope".to_string(), "user:email".to_string())));
        assert!(params.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:3000/api/auth/github/callback".to_string()
        )));
        assert!(!url.as_str().contains("shh"));
    }

    #[test]
    fn test_pick_email_prefers_primary_verified() {
        let emails: Vec<GithubEmail> = serde_json::from_value(serde_json::json!([
            {"email": "other@x.com", "primary": false, "verified": true},
            {"email": "unverified@x.com", "primary": true, "verified": false},
            {"email": "main@x.com", "primary": true, "verified": true}
        ]))
        .unwrap();
        assert_eq!(pick_email(emails).as_deref(), Some("main@x.com"));
    }

    #[test]
    fn test_pick_email_fallbacks() {
        let emails: Vec<GithubEmail> = serde_json::from_value(serde_json::json!([
            {"email": "first@x.com"},
            {"email": "second@x.com"}
        ]))
        .unwrap();
        assert_eq!(pick_email(emails).as_deref(), Some("first@x.com"));
        assert_eq!(pick_email(Vec::new()), None);
    }

    #[test]
    fn test_token_error_payload() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        }))
        .unwrap();
        assert!(response.access_token.is_none());
        assert_eq!(response.error.as_deref(), Some("bad_verification_code"));
    }
}
