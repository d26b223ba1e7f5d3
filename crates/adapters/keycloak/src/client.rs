//! Keycloak client implementation

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use shiroha_errors::{AppError, AppResult};
use shiroha_ports::{
    IdentityProvider, IdentityUser, NewIdentityUser, TokenIntrospection, TokenSet, UserInfo,
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::KeycloakConfig;
use crate::error::{map_keycloak_status, map_transport_error};

/// OpenID Connect token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_expires_in: i64,
    session_state: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            refresh_expires_in: token.refresh_expires_in,
            session_state: token.session_state,
            token_type: token.token_type,
        }
    }
}

/// Admin API user representation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRepresentation {
    id: String,
    username: Option<String>,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    enabled: bool,
    attributes: Option<HashMap<String, Vec<String>>>,
}

impl From<UserRepresentation> for IdentityUser {
    fn from(user: UserRepresentation) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            email_verified: user.email_verified,
            enabled: user.enabled,
            attributes: user.attributes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoleRepresentation {
    name: String,
}

/// Keycloak client for authentication and user administration
pub struct KeycloakClient {
    http: reqwest::Client,
    base_url: Url,
    config: KeycloakConfig,
}

impl KeycloakClient {
    /// Create a new Keycloak client
    pub fn new(config: KeycloakConfig) -> AppResult<Self> {
        info!("Using Keycloak at {}", config.base_url);

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::internal(format!("Invalid Keycloak base URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Build an endpoint URL from path segments, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::internal("Keycloak base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn openid_endpoint(&self, realm: &str, action: &[&str]) -> AppResult<Url> {
        let mut segments = vec!["realms", realm, "protocol", "openid-connect"];
        segments.extend_from_slice(action);
        self.endpoint(&segments)
    }

    fn admin_user_endpoint(&self, user_id: Option<&str>, rest: &[&str]) -> AppResult<Url> {
        let mut segments = vec!["admin", "realms", self.config.client_realm.as_str(), "users"];
        if let Some(id) = user_id {
            segments.push(id);
        }
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Pass through success responses, map the rest by status
    async fn check(response: reqwest::Response, context: &str) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "{} failed", context);
        Err(map_keycloak_status(status.as_u16(), context, &body))
    }

    async fn request_token(
        &self,
        realm: &str,
        form: &[(&str, &str)],
        context: &str,
    ) -> AppResult<TokenResponse> {
        let url = self.openid_endpoint(realm, &["token"])?;

        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| map_transport_error(e, context))?;

        Self::check(response, context)
            .await?
            .json::<TokenResponse>()
            .await
            .map_err(|e| AppError::external_service(format!("{}: invalid token response: {}", context, e)))
    }

    /// Obtain an administrative access token (client-credentials grant)
    async fn admin_token(&self) -> AppResult<String> {
        let token = self
            .request_token(
                &self.config.admin_realm,
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", self.config.admin_client_id.as_str()),
                    (
                        "client_secret",
                        self.config.admin_client_secret.expose_secret().as_str(),
                    ),
                ],
                "Admin login",
            )
            .await?;

        Ok(token.access_token)
    }

    async fn userinfo(&self, access_token: &str) -> AppResult<UserInfo> {
        let url = self.openid_endpoint(&self.config.client_realm, &["userinfo"])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Get userinfo"))?;

        Self::check(response, "Get userinfo")
            .await?
            .json::<UserInfo>()
            .await
            .map_err(|e| AppError::external_service(format!("Invalid userinfo response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for KeycloakClient {
    async fn login(&self, email: &str, password: &str) -> AppResult<(TokenSet, UserInfo)> {
        debug!(email = %email, "Password login");

        let token = self
            .request_token(
                &self.config.client_realm,
                &[
                    ("grant_type", "password"),
                    ("client_id", self.config.client_id.as_str()),
                    ("client_secret", self.config.client_secret.expose_secret().as_str()),
                    ("username", email),
                    ("password", password),
                    ("scope", "openid"),
                ],
                "Login",
            )
            .await?;

        let user_info = self.userinfo(&token.access_token).await?;
        Ok((token.into(), user_info))
    }

    async fn create_user(&self, user: &NewIdentityUser) -> AppResult<String> {
        let admin_token = self.admin_token().await?;
        let url = self.admin_user_endpoint(None, &[])?;

        let body = json!({
            "username": user.username(),
            "email": user.email,
            "enabled": true,
            "emailVerified": false,
            "credentials": [{
                "type": "password",
                "value": user.password,
                "temporary": false
            }]
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(&admin_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Create user"))?;
        let response = Self::check(response, "Create user").await?;

        // 201 Created, the new id is the last segment of Location
        let user_id = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| location.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::external_service("Create user: response has no Location header")
            })?;

        info!(user_id = %user_id, "User created");
        Ok(user_id)
    }

    async fn get_user(&self, user_id: &str) -> AppResult<IdentityUser> {
        let admin_token = self.admin_token().await?;
        let url = self.admin_user_endpoint(Some(user_id), &[])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&admin_token)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Get user"))?;

        let user = Self::check(response, "Get user")
            .await?
            .json::<UserRepresentation>()
            .await
            .map_err(|e| AppError::external_service(format!("Invalid user response: {}", e)))?;

        Ok(user.into())
    }

    async fn mark_email_verified(&self, user_id: &str) -> AppResult<()> {
        let admin_token = self.admin_token().await?;
        let url = self.admin_user_endpoint(Some(user_id), &[])?;

        let response = self
            .http
            .put(url)
            .bearer_auth(&admin_token)
            .json(&json!({ "emailVerified": true }))
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Verify email"))?;
        Self::check(response, "Verify email").await?;

        info!(user_id = %user_id, "Email marked as verified");
        Ok(())
    }

    async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let url = self.openid_endpoint(&self.config.client_realm, &["logout"])?;

        let response = self
            .http
            .post(url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret().as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Logout"))?;
        Self::check(response, "Logout").await?;

        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenSet> {
        let token = self
            .request_token(
                &self.config.client_realm,
                &[
                    ("grant_type", "refresh_token"),
                    ("client_id", self.config.client_id.as_str()),
                    ("client_secret", self.config.client_secret.expose_secret().as_str()),
                    ("refresh_token", refresh_token),
                ],
                "Refresh token",
            )
            .await?;

        Ok(token.into())
    }

    async fn has_realm_role(&self, user_id: &str, role: &str) -> AppResult<bool> {
        let admin_token = self.admin_token().await?;
        let url = self.admin_user_endpoint(Some(user_id), &["role-mappings", "realm"])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&admin_token)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Get realm roles"))?;

        let roles = Self::check(response, "Get realm roles")
            .await?
            .json::<Vec<RoleRepresentation>>()
            .await
            .map_err(|e| AppError::external_service(format!("Invalid role response: {}", e)))?;

        Ok(roles.iter().any(|r| r.name == role))
    }

    async fn add_user_to_group(&self, user_id: &str, group_id: &str) -> AppResult<()> {
        let admin_token = self.admin_token().await?;
        let url = self.admin_user_endpoint(Some(user_id), &["groups", group_id])?;

        let response = self
            .http
            .put(url)
            .bearer_auth(&admin_token)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Add user to group"))?;
        Self::check(response, "Add user to group").await?;

        debug!(user_id = %user_id, group_id = %group_id, "User added to group");
        Ok(())
    }

    async fn introspect(&self, access_token: &str) -> AppResult<TokenIntrospection> {
        let url = self.openid_endpoint(&self.config.client_realm, &["token", "introspect"])?;

        let response = self
            .http
            .post(url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret().as_str()),
                ("token", access_token),
            ])
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Introspect token"))?;

        Self::check(response, "Introspect token")
            .await?
            .json::<TokenIntrospection>()
            .await
            .map_err(|e| AppError::external_service(format!("Invalid introspection response: {}", e)))
    }
}
