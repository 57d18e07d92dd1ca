//! Identity Toolkit REST client.
//!
//! Every call is a JSON `POST {base}/accounts:{method}?key={api_key}`. Errors
//! come back as `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}` and are
//! mapped onto [`AuthErrorCode`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthError, AuthErrorCode, FederatedCredential, IdentityProvider, ProfileUpdate};
use crate::config::IdentityConfig;
use crate::models::Session;

pub struct FirebaseIdentity {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    idp_request_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: Option<String>,
    email: Option<String>,
    id_token: Option<String>,
    refresh_token: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    // signInWithIdp reports some failures inside a 200 response, without tokens
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    display_name: Option<String>,
    photo_url: Option<String>,
    id_token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    created_at: Option<String>,
    last_login_at: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
}

fn millis(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

impl FirebaseIdentity {
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(AuthError::NotConfigured("GREEN_NEST_API_KEY"))?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            idp_request_uri: config.idp_request_uri.clone(),
        })
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, AuthError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/accounts:{method}", self.base_url);
        debug!(method, "identity service request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => {
                debug!(method, %status, message = %envelope.error.message, "identity service error");
                Err(AuthError::Provider(AuthErrorCode::from_rest_message(
                    &envelope.error.message,
                )))
            }
            Err(_) => Err(AuthError::UnexpectedResponse(format!("{status}: {text}"))),
        }
    }

    /// Fills in the profile fields and timestamps the token endpoints omit.
    async fn session_from(&self, tokens: TokenResponse) -> Result<Session, AuthError> {
        if let Some(message) = tokens.error_message.as_deref() {
            return Err(AuthError::Provider(AuthErrorCode::from_rest_message(message)));
        }
        let (Some(uid), Some(id_token), Some(refresh_token)) =
            (tokens.local_id, tokens.id_token, tokens.refresh_token)
        else {
            return Err(AuthError::UnexpectedResponse(
                "token response is missing localId, idToken or refreshToken".into(),
            ));
        };

        let lookup: LookupResponse = self
            .call(
                "lookup",
                &LookupRequest {
                    id_token: &id_token,
                },
            )
            .await?;
        let account = lookup.users.into_iter().next();

        let (email, display_name, photo_url, created_at, last_login_at) = match account {
            Some(account) => (
                account.email.or(tokens.email),
                account.display_name.or(tokens.display_name),
                account.photo_url.or(tokens.photo_url),
                millis(account.created_at.as_deref()),
                millis(account.last_login_at.as_deref()),
            ),
            None => (tokens.email, tokens.display_name, tokens.photo_url, None, None),
        };

        Ok(Session {
            uid,
            email: email.unwrap_or_default(),
            display_name,
            photo_url,
            id_token,
            refresh_token,
            created_at,
            last_login_at,
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let tokens: TokenResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        self.session_from(tokens).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let tokens: TokenResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        self.session_from(tokens).await
    }

    async fn sign_in_with_idp(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Session, AuthError> {
        let post_body = serde_urlencoded::to_string([
            ("id_token", credential.id_token.as_str()),
            ("providerId", credential.provider_id.as_str()),
        ])?;
        let tokens: TokenResponse = self
            .call(
                "signInWithIdp",
                &IdpRequest {
                    post_body,
                    request_uri: &self.idp_request_uri,
                    return_idp_credential: true,
                    return_secure_token: true,
                },
            )
            .await?;
        self.session_from(tokens).await
    }

    async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<Session, AuthError> {
        let response: UpdateResponse = self
            .call(
                "update",
                &UpdateRequest {
                    id_token: &session.id_token,
                    display_name: update.display_name.as_deref(),
                    photo_url: update.photo_url.as_deref(),
                    return_secure_token: true,
                },
            )
            .await?;

        let mut updated = session.clone();
        updated.display_name = response.display_name.or(updated.display_name);
        updated.photo_url = response.photo_url.or(updated.photo_url);
        if let Some(id_token) = response.id_token {
            updated.id_token = id_token;
        }
        if let Some(refresh_token) = response.refresh_token {
            updated.refresh_token = refresh_token;
        }
        Ok(updated)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        Ok(())
    }
}
