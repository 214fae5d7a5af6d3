//! Sign-in, registration and sign-out on top of [`AuthedClient`].

use lex_core::{Durability, TokenPair};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::AuthError;
use crate::executor::AuthedClient;
use crate::transport::{ApiRequest, ApiResponse};

pub const TOKEN_PATH: &str = "/api/token";
pub const REGISTER_PATH: &str = "/api/register";

pub const MIN_PASSWORD_LEN: usize = 8;

/// Body of a successful registration. Tokens are optional.
#[derive(Debug, Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    /// The server issued tokens; they are stored in the ephemeral tier.
    SignedIn,
    /// Account created; the user still has to log in.
    AccountCreated,
}

impl AuthedClient {
    /// Exchange username and password for a token pair and store it.
    ///
    /// Whatever was stored before is cleared first, then both tokens go to
    /// the tier selected by `durability`.
    ///
    /// # Errors
    ///
    /// - `ServerUnreachable` if the reachability probe fails
    /// - `InvalidCredentials` for 4xx answers, carrying the server's `detail`
    /// - `Server` for 5xx answers
    /// - `MalformedResponse` if the token pair cannot be decoded
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        durability: Durability,
    ) -> Result<(), AuthError> {
        self.probe().await?;

        let request = ApiRequest::post(self.url(TOKEN_PATH))
            .json(json!({ "username": username, "password": password }));
        let response = self.send_anonymous(request).await?;

        if !response.is_success() {
            if response.status >= 500 {
                return Err(server_error(&response));
            }
            let reason = response
                .detail()
                .unwrap_or_else(|| "invalid username or password".into());
            tracing::warn!(status = response.status, %reason, "login rejected");
            return Err(AuthError::InvalidCredentials(reason));
        }

        let pair: TokenPair = response
            .json()
            .map_err(|e| AuthError::MalformedResponse(format!("token response: {e}")))?;
        self.store().store_login(&pair, durability)?;

        tracing::info!(?durability, "signed in");
        Ok(())
    }

    /// Create an account. Tokens returned by the server are kept for this
    /// process only.
    ///
    /// # Errors
    ///
    /// - `Registration` for local validation failures and field errors
    ///   reported by the server (`{"username": ["already exists"]}`)
    /// - `Server` for 5xx answers
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Registered, AuthError> {
        validate_registration(username, email, password)?;

        let request = ApiRequest::post(self.url(REGISTER_PATH)).json(json!({
            "username": username.trim(),
            "email": email.trim(),
            "password": password,
        }));
        let response = self.send_anonymous(request).await?;

        if !response.is_success() {
            if response.status >= 500 {
                return Err(server_error(&response));
            }
            return Err(AuthError::Registration(field_errors(&response)));
        }

        let body: RegisterResponse = response
            .json()
            .map_err(|e| AuthError::MalformedResponse(format!("register response: {e}")))?;
        match (body.access, body.refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                self.store()
                    .store_login(&TokenPair { access, refresh }, Durability::Ephemeral)?;
                tracing::info!(username, "registered and signed in");
                Ok(Registered::SignedIn)
            }
            _ => {
                tracing::info!(username, "registered");
                Ok(Registered::AccountCreated)
            }
        }
    }

    /// Forget all stored credentials. Purely local.
    pub fn logout(&self) {
        self.store().clear();
        tracing::info!("signed out");
    }
}

fn server_error(response: &ApiResponse) -> AuthError {
    AuthError::Server {
        status: response.status,
        message: response.error_message(),
    }
}

/// Client-side checks mirroring the registration form.
///
/// # Errors
///
/// Returns `AuthError::Registration` naming the first offending field.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::Registration("username: must not be empty".into()));
    }
    if !looks_like_email(email.trim()) {
        return Err(AuthError::Registration(
            "email: must look like name@example.com".into(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Registration(format!(
            "password: must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !local.is_empty() && !host.is_empty() && !tld.is_empty()
}

/// First field error of a DRF-style `{"field": ["message", ...]}` body.
fn field_errors(response: &ApiResponse) -> String {
    let Ok(Value::Object(map)) = response.json::<Value>() else {
        return response.error_message();
    };
    for field in ["username", "email", "password"] {
        if let Some(message) = first_message(&map, field) {
            return format!("{field}: {message}");
        }
    }
    response.detail().unwrap_or_else(|| "registration failed".into())
}

fn first_message(map: &Map<String, Value>, field: &str) -> Option<String> {
    match map.get(field)? {
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => messages.first()?.as_str().map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lex_config::ApiConfig;
    use lex_core::TokenKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::error::TransportError;
    use crate::testing::{ScriptedTransport, json_response};
    use crate::token_store::{CredentialStore, StoreLocation};

    fn client(transport: &Arc<ScriptedTransport>) -> AuthedClient {
        AuthedClient::new(
            Arc::new(CredentialStore::in_memory()),
            transport.clone(),
            ApiConfig {
                base_url: "https://api.test".into(),
                ..ApiConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn login_stores_pair_in_chosen_tier() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(200, &json!({"access": "a1", "refresh": "r1"})))
        }));
        let client = client(&transport);

        client
            .login("aigerim", "secret-pass", Durability::Durable)
            .await
            .expect("login");

        assert_eq!(transport.probes(), 1);
        assert_eq!(client.store().locate(TokenKind::Access), Some(StoreLocation::Durable));
        assert_eq!(client.store().read(TokenKind::Refresh).as_deref(), Some("r1"));
        let sent = &transport.requests()[0];
        assert_eq!(
            sent.body,
            crate::transport::RequestBody::Json(
                json!({"username": "aigerim", "password": "secret-pass"})
            )
        );
        assert_eq!(sent.bearer, None);
    }

    #[tokio::test]
    async fn login_rejection_uses_server_detail() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(
                401,
                &json!({"detail": "No active account found with the given credentials"}),
            ))
        }));
        let err = client(&transport)
            .login("x", "y", Durability::Ephemeral)
            .await
            .unwrap_err();
        match err {
            AuthError::InvalidCredentials(reason) => assert!(reason.starts_with("No active account")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_aborts_when_server_unreachable() {
        let transport = Arc::new(
            ScriptedTransport::new(|_| Ok(json_response(200, &json!({}))))
                .with_failing_probe(TransportError::Unreachable("refused".into())),
        );
        let err = client(&transport)
            .login("x", "y", Durability::Ephemeral)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ServerUnreachable(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn register_reports_first_field_error() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(
                400,
                &json!({"email": ["user with this email already exists."]}),
            ))
        }));
        let err = client(&transport)
            .register("aigerim", "a@b.kz", "longenough")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "registration rejected: email: user with this email already exists."
        );
    }

    #[tokio::test]
    async fn register_with_tokens_signs_in_ephemerally() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(201, &json!({"access": "a", "refresh": "r"})))
        }));
        let client = client(&transport);
        let outcome = client
            .register("aigerim", "a@b.kz", "longenough")
            .await
            .expect("register");

        assert_eq!(outcome, Registered::SignedIn);
        assert!(!client.store().holds_durable(TokenKind::Access));
        assert_eq!(client.store().read(TokenKind::Access).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn register_without_tokens_only_creates_account() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(201, &json!({"username": "aigerim"})))
        }));
        let client = client(&transport);
        let outcome = client
            .register("aigerim", "a@b.kz", "longenough")
            .await
            .expect("register");
        assert_eq!(outcome, Registered::AccountCreated);
        assert!(!client.store().has_any_token());
    }

    #[rstest]
    #[case("", "a@b.kz", "longenough", "username")]
    #[case("user", "not-an-email", "longenough", "email")]
    #[case("user", "a@b", "longenough", "email")]
    #[case("user", "a@b.kz", "short", "password")]
    fn local_validation_names_the_field(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let err = validate_registration(username, email, password).unwrap_err();
        assert!(err.to_string().contains(field), "{err}");
    }

    #[test]
    fn logout_clears_all_locations() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(200, &json!({})))
        }));
        let client = client(&transport);
        client
            .store()
            .store_login(
                &TokenPair {
                    access: "a".into(),
                    refresh: "r".into(),
                },
                Durability::Durable,
            )
            .expect("seed");

        client.logout();
        assert!(client.store().snapshot().is_empty());
        assert!(transport.requests().is_empty());
    }
}
