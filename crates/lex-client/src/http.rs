//! Shared response helpers for the API clients.
//!
//! Centralizes status mapping (401 after the executor's retry → session
//! expired, 402 → insufficient funds, other non-success → [`ClientError::Api`])
//! so the individual clients stay focused on request construction.

use lex_auth::{ApiRequest, ApiResponse, AuthError, AuthedClient};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

pub const UNAUTHORIZED: u16 = 401;
pub const PAYMENT_REQUIRED: u16 = 402;

/// Map an executor response onto the client error taxonomy.
///
/// # Errors
///
/// See the module docs for the status mapping.
pub fn check_response(response: ApiResponse) -> Result<ApiResponse, ClientError> {
    match response.status {
        _ if response.is_success() => Ok(response),
        UNAUTHORIZED => Err(ClientError::Auth(AuthError::SessionExpired)),
        PAYMENT_REQUIRED => Err(ClientError::InsufficientFunds),
        status => Err(ClientError::Api {
            status,
            message: response.error_message(),
        }),
    }
}

/// Decode a success body, naming `what` in the error.
///
/// # Errors
///
/// Returns [`ClientError::Parse`] if the body does not match `T`.
pub fn decode<T: DeserializeOwned>(response: &ApiResponse, what: &str) -> Result<T, ClientError> {
    response
        .json()
        .map_err(|e| ClientError::Parse(format!("{what}: {e}")))
}

/// Send through the executor, check the status and decode the body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &AuthedClient,
    request: ApiRequest,
    what: &str,
) -> Result<T, ClientError> {
    let response = check_response(client.request(request).await?)?;
    decode(&response, what)
}

/// Send through the executor and only check the status.
pub(crate) async fn execute(client: &AuthedClient, request: ApiRequest) -> Result<(), ClientError> {
    check_response(client.request(request).await?).map(drop)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn success_passes_through() {
        let response = ApiResponse::new(201, "{}");
        assert_eq!(check_response(response.clone()).expect("ok"), response);
    }

    #[test]
    fn unauthorized_is_session_expired() {
        let err = check_response(ApiResponse::new(401, "")).unwrap_err();
        assert!(err.is_session_expired());
    }

    #[test]
    fn payment_required_is_insufficient_funds() {
        let err = check_response(ApiResponse::new(402, r#"{"detail":"no money"}"#)).unwrap_err();
        assert!(err.is_insufficient_funds());
    }

    #[rstest]
    #[case(400, r#"{"detail":"bad dialog"}"#, "bad dialog")]
    #[case(404, "", "HTTP 404")]
    #[case(500, "Internal Server Error", "Internal Server Error")]
    fn other_statuses_are_api_errors(
        #[case] status: u16,
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        match check_response(ApiResponse::new(status, body)).unwrap_err() {
            ClientError::Api {
                status: got,
                message,
            } => {
                assert_eq!(got, status);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_names_the_payload() {
        let err = decode::<Vec<u8>>(&ApiResponse::new(200, "{}"), "dialogs").unwrap_err();
        assert!(err.to_string().starts_with("parse error: dialogs:"));
    }
}
