//! Profile endpoints.

use lex_auth::{ApiRequest, AuthedClient};
use lex_core::entities::{Profile, ProfileUpdate, UserStats};
use serde::Deserialize;

use crate::attachment::Attachment;
use crate::error::ClientError;
use crate::http::{check_response, decode, fetch_json};

pub const PROFILE_PATH: &str = "/api/userprofile";
pub const STATS_PATH: &str = "/api/userstats/";

#[derive(Debug, Deserialize)]
struct AvatarResponse {
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileApi {
    client: AuthedClient,
}

impl ProfileApi {
    #[must_use]
    pub const fn new(client: AuthedClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Fails on transport, status or decoding errors.
    pub async fn get(&self) -> Result<Profile, ClientError> {
        fetch_json(
            &self.client,
            ApiRequest::get(self.client.url(PROFILE_PATH)),
            "profile",
        )
        .await
    }

    /// Save profile fields. Required fields are checked locally first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without a request when a required
    /// field is empty or the birthday is not a date.
    pub async fn update(&self, update: ProfileUpdate) -> Result<(), ClientError> {
        let update = update.validated()?;
        let body = serde_json::to_value(&update)
            .map_err(|e| ClientError::Validation(format!("profile update: {e}")))?;
        let response = self
            .client
            .request(ApiRequest::post(self.client.url(PROFILE_PATH)).json(body))
            .await?;
        check_response(response)?;
        tracing::info!("profile saved");
        Ok(())
    }

    /// Upload a new avatar, returning its URL (empty if the server omits it).
    ///
    /// # Errors
    ///
    /// Fails on transport, status or decoding errors.
    pub async fn upload_avatar(&self, image: Attachment) -> Result<String, ClientError> {
        let request = ApiRequest::post(self.client.url(PROFILE_PATH))
            .multipart(vec![image.into_part("avatar")]);
        let response = check_response(self.client.request(request).await?)?;
        let body: AvatarResponse = decode(&response, "avatar upload")?;
        Ok(body.avatar.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Fails on transport, status or decoding errors.
    pub async fn stats(&self) -> Result<UserStats, ClientError> {
        fetch_json(
            &self.client,
            ApiRequest::get(self.client.url(STATS_PATH)),
            "user stats",
        )
        .await
    }
}
