//! reqwest-backed implementation of the backend API traits.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};

use coursehub_core::config::ApiConfig;
use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_entity::user::UserIdentity;

use crate::dto::request::{LoginRequest, NotificationIdRequest};
use crate::dto::response::{
    ApiEnvelope, CurrentUserData, LoginData, NotificationListData, NotificationSnapshot,
};
use crate::traits::{AuthApi, NotificationApi};

/// HTTP client for the CourseHub backend.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    /// Shared connection pool.
    http: reqwest::Client,
    /// Base URL and timeouts.
    config: ApiConfig,
}

impl HttpApiClient {
    /// Build a client from API configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("coursehub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    /// Send a request and decode the envelope, mapping every failure mode
    /// onto an [`AppError`] kind.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> AppResult<ApiEnvelope<T>> {
        let response = request.send().await.map_err(|e| transport_error(operation, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(operation, e))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::authentication(format!(
                "{operation} rejected: token not accepted ({})",
                server_message(&body).unwrap_or_else(|| status.to_string())
            )));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!(
                "{operation}: {}",
                server_message(&body).unwrap_or_else(|| status.to_string())
            )));
        }

        if !status.is_success() {
            return Err(AppError::external(format!(
                "{operation} failed with HTTP {status}: {}",
                server_message(&body).unwrap_or_default()
            )));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("{operation}: malformed response body"),
                e,
            )
        })?;

        tracing::trace!(operation, success = envelope.success, "Backend responded");
        envelope.into_success(operation)
    }
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn login(&self, email: &str, password: &str) -> AppResult<LoginData> {
        let request = self
            .http
            .post(self.url("auth/login"))
            .json(&LoginRequest { email, password });

        self.send::<LoginData>(request, "login")
            .await?
            .into_data("login")
    }

    async fn current_user(&self, token: &str) -> AppResult<UserIdentity> {
        let request = self.http.get(self.url("auth/me")).bearer_auth(token);

        let data = self
            .send::<CurrentUserData>(request, "current user")
            .await?
            .into_data("current user")?;
        Ok(data.user)
    }

    async fn logout(&self, token: &str) -> AppResult<()> {
        let request = self.http.post(self.url("auth/logout")).bearer_auth(token);
        self.send::<IgnoredAny>(request, "logout").await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationApi for HttpApiClient {
    async fn list_notifications(&self, token: &str) -> AppResult<NotificationSnapshot> {
        let request = self.http.get(self.url("notifications")).bearer_auth(token);

        let data = self
            .send::<NotificationListData>(request, "list notifications")
            .await?
            .into_data("list notifications")?;
        Ok(NotificationSnapshot::from(data))
    }

    async fn mark_read(&self, token: &str, notification_id: &str) -> AppResult<()> {
        let request = self
            .http
            .post(self.url("notifications/read"))
            .bearer_auth(token)
            .json(&NotificationIdRequest { notification_id });

        self.send::<IgnoredAny>(request, "mark notification read")
            .await?;
        Ok(())
    }

    async fn mark_all_read(&self, token: &str) -> AppResult<()> {
        let request = self
            .http
            .post(self.url("notifications/read-all"))
            .bearer_auth(token);

        self.send::<IgnoredAny>(request, "mark all notifications read")
            .await?;
        Ok(())
    }

    async fn delete_notification(&self, token: &str, notification_id: &str) -> AppResult<()> {
        let request = self
            .http
            .delete(self.url("notifications"))
            .bearer_auth(token)
            .json(&NotificationIdRequest { notification_id });

        self.send::<IgnoredAny>(request, "delete notification")
            .await?;
        Ok(())
    }
}

fn transport_error(operation: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::with_source(
            ErrorKind::Timeout,
            format!("{operation} timed out"),
            err,
        )
    } else {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("{operation} could not reach the backend"),
            err,
        )
    }
}

/// Pull `message` out of an error body, if it is an envelope.
fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiEnvelope<IgnoredAny>>(body)
        .ok()
        .and_then(|e| e.message)
}
