use std::future::Future;
use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ReasonCode;
use crate::models::announcement::{Announcement, AnnouncementDraft, ValidationError};

use super::session::SessionAccessor;

/// A structured server rejection parsed from an error response body.
///
/// `reason` is populated only when the body carries a recognized reason
/// code; everything else keeps the raw text so no failure is ever silent.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub status: u16,
    pub reason: Option<ReasonCode>,
    pub raw_message: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed client-side validation; never reached the network.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Network failure or an unreadable response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with an error status.
    #[error("server rejected the request ({})", .0.status)]
    Rejected(Rejection),
}

impl StoreError {
    /// Localization key for the user-visible notice. Total by construction:
    /// transport errors and unrecognized reason codes fall back to the
    /// caller's generic per-operation key.
    pub fn notice_key(&self, generic: &'static str) -> &'static str {
        match self {
            Self::Invalid(err) => err.message_key(),
            Self::Transport(_) => generic,
            Self::Rejected(rejection) => match rejection.reason {
                Some(ReasonCode::OverlappingWindow) => "announcement.error.overlappingWindow",
                Some(ReasonCode::EndNotAfterStart) => "announcement.validation.endBeforeStart",
                Some(ReasonCode::MessageEmpty) => "announcement.validation.messageRequired",
                Some(ReasonCode::MessageTooLong) => "announcement.validation.messageTooLong",
                Some(ReasonCode::UnitMustBeNonNegative) => {
                    "announcement.validation.unitMustBeNonNegative"
                }
                Some(ReasonCode::DurationRequired) => "announcement.validation.durationRequired",
                None => generic,
            },
        }
    }
}

/// Remote CRUD operations for announcements.
///
/// A trait so the refresh layer can run against doubles; `HttpStore` is the
/// production implementation. Implementations hold no cache: every call
/// goes to the server and the caller owns the resulting snapshot.
pub trait AnnouncementStore: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<Announcement>, StoreError>> + Send;
    fn create(
        &self,
        draft: &AnnouncementDraft,
    ) -> impl Future<Output = Result<Announcement, StoreError>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// reqwest-backed store client.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionAccessor>,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionAccessor>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn auth(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            "Authorization",
            format!("Bearer {}", self.session.bearer_token()),
        )
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(StoreError::Rejected(parse_rejection(
            status.as_u16(),
            &body,
        )))
    }
}

impl AnnouncementStore for HttpStore {
    async fn list(&self) -> Result<Vec<Announcement>, StoreError> {
        let response = self
            .auth(self.client.get(format!("{}/announcements", self.base_url)))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, draft: &AnnouncementDraft) -> Result<Announcement, StoreError> {
        // Obviously-invalid input never costs a round-trip.
        draft.validate()?;
        let response = self
            .auth(self.client.post(format!("{}/announcements", self.base_url)))
            .json(draft)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let response = self
            .auth(
                self.client
                    .delete(format!("{}/announcements/{id}", self.base_url)),
            )
            .send()
            .await?;
        // Already gone is as good as deleted.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }
}

/// Map an error response to the typed rejection. Unstructured bodies keep
/// their raw text with no reason code.
fn parse_rejection(status: u16, body: &[u8]) -> Rejection {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        reason: Option<String>,
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => Rejection {
            status,
            reason: parsed.reason.as_deref().and_then(ReasonCode::parse),
            raw_message: parsed.error.unwrap_or_default(),
        },
        Err(_) => Rejection {
            status,
            reason: None,
            raw_message: String::from_utf8_lossy(body).into_owned(),
        },
    }
}
