//! Raw HTTP client for the reservation API.

use serde::{Deserialize, Serialize};

use shared::models::{
    CancelReservationResponse, CreateReservationRequest, DocumentRequest, DocumentUpdateResponse,
    Reservation,
};

use crate::error::{ClientError, Result};
use crate::session::Session;

/// Query parameters for listing reservations.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Server-side `{message, code}` error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    code: String,
}

/// HTTP client for the reservation API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a client with the given base URL and session.
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    /// Create from environment (`MEDBOOK_API_URL`) and an explicit session.
    pub fn from_env(session: Session) -> Self {
        let base_url = std::env::var("MEDBOOK_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self::new(base_url, session)
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /reservation/active
    ///
    /// `None` means no active reservation exists, a normal outcome.
    pub async fn active(&self) -> Result<Option<Reservation>> {
        let response = self
            .client
            .get(self.url("/reservation/active"))
            .header("Authorization", self.session.bearer())
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// GET /reservation/list
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Reservation>> {
        let response = self
            .client
            .get(self.url("/reservation/list"))
            .query(query)
            .header("Authorization", self.session.bearer())
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// POST /reservation/create
    pub async fn create(&self, request: &CreateReservationRequest) -> Result<Reservation> {
        let response = self
            .client
            .post(self.url("/reservation/create"))
            .header("Authorization", self.session.bearer())
            .json(request)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// PUT /reservation/cancel/{id}
    pub async fn cancel(&self, reservation_id: &str) -> Result<CancelReservationResponse> {
        let response = self
            .client
            .put(self.url(&format!("/reservation/cancel/{}", reservation_id)))
            .header("Authorization", self.session.bearer())
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// PUT /reservation/{id}/document
    pub async fn update_document(
        &self,
        reservation_id: &str,
        request: &DocumentRequest,
    ) -> Result<DocumentUpdateResponse> {
        let response = self
            .client
            .put(self.url(&format!("/reservation/{}/document", reservation_id)))
            .header("Authorization", self.session.bearer())
            .json(request)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Deserialize a success body or map the server's error body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(ClientError::from);
        }

        match status.as_u16() {
            401 => Err(ClientError::Unauthorized),
            404 => Err(ClientError::NotFound),
            code => {
                let body: ErrorBody = response.json().await.map_err(|_| {
                    ClientError::InvalidResponse(format!("Unreadable error body (HTTP {})", code))
                })?;
                Err(ClientError::Api {
                    status: code,
                    code: body.code,
                    message: body.message,
                })
            }
        }
    }
}
