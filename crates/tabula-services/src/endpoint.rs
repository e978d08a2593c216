//! Remote record endpoints
//!
//! Every mutating call is a JSON `POST` answered with a success envelope
//! `{ "ok": bool, "msg": string? }`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tabula_core::Payload;
use tabula_settings::ControllerSettings;
use url::Url;

use crate::error::{ServiceError, ServiceResult};

/// Response shape shared by insert, update and delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

impl Envelope {
    pub fn success() -> Self {
        Self { ok: true, msg: None }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            msg: Some(msg.into()),
        }
    }

    /// Turn an `ok: false` envelope into [`ServiceError::Rejected`].
    pub fn into_result(self) -> ServiceResult<()> {
        if self.ok {
            Ok(())
        } else {
            Err(ServiceError::Rejected { message: self.msg })
        }
    }
}

/// Body of a delete request
#[derive(Debug, Serialize)]
pub struct DeleteRequest<'a> {
    pub ids: &'a [String],
}

/// The CRUD service behind a record table
#[async_trait]
pub trait RecordEndpoint: Send + Sync {
    async fn insert(&self, payload: &Payload) -> ServiceResult<Envelope>;

    async fn update(&self, payload: &Payload) -> ServiceResult<Envelope>;

    async fn delete(&self, ids: &[String]) -> ServiceResult<Envelope>;
}

/// [`RecordEndpoint`] over HTTP at `{base_url}/{resource}/{insert|update|delete}`
pub struct HttpRecordEndpoint {
    client: Client,
    base: Url,
    resource: String,
}

impl HttpRecordEndpoint {
    pub fn new(settings: &ControllerSettings) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Self::with_client(client, &settings.base_url, &settings.resource)
    }

    pub fn with_client(client: Client, base_url: &str, resource: &str) -> ServiceResult<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::Configuration(format!(
                "base URL cannot carry a path: {}",
                base_url
            )));
        }
        Ok(Self {
            client,
            base,
            resource: resource.to_string(),
        })
    }

    /// Absolute URL of one action of this resource.
    pub fn url_for(&self, action: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.resource).push(action);
        }
        url
    }

    async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        action: &str,
        body: &B,
    ) -> ServiceResult<Envelope> {
        let url = self.url_for(action);
        tracing::info!(%url, "Posting record request");

        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Error statuses may still carry an envelope worth showing.
        serde_json::from_str::<Envelope>(&text).map_err(|e| {
            tracing::warn!(%url, %status, error = %e, "Response is not a success envelope");
            ServiceError::InvalidResponse(format!("Status {}: {}", status, e))
        })
    }
}

#[async_trait]
impl RecordEndpoint for HttpRecordEndpoint {
    async fn insert(&self, payload: &Payload) -> ServiceResult<Envelope> {
        self.post("insert", payload).await
    }

    async fn update(&self, payload: &Payload) -> ServiceResult<Envelope> {
        self.post("update", payload).await
    }

    async fn delete(&self, ids: &[String]) -> ServiceResult<Envelope> {
        self.post("delete", &DeleteRequest { ids }).await
    }
}
