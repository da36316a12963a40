//! WordPress `admin-ajax.php` client.
//!
//! Both operations are form-encoded POSTs against the same endpoint,
//! multiplexed by an `action` field, with the page nonce and post id on
//! every request. Responses arrive in the WordPress envelope
//! `{ "success": bool, "data": … }`; `data` is a payload object on
//! success and a bare message string on rejection.

use crate::error::PersistError;
use mk_core::model::MediaKitState;
use mk_core::schema;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const SAVE_ACTION: &str = "gmkb_save_media_kit";
const LOAD_ACTION: &str = "gmkb_load_media_kit";
const USER_AGENT: &str = concat!("mk-media-kit/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What the server acknowledged after a save.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveReceipt {
    pub message: String,
    /// Server-side unix timestamp of the write.
    pub timestamp: u64,
    pub post_id: u64,
    pub components_count: usize,
}

#[derive(Debug, Deserialize)]
struct AjaxEnvelope {
    success: bool,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct LoadData {
    #[serde(default)]
    state: Value,
    #[serde(default)]
    components_loaded: usize,
    #[serde(default)]
    message: String,
}

/// Client for the two media-kit AJAX endpoints. Build once and reuse;
/// the nonce can be swapped when the WordPress heartbeat refreshes it.
pub struct AjaxClient {
    http: reqwest::Client,
    endpoint: String,
    nonce: String,
}

impl AjaxClient {
    /// `endpoint` is the full `admin-ajax.php` URL; `nonce` the value of
    /// the page's `gmkb_nonce` field.
    pub fn new(
        endpoint: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Result<Self, PersistError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            nonce: nonce.into(),
        })
    }

    /// Replace the nonce after a heartbeat refresh.
    pub fn set_nonce(&mut self, nonce: impl Into<String>) {
        self.nonce = nonce.into();
    }

    /// POST the document to the server. The state is serialized through
    /// the wire schema, so an unchanged document posts identical JSON.
    pub async fn save_state(
        &self,
        post_id: u64,
        state: &MediaKitState,
    ) -> Result<SaveReceipt, PersistError> {
        let body = schema::to_json_string(state)?;
        let post_id_field = post_id.to_string();
        log::debug!("saving media kit for post {post_id} ({} bytes)", body.len());

        let envelope = self
            .post(&[
                ("action", SAVE_ACTION),
                ("nonce", self.nonce.as_str()),
                ("post_id", post_id_field.as_str()),
                ("state", body.as_str()),
            ])
            .await?;

        if !envelope.success {
            return Err(rejection(envelope.data));
        }
        let receipt: SaveReceipt = serde_json::from_value(envelope.data)?;
        log::info!(
            "saved media kit for post {}: {} components",
            receipt.post_id,
            receipt.components_count
        );
        Ok(receipt)
    }

    /// Fetch the saved document blob. `Ok(None)` means the post has no
    /// saved state yet, which is a normal first-run condition.
    pub async fn load_state(&self, post_id: u64) -> Result<Option<Value>, PersistError> {
        let post_id_field = post_id.to_string();
        let envelope = self
            .post(&[
                ("action", LOAD_ACTION),
                ("nonce", self.nonce.as_str()),
                ("post_id", post_id_field.as_str()),
            ])
            .await?;

        if !envelope.success {
            return Err(rejection(envelope.data));
        }
        let data: LoadData = serde_json::from_value(envelope.data)?;
        log::debug!(
            "loaded media kit for post {post_id}: {} components ({})",
            data.components_loaded,
            data.message
        );
        if data.state.is_null() {
            Ok(None)
        } else {
            Ok(Some(data.state))
        }
    }

    async fn post(&self, form: &[(&str, &str)]) -> Result<AjaxEnvelope, PersistError> {
        let response = self.http.post(&self.endpoint).form(form).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(PersistError::NonceRejected);
        }
        if !status.is_success() {
            return Err(PersistError::Http {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map a `success: false` envelope to a typed error. WordPress sends the
/// rejection as a bare string via `wp_send_json_error`, but some handlers
/// wrap it in `{ "message": … }`.
fn rejection(data: Value) -> PersistError {
    let message = match data {
        Value::String(s) => s,
        Value::Object(ref map) => map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request rejected")
            .to_string(),
        _ => "request rejected".to_string(),
    };
    if message == "Invalid nonce" {
        PersistError::NonceRejected
    } else {
        PersistError::Rejected { message }
    }
}
