use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Image, ImageId, Variant, VariantId},
    error::ErrorDetail,
    protocol::{NormalizedOperationSet, ProcessRequest},
};
use tracing::{debug, warn};

use crate::{
    config::GatewayConfig,
    error::{GatewayError, GatewayResult},
};

/// Multipart field the service reads the uploaded binary from.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Images known to the service, most recent first, at most `limit`.
    async fn list_images(&self, limit: u32) -> GatewayResult<Vec<Image>>;
    async fn upload_image(&self, file: &UploadFile) -> GatewayResult<Image>;
    async fn process_image(
        &self,
        image_id: &ImageId,
        operations: &NormalizedOperationSet,
    ) -> GatewayResult<Variant>;
    async fn fetch_original_bytes(&self, image_id: &ImageId) -> GatewayResult<Vec<u8>>;
    async fn fetch_variant_bytes(&self, variant_id: &VariantId) -> GatewayResult<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| GatewayError::Network {
                context: "failed to build http client".into(),
                source,
            })?;
        Ok(Self { http, config })
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn fetch_bytes(&self, segments: &[&str]) -> GatewayResult<Vec<u8>> {
        let url = self.config.endpoint(segments)?;
        debug!(%url, "gateway: fetching bytes");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| GatewayError::Network {
                context: format!("failed to fetch {url}"),
                source,
            })?;
        let response = ensure_success(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Network {
                context: format!("failed to read body of {url}"),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

fn upload_part(file: &UploadFile) -> Part {
    let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
    let Some(mime_type) = file.mime_type.as_deref() else {
        return part;
    };
    match part.mime_str(mime_type) {
        Ok(part) => part,
        Err(err) => {
            warn!(mime_type, "gateway: ignoring unparseable mime type: {err}");
            Part::bytes(file.bytes.clone()).file_name(file.filename.clone())
        }
    }
}

/// Turn a non-2xx response into [`GatewayError::Http`], pulling the service's
/// `detail` message out of the body when there is one.
async fn ensure_success(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<ErrorDetail>()
        .await
        .ok()
        .and_then(|body| body.message());
    warn!(status = status.as_u16(), ?detail, "gateway: request rejected");
    Err(GatewayError::Http {
        status: status.as_u16(),
        detail,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response, context: &str) -> GatewayResult<T> {
    response.json::<T>().await.map_err(|source| {
        if source.is_decode() {
            GatewayError::MalformedResponse {
                context: context.to_string(),
                source,
            }
        } else {
            GatewayError::Network {
                context: context.to_string(),
                source,
            }
        }
    })
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn list_images(&self, limit: u32) -> GatewayResult<Vec<Image>> {
        let url = self.config.endpoint(&["images"])?;
        let response = self
            .http
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|source| GatewayError::Network {
                context: "failed to list images".into(),
                source,
            })?;
        let images: Vec<Image> =
            decode_json(ensure_success(response).await?, "invalid image list").await?;
        debug!(count = images.len(), limit, "gateway: listed images");
        Ok(images)
    }

    async fn upload_image(&self, file: &UploadFile) -> GatewayResult<Image> {
        let url = self.config.endpoint(&["images"])?;
        let form = Form::new().part(UPLOAD_FIELD, upload_part(file));
        debug!(
            filename = %file.filename,
            size_bytes = file.bytes.len(),
            "gateway: uploading image"
        );
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| GatewayError::Network {
                context: format!("failed to upload {}", file.filename),
                source,
            })?;
        decode_json(ensure_success(response).await?, "invalid upload response").await
    }

    async fn process_image(
        &self,
        image_id: &ImageId,
        operations: &NormalizedOperationSet,
    ) -> GatewayResult<Variant> {
        let url = self.config.endpoint(&["process"])?;
        let request = ProcessRequest {
            image_id: image_id.clone(),
            operations: operations.clone(),
        };
        debug!(
            %image_id,
            operations = ?operations.operation_names(),
            "gateway: submitting process request"
        );
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|source| GatewayError::Network {
                context: format!("failed to process image {image_id}"),
                source,
            })?;
        decode_json(ensure_success(response).await?, "invalid process response").await
    }

    async fn fetch_original_bytes(&self, image_id: &ImageId) -> GatewayResult<Vec<u8>> {
        self.fetch_bytes(&["images", image_id.as_str(), "file"]).await
    }

    async fn fetch_variant_bytes(&self, variant_id: &VariantId) -> GatewayResult<Vec<u8>> {
        self.fetch_bytes(&["variants", variant_id.as_str(), "file"])
            .await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
