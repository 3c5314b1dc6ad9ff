use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use shared::protocol::{
    ErrorBody, LimitsResponse, PreviewResponse, StampConfig, UploadTemplateResponse,
};

use crate::RenderBackend;

/// HTTP implementation of [`RenderBackend`] speaking the render service's
/// multipart contracts. Non-2xx responses carry a JSON `{detail}` body; that
/// detail becomes the error message verbatim when it parses.
pub struct HttpRenderBackend {
    http: Client,
    base_url: String,
}

impl HttpRenderBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn stamp_form(template_data: &str, config: &StampConfig) -> Result<multipart::Form> {
        let config_json =
            serde_json::to_string(config).context("failed to encode stamp config")?;
        Ok(multipart::Form::new()
            .text("template_data", template_data.to_string())
            .text("config_data", config_json))
    }
}

async fn error_from_response(response: Response) -> anyhow::Error {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => anyhow!(body.detail),
        Err(_) => anyhow!("render service returned {status}"),
    }
}

#[async_trait]
impl RenderBackend for HttpRenderBackend {
    async fn fetch_limits(&self) -> Result<LimitsResponse> {
        let response = self
            .http
            .get(format!("{}/config", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn upload_template(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadTemplateResponse> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);
        let response = self
            .http
            .post(format!("{}/upload-template", self.base_url))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    async fn render_preview(
        &self,
        template_data: &str,
        config: &StampConfig,
    ) -> Result<PreviewResponse> {
        let response = self
            .http
            .post(format!("{}/preview", self.base_url))
            .multipart(Self::stamp_form(template_data, config)?)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    async fn generate_document(
        &self,
        template_data: &str,
        config: &StampConfig,
    ) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(format!("{}/generate-pdf", self.base_url))
            .multipart(Self::stamp_form(template_data, config)?)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }
}
