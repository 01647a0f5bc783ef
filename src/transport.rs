use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::config::Endpoints;
use crate::error::ClientError;
use crate::models::{SelectedFile, TagsResponse, UploadReceipt, UploadedFile};
use crate::tags::TagSet;

/// The outbound calls the workflows depend on.
///
/// Every call issues exactly one request: no retries, no timeouts, no
/// cancellation. Network errors and non-2xx responses both come back as
/// [`ClientError::Transport`].
#[async_trait]
pub trait FileService: Send + Sync {
    async fn fetch_file_list(&self) -> Result<Vec<UploadedFile>, ClientError>;

    /// `None` when the server has no tags stored for this file.
    async fn fetch_tags_for_file(
        &self,
        file: &SelectedFile,
    ) -> Result<Option<TagSet>, ClientError>;

    /// `tags` is the pipe-delimited tag string.
    async fn upload_file(
        &self,
        file: &SelectedFile,
        tags: &str,
    ) -> Result<UploadReceipt, ClientError>;
}

/// [`FileService`] over multipart HTTP POSTs.
pub struct HttpFileService {
    client: Client,
    endpoints: Endpoints,
}

impl HttpFileService {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn fetch_file_list_from(
        &self,
        target: &Url,
    ) -> Result<Vec<UploadedFile>, ClientError> {
        let response = self.post(target, Form::new()).await?;
        let files: Vec<UploadedFile> = decode(response).await?;
        info!(url = %target, count = files.len(), "Fetched file list.");
        Ok(files)
    }

    pub async fn fetch_tags_for_file_from(
        &self,
        file: &SelectedFile,
        target: &Url,
    ) -> Result<Option<TagSet>, ClientError> {
        let form = Form::new().part("file", file_part(file));
        let response = self.post(target, form).await?;
        let body: TagsResponse = decode(response).await?;

        let tags = body
            .tags
            .map(|raw| TagSet::from_pipe_delimited(&raw))
            .filter(|set| !set.is_empty());
        debug!(file = %file.name, found = tags.is_some(), "Fetched existing tags.");
        Ok(tags)
    }

    pub async fn upload_file_to(
        &self,
        file: &SelectedFile,
        tags: &str,
        target: &Url,
    ) -> Result<UploadReceipt, ClientError> {
        let form = Form::new()
            .part("file", file_part(file))
            .text("tags", tags.to_string());
        let response = self.post(target, form).await?;
        let receipt: UploadReceipt = decode(response).await?;
        info!(file = %receipt.name, tags = %receipt.tags, "File uploaded.");
        Ok(receipt)
    }

    async fn post(&self, target: &Url, form: Form) -> Result<Response, ClientError> {
        let response = self
            .client
            .post(target.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(url = %target, error = %e, "Request failed before a response arrived.");
                ClientError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = reason_phrase(&response);
            error!(url = %target, status = %status, reason = %status_text, "Server returned non-success status.");
            return Err(ClientError::transport(status.as_u16(), status_text));
        }
        Ok(response)
    }
}

#[async_trait]
impl FileService for HttpFileService {
    async fn fetch_file_list(&self) -> Result<Vec<UploadedFile>, ClientError> {
        self.fetch_file_list_from(&self.endpoints.list).await
    }

    async fn fetch_tags_for_file(
        &self,
        file: &SelectedFile,
    ) -> Result<Option<TagSet>, ClientError> {
        self.fetch_tags_for_file_from(file, &self.endpoints.tags).await
    }

    async fn upload_file(
        &self,
        file: &SelectedFile,
        tags: &str,
    ) -> Result<UploadReceipt, ClientError> {
        self.upload_file_to(file, tags, &self.endpoints.upload).await
    }
}

/// The phrase from the status line. hyper only keeps it when it differs
/// from the canonical one, so fall back to that.
fn reason_phrase(response: &Response) -> String {
    match response.extensions().get::<hyper::ext::ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

fn file_part(file: &SelectedFile) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.name.clone())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        error!(status = %status, error = %e, "Failed to decode response body.");
        ClientError::transport(status.as_u16(), format!("Malformed response: {e}"))
    })
}
