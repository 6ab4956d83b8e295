use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::upload::UploadFile;
use crate::{
    AnswerReply, AskRequest, BackendError, CredentialReply, DiagnosticsReply, DocumentId,
    DocumentRecord, FailureKind, HealthReply, ResetReply, TaskStatusReply, UploadReply,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Sent as the `token` query parameter of the reset endpoint.
    pub admin_token: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            admin_token: String::new(),
        }
    }
}

/// The document Q&A backend, as seen by the session.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, BackendError>;

    async fn upload(&self, file: UploadFile) -> Result<UploadReply, BackendError>;

    async fn task_status(&self, task_id: &str) -> Result<TaskStatusReply, BackendError>;

    async fn delete_document(&self, document_id: DocumentId) -> Result<(), BackendError>;

    async fn ask(&self, request: &AskRequest) -> Result<AnswerReply, BackendError>;

    async fn summarize(&self, document_id: DocumentId) -> Result<AnswerReply, BackendError>;

    async fn health(&self) -> Result<HealthReply, BackendError>;

    async fn diagnostics(&self) -> Result<DiagnosticsReply, BackendError>;

    /// Destroys every document, index and the runtime credential.
    async fn reset(&self) -> Result<ResetReply, BackendError>;

    async fn set_credential(&self, key: &str) -> Result<CredentialReply, BackendError>;

    async fn clear_credential(&self) -> Result<CredentialReply, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CredentialRequest<'a> {
    key: &'a str,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, BackendError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        Ok(self.client.request(method, self.endpoint(path)?))
    }
}

/// Parses the configured base URL and makes sure relative joins append to it.
pub fn parse_base_url(raw: &str) -> Result<Url, BackendError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(BackendError::new(
            FailureKind::InvalidUrl,
            format!("not an http(s) base url: {trimmed}"),
        ));
    }
    Ok(url)
}

async fn send(request: RequestBuilder) -> Result<reqwest::Response, BackendError> {
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    Ok(response)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BackendError> {
    send(request)
        .await?
        .json::<T>()
        .await
        .map_err(map_reqwest_error)
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, BackendError> {
        send_json(self.request(Method::GET, "documents")?).await
    }

    async fn upload(&self, file: UploadFile) -> Result<UploadReply, BackendError> {
        let part = Part::stream(reqwest::Body::from(file.content))
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|err| BackendError::new(FailureKind::Io, err.to_string()))?;
        let form = Form::new().part("file", part);
        send_json(self.request(Method::POST, "upload")?.multipart(form)).await
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatusReply, BackendError> {
        let mut url = self.endpoint("tasks/")?;
        url.path_segments_mut()
            .map_err(|()| BackendError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .push(task_id);
        send_json(self.client.get(url)).await
    }

    async fn delete_document(&self, document_id: DocumentId) -> Result<(), BackendError> {
        let path = format!("documents/{document_id}");
        send(self.request(Method::DELETE, &path)?).await?;
        Ok(())
    }

    async fn ask(&self, request: &AskRequest) -> Result<AnswerReply, BackendError> {
        send_json(self.request(Method::POST, "ask")?.json(request)).await
    }

    async fn summarize(&self, document_id: DocumentId) -> Result<AnswerReply, BackendError> {
        let path = format!("summarize/{document_id}");
        send_json(self.request(Method::GET, &path)?).await
    }

    async fn health(&self) -> Result<HealthReply, BackendError> {
        send_json(self.request(Method::GET, "health")?).await
    }

    async fn diagnostics(&self) -> Result<DiagnosticsReply, BackendError> {
        send_json(self.request(Method::GET, "diagnostics")?).await
    }

    async fn reset(&self) -> Result<ResetReply, BackendError> {
        let mut url = self.endpoint("admin/reset")?;
        url.query_pairs_mut()
            .append_pair("token", &self.settings.admin_token);
        send_json(self.client.post(url)).await
    }

    async fn set_credential(&self, key: &str) -> Result<CredentialReply, BackendError> {
        let body = CredentialRequest { key };
        send_json(self.request(Method::POST, "gemini/key")?.json(&body)).await
    }

    async fn clear_credential(&self) -> Result<CredentialReply, BackendError> {
        send_json(self.request(Method::DELETE, "gemini/key")?).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::Decode, err.to_string());
    }
    if let Some(status) = err.status() {
        return BackendError::new(FailureKind::HttpStatus(status.as_u16()), err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
