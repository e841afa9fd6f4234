use crate::domain::entities::{Request, Response};
use crate::domain::errors::{CliError, TransportError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Trait for HTTP clients to enable mocking and dependency inversion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends the request and returns as soon as the response head arrives;
    /// the body is left unread in the returned stream.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

/// Application service for dispatching the single request of an invocation
pub struct HttpRequestService {
    http_client: Box<dyn HttpClient>,
}

impl HttpRequestService {
    pub fn new(http_client: Box<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    /// Sends the request, giving up as soon as `cancel` fires
    pub async fn send_request(
        &self,
        request: Request,
        cancel: &CancellationToken,
    ) -> Result<Response, CliError> {
        tracing::debug!(
            method = %request.method,
            url = %request.target(),
            headers = request.headers.len(),
            timeout = ?request.timeout,
            "sending request"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CliError::Interrupted),
            result = self.http_client.send(request) => {
                let response = result?;
                tracing::debug!(status = %response.status, "received response head");
                Ok(response)
            }
        }
    }
}
