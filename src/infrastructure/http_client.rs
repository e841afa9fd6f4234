use crate::application::services::{HttpClient, HttpRequestService};
use crate::domain::entities::{BodyStream, Method as DomainMethod, Request, Response};
use crate::domain::errors::TransportError;
use crate::domain::value_objects::ParamMap;

use async_trait::async_trait;
use futures::StreamExt;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::client::conn::http1::{self, SendRequest};
use hyper::header::{ACCEPT, HOST, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use hyper::{Method, Request as HyperRequest};
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_native_tls::native_tls;

const DEFAULT_USER_AGENT: &str = concat!("http-cli/", env!("CARGO_PKG_VERSION"));

/// Infrastructure implementation of HttpClient using Hyper
///
/// Opens one HTTP/1.1 connection per request, over TLS for https targets.
/// No pooling and no redirect following.
pub struct HyperHttpClient;

impl HyperHttpClient {
    pub fn new() -> Self {
        Self
    }

    /// Creates a configured HTTP request service using this client
    pub fn create_request_service(self) -> HttpRequestService {
        HttpRequestService::new(Box::new(self))
    }
}

impl Default for HyperHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let timeout = request.timeout;
        let target = request.target();
        let hyper_request = RequestAdapter::to_hyper_request(request, &target)?;

        let exchange = self.execute_http_request(&target, hyper_request);
        let hyper_response = match timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| TransportError::Timeout)??,
            None => exchange.await?,
        };

        Ok(ResponseAdapter::to_domain_response(hyper_response, timeout))
    }
}

impl HyperHttpClient {
    async fn execute_http_request(
        &self,
        target: &url::Url,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<hyper::Response<Incoming>, TransportError> {
        let mut sender = Connector::connect(target).await?;
        sender.send_request(request).await.map_err(|e| {
            if e.is_parse() {
                TransportError::Protocol(format!("Malformed response from server: {}", e))
            } else {
                TransportError::Connection(format!("HTTP request execution failed: {}", e))
            }
        })
    }
}

/// Establishes the TCP (and optionally TLS) connection and runs the handshake
struct Connector;

impl Connector {
    async fn connect(target: &url::Url) -> Result<SendRequest<Full<Bytes>>, TransportError> {
        let host = target
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .ok_or_else(|| TransportError::InvalidRequest("URL has no host".to_string()))?;
        let port = target
            .port_or_known_default()
            .ok_or_else(|| TransportError::InvalidRequest("URL has no port".to_string()))?;

        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(|e| TransportError::Connection(format!("{}:{}: {}", host, port, e)))?;
        tracing::debug!(host, port, "connected");

        if target.scheme() == "https" {
            let connector = native_tls::TlsConnector::new()
                .map_err(|e| TransportError::Connection(format!("TLS setup failed: {}", e)))?;
            let tls = tokio_native_tls::TlsConnector::from(connector)
                .connect(host, tcp)
                .await
                .map_err(|e| TransportError::Connection(format!("TLS handshake failed: {}", e)))?;
            Self::handshake(tls).await
        } else {
            Self::handshake(tcp).await
        }
    }

    async fn handshake<T>(io: T) -> Result<SendRequest<Full<Bytes>>, TransportError>
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, connection) = http1::handshake(TokioIo::new(io))
            .await
            .map_err(|e| TransportError::Connection(format!("HTTP handshake failed: {}", e)))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });
        Ok(sender)
    }
}

/// Adapter for converting domain requests to Hyper requests
struct RequestAdapter;

impl RequestAdapter {
    fn to_hyper_request(
        domain_request: Request,
        target: &url::Url,
    ) -> Result<HyperRequest<Full<Bytes>>, TransportError> {
        let method = MethodAdapter::to_hyper_method(domain_request.method);
        let body = BodyAdapter::to_hyper_body(domain_request.body);

        let mut builder = HyperRequest::builder()
            .method(method)
            .uri(UriAdapter::origin_form(target));

        if let Some(headers) = builder.headers_mut() {
            HeaderAdapter::apply(headers, &domain_request.headers, target)?;
        }

        builder
            .body(body)
            .map_err(|e| TransportError::InvalidRequest(format!("Failed to build HTTP request: {}", e)))
    }
}

/// Adapter for converting domain responses from Hyper responses
struct ResponseAdapter;

impl ResponseAdapter {
    fn to_domain_response(hyper_response: hyper::Response<Incoming>, read_timeout: Option<Duration>) -> Response {
        let status = hyper_response.status();
        let headers = HeaderAdapter::collect(hyper_response.headers());
        let body = BodyAdapter::to_stream(hyper_response.into_body(), read_timeout);

        Response { status, headers, body }
    }
}

/// Adapter for converting domain HTTP methods to Hyper methods
struct MethodAdapter;

impl MethodAdapter {
    fn to_hyper_method(domain_method: DomainMethod) -> Method {
        match domain_method {
            DomainMethod::Get => Method::GET,
            DomainMethod::Post => Method::POST,
            DomainMethod::Put => Method::PUT,
            DomainMethod::Patch => Method::PATCH,
            DomainMethod::Delete => Method::DELETE,
        }
    }
}

/// Adapter for building the request-target of an HTTP/1.1 request line
struct UriAdapter;

impl UriAdapter {
    fn origin_form(target: &url::Url) -> String {
        match target.query() {
            Some(query) => format!("{}?{}", target.path(), query),
            None => target.path().to_string(),
        }
    }

    fn authority(target: &url::Url) -> String {
        let host = target.host_str().unwrap_or_default();
        match target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

/// Adapter for converting domain request bodies to Hyper bodies
struct BodyAdapter;

impl BodyAdapter {
    fn to_hyper_body(domain_body: Option<Bytes>) -> Full<Bytes> {
        Full::new(domain_body.unwrap_or_default())
    }

    /// Streams body frames, failing a read that stalls longer than `read_timeout`
    fn to_stream(body: Incoming, read_timeout: Option<Duration>) -> BodyStream {
        let frames = body
            .into_data_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Connection(format!("Failed to read response body: {}", e))))
            .boxed();

        match read_timeout {
            None => frames,
            Some(limit) => futures::stream::unfold(Some(frames), move |state| async move {
                let mut frames = state?;
                match tokio::time::timeout(limit, frames.next()).await {
                    Ok(Some(chunk)) => Some((chunk, Some(frames))),
                    Ok(None) => None,
                    Err(_) => Some((Err(TransportError::Timeout), None)),
                }
            })
            .boxed(),
        }
    }
}

/// Adapter for handling HTTP headers
struct HeaderAdapter;

impl HeaderAdapter {
    fn apply(headers: &mut HeaderMap, domain_headers: &ParamMap, target: &url::Url) -> Result<(), TransportError> {
        for (name, value) in domain_headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidRequest(format!("Invalid header name: '{}'", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| TransportError::InvalidRequest(format!("Invalid value for header '{}'", name)))?;
            headers.insert(name, value);
        }

        if !headers.contains_key(HOST) {
            let authority = UriAdapter::authority(target);
            let host = HeaderValue::from_str(&authority)
                .map_err(|_| TransportError::InvalidRequest(format!("Invalid host: '{}'", authority)))?;
            headers.insert(HOST, host);
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        }
        Ok(())
    }

    /// Flattens a header map in arrival order, joining repeated names with ", "
    fn collect(headers: &HeaderMap) -> Vec<(String, String)> {
        headers
            .keys()
            .map(|name| {
                let value = headers
                    .get_all(name)
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                    .collect::<Vec<_>>()
                    .join(", ");
                (name.as_str().to_string(), value)
            })
            .collect()
    }
}
