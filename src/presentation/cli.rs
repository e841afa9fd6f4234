use crate::application::body_selector::BodySelector;
use crate::application::builders::request_builder::RequestBuilder;
use crate::application::param_merger::ParamMerger;
use crate::application::services::HttpRequestService;
use crate::domain::entities::{BodySource, Method};
use crate::domain::errors::CliError;
use crate::infrastructure::config::ClientConfig;
use crate::infrastructure::output;
use crate::presentation::exit::ExitStatus;
use crate::presentation::progress::{ProgressMode, simulate_timeout};
use crate::presentation::renderer::{Rendered, ResponseRenderer};
use clap::{ArgGroup, Parser};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// CLI configuration for http-cli
#[derive(Parser, Debug)]
#[command(name = "http CLI", version)]
#[command(about = "Send a single HTTP request and print the response", long_about = None)]
#[command(group(ArgGroup::new("body").args(["data", "json", "file"]).multiple(false)))]
pub struct Cli {
    /// The URL of the intended web resource
    pub url: String,

    /// HTTP method: GET, POST, PUT, PATCH or DELETE
    #[arg(short = 'M', long, default_value = "GET")]
    pub method: Method,

    /// Header(s) as `key:value`, comma-separated; repeatable
    #[arg(short = 'H', long = "header")]
    pub headers: Option<Vec<String>>,

    /// Query parameter(s) as `key=value`, `&`-separated; repeatable
    #[arg(short = 'Q', long = "query")]
    pub queries: Option<Vec<String>>,

    /// Request body, sent as url-encoded form data
    #[arg(short = 'D', long)]
    pub data: Option<String>,

    /// Request body, sent as JSON
    #[arg(long)]
    pub json: Option<String>,

    /// File whose contents are sent as the request body
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Seconds to wait for the server before giving up
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Directory for saved downloads and the transient buffer file
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let seconds: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("timeout must be a non-negative number of seconds, got {}", raw))
}

impl Cli {
    /// The body group admits at most one source
    pub fn body_source(&self) -> BodySource {
        if let Some(data) = &self.data {
            BodySource::Raw(data.clone())
        } else if let Some(json) = &self.json {
            BodySource::Json(json.clone())
        } else if let Some(path) = &self.file {
            BodySource::File(path.clone())
        } else {
            BodySource::None
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.timeout, self.output_dir.clone()).verbose(self.verbose)
    }

    /// Builds the request, sends it and renders the response into `out`.
    ///
    /// Warnings are printed as they are found; nothing is sent if any
    /// argument is invalid.
    pub async fn run<W: Write>(
        &self,
        request_service: &HttpRequestService,
        config: ClientConfig,
        cancel: &CancellationToken,
        out: W,
    ) -> Result<Rendered, CliError> {
        let builder = RequestBuilder::new().method(self.method).url(&self.url)?;

        let headers = ParamMerger::headers().merge(self.headers.as_deref())?;
        let queries = ParamMerger::queries().merge(self.queries.as_deref())?;
        for merged in [&headers, &queries].into_iter().flatten() {
            output::print_warnings(&merged.warnings);
        }

        let body = BodySelector::resolve(&self.body_source()).await?;
        if let Some(warning) = body.as_ref().and_then(|b| b.warning.as_ref()) {
            output::print_warning(warning);
        }

        let request = builder
            .headers(headers.map(|merged| merged.params))
            .query(queries.map(|merged| merged.params))
            .body(body)
            .timeout(config.timeout)
            .build()?;

        let response = request_service.send_request(request, cancel).await?;

        let mut renderer = ResponseRenderer::new(out, config);
        renderer.render(response, cancel).await
    }

    /// Runs the invocation through to its exit status.
    ///
    /// The whole pipeline, failure reporting included, races the interrupt:
    /// once `cancel` fires the pending work is dropped, its file guards clean
    /// up, and nothing more is printed.
    pub async fn execute<W: Write>(
        &self,
        request_service: &HttpRequestService,
        config: ClientConfig,
        cancel: &CancellationToken,
        out: W,
    ) -> ExitStatus {
        let progress = ProgressMode::from_flag(config.show_progress);
        let pipeline = async {
            match self.run(request_service, config, cancel, out).await {
                Ok(Rendered::Saved { path, bytes }) => {
                    tracing::debug!(path = %path.display(), bytes, "response saved");
                    ExitStatus::Success
                }
                Ok(Rendered::Printed { bytes }) => {
                    tracing::debug!(bytes, "response printed");
                    ExitStatus::Success
                }
                Err(err) => report_failure(&err, progress).await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => ExitStatus::Interrupted,
            status = pipeline => status,
        }
    }
}

/// Prints the single error line for a failed run and picks the exit status.
/// An interrupt prints nothing.
pub async fn report_failure(error: &CliError, progress: ProgressMode) -> ExitStatus {
    match error {
        CliError::Interrupted => return ExitStatus::Interrupted,
        CliError::Timeout => simulate_timeout(progress).await,
        CliError::Connection(detail) => tracing::debug!(%detail, "connection failed"),
        CliError::FileNotFound(path) => tracing::debug!(path = %path.display(), "body file not found"),
        _ => {}
    }
    output::print_error(error);
    ExitStatus::Error
}
