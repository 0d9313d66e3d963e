// Failure classifier - routes failed requests to notices or raw rendering
use super::Loader;
use crate::application::transport::{TransportError, TransportResponse};
use crate::domain::markup::Fragment;
use crate::domain::request::PendingRequest;
use thiserror::Error;

const EXCEPTION_STATUS: u16 = 500;
const FALLBACK_EXCEPTION_MESSAGE: &str = "Internal server error";

/// Why a request did not produce a usable response.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Superseded or stopped on purpose; never shown to the user.
    #[error("request aborted")]
    Aborted,

    #[error("server exception (status 500)")]
    ServerException { body: String },

    #[error("server error (status {status})")]
    ServerError { status: u16, body: String },

    /// The request could not even be built; the server was never asked.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network failure: {0}")]
    NetworkFailure(#[from] TransportError),
}

/// Sort a transport result into a usable response or a failure.
pub(super) fn classify(
    result: Result<TransportResponse, TransportError>,
) -> Result<TransportResponse, RequestError> {
    let response = match result {
        Ok(response) => response,
        Err(TransportError::InvalidUrl { url, reason }) => {
            return Err(RequestError::InvalidUrl { url, reason });
        }
        Err(e) => return Err(e.into()),
    };
    if response.is_success() {
        return Ok(response);
    }
    if response.status == EXCEPTION_STATUS {
        Err(RequestError::ServerException { body: response.body })
    } else {
        Err(RequestError::ServerError {
            status: response.status,
            body: response.body,
        })
    }
}

impl Loader {
    pub(super) fn on_failure(&mut self, request: &PendingRequest, error: RequestError) {
        let url = &request.url;
        match error {
            RequestError::Aborted => {
                tracing::info!("Request to {} has been aborted for {:?}", url, request.region);
            }
            RequestError::ServerException { body } => {
                if self.notices.has_exception() {
                    tracing::debug!("Exception notice already visible, suppressing another for {}", url);
                    return;
                }
                if let Some(region) = &request.region {
                    self.document.set_impacted(region, true);
                }
                let message = Fragment::parse(&body)
                    .first_heading()
                    .map(|heading| heading.inner_html())
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_EXCEPTION_MESSAGE.to_string());
                self.notices.raise_exception(&message);
                self.ui.fix_controls();
            }
            RequestError::ServerError { status, body } => {
                let preview: String = body.chars().take(100).collect();
                tracing::error!("{} loading {}: {}", status, url, preview);
                if let Some(region) = &request.region {
                    self.renderer.render(Fragment::parse(&body), region);
                }
            }
            RequestError::InvalidUrl { url: resolved, reason } => {
                tracing::error!("Cannot request {} ({}) for {:?}: {}", url, resolved, request.region, reason);
            }
            RequestError::NetworkFailure(cause) => {
                if !self.notices.has_connection_lost() {
                    let message = format!(
                        "The connection to the web server has been lost at {}.",
                        self.clock.time_short()
                    );
                    self.notices.raise_connection_lost(&message);
                    self.ui.fix_controls();
                }
                tracing::error!("Failed to contact web server loading {} for {:?}: {}", url, request.region, cause);
            }
        }
    }
}
