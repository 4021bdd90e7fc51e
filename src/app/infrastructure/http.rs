use crate::app::services::converter::{HttpResponse, HttpTransport};

const USER_AGENT: &str = concat!("MarkPress/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP transport backed by minreq.
///
/// Conversions can take a while on the server side (Pandoc PDF runs through
/// LaTeX), so the request timeout is generous.
#[derive(Debug, Clone)]
pub struct MinreqTransport {
    pub request_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl Default for MinreqTransport {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            download_timeout_secs: 60,
        }
    }
}

impl HttpTransport for MinreqTransport {
    fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, String> {
        tracing::debug!(url, bytes = body.len(), "POST");
        let response = minreq::post(url)
            .with_header("User-Agent", USER_AGENT)
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json")
            .with_body(body)
            .with_timeout(self.request_timeout_secs)
            .send()
            .map_err(|e| format!("Failed to reach conversion server: {}", e))?;

        Ok(HttpResponse {
            status: response.status_code,
            body: response.into_bytes(),
        })
    }

    fn get(&self, url: &str) -> Result<HttpResponse, String> {
        tracing::debug!(url, "GET");
        let response = minreq::get(url)
            .with_header("User-Agent", USER_AGENT)
            .with_timeout(self.download_timeout_secs)
            .send()
            .map_err(|e| format!("Failed to download file: {}", e))?;

        Ok(HttpResponse {
            status: response.status_code,
            body: response.into_bytes(),
        })
    }
}
