use std::fs;
use std::path::{Path, PathBuf};

use crate::app::domain::conversion::{
    ConversionError, ConversionOptions, ConversionRequest, ConversionResponse, ConversionTarget,
    DownloadDescriptor,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: i32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two HTTP calls the converter needs. Errors are transport-level
/// failures (connection refused, timeout); HTTP error statuses come back as
/// an `HttpResponse`.
pub trait HttpTransport {
    fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, String>;
    fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// Client for the conversion service. One call, one request: nothing is
/// retried or queued here.
#[derive(Debug, Clone)]
pub struct ConversionClient<T: HttpTransport> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> ConversionClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Send `markdown` to the endpoint for `target` and return where the
    /// result can be downloaded.
    pub fn convert(
        &self,
        markdown: &str,
        target: ConversionTarget,
        options: &ConversionOptions,
    ) -> Result<DownloadDescriptor, ConversionError> {
        if markdown.trim().is_empty() {
            return Err(ConversionError::EmptyMarkdown);
        }

        let url = resolve_url(&self.base_url, target.backend().endpoint());
        let request = ConversionRequest {
            markdown,
            format: target.format_key(),
            options,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| ConversionError::MalformedResponse(e.to_string()))?;

        tracing::info!(format = %target, url = %url, "Requesting conversion");
        let response = self
            .transport
            .post_json(&url, body)
            .map_err(ConversionError::Transport)?;

        if !response.is_success() {
            let err = ConversionError::from_server(response.status, &response.body);
            tracing::warn!(status = response.status, "Conversion failed: {}", err);
            return Err(err);
        }

        let parsed: ConversionResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ConversionError::MalformedResponse(e.to_string()))?;
        if !parsed.success {
            let err = ConversionError::from_rejection(response.status, &response.body);
            tracing::warn!(status = response.status, "Conversion rejected: {}", err);
            return Err(err);
        }

        let download_url = parsed
            .download_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConversionError::MissingDownload)?;
        let filename = parsed
            .filename
            .map(|f| sanitize_filename(&f))
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| default_filename(&download_url, target));

        Ok(DownloadDescriptor {
            url: resolve_url(&self.base_url, &download_url),
            filename,
        })
    }

    /// Fetch the converted file.
    pub fn download(&self, descriptor: &DownloadDescriptor) -> Result<Vec<u8>, ConversionError> {
        tracing::info!(url = %descriptor.url, "Downloading conversion result");
        let response = self
            .transport
            .get(&descriptor.url)
            .map_err(ConversionError::Download)?;

        if !response.is_success() {
            return Err(ConversionError::Download(format!(
                "server returned {}",
                response.status
            )));
        }
        Ok(response.body)
    }

    /// Fetch the converted file into `dest`.
    pub fn download_to(
        &self,
        descriptor: &DownloadDescriptor,
        dest: &Path,
    ) -> Result<PathBuf, ConversionError> {
        let bytes = self.download(descriptor)?;
        fs::write(dest, bytes).map_err(|e| {
            ConversionError::Download(format!("could not write {}: {}", dest.display(), e))
        })?;
        Ok(dest.to_path_buf())
    }
}

/// Join a possibly relative URL onto the service base URL.
pub fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
}

/// Keep only the final path component so a server-provided name can never
/// point outside the chosen directory.
fn sanitize_filename(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim()
        .trim_start_matches('.')
        .to_string()
}

fn default_filename(download_url: &str, target: ConversionTarget) -> String {
    let path = download_url.split(['?', '#']).next().unwrap_or("");
    // Drop scheme and host so a bare `https://cdn.example` has no file name
    let path = match path.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => path,
    };
    let last = sanitize_filename(path);
    if last.contains('.') {
        last
    } else {
        format!("document.{}", target.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct FakeTransport {
        post_response: Option<Result<HttpResponse, String>>,
        get_response: Option<Result<HttpResponse, String>>,
        posts: RefCell<Vec<(String, String)>>,
        gets: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        fn responding(status: i32, body: &str) -> Self {
            Self {
                post_response: Some(Ok(HttpResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                })),
                ..Default::default()
            }
        }

        fn with_download(mut self, status: i32, body: &[u8]) -> Self {
            self.get_response = Some(Ok(HttpResponse {
                status,
                body: body.to_vec(),
            }));
            self
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, String> {
            self.posts.borrow_mut().push((url.to_string(), body));
            self.post_response
                .clone()
                .unwrap_or_else(|| Err("no response configured".to_string()))
        }

        fn get(&self, url: &str) -> Result<HttpResponse, String> {
            self.gets.borrow_mut().push(url.to_string());
            self.get_response
                .clone()
                .unwrap_or_else(|| Err("no response configured".to_string()))
        }
    }

    const OK_BODY: &str =
        r#"{"success":true,"downloadUrl":"/api/download/abc123","filename":"slides.pptx"}"#;

    #[test]
    fn test_convert_posts_once_to_backend_endpoint() {
        let client = ConversionClient::new(FakeTransport::responding(200, OK_BODY), "http://svc:3000/");
        let options = ConversionOptions {
            theme: Some("gaia".to_string()),
            ..Default::default()
        };

        let descriptor = client
            .convert("# Title\n\n---\n\n# Slide", ConversionTarget::MarpPptx, &options)
            .unwrap();

        let posts = client.transport.posts.borrow();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "http://svc:3000/api/convert/marp");
        let body: serde_json::Value = serde_json::from_str(&posts[0].1).unwrap();
        assert_eq!(body["format"], "pptx");
        assert_eq!(body["options"]["theme"], "gaia");
        assert!(body["markdown"].as_str().unwrap().starts_with("# Title"));

        assert_eq!(
            descriptor,
            DownloadDescriptor {
                url: "http://svc:3000/api/download/abc123".to_string(),
                filename: "slides.pptx".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_markdown_sends_nothing() {
        let client = ConversionClient::new(FakeTransport::responding(200, OK_BODY), "http://svc");
        let err = client
            .convert("  \n", ConversionTarget::PandocDocx, &ConversionOptions::default())
            .unwrap_err();
        assert_eq!(err, ConversionError::EmptyMarkdown);
        assert!(client.transport.posts.borrow().is_empty());
    }

    #[test]
    fn test_non_2xx_yields_server_error_with_diagnostics() {
        let body = r#"{"error":"pandoc exited with 43","stderr":"Error producing PDF."}"#;
        let client = ConversionClient::new(FakeTransport::responding(500, body), "http://svc");

        let err = client
            .convert("# Doc", ConversionTarget::PandocPdf, &ConversionOptions::default())
            .unwrap_err();

        assert!(matches!(err, ConversionError::Server { status: 500, .. }));
        assert!(err.diagnostics().unwrap().contains("Error producing PDF."));
        assert_eq!(client.transport.posts.borrow()[0].0, "http://svc/api/convert/pandoc");
    }

    #[test]
    fn test_transport_failure() {
        let transport = FakeTransport {
            post_response: Some(Err("connection refused".to_string())),
            ..Default::default()
        };
        let client = ConversionClient::new(transport, "http://svc");
        let err = client
            .convert("# Doc", ConversionTarget::PandocHtml, &ConversionOptions::default())
            .unwrap_err();
        assert_eq!(err, ConversionError::Transport("connection refused".to_string()));
    }

    #[test]
    fn test_success_false_carries_server_error() {
        let body = r#"{"success":false,"error":"Unknown theme 'foo'","stderr":"marp: theme not found"}"#;
        let client = ConversionClient::new(FakeTransport::responding(200, body), "http://svc");
        let err = client
            .convert("# Deck", ConversionTarget::MarpPdf, &ConversionOptions::default())
            .unwrap_err();

        assert!(matches!(err, ConversionError::Server { status: 200, .. }));
        assert!(err.to_string().contains("Unknown theme 'foo'"));
        assert!(err.diagnostics().unwrap().contains("marp: theme not found"));
    }

    #[test]
    fn test_host_only_download_url_uses_default_name() {
        let client = ConversionClient::new(
            FakeTransport::responding(200, r#"{"success":true,"downloadUrl":"https://cdn.example"}"#),
            "http://svc",
        );
        let d = client
            .convert("# Doc", ConversionTarget::PandocPdf, &ConversionOptions::default())
            .unwrap();
        assert_eq!(d.url, "https://cdn.example");
        assert_eq!(d.filename, "document.pdf");
    }

    #[test]
    fn test_missing_download_url() {
        let client = ConversionClient::new(
            FakeTransport::responding(200, r#"{"success":true,"filename":"a.docx"}"#),
            "http://svc",
        );
        let err = client
            .convert("# Doc", ConversionTarget::PandocDocx, &ConversionOptions::default())
            .unwrap_err();
        assert_eq!(err, ConversionError::MissingDownload);
    }

    #[test]
    fn test_malformed_body() {
        let client = ConversionClient::new(FakeTransport::responding(200, "<html>"), "http://svc");
        let err = client
            .convert("# Doc", ConversionTarget::PandocDocx, &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConversionError::MalformedResponse(_)));
    }

    #[test]
    fn test_filename_falls_back_to_url_or_extension() {
        let client = ConversionClient::new(
            FakeTransport::responding(
                200,
                r#"{"success":true,"downloadUrl":"https://cdn.example/out/report.docx?sig=1"}"#,
            ),
            "http://svc",
        );
        let d = client
            .convert("# Doc", ConversionTarget::PandocDocx, &ConversionOptions::default())
            .unwrap();
        assert_eq!(d.url, "https://cdn.example/out/report.docx?sig=1");
        assert_eq!(d.filename, "report.docx");

        let client = ConversionClient::new(
            FakeTransport::responding(200, r#"{"success":true,"downloadUrl":"/dl/9f2e"}"#),
            "http://svc",
        );
        let d = client
            .convert("# Doc", ConversionTarget::PandocEpub, &ConversionOptions::default())
            .unwrap();
        assert_eq!(d.filename, "document.epub");
    }

    #[test]
    fn test_server_filename_cannot_escape_directory() {
        let client = ConversionClient::new(
            FakeTransport::responding(
                200,
                r#"{"success":true,"downloadUrl":"/dl/1","filename":"../../.bashrc"}"#,
            ),
            "http://svc",
        );
        let d = client
            .convert("# Doc", ConversionTarget::MarpHtml, &ConversionOptions::default())
            .unwrap();
        assert_eq!(d.filename, "bashrc");
    }

    #[test]
    fn test_download_uses_exact_url_and_filename() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FakeTransport::default().with_download(200, b"PK\x03\x04deck");
        let client = ConversionClient::new(transport, "http://svc");
        let descriptor = DownloadDescriptor {
            url: "http://svc/api/download/abc123".to_string(),
            filename: "slides.pptx".to_string(),
        };

        let dest = dir.path().join(&descriptor.filename);
        let path = client.download_to(&descriptor, &dest).unwrap();

        assert_eq!(
            *client.transport.gets.borrow(),
            vec!["http://svc/api/download/abc123".to_string()]
        );
        assert_eq!(path, dir.path().join("slides.pptx"));
        assert_eq!(fs::read(&path).unwrap(), b"PK\x03\x04deck");
    }

    #[test]
    fn test_download_error_status() {
        let transport = FakeTransport::default().with_download(404, b"gone");
        let client = ConversionClient::new(transport, "http://svc");
        let descriptor = DownloadDescriptor {
            url: "http://svc/api/download/expired".to_string(),
            filename: "a.pdf".to_string(),
        };
        let err = client.download(&descriptor).unwrap_err();
        assert_eq!(err, ConversionError::Download("server returned 404".to_string()));
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(resolve_url("http://a/", "/b"), "http://a/b");
        assert_eq!(resolve_url("http://a", "b"), "http://a/b");
        assert_eq!(resolve_url("http://a", "https://c/d"), "https://c/d");
    }
}
