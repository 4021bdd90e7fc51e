use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The conversion service behind each endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    /// Slide decks (Marp CLI)
    Marp,
    /// Documents (Pandoc)
    Pandoc,
}

impl Backend {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Marp => "/api/convert/marp",
            Self::Pandoc => "/api/convert/pandoc",
        }
    }
}

/// Every output the conversion service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConversionTarget {
    #[default]
    MarpPptx,
    MarpPdf,
    MarpHtml,
    PandocDocx,
    PandocPdf,
    PandocHtml,
    PandocOdt,
    PandocEpub,
}

impl ConversionTarget {
    pub fn all() -> &'static [ConversionTarget] {
        &[
            Self::MarpPptx,
            Self::MarpPdf,
            Self::MarpHtml,
            Self::PandocDocx,
            Self::PandocPdf,
            Self::PandocHtml,
            Self::PandocOdt,
            Self::PandocEpub,
        ]
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::MarpPptx | Self::MarpPdf | Self::MarpHtml => Backend::Marp,
            _ => Backend::Pandoc,
        }
    }

    /// Value of the `format` field on the wire.
    pub fn format_key(&self) -> &'static str {
        match self {
            Self::MarpPptx => "pptx",
            Self::MarpPdf | Self::PandocPdf => "pdf",
            Self::MarpHtml | Self::PandocHtml => "html",
            Self::PandocDocx => "docx",
            Self::PandocOdt => "odt",
            Self::PandocEpub => "epub",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.format_key()
    }

    /// Stable identifier used in settings and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::MarpPptx => "marp-pptx",
            Self::MarpPdf => "marp-pdf",
            Self::MarpHtml => "marp-html",
            Self::PandocDocx => "pandoc-docx",
            Self::PandocPdf => "pandoc-pdf",
            Self::PandocHtml => "pandoc-html",
            Self::PandocOdt => "pandoc-odt",
            Self::PandocEpub => "pandoc-epub",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MarpPptx => "Slides (PowerPoint)",
            Self::MarpPdf => "Slides (PDF)",
            Self::MarpHtml => "Slides (HTML)",
            Self::PandocDocx => "Document (Word)",
            Self::PandocPdf => "Document (PDF)",
            Self::PandocHtml => "Document (HTML)",
            Self::PandocOdt => "Document (OpenDocument)",
            Self::PandocEpub => "Document (EPUB)",
        }
    }
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ConversionTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.id() == wanted)
            .ok_or_else(|| format!("Unknown conversion format: {}", s))
    }
}

/// Flat option bag sent with every conversion. Unset fields are left off
/// the wire so the server applies its own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Marp theme name (default, gaia, uncover)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub toc: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub number_sections: bool,

    /// Pandoc code highlighting style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_style: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionRequest<'a> {
    pub markdown: &'a str,
    pub format: &'static str,
    pub options: &'a ConversionOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Error payload returned by the service with a non-2xx status, or alongside
/// `success: false`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
}

/// Where to fetch a finished conversion and what to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub url: String,
    pub filename: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("There is no markdown to convert")]
    EmptyMarkdown,

    #[error("{0}")]
    Transport(String),

    #[error("Server returned {status}: {message}")]
    Server {
        status: i32,
        message: String,
        details: Option<String>,
        stderr: Option<String>,
        stdout: Option<String>,
    },

    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),

    #[error("Server response did not include a download link")]
    MissingDownload,

    #[error("Download failed: {0}")]
    Download(String),
}

impl ConversionError {
    pub fn from_server(status: i32, body: &[u8]) -> Self {
        Self::from_error_body(status, body, || {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                "Conversion failed".to_string()
            } else {
                text
            }
        })
    }

    /// A 2xx response whose body says `success: false`. The body is JSON, so
    /// it is never used verbatim as the message.
    pub fn from_rejection(status: i32, body: &[u8]) -> Self {
        Self::from_error_body(status, body, || {
            "Server reported the conversion as unsuccessful".to_string()
        })
    }

    fn from_error_body(status: i32, body: &[u8], fallback: impl FnOnce() -> String) -> Self {
        let parsed: ServerErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(fallback);
        Self::Server {
            status,
            message,
            details: parsed.details,
            stderr: parsed.stderr,
            stdout: parsed.stdout,
        }
    }

    /// Server-side diagnostics suitable for an expandable detail view.
    pub fn diagnostics(&self) -> Option<String> {
        let Self::Server {
            details,
            stderr,
            stdout,
            ..
        } = self
        else {
            return None;
        };

        let sections: Vec<String> = [("Details", details), ("stderr", stderr), ("stdout", stdout)]
            .into_iter()
            .filter_map(|(label, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}:\n{}", label, v))
            })
            .collect();

        if sections.is_empty() {
            None
        } else {
            Some(sections.join("\n\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_endpoints() {
        assert_eq!(ConversionTarget::MarpPptx.backend().endpoint(), "/api/convert/marp");
        assert_eq!(ConversionTarget::PandocDocx.backend().endpoint(), "/api/convert/pandoc");
        assert_eq!(ConversionTarget::PandocPdf.backend(), Backend::Pandoc);
        assert_eq!(ConversionTarget::MarpPdf.backend(), Backend::Marp);
    }

    #[test]
    fn test_target_ids_parse_back() {
        for target in ConversionTarget::all() {
            assert_eq!(target.id().parse::<ConversionTarget>(), Ok(*target));
        }
        assert_eq!("  PANDOC-EPUB ".parse::<ConversionTarget>(), Ok(ConversionTarget::PandocEpub));
        assert!("word".parse::<ConversionTarget>().is_err());
    }

    #[test]
    fn test_request_wire_shape() {
        let options = ConversionOptions {
            toc: true,
            ..Default::default()
        };
        let request = ConversionRequest {
            markdown: "# Deck",
            format: ConversionTarget::PandocDocx.format_key(),
            options: &options,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["markdown"], "# Deck");
        assert_eq!(json["format"], "docx");
        assert_eq!(json["options"], serde_json::json!({ "toc": true }));
    }

    #[test]
    fn test_options_camel_case() {
        let options = ConversionOptions {
            theme: Some("gaia".to_string()),
            number_sections: true,
            highlight_style: Some("tango".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["theme"], "gaia");
        assert_eq!(json["numberSections"], true);
        assert_eq!(json["highlightStyle"], "tango");
        assert!(json.get("toc").is_none());
    }

    #[test]
    fn test_response_parses_camel_case() {
        let body = r#"{"success":true,"downloadUrl":"/downloads/a.pptx","filename":"a.pptx"}"#;
        let response: ConversionResponse = serde_json::from_str(body).unwrap();
        assert!(response.success);
        assert_eq!(response.download_url.as_deref(), Some("/downloads/a.pptx"));
        assert_eq!(response.filename.as_deref(), Some("a.pptx"));
    }

    #[test]
    fn test_server_error_with_diagnostics() {
        let body = br#"{"error":"Pandoc failed","details":"exit code 43","stderr":"! LaTeX Error"}"#;
        let err = ConversionError::from_server(500, body);
        assert_eq!(err.to_string(), "Server returned 500: Pandoc failed");
        let diagnostics = err.diagnostics().unwrap();
        assert!(diagnostics.contains("Details:\nexit code 43"));
        assert!(diagnostics.contains("stderr:\n! LaTeX Error"));
        assert!(!diagnostics.contains("stdout"));
    }

    #[test]
    fn test_server_error_plain_text_body() {
        let err = ConversionError::from_server(502, b"Bad Gateway");
        assert_eq!(err.to_string(), "Server returned 502: Bad Gateway");
        assert_eq!(err.diagnostics(), None);

        let err = ConversionError::from_server(500, b"");
        assert_eq!(err.to_string(), "Server returned 500: Conversion failed");
    }

    #[test]
    fn test_rejection_keeps_server_diagnostics() {
        let body = br#"{"success":false,"error":"Unknown theme 'foo'","stderr":"marp: theme not found"}"#;
        let err = ConversionError::from_rejection(200, body);
        assert_eq!(err.to_string(), "Server returned 200: Unknown theme 'foo'");
        assert_eq!(err.diagnostics().as_deref(), Some("stderr:\nmarp: theme not found"));

        let bare = ConversionError::from_rejection(200, br#"{"success":false}"#);
        assert_eq!(
            bare.to_string(),
            "Server returned 200: Server reported the conversion as unsuccessful"
        );
        assert_eq!(bare.diagnostics(), None);
    }
}
