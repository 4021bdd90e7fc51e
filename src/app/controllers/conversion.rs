use crate::app::domain::conversion::{ConversionError, ConversionTarget, DownloadDescriptor};
use crate::app::domain::notification::Notification;

/// Tracks the one conversion that may be running and the result waiting to
/// be downloaded.
#[derive(Debug, Default)]
pub struct ConversionController {
    in_flight: Option<ConversionTarget>,
    last_download: Option<DownloadDescriptor>,
    downloading: bool,
}

impl ConversionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn download_descriptor(&self) -> Option<&DownloadDescriptor> {
        self.last_download.as_ref()
    }

    /// Claim the conversion slot. On success the caller sends the request;
    /// on failure it shows the returned notification and sends nothing.
    pub fn begin(&mut self, markdown: &str, target: ConversionTarget) -> Result<(), Notification> {
        if markdown.trim().is_empty() {
            return Err(Notification::error(
                "Nothing to convert",
                Some("Write some markdown first.".to_string()),
            ));
        }
        if let Some(running) = self.in_flight {
            return Err(Notification::error(
                "A conversion is already running",
                Some(format!("Wait for {} to finish.", running.display_name())),
            ));
        }

        self.in_flight = Some(target);
        self.last_download = None;
        tracing::info!(format = %target, "Conversion started");
        Ok(())
    }

    /// Release the slot and turn the outcome into a notification.
    pub fn finish(&mut self, result: Result<DownloadDescriptor, ConversionError>) -> Notification {
        let target = self.in_flight.take();
        let what = target.map(|t| t.display_name()).unwrap_or("Document");

        match result {
            Ok(descriptor) => {
                let note = Notification::success(format!(
                    "{} ready: {} (Convert > Download Last Result)",
                    what, descriptor.filename
                ));
                self.last_download = Some(descriptor);
                note
            }
            Err(e) => {
                tracing::warn!("Conversion failed: {}", e);
                self.last_download = None;
                Notification::error(format!("{} conversion failed: {}", what, e), e.diagnostics())
            }
        }
    }

    /// Claim the download step. Returns the descriptor to fetch, or a
    /// notification explaining why there is nothing to do.
    pub fn begin_download(&mut self) -> Result<DownloadDescriptor, Notification> {
        if self.downloading {
            return Err(Notification::info("A download is already in progress"));
        }
        let descriptor = self
            .last_download
            .clone()
            .ok_or_else(|| Notification::info("No converted document to download yet"))?;
        self.downloading = true;
        Ok(descriptor)
    }

    pub fn finish_download(&mut self, result: Result<std::path::PathBuf, String>) -> Notification {
        self.downloading = false;
        match result {
            Ok(path) => Notification::success(format!("Saved {}", path.display())),
            Err(e) => Notification::error("Download failed", Some(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn descriptor() -> DownloadDescriptor {
        DownloadDescriptor {
            url: "http://svc/api/download/1".to_string(),
            filename: "deck.pptx".to_string(),
        }
    }

    #[test]
    fn test_begin_rejects_empty_markdown() {
        let mut c = ConversionController::new();
        let note = c.begin("   ", ConversionTarget::MarpPptx).unwrap_err();
        assert!(note.is_error());
        assert!(!c.is_busy());
    }

    #[test]
    fn test_only_one_conversion_at_a_time() {
        let mut c = ConversionController::new();
        c.begin("# A", ConversionTarget::MarpPptx).unwrap();
        assert!(c.is_busy());
        let note = c.begin("# A", ConversionTarget::PandocDocx).unwrap_err();
        assert_eq!(note.title, "A conversion is already running");
    }

    #[test]
    fn test_success_stores_descriptor() {
        let mut c = ConversionController::new();
        c.begin("# A", ConversionTarget::MarpPptx).unwrap();
        let note = c.finish(Ok(descriptor()));
        assert!(!note.is_error());
        assert!(note.title.contains("deck.pptx"));
        assert_eq!(c.download_descriptor(), Some(&descriptor()));
        assert!(!c.is_busy());
    }

    #[test]
    fn test_server_failure_yields_error_and_no_descriptor() {
        let mut c = ConversionController::new();
        c.begin("# A", ConversionTarget::MarpPptx).unwrap();
        c.finish(Ok(descriptor()));

        c.begin("# B", ConversionTarget::PandocPdf).unwrap();
        // Starting a new conversion drops the previous result
        assert!(c.download_descriptor().is_none());

        let err = ConversionError::from_server(500, br#"{"error":"boom","stderr":"trace"}"#);
        let note = c.finish(Err(err));
        assert!(note.is_error());
        assert!(note.title.contains("Document (PDF) conversion failed"));
        assert_eq!(note.detail.as_deref(), Some("stderr:\ntrace"));
        assert!(c.download_descriptor().is_none());
        assert!(!c.is_busy());
    }

    #[test]
    fn test_download_requires_result() {
        let mut c = ConversionController::new();
        assert!(c.begin_download().is_err());

        c.begin("# A", ConversionTarget::MarpPptx).unwrap();
        c.finish(Ok(descriptor()));
        assert_eq!(c.begin_download().unwrap(), descriptor());
        assert!(c.begin_download().is_err());

        let note = c.finish_download(Ok(PathBuf::from("/tmp/deck.pptx")));
        assert!(!note.is_error());
        assert!(c.begin_download().is_ok());
    }

    #[test]
    fn test_download_failure_notification() {
        let mut c = ConversionController::new();
        let note = c.finish_download(Err("server returned 404".to_string()));
        assert!(note.is_error());
        assert_eq!(note.detail.as_deref(), Some("server returned 404"));
    }
}
