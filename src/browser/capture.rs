//! Page export
//!
//! Produces the output artifact from a cleaned page: an A4 PDF by default,
//! or the serialized HTML or visible text.

use crate::cleanup::StaticDocument;
use crate::error::{CaptureError, Result};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// A4 paper size in inches
pub const A4_INCHES: (f64, f64) = (8.27, 11.69);

/// Format of the exported artifact
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// PDF document
    #[default]
    Pdf,
    /// Serialized HTML
    Html,
    /// Visible text
    Text,
}

impl CaptureFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            CaptureFormat::Pdf => "pdf",
            CaptureFormat::Html => "html",
            CaptureFormat::Text => "txt",
        }
    }
}

/// Result of a capture operation
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// The captured data
    pub data: Vec<u8>,
    /// The format of the capture
    pub format: CaptureFormat,
    /// Size in bytes
    pub size: usize,
}

impl CaptureResult {
    fn new(data: Vec<u8>, format: CaptureFormat) -> Self {
        let size = data.len();
        Self { data, format, size }
    }

    /// Write the artifact to `path`
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, &self.data).await?;
        debug!("Wrote {} bytes to {}", self.size, path.display());
        Ok(())
    }
}

/// Page capture functionality
pub struct PageCapture;

impl PageCapture {
    /// Capture a live page in the given format
    #[instrument(skip(page))]
    pub async fn capture(page: &Page, format: CaptureFormat) -> Result<CaptureResult> {
        match format {
            CaptureFormat::Pdf => Self::pdf(page).await,
            CaptureFormat::Html => Self::html(page).await,
            CaptureFormat::Text => Self::text(page).await,
        }
    }

    /// Export an offline document. PDF needs a renderer and is refused.
    pub fn capture_document(doc: &StaticDocument, format: CaptureFormat) -> Result<CaptureResult> {
        let data = match format {
            CaptureFormat::Pdf => {
                return Err(CaptureError::UnsupportedOffline("pdf".to_string()).into())
            }
            CaptureFormat::Html => doc.to_html(),
            CaptureFormat::Text => doc.visible_text(),
        };
        Ok(CaptureResult::new(data.into_bytes(), format))
    }

    /// Print the page to an A4 PDF with backgrounds
    #[instrument(skip(page))]
    pub async fn pdf(page: &Page) -> Result<CaptureResult> {
        info!("Generating PDF");

        let (width, height) = A4_INCHES;
        let params = PrintToPdfParams::builder()
            .paper_width(width)
            .paper_height(height)
            .print_background(true)
            .build();

        let data = page
            .pdf(params)
            .await
            .map_err(|e| CaptureError::PdfFailed(e.to_string()))?;

        debug!("PDF generated: {} bytes", data.len());
        Ok(CaptureResult::new(data, CaptureFormat::Pdf))
    }

    /// Capture raw HTML
    #[instrument(skip(page))]
    pub async fn html(page: &Page) -> Result<CaptureResult> {
        info!("Capturing HTML");

        let html: String = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| CaptureError::HtmlFailed(e.to_string()))?
            .into_value()
            .map_err(|e| CaptureError::HtmlFailed(e.to_string()))?;

        debug!("HTML captured: {} bytes", html.len());
        Ok(CaptureResult::new(html.into_bytes(), CaptureFormat::Html))
    }

    /// Capture the rendered text of the body
    #[instrument(skip(page))]
    pub async fn text(page: &Page) -> Result<CaptureResult> {
        info!("Capturing text");

        let text: String = page
            .evaluate("document.body ? document.body.innerText : ''")
            .await
            .map_err(|e| CaptureError::TextFailed(e.to_string()))?
            .into_value()
            .map_err(|e| CaptureError::TextFailed(e.to_string()))?;

        debug!("Text captured: {} bytes", text.len());
        Ok(CaptureResult::new(text.into_bytes(), CaptureFormat::Text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_format_default() {
        assert_eq!(CaptureFormat::default(), CaptureFormat::Pdf);
    }

    #[test]
    fn test_capture_format_extension() {
        assert_eq!(CaptureFormat::Pdf.extension(), "pdf");
        assert_eq!(CaptureFormat::Html.extension(), "html");
        assert_eq!(CaptureFormat::Text.extension(), "txt");
    }

    #[test]
    fn test_capture_document_refuses_pdf() {
        let doc = StaticDocument::parse("<body><p>hi</p></body>");
        let err = PageCapture::capture_document(&doc, CaptureFormat::Pdf).unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn test_capture_document_text() {
        let doc = StaticDocument::parse("<body><p>hi</p><p>there</p></body>");
        let result = PageCapture::capture_document(&doc, CaptureFormat::Text).unwrap();
        assert_eq!(result.data, b"hi\nthere");
        assert_eq!(result.size, 8);
        assert_eq!(result.format, CaptureFormat::Text);
    }
}
