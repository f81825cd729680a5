//! pagesnap - clean page capture through a remote browser
//!
//! Attaches to a Chrome/Chromium instance running with remote debugging,
//! loads a page, strips the parts that do not belong in an archived copy,
//! and exports what is left as a PDF.
//!
//! # Architecture
//!
//! ```text
//! CLI ──▶ Snapshotter ──▶ BrowserSession (CDP)
//!              │                │
//!              ▼                ▼
//!        ┌───────────┐   ┌──────────────┐
//!        │ Normalizer│──▶│ LivePage /   │
//!        └─────┬─────┘   │ StaticDocument│
//!              │         └──────────────┘
//!              ▼
//!        PageCapture ──▶ tmp/<name>.pdf
//! ```
//!
//! # Cleanup passes
//!
//! 1. Remove overlays whose `id`/`class` mentions cookie, banner, popup,
//!    dialog or modal, plus anything with `aria-modal="true"`.
//! 2. Click known "read more" expanders.
//! 3. Scroll to the bottom in timed steps so lazy content loads.
//! 4. Drop the block holding "Written by" and everything after it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagesnap::{SnapshotOptions, Snapshotter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let snapshotter = Snapshotter::new(SnapshotOptions::default())?;
//!     let outcome = snapshotter.capture_url("https://example.com/blog/post").await?;
//!     println!("{}", outcome.path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod cleanup;
pub mod error;
pub mod snapshot;
pub mod target;

// Re-exports for convenience
pub use browser::{BrowserSession, CaptureFormat, SessionConfig};
pub use cleanup::{CleanupConfig, CleanupReport, PageNormalizer, PageSurface, StaticDocument};
pub use error::{Error, Result};
pub use snapshot::{SnapshotOptions, SnapshotOutcome, Snapshotter};
