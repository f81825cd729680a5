//! Browser automation module
//!
//! Remote session handling, navigation, dialog suppression, and export,
//! all through ChromiumOxide.

pub mod capture;
pub mod controller;
pub mod dialog;
pub mod navigation;

pub use capture::{CaptureFormat, CaptureResult, PageCapture};
pub use controller::{BrowserSession, SessionConfig, DEFAULT_ENDPOINT};
pub use dialog::DialogInterceptor;
pub use navigation::{NavigationOptions, NavigationResult, PageNavigator, WaitUntil};
