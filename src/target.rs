//! Target URL handling and output naming
//!
//! Artifacts are named after the last non-empty path segment of the URL,
//! reduced to `[A-Za-z0-9_-]`, and placed in a folder under the working
//! directory.

use crate::browser::CaptureFormat;
use crate::error::{NavigationError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Name used when nothing usable is left of the URL path
pub const FALLBACK_NAME: &str = "output";

/// Default output folder, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "tmp";

/// Maximum accepted URL length
const MAX_URL_LEN: usize = 2048;

/// A checked capture target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// URL as given on the command line
    pub requested: Url,
    /// URL actually loaded; Shorts links become regular watch pages so the
    /// description expander exists
    pub navigate: Url,
}

impl Target {
    /// Output base name, taken from the requested URL
    pub fn base_name(&self) -> String {
        base_name_from_url(&self.requested)
    }
}

/// Parse and check a target URL
pub fn parse_target(raw: &str) -> Result<Target> {
    if raw.is_empty() {
        return Err(NavigationError::InvalidUrl("URL cannot be empty".to_string()).into());
    }
    if raw.len() > MAX_URL_LEN {
        return Err(NavigationError::InvalidUrl(format!(
            "URL exceeds maximum length of {MAX_URL_LEN} characters"
        ))
        .into());
    }

    let url = Url::parse(raw).map_err(|e| NavigationError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(Target {
            navigate: convert_shorts_url(url.clone()),
            requested: url,
        }),
        other => Err(NavigationError::InvalidUrl(format!(
            "URL must use http, https, or file, not {other}: {raw}"
        ))
        .into()),
    }
}

/// `youtube.com/shorts/<id>` becomes `youtube.com/watch?v=<id>`
pub fn convert_shorts_url(url: Url) -> Url {
    let is_youtube = url
        .host_str()
        .is_some_and(|host| host == "youtube.com" || host.ends_with(".youtube.com"));
    if !is_youtube {
        return url;
    }

    let video_id = url
        .path()
        .strip_prefix("/shorts/")
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|id| !id.is_empty() && !id.contains('/'))
        .map(str::to_string);

    match video_id {
        Some(id) => {
            let mut watch = url;
            watch.set_path("/watch");
            watch.set_query(Some(&format!("v={id}")));
            watch
        }
        None => url,
    }
}

/// Keep only ASCII letters, digits, `-` and `_`
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Base file name for a URL, without extension
pub fn base_name_from_url(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or(FALLBACK_NAME);
    non_empty_or_fallback(sanitize_name(last))
}

/// Base file name for a local file, without extension
pub fn base_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    non_empty_or_fallback(sanitize_name(&stem))
}

fn non_empty_or_fallback(name: String) -> String {
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// `<dir>/<base>.<ext>`
pub fn output_path(dir: &Path, base: &str, format: CaptureFormat) -> PathBuf {
    dir.join(format!("{base}.{}", format.extension()))
}

/// Resolve `output_dir` against the working directory and create it
pub async fn prepare_output_dir(output_dir: &Path) -> Result<PathBuf> {
    let dir = std::env::current_dir()?.join(output_dir);
    tokio::fs::create_dir_all(&dir).await?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_base_name_strips_punctuation() {
        assert_eq!(
            base_name_from_url(&url("https://example.com/blog/My-Post!?x=1")),
            "My-Post"
        );
    }

    #[test]
    fn test_base_name_ignores_trailing_slash() {
        assert_eq!(
            base_name_from_url(&url("https://example.com/blog/entry_2/")),
            "entry_2"
        );
    }

    #[test]
    fn test_base_name_fallback() {
        assert_eq!(base_name_from_url(&url("https://example.com/")), "output");
        assert_eq!(base_name_from_url(&url("https://example.com")), "output");
        assert_eq!(base_name_from_url(&url("https://example.com/!!!")), "output");
    }

    #[test]
    fn test_base_name_from_path() {
        assert_eq!(base_name_from_path(Path::new("/tmp/saved page.html")), "savedpage");
        assert_eq!(base_name_from_path(Path::new("/")), "output");
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/work/tmp"), "My-Post", CaptureFormat::Pdf);
        assert_eq!(path, PathBuf::from("/work/tmp/My-Post.pdf"));
    }

    #[test]
    fn test_parse_target_accepts_web_and_file() {
        assert!(parse_target("https://example.com").is_ok());
        assert!(parse_target("http://localhost:8080/a").is_ok());
        assert!(parse_target("file:///tmp/page.html").is_ok());
    }

    #[test]
    fn test_parse_target_rejects() {
        assert!(parse_target("").is_err());
        assert!(parse_target("example.com").is_err());
        assert!(parse_target("ftp://example.com/file").is_err());
        let long = format!("https://example.com/{}", "a".repeat(3000));
        assert!(parse_target(&long).unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn test_shorts_rewritten() {
        let target = parse_target("https://www.youtube.com/shorts/abc123").unwrap();
        assert_eq!(target.navigate.as_str(), "https://www.youtube.com/watch?v=abc123");
        assert_eq!(target.requested.as_str(), "https://www.youtube.com/shorts/abc123");
    }

    #[test]
    fn test_shorts_named_after_video_id() {
        let first = parse_target("https://www.youtube.com/shorts/abc123").unwrap();
        let second = parse_target("https://youtube.com/shorts/xyz789/").unwrap();
        assert_eq!(first.base_name(), "abc123");
        assert_eq!(second.base_name(), "xyz789");
    }

    #[test]
    fn test_non_shorts_untouched() {
        let raw = "https://www.youtube.com/watch?v=abc123";
        assert_eq!(parse_target(raw).unwrap().navigate.as_str(), raw);

        let elsewhere = "https://example.com/shorts/abc123";
        let target = parse_target(elsewhere).unwrap();
        assert_eq!(target.navigate, target.requested);
        assert_eq!(target.base_name(), "abc123");
    }
}
