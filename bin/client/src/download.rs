use anyhow::{Context, Result};
use common::constants::DOWNLOAD_ENDPOINT;
use common::file_utils;
use log::info;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_DISPOSITION};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Build the download URL for an identifier or a full share link
pub fn download_url(server: &str, target: &str) -> Result<String> {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        anyhow::ensure!(
            target.contains(&format!("{}/", DOWNLOAD_ENDPOINT)),
            "Not a share link: {}",
            target
        );
        return Ok(target.to_string());
    }

    anyhow::ensure!(
        !target.is_empty() && target.chars().all(|c| c.is_ascii_alphanumeric()),
        "Invalid identifier: {:?}",
        target
    );
    Ok(format!(
        "{}{}/{}",
        server.trim_end_matches('/'),
        DOWNLOAD_ENDPOINT,
        target
    ))
}

/// Filename announced by an `attachment; filename=...` header value
pub fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Filename from a `Content-Disposition` header, which may carry UTF-8 beyond ASCII
fn disposition_filename(value: &HeaderValue) -> Option<String> {
    filename_from_disposition(&String::from_utf8_lossy(value.as_bytes()))
}

/// Handles downloads from the server
pub struct FileDownloader {
    client: Client,
}

impl FileDownloader {
    /// Create a new file downloader
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Stream the file at `url` into `output_dir` under the name the server gives it
    pub fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf> {
        let mut response = self
            .client
            .get(url)
            .send()
            .context("Failed to connect to server")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Download failed: {} - {}", status, error_text);
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(disposition_filename)
            .ok_or_else(|| anyhow::anyhow!("Server response names no file"))?;

        // Validate filename to prevent path traversal attacks
        file_utils::validate_filename(&filename)
            .map_err(|e| anyhow::anyhow!("{}: {}", e.message(), filename))?;

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
        let path = output_dir.join(&filename);

        let mut file = fs::File::create(&path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        if let Err(e) = response.copy_to(&mut file) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(e).context("Download interrupted");
        }

        info!("Downloaded {} to {:?}", filename, path);
        Ok(path)
    }
}

/// Download a file by identifier or share link into `output_dir`
pub fn download_file(server: &str, target: &str, output_dir: &Path) -> Result<PathBuf> {
    let url = download_url(server, target)?;
    FileDownloader::new()?.download(&url, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_from_identifier() {
        assert_eq!(
            download_url("http://127.0.0.1:8000/", "a1b2c3d4e5f6").unwrap(),
            "http://127.0.0.1:8000/download/a1b2c3d4e5f6"
        );
        assert!(download_url("http://127.0.0.1:8000", "").is_err());
        assert!(download_url("http://127.0.0.1:8000", "../etc").is_err());
    }

    #[test]
    fn test_download_url_from_link() {
        assert_eq!(
            download_url("http://ignored", " https://relay.example/download/a1b2c3d4e5f6 ").unwrap(),
            "https://relay.example/download/a1b2c3d4e5f6"
        );
        assert!(download_url("http://ignored", "https://relay.example/upload").is_err());
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=0a1b2c3d4e.txt").as_deref(),
            Some("0a1b2c3d4e.txt")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=\"0a1b2c3d4e\"").as_deref(),
            Some("0a1b2c3d4e")
        );
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition("attachment; filename="), None);
    }

    #[test]
    fn test_disposition_filename_non_ascii_extension() {
        let value = HeaderValue::from_bytes("attachment; filename=0a1b2c3d4e.пдф".as_bytes()).unwrap();
        let filename = disposition_filename(&value).unwrap();
        assert_eq!(filename, "0a1b2c3d4e.пдф");
        assert!(file_utils::validate_filename(&filename).is_ok());
    }

    #[test]
    fn test_download_unreachable_server() {
        let dir = tempfile::tempdir().unwrap();
        let err = download_file("http://127.0.0.1:1", "a1b2c3d4e5f6", dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to connect"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
