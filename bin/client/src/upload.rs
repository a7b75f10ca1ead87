use crate::constants::FILE_FIELD;
use anyhow::{Context, Result};
use common::constants::UPLOAD_ENDPOINT;
use common::UploadResponse;
use log::info;
use reqwest::blocking::{multipart, Client};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

/// Reader that logs how much of the file has been handed to the request body
struct ProgressReader<R> {
    inner: R,
    file_name: String,
    read: u64,
    total: u64,
    last_step: u8,
}

impl<R: Read> ProgressReader<R> {
    fn new(inner: R, file_name: &str, total: u64) -> Self {
        Self {
            inner,
            file_name: file_name.to_string(),
            read: 0,
            total,
            last_step: 0,
        }
    }

    /// Completed tenths of the file
    fn step(&self) -> u8 {
        if self.total == 0 {
            return 10;
        }
        (self.read.min(self.total) * 10 / self.total) as u8
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;

        let step = self.step();
        if step > self.last_step {
            self.last_step = step;
            info!("Uploading {}: {}%", self.file_name, u32::from(step) * 10);
        }
        Ok(n)
    }
}

/// Handles file uploads to the server
pub struct FileUploader {
    server: String,
    client: Client,
}

impl FileUploader {
    /// Create a new file uploader
    pub fn new(server: &str) -> Result<Self> {
        // Large files can take longer than the default 30 second request timeout
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            server: server.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Stream one file to the server and return what it recorded
    pub fn upload(&self, path: &Path) -> Result<UploadResponse> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Not a file path: {:?}", path))?;

        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let size = file
            .metadata()
            .with_context(|| format!("Failed to read metadata of {:?}", path))?
            .len();

        info!("Uploading {} ({} bytes)", file_name, size);

        let part = multipart::Part::reader_with_length(
            ProgressReader::new(file, &file_name, size),
            size,
        )
        .file_name(file_name.clone())
        .mime_str("application/octet-stream")
        .context("Failed to set MIME type")?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        let url = format!("{}{}", self.server, UPLOAD_ENDPOINT);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .context("Failed to connect to server")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Upload failed for file {}: {} - {}", file_name, status, error_text);
        }

        let uploaded: UploadResponse = response
            .json()
            .context("Unexpected response from server")?;
        info!("Uploaded {} as {}", file_name, uploaded.identifier);

        Ok(uploaded)
    }
}

/// Upload a single file to the server
pub fn upload_file(server: &str, path: &Path) -> Result<UploadResponse> {
    FileUploader::new(server)?.upload(path)
}
