use crate::constants::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RECORDS_FILE, STORAGE_TYPE_FILE, STORAGE_TYPE_MEMORY,
};
use clap::{Arg, ArgMatches, Command};
use common::constants::DEFAULT_MAX_UPLOAD_SIZE;
use relay::http_host::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;
use storage::StorageBackend;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Storage backend type
    pub storage_type: StorageType,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Public base URL used to build share links
    pub base_url: String,
    /// Largest accepted upload in bytes
    pub max_upload_size: u64,
    /// JSON record file for file storage
    pub records_file: PathBuf,
    /// Upload API of the external file host
    pub file_host_url: String,
    /// Longest the file host may go without moving data
    pub file_host_timeout: Duration,
}

/// Storage backend type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    File,
    Memory,
}

fn invalid_input(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
}

impl ServerConfig {
    pub fn command() -> Command {
        Command::new("relay-server")
            .about("Relays uploads to an external file host behind opaque download links")
            .arg(
                Arg::new("storage")
                    .long("storage")
                    .value_name("TYPE")
                    .help("Record storage: 'file' for the JSON record file or 'memory'")
                    .default_value(STORAGE_TYPE_FILE),
            )
            .arg(
                Arg::new("records-file")
                    .long("records-file")
                    .value_name("PATH")
                    .help("Record file for file storage (default: files.json, or RECORDS_FILE env var)"),
            )
            .arg(
                Arg::new("port")
                    .long("port")
                    .value_name("PORT")
                    .help("Server port (default: 8000, or PORT env var)"),
            )
            .arg(
                Arg::new("host")
                    .long("host")
                    .value_name("HOST")
                    .help("Server host (default: 0.0.0.0, or SERVER_HOST env var)"),
            )
            .arg(
                Arg::new("base-url")
                    .long("base-url")
                    .value_name("URL")
                    .help("Public base URL for share links (default: http://localhost:<port>, or BASE_URL env var)"),
            )
            .arg(
                Arg::new("max-upload-size")
                    .long("max-upload-size")
                    .value_name("BYTES")
                    .help("Largest accepted upload in bytes (default: 200 MiB, or MAX_UPLOAD_SIZE env var)"),
            )
            .arg(
                Arg::new("file-host-url")
                    .long("file-host-url")
                    .value_name("URL")
                    .help("Upload API of the file host (default: catbox, or FILE_HOST_URL env var)"),
            )
            .arg(
                Arg::new("file-host-timeout")
                    .long("file-host-timeout")
                    .value_name("SECONDS")
                    .help("Seconds the file host may move no data before a request fails (default: 600, or FILE_HOST_TIMEOUT_SECS env var)"),
            )
    }

    pub fn load() -> Result<Self, std::io::Error> {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches, |key| std::env::var(key).ok())
    }

    /// Resolve each option: command-line args > environment variables > defaults
    pub fn from_matches(
        matches: &ArgMatches,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, std::io::Error> {
        let arg_or_env = |name: &str, var: &str| -> Option<String> {
            matches.get_one::<String>(name).cloned().or_else(|| env(var))
        };

        let storage_type_str = matches
            .get_one::<String>("storage")
            .map(|s| s.as_str())
            .unwrap_or(STORAGE_TYPE_FILE);
        let storage_type = match storage_type_str {
            STORAGE_TYPE_FILE => StorageType::File,
            STORAGE_TYPE_MEMORY => StorageType::Memory,
            _ => {
                return Err(invalid_input(format!(
                    "Invalid storage type: {}. Must be '{}' or '{}'",
                    storage_type_str, STORAGE_TYPE_FILE, STORAGE_TYPE_MEMORY
                )));
            }
        };

        let records_file = PathBuf::from(
            arg_or_env("records-file", "RECORDS_FILE")
                .unwrap_or_else(|| DEFAULT_RECORDS_FILE.to_string()),
        );

        let host = arg_or_env("host", "SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port_str = arg_or_env("port", "PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port: u16 = port_str
            .parse()
            .map_err(|_| invalid_input(format!("Invalid port number: {}", port_str)))?;

        let base_url = arg_or_env("base-url", "BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let max_upload_size = match arg_or_env("max-upload-size", "MAX_UPLOAD_SIZE") {
            Some(value) => value
                .parse()
                .map_err(|_| invalid_input(format!("Invalid max upload size: {}", value)))?,
            None => DEFAULT_MAX_UPLOAD_SIZE,
        };

        let file_host_url = arg_or_env("file-host-url", "FILE_HOST_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let file_host_timeout = match arg_or_env("file-host-timeout", "FILE_HOST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(value.parse().map_err(|_| {
                invalid_input(format!("Invalid file host timeout: {}", value))
            })?),
            None => DEFAULT_TIMEOUT,
        };

        Ok(ServerConfig {
            storage_type,
            host,
            port,
            base_url,
            max_upload_size,
            records_file,
            file_host_url,
            file_host_timeout,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn storage_backend(&self) -> StorageBackend {
        match self.storage_type {
            StorageType::File => StorageBackend::File(self.records_file.clone()),
            StorageType::Memory => StorageBackend::Memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<ServerConfig, std::io::Error> {
        let matches = ServerConfig::command()
            .try_get_matches_from(std::iter::once("relay-server").chain(args.iter().copied()))
            .unwrap();
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_matches(&matches, |key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[], &[]).unwrap();
        assert_eq!(config.storage_type, StorageType::File);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.max_upload_size, 200 * 1024 * 1024);
        assert_eq!(config.records_file, PathBuf::from("files.json"));
        assert_eq!(config.file_host_url, "https://catbox.moe/user/api.php");
        assert_eq!(config.file_host_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_env_fallbacks() {
        let config = parse(
            &[],
            &[
                ("PORT", "10000"),
                ("BASE_URL", "https://relay.example.com/"),
                ("MAX_UPLOAD_SIZE", "1048576"),
                ("RECORDS_FILE", "/var/lib/relay/files.json"),
            ],
        )
        .unwrap();
        assert_eq!(config.port, 10000);
        assert_eq!(config.base_url, "https://relay.example.com");
        assert_eq!(config.max_upload_size, 1_048_576);
        assert_eq!(config.records_file, PathBuf::from("/var/lib/relay/files.json"));
    }

    #[test]
    fn test_args_override_env() {
        let config = parse(
            &["--port", "9000", "--storage", "memory"],
            &[("PORT", "10000")],
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.storage_type, StorageType::Memory);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse(&["--port", "http"], &[]).is_err());
        assert!(parse(&["--storage", "db"], &[]).is_err());
        assert!(parse(&[], &[("MAX_UPLOAD_SIZE", "200MB")]).is_err());
        assert!(parse(&["--file-host-timeout", "soon"], &[]).is_err());
    }
}
