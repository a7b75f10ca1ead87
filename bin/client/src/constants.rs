/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Default directory downloaded files are written to
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Multipart field the server reads the file from
pub const FILE_FIELD: &str = "file";
