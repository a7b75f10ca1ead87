/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: &str = "8000";

/// Default record file, relative to the working directory
pub const DEFAULT_RECORDS_FILE: &str = "files.json";

/// Storage type identifier for the JSON record file (also the default)
pub const STORAGE_TYPE_FILE: &str = "file";

/// Storage type identifier for the in-memory store
pub const STORAGE_TYPE_MEMORY: &str = "memory";

/// Room left in the multipart body limit for boundaries and part headers (1 MiB)
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;
