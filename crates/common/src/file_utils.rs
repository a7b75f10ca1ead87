use std::path::Path;

/// Error type for filename validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameValidationError {
    Empty,
    ContainsNullByte,
    ContainsPathSeparator,
    IsSpecialDirectory,
    ContainsInvalidCharacters,
}

impl FilenameValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            FilenameValidationError::Empty => "Filename cannot be empty",
            FilenameValidationError::ContainsNullByte => "Filename cannot contain null bytes",
            FilenameValidationError::ContainsPathSeparator => {
                "Filename cannot contain path separators (/ or \\)"
            }
            FilenameValidationError::IsSpecialDirectory => "Filename cannot be '.' or '..'",
            FilenameValidationError::ContainsInvalidCharacters => {
                "Invalid filename: contains invalid characters"
            }
        }
    }
}

impl std::fmt::Display for FilenameValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FilenameValidationError {}

/// Validate a filename received from the network before it touches the local filesystem.
/// The name must be a single plain path component.
pub fn validate_filename(filename: &str) -> Result<(), FilenameValidationError> {
    if filename.is_empty() {
        return Err(FilenameValidationError::Empty);
    }

    if filename.contains('\0') {
        return Err(FilenameValidationError::ContainsNullByte);
    }

    if filename.contains('/') || filename.contains('\\') {
        return Err(FilenameValidationError::ContainsPathSeparator);
    }

    if filename == "." || filename == ".." {
        return Err(FilenameValidationError::IsSpecialDirectory);
    }

    if filename.chars().any(char::is_control) {
        return Err(FilenameValidationError::ContainsInvalidCharacters);
    }

    Ok(())
}

/// Reduce a client-supplied filename to its final component.
///
/// Browsers may send `C:\fakepath\report.pdf` or a relative path; only the
/// last segment is kept. Returns `None` when nothing usable remains.
pub fn display_name(raw: &str) -> Option<String> {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// Extension of `filename` including the leading dot, with its case untouched.
///
/// Dotfiles such as `.bashrc` and names ending in a bare dot have no extension.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
}
