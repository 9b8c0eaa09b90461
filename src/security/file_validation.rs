use std::sync::LazyLock;

use crate::config::UploadConfig;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

static MAGIC_BYTES: LazyLock<Vec<(&'static [u8], &'static str)>> = LazyLock::new(|| {
    vec![
        (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
        (&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], "image/png"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"BM", "image/bmp"),
        (b"II*\x00", "image/tiff"),
        (b"MM\x00*", "image/tiff"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"PK\x05\x06", "application/zip"),
        (b"Rar!\x1A\x07", "application/vnd.rar"),
        (&[0x1F, 0x8B, 0x08], "application/gzip"),
        (&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C], "application/7z"),
        (b"OggS", "audio/ogg"),
        (b"RIFF", "audio/wav"),
    ]
});

#[derive(Debug, Clone)]
pub struct FileValidationConfig {
    pub max_size: usize,
    pub allowed_types: Vec<String>,
    pub block_executables: bool,
    pub check_magic_bytes: bool,
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_FILE_SIZE,
            allowed_types: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "application/pdf".into(),
                "text/plain".into(),
            ],
            block_executables: true,
            check_magic_bytes: true,
        }
    }
}

impl From<&UploadConfig> for FileValidationConfig {
    fn from(uploads: &UploadConfig) -> Self {
        Self {
            max_size: uploads.max_bytes,
            allowed_types: uploads
                .allowed_types
                .iter()
                .map(|t| t.trim().to_lowercase())
                .collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileValidationResult {
    pub is_valid: bool,
    /// Declared type with parameters stripped, or guessed from the file name
    /// when the client sent none.
    pub content_type: String,
    pub detected_type: Option<String>,
    pub errors: Vec<String>,
}

impl FileValidationResult {
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

pub fn validate_file_upload(
    filename: &str,
    content_type: &str,
    data: &[u8],
    config: &FileValidationConfig,
) -> FileValidationResult {
    let content_type = resolve_content_type(filename, content_type);
    let mut result = FileValidationResult {
        is_valid: true,
        content_type: content_type.clone(),
        detected_type: None,
        errors: Vec::new(),
    };

    if data.is_empty() {
        result.is_valid = false;
        result.errors.push("File is empty".into());
    }

    if data.len() > config.max_size {
        result.is_valid = false;
        result.errors.push(size_limit_message(config.max_size));
    }

    if !config.allowed_types.iter().any(|t| *t == content_type) {
        result.is_valid = false;
        result
            .errors
            .push("File type must be JPEG, PNG, PDF, or TXT".into());
    }

    if let Some(ext) = filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()) {
        if BLOCKED_EXTENSIONS.contains(&ext.as_str()) {
            result.is_valid = false;
            result.errors.push(format!(
                "File extension .{} is blocked for security reasons",
                ext
            ));
        }
    }

    if config.check_magic_bytes {
        if let Some(detected) = detect_file_type(data) {
            result.detected_type = Some(detected.to_string());
            if detected != content_type {
                result.is_valid = false;
                result.errors.push(format!(
                    "File content looks like '{}' but was uploaded as '{}'",
                    detected, content_type
                ));
            }
        }
    }

    if config.block_executables && is_potentially_executable(data) {
        result.is_valid = false;
        result.errors.push(
            "File appears to be executable or contains executable code, which is blocked".into(),
        );
    }

    result
}

fn resolve_content_type(filename: &str, declared: &str) -> String {
    let declared = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if declared.is_empty() || declared == "application/octet-stream" {
        return mime_guess::from_path(filename)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or(declared);
    }
    declared
}

/// Known binary signatures only. Text has no signature and is never detected.
pub fn detect_file_type(data: &[u8]) -> Option<&'static str> {
    MAGIC_BYTES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map(|(_, mime_type)| *mime_type)
}

pub fn size_limit_message(max_size: usize) -> String {
    format!("File size must be less than {}", human_size(max_size))
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{}MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

const BLOCKED_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "app", "deb", "rpm", "dmg", "pkg", "msi", "scr", "bat", "cmd",
    "com", "pif", "vbs", "vbe", "js", "jse", "ws", "wsf", "wsc", "wsh", "ps1", "lnk", "inf",
    "reg", "jar", "sh", "bash", "zsh",
];

fn is_potentially_executable(data: &[u8]) -> bool {
    if data.len() < 2 {
        return false;
    }

    if matches!(&data[0..2], [0x4D, 0x5A]) {
        return true;
    }

    if data.len() >= 4 && matches!(&data[0..4], [0x7F, 0x45, 0x4C, 0x46]) {
        return true;
    }

    if data.len() >= 8 {
        let header = &data[0..8];
        if matches!(header, [0xFE, 0xED, 0xFA, 0xCF, 0x00, 0x00, 0x00, 0x01])
            || matches!(header, [0xCF, 0xFA, 0xED, 0xFE, 0x01, 0x00, 0x00, 0x00])
        {
            return true;
        }
    }

    let head = String::from_utf8_lossy(&data[0..data.len().min(64)]).to_lowercase();
    head.starts_with("#!/bin/") || head.starts_with("#!/usr/bin/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];
    const PDF: &[u8] = b"%PDF-1.7\n%binary";

    fn validate(name: &str, content_type: &str, data: &[u8]) -> FileValidationResult {
        validate_file_upload(name, content_type, data, &FileValidationConfig::default())
    }

    #[test]
    fn test_allowed_types_pass() {
        assert!(validate("shot.png", "image/png", PNG).is_valid);
        assert!(validate("report.pdf", "application/pdf", PDF).is_valid);
        assert!(validate("log.txt", "text/plain; charset=utf-8", b"error at line 3").is_valid);
        assert!(validate("photo.jpg", "image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0]).is_valid);
    }

    #[test]
    fn test_size_limit() {
        let big = vec![b'a'; MAX_FILE_SIZE + 1];
        let result = validate("big.txt", "text/plain", &big);
        assert!(!result.is_valid);
        assert_eq!(result.first_error(), Some("File size must be less than 5MB"));

        let exact = vec![b'a'; MAX_FILE_SIZE];
        assert!(validate("exact.txt", "text/plain", &exact).is_valid);
    }

    #[test]
    fn test_size_boundary_for_binary_types() {
        let mut pdf = PDF.to_vec();
        pdf.resize(MAX_FILE_SIZE, b' ');
        assert!(validate("manual.pdf", "application/pdf", &pdf).is_valid);

        pdf.push(b' ');
        let result = validate("manual.pdf", "application/pdf", &pdf);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["File size must be less than 5MB".to_string()]);
        assert_eq!(size_limit_message(MAX_FILE_SIZE), "File size must be less than 5MB");
    }

    #[test]
    fn test_disallowed_type() {
        let result = validate("anim.gif", "image/gif", b"GIF89a....");
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("JPEG, PNG, PDF, or TXT")));
    }

    #[test]
    fn test_magic_mismatch_rejected() {
        let result = validate("notes.txt", "text/plain", PDF);
        assert!(!result.is_valid);
        assert_eq!(result.detected_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_missing_type_is_guessed_from_name() {
        let result = validate("scan.pdf", "application/octet-stream", PDF);
        assert!(result.is_valid);
        assert_eq!(result.content_type, "application/pdf");
    }

    #[test]
    fn test_executables_blocked() {
        let result = validate("setup.txt", "text/plain", b"MZ\x90\x00");
        assert!(!result.is_valid);
        let result = validate("run.txt", "text/plain", b"#!/bin/sh\nrm -rf /");
        assert!(!result.is_valid);
        let result = validate("tool.exe", "text/plain", b"plain");
        assert!(!result.is_valid);
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(!validate("empty.txt", "text/plain", b"").is_valid);
    }

    #[test]
    fn test_config_from_upload_settings() {
        let uploads = UploadConfig {
            max_bytes: 1024,
            allowed_types: vec![" Text/Plain ".into()],
        };
        let config = FileValidationConfig::from(&uploads);
        assert_eq!(config.max_size, 1024);
        assert_eq!(config.allowed_types, vec!["text/plain".to_string()]);
        let result = validate_file_upload("a.txt", "text/plain", &[b'a'; 2048], &config);
        assert_eq!(result.first_error(), Some("File size must be less than 1KB"));
    }
}
