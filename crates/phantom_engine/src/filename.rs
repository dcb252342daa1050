use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

/// Per-target variant of an output path used when one invocation renders
/// several targets: `{stem}--{short_hash(target)}.{ext}` next to `base`.
pub fn batch_output_path(base: &Path, target: &str) -> PathBuf {
    let stem = sanitize_stem(base.file_stem().and_then(OsStr::to_str).unwrap_or("output"));
    let hash = short_hash(target);
    let name = match base.extension().and_then(OsStr::to_str) {
        Some(ext) => format!("{stem}--{hash}.{ext}"),
        None => format!("{stem}--{hash}"),
    };
    base.with_file_name(name)
}

/// Turns user input into a loadable URL. Existing local paths become
/// `file://` URLs, absolute URLs pass through, and bare host names get an
/// `http://` scheme.
pub fn resolve_target(input: &str) -> String {
    let trimmed = input.trim();
    let path = Path::new(trimmed);
    if path.exists() {
        if let Some(url) = path
            .canonicalize()
            .ok()
            .and_then(|abs| Url::from_file_path(abs).ok())
        {
            return url.to_string();
        }
    }
    match Url::parse(trimmed) {
        Ok(url) if url.has_host() || matches!(url.scheme(), "about" | "data" | "file") => {
            url.to_string()
        }
        _ => format!("http://{trimmed}"),
    }
}

fn sanitize_stem(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "output".to_string();
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
