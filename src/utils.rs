use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};

use urlencoding::decode;

/// Turn whatever the user typed for the input into a usable path.
///
/// Accepts `file://` URIs (percent-decoded) and, on Windows, WSL style
/// `/mnt/<drive>/...` paths. Relative paths are resolved against the current
/// directory. A path that does not exist yet is returned un-canonicalized so
/// the later open reports the real error.
pub fn resolve_input_path(source_path: &str) -> PathBuf {
    let mut path_str: Cow<str> = Cow::Borrowed(source_path);

    if let Some(rest) = source_path.strip_prefix("file://") {
        let decoded = decode(rest).unwrap_or(Cow::Borrowed(rest));
        let mut owned = decoded.into_owned();
        // file:///C:/... leaves a leading slash in front of the drive
        if cfg!(windows) && owned.starts_with('/') && owned.chars().nth(2) == Some(':') {
            owned.remove(0);
        }
        path_str = Cow::Owned(owned);
    }

    if cfg!(windows) && path_str.starts_with("/mnt/") {
        let parts: Vec<&str> = path_str.split('/').collect();
        // Index 0 is empty (before first /), Index 1 is "mnt", Index 2 is the drive
        if parts.len() >= 3 && parts[2].len() == 1 {
            let drive_letter = parts[2].to_uppercase();
            let remaining = parts[3..].join("/");
            path_str = Cow::Owned(format!("{}:/{}", drive_letter, remaining));
        }
    }

    let path = Path::new(path_str.as_ref());
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_default().join(path)
    };

    // dunce keeps Windows paths free of the \\?\ prefix
    dunce::canonicalize(&absolute).unwrap_or(absolute)
}

/// Parse `0x1000`, `1000h` or plain hex.
pub fn parse_hex_u64(src: &str) -> Result<u64, std::num::ParseIntError> {
    let s = src.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_suffix('h'))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16)
}
