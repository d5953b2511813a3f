//! Artifact loading used by strict validation.
//!
//! A consumer deserializes `model.<ext>` with a format-specific loader; the
//! validator runs the same check through [`ArtifactLoader`] so a truncated or
//! overwritten artifact is caught before anyone serves it.

use std::path::Path;

pub trait ArtifactLoader {
    /// Returns `Err(reason)` when the bytes cannot be loaded as an artifact.
    fn load(&self, path: &Path, bytes: &[u8]) -> Result<(), String>;
}

/// Dispatches on the artifact extension.
///
/// - `json`: must parse as JSON.
/// - `pkl`, `pickle`, `joblib`: pickle protocol 2-5 header, or a zlib stream
///   (compressed joblib).
/// - `safetensors`: 8-byte little-endian header length followed by a JSON header.
/// - anything else: must be non-empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatLoader;

const PICKLE_PROTO: u8 = 0x80;
const ZLIB_MAGIC: u8 = 0x78;

fn check_pickle(bytes: &[u8]) -> Result<(), String> {
    match bytes {
        [PICKLE_PROTO, proto, _, ..] if (2..=5).contains(proto) => Ok(()),
        [PICKLE_PROTO, proto, ..] => Err(format!("unsupported pickle protocol {}", proto)),
        [ZLIB_MAGIC, flag, ..] if [0x01, 0x5e, 0x9c, 0xda].contains(flag) => Ok(()),
        [] => Err("artifact is empty".to_string()),
        _ => Err("not a pickle or zlib-compressed joblib stream".to_string()),
    }
}

fn check_safetensors(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("safetensors header truncated".to_string());
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let header_len = u64::from_le_bytes(len) as usize;
    let header = bytes
        .get(8..8usize.saturating_add(header_len))
        .ok_or_else(|| "safetensors header length exceeds file size".to_string())?;
    serde_json::from_slice::<serde_json::Value>(header)
        .map(|_| ())
        .map_err(|e| format!("safetensors header is not JSON: {}", e))
}

impl ArtifactLoader for FormatLoader {
    fn load(&self, path: &Path, bytes: &[u8]) -> Result<(), String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => serde_json::from_slice::<serde_json::Value>(bytes)
                .map(|_| ())
                .map_err(|e| format!("invalid JSON artifact: {}", e)),
            "pkl" | "pickle" | "joblib" => check_pickle(bytes),
            "safetensors" => check_safetensors(bytes),
            _ if bytes.is_empty() => Err("artifact is empty".to_string()),
            _ => Ok(()),
        }
    }
}
