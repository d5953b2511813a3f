use crate::domain::constants::{DOCUMENT_EXTENSIONS, STAGING_PREFIX};

/// Parses a version directory name (`v1`, `v12`) into its number.
///
/// Leading zeros, `v0` and anything that is not `v` followed by digits are
/// rejected, so `v01` and `v1` can never both name the same version.
pub fn parse_version_dir(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('v')?;
    if digits.is_empty() || digits.starts_with('0') {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn version_dir_name(version: u32) -> String {
    format!("v{}", version)
}

pub fn staging_dir_name(version: u32, pid: u32) -> String {
    format!("{}v{}-{}", STAGING_PREFIX, version, pid)
}

/// Model names are single path components that are not hidden.
pub fn is_valid_model_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && name != ".."
}

pub fn is_document_extension(ext: &str) -> bool {
    DOCUMENT_EXTENSIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
}
