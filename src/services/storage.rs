use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Yaml,
    Json,
}

impl DocFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(DocFormat::Yaml),
            "json" => Some(DocFormat::Json),
            _ => None,
        }
    }
}

/// Parses a structured document into a format-neutral value.
pub fn parse_document(raw: &str, format: DocFormat) -> Result<serde_json::Value, String> {
    match format {
        DocFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
        DocFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
    }
}

pub fn render_document<T: Serialize>(value: &T, format: DocFormat) -> anyhow::Result<String> {
    Ok(match format {
        DocFormat::Yaml => serde_yaml::to_string(value)?,
        DocFormat::Json => {
            let mut s = serde_json::to_string_pretty(value)?;
            s.push('\n');
            s
        }
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

/// Writes `bytes` next to `path` and renames over it, so readers see either
/// the old content or the new content, never a partial file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_sibling(path);
    let result = (|| {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        std::fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

pub fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut f = std::fs::File::create(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    Ok(sha256_bytes(&std::fs::read(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            DocFormat::from_path(Path::new("index.YAML")),
            Some(DocFormat::Yaml)
        );
        assert_eq!(
            DocFormat::from_path(Path::new("x/feature_schema.json")),
            Some(DocFormat::Json)
        );
        assert_eq!(DocFormat::from_path(Path::new("model.pkl")), None);
    }

    #[test]
    fn yaml_and_json_parse_to_same_value() {
        let y = parse_document("a: 1\nb: [x, y]\n", DocFormat::Yaml).unwrap();
        let j = parse_document(r#"{"a": 1, "b": ["x", "y"]}"#, DocFormat::Json).unwrap();
        assert_eq!(y, j);
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp() {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path().join("index.yaml");
        atomic_write(&p, b"one").unwrap();
        atomic_write(&p, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "two");
        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn sha256_is_hex_encoded() {
        assert_eq!(
            sha256_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
