//! Manifest file reading and atomic writing

use super::Manifest;
use crate::error::ManifestError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and writes the manifest at a fixed path
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the manifest
    ///
    /// Every failure here is fatal for the run: there is nothing safe to
    /// reconcile against.
    pub fn load(&self) -> Result<Manifest, ManifestError> {
        if !self.path.exists() {
            return Err(ManifestError::not_found(&self.path));
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ManifestError::read_error(&self.path, e))?;

        serde_json::from_str(&content)
            .map_err(|e| ManifestError::json_parse_error(&self.path, e.to_string()))
    }

    /// Replace the manifest file as a whole
    ///
    /// The document is written to a temp file next to the target and renamed
    /// over it, so readers see either the old or the new manifest.
    pub fn save(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let content = manifest
            .to_pretty_json()
            .map_err(|e| ManifestError::SerializeError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let temp_path = self.temp_path();

        let write_temp = || -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()
        };

        if let Err(e) = write_temp() {
            let _ = fs::remove_file(&temp_path);
            return Err(ManifestError::write_error(&temp_path, e));
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ManifestError::write_error(&self.path, e)
        })
    }

    /// Temp file in the same directory so the rename stays on one filesystem
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "manifest.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ManifestEntry, PinnedArtifact};
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("versions.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(dir.path().join("versions.json"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(write_manifest(&dir, "{ not json"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, ManifestError::JsonParseError { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "{}");
        let store = ManifestStore::new(&path);

        let mut manifest = store.load().unwrap();
        assert!(manifest.is_empty());
        manifest.set(
            "nginx",
            ManifestEntry::Single(PinnedArtifact::new(
                "1.27.5",
                "https://nginx.org/download/nginx-1.27.5.zip",
            )),
        );
        store.save(&manifest).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        assert!(content.contains("\"downloadUrl\": \"https://nginx.org/download/nginx-1.27.5.zip\""));
        assert_eq!(store.load().unwrap(), manifest);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "{}");
        let store = ManifestStore::new(&path);
        store.save(&Manifest::new()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_keeps_unmanaged_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            r#"{"nginx":{"version":"1.27.4","downloadUrl":"https://x/n.zip","sha256":"abc"},"redis":{"tag":"7.2"}}"#,
        );
        let store = ManifestStore::new(&path);

        let manifest = store.load().unwrap();
        store.save(&manifest).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"sha256\": \"abc\""));
        assert!(content.contains("\"tag\": \"7.2\""));
        assert_eq!(store.load().unwrap(), manifest);
    }
}
