use crate::document::ExportDocument;
use crate::error::SnapshotError;
use chrono::NaiveDate;
use serde_json::value::RawValue;
use std::fs;
use std::path::PathBuf;

/// Writes snapshot files into one output directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    /// Creates the output directory (and any missing parents) and returns a
    /// writer for it.
    pub fn create(output_dir: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| SnapshotError::CreateDirError {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    /// `<output_dir>/<name>.json`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", name))
    }

    /// Wraps `data` with the export date and overwrites the target's file.
    pub fn write(
        &self,
        name: &str,
        data: &RawValue,
        export_date: NaiveDate,
    ) -> Result<PathBuf, SnapshotError> {
        let mut contents = ExportDocument::new(data, export_date)
            .to_pretty_json()
            .map_err(|source| SnapshotError::FormatError {
                name: name.to_string(),
                source,
            })?;
        contents.push('\n');

        let path = self.path_for(name);
        fs::write(&path, contents).map_err(|source| SnapshotError::WriteError {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(export = name, path = %path.display(), "Wrote snapshot file.");
        Ok(path)
    }
}
