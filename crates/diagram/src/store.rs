// SPDX-License-Identifier: MIT
//! Reads pre-generated diagram artifacts off disk (C8, §4.6). This component
//! never renders a diagram from YAML; the Mermaid text is produced by an
//! external generator and simply served back here.
//!
//! Layout expected under `base_dir`:
//! ```text
//! <config_type>/metadata.json         aggregate metadata for the config type
//! <config_type>/<diagram_name>.mmd    Mermaid source
//! <config_type>/<diagram_name>.meta.json   per-diagram metadata
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DiagramError;

/// One state's membership in a nested sub-diagram, for UI grouping only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompositeMembership {
    pub state: String,
    pub diagram_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagramMetadata {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub composites: Vec<CompositeMembership>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramArtifact {
    pub mermaid: String,
    pub metadata: DiagramMetadata,
}

pub struct DiagramStore {
    base_dir: PathBuf,
}

impl DiagramStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// `config_type` names with at least one pre-generated `.mmd` file.
    pub fn list_config_types(&self) -> Result<Vec<String>, DiagramError> {
        let mut names = Vec::new();
        let entries = match std::fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let has_diagram = std::fs::read_dir(entry.path())?
                .filter_map(Result::ok)
                .any(|file| file.path().extension().is_some_and(|ext| ext == "mmd"));
            if has_diagram {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load_diagram(&self, config_type: &str, diagram_name: &str) -> Result<DiagramArtifact, DiagramError> {
        let dir = self.base_dir.join(config_type);
        let mermaid_path = dir.join(format!("{diagram_name}.mmd"));
        let mermaid = std::fs::read_to_string(&mermaid_path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                DiagramError::NotFound(format!("{config_type}/{diagram_name}"))
            } else {
                DiagramError::Io(err)
            }
        })?;

        let meta_path = dir.join(format!("{diagram_name}.meta.json"));
        let metadata = match std::fs::read_to_string(&meta_path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DiagramMetadata::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(DiagramArtifact { mermaid, metadata })
    }

    pub fn load_config_metadata(&self, config_type: &str) -> Result<DiagramMetadata, DiagramError> {
        let path = self.base_dir.join(config_type).join("metadata.json");
        let raw = std::fs::read_to_string(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                DiagramError::NotFound(config_type.to_string())
            } else {
                DiagramError::Io(err)
            }
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &std::path::Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn lists_only_config_types_that_have_a_diagram_file() {
        let root = tempfile::tempdir().unwrap();
        let worker_dir = root.path().join("worker");
        std::fs::create_dir_all(&worker_dir).unwrap();
        write(&worker_dir, "main.mmd", "stateDiagram-v2");

        let empty_dir = root.path().join("empty");
        std::fs::create_dir_all(&empty_dir).unwrap();

        let store = DiagramStore::new(root.path().to_path_buf());
        assert_eq!(store.list_config_types().unwrap(), vec!["worker".to_string()]);
    }

    #[test]
    fn load_diagram_merges_mermaid_source_with_its_metadata() {
        let root = tempfile::tempdir().unwrap();
        let worker_dir = root.path().join("worker");
        std::fs::create_dir_all(&worker_dir).unwrap();
        write(&worker_dir, "main.mmd", "stateDiagram-v2\n[*] --> idle");
        write(
            &worker_dir,
            "main.meta.json",
            r#"{"states":["idle","working"],"composites":[{"state":"working","diagram_name":"working-detail"}]}"#,
        );

        let store = DiagramStore::new(root.path().to_path_buf());
        let artifact = store.load_diagram("worker", "main").unwrap();
        assert!(artifact.mermaid.contains("stateDiagram-v2"));
        assert_eq!(artifact.metadata.states, vec!["idle", "working"]);
        assert_eq!(artifact.metadata.composites[0].diagram_name, "working-detail");
    }

    #[test]
    fn load_diagram_defaults_metadata_when_meta_file_is_absent() {
        let root = tempfile::tempdir().unwrap();
        let worker_dir = root.path().join("worker");
        std::fs::create_dir_all(&worker_dir).unwrap();
        write(&worker_dir, "main.mmd", "stateDiagram-v2");

        let store = DiagramStore::new(root.path().to_path_buf());
        let artifact = store.load_diagram("worker", "main").unwrap();
        assert_eq!(artifact.metadata, DiagramMetadata::default());
    }

    #[test]
    fn load_diagram_reports_not_found_for_missing_mermaid_file() {
        let root = tempfile::tempdir().unwrap();
        let store = DiagramStore::new(root.path().to_path_buf());
        let err = store.load_diagram("worker", "main").unwrap_err();
        assert!(matches!(err, DiagramError::NotFound(_)));
    }

    #[test]
    fn load_config_metadata_reads_the_aggregate_file() {
        let root = tempfile::tempdir().unwrap();
        let worker_dir = root.path().join("worker");
        std::fs::create_dir_all(&worker_dir).unwrap();
        write(&worker_dir, "metadata.json", r#"{"states":["idle","working","done"]}"#);

        let store = DiagramStore::new(root.path().to_path_buf());
        let metadata = store.load_config_metadata("worker").unwrap();
        assert_eq!(metadata.states, vec!["idle", "working", "done"]);
    }
}
