// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON section-file reader

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::reader::{MeshReader, RawMesh};

/// Reads a [`RawMesh`] serialized as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMeshReader;

impl MeshReader for JsonMeshReader {
    fn read(&self, path: &Path) -> Result<RawMesh> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mesh file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse mesh file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_mesh_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{
                "coords": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                "tria_conn": [[1, 2, 3]],
                "surf_tria_ptr": [1, 2],
                "surf_quads_ptr": [1, 1],
                "surf_names": ["plate"]
            }}"#
        )?;

        let mesh = JsonMeshReader.read(file.path())?;
        assert_eq!(mesh.coords.len(), 3);
        assert_eq!(mesh.tria_conn, vec![[1, 2, 3]]);
        assert!(mesh.bars_conn.is_empty());
        assert_eq!(mesh.surf_names, vec!["plate".to_string()]);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = JsonMeshReader
            .read(Path::new("/nonexistent/mesh.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read mesh file"));
    }

    #[test]
    fn test_malformed_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{{ \"coords\": 12 }}")?;
        assert!(JsonMeshReader.read(file.path()).is_err());
        Ok(())
    }
}
