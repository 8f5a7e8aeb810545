//! Hierarchical on-disk tile store
//!
//! Tiles are persisted one file per address under
//! `<root>/<zoom>/<x>/<y>.<ext>`. Directories are created on demand and
//! the tree is append-only within a run; each tile maps to a unique path,
//! so concurrent writers never collide. Re-running a sync overwrites
//! files in place.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::coord::TileCoord;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create a tile's parent directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// Failed to write a tile file.
    #[error("failed to write {path}: {source}")]
    WriteFile { path: PathBuf, source: io::Error },

    /// Failed to traverse the store tree.
    #[error("failed to scan store at {path}: {source}")]
    Scan { path: PathBuf, source: io::Error },

    /// Failed to delete a tile file.
    #[error("failed to delete {path}: {source}")]
    Delete { path: PathBuf, source: io::Error },
}

/// Aggregate size of a store tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of tile files present.
    pub files: u64,
    /// Total bytes across all tile files.
    pub bytes: u64,
}

/// Outcome of clearing a store tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearResult {
    /// Number of files deleted.
    pub files_deleted: u64,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

/// Write-side handle to the hierarchical tile cache.
#[derive(Debug, Clone)]
pub struct TileStore {
    root: PathBuf,
    extension: String,
}

impl TileStore {
    /// Creates a store rooted at `root`, writing files with `extension`.
    ///
    /// The root directory itself is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path a tile is stored at: `<root>/<zoom>/<x>/<y>.<ext>`.
    pub fn tile_path(&self, tile: TileCoord) -> PathBuf {
        self.root
            .join(tile.zoom.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.{}", tile.y, self.extension))
    }

    /// Writes a tile's bytes, creating intermediate directories.
    ///
    /// An existing file at the same address is overwritten. Returns the
    /// number of bytes written.
    pub async fn write(&self, tile: TileCoord, bytes: &[u8]) -> Result<u64, StoreError> {
        let path = self.tile_path(tile);

        // Parent always exists for a tile path by construction.
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::WriteFile {
                path: path.clone(),
                source,
            })?;

        debug!(tile = %tile, path = %path.display(), bytes = bytes.len(), "Tile written");
        Ok(bytes.len() as u64)
    }

    /// Counts files and bytes under the store root.
    ///
    /// A missing root reads as an empty store.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();
        if self.root.exists() {
            visit_files(&self.root, &mut |_path, len| {
                stats.files += 1;
                stats.bytes += len;
                Ok(())
            })?;
        }
        Ok(stats)
    }

    /// Deletes every file under the store root.
    ///
    /// Directories are left in place; a subsequent sync reuses them.
    pub fn clear(&self) -> Result<ClearResult, StoreError> {
        let mut result = ClearResult::default();
        if self.root.exists() {
            visit_files(&self.root, &mut |path, len| {
                std::fs::remove_file(path).map_err(|source| StoreError::Delete {
                    path: path.to_path_buf(),
                    source,
                })?;
                result.files_deleted += 1;
                result.bytes_freed += len;
                Ok(())
            })?;
        }
        Ok(result)
    }
}

/// Depth-first walk applying `f` to every regular file.
fn visit_files(
    dir: &Path,
    f: &mut dyn FnMut(&Path, u64) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    let entries = std::fs::read_dir(dir).map_err(|source| StoreError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            visit_files(&path, f)?;
        } else {
            let len = entry
                .metadata()
                .map_err(|source| StoreError::Scan {
                    path: path.clone(),
                    source,
                })?
                .len();
            f(&path, len)?;
        }
    }
    Ok(())
}
