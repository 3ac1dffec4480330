//! Track Source - supplies the routes vehicles drive.
//!
//! [`RouteSource`] is the seam: the emulator asks for up to `limit` routes and
//! receives them lazily, one `Result` per route so a single broken file does
//! not stop the others.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{InvalidRoute, Route, RouteFile};

/// Errors raised while loading routes.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The route directory could not be listed.
    #[error("Failed to read route directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A route file could not be read.
    #[error("Failed to read route file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A route file is not valid route JSON.
    #[error("Invalid route file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A route file has no coordinates.
    #[error("Route file {} has no coordinates", path.display())]
    Empty { path: PathBuf },

    /// A route point lies outside lat -90..=90 / lng -180..=180.
    #[error("Route file {} has point {index} outside the coordinate range", path.display())]
    OutOfRange { path: PathBuf, index: usize },
}

/// Lazy sequence of routes.
pub type RouteIter<'a> = Box<dyn Iterator<Item = Result<Route, RouteError>> + 'a>;

/// Provider of route definitions.
pub trait RouteSource {
    /// Yield up to `limit` routes; `0` means no limit.
    fn routes(&self, limit: usize) -> Result<RouteIter<'_>, RouteError>;
}

/// In-memory routes, mainly for embedding and tests.
impl RouteSource for Vec<Route> {
    fn routes(&self, limit: usize) -> Result<RouteIter<'_>, RouteError> {
        let take = if limit == 0 { usize::MAX } else { limit };
        Ok(Box::new(self.iter().take(take).cloned().map(Ok)))
    }
}

/// Loads `*.json` route files from a directory.
///
/// Each file is `{"name": ..., "coordinates": [[lat, lng], ...]}`; other
/// keys are ignored. Files are visited in name order.
#[derive(Debug, Clone)]
pub struct DirectoryRouteSource {
    dir: PathBuf,
}

impl DirectoryRouteSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn route_files(&self) -> Result<Vec<PathBuf>, RouteError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| RouteError::Directory {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl RouteSource for DirectoryRouteSource {
    fn routes(&self, limit: usize) -> Result<RouteIter<'_>, RouteError> {
        let take = if limit == 0 { usize::MAX } else { limit };
        let files = self.route_files()?;
        Ok(Box::new(files.into_iter().take(take).map(|path| load_route(&path))))
    }
}

/// Read and validate one route file.
pub fn load_route(path: &Path) -> Result<Route, RouteError> {
    let content = fs::read(path).map_err(|e| RouteError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: RouteFile = serde_json::from_slice(&content).map_err(|e| RouteError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Route::try_from(file).map_err(|e| match e {
        InvalidRoute::Empty => RouteError::Empty {
            path: path.to_path_buf(),
        },
        InvalidRoute::OutOfRange { index, .. } => RouteError::OutOfRange {
            path: path.to_path_buf(),
            index,
        },
    })
}
