//! Input sources for table readers.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ReadError, Result};

/// Where a read's input comes from.
///
/// Paths are not opened until a reader consumes the source, so resolving a
/// format never performs I/O.
pub enum ReadSource<'a> {
    /// A file on disk.
    Path(PathBuf),
    /// Bytes already in memory.
    Bytes(Vec<u8>),
    /// Any readable stream.
    Reader(Box<dyn Read + 'a>),
}

impl<'a> ReadSource<'a> {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn reader(reader: impl Read + 'a) -> Self {
        Self::Reader(Box::new(reader))
    }

    /// Metadata used to identify the format of this source.
    pub fn origin(&self) -> SourceOrigin<'_> {
        match self {
            Self::Path(path) => SourceOrigin {
                path: Some(path.as_path()),
            },
            Self::Bytes(_) | Self::Reader(_) => SourceOrigin { path: None },
        }
    }

    /// Human-readable name for messages.
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(_) => "<bytes>".to_string(),
            Self::Reader(_) => "<stream>".to_string(),
        }
    }

    /// Reads the whole source into memory.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Path(path) => read_file(&path),
            Self::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader
                    .read_to_end(&mut bytes)
                    .map_err(|e| ReadError::Io {
                        source_name: "<stream>".to_string(),
                        source: e,
                    })?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Debug for ReadSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// What a reader may inspect to claim a source without reading it.
#[derive(Debug, Clone, Copy)]
pub struct SourceOrigin<'a> {
    pub path: Option<&'a Path>,
}

impl SourceOrigin<'_> {
    /// Lowercased file extension, if the source is a path with one.
    pub fn extension(&self) -> Option<String> {
        self.path?
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReadError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ReadError::Io {
                source_name: path.display().to_string(),
                source: e,
            }
        }
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| ReadError::Io {
        source_name: path.display().to_string(),
        source: e,
    })?;
    Ok(bytes)
}
