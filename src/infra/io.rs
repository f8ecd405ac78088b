use memmap2::Mmap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, TypegenError};

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// File name used when no output path is configured
pub const DEFAULT_OUTPUT_FILE: &str = "index.d.ts";

pub enum FileContent {
    Mapped(Mmap),
    Buffered(String),
}

impl FileContent {
    /// Borrow the content as UTF-8 text
    pub fn as_str(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        match self {
            FileContent::Mapped(mmap) => std::str::from_utf8(mmap),
            FileContent::Buffered(s) => Ok(s.as_str()),
        }
    }
}

/// Read a source file, memory-mapping anything above 1 MiB.
pub fn read_file_smart<P: AsRef<Path>>(path: P) -> Result<FileContent> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| TypegenError::io(path, e))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = File::open(path).map_err(|e| TypegenError::io(path, e))?;

        // Safety: read-only mapping; the generator never writes sources
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| TypegenError::io(path, e))?;

        Ok(FileContent::Mapped(mmap))
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| TypegenError::io(path, e))?;
        Ok(FileContent::Buffered(content))
    }
}

/// Where generated declarations go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` or an explicit stdout flag select stdout; anything else is a path
    pub fn resolve(path: Option<PathBuf>, stdout: bool) -> Self {
        if stdout {
            return OutputTarget::Stdout;
        }
        match path {
            Some(p) if p.as_os_str() == "-" => OutputTarget::Stdout,
            Some(p) if !p.as_os_str().is_empty() => OutputTarget::File(p),
            _ => OutputTarget::File(default_output_path()),
        }
    }
}

/// `index.d.ts` next to the running executable, or in the working
/// directory when the executable path is unavailable.
pub fn default_output_path() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join(DEFAULT_OUTPUT_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        Err(_) => PathBuf::from(DEFAULT_OUTPUT_FILE),
    }
}

/// Write `content` to the target, creating parent directories as needed.
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let mut out = std::io::stdout().lock();
            out.write_all(content.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|source| TypegenError::Output { path: PathBuf::from("-"), source })
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|source| TypegenError::Output {
                    path: path.clone(),
                    source,
                })?;
            }
            std::fs::write(path, content).map_err(|source| TypegenError::Output {
                path: path.clone(),
                source,
            })
        }
    }
}
