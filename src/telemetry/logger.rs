//! JSON Lines burst log with size-based rotation and file retention.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::BurstSummary;
use crate::error::Result;

/// File name prefix of burst log files
const FILE_PREFIX: &str = "bursts_";
const FILE_EXTENSION: &str = "jsonl";

/// Rotating JSONL writer for [`BurstSummary`] records
#[derive(Debug)]
pub struct BurstLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    file_seq: u64,
}

impl BurstLogger {
    /// Create the log directory if needed. No file is opened until the
    /// first record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RadarError::Io`] if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>, max_records_per_file: usize, max_files_to_keep: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("Burst log directory: {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
            file_seq: 0,
        })
    }

    /// Append one summary as a JSON line, rotating first if the file is full.
    pub fn log(&mut self, summary: &BurstSummary) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, summary)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    /// File currently being written.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            self.file_seq,
            FILE_EXTENSION
        );
        self.file_seq += 1;

        let path = self.dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened burst log {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    /// Delete the oldest log files beyond the retention limit.
    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed old burst log {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(())
    }
}

/// Burst log files in `dir`, unordered.
fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let files = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let is_log = path.extension().map_or(false, |ext| ext == FILE_EXTENSION);
            let has_prefix = path
                .file_name()
                .map_or(false, |name| name.to_string_lossy().starts_with(FILE_PREFIX));
            is_log && has_prefix
        })
        .collect();
    Ok(files)
}
