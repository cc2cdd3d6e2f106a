//! Rotating file sink
//!
//! Appends rendered records to a file and rotates it once it grows past a
//! size limit. Rotated files are named `<file>.1`, `<file>.2`, ... with `.1`
//! the newest, optionally gzipped to `<file>.N.gz`.

use crate::core::config::FileConfig;
use crate::core::{LoggerError, Result, Sink};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// When to rotate and what to keep
///
/// # Examples
///
/// ```
/// use fanout_logger::sinks::RotationPolicy;
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7)
///     .with_max_age(Some(Duration::from_secs(7 * 24 * 3600)))
///     .with_compression(true);
/// assert_eq!(policy.max_backups, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPolicy {
    /// Rotate before a write would push the active file past this size
    pub max_size_bytes: u64,
    /// Maximum number of rotated files to keep
    pub max_backups: usize,
    /// Rotated files older than this are deleted at rotation time
    pub max_age: Option<Duration>,
    /// Whether to gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: 10 * 1024 * 1024,
            max_backups: 5,
            max_age: Some(Duration::from_secs(28 * 24 * 3600)),
            compress: true,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Option<Duration>) -> Self {
        self.max_age = age;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

impl From<&FileConfig> for RotationPolicy {
    fn from(config: &FileConfig) -> Self {
        Self {
            max_size_bytes: config.max_size_bytes(),
            max_backups: config.max_backups,
            max_age: config.max_age(),
            compress: config.compress,
        }
    }
}

/// Size-rotated log file
///
/// # Examples
///
/// ```no_run
/// use fanout_logger::sinks::{RotatingFileSink, RotationPolicy};
///
/// let sink = RotatingFileSink::with_policy(
///     "/var/log/app.log",
///     RotationPolicy::new().with_max_size(1024 * 1024),
/// )
/// .unwrap();
/// ```
pub struct RotatingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    /// Counter for consecutive deletion failures (reset on successful deletion)
    deletion_failure_count: usize,
}

impl RotatingFileSink {
    /// Open (or create) `path` with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open (or create) `path` with a custom policy
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open_active(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            deletion_failure_count: 0,
        })
    }

    /// Open the sink described by a [`FileConfig`]
    pub fn from_config(config: &FileConfig) -> Result<Self> {
        Self::with_policy(&config.path, RotationPolicy::from(config))
    }

    fn open_active(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok((file, size))
    }

    fn should_rotate(&self, incoming: usize) -> bool {
        self.current_size > 0
            && self.current_size.saturating_add(incoming as u64) > self.policy.max_size_bytes
    }

    fn rotate(&mut self) -> Result<()> {
        // Release the handle before renaming the file underneath it
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        self.remove_overflow_backup()?;

        for i in (1..self.policy.max_backups).rev() {
            let (old_path, new_path) = (self.backup_path(i), self.backup_path(i + 1));
            let (old_gz, new_gz) = (gz_path(&old_path), gz_path(&new_path));

            if old_gz.exists() {
                shift(&old_gz, &new_gz)?;
            } else if old_path.exists() {
                shift(&old_path, &new_path)?;
            }
        }

        if self.base_path.exists() {
            if self.policy.max_backups == 0 {
                fs::remove_file(&self.base_path).map_err(|e| {
                    LoggerError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to discard full log file: {}", e),
                    )
                })?;
            } else {
                let backup = self.backup_path(1);
                fs::rename(&self.base_path, &backup).map_err(|e| {
                    LoggerError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to rotate current log file: {}", e),
                    )
                })?;

                if self.policy.compress {
                    compress_file(&backup)?;
                }
            }
        }

        self.prune_expired();

        let (file, size) = Self::open_active(&self.base_path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;

        Ok(())
    }

    /// Delete the backup that would fall off the end after shifting
    fn remove_overflow_backup(&mut self) -> Result<()> {
        const MAX_DELETION_FAILURES: usize = 5;

        let oldest = self.backup_path(self.policy.max_backups.max(1));
        let mut deletion_failed = false;

        for candidate in [gz_path(&oldest), oldest] {
            if !candidate.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&candidate) {
                deletion_failed = true;
                eprintln!(
                    "[WARN] Failed to remove oldest backup {}: {} (failure #{}/{})",
                    candidate.display(),
                    e,
                    self.deletion_failure_count + 1,
                    MAX_DELETION_FAILURES
                );
            }
        }

        if !deletion_failed {
            self.deletion_failure_count = 0;
            return Ok(());
        }

        self.deletion_failure_count += 1;
        if self.deletion_failure_count >= MAX_DELETION_FAILURES {
            return Err(LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!(
                    "Rotation aborted: failed to delete old backup files {} consecutive times",
                    self.deletion_failure_count
                ),
            ));
        }
        Ok(())
    }

    /// Delete rotated files whose modification time is past `max_age`
    fn prune_expired(&self) {
        let Some(max_age) = self.policy.max_age else {
            return;
        };
        let now = SystemTime::now();

        for i in 1..=self.policy.max_backups {
            let plain = self.backup_path(i);
            for candidate in [gz_path(&plain), plain] {
                let expired = fs::metadata(&candidate)
                    .and_then(|m| m.modified())
                    .map(|modified| now.duration_since(modified).unwrap_or_default() > max_age)
                    .unwrap_or(false);

                if expired {
                    if let Err(e) = fs::remove_file(&candidate) {
                        eprintln!(
                            "[WARN] Failed to remove expired backup {}: {}",
                            candidate.display(),
                            e
                        );
                    }
                }
            }
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string();
        path.set_file_name(format!("{}.{}", filename, index));
        path
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

/// `app.log.1` -> `app.log.1.gz`
fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

fn shift(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // Some platforms refuse to rename over an existing file
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).map_err(|e| {
        LoggerError::file_rotation(
            from.display().to_string(),
            format!("Failed to rotate backup file: {}", e),
        )
    })
}

/// Gzip `path` into `path.gz`, removing the original only once the archive
/// is complete
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let gz = gz_path(path);
    let mut tmp_name = gz.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&tmp).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", tmp.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = (|| -> std::io::Result<()> {
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            encoder.write_all(&buffer[..n])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = streamed.and_then(|()| fs::rename(&tmp, &gz)) {
        let _ = fs::remove_file(&tmp);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

impl Sink for RotatingFileSink {
    fn write(&mut self, record: &[u8]) -> Result<usize> {
        if self.should_rotate(record.len()) {
            if let Err(e) = self.rotate() {
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);

                if self.writer.is_none() {
                    let (file, size) = Self::open_active(&self.base_path).map_err(|reopen| {
                        eprintln!(
                            "[LOGGER ERROR] Failed to reopen log file after rotation failure: {}",
                            reopen
                        );
                        e
                    })?;
                    self.writer = Some(BufWriter::new(file));
                    self.current_size = size;
                }

                // Let the file grow past the limit instead of retrying every write
                self.current_size = 0;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;

        writer.write_all(record).map_err(|e| {
            LoggerError::file_sink(
                self.base_path.display().to_string(),
                format!("Failed to write log record: {}", e),
            )
        })?;
        self.current_size += record.len() as u64;

        Ok(record.len())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    fn record(i: usize) -> Vec<u8> {
        format!("{{\"level\":\"INFO\",\"message\":\"entry {:03}\"}}\n", i).into_bytes()
    }

    fn backups(dir: &Path, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(prefix) && n != prefix)
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_policy_from_file_config() {
        let config = FileConfig {
            max_size_mb: 2,
            max_backups: 3,
            max_age_days: 0,
            compress: false,
            ..FileConfig::default()
        };
        let policy = RotationPolicy::from(&config);
        assert_eq!(policy.max_size_bytes, 2 * 1024 * 1024);
        assert_eq!(policy.max_backups, 3);
        assert_eq!(policy.max_age, None);
        assert!(!policy.compress);
        assert_eq!(RotationPolicy::default().max_backups, 5);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.log");

        let sink = RotatingFileSink::new(&path).unwrap();
        assert_eq!(sink.path(), path);
        assert_eq!(sink.current_size(), 0);
        assert!(path.exists());
    }

    #[test]
    fn test_records_are_written_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.log");
        let mut sink = RotatingFileSink::new(&path).unwrap();

        sink.write(b"{\"a\":1}\n").unwrap();
        sink.write(b"INFO: plain line\n").unwrap();
        sink.flush().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\"a\":1}\nINFO: plain line\n"
        );
    }

    #[test]
    fn test_rotation_keeps_records_whole() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rotation.log");
        let policy = RotationPolicy::new()
            .with_max_size(200)
            .with_max_backups(3)
            .with_compression(false);
        let mut sink = RotatingFileSink::with_policy(&path, policy).unwrap();

        for i in 0..12 {
            sink.write(&record(i)).unwrap();
        }
        sink.flush().unwrap();

        assert!(path.with_file_name("rotation.log.1").exists());
        assert!(fs::metadata(&path).unwrap().len() <= 200);

        let newest_backup = fs::read_to_string(path.with_file_name("rotation.log.1")).unwrap();
        assert!(newest_backup.ends_with('\n'));
        for line in newest_backup.lines() {
            assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
        }
    }

    #[test]
    fn test_backup_count_is_bounded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.log");
        let policy = RotationPolicy::new()
            .with_max_size(60)
            .with_max_backups(2)
            .with_compression(false);
        let mut sink = RotatingFileSink::with_policy(&path, policy).unwrap();

        for i in 0..50 {
            sink.write(&record(i)).unwrap();
        }
        sink.flush().unwrap();

        assert_eq!(backups(dir.path(), "multi.log"), vec!["multi.log.1", "multi.log.2"]);
    }

    #[test]
    fn test_compressed_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gz.log");
        let policy = RotationPolicy::new()
            .with_max_size(100)
            .with_max_backups(2)
            .with_compression(true);
        let mut sink = RotatingFileSink::with_policy(&path, policy).unwrap();

        for i in 0..10 {
            sink.write(&record(i)).unwrap();
        }
        sink.flush().unwrap();

        let names = backups(dir.path(), "gz.log");
        assert_eq!(names, vec!["gz.log.1.gz", "gz.log.2.gz"]);

        let mut decoded = String::new();
        GzDecoder::new(File::open(dir.path().join("gz.log.1.gz")).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.contains("entry"));
    }

    #[test]
    fn test_zero_backups_discards_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nobackup.log");
        let policy = RotationPolicy::new()
            .with_max_size(60)
            .with_max_backups(0)
            .with_compression(false);
        let mut sink = RotatingFileSink::with_policy(&path, policy).unwrap();

        for i in 0..5 {
            sink.write(&record(i)).unwrap();
        }
        sink.flush().unwrap();

        assert!(backups(dir.path(), "nobackup.log").is_empty());
        assert!(fs::read_to_string(&path).unwrap().contains("entry 004"));
    }

    #[test]
    fn test_expired_backups_are_pruned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aged.log");
        let policy = RotationPolicy::new()
            .with_max_size(60)
            .with_max_backups(5)
            .with_max_age(Some(Duration::ZERO))
            .with_compression(false);
        let mut sink = RotatingFileSink::with_policy(&path, policy).unwrap();

        for i in 0..6 {
            sink.write(&record(i)).unwrap();
        }
        std::thread::sleep(Duration::from_millis(20));
        sink.write(&record(99)).unwrap();
        sink.flush().unwrap();

        // Every backup was older than zero at the last rotation
        assert!(backups(dir.path(), "aged.log").len() <= 1);
    }

    #[test]
    fn test_reopen_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("append.log");
        fs::write(&path, "existing\n").unwrap();

        let mut sink = RotatingFileSink::new(&path).unwrap();
        assert_eq!(sink.current_size(), 9);
        sink.write(b"new\n").unwrap();
        drop(sink);

        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nnew\n");
    }
}
