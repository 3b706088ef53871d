// AppStart - platform/rotating_file.rs
//
// Size-bounded rotating log file.
//
// Generations:
//   - A generation counter `g` only ever increases. Generation `g` is written
//     to slot `g % max_generations`, i.e. the file named by substituting the
//     slot into the pattern (`appstart.%g.log` -> `appstart.3.log`).
//   - Before appending, if the current file is non-empty and the record would
//     take it past `max_bytes`, the next generation begins. Its slot is
//     truncated, which evicts the oldest retained generation (FIFO).
//   - Each record is written with one `write_all` and flushed before the lock
//     is released, so records in earlier generations are never lost.
//   - The counter is recorded in a small sidecar file after every rotation.
//     On open it is read back and that generation is resumed. Without a
//     usable sidecar the most recently modified slot file is resumed instead.
//
// All file state sits behind one mutex private to this sink; other sinks never
// wait on it.

use crate::core::model::{LogEvent, Severity};
use crate::core::registry::LogSink;
use crate::util::constants;
use crate::util::error::SinkError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

/// Settings for a [`RotatingFileSink`].
#[derive(Debug, Clone)]
pub struct RotatingFileConfig {
    /// Directory holding every generation.
    pub dir: PathBuf,
    /// File name pattern containing `%g`.
    pub file_name_pattern: String,
    /// Name of the file in `dir` recording the current generation.
    pub generation_file_name: String,
    /// Number of generations retained on disk.
    pub max_generations: u64,
    /// Size at which a new generation begins.
    pub max_bytes: u64,
    /// Events below this severity are ignored.
    pub min_severity: Severity,
}

impl RotatingFileConfig {
    /// Defaults for the debug profile, rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name_pattern: constants::LOG_FILE_NAME_PATTERN.to_string(),
            generation_file_name: constants::LOG_GENERATION_FILE_NAME.to_string(),
            max_generations: constants::LOG_FILE_GENERATIONS,
            max_bytes: constants::DEFAULT_LOG_FILE_MAX_BYTES,
            min_severity: Severity::Debug,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Path of the file backing `slot`.
    pub fn slot_path(&self, slot: u64) -> PathBuf {
        self.dir.join(
            self.file_name_pattern
                .replace(constants::GENERATION_PLACEHOLDER, &slot.to_string()),
        )
    }

    /// Path of the generation sidecar file.
    pub fn generation_path(&self) -> PathBuf {
        self.dir.join(&self.generation_file_name)
    }

    fn validate(&self) -> Result<(), SinkError> {
        let reason = if !self.file_name_pattern.contains(constants::GENERATION_PLACEHOLDER) {
            Some(format!(
                "file name pattern '{}' has no '{}' placeholder",
                self.file_name_pattern,
                constants::GENERATION_PLACEHOLDER
            ))
        } else if self.max_generations == 0 {
            Some("at least one generation must be retained".to_string())
        } else if self.max_bytes == 0 {
            Some("size threshold must be non-zero".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(SinkError::InvalidConfig {
                sink: RotatingFileSink::NAME,
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Mutable state of the current generation.
#[derive(Debug)]
struct FileState {
    generation: u64,
    path: PathBuf,
    file: File,
    size: u64,
}

/// Debug-profile sink appending formatted events to a bounded series of files.
#[derive(Debug)]
pub struct RotatingFileSink {
    config: RotatingFileConfig,
    state: Mutex<FileState>,
}

impl RotatingFileSink {
    pub const NAME: &'static str = "rotating-file";

    /// Create the directory if needed and open the generation to append to.
    pub fn open(config: RotatingFileConfig) -> Result<Self, SinkError> {
        config.validate()?;
        std::fs::create_dir_all(&config.dir).map_err(|source| SinkError::Io {
            path: config.dir.clone(),
            operation: "create log directory",
            source,
        })?;

        let generation = match load_generation(&config) {
            Some(generation) => generation,
            None => {
                let generation = newest_slot(&config).unwrap_or(0);
                if let Err(e) = store_generation(&config, generation) {
                    tracing::warn!(error = %e, "Could not record log file generation");
                }
                generation
            }
        };
        let path = config.slot_path(generation % config.max_generations);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                operation: "open log file",
                source,
            })?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);

        tracing::debug!(
            path = %path.display(),
            generation,
            size,
            max_bytes = config.max_bytes,
            "Rotating log file opened"
        );

        Ok(Self {
            config,
            state: Mutex::new(FileState {
                generation,
                path,
                file,
                size,
            }),
        })
    }

    pub fn config(&self) -> &RotatingFileConfig {
        &self.config
    }

    /// Generation currently being written.
    pub fn current_generation(&self) -> u64 {
        self.lock().generation
    }

    /// Path of the file currently being written.
    pub fn current_path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        // A panic while holding the lock leaves at worst a partial line.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start generation `state.generation + 1`, truncating its slot.
    fn rotate(&self, state: &mut FileState) -> Result<(), SinkError> {
        let next = state.generation + 1;
        let slot = next % self.config.max_generations;
        let path = self.config.slot_path(slot);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                operation: "rotate log file",
                source,
            })?;
        // The new slot is already truncated; a stale counter only means the
        // next restart resumes one generation early.
        if let Err(e) = store_generation(&self.config, next) {
            tracing::warn!(error = %e, generation = next, "Could not record log file generation");
        }

        tracing::debug!(
            from = %state.path.display(),
            to = %path.display(),
            generation = next,
            "Log file rotated"
        );

        state.generation = next;
        state.path = path;
        state.file = file;
        state.size = 0;
        Ok(())
    }
}

impl LogSink for RotatingFileSink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handle(&self, event: &LogEvent) -> Result<(), SinkError> {
        if event.severity < self.config.min_severity {
            return Ok(());
        }
        let mut record = event.format_line();
        record.push('\n');
        let len = record.len() as u64;

        let mut state = self.lock();
        if state.size > 0 && state.size + len > self.config.max_bytes {
            self.rotate(&mut state)?;
        }

        let state = &mut *state;
        state
            .file
            .write_all(record.as_bytes())
            .and_then(|()| state.file.flush())
            .map_err(|source| SinkError::Io {
                path: state.path.clone(),
                operation: "append",
                source,
            })?;
        state.size += len;
        Ok(())
    }
}

/// Generation recorded in the sidecar file, if present and well-formed.
fn load_generation(config: &RotatingFileConfig) -> Option<u64> {
    let path = config.generation_path();
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read log file generation");
            return None;
        }
    };
    match content.trim().parse() {
        Ok(generation) => Some(generation),
        Err(_) => {
            tracing::warn!(
                path = %path.display(),
                content = %content.trim(),
                "Ignoring malformed log file generation"
            );
            None
        }
    }
}

/// Atomically replace the sidecar with `generation`.
fn store_generation(config: &RotatingFileConfig, generation: u64) -> Result<(), SinkError> {
    let path = config.generation_path();
    let tmp = path.with_extension("generation.tmp");
    std::fs::write(&tmp, generation.to_string())
        .and_then(|()| std::fs::rename(&tmp, &path))
        .map_err(|source| SinkError::Io {
            path,
            operation: "record log generation",
            source,
        })
}

/// Slot of the most recently modified existing generation file, if any.
fn newest_slot(config: &RotatingFileConfig) -> Option<u64> {
    (0..config.max_generations)
        .filter_map(|slot| {
            let modified = modified_time(&config.slot_path(slot))?;
            Some((modified, slot))
        })
        .max()
        .map(|(_, slot)| slot)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    metadata.modified().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::LogRegistry;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(dir: &Path, max_bytes: u64) -> RotatingFileConfig {
        RotatingFileConfig::new(dir).with_max_bytes(max_bytes)
    }

    fn existing_slots(config: &RotatingFileConfig) -> Vec<u64> {
        (0..config.max_generations)
            .filter(|s| config.slot_path(*s).exists())
            .collect()
    }

    #[test]
    fn test_slot_path_substitutes_generation() {
        let c = RotatingFileConfig::new("/data/logs");
        assert_eq!(c.slot_path(3), PathBuf::from("/data/logs/appstart.3.log"));
    }

    #[test]
    fn test_pattern_without_placeholder_rejected() {
        let dir = TempDir::new().unwrap();
        let mut c = config(dir.path(), 1024);
        c.file_name_pattern = "appstart.log".to_string();
        assert!(matches!(
            RotatingFileSink::open(c),
            Err(SinkError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_events_below_debug_are_skipped() {
        let dir = TempDir::new().unwrap();
        let sink = RotatingFileSink::open(config(dir.path(), 1024)).unwrap();

        sink.handle(&LogEvent::new(Severity::Verbose, "T", "too chatty"))
            .unwrap();
        sink.handle(&LogEvent::new(Severity::Debug, "T", "kept")).unwrap();

        let content = std::fs::read_to_string(sink.current_path()).unwrap();
        assert!(!content.contains("too chatty"));
        assert!(content.contains("D/T: kept"));
    }

    #[test]
    fn test_crossing_threshold_starts_new_generation_without_loss() {
        let dir = TempDir::new().unwrap();
        let sink = RotatingFileSink::open(config(dir.path(), 200)).unwrap();

        sink.handle(&LogEvent::new(Severity::Info, "T", "x".repeat(120)))
            .unwrap();
        assert_eq!(sink.current_generation(), 0);
        sink.handle(&LogEvent::new(Severity::Info, "T", "y".repeat(120)))
            .unwrap();
        assert_eq!(sink.current_generation(), 1);

        let first = std::fs::read_to_string(dir.path().join("appstart.0.log")).unwrap();
        let second = std::fs::read_to_string(dir.path().join("appstart.1.log")).unwrap();
        assert!(first.contains(&"x".repeat(120)));
        assert!(second.contains(&"y".repeat(120)));
        assert!(!first.contains('y'));
    }

    #[test]
    fn test_oversized_record_into_empty_file_does_not_rotate() {
        let dir = TempDir::new().unwrap();
        let sink = RotatingFileSink::open(config(dir.path(), 16)).unwrap();

        sink.handle(&LogEvent::new(Severity::Info, "T", "longer than sixteen bytes"))
            .unwrap();
        assert_eq!(sink.current_generation(), 0);
    }

    #[test]
    fn test_eleven_crossings_keep_ten_generations_fifo() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path(), 64);
        let sink = RotatingFileSink::open(c.clone()).unwrap();

        // Each record alone exceeds half the threshold, so every write after
        // the first crosses it: 12 writes -> generations 0..=11.
        for i in 0..12 {
            let msg = format!("event-{i:02} {}", "z".repeat(40));
            sink.handle(&LogEvent::new(Severity::Info, "Rotate", msg))
                .unwrap();
        }

        assert_eq!(sink.current_generation(), 11);
        assert_eq!(existing_slots(&c), (0..10).collect::<Vec<_>>());

        let all: String = (0..10)
            .map(|s| std::fs::read_to_string(c.slot_path(s)).unwrap())
            .collect();
        assert!(!all.contains("event-00"), "oldest generation evicted first");
        assert!(!all.contains("event-01"));
        for i in 2..12 {
            assert!(all.contains(&format!("event-{i:02}")), "event-{i:02} lost");
        }
        // Slot 0 now holds generation 10, slot 1 holds generation 11.
        let slot0 = std::fs::read_to_string(c.slot_path(0)).unwrap();
        assert!(slot0.contains("event-10"));
    }

    #[test]
    fn test_reopen_after_burst_continues_fifo_order() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path(), 64);
        {
            let sink = RotatingFileSink::open(c.clone()).unwrap();
            for i in 0..12 {
                let msg = format!("event-{i:02} {}", "z".repeat(40));
                sink.handle(&LogEvent::new(Severity::Info, "T", msg)).unwrap();
            }
            assert_eq!(sink.current_generation(), 11);
        }
        // Slot files from one burst usually share an mtime, so only the
        // recorded counter identifies the newest generation.
        assert_eq!(std::fs::read_to_string(c.generation_path()).unwrap(), "11");

        let reopened = RotatingFileSink::open(c.clone()).unwrap();
        assert_eq!(reopened.current_generation(), 11);
        assert_eq!(reopened.current_path(), c.slot_path(1));

        let msg = format!("event-12 {}", "z".repeat(40));
        reopened
            .handle(&LogEvent::new(Severity::Info, "T", msg))
            .unwrap();
        assert_eq!(reopened.current_generation(), 12);

        let all: String = (0..10)
            .map(|s| std::fs::read_to_string(c.slot_path(s)).unwrap())
            .collect();
        assert!(!all.contains("event-02"), "oldest generation evicted first");
        for i in 3..13 {
            assert!(all.contains(&format!("event-{i:02}")), "event-{i:02} lost");
        }
    }

    #[test]
    fn test_missing_generation_file_resumes_newest_slot() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path(), 64);
        {
            let sink = RotatingFileSink::open(c.clone()).unwrap();
            for i in 0..5 {
                let msg = format!("event-{i} {}", "z".repeat(40));
                sink.handle(&LogEvent::new(Severity::Info, "T", msg)).unwrap();
            }
        }
        std::fs::remove_file(c.generation_path()).unwrap();
        let newest = File::options().write(true).open(c.slot_path(4)).unwrap();
        newest
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        let reopened = RotatingFileSink::open(c.clone()).unwrap();
        assert_eq!(reopened.current_generation(), 4);
        assert_eq!(std::fs::read_to_string(c.generation_path()).unwrap(), "4");
    }

    #[test]
    fn test_malformed_generation_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path(), 64);
        std::fs::write(c.generation_path(), "not a number").unwrap();

        let sink = RotatingFileSink::open(c.clone()).unwrap();
        assert_eq!(sink.current_generation(), 0);
        assert_eq!(std::fs::read_to_string(c.generation_path()).unwrap(), "0");
    }

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl LogSink for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn handle(&self, event: &LogEvent) -> Result<(), SinkError> {
            self.0.lock().unwrap().push(event.message.clone());
            Ok(())
        }
    }

    #[test]
    fn test_failed_rotation_drops_event_for_file_sink_only() {
        let dir = TempDir::new().unwrap();
        let c = config(dir.path(), 64);
        // A directory at the next slot path makes the rotation open fail.
        std::fs::create_dir(c.slot_path(1)).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = LogRegistry::new();
        registry.plant(Box::new(RotatingFileSink::open(c.clone()).unwrap()));
        registry.plant(Box::new(Recorder(Arc::clone(&seen))));

        let record = |label: &str| format!("{label} {}", "z".repeat(40));
        registry.info("T", record("before"));
        registry.info("T", record("during"));

        assert_eq!(registry.failure_count(), 1);
        assert_eq!(seen.lock().unwrap().len(), 2, "other sinks still receive the event");
        let slot0 = std::fs::read_to_string(c.slot_path(0)).unwrap();
        assert!(slot0.contains("before"));
        assert!(!slot0.contains("during"));

        std::fs::remove_dir(c.slot_path(1)).unwrap();
        registry.info("T", record("after"));

        assert_eq!(registry.failure_count(), 1);
        assert_eq!(seen.lock().unwrap().len(), 3);
        let slot1 = std::fs::read_to_string(c.slot_path(1)).unwrap();
        assert!(slot1.contains("after"));
        assert_eq!(std::fs::read_to_string(c.generation_path()).unwrap(), "1");
    }

    #[test]
    fn test_concurrent_appends_are_whole_lines() {
        let dir = TempDir::new().unwrap();
        let sink = std::sync::Arc::new(RotatingFileSink::open(config(dir.path(), 1 << 20)).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = std::sync::Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        sink.handle(&LogEvent::new(Severity::Info, "T", format!("t{t} line {i}")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let content = std::fs::read_to_string(sink.current_path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 100);
        assert!(lines.iter().all(|l| l.contains(" I/T: t")));
    }
}
