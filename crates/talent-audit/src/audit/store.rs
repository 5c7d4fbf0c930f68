use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use super::domain::{AuditEvent, AuditScope};

/// Storage abstraction so services can run against memory in tests and a file in production.
pub trait AuditSink: Send + Sync {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditStoreError>;
    /// Events for `scope`, newest first, at most `limit`.
    fn timeline(&self, scope: &AuditScope, limit: usize) -> Result<Vec<AuditEvent>, AuditStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditStoreError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
    #[error("audit store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit event could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn newest_first<'a>(
    events: impl DoubleEndedIterator<Item = &'a AuditEvent>,
    scope: &AuditScope,
    limit: usize,
) -> Vec<AuditEvent> {
    events
        .rev()
        .filter(|event| &event.scope == scope)
        .take(limit)
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, AuditStoreError> {
        Ok(self.events()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, AuditStoreError> {
        Ok(self.len()? == 0)
    }

    fn events(&self) -> Result<MutexGuard<'_, Vec<AuditEvent>>, AuditStoreError> {
        self.events
            .lock()
            .map_err(|_| AuditStoreError::Unavailable("audit log lock poisoned".to_string()))
    }
}

impl AuditSink for InMemoryAuditLog {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditStoreError> {
        self.events()?.push(event.clone());
        Ok(())
    }

    fn timeline(&self, scope: &AuditScope, limit: usize) -> Result<Vec<AuditEvent>, AuditStoreError> {
        let events = self.events()?;
        Ok(newest_first(events.iter(), scope, limit))
    }
}

/// One serde_json line per event, opened in append mode for every write.
///
/// Lines that fail to decode (a write cut short by a crash) are skipped on read.
#[derive(Debug)]
pub struct JsonLinesAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesAuditLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<AuditEvent>, AuditStoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut events = Vec::new();
        let mut skipped = 0usize;
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<AuditEvent>(&line) {
                Ok(event) => events.push(event),
                Err(err) => {
                    skipped += 1;
                    warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        error = %err,
                        "skipping undecodable audit log line"
                    );
                }
            }
        }
        if skipped > 0 {
            warn!(path = %self.path.display(), skipped, "audit log contains undecodable lines");
        }
        Ok(events)
    }
}

/// True when the file is non-empty and its last byte is not a newline.
fn missing_trailing_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl AuditSink for JsonLinesAuditLog {
    fn append(&self, event: &AuditEvent) -> Result<(), AuditStoreError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AuditStoreError::Unavailable("audit file lock poisoned".to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if missing_trailing_newline(&mut file)? {
            line.insert(0, b'\n');
        }
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }

    fn timeline(&self, scope: &AuditScope, limit: usize) -> Result<Vec<AuditEvent>, AuditStoreError> {
        let events = self.read_all()?;
        Ok(newest_first(events.iter(), scope, limit))
    }
}
