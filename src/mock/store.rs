//! In-memory object store.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Mutex;

use crate::client::{ClientError, ClientResult, Location, ObjectStore};

use super::failure::{FailureConfig, FailureInjector, MockOp};
use super::Journal;

/// Object store keeping remote objects in memory
///
/// Local paths are real files, so uploads read from and downloads write to
/// the filesystem.
#[derive(Default)]
pub struct MockObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    failures: Mutex<FailureInjector>,
    journal: Journal,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn inject_failure(&self, op: MockOp, config: FailureConfig) {
        self.failures.lock().unwrap().inject(op, config);
    }

    pub fn put(&self, uri: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(uri.to_string(), bytes);
    }

    pub fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(uri).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    fn check_failure(&self, op: MockOp) -> ClientResult<()> {
        match self.failures.lock().unwrap().check(op) {
            Some(message) => Err(ClientError::Service(message)),
            None => Ok(()),
        }
    }

    fn read_remote(&self, uri: &str) -> ClientResult<Vec<u8>> {
        self.get(uri)
            .ok_or_else(|| ClientError::Service(format!("NoSuchKey: {} does not exist", uri)))
    }
}

impl ObjectStore for MockObjectStore {
    fn copy(&self, from: &Location, to: &Location) -> ClientResult<String> {
        match (from, to) {
            (Location::Local(path), Location::Remote(uri)) => {
                self.journal.record(format!("upload {}", uri));
                self.check_failure(MockOp::Copy)?;
                let bytes = fs::read(path)?;
                self.put(uri, bytes);
                Ok(format!("upload: {} to {}", path.display(), uri))
            }
            (Location::Remote(uri), Location::Local(path)) => {
                self.journal.record(format!("download {}", uri));
                self.check_failure(MockOp::Copy)?;
                let bytes = self.read_remote(uri)?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, bytes)?;
                Ok(format!("download: {} to {}", uri, path.display()))
            }
            (Location::Remote(source), Location::Remote(target)) => {
                self.journal.record(format!("copy {} {}", source, target));
                self.check_failure(MockOp::Copy)?;
                let bytes = self.read_remote(source)?;
                self.put(target, bytes);
                Ok(format!("copy: {} to {}", source, target))
            }
            (Location::Local(_), Location::Local(_)) => Err(ClientError::Service(
                "at least one side of a copy must be remote".to_string(),
            )),
        }
    }

    fn remove_recursive(&self, uri: &str) -> ClientResult<String> {
        self.journal.record(format!("remove {}", uri));
        self.check_failure(MockOp::Remove)?;

        let nested = format!("{}/", uri);
        let mut objects = self.objects.lock().unwrap();
        let doomed: Vec<String> = objects
            .keys()
            .filter(|key| key.as_str() == uri || key.starts_with(&nested))
            .cloned()
            .collect();
        for key in &doomed {
            objects.remove(key);
        }

        Ok(doomed
            .iter()
            .map(|key| format!("delete: {}", key))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
