//! Object storage double that records every call.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::domain::ports::{ObjectStorage, ObjectStorageError, PresignedUrl};
use crate::domain::{ObjectKey, VideoContentType};

use super::failures::{Fault, FailureSwitch};

#[derive(Debug, Default)]
struct StorageLog {
    puts: Vec<(ObjectKey, String)>,
    gets: Vec<ObjectKey>,
    deletes: Vec<ObjectKey>,
    objects: HashSet<String>,
}

/// Issues URLs under `https://storage.test/` and remembers what it was asked.
///
/// Objects exist only after [`RecordingObjectStorage::put_object`], which
/// stands in for the client sending bytes to a write URL.
#[derive(Debug, Default)]
pub struct RecordingObjectStorage {
    log: Mutex<StorageLog>,
    failures: Arc<FailureSwitch>,
}

impl RecordingObjectStorage {
    pub fn new(failures: Arc<FailureSwitch>) -> Self {
        Self {
            log: Mutex::default(),
            failures,
        }
    }

    pub fn failures(&self) -> &FailureSwitch {
        &self.failures
    }

    pub fn put_object(&self, key: &ObjectKey) {
        self.lock().objects.insert(key.as_str().to_owned());
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.lock().objects.contains(key.as_str())
    }

    /// Keys and content types of issued write URLs, oldest first.
    pub fn presigned_puts(&self) -> Vec<(ObjectKey, String)> {
        self.lock().puts.clone()
    }

    pub fn presigned_gets(&self) -> Vec<ObjectKey> {
        self.lock().gets.clone()
    }

    pub fn deleted(&self) -> Vec<ObjectKey> {
        self.lock().deletes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StorageLog> {
        match self.log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn trip(&self, operation: &'static str) -> Result<(), ObjectStorageError> {
        match self.failures.tripped(operation) {
            None => Ok(()),
            Some(Fault::Unavailable) => Err(ObjectStorageError::connection(format!(
                "injected {operation} failure"
            ))),
            Some(Fault::Rejected) => Err(ObjectStorageError::rejected(
                403_u16,
                format!("injected {operation} failure"),
            )),
        }
    }

    fn url_for(
        method: &str,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError> {
        let raw = format!(
            "https://storage.test/{}?method={method}&expires={}",
            key.as_str(),
            expires_in.as_secs()
        );
        let url = Url::parse(&raw).map_err(|err| ObjectStorageError::signing(err.to_string()))?;
        Ok(PresignedUrl { url, expires_in })
    }
}

#[async_trait]
impl ObjectStorage for RecordingObjectStorage {
    async fn presign_put(
        &self,
        key: &ObjectKey,
        content_type: &VideoContentType,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError> {
        self.trip("storage.presign_put")?;
        let presigned = Self::url_for("PUT", key, expires_in)?;
        self.lock()
            .puts
            .push((key.clone(), content_type.as_str().to_owned()));
        Ok(presigned)
    }

    async fn presign_get(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError> {
        self.trip("storage.presign_get")?;
        let presigned = Self::url_for("GET", key, expires_in)?;
        self.lock().gets.push(key.clone());
        Ok(presigned)
    }

    async fn delete_object(&self, key: &ObjectKey) -> Result<(), ObjectStorageError> {
        self.trip("storage.delete_object")?;
        let mut log = self.lock();
        log.objects.remove(key.as_str());
        log.deletes.push(key.clone());
        Ok(())
    }
}
