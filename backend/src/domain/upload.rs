//! Video proof uploads and their storage keys.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AssignmentId, UploadId, UserId};

const KEY_ROOT: &str = "uploads";

/// Validation errors for upload metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadValidationError {
    NotVideo { input: String },
    EmptyFileName,
    EmptyFile,
    MalformedKey { input: String },
    ForeignKey { key: String },
}

impl fmt::Display for UploadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotVideo { input } => write!(f, "content type is not a video type: {input}"),
            Self::EmptyFileName => write!(f, "file name must not be empty"),
            Self::EmptyFile => write!(f, "file size must be positive"),
            Self::MalformedKey { input } => write!(f, "object key is malformed: {input}"),
            Self::ForeignKey { key } => {
                write!(f, "object key {key} was not issued for this assignment")
            }
        }
    }
}

impl std::error::Error for UploadValidationError {}

/// A `video/*` MIME type, lower-cased, without parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoContentType(String);

impl VideoContentType {
    /// Accept any `video/<subtype>` value, ignoring case and parameters.
    pub fn parse(raw: &str) -> Result<Self, UploadValidationError> {
        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.strip_prefix("video/") {
            Some(subtype) if !subtype.is_empty() && !subtype.contains('/') => Ok(Self(essence)),
            _ => Err(UploadValidationError::NotVideo {
                input: raw.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// File extension derived from the subtype, for example `mp4`.
    pub fn extension(&self) -> String {
        let subtype = self.0.strip_prefix("video/").unwrap_or_default();
        let cleaned: String = subtype
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        if cleaned.is_empty() {
            "bin".to_owned()
        } else {
            cleaned
        }
    }
}

impl fmt::Display for VideoContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key of an uploaded object.
///
/// Issued keys have the shape `uploads/{client}/{assignment}/{token}.{ext}`,
/// so a key names the only (client, assignment) pair it may be confirmed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Issue a fresh key for one upload attempt.
    pub fn issue(
        client_id: &UserId,
        assignment_id: &AssignmentId,
        content_type: &VideoContentType,
    ) -> Self {
        Self(format!(
            "{KEY_ROOT}/{client_id}/{assignment_id}/{token}.{ext}",
            token = Uuid::new_v4(),
            ext = content_type.extension(),
        ))
    }

    /// Accept a caller-supplied or stored key.
    pub fn parse(raw: &str) -> Result<Self, UploadValidationError> {
        let malformed = || UploadValidationError::MalformedKey {
            input: raw.to_owned(),
        };
        let segments: Vec<&str> = raw.split('/').collect();
        let [root, client, assignment, file] = segments.as_slice() else {
            return Err(malformed());
        };
        if *root != KEY_ROOT
            || Uuid::parse_str(client).is_err()
            || Uuid::parse_str(assignment).is_err()
            || file.is_empty()
            || file.starts_with('.')
            || !file
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
        {
            return Err(malformed());
        }
        Ok(Self(raw.to_owned()))
    }

    /// True when this key was issued for `client_id` and `assignment_id`.
    pub fn is_scoped_to(&self, client_id: &UserId, assignment_id: &AssignmentId) -> bool {
        self.0
            .starts_with(&format!("{KEY_ROOT}/{client_id}/{assignment_id}/"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input payload for [`Upload::new`].
#[derive(Debug, Clone)]
pub struct UploadDraft {
    pub id: UploadId,
    pub assignment_id: AssignmentId,
    pub client_id: UserId,
    /// Copied from the workout when the upload is confirmed.
    pub trainer_id: UserId,
    pub object_key: ObjectKey,
    pub file_name: String,
    pub content_type: VideoContentType,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Metadata describing one object placed in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    id: UploadId,
    assignment_id: AssignmentId,
    client_id: UserId,
    trainer_id: UserId,
    object_key: ObjectKey,
    file_name: String,
    content_type: VideoContentType,
    size_bytes: u64,
    uploaded_at: DateTime<Utc>,
}

impl Upload {
    /// Validate a draft into an upload record.
    pub fn new(draft: UploadDraft) -> Result<Self, UploadValidationError> {
        let UploadDraft {
            id,
            assignment_id,
            client_id,
            trainer_id,
            object_key,
            file_name,
            content_type,
            size_bytes,
            uploaded_at,
        } = draft;

        let file_name = file_name.trim().to_owned();
        if file_name.is_empty() {
            return Err(UploadValidationError::EmptyFileName);
        }
        if size_bytes == 0 {
            return Err(UploadValidationError::EmptyFile);
        }
        if !object_key.is_scoped_to(&client_id, &assignment_id) {
            return Err(UploadValidationError::ForeignKey {
                key: object_key.to_string(),
            });
        }

        Ok(Self {
            id,
            assignment_id,
            client_id,
            trainer_id,
            object_key,
            file_name,
            content_type,
            size_bytes,
            uploaded_at,
        })
    }

    pub fn id(&self) -> UploadId {
        self.id
    }

    pub fn assignment_id(&self) -> AssignmentId {
        self.assignment_id
    }

    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    pub fn trainer_id(&self) -> UserId {
        self.trainer_id
    }

    pub fn object_key(&self) -> &ObjectKey {
        &self.object_key
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    pub fn content_type(&self) -> &VideoContentType {
        &self.content_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}
