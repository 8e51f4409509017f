//! Object storage adapters.

mod s3_object_storage;
pub mod sigv4;

pub use s3_object_storage::{Addressing, S3ObjectStorage, S3Settings};
pub use sigv4::Credentials;
