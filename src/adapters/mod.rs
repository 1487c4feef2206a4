//! External system integrations
//!
//! - [`storage`] - S3 object storage for source files and converted partitions
//! - [`athena`] - Amazon Athena query submission and status polling
//!
//! Both sit behind seams ([`storage::ObjectStorage::from_store`] and the
//! [`athena::QueryService`] trait) so the export pipeline can be driven
//! end-to-end in tests with an in-memory store and a scripted query service.

pub mod athena;
pub mod storage;
