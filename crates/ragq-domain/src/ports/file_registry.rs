//! File Registry Client port (§4.L).
//!
//! Thin client for the persistent file registry, which is out of scope
//! for this core (§1); we consume its ownership and enumeration
//! contracts only.

use async_trait::async_trait;

use crate::error::Result;

/// Port for the external file-ownership/enumeration contract.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait FileRegistryClient: Send + Sync {
    /// `true` if `file_id` exists and is owned by `user_id`. Used for the
    /// 404-on-not-owned check on `/ask-file/:fileId` (§4.I).
    async fn is_owned(&self, file_id: &str, user_id: &str) -> Result<bool>;

    /// Display names of all files owned by `user_id`. An empty result
    /// drives the orchestrator's "no documents" short-circuit (§4.G
    /// step 3).
    async fn list_file_names(&self, user_id: &str) -> Result<Vec<String>>;
}
