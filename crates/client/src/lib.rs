//! gms-client: typed access to the graduation backend's cover-letter
//! endpoints.
//!
//! [`CoverLetterApi`] is the transport seam: it returns raw JSON bodies and
//! typed [`ApiError`]s. [`RoleDesk`] sits on top of it, reconciles every
//! body through `gms-interchange` and pre-flights sign and reject through
//! `gms-engine` before anything is sent.

use async_trait::async_trait;
use gms_core::Role;

pub mod config;
pub mod desk;
pub mod error;
pub mod http;

pub use config::{ClientConfig, ConfigError};
pub use desk::{RoleDesk, SignOutcome};
pub use error::ApiError;
pub use http::HttpCoverLetterApi;

/// Raw access to the cover-letter endpoints of one backend.
///
/// Each call performs at most one request. Implementations must map every
/// non-success answer onto [`ApiError`]; a returned `Ok` body is JSON that
/// did not report `"success": false`.
#[async_trait]
pub trait CoverLetterApi: Send + Sync {
    /// `GET /api/{role}/cover-letters`
    async fn list(&self, role: Role) -> Result<serde_json::Value, ApiError>;

    /// `GET /api/{role}/cover-letters/{entry_id}`
    async fn fetch(&self, role: Role, entry_id: &str) -> Result<serde_json::Value, ApiError>;

    /// `POST /api/{role}/cover-letters/{entry_id}/sign`
    async fn sign(&self, role: Role, entry_id: &str) -> Result<serde_json::Value, ApiError>;

    /// `POST /api/{role}/cover-letters/{entry_id}/reject`
    async fn reject(
        &self,
        role: Role,
        entry_id: &str,
        reason: &str,
    ) -> Result<serde_json::Value, ApiError>;
}
