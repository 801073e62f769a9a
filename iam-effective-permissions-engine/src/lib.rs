//! This crate provides the core logic for IAM effective permissions:
//! - Statement flattening into atomic grants
//! - Wildcard-aware permission aggregation per service
//! - Policy retrieval for users (including groups) and roles
//!

pub mod aggregation;
mod aws;
pub mod commands;
mod error;
pub mod grant;
pub mod parsing;
pub mod store;
mod summary;
mod types;

// Re-exports for a small, focused public API
pub use aggregation::{aggregate, PermissionAggregator, ServicePermissions};
pub use aws::iam_client::IamPolicyStore;
pub use aws::AwsError;
pub use commands::{summarize_documents, EffectivePermissionsService};
pub use error::{PermissionsError, PermissionsResult};
pub use grant::{ActionScope, Grant, ResourceScope, ServiceScope};
pub use parsing::{flatten, flatten_documents};
pub use store::{Entity, FilePolicyStore, PolicyStore};
pub use summary::{
    EffectivePermissions, EntityType, PermissionSummary, ResourceSummary, ServiceSummary,
};
pub use types::{Effect, OneOrMany, PolicyDocument, Statement};
