//! Policy Store seam: where the policy documents of an identity come from

pub mod file;

use async_trait::async_trait;

use crate::error::PermissionsResult;
use crate::summary::EntityType;
use crate::types::PolicyDocument;

pub use file::FilePolicyStore;

/// Identity whose permissions are evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub entity_type: EntityType,
}

impl Entity {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: EntityType::User,
        }
    }

    pub fn role(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: EntityType::Role,
        }
    }
}

/// Source of the fully resolved policy documents of an identity.
///
/// Implementations return inline, attached and (for users) group-inherited
/// documents, each managed policy once. Retrieval failures are returned as
/// is; callers never retry.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn policy_documents(&self, entity: &Entity) -> PermissionsResult<Vec<PolicyDocument>>;
}
