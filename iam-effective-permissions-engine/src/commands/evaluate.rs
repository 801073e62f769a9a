//! Evaluation logic for the effective permissions service

use log::{debug, info};

use crate::aggregation::aggregate;
use crate::error::PermissionsResult;
use crate::parsing::flatten_documents;
use crate::store::{Entity, PolicyStore};
use crate::summary::{EffectivePermissions, PermissionSummary};
use crate::types::PolicyDocument;

impl<S: PolicyStore> super::service::EffectivePermissionsService<S> {
    /// Compute the effective permissions of `entity`
    ///
    /// Fetches every policy document that applies to the entity, flattens all
    /// allow statements and folds them into one summary. Any malformed
    /// statement fails the whole evaluation.
    pub async fn evaluate(&self, entity: &Entity) -> PermissionsResult<EffectivePermissions> {
        let documents = self.store.policy_documents(entity).await?;
        let permissions = summarize_documents(&documents)?;

        info!(
            "{} {} has permissions in {} service(s)",
            entity.entity_type,
            entity.name,
            permissions.len()
        );

        Ok(EffectivePermissions {
            evaluated_entity: entity.name.clone(),
            entity_type: entity.entity_type,
            permissions,
        })
    }
}

/// Flatten and aggregate already-fetched documents into a summary
pub fn summarize_documents(documents: &[PolicyDocument]) -> PermissionsResult<PermissionSummary> {
    let grants = flatten_documents(documents)?;
    debug!(
        "Aggregating {} grant(s) from {} document(s)",
        grants.len(),
        documents.len()
    );
    Ok(aggregate(grants).summarize())
}
