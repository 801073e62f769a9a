//! Effective Permissions Service Layer
//!
//! This module provides the main service interface that connects a
//! [`PolicyStore`] to the permission-merging engine. Adapters (the CLI) hold
//! one service and call [`EffectivePermissionsService::evaluate`].

use crate::aws::iam_client::IamPolicyStore;
use crate::error::PermissionsResult;
use crate::store::PolicyStore;

/// Main service struct that owns the policy store
pub struct EffectivePermissionsService<S> {
    pub(crate) store: S,
}

impl<S: PolicyStore> EffectivePermissionsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // evaluate() method implementation is in evaluate.rs
}

impl EffectivePermissionsService<IamPolicyStore> {
    /// Create a service backed by IAM
    ///
    /// The configuration is loaded using the default credential provider chain,
    /// with optional region and profile overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if no region can be resolved.
    pub async fn from_aws(
        region: Option<String>,
        profile: Option<String>,
    ) -> PermissionsResult<Self> {
        Ok(Self::new(IamPolicyStore::from_env(region, profile).await?))
    }
}
