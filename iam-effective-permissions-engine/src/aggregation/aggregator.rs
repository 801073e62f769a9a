//! Fold of grants across all statements of all policies

use std::collections::BTreeMap;

use log::{debug, warn};

use super::service_permissions::ServicePermissions;
use crate::grant::{Grant, ServiceScope, WILDCARD};
use crate::summary::PermissionSummary;

/// Aggregate state keyed by service name.
///
/// The fold is commutative and idempotent, so grants may arrive in any
/// order and repeated grants are harmless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionAggregator {
    all_services: bool,
    services: BTreeMap<String, ServicePermissions>,
}

impl PermissionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the unqualified `Action: "*"` / `Resource: "*"` grant was seen
    pub fn grants_everything(&self) -> bool {
        self.all_services
    }

    pub fn service(&self, name: &str) -> Option<&ServicePermissions> {
        self.services.get(name)
    }

    pub fn services(&self) -> impl Iterator<Item = &ServicePermissions> {
        self.services.values()
    }

    pub fn add_grant(&mut self, grant: Grant) {
        let key = match &grant.service {
            ServiceScope::All if grant.is_blanket() => {
                if !self.all_services {
                    debug!("Grant of every action on every resource observed");
                }
                self.all_services = true;
                return;
            }
            ServiceScope::All => {
                warn!("Unqualified grant {} is not a blanket grant", grant);
                WILDCARD.to_string()
            }
            ServiceScope::Named(name) => name.clone(),
        };

        self.services
            .entry(key)
            .or_insert_with_key(|name| ServicePermissions::new(name.clone()))
            .add_grant(grant);
    }

    pub fn summarize(&self) -> PermissionSummary {
        if self.all_services {
            return PermissionSummary::everything();
        }
        self.services
            .iter()
            .map(|(name, permissions)| (name.clone(), permissions.summarize()))
            .collect()
    }
}

impl Extend<Grant> for PermissionAggregator {
    fn extend<I: IntoIterator<Item = Grant>>(&mut self, grants: I) {
        for grant in grants {
            self.add_grant(grant);
        }
    }
}

impl FromIterator<Grant> for PermissionAggregator {
    fn from_iter<I: IntoIterator<Item = Grant>>(grants: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(grants);
        aggregator
    }
}

/// Fold a grant sequence into per-service permissions
pub fn aggregate(grants: impl IntoIterator<Item = Grant>) -> PermissionAggregator {
    grants.into_iter().collect()
}
