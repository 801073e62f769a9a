//! Per-service accumulator

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use log::trace;

use crate::grant::{ActionScope, Grant, ResourceScope, WILDCARD};
use crate::summary::{ResourceSummary, ServiceSummary};

/// Aggregated permissions for one service name.
///
/// Grants whose action is `*` but which are not blanket grants are kept in
/// their own bucket; they never suppress concrete action entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePermissions {
    service: String,
    is_blanketed: bool,
    all_actions: Option<ResourceScope>,
    actions: BTreeMap<String, ResourceScope>,
}

impl ServicePermissions {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            is_blanketed: false,
            all_actions: None,
            actions: BTreeMap::new(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn is_blanketed(&self) -> bool {
        self.is_blanketed
    }

    /// Resources covered by `service:*` grants that are not blanket grants
    pub fn all_actions(&self) -> Option<&ResourceScope> {
        self.all_actions.as_ref()
    }

    /// Concrete action entries keyed by action name
    pub fn actions(&self) -> &BTreeMap<String, ResourceScope> {
        &self.actions
    }

    /// Merge one grant for this service.
    ///
    /// Blanket grants absorb everything, resource wildcards absorb finite
    /// sets, and finite sets union.
    pub fn add_grant(&mut self, grant: Grant) {
        if self.is_blanketed {
            return;
        }

        if grant.is_blanket() {
            trace!("{}: blanket grant, dropping per-action detail", self.service);
            self.is_blanketed = true;
            self.all_actions = None;
            self.actions.clear();
            return;
        }

        match grant.action {
            ActionScope::All => match &mut self.all_actions {
                Some(existing) => existing.merge(grant.resources),
                None => self.all_actions = Some(grant.resources),
            },
            ActionScope::Named(name) => match self.actions.entry(name) {
                Entry::Vacant(entry) => {
                    entry.insert(grant.resources);
                }
                Entry::Occupied(mut entry) => entry.get_mut().merge(grant.resources),
            },
        }
    }

    /// Canonical summary: blanket first, then the `*` action bucket, then
    /// every concrete action in name order.
    pub fn summarize(&self) -> ServiceSummary {
        if self.is_blanketed {
            return ServiceSummary::All;
        }

        let mut actions = BTreeMap::new();
        if let Some(scope) = &self.all_actions {
            if let Some(summary) = ResourceSummary::from_scope(scope) {
                actions.insert(WILDCARD.to_string(), summary);
            }
        }
        for (name, scope) in &self.actions {
            if let Some(summary) = ResourceSummary::from_scope(scope) {
                actions.insert(name.clone(), summary);
            }
        }
        ServiceSummary::Actions(actions)
    }
}
