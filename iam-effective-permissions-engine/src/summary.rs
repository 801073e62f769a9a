//! Effective permission summary and the report handed to the presentation layer
//!
//! Wildcard resources serialize as the string `"*"`; a blanketed service
//! and the pseudo-service both serialize as `{"*": "*"}`. All maps are
//! ordered, so the JSON output is key-sorted and reproducible.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::PermissionsResult;
use crate::grant::{ResourceScope, WILDCARD};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSummary {
    All,
    Only(Vec<String>),
}

impl ResourceSummary {
    /// `None` for an empty finite set, which grants nothing
    pub fn from_scope(scope: &ResourceScope) -> Option<Self> {
        match scope {
            ResourceScope::All => Some(Self::All),
            ResourceScope::Only(resources) if resources.is_empty() => None,
            ResourceScope::Only(resources) => Some(Self::Only(resources.iter().cloned().collect())),
        }
    }
}

impl Serialize for ResourceSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str(WILDCARD),
            Self::Only(resources) => resources.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceSummary {
    /// Every action on every resource of the service, `{"*": "*"}`
    All,
    Actions(BTreeMap<String, ResourceSummary>),
}

impl Serialize for ServiceSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serialize_wildcard_pair(serializer),
            Self::Actions(actions) => actions.serialize(serializer),
        }
    }
}

/// Service name to its permission summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSummary {
    /// The pseudo-service grant: every action on every resource of every
    /// service. Serialized as the entire summary `{"*": "*"}`.
    Everything,
    Services(BTreeMap<String, ServiceSummary>),
}

impl PermissionSummary {
    pub fn everything() -> Self {
        Self::Everything
    }

    pub fn grants_everything(&self) -> bool {
        matches!(self, Self::Everything)
    }

    /// Summary of a named service; `None` under [`PermissionSummary::Everything`]
    pub fn get(&self, service: &str) -> Option<&ServiceSummary> {
        match self {
            Self::Everything => None,
            Self::Services(services) => services.get(service),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of top-level entries in the summary
    pub fn len(&self) -> usize {
        match self {
            Self::Everything => 1,
            Self::Services(services) => services.len(),
        }
    }
}

impl Default for PermissionSummary {
    fn default() -> Self {
        Self::Services(BTreeMap::new())
    }
}

impl Serialize for PermissionSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Everything => serialize_wildcard_pair(serializer),
            Self::Services(services) => services.serialize(serializer),
        }
    }
}

impl FromIterator<(String, ServiceSummary)> for PermissionSummary {
    fn from_iter<I: IntoIterator<Item = (String, ServiceSummary)>>(iter: I) -> Self {
        Self::Services(iter.into_iter().collect())
    }
}

fn serialize_wildcard_pair<S: Serializer>(serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(WILDCARD, WILDCARD)?;
    map.end()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityType {
    User,
    Role,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("User"),
            Self::Role => f.write_str("Role"),
        }
    }
}

/// Output document: who was evaluated and what they may do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermissions {
    pub evaluated_entity: String,
    pub entity_type: EntityType,
    pub permissions: PermissionSummary,
}

impl EffectivePermissions {
    /// Indented JSON with keys sorted at every level
    pub fn to_pretty_json(&self) -> PermissionsResult<String> {
        // serde_json::Value maps are sorted by key
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
