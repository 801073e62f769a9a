//! Atomic grant model
//!
//! A [`Grant`] is one `(service, action, resources)` tuple produced by the
//! statement flattener. Wildcards are explicit variants, so a literal
//! resource named `*` can never be confused with "every resource".

use std::collections::BTreeSet;
use std::fmt;

pub const WILDCARD: &str = "*";

/// Service a grant applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceScope {
    /// Pseudo-service for an unqualified `Action: "*"` on `Resource: "*"`
    All,
    Named(String),
}

impl fmt::Display for ServiceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Action within a service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionScope {
    All,
    Named(String),
}

impl ActionScope {
    pub fn parse(action: &str) -> Self {
        if action == WILDCARD {
            Self::All
        } else {
            Self::Named(action.to_string())
        }
    }
}

impl fmt::Display for ActionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Resources a grant applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceScope {
    All,
    Only(BTreeSet<String>),
}

impl ResourceScope {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Fold `other` into `self`: `All` absorbs anything, finite sets union.
    pub fn merge(&mut self, other: ResourceScope) {
        match other {
            Self::All => *self = Self::All,
            Self::Only(incoming) => {
                if let Self::Only(existing) = self {
                    existing.extend(incoming);
                }
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ResourceScope {
    /// Any `*` entry collapses the whole set to [`ResourceScope::All`].
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut resources = BTreeSet::new();
        for resource in iter {
            let resource = resource.into();
            if resource == WILDCARD {
                return Self::All;
            }
            resources.insert(resource);
        }
        Self::Only(resources)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grant {
    pub service: ServiceScope,
    pub action: ActionScope,
    pub resources: ResourceScope,
}

impl Grant {
    pub fn new(service: ServiceScope, action: ActionScope, resources: ResourceScope) -> Self {
        Self {
            service,
            action,
            resources,
        }
    }

    /// The unqualified "everything" grant
    pub fn everything() -> Self {
        Self::new(ServiceScope::All, ActionScope::All, ResourceScope::All)
    }

    /// Every action on every resource of the grant's service
    pub fn is_blanket(&self) -> bool {
        self.action == ActionScope::All && self.resources.is_all()
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} on ", self.service, self.action)?;
        match &self.resources {
            ResourceScope::All => f.write_str(WILDCARD),
            ResourceScope::Only(resources) => {
                let joined: Vec<&str> = resources.iter().map(String::as_str).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(resources: &[&str]) -> ResourceScope {
        resources.iter().copied().collect()
    }

    #[test]
    fn test_wildcard_collapses_resource_set() {
        let scope: ResourceScope = ["arn:aws:s3:::a", "*", "arn:aws:s3:::b"]
            .into_iter()
            .collect();
        assert_eq!(scope, ResourceScope::All);
    }

    #[test]
    fn test_resource_set_deduplicates() {
        let scope = only(&["arn:aws:s3:::a", "arn:aws:s3:::a"]);
        assert_eq!(
            scope,
            ResourceScope::Only(BTreeSet::from(["arn:aws:s3:::a".to_string()]))
        );
    }

    #[test]
    fn test_merge_rules() {
        let mut scope = only(&["a"]);
        scope.merge(only(&["b", "a"]));
        assert_eq!(scope, only(&["a", "b"]));

        scope.merge(ResourceScope::All);
        assert_eq!(scope, ResourceScope::All);

        scope.merge(only(&["c"]));
        assert_eq!(scope, ResourceScope::All);
    }

    #[test]
    fn test_blanket_detection() {
        let blanket = Grant::new(
            ServiceScope::Named("ec2".into()),
            ActionScope::All,
            ResourceScope::All,
        );
        assert!(blanket.is_blanket());

        let restricted = Grant::new(
            ServiceScope::Named("ec2".into()),
            ActionScope::All,
            only(&["arn:aws:ec2:us-east-1:123456789012:instance/i-123"]),
        );
        assert!(!restricted.is_blanket());

        let concrete = Grant::new(
            ServiceScope::Named("ec2".into()),
            ActionScope::parse("DescribeInstances"),
            ResourceScope::All,
        );
        assert!(!concrete.is_blanket());
        assert!(Grant::everything().is_blanket());
    }

    #[test]
    fn test_display() {
        let grant = Grant::new(
            ServiceScope::Named("s3".into()),
            ActionScope::parse("GetObject"),
            only(&["arn:aws:s3:::b", "arn:aws:s3:::a"]),
        );
        assert_eq!(
            grant.to_string(),
            "s3:GetObject on [arn:aws:s3:::a, arn:aws:s3:::b]"
        );
        assert_eq!(Grant::everything().to_string(), "*:* on *");
    }
}
