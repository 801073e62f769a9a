//! Statement Flattener
//!
//! Turns one allow statement, which may bundle several actions and several
//! resources, into atomic [`Grant`]s. An `Action: "*"` paired with concrete
//! resources is attributed to the service named in each resource ARN.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use super::arn::{service_from_arn, split_action};
use crate::error::{PermissionsError, PermissionsResult};
use crate::grant::{ActionScope, Grant, ResourceScope, ServiceScope, WILDCARD};
use crate::types::{PolicyDocument, Statement};

/// Flatten a single allow statement into grants.
///
/// The caller is responsible for passing only `Allow` statements.
pub fn flatten(statement: &Statement) -> PermissionsResult<Vec<Grant>> {
    let sid = statement.sid.as_deref();

    if statement.not_action.is_some() {
        return Err(PermissionsError::malformed_statement(
            sid,
            "NotAction is not supported",
        ));
    }
    if statement.not_resource.is_some() {
        return Err(PermissionsError::malformed_statement(
            sid,
            "NotResource is not supported",
        ));
    }

    let actions = match &statement.action {
        Some(actions) if !actions.is_empty() => actions,
        _ => {
            return Err(PermissionsError::malformed_statement(
                sid,
                "statement has no Action",
            ))
        }
    };
    let resources: Vec<&str> = match &statement.resource {
        Some(resources) if !resources.is_empty() => resources.iter().collect(),
        _ => {
            return Err(PermissionsError::malformed_statement(
                sid,
                "statement has no Resource",
            ))
        }
    };

    let mut grants = Vec::new();
    for action in actions.iter() {
        if action == WILDCARD {
            grants.extend(flatten_wildcard_action(sid, &resources)?);
        } else {
            let (service, name) = split_action(action)?;
            grants.push(Grant::new(
                ServiceScope::Named(service.to_string()),
                ActionScope::parse(name),
                resources.iter().copied().collect(),
            ));
        }
    }

    debug!(
        "Flattened statement {} into {} grant(s)",
        sid.unwrap_or("<no sid>"),
        grants.len()
    );
    Ok(grants)
}

/// `Action: "*"` either means everything (with `Resource: "*"`) or every
/// action of the services owning the listed resources.
fn flatten_wildcard_action(sid: Option<&str>, resources: &[&str]) -> PermissionsResult<Vec<Grant>> {
    if resources.contains(&WILDCARD) {
        if resources.len() > 1 {
            return Err(PermissionsError::malformed_statement(
                sid,
                "Action '*' cannot combine Resource '*' with other resources",
            ));
        }
        return Ok(vec![Grant::everything()]);
    }

    let mut by_service: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for resource in resources {
        let service = service_from_arn(resource)?;
        trace!("Resolved service '{}' from resource {}", service, resource);
        by_service
            .entry(service)
            .or_default()
            .insert((*resource).to_string());
    }

    Ok(by_service
        .into_iter()
        .map(|(service, resources)| {
            Grant::new(
                ServiceScope::Named(service.to_string()),
                ActionScope::All,
                ResourceScope::Only(resources),
            )
        })
        .collect())
}

/// Flatten every allow statement of every document, failing on the first
/// malformed statement.
pub fn flatten_documents(documents: &[PolicyDocument]) -> PermissionsResult<Vec<Grant>> {
    let mut grants = Vec::new();
    for document in documents {
        for statement in document.allow_statements() {
            grants.extend(flatten(statement)?);
        }
    }
    Ok(grants)
}
