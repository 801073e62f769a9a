//! Crate-level error type for effective permission evaluation

use crate::aws::AwsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PermissionsError {
    /// Action entry that is neither `*` nor `service:action`
    #[error("Malformed action '{0}': expected '*' or '<service>:<action>'")]
    MalformedAction(String),
    /// Resource identifier a service name could not be derived from
    #[error("Malformed resource '{0}': expected a colon-delimited ARN with a service field")]
    MalformedResource(String),
    /// Statement whose overall shape cannot be flattened into grants
    #[error("Malformed statement{}: {reason}", sid_suffix(.sid))]
    MalformedStatement { sid: Option<String>, reason: String },
    /// Policy document text that is not a valid policy
    #[error("Invalid policy document from {source_name}: {reason}")]
    PolicyDocument { source_name: String, reason: String },
    #[error(transparent)]
    Aws(#[from] AwsError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PermissionsError {
    pub(crate) fn malformed_statement(sid: Option<&str>, reason: impl Into<String>) -> Self {
        Self::MalformedStatement {
            sid: sid.map(str::to_string),
            reason: reason.into(),
        }
    }

    pub(crate) fn policy_document(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PolicyDocument {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the shape of the input policies rather than
    /// by retrieving them.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedAction(_)
                | Self::MalformedResource(_)
                | Self::MalformedStatement { .. }
                | Self::PolicyDocument { .. }
        )
    }
}

fn sid_suffix(sid: &Option<String>) -> String {
    sid.as_ref().map(|s| format!(" '{s}'")).unwrap_or_default()
}

pub type PermissionsResult<T> = Result<T, PermissionsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_statement_message_includes_sid() {
        let err = PermissionsError::malformed_statement(Some("ReadOnly"), "Resource is empty");
        assert_eq!(
            err.to_string(),
            "Malformed statement 'ReadOnly': Resource is empty"
        );

        let err = PermissionsError::malformed_statement(None, "Resource is empty");
        assert_eq!(err.to_string(), "Malformed statement: Resource is empty");
    }

    #[test]
    fn test_is_malformed_input() {
        assert!(PermissionsError::MalformedAction("s3".into()).is_malformed_input());
        assert!(PermissionsError::MalformedResource("bucket".into()).is_malformed_input());
        assert!(!PermissionsError::Aws(AwsError::IamError("throttled".into())).is_malformed_input());
    }
}
