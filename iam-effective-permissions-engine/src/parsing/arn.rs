//! Helpers for the colon-delimited action and ARN shapes

use crate::error::{PermissionsError, PermissionsResult};
use crate::grant::WILDCARD;

/// Split `service:actionName` on the first colon
///
/// The service prefix must name a service; `*` is reserved for the
/// unqualified `Action: "*"`.
pub fn split_action(action: &str) -> PermissionsResult<(&str, &str)> {
    match action.split_once(':') {
        Some((service, name))
            if !service.is_empty() && service != WILDCARD && !name.is_empty() =>
        {
            Ok((service, name))
        }
        _ => Err(PermissionsError::MalformedAction(action.to_string())),
    }
}

/// Service name of an ARN (field 3 in colon-delimited format)
pub fn service_from_arn(resource: &str) -> PermissionsResult<&str> {
    match resource.split(':').nth(2) {
        Some(service) if !service.is_empty() => Ok(service),
        _ => Err(PermissionsError::MalformedResource(resource.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("s3:GetObject", "s3", "GetObject")]
    #[case("ec2:*", "ec2", "*")]
    #[case("iam:Get*", "iam", "Get*")]
    #[case("custom:Action:With:Colons", "custom", "Action:With:Colons")]
    fn test_split_action(#[case] action: &str, #[case] service: &str, #[case] name: &str) {
        assert_eq!(split_action(action).unwrap(), (service, name));
    }

    #[rstest]
    #[case("GetObject")]
    #[case(":GetObject")]
    #[case("s3:")]
    #[case("")]
    #[case("*:*")]
    #[case("*:GetObject")]
    fn test_split_action_malformed(#[case] action: &str) {
        match split_action(action) {
            Err(PermissionsError::MalformedAction(a)) => assert_eq!(a, action),
            other => panic!("expected MalformedAction, got {other:?}"),
        }
    }

    #[rstest]
    #[case("arn:aws:s3:::bucket/*", "s3")]
    #[case("arn:aws:dynamodb:us-east-1:123:table/T", "dynamodb")]
    #[case("arn:aws-cn:ecr:cn-northwest-1:680431765560:repository/aws/mirror", "ecr")]
    #[case("arn:aws:sqs", "sqs")]
    fn test_service_from_arn(#[case] arn: &str, #[case] service: &str) {
        assert_eq!(service_from_arn(arn).unwrap(), service);
    }

    #[rstest]
    #[case("bucket")]
    #[case("arn:aws")]
    #[case("arn:aws::us-east-1:123:thing")]
    fn test_service_from_arn_malformed(#[case] arn: &str) {
        assert!(matches!(
            service_from_arn(arn),
            Err(PermissionsError::MalformedResource(_))
        ));
    }
}
