//! IAM-backed [`PolicyStore`]
//!
//! Resolves every allow-capable policy document that applies to a user
//! (inline, attached, and inherited from groups) or a role (inline and
//! attached). Managed policies are fetched once per ARN.

use std::collections::HashSet;

use async_trait::async_trait;
use aws_sdk_iam::Client as IamClient;
use log::{debug, info};

use crate::aws::{AwsError, AwsResult};
use crate::error::PermissionsResult;
use crate::store::{Entity, PolicyStore};
use crate::summary::EntityType;
use crate::types::PolicyDocument;

/// Follow IAM `Marker` pagination, collecting `$extract` from every page
macro_rules! collect_pages {
    ($request:expr, |$page:ident| $extract:expr, $what:expr) => {{
        let mut items = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let $page = $request
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| AwsError::IamError(format!("Failed to {}: {e}", $what)))?;
            let truncated = $page.is_truncated;
            marker = $page.marker.clone();
            items.extend($extract);
            if !truncated || marker.is_none() {
                break;
            }
        }
        items
    }};
}

/// Identity that owns inline policies
#[derive(Debug, Clone, Copy)]
enum PolicyOwner<'a> {
    User(&'a str),
    Role(&'a str),
    Group(&'a str),
}

pub struct IamPolicyStore {
    client: IamClient,
}

impl IamPolicyStore {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    /// Build a store from the standard credential provider chain, optionally
    /// overriding region and profile.
    pub async fn from_env(region: Option<String>, profile: Option<String>) -> AwsResult<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        if config.region().is_none() {
            return Err(AwsError::ConfigError(
                "no AWS region configured; pass --region or set AWS_REGION".to_string(),
            ));
        }

        Ok(Self::new(IamClient::new(&config)))
    }

    async fn inline_policy_names(&self, owner: PolicyOwner<'_>) -> AwsResult<Vec<String>> {
        let names = match owner {
            PolicyOwner::User(name) => collect_pages!(
                self.client.list_user_policies().user_name(name),
                |page| page.policy_names,
                format!("list inline policies of user '{name}'")
            ),
            PolicyOwner::Role(name) => collect_pages!(
                self.client.list_role_policies().role_name(name),
                |page| page.policy_names,
                format!("list inline policies of role '{name}'")
            ),
            PolicyOwner::Group(name) => collect_pages!(
                self.client.list_group_policies().group_name(name),
                |page| page.policy_names,
                format!("list inline policies of group '{name}'")
            ),
        };
        Ok(names)
    }

    async fn inline_policy(
        &self,
        owner: PolicyOwner<'_>,
        policy_name: &str,
    ) -> PermissionsResult<PolicyDocument> {
        let (source, encoded) = match owner {
            PolicyOwner::User(name) => {
                let response = self
                    .client
                    .get_user_policy()
                    .user_name(name)
                    .policy_name(policy_name)
                    .send()
                    .await
                    .map_err(|e| AwsError::IamError(format!("Failed to get user policy: {e}")))?;
                (format!("user/{name}/{policy_name}"), response.policy_document)
            }
            PolicyOwner::Role(name) => {
                let response = self
                    .client
                    .get_role_policy()
                    .role_name(name)
                    .policy_name(policy_name)
                    .send()
                    .await
                    .map_err(|e| AwsError::IamError(format!("Failed to get role policy: {e}")))?;
                (format!("role/{name}/{policy_name}"), response.policy_document)
            }
            PolicyOwner::Group(name) => {
                let response = self
                    .client
                    .get_group_policy()
                    .group_name(name)
                    .policy_name(policy_name)
                    .send()
                    .await
                    .map_err(|e| AwsError::IamError(format!("Failed to get group policy: {e}")))?;
                (format!("group/{name}/{policy_name}"), response.policy_document)
            }
        };
        decode_policy_document(&source, &encoded)
    }

    async fn attached_policy_arns(&self, owner: PolicyOwner<'_>) -> AwsResult<Vec<String>> {
        let attached = match owner {
            PolicyOwner::User(name) => collect_pages!(
                self.client.list_attached_user_policies().user_name(name),
                |page| page.attached_policies.unwrap_or_default(),
                format!("list attached policies of user '{name}'")
            ),
            PolicyOwner::Role(name) => collect_pages!(
                self.client.list_attached_role_policies().role_name(name),
                |page| page.attached_policies.unwrap_or_default(),
                format!("list attached policies of role '{name}'")
            ),
            PolicyOwner::Group(name) => collect_pages!(
                self.client.list_attached_group_policies().group_name(name),
                |page| page.attached_policies.unwrap_or_default(),
                format!("list attached policies of group '{name}'")
            ),
        };
        Ok(attached
            .into_iter()
            .filter_map(|policy| policy.policy_arn)
            .collect())
    }

    async fn groups_for_user(&self, user_name: &str) -> AwsResult<Vec<String>> {
        let groups = collect_pages!(
            self.client.list_groups_for_user().user_name(user_name),
            |page| page.groups,
            format!("list groups of user '{user_name}'")
        );
        Ok(groups.into_iter().map(|group| group.group_name).collect())
    }

    /// Fetch the default version of a managed policy
    async fn managed_policy(&self, policy_arn: &str) -> PermissionsResult<PolicyDocument> {
        let policy = self
            .client
            .get_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| AwsError::IamError(format!("Failed to get policy '{policy_arn}': {e}")))?;

        let version_id = policy
            .policy
            .and_then(|p| p.default_version_id)
            .ok_or_else(|| {
                AwsError::PolicyError(format!("Policy '{policy_arn}' has no default version"))
            })?;

        let version = self
            .client
            .get_policy_version()
            .policy_arn(policy_arn)
            .version_id(&version_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!(
                    "Failed to get version {version_id} of policy '{policy_arn}': {e}"
                ))
            })?;

        let encoded = version
            .policy_version
            .and_then(|v| v.document)
            .ok_or_else(|| {
                AwsError::PolicyError(format!(
                    "Version {version_id} of policy '{policy_arn}' has no document"
                ))
            })?;

        decode_policy_document(policy_arn, &encoded)
    }

    /// Inline documents of `owner`, plus its attached ARNs not yet in `seen_arns`
    async fn owner_documents(
        &self,
        owner: PolicyOwner<'_>,
        seen_arns: &mut HashSet<String>,
        documents: &mut Vec<PolicyDocument>,
    ) -> PermissionsResult<()> {
        for policy_name in self.inline_policy_names(owner).await? {
            documents.push(self.inline_policy(owner, &policy_name).await?);
        }
        for policy_arn in self.attached_policy_arns(owner).await? {
            if seen_arns.insert(policy_arn.clone()) {
                documents.push(self.managed_policy(&policy_arn).await?);
            } else {
                debug!("Managed policy {} already fetched", policy_arn);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for IamPolicyStore {
    async fn policy_documents(&self, entity: &Entity) -> PermissionsResult<Vec<PolicyDocument>> {
        let mut seen_arns = HashSet::new();
        let mut documents = Vec::new();

        match entity.entity_type {
            EntityType::Role => {
                self.owner_documents(PolicyOwner::Role(&entity.name), &mut seen_arns, &mut documents)
                    .await?;
            }
            EntityType::User => {
                self.owner_documents(PolicyOwner::User(&entity.name), &mut seen_arns, &mut documents)
                    .await?;
                for group in self.groups_for_user(&entity.name).await? {
                    debug!("Resolving policies inherited from group {}", group);
                    self.owner_documents(PolicyOwner::Group(&group), &mut seen_arns, &mut documents)
                        .await?;
                }
            }
        }

        info!(
            "Fetched {} policy document(s) for {} {}",
            documents.len(),
            entity.entity_type,
            entity.name
        );
        Ok(documents)
    }
}

/// URL decode and parse a policy document (IAM returns URL-encoded JSON)
pub(crate) fn decode_policy_document(
    source_name: &str,
    encoded: &str,
) -> PermissionsResult<PolicyDocument> {
    let decoded = percent_encoding::percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| AwsError::PolicyError(format!("Failed to URL decode policy document: {e}")))?;
    PolicyDocument::from_json(source_name, &decoded)
}
