//! Policy documents read from local JSON files

use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;

use super::{Entity, PolicyStore};
use crate::error::{PermissionsError, PermissionsResult};
use crate::types::PolicyDocument;

/// Reads every file on each call. A file holds one policy document or a
/// JSON array of documents; the evaluated entity is not used to filter.
#[derive(Debug, Clone)]
pub struct FilePolicyStore {
    paths: Vec<PathBuf>,
}

impl FilePolicyStore {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn parse_file(source_name: &str, text: &str) -> PermissionsResult<Vec<PolicyDocument>> {
        let invalid = |e: serde_json::Error| PermissionsError::policy_document(source_name, e.to_string());
        match serde_json::from_str::<Value>(text).map_err(invalid)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(invalid))
                .collect(),
            document => Ok(vec![serde_json::from_value(document).map_err(invalid)?]),
        }
    }
}

#[async_trait]
impl PolicyStore for FilePolicyStore {
    async fn policy_documents(&self, entity: &Entity) -> PermissionsResult<Vec<PolicyDocument>> {
        let mut documents = Vec::new();
        for path in &self.paths {
            let source_name = path.display().to_string();
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| PermissionsError::Io {
                    path: source_name.clone(),
                    source,
                })?;
            let parsed = Self::parse_file(&source_name, &text)?;
            debug!("Loaded {} policy document(s) from {}", parsed.len(), source_name);
            documents.extend(parsed);
        }
        info!(
            "Loaded {} policy document(s) for {} {} from {} file(s)",
            documents.len(),
            entity.entity_type,
            entity.name,
            self.paths.len()
        );
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_single_and_list_files() {
        let single = write_temp(
            r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"}]}"#,
        );
        let list = write_temp(
            r#"[
                {"Statement": {"Effect": "Allow", "Action": "sqs:SendMessage", "Resource": "*"}},
                {"Statement": [{"Effect": "Deny", "Action": "sqs:*", "Resource": "*"}]}
            ]"#,
        );

        let store = FilePolicyStore::new([single.path(), list.path()]);
        let documents = store.policy_documents(&Entity::user("alice")).await.unwrap();
        assert_eq!(documents.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let store = FilePolicyStore::new(["/nonexistent/policy.json"]);
        let err = store.policy_documents(&Entity::role("app")).await.unwrap_err();
        assert!(matches!(err, PermissionsError::Io { .. }));
        assert!(!err.is_malformed_input());
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed_input() {
        let file = write_temp(r#"{"Statement": "#);
        let store = FilePolicyStore::new([file.path()]);
        let err = store.policy_documents(&Entity::user("alice")).await.unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_document_without_statement_is_rejected() {
        let err = FilePolicyStore::parse_file("inline.json", r#"{"Version": "2012-10-17"}"#)
            .unwrap_err();
        assert!(matches!(err, PermissionsError::PolicyDocument { .. }));
    }
}
