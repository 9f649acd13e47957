//! Catalog loading and validation.
//!
//! The catalog is a declarative table of operation descriptors. The built-in
//! table ships inside the binary; an operator can replace it with a JSON file
//! of the same shape.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::config::ApiConfig;
use crate::engine::{DescriptorError, OperationDescriptor};

const BUILTIN_CATALOG: &str = include_str!("slack_web_api.json");

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid JSON of the expected shape.
    #[error("Invalid catalog format: {0}")]
    Parse(#[from] serde_json::Error),

    /// A descriptor breaks one of the routing invariants.
    #[error("Invalid operation: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Two operations derive the same tool name.
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// The catalog defines no operations at all.
    #[error("Catalog contains no operations")]
    Empty,
}

/// A validated sequence of operation descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    operations: Vec<OperationDescriptor>,
}

impl Catalog {
    /// Build a catalog from descriptors, checking every invariant.
    pub fn new(operations: Vec<OperationDescriptor>) -> Result<Self, CatalogError> {
        if operations.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut names = HashSet::new();
        for operation in &operations {
            operation.validate()?;
            let name = operation.tool_name();
            if !names.insert(name.clone()) {
                return Err(CatalogError::DuplicateTool(name));
            }
        }

        Ok(Self { operations })
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: Catalog = serde_json::from_str(json)?;
        Self::new(raw.operations)
    }

    /// Load a catalog file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The Slack Web API operations compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load the configured catalog, falling back to the built-in one.
    pub fn load(config: &ApiConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                info!("Loading operation catalog from {}", path.display());
                Self::from_path(path)?
            }
            None => Self::builtin()?,
        };
        info!("Catalog loaded: {} operation(s)", catalog.len());
        Ok(catalog)
    }

    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl IntoIterator for Catalog {
    type Item = OperationDescriptor;
    type IntoIter = std::vec::IntoIter<OperationDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{HttpMethod, ParamLocation};
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 18);

        let names: Vec<_> = catalog.operations().iter().map(|o| o.tool_name()).collect();
        assert!(names.contains(&"get_files.list".to_string()));
        assert!(names.contains(&"post_chat.postMessage".to_string()));
        assert!(names.contains(&"get_api.test".to_string()));
    }

    #[test]
    fn test_builtin_token_travels_as_header() {
        let catalog = Catalog::builtin().unwrap();
        for op in catalog.operations() {
            if let Some(token) = op.parameter("token") {
                assert_eq!(token.location, ParamLocation::Header, "{}", op.route);
            }
        }
    }

    #[test]
    fn test_builtin_operations_all_require_bearer_auth() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.operations().iter().all(|o| o.requires_bearer_auth));
    }

    #[test]
    fn test_builtin_post_operations_use_body() {
        let catalog = Catalog::builtin().unwrap();
        let post = catalog
            .operations()
            .iter()
            .find(|o| o.route == "/chat.postMessage")
            .unwrap();
        assert_eq!(post.method, HttpMethod::Post);
        assert!(post.has_body());
        assert!(post.parameter("channel").unwrap().required);
        assert_eq!(post.parameter("channel").unwrap().location, ParamLocation::Body);
    }

    #[test]
    fn test_duplicate_tool_names_rejected() {
        let json = r#"{"operations": [
            {"method": "GET", "route": "/api.test"},
            {"method": "GET", "route": "api.test"}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateTool(name)) if name == "get_api.test"
        ));
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let json = r#"{"operations": [
            {"method": "GET", "route": "/x", "parameters": [
                {"name": "a", "location": "body"}
            ]}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::Descriptor(_))
        ));
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(matches!(
            Catalog::from_json(r#"{"operations": []}"#),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            Catalog::from_json(r#"{"operations": [{"method": "FETCH", "route": "/x"}]}"#),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"operations": [{{"method": "DELETE", "route": "/items.remove",
                "parameters": [{{"name": "id", "location": "query", "required": true}}]}}]}}"#
        )
        .unwrap();

        let catalog = Catalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.operations()[0].tool_name(), "delete_items.remove");
    }

    #[test]
    fn test_from_missing_path() {
        let err = Catalog::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn test_load_prefers_configured_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"operations": [{{"method": "GET", "route": "/only.one"}}]}}"#).unwrap();

        let config = ApiConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..ApiConfig::default()
        };
        assert_eq!(Catalog::load(&config).unwrap().len(), 1);
        assert_eq!(Catalog::load(&ApiConfig::default()).unwrap().len(), 18);
    }
}
