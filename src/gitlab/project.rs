//! GitLab project payloads
use serde::{Deserialize, Serialize};

/// Form sent to create a project
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GitlabProjectCreation {
    /// Project name
    pub name: String,

    /// Project path
    pub path: String,

    /// Project visibility
    pub visibility: String,
}

impl GitlabProjectCreation {
    /// Private project whose name and path are both `name`
    pub fn private(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: name.to_string(),
            visibility: "private".to_string(),
        }
    }
}

/// Project returned by GitLab
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabProject {
    /// Project id
    pub id: u64,

    /// Namespaced path
    pub path_with_namespace: String,

    /// Web URL of the project
    pub web_url: Option<String>,
}
