//! Destination platform abstraction
use std::pin::Pin;

use crate::errors::GitMoverError;

/// Outcome of a project creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectCreation {
    /// The project was created
    Created,

    /// The project name was already taken
    AlreadyExists,
}

/// Destination hosting the migrated projects
pub trait Platform: Sync + Send {
    /// Create the private project `name` for the configured user
    fn create_project(
        &self,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ProjectCreation, GitMoverError>> + Send + '_>>;

    /// Git URL to mirror-push the project `name` to
    fn get_push_url(&self, name: &str) -> String;

    /// Host of the platform
    fn get_remote_url(&self) -> &str;

    /// User owning the projects
    fn get_username(&self) -> &str;
}
