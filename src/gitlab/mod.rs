//! GitLab destination
pub(crate) mod platform;
pub(crate) mod project;

/// Project creation endpoint, relative to the instance URL
const GITLAB_PROJECTS_API: &str = "api/v4/projects";

/// Header carrying the personal access token
const GITLAB_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Text GitLab answers with when a project name or path is in use
const ALREADY_TAKEN: &str = "has already been taken";
