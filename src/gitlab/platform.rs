//! GitLab platform implementation
use std::pin::Pin;

use log::{debug, info, warn};
use reqwest::{header::ACCEPT, StatusCode};
use url::Url;

use super::{
    project::{GitlabProject, GitlabProjectCreation},
    ALREADY_TAKEN, GITLAB_PROJECTS_API, GITLAB_TOKEN_HEADER,
};
use crate::{
    errors::{GitMoverError, GitMoverErrorKind},
    platform::{Platform, ProjectCreation},
};

/// GitLab platform
#[derive(Debug, Clone)]
pub struct GitlabPlatform {
    /// Instance URL, always ending with a slash
    base_url: Url,

    /// Instance host name
    host: String,

    /// GitLab username
    username: String,

    /// GitLab token
    token: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GitlabPlatform {
    /// Create a new GitLab platform
    /// # Errors
    /// Usage error if the URL has no host
    pub fn new(base_url: &Url, username: String, token: String) -> Result<Self, GitMoverError> {
        let host = match base_url.host_str() {
            Some(host) => host.to_string(),
            None => {
                return Err(GitMoverError::new(GitMoverErrorKind::Usage)
                    .with_text(&format!("destination URL '{base_url}' has no host")))
            }
        };
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            host,
            username,
            token,
            client: reqwest::Client::new(),
        })
    }

    /// Endpoint used to create projects
    fn projects_url(&self) -> Result<Url, GitMoverError> {
        self.base_url.join(GITLAB_PROJECTS_API).map_err(|e| {
            GitMoverError::with_source(GitMoverErrorKind::Usage, e)
        })
    }
}

/// Interpret the answer to a project creation request
pub(crate) fn classify_response(
    name: &str,
    status: StatusCode,
    text: &str,
) -> Result<ProjectCreation, GitMoverError> {
    if status.is_success() {
        match serde_json::from_str::<GitlabProject>(text) {
            Ok(project) => debug!(
                "Created project #{} {} ({})",
                project.id,
                project.path_with_namespace,
                project.web_url.unwrap_or_default()
            ),
            Err(e) => warn!("{name}: unexpected project creation answer: {e}"),
        }
        return Ok(ProjectCreation::Created);
    }
    if text.contains(ALREADY_TAKEN) {
        return Ok(ProjectCreation::AlreadyExists);
    }
    Err(GitMoverError::new(GitMoverErrorKind::ProjectCreation)
        .with_repo(name)
        .with_text(&format!("{status} - {text}")))
}

impl Platform for GitlabPlatform {
    fn get_remote_url(&self) -> &str {
        &self.host
    }

    fn get_username(&self) -> &str {
        &self.username
    }

    fn get_push_url(&self, name: &str) -> String {
        format!("git@{}:{}/{}.git", self.host, self.username, name)
    }

    fn create_project(
        &self,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ProjectCreation, GitMoverError>> + Send + '_>>
    {
        let name = name.to_string();
        let token = self.token.clone();
        let client = self.client.clone();
        Box::pin(async move {
            let url = self.projects_url()?;
            info!("Creating project '{name}' on {}", self.host);
            let form = GitlabProjectCreation::private(&name);
            let request = client
                .post(url)
                .header(GITLAB_TOKEN_HEADER, &token)
                .header(ACCEPT, "application/json")
                .form(&form)
                .send();

            let response = request.await?;
            let status = response.status();
            let text = response.text().await?;
            debug!("Project creation answered {status}: {text}");
            classify_response(&name, status, &text)
        })
    }
}
