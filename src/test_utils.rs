//! Helpers building throwaway git repositories for tests
use std::{
    fs::{create_dir_all, write},
    path::Path,
    pin::Pin,
    sync::Mutex,
};

use git2::{Oid, Repository, Signature};

use crate::{
    errors::GitMoverError,
    platform::{Platform, ProjectCreation},
};

/// Commit `content` as `file_name` on the current branch
pub(crate) fn commit_file(repo: &Repository, file_name: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let file_path = workdir.join(file_name);
    create_dir_all(file_path.parent().unwrap()).unwrap();
    write(&file_path, content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file_name)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = Signature::now("tester", "tester@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

/// Repository with one commit and a `v1` tag
pub(crate) fn init_source(path: &Path) -> Repository {
    create_dir_all(path).unwrap();
    let repo = Repository::init(path).unwrap();
    let oid = commit_file(&repo, "README", "hello", "initial commit");
    {
        let object = repo.find_object(oid, None).unwrap();
        repo.tag_lightweight("v1", &object, false).unwrap();
    }
    repo
}

/// Admin repository whose gitolite.conf is `conf`
pub(crate) fn init_admin(path: &Path, conf: &str) -> Repository {
    create_dir_all(path).unwrap();
    let repo = Repository::init(path).unwrap();
    commit_file(&repo, "conf/gitolite.conf", conf, "gitolite config");
    repo
}

/// Destination double: projects are bare repositories under a directory
#[derive(Debug)]
pub(crate) struct LocalPlatform {
    /// Directory holding the projects
    pub root: std::path::PathBuf,

    /// Names passed to `create_project`, in order
    pub created: Mutex<Vec<String>>,
}

impl LocalPlatform {
    /// Create a destination under `root`
    pub(crate) fn new(root: &Path) -> Self {
        create_dir_all(root).unwrap();
        Self {
            root: root.to_path_buf(),
            created: Mutex::new(vec![]),
        }
    }

    /// Open the project `name`
    pub(crate) fn open(&self, name: &str) -> Repository {
        Repository::open_bare(self.root.join(format!("{name}.git"))).unwrap()
    }
}

impl Platform for LocalPlatform {
    fn create_project(
        &self,
        name: &str,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<ProjectCreation, GitMoverError>> + Send + '_>>
    {
        let name = name.to_string();
        Box::pin(async move {
            self.created.lock().unwrap().push(name.clone());
            let path = self.root.join(format!("{name}.git"));
            if path.exists() {
                return Ok(ProjectCreation::AlreadyExists);
            }
            Repository::init_bare(&path)?;
            Ok(ProjectCreation::Created)
        })
    }

    fn get_push_url(&self, name: &str) -> String {
        self.root.join(format!("{name}.git")).display().to_string()
    }

    fn get_remote_url(&self) -> &str {
        "localhost"
    }

    fn get_username(&self) -> &str {
        "tester"
    }
}
