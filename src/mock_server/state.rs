//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Redmine server.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{Issue, MyAccount, NamedRef, Project, TimeEntry, WikiPage};

/// State shared between the server task and the test.
pub type SharedState = Arc<RwLock<MockState>>;

/// In-memory store for the mock server.
///
/// Wiki pages keep every stored version, oldest first; the last entry is the
/// current page.
#[derive(Debug, Default)]
pub struct MockState {
    pub projects: BTreeMap<u64, Project>,
    pub issues: BTreeMap<u64, Issue>,
    pub time_entries: BTreeMap<u64, TimeEntry>,
    /// Versions keyed by (project id, title).
    pub wiki_pages: BTreeMap<(u64, String), Vec<WikiPage>>,
    /// The user owning the API key.
    pub account: Option<MyAccount>,
    /// If set, requests must send this key in `X-Redmine-API-Key`.
    pub required_api_key: Option<String>,
    last_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Add a project to the state.
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.id, project);
        self
    }

    /// Add an issue to the state.
    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.issues.insert(issue.id, issue);
        self
    }

    /// Add a time entry to the state.
    pub fn with_time_entry(mut self, entry: TimeEntry) -> Self {
        self.time_entries.insert(entry.id, entry);
        self
    }

    /// Add a wiki page (as its first version) to a project.
    pub fn with_wiki_page(mut self, project_id: u64, page: WikiPage) -> Self {
        self.wiki_pages
            .insert((project_id, page.title.clone()), vec![page]);
        self
    }

    /// Set the account returned by `my/account.json`.
    pub fn with_account(mut self, account: MyAccount) -> Self {
        self.account = Some(account);
        self
    }

    /// Require requests to authenticate with `key`.
    pub fn with_required_api_key(mut self, key: &str) -> Self {
        self.required_api_key = Some(key.to_string());
        self
    }

    /// Allocate an id not used by any stored project, issue or time entry.
    pub fn allocate_id(&mut self) -> u64 {
        let highest = [
            self.projects.keys().next_back(),
            self.issues.keys().next_back(),
            self.time_entries.keys().next_back(),
        ]
        .into_iter()
        .flatten()
        .copied()
        .max()
        .unwrap_or(0);
        self.last_id = self.last_id.max(highest) + 1;
        self.last_id
    }

    /// The acting user as a cross-reference.
    pub fn current_user(&self) -> NamedRef {
        match &self.account {
            Some(account) => NamedRef {
                id: account.id,
                name: format!("{} {}", account.firstname, account.lastname)
                    .trim()
                    .to_string(),
            },
            None => NamedRef {
                id: 1,
                name: "Redmine Admin".to_string(),
            },
        }
    }

    /// Find a project by numeric id or identifier.
    pub fn find_project(&self, key: &str) -> Option<&Project> {
        match key.parse::<u64>() {
            Ok(id) => self.projects.get(&id),
            Err(_) => self.projects.values().find(|p| p.identifier == key),
        }
    }

    /// Current version of a wiki page.
    pub fn wiki_page(&self, project_id: u64, title: &str) -> Option<&WikiPage> {
        self.wiki_pages
            .get(&(project_id, title.to_string()))
            .and_then(|versions| versions.last())
    }

    /// Issues of a project (all issues when `project_id` is `None`), by id.
    pub fn list_issues(&self, project_id: Option<u64>) -> Vec<&Issue> {
        self.issues
            .values()
            .filter(|i| project_id.map_or(true, |p| i.project.id == p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;

    #[test]
    fn test_state_find_project_by_id_or_identifier() {
        let state = MockState::new().with_project(Fixtures::project(5, "platform", "Platform"));

        assert_eq!(state.find_project("5").map(|p| p.id), Some(5));
        assert_eq!(state.find_project("platform").map(|p| p.id), Some(5));
        assert!(state.find_project("missing").is_none());
    }

    #[test]
    fn test_allocate_id_skips_existing() {
        let project = Fixtures::project(5, "platform", "Platform");
        let mut state = MockState::new()
            .with_issue(Fixtures::issue(42, &project, "Crash"))
            .with_project(project);

        assert_eq!(state.allocate_id(), 43);
        assert_eq!(state.allocate_id(), 44);
    }

    #[test]
    fn test_list_issues_by_project() {
        let platform = Fixtures::project(5, "platform", "Platform");
        let docs = Fixtures::project(6, "docs", "Docs");
        let state = MockState::new()
            .with_issue(Fixtures::issue(1, &platform, "A"))
            .with_issue(Fixtures::issue(2, &docs, "B"))
            .with_issue(Fixtures::issue(3, &platform, "C"));

        assert_eq!(state.list_issues(Some(5)).len(), 2);
        assert_eq!(state.list_issues(None).len(), 3);
    }
}
