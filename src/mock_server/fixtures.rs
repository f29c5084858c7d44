//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::{Issue, IssueParent, MyAccount, NamedRef, Project, ProjectStatus, TimeEntry, WikiPage};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Catalogue
    // =========================================================================

    /// Trackers known to the mock server.
    pub fn trackers() -> Vec<NamedRef> {
        vec![
            Self::named(1, "Bug"),
            Self::named(2, "Feature"),
            Self::named(3, "Support"),
        ]
    }

    /// Issue statuses known to the mock server. Only `Closed` is closed.
    pub fn statuses() -> Vec<NamedRef> {
        vec![
            Self::named(1, "New"),
            Self::named(2, "In Progress"),
            Self::named(3, "Resolved"),
            Self::named(5, "Closed"),
        ]
    }

    /// Time entry activities known to the mock server.
    pub fn activities() -> Vec<NamedRef> {
        vec![Self::named(8, "Design"), Self::named(9, "Development")]
    }

    /// Build a cross-reference.
    pub fn named(id: u64, name: &str) -> NamedRef {
        NamedRef {
            id,
            name: name.to_string(),
        }
    }

    // =========================================================================
    // Project Fixtures
    // =========================================================================

    /// Create an active public project.
    pub fn project(id: u64, identifier: &str, name: &str) -> Project {
        let created = Utc.with_ymd_and_hms(2024, 1, 8, 9, 30, 0).single();
        Project {
            id,
            name: name.to_string(),
            identifier: identifier.to_string(),
            description: Some(String::new()),
            homepage: None,
            parent: None,
            status: Some(ProjectStatus::Active),
            is_public: true,
            inherit_members: false,
            custom_fields: vec![],
            trackers: Self::trackers(),
            issue_categories: vec![],
            enabled_modules: vec![],
            time_entry_activities: Self::activities(),
            issue_custom_fields: vec![],
            created_on: created,
            updated_on: created,
        }
    }

    // =========================================================================
    // Issue Fixtures
    // =========================================================================

    /// Create a new bug in `project`.
    pub fn issue(id: u64, project: &Project, subject: &str) -> Issue {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single();
        Issue {
            id,
            project: Self::named(project.id, &project.name),
            tracker: Self::named(1, "Bug"),
            status: Self::named(1, "New"),
            priority: Self::named(2, "Normal"),
            author: Self::named(1, "Redmine Admin"),
            assigned_to: None,
            category: None,
            fixed_version: None,
            parent: None,
            subject: subject.to_string(),
            description: Some(String::new()),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            due_date: None,
            done_ratio: 0,
            is_private: false,
            estimated_hours: None,
            spent_hours: None,
            custom_fields: vec![],
            created_on: created,
            updated_on: created,
            closed_on: None,
            children: vec![],
            attachments: vec![],
            relations: vec![],
            changesets: vec![],
            journals: vec![],
            watchers: vec![],
            allowed_statuses: vec![],
        }
    }

    /// Create an issue assigned to someone.
    pub fn assigned_issue(id: u64, project: &Project, subject: &str, assignee: NamedRef) -> Issue {
        let mut issue = Self::issue(id, project, subject);
        issue.assigned_to = Some(assignee);
        issue
    }

    // =========================================================================
    // Time Entry Fixtures
    // =========================================================================

    /// Create a development time entry logged against an issue.
    pub fn time_entry(id: u64, issue: &Issue, hours: f64) -> TimeEntry {
        TimeEntry {
            id,
            project: issue.project.clone(),
            issue: Some(IssueParent { id: issue.id }),
            user: Self::named(1, "Redmine Admin"),
            activity: Self::named(9, "Development"),
            hours,
            comments: String::new(),
            spent_on: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or_default(),
            custom_fields: vec![],
            created_on: Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).single(),
            updated_on: None,
        }
    }

    // =========================================================================
    // Wiki Fixtures
    // =========================================================================

    /// Create the first version of a wiki page.
    pub fn wiki_page(title: &str, text: &str) -> WikiPage {
        let created = Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).single();
        WikiPage {
            title: title.to_string(),
            parent: None,
            text: Some(text.to_string()),
            version: Some(1),
            author: Some(Self::named(1, "Redmine Admin")),
            comments: Some(String::new()),
            created_on: created,
            updated_on: created,
            attachments: vec![],
        }
    }

    // =========================================================================
    // Account Fixtures
    // =========================================================================

    /// The administrator owning the test API key.
    pub fn admin_account() -> MyAccount {
        MyAccount {
            id: 1,
            login: "admin".to_string(),
            admin: true,
            firstname: "Redmine".to_string(),
            lastname: "Admin".to_string(),
            mail: Some("admin@example.net".to_string()),
            api_key: None,
            created_on: Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).single(),
            last_login_on: None,
            custom_fields: vec![],
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Create a default test scenario with related entities.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario with related entities.
///
/// Two projects (`platform` #5 and `docs` #6), four issues (#40-#43, three of
/// them in `platform`), one time entry on #42 and a `Home` wiki page in `docs`.
pub struct DefaultScenario {
    pub projects: Vec<Project>,
    pub issues: Vec<Issue>,
    pub time_entries: Vec<TimeEntry>,
    pub wiki_pages: Vec<(u64, WikiPage)>,
    pub account: MyAccount,
}

impl DefaultScenario {
    fn new() -> Self {
        let platform = Fixtures::project(5, "platform", "Platform");
        let docs = Fixtures::project(6, "docs", "Documentation");

        let issues = vec![
            Fixtures::issue(40, &platform, "Login page times out"),
            Fixtures::assigned_issue(
                41,
                &platform,
                "Add SAML support",
                Fixtures::named(3, "John Smith"),
            ),
            Fixtures::issue(42, &platform, "Crash on empty upload"),
            Fixtures::issue(43, &docs, "Document the REST API"),
        ];

        let time_entries = vec![Fixtures::time_entry(11, &issues[2], 1.5)];

        let wiki_pages = vec![(docs.id, Fixtures::wiki_page("Home", "h1. Welcome"))];

        Self {
            projects: vec![platform, docs],
            issues,
            time_entries,
            wiki_pages,
            account: Fixtures::admin_account(),
        }
    }
}

impl Default for DefaultScenario {
    fn default() -> Self {
        Self::new()
    }
}
