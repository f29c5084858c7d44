//! Redmine REST API client library.
//!
//! A Rust library for interacting with the Redmine REST API using a
//! trait-based architecture where each operation (List, Show, Create,
//! Update, Delete) is defined as a trait that entity types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use redmine_api::{
//!     Issue, IssueListQuery, List, PaginationParams, RedmineClient, RequestContext, Show,
//!     ShowQuery,
//! };
//!
//! #[tokio::main]
//! async fn main() -> redmine_api::Result<()> {
//!     let client = RedmineClient::new("https://redmine.example.com", "your-api-key")?;
//!     let ctx = RequestContext::new();
//!
//!     // First page of open issues in project 5
//!     let query = IssueListQuery {
//!         project_id: Some(5),
//!         status_id: Some("open".to_string()),
//!         pagination: PaginationParams::limit(25),
//!         ..Default::default()
//!     };
//!     let page = Issue::list(&client, &ctx, &query).await?;
//!     println!("{} of {:?} issues", page.len(), page.total_count);
//!
//!     // One issue with its history
//!     let issue = Issue::show(&client, &ctx, 42, &ShowQuery::include("journals")).await?;
//!     println!("#{} has {} journal entries", issue.id, issue.journals.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`RedmineClient`] - stateless transport: auth header, JSON, error mapping
//! - [`resource`] - one table describing every resource family
//! - [`query`] - options structs to deterministic query strings
//! - [`List`], [`Show`], [`Create`], [`Update`], [`Delete`] - operation traits
//!
//! Every operation takes a [`RequestContext`] carrying cancellation and an
//! optional deadline. Failures are reported as [`RedmineError`]; use
//! [`RedmineError::kind`] to branch on the category.
//!
//! # Configuration
//!
//! The library never reads the environment on its own. [`Config::from_env`]
//! is available for binaries:
//!
//! - `REDMINE_URL` (required) - Base URL of the instance
//! - `REDMINE_API_KEY` (required) - API access key
//! - `REDMINE_TIMEOUT_SECS` (optional) - Per-request timeout

pub mod cli;
mod client;
pub mod config;
mod context;
mod error;
mod models;
pub mod output;
mod pagination;
pub mod query;
pub mod resource;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{RedmineClient, API_KEY_HEADER, DEFAULT_TIMEOUT};
pub use config::Config;
pub use context::RequestContext;
pub use error::{ErrorKind, RedmineError, Result};
pub use pagination::{Page, Paginated, PaginationParams};

// Re-export traits
pub use traits::{list_all, Create, Delete, List, Show, Update, DEFAULT_PAGE_SIZE};

// Re-export models
pub use models::{
    // Shared records
    CustomField,
    CustomFieldValue,
    CustomValue,
    Membership,
    NamedRef,
    ProjectRef,
    ShowQuery,
    UploadRef,
    // Projects
    Project,
    ProjectCreate,
    ProjectListQuery,
    ProjectStatus,
    ProjectUpdate,
    // Issues
    Changeset,
    Issue,
    IssueChild,
    IssueCreate,
    IssueListQuery,
    IssueParent,
    IssueUpdate,
    // Users and groups
    Group,
    GroupCreate,
    GroupListQuery,
    GroupUpdate,
    MailNotification,
    MyAccount,
    MyAccountUpdate,
    User,
    UserCreate,
    UserListQuery,
    UserStatus,
    UserUpdate,
    // Time tracking
    TimeEntry,
    TimeEntryCreate,
    TimeEntryListQuery,
    TimeEntryUpdate,
    // Wiki
    WikiPage,
    WikiPageId,
    WikiPageListQuery,
    WikiPageWrite,
    WikiParent,
    WikiShowQuery,
    WikiUpsert,
    // Attachments
    Attachment,
    AttachmentUpdate,
    // History and catalogue
    Journal,
    JournalDetail,
    JournalListQuery,
    News,
    NewsComment,
    NewsListQuery,
    Tracker,
    // Relations
    IssueRelation,
    RelationCreate,
    RelationListQuery,
    RelationType,
};

// Re-export convenience functions
pub use models::get_issues;
