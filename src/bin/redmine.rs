//! Redmine CLI binary.
//!
//! A command-line interface for interacting with the Redmine REST API.

use std::process::ExitCode;

use clap::Parser;
use redmine_api::cli::{Cli, Command, Entity};
use redmine_api::output::PrettyPrint;
use redmine_api::{
    list_all, Attachment, Delete, ErrorKind, Group, GroupListQuery, Issue, IssueListQuery,
    IssueRelation, Journal, JournalListQuery, List, MyAccount, News, NewsListQuery, Page,
    Paginated, PaginationParams, Project, ProjectListQuery, ProjectRef, RedmineClient,
    RedmineError, RelationListQuery, RequestContext, Show, ShowQuery, TimeEntry,
    TimeEntryListQuery, Tracker, User, UserListQuery, WikiPage, WikiPageId, WikiPageListQuery,
    WikiShowQuery,
};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = match cli.config().and_then(|c| RedmineClient::from_config(&c)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set REDMINE_URL and REDMINE_API_KEY or pass --url/--api-key");
            return exit_code(&e);
        }
    };

    let ctx = RequestContext::new();
    let token = ctx.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match run(&client, &ctx, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            for message in e.messages().iter().skip(1) {
                eprintln!("       {message}");
            }
            exit_code(&e)
        }
    }
}

fn exit_code(err: &RedmineError) -> ExitCode {
    let code = match err.kind() {
        ErrorKind::InvalidInput | ErrorKind::Config => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Unauthorized | ErrorKind::Forbidden => 4,
        ErrorKind::ValidationFailed | ErrorKind::Conflict => 5,
        ErrorKind::ServiceUnavailable => 6,
        ErrorKind::Cancelled | ErrorKind::DeadlineExceeded => 130,
        _ => 1,
    };
    ExitCode::from(code)
}

async fn run(client: &RedmineClient, ctx: &RequestContext, cli: Cli) -> redmine_api::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::List {
            entity,
            project,
            issue,
            status,
            include,
            sort,
            limit,
            offset,
            all,
        } => {
            let args = ListArgs {
                project: project.as_deref().map(str::parse).transpose()?,
                issue,
                status,
                include,
                sort,
                pagination: PaginationParams { offset, limit },
                all,
            };
            handle_list(client, ctx, entity, args, json).await
        }
        Command::Show {
            entity,
            id,
            project,
            include,
            version,
        } => {
            let project: Option<ProjectRef> = project.as_deref().map(str::parse).transpose()?;
            handle_show(client, ctx, entity, id.as_deref(), project, include, version, json).await
        }
        Command::Delete {
            entity,
            id,
            project,
        } => {
            let project: Option<ProjectRef> = project.as_deref().map(str::parse).transpose()?;
            handle_delete(client, ctx, entity, &id, project).await
        }
    }
}

struct ListArgs {
    project: Option<ProjectRef>,
    issue: Option<u64>,
    status: Option<String>,
    include: Option<String>,
    sort: Option<String>,
    pagination: PaginationParams,
    all: bool,
}

impl ListArgs {
    fn require_issue(&self, entity: &str) -> redmine_api::Result<u64> {
        self.issue
            .ok_or_else(|| RedmineError::invalid(format!("--issue is required for listing {entity}")))
    }

    fn require_project(&self, entity: &str) -> redmine_api::Result<ProjectRef> {
        self.project.clone().ok_or_else(|| {
            RedmineError::invalid(format!("--project is required for listing {entity}"))
        })
    }
}

async fn handle_list(
    client: &RedmineClient,
    ctx: &RequestContext,
    entity: Entity,
    args: ListArgs,
    json: bool,
) -> redmine_api::Result<()> {
    match entity {
        Entity::Project => {
            let query = ProjectListQuery {
                status: args.status.as_deref().map(str::parse).transpose()?,
                include: args.include.clone(),
                sort: args.sort.clone(),
                pagination: args.pagination,
            };
            let page = fetch::<Project>(client, ctx, &query, args.all).await?;
            output_page(&page, json, |item| ProjectRow::from(item))?;
        }
        Entity::Issue => {
            let project_id = match &args.project {
                None => None,
                Some(ProjectRef::Id(id)) => Some(*id),
                Some(ProjectRef::Identifier(identifier)) => {
                    let project =
                        Project::show(client, ctx, identifier.as_str().into(), &ShowQuery::default())
                            .await?;
                    Some(project.id)
                }
            };
            let query = IssueListQuery {
                project_id,
                status_id: args.status.clone(),
                include: args.include.clone(),
                sort: args.sort.clone(),
                pagination: args.pagination,
                ..Default::default()
            };
            let page = fetch::<Issue>(client, ctx, &query, args.all).await?;
            output_page(&page, json, |item| IssueRow::from(item))?;
        }
        Entity::User => {
            let query = UserListQuery {
                status: args.status.as_deref().map(str::parse).transpose()?,
                sort: args.sort.clone(),
                pagination: args.pagination,
                ..Default::default()
            };
            let page = fetch::<User>(client, ctx, &query, args.all).await?;
            output_page(&page, json, |item| UserRow::from(item))?;
        }
        Entity::Group => {
            let query = GroupListQuery {
                pagination: args.pagination,
            };
            let page = fetch::<Group>(client, ctx, &query, args.all).await?;
            output_page(&page, json, |item| GroupRow::from(item))?;
        }
        Entity::TimeEntry => {
            let query = TimeEntryListQuery {
                project_id: args.project.as_ref().map(ToString::to_string),
                issue_id: args.issue,
                sort: args.sort.clone(),
                pagination: args.pagination,
                ..Default::default()
            };
            let page = fetch::<TimeEntry>(client, ctx, &query, args.all).await?;
            output_page(&page, json, |item| TimeEntryRow::from(item))?;
        }
        Entity::Wiki => {
            let query = WikiPageListQuery::new(args.require_project("wiki pages")?);
            let page = WikiPage::list(client, ctx, &query).await?;
            output_page(&page, json, |item| WikiRow::from(item))?;
        }
        Entity::Journal => {
            let query = JournalListQuery::new(args.require_issue("journals")?);
            let page = Journal::list(client, ctx, &query).await?;
            output_page(&page, json, |item| JournalRow::from(item))?;
        }
        Entity::Relation => {
            let query = RelationListQuery::new(args.require_issue("relations")?);
            let page = IssueRelation::list(client, ctx, &query).await?;
            output_page(&page, json, |item| RelationRow::from(item))?;
        }
        Entity::Tracker => {
            let page = Tracker::list(client, ctx, &()).await?;
            output_page(&page, json, |item| TrackerRow::from(item))?;
        }
        Entity::News => {
            let query = NewsListQuery {
                project: args.project.clone(),
                pagination: args.pagination,
            };
            let page = fetch::<News>(client, ctx, &query, args.all).await?;
            output_page(&page, json, |item| NewsRow::from(item))?;
        }
        Entity::Attachment | Entity::MyAccount => {
            return Err(RedmineError::invalid(format!(
                "{entity:?} cannot be listed"
            )));
        }
    }
    Ok(())
}

/// One page, or every page when `all` is set.
async fn fetch<T>(
    client: &RedmineClient,
    ctx: &RequestContext,
    query: &T::Query,
    all: bool,
) -> redmine_api::Result<Page<T>>
where
    T: List,
    T::Query: Paginated + Clone,
{
    if all {
        Ok(Page::complete(list_all::<T>(client, ctx, query).await?))
    } else {
        T::list(client, ctx, query).await
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_show(
    client: &RedmineClient,
    ctx: &RequestContext,
    entity: Entity,
    id: Option<&str>,
    project: Option<ProjectRef>,
    include: Option<String>,
    version: Option<u32>,
    json: bool,
) -> redmine_api::Result<()> {
    let query = ShowQuery { include };
    let require_id = || {
        id.ok_or_else(|| RedmineError::invalid(format!("an id is required to show {entity:?}")))
    };

    match entity {
        Entity::Project => {
            let project = Project::show(client, ctx, require_id()?.parse()?, &query).await?;
            output_single(&project, json)?;
        }
        Entity::Issue => {
            let issue = Issue::show(client, ctx, parse_id(require_id()?)?, &query).await?;
            output_single(&issue, json)?;
        }
        Entity::User => {
            let user = User::show(client, ctx, parse_id(require_id()?)?, &query).await?;
            output_single(&user, json)?;
        }
        Entity::Group => {
            let group = Group::show(client, ctx, parse_id(require_id()?)?, &query).await?;
            output_single(&group, json)?;
        }
        Entity::TimeEntry => {
            let entry = TimeEntry::show(client, ctx, parse_id(require_id()?)?, &()).await?;
            output_single(&entry, json)?;
        }
        Entity::Wiki => {
            let project = project
                .ok_or_else(|| RedmineError::invalid("--project is required for wiki pages"))?;
            let page_id = WikiPageId::new(project, require_id()?);
            let query = WikiShowQuery {
                include: query.include,
                version,
            };
            let page = WikiPage::show(client, ctx, page_id, &query).await?;
            output_single(&page, json)?;
        }
        Entity::Attachment => {
            let attachment = Attachment::show(client, ctx, parse_id(require_id()?)?, &()).await?;
            output_single(&attachment, json)?;
        }
        Entity::News => {
            let news = News::show(client, ctx, parse_id(require_id()?)?, &query).await?;
            output_single(&news, json)?;
        }
        Entity::Relation => {
            let relation = IssueRelation::show(client, ctx, parse_id(require_id()?)?, &()).await?;
            output_single(&relation, json)?;
        }
        Entity::MyAccount => {
            let account = MyAccount::show(client, ctx, (), &()).await?;
            output_single(&account, json)?;
        }
        Entity::Journal | Entity::Tracker => {
            return Err(RedmineError::invalid(format!(
                "{entity:?} can only be listed"
            )));
        }
    }
    Ok(())
}

async fn handle_delete(
    client: &RedmineClient,
    ctx: &RequestContext,
    entity: Entity,
    id: &str,
    project: Option<ProjectRef>,
) -> redmine_api::Result<()> {
    match entity {
        Entity::Project => Project::delete(client, ctx, id.parse()?).await?,
        Entity::Issue => Issue::delete(client, ctx, parse_id(id)?).await?,
        Entity::User => User::delete(client, ctx, parse_id(id)?).await?,
        Entity::Group => Group::delete(client, ctx, parse_id(id)?).await?,
        Entity::TimeEntry => TimeEntry::delete(client, ctx, parse_id(id)?).await?,
        Entity::Attachment => Attachment::delete(client, ctx, parse_id(id)?).await?,
        Entity::Relation => IssueRelation::delete(client, ctx, parse_id(id)?).await?,
        Entity::Wiki => {
            let project = project
                .ok_or_else(|| RedmineError::invalid("--project is required for wiki pages"))?;
            WikiPage::delete(client, ctx, WikiPageId::new(project, id)).await?
        }
        Entity::Journal | Entity::Tracker | Entity::News | Entity::MyAccount => {
            return Err(RedmineError::invalid(format!(
                "{entity:?} cannot be deleted"
            )));
        }
    }
    println!("Deleted {entity:?} {id}");
    Ok(())
}

fn parse_id(raw: &str) -> redmine_api::Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| RedmineError::invalid(format!("expected a numeric id, got '{raw}'")))
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> redmine_api::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_page<T, R, F>(page: &Page<T>, json: bool, to_row: F) -> redmine_api::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    } else {
        let rows: Vec<R> = page.items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        match page.total_count {
            Some(total) if !page.is_empty() => println!(
                "\nShowing {}-{} of {} total items",
                page.offset + 1,
                page.next_offset(),
                total
            ),
            Some(total) => println!("\nNo items (offset {}, {} total)", page.offset, total),
            None => println!("\n{} items", page.len()),
        }
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct ProjectRow {
    id: u64,
    identifier: String,
    name: String,
    status: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            identifier: p.identifier.clone(),
            name: p.name.clone(),
            status: p.status.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct IssueRow {
    id: u64,
    tracker: String,
    status: String,
    subject: String,
    assignee: String,
}

impl From<&Issue> for IssueRow {
    fn from(i: &Issue) -> Self {
        Self {
            id: i.id,
            tracker: i.tracker.name.clone(),
            status: i.status.name.clone(),
            subject: i.subject.clone(),
            assignee: i.assignee_name().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    id: u64,
    login: String,
    name: String,
    mail: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            login: u.login.clone(),
            name: u.full_name(),
            mail: u.mail.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct GroupRow {
    id: u64,
    name: String,
}

impl From<&Group> for GroupRow {
    fn from(g: &Group) -> Self {
        Self {
            id: g.id,
            name: g.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct TimeEntryRow {
    id: u64,
    #[tabled(rename = "spent on")]
    spent_on: String,
    hours: String,
    user: String,
    activity: String,
    issue: String,
}

impl From<&TimeEntry> for TimeEntryRow {
    fn from(t: &TimeEntry) -> Self {
        Self {
            id: t.id,
            spent_on: t.spent_on.to_string(),
            hours: format!("{:.2}", t.hours),
            user: t.user.name.clone(),
            activity: t.activity.name.clone(),
            issue: t.issue.map(|i| format!("#{}", i.id)).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct WikiRow {
    title: String,
    version: String,
    parent: String,
}

impl From<&WikiPage> for WikiRow {
    fn from(w: &WikiPage) -> Self {
        Self {
            title: w.title.clone(),
            version: w.version.map(|v| v.to_string()).unwrap_or_default(),
            parent: w.parent.as_ref().map(|p| p.title.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct JournalRow {
    id: u64,
    user: String,
    notes: String,
    changes: usize,
}

impl From<&Journal> for JournalRow {
    fn from(j: &Journal) -> Self {
        Self {
            id: j.id,
            user: j.user.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
            notes: j.notes.clone().unwrap_or_default(),
            changes: j.details.len(),
        }
    }
}

#[derive(Tabled)]
struct RelationRow {
    id: u64,
    issue: u64,
    relation: String,
    #[tabled(rename = "issue to")]
    issue_to: u64,
}

impl From<&IssueRelation> for RelationRow {
    fn from(r: &IssueRelation) -> Self {
        Self {
            id: r.id,
            issue: r.issue_id,
            relation: r.relation_type.to_string(),
            issue_to: r.issue_to_id,
        }
    }
}

#[derive(Tabled)]
struct TrackerRow {
    id: u64,
    name: String,
}

impl From<&Tracker> for TrackerRow {
    fn from(t: &Tracker) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct NewsRow {
    id: u64,
    project: String,
    title: String,
}

impl From<&News> for NewsRow {
    fn from(n: &News) -> Self {
        Self {
            id: n.id,
            project: n.project.name.clone(),
            title: n.title.clone(),
        }
    }
}
