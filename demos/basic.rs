//! Basic example demonstrating the Redmine API client.
//!
//! Run with:
//! ```
//! REDMINE_URL=https://redmine.example.com REDMINE_API_KEY=your-key cargo run --example basic
//! ```

use redmine_api::{
    get_issues, Config, IssueListQuery, List, MyAccount, PaginationParams, Project,
    ProjectListQuery, RedmineClient, RequestContext, Show, ShowQuery, Tracker,
};

#[tokio::main]
async fn main() -> redmine_api::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Redmine client...");
    let client = RedmineClient::from_config(&Config::from_env()?)?;
    let ctx = RequestContext::new();
    println!("Connected to: {}", client.base_url());

    let account = MyAccount::show(&client, &ctx, (), &()).await?;
    println!("Authenticated as {} ({})", account.login, account.id);

    // List first page of projects
    println!("\n--- Listing Projects (first page) ---");
    let query = ProjectListQuery {
        pagination: PaginationParams::limit(10),
        ..Default::default()
    };
    let projects = Project::list(&client, &ctx, &query).await?;
    println!(
        "Found {} projects (total: {:?})",
        projects.len(),
        projects.total_count
    );
    for project in &projects {
        println!("  - {} ({})", project.name, project.identifier);
    }

    println!("\n--- Trackers ---");
    for tracker in &Tracker::list(&client, &ctx, &()).await? {
        println!("  - {} (#{})", tracker.name, tracker.id);
    }

    // Show the first project and its open issues
    if let Some(first) = projects.items.first() {
        println!("\n--- Project Details ---");
        let project = Project::show(
            &client,
            &ctx,
            first.reference(),
            &ShowQuery::include("trackers,enabled_modules"),
        )
        .await?;
        println!("Project: {}", project.name);
        println!("  Public: {}", project.is_public);
        println!("  Trackers: {}", project.trackers.len());
        println!("  Modules: {}", project.enabled_modules.len());

        println!("\n--- Open Issues ---");
        let issues = get_issues(
            &client,
            &ctx,
            &IssueListQuery {
                project_id: Some(project.id),
                status_id: Some("open".to_string()),
                sort: Some("priority:desc,id".to_string()),
                ..Default::default()
            },
        )
        .await?;
        println!("Found {} open issues", issues.len());
        for issue in issues.iter().take(10) {
            println!(
                "  #{} [{}] {} ({})",
                issue.id,
                issue.status.name,
                issue.subject,
                issue.assignee_name().unwrap_or("unassigned")
            );
        }
    }

    println!("\nDone!");
    Ok(())
}
