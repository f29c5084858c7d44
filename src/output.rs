//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::{
    Attachment, Group, Issue, IssueRelation, MyAccount, News, Project, TimeEntry, User, WikiPage,
};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn header(title: String) -> Vec<String> {
    let divider = "─".repeat(title.chars().count().max(30));
    vec![title, divider]
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Project: {} ({})", self.name, self.identifier));
        lines.push(format!("ID:             {}", self.id));

        if let Some(ref status) = self.status {
            lines.push(format!("Status:         {status}"));
        }
        if let Some(ref parent) = self.parent {
            lines.push(format!("Parent:         {} (#{})", parent.name, parent.id));
        }
        lines.push(format!(
            "Visibility:     {}",
            if self.is_public { "public" } else { "private" }
        ));
        if let Some(ref homepage) = self.homepage {
            lines.push(format!("Homepage:       {homepage}"));
        }
        if !self.trackers.is_empty() {
            let names: Vec<&str> = self.trackers.iter().map(|t| t.name.as_str()).collect();
            lines.push(format!("Trackers:       {}", names.join(", ")));
        }
        if let Some(ref created) = self.created_on {
            lines.push(format!("Created:        {}", timestamp(created)));
        }
        if let Some(ref description) = self.description {
            if !description.is_empty() {
                lines.push(String::new());
                lines.push(description.clone());
            }
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Issue {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("{} #{}: {}", self.tracker.name, self.id, self.subject));
        lines.push(format!("Project:        {}", self.project.name));
        lines.push(format!("Status:         {}", self.status.name));
        lines.push(format!("Priority:       {}", self.priority.name));
        lines.push(format!("Author:         {}", self.author.name));

        if let Some(assignee) = self.assignee_name() {
            lines.push(format!("Assignee:       {assignee}"));
        }
        if let Some(ref version) = self.fixed_version {
            lines.push(format!("Target:         {}", version.name));
        }
        if let Some(due) = self.due_date {
            lines.push(format!("Due:            {due}"));
        }
        lines.push(format!("Done:           {}%", self.done_ratio));
        if let Some(ref updated) = self.updated_on {
            lines.push(format!("Updated:        {}", timestamp(updated)));
        }
        if !self.watchers.is_empty() {
            lines.push(format!("Watchers:       {}", self.watchers.len()));
        }
        if let Some(ref description) = self.description {
            if !description.is_empty() {
                lines.push(String::new());
                lines.push(description.clone());
            }
        }

        for journal in self.journals.iter().filter(|j| j.has_notes()) {
            let who = journal
                .user
                .as_ref()
                .map(|u| u.name.as_str())
                .unwrap_or("unknown");
            lines.push(String::new());
            lines.push(format!("── note #{} by {who}", journal.id));
            lines.push(journal.notes.clone().unwrap_or_default());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for User {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("User: {}", self.login));
        lines.push(format!("ID:             {}", self.id));
        lines.push(format!("Name:           {}", self.full_name()));
        if let Some(ref mail) = self.mail {
            lines.push(format!("Mail:           {mail}"));
        }
        if let Some(ref status) = self.status {
            lines.push(format!("Status:         {status}"));
        }
        if self.admin {
            lines.push("Admin:          yes".to_string());
        }
        if let Some(ref last_login) = self.last_login_on {
            lines.push(format!("Last login:     {}", timestamp(last_login)));
        }
        if !self.groups.is_empty() {
            let names: Vec<&str> = self.groups.iter().map(|g| g.name.as_str()).collect();
            lines.push(format!("Groups:         {}", names.join(", ")));
        }
        lines.join("\n")
    }
}

impl PrettyPrint for MyAccount {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Account: {}", self.login));
        lines.push(format!("ID:             {}", self.id));
        lines.push(format!("Name:           {} {}", self.firstname, self.lastname));
        if let Some(ref mail) = self.mail {
            lines.push(format!("Mail:           {mail}"));
        }
        lines.join("\n")
    }
}

impl PrettyPrint for Group {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Group: {}", self.name));
        lines.push(format!("ID:             {}", self.id));
        for user in &self.users {
            lines.push(format!("  - {} (#{})", user.name, user.id));
        }
        lines.join("\n")
    }
}

impl PrettyPrint for TimeEntry {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Time entry #{}", self.id));
        lines.push(format!("Hours:          {:.2}", self.hours));
        lines.push(format!("Spent on:       {}", self.spent_on));
        lines.push(format!("Project:        {}", self.project.name));
        if let Some(ref issue) = self.issue {
            lines.push(format!("Issue:          #{}", issue.id));
        }
        lines.push(format!("User:           {}", self.user.name));
        lines.push(format!("Activity:       {}", self.activity.name));
        if !self.comments.is_empty() {
            lines.push(format!("Comments:       {}", self.comments));
        }
        lines.join("\n")
    }
}

impl PrettyPrint for WikiPage {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Wiki: {}", self.title));
        if let Some(version) = self.version {
            lines.push(format!("Version:        {version}"));
        }
        if let Some(ref author) = self.author {
            lines.push(format!("Author:         {}", author.name));
        }
        if let Some(ref updated) = self.updated_on {
            lines.push(format!("Updated:        {}", timestamp(updated)));
        }
        if let Some(ref text) = self.text {
            lines.push(String::new());
            lines.push(text.clone());
        }
        lines.join("\n")
    }
}

impl PrettyPrint for Attachment {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("Attachment: {}", self.filename));
        lines.push(format!("ID:             {}", self.id));
        lines.push(format!("Size:           {} bytes", self.filesize));
        if let Some(ref content_type) = self.content_type {
            lines.push(format!("Type:           {content_type}"));
        }
        if let Some(ref description) = self.description {
            lines.push(format!("Description:    {description}"));
        }
        if let Some(ref url) = self.content_url {
            lines.push(format!("URL:            {url}"));
        }
        lines.join("\n")
    }
}

impl PrettyPrint for News {
    fn pretty_print(&self) -> String {
        let mut lines = header(format!("News: {}", self.title));
        lines.push(format!("Project:        {}", self.project.name));
        lines.push(format!("Author:         {}", self.author.name));
        if let Some(ref created) = self.created_on {
            lines.push(format!("Published:      {}", timestamp(created)));
        }
        if let Some(ref summary) = self.summary {
            lines.push(format!("Summary:        {summary}"));
        }
        if let Some(ref description) = self.description {
            lines.push(String::new());
            lines.push(description.clone());
        }
        lines.join("\n")
    }
}

impl PrettyPrint for IssueRelation {
    fn pretty_print(&self) -> String {
        let mut line = format!(
            "Relation #{}: #{} {} #{}",
            self.id, self.issue_id, self.relation_type, self.issue_to_id
        );
        if let Some(delay) = self.delay {
            line.push_str(&format!(" (delay {delay}d)"));
        }
        line
    }
}
