//! Redmine API model types.

mod attachment;
mod common;
mod group;
mod issue;
mod journal;
mod my_account;
mod news;
mod project;
mod relation;
pub(crate) mod rest;
mod time_entry;
mod tracker;
mod user;
mod wiki;

pub use attachment::*;
pub use common::*;
pub use group::*;
pub use issue::*;
pub use journal::*;
pub use my_account::*;
pub use news::*;
pub use project::*;
pub use relation::*;
pub use time_entry::*;
pub use tracker::*;
pub use user::*;
pub use wiki::*;
