//! Trait definitions for Redmine operations.
//!
//! Each entity type implements the traits its endpoints support, keeping
//! path layout and envelope differences inside the implementations.

mod create;
mod delete;
mod list;
mod show;
mod update;

pub use create::Create;
pub use delete::Delete;
pub use list::{list_all, List, DEFAULT_PAGE_SIZE};
pub use show::Show;
pub use update::Update;
