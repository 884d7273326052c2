mod archive_project;
mod create_project;
mod get_project;
mod list_projects;
mod project_health;
mod update_project;

pub use archive_project::*;
pub use create_project::*;
pub use get_project::*;
pub use list_projects::*;
pub use project_health::*;
pub use update_project::*;
