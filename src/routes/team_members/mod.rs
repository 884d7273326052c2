mod create_team_member;
mod get_team_member;
mod import_team_members;
mod list_team_members;
mod set_team_member_active;
mod update_team_member;

pub use create_team_member::*;
pub use get_team_member::*;
pub use import_team_members::*;
pub use list_team_members::*;
pub use set_team_member_active::*;
pub use update_team_member::*;
