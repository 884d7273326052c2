pub mod assignments;
pub mod auth;
pub mod billing;
pub mod capacity;
pub mod invites;
pub mod projects;
pub mod skills;
pub mod team_members;
pub mod users;
pub mod workspace;
