mod auth;
mod billing;
mod capacity;
mod helpers;
mod invites;
mod projects;
mod team_members;
mod tenancy;
mod users;
