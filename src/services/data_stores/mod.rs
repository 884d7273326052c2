mod hashmap_banned_token_store;
mod hashmap_project_store;
mod hashmap_team_store;
mod hashmap_user_store;
mod hashmap_workspace_store;
mod postgres_project_store;
mod postgres_team_store;
mod postgres_user_store;
mod postgres_workspace_store;
mod redis_banned_token_store;

pub use hashmap_banned_token_store::*;
pub use hashmap_project_store::*;
pub use hashmap_team_store::*;
pub use hashmap_user_store::*;
pub use hashmap_workspace_store::*;
pub use postgres_project_store::*;
pub use postgres_team_store::*;
pub use postgres_user_store::*;
pub use postgres_workspace_store::*;
pub use redis_banned_token_store::*;
