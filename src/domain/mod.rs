mod assignment;
pub mod capacity;
mod data_stores;
mod email;
mod email_client;
mod error;
mod ids;
mod invite;
mod name;
mod password;
mod payment_client;
pub mod plan_limits;
pub mod project_health;
mod project;
mod skill;
mod team_member;
mod user;
mod user_password_hash;
mod workspace;

pub use assignment::*;
pub use data_stores::*;
pub use email::*;
pub use email_client::*;
pub use error::*;
pub use ids::*;
pub use invite::*;
pub use name::*;
pub use password::*;
pub use payment_client::*;
pub use plan_limits::{PlanLimitError, PlanLimits};
pub use project::*;
pub use skill::*;
pub use team_member::*;
pub use user::*;
pub use user_password_hash::*;
pub use workspace::*;
