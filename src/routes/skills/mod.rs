mod create_skill;
mod delete_skill;
mod list_skills;

pub use create_skill::*;
pub use delete_skill::*;
pub use list_skills::*;
