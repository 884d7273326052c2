mod change_role;
mod list_users;
mod set_user_active;

pub use change_role::*;
pub use list_users::*;
pub use set_user_active::*;
