mod accept_invite;
mod create_invite;
mod list_invites;
mod revoke_invite;

pub use accept_invite::*;
pub use create_invite::*;
pub use list_invites::*;
pub use revoke_invite::*;
