mod login;
mod logout;
mod me;
mod signup;
mod verify_token;

pub use login::*;
pub use logout::*;
pub use me::*;
pub use signup::*;
pub use verify_token::*;
