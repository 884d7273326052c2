mod get_workspace;
mod update_settings;

pub use get_workspace::*;
pub use update_settings::*;
