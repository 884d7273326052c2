mod billing_summary;
mod checkout;
mod portal;
mod stripe_webhook;

pub use billing_summary::*;
pub use checkout::*;
pub use portal::*;
pub use stripe_webhook::*;
