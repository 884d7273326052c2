pub mod data_stores;
pub mod notifications;
pub mod postmark_email_client;
pub mod reports;
pub mod stripe_payment_client;
pub mod stripe_webhook;
pub mod team_import;
