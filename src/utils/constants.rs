use dotenvy::dotenv;
use lazy_static::lazy_static;
use secrecy::Secret;
use std::env as std_env;

lazy_static! {
    pub static ref JWT_SECRET: Secret<String> =
        load_required(env::JWT_SECRET_ENV_VAR);
    pub static ref APP_URL: String =
        load_or_default(env::APP_URL_ENV_VAR, "http://localhost:3000");
    pub static ref DATABASE_URL: Secret<String> =
        load_required(env::DATABASE_URL_ENV_VAR);
    pub static ref POSTMARK_AUTH_TOKEN: Secret<String> =
        load_required(env::POSTMARK_AUTH_TOKEN_ENV_VAR);
    pub static ref POSTMARK_EMAIL_SENDER_ADDRESS: Secret<String> =
        load_required(env::POSTMARK_EMAIL_SENDER_ADDRESS_ENV_VAR);
    pub static ref REDIS_HOST_NAME: String =
        load_or_default(env::REDIS_HOST_NAME_ENV_VAR, DEFAULT_REDIS_HOSTNAME);
    pub static ref STRIPE_SECRET_KEY: Secret<String> =
        load_required(env::STRIPE_SECRET_KEY_ENV_VAR);
    pub static ref STRIPE_WEBHOOK_SECRET: Secret<String> =
        load_required(env::STRIPE_WEBHOOK_SECRET_ENV_VAR);
    pub static ref STRIPE_PRICE_STARTER: String =
        load_or_default(env::STRIPE_PRICE_STARTER_ENV_VAR, "price_starter");
    pub static ref STRIPE_PRICE_PRO: String =
        load_or_default(env::STRIPE_PRICE_PRO_ENV_VAR, "price_pro");
    pub static ref STRIPE_PRICE_AGENCY: String =
        load_or_default(env::STRIPE_PRICE_AGENCY_ENV_VAR, "price_agency");
}

fn load_env() {
    dotenv().ok();
}

fn load_required(variable_name: &str) -> Secret<String> {
    load_env();
    let value = std_env::var(variable_name)
        .unwrap_or_else(|_| panic!("{variable_name} must be set."));
    if value.is_empty() {
        panic!("{variable_name} must not be empty.");
    }
    Secret::new(value)
}

fn load_or_default(variable_name: &str, default_value: &str) -> String {
    load_env();

    match std_env::var(variable_name) {
        Ok(value) if !value.is_empty() => value,
        _ => String::from(default_value),
    }
}

pub mod env {
    pub const APP_URL_ENV_VAR: &str = "APP_URL";
    pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
    pub const JWT_SECRET_ENV_VAR: &str = "JWT_SECRET";
    pub const POSTMARK_AUTH_TOKEN_ENV_VAR: &str = "POSTMARK_AUTH_TOKEN";
    pub const POSTMARK_EMAIL_SENDER_ADDRESS_ENV_VAR: &str =
        "POSTMARK_EMAIL_SENDER_ADDRESS";
    pub const REDIS_HOST_NAME_ENV_VAR: &str = "REDIS_HOST_NAME";
    pub const STRIPE_SECRET_KEY_ENV_VAR: &str = "STRIPE_SECRET_KEY";
    pub const STRIPE_WEBHOOK_SECRET_ENV_VAR: &str = "STRIPE_WEBHOOK_SECRET";
    pub const STRIPE_PRICE_STARTER_ENV_VAR: &str = "STRIPE_PRICE_STARTER";
    pub const STRIPE_PRICE_PRO_ENV_VAR: &str = "STRIPE_PRICE_PRO";
    pub const STRIPE_PRICE_AGENCY_ENV_VAR: &str = "STRIPE_PRICE_AGENCY";
}

pub const JWT_COOKIE_NAME: &str = "jwt";
pub const DEFAULT_REDIS_HOSTNAME: &str = "127.0.0.1";

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
    pub mod email_client {
        use std::time::Duration;

        pub const BASE_URL: &str = "https://api.postmarkapp.com";
        pub const TIMEOUT: Duration = std::time::Duration::from_secs(10);
    }
    pub mod payment_client {
        use std::time::Duration;

        pub const BASE_URL: &str = "https://api.stripe.com";
        pub const TIMEOUT: Duration = std::time::Duration::from_secs(20);
    }
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
    pub mod email_client {
        use std::time::Duration;

        pub const SENDER: &str = "test@email.com";
        pub const TIMEOUT: Duration = std::time::Duration::from_millis(200);
    }
}
