use anyhow::{Context, Result};

use super::config_model::{Database, DotEnvyConfig, Resend, Server, Stripe, Supabase};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .context("SERVER_PORT is invalid")?
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .context("SERVER_BODY_LIMIT is invalid")?
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .context("SERVER_TIMEOUT is invalid")?
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
    };

    let stripe = Stripe {
        secret_key: std::env::var("STRIPE_SECRET_KEY").context("STRIPE_SECRET_KEY is invalid")?,
        webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
            .context("STRIPE_WEBHOOK_SECRET is invalid")?,
        success_url: std::env::var("CHECKOUT_SUCCESS_URL")
            .context("CHECKOUT_SUCCESS_URL is invalid")?,
        cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
            .context("CHECKOUT_CANCEL_URL is invalid")?,
    };

    let supabase = Supabase {
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET")
            .context("SUPABASE_JWT_SECRET is invalid")?,
    };

    let resend = match std::env::var("RESEND_API_KEY") {
        Ok(api_key) if !api_key.trim().is_empty() => Some(Resend {
            api_key,
            from_address: std::env::var("RESEND_FROM_ADDRESS")
                .unwrap_or_else(|_| "orders@orb-market.local".to_string()),
        }),
        _ => None,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        stripe,
        supabase,
        resend,
    })
}

pub fn get_supabase_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    std::env::var("SUPABASE_JWT_SECRET").context("SUPABASE_JWT_SECRET is invalid")
}
