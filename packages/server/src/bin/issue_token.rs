//! Mint a bearer token for the member API
//!
//! Signs with JWT_SECRET / JWT_ISSUER from the environment (or .env), the
//! same values the server verifies against. Prints the token to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use club_core::domains::auth::jwt::DEFAULT_TOKEN_TTL_HOURS;
use club_core::domains::auth::JwtService;
use club_core::DEFAULT_JWT_ISSUER;
use std::env;

#[derive(Parser)]
#[command(name = "issue_token")]
#[command(about = "Issue a bearer token for the member API")]
struct Cli {
    /// Subject recorded in the token and logged with each change it makes
    #[arg(long, default_value = "club-admin")]
    subject: String,

    /// Token lifetime in hours
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_HOURS)]
    hours: i64,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if cli.hours <= 0 {
        anyhow::bail!("--hours must be positive");
    }

    let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string());

    let jwt_service = JwtService::new(&secret, issuer);
    let token = jwt_service
        .create_token_with_ttl(&cli.subject, chrono::Duration::hours(cli.hours))
        .context("Failed to sign token")?;

    println!("{}", token);
    Ok(())
}
