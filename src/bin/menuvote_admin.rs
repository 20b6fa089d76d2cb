use std::{
    env,
    io::{self, BufRead, Write},
};

use anyhow::{bail, Context, Result};
use rand::{distr::Alphanumeric, Rng};

use menuvote_backend::{
    db::{self, postgres_user_repository::PostgresUserRepository, user_repository::UserRepository},
    models::user::{ROLE_ADMIN, ROLE_USER},
    utils::{jwt::JwtKeys, password::hash_password},
};

const USAGE: &str = "usage: menuvote-admin <migrate | seed | useradd <email> <password> | keygen [path]>";
const KEY_LENGTH: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("migrate") => migrate().await,
        Some("seed") => seed().await,
        Some("useradd") => {
            let (Some(email), Some(password)) = (args.get(1), args.get(2)) else {
                bail!("useradd must be called with two additional arguments for email and password");
            };
            user_add(email, password).await
        }
        Some("keygen") => keygen(args.get(1).map(String::as_str)),
        _ => bail!("must specify a command\n{USAGE}"),
    }
}

async fn pool() -> Result<sqlx::PgPool> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    db::connect(&database_url, 2)
        .await
        .context("failed to connect to DATABASE_URL")
}

async fn migrate() -> Result<()> {
    let pool = pool().await?;
    db::migrate(&pool).await.context("failed to run migrations")?;
    println!("Migrations complete");
    Ok(())
}

async fn seed() -> Result<()> {
    let pool = pool().await?;
    db::seed::seed(&pool).await.context("failed to load seed data")?;
    println!("Seed data complete");
    Ok(())
}

async fn user_add(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        bail!("email and password must not be empty");
    }

    println!("Admin user will be created with email {email:?}");
    if !confirm("Continue?")? {
        println!("Canceling");
        return Ok(());
    }

    let repo = PostgresUserRepository { pool: pool().await? };
    let password_hash =
        hash_password(password).map_err(|err| anyhow::anyhow!("failed to hash password: {err}"))?;
    let user = repo
        .create_user(
            "",
            email.trim(),
            &password_hash,
            &[ROLE_USER.to_string(), ROLE_ADMIN.to_string()],
        )
        .await
        .context("failed to create user")?;

    println!("User created with id: {}", user.id);
    Ok(())
}

/// Prints a fresh `JWT_SECRET`, or writes it to `path` when given.
fn keygen(path: Option<&str>) -> Result<()> {
    let secret: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect();
    JwtKeys::from_secret(&secret).context("generated secret was rejected")?;

    match path {
        Some(path) => {
            std::fs::write(path, format!("{secret}\n"))
                .with_context(|| format!("failed to write key file {path}"))?;
            println!("Signing secret written to {path}");
        }
        None => println!("JWT_SECRET={secret}"),
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/n]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
