use dotenvy::dotenv;
use std::env;

use lawdesk::config::AppConfig;
use lawdesk::database::{self, user_repo};
use lawdesk::models::Role;

const USAGE: &str =
    "usage: provision_user <id> <client|lawyer> <email> <full name> [specialization] [city]";

/// Inserts a user row for an account that already exists at the auth provider.
#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 4 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    let role = match args[1].as_str() {
        "client" => Role::Client,
        "lawyer" => Role::Lawyer,
        other => {
            eprintln!("unknown role {:?}\n{}", other, USAGE);
            std::process::exit(2);
        }
    };

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(1);
        }
    };
    let pool = match database::connect(&config.database_url, 1).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("cannot open database: {}", e);
            std::process::exit(1);
        }
    };

    let created_at = database::now_timestamp();
    let result = user_repo::insert_user(
        &pool,
        user_repo::NewUser {
            id: &args[0],
            role,
            full_name: &args[3],
            email: &args[2],
            specialization: args.get(4).map(String::as_str),
            city: args.get(5).map(String::as_str),
            bio: None,
            created_at: &created_at,
        },
    )
    .await;

    match result {
        Ok(()) => println!("provisioned {} ({})", args[0], role.as_str()),
        Err(e) => {
            eprintln!("provision failed: {}", e);
            std::process::exit(1);
        }
    }
}
