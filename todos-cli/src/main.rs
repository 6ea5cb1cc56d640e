//! todos CLI - run the todo HTTP API, or create its database with `--setup`

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use todos_server::db::{create_pool, setup};
use todos_server::{run_server, DbConfig, ServerConfig};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "todos",
    author,
    version,
    about = "JSON todo API backed by a document collection",
    long_about = "Serves CRUD endpoints under /todos. Database connection settings are read \
                  from DB_HOST, DB_PORT, DB_USER and DB_PASSWORD (a .env file is honoured)."
)]
struct Cli {
    /// Create the database and collection if absent, then exit
    #[arg(long)]
    setup: bool,

    /// Address to bind the HTTP server to
    #[arg(long, short = 'b', env = "TODOS_BIND", default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Optional; missing .env is fine
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    let db_config = DbConfig::from_env().context("Invalid database configuration")?;

    if cli.setup {
        return run_setup(&db_config).await;
    }

    tracing::info!(
        db_host = %db_config.host,
        db_port = db_config.port,
        "Starting todos server on {}",
        cli.bind
    );

    let pool = create_pool(&db_config);
    let config = ServerConfig {
        bind_addr: cli.bind,
    };

    // Blocks until shutdown
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}

async fn run_setup(db_config: &DbConfig) -> Result<()> {
    let outcome = setup::run(db_config).await.with_context(|| {
        format!(
            "Failed to set up database at {}:{}",
            db_config.host, db_config.port
        )
    })?;

    println!("{}", outcome.message());
    Ok(())
}
