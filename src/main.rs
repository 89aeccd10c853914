use applicant_tracker::{
    config::init_config,
    models::user::NewUser,
    routes,
    utils::{crypto::hash_password, telemetry::init_tracing},
    AppState,
};
use axum::{extract::Request, ServiceExt};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "applicant-tracker",
    about = "Applicant tracking API and account administration",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve,
    /// Create a staff account and grant it permissions
    CreateUser(CreateUserArgs),
    /// Remove a staff account
    DeleteUser {
        #[arg(long)]
        username: String,
    },
}

#[derive(Args, Debug)]
struct CreateUserArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Permission codename to grant; repeatable
    #[arg(long = "permission")]
    permissions: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = init_config()?;
    init_tracing(config.log_format);

    let state = applicant_tracker::connect(config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state, &config.server_address).await,
        Command::CreateUser(args) => create_user(&state, args).await,
        Command::DeleteUser { username } => delete_user(&state, &username).await,
    }
}

async fn serve(state: AppState, address: &str) -> anyhow::Result<()> {
    let app = routes::app(state);
    let listener = TcpListener::bind(address).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

async fn create_user(state: &AppState, args: CreateUserArgs) -> anyhow::Result<()> {
    let user = state
        .users
        .create_user(NewUser {
            username: args.username,
            email: args.email,
            password_hash: Some(hash_password(&args.password)?),
        })
        .await?;
    if !args.permissions.is_empty() {
        state.users.grant_permissions(user.id, &args.permissions).await?;
    }
    info!(user = %user.username, id = %user.id, granted = ?args.permissions, "user created");
    Ok(())
}

async fn delete_user(state: &AppState, username: &str) -> anyhow::Result<()> {
    let user = state
        .users
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no user named {}", username))?;
    state.users.delete_user(user.id).await?;
    info!(user = %username, "user deleted");
    Ok(())
}
