use mock_server::{AdminCredentials, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3030".to_string());
    let defaults = AdminCredentials::default();
    let admin = AdminCredentials {
        username: std::env::var("ADMIN_USERNAME").unwrap_or(defaults.username),
        password: std::env::var("ADMIN_PASSWORD").unwrap_or(defaults.password),
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "metrics mock server listening");
    mock_server::serve(listener, AppState::new(admin)).await
}
