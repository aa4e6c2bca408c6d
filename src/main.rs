use tokio::net::TcpListener;

use unipet::config::Config;
use unipet::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unipet=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env();
    print_banner(&config);

    let db = unipet::db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    let state = AppState {
        db,
        slugs: config.slugs,
        public_url: config.public_url.clone(),
    };

    let app = unipet::routes::router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("failed to bind");

    let actual_port = listener
        .local_addr()
        .expect("failed to get local address")
        .port();
    tracing::info!("listening on 0.0.0.0:{actual_port}");

    axum::serve(listener, app).await.expect("server error");
}

fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");

    eprintln!();
    eprintln!("  \x1b[1;36munipet\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mport\x1b[0m         {}", config.port);
    eprintln!("  \x1b[2mdatabase\x1b[0m     {}", config.database_url);
    eprintln!("  \x1b[2mpublic url\x1b[0m   {}", config.public_url);
    eprintln!(
        "  \x1b[2mslug cap\x1b[0m     {} attempts",
        config.slugs.max_attempts
    );

    eprintln!();
}
