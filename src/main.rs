//! Fleetboard - microservice status dashboard

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetboard::{
    api::{build_router, AppState},
    config::{get_config_path, load_config, Config},
    db::{init_database, SqliteStore},
    deploy::{AppSortColumn, ServiceView, SortDirection},
    domain::ViewMode,
    filter,
    integrations::BackendClient,
    session::Dashboard,
};

#[derive(Parser)]
#[command(name = "fleetboard")]
#[command(version)]
#[command(about = "Microservice status dashboard with custom field sets, filters and rollout status")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Settings database path
    #[arg(short, long)]
    database: Option<String>,

    /// Backend API base URL
    #[arg(short, long, env = "FLEETBOARD_BACKEND")]
    backend: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve,
    /// Initialize the settings database
    Init,
    /// Show configuration info
    Config,
    /// Print the filtered, sorted repository list
    Repos {
        /// Free-text query; the stored text filter is used when absent
        #[arg(short, long)]
        query: Option<String>,

        /// card or table
        #[arg(short, long)]
        view: Option<String>,
    },
    /// Print the deployment table of one service
    Service {
        repo: String,

        /// Only apps whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetboard=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = load_config();

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.storage.path = Some(database);
    }
    if let Some(backend) = cli.backend {
        config.backend.base_url = backend;
    }

    let db_path = config.storage.get_path().to_string_lossy().to_string();

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing database at: {}", db_path);
            init_database(&db_path).await?;
            println!("Database initialized successfully!");
            Ok(())
        }
        Some(Commands::Config) => {
            println!("Fleetboard Configuration");
            println!("========================");
            println!("Config file: {}", get_config_path().display());
            println!("Database path: {}", db_path);
            println!("Backend: {}", config.backend.base_url);
            println!("Server: {}:{}", config.server.host, config.server.port);
            println!("Text filter debounce: {}ms", config.dashboard.debounce_ms);
            Ok(())
        }
        Some(Commands::Repos { query, view }) => print_repos(&config, &db_path, query, view).await,
        Some(Commands::Service { repo, search }) => print_service(&config, &repo, &search).await,
        Some(Commands::Serve) | None => run_server(&config, &db_path).await,
    }
}

async fn open_dashboard(db_path: &str) -> anyhow::Result<Dashboard> {
    let store = SqliteStore::open(db_path).await?;
    Ok(Dashboard::load(Arc::new(store)).await?)
}

async fn run_server(config: &Config, db_path: &str) -> anyhow::Result<()> {
    tracing::info!("Opening settings database at: {}", db_path);
    let dashboard = open_dashboard(db_path).await?;
    let backend = BackendClient::from_config(&config.backend);

    match backend.health().await {
        Ok(()) => tracing::info!("Backend reachable at {}", backend.base_url()),
        Err(e) => tracing::warn!("Backend at {} is not healthy: {}", backend.base_url(), e),
    }

    let state = AppState::new(
        dashboard,
        backend,
        Duration::from_millis(config.dashboard.debounce_ms),
    );
    let app = build_router(state, config.server.cors_enabled);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting server on {}", addr);
    println!("Fleetboard listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn print_repos(
    config: &Config,
    db_path: &str,
    query: Option<String>,
    view: Option<String>,
) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(db_path).await?;
    let backend = BackendClient::from_config(&config.backend);
    let repositories = backend.list_repositories_with_retry().await?;
    dashboard.set_repositories(&repositories).await?;

    let view_mode = match view {
        Some(view) => view.parse::<ViewMode>().map_err(anyhow::Error::msg)?,
        None => dashboard.view_mode(),
    };
    let query = query.unwrap_or_else(|| dashboard.text_filter().to_string());

    let active = dashboard.active_set();
    let records = filter::apply(dashboard.records(), active, &query);
    let fields = filter::visible_fields(active, view_mode);

    let header: Vec<&str> = std::iter::once("Repository")
        .chain(fields.iter().map(String::as_str))
        .collect();
    println!("{}", header.join("\t"));
    for record in &records {
        let mut row = vec![record.title.clone()];
        for field in &fields {
            row.push(
                filter::resolve_value(record, field)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        println!("{}", row.join("\t"));
    }
    println!("{} of {} repositories", records.len(), dashboard.records().len());

    Ok(())
}

async fn print_service(config: &Config, repo: &str, search: &str) -> anyhow::Result<()> {
    let backend = BackendClient::from_config(&config.backend);
    let detail = backend.get_repository_with_retry(repo).await?;
    let view = ServiceView::build(
        repo,
        &detail,
        search,
        AppSortColumn::AppName,
        SortDirection::Asc,
    );

    println!("{}", view.overview.name);
    if let Some(description) = &view.overview.description {
        println!("  {}", description);
    }
    if let Some(tag) = &view.overview.stable_tag {
        println!("  stable tag: {}", tag);
    }
    println!();

    for app in &view.apps {
        let rollout = app
            .rollout
            .as_ref()
            .map(|phase| format!(" ({})", phase.message()))
            .unwrap_or_default();
        let split = app
            .progress
            .map(|p| format!(" stable {}% / canary {}%", p.stable_percent, p.canary_percent))
            .unwrap_or_default();
        println!(
            "{:<32} {:<10} {}{}{}",
            app.display_name, app.app_type, app.status, rollout, split
        );
    }

    Ok(())
}
