use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::Router;
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use clap::Parser;
use eyre::{self, Context, Result};
use learnnow::{
    app_state::{AppState, SharedState},
    routes,
    spa_serve_dir::SpaServeDirService,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use learnnow_core::{
    auth::{Authorizer, CachingMembershipProvider},
    bing::BingClient,
    config::Config,
    deadpool_diesel,
    graph::GraphClient,
    interact,
    model::repository::db::{self, DbPool},
    storage::{BlobStorage, LocalFileStorage, Storage},
};

const MEMBERSHIP_CACHE_ENTRIES: usize = 10_000;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    config: String,
    /// Directory with the built tab frontend
    #[arg(long, default_value = "./static")]
    static_dir: String,
    #[cfg(feature = "opentelemetry")]
    #[arg(long)]
    otel_endpoint: Option<String>,
}

async fn db_setup(dir: &Path) -> Result<DbPool> {
    let db_url = dir.join("learnnow.db").to_string();
    let pool = db::open_db_pool(&db_url)?;
    let conn = pool.get().await?;
    interact!(conn, db::migrate).await??;
    Ok(pool)
}

fn storage_setup(config: &Config) -> Result<Storage> {
    match &config.blob_storage {
        Some(blob_config) => {
            info!(account = %blob_config.account_name, container = %blob_config.container_name, "using blob storage");
            Ok(BlobStorage::new(blob_config.clone())?.into())
        }
        None => {
            let path = config.data_dir.path.join("files");
            std::fs::create_dir_all(&path)
                .wrap_err_with(|| format!("error creating file storage directory {}", path))?;
            info!(%path, "using local file storage");
            Ok(LocalFileStorage::new(path).into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1")
    }
    if std::env::var("RUST_SPANTRACE").is_err() {
        std::env::set_var("RUST_SPANTRACE", "1");
    }
    color_eyre::install()?;
    let tracing = tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("LEARNNOW_LOG").unwrap_or_else(|_| EnvFilter::new("debug,hyper=info")))
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    #[cfg(feature = "opentelemetry")]
    {
        use opentelemetry_otlp::WithExportConfig;
        let telemetry = args
            .otel_endpoint
            .as_ref()
            .map(|otel_endpoint| {
                let tracer = opentelemetry_otlp::new_pipeline()
                    .tracing()
                    .with_exporter(
                        opentelemetry_otlp::new_exporter()
                            .tonic()
                            .with_endpoint(otel_endpoint.clone()),
                    )
                    .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
                        opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                            "learnnow",
                        )]),
                    ))
                    .install_batch(opentelemetry_sdk::runtime::Tokio)
                    .wrap_err("error setting up OpenTelemetry exporter")?;
                Ok::<_, eyre::Report>(tracing_opentelemetry::layer().with_tracer(tracer))
            })
            .transpose()?;
        tracing.with(telemetry).init();
    }
    #[cfg(not(feature = "opentelemetry"))]
    {
        tracing.init();
    }

    let config_path = PathBuf::from(args.config);
    let config = learnnow_core::config::read_config(&config_path).await?;

    let addr: IpAddr = config
        .server
        .address
        .parse()
        .wrap_err("error parsing listening address")?;
    let port = config.server.port;

    info!("Starting up...");
    std::fs::create_dir_all(&config.data_dir.path)
        .wrap_err_with(|| format!("error creating data directory {}", config.data_dir.path))?;
    let pool = db_setup(&config.data_dir.path).await?;
    let storage = storage_setup(&config)?;
    let graph = Arc::new(GraphClient::new(config.azure_ad.clone())?);
    let membership = CachingMembershipProvider::new(
        graph.clone(),
        Duration::from_secs(config.cache.membership_ttl_minutes * 60),
        MEMBERSHIP_CACHE_ENTRIES,
    );
    let authorizer = Authorizer::new(config.security_groups.clone(), Arc::new(membership));
    let image_search = config.bing.clone().map(BingClient::new).transpose()?;
    if image_search.is_none() {
        info!("Bing is not configured, image search is disabled");
    }
    let shared_state: SharedState = Arc::new(AppState {
        pool,
        storage,
        authorizer,
        users: graph,
        image_search,
        app_base_url: config.server.app_base_url.clone(),
    });
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any).allow_origin(Any);
    let app = Router::new()
        .nest("/api", routes::api_router())
        .fallback_service(SpaServeDirService::new(ServeDir::new(&args.static_dir)))
        .layer(
            ServiceBuilder::new()
                .set_x_request_id(MakeRequestUuid)
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().include_headers(true))
                        .on_response(DefaultOnResponse::new().include_headers(true)),
                ),
        )
        .layer(cors)
        .with_state(shared_state);
    let listener = tokio::net::TcpListener::bind(SocketAddr::new(addr, port))
        .await
        .wrap_err("Error binding socket")?;
    info!(%addr, port, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Unable to listen for shutdown signal: {}", err);
            std::process::exit(1);
        }
    }
}
