use clap::Parser;
use fakeql::adapters::metrics_handler::MetricsCollector;
use fakeql::cli::Cli;
use fakeql::config::{watcher::SdlWatcher, Settings};
use fakeql::proxy::{Gateway, HttpUpstream, UpstreamClient};
use fakeql::schema::{MergeOptions, SchemaMode, SchemaStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fakeql=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let metrics = Arc::new(MetricsCollector::new()?);

    // Fetch the upstream schema once; serving never starts without it
    let (mode, upstream) = match &settings.proxy {
        Some(proxy) => {
            info!("Starting in proxy mode, extending {}", proxy.url);
            let upstream = HttpUpstream::new(&proxy.url, proxy.parsed_headers(), proxy.timeout())?;
            let remote_sdl = upstream.introspect().await?;
            let upstream: Arc<dyn UpstreamClient> = Arc::new(upstream);
            (SchemaMode::Proxy { remote_sdl }, Some(upstream))
        }
        None => {
            info!("Starting in mock mode");
            (SchemaMode::Mock, None)
        }
    };

    let schema_file = settings.schema_file();
    let store = Arc::new(SchemaStore::open(
        mode,
        &schema_file,
        MergeOptions {
            override_fields: settings.schema.override_fields,
        },
    )?);

    // Rebuild the schema when the SDL file is edited outside of the server
    let store_for_watcher = store.clone();
    let metrics_for_watcher = metrics.clone();
    let _watcher = match SdlWatcher::new(&schema_file, move || match store_for_watcher.reload() {
        Ok(Some(schema)) => {
            metrics_for_watcher
                .schema_reloads_total
                .with_label_values(&["success"])
                .inc();
            info!(
                types = schema.schema.types.len(),
                "SDL reloaded successfully"
            );
        }
        Ok(None) => {}
        Err(e) => {
            metrics_for_watcher
                .schema_reloads_total
                .with_label_values(&["failure"])
                .inc();
            error!("Failed to reload SDL, keeping the current schema: {}", e);
        }
    }) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("SDL file watching disabled: {}", e);
            None
        }
    };

    let forward_headers = settings
        .proxy
        .as_ref()
        .map(|proxy| proxy.forward_headers.clone())
        .unwrap_or_default();
    let gateway = Arc::new(
        Gateway::new(store, upstream, settings.faker.clone(), metrics.clone())
            .with_forward_headers(forward_headers),
    );

    // Create application using the library function
    let app = fakeql::create_app(gateway, metrics, settings.server.cors_origin.as_deref());

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    info!("Listening on http://{}/graphql", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
