//! waymark demo server.
//!
//! Loads configuration, installs logging and metrics, registers a small
//! application on the dispatch router and serves it until Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use waymark::config::{load_config, AppConfig};
use waymark::http::middleware::{cors, logger, recovery, request_id, CorsConfig, RequestIdExt};
use waymark::observability::{logging, metrics};
use waymark::{HttpServer, RequestContext, RouteMeta, Router, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "waymark", version, about = "Radix-tree HTTP dispatch demo server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Greeting {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "waymark starting");

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let router = Arc::new(Router::with_config(config.dispatch.clone()));
    register_demo(&router)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        pool_capacity = config.dispatch.pool_capacity,
        max_body_bytes = config.dispatch.max_body_bytes,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    HttpServer::new(router).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn register_demo(router: &Arc<Router>) -> Result<(), waymark::RouteError> {
    router.use_middleware(recovery())?;
    router.use_middleware(logger())?;
    router.use_middleware(request_id())?;
    router.use_middleware(cors(CorsConfig::default()))?;

    router.get("/", |ctx| {
        ctx.text(StatusCode::OK, "waymark");
        Ok(())
    })?;

    let weak = Arc::downgrade(router);
    router.register_with(
        Method::GET,
        "/routes",
        move |ctx| {
            let routes = weak.upgrade().map(|router| router.routes()).unwrap_or_default();
            ctx.json(StatusCode::OK, &routes)
        },
        RouteMeta::new().name("routes").description("Registered routes").tags(["meta"]),
    )?;

    let api = router.group("/api");
    api.register_with(
        Method::GET,
        "/users/:id",
        show_user,
        RouteMeta::new().name("user.show").tags(["users"]).version("v1"),
    )?;
    api.post("/greet", |ctx| {
        let greeting: Greeting = ctx.bind_json()?;
        ctx.json(StatusCode::OK, &serde_json::json!({ "hello": greeting.name }))
    })?;
    api.get("/files/*path", |ctx| {
        let path = ctx.param("path").unwrap_or_default().to_string();
        ctx.text(StatusCode::OK, path);
        Ok(())
    })?;
    api.options("/*path", |_ctx| Ok(()))?;

    Ok(())
}

fn show_user(ctx: &mut RequestContext) -> Result<(), waymark::BoxError> {
    let id = ctx.param("id").unwrap_or_default().to_string();
    let request_id = ctx.request_id().map(ToString::to_string);
    ctx.json(
        StatusCode::OK,
        &serde_json::json!({ "id": id, "request_id": request_id }),
    )
}
