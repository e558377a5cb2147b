use async_graphql::http::ALL_WEBSOCKET_PROTOCOLS;
use async_graphql::Data;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    response::Response,
    routing::{get, post},
    Router,
};
use chat_api::auth::CredentialResolver;
use chat_api::config::ApiConfig;
use chat_api::{build_schema, AppSchema};
use message_feature::MessageBus;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub schema: AppSchema,
    pub resolver: CredentialResolver,
}

/// GraphQL handler for queries and mutations
///
/// The session (if any) is derived from request headers and attached to the
/// request; a missing or invalid credential simply leaves it absent.
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(session) = state.resolver.resolve(&headers) {
        request = request.data(session);
    }
    state.schema.execute(request).await.into()
}

/// Connection parameters supplied by the client during the WebSocket
/// handshake. The token is verified the same way as on the HTTP path; a
/// client-claimed session object is never trusted verbatim.
#[derive(Deserialize)]
struct ConnectionParams {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
}

async fn on_connection_init(
    params: serde_json::Value,
    resolver: CredentialResolver,
) -> async_graphql::Result<Data> {
    let mut data = Data::default();
    if let Ok(params) = serde_json::from_value::<ConnectionParams>(params) {
        if let Some(session) = params.auth_token.and_then(|t| resolver.verify(&t)) {
            data.insert(session);
        }
    }
    Ok(data)
}

/// WebSocket handler for GraphQL subscriptions
async fn graphql_subscription_handler(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> Response {
    let schema = state.schema.clone();
    let resolver = state.resolver.clone();
    ws.protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |socket| {
            GraphQLWebSocket::new(socket, schema, protocol)
                .on_connection_init(move |params| on_connection_init(params, resolver))
                .serve()
        })
}

/// GraphQL Playground handler
async fn graphql_playground() -> impl axum::response::IntoResponse {
    axum::response::Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql")
            .subscription_endpoint("/graphql/subscriptions"),
    ))
}

/// Health check handler
async fn health() -> &'static str {
    "OK"
}

/// Wait for a shutdown signal, then drain subscriptions.
///
/// The bus is shut down before this future resolves, so every subscription
/// stream is disposed before the HTTP listener stops accepting.
async fn shutdown_signal(bus: MessageBus) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining subscriptions");
    bus.shutdown();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "chat_api=debug,message_feature=debug,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await?;

    info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../migrations").run(&pool).await?;

    info!("Migrations complete");

    // Event bus for subscription fan-out, shared with the shutdown hook
    let bus = MessageBus::default();

    // Build GraphQL schema
    let schema = build_schema(pool.clone(), bus.clone());

    // Create app state
    let state = AppState {
        schema,
        resolver: CredentialResolver::new(&config.auth),
    };

    // CORS: single trusted origin, credentialed requests allowed
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("apollo-require-preflight"),
        ]);

    // Build router
    let app = Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/graphql/subscriptions", get(graphql_subscription_handler))
        .route("/playground", get(graphql_playground))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    info!("GraphQL Playground: http://{}/playground", config.listen_addr);
    info!("GraphQL endpoint: http://{}/graphql", config.listen_addr);
    info!(
        "Subscriptions: ws://{}/graphql/subscriptions",
        config.listen_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(bus))
        .await?;

    // Subscriptions drained and listener closed; release the pool last
    pool.close().await;

    info!("Server stopped");

    Ok(())
}
