use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::{net::SocketAddr, sync::Arc};

use crate::{CacheOptions, ChartCache, accounts, budgets, journals, reports, tags, user};
use engine::{Engine, UserContext};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub cache: Arc<ChartCache>,
}

impl ServerState {
    pub fn new(engine: Engine, db: DatabaseConnection, cache: CacheOptions) -> Self {
        Self {
            engine: Arc::new(engine),
            db,
            cache: Arc::new(ChartCache::new(cache)),
        }
    }
}

/// Where to listen and how chart responses are cached.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub bind: String,
    pub port: u16,
    pub cache: CacheOptions,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            cache: CacheOptions::default(),
        }
    }
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request
        .extensions_mut()
        .insert(UserContext::new(user.username));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/chart/tag/main", post(reports::tag_main_chart))
        .route("/chart/tag/pie", post(reports::tag_pie))
        .route("/chart/budget/period", post(reports::budget_period_chart))
        .route("/reports/budget", post(reports::budget_report))
        .route("/reports/no-budget", post(reports::no_budget_report))
        .route("/reports/tag", post(reports::tag_report))
        .route("/budgets", post(budgets::budget_new).get(budgets::budget_list))
        .route("/budgets/spent", post(budgets::spent))
        .route(
            "/budgets/{id}",
            get(budgets::budget_get)
                .patch(budgets::budget_update)
                .delete(budgets::budget_delete),
        )
        .route("/budgets/{id}/limits", post(budgets::limit_set))
        .route(
            "/budgets/{id}/limits/repeating",
            post(budgets::repeating_limit_new),
        )
        .route("/budgets/{id}/limits/range", post(budgets::budget_limits))
        .route("/limits/range", post(budgets::all_limits))
        .route("/limits/cleanup", post(budgets::limits_cleanup))
        .route("/available-budget", post(budgets::available_budget_set))
        .route("/available-budget/get", post(budgets::available_budget_get))
        .route(
            "/accounts",
            post(accounts::account_new).get(accounts::account_list),
        )
        .route("/tags", post(tags::tag_new).get(tags::tag_list))
        .route("/journals", post(journals::journal_new))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, options: ServerOptions) {
    let addr = format!("{}:{}", options.bind, options.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, options.cache, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    cache: CacheOptions,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState::new(engine, db, cache);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    cache: CacheOptions,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, cache, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
