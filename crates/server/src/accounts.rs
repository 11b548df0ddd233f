use api_types::account::{Account, AccountList, AccountNew};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::UserContext;

use crate::{ServerError, convert, server::ServerState};

pub async fn account_new(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<Account>), ServerError> {
    let account = state
        .engine
        .store_account(&ctx, &payload.name, convert::account_kind_in(payload.kind))
        .await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok((StatusCode::CREATED, Json(convert::account_out(account))))
}

pub async fn account_list(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
) -> Result<Json<AccountList>, ServerError> {
    let accounts = state.engine.accounts(&ctx).await?;
    Ok(Json(AccountList {
        accounts: accounts.into_iter().map(convert::account_out).collect(),
    }))
}
