use api_types::journal::{JournalCreated, JournalNew};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{JournalStore, PostingStore, UserContext};

use crate::{ServerError, convert, server::ServerState};

/// Books a journal. Its postings must sum to zero.
pub async fn journal_new(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<JournalNew>,
) -> Result<(StatusCode, Json<JournalCreated>), ServerError> {
    let postings = payload
        .postings
        .into_iter()
        .map(|posting| PostingStore {
            account_id: posting.account_id,
            amount: posting.amount,
            budget_id: posting.budget_id,
        })
        .collect();
    let id = state
        .engine
        .store_journal(
            &ctx,
            JournalStore {
                kind: convert::journal_kind_in(payload.kind),
                date: payload.date,
                description: payload.description,
                budget_id: payload.budget_id,
                tag_ids: payload.tag_ids,
                postings,
            },
        )
        .await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok((StatusCode::CREATED, Json(JournalCreated { id })))
}
