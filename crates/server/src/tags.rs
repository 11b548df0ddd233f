use api_types::tag::{Tag, TagList, TagNew};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::UserContext;

use crate::{ServerError, convert, server::ServerState};

pub async fn tag_new(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<TagNew>,
) -> Result<(StatusCode, Json<Tag>), ServerError> {
    let tag = state.engine.store_tag(&ctx, &payload.tag).await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok((StatusCode::CREATED, Json(convert::tag_out(tag))))
}

/// Sorted case-insensitively.
pub async fn tag_list(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
) -> Result<Json<TagList>, ServerError> {
    let tags = state.engine.tags(&ctx).await?;
    Ok(Json(TagList {
        tags: tags.into_iter().map(convert::tag_out).collect(),
    }))
}
