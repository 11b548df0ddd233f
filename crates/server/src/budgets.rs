//! Budgets, their limits and the available-budget totals.

use api_types::{
    budget::{
        AvailableBudget, AvailableBudgetGet, AvailableBudgetSet, Budget, BudgetList,
        BudgetListQuery, BudgetNew, BudgetUpdate, SpentRequest, SpentResponse,
    },
    limit::{CleanupResponse, LimitList, LimitRange, LimitSet, LimitSetResponse, RepeatingLimitNew},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EngineError, LimitStore, UserContext};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

pub async fn budget_new(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<Budget>), ServerError> {
    let initial_limit = payload.initial_limit.map(|limit| engine::InitialLimit {
        amount: limit.amount,
        period: convert::frequency_in(limit.period),
    });
    let budget = state
        .engine
        .store_budget(
            &ctx,
            engine::BudgetStore {
                name: payload.name,
                initial_limit,
            },
        )
        .await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok((StatusCode::CREATED, Json(convert::budget_out(budget))))
}

pub async fn budget_list(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetListQuery>,
) -> Result<Json<BudgetList>, ServerError> {
    let budgets = match query.active {
        None => state.engine.budgets(&ctx).await?,
        Some(true) => state.engine.active_budgets(&ctx).await?,
        Some(false) => state.engine.inactive_budgets(&ctx).await?,
    };
    Ok(Json(BudgetList {
        budgets: budgets.into_iter().map(convert::budget_out).collect(),
    }))
}

pub async fn budget_get(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Budget>, ServerError> {
    let budget = state
        .engine
        .find_budget(&ctx, budget_id)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;
    Ok(Json(convert::budget_out(budget)))
}

pub async fn budget_update(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<Budget>, ServerError> {
    let budget = state
        .engine
        .update_budget(
            &ctx,
            budget_id,
            engine::BudgetUpdate {
                name: payload.name,
                active: payload.active,
            },
        )
        .await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok(Json(convert::budget_out(budget)))
}

pub async fn budget_delete(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.destroy_budget(&ctx, budget_id).await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates, updates or deletes the limit of exactly `[start, end]`.
pub async fn limit_set(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<LimitSet>,
) -> Result<Json<LimitSetResponse>, ServerError> {
    let outcome = state
        .engine
        .update_limit_amount(&ctx, budget_id, payload.start, payload.end, payload.amount)
        .await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok(Json(convert::limit_update_out(outcome)))
}

pub async fn repeating_limit_new(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<RepeatingLimitNew>,
) -> Result<(StatusCode, Json<api_types::limit::BudgetLimit>), ServerError> {
    let limit = state
        .engine
        .store_repeating_limit(
            &ctx,
            LimitStore {
                budget_id,
                start: payload.start,
                period: convert::frequency_in(payload.period),
                amount: payload.amount,
                repeats: payload.repeats,
            },
        )
        .await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok((StatusCode::CREATED, Json(convert::limit_out(limit))))
}

pub async fn budget_limits(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<LimitRange>,
) -> Result<Json<LimitList>, ServerError> {
    let limits = state
        .engine
        .budget_limits_in_range(&ctx, budget_id, payload.start, payload.end)
        .await?;
    Ok(Json(LimitList {
        limits: limits.into_iter().map(convert::limit_out).collect(),
    }))
}

pub async fn all_limits(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<LimitRange>,
) -> Result<Json<LimitList>, ServerError> {
    let limits = state
        .engine
        .all_budget_limits_in_range(&ctx, payload.start, payload.end)
        .await?;
    Ok(Json(LimitList {
        limits: limits.into_iter().map(convert::limit_out).collect(),
    }))
}

pub async fn limits_cleanup(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
) -> Result<Json<CleanupResponse>, ServerError> {
    let removed = state.engine.cleanup_budgets(&ctx).await?;
    if removed > 0 {
        state.cache.clear_user(&ctx.user_id).await;
    }
    Ok(Json(CleanupResponse { removed }))
}

pub async fn spent(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<SpentRequest>,
) -> Result<Json<SpentResponse>, ServerError> {
    let amount = if payload.without_budget {
        state
            .engine
            .spent_in_period_without_budget(&ctx, &payload.accounts, payload.start, payload.end)
            .await?
    } else {
        state
            .engine
            .spent_in_period(
                &ctx,
                &payload.budgets,
                &payload.accounts,
                payload.start,
                payload.end,
            )
            .await?
    };
    Ok(Json(SpentResponse { amount }))
}

pub async fn available_budget_set(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<AvailableBudgetSet>,
) -> Result<Json<AvailableBudget>, ServerError> {
    state
        .engine
        .set_available_budget(
            &ctx,
            convert::currency_in(payload.currency),
            payload.start,
            payload.end,
            payload.amount,
        )
        .await?;
    state.cache.clear_user(&ctx.user_id).await;
    Ok(Json(AvailableBudget {
        currency: payload.currency,
        start: payload.start,
        end: payload.end,
        amount: payload.amount,
    }))
}

pub async fn available_budget_get(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<AvailableBudgetGet>,
) -> Result<Json<AvailableBudget>, ServerError> {
    let amount = state
        .engine
        .available_budget(
            &ctx,
            convert::currency_in(payload.currency),
            payload.start,
            payload.end,
        )
        .await?;
    Ok(Json(AvailableBudget {
        currency: payload.currency,
        start: payload.start,
        end: payload.end,
        amount,
    }))
}
