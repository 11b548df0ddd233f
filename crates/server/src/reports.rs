//! Chart and period-report endpoints.
//!
//! Every handler here is read-only and goes through [`ChartCache`].
//!
//! [`ChartCache`]: crate::ChartCache

use api_types::{
    chart::{BudgetChartRequest, ChartResponse, PieRequest, PieResponse, TagChartRequest},
    report::PeriodReportResponse,
};
use axum::{Extension, Json, extract::State};
use engine::UserContext;

use crate::{ServerError, convert, server::ServerState};

pub async fn tag_main_chart(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<TagChartRequest>,
) -> Result<Json<ChartResponse>, ServerError> {
    let response = state
        .cache
        .get_or_compute("chart/tag/main", &ctx.user_id, &payload, async {
            let series = state
                .engine
                .tag_main_chart(
                    &ctx,
                    &payload.tags,
                    &payload.accounts,
                    payload.start,
                    payload.end,
                )
                .await?;
            Ok::<_, ServerError>(ChartResponse {
                series: series.into_iter().map(convert::series_out).collect(),
            })
        })
        .await?;
    Ok(Json(response))
}

pub async fn tag_pie(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<PieRequest>,
) -> Result<Json<PieResponse>, ServerError> {
    let response = state
        .cache
        .get_or_compute("chart/tag/pie", &ctx.user_id, &payload, async {
            let slices = state
                .engine
                .tag_pie(&ctx, convert::pie_in(&payload))
                .await?;
            Ok::<_, ServerError>(PieResponse {
                slices: slices.into_iter().map(convert::slice_out).collect(),
            })
        })
        .await?;
    Ok(Json(response))
}

pub async fn budget_period_chart(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetChartRequest>,
) -> Result<Json<ChartResponse>, ServerError> {
    let response = state
        .cache
        .get_or_compute("chart/budget/period", &ctx.user_id, &payload, async {
            let series = state
                .engine
                .budget_period_chart(
                    &ctx,
                    &payload.budgets,
                    &payload.accounts,
                    payload.start,
                    payload.end,
                )
                .await?;
            Ok::<_, ServerError>(ChartResponse {
                series: series.into_iter().map(convert::series_out).collect(),
            })
        })
        .await?;
    Ok(Json(response))
}

pub async fn budget_report(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetChartRequest>,
) -> Result<Json<PeriodReportResponse>, ServerError> {
    let response = state
        .cache
        .get_or_compute("reports/budget", &ctx.user_id, &payload, async {
            let report = state
                .engine
                .budget_period_report(
                    &ctx,
                    &payload.budgets,
                    &payload.accounts,
                    payload.start,
                    payload.end,
                )
                .await?;
            Ok::<_, ServerError>(convert::report_out(report))
        })
        .await?;
    Ok(Json(response))
}

/// Ignores `budgets` in the request.
pub async fn no_budget_report(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetChartRequest>,
) -> Result<Json<PeriodReportResponse>, ServerError> {
    let response = state
        .cache
        .get_or_compute("reports/no-budget", &ctx.user_id, &payload, async {
            let report = state
                .engine
                .no_budget_period_report(&ctx, &payload.accounts, payload.start, payload.end)
                .await?;
            Ok::<_, ServerError>(convert::report_out(report))
        })
        .await?;
    Ok(Json(response))
}

pub async fn tag_report(
    Extension(ctx): Extension<UserContext>,
    State(state): State<ServerState>,
    Json(payload): Json<TagChartRequest>,
) -> Result<Json<PeriodReportResponse>, ServerError> {
    let response = state
        .cache
        .get_or_compute("reports/tag", &ctx.user_id, &payload, async {
            let report = state
                .engine
                .tag_period_report(
                    &ctx,
                    &payload.tags,
                    &payload.accounts,
                    payload.start,
                    payload.end,
                )
                .await?;
            Ok::<_, ServerError>(convert::report_out(report))
        })
        .await?;
    Ok(Json(response))
}
