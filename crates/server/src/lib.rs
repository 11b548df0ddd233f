use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use cache::{CacheOptions, ChartCache};
pub use server::{ServerOptions, ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod cache;
mod convert;
mod journals;
mod reports;
mod server;
mod tags;
mod user;

pub mod types {
    pub mod chart {
        pub use api_types::chart::{
            BudgetChartRequest, ChartResponse, ChartSeries, PieDirection, PieGroupBy, PieRequest,
            PieResponse, PieSlice, SeriesKind, TagChartRequest,
        };
    }

    pub mod report {
        pub use api_types::report::{BucketView, PeriodReportResponse};
    }

    pub mod budget {
        pub use api_types::budget::{
            AvailableBudget, AvailableBudgetGet, AvailableBudgetSet, Budget, BudgetList,
            BudgetListQuery, BudgetNew, BudgetUpdate, InitialLimit, SpentRequest, SpentResponse,
        };
    }

    pub mod limit {
        pub use api_types::limit::{
            BudgetLimit, CleanupResponse, LimitList, LimitOutcome, LimitRange, LimitSet,
            LimitSetResponse, RepeatingLimitNew,
        };
    }

    pub mod account {
        pub use api_types::account::{Account, AccountKind, AccountList, AccountNew};
    }

    pub mod tag {
        pub use api_types::tag::{Tag, TagList, TagNew};
    }

    pub mod journal {
        pub use api_types::journal::{JournalCreated, JournalKind, JournalNew, PostingNew};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Internal(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidPeriod(_)
        | EngineError::InvalidRange(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidName(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidPeriod("x".to_string()),
            EngineError::InvalidRange("x".to_string()),
            EngineError::InvalidName("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_error_maps_to_500() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("boom".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_maps_to_500() {
        let res = ServerError::Internal("cache key".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
