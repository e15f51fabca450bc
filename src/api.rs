// Expense Tracker - REST API
// JSON adapter over the store, filter and aggregation engines

use crate::aggregate::{category_totals, monthly_totals, summarize, CategoryTotal, MonthlyTotal, Summary};
use crate::expense::{parse_calendar_date, Expense};
use crate::filter::{filter_expenses, FilterCriteria};
use crate::storage::KeyValueStore;
use crate::store::ExpenseStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared application state. One store, one writer at a time.
pub struct AppState<S: KeyValueStore> {
    store: Arc<Mutex<ExpenseStore<S>>>,
}

impl<S: KeyValueStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(store: ExpenseStore<S>) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ExpenseStore<S>>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::internal("expense store lock poisoned"))
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(id: &str) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("no expense with id '{}'", id),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Storage failure: {:#}", err);
        ApiError::internal(format!("{:#}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Stats query: the filter criteria plus an optional reference day
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    #[serde(flatten)]
    criteria: FilterCriteria,
    #[serde(default)]
    today: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub summary: Summary,
    pub monthly: Vec<MonthlyTotal>,
    pub categories: Vec<CategoryTotal>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/expenses - Filtered expense list, insertion order
async fn list_expenses<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Query(criteria): Query<FilterCriteria>,
) -> ApiResult<Vec<Expense>> {
    let store = state.lock()?;
    Ok(Json(ApiResponse::ok(filter_expenses(
        store.list_expenses(),
        &criteria,
    ))))
}

/// POST /api/expenses - Store a candidate, returns it with its id
async fn create_expense<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Json(candidate): Json<Expense>,
) -> Result<(StatusCode, Json<ApiResponse<Expense>>), ApiError> {
    let mut store = state.lock()?;
    let stored = store.add_expense(candidate)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(stored))))
}

/// PUT /api/expenses/:id - Replace an expense
async fn update_expense<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(mut record): Json<Expense>,
) -> ApiResult<Expense> {
    record.id = id.clone();

    let mut store = state.lock()?;
    if store.update_expense(record.clone())? {
        Ok(Json(ApiResponse::ok(record)))
    } else {
        Err(ApiError::not_found(&id))
    }
}

/// DELETE /api/expenses/:id
async fn delete_expense<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let mut store = state.lock()?;
    if store.delete_expense(&id)? {
        Ok(Json(ApiResponse::ok(id)))
    } else {
        Err(ApiError::not_found(&id))
    }
}

/// GET /api/stats - Summary, monthly totals and category breakdown of the filtered list
async fn get_stats<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<StatsResponse> {
    let today = resolve_today(query.today.as_deref());

    let store = state.lock()?;
    let filtered = filter_expenses(store.list_expenses(), &query.criteria);

    Ok(Json(ApiResponse::ok(StatsResponse {
        summary: summarize(&filtered, today),
        monthly: monthly_totals(&filtered),
        categories: category_totals(&filtered),
    })))
}

fn resolve_today(requested: Option<&str>) -> NaiveDate {
    requested
        .and_then(parse_calendar_date)
        .unwrap_or_else(|| Local::now().date_naive())
}

// ============================================================================
// Router
// ============================================================================

pub fn router<S>(state: AppState<S>) -> Router
where
    S: KeyValueStore + Send + 'static,
{
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/expenses", get(list_expenses::<S>).post(create_expense::<S>))
        .route(
            "/expenses/:id",
            put(update_expense::<S>).delete(delete_expense::<S>),
        )
        .route("/stats", get(get_stats::<S>))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
