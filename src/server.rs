use crate::config::Config;
use crate::data::{Room, SeatingPlan, SeatingRow, Semester};
use crate::error::SeatingError;
use crate::planner::{self, PlanRequest};
use crate::store::{self, Store};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanResponse {
    pub message: String,
    #[serde(flatten)]
    pub plan: SeatingPlan,
}

#[derive(Debug, Serialize)]
pub struct SeatingRowsResponse {
    pub data: Vec<SeatingRow>,
}

impl IntoResponse for SeatingError {
    fn into_response(self) -> Response {
        let status = match &self {
            SeatingError::InvalidSelection(_)
            | SeatingError::HomogeneousSelection { .. }
            | SeatingError::UnpairableDepartment { .. }
            | SeatingError::NoSeatsAssigned => StatusCode::BAD_REQUEST,
            SeatingError::NotFound(_) => StatusCode::NOT_FOUND,
            SeatingError::PersistenceFailure(_)
            | SeatingError::Database(_)
            | SeatingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({ "error": self.to_string(), "kind": self.kind() });
        match &self {
            SeatingError::HomogeneousSelection { departments } => {
                body["departments"] = json!(departments);
            }
            SeatingError::UnpairableDepartment {
                room,
                department,
                remaining,
            } => {
                body["room"] = json!(room);
                body["department"] = json!(department);
                body["remaining"] = json!(remaining);
            }
            SeatingError::PersistenceFailure(e) => {
                body["error"] = json!("Failed to save seating plan");
                body["details"] = json!(e.to_string());
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

/// Runs blocking store work on the blocking pool.
async fn with_store<R, F>(state: &AppState, f: F) -> Result<R, SeatingError>
where
    R: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<R, SeatingError> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.with_conn(f))
        .await
        .map_err(|e| {
            error!("Store task failed: {e}");
            SeatingError::Internal(e.to_string())
        })?
}

async fn health_handler() -> &'static str {
    "Backend running!"
}

async fn rooms_handler(State(state): State<AppState>) -> Result<Json<Vec<Room>>, SeatingError> {
    with_store(&state, |conn| store::list_rooms(conn)).await.map(Json)
}

async fn semesters_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Semester>>, SeatingError> {
    with_store(&state, |conn| store::list_semesters(conn))
        .await
        .map(Json)
}

async fn generate_plan_handler(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<GeneratePlanResponse>, SeatingError> {
    let plan = with_store(&state, move |conn| planner::generate_plan(conn, &request)).await?;
    Ok(Json(GeneratePlanResponse {
        message: "Seating plan generated successfully".to_string(),
        plan,
    }))
}

async fn seating_plan_handler(
    State(state): State<AppState>,
) -> Result<Json<SeatingRowsResponse>, SeatingError> {
    let data = with_store(&state, |conn| store::seating_rows(conn)).await?;
    Ok(Json(SeatingRowsResponse { data }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/rooms", get(rooms_handler))
        .route("/semesters", get(semesters_handler))
        .route("/api/generate-plan", post(generate_plan_handler))
        .route("/api/seating-plan", get(seating_plan_handler))
        .with_state(state)
}

pub async fn run_server(config: &Config, store: Store) -> std::io::Result<()> {
    let app = router(AppState { store });

    let addr = config
        .bind_addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
