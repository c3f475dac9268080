use axum::{extract::State, http::StatusCode, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::Result,
    state::AppState,
    task::{
        self, CreateTaskRequest, DeleteTaskResponse, ListMeta, Task, TaskListResponse,
        TaskPriority, TaskStatus, UpdateTaskRequest,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        task::task_handlers::get_tasks,
        task::task_handlers::get_task,
        task::task_handlers::create_task,
        task::task_handlers::update_task,
        task::task_handlers::delete_task,
    ),
    components(
        schemas(
            Task,
            TaskStatus,
            TaskPriority,
            CreateTaskRequest,
            UpdateTaskRequest,
            TaskListResponse,
            ListMeta,
            DeleteTaskResponse,
        )
    ),
    tags(
        (name = "tasks", description = "Task management endpoints")
    )
)]
struct ApiDoc;

async fn health(State(state): State<AppState>) -> Result<StatusCode> {
    sqlx::query("SELECT 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let task_routes = Router::new()
        .route("/", get(task::get_tasks).post(task::create_task))
        .route(
            "/:id",
            get(task::get_task)
                .put(task::update_task)
                .delete(task::delete_task),
        );

    let api_v1 = Router::new().nest("/tasks", task_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
