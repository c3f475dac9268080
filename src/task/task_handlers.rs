use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::task_dto::{
    CreateTaskRequest, DeleteTaskResponse, ListTasksQuery, TaskListResponse, UpdateTaskRequest,
};
use super::task_models::{Task, TaskPriority, TaskStatus};
use crate::{error::Result, state::AppState};

/// List tasks with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<u32>, Query, description = "Items per page (default 10)"),
        ("status" = Option<TaskStatus>, Query, description = "Filter by status"),
        ("priority" = Option<TaskPriority>, Query, description = "Filter by priority"),
        ("search" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("sortBy" = Option<String>, Query, description = "Sort field (title, status, priority, dueDate, createdAt)"),
        ("sortOrder" = Option<String>, Query, description = "Sort order (asc, desc)")
    ),
    responses(
        (status = 200, description = "Paginated task list", body = TaskListResponse)
    ),
    tag = "tasks"
)]
pub async fn get_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<TaskListResponse>> {
    let response = state.task_service.list_tasks(query).await?;
    Ok(Json(response))
}

/// Get a single task by id
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>> {
    let task = state.task_service.get_task(task_id).await?;
    Ok(Json(task))
}

/// Create a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid request body")
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let task = state.task_service.create_task(payload).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Replace a task
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Invalid request body"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    payload.validate()?;

    let task = state.task_service.update_task(task_id, payload).await?;
    Ok(Json(task))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted", body = DeleteTaskResponse),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<DeleteTaskResponse>> {
    let response = state.task_service.delete_task(task_id).await?;
    Ok(Json(response))
}
