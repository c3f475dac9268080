use uuid::Uuid;

use super::task_dto::{
    CreateTaskRequest, DeleteTaskResponse, ListMeta, ListTasksQuery, TaskListResponse,
    UpdateTaskRequest,
};
use super::task_models::{Task, TaskStatus};
use super::task_repository::{TaskFilters, TaskRepository};
use crate::error::{AppError, Result};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

fn filters_from_query(query: ListTasksQuery) -> TaskFilters {
    TaskFilters {
        status: query.status,
        priority: query.priority,
        search: query.search,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
        page: query.page.unwrap_or(DEFAULT_PAGE),
        limit: query.limit.unwrap_or(DEFAULT_LIMIT),
    }
}

fn task_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Task with id {id} not found"))
}

/// Service layer for task queries and mutations.
#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
}

impl TaskService {
    pub fn new(repo: TaskRepository) -> Self {
        Self { repo }
    }

    pub async fn list_tasks(&self, query: ListTasksQuery) -> Result<TaskListResponse> {
        let filters = filters_from_query(query);
        let (data, total) = self.repo.find_all(&filters).await?;

        Ok(TaskListResponse {
            data,
            meta: ListMeta {
                page: filters.page,
                limit: filters.limit,
                total,
            },
        })
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    pub async fn create_task(&self, payload: CreateTaskRequest) -> Result<Task> {
        let status = payload.status.unwrap_or(TaskStatus::Pending);
        self.repo
            .create(
                &payload.title,
                payload.description.as_deref(),
                status,
                payload.priority,
                payload.due_date,
            )
            .await
    }

    pub async fn update_task(&self, id: Uuid, payload: UpdateTaskRequest) -> Result<Task> {
        self.repo
            .update(
                id,
                &payload.title,
                payload.description.as_deref(),
                payload.status,
                payload.priority,
                payload.due_date,
            )
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<DeleteTaskResponse> {
        let rows_affected = self.repo.delete(id).await?;
        if rows_affected == 0 {
            return Err(task_not_found(id));
        }

        Ok(DeleteTaskResponse {
            success: true,
            message: format!("Task with id {id} deleted successfully"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::task_models::TaskPriority;

    #[test]
    fn test_filters_default_page_and_limit() {
        let filters = filters_from_query(ListTasksQuery::default());
        assert_eq!(filters.page, 1);
        assert_eq!(filters.limit, 10);
        assert!(filters.status.is_none());
    }

    #[test]
    fn test_filters_pass_query_through() {
        let query = ListTasksQuery {
            page: Some(3),
            limit: Some(25),
            status: Some(TaskStatus::Completed),
            priority: Some(TaskPriority::Medium),
            search: Some("milk".to_string()),
            sort_by: Some("dueDate".to_string()),
            sort_order: Some("desc".to_string()),
        };

        let filters = filters_from_query(query);
        assert_eq!(filters.page, 3);
        assert_eq!(filters.limit, 25);
        assert_eq!(filters.status, Some(TaskStatus::Completed));
        assert_eq!(filters.priority, Some(TaskPriority::Medium));
        assert_eq!(filters.search.as_deref(), Some("milk"));
        assert_eq!(filters.sort_by.as_deref(), Some("dueDate"));
        assert_eq!(filters.sort_order.as_deref(), Some("desc"));
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let id = Uuid::new_v4();
        let err = task_not_found(id);
        match err {
            AppError::NotFound(msg) => {
                assert_eq!(msg, format!("Task with id {id} not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
