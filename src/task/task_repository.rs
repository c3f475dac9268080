use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::task_models::{Task, TaskPriority, TaskStatus};
use crate::error::Result;

/// Filters and paging for the task list query. `sort_by`/`sort_order` carry
/// the raw query-string values; anything outside the whitelist falls back to
/// the default ordering.
#[derive(Debug, Clone)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    Title,
    Status,
    Priority,
    DueDate,
    CreatedAt,
}

impl SortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(SortKey::Title),
            "status" => Some(SortKey::Status),
            "priority" => Some(SortKey::Priority),
            "dueDate" => Some(SortKey::DueDate),
            "createdAt" => Some(SortKey::CreatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Status => "status",
            SortKey::Priority => "priority",
            SortKey::DueDate => "due_date",
            SortKey::CreatedAt => "created_at",
        }
    }

    fn nullable(self) -> bool {
        matches!(self, SortKey::Priority | SortKey::DueDate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(SortDir::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(SortDir::Desc)
        } else {
            None
        }
    }

    fn sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Builds the WHERE fragment and returns it with the number of placeholders
/// it consumed. Filters are conjunctive; binds must follow the same order:
/// status, priority, search.
fn where_clause(filters: &TaskFilters) -> (String, usize) {
    let mut conditions = Vec::new();
    let mut params = 0;

    if filters.status.is_some() {
        params += 1;
        conditions.push(format!("status = ${params}"));
    }

    if filters.priority.is_some() {
        params += 1;
        conditions.push(format!("priority = ${params}"));
    }

    if filters.search.is_some() {
        params += 1;
        conditions.push(format!("title ILIKE ${params}"));
    }

    if conditions.is_empty() {
        (String::new(), 0)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}

/// Builds the ORDER BY fragment. A recognized key/direction pair is applied
/// as requested; nullable keys pin NULL rows to the tail of the traversal.
/// Everything else sorts by creation time, newest first.
fn order_by_clause(sort_by: Option<&str>, sort_order: Option<&str>) -> String {
    let key = sort_by.and_then(SortKey::parse);
    let dir = sort_order.and_then(SortDir::parse);

    match (key, dir) {
        (Some(key), Some(dir)) if key.nullable() => {
            let nulls = match dir {
                SortDir::Asc => "NULLS LAST",
                SortDir::Desc => "NULLS FIRST",
            };
            format!("ORDER BY {} {} {}", key.column(), dir.sql(), nulls)
        }
        (Some(key), Some(dir)) => format!("ORDER BY {} {}", key.column(), dir.sql()),
        _ => "ORDER BY created_at DESC".to_string(),
    }
}

fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(limit)
}

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, sorted, paginated page of tasks plus the total count of
    /// rows matching the filters before pagination.
    pub async fn find_all(&self, filters: &TaskFilters) -> Result<(Vec<Task>, i64)> {
        let (where_sql, params) = where_clause(filters);

        let count_sql = format!("SELECT COUNT(*) FROM tasks{where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(status) = filters.status {
            count_query = count_query.bind(status);
        }
        if let Some(priority) = filters.priority {
            count_query = count_query.bind(priority);
        }
        if let Some(search) = &filters.search {
            count_query = count_query.bind(format!("%{search}%"));
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT * FROM tasks{where_sql} {} LIMIT ${} OFFSET ${}",
            order_by_clause(filters.sort_by.as_deref(), filters.sort_order.as_deref()),
            params + 1,
            params + 2,
        );

        let mut list_query = sqlx::query_as::<_, Task>(&list_sql);
        if let Some(status) = filters.status {
            list_query = list_query.bind(status);
        }
        if let Some(priority) = filters.priority {
            list_query = list_query.bind(priority);
        }
        if let Some(search) = &filters.search {
            list_query = list_query.bind(format!("%{search}%"));
        }
        let tasks = list_query
            .bind(i64::from(filters.limit))
            .bind(page_offset(filters.page, filters.limit))
            .fetch_all(&self.pool)
            .await?;

        Ok((tasks, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn create(
        &self,
        title: &str,
        description: Option<&str>,
        status: TaskStatus,
        priority: Option<TaskPriority>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, description, status, priority, due_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    /// Full-overwrite update: title, description, priority and due_date are
    /// replaced with the incoming values (NULL included); status keeps its
    /// stored value when the payload carries none.
    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET
                title = $1,
                description = $2,
                status = COALESCE($3, status),
                priority = $4,
                due_date = $5,
                updated_at = NOW()
             WHERE id = $6
             RETURNING *",
        )
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(due_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> TaskFilters {
        TaskFilters {
            status: None,
            priority: None,
            search: None,
            sort_by: None,
            sort_order: None,
            page: 1,
            limit: 10,
        }
    }

    #[test]
    fn test_where_clause_empty_without_filters() {
        let (sql, params) = where_clause(&filters());
        assert_eq!(sql, "");
        assert_eq!(params, 0);
    }

    #[test]
    fn test_where_clause_single_filter() {
        let f = TaskFilters {
            status: Some(TaskStatus::Pending),
            ..filters()
        };
        let (sql, params) = where_clause(&f);
        assert_eq!(sql, " WHERE status = $1");
        assert_eq!(params, 1);
    }

    #[test]
    fn test_where_clause_search_uses_ilike() {
        let f = TaskFilters {
            search: Some("milk".to_string()),
            ..filters()
        };
        let (sql, params) = where_clause(&f);
        assert_eq!(sql, " WHERE title ILIKE $1");
        assert_eq!(params, 1);
    }

    #[test]
    fn test_where_clause_conjunction_numbers_placeholders_in_bind_order() {
        let f = TaskFilters {
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            search: Some("report".to_string()),
            ..filters()
        };
        let (sql, params) = where_clause(&f);
        assert_eq!(
            sql,
            " WHERE status = $1 AND priority = $2 AND title ILIKE $3"
        );
        assert_eq!(params, 3);
    }

    #[test]
    fn test_where_clause_skips_absent_filters() {
        let f = TaskFilters {
            priority: Some(TaskPriority::Low),
            search: Some("a".to_string()),
            ..filters()
        };
        let (sql, _) = where_clause(&f);
        assert_eq!(sql, " WHERE priority = $1 AND title ILIKE $2");
    }

    #[test]
    fn test_order_by_plain_keys() {
        assert_eq!(
            order_by_clause(Some("title"), Some("asc")),
            "ORDER BY title ASC"
        );
        assert_eq!(
            order_by_clause(Some("status"), Some("desc")),
            "ORDER BY status DESC"
        );
        assert_eq!(
            order_by_clause(Some("createdAt"), Some("asc")),
            "ORDER BY created_at ASC"
        );
    }

    #[test]
    fn test_order_by_nullable_keys_pin_nulls_to_tail() {
        assert_eq!(
            order_by_clause(Some("dueDate"), Some("asc")),
            "ORDER BY due_date ASC NULLS LAST"
        );
        assert_eq!(
            order_by_clause(Some("dueDate"), Some("desc")),
            "ORDER BY due_date DESC NULLS FIRST"
        );
        assert_eq!(
            order_by_clause(Some("priority"), Some("asc")),
            "ORDER BY priority ASC NULLS LAST"
        );
        assert_eq!(
            order_by_clause(Some("priority"), Some("desc")),
            "ORDER BY priority DESC NULLS FIRST"
        );
    }

    #[test]
    fn test_order_by_direction_is_case_insensitive() {
        assert_eq!(
            order_by_clause(Some("title"), Some("DESC")),
            "ORDER BY title DESC"
        );
    }

    #[test]
    fn test_order_by_falls_back_on_invalid_input() {
        assert_eq!(order_by_clause(None, None), "ORDER BY created_at DESC");
        assert_eq!(
            order_by_clause(Some("id"), Some("asc")),
            "ORDER BY created_at DESC"
        );
        assert_eq!(
            order_by_clause(Some("title"), Some("sideways")),
            "ORDER BY created_at DESC"
        );
        // A valid key without a direction also falls back.
        assert_eq!(
            order_by_clause(Some("title"), None),
            "ORDER BY created_at DESC"
        );
    }

    #[test]
    fn test_page_offset_arithmetic() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 10), 10);
        assert_eq!(page_offset(3, 25), 50);
        assert_eq!(page_offset(0, 10), 0);
    }
}
