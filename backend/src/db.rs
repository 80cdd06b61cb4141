use anyhow::{Context, Result};
use deadpool_diesel::sqlite::{Manager, Pool};
use deadpool_diesel::Runtime;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub type DbPool = Pool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Open the SQLite pool and bring the schema up to date.
pub async fn establish_connection_pool(database_url: &str, max_size: usize) -> Result<DbPool> {
    let manager = Manager::new(database_url, Runtime::Tokio1);
    let pool = Pool::builder(manager)
        .max_size(max_size)
        .build()
        .context("Failed to create database pool")?;

    let conn = pool
        .get()
        .await
        .context("Failed to get a connection for migrations")?;
    let applied = conn
        .interact(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.len())
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Migration worker failed: {}", e))??;

    if applied > 0 {
        tracing::info!("Applied {} database migration(s)", applied);
    }

    Ok(pool)
}

// Task database operations. Every query is scoped to the owning user.
pub mod tasks {
    use diesel::prelude::*;
    use planner_shared::api::{CreateTaskRequest, UpdateTaskRequest};
    use planner_shared::time::now_timestamp;
    use planner_shared::Task;

    use super::DbPool;
    use crate::error::{ApiError, ApiResult};
    use crate::models::{NewTask, TaskChangeset, TaskRow};

    pub async fn list_for_user(pool: &DbPool, owner: String) -> ApiResult<Vec<Task>> {
        let conn = pool.get().await?;

        let rows = conn
            .interact(move |conn| {
                use crate::schema::task::dsl::*;

                task.filter(userid.eq(owner))
                    .order_by(id.asc())
                    .select(TaskRow::as_select())
                    .load::<TaskRow>(conn)
            })
            .await
            .map_err(ApiError::interact)??;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_for_user(pool: &DbPool, owner: String, task_id: i32) -> ApiResult<Task> {
        let conn = pool.get().await?;

        let row = conn
            .interact(move |conn| {
                use crate::schema::task::dsl::*;

                task.filter(id.eq(task_id))
                    .filter(userid.eq(owner))
                    .select(TaskRow::as_select())
                    .first::<TaskRow>(conn)
                    .optional()
            })
            .await
            .map_err(ApiError::interact)??;

        row.map(Into::into).ok_or_else(|| ApiError::not_found("Task"))
    }

    pub async fn create(pool: &DbPool, owner: String, input: CreateTaskRequest) -> ApiResult<Task> {
        let conn = pool.get().await?;
        let now = now_timestamp();

        let new_task = NewTask {
            userid: owner,
            title: input.title,
            description: input.description,
            done: i32::from(input.done),
            scheduled_at: input.scheduled_at,
            estimated_time: input.estimated_time,
            due_date: input.due_date,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = conn
            .interact(move |conn| {
                use crate::schema::task;

                diesel::insert_into(task::table)
                    .values(&new_task)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(conn)
            })
            .await
            .map_err(ApiError::interact)??;

        tracing::debug!("Created task {} for {}", row.id, row.userid);
        Ok(row.into())
    }

    pub async fn update(
        pool: &DbPool,
        owner: String,
        task_id: i32,
        input: UpdateTaskRequest,
    ) -> ApiResult<Task> {
        let conn = pool.get().await?;
        let changeset = TaskChangeset::from_request(input, now_timestamp());

        let row = conn
            .interact(move |conn| {
                use crate::schema::task::dsl::*;

                diesel::update(task.filter(id.eq(task_id)).filter(userid.eq(owner)))
                    .set(&changeset)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(conn)
                    .optional()
            })
            .await
            .map_err(ApiError::interact)??;

        row.map(Into::into).ok_or_else(|| ApiError::not_found("Task"))
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete(pool: &DbPool, owner: String, task_id: i32) -> ApiResult<usize> {
        let conn = pool.get().await?;

        let removed = conn
            .interact(move |conn| {
                use crate::schema::task::dsl::*;

                diesel::delete(task.filter(id.eq(task_id)).filter(userid.eq(owner))).execute(conn)
            })
            .await
            .map_err(ApiError::interact)??;

        Ok(removed)
    }
}

// Event database operations. Every query is scoped to the owning user.
pub mod events {
    use diesel::prelude::*;
    use planner_shared::api::{CreateEventRequest, UpdateEventRequest};
    use planner_shared::time::now_timestamp;
    use planner_shared::Event;

    use super::DbPool;
    use crate::error::{ApiError, ApiResult};
    use crate::models::{EventChangeset, EventRow, NewEvent};

    pub async fn list_for_user(pool: &DbPool, owner: String) -> ApiResult<Vec<Event>> {
        let conn = pool.get().await?;

        let rows = conn
            .interact(move |conn| {
                use crate::schema::event::dsl::*;

                event
                    .filter(userid.eq(owner))
                    .order_by(id.asc())
                    .select(EventRow::as_select())
                    .load::<EventRow>(conn)
            })
            .await
            .map_err(ApiError::interact)??;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_for_user(pool: &DbPool, owner: String, event_id: i32) -> ApiResult<Event> {
        let conn = pool.get().await?;

        let row = conn
            .interact(move |conn| {
                use crate::schema::event::dsl::*;

                event
                    .filter(id.eq(event_id))
                    .filter(userid.eq(owner))
                    .select(EventRow::as_select())
                    .first::<EventRow>(conn)
                    .optional()
            })
            .await
            .map_err(ApiError::interact)??;

        row.map(Into::into).ok_or_else(|| ApiError::not_found("Event"))
    }

    pub async fn create(
        pool: &DbPool,
        owner: String,
        input: CreateEventRequest,
    ) -> ApiResult<Event> {
        let conn = pool.get().await?;
        let now = now_timestamp();

        let new_event = NewEvent {
            userid: owner,
            title: input.title,
            description: input.description,
            starts_at: input.from,
            ends_at: input.to,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = conn
            .interact(move |conn| {
                use crate::schema::event;

                diesel::insert_into(event::table)
                    .values(&new_event)
                    .returning(EventRow::as_returning())
                    .get_result::<EventRow>(conn)
            })
            .await
            .map_err(ApiError::interact)??;

        tracing::debug!("Created event {} for {}", row.id, row.userid);
        Ok(row.into())
    }

    pub async fn update(
        pool: &DbPool,
        owner: String,
        event_id: i32,
        input: UpdateEventRequest,
    ) -> ApiResult<Event> {
        let conn = pool.get().await?;
        let changeset = EventChangeset::from_request(input, now_timestamp());

        let row = conn
            .interact(move |conn| {
                use crate::schema::event::dsl::*;

                diesel::update(event.filter(id.eq(event_id)).filter(userid.eq(owner)))
                    .set(&changeset)
                    .returning(EventRow::as_returning())
                    .get_result::<EventRow>(conn)
                    .optional()
            })
            .await
            .map_err(ApiError::interact)??;

        row.map(Into::into).ok_or_else(|| ApiError::not_found("Event"))
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete(pool: &DbPool, owner: String, event_id: i32) -> ApiResult<usize> {
        let conn = pool.get().await?;

        let removed = conn
            .interact(move |conn| {
                use crate::schema::event::dsl::*;

                diesel::delete(event.filter(id.eq(event_id)).filter(userid.eq(owner)))
                    .execute(conn)
            })
            .await
            .map_err(ApiError::interact)??;

        Ok(removed)
    }
}
