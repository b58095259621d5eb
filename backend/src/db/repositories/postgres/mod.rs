//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! Configuration is described by [`PostgresConfig`](crate::db::PostgresConfig).

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::{debug, info, warn};

use crate::api::{Exercise, ExerciseQuery, NewExercise, RecordId, User};
use crate::db::repository::{
    ErrorContext, ExerciseRepository, FullRepository, PoolStats, RepositoryError,
    RepositoryResult, UserRepository,
};
use crate::db::PostgresConfig;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Connect, build the pool and run pending migrations.
    ///
    /// This blocks on network I/O; async callers should go through
    /// [`RepositoryFactory::create_postgres`](crate::db::RepositoryFactory::create_postgres).
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }
        info!(max_pool_size = config.max_pool_size, "postgres repository ready");

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        if !applied.is_empty() {
            info!(count = applied.len(), "applied database migrations");
        }
        Ok(())
    }

    /// Run `f` on a pooled connection in a blocking task, retrying
    /// retryable failures with exponential backoff up to `max_retries`.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    warn!(operation, attempt, "retrying database operation");
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new(operation)
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e.with_operation(operation));
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, username: Option<String>) -> RepositoryResult<User> {
        let row = NewUserRow {
            id: RecordId::generate().to_hex(),
            username,
        };
        let user = self
            .with_conn("create_user", move |conn| {
                diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserRow::as_returning())
                    .get_result::<UserRow>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;
        debug!(user_id = %user.id, "stored user");
        User::try_from(user)
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let rows = self
            .with_conn("list_users", |conn| {
                users::table
                    .order(users::seq.asc())
                    .select(UserRow::as_select())
                    .load::<UserRow>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_user(&self, id: RecordId) -> RepositoryResult<Option<User>> {
        let key = id.to_hex();
        let row = self
            .with_conn("find_user", move |conn| {
                users::table
                    .filter(users::id.eq(&key))
                    .select(UserRow::as_select())
                    .first::<UserRow>(conn)
                    .optional()
                    .map_err(map_diesel_error)
            })
            .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl ExerciseRepository for PostgresRepository {
    async fn create_exercise(&self, exercise: NewExercise) -> RepositoryResult<Exercise> {
        let record = exercise.into_record(RecordId::generate());
        let row = NewExerciseRow::from(&record);
        self.with_conn("create_exercise", move |conn| {
            diesel::insert_into(exercises::table)
                .values(&row)
                .execute(conn)
                .map(|_| ())
                .map_err(map_diesel_error)
        })
        .await?;
        debug!(exercise_id = %record.id, user_id = %record.user, "stored exercise");
        Ok(record)
    }

    async fn query_exercises(
        &self,
        user: RecordId,
        query: &ExerciseQuery,
    ) -> RepositoryResult<Vec<Exercise>> {
        let user_key = user.to_hex();
        let query = *query;
        let rows = self
            .with_conn("query_exercises", move |conn| {
                let mut statement = exercises::table
                    .filter(exercises::user_id.eq(&user_key))
                    .order(exercises::seq.asc())
                    .select(ExerciseRow::as_select())
                    .into_boxed();

                if let Some(from) = query.from {
                    statement = statement.filter(exercises::exercise_date.ge(from));
                }
                if let Some(to) = query.to {
                    statement = statement.filter(exercises::exercise_date.le(to));
                }
                if let Some(limit) = query.limit {
                    statement = statement.limit(i64::try_from(limit).unwrap_or(i64::MAX));
                }

                statement.load::<ExerciseRow>(conn).map_err(map_diesel_error)
            })
            .await?;
        rows.into_iter().map(Exercise::try_from).collect()
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    fn pool_stats(&self) -> Option<PoolStats> {
        let state = self.pool.state();
        Some(PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        })
    }
}
