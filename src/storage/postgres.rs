// src/storage/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::simulation::{NewSimulation, Simulation, SimulationChanges};
use crate::models::task::{NewTask, Task};
use crate::storage::SimulationStore;

const SIMULATION_COLUMNS: &str =
    "id, title, category, difficulty, duration, image, rating, description, overview, features, skills";

const TASK_COLUMNS: &str = "id, simulation_id, sequence, title, full_title, duration, difficulty, \
                            material_url, description, what_youll_learn, what_youll_do";

/// Primary store backed by Postgres.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects with a short retry loop and applies migrations.
    /// Errors bubble up so the caller can fall back to the JSON store.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > 3 {
                        return Err(e);
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SimulationStore for PgStore {
    async fn insert_simulation(&self, sim: NewSimulation) -> Result<Simulation, AppError> {
        let row = sqlx::query_as::<_, Simulation>(&format!(
            r#"
            INSERT INTO simulations
            (title, category, difficulty, duration, image, rating, description, overview, features, skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SIMULATION_COLUMNS}
            "#
        ))
        .bind(&sim.title)
        .bind(&sim.category)
        .bind(&sim.difficulty)
        .bind(&sim.duration)
        .bind(&sim.image)
        .bind(sim.rating)
        .bind(&sim.description)
        .bind(&sim.overview)
        .bind(&sim.features)
        .bind(&sim.skills)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_simulation(
        &self,
        id: i64,
        changes: SimulationChanges,
    ) -> Result<Option<Simulation>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE simulations SET ");
        let mut separated = builder.separated(", ");

        if let Some(title) = changes.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }

        if let Some(category) = changes.category {
            separated.push("category = ");
            separated.push_bind_unseparated(category);
        }

        if let Some(difficulty) = changes.difficulty {
            separated.push("difficulty = ");
            separated.push_bind_unseparated(difficulty);
        }

        if let Some(duration) = changes.duration {
            separated.push("duration = ");
            separated.push_bind_unseparated(duration);
        }

        if let Some(image) = changes.image {
            separated.push("image = ");
            separated.push_bind_unseparated(image);
        }

        if let Some(description) = changes.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }

        if let Some(overview) = changes.overview {
            separated.push("overview = ");
            separated.push_bind_unseparated(overview);
        }

        if let Some(features) = changes.features {
            separated.push("features = ");
            separated.push_bind_unseparated(features);
        }

        if let Some(skills) = changes.skills {
            separated.push("skills = ");
            separated.push_bind_unseparated(skills);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {SIMULATION_COLUMNS}"));

        let row = builder
            .build_query_as::<Simulation>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_simulations(&self) -> Result<Vec<Simulation>, AppError> {
        let rows = sqlx::query_as::<_, Simulation>(&format!(
            "SELECT {SIMULATION_COLUMNS} FROM simulations ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_tasks(
        &self,
        simulation_id: i64,
        tasks: Vec<NewTask>,
    ) -> Result<Vec<Task>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(tasks.len());

        for task in tasks {
            let row = sqlx::query_as::<_, Task>(&format!(
                r#"
                INSERT INTO tasks
                (simulation_id, sequence, title, full_title, duration, difficulty, material_url, description, what_youll_learn, what_youll_do)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING {TASK_COLUMNS}
                "#
            ))
            .bind(simulation_id)
            .bind(task.sequence)
            .bind(&task.title)
            .bind(&task.full_title)
            .bind(&task.duration)
            .bind(&task.difficulty)
            .bind(&task.material_url)
            .bind(&task.description)
            .bind(&task.what_youll_learn)
            .bind(&task.what_youll_do)
            .fetch_one(&mut *tx)
            .await?;

            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn list_tasks(&self, simulation_id: i64) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE simulation_id = $1 ORDER BY sequence"
        ))
        .bind(simulation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_tasks(&self, simulation_id: i64) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE simulation_id = $1")
                .bind(simulation_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn completed_task_count(
        &self,
        simulation_id: i64,
        user_id: &str,
    ) -> Result<Option<i64>, AppError> {
        let statuses: Vec<(String,)> = sqlx::query_as(
            "SELECT status FROM user_task_progress WHERE simulation_id = $1 AND user_id = $2",
        )
        .bind(simulation_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if statuses.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            statuses.iter().filter(|(s,)| s.as_str() == "completed").count() as i64,
        ))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
