// src/storage/mod.rs

//! Persistence for simulations and tasks.
//!
//! Two interchangeable backends implement [`SimulationStore`]:
//!
//! - [`PgStore`] -- the primary Postgres store (sqlx).
//! - [`JsonStore`] -- flat-file fallback used when the database is
//!   unreachable or unconfigured.
//!
//! The backend is selected once at startup; `/health` reports which one is
//! active. Enrollment, activity and category records are always file-backed
//! and use [`JsonFile`] directly.

mod json;
mod postgres;

pub use json::{JsonFile, JsonStore};
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::simulation::{NewSimulation, Simulation, SimulationChanges};
use crate::models::task::{NewTask, Task};

#[async_trait]
pub trait SimulationStore: Send + Sync {
    /// Inserts a simulation and returns the stored row with its assigned id.
    async fn insert_simulation(&self, sim: NewSimulation) -> Result<Simulation, AppError>;

    /// Applies a partial update. Returns `None` when no row has that id.
    /// Callers must not pass an empty change set.
    async fn update_simulation(
        &self,
        id: i64,
        changes: SimulationChanges,
    ) -> Result<Option<Simulation>, AppError>;

    async fn list_simulations(&self) -> Result<Vec<Simulation>, AppError>;

    /// Inserts the tasks of a freshly created simulation, in sequence order.
    async fn insert_tasks(
        &self,
        simulation_id: i64,
        tasks: Vec<NewTask>,
    ) -> Result<Vec<Task>, AppError>;

    async fn list_tasks(&self, simulation_id: i64) -> Result<Vec<Task>, AppError>;

    async fn count_tasks(&self, simulation_id: i64) -> Result<i64, AppError>;

    /// Completed-task count recorded for a user in a simulation, or `None`
    /// when this backend holds no progress rows for that pair (callers then
    /// fall back to the completion flags stored with the enrollment).
    async fn completed_task_count(
        &self,
        simulation_id: i64,
        user_id: &str,
    ) -> Result<Option<i64>, AppError>;

    fn backend_name(&self) -> &'static str;

    /// Cheap reachability probe for the health endpoint.
    async fn ping(&self) -> bool;
}
