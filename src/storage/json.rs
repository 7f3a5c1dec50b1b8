// src/storage/json.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::simulation::{NewSimulation, Simulation, SimulationChanges};
use crate::models::task::{NewTask, Task};
use crate::storage::SimulationStore;

/// One whole-file JSON document: load it all, overwrite it all.
///
/// Missing or unparseable files load as the default value, so a corrupt
/// record file degrades to an empty collection instead of taking the
/// service down.
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load<T: DeserializeOwned + Default>(&self) -> T {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {}: {}", self.path.display(), e);
                T::default()
            }),
            Err(_) => T::default(),
        }
    }

    pub async fn save<T: Serialize>(&self, value: &T) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

/// Fallback store writing `simulations.json` / `tasks.json` under the data
/// directory. Identifiers are assigned as `len + 1`, matching the records a
/// degraded deployment accumulates.
pub struct JsonStore {
    simulations: JsonFile,
    tasks: JsonFile,
    // Serializes read-modify-write cycles; reads go through it too so a
    // concurrent writer cannot be observed mid-cycle.
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            simulations: JsonFile::new(data_dir.join("simulations.json")),
            tasks: JsonFile::new(data_dir.join("tasks.json")),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl SimulationStore for JsonStore {
    async fn insert_simulation(&self, sim: NewSimulation) -> Result<Simulation, AppError> {
        let _guard = self.lock.lock().await;
        let mut simulations: Vec<Simulation> = self.simulations.load().await;

        let simulation = Simulation {
            id: simulations.len() as i64 + 1,
            title: sim.title,
            category: sim.category,
            difficulty: sim.difficulty,
            duration: sim.duration,
            image: sim.image,
            rating: sim.rating,
            description: sim.description,
            overview: sim.overview,
            features: sim.features,
            skills: sim.skills,
        };

        simulations.push(simulation.clone());
        self.simulations.save(&simulations).await?;
        tracing::info!("Saved simulation to JSON with ID: {}", simulation.id);

        Ok(simulation)
    }

    async fn update_simulation(
        &self,
        id: i64,
        changes: SimulationChanges,
    ) -> Result<Option<Simulation>, AppError> {
        let _guard = self.lock.lock().await;
        let mut simulations: Vec<Simulation> = self.simulations.load().await;

        let Some(simulation) = simulations.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            simulation.title = title;
        }
        if let Some(category) = changes.category {
            simulation.category = category;
        }
        if let Some(difficulty) = changes.difficulty {
            simulation.difficulty = difficulty;
        }
        if let Some(duration) = changes.duration {
            simulation.duration = duration;
        }
        if let Some(image) = changes.image {
            simulation.image = image;
        }
        if let Some(description) = changes.description {
            simulation.description = description;
        }
        if let Some(overview) = changes.overview {
            simulation.overview = overview;
        }
        if let Some(features) = changes.features {
            simulation.features = features;
        }
        if let Some(skills) = changes.skills {
            simulation.skills = skills;
        }

        let updated = simulation.clone();
        self.simulations.save(&simulations).await?;

        Ok(Some(updated))
    }

    async fn list_simulations(&self) -> Result<Vec<Simulation>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(self.simulations.load().await)
    }

    async fn insert_tasks(
        &self,
        simulation_id: i64,
        tasks: Vec<NewTask>,
    ) -> Result<Vec<Task>, AppError> {
        let _guard = self.lock.lock().await;
        let mut all_tasks: Vec<Task> = self.tasks.load().await;
        let mut created = Vec::with_capacity(tasks.len());

        for task in tasks {
            let row = Task {
                id: all_tasks.len() as i64 + 1,
                simulation_id,
                sequence: task.sequence,
                title: task.title,
                full_title: task.full_title,
                duration: task.duration,
                difficulty: task.difficulty,
                material_url: task.material_url,
                description: task.description,
                what_youll_learn: task.what_youll_learn,
                what_youll_do: task.what_youll_do,
            };
            all_tasks.push(row.clone());
            created.push(row);
        }

        self.tasks.save(&all_tasks).await?;
        tracing::info!("Saved {} tasks to JSON", created.len());

        Ok(created)
    }

    async fn list_tasks(&self, simulation_id: i64) -> Result<Vec<Task>, AppError> {
        let _guard = self.lock.lock().await;
        let all_tasks: Vec<Task> = self.tasks.load().await;

        let mut tasks: Vec<Task> = all_tasks
            .into_iter()
            .filter(|t| t.simulation_id == simulation_id)
            .collect();
        tasks.sort_by_key(|t| t.sequence);

        Ok(tasks)
    }

    async fn count_tasks(&self, simulation_id: i64) -> Result<i64, AppError> {
        let _guard = self.lock.lock().await;
        let all_tasks: Vec<Task> = self.tasks.load().await;

        Ok(all_tasks
            .iter()
            .filter(|t| t.simulation_id == simulation_id)
            .count() as i64)
    }

    async fn completed_task_count(
        &self,
        _simulation_id: i64,
        _user_id: &str,
    ) -> Result<Option<i64>, AppError> {
        // No progress table in degraded mode; callers use the completion
        // flags stored with each enrollment.
        Ok(None)
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }

    async fn ping(&self) -> bool {
        true
    }
}
