// src/state.rs

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::models::activity::UserActivity;
use crate::models::enrollment::Enrollment;
use crate::storage::{JsonFile, SimulationStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SimulationStore>,

    /// Enrollment records, loaded from `enrollments.json` at startup and
    /// rewritten wholesale on mutation.
    pub enrollments: Arc<Mutex<Vec<Enrollment>>>,

    /// Per-user activity records from `user_activity.json`, same lifecycle.
    pub activity: Arc<Mutex<HashMap<String, UserActivity>>>,

    pub config: Config,
}

impl AppState {
    pub async fn load(store: Arc<dyn SimulationStore>, config: Config) -> Self {
        let enrollments: Vec<Enrollment> =
            JsonFile::new(config.data_dir.join("enrollments.json")).load().await;
        let activity: HashMap<String, UserActivity> =
            JsonFile::new(config.data_dir.join("user_activity.json")).load().await;

        Self {
            store,
            enrollments: Arc::new(Mutex::new(enrollments)),
            activity: Arc::new(Mutex::new(activity)),
            config,
        }
    }

    pub fn enrollments_file(&self) -> JsonFile {
        JsonFile::new(self.config.data_dir.join("enrollments.json"))
    }

    pub fn activity_file(&self) -> JsonFile {
        JsonFile::new(self.config.data_dir.join("user_activity.json"))
    }

    pub fn categories_file(&self) -> JsonFile {
        JsonFile::new(self.config.data_dir.join("categories.json"))
    }
}
