//! File-based storage layer for sprints.
//!
//! Each sprint is stored as one TOML file in the `.sprig/sprints/` directory,
//! named after the slug of its session id. The file holds the sprint with its
//! stories and every session artifact recorded against it.
//!
//! ## File Format
//!
//! ```toml
//! session_id = "AlphaTeam_Sprint_3"
//! team = "Alpha Team"
//! number = 3
//! goal = "Ship login"
//! start_date = "2026-01-05"
//! end_date = "2026-01-16"
//! status = "planning"
//!
//! [[stories]]
//! id = "US-001"
//! title = "Login form"
//! points = 5
//! points_approved = true
//! ```

mod repository;

pub use repository::SprintRepository;

use crate::error::Result;
use crate::model::Sprint;

/// Persistence for sprints and everything recorded against them.
pub trait SprintStore: Send + Sync {
    fn get(&self, session_id: &str) -> Result<Sprint>;

    fn list(&self) -> Result<Vec<Sprint>>;

    fn create(&self, sprint: &Sprint) -> Result<()>;

    /// Read the sprint, apply `mutation` and write it back as one unit.
    ///
    /// Nothing is written when `mutation` fails.
    fn update(
        &self,
        session_id: &str,
        mutation: &mut dyn FnMut(&mut Sprint) -> Result<()>,
    ) -> Result<Sprint>;

    fn exists(&self, session_id: &str) -> bool {
        self.get(session_id).is_ok()
    }
}
