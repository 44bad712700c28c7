//! In-memory model of the point set currently intended for display and export.

use crate::domain::models::ScenePoint;

/// The scene holds either zero points or one complete generated set. There is
/// deliberately no incremental mutation API: writers replace or clear, so a
/// renderer holding the lock never observes a partially updated set.
#[derive(Debug, Default)]
pub struct SceneModel {
    points: Vec<ScenePoint>,
}

impl SceneModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the previous contents and install a freshly generated set.
    pub fn replace_all(&mut self, points: Vec<ScenePoint>) {
        self.points = points;
    }

    /// Empty the model to zero points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[ScenePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
