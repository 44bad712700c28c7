//! Wavefront OBJ export of the scene model.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::domain::scene::SceneModel;

pub struct ObjExporter;

impl ObjExporter {
    /// Render the model as OBJ text: one `v` record per point plus a `p`
    /// point element per vertex. An empty model renders a valid file with
    /// zero vertices.
    pub fn render(scene: &SceneModel) -> String {
        let mut out = String::new();
        out.push_str("# roomscan point cloud export\n");
        out.push_str("o scan\n");

        for point in scene.points() {
            let p = point.position;
            let _ = writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z);
        }
        // OBJ vertex indices are 1-based
        for index in 1..=scene.len() {
            let _ = writeln!(out, "p {index}");
        }
        out
    }

    /// Write the model into `dir` under a timestamped name and return the
    /// full path.
    pub fn write(scene: &SceneModel, dir: &Path) -> anyhow::Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("roomscan-{stamp}.obj"));

        fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;
        fs::write(&path, Self::render(scene))
            .with_context(|| format!("writing model to {}", path.display()))?;

        info!(path = %path.display(), points = scene.len(), "model exported");
        Ok(path)
    }

    /// Resolve where exports land: the configured override, else the
    /// platform download directory, else the working directory.
    pub fn resolve_dir(configured: Option<&str>) -> PathBuf {
        configured
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ScenePoint;
    use glam::Vec3;

    fn scene_with(n: u32) -> SceneModel {
        let mut scene = SceneModel::new();
        scene.replace_all(
            (0..n)
                .map(|id| ScenePoint {
                    id,
                    position: Vec3::new(id as f32, -1.5, 0.25),
                })
                .collect(),
        );
        scene
    }

    #[test]
    fn renders_one_vertex_and_one_element_per_point() {
        let obj = ObjExporter::render(&scene_with(3));
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert_eq!(obj.lines().filter(|l| l.starts_with("p ")).count(), 3);
        assert!(obj.contains("v 1.000000 -1.500000 0.250000"));
        assert!(obj.contains("p 3"));
    }

    #[test]
    fn empty_model_renders_a_valid_header_only_file() {
        let obj = ObjExporter::render(&SceneModel::new());
        assert!(obj.starts_with("# roomscan point cloud export\n"));
        assert!(obj.contains("o scan\n"));
        assert!(!obj.contains("\nv "));
        assert!(!obj.contains("\np "));
    }

    #[test]
    fn writes_a_timestamped_file() {
        let dir = std::env::temp_dir().join(format!("roomscan-export-{}", std::process::id()));
        let path = ObjExporter::write(&scene_with(2), &dir).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("o scan"));
        assert_eq!(contents.matches("\np ").count(), 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn resolve_dir_prefers_the_configured_override() {
        assert_eq!(
            ObjExporter::resolve_dir(Some("/tmp/scans")),
            PathBuf::from("/tmp/scans")
        );
    }
}
