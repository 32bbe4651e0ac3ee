//! Built-in scenes: variations of the sphere Cornell box.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use lumen_core::{load_stl, MeshError, MeshPlacement, TriangleSoup};
use lumen_math::{Camera, Vec3};

use crate::brdf::{Brdf, Color};
use crate::error::SceneResult;
use crate::mesh::MeshShape;
use crate::scene::Scene;
use crate::shape::Shape;
use crate::sphere::Sphere;

/// Index of the light in every preset.
pub const PRESET_LIGHT: usize = 0;

/// Index of the diffuse ball (or the mesh replacing it).
pub const PRESET_CENTERPIECE: usize = 6;

const WALL_RADIUS: f64 = 1e5;
const BALL_RADIUS: f64 = 16.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenePreset {
    /// Small bright light near the ceiling.
    #[default]
    Cornell,
    /// Same room, larger and dimmer light.
    CornellLargeLight,
    /// The diffuse ball swapped for a mesh.
    CornellMesh,
}

impl ScenePreset {
    pub const ALL: [ScenePreset; 3] = [
        ScenePreset::Cornell,
        ScenePreset::CornellLargeLight,
        ScenePreset::CornellMesh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScenePreset::Cornell => "cornell",
            ScenePreset::CornellLargeLight => "cornell-large-light",
            ScenePreset::CornellMesh => "cornell-mesh",
        }
    }

    /// Build the preset. `mesh` is only read by [`ScenePreset::CornellMesh`].
    pub fn build(self, mesh: Option<&Path>) -> SceneResult<PresetScene> {
        let (light, centerpiece, mesh_error) = match self {
            ScenePreset::Cornell => (small_light(), diffuse_ball(), None),
            ScenePreset::CornellLargeLight => (large_light(), diffuse_ball(), None),
            ScenePreset::CornellMesh => {
                let (shape, error) = mesh_centerpiece(mesh);
                (small_light(), shape, error)
            }
        };

        let mut shapes = Vec::with_capacity(8);
        shapes.push(light);
        shapes.extend(walls());
        shapes.push(centerpiece);
        shapes.push(mirror_ball());

        let scene = Scene::new(shapes, PRESET_LIGHT)?;
        log::info!("Built scene preset '{}'", self.name());
        Ok(PresetScene { scene, mesh_error })
    }
}

impl fmt::Display for ScenePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown scene preset '{s}'"))
    }
}

/// A built preset and, for the mesh preset, the load error if any.
///
/// On a load failure the scene still renders, with an empty mesh.
#[derive(Debug)]
pub struct PresetScene {
    pub scene: Scene,
    pub mesh_error: Option<MeshError>,
}

/// Camera the presets are framed for.
pub fn reference_camera() -> Camera {
    Camera::look_along(Vec3::new(50.0, 52.0, 295.6), Vec3::new(0.0, -0.042612, -1.0))
}

fn diffuse(kd: Color) -> Arc<Brdf> {
    Arc::new(Brdf::diffuse(kd))
}

fn small_light() -> Shape {
    Shape::new(
        Sphere::new(Vec3::new(50.0, 70.0, 81.6), 5.0),
        diffuse(Color::ZERO),
        Color::splat(50.0),
    )
}

fn large_light() -> Shape {
    Shape::new(
        Sphere::new(Vec3::new(50.0, 65.0, 81.6), 10.0),
        diffuse(Color::ZERO),
        Color::splat(12.0),
    )
}

fn walls() -> [Shape; 5] {
    let other = diffuse(Color::splat(0.75));
    let wall = |center: Vec3, brdf: Arc<Brdf>| Shape::surface(Sphere::new(center, WALL_RADIUS), brdf);
    [
        wall(Vec3::new(WALL_RADIUS + 1.0, 40.8, 81.6), diffuse(Color::new(0.75, 0.25, 0.25))),
        wall(Vec3::new(-WALL_RADIUS + 99.0, 40.8, 81.6), diffuse(Color::new(0.25, 0.25, 0.75))),
        wall(Vec3::new(50.0, 40.8, WALL_RADIUS), other.clone()),
        wall(Vec3::new(50.0, WALL_RADIUS, 81.6), other.clone()),
        wall(Vec3::new(50.0, -WALL_RADIUS + 81.6, 81.6), other),
    ]
}

fn diffuse_ball() -> Shape {
    Shape::surface(
        Sphere::new(Vec3::new(27.0, BALL_RADIUS, 47.0), BALL_RADIUS),
        diffuse(Color::splat(0.9)),
    )
}

fn mirror_ball() -> Shape {
    Shape::surface(
        Sphere::new(Vec3::new(73.0, BALL_RADIUS, 78.0), BALL_RADIUS),
        Arc::new(Brdf::specular(Color::splat(0.999))),
    )
}

fn mesh_centerpiece(path: Option<&Path>) -> (Shape, Option<MeshError>) {
    let (mut soup, error) = match path.map(load_stl) {
        Some(Ok(soup)) => (soup, None),
        Some(Err(e)) => {
            log::warn!("Mesh load failed, rendering without it: {}", e);
            (TriangleSoup::default(), Some(e))
        }
        None => {
            log::warn!("No mesh path given for the mesh preset");
            (TriangleSoup::default(), None)
        }
    };

    soup.place(&MeshPlacement {
        position: Vec3::new(27.0, 0.0, 47.0),
        scale: 30.0,
        normalize: true,
    });
    if !soup.is_empty() {
        // Rest on the floor.
        let lift = -soup.bounds().min.y;
        soup.transform(1.0, Vec3::new(0.0, lift, 0.0));
    }

    let shape = Shape::surface(MeshShape::from_soup(&soup), diffuse(Color::splat(0.9)));
    (shape, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Geometry;
    use lumen_core::write_stl;
    use lumen_math::Ray;

    #[test]
    fn test_cornell_layout() {
        let preset = ScenePreset::Cornell.build(None).unwrap();
        let scene = preset.scene;

        assert_eq!(scene.len(), 8);
        assert_eq!(scene.light_index(), PRESET_LIGHT);
        assert_eq!(scene.light().emission(), Color::splat(50.0));
        assert!(preset.mesh_error.is_none());
        assert!(scene.shapes()[7].brdf().is_specular());
    }

    #[test]
    fn test_reference_camera_sees_back_wall() {
        let scene = ScenePreset::Cornell.build(None).unwrap().scene;
        let camera = reference_camera();
        let ray = camera.primary_ray(320.0, 240.0, 640, 480);

        let hit = scene.intersect(&ray).unwrap();
        assert_eq!(hit.index, 3);
    }

    #[test]
    fn test_large_light_variant() {
        let scene = ScenePreset::CornellLargeLight.build(None).unwrap().scene;
        assert_eq!(scene.light().emission(), Color::splat(12.0));
    }

    #[test]
    fn test_mesh_preset_missing_file_reports_error() {
        let preset = ScenePreset::CornellMesh
            .build(Some(Path::new("/no/such/bunny.stl")))
            .unwrap();

        assert!(matches!(preset.mesh_error, Some(MeshError::Io(_))));
        match preset.scene.shape(PRESET_CENTERPIECE).geometry() {
            Geometry::Mesh(mesh) => assert!(mesh.is_empty()),
            other => panic!("expected mesh, got {other:?}"),
        }
    }

    #[test]
    fn test_mesh_preset_rests_on_floor() {
        let tetra = TriangleSoup::new(vec![
            [Vec3::ZERO, Vec3::X, Vec3::Z],
            [Vec3::ZERO, Vec3::Y, Vec3::X],
            [Vec3::ZERO, Vec3::Z, Vec3::Y],
            [Vec3::X, Vec3::Y, Vec3::Z],
        ]);
        let path = std::env::temp_dir().join(format!("lumen_tetra_{}.stl", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        write_stl(file, &tetra).unwrap();

        let preset = ScenePreset::CornellMesh.build(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(preset.mesh_error.is_none());

        let Geometry::Mesh(mesh) = preset.scene.shape(PRESET_CENTERPIECE).geometry() else {
            panic!("centerpiece is not a mesh");
        };
        assert_eq!(mesh.len(), 4);
        let lowest = mesh
            .triangles()
            .iter()
            .flat_map(|t| t.vertices())
            .map(|v| v.y)
            .fold(f64::INFINITY, f64::min);
        assert!(lowest.abs() < 1e-9);

        let down = Ray::new(Vec3::new(19.5, 60.0, 39.5), Vec3::NEG_Y);
        assert_eq!(preset.scene.intersect(&down).unwrap().index, PRESET_CENTERPIECE);
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in ScenePreset::ALL {
            assert_eq!(preset.name().parse::<ScenePreset>().unwrap(), preset);
        }
        assert!("disco".parse::<ScenePreset>().is_err());
    }
}
