//! Loading of scene descriptions, meshes and textures from external files.
//!
//! A scene description is a JSON array of triangle sets. Each set lists its
//! vertices, optional per-vertex normals and texture coordinates, its triangles
//! and an optional material and texture name. [`build_scene`] turns the parsed
//! sets into a [`SceneState`], leaving geometry upload and texture requests to
//! the caller so the same code serves the GPU backend and headless tests.

use std::sync::Arc;

use anyhow::Context;
use cgmath::{InnerSpace, Vector3};
use serde::Deserialize;

use crate::{
    data_structures::{
        material::Material,
        model::ModelVertex,
        object::RenderableObject,
        transform::ObjectTransform,
    },
    resources::texture::TextureResource,
    scene::SceneState,
};

pub mod mesh;
pub mod texture;

const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const DEFAULT_UV: [f32; 2] = [0.0, 0.0];

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("No browser window available")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("Page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

/// `./assets` when run from the crate root, otherwise the copy the build
/// script placed next to the build output.
#[cfg(not(target_arch = "wasm32"))]
pub fn assets_dir() -> std::path::PathBuf {
    let local = std::path::Path::new("./").join("assets");
    match option_env!("TRI_NGIN_ASSETS") {
        Some(built) if !local.is_dir() => std::path::PathBuf::from(built),
        _ => local,
    }
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = assets_dir().join(file_name);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?
    };

    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = assets_dir().join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?
    };

    Ok(data)
}

/// Material block of a triangle set. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MaterialDescription {
    pub ambient: Option<[f32; 3]>,
    pub diffuse: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
    /// Specular exponent.
    pub n: Option<f32>,
    pub alpha: Option<f32>,
    pub texture: Option<String>,
}

impl From<&MaterialDescription> for Material {
    fn from(desc: &MaterialDescription) -> Self {
        let defaults = Material::default();
        Material {
            ambient: desc.ambient.map_or(defaults.ambient, Into::into),
            diffuse: desc.diffuse.map_or(defaults.diffuse, Into::into),
            specular: desc.specular.map_or(defaults.specular, Into::into),
            shininess: desc.n.unwrap_or(defaults.shininess),
            alpha: desc.alpha.map_or(defaults.alpha, |alpha| alpha.clamp(0.0, 1.0)),
        }
    }
}

/// One triangle set as it appears in the scene description.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TriangleSet {
    #[serde(default)]
    pub material: Option<MaterialDescription>,
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub uvs: Vec<[f32; 2]>,
    #[serde(default)]
    pub uv: Vec<[f32; 2]>,
    #[serde(default)]
    pub texcoords: Vec<[f32; 2]>,
    #[serde(default)]
    pub triangles: Vec<[u32; 3]>,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "textureFile")]
    pub texture_file: Option<String>,
}

impl TriangleSet {
    /// The texture to load, looked up in `texture`, `image`, `textureFile` and
    /// finally `material.texture`. Empty names count as absent.
    pub fn texture_name(&self) -> Option<&str> {
        [
            self.texture.as_deref(),
            self.image.as_deref(),
            self.texture_file.as_deref(),
            self.material.as_ref().and_then(|m| m.texture.as_deref()),
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
    }

    pub fn material(&self) -> Material {
        self.material.as_ref().map(Material::from).unwrap_or_default()
    }

    /// Load-time transparency guess: formats that usually carry alpha, or a
    /// translucent material.
    pub fn probably_transparent(&self) -> bool {
        let alpha_format = self.texture_name().is_some_and(|name| {
            let name = name.to_ascii_lowercase();
            name.ends_with(".png") || name.ends_with(".gif")
        });
        alpha_format || self.material().is_translucent()
    }

    /// Average of all vertex positions.
    pub fn center(&self) -> Vector3<f32> {
        if self.vertices.is_empty() {
            return Vector3::new(0.0, 0.0, 0.0);
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::new(0.0, 0.0, 0.0), |sum, v| sum + Vector3::from(*v));
        sum / self.vertices.len() as f32
    }

    /// Axis-aligned bounds as `(min, max)`, `None` without vertices.
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = Vector3::from(*self.vertices.first()?);
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (
                Vector3::new(min.x.min(v[0]), min.y.min(v[1]), min.z.min(v[2])),
                Vector3::new(max.x.max(v[0]), max.y.max(v[1]), max.z.max(v[2])),
            )
        }))
    }

    fn uv_at(&self, i: usize) -> [f32; 2] {
        [&self.uvs, &self.uv, &self.texcoords]
            .into_iter()
            .find_map(|list| list.get(i).copied())
            .unwrap_or(DEFAULT_UV)
    }

    /// Interleaved vertices with missing normals and texture coordinates defaulted.
    pub fn model_vertices(&self) -> Vec<ModelVertex> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| ModelVertex {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or(DEFAULT_NORMAL),
                tex_coords: self.uv_at(i),
            })
            .collect()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

pub fn parse_scene(json: &str) -> anyhow::Result<Vec<TriangleSet>> {
    let sets: Vec<TriangleSet> =
        serde_json::from_str(json).context("Malformed triangle set description")?;
    Ok(sets)
}

pub async fn load_scene(file_name: &str) -> anyhow::Result<Vec<TriangleSet>> {
    let json = load_string(file_name).await?;
    let sets = parse_scene(&json).with_context(|| format!("Cannot load scene {file_name}"))?;
    log::info!("Loaded {} triangle sets from {}", sets.len(), file_name);
    Ok(sets)
}

/// Turn parsed triangle sets into a scene.
///
/// `upload_geometry` creates the geometry handle of one set and `request_texture`
/// starts loading a named texture; sets without a texture never call it.
pub fn build_scene<G, T>(
    sets: &[TriangleSet],
    mut upload_geometry: impl FnMut(usize, &TriangleSet) -> G,
    mut request_texture: impl FnMut(&str) -> Arc<TextureResource<T>>,
) -> SceneState<G, T> {
    let objects = sets
        .iter()
        .enumerate()
        .map(|(i, set)| {
            if set.vertices.is_empty() {
                log::warn!("Triangle set {} has no vertices", i);
            }
            let texture = set.texture_name().map(&mut request_texture);
            RenderableObject::new(
                format!("set {i}"),
                upload_geometry(i, set),
                set.triangles.len() as u32,
                set.material(),
                ObjectTransform::new(set.center()),
                texture,
                set.probably_transparent(),
            )
        })
        .collect();

    let view_delta = scene_extent(sets) / 100.0;
    SceneState::new(objects, view_delta)
}

/// Diagonal of the bounding box around every vertex of the scene.
fn scene_extent(sets: &[TriangleSet]) -> f32 {
    let bounds = sets.iter().filter_map(TriangleSet::bounds).reduce(|(a_min, a_max), (b_min, b_max)| {
        (
            Vector3::new(a_min.x.min(b_min.x), a_min.y.min(b_min.y), a_min.z.min(b_min.z)),
            Vector3::new(a_max.x.max(b_max.x), a_max.y.max(b_max.y), a_max.z.max(b_max.z)),
        )
    });
    bounds.map_or(0.0, |(min, max)| (max - min).magnitude())
}
