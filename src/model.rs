//! Triangle meshes stored in the permanent arena.
//!
//! A [`Model`] owns no vertex memory itself; it holds [`ArenaSlice`] handles
//! into the arena the data was loaded into, plus a world [`Transform`].
//! Every face corner gets its own [`Vertex`], so the index buffer simply
//! counts up and flat per-face normals stay flat.

use std::io::BufRead;
use std::path::Path;

use crate::error::Result;
use crate::geometry::Vertex;
use crate::math::{Vec2, Vec3};
use crate::memory::{Arena, ArenaSlice};
use crate::transform::Transform;

/// A triangle mesh whose vertices and indices live in an [`Arena`].
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    vertices: ArenaSlice<Vertex>,
    indices: ArenaSlice<u32>,
    transform: Transform,
}

impl Model {
    /// Copies `vertices` and `indices` into `arena`.
    pub fn from_triangles(
        name: impl Into<String>,
        vertices: &[Vertex],
        indices: &[u32],
        arena: &mut Arena,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            vertices: arena.alloc_slice(vertices)?,
            indices: arena.alloc_slice(indices)?,
            transform: Transform::default(),
        })
    }

    /// Loads every object of an OBJ file into one model.
    pub fn from_obj<P: AsRef<Path>>(path: P, arena: &mut Arena) -> Result<Self> {
        let path = path.as_ref();
        let (objects, _materials) = tobj::load_obj(path, &load_options())?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let model = Self::from_tobj(name, &objects, arena)?;
        log::info!(
            "loaded {}: {} triangles from {} objects",
            path.display(),
            model.triangle_count(),
            objects.len()
        );
        Ok(model)
    }

    /// Loads OBJ text from a reader. Material libraries are not resolved.
    pub fn from_obj_reader<R: BufRead>(
        name: impl Into<String>,
        reader: &mut R,
        arena: &mut Arena,
    ) -> Result<Self> {
        let (objects, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })?;
        Self::from_tobj(name.into(), &objects, arena)
    }

    fn from_tobj(name: String, objects: &[tobj::Model], arena: &mut Arena) -> Result<Self> {
        let mut vertices = Vec::new();
        for object in objects {
            expand_corners(&object.mesh, &mut vertices);
        }
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        Self::from_triangles(name, &vertices, &indices, arena)
    }

    /// An axis-aligned cube from -1 to 1 with outward normals.
    pub fn cube(arena: &mut Arena) -> Result<Self> {
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (-Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (-Vec3::Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, Vec3::Y, Vec3::X),
        ];

        let mut vertices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let corner = |su: f32, sv: f32, uv: Vec2| {
                Vertex::new(normal + u * su + v * sv, normal, uv)
            };
            let quad = [
                corner(-1.0, -1.0, Vec2::new(0.0, 1.0)),
                corner(1.0, -1.0, Vec2::new(1.0, 1.0)),
                corner(1.0, 1.0, Vec2::new(1.0, 0.0)),
                corner(-1.0, 1.0, Vec2::new(0.0, 0.0)),
            ];
            vertices.extend([quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
        }
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        Self::from_triangles("cube", &vertices, &indices, arena)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices<'a>(&self, arena: &'a Arena) -> Result<&'a [Vertex]> {
        arena.slice(self.vertices)
    }

    pub fn indices<'a>(&self, arena: &'a Arena) -> Result<&'a [u32]> {
        arena.slice(self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Appends one [`Vertex`] per face corner of `mesh`.
///
/// Missing normals are replaced by the face normal, missing texture
/// coordinates by zero.
fn expand_corners(mesh: &tobj::Mesh, out: &mut Vec<Vertex>) {
    let position = |i: usize| {
        Vec3::new(
            mesh.positions[3 * i],
            mesh.positions[3 * i + 1],
            mesh.positions[3 * i + 2],
        )
    };
    let normal = |i: usize| {
        (mesh.normals.len() >= 3 * i + 3)
            .then(|| Vec3::new(mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]))
    };
    let uv = |i: usize| {
        if mesh.texcoords.len() >= 2 * i + 2 {
            Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
        } else {
            Vec2::ZERO
        }
    };
    let vertex_count = mesh.positions.len() / 3;

    for face in mesh.indices.chunks_exact(3) {
        let corners = [face[0] as usize, face[1] as usize, face[2] as usize];
        if corners.iter().any(|&i| i >= vertex_count) {
            log::warn!("skipping face with out-of-range index {face:?}");
            continue;
        }
        let [a, b, c] = corners.map(position);
        let face_normal = (b - a).cross(c - a).normalize();
        for i in corners {
            out.push(Vertex::new(position(i), normal(i).unwrap_or(face_normal), uv(i)));
        }
    }
}
