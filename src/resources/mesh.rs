use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use cgmath::InnerSpace;

use crate::{
    data_structures::scene_graph::{SceneDescription, SceneMaterial, SceneMesh, SceneNode, TextureType},
    error::ModelLoadError,
    resources::AssetReader,
};

/// Parse an OBJ file (and the MTL libraries it references) into a scene.
///
/// Every OBJ object becomes one mesh under its own child of an empty root
/// node, in file order. A missing or broken MTL only costs the textures.
pub fn load_obj(reader: &dyn AssetReader, path: &Path) -> Result<SceneDescription, ModelLoadError> {
    let directory = path.parent().unwrap_or(Path::new(""));
    let obj_bytes = reader.read(path).map_err(|source| ModelLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut obj_reader = BufReader::new(Cursor::new(obj_bytes));

    let (models, obj_materials) = tobj::load_obj_buf(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| match reader.read(&directory.join(p)) {
            Ok(mtl) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl))),
            Err(e) => {
                log::warn!("material library {} could not be read: {e}", p.display());
                Err(tobj::LoadError::OpenFileFailed)
            }
        },
    )
    .map_err(|e| ModelLoadError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let obj_materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("{} has no usable materials: {e}", path.display());
        Vec::new()
    });

    let mut scene = SceneDescription::default();
    for m in &obj_materials {
        scene.add_material(to_scene_material(m));
    }
    let mut default_material = None;

    let root = scene.add_node(SceneNode {
        name: path.display().to_string(),
        ..Default::default()
    });
    scene.root = Some(root);

    for m in &models {
        let material = match m.mesh.material_id {
            Some(id) if id < obj_materials.len() => id,
            _ => *default_material
                .get_or_insert_with(|| scene.add_material(SceneMaterial::default())),
        };
        let mesh = scene.add_mesh(to_scene_mesh(m, material));
        let node = scene.add_node(SceneNode {
            name: m.name.clone(),
            meshes: vec![mesh],
            children: Vec::new(),
        });
        scene.nodes[root].children.push(node);
    }

    Ok(scene)
}

fn to_scene_material(m: &tobj::Material) -> SceneMaterial {
    let mut textures = Vec::new();
    let slots = [
        (TextureType::Diffuse, &m.diffuse_texture),
        (TextureType::Specular, &m.specular_texture),
        // map_Bump lands in the height slot, like most importers report it
        (TextureType::Height, &m.normal_texture),
        (TextureType::Ambient, &m.ambient_texture),
        (TextureType::Shininess, &m.shininess_texture),
        (TextureType::Opacity, &m.dissolve_texture),
    ];
    for (kind, texture) in slots {
        if let Some(identifier) = texture {
            textures.push((kind, identifier.clone()));
        }
    }

    SceneMaterial {
        name: m.name.clone(),
        diffuse: m.diffuse.unwrap_or([1.0; 3]),
        ambient: m.ambient.unwrap_or([0.0; 3]),
        specular: m.specular.unwrap_or([0.0; 3]),
        textures,
    }
}

fn to_scene_mesh(m: &tobj::Model, material: usize) -> SceneMesh {
    let mesh = &m.mesh;
    let positions = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect::<Vec<_>>();
    let faces = mesh
        .indices
        .chunks_exact(3)
        .map(|f| [f[0], f[1], f[2]])
        .collect::<Vec<_>>();
    let normals = if mesh.normals.is_empty() {
        compute_normals(&positions, &faces)
    } else {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect::<Vec<_>>()
    };

    let (tex_coords, tangents, bitangents) = if mesh.texcoords.is_empty() {
        (None, None, None)
    } else {
        // OBJ has v pointing up, wgpu samples with v pointing down
        let tex_coords = mesh
            .texcoords
            .chunks_exact(2)
            .map(|t| [t[0], 1.0 - t[1]])
            .collect::<Vec<_>>();
        let (tangents, bitangents) = compute_tangents(&positions, &tex_coords, &faces);
        (Some(tex_coords), Some(tangents), Some(bitangents))
    };

    SceneMesh {
        name: m.name.clone(),
        positions,
        normals,
        tex_coords,
        tangents,
        bitangents,
        bones: None,
        faces,
        material,
    }
}

/// Smooth per-vertex normals for meshes that ship without any: the
/// area-weighted sum of the adjacent face normals, normalised.
pub fn compute_normals(positions: &[[f32; 3]], faces: &[[u32; 3]]) -> Vec<[f32; 3]> {
    let mut sums = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for face in faces {
        let [i0, i1, i2] = face.map(|i| i as usize);
        if [i0, i1, i2].iter().any(|&i| i >= positions.len()) {
            continue;
        }
        let p0: cgmath::Vector3<f32> = positions[i0].into();
        let p1: cgmath::Vector3<f32> = positions[i1].into();
        let p2: cgmath::Vector3<f32> = positions[i2].into();
        let face_normal = (p1 - p0).cross(p2 - p0);
        for i in [i0, i1, i2] {
            sums[i] += face_normal;
        }
    }

    sums.into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0; 3]
            }
        })
        .collect()
}

/**
 * Obj files don't come with tangents and bitangents so they have to be calculated for
 * normal maps to work correctly.
 *
 * Every triangle contributes the same tangent/bitangent to its three corners; the sums
 * are averaged per vertex. Triangles with a degenerate uv mapping contribute nothing.
 */
pub fn compute_tangents(
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    faces: &[[u32; 3]],
) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    let mut tangents = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    let mut bitangents = tangents.clone();
    let mut triangles_included = vec![0u32; positions.len()];

    for face in faces {
        let [i0, i1, i2] = face.map(|i| i as usize);
        if [i0, i1, i2]
            .iter()
            .any(|&i| i >= positions.len() || i >= tex_coords.len())
        {
            continue;
        }

        let pos0: cgmath::Vector3<f32> = positions[i0].into();
        let pos1: cgmath::Vector3<f32> = positions[i1].into();
        let pos2: cgmath::Vector3<f32> = positions[i2].into();

        let uv0: cgmath::Vector2<f32> = tex_coords[i0].into();
        let uv1: cgmath::Vector2<f32> = tex_coords[i1].into();
        let uv2: cgmath::Vector2<f32> = tex_coords[i2].into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        // delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        // delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // flipped for right-handed normal maps in wgpu's texture space
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for i in [i0, i1, i2] {
            tangents[i] += tangent;
            bitangents[i] += bitangent;
            triangles_included[i] += 1;
        }
    }

    let average = |sums: Vec<cgmath::Vector3<f32>>| {
        sums.into_iter()
            .zip(&triangles_included)
            .map(|(sum, &n)| match n {
                0 => [0.0; 3],
                n => (sum / n as f32).into(),
            })
            .collect::<Vec<[f32; 3]>>()
    };

    (average(tangents), average(bitangents))
}
