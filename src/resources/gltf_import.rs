use std::{collections::HashMap, path::Path};

use cgmath::Vector3;

use crate::{
    data_structures::{
        model::BoneWeights,
        scene_graph::{SceneDescription, SceneMaterial, SceneMesh, SceneNode, TextureType},
    },
    error::ModelLoadError,
    resources::{AssetReader, mesh::{compute_normals, compute_tangents}, texture::EMBEDDED_PREFIX},
};

/// Parse a `.gltf` or `.glb` file into a scene.
///
/// Every node is kept, every triangle primitive becomes one mesh, and the
/// roots of the default scene hang off a synthetic root node. Images stored in
/// buffer views are exposed as embedded payloads keyed `*<image index>`.
pub fn load_gltf(reader: &dyn AssetReader, path: &Path) -> Result<SceneDescription, ModelLoadError> {
    let directory = path.parent().unwrap_or(Path::new(""));
    let parse_error = |reason: String| ModelLoadError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = reader.read(path).map_err(|source| ModelLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let gltf = gltf::Gltf::from_slice(&bytes).map_err(|e| parse_error(e.to_string()))?;

    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| parse_error("binary chunk referenced but missing".into()))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(parse_error(format!(
                    "buffer {} uses an inline data uri, which is not supported",
                    buffer.index()
                )));
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = reader
                    .read(&directory.join(uri))
                    .map_err(|e| parse_error(format!("buffer `{uri}`: {e}")))?;
                buffer_data.push(bin);
            }
        }
    }

    let mut scene = SceneDescription::default();
    let image_ids = collect_images(&gltf, &buffer_data, &mut scene.embedded);

    for material in gltf.materials() {
        scene.add_material(to_scene_material(&material, &image_ids));
    }
    let default_material = scene.add_material(SceneMaterial {
        name: "default".into(),
        ..Default::default()
    });

    // one scene mesh per primitive; gltf mesh index -> scene mesh indices
    let mut primitives_of: Vec<Vec<usize>> = Vec::new();
    for mesh in gltf.meshes() {
        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping primitive {} of mesh {}: mode {:?} is not a triangle list",
                    primitive.index(),
                    mesh.index(),
                    primitive.mode()
                );
                continue;
            }
            let material = primitive.material().index().unwrap_or(default_material);
            let name = mesh
                .name()
                .map_or_else(|| format!("mesh{}", mesh.index()), str::to_string);
            match read_primitive(&primitive, &buffer_data, name, material) {
                Some(scene_mesh) => indices.push(scene.add_mesh(scene_mesh)),
                None => log::warn!(
                    "skipping primitive {} of mesh {}: no positions",
                    primitive.index(),
                    mesh.index()
                ),
            }
        }
        primitives_of.push(indices);
    }

    // arena node i is gltf node i
    for node in gltf.nodes() {
        scene.add_node(SceneNode {
            name: node.name().unwrap_or_default().to_string(),
            meshes: node
                .mesh()
                .map(|m| primitives_of[m.index()].clone())
                .unwrap_or_default(),
            children: node.children().map(|c| c.index()).collect(),
        });
    }

    if let Some(gltf_scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        let root = scene.add_node(SceneNode {
            name: gltf_scene.name().unwrap_or("scene").to_string(),
            meshes: Vec::new(),
            children: gltf_scene.nodes().map(|n| n.index()).collect(),
        });
        scene.root = Some(root);
    }

    Ok(scene)
}

/// Identifier of every image, registering buffer-view images as embedded payloads.
fn collect_images(
    gltf: &gltf::Gltf,
    buffer_data: &[Vec<u8>],
    embedded: &mut HashMap<String, Vec<u8>>,
) -> Vec<String> {
    gltf.images()
        .map(|image| match image.source() {
            gltf::image::Source::View { view, .. } => {
                let identifier = format!("{EMBEDDED_PREFIX}{}", image.index());
                let start = view.offset();
                let end = start + view.length();
                match buffer_data.get(view.buffer().index()).and_then(|b| b.get(start..end)) {
                    Some(payload) => {
                        embedded.insert(identifier.clone(), payload.to_vec());
                    }
                    None => log::warn!("image {} points outside its buffer", image.index()),
                }
                identifier
            }
            gltf::image::Source::Uri { uri, .. } => uri.to_string(),
        })
        .collect()
}

fn to_scene_material(material: &gltf::Material, image_ids: &[String]) -> SceneMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();

    let mut textures = Vec::new();
    let mut push = |kind: TextureType, texture: gltf::Texture| {
        if let Some(identifier) = image_ids.get(texture.source().index()) {
            if identifier.starts_with("data:") {
                log::warn!("inline data uri textures are not supported, skipping");
            } else {
                textures.push((kind, identifier.clone()));
            }
        }
    };
    if let Some(info) = pbr.base_color_texture() {
        push(TextureType::Diffuse, info.texture());
    }
    if let Some(normal) = material.normal_texture() {
        push(TextureType::Normals, normal.texture());
    }
    if let Some(info) = material.emissive_texture() {
        push(TextureType::Emissive, info.texture());
    }

    SceneMaterial {
        name: material.name().unwrap_or_default().to_string(),
        diffuse: [r, g, b],
        ambient: [0.0; 3],
        specular: [0.0; 3],
        textures,
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffer_data: &[Vec<u8>],
    name: String,
    material: usize,
) -> Option<SceneMesh> {
    let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

    let positions = reader.read_positions()?.collect::<Vec<_>>();
    let faces = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect::<Vec<_>>(),
        None => (0..positions.len() as u32).collect(),
    }
    .chunks_exact(3)
    .map(|f| [f[0], f[1], f[2]])
    .collect::<Vec<_>>();
    let normals = match reader.read_normals() {
        Some(normals) => normals.collect::<Vec<_>>(),
        None => compute_normals(&positions, &faces),
    };

    let tex_coords = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect::<Vec<_>>());

    let (tangents, bitangents) = match (&tex_coords, reader.read_tangents()) {
        (None, _) => (None, None),
        (Some(_), Some(tangents)) => {
            let (t, b): (Vec<[f32; 3]>, Vec<[f32; 3]>) = tangents
                .enumerate()
                .map(|(i, [x, y, z, w])| {
                    let tangent = Vector3::new(x, y, z);
                    let normal: Vector3<f32> = normals.get(i).copied().unwrap_or([0.0; 3]).into();
                    let bitangent = normal.cross(tangent) * w;
                    (Into::<[f32; 3]>::into(tangent), Into::<[f32; 3]>::into(bitangent))
                })
                .unzip();
            (Some(t), Some(b))
        }
        (Some(uvs), None) => {
            let (t, b) = compute_tangents(&positions, uvs, &faces);
            (Some(t), Some(b))
        }
    };

    let joints = reader.read_joints(0).map(|j| j.into_u16().collect::<Vec<_>>());
    let weights = reader.read_weights(0).map(|w| w.into_f32().collect::<Vec<_>>());
    let bones = match (joints, weights) {
        (Some(joints), Some(weights)) => Some(
            joints
                .into_iter()
                .zip(weights)
                .map(|(j, w)| BoneWeights {
                    indices: j.map(u32::from),
                    weights: w,
                })
                .collect(),
        ),
        _ => None,
    };

    Some(SceneMesh {
        name,
        positions,
        normals,
        tex_coords,
        tangents,
        bitangents,
        bones,
        faces,
        material,
    })
}
