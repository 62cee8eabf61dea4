mod common;

use std::collections::HashSet;

use material_spheres::{
    data_structures::{
        geometry::Geometry,
        material::{MapKind, MaterialUniform, HAS_AO_MAP, HAS_ENV_MAP},
        texture::ColorSpace,
    },
    showcase,
};

use crate::common::test_utils::project_default_camera;

#[test]
fn four_spheres_in_a_square() {
    let positions: Vec<_> = showcase::layout()
        .into_iter()
        .map(|p| (p.material.name, p.position.x, p.position.y, p.position.z))
        .collect();
    assert_eq!(
        positions,
        vec![
            ("leather".to_string(), -2.0, 2.0, 0.0),
            ("metal".to_string(), -2.0, -2.0, 0.0),
            ("plates".to_string(), 2.0, 2.0, 0.0),
            ("rock".to_string(), 2.0, -2.0, 0.0),
        ]
    );
}

#[test]
fn material_parameters_match_the_scene() {
    let leather = showcase::leather();
    assert_eq!(leather.displacement_scale, 0.2);
    assert_eq!(leather.roughness, 1.0);
    assert_eq!(leather.env_map_intensity, 0.2);
    assert!(!leather.maps.contains_key(&MapKind::Metalness));

    let metal = showcase::metal();
    assert_eq!(metal.displacement_scale, 0.2);
    assert_eq!(metal.metalness, 1.0);
    assert_eq!(metal.env_map_intensity, 1.0);

    let plates = showcase::plates();
    assert_eq!(plates.displacement_scale, 0.1);
    assert_eq!(plates.env_map_intensity, 0.9);

    let rock = showcase::rock();
    assert_eq!(rock.displacement_scale, 0.3);
    assert_eq!(rock.ao_map_intensity, 1.0);
    assert!(!rock.env_map);
    assert_eq!(MaterialUniform::from_desc(&rock).flags, HAS_AO_MAP);
    assert_eq!(MaterialUniform::from_desc(&metal).flags, HAS_ENV_MAP);
}

#[test]
fn manifest_lists_every_texture_once() {
    let manifest = showcase::texture_manifest();
    assert_eq!(manifest.len(), 19);
    let unique: HashSet<_> = manifest.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(unique.len(), 19);
    assert!(manifest.iter().all(|r| !r.path.starts_with('/')));

    let colour_maps: Vec<_> = manifest
        .iter()
        .filter(|r| r.color_space == ColorSpace::Srgb)
        .map(|r| r.path.as_str())
        .collect();
    assert_eq!(
        colour_maps,
        vec![
            "leather/Leather011_1K_Color.jpg",
            "metal/Metal001_1K_Color.jpg",
            "plates/MetalPlates006_1K_Color.jpg",
            "rock/Rock028_1K_Color.jpg",
        ]
    );
    assert!(manifest.iter().any(|r| r.path == "rock/Rock028_1K_AmbientOcclusion.jpg"));
}

#[test]
fn environment_faces_in_cube_order() {
    let faces = showcase::environment_faces();
    let names: Vec<_> = faces
        .iter()
        .map(|f| f.trim_start_matches("cubemap/").trim_end_matches(".png"))
        .collect();
    assert_eq!(names, vec!["px", "nx", "py", "ny", "pz", "nz"]);
}

#[test]
fn shared_sphere_has_occlusion_uvs() {
    let mut geometry = Geometry::sphere(
        showcase::SPHERE_RADIUS,
        showcase::SPHERE_SEGMENTS,
        showcase::SPHERE_SEGMENTS,
    );
    geometry.set_uv2_from_uv();
    let vertices = geometry.vertices();
    assert_eq!(vertices.len(), 41 * 41);
    assert!(vertices.iter().all(|v| v.tex_coords == v.tex_coords2));
}

#[test]
fn spheres_stay_inside_the_default_view() {
    // the widest point of a displaced sphere must still be on screen
    let reach = 2.0 + showcase::SPHERE_RADIUS + 0.3;
    let (x, y) = project_default_camera(reach, reach, 100);
    assert!(x < 100 && y > 0, "({x}, {y})");
}
