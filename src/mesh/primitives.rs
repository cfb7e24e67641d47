//! Primitive shape builders
//!
//! Every builder returns a mesh centered on the local origin with the same
//! conventions as the common scene-graph primitives: cylinders run along Y,
//! spheres start their seam on -X, planes lie in XZ facing +Y.

use std::f32::consts::{PI, TAU};
use crate::math::Vec3;
use super::geometry::{Mesh, Vertex};
use super::material::Material;

/// Ring of vertices around the Y axis at height `y`
fn create_ring(
    y: f32,
    radius: f32,
    segments: usize,
    normal_y: f32,
    material: &Material,
) -> Vec<Vertex> {
    (0..segments)
        .map(|i| {
            let angle = (i as f32 / segments as f32) * TAU;
            let (sin_a, cos_a) = angle.sin_cos();
            let position = Vec3::new(radius * sin_a, y, radius * cos_a);
            let normal = Vec3::new(sin_a, normal_y, cos_a).normalize();
            Vertex::new(position, normal, material)
        })
        .collect()
}

/// Connect two rings with triangles
fn connect_rings(mesh: &mut Mesh, ring1_start: u32, ring2_start: u32, segments: usize) {
    for i in 0..segments {
        let i_next = (i + 1) % segments;

        let a = ring1_start + i as u32;
        let b = ring1_start + i_next as u32;
        let c = ring2_start + i_next as u32;
        let d = ring2_start + i as u32;

        mesh.add_quad(a, b, c, d);
    }
}

/// Flat disc closing one end of a cylinder
fn add_cap(mesh: &mut Mesh, y: f32, radius: f32, segments: usize, up: bool, material: &Material) {
    let normal = if up { Vec3::UP } else { -Vec3::UP };
    let center = mesh.add_vertices(std::iter::once(Vertex::new(Vec3::new(0.0, y, 0.0), normal, material)));
    let rim = mesh.add_vertices((0..segments).map(|i| {
        let angle = (i as f32 / segments as f32) * TAU;
        let (sin_a, cos_a) = angle.sin_cos();
        Vertex::new(Vec3::new(radius * sin_a, y, radius * cos_a), normal, material)
    }));

    for i in 0..segments {
        let a = rim + i as u32;
        let b = rim + ((i + 1) % segments) as u32;
        if up {
            mesh.add_triangle(center, a, b);
        } else {
            mesh.add_triangle(center, b, a);
        }
    }
}

/// Capped cylinder (or frustum) along Y, centered at the origin
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: usize,
    material: &Material,
) -> Mesh {
    let segments = radial_segments.max(3);
    let half = height / 2.0;
    // Side normals tilt outward when the bottom is wider than the top
    let slope = if height > 0.0 { (radius_bottom - radius_top) / height } else { 0.0 };

    let mut mesh = Mesh::new();
    let bottom = mesh.add_vertices(create_ring(-half, radius_bottom, segments, slope, material));
    let top = mesh.add_vertices(create_ring(half, radius_top, segments, slope, material));
    connect_rings(&mut mesh, bottom, top, segments);

    if radius_top > 0.0 {
        add_cap(&mut mesh, half, radius_top, segments, true, material);
    }
    if radius_bottom > 0.0 {
        add_cap(&mut mesh, -half, radius_bottom, segments, false, material);
    }
    mesh
}

/// Ellipsoid with per-axis radii; a sphere when all radii match
///
/// Normals follow the true ellipsoid gradient so squashed shapes light
/// correctly without a scaling transform.
pub fn ellipsoid(
    radii: Vec3,
    width_segments: usize,
    height_segments: usize,
    material: &Material,
) -> Mesh {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut mesh = Mesh::new();
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let (sin_v, cos_v) = (v * PI).sin_cos();
        mesh.add_vertices((0..=w).map(|ix| {
            let u = ix as f32 / w as f32;
            let (sin_u, cos_u) = (u * TAU).sin_cos();
            let position = Vec3::new(
                -radii.x * cos_u * sin_v,
                radii.y * cos_v,
                radii.z * sin_u * sin_v,
            );
            let normal = Vec3::new(
                position.x / (radii.x * radii.x),
                position.y / (radii.y * radii.y),
                position.z / (radii.z * radii.z),
            )
            .normalize();
            Vertex::new(position, normal, material)
        }));
    }

    let row = (w + 1) as u32;
    for iy in 0..h as u32 {
        for ix in 0..w as u32 {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            // Pole rows collapse to a point; skip their degenerate halves
            if iy != 0 {
                mesh.add_triangle(a, b, d);
            }
            if iy != h as u32 - 1 {
                mesh.add_triangle(b, c, d);
            }
        }
    }
    mesh
}

pub fn sphere(radius: f32, width_segments: usize, height_segments: usize, material: &Material) -> Mesh {
    ellipsoid(Vec3::new(radius, radius, radius), width_segments, height_segments, material)
}

/// Flat rectangle in the XZ plane facing +Y
pub fn plane(width: f32, depth: f32, material: &Material) -> Mesh {
    let (hw, hd) = (width / 2.0, depth / 2.0);
    let mut mesh = Mesh::new();
    let start = mesh.add_vertices(
        [
            Vec3::new(-hw, 0.0, -hd),
            Vec3::new(hw, 0.0, -hd),
            Vec3::new(hw, 0.0, hd),
            Vec3::new(-hw, 0.0, hd),
        ]
        .into_iter()
        .map(|p| Vertex::new(p, Vec3::UP, material)),
    );
    mesh.add_quad(start, start + 3, start + 2, start + 1);
    mesh
}
