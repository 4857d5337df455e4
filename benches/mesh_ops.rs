//! Benchmarks for mesh construction, traversal and local edits.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use nalgebra::Point3;
use whittle::prelude::*;

fn grid_data(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    (vertices, faces)
}

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let (vertices, faces) = grid_data(n);
    build_from_triangles(&vertices, &faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let (vertices, faces) = grid_data(10);
    c.bench_function("build_grid_10x10", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
            mesh
        });
    });
}

fn bench_mesh_traversal(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("vertex_neighbors_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in mesh.vertex_ids() {
                count += mesh.vertex_neighbors(v).count();
            }
            count
        });
    });

    c.bench_function("face_normals_all", |b| {
        b.iter(|| {
            let mut sum = nalgebra::Vector3::zeros();
            for f in mesh.interior_face_ids() {
                sum += mesh.face_normal(f);
            }
            sum
        });
    });

    c.bench_function("validate_grid_50x50", |b| b.iter(|| mesh.is_valid()));
}

fn bench_local_edits(c: &mut Criterion) {
    let mesh = create_grid_mesh(20);
    let edges: Vec<EdgeId> = mesh
        .edge_ids()
        .filter(|&e| !mesh.is_boundary_edge(e))
        .collect();

    c.bench_function("split_all_interior_edges", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                for &e in &edges {
                    m.split_edge(e);
                }
                m
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("flip_all_interior_edges", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                for &e in &edges {
                    m.flip_edge(e);
                }
                m
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("collapse_sweep", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut m| {
                for &e in &edges {
                    if m.contains_edge(e) {
                        m.collapse_edge(e);
                    }
                }
                m
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_mesh_construction, bench_mesh_traversal, bench_local_edits);
criterion_main!(benches);
