use common::config::SliceConfig;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use layer_slicer::{
    builder::MeshBuilder,
    intersection::LayerIndex,
    mesh::Mesh,
    segments::{collect, collect_indexed},
    slicer::Slicer,
    Pos,
};

fn cube_with_hole(per_side: u32) -> Mesh {
    let mut builder = MeshBuilder::new();
    builder.add_box_with_hole(Pos::zeros(), 20.0, 20.0, 5.0, per_side);
    builder.build()
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mesh Intersections");

    for per_side in [8, 64, 512] {
        let mesh = cube_with_hole(per_side);
        let index = LayerIndex::from_mesh(&mesh, 100);
        let faces = mesh.triangle_count();

        group.bench_with_input(BenchmarkId::new("Linear", faces), &mesh, |b, i| {
            b.iter(|| collect(i, 10.0))
        });

        group.bench_with_input(
            BenchmarkId::new("Indexed", faces),
            &(index, mesh),
            |b, (index, mesh)| b.iter(|| collect_indexed(mesh, index, 10.0)),
        );
    }
    group.finish();

    let mut group = c.benchmark_group("Slice");
    for layer_size in [2.0, 0.2] {
        let config = SliceConfig {
            path_layer_size: layer_size,
            ..Default::default()
        };
        let slicer = Slicer::new(config, cube_with_hole(64)).unwrap();

        group.bench_with_input(
            BenchmarkId::new("Layers", slicer.layer_count()),
            &slicer,
            |b, slicer| b.iter(|| slicer.slice().layers.len()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
