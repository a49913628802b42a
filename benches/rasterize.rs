use criterion::{criterion_group, criterion_main, Criterion, black_box};

use infobjects::core::types::IVec3;
use infobjects::iwgo::{Iwgo, LoadPolicy, Placement, Registries};
use infobjects::shape::{Cuboid, Shape, SizeMap, Sphere};
use infobjects::value::Value;
use infobjects::voxel::VoxelBuffer;

fn sizes(pairs: &[(&str, f64)]) -> SizeMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::constant(*v)))
        .collect()
}

fn count_voxels(shape: &dyn Shape) -> usize {
    let mut count = 0usize;
    let _ = shape.rasterize(IVec3::ZERO, &mut |_, shell| {
        count += 1 + shell as usize;
        Ok(())
    });
    count
}

fn bench_cuboid_32(c: &mut Criterion) {
    let mut cuboid = Cuboid::new();
    let _ = cuboid.set_size(sizes(&[("x", 32.0), ("y", 32.0), ("z", 32.0)]));

    c.bench_function("cuboid_32", |b| {
        b.iter(|| black_box(count_voxels(black_box(&cuboid))));
    });
}

fn bench_sphere_16(c: &mut Criterion) {
    let mut sphere = Sphere::new();
    let _ = sphere.set_size(sizes(&[("radiusX", 16.0), ("radiusY", 16.0), ("radiusZ", 16.0)]));

    c.bench_function("sphere_r16", |b| {
        b.iter(|| black_box(count_voxels(black_box(&sphere))));
    });
}

fn bench_ellipsoid_32x8x24(c: &mut Criterion) {
    let mut sphere = Sphere::new();
    let _ = sphere.set_size(sizes(&[("radiusX", 32.0), ("radiusY", 8.0), ("radiusZ", 24.0)]));

    c.bench_function("ellipsoid_32x8x24", |b| {
        b.iter(|| black_box(count_voxels(black_box(&sphere))));
    });
}

const TOWER: &str = r#"{
    "variables": { "h": "randi(12, 20)" },
    "materials": {
        "walls": { "type": "random-inner-outer",
                   "properties": { "inner.material": "air", "inner.odd": 100,
                                   "outer.material": "cobblestone", "outer.odd": 85 } }
    },
    "instructions": {
        "body": { "shape": "cuboid", "size": { "x": 9, "y": "h", "z": 9 }, "material": "walls" },
        "dome": { "shape": "sphere", "position": { "x": 4, "y": "h", "z": 4 },
                  "size": { "radiusX": 4, "radiusY": 3, "radiusZ": 4 }, "material": "walls" }
    }
}"#;

fn bench_place_tower(c: &mut Criterion) {
    let registries = Registries::default();
    let Ok(mut tower) = Iwgo::from_json("tower", TOWER, &registries, LoadPolicy::STRICT) else {
        return;
    };

    c.bench_function("place_tower", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            tower.reseed(seed);
            let mut buffer = VoxelBuffer::new();
            let _ = tower.place(&Placement::at(IVec3::new(0, 64, 0)), &mut buffer);
            black_box(buffer.len())
        });
    });
}

criterion_group!(
    benches,
    bench_cuboid_32,
    bench_sphere_16,
    bench_ellipsoid_32x8x24,
    bench_place_tower,
);
criterion_main!(benches);
