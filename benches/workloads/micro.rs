use criterion::{black_box, Criterion};
use rawmem::{Accessor, BackendKind, MemoryAccessor, ObjectRef};

pub fn run(c: &mut Criterion) {
    bench_alloc_small(c);
    bench_alloc_medium(c);
    bench_alloc_large(c);
    bench_realloc_growth(c);
}

fn backends() -> [Accessor; 2] {
    [
        Accessor::with_backend(BackendKind::System),
        Accessor::with_backend(BackendKind::Global),
    ]
}

fn bench_alloc_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_small");
    group.warm_up_time(std::time::Duration::from_millis(500));
    group.measurement_time(std::time::Duration::from_secs(1));
    group.sample_size(10);

    for memory in backends() {
        group.bench_function(format!("alloc_free_16b_{}", memory.name()), |b| {
            b.iter(|| {
                let address = memory.allocate_memory(black_box(16)).unwrap();
                unsafe { memory.free_memory(black_box(address)) };
            })
        });
    }

    group.finish();
}

fn bench_alloc_medium(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_medium");

    for memory in backends() {
        group.bench_function(format!("alloc_set_free_1kb_{}", memory.name()), |b| {
            b.iter(|| unsafe {
                let address = memory.allocate_memory(1024).unwrap();
                memory.set_memory_at(address, 1024, 0);
                memory.free_memory(black_box(address));
            })
        });
    }

    group.finish();
}

fn bench_alloc_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_large");

    for memory in backends() {
        group.bench_function(format!("alloc_free_1mb_{}", memory.name()), |b| {
            b.iter(|| {
                let address = memory.allocate_memory(1024 * 1024).unwrap();
                unsafe { memory.free_memory(black_box(address)) };
            })
        });
    }

    group.finish();
}

fn bench_realloc_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_realloc");

    for memory in backends() {
        group.bench_function(format!("realloc_double_to_64kb_{}", memory.name()), |b| {
            b.iter(|| unsafe {
                let mut size = 16i64;
                let mut address = memory.allocate_memory(size).unwrap();
                memory.put_long(ObjectRef::NULL, address, 1);
                while size < 64 * 1024 {
                    size *= 2;
                    address = memory.reallocate_memory(address, size).unwrap();
                }
                black_box(memory.get_long(ObjectRef::NULL, address));
                memory.free_memory(address);
            })
        });
    }

    group.finish();
}
