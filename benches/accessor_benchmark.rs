use core::sync::atomic::AtomicI64;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rawmem::{get_and_add_long, get_and_set_long, Accessor, MemoryAccessor, ObjectRef};
use std::thread;

const ELEMENTS: usize = 4096;

fn bench_typed_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed_access");
    group.throughput(Throughput::Elements(ELEMENTS as u64));
    let memory = Accessor::get();
    let mut data = vec![0i64; ELEMENTS];
    let o = ObjectRef::from_slice(&mut data);
    let scale = i64::from(memory.array_index_scale(rawmem::ElementType::Long));

    group.bench_function("put_get_long_plain", |b| {
        b.iter(|| unsafe {
            for i in 0..ELEMENTS as i64 {
                memory.put_long(o, i * scale, i);
            }
            let mut sum = 0i64;
            for i in 0..ELEMENTS as i64 {
                sum = sum.wrapping_add(memory.get_long(o, i * scale));
            }
            black_box(sum)
        })
    });

    group.bench_function("put_get_long_volatile", |b| {
        b.iter(|| unsafe {
            for i in 0..ELEMENTS as i64 {
                memory.put_long_volatile(o, i * scale, i);
            }
            let mut sum = 0i64;
            for i in 0..ELEMENTS as i64 {
                sum = sum.wrapping_add(memory.get_long_volatile(o, i * scale));
            }
            black_box(sum)
        })
    });

    group.bench_function("put_ordered_long", |b| {
        b.iter(|| unsafe {
            for i in 0..ELEMENTS as i64 {
                memory.put_ordered_long(o, i * scale, i);
            }
        })
    });

    // Raw slice access for comparison
    group.bench_function("slice_baseline", |b| {
        b.iter(|| {
            let slice = unsafe { core::slice::from_raw_parts_mut(o.as_ptr().cast::<i64>(), ELEMENTS) };
            for (i, slot) in slice.iter_mut().enumerate() {
                *slot = i as i64;
            }
            black_box(slice.iter().fold(0i64, |acc, &v| acc.wrapping_add(v)))
        })
    });

    group.finish();
    drop(data);
}

fn bench_atomics(c: &mut Criterion) {
    let mut group = c.benchmark_group("atomics");
    let memory = Accessor::get();
    let slot = AtomicI64::new(0);
    let o = ObjectRef::from_ref(&slot);

    group.bench_function("cas_long_uncontended", |b| {
        b.iter(|| unsafe {
            let current = memory.get_long_volatile(o, 0);
            black_box(memory.compare_and_swap_long(o, 0, current, current + 1))
        })
    });

    group.bench_function("get_and_add_long_uncontended", |b| {
        b.iter(|| unsafe { black_box(get_and_add_long(&*memory, o, 0, 1)) })
    });

    group.bench_function("get_and_set_long_uncontended", |b| {
        b.iter(|| unsafe { black_box(get_and_set_long(&*memory, o, 0, 7)) })
    });

    for threads in [2, 4, 8] {
        const ADDS: usize = 10_000;
        group.throughput(Throughput::Elements((ADDS * threads) as u64));
        group.bench_function(format!("get_and_add_long_{}_threads", threads), |b| {
            b.iter(|| {
                thread::scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            for _ in 0..ADDS {
                                unsafe { get_and_add_long(&*memory, o, 0, 1) };
                            }
                        });
                    }
                });
            })
        });
    }

    group.finish();
}

fn bench_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk");
    let memory = Accessor::get();

    for bytes in [64i64, 4096, 1 << 20] {
        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_function(format!("copy_memory_{}b", bytes), |b| {
            b.iter_batched(
                || {
                    let src = memory.allocate_memory(bytes).unwrap();
                    let dst = memory.allocate_memory(bytes).unwrap();
                    unsafe { memory.set_memory_at(src, bytes, 0x5A) };
                    (src, dst)
                },
                |(src, dst)| unsafe {
                    memory.copy_memory_at(src, dst, bytes);
                    memory.free_memory(src);
                    memory.free_memory(dst);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_typed_access, bench_atomics, bench_bulk);
criterion_main!(benches);
