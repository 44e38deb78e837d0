use criterion::{black_box, Criterion};
use rawmem::{Accessor, MemoryAccessor};

struct XorShift64 {
    a: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { a: if seed == 0 { 1 } else { seed } }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.a;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.a = x;
        x
    }

    fn gen_range(&mut self, min: usize, max: usize) -> usize {
        (self.next() as usize % (max - min)) + min
    }
}

const LIVE_BYTES: usize = 1024 * 1024 * 4; // 4MB live set
const OPS: usize = 10_000;

pub fn run(c: &mut Criterion) {
    let mut group = c.benchmark_group("shbench");
    let memory = Accessor::get();

    group.bench_function("fragmentation_churn", |b| {
        b.iter(|| {
            let mut rng = XorShift64::new(0x1234_5678);
            let mut live: Vec<(i64, usize)> = Vec::new();
            let mut current_bytes = 0;

            // Phase 1: Build Live Set
            while current_bytes < LIVE_BYTES {
                let size = rng.gen_range(16, 8192);
                let address = memory.allocate_memory(size as i64).unwrap();
                unsafe { memory.set_memory_at(address, size as i64, 0) };
                current_bytes += size;
                live.push((address, size));
            }

            // Phase 2: Random Churn, resizing in place where the allocator can
            for _ in 0..OPS {
                let idx = rng.gen_range(0, live.len());
                let (address, old_size) = live[idx];

                let new_size = rng.gen_range(16, 8192);
                let moved = unsafe { memory.reallocate_memory(address, new_size as i64).unwrap() };
                live[idx] = (moved, new_size);

                current_bytes = current_bytes + new_size - old_size;
                black_box(moved);
            }

            for (address, _) in live {
                unsafe { memory.free_memory(address) };
            }
            black_box(current_bytes);
        })
    });

    group.finish();
}
