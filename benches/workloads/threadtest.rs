use criterion::{black_box, Criterion, Throughput};
use rawmem::{Accessor, MemoryAccessor, ObjectRef};
use std::sync::mpsc;
use std::thread;

const OPS: usize = 50_000;

pub fn run(c: &mut Criterion) {
    let mut group = c.benchmark_group("threadtest_prod_cons");
    let memory = Accessor::get();

    // Only even numbers of threads (pairs)
    for t in [2, 4, 8, 16] {
        // Total operations = OPS * number of pairs
        let pairs = t / 2;
        group.throughput(Throughput::Elements((OPS * pairs) as u64));

        group.bench_function(format!("threadtest_{}_threads", t), |b| {
            b.iter(|| {
                let mut handles = Vec::with_capacity(t);

                for _ in 0..pairs {
                    let (tx, rx) = mpsc::channel::<i64>();

                    // Producer
                    handles.push(thread::spawn(move || {
                        for i in 0..OPS {
                            let address = memory.allocate_memory(8).unwrap();
                            unsafe { memory.put_long_volatile(ObjectRef::NULL, address, i as i64) };
                            // The consumer owns the block from here on
                            if tx.send(address).is_err() {
                                unsafe { memory.free_memory(address) };
                                break;
                            }
                        }
                    }));

                    // Consumer: reading and releasing is a remote free
                    handles.push(thread::spawn(move || {
                        while let Ok(address) = rx.recv() {
                            unsafe {
                                black_box(memory.get_long_volatile(ObjectRef::NULL, address));
                                memory.free_memory(address);
                            }
                        }
                    }));
                }

                for h in handles {
                    h.join().unwrap();
                }
            })
        });
    }
    group.finish();
}
