use rawmem::{Accessor, BackendKind, MemoryAccessor, MemoryError, ObjectRef};

fn backends() -> [Accessor; 2] {
    [
        Accessor::with_backend(BackendKind::System),
        Accessor::with_backend(BackendKind::Global),
    ]
}

#[test]
fn zero_sized_requests_return_null() {
    for memory in backends() {
        assert_eq!(memory.allocate_memory(0), Ok(0), "{}", memory.name());
        unsafe {
            memory.free_memory(0);
            assert_eq!(memory.reallocate_memory(0, 0), Ok(0));
        }
    }
}

#[test]
fn negative_sizes_are_rejected() {
    for memory in backends() {
        assert_eq!(
            memory.allocate_memory(-1),
            Err(MemoryError::InvalidArgument { bytes: -1 })
        );
        let address = memory.allocate_memory(8).unwrap();
        unsafe {
            assert_eq!(
                memory.reallocate_memory(address, -8),
                Err(MemoryError::InvalidArgument { bytes: -8 })
            );
            // The block is still ours after a failed resize.
            memory.put_long(ObjectRef::NULL, address, 1);
            memory.free_memory(address);
        }
    }
}

#[test]
fn backends_agree_on_unservable_sizes() {
    let bytes = isize::MAX as i64 - 4;
    for memory in backends() {
        assert_eq!(
            memory.allocate_memory(bytes),
            Err(MemoryError::OutOfMemory { bytes: bytes as usize }),
            "{}",
            memory.name()
        );
    }
}

#[test]
fn blocks_are_aligned_for_every_value_type() {
    for memory in backends() {
        let addresses: Vec<i64> = [1, 3, 8, 24, 4096]
            .iter()
            .map(|&n| memory.allocate_memory(n).unwrap())
            .collect();
        for &address in &addresses {
            assert_ne!(address, 0);
            assert_eq!(address % 8, 0, "{} returned {address:#x}", memory.name());
        }
        for address in addresses {
            unsafe { memory.free_memory(address) };
        }
    }
}

#[test]
fn reallocate_keeps_the_prefix() {
    for memory in backends() {
        unsafe {
            let address = memory.reallocate_memory(0, 16).unwrap();
            memory.put_long(ObjectRef::NULL, address, 0x1122_3344_5566_7788);
            memory.put_long(ObjectRef::NULL, address + 8, -2);

            let grown = memory.reallocate_memory(address, 1 << 20).unwrap();
            assert_eq!(memory.get_long(ObjectRef::NULL, grown), 0x1122_3344_5566_7788);
            assert_eq!(memory.get_long(ObjectRef::NULL, grown + 8), -2);

            let shrunk = memory.reallocate_memory(grown, 8).unwrap();
            assert_eq!(memory.get_long(ObjectRef::NULL, shrunk), 0x1122_3344_5566_7788);

            assert_eq!(memory.reallocate_memory(shrunk, 0), Ok(0));
        }
    }
}

#[test]
fn set_and_copy_native_memory() {
    for memory in backends() {
        let src = memory.allocate_memory(64).unwrap();
        let dst = memory.allocate_memory(64).unwrap();
        unsafe {
            memory.set_memory_at(src, 64, 0xA5);
            memory.set_memory(ObjectRef::NULL, src + 3, 5, 0x11);
            memory.set_memory_at(dst, 64, 0);
            memory.copy_memory_at(src, dst, 64);
            for i in 0..64 {
                let expected = if (3..8).contains(&i) { 0x11 } else { 0xA5 };
                assert_eq!(memory.get_byte(ObjectRef::NULL, dst + i) as u8, expected);
            }
            memory.free_memory(src);
            memory.free_memory(dst);
        }
    }
}

#[test]
fn copy_between_heap_object_and_native_memory() {
    let memory = Accessor::get();
    let mut source = [1i32, 2, 3, 4, 5, 6];
    let mut target = [0i32; 6];
    let address = memory.allocate_memory(24).unwrap();
    unsafe {
        memory.copy_memory(ObjectRef::from_slice(&mut source), 0, ObjectRef::NULL, address, 24);
        memory.copy_memory(ObjectRef::NULL, address + 4, ObjectRef::from_slice(&mut target), 0, 16);
        memory.free_memory(address);
    }
    assert_eq!(target, [2, 3, 4, 5, 0, 0]);
}

#[test]
fn zero_length_bulk_operations_touch_nothing() {
    let memory = Accessor::get();
    let mut data = [7u8; 4];
    let o = ObjectRef::from_slice(&mut data);
    unsafe {
        memory.set_memory(o, 0, 0, 0);
        memory.copy_memory(o, 0, o, 2, 0);
    }
    assert_eq!(data, [7; 4]);
}
