use rawmem::{Accessor, AccessorConfig, BackendKind, Locator, MemoryAccessor};

fn data_ptr(accessor: &dyn MemoryAccessor) -> *const () {
    accessor as *const dyn MemoryAccessor as *const ()
}

#[test]
fn accessor_is_a_process_wide_singleton() {
    let first = Accessor::get();
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| data_ptr(Accessor::get().backend()) as usize))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), data_ptr(first.backend()) as usize);
    }
    assert_eq!(data_ptr(first.backend()), data_ptr(Accessor::get().backend()));
}

#[test]
fn accessor_comes_from_the_global_locator() {
    let located = Locator::global().load::<dyn MemoryAccessor>();
    assert_eq!(data_ptr(located), data_ptr(Accessor::get().backend()));
    assert_eq!(located.name(), Accessor::get().name());
}

#[test]
fn configured_backend_is_one_of_the_variants() {
    let name = Accessor::get().name();
    assert!(name == "system" || name == "global", "{name}");
    let expected = AccessorConfig::from_env().backend;
    assert_eq!(name, expected.as_str());
}

#[test]
fn explicit_backends_bypass_the_locator() {
    assert_eq!(Accessor::with_backend(BackendKind::System).name(), "system");
    assert_eq!(Accessor::with_backend(BackendKind::Global).name(), "global");
    assert!(format!("{:?}", Accessor::with_backend(BackendKind::Global)).contains("global"));
}

#[test]
fn late_registration_does_not_replace_the_accessor() {
    fn replacement() -> Box<dyn MemoryAccessor> {
        Box::new(rawmem::backend::GlobalAllocBackend::new())
    }
    let before = data_ptr(Accessor::get().backend());
    assert!(!Locator::global().register::<dyn MemoryAccessor>(replacement));
    assert_eq!(data_ptr(Locator::global().load::<dyn MemoryAccessor>()), before);
}
