//! End-to-end startup scenarios against an owned framework context

use dna::logging::{LogLevel, MemoryLoggerFactory};
use dna::{
    ContainerError, FrameworkConstruction, FrameworkContext, FrameworkEnvironment,
    ServiceDescriptor, ServiceLifetime,
};
use std::sync::Arc;

#[test]
fn test_environment_factory_drives_startup_line() {
    let factory = MemoryLoggerFactory::new();
    let mut construction = FrameworkConstruction::new();
    construction
        .add_logger_factory(Arc::new(factory.clone()))
        .register(ServiceDescriptor::singleton(|_| {
            Ok(Arc::new(FrameworkEnvironment::new("production")))
        }));

    let context = FrameworkContext::with_product_name("App");
    context.build(construction, true).unwrap();

    assert_eq!(context.environment().unwrap().name(), "production");
    let records = factory.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "App started in production...");
    assert_eq!(records[0].level, LogLevel::Critical);
}

#[test]
fn test_missing_service_is_reported_not_fabricated() {
    struct Missing;

    let provider = FrameworkConstruction::new().build();

    let result = provider.resolve::<Missing>();
    assert!(matches!(result, Err(ContainerError::ServiceNotRegistered { .. })));
    assert!(provider.get::<Missing>().is_none());
}

#[test]
fn test_repeated_registration_resolves_last() {
    let mut construction = FrameworkConstruction::new();
    for n in 1..=4u32 {
        construction
            .services_mut()
            .add_singleton(move |_| Arc::new(n * 10));
    }
    construction
        .services_mut()
        .add(ServiceDescriptor::from_factory(ServiceLifetime::Transient, |_| {
            Ok(Arc::new(99u32))
        }));

    let provider = construction.build();
    assert_eq!(*provider.resolve::<u32>().unwrap(), 99);
    assert_eq!(
        construction.services().lifetime_of::<u32>(),
        Some(ServiceLifetime::Transient)
    );
}
