//! Process-wide framework lifecycle. Kept in its own test binary so the
//! global context starts out unbuilt.

use dna::logging::MemoryLoggerFactory;
use dna::{
    Configuration, Framework, FrameworkConstruction, FrameworkEnvironment, FrameworkError,
};
use std::sync::Arc;

#[test]
fn test_global_framework_lifecycle() {
    // 构建之前所有访问器都必须失败
    for _ in 0..3 {
        assert!(matches!(Framework::logger(), Err(FrameworkError::NotBuilt)));
        assert!(matches!(Framework::logger_factory(), Err(FrameworkError::NotBuilt)));
        assert!(matches!(Framework::configuration(), Err(FrameworkError::NotBuilt)));
        assert!(matches!(Framework::environment(), Err(FrameworkError::NotBuilt)));
        assert!(matches!(Framework::exception_handler(), Err(FrameworkError::NotBuilt)));
        assert!(matches!(Framework::service::<String>(), Err(FrameworkError::NotBuilt)));
    }
    assert!(!Framework::is_built());

    let factory = MemoryLoggerFactory::new();
    let configuration = Configuration::builder()
        .add_toml_str("[app]\nname = \"demo\"")
        .unwrap()
        .build();
    let mut construction =
        FrameworkConstruction::with_environment_value(FrameworkEnvironment::new("Staging"));
    construction
        .add_configuration(configuration)
        .add_logger_factory(Arc::new(factory.clone()))
        .add_default_exception_handler();

    let construction = Framework::build(construction, true).unwrap();

    assert!(Framework::is_built());
    assert_eq!(factory.messages(), vec!["Dna Framework started in Staging..."]);
    assert_eq!(Framework::environment().unwrap().name(), "Staging");
    assert_eq!(
        Framework::configuration().unwrap().get_str("app:name"),
        Some("demo")
    );
    assert!(Arc::ptr_eq(
        &Framework::logger().unwrap(),
        &Framework::logger().unwrap()
    ));
    assert!(Framework::logger_factory().is_ok());

    Framework::exception_handler()
        .unwrap()
        .handle_error(&FrameworkError::NotBuilt);
    assert_eq!(factory.messages().len(), 2);

    // 第二次构建被拒绝，已捕获的容器保持不变
    let result = Framework::build(construction, false);
    assert!(matches!(result, Err(FrameworkError::AlreadyBuilt)));
    assert_eq!(Framework::environment().unwrap().name(), "Staging");
    assert!(Framework::context().provider().is_ok());
}
