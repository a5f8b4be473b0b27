//! Integration tests for the reflector cache, property path navigation and settings
//! validation working together on a configuration-style type graph.

use beanscope::{prelude::*, Result};
use std::sync::{Arc, Barrier};

struct Model {
    registry: Arc<TypeRegistry>,
    factory: ReflectorFactoryRc,
    configuration: TypeId,
    environment: TypeId,
    mapper: TypeId,
}

/// Declares a small configuration graph:
///
/// ```text
/// Configuration
///   cacheEnabled: boolean
///   defaultFetchSize: Integer
///   environment: Environment { id: String, dataSource: DataSource { url: String } }
///   mappers: List<Mapper { namespace: String }>
///   databaseId: String (read-only)
/// ```
fn model() -> Result<Model> {
    let registry = Arc::new(TypeRegistry::new());
    let string = registry.string_type();
    let integer = registry.class("java.lang", "Integer").build()?;
    let list = registry
        .interface("java.util", "List")
        .type_param(TypeParam::new("E"))
        .build()?;

    let data_source = registry
        .class("config", "DataSource")
        .property("url", string)
        .build()?;
    let environment = registry
        .class("config", "Environment")
        .property("id", string)
        .property("dataSource", data_source)
        .default_constructor()
        .build()?;
    let mapper = registry
        .class("config", "Mapper")
        .property("namespace", string)
        .build()?;
    let configuration = registry
        .class("config", "Configuration")
        .property("cacheEnabled", registry.primitive(PrimitiveKind::Boolean))
        .property("defaultFetchSize", integer)
        .property("environment", environment)
        .property(
            "mappers",
            GenericType::parameterized(list, vec![mapper.into()]),
        )
        .getter("getDatabaseId", string)
        .default_constructor()
        .build()?;

    let factory: ReflectorFactoryRc = Arc::new(DefaultReflectorFactory::new(registry.clone()));
    Ok(Model {
        registry,
        factory,
        configuration,
        environment,
        mapper,
    })
}

#[test]
fn test_meta_class_paths() -> Result<()> {
    let model = model()?;
    let meta = MetaClass::for_class(model.configuration, &model.factory)?;
    let string = model.registry.string_type();

    assert!(meta.has_getter("environment.dataSource.url")?);
    assert!(meta.has_setter("environment.dataSource.url")?);
    assert_eq!(meta.getter_type("environment.dataSource.url")?, string);
    assert_eq!(meta.getter_type("mappers[0]")?, model.mapper);
    assert_eq!(meta.getter_type("mappers[0].namespace")?, string);
    assert!(!meta.has_getter("environment.dataSource.password")?);

    assert_eq!(
        meta.find_property("environment.data_source.URL", true)?
            .as_deref(),
        Some("environment.dataSource.url")
    );
    assert_eq!(
        meta.find_property("default_fetch_size", true)?.as_deref(),
        Some("defaultFetchSize")
    );
    assert_eq!(meta.find_property("default_fetch_size", false)?, None);

    Ok(())
}

#[test]
fn test_meta_class_reuses_cached_reflectors() -> Result<()> {
    let model = model()?;
    let meta = MetaClass::for_class(model.configuration, &model.factory)?;

    let environment = meta.meta_class_for_property("environment")?;
    let direct = model.factory.find_for_class(model.environment)?;
    assert!(Arc::ptr_eq(environment.reflector(), &direct));
    assert!(environment.has_default_constructor());

    Ok(())
}

#[test]
fn test_settings_validation() -> Result<()> {
    let model = model()?;
    let meta = MetaClass::for_class(model.configuration, &model.factory)?;

    let settings: Settings = [
        ("cacheEnabled", "false"),
        ("defaultFetchSize", "100"),
        ("environment.id", "production"),
    ]
    .into_iter()
    .collect();
    assert_eq!(settings.validate(&meta)?.len(), 3);

    let mut misspelled = settings.clone();
    misspelled.insert("cacheEnabeld", "true");
    match misspelled.validate(&meta) {
        Err(Error::UnknownSetting { key }) => assert_eq!(key, "cacheEnabeld"),
        other => panic!("unexpected {:?}", other.map(Settings::len)),
    }

    let read_only: Settings = [("databaseId", "mysql")].into_iter().collect();
    let message = read_only
        .validate(&meta)
        .err()
        .map(|e| e.to_string())
        .unwrap_or_default();
    assert!(message.contains("The setting databaseId is not known"));

    Ok(())
}

#[test]
fn test_concurrent_first_access_builds_once() -> Result<()> {
    let model = model()?;
    let factory = Arc::new(DefaultReflectorFactory::new(model.registry.clone()));
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|index| {
            let factory = factory.clone();
            let barrier = barrier.clone();
            let ty = if index % 2 == 0 {
                model.configuration
            } else {
                model.environment
            };
            std::thread::spawn(move || {
                barrier.wait();
                factory.find_for_class(ty)
            })
        })
        .collect();

    let mut configurations = Vec::new();
    let mut environments = Vec::new();
    for handle in handles {
        let reflector = handle.join().map_err(|_| Error::LockError)??;
        if reflector.type_id() == model.configuration {
            configurations.push(reflector);
        } else {
            environments.push(reflector);
        }
    }

    assert_eq!(configurations.len(), 8);
    assert_eq!(environments.len(), 8);
    assert!(configurations.iter().all(|r| Arc::ptr_eq(r, &configurations[0])));
    assert!(environments.iter().all(|r| Arc::ptr_eq(r, &environments[0])));
    assert_eq!(factory.cached_len(), 2);

    Ok(())
}

#[test]
fn test_preload_then_toggle_cache() -> Result<()> {
    let model = model()?;
    let factory = DefaultReflectorFactory::new(model.registry.clone());
    factory.preload(&[model.configuration, model.environment, model.mapper])?;
    assert_eq!(factory.cached_len(), 3);

    let cached = factory.find_for_class(model.mapper)?;
    factory.set_class_cache_enabled(false);
    let fresh = factory.find_for_class(model.mapper)?;
    assert!(!Arc::ptr_eq(&cached, &fresh));
    assert_eq!(
        cached.readable_property_names(),
        fresh.readable_property_names()
    );

    Ok(())
}

#[test]
fn test_preload_reports_failures() -> Result<()> {
    let model = model()?;
    let broken = model
        .registry
        .class("config", "Broken")
        .setter("setMode", model.registry.string_type())
        .setter("setMode", model.registry.primitive(PrimitiveKind::Int))
        .build()?;

    let factory = DefaultReflectorFactory::new(model.registry.clone());
    let result = factory.preload(&[model.configuration, broken]);
    assert!(matches!(result, Err(Error::AmbiguousSetter { .. })));
    assert!(factory.find_for_class(model.configuration).is_ok());

    Ok(())
}
