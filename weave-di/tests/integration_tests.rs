//! Integration tests for the DI container

mod common;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use weave_di::prelude::*;
use weave_di::{AtomicParamContainer, LocalComposite};

// Test services
struct Transaction {
    id: usize,
}

struct UserRepo {
    transaction: Arc<Transaction>,
}

struct ItemRepo {
    transaction: Arc<Transaction>,
}

struct PurchaseService {
    user_repo: Arc<UserRepo>,
    item_repo: Arc<ItemRepo>,
}

impl PurchaseService {
    fn transaction_ids(&self) -> [usize; 2] {
        [self.user_repo.transaction.id, self.item_repo.transaction.id]
    }
}

fn purchase_container(scope: Scope) -> Container {
    let next = Arc::new(AtomicUsize::new(0));
    Container::from_definitions([
        (
            "transaction",
            ServiceDefinition::new(scope, move |_| {
                Ok(instance(Transaction {
                    id: next.fetch_add(1, Ordering::SeqCst) + 1,
                }))
            }),
        ),
        (
            "userRepo",
            ServiceDefinition::new(scope, |c| {
                Ok(instance(UserRepo {
                    transaction: c.get_as("transaction")?,
                }))
            }),
        ),
        (
            "itemRepo",
            ServiceDefinition::new(scope, |c| {
                Ok(instance(ItemRepo {
                    transaction: c.get_as("transaction")?,
                }))
            }),
        ),
        (
            "purchaseService",
            ServiceDefinition::new(scope, |c| {
                Ok(instance(PurchaseService {
                    user_repo: c.get_as("userRepo")?,
                    item_repo: c.get_as("itemRepo")?,
                }))
            }),
        ),
    ])
}

fn purchase(container: &Container) -> Arc<PurchaseService> {
    container.get_as("purchaseService").unwrap()
}

fn wrap(dependency: &'static str) -> ServiceDefinition {
    ServiceDefinition::shared(move |c| Ok(instance(vec![c.get(dependency)?])))
}

fn text(value: Instance) -> String {
    value.downcast_arc::<String>().ok().unwrap().to_string()
}

#[test]
fn test_shared_scope() {
    common::init_tracing();
    let container = purchase_container(Scope::Shared);

    let first = purchase(&container);
    let second = purchase(&container);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.transaction_ids(), [1, 1]);
    assert_eq!(second.transaction_ids(), [1, 1]);
}

#[test]
fn test_nested_shared_scope() {
    common::init_tracing();
    let container = purchase_container(Scope::NestedShared);

    for i in 1..=3 {
        assert_eq!(purchase(&container).transaction_ids(), [i, i]);
    }
}

#[test]
fn test_non_shared_scope() {
    common::init_tracing();
    let container = purchase_container(Scope::NonShared);

    for i in 0..3 {
        let first = i * 2 + 1;
        assert_eq!(purchase(&container).transaction_ids(), [first, first + 1]);
    }
}

#[test]
fn test_circular_dependencies() {
    common::init_tracing();
    let container = Container::new();
    container.override_service("company", wrap("employer"));
    container.override_service("employer", wrap("company"));
    container.override_service("management", wrap("company"));
    container.override_service("db", ServiceDefinition::shared(|_| Ok(instance(()))));
    container.override_service("holding", ServiceDefinition::shared(|_| Ok(instance(()))));
    container.register_decorator(|c, id, service| {
        if id == "holding" {
            c.get("company")?;
        }
        Ok(service)
    });

    let err = container.get("management").err().unwrap();
    assert_eq!(
        err.to_string(),
        "cannot create service `management`: circular dependency: management -> company -> employer -> company"
    );

    let err = container.get("holding").err().unwrap();
    assert_eq!(
        err.to_string(),
        "cannot decorate service `holding`: circular dependency: holding -> company -> employer -> company"
    );

    // The chain is cleared after each failure.
    assert!(container.get("db").is_ok());
    assert!(container.get("holding").is_err());
}

#[test]
fn test_direct_cycle_is_reported_once() {
    let container = Container::new();
    container.override_service("a", wrap("b"));
    container.override_service("b", wrap("a"));
    container.override_service("c", ServiceDefinition::shared(|_| Ok(instance(()))));

    let err = container.get("a").err().unwrap();
    assert_eq!(
        err.to_string(),
        "cannot create service `a`: circular dependency: a -> b -> a"
    );
    assert!(container.get("c").is_ok());
}

#[test]
fn test_decorators_run_in_order() {
    common::init_tracing();
    let container = Container::new();
    container.override_service(
        "config",
        ServiceDefinition::shared(|_| Ok(instance(String::from("cfg")))),
    );
    container.override_service(
        "report",
        ServiceDefinition::non_shared(|_| Ok(instance(String::from("report")))),
    );
    container.register_decorator(|c, id, service| {
        if id != "report" {
            return Ok(service);
        }
        // Reading an unrelated key does not trip the guard of `report`.
        let config = c.get_as::<String>("config")?;
        Ok(instance(format!("{}+d1({})", text(service), config)))
    });
    container.register_decorator(|_, id, service| {
        if id != "report" {
            return Ok(service);
        }
        Ok(instance(format!("{}+d2", text(service))))
    });

    assert_eq!(text(container.get("report").unwrap()), "report+d1(cfg)+d2");
    assert_eq!(text(container.get("config").unwrap()), "cfg");
}

#[test]
fn test_revoke_and_remove() {
    let next = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container
        .register(
            "counter",
            ServiceDefinition::shared(move |_| Ok(instance(next.fetch_add(1, Ordering::SeqCst)))),
        )
        .unwrap();

    assert_eq!(*container.get_as::<usize>("counter").unwrap(), 0);
    assert_eq!(*container.get_as::<usize>("counter").unwrap(), 0);

    container.must_revoke("counter");
    assert!(container.has("counter"));
    assert_eq!(*container.get_as::<usize>("counter").unwrap(), 1);

    container.must_remove("counter");
    assert!(!container.has("counter"));
    let err = container.get("counter").err().unwrap();
    assert!(matches!(err, DiError::NotFound { .. }));

    let err = container.revoke("counter").unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot revoke service `counter`, because it does not exist"
    );
    let err = container.remove("counter").unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot remove service `counter`, because it does not exist"
    );
}

/// The error a `must_*` call panicked with
fn panic_payload(f: impl FnOnce()) -> DiError {
    let payload = panic::catch_unwind(AssertUnwindSafe(f)).unwrap_err();
    *payload.downcast::<DiError>().ok().unwrap()
}

#[test]
fn test_must_revoke_panics() {
    let err = panic_payload(|| Container::new().must_revoke("ghost"));
    assert_eq!(
        err.to_string(),
        "cannot revoke service `ghost`, because it does not exist"
    );
}

#[test]
fn test_must_get_panics() {
    let err = panic_payload(|| {
        Container::new().must_get("ghost");
    });
    assert!(matches!(err, DiError::NotFound { .. }));
    assert_eq!(err.to_string(), "service `ghost` does not exist");
}

#[test]
fn test_queries_do_not_mutate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let container = Container::new();
    for id in ["b", "c", "a"] {
        let counter = counter.clone();
        container.override_service(
            id,
            ServiceDefinition::shared(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(instance(()))
            }),
        );
    }

    let ids = container.service_ids();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(container.has("a"));
    assert!(!container.has("d"));
    assert_eq!(container.service_ids(), ids);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_tags_through_composite() {
    common::init_tracing();
    let app = LocalComposite::local();
    for (id, priority) in [("foo", 30), ("bar", 500), ("baz", 300)] {
        app.register(
            id,
            ServiceDefinition::shared(move |_| Ok(instance(id.to_string()))),
        )
        .unwrap();
        app.tag_service(id, "T", priority).unwrap();
    }

    let members: Vec<String> = app.get_by_tag("T").unwrap().into_iter().map(text).collect();
    assert_eq!(members, vec!["bar", "baz", "foo"]);
    assert!(app.get_by_tag("unknown").unwrap().is_empty());
}

#[test]
fn test_services_read_parameters() {
    let params = Arc::new(AtomicParamContainer::default());
    params
        .register_param("dsn", ParamDefinition::value(instance(String::from("postgres://db"))))
        .unwrap();

    let container = Container::new();
    let source = params.clone();
    container.override_service(
        "db",
        ServiceDefinition::shared(move |_| {
            let dsn = source.get_param_as::<String>("dsn")?;
            Ok(instance(format!("connected to {}", dsn)))
        }),
    );

    assert_eq!(
        container.get_as::<String>("db").unwrap().as_str(),
        "connected to postgres://db"
    );
    assert_eq!(
        params.get_param("missing").err().unwrap().to_string(),
        "parameter `missing` does not exist"
    );
}

#[test]
fn test_parameter_cycles_are_wrapped_once() {
    let params = ParamContainer::from_definitions([
        ("a", ParamDefinition::new(|p| Ok(p.get_param("b")?))),
        ("b", ParamDefinition::new(|p| Ok(p.get_param("a")?))),
    ]);

    let err = params.get_param("b").err().unwrap();
    assert_eq!(
        err.to_string(),
        "cannot get parameter `b`: circular dependency: b -> a -> b"
    );
}
