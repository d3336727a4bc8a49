//! End-to-end pipeline tests: routing, error mapping, distribution, and
//! teardown composed from cooperating modules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use strand::prelude::*;

metadata_key!(METHOD: String);
metadata_key!(PATH: String);
metadata_key!(RESPONSE: String);
metadata_key!(STATUS: u16);
metadata_key!(FINAL: String);

const INIT: ChainName = ChainName::new("INIT");
const PROCESS: ChainName = ChainName::new("PROCESS");
const RESPOND: ChainName = ChainName::new("RESPOND");
const ERRORS: ChainName = ChainName::new("ERRORS");

type RouteHandler = Arc<dyn Fn(&mut MetaData) -> Result<(), BoxError> + Send + Sync>;

/// The fully normalized route shape the router consumes.
struct Route {
    condition: ContextCondition,
    handler: RouteHandler,
}

/// Sugar shape applications hand to `distribute`; a distributor rewrites it
/// into a [`Route`].
struct Get {
    path: &'static str,
    handler: RouteHandler,
}

/// Owns the request skeleton (INIT -> PROCESS -> RESPOND) and the route
/// table, filled through handler distribution.
struct RouterModule {
    routes: Arc<Mutex<Generators<RouteHandler>>>,
    closed: Arc<AtomicUsize>,
}

impl RouterModule {
    fn new(closed: Arc<AtomicUsize>) -> Self {
        Self {
            routes: Arc::new(Mutex::new(Generators::new())),
            closed,
        }
    }
}

impl Module for RouterModule {
    fn name(&self) -> &'static str {
        "router"
    }

    fn init(&mut self, context: &mut InitContext<'_>) -> Result<(), BuildError> {
        let routes = Arc::clone(&self.routes);
        context.distributors().register_for::<Route>(move |envelope, _metadata| {
            let route = envelope.downcast::<Route>().map_err(|_| "not a Route")?;
            routes.lock().unwrap().register(route.condition, route.handler)?;
            Ok(Vec::new())
        });
        context.distributors().register_for::<Get>(|envelope, _metadata| {
            let get = envelope.downcast::<Get>().map_err(|_| "not a Get")?;
            Ok(vec![HandlerEnvelope::new(Route {
                condition: ContextCondition::new()
                    .require(METHOD, "GET")
                    .with_template(PATH, PathTemplate::parse(get.path)),
                handler: get.handler,
            })])
        });
        Ok(())
    }

    fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
        extender.create_chain(INIT, Action::Jump(PROCESS), Action::Jump(ERRORS))?;
        extender.create_chain(PROCESS, Action::Jump(RESPOND), Action::Jump(ERRORS))?;
        extender.create_chain(RESPOND, Action::Consume, Action::Consume)?;

        let routes = Arc::clone(&self.routes);
        extender.append_processor(PROCESS, move |metadata: &mut MetaData| -> Result<(), BoxError> {
            let handler = routes.lock().unwrap().generate(metadata).cloned();
            match handler {
                Some(handler) => (*handler)(metadata),
                None => Err("no route matches the request".into()),
            }
        })?;

        extender.append_processor(RESPOND, |metadata: &mut MetaData| -> Result<(), BoxError> {
            let status = metadata.get_optional(STATUS).copied().unwrap_or(200);
            let body = metadata.get_optional(RESPONSE).cloned().unwrap_or_default();
            metadata.set(FINAL, format!("{status} {body}"));
            Ok(())
        })?;

        let closed = Arc::clone(&self.closed);
        extender.on_close(move || {
            closed.fetch_add(1, Ordering::SeqCst);
        });
        Ok(())
    }
}

/// Owns ERRORS and maps the recorded failure to a status and body before
/// rejoining the response path.
struct ExceptionModule;

impl Module for ExceptionModule {
    fn name(&self) -> &'static str {
        "exceptions"
    }

    fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
        extender.create_chain(ERRORS, Action::Jump(RESPOND), Action::Consume)?;

        let mut map: FilterMap<PipelineError, (u16, &'static str)> = FilterMap::new();
        map.put(
            |error| error.to_string().contains("no route matches"),
            (404, "not found"),
        );
        map.set_default_value((500, "internal error"));

        extender.append_processor(ERRORS, move |metadata: &mut MetaData| -> Result<(), BoxError> {
            let (status, body) = {
                let error = metadata.get(EXCEPTION)?;
                *map.get(error)?
            };
            metadata.set(STATUS, status);
            metadata.set(RESPONSE, body.to_string());
            Ok(())
        })
    }
}

/// An application module contributing routes through distribution.
struct ItemsModule;

impl Module for ItemsModule {
    fn name(&self) -> &'static str {
        "items"
    }

    fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
        let show_item: RouteHandler =
            Arc::new(|metadata: &mut MetaData| -> Result<(), BoxError> {
                let id = metadata
                    .get(CAPTURED_PARAMETERS)?
                    .get("id")
                    .cloned()
                    .unwrap_or_default();
                metadata.set(RESPONSE, format!("item {id}"));
                Ok(())
            });
        extender.distribute(HandlerEnvelope::new(Get {
            path: "/items/<id>",
            handler: show_item,
        }))?;

        let broken: RouteHandler =
            Arc::new(|_: &mut MetaData| -> Result<(), BoxError> { Err("database gone".into()) });
        extender.distribute(HandlerEnvelope::new(Get {
            path: "/broken",
            handler: broken,
        }))
    }
}

fn request(method: &str, path: &str) -> MetaData {
    let mut metadata = MetaData::new();
    metadata.set(METHOD, method.to_string());
    metadata.set(PATH, path.to_string());
    metadata
}

fn build() -> (ChainRegistry, Arc<AtomicUsize>) {
    let closed = Arc::new(AtomicUsize::new(0));
    let registry = ChainRegistryBuilder::new()
        .with_module(ItemsModule)
        .with_module(RouterModule::new(Arc::clone(&closed)))
        .with_module(ExceptionModule)
        .build()
        .unwrap();
    (registry, closed)
}

#[test]
fn test_routed_request_reaches_its_handler() {
    let (registry, _closed) = build();

    let successes = Arc::new(AtomicUsize::new(0));
    let successes_clone = Arc::clone(&successes);
    registry
        .put_into_chain(
            INIT,
            request("GET", "/items/42"),
            SplitConsumer::new(
                move |metadata: MetaData| {
                    assert_eq!(metadata.get(FINAL).unwrap(), "200 item 42");
                    successes_clone.fetch_add(1, Ordering::SeqCst);
                },
                |_| panic!("must not reach the failure path"),
            ),
        )
        .unwrap();
    assert_eq!(successes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unmatched_request_becomes_a_not_found_response() {
    let (registry, _closed) = build();

    let failures = Arc::new(AtomicUsize::new(0));
    let failures_clone = Arc::clone(&failures);
    registry
        .put_into_chain(
            INIT,
            request("GET", "/missing"),
            SplitConsumer::new(
                |_| panic!("must not reach the success path"),
                move |metadata: MetaData| {
                    assert_eq!(metadata.get(FINAL).unwrap(), "404 not found");
                    assert!(metadata.contains(EXCEPTION));
                    failures_clone.fetch_add(1, Ordering::SeqCst);
                },
            ),
        )
        .unwrap();
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handler_failure_becomes_an_internal_error_response() {
    let (registry, _closed) = build();

    registry
        .put_into_chain(
            INIT,
            request("GET", "/broken"),
            SplitConsumer::new(
                |_| panic!("must not reach the success path"),
                |metadata: MetaData| {
                    assert_eq!(metadata.get(FINAL).unwrap(), "500 internal error");
                },
            ),
        )
        .unwrap();
}

#[test]
fn test_closing_actions_run_once_on_shutdown() {
    let (registry, closed) = build();
    registry.close();
    registry.close();
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    drop(registry);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_overlapping_routes_fail_the_build() {
    struct DuplicateRoutes;
    impl Module for DuplicateRoutes {
        fn name(&self) -> &'static str {
            "duplicates"
        }
        fn register(&mut self, extender: &mut ChainExtender<'_>) -> Result<(), BuildError> {
            let noop: RouteHandler = Arc::new(|_: &mut MetaData| -> Result<(), BoxError> { Ok(()) });
            extender.distribute(HandlerEnvelope::new(Get {
                path: "/items/<id>",
                handler: Arc::clone(&noop),
            }))?;
            extender.distribute(HandlerEnvelope::new(Get {
                path: "/items/<name>",
                handler: noop,
            }))
        }
    }

    let error = ChainRegistryBuilder::new()
        .with_module(RouterModule::new(Arc::new(AtomicUsize::new(0))))
        .with_module(ExceptionModule)
        .with_module(DuplicateRoutes)
        .build()
        .unwrap_err();
    assert!(error.to_string().contains("would therefore never trigger"));
}
