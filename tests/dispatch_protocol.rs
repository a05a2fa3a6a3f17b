//! Integration tests for the call-site dispatch protocol

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dyncall::dispatch::{self, CallSite, DispatchCounts};
use dyncall::entry_point::{self, EntryPointKind};
use dyncall::intercept::{self, CallLog, Passthrough, Tracked};
use dyncall::{CallError, CallResult, CallScope, InterceptorResolver, Invocation, Value};

/// Minimal dynamic object standing in for a build script's project
struct Project {
    id: u64,
    properties: Mutex<BTreeMap<String, Value>>,
}

impl Project {
    fn new(id: u64) -> Self {
        Self {
            id,
            properties: Mutex::new(BTreeMap::new()),
        }
    }

    fn handle(&self) -> Value {
        Value::object("Project", self.id)
    }

    fn set(&self, name: &str, value: Value) -> CallResult {
        if name == "name" {
            return Err(CallError::ReadOnlyProperty {
                receiver: self.handle().to_string(),
                property: name.to_string(),
            });
        }
        self.properties.lock().unwrap().insert(name.to_string(), value);
        Ok(Value::Null)
    }

    fn get(&self, name: &str) -> CallResult {
        self.properties
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CallError::MissingProperty {
                receiver: self.handle().to_string(),
                property: name.to_string(),
            })
    }
}

fn counting_interceptor(scope: CallScope, hits: Arc<AtomicUsize>, seen: Arc<Mutex<Vec<Vec<Value>>>>) -> impl dyncall::CallInterceptor {
    intercept::from_fn("counting", [scope], move |mut invocation: Invocation<'_>, _consumer: &str| {
        hits.fetch_add(1, Ordering::SeqCst);
        seen.lock().unwrap().push(invocation.arguments().to_vec());
        invocation.call_original()
    })
}

#[test]
fn test_version_write_is_intercepted_and_build_dir_is_not() {
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let resolver = InterceptorResolver::builder()
        .register(counting_interceptor(
            CallScope::writes_of_properties_named("version"),
            Arc::clone(&hits),
            Arc::clone(&seen),
        ))
        .build()
        .expect("build resolver");
    let project = Project::new(1);

    dispatch::set_property(&resolver, project.handle(), "version", "1.2.3".into(), "build.gradle", || {
        project.set("version", "1.2.3".into())
    })
    .expect("write version");

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec![vec![Value::from("1.2.3")]]);
    assert_eq!(project.get("version"), Ok(Value::from("1.2.3")));

    dispatch::set_property(&resolver, project.handle(), "buildDir", "out".into(), "build.gradle", || {
        project.set("buildDir", "out".into())
    })
    .expect("write buildDir");

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(project.get("buildDir"), Ok(Value::from("out")));

    let counts = resolver.stats().snapshot();
    assert_eq!(counts.intercepted, 1);
    assert_eq!(counts.fallback, 0);
}

#[test]
fn test_unknown_names_behave_like_the_original_call() {
    let resolver = InterceptorResolver::builder()
        .register(Passthrough::new([CallScope::writes_of_properties_named("version")]))
        .build()
        .expect("build resolver");
    let project = Project::new(2);

    let direct = project.get("description");
    let dispatched = dispatch::get_property(&resolver, project.handle(), "description", "build.gradle", || {
        project.get("description")
    });
    assert_eq!(dispatched, direct);

    let direct = project.set("name", "renamed".into());
    let dispatched = dispatch::set_property(&resolver, project.handle(), "name", "renamed".into(), "build.gradle", || {
        project.set("name", "renamed".into())
    });
    assert_eq!(dispatched, direct);

    assert_eq!(resolver.stats().snapshot(), DispatchCounts::default());
}

#[test]
fn test_known_name_without_exact_scope_falls_back() {
    let resolver = InterceptorResolver::builder()
        .register(intercept::substitute([CallScope::writes_of_properties_named("version")], "never"))
        .build()
        .expect("build resolver");
    let project = Project::new(3);
    project.set("version", "0.1".into()).unwrap();

    let read = dispatch::get_property(&resolver, project.handle(), "version", "build.gradle", || {
        project.get("version")
    });

    assert_eq!(read, Ok(Value::from("0.1")));
    assert_eq!(resolver.stats().snapshot().fallback, 1);
}

#[test]
fn test_original_failure_reaches_caller_unchanged() {
    let log = Arc::new(CallLog::new());
    let resolver = InterceptorResolver::builder()
        .register(intercept::recording(
            [CallScope::writes_of_properties_named("name")],
            Arc::clone(&log),
        ))
        .build()
        .expect("build resolver");
    let project = Project::new(4);

    let expected = project.set("name", "x".into()).unwrap_err();
    let err = dispatch::set_property(&resolver, project.handle(), "name", "x".into(), "build.gradle", || {
        project.set("name", "x".into())
    })
    .unwrap_err();

    assert_eq!(err, expected);
    assert_eq!(err.to_string(), "cannot set read-only property: name for Project@4");
    assert_eq!(log.calls()[0].outcome, Err(expected));
}

#[test]
fn test_interceptor_failure_looks_like_any_other_failure() {
    let resolver = InterceptorResolver::builder()
        .register(intercept::from_fn(
            "failing",
            [CallScope::method_calls_with_arity("exec", 1)],
            |_invocation: Invocation<'_>, _consumer: &str| -> CallResult {
                Err(CallError::raised("IllegalStateException", "instrumentation broke"))
            },
        ))
        .build()
        .expect("build resolver");

    let mut ran = false;
    let result = dispatch::invoke_method(&resolver, Value::Null, "exec", vec!["ls".into()], "build.gradle", || {
        ran = true;
        Ok(Value::Int(0))
    });

    assert_eq!(result, Err(CallError::raised("IllegalStateException", "instrumentation broke")));
    assert!(!ran);
}

#[test]
fn test_entry_point_is_popped_when_intercepted_call_fails() {
    let resolver = InterceptorResolver::builder()
        .register(Tracked::new(Passthrough::new([CallScope::method_calls_named("outer")])))
        .register(Tracked::new(Passthrough::new([CallScope::method_calls_named("middle")])))
        .register(Tracked::new(Passthrough::new([CallScope::method_calls_named("inner")])))
        .build()
        .expect("build resolver");

    fn call(resolver: &InterceptorResolver, name: &str, body: &mut dyn FnMut() -> CallResult) -> CallResult {
        CallSite::new(resolver, CallScope::method_calls_named(name), "build.gradle")
            .dispatch(Value::Null, Vec::new(), body)
    }

    assert_eq!(entry_point::depth(), 0);
    let result = call(&resolver, "outer", &mut || {
        assert_eq!(entry_point::depth(), 1);
        call(&resolver, "middle", &mut || {
            assert_eq!(entry_point::depth(), 2);
            call(&resolver, "inner", &mut || {
                assert_eq!(entry_point::depth(), 3);
                Err(CallError::raised("GradleException", "innermost failed"))
            })
        })
    });

    assert_eq!(result, Err(CallError::raised("GradleException", "innermost failed")));
    assert_eq!(entry_point::depth(), 0);
}

#[test]
fn test_call_site_entry_point_option() {
    let resolver = InterceptorResolver::builder()
        .register(Passthrough::new([CallScope::reads_of_properties_named("version")]))
        .build()
        .expect("build resolver");
    let site = CallSite::new(&resolver, CallScope::reads_of_properties_named("version"), "settings.gradle")
        .with_entry_point(true);

    let seen = site
        .dispatch(Value::Null, Vec::new(), || {
            let current = entry_point::current_entry_point().expect("frame pushed");
            Ok(Value::from(format!("{} {}", current.kind, current.consumer)))
        })
        .unwrap();

    assert_eq!(seen, Value::from("GET_PROPERTY settings.gradle"));
    assert_eq!(entry_point::depth(), 0);
}

#[test]
fn test_nested_write_is_attributed_to_tracked_origin() {
    // An interceptor reached from inside the object's own dispatch claims
    // the consumer that started the tracked write.
    let origins = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&origins);
    let resolver = InterceptorResolver::builder()
        .register(intercept::from_fn(
            "origin",
            [CallScope::writes_of_properties_named("version")],
            move |mut invocation: Invocation<'_>, consumer: &str| {
                let origin = entry_point::find_caller_for_current_call_if_not_intercepted(
                    "version",
                    EntryPointKind::SetProperty,
                )
                .unwrap_or_else(|| consumer.to_string());
                recorded.lock().unwrap().push(origin);
                invocation.call_original()
            },
        ))
        .build()
        .expect("build resolver");
    let project = Project::new(5);

    dispatch::set_tracked_property(&resolver, "version", "build.gradle", || {
        // The project's own setter dispatches again, from plugin code
        dispatch::set_property(&resolver, project.handle(), "version", "2.0".into(), "SomePlugin", || {
            project.set("version", "2.0".into())
        })
    })
    .expect("tracked write");

    dispatch::set_property(&resolver, project.handle(), "version", "3.0".into(), "SomePlugin", || {
        project.set("version", "3.0".into())
    })
    .expect("plain write");

    assert_eq!(*origins.lock().unwrap(), vec!["build.gradle".to_string(), "SomePlugin".to_string()]);
    assert_eq!(project.get("version"), Ok(Value::from("3.0")));
    assert_eq!(resolver.stats().snapshot().tracked, 1);
    assert_eq!(entry_point::depth(), 0);
}

#[test]
fn test_recording_from_many_threads() {
    let log = Arc::new(CallLog::new());
    let resolver = Arc::new(
        InterceptorResolver::builder()
            .register(intercept::recording(
                [CallScope::writes_of_properties_named("version")],
                Arc::clone(&log),
            ))
            .build()
            .expect("build resolver"),
    );

    let handles: Vec<_> = (0..8u64)
        .map(|id| {
            let resolver = Arc::clone(&resolver);
            std::thread::spawn(move || {
                let project = Project::new(id);
                for n in 0..25 {
                    let value = Value::Int(n);
                    dispatch::set_property(&resolver, project.handle(), "version", value.clone(), "build.gradle", || {
                        project.set("version", value.clone())
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(log.len(), 200);
    assert_eq!(resolver.stats().snapshot().intercepted, 200);
}
