//! End-to-end shutdown passes driven through the public API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use shutdown_hook::{
    Event, HookConfig, HookState, ManualSource, MessageSource, RecordedExit, ShutdownError,
    ShutdownHook, TaskOptions, Trigger, TriggerAdapter, from_sync, load_config_from_str,
};
use tokio::sync::broadcast::Receiver;

fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn component_names(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ComponentShutdown { name, .. } => Some(name.to_string()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn signal_style_trigger_runs_components_in_order() {
    let exit = Arc::new(RecordedExit::new());
    let hook = Arc::new(ShutdownHook::with_exit(
        HookConfig::default().with_lifo(true),
        exit.clone(),
    ));
    let log = Arc::new(Mutex::new(Vec::new()));
    for (name, order) in [("http", 0), ("db", 10), ("queue", 0), ("metrics", -5)] {
        let log = Arc::clone(&log);
        hook.add(
            move || {
                let log = Arc::clone(&log);
                async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    log.lock().unwrap().push(name);
                    Ok::<_, std::io::Error>(())
                }
            },
            TaskOptions::new().name(name).order(order),
        )
        .unwrap();
    }
    let mut rx = hook.subscribe();

    let (trigger, source) = ManualSource::channel();
    let mut adapter = TriggerAdapter::new(Arc::clone(&hook)).with_source(source);
    adapter.register();
    trigger.fire(Trigger::Terminate);
    trigger.fire(Trigger::Terminate);
    hook.finished().await;
    adapter.deregister().await;

    assert_eq!(*log.lock().unwrap(), ["metrics", "queue", "http", "db"]);
    assert_eq!(exit.codes(), [0]);

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(Event::ShutdownStarted)));
    assert_eq!(component_names(&events), ["metrics", "queue", "http", "db"]);
    assert!(matches!(
        events.last(),
        Some(Event::ShutdownEnded { code: 0, error: None })
    ));
    assert!(matches!(hook.state(), HookState::Completed(outcome) if outcome.is_success()));
}

#[tokio::test]
async fn control_message_with_slow_component_times_out() {
    let exit = Arc::new(RecordedExit::new());
    let hook = Arc::new(ShutdownHook::with_exit(
        HookConfig::default().with_timeout(Duration::from_millis(200)),
        exit.clone(),
    ));
    hook.add(
        || async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok::<_, std::io::Error>(())
        },
        TaskOptions::new().name("slow"),
    )
    .unwrap();
    let reached = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&reached);
    hook.add(
        from_sync(move || {
            *flag.lock().unwrap() = true;
            Ok::<_, &str>(())
        }),
        TaskOptions::new().name("never"),
    )
    .unwrap();
    let mut rx = hook.subscribe();

    let input: &[u8] = b"ping\nshutdown\n";
    let mut adapter = TriggerAdapter::new(Arc::clone(&hook)).with_source(MessageSource::new(input));
    adapter.register();
    hook.finished().await;
    adapter.deregister().await;

    assert!(!*reached.lock().unwrap());
    assert_eq!(exit.codes(), [1]);

    let events = drain(&mut rx);
    assert_eq!(component_names(&events), ["slow"]);
    let Some(Event::ShutdownEnded { code: 1, error: Some(error) }) = events.last() else {
        panic!("expected failed ShutdownEnded, got {events:?}");
    };
    assert!(matches!(**error, ShutdownError::Timeout { .. }));
    assert_eq!(error.to_string(), "Shutdown operation timed out after 200ms");
}

#[tokio::test]
async fn config_file_tasks_register_in_file_order() {
    let config = load_config_from_str(
        r#"
        [hook]
        timeout_ms = 5000

        [[tasks]]
        program = "true"
        order = 3

        [[tasks]]
        name = "first"
        program = "true"
        "#,
    )
    .unwrap();
    assert_eq!(config.hook.timeout(), Duration::from_secs(5));

    let exit = Arc::new(RecordedExit::new());
    let hook = ShutdownHook::with_exit(config.hook, exit.clone());
    for task in &config.tasks {
        hook.add(task.operation(), task.options()).unwrap();
    }
    assert_eq!(hook.task_count(), 2);
    let mut rx = hook.subscribe();

    let outcome = hook.shutdown().await.unwrap();
    let events = drain(&mut rx);
    assert_eq!(component_names(&events), ["first", "anonymous#1"]);
    if cfg!(unix) {
        assert!(outcome.is_success());
        assert_eq!(exit.codes(), [0]);
    }
}

#[tokio::test]
async fn failing_command_reports_exit_status() {
    let config = load_config_from_str(
        r#"
        [[tasks]]
        name = "missing"
        program = "shutdown-hook-no-such-program"
        "#,
    )
    .unwrap();
    let exit = Arc::new(RecordedExit::new());
    let hook = ShutdownHook::with_exit(config.hook, exit.clone());
    for task in &config.tasks {
        hook.add(task.operation(), task.options()).unwrap();
    }

    let outcome = hook.shutdown().await.unwrap();
    assert_eq!(outcome.code(), 1);
    let error = outcome.error().unwrap();
    assert_eq!(error.as_label(), "task_failed");
    assert!(error.to_string().contains("shutdown-hook-no-such-program"));
    assert_eq!(exit.codes(), [1]);
}
