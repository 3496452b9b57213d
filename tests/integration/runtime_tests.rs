//! Threaded runtime: coordinator loop, poller, and one-shot shutdown.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use nightlightpi::app::commands::RemoteCommand;
use nightlightpi::app::lifecycle::Runtime;
use nightlightpi::config::Config;
use nightlightpi::drivers::led_patterns::wheel;
use nightlightpi::events::{Event, event_queue};
use nightlightpi::sensors::RetryPolicy;

use crate::mock_hw::{MockInputs, Rig, SAMPLE_CONFIG, ScriptedSensor, reading};

fn no_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 1,
        delay: Duration::ZERO,
    }
}

fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(5));
    }
}

fn silent_sensor() -> Box<ScriptedSensor> {
    Box::new(ScriptedSensor {
        script: VecDeque::new(),
    })
}

#[test]
fn concurrent_shutdown_runs_once() {
    let rig = Rig::new();
    let releases = Arc::new(AtomicU32::new(0));
    let runtime = Runtime::launch(
        rig.night_light(),
        event_queue(),
        silent_sensor(),
        no_retry(),
        Box::new(MockInputs {
            releases: Arc::clone(&releases),
        }),
    )
    .unwrap();
    let strip_before = rig.strip_frames();
    let panels_before = rig.display_frames();

    let a = Arc::clone(&runtime);
    let b = Arc::clone(&runtime);
    let ta = thread::spawn(move || a.shutdown());
    let tb = thread::spawn(move || b.shutdown());
    ta.join().unwrap();
    tb.join().unwrap();
    runtime.shutdown();

    assert!(!runtime.is_running());
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert_eq!(rig.strip_frames() - strip_before, 1, "strip cleared once");
    assert!(rig.strip.lock().unwrap().last_is_dark());
    assert_eq!(rig.display_frames() - panels_before, 1, "display cleared once");
    assert!(rig.last_panel().unwrap().is_blank());
    assert_eq!(rig.publisher.disconnects.load(Ordering::SeqCst), 1);
}

#[test]
fn first_reading_reaches_coordinator() {
    let rig = Rig::new();
    let sensor = Box::new(ScriptedSensor {
        script: VecDeque::from([Ok(reading(22.0, 45.0))]),
    });
    let runtime = Runtime::launch(
        rig.night_light(),
        event_queue(),
        sensor,
        no_retry(),
        Box::new(MockInputs {
            releases: Arc::new(AtomicU32::new(0)),
        }),
    )
    .unwrap();

    wait_until("temperature publish", || {
        !rig.publisher.on_topic("nightlight/temperature").is_empty()
    });
    runtime.shutdown();

    assert_eq!(
        rig.publisher.on_topic("nightlight/temperature")[0].payload,
        "22.0"
    );
    assert_eq!(
        rig.publisher.on_topic("nightlight/humidity")[0].payload,
        "45.0"
    );
}

#[test]
fn queued_events_are_applied_in_order() {
    let rig = Rig::new();
    let (tx, rx) = event_queue();
    let producer = tx.clone();
    let runtime = Runtime::launch(
        rig.night_light(),
        (tx, rx),
        silent_sensor(),
        no_retry(),
        Box::new(MockInputs {
            releases: Arc::new(AtomicU32::new(0)),
        }),
    )
    .unwrap();
    rig.publisher.forget();

    producer.push(Event::Remote(RemoteCommand::SetLight("Off".into())));
    producer.push(Event::Remote(RemoteCommand::SetBrightness("55".into())));
    producer.push(Event::DisplayButton);

    wait_until("display publish", || {
        !rig.publisher.on_topic("nightlight/display").is_empty()
    });
    runtime.shutdown();

    let topics: Vec<String> = rig
        .publisher
        .messages
        .lock()
        .unwrap()
        .iter()
        .map(|m| format!("{}={}", m.topic, m.payload))
        .collect();
    assert_eq!(
        topics,
        vec![
            "nightlight/light=Off",
            "nightlight/brightness=55",
            "nightlight/display=Off",
        ]
    );
}

#[test]
fn rainbow_animates_between_events() {
    let mut raw: serde_json::Value = serde_json::from_str(SAMPLE_CONFIG).unwrap();
    raw["timing"]["speed_in_seconds"] = serde_json::json!(0.01);
    raw["light_modes"] = serde_json::json!(["Rainbow", "Off"]);
    let rig = Rig::with_config(Config::from_json(&raw.to_string()).unwrap());

    let runtime = Runtime::launch(
        rig.night_light(),
        event_queue(),
        silent_sensor(),
        no_retry(),
        Box::new(MockInputs {
            releases: Arc::new(AtomicU32::new(0)),
        }),
    )
    .unwrap();

    wait_until("three rainbow steps", || rig.strip_frames() >= 3);
    runtime.shutdown();

    let strip = rig.strip.lock().unwrap();
    assert_eq!(strip.frames[0][0], Some((wheel(1), 6)));
    assert_eq!(strip.frames[1][0], Some((wheel(2), 6)));
}

#[test]
fn device_failure_only_fails_its_own_event() {
    let rig = Rig::new();
    let (tx, rx) = event_queue();
    let producer = tx.clone();
    let runtime = Runtime::launch(
        rig.night_light(),
        (tx, rx),
        silent_sensor(),
        no_retry(),
        Box::new(MockInputs {
            releases: Arc::new(AtomicU32::new(0)),
        }),
    )
    .unwrap();
    rig.publisher.forget();
    rig.display.lock().unwrap().failing = true;

    producer.push(Event::DisplayButton);
    producer.push(Event::Remote(RemoteCommand::SetLight("Off".into())));

    wait_until("light publish", || {
        !rig.publisher.on_topic("nightlight/light").is_empty()
    });
    assert!(runtime.is_running());
    runtime.shutdown();

    assert!(rig.publisher.on_topic("nightlight/display").is_empty());
    assert_eq!(
        rig.publisher.on_topic("nightlight/light")[0].payload,
        "Off"
    );
    assert!(rig.strip.lock().unwrap().last_is_dark());
}

#[test]
fn shutdown_cancels_pending_sensor_retries() {
    let rig = Rig::new();
    let retry = RetryPolicy {
        attempts: 4,
        delay: Duration::from_secs(2),
    };
    let runtime = Runtime::launch(
        rig.night_light(),
        event_queue(),
        silent_sensor(),
        retry,
        Box::new(MockInputs {
            releases: Arc::new(AtomicU32::new(0)),
        }),
    )
    .unwrap();
    thread::sleep(Duration::from_millis(100));

    let started = Instant::now();
    runtime.shutdown();
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "shutdown took {:?}",
        started.elapsed()
    );
    assert!(!runtime.is_running());
}
