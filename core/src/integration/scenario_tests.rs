//! Scenario script execution tests

use crate::{
    config::Config,
    error::InputError,
    script::{ScenarioRunner, ScenarioScript, ScriptError},
    source::DeviceId,
};

fn run(toml: &str) -> crate::script::ScenarioReport {
    let script = ScenarioScript::from_toml(toml).expect("parse");
    ScenarioRunner::new(&script, Config::default())
        .expect("valid")
        .run()
        .expect("run")
}

const CONTROLLERS: &str = r#"
    name = "two controllers"

    [[devices]]
    name = "left"
    handedness = "left"
    identity = { vendor = "oculus", product = "touch" }
    gamepad = { capabilities = "TRIGGER | SQUEEZE | THUMBSTICK" }

    [[devices]]
    name = "right"
    handedness = "right"
    identity = { vendor = "oculus", product = "touch" }
    gamepad = { capabilities = "TRIGGER | SQUEEZE | THUMBSTICK" }
"#;

#[test]
fn test_trigger_click_scenario() {
    let report = run(&format!(
        "{}{}",
        CONTROLLERS,
        r#"
        [[frames]]
        f = 0
        connect = ["left", "right"]
        expect = ["inputsourceschange"]

        [[frames]]
        f = 1
        buttons = [{ device = "right", index = 0, value = 0.9 }]
        expect = ["selectstart:right"]

        [[frames]]
        f = 3
        buttons = [{ device = "right", index = 0, value = 0.0 }]
        expect = ["selectend:right", "select:right"]
        "#
    ));

    assert!(report.passed(), "{:?}", report.expectations);
    assert_eq!(report.frames_executed, 4);
    assert_eq!(report.summary.expectations_passed, 3);
    assert_eq!(report.summary.status, "PASSED");
    assert_eq!(report.events[0].added, vec!["left", "right"]);
    // Button-driven events carry the slot
    assert_eq!(report.events[1].button_index, Some(0));
}

#[test]
fn test_disconnect_mid_selection_scenario() {
    let report = run(&format!(
        "{}{}",
        CONTROLLERS,
        r#"
        [[frames]]
        f = 0
        connect = ["left", "right"]

        [[frames]]
        f = 1
        press = ["left"]
        squeeze = ["right"]
        expect = ["selectstart:left", "squeezestart:right"]

        [[frames]]
        f = 2
        disconnect = ["left"]
        expect = ["selectend:left", "inputsourceschange"]

        [[frames]]
        f = 3
        squeeze_release = ["right"]
        expect = ["squeezeend", "squeeze"]
        "#
    ));

    assert!(report.passed(), "{:?}", report.expectations);
    let removed = report
        .events
        .iter()
        .find(|e| e.event == "inputsourceschange" && e.frame == 2)
        .unwrap();
    assert_eq!(removed.removed, vec!["left"]);
    assert!(!report.events.iter().any(|e| e.event == "select"));
}

#[test]
fn test_voice_command_scenario() {
    let report = run(
        r#"
        [[devices]]
        name = "voice"
        target_ray_mode = "gaze"
        tracking = "none"

        [[frames]]
        f = 0
        connect = ["voice"]
        pose = [{ device = "viewer", position = [0.0, 1.6, 0.0] }]

        [[frames]]
        f = 5
        instant = ["voice"]
        expect = ["selectstart:voice", "selectend:voice", "select:voice"]
        "#,
    );
    assert!(report.passed(), "{:?}", report.expectations);
    assert_eq!(report.total_frames, 6);
}

#[test]
fn test_screen_tap_scenario() {
    let report = run(
        r#"
        name = "tap"

        [surface]
        width = 800
        height = 600

        [[frames]]
        f = 0
        pointer = [{ kind = "down", x = 400.0, y = 300.0 }]
        expect = ["inputsourceschange", "selectstart:screen"]

        [[frames]]
        f = 1
        pointer = [{ kind = "move", x = 410.0, y = 300.0 }]
        expect = []

        [[frames]]
        f = 2
        pointer = [{ kind = "up", x = 410.0, y = 300.0 }]
        expect = ["selectend:screen", "inputsourceschange"]

        [[frames]]
        f = 3
        pointer = [{ kind = "click", x = 410.0, y = 300.0 }]
        expect = ["select:screen"]
        "#,
    );
    assert!(report.passed(), "{:?}", report.expectations);
}

#[test]
fn test_failed_expectation_reported() {
    let script = format!(
        "{}{}",
        CONTROLLERS,
        r#"
        [[frames]]
        f = 0
        connect = ["left"]
        expect = ["selectstart"]

        [[frames]]
        f = 1
        press = ["left"]
        expect = ["selectstart:left"]
        "#
    );
    let report = run(&script);
    assert!(!report.passed());
    assert_eq!(report.summary.status, "FAILED");
    assert_eq!(report.summary.expectations_failed, 1);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.frame, 0);
    assert_eq!(failure.actual, vec!["inputsourceschange"]);

    // Fail-fast stops after the first failure
    let parsed = ScenarioScript::from_toml(&script).unwrap();
    let report = ScenarioRunner::new(&parsed, Config::default())
        .unwrap()
        .fail_fast(true)
        .run()
        .unwrap();
    assert_eq!(report.frames_executed, 1);
    assert_eq!(report.expectations.len(), 1);
}

#[test]
fn test_host_error_aborts_run() {
    let script = ScenarioScript::from_toml(&format!(
        "{}{}",
        CONTROLLERS,
        r#"
        [[frames]]
        f = 0
        connect = ["left"]

        [[frames]]
        f = 1
        connect = ["left"]
        "#
    ))
    .unwrap();
    let err = ScenarioRunner::new(&script, Config::default())
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(
        err,
        ScriptError::Host {
            frame: 1,
            error: InputError::DuplicateDevice(DeviceId(1)),
        }
    );
}

#[test]
fn test_invalid_script_rejected_before_run() {
    let script = ScenarioScript::from_toml(
        r#"
        [[frames]]
        f = 0
        press = ["ghost"]
        "#,
    )
    .unwrap();
    assert!(matches!(
        ScenarioRunner::new(&script, Config::default()),
        Err(ScriptError::UndefinedDevice { frame: 0, .. })
    ));
}
