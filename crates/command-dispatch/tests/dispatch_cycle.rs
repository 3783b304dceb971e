//! End-to-end cycle tests over mock hubs and mock collaborators.

use ai_client::{
    MockConversation, MockInterpreter, MockSceneDescriber, MockSynth, MockTranscriber,
};
use audio_gate::{AudioBuffer, NullOutput};
use command_dispatch::{Collaborators, DispatchConfig, Orchestrator, SessionState};
use command_proto::{decode_sequence, Command, CommandStep, ShootMode};
use hub_link::{HubLink, HubRegistry, MockDialer, MockScript, ReconnectPolicy};
use std::sync::Arc;
use std::time::Duration;
use target_locator::{Detection, LinearFovAim, MockDetector, TargetLocator, TargetPolicy};

const KAIST_SEQ: &str = r#"[
    [{"cmd": "steer", "val": 90}],
    [{"cmd": "move", "val": -50}],
    [{"cmd": "move", "val": 50}],
    [{"cmd": "steer", "val": -90}]
]"#;

struct Rig {
    orch: Arc<Orchestrator>,
    hub1: Arc<MockScript>,
    hub2: Arc<MockScript>,
}

fn fast_cfg() -> DispatchConfig {
    DispatchConfig {
        vision_timeout: Duration::from_millis(50),
        transcribe_timeout: Duration::from_millis(200),
        interpret_timeout: Duration::from_millis(200),
        conversation_timeout: Duration::from_millis(200),
        hub_ack_timeout: Duration::from_millis(100),
        locate_timeout: Duration::from_millis(50),
        settle_pause: Duration::from_millis(1),
    }
}

fn two_hubs() -> (HubRegistry, Arc<MockScript>, Arc<MockScript>) {
    let policy = ReconnectPolicy {
        max_attempts: 1,
        initial_delay: Duration::from_millis(1),
        multiplier: 1.0,
    };
    let (d1, s1) = MockDialer::new();
    let (d2, s2) = MockDialer::new();
    let hub1 = Arc::new(HubLink::connect("hub1", "mock:1", Box::new(d1), policy));
    let hub2 = Arc::new(HubLink::connect("hub2", "mock:2", Box::new(d2), policy));
    (HubRegistry::new(vec![hub1, hub2]), s1, s2)
}

fn collaborators(transcript: &str, interpreter_json: &str) -> Collaborators {
    Collaborators {
        transcriber: Arc::new(MockTranscriber::reply(transcript)),
        describer: Arc::new(MockSceneDescriber::reply("a clear test range")),
        interpreter: Arc::new(MockInterpreter::sequence(interpreter_json)),
        converser: Arc::new(MockConversation::line("Roger.")),
        synth: Arc::new(MockSynth::default()),
        output: Arc::new(NullOutput),
    }
}

fn build(collab: Collaborators, detector: MockDetector) -> Rig {
    let (hubs, hub1, hub2) = two_hubs();
    let locator = TargetLocator::new(
        Box::new(detector),
        Box::new(LinearFovAim::default()),
        TargetPolicy::new(vec!["Han".to_string()]),
    );
    Rig {
        orch: Arc::new(Orchestrator::new(fast_cfg(), hubs, collab, locator)),
        hub1,
        hub2,
    }
}

fn rig(transcript: &str, interpreter_json: &str, detector: MockDetector) -> Rig {
    build(collaborators(transcript, interpreter_json), detector)
}

fn utterance() -> AudioBuffer {
    AudioBuffer::new(8_000, vec![vec![6_000; 160]])
}

fn enemy_at(x: f64, y: f64) -> Detection {
    Detection {
        label: "enemy".to_string(),
        center: (x, y),
        bbox: None,
        distance: None,
        ts: None,
    }
}

/// Decode each delivered payload back into a typed step.
fn steps_of(script: &Arc<MockScript>) -> Vec<CommandStep> {
    script
        .sent()
        .iter()
        .map(|payload| {
            decode_sequence(&format!("[{payload}]"))
                .ok()
                .and_then(|seq| seq.steps.into_iter().next())
                .unwrap_or_default()
        })
        .collect()
}

#[tokio::test]
async fn password_sequence_sends_four_batches_in_order() {
    let rig = rig("Kaist.", KAIST_SEQ, MockDetector::none());
    rig.orch.run_cycle(utterance(), None).await;

    let expected = vec![
        CommandStep::single(Command::Steer(90.0)),
        CommandStep::single(Command::Move(-50.0)),
        CommandStep::single(Command::Move(50.0)),
        CommandStep::single(Command::Steer(-90.0)),
    ];
    assert_eq!(steps_of(&rig.hub1), expected);
    assert_eq!(steps_of(&rig.hub2), expected);
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}

#[tokio::test]
async fn empty_sequence_dispatches_nothing() {
    let rig = rig("Vigil, what do you see?", "[]", MockDetector::none());
    rig.orch.run_cycle(utterance(), None).await;

    assert!(rig.hub1.sent().is_empty());
    assert!(rig.hub2.sent().is_empty());
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}

#[tokio::test]
async fn engage_without_target_falls_back_to_single_shot() {
    let engage = r#"[[{"cmd": "shoot", "val": 0}]]"#;
    let rig = rig("Fire at will.", engage, MockDetector::none());
    rig.orch.run_cycle(utterance(), None).await;

    let fallback = vec![CommandStep::single(Command::Shoot(ShootMode::Burst(1)))];
    assert_eq!(steps_of(&rig.hub1), fallback);
    assert_eq!(steps_of(&rig.hub2), fallback);
}

#[tokio::test]
async fn engage_with_slow_detector_times_out_to_fallback() {
    let engage = r#"[[{"cmd": "shoot", "val": 0}]]"#;
    let detector = MockDetector::none().with_delay(Duration::from_millis(300));
    let rig = rig("Fire at will.", engage, detector);
    rig.orch.run_cycle(utterance(), None).await;

    // Exactly one fallback batch per hub.
    assert_eq!(rig.hub1.sent().len(), 1);
    assert_eq!(rig.hub2.sent().len(), 1);
    assert_eq!(
        steps_of(&rig.hub1),
        vec![CommandStep::single(Command::Shoot(ShootMode::Burst(1)))]
    );
}

#[tokio::test]
async fn engage_with_detection_runs_three_phases() {
    let engage = r#"[[{"cmd": "shoot", "val": 0}]]"#;
    let detector = MockDetector::returning(vec![enemy_at(420.0, 240.0)]);
    let calls = detector.counter();
    let rig = rig("Fire at will.", engage, detector);
    rig.orch.run_cycle(utterance(), None).await;

    // rel_x = 320 - 420 = -100 px -> -100 * 60 / 640 = -9.375 deg.
    let expected = vec![
        CommandStep::new(vec![Command::RotateX(-9.375), Command::RotateY(0.0)]),
        CommandStep::single(Command::Shoot(ShootMode::Burst(1))),
        CommandStep::new(vec![Command::RotateX(9.375), Command::RotateY(0.0)]),
    ];
    assert_eq!(steps_of(&rig.hub1), expected);
    assert_eq!(steps_of(&rig.hub2), expected);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn locator_runs_once_and_before_any_other_send() {
    let seq = r#"[[{"cmd": "shoot", "val": 0}], [{"cmd": "move", "val": 10}]]"#;
    let detector = MockDetector::returning(vec![enemy_at(320.0, 240.0)]);
    let calls = detector.counter();
    let rig = rig("Engage, then advance.", seq, detector);
    rig.orch.run_cycle(utterance(), None).await;

    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    let steps = steps_of(&rig.hub1);
    // Three engage phases, then the trailing move step, strictly ordered.
    assert_eq!(steps.len(), 4);
    assert_eq!(
        steps[0].commands[0],
        Command::RotateX(0.0),
        "engage rotation must precede every other send"
    );
    assert_eq!(steps[3], CommandStep::single(Command::Move(10.0)));
}

#[tokio::test]
async fn single_hub_failure_does_not_abort_the_sequence() {
    let seq = r#"[[{"cmd": "move", "val": 100}], [{"cmd": "steer", "val": 45}]]"#;
    let rig = rig("Advance and turn.", seq, MockDetector::none());
    rig.hub1.set_fail_sends(true);
    rig.orch.run_cycle(utterance(), None).await;

    // Hub B still receives every step, in order.
    assert_eq!(
        steps_of(&rig.hub2),
        vec![
            CommandStep::single(Command::Move(100.0)),
            CommandStep::single(Command::Steer(45.0)),
        ]
    );
    assert!(rig.hub1.sent().is_empty());
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}

#[tokio::test]
async fn empty_transcription_aborts_without_dispatch() {
    let rig = rig("", KAIST_SEQ, MockDetector::none());
    rig.orch.run_cycle(utterance(), None).await;

    assert!(rig.hub1.sent().is_empty());
    assert!(rig.hub2.sent().is_empty());
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}

#[tokio::test]
async fn failed_transcription_aborts_without_dispatch() {
    let mut collab = collaborators("ignored", KAIST_SEQ);
    collab.transcriber = Arc::new(MockTranscriber::failing());
    let rig = build(collab, MockDetector::none());
    rig.orch.run_cycle(utterance(), None).await;

    assert!(rig.hub1.sent().is_empty());
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}

#[tokio::test]
async fn malformed_interpreter_output_skips_dispatch() {
    for bad in ["not json at all", r#"{"cmd": "move", "val": 1}"#] {
        let rig = rig("Advance.", bad, MockDetector::none());
        rig.orch.run_cycle(utterance(), None).await;
        assert!(rig.hub1.sent().is_empty());
        assert_eq!(rig.orch.session().current(), SessionState::Idle);
    }
}

#[tokio::test]
async fn slow_vision_degrades_to_no_scene_description() {
    let mut collab = collaborators("Kaist.", KAIST_SEQ);
    collab.describer =
        Arc::new(MockSceneDescriber::reply("late").with_delay(Duration::from_millis(300)));
    let rig = build(collab, MockDetector::none());

    let this = rig.orch.clone();
    let vision = tokio::spawn(async move { this.describe_scene().await });
    rig.orch.run_cycle(utterance(), Some(vision)).await;

    // The cycle proceeded without the scene and still dispatched.
    assert_eq!(rig.hub1.sent().len(), 4);
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}

#[tokio::test]
async fn slow_conversation_does_not_wedge_the_cycle() {
    let mut collab = collaborators("Kaist.", KAIST_SEQ);
    collab.converser =
        Arc::new(MockConversation::line("late reply").with_delay(Duration::from_secs(2)));
    let rig = build(collab, MockDetector::none());

    let bounded = tokio::time::timeout(
        Duration::from_secs(3),
        rig.orch.run_cycle(utterance(), None),
    )
    .await;
    assert!(bounded.is_ok(), "cycle must end despite a hung reply task");
    assert_eq!(rig.hub1.sent().len(), 4);
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}

#[tokio::test]
async fn empty_buffer_is_a_noop_cycle() {
    let rig = rig("Kaist.", KAIST_SEQ, MockDetector::none());
    rig.orch
        .run_cycle(AudioBuffer::new(8_000, vec![]), None)
        .await;
    assert!(rig.hub1.sent().is_empty());
    assert_eq!(rig.orch.session().current(), SessionState::Idle);
}
