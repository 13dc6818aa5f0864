mod common;

use common::{simple_cycle, ConflictMode, MockChecker, MockSubmitter};
use gestpipe_core::config::PipelineConfig;
use gestpipe_core::error::CollaboratorError;
use gestpipe_core::landmarks::HandFrame;
use gestpipe_core::recorder::FrameOutcome;
use gestpipe_core::session::{CaptureEvent, CaptureSession};
use std::time::Duration;
use tokio::sync::mpsc;

fn config() -> PipelineConfig {
    let mut cfg = PipelineConfig::default();
    cfg.capture.min_frames = 4;
    cfg
}

fn cycles(count: u64, fingers: impl Fn(u64) -> [u8; 5]) -> Vec<HandFrame> {
    (0..count)
        .flat_map(|c| simple_cycle(c * 1000, 33, 6, fingers(c)))
        .collect()
}

async fn run<C, S>(session: &mut CaptureSession<C, S>, frames: &[HandFrame]) -> Vec<CaptureEvent>
where
    C: gestpipe_core::collab::ConflictChecker,
    S: gestpipe_core::collab::BatchSubmitter,
{
    let mut events = Vec::new();
    for f in frames {
        let event = session.on_frame(f).await.expect("frame");
        if !matches!(event, CaptureEvent::Frame(_) | CaptureEvent::Skipped) {
            events.push(event);
        }
    }
    events
}

#[tokio::test]
async fn test_five_samples_trigger_one_submission() {
    let checker = MockChecker::new(ConflictMode::Clear);
    let submitter = MockSubmitter::default();
    let mut session =
        CaptureSession::new(config(), "op-1", "wave", checker.clone(), submitter.clone()).unwrap();

    let events = run(&mut session, &cycles(5, |_| [1, 1, 0, 0, 0])).await;

    assert_eq!(checker.call_count(), 5);
    assert_eq!(submitter.call_count(), 1);
    assert!(session.collector().samples().is_empty());
    assert!(!session.collector().is_uploading());
    assert!(!session.machine().is_suspended());

    assert_eq!(events.len(), 5);
    match events.last().unwrap() {
        CaptureEvent::BatchSubmitted {
            label,
            samples,
            quality,
            ..
        } => {
            assert_eq!(label, "wave");
            let ids: Vec<u32> = samples.iter().map(|s| s.instance_id).collect();
            assert_eq!(ids, vec![1, 2, 3, 4, 5]);
            assert!(quality.consistent);
        }
        other => panic!("expected a batch, got {:?}", other),
    }
    assert_eq!(session.collector().pending().len(), 1);

    let sent = submitter.calls.lock().unwrap();
    assert_eq!(sent[0].gesture_label, "wave");
    assert_eq!(sent[0].operator_id, "op-1");
    assert_eq!(sent[0].samples.len(), 5);
}

#[tokio::test]
async fn test_conflict_timeout_still_appends() {
    let checker = MockChecker::new(ConflictMode::Fail(CollaboratorError::Timeout));
    let mut session =
        CaptureSession::new(config(), "op-1", "wave", checker.clone(), MockSubmitter::default())
            .unwrap();

    let events = run(&mut session, &cycles(1, |_| [1, 1, 0, 0, 0])).await;

    assert_eq!(checker.call_count(), 1);
    assert_eq!(
        events,
        vec![CaptureEvent::SampleAccepted {
            count: 1,
            required: 5
        }]
    );
    assert_eq!(session.collector().samples().len(), 1);
}

#[tokio::test]
async fn test_conflicting_sample_is_not_appended() {
    let checker = MockChecker::new(ConflictMode::Conflict("Matches zoom_in".to_string()));
    let submitter = MockSubmitter::default();
    let mut session =
        CaptureSession::new(config(), "op-1", "wave", checker, submitter.clone()).unwrap();

    let events = run(&mut session, &cycles(6, |_| [1, 1, 0, 0, 0])).await;

    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|e| matches!(
        e,
        CaptureEvent::SampleRejected { message, .. } if message == "Matches zoom_in"
    )));
    assert!(session.collector().samples().is_empty());
    assert_eq!(submitter.call_count(), 0);
}

#[tokio::test]
async fn test_conflict_request_carries_sample_features() {
    let checker = MockChecker::new(ConflictMode::Clear);
    let mut session =
        CaptureSession::new(config(), "op-1", "wave", checker.clone(), MockSubmitter::default())
            .unwrap();
    run(&mut session, &cycles(1, |_| [0, 1, 1, 0, 0])).await;

    let calls = checker.calls.lock().unwrap();
    assert_eq!(calls[0].right_states.as_array(), [0, 1, 1, 0, 0]);
    assert_eq!(calls[0].left_states.as_array(), [0, 0, 0, 0, 0]);
    assert!((calls[0].delta_x + 0.2).abs() < 1e-4);
}

#[tokio::test]
async fn test_upload_failure_rolls_back() {
    let submitter = MockSubmitter::failing(CollaboratorError::Rejected {
        status: 409,
        message: "Gesture already exists".to_string(),
    });
    let mut session = CaptureSession::new(
        config(),
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        submitter.clone(),
    )
    .unwrap();

    let events = run(&mut session, &cycles(5, |_| [1, 1, 0, 0, 0])).await;

    assert_eq!(
        events.last(),
        Some(&CaptureEvent::UploadFailed {
            message: "Gesture already exists".to_string()
        })
    );
    assert!(session.collector().samples().is_empty());
    assert!(!session.collector().is_uploading());
    assert!(session.collector().pending().is_empty());
    assert!(!session.machine().is_suspended());

    // Capturing resumes normally afterwards.
    let more = run(&mut session, &simple_cycle(10_000, 33, 6, [1, 1, 0, 0, 0])).await;
    assert!(matches!(more[0], CaptureEvent::SampleAccepted { count: 1, .. }));
}

#[tokio::test]
async fn test_quality_gate_discards_inconsistent_batch() {
    let mut cfg = config();
    cfg.capture.quality_gate = true;
    let submitter = MockSubmitter::default();
    let mut session = CaptureSession::new(
        cfg,
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        submitter.clone(),
    )
    .unwrap();

    let poses = [
        [1, 1, 1, 1, 1],
        [1, 1, 0, 0, 0],
        [0, 1, 1, 0, 0],
        [1, 1, 1, 0, 0],
        [0, 1, 0, 0, 0],
    ];
    let events = run(&mut session, &cycles(5, |c| poses[c as usize])).await;

    match events.last().unwrap() {
        CaptureEvent::BatchDiscarded { quality } => {
            assert!(!quality.consistent);
            assert_eq!(quality.largest_group, 1);
        }
        other => panic!("expected discard, got {:?}", other),
    }
    assert_eq!(submitter.call_count(), 0);
    assert!(session.collector().samples().is_empty());
}

#[tokio::test]
async fn test_inconsistent_batch_uploads_without_gate() {
    let submitter = MockSubmitter::default();
    let mut session = CaptureSession::new(
        config(),
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        submitter.clone(),
    )
    .unwrap();
    let poses = [
        [1, 1, 1, 1, 1],
        [1, 1, 0, 0, 0],
        [0, 1, 1, 0, 0],
        [1, 1, 1, 0, 0],
        [0, 1, 0, 0, 0],
    ];
    run(&mut session, &cycles(5, |c| poses[c as usize])).await;
    assert_eq!(submitter.call_count(), 1);
}

#[tokio::test]
async fn test_start_new_recording_resets_ids_and_label() {
    let mut session = CaptureSession::new(
        config(),
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        MockSubmitter::default(),
    )
    .unwrap();
    run(&mut session, &cycles(2, |_| [1, 1, 0, 0, 0])).await;
    assert_eq!(session.collector().samples().len(), 2);

    session.start_new_recording(Some("circle")).unwrap();
    assert!(session.collector().samples().is_empty());
    assert_eq!(session.machine().next_instance_id(), 1);

    run(&mut session, &simple_cycle(50_000, 33, 6, [1, 1, 0, 0, 0])).await;
    let s = &session.collector().samples()[0];
    assert_eq!(s.instance_id, 1);
    assert_eq!(s.pose_label, "circle");
}

#[tokio::test]
async fn test_frame_stride_thins_the_stream() {
    let mut cfg = config();
    cfg.capture.frame_stride = 3;
    let mut session = CaptureSession::new(
        cfg,
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        MockSubmitter::default(),
    )
    .unwrap();

    // 18-frame cycle; only every third frame reaches the machine.
    let frames = simple_cycle(0, 33, 18, [1, 1, 0, 0, 0]);
    let mut skipped = 0;
    for f in &frames {
        if session.on_frame(f).await.unwrap() == CaptureEvent::Skipped {
            skipped += 1;
        }
    }
    assert_eq!(skipped, 12);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut cfg = config();
    cfg.capture.required_samples = 0;
    let result = CaptureSession::new(
        cfg,
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        MockSubmitter::default(),
    );
    assert!(result.is_err());
}

fn single_sample_config() -> PipelineConfig {
    let mut cfg = config();
    cfg.capture.required_samples = 1;
    cfg
}

#[tokio::test]
async fn test_cycle_during_upload_is_not_recorded() {
    let submitter = MockSubmitter::slow(50);
    let mut session = CaptureSession::new(
        single_sample_config(),
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        submitter.clone(),
    )
    .unwrap();

    // The second gesture is already waiting when the first batch goes out.
    let (tx, mut rx) = mpsc::channel(32);
    for f in simple_cycle(300, 33, 6, [1, 1, 0, 0, 0]) {
        tx.try_send(f).unwrap();
    }

    let mut events = Vec::new();
    for f in simple_cycle(0, 33, 6, [1, 1, 0, 0, 0]) {
        events.push(session.on_frame_with(&f, &mut rx).await.unwrap());
    }

    assert!(matches!(events.last(), Some(CaptureEvent::BatchSubmitted { .. })));
    assert!(rx.try_recv().is_err(), "queued frames were consumed during the upload");
    assert_eq!(submitter.call_count(), 1);
    assert!(session.collector().samples().is_empty());
    assert!(!session.machine().is_suspended());
    assert_eq!(session.machine().next_instance_id(), 2);

    // Capture carries on normally afterwards.
    drop(tx);
    let events = run(&mut session, &simple_cycle(2000, 33, 6, [1, 1, 0, 0, 0])).await;
    assert_eq!(events.len(), 1);
    assert_eq!(submitter.call_count(), 2);
}

#[tokio::test]
async fn test_interrupted_upload_is_cleared_on_next_frame() {
    let mut session = CaptureSession::new(
        single_sample_config(),
        "op-1",
        "wave",
        MockChecker::new(ConflictMode::Clear),
        MockSubmitter::slow(5_000),
    )
    .unwrap();

    let first = simple_cycle(0, 33, 6, [1, 1, 0, 0, 0]);
    let (release, body) = first.split_last().unwrap();
    run(&mut session, body).await;

    let cut = tokio::time::timeout(Duration::from_millis(20), session.on_frame(release)).await;
    assert!(cut.is_err());
    assert!(session.collector().is_uploading());
    assert!(session.machine().is_suspended());

    let next = simple_cycle(1000, 33, 6, [1, 1, 0, 0, 0]);
    let event = session.on_frame(&next[0]).await.unwrap();
    assert_eq!(event, CaptureEvent::Frame(FrameOutcome::Started));
    assert!(!session.collector().is_uploading());
    assert!(session.collector().samples().is_empty());
    assert!(!session.machine().is_suspended());
}
