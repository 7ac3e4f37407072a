//! End-to-end lifecycle tests: frames in, announcements, persistence and
//! final reports out, all through the public runner API.

use plank_coach::app::config::Config;
use plank_coach::coaching::CoachingRunner;
use plank_coach::feedback::MemorySpeech;
use plank_coach::pose::{BodyPart, Landmark, LandmarkFrame, LANDMARK_COUNT};
use plank_coach::session::store::{InMemorySessionStore, SessionStore};
use plank_coach::session::SessionPhase;
use plank_coach::telemetry::NullChannel;
use plank_coach::time::TimestampMs;
use plank_coach::PlankVariant;

fn ts(ms: u64) -> TimestampMs {
    TimestampMs::from_millis(ms)
}

fn set(frame: &mut LandmarkFrame, part: BodyPart, x: f64, y: f64) {
    frame.landmarks[part.index()] = Landmark::new(x, y, 0.95);
}

/// Side-on straight-arm plank with a flat body line.
fn good_frame(at: u64) -> LandmarkFrame {
    let mut frame = LandmarkFrame::new(ts(at), vec![Landmark::new(0.5, 0.5, 0.1); LANDMARK_COUNT]);
    set(&mut frame, BodyPart::RightShoulder, 0.2, 0.3);
    set(&mut frame, BodyPart::RightHip, 0.5, 0.3);
    set(&mut frame, BodyPart::RightKnee, 0.65, 0.3);
    set(&mut frame, BodyPart::RightAnkle, 0.8, 0.3);
    set(&mut frame, BodyPart::RightElbow, 0.2, 0.45);
    set(&mut frame, BodyPart::RightWrist, 0.2, 0.6);
    frame
}

/// Same plank with the hip collapsed: alignment and knee both go red.
fn sagging_frame(at: u64) -> LandmarkFrame {
    let mut frame = good_frame(at);
    set(&mut frame, BodyPart::RightHip, 0.5, 0.5);
    frame
}

/// Forearm plank: upper arm vertical, forearm flat on the ground.
fn elbow_frame(at: u64) -> LandmarkFrame {
    let mut frame = good_frame(at);
    set(&mut frame, BodyPart::RightElbow, 0.2, 0.6);
    set(&mut frame, BodyPart::RightWrist, 0.05, 0.6);
    frame
}

type Runner = CoachingRunner<MemorySpeech, NullChannel, InMemorySessionStore>;

fn runner() -> Runner {
    CoachingRunner::new(
        Config::default(),
        MemorySpeech::new(),
        NullChannel,
        InMemorySessionStore::new(),
    )
}

/// Feed frames at 100ms cadence until the timer runs. Returns the current
/// timestamp.
fn drive_to_timer(r: &mut Runner, frame_fn: fn(u64) -> LandmarkFrame) -> u64 {
    let mut t = 0;
    while r.phase() != SessionPhase::Active {
        r.on_frame(&frame_fn(t), ts(t));
        t += 100;
        assert!(t < 5_000, "session never activated");
    }
    t += 1_500;
    r.poll(ts(t));
    t
}

#[test]
fn high_plank_session_runs_to_manual_stop() {
    let mut r = runner();
    let t0 = drive_to_timer(&mut r, good_frame);

    // Hold for half a minute of clean frames
    for i in 0..300 {
        let t = t0 + i * 100;
        r.on_frame(&good_frame(t), ts(t));
    }

    let report = r.stop(ts(t0 + 30_000)).expect("session in progress");
    assert_eq!(report.variant, PlankVariant::High);
    assert_eq!(report.duration_secs, 30);
    assert_eq!(report.body_alignment_score, 100);
    assert_eq!(report.knee_position_score, 100);
    assert_eq!(report.shoulder_stack_score, 100);
    assert_eq!(report.overall_score, 100);
    assert_eq!(r.phase(), SessionPhase::Stopped);
}

#[test]
fn elbow_plank_is_identified_as_such() {
    let mut r = runner();
    drive_to_timer(&mut r, elbow_frame);
    assert!(r.speech().spoke("Elbow plank identified"));
}

#[test]
fn unstable_variant_never_starts_a_session() {
    let mut r = runner();
    // Alternate variants every 300ms; the stability window never fills
    for i in 0..30 {
        let t = i * 300;
        let frame = if i % 2 == 0 {
            good_frame(t)
        } else {
            elbow_frame(t)
        };
        r.on_frame(&frame, ts(t));
    }
    assert_eq!(r.phase(), SessionPhase::Identifying);
    assert!(r.session_id().is_none());
}

#[test]
fn sustained_form_failure_auto_stops() {
    let mut r = runner();
    let t0 = drive_to_timer(&mut r, good_frame);

    // Collapse and hold it past the failure window plus the stop grace
    let mut t = t0;
    while r.phase() != SessionPhase::Stopped {
        r.on_frame(&sagging_frame(t), ts(t));
        t += 100;
        assert!(t < t0 + 10_000, "auto stop never fired");
    }

    assert!(r.speech().spoke("Form broken - session ending"));
    assert!(r.speech().spoke("Session completed"));
    let report = r.last_report().expect("report produced");
    assert!(report.overall_score < 100);
}

#[test]
fn brief_collapse_does_not_end_session() {
    let mut r = runner();
    let t0 = drive_to_timer(&mut r, good_frame);

    // 1.5s of bad form, then recovery, repeatedly
    let mut t = t0;
    for _ in 0..3 {
        for _ in 0..15 {
            r.on_frame(&sagging_frame(t), ts(t));
            t += 100;
        }
        for _ in 0..5 {
            r.on_frame(&good_frame(t), ts(t));
            t += 100;
        }
    }
    assert_eq!(r.phase(), SessionPhase::Active);
}

#[test]
fn elapsed_callouts_arrive_on_ten_second_boundaries() {
    let mut r = runner();
    let t0 = drive_to_timer(&mut r, good_frame);

    for i in 0..260 {
        let t = t0 + i * 100;
        r.on_frame(&good_frame(t), ts(t));
    }

    assert!(r.speech().spoke("10 seconds completed. Keep holding!"));
    assert!(r.speech().spoke("20 seconds completed. Keep holding!"));
    // Each boundary announced exactly once
    let tens = r
        .speech()
        .utterances
        .iter()
        .filter(|(m, _)| m == "10 seconds completed. Keep holding!")
        .count();
    assert_eq!(tens, 1);
}

#[test]
fn pause_excludes_held_time_from_duration() {
    let mut r = runner();
    let t0 = drive_to_timer(&mut r, good_frame);

    r.on_frame(&good_frame(t0), ts(t0));
    r.pause(ts(t0 + 10_000));
    r.resume(ts(t0 + 40_000));

    let report = r.stop(ts(t0 + 50_000)).unwrap();
    // 10s before the pause + 10s after the resume
    assert_eq!(report.duration_secs, 20);
}

#[test]
fn session_record_matches_report() {
    let mut r = runner();
    let t0 = drive_to_timer(&mut r, good_frame);
    r.on_frame(&good_frame(t0), ts(t0));

    let report = r.stop(ts(t0 + 15_000)).unwrap();
    let id = r.session_id().unwrap();
    let session = r.store().get_session(id).unwrap().unwrap();

    assert!(session.completed);
    assert_eq!(session.duration_secs, report.duration_secs);
    assert_eq!(session.report.as_ref().unwrap(), &report);
}

#[test]
fn occluded_body_stays_in_detection() {
    let mut r = runner();
    // A body is present but every landmark is below the visibility floor:
    // nothing recognizable is in frame, so detection must not advance
    for i in 0..30 {
        let t = i * 100;
        let frame =
            LandmarkFrame::new(ts(t), vec![Landmark::new(0.5, 0.5, 0.1); LANDMARK_COUNT]);
        r.on_frame(&frame, ts(t));
    }
    assert_eq!(r.phase(), SessionPhase::Detecting);
}

#[test]
fn session_analysis_rows_are_persisted() {
    let mut r = runner();
    let t0 = drive_to_timer(&mut r, good_frame);
    for i in 0..50 {
        let t = t0 + i * 100;
        r.on_frame(&good_frame(t), ts(t));
    }
    r.stop(ts(t0 + 5_000));

    let id = r.session_id().unwrap();
    let rows = r.store().get_session_analysis(id).unwrap();
    assert_eq!(rows.len(), 50);
    assert!(rows.iter().all(|row| row.variant == PlankVariant::High));
}
