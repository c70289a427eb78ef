use log::debug;

use crate::error::Error;

/// Scans a merged prediction track and emits call onset times in seconds.
///
/// A call is emitted when the score exceeds the threshold and at least
/// `persistence_frames` frames have elapsed since the last emission. The
/// elapsed counter advances on every frame, above threshold or not, matching
/// the trained pipeline this detector replaces; it is a debounce on emission
/// spacing rather than an above-threshold run length.
pub fn extract_call_times(
    track: &[f32],
    threshold: f32,
    duration_seconds: f32,
    persistence_frames: usize,
) -> Result<Vec<f32>, Error> {
    if threshold <= 0. || threshold >= 1. {
        return Err(Error::InvalidArgument(format!(
            "threshold must be in range (0, 1), got {}",
            threshold
        )));
    }
    if duration_seconds <= 0. {
        return Err(Error::InvalidArgument(format!(
            "duration must be positive, got {} seconds",
            duration_seconds
        )));
    }
    let total_frames = track.len();
    let mut consecutive_frames = 0;
    let mut call_times = Vec::new();
    for (i, score) in track.iter().enumerate() {
        consecutive_frames += 1;
        if *score > threshold && consecutive_frames > persistence_frames {
            let onset_seconds =
                ((i - persistence_frames) as f32 / total_frames as f32) * duration_seconds;
            debug!(
                "call detected at frame {} ({:.2}s, score {})",
                i, onset_seconds, score
            );
            call_times.push(onset_seconds);
            consecutive_frames = 0;
        }
    }
    Ok(call_times)
}

#[test]
fn it_emits_nothing_for_a_silent_track() {
    let track = vec![0.; 2000];
    let call_times = extract_call_times(&track, 0.5, 60., 75).unwrap();
    assert!(call_times.is_empty());
}

#[test]
fn it_emits_nothing_for_an_empty_track() {
    let call_times = extract_call_times(&[], 0.5, 60., 75).unwrap();
    assert!(call_times.is_empty());
}

#[test]
fn it_applies_the_elapsed_frame_debounce_rule() {
    // Active region [100, 300) over 1375 frames. The elapsed counter starts
    // at frame 0, so the first frame of the region already satisfies the
    // persistence rule; re-emissions then need 76 further frames each.
    let mut track = vec![0.; 1375];
    for score in track[100..300].iter_mut() {
        *score = 1.;
    }
    let duration = 10.;
    let call_times = extract_call_times(&track, 0.5, duration, 75).unwrap();
    let expected_frames = [100, 176, 252];
    assert_eq!(call_times.len(), expected_frames.len());
    for (call_time, frame) in call_times.iter().zip(expected_frames) {
        let expected = ((frame - 75) as f32 / 1375.) * duration;
        assert!((call_time - expected).abs() < f32::EPSILON);
    }
}

#[test]
fn it_orders_emissions_and_spaces_them_by_the_persistence_window() {
    let mut track = vec![1.; 1000];
    for score in track[500..600].iter_mut() {
        *score = 0.;
    }
    let call_times = extract_call_times(&track, 0.5, 100., 75).unwrap();
    assert!(!call_times.is_empty());
    for pair in call_times.windows(2) {
        assert!(pair[1] > pair[0]);
        // persistence window expressed in seconds
        assert!(pair[1] - pair[0] >= (75. / 1000.) * 100. - f32::EPSILON);
    }
}

#[test]
fn it_rejects_out_of_range_thresholds() {
    assert!(extract_call_times(&[0.; 10], 0., 10., 75).is_err());
    assert!(extract_call_times(&[0.; 10], 1., 10., 75).is_err());
    assert!(extract_call_times(&[0.; 10], 1.5, 10., 75).is_err());
}

#[test]
fn it_rejects_non_positive_durations() {
    assert!(extract_call_times(&[0.; 10], 0.5, 0., 75).is_err());
    assert!(extract_call_times(&[0.; 10], 0.5, -1., 75).is_err());
}
