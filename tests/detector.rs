use std::sync::Mutex;

use orcaspot::{
    CallModel, DetectorConfig, Error, Orcaspot, OrcaspotConfig, Spectrogram,
    MODEL_PREDICTION_FRAMES,
};

/// Model double that replays scripted per window activation sequences.
struct ScriptedModel {
    window_scores: Mutex<Vec<Vec<f32>>>,
}

impl ScriptedModel {
    fn new(window_scores: Vec<Vec<f32>>) -> Box<ScriptedModel> {
        Box::new(ScriptedModel {
            window_scores: Mutex::new(window_scores),
        })
    }
    fn constant(score: f32, windows: usize) -> Box<ScriptedModel> {
        Self::new(vec![vec![score; MODEL_PREDICTION_FRAMES]; windows])
    }
}

impl CallModel for ScriptedModel {
    fn predict(&self, batch: &[Spectrogram]) -> Result<Vec<Vec<f32>>, String> {
        let mut window_scores = self.window_scores.lock().unwrap();
        batch
            .iter()
            .map(|_| {
                if window_scores.is_empty() {
                    Err("script exhausted".to_string())
                } else {
                    Ok(window_scores.remove(0))
                }
            })
            .collect()
    }
}

struct FailingModel {}

impl CallModel for FailingModel {
    fn predict(&self, _batch: &[Spectrogram]) -> Result<Vec<Vec<f32>>, String> {
        Err("weights not loaded".to_string())
    }
}

fn ten_second_tone() -> Vec<f32> {
    (0..441000)
        .map(|i| (2. * std::f32::consts::PI * 500. * i as f32 / 44100.).sin() * 0.5)
        .collect()
}

#[test]
fn it_sizes_the_prediction_track_from_the_window_count() {
    simple_logger::SimpleLogger::new().init().ok();
    let mut samples = ten_second_tone();
    samples.extend_from_slice(&[0.1; 140]);
    let spotter = Orcaspot::new(
        &OrcaspotConfig::default(),
        ScriptedModel::constant(0.1, 2),
    )
    .unwrap();
    // 441140 samples pad to 485100, giving 2 windows at a 1 second stride
    let track = spotter.detect_calls(&samples, 1.).unwrap();
    assert_eq!(track.len(), 1445);
}

#[test]
fn it_merges_overlapping_windows_by_maximum() {
    let mut samples = ten_second_tone();
    samples.extend_from_slice(&[0.1; 140]);
    let spotter = Orcaspot::new(
        &OrcaspotConfig::default(),
        ScriptedModel::new(vec![
            vec![0.3; MODEL_PREDICTION_FRAMES],
            vec![0.6; MODEL_PREDICTION_FRAMES],
        ]),
    )
    .unwrap();
    let track = spotter.detect_calls(&samples, 1.).unwrap();
    // the second window starts 70 track positions in and wins every overlap
    assert!(track[..70].iter().all(|score| *score == 0.3));
    assert!(track[70..].iter().all(|score| *score == 0.6));
}

#[test]
fn it_produces_identical_tracks_across_runs() {
    let samples = ten_second_tone();
    let scores: Vec<f32> = (0..MODEL_PREDICTION_FRAMES)
        .map(|i| (i as f32 / MODEL_PREDICTION_FRAMES as f32))
        .collect();
    let run = |scores: Vec<f32>| {
        Orcaspot::new(&OrcaspotConfig::default(), ScriptedModel::new(vec![scores]))
            .unwrap()
            .detect_calls(&samples, 1.)
            .unwrap()
    };
    assert_eq!(run(scores.clone()), run(scores));
}

#[test]
fn it_extracts_call_times_from_a_detection() {
    let samples = ten_second_tone();
    let mut scores = vec![0.; MODEL_PREDICTION_FRAMES];
    for score in scores[200..400].iter_mut() {
        *score = 0.9;
    }
    let spotter =
        Orcaspot::new(&OrcaspotConfig::default(), ScriptedModel::new(vec![scores])).unwrap();
    let track = spotter.detect_calls(&samples, 1.).unwrap();
    let call_times = spotter.predict_call_times(&track, 10.).unwrap();
    // the elapsed frame debounce fires at frames 200, 276 and 352, each
    // reported 75 frames back
    let expected: Vec<f32> = [125., 201., 277.]
        .iter()
        .map(|frame| (frame / 1375.) * 10.)
        .collect();
    assert_eq!(call_times.len(), expected.len());
    for (call_time, expected_time) in call_times.iter().zip(expected) {
        assert!((call_time - expected_time).abs() < 1e-4);
    }
}

#[test]
fn it_rejects_empty_signals_and_non_positive_strides() {
    let spotter = Orcaspot::new(
        &OrcaspotConfig::default(),
        ScriptedModel::constant(0., 1),
    )
    .unwrap();
    assert!(matches!(
        spotter.detect_calls(&[], 1.),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        spotter.detect_calls(&[0.; 10], 0.),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        spotter.detect_calls(&[0.; 10], -1.),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn it_reports_the_window_a_model_failure_happened_on() {
    let mut samples = ten_second_tone();
    samples.extend_from_slice(&[0.1; 140]);
    let spotter = Orcaspot::new(
        &OrcaspotConfig::default(),
        // script only covers the first of the two windows
        ScriptedModel::constant(0.2, 1),
    )
    .unwrap();
    match spotter.detect_calls(&samples, 1.) {
        Err(Error::ModelInference { window, .. }) => assert_eq!(window, 1),
        other => panic!("expected a model inference error, got {:?}", other.map(|t| t.len())),
    }
    let failing_spotter =
        Orcaspot::new(&OrcaspotConfig::default(), Box::new(FailingModel {})).unwrap();
    match failing_spotter.detect_calls(&ten_second_tone(), 1.) {
        Err(Error::ModelInference { window, message }) => {
            assert_eq!(window, 0);
            assert_eq!(message, "weights not loaded");
        }
        other => panic!("expected a model inference error, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn it_rejects_models_with_the_wrong_frame_count() {
    let spotter = Orcaspot::new(
        &OrcaspotConfig::default(),
        ScriptedModel::new(vec![vec![0.5; 100]]),
    )
    .unwrap();
    match spotter.detect_calls(&ten_second_tone(), 1.) {
        Err(Error::ModelInference { window, message }) => {
            assert_eq!(window, 0);
            assert!(message.contains("expected 1375"));
        }
        other => panic!("expected a model inference error, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn it_rejects_invalid_configurations() {
    let mut config = OrcaspotConfig::default();
    config.detector.threshold = 1.5;
    assert!(Orcaspot::new(&config, ScriptedModel::constant(0., 1)).is_err());
    let mut config = OrcaspotConfig::default();
    config.detector.prediction_stride = 0;
    assert!(Orcaspot::new(&config, ScriptedModel::constant(0., 1)).is_err());
    let config = OrcaspotConfig {
        detector: DetectorConfig {
            window_samples: 100,
            ..DetectorConfig::default()
        },
        ..OrcaspotConfig::default()
    };
    assert!(Orcaspot::new(&config, ScriptedModel::constant(0., 1)).is_err());
}

#[test]
fn it_detects_calls_in_a_wav_file() {
    let path = std::env::temp_dir().join("orcaspot_detect_file.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for sample in ten_second_tone() {
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let mut scores = vec![0.; MODEL_PREDICTION_FRAMES];
    for score in scores[600..700].iter_mut() {
        *score = 0.95;
    }
    let spotter =
        Orcaspot::new(&OrcaspotConfig::default(), ScriptedModel::new(vec![scores])).unwrap();
    let call_times = spotter.process_file(&path, 1.).unwrap();
    assert_eq!(call_times.len(), 2);
    assert!((call_times[0] - ((600. - 75.) / 1375.) * 10.).abs() < 1e-3);
    assert!(call_times[1] > call_times[0]);
}
