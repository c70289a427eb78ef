use std::path::Path;

use log::debug;

use crate::audio::WavFileReader;
use crate::config::OrcaspotConfig;
use crate::error::Error;
use crate::events::extract_call_times;
use crate::model::CallModel;
use crate::spectrogram::SpectrogramExtractor;

/// An orca call spotter.
///
/// Walks a recording with a fixed size analysis window advanced by a caller
/// chosen stride, scores each window with the injected model and merges the
/// overlapping per frame activations into one global prediction track, from
/// which call onset times are extracted.
pub struct Orcaspot {
    config: OrcaspotConfig,
    extractor: SpectrogramExtractor,
    model: Box<dyn CallModel>,
}

impl Orcaspot {
    pub fn new(config: &OrcaspotConfig, model: Box<dyn CallModel>) -> Result<Orcaspot, Error> {
        validate_config(config)?;
        Ok(Orcaspot {
            extractor: SpectrogramExtractor::new(
                config.spectrogram.frame_length,
                config.spectrogram.frame_shift,
            ),
            config: config.clone(),
            model,
        })
    }
    /// Detects orca calls in a wav file, returning onset times in seconds.
    pub fn process_file<P: AsRef<Path>>(
        &self,
        path: P,
        stride_seconds: f32,
    ) -> Result<Vec<f32>, Error> {
        let (samples, duration_seconds) =
            WavFileReader::read_samples(path.as_ref(), &self.config.audio)?;
        let track = self.detect_calls(&samples, stride_seconds)?;
        self.predict_call_times(&track, duration_seconds)
    }
    /// Runs the model over sliding windows of the signal and returns the
    /// merged global prediction track.
    ///
    /// Detection is all or nothing: a model failure on any window fails the
    /// whole call.
    pub fn detect_calls(&self, samples: &[f32], stride_seconds: f32) -> Result<Vec<f32>, Error> {
        if samples.is_empty() {
            return Err(Error::InvalidArgument("signal is empty".to_string()));
        }
        if stride_seconds <= 0. {
            return Err(Error::InvalidArgument(format!(
                "stride must be positive, got {} seconds",
                stride_seconds
            )));
        }
        let detector = &self.config.detector;
        let stride = (stride_seconds * self.config.audio.sample_rate as f32).round() as usize;
        let padded = pad_signal(samples, stride, detector.window_samples)?;
        let num_windows = (padded.len() - detector.window_samples) / stride + 1;
        let track_len = (num_windows - 1) * detector.prediction_stride + detector.prediction_frames;
        debug!(
            "scoring {} windows of {} samples, stride {} samples, track length {}",
            num_windows, detector.window_samples, stride, track_len
        );
        let mut track = vec![0.; track_len];
        for window_index in 0..num_windows {
            let window_start = window_index * stride;
            let window = &padded[window_start..window_start + detector.window_samples];
            let spectrogram = self.extractor.compute(window);
            let mut batch_scores = self
                .model
                .predict(std::slice::from_ref(&spectrogram))
                .map_err(|message| Error::ModelInference {
                    window: window_index,
                    message,
                })?;
            if batch_scores.len() != 1 {
                return Err(Error::ModelInference {
                    window: window_index,
                    message: format!(
                        "expected 1 activation sequence, got {}",
                        batch_scores.len()
                    ),
                });
            }
            let scores = batch_scores.swap_remove(0);
            if scores.len() != detector.prediction_frames {
                return Err(Error::ModelInference {
                    window: window_index,
                    message: format!(
                        "expected {} activation frames, got {}",
                        detector.prediction_frames,
                        scores.len()
                    ),
                });
            }
            merge_window_scores(
                &mut track,
                window_index * detector.prediction_stride,
                &scores,
            );
        }
        Ok(track)
    }
    /// Extracts call onset times from a prediction track, using the configured
    /// threshold and persistence window.
    pub fn predict_call_times(
        &self,
        track: &[f32],
        duration_seconds: f32,
    ) -> Result<Vec<f32>, Error> {
        extract_call_times(
            track,
            self.config.detector.threshold,
            duration_seconds,
            self.config.detector.persistence_frames,
        )
    }
}

/// Extends the signal with trailing zeros so that the last analysis window
/// ends exactly at the padded signal end.
///
/// Postcondition: `(padded_len - window_samples) % stride == 0` and
/// `padded_len >= window_samples`.
pub(crate) fn pad_signal(
    samples: &[f32],
    stride: usize,
    window_samples: usize,
) -> Result<Vec<f32>, Error> {
    if stride == 0 {
        return Err(Error::InvalidArgument(
            "stride must be positive".to_string(),
        ));
    }
    let target_len = if samples.len() >= window_samples {
        let strides = (samples.len() - window_samples + stride - 1) / stride;
        window_samples + strides * stride
    } else {
        window_samples
    };
    let mut padded = Vec::with_capacity(target_len);
    padded.extend_from_slice(samples);
    padded.resize(target_len, 0.);
    Ok(padded)
}

/// Merges one window's activations into the global track by position-wise
/// maximum. Max is commutative and associative, so the merge result does not
/// depend on window order.
pub(crate) fn merge_window_scores(track: &mut [f32], offset: usize, scores: &[f32]) {
    for (position, score) in scores.iter().enumerate() {
        if track[offset + position] < *score {
            track[offset + position] = *score;
        }
    }
}

fn validate_config(config: &OrcaspotConfig) -> Result<(), Error> {
    if config.audio.sample_rate == 0 {
        return Err(Error::InvalidArgument(
            "sample rate must be positive".to_string(),
        ));
    }
    if config.detector.window_samples == 0 {
        return Err(Error::InvalidArgument(
            "window size must be positive".to_string(),
        ));
    }
    if config.detector.prediction_frames == 0 || config.detector.prediction_stride == 0 {
        return Err(Error::InvalidArgument(
            "prediction frames and prediction stride must be positive".to_string(),
        ));
    }
    if config.detector.threshold <= 0. || config.detector.threshold >= 1. {
        return Err(Error::InvalidArgument(format!(
            "threshold must be in range (0, 1), got {}",
            config.detector.threshold
        )));
    }
    if config.spectrogram.frame_length == 0 || config.spectrogram.frame_shift == 0 {
        return Err(Error::InvalidArgument(
            "spectrogram frame length and shift must be positive".to_string(),
        ));
    }
    if config.detector.window_samples < config.spectrogram.frame_length {
        return Err(Error::InvalidArgument(
            "window must fit at least one spectrogram frame".to_string(),
        ));
    }
    Ok(())
}

#[test]
fn it_pads_long_signals_to_a_whole_number_of_strides() {
    let window_samples = 441000;
    let stride = 44100;
    let samples = vec![1.; window_samples + 140];
    let padded = pad_signal(&samples, stride, window_samples).unwrap();
    assert_eq!(padded.len(), 485100);
    assert_eq!((padded.len() - window_samples) % stride, 0);
    assert!(padded.len() >= samples.len());
    assert_eq!(&padded[..samples.len()], &samples[..]);
    assert!(padded[samples.len()..].iter().all(|s| *s == 0.));
}

#[test]
fn it_pads_short_signals_to_exactly_one_window() {
    let window_samples = 441000;
    let samples = vec![0.25; 1000];
    let padded = pad_signal(&samples, 44100, window_samples).unwrap();
    assert_eq!(padded.len(), window_samples);
    assert_eq!(&padded[..samples.len()], &samples[..]);
    assert!(padded[samples.len()..].iter().all(|s| *s == 0.));
}

#[test]
fn it_does_not_pad_signals_already_aligned() {
    let window_samples = 441000;
    let stride = 44100;
    let samples = vec![0.5; window_samples + 2 * stride];
    let padded = pad_signal(&samples, stride, window_samples).unwrap();
    assert_eq!(padded.len(), samples.len());
}

#[test]
fn it_rejects_a_zero_stride() {
    assert!(pad_signal(&[0.; 10], 0, 441000).is_err());
}

#[test]
fn it_merges_windows_in_any_order_identically() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
    let mut rng = StdRng::seed_from_u64(7);
    let prediction_stride = 70;
    let prediction_frames = 1375;
    let num_windows = 8;
    let window_scores: Vec<Vec<f32>> = (0..num_windows)
        .map(|_| (0..prediction_frames).map(|_| rng.gen::<f32>()).collect())
        .collect();
    let track_len = (num_windows - 1) * prediction_stride + prediction_frames;
    let mut sequential_track = vec![0.; track_len];
    for (window_index, scores) in window_scores.iter().enumerate() {
        merge_window_scores(
            &mut sequential_track,
            window_index * prediction_stride,
            scores,
        );
    }
    let mut order: Vec<usize> = (0..num_windows).collect();
    order.shuffle(&mut rng);
    let mut shuffled_track = vec![0.; track_len];
    for window_index in order {
        merge_window_scores(
            &mut shuffled_track,
            window_index * prediction_stride,
            &window_scores[window_index],
        );
    }
    assert_eq!(sequential_track, shuffled_track);
}

#[test]
fn it_keeps_the_highest_score_on_overlap() {
    let mut track = vec![0.; 10];
    merge_window_scores(&mut track, 0, &[0.2, 0.9, 0.1]);
    merge_window_scores(&mut track, 1, &[0.3, 0.3, 0.3]);
    assert_eq!(&track[..4], &[0.2, 0.9, 0.3, 0.3]);
}
