use crate::constants::{
    DETECTOR_DEFAULT_PERSISTENCE_FRAMES, DETECTOR_DEFAULT_PREDICTION_STRIDE,
    DETECTOR_DEFAULT_THRESHOLD, DETECTOR_SAMPLE_RATE, DETECTOR_WINDOW_SAMPLES,
    MODEL_PREDICTION_FRAMES, SPECTROGRAM_FRAME_LENGTH, SPECTROGRAM_FRAME_SHIFT,
};

/// Configures the audio standardization applied before detection.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Sample rate the detector operates at. Input audio at a different rate
    /// is resampled to it.
    pub sample_rate: usize,
    /// Apply peak normalization to the standardized samples.
    pub normalize: bool,
}
impl Default for AudioConfig {
    fn default() -> AudioConfig {
        AudioConfig {
            sample_rate: DETECTOR_SAMPLE_RATE,
            normalize: true,
        }
    }
}

/// Configures the spectrogram computed for each analysis window.
///
/// These parameters are coupled to the trained model architecture; changing
/// them requires a model trained on matching spectrograms.
#[derive(Debug, Clone)]
pub struct SpectrogramConfig {
    /// Samples per spectrogram frame.
    pub frame_length: usize,
    /// Sample advance between consecutive frames.
    pub frame_shift: usize,
}
impl Default for SpectrogramConfig {
    fn default() -> SpectrogramConfig {
        SpectrogramConfig {
            frame_length: SPECTROGRAM_FRAME_LENGTH,
            frame_shift: SPECTROGRAM_FRAME_SHIFT,
        }
    }
}

/// Configures the sliding window detector and the call time extraction.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Samples in one analysis window.
    pub window_samples: usize,
    /// Activation frames the model emits per analysis window.
    pub prediction_frames: usize,
    /// Prediction track positions one window stride advances.
    pub prediction_stride: usize,
    /// Minimum elapsed prediction frames between consecutive emitted calls.
    pub persistence_frames: usize,
    /// Minimum activation score for a frame to count as a call, in range (0, 1).
    pub threshold: f32,
}
impl Default for DetectorConfig {
    fn default() -> DetectorConfig {
        DetectorConfig {
            window_samples: DETECTOR_WINDOW_SAMPLES,
            prediction_frames: MODEL_PREDICTION_FRAMES,
            prediction_stride: DETECTOR_DEFAULT_PREDICTION_STRIDE,
            persistence_frames: DETECTOR_DEFAULT_PERSISTENCE_FRAMES,
            threshold: DETECTOR_DEFAULT_THRESHOLD,
        }
    }
}

/// Encapsulates all the tool configurations.
#[derive(Debug, Clone, Default)]
pub struct OrcaspotConfig {
    /// Configures the input audio standardization.
    pub audio: AudioConfig,
    /// Configures the per window spectrogram.
    pub spectrogram: SpectrogramConfig,
    /// Configures detection and call time extraction.
    pub detector: DetectorConfig,
}
