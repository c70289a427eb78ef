/// Sample rate the detector operates at; input audio is resampled to it.
pub const DETECTOR_SAMPLE_RATE: usize = 44100;
/// Number of samples in one analysis window (10 seconds at the detector rate).
pub const DETECTOR_WINDOW_SAMPLES: usize = 441000;
/// Length in samples of one spectrogram frame.
pub const SPECTROGRAM_FRAME_LENGTH: usize = 200;
/// Advance in samples between consecutive spectrogram frames (overlap 120).
pub const SPECTROGRAM_FRAME_SHIFT: usize = 80;
/// Time bins produced for a full analysis window: (441000 - 200) / 80 + 1.
pub const SPECTROGRAM_TIME_BINS: usize = 5511;
/// Frequency bins of the one-sided power spectrum: frame_length / 2 + 1.
pub const SPECTROGRAM_FREQUENCY_BINS: usize = 101;
/// Activation frames the model emits per analysis window.
pub const MODEL_PREDICTION_FRAMES: usize = 1375;
/// Prediction track positions one window stride advances.
pub const DETECTOR_DEFAULT_PREDICTION_STRIDE: usize = 70;
/// Minimum elapsed prediction frames between consecutive emitted calls.
pub const DETECTOR_DEFAULT_PERSISTENCE_FRAMES: usize = 75;
/// Minimum activation score for a frame to count as a call.
pub const DETECTOR_DEFAULT_THRESHOLD: f32 = 0.5;
