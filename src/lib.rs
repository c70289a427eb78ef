mod audio;
mod config;
mod constants;
mod detector;
mod error;
mod events;
mod model;
mod spectrogram;
pub use audio::WavFileReader;
pub use config::AudioConfig;
pub use config::DetectorConfig;
pub use config::OrcaspotConfig;
pub use config::SpectrogramConfig;
pub use constants::DETECTOR_SAMPLE_RATE;
pub use constants::DETECTOR_WINDOW_SAMPLES;
pub use constants::MODEL_PREDICTION_FRAMES;
pub use constants::SPECTROGRAM_FREQUENCY_BINS;
pub use constants::SPECTROGRAM_TIME_BINS;
pub use detector::Orcaspot;
pub use error::Error;
pub use events::extract_call_times;
pub use model::CallModel;
pub use spectrogram::Spectrogram;
pub use spectrogram::SpectrogramExtractor;
