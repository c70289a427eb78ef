use crate::spectrogram::Spectrogram;

/// Frame level call classifier.
///
/// The detector treats the model as opaque: any implementation that scores a
/// batch of spectrograms can be plugged in, which also allows scripted test
/// doubles.
pub trait CallModel: Send {
    /// Scores a batch of spectrograms.
    ///
    /// For each input spectrogram the output must contain one activation
    /// sequence of exactly `prediction_frames` scores in range 0 - 1, ordered
    /// by time.
    fn predict(&self, batch: &[Spectrogram]) -> Result<Vec<Vec<f32>>, String>;
}
