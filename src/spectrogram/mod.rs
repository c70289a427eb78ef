mod extractor;
pub use extractor::SpectrogramExtractor;

use simple_matrix::Matrix;

/// Time-frequency matrix for one analysis window, rows ordered by time.
pub type Spectrogram = Matrix<f32>;
