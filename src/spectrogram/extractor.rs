use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex32, Fft, FftPlanner};
use simple_matrix::Matrix;

use super::Spectrogram;

/// Computes the time-frequency matrix the model was trained on: Hann windowed
/// frames advanced by a fixed shift, one-sided power spectrum per frame.
pub struct SpectrogramExtractor {
    frame_length: usize,
    frame_shift: usize,
    frequency_bins: usize,
    hann_window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl SpectrogramExtractor {
    pub fn new(frame_length: usize, frame_shift: usize) -> SpectrogramExtractor {
        let mut planner = FftPlanner::new();
        SpectrogramExtractor {
            frame_length,
            frame_shift,
            frequency_bins: frame_length / 2 + 1,
            hann_window: Self::new_hann_window(frame_length),
            fft: planner.plan_fft_forward(frame_length),
        }
    }
    pub fn get_frequency_bins(&self) -> usize {
        self.frequency_bins
    }
    /// Frames produced for a signal of the given length.
    pub fn get_time_bins(&self, num_samples: usize) -> usize {
        if num_samples < self.frame_length {
            0
        } else {
            (num_samples - self.frame_length) / self.frame_shift + 1
        }
    }
    pub fn compute(&self, samples: &[f32]) -> Spectrogram {
        let time_bins = self.get_time_bins(samples.len());
        let power_values = (0..time_bins).flat_map(|frame_index| {
            let frame_start = frame_index * self.frame_shift;
            self.calculate_power_spectrum(&samples[frame_start..frame_start + self.frame_length])
        });
        Matrix::from_iter(time_bins, self.frequency_bins, power_values)
    }
    fn calculate_power_spectrum(&self, audio_frame: &[f32]) -> Vec<f32> {
        let mut buffer = audio_frame
            .iter()
            .zip(self.hann_window.iter())
            .map(|(sample, window)| Complex32 {
                re: sample * window,
                im: 0.,
            })
            .collect::<Vec<_>>();
        self.fft.process(&mut buffer);
        (0..self.frequency_bins)
            .map(|i| (buffer[i].re * buffer[i].re) + (buffer[i].im * buffer[i].im))
            .collect()
    }
    fn new_hann_window(frame_length: usize) -> Vec<f32> {
        let ns_minus_1 = frame_length - 1;
        (0..frame_length)
            .map(|s| 0.5 - (0.5 * (2. * PI * (s as f32 / ns_minus_1 as f32)).cos()))
            .collect()
    }
}

#[test]
fn it_produces_the_expected_matrix_shape() {
    let extractor = SpectrogramExtractor::new(200, 80);
    let samples = vec![0.; 441000];
    let spectrogram = extractor.compute(&samples);
    assert_eq!(spectrogram.rows(), 5511);
    assert_eq!(spectrogram.cols(), 101);
}

#[test]
fn it_produces_no_frames_for_short_signals() {
    let extractor = SpectrogramExtractor::new(200, 80);
    assert_eq!(extractor.get_time_bins(199), 0);
    assert_eq!(extractor.get_time_bins(200), 1);
    assert_eq!(extractor.get_time_bins(280), 2);
}

#[test]
fn it_concentrates_tone_energy_in_the_expected_bin() {
    let frame_length = 200;
    let sample_rate = 8000.;
    let extractor = SpectrogramExtractor::new(frame_length, 80);
    // 400 Hz tone lands on bin 10 with a 200 sample frame at 8 kHz.
    let samples: Vec<f32> = (0..800)
        .map(|i| (2. * PI * 400. * i as f32 / sample_rate).sin())
        .collect();
    let spectrogram = extractor.compute(&samples);
    let peak_bin = (0..spectrogram.cols())
        .max_by(|a, b| {
            spectrogram
                .get(0, *a)
                .unwrap()
                .total_cmp(spectrogram.get(0, *b).unwrap())
        })
        .unwrap();
    assert_eq!(peak_bin, 10);
}
