use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::warn;
use rubato::{FftFixedInOut, Resampler};

use crate::config::AudioConfig;
use crate::error::Error;

/// Reads a wav file into the standardized detector format: mono f32 samples
/// at the detector sample rate, optionally peak normalized.
pub struct WavFileReader {}

impl WavFileReader {
    /// Returns the standardized samples and the source duration in seconds.
    pub fn read_samples(path: &Path, config: &AudioConfig) -> Result<(Vec<f32>, f32), Error> {
        let wav_reader = WavReader::open(path)?;
        let spec = wav_reader.spec();
        let duration_seconds = wav_reader.duration() as f32 / spec.sample_rate as f32;
        let float_samples = match spec.sample_format {
            SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                wav_reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 / full_scale))
                    .collect::<Result<Vec<f32>, hound::Error>>()?
            }
            SampleFormat::Float => wav_reader
                .into_samples::<f32>()
                .collect::<Result<Vec<f32>, hound::Error>>()?,
        };
        let mono_samples = mixdown_to_mono(float_samples, spec.channels);
        let mut samples = if spec.sample_rate as usize != config.sample_rate {
            resample(mono_samples, spec.sample_rate as usize, config.sample_rate)?
        } else {
            mono_samples
        };
        if config.normalize {
            peak_normalize(&mut samples);
        }
        Ok((samples, duration_seconds))
    }
}

fn mixdown_to_mono(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks_exact(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn resample(samples: Vec<f32>, source_rate: usize, target_rate: usize) -> Result<Vec<f32>, Error> {
    let mut resampler = FftFixedInOut::<f32>::new(source_rate, target_rate, source_rate / 10, 1)
        .map_err(|err| Error::Resample(err.to_string()))?;
    let input_frames = resampler.input_frames_next();
    let mut waves_out = resampler.output_buffer_allocate(true);
    let mut resampled = Vec::new();
    let mut chunks = samples.chunks_exact(input_frames);
    for chunk in &mut chunks {
        let waves_in = [chunk];
        resampler
            .process_into_buffer(&waves_in, &mut waves_out, None)
            .map_err(|err| Error::Resample(err.to_string()))?;
        resampled.extend_from_slice(&waves_out[0]);
    }
    let remainder = chunks.remainder().len();
    if remainder > 0 {
        warn!(
            "dropped {} trailing samples not filling a resampler chunk",
            remainder
        );
    }
    Ok(resampled)
}

fn peak_normalize(samples: &mut [f32]) {
    let peak = samples.iter().fold(0_f32, |max, s| max.max(s.abs()));
    if peak > 0. {
        let gain = 1. / peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

#[cfg(test)]
fn write_test_wav(name: &str, spec: hound::WavSpec, samples: &[f32]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for sample in samples {
        match spec.sample_format {
            SampleFormat::Float => writer.write_sample(*sample).unwrap(),
            SampleFormat::Int => writer
                .write_sample((*sample * i16::MAX as f32) as i16)
                .unwrap(),
        }
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn it_reads_mono_int_samples_at_the_detector_rate() {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let source: Vec<f32> = (0..4410).map(|i| (i as f32 / 4410.) - 0.5).collect();
    let path = write_test_wav("orcaspot_mono_int.wav", spec, &source);
    let config = AudioConfig {
        sample_rate: 44100,
        normalize: false,
    };
    let (samples, duration) = WavFileReader::read_samples(&path, &config).unwrap();
    assert_eq!(samples.len(), source.len());
    assert!((duration - 0.1).abs() < 1e-6);
    for (read, expected) in samples.iter().zip(source) {
        assert!((read - expected).abs() < 1e-3);
    }
}

#[test]
fn it_mixes_stereo_down_to_mono_by_averaging() {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    // interleaved frames (0.2, 0.6) average to 0.4
    let source: Vec<f32> = [0.2, 0.6].repeat(1000);
    let path = write_test_wav("orcaspot_stereo.wav", spec, &source);
    let config = AudioConfig {
        sample_rate: 44100,
        normalize: false,
    };
    let (samples, _) = WavFileReader::read_samples(&path, &config).unwrap();
    assert_eq!(samples.len(), 1000);
    assert!(samples.iter().all(|s| (s - 0.4).abs() < 1e-6));
}

#[test]
fn it_normalizes_the_peak_to_full_scale() {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let source = vec![0.1, -0.25, 0.2, 0.05];
    let path = write_test_wav("orcaspot_normalize.wav", spec, &source);
    let config = AudioConfig {
        sample_rate: 44100,
        normalize: true,
    };
    let (samples, _) = WavFileReader::read_samples(&path, &config).unwrap();
    let peak = samples.iter().fold(0_f32, |max, s| max.max(s.abs()));
    assert!((peak - 1.).abs() < 1e-6);
}

#[test]
fn it_resamples_to_the_detector_rate() {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let source: Vec<f32> = (0..22050)
        .map(|i| (2. * std::f32::consts::PI * 220. * i as f32 / 22050.).sin())
        .collect();
    let path = write_test_wav("orcaspot_resample.wav", spec, &source);
    let config = AudioConfig {
        sample_rate: 44100,
        normalize: false,
    };
    let (samples, duration) = WavFileReader::read_samples(&path, &config).unwrap();
    assert!((duration - 1.).abs() < 1e-6);
    // chunked resampling may drop a partial trailing chunk
    assert!(samples.len() <= 44100);
    assert!(samples.len() >= 44100 - 2 * 2205);
}
