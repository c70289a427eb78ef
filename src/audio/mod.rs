mod wav_file_reader;
pub use wav_file_reader::WavFileReader;
