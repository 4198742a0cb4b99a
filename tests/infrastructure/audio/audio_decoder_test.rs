use std::path::Path;

use tempfile::TempDir;

use whisperdesk::application::ports::SpeechModelError;
use whisperdesk::infrastructure::audio::{MediaAudioReader, TARGET_SAMPLE_RATE};

fn build_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let num_samples = samples.len() as u32;
    let byte_rate = sample_rate * 2;
    let data_size = num_samples * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

fn read_all(path: &Path, window: usize) -> Result<Vec<Vec<f32>>, SpeechModelError> {
    let mut reader = MediaAudioReader::open(path)?;
    let mut windows = Vec::new();
    while let Some(chunk) = reader.next_window(window)? {
        windows.push(chunk);
    }
    Ok(windows)
}

fn decoding_message(result: Result<Vec<Vec<f32>>, SpeechModelError>) -> String {
    match result {
        Err(SpeechModelError::DecodingFailed(message)) => message,
        other => panic!("expected decoding failure, got {:?}", other.map(|w| w.len())),
    }
}

#[test]
fn given_16khz_wav_file_when_reading_then_returns_mono_samples_in_one_window() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    let samples: Vec<i16> = (0..1600).map(|i| ((i % 100) * 100) as i16).collect();
    std::fs::write(&path, build_wav(16_000, &samples)).unwrap();

    let windows = read_all(&path, 480_000).unwrap();

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].len(), 1600);
    assert!(windows[0].iter().all(|s| (-1.0..=1.0).contains(s)));
}

#[test]
fn given_small_window_when_reading_then_samples_arrive_in_order_with_short_tail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ramp.wav");
    let samples: Vec<i16> = (0..1600).map(|i| i as i16).collect();
    std::fs::write(&path, build_wav(16_000, &samples)).unwrap();

    let windows = read_all(&path, 500).unwrap();

    let lengths: Vec<usize> = windows.iter().map(Vec::len).collect();
    assert_eq!(lengths, vec![500, 500, 500, 100]);
    let joined: Vec<f32> = windows.concat();
    assert!(joined.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn given_8khz_wav_file_when_reading_then_resamples_to_target_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("phone.wav");
    let samples: Vec<i16> = (0..8000).map(|i| ((i % 80) * 200) as i16).collect();
    std::fs::write(&path, build_wav(8_000, &samples)).unwrap();

    let windows = read_all(&path, 4_000).unwrap();

    let total: usize = windows.iter().map(Vec::len).sum();
    assert!(total <= TARGET_SAMPLE_RATE as usize);
    assert!(total >= TARGET_SAMPLE_RATE as usize - 1024);
    assert!(windows.iter().all(|w| w.len() <= 4_000));
}

#[test]
fn given_missing_file_when_opening_then_failure_names_the_file() {
    let dir = TempDir::new().unwrap();

    let message = decoding_message(read_all(&dir.path().join("absent.wav"), 1024));

    assert!(message.contains("absent.wav"));
}

#[test]
fn given_garbage_bytes_when_opening_then_failure_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("noise.mp3");
    std::fs::write(&path, b"definitely not audio").unwrap();

    let message = decoding_message(read_all(&path, 1024));

    assert!(message.contains("noise.mp3"));
}

#[test]
fn given_wav_without_samples_when_reading_then_failure_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("silent.wav");
    std::fs::write(&path, build_wav(16_000, &[])).unwrap();

    let message = decoding_message(read_all(&path, 1024));

    assert!(message.contains("silent.wav"));
}
