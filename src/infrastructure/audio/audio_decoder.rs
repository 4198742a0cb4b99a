use std::fs::File;
use std::path::{Path, PathBuf};

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::SpeechModelError;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

const RESAMPLER_CHUNK_FRAMES: usize = 1024;

/// Pulls the audio track of an uploaded media file as 16kHz mono PCM, one
/// window at a time, so long recordings never sit in memory whole.
///
/// Video containers are accepted as long as they carry an audio track.
pub struct MediaAudioReader {
    path: PathBuf,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    channels: usize,
    resampler: Option<StreamResampler>,
    pending: Vec<f32>,
    emitted: usize,
    exhausted: bool,
}

impl MediaAudioReader {
    pub fn open(path: &Path) -> Result<Self, SpeechModelError> {
        let file = File::open(path).map_err(|e| decoding_failed(path, format!("open: {}", e)))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| decoding_failed(path, format!("unrecognized container: {}", e)))?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|track| {
                track.codec_params.codec != CODEC_TYPE_NULL
                    && track.codec_params.sample_rate.is_some()
            })
            .ok_or_else(|| decoding_failed(path, "media has no audio track"))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let source_rate = codec_params
            .sample_rate
            .ok_or_else(|| decoding_failed(path, "audio track has no sample rate"))?;
        let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1).max(1);

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| decoding_failed(path, format!("unsupported codec: {}", e)))?;

        let resampler = if source_rate == TARGET_SAMPLE_RATE {
            None
        } else {
            Some(StreamResampler::new(source_rate, TARGET_SAMPLE_RATE).map_err(|e| {
                decoding_failed(path, e)
            })?)
        };

        tracing::debug!(
            path = %path.display(),
            source_rate,
            channels,
            "Opened media audio track"
        );

        Ok(Self {
            path: path.to_path_buf(),
            format,
            decoder,
            track_id,
            channels,
            resampler,
            pending: Vec::new(),
            emitted: 0,
            exhausted: false,
        })
    }

    /// Next window of at most `window_samples` samples; `None` once the track
    /// is drained. The final window may be shorter.
    pub fn next_window(
        &mut self,
        window_samples: usize,
    ) -> Result<Option<Vec<f32>>, SpeechModelError> {
        while self.pending.len() < window_samples && !self.exhausted {
            self.pull_packet()?;
        }

        if self.pending.is_empty() {
            if self.emitted == 0 {
                return Err(decoding_failed(&self.path, "no audio samples decoded"));
            }
            return Ok(None);
        }

        let take = window_samples.min(self.pending.len());
        let window: Vec<f32> = self.pending.drain(..take).collect();
        self.emitted += window.len();
        Ok(Some(window))
    }

    fn pull_packet(&mut self) -> Result<(), SpeechModelError> {
        let packet = match self.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                return self.finish();
            }
            Err(e) => return Err(decoding_failed(&self.path, format!("packet: {}", e))),
        };

        if packet.track_id() != self.track_id {
            return Ok(());
        }

        let mono = match self.decoder.decode(&packet) {
            Ok(decoded) => {
                let frames = decoded.frames();
                if frames == 0 {
                    return Ok(());
                }
                let mut samples = SampleBuffer::<f32>::new(frames as u64, *decoded.spec());
                samples.copy_interleaved_ref(decoded);
                downmix(samples.samples(), self.channels)
            }
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Skipping corrupt audio frame");
                return Ok(());
            }
            Err(e) => return Err(decoding_failed(&self.path, format!("decode: {}", e))),
        };

        match self.resampler.as_mut() {
            Some(resampler) => resampler
                .push(&mono, &mut self.pending)
                .map_err(|e| decoding_failed(&self.path, e)),
            None => {
                self.pending.extend_from_slice(&mono);
                Ok(())
            }
        }
    }

    fn finish(&mut self) -> Result<(), SpeechModelError> {
        self.exhausted = true;
        if let Some(resampler) = self.resampler.as_mut() {
            resampler
                .flush(&mut self.pending)
                .map_err(|e| decoding_failed(&self.path, e))?;
        }
        Ok(())
    }
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn decoding_failed(path: &Path, reason: impl std::fmt::Display) -> SpeechModelError {
    SpeechModelError::DecodingFailed(format!("{}: {}", path.display(), reason))
}

/// Fixed-input sinc resampler fed incrementally. Output is trimmed on flush so
/// its length tracks the input duration.
struct StreamResampler {
    inner: SincFixedIn<f32>,
    ratio: f64,
    buffered: Vec<f32>,
    consumed: usize,
    produced: usize,
}

impl StreamResampler {
    fn new(from_rate: u32, to_rate: u32) -> Result<Self, String> {
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        let ratio = to_rate as f64 / from_rate as f64;
        let inner = SincFixedIn::<f32>::new(ratio, 2.0, params, RESAMPLER_CHUNK_FRAMES, 1)
            .map_err(|e| format!("resampler init: {}", e))?;

        Ok(Self {
            inner,
            ratio,
            buffered: Vec::with_capacity(RESAMPLER_CHUNK_FRAMES),
            consumed: 0,
            produced: 0,
        })
    }

    fn push(&mut self, samples: &[f32], out: &mut Vec<f32>) -> Result<(), String> {
        self.buffered.extend_from_slice(samples);
        while self.buffered.len() >= RESAMPLER_CHUNK_FRAMES {
            let block: Vec<f32> = self.buffered.drain(..RESAMPLER_CHUNK_FRAMES).collect();
            self.consumed += block.len();
            self.run(block, out)?;
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<f32>) -> Result<(), String> {
        if !self.buffered.is_empty() {
            let mut block = std::mem::take(&mut self.buffered);
            self.consumed += block.len();
            block.resize(RESAMPLER_CHUNK_FRAMES, 0.0);
            self.run(block, out)?;
        }

        let expected = (self.consumed as f64 * self.ratio) as usize;
        if self.produced > expected {
            let excess = self.produced - expected;
            out.truncate(out.len().saturating_sub(excess));
            self.produced = expected;
        }
        Ok(())
    }

    fn run(&mut self, block: Vec<f32>, out: &mut Vec<f32>) -> Result<(), String> {
        let result = self
            .inner
            .process(&[block], None)
            .map_err(|e| format!("resample: {}", e))?;
        if let Some(channel) = result.first() {
            self.produced += channel.len();
            out.extend_from_slice(channel);
        }
        Ok(())
    }
}
