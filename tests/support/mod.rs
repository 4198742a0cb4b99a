use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;

use whisperdesk::application::ports::{
    LocalTranscript, ProviderError, SpeechModel, SpeechModelError, TimedSpan,
    TranscriptionProvider,
};
use whisperdesk::application::services::{
    RequestPipeline, TranscriptionDispatcher, UploadLifecycle,
};
use whisperdesk::domain::{
    AllowedExtensions, LanguageHint, TranscriptResult, TranscriptSegment, UploadedMedia,
};
use whisperdesk::infrastructure::audio::LocalWhisperProvider;

pub const SRT_SCENARIO: &str =
    "1\n00:00:00,000 --> 00:00:01,200\nHello\n\n2\n00:00:02,000 --> 00:00:03,500\nWorld";

#[derive(Clone)]
pub enum Behavior {
    Succeed(TranscriptResult),
    Fail(ProviderError),
    Hang,
    Panic,
}

/// Provider double that follows a fixed script and records each call.
pub struct ScriptedProvider {
    name: &'static str,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    seen_paths: Arc<Mutex<Vec<(PathBuf, bool)>>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            seen_paths: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Paths handed to the provider, with whether the file existed at call time.
    pub fn seen_paths(&self) -> Arc<Mutex<Vec<(PathBuf, bool)>>> {
        Arc::clone(&self.seen_paths)
    }
}

#[async_trait::async_trait]
impl TranscriptionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn transcribe(
        &self,
        media: &UploadedMedia,
        _language: &LanguageHint,
    ) -> Result<TranscriptResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_paths
            .lock()
            .unwrap()
            .push((media.storage_path.clone(), media.storage_path.exists()));

        match &self.behavior {
            Behavior::Succeed(result) => Ok(result.clone()),
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::upstream("woke up"))
            }
            Behavior::Panic => panic!("provider exploded"),
        }
    }
}

/// Speech model double returning a canned transcript.
pub struct MockSpeechModel {
    transcript: Result<LocalTranscript, String>,
    languages: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockSpeechModel {
    pub fn returning(transcript: LocalTranscript) -> Self {
        Self {
            transcript: Ok(transcript),
            languages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            transcript: Err(message.to_string()),
            languages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn languages(&self) -> Arc<Mutex<Vec<Option<String>>>> {
        Arc::clone(&self.languages)
    }
}

impl SpeechModel for MockSpeechModel {
    fn model_id(&self) -> &str {
        "mock/whisper"
    }

    fn transcribe_file(
        &self,
        _path: &Path,
        language: Option<&str>,
    ) -> Result<LocalTranscript, SpeechModelError> {
        self.languages
            .lock()
            .unwrap()
            .push(language.map(str::to_string));
        self.transcript
            .clone()
            .map_err(SpeechModelError::InferenceFailed)
    }
}

/// Hello / blank / World, the blank span sitting between the two.
pub fn scenario_transcript() -> LocalTranscript {
    LocalTranscript {
        text: String::new(),
        language: None,
        spans: vec![
            TimedSpan {
                start: 0.0,
                duration: 1.2,
                text: "Hello ".to_string(),
            },
            TimedSpan {
                start: 1.2,
                duration: 1.2,
                text: "  ".to_string(),
            },
            TimedSpan {
                start: 2.0,
                duration: 1.5,
                text: "World".to_string(),
            },
        ],
    }
}

pub fn sample_result(text: &str) -> TranscriptResult {
    TranscriptResult {
        full_text: text.to_string(),
        language_code: "en".to_string(),
        segments: vec![TranscriptSegment {
            index: 1,
            start_seconds: 0.0,
            end_seconds: 1.0,
            text: text.to_string(),
        }],
    }
}

pub fn bytes_stream(data: &'static [u8]) -> BoxStream<'static, Result<Bytes, io::Error>> {
    futures::stream::iter(vec![Ok(Bytes::from_static(data))]).boxed()
}

pub fn empty_stream() -> BoxStream<'static, Result<Bytes, io::Error>> {
    futures::stream::iter(Vec::<Result<Bytes, io::Error>>::new()).boxed()
}

pub fn local_provider(model: MockSpeechModel) -> Arc<dyn TranscriptionProvider> {
    Arc::new(LocalWhisperProvider::new(Arc::new(model)))
}

pub fn build_pipeline(
    scratch_dir: &Path,
    remote: Option<Arc<dyn TranscriptionProvider>>,
    local: Arc<dyn TranscriptionProvider>,
    timeout: Duration,
) -> RequestPipeline {
    let uploads = UploadLifecycle::new(scratch_dir.to_path_buf()).unwrap();
    RequestPipeline::new(
        AllowedExtensions::default(),
        uploads,
        TranscriptionDispatcher::new(remote, local, timeout),
    )
}

pub fn scratch_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
