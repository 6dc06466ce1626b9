/// Speech client: text-to-speech through the Gemini API.
///
/// Returns raw PCM; `wav` frames it for browsers. Like `llm_client`, this is
/// the only module that talks to the speech provider.
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod wav;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const VOICE: &str = "Algenib";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No media returned from TTS model")]
    NoMedia,

    #[error("Audio payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Turns text into 16-bit little-endian mono PCM at `wav::SAMPLE_RATE`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TtsRequest<'a> {
    contents: Vec<TtsContent<'a>>,
    generation_config: TtsGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct TtsContent<'a> {
    parts: Vec<TtsTextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TtsTextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TtsGenerationConfig<'a> {
    response_modalities: [&'a str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    #[serde(default)]
    candidates: Vec<TtsCandidate>,
}

#[derive(Debug, Deserialize)]
struct TtsCandidate {
    content: Option<TtsCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct TtsCandidateContent {
    #[serde(default)]
    parts: Vec<TtsPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TtsPart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[allow(dead_code)]
    mime_type: Option<String>,
    data: String,
}

impl TtsResponse {
    /// First inline audio payload across all candidates.
    fn audio_base64(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| d.data.as_str())
    }
}

#[derive(Clone)]
pub struct GeminiSpeechClient {
    client: Client,
    api_key: String,
}

impl GeminiSpeechClient {
    pub fn new(api_key: String) -> Result<Self, SpeechError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let url = format!("{GEMINI_API_BASE}/{TTS_MODEL}:generateContent");
        let body = TtsRequest {
            contents: vec![TtsContent {
                parts: vec![TtsTextPart { text }],
            }],
            generation_config: TtsGenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: VOICE },
                    },
                },
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TtsResponse = response.json().await?;
        let encoded = parsed.audio_base64().ok_or(SpeechError::NoMedia)?;
        let pcm = B64.decode(encoded)?;

        debug!("TTS call succeeded: {} PCM bytes", pcm.len());
        Ok(pcm)
    }
}
