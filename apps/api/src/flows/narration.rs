//! Narration: speaks a piece of text (usually the current question) and
//! returns it as a playable WAV data URI.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::flows::{require_text, FlowKind};
use crate::speech::wav::{pcm_to_wav, wav_data_uri};
use crate::speech::{SpeechError, SpeechSynthesizer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    /// `data:audio/wav;base64,...`
    pub media: String,
}

pub async fn narrate(
    input: &NarrationInput,
    speech: Option<&dyn SpeechSynthesizer>,
) -> Result<Narration, AppError> {
    let speech = speech.ok_or(AppError::SpeechUnavailable)?;
    require_text("text", &input.text)?;

    let started = Instant::now();
    let result = synthesize_wav(speech, input.text.trim()).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(media) => {
            info!(flow = FlowKind::Narration.name(), elapsed_ms, "Flow completed");
            Ok(Narration { media })
        }
        Err(e) => {
            warn!(flow = FlowKind::Narration.name(), elapsed_ms, "Flow failed: {e}");
            Err(AppError::llm(
                FlowKind::Narration.failure_message(),
                format!("narration failed: {e}"),
            ))
        }
    }
}

async fn synthesize_wav(speech: &dyn SpeechSynthesizer, text: &str) -> Result<String, SpeechError> {
    let pcm = speech.synthesize(text).await?;
    if pcm.len() < 2 {
        return Err(SpeechError::NoMedia);
    }
    let wav = pcm_to_wav(&pcm)?;
    Ok(wav_data_uri(&wav))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::testing::FixedSpeech;

    #[tokio::test]
    async fn test_narration_returns_wav_data_uri() {
        let speech = FixedSpeech(vec![0, 0, 1, 0]);
        let input = NarrationInput {
            text: "Tell me about yourself.".to_string(),
        };
        let narration = narrate(&input, Some(&speech)).await.unwrap();
        assert!(narration.media.starts_with("data:audio/wav;base64,UklGR"));
    }

    #[tokio::test]
    async fn test_narration_without_speech_backend() {
        let input = NarrationInput {
            text: "Hello".to_string(),
        };
        let err = narrate(&input, None).await.unwrap_err();
        assert!(matches!(err, AppError::SpeechUnavailable));
    }

    #[tokio::test]
    async fn test_empty_audio_is_a_flow_failure() {
        let speech = FixedSpeech(Vec::new());
        let input = NarrationInput {
            text: "Hello".to_string(),
        };
        let err = narrate(&input, Some(&speech)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Llm { message, .. } if message == FlowKind::Narration.failure_message()
        ));
    }
}
