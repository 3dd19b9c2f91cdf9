//! Text-to-speech and speech-to-text through configured external commands.

use crate::config::SpeechConfig;
use chatdeck_core::{ChatdeckError, ChatdeckResult};
use regex::Regex;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

// Applied in order.
#[allow(clippy::expect_used)]
static SPEECH_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"<[^>]*>", ""),
        (r"```[\s\S]*?```", "code block"),
        (r"`[^`]*`", "code"),
        (r"\*\*(.*?)\*\*", "$1"),
        (r"\*(.*?)\*", "$1"),
        (r"&bull;|•", ""),
        (r"\s+", " "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (Regex::new(pattern).expect("speech pattern is valid"), replacement)
    })
    .collect()
});

/// Strips markup so a reply reads naturally aloud.
pub fn clean_for_speech(text: &str) -> String {
    let cleaned = SPEECH_RULES
        .iter()
        .fold(text.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        });
    cleaned.trim().to_string()
}

/// Result of a `/speak` toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakState {
    /// Playback started.
    Speaking,
    /// Playback was running and has been stopped.
    Stopped,
    /// Nothing was left to say after cleaning.
    Silent,
}

/// Reads replies aloud; a second call while speaking stops playback.
pub struct Speaker {
    command: Option<String>,
    args: Vec<String>,
    playing: Mutex<Option<Child>>,
}

impl Speaker {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            command: config.tts_command.clone(),
            args: config.tts_args.clone(),
            playing: Mutex::new(None),
        }
    }

    /// Speaks `text`, or stops playback if it is already running.
    pub async fn toggle(&self, text: &str) -> ChatdeckResult<SpeakState> {
        let mut playing = self.playing.lock().await;
        if let Some(mut child) = playing.take() {
            if matches!(child.try_wait(), Ok(None)) {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to stop speech");
                }
                return Ok(SpeakState::Stopped);
            }
        }

        let Some(command) = &self.command else {
            return Err(ChatdeckError::Speech(
                "Text-to-speech not supported".to_string(),
            ));
        };
        let cleaned = clean_for_speech(text);
        if cleaned.is_empty() {
            return Ok(SpeakState::Silent);
        }

        let child = Command::new(command)
            .args(&self.args)
            .arg(&cleaned)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChatdeckError::Speech(format!("Could not start '{command}': {e}")))?;
        debug!(command = %command, chars = cleaned.len(), "Speaking");
        *playing = Some(child);
        Ok(SpeakState::Speaking)
    }
}

/// Captures one utterance as text.
pub struct Listener {
    command: Option<String>,
    args: Vec<String>,
}

impl Listener {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            command: config.stt_command.clone(),
            args: config.stt_args.clone(),
        }
    }

    /// Runs the recognizer and returns its trimmed stdout.
    pub async fn listen(&self) -> ChatdeckResult<String> {
        let Some(command) = &self.command else {
            return Err(ChatdeckError::Speech(
                "Speech recognition not supported".to_string(),
            ));
        };
        let output = Command::new(command)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ChatdeckError::Speech(format!("Could not start '{command}': {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChatdeckError::Speech(format!(
                "Speech recognition error: {}",
                stderr.trim()
            )));
        }
        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(ChatdeckError::Speech("No speech detected".to_string()));
        }
        Ok(transcript)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_cleaned() {
        assert_eq!(clean_for_speech("**Bold** and *italic*"), "Bold and italic");
        assert_eq!(
            clean_for_speech("Try this:\n```html\n<p>x</p>\n```\ndone"),
            "Try this: code block done"
        );
        assert_eq!(clean_for_speech("Use `cargo` here"), "Use code here");
        assert_eq!(clean_for_speech("<b>hi</b>&bull; there"), "hi there");
        assert_eq!(clean_for_speech("  a \n\n  b  "), "a b");
    }

    #[test]
    fn markup_only_cleans_to_empty() {
        assert_eq!(clean_for_speech("<br> <br>"), "");
    }

    #[tokio::test]
    async fn missing_tts_is_reported() {
        let speaker = Speaker::new(&SpeechConfig::default());
        let err = speaker.toggle("hello").await.unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[tokio::test]
    async fn missing_stt_is_reported() {
        let listener = Listener::new(&SpeechConfig::default());
        let err = listener.listen().await.unwrap_err();
        assert!(err.to_string().contains("Speech recognition not supported"));
    }

    #[tokio::test]
    async fn empty_text_is_silent() {
        let speaker = Speaker::new(&SpeechConfig {
            tts_command: Some("true".into()),
            ..SpeechConfig::default()
        });
        assert_eq!(speaker.toggle("<i></i>").await.unwrap(), SpeakState::Silent);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn speaking_twice_stops_playback() {
        let speaker = Speaker::new(&SpeechConfig {
            tts_command: Some("sleep".into()),
            tts_args: vec![],
            ..SpeechConfig::default()
        });
        // `sleep 5` stands in for a long utterance.
        assert_eq!(speaker.toggle("5").await.unwrap(), SpeakState::Speaking);
        assert_eq!(speaker.toggle("5").await.unwrap(), SpeakState::Stopped);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn listener_returns_command_output() {
        let listener = Listener::new(&SpeechConfig {
            stt_command: Some("echo".into()),
            stt_args: vec!["  set a goal  ".into()],
            ..SpeechConfig::default()
        });
        assert_eq!(listener.listen().await.unwrap(), "set a goal");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_recognizer_is_an_error() {
        let listener = Listener::new(&SpeechConfig {
            stt_command: Some("true".into()),
            ..SpeechConfig::default()
        });
        let err = listener.listen().await.unwrap_err();
        assert!(err.to_string().contains("No speech detected"));
    }
}
