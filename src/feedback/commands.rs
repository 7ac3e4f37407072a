//! Voice Stop Commands
//!
//! Interprets noisy speech-recognition transcripts. Recognition quality on
//! phones is poor for short commands, so matching is deliberately loose:
//! any transcript containing a stop word counts, and the common truncated
//! fragments "op" and "st" match exactly. Confidence is ignored on purpose;
//! a misheard stop is far less costly than a plank held with no way out.

use crate::time::TimestampMs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Stop words matched as substrings anywhere in the transcript.
const STOP_WORDS: [&str; 5] = ["stop", "top", "end", "finish", "done"];

/// Truncated fragments matched only as the whole transcript.
const STOP_FRAGMENTS: [&str; 2] = ["op", "st"];

/// One recognized speech segment from the transcription backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEvent {
    pub text: String,
    /// Recognition confidence in [0, 1]; zero when the backend omits it
    #[serde(default)]
    pub confidence: f64,
    /// Whether the backend considers this segment final
    #[serde(default)]
    pub is_final: bool,
    pub timestamp_ms: TimestampMs,
}

/// What a transcript asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    Stop,
}

/// Listens for voice commands over a transcript stream.
///
/// A microphone permission denial permanently disables the listener; the
/// session continues without voice control rather than retrying and
/// re-prompting the user.
#[derive(Debug)]
pub struct CommandListener {
    enabled: bool,
}

impl CommandListener {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Permanently disable after a microphone permission denial.
    pub fn on_permission_denied(&mut self) {
        if self.enabled {
            warn!("microphone permission denied, voice commands disabled for this session");
            self.enabled = false;
        }
    }

    /// Interpret one transcript. Returns the command it contains, if any.
    pub fn interpret(&self, event: &TranscriptEvent) -> Option<VoiceCommand> {
        if !self.enabled {
            return None;
        }
        let transcript = event.text.to_lowercase();
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return None;
        }

        let matched = STOP_WORDS.iter().any(|w| transcript.contains(w))
            || STOP_FRAGMENTS.iter().any(|f| transcript == *f);

        if matched {
            debug!(transcript, confidence = event.confidence, "stop command heard");
            Some(VoiceCommand::Stop)
        } else {
            None
        }
    }
}

impl Default for CommandListener {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> TranscriptEvent {
        TranscriptEvent {
            text: text.to_string(),
            confidence: 0.4,
            is_final: true,
            timestamp_ms: TimestampMs::from_millis(0),
        }
    }

    #[test]
    fn test_direct_stop_words() {
        let listener = CommandListener::new();
        for word in ["stop", "end", "finish", "done", "top"] {
            assert_eq!(
                listener.interpret(&event(word)),
                Some(VoiceCommand::Stop),
                "word {:?} not recognized",
                word
            );
        }
    }

    #[test]
    fn test_stop_word_inside_sentence() {
        let listener = CommandListener::new();
        assert_eq!(
            listener.interpret(&event("please stop the timer")),
            Some(VoiceCommand::Stop)
        );
        assert_eq!(
            listener.interpret(&event("I'm DONE")),
            Some(VoiceCommand::Stop)
        );
    }

    #[test]
    fn test_truncated_fragments_exact_only() {
        let listener = CommandListener::new();
        assert_eq!(listener.interpret(&event("op")), Some(VoiceCommand::Stop));
        assert_eq!(listener.interpret(&event("st")), Some(VoiceCommand::Stop));
        assert_eq!(listener.interpret(&event(" st ")), Some(VoiceCommand::Stop));
        // Fragments must be the whole transcript
        assert_eq!(listener.interpret(&event("open the door")), None);
    }

    #[test]
    fn test_unrelated_speech_ignored() {
        let listener = CommandListener::new();
        assert_eq!(listener.interpret(&event("keep going")), None);
        assert_eq!(listener.interpret(&event("")), None);
        assert_eq!(listener.interpret(&event("   ")), None);
    }

    #[test]
    fn test_low_confidence_still_counts() {
        let listener = CommandListener::new();
        let mut e = event("stop");
        e.confidence = 0.0;
        e.is_final = false;
        assert_eq!(listener.interpret(&e), Some(VoiceCommand::Stop));
    }

    #[test]
    fn test_permission_denial_disables_permanently() {
        let mut listener = CommandListener::new();
        listener.on_permission_denied();
        assert!(!listener.is_enabled());
        assert_eq!(listener.interpret(&event("stop")), None);
    }
}
