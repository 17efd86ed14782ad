//! Pipeline status tokens and the broadcast channel that carries them.
//!
//! The pipeline reports its activity as short raw tokens on a single named
//! channel ([`STATUS_CHANNEL`]).  [`StatusToken`] is the parsed form; tokens
//! this build does not know about are kept verbatim in
//! [`StatusToken::Other`] so newer pipelines remain displayable.

use tokio::sync::broadcast;

/// Name of the channel status tokens are published on.
pub const STATUS_CHANNEL: &str = "pipeline-status";

/// Buffered events per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// StatusToken
// ---------------------------------------------------------------------------

/// Activity reported by the pipeline.
///
/// ```
/// use parrot_control::pipeline::StatusToken;
///
/// assert_eq!(StatusToken::parse("speaking").label(), "Speaking...");
/// assert_eq!(StatusToken::parse("warming-up").label(), "warming-up");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusToken {
    /// Capturing audio and waiting for speech.
    Listening,
    /// Transcribing a finished utterance.
    Processing,
    /// Playing back the synthesised voice.
    Speaking,
    /// The pipeline is not running.
    Stopped,
    /// A token this build does not recognise, kept verbatim.
    Other(String),
}

impl StatusToken {
    /// Parse a raw token.  Matching is exact; anything else is `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "listening" => StatusToken::Listening,
            "processing" => StatusToken::Processing,
            "speaking" => StatusToken::Speaking,
            "stopped" => StatusToken::Stopped,
            other => StatusToken::Other(other.to_string()),
        }
    }

    /// The raw wire form of this token.
    pub fn as_str(&self) -> &str {
        match self {
            StatusToken::Listening => "listening",
            StatusToken::Processing => "processing",
            StatusToken::Speaking => "speaking",
            StatusToken::Stopped => "stopped",
            StatusToken::Other(raw) => raw,
        }
    }

    /// User-facing label.  Unrecognised tokens are shown as-is.
    pub fn label(&self) -> &str {
        match self {
            StatusToken::Listening => "Listening...",
            StatusToken::Processing => "Processing...",
            StatusToken::Speaking => "Speaking...",
            StatusToken::Stopped => "Stopped",
            StatusToken::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for StatusToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StatusBroadcaster
// ---------------------------------------------------------------------------

/// Publisher side of [`STATUS_CHANNEL`].
///
/// Each subscriber gets its own `broadcast::Receiver`; dropping the receiver
/// is all it takes to unsubscribe.
#[derive(Debug, Clone)]
pub struct StatusBroadcaster {
    sender: broadcast::Sender<String>,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a token to every current subscriber.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    pub fn emit(&self, token: &StatusToken) {
        if self.sender.receiver_count() > 0 {
            log::debug!("{STATUS_CHANNEL}: emit {token}");
            let _ = self.sender.send(token.as_str().to_string());
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
