use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("llm failed: {0}")]
    Llm(String),
    #[error("bad reply: {0}")]
    BadReply(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered dialogue log shared by every model call in one brochure build.
///
/// Turns 1..n are append-only. Element 0 is special: it always carries the
/// *current* system-behavior text and is recomputed on every [`messages`]
/// read, so changing the behavior text between calls retroactively rewrites
/// element 0 while the recorded turns stay untouched.
///
/// [`messages`]: ConversationHistory::messages
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    system_behavior: String,
    entries: Vec<ConversationMessage>,
}

impl ConversationHistory {
    pub fn new(system_behavior: impl Into<String>) -> Self {
        Self {
            system_behavior: system_behavior.into(),
            entries: Vec::new(),
        }
    }

    pub fn system_behavior(&self) -> &str {
        &self.system_behavior
    }

    /// Replace the behavior text. Takes effect on the next [`messages`] read,
    /// including for element 0 of an already-populated history.
    ///
    /// [`messages`]: ConversationHistory::messages
    pub fn set_system_behavior(&mut self, text: impl Into<String>) {
        self.system_behavior = text.into();
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.entries.push(ConversationMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.entries.push(ConversationMessage {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// Full message sequence, element 0 refreshed to the current behavior
    /// text. Repeated reads without intervening writes are identical.
    pub fn messages(&mut self) -> &[ConversationMessage] {
        match self.entries.first().map(|m| m.role) {
            None => self.entries.push(ConversationMessage {
                role: Role::System,
                content: self.system_behavior.clone(),
            }),
            Some(role) if role != Role::System => self.entries.insert(
                0,
                ConversationMessage {
                    role: Role::System,
                    content: self.system_behavior.clone(),
                },
            ),
            Some(_) => self.entries[0].content = self.system_behavior.clone(),
        }
        &self.entries
    }
}

/// One fetched web page. Immutable after construction.
///
/// `fetch_failed` pages carry a diagnostic in `title`/`text` instead of
/// structured content; callers treat them as degraded input, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub text: String,
    /// Absolute outbound links discovered on the page, in document order.
    pub links: Vec<String>,
    pub fetch_failed: bool,
}

impl Page {
    /// Failure marker for a URL whose retrieval produced no usable content.
    pub fn failed(url: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: "Error".to_string(),
            text: diagnostic.into(),
            links: Vec::new(),
            fetch_failed: true,
        }
    }
}

/// A model-classified link: relevance category plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// The classifier's structured reply. `links` may be empty but must be
/// present; anything else is a malformed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceResult {
    pub links: Vec<LinkDescriptor>,
}

/// Provider hint for inference depth/cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve and extract one page.
    ///
    /// Pre-network validation failures are `Err(Error::InvalidUrl)`; network
    /// and HTTP failures come back as `Ok` with [`Page::fetch_failed`] set.
    async fn fetch(&self, url: &str) -> Result<Page>;
}

#[async_trait::async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Blocking round-trip to the model. The reply is plain text; whether it
    /// happens to be structured data is the caller's concern.
    async fn invoke(
        &self,
        model: &str,
        instructions: &str,
        history: &[ConversationMessage],
        effort: Effort,
    ) -> Result<String>;
}
