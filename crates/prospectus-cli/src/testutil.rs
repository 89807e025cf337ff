//! Scripted collaborators for agent-layer tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use prospectus_core::{
    ConversationMessage, Effort, Error, InferenceProvider, Page, PageFetcher, Result, Role,
};

pub struct RecordedCall {
    pub instructions: String,
    /// Content of the most recent user turn at call time.
    pub prompt: String,
    pub history: Vec<ConversationMessage>,
}

/// Replays canned replies in order and records every invocation.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompt_of_call(&self, index: usize) -> String {
        self.calls.lock().unwrap()[index].prompt.clone()
    }
}

#[async_trait]
impl InferenceProvider for ScriptedProvider {
    async fn invoke(
        &self,
        _model: &str,
        instructions: &str,
        history: &[ConversationMessage],
        _effort: Effort,
    ) -> Result<String> {
        let prompt = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(RecordedCall {
            instructions: instructions.to_string(),
            prompt,
            history: history.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Llm("script exhausted".to_string()))
    }
}

/// Serves pages from a map; anything else comes back as a failed page.
#[derive(Default)]
pub struct StaticFetcher {
    pub pages: HashMap<String, Page>,
    pub fetched: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn with_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self {
            pages: pages.into_iter().map(|p| (p.url.clone(), p)).collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Page::failed(url, "connection refused")))
    }
}

pub fn page(url: &str, title: &str, text: &str, links: &[&str]) -> Page {
    Page {
        url: url.to_string(),
        title: title.to_string(),
        text: text.to_string(),
        links: links.iter().map(|s| s.to_string()).collect(),
        fetch_failed: false,
    }
}
