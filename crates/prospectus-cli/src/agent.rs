use prospectus_core::{ConversationHistory, Effort, Error, InferenceProvider, Result};
use serde::de::DeserializeOwned;

/// One model-facing persona: a provider handle, a model name, and the
/// behavior text it asserts over the shared history before every call.
pub struct InferenceAgent<'a, P: InferenceProvider + ?Sized> {
    provider: &'a P,
    model: String,
    behavior: String,
}

impl<'a, P: InferenceProvider + ?Sized> InferenceAgent<'a, P> {
    pub fn new(provider: &'a P, model: impl Into<String>, behavior: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            behavior: behavior.into(),
        }
    }

    pub fn behavior(&self) -> &str {
        &self.behavior
    }

    /// One blocking round-trip with the full accumulated dialogue.
    ///
    /// Appends the outgoing prompt and the raw reply to `history`, so every
    /// later call (from this agent or another sharing the history) sees both.
    pub async fn ask(&self, history: &mut ConversationHistory, prompt: &str) -> Result<String> {
        history.set_system_behavior(&self.behavior);
        history.add_user_message(prompt);
        let reply = self
            .provider
            .invoke(&self.model, &self.behavior, history.messages(), Effort::Medium)
            .await?;
        history.add_assistant_message(reply.clone());
        Ok(reply)
    }

    /// Ask and parse the reply as `T`. A non-conforming reply is a hard
    /// error; the raw reply is still recorded in `history` first.
    pub async fn ask_structured<T: DeserializeOwned>(
        &self,
        history: &mut ConversationHistory,
        prompt: &str,
    ) -> Result<T> {
        let reply = self.ask(history, prompt).await?;
        serde_json::from_str(&reply)
            .map_err(|e| Error::BadReply(format!("reply does not match the expected schema: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedProvider;
    use prospectus_core::{RelevanceResult, Role};

    #[tokio::test]
    async fn ask_records_both_turns_and_returns_the_reply() {
        let provider = ScriptedProvider::new(&["the reply"]);
        let agent = InferenceAgent::new(&provider, "m", "behave");
        let mut history = ConversationHistory::new("behave");

        let reply = agent.ask(&mut history, "the question").await.unwrap();
        assert_eq!(reply, "the reply");

        let msgs = history.messages().to_vec();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(msgs[1].content, "the question");
        assert_eq!(msgs[2].role, Role::Assistant);
        assert_eq!(msgs[2].content, "the reply");
    }

    #[tokio::test]
    async fn ask_asserts_its_behavior_over_the_shared_history() {
        let provider = ScriptedProvider::new(&["one", "two"]);
        let first = InferenceAgent::new(&provider, "m", "first behavior");
        let second = InferenceAgent::new(&provider, "m", "second behavior");
        let mut history = ConversationHistory::new("first behavior");

        first.ask(&mut history, "a").await.unwrap();
        second.ask(&mut history, "b").await.unwrap();

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0].history[0].content, "first behavior");
        // The second agent retroactively rewrote element 0.
        assert_eq!(calls[1].history[0].content, "second behavior");
        // ... while the first exchange stayed in place.
        assert_eq!(calls[1].history[1].content, "a");
        assert_eq!(calls[1].history[2].content, "one");
    }

    #[tokio::test]
    async fn ask_structured_parses_a_conforming_reply() {
        let provider =
            ScriptedProvider::new(&[r#"{"links":[{"type":"about page","url":"https://a.com/x"}]}"#]);
        let agent = InferenceAgent::new(&provider, "m", "behave");
        let mut history = ConversationHistory::new("behave");

        let parsed: RelevanceResult = agent.ask_structured(&mut history, "q").await.unwrap();
        assert_eq!(parsed.links[0].url, "https://a.com/x");
    }

    #[tokio::test]
    async fn ask_structured_rejects_a_malformed_reply() {
        let provider = ScriptedProvider::new(&["sorry, I can't produce JSON"]);
        let agent = InferenceAgent::new(&provider, "m", "behave");
        let mut history = ConversationHistory::new("behave");

        let err = agent
            .ask_structured::<RelevanceResult>(&mut history, "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadReply(_)));
        // The raw reply was recorded before parsing failed.
        assert_eq!(history.messages().last().unwrap().content, "sorry, I can't produce JSON");
    }
}
