use prospectus_core::{
    ConversationHistory, InferenceProvider, LinkDescriptor, Page, RelevanceResult, Result,
};
use tracing::debug;

use crate::agent::InferenceAgent;

pub(crate) const CLASSIFIER_BEHAVIOR: &str = "You are an expert in the creation of online \
advertisement materials. You will be given a list of links found on a company website and must \
decide which of them belong in a short brochure about the company, such as links to an About \
page, a Company page or Careers/Jobs pages.\n\
You should respond in JSON as in this example:\n\
{\n\
    \"links\": [\n\
        {\"type\": \"about page\", \"url\": \"https://www.example.com/about\"},\n\
        {\"type\": \"company page\", \"url\": \"https://www.another-example.net/company\"},\n\
        {\"type\": \"careers page\", \"url\": \"https://www.one-more-example.org/careers\"}\n\
    ]\n\
}";

/// Decides which of a page's outbound links belong in the brochure.
pub struct LinkClassifier<'a, P: InferenceProvider + ?Sized> {
    agent: InferenceAgent<'a, P>,
}

impl<'a, P: InferenceProvider + ?Sized> LinkClassifier<'a, P> {
    pub fn new(provider: &'a P, model: &str) -> Self {
        Self {
            agent: InferenceAgent::new(provider, model, CLASSIFIER_BEHAVIOR),
        }
    }

    /// One classification round-trip over the shared history.
    ///
    /// A reply that does not conform to the `{"links": [...]}` schema is a
    /// hard error; there is no local recovery or retry.
    pub async fn classify(
        &self,
        history: &mut ConversationHistory,
        page: &Page,
    ) -> Result<Vec<LinkDescriptor>> {
        let prompt = links_user_prompt(page);
        let result: RelevanceResult = self.agent.ask_structured(history, &prompt).await?;
        debug!(
            relevant = result.links.len(),
            found = page.links.len(),
            "links classified"
        );
        Ok(result.links)
    }
}

fn links_user_prompt(page: &Page) -> String {
    let mut prompt = format!(
        "Here is the list of links found on the website {} - please decide which of these are \
         relevant web links for a brochure about the company. Respond with full HTTPS URLs. Do \
         not include Terms of Service, Privacy, email or social media links.\n\
         Links (some might be relative links):\n",
        page.url
    );
    if page.links.is_empty() {
        prompt.push_str("No links found.");
    } else {
        for link in &page.links {
            prompt.push_str("- ");
            prompt.push_str(link);
            prompt.push('\n');
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{page, ScriptedProvider};
    use prospectus_core::Error;

    #[test]
    fn prompt_lists_links_one_per_line() {
        let p = page(
            "https://acme.com",
            "Acme",
            "hello",
            &["https://acme.com/about", "https://acme.com/careers"],
        );
        let prompt = links_user_prompt(&p);
        assert!(prompt.contains("https://acme.com -"));
        assert!(prompt.contains("- https://acme.com/about\n"));
        assert!(prompt.contains("- https://acme.com/careers\n"));
    }

    #[test]
    fn prompt_marks_pages_without_links() {
        let p = page("https://acme.com", "Acme", "hello", &[]);
        assert!(links_user_prompt(&p).ends_with("No links found."));
    }

    #[tokio::test]
    async fn classify_parses_the_structured_reply() {
        let provider = ScriptedProvider::new(&[
            r#"{"links":[{"type":"about page","url":"https://acme.com/about"}]}"#,
        ]);
        let classifier = LinkClassifier::new(&provider, "m");
        let mut history = ConversationHistory::new(CLASSIFIER_BEHAVIOR);
        let p = page("https://acme.com", "Acme", "hello", &["https://acme.com/about"]);

        let links = classifier.classify(&mut history, &p).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, "about page");
        assert_eq!(links[0].url, "https://acme.com/about");

        // The exchange landed on the shared history.
        let msgs = history.messages().to_vec();
        assert_eq!(msgs.len(), 3);
        assert!(msgs[1].content.contains("- https://acme.com/about"));
    }

    #[tokio::test]
    async fn classify_accepts_an_empty_selection() {
        let provider = ScriptedProvider::new(&[r#"{"links":[]}"#]);
        let classifier = LinkClassifier::new(&provider, "m");
        let mut history = ConversationHistory::new(CLASSIFIER_BEHAVIOR);
        let p = page("https://acme.com", "Acme", "hello", &[]);

        let links = classifier.classify(&mut history, &p).await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn classify_surfaces_malformed_replies() {
        let provider = ScriptedProvider::new(&[r#"{"pages":[]}"#]);
        let classifier = LinkClassifier::new(&provider, "m");
        let mut history = ConversationHistory::new(CLASSIFIER_BEHAVIOR);
        let p = page("https://acme.com", "Acme", "hello", &[]);

        let err = classifier.classify(&mut history, &p).await.unwrap_err();
        assert!(matches!(err, Error::BadReply(_)));
    }
}
