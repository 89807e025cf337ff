use prospectus_core::{ConversationHistory, InferenceProvider, Page, PageFetcher, Result};
use tracing::{debug, info};

use crate::agent::InferenceAgent;
use crate::classify::LinkClassifier;

pub(crate) const BROCHURE_BEHAVIOR: &str = "You are an assistant that analyzes the contents of \
several relevant pages from a company website and creates a short brochure about the company \
for prospective customers, investors and recruits. Include details of company culture, \
customers and careers/jobs if the information is available.";

const NO_RELEVANT_PAGES: &str = "No relevant pages found to create a brochure.";
const QUOTE_DELIMITER: &str = "\n\"\"\"\n";

/// Drives the full pipeline: classify the root page's links, fetch the
/// relevant ones, then three sequential inference calls (entity name,
/// entity status, brochure) over one shared conversation history.
pub struct BrochureBuilder<'a, P, F>
where
    P: InferenceProvider + ?Sized,
    F: PageFetcher + ?Sized,
{
    agent: InferenceAgent<'a, P>,
    classifier: LinkClassifier<'a, P>,
    fetcher: &'a F,
    history: ConversationHistory,
}

impl<'a, P, F> BrochureBuilder<'a, P, F>
where
    P: InferenceProvider + ?Sized,
    F: PageFetcher + ?Sized,
{
    pub fn new(provider: &'a P, fetcher: &'a F, model: &str) -> Self {
        Self {
            agent: InferenceAgent::new(provider, model, BROCHURE_BEHAVIOR),
            classifier: LinkClassifier::new(provider, model),
            fetcher,
            history: ConversationHistory::new(BROCHURE_BEHAVIOR),
        }
    }

    /// Build a Markdown brochure for the site rooted at `root`.
    ///
    /// Relevant-page fetch failures degrade that page to a failure marker
    /// and the build continues; classification and inference failures abort.
    pub async fn build(&mut self, root: &Page) -> Result<String> {
        let links = self.classifier.classify(&mut self.history, root).await?;
        if links.is_empty() {
            info!("no relevant links; skipping generation");
            return Ok(NO_RELEVANT_PAGES.to_string());
        }

        let mut relevant: Vec<(String, Page)> = Vec::with_capacity(links.len());
        for link in &links {
            let page = match self.fetcher.fetch(&link.url).await {
                Ok(p) => p,
                // A link the model invented can fail validation; from this
                // seat that is a page-level failure, not a caller error.
                Err(e) => Page::failed(&link.url, e.to_string()),
            };
            debug!(url = %link.url, failed = page.fetch_failed, "relevant page fetched");
            relevant.push((link.kind.clone(), page));
        }

        let evidence = evidence_prompt(root, &relevant);
        let name = self
            .agent
            .ask(&mut self.history, &name_prompt(&evidence))
            .await?;
        let status = self
            .agent
            .ask(&mut self.history, &status_prompt(&name))
            .await?;
        self.agent
            .ask(&mut self.history, &brochure_prompt(&root.url, &name, &status))
            .await
    }
}

/// Quote-delimited evidence: the root page first, then each successfully
/// fetched relevant page under its classified type label. Failed pages are
/// omitted.
fn evidence_prompt(root: &Page, relevant: &[(String, Page)]) -> String {
    let mut prompt = format!(
        "Main page:{QUOTE_DELIMITER}Title: {}\nText:\n{}{QUOTE_DELIMITER}\n",
        root.title, root.text
    );
    for (kind, page) in relevant {
        if page.fetch_failed {
            continue;
        }
        prompt.push_str(&format!(
            "{kind}:{QUOTE_DELIMITER}Title: {}\nText:\n{}{QUOTE_DELIMITER}\n",
            page.title, page.text
        ));
    }
    prompt
}

fn name_prompt(evidence: &str) -> String {
    format!(
        "Infer the name of the company or the full name of the owner of this website based on \
         the following information that was obtained from their website:\n{evidence}\n\
         Respond only with the name."
    )
}

fn status_prompt(name: &str) -> String {
    format!(
        "Infer the current status of the entity by the provided name based on the information \
         obtained from their website previously. There can be only two statuses: a company or \
         an individual.\nEntity: {name}\nRespond only with the status of said entity."
    )
}

fn brochure_prompt(url: &str, name: &str, status: &str) -> String {
    format!(
        "You are looking at a {status} called {name}, to whom the website {url} belongs.\n\
         Build a short brochure about the {status}. Use the information from the website that \
         is already stored in the history.\nYour response must be in a Markdown format."
    )
}
