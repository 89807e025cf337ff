use anyhow::{bail, Context, Result};
use clap::Parser;
use prospectus::BrochureBuilder;
use prospectus_core::PageFetcher;
use prospectus_local::{openai::OpenAiClient, WebFetcher};

#[derive(Parser, Debug)]
#[command(name = "prospectus")]
#[command(about = "Build a short Markdown brochure for a company website", long_about = None)]
struct Cli {
    /// Website to build the brochure for.
    url: String,
    /// Model to use (default: PROSPECTUS_MODEL or the built-in default).
    #[arg(long)]
    model: Option<String>,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prospectus=info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let provider = OpenAiClient::from_env(reqwest::Client::new())
        .context("inference client configuration")?;
    let model = cli.model.unwrap_or_else(|| provider.model().to_string());
    let fetcher = WebFetcher::new()?;

    let root = fetcher.fetch(&cli.url).await?;
    if root.fetch_failed {
        bail!("could not fetch {}: {}", cli.url, root.text);
    }

    let mut builder = BrochureBuilder::new(&provider, &fetcher, &model);
    let brochure = builder.build(&root).await?;
    println!("{brochure}");
    Ok(())
}
