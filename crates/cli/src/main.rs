use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use linkskim_core::{
    ExtractedLinkContent, FetchLinkContentOptions, FirecrawlClient, HttpFetcher, ResolverDeps, ScrapeClient, Strategy,
    TranscriptMode, YoutubeTranscripts, fetch_link_content,
};
use owo_colors::OwoColorize;
use url::Url;

mod echo;
mod flags;

use echo::{format_chars, print_banner, print_info, print_step, print_success, print_warning};
use flags::LengthArg;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for resolved content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Resolve readable content, metadata, and transcripts for a link
#[derive(Parser, Debug)]
#[command(name = "linkskim")]
#[command(version = VERSION)]
#[command(about = "Resolve readable content for a link", long_about = None)]
struct Args {
    /// URL to resolve
    #[arg(value_name = "URL")]
    url: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Transcript backend for YouTube links (auto, web, apify)
    #[arg(long, value_name = "MODE", value_parser = flags::parse_youtube_mode)]
    youtube: Option<TranscriptMode>,

    /// Per-operation timeout (30, 30s, 2m, 500ms)
    #[arg(long, value_name = "DURATION", value_parser = flags::parse_duration_ms)]
    timeout: Option<u64>,

    /// Content budget: short, medium, long, a character count, or e.g. 20k
    #[arg(long, value_name = "LENGTH", value_parser = flags::parse_length_arg)]
    length: Option<LengthArg>,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Skip the Firecrawl fallback even when an API key is configured
    #[arg(long)]
    no_firecrawl: bool,

    /// Enable progress output on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn build_deps(args: &Args) -> ResolverDeps {
    let scraper = if args.no_firecrawl {
        None
    } else {
        FirecrawlClient::from_env().map(|c| Box::new(c) as Box<dyn ScrapeClient>)
    };

    ResolverDeps {
        fetcher: Box::new(HttpFetcher { user_agent: args.user_agent.clone() }),
        scraper,
        transcripts: Box::new(YoutubeTranscripts::from_env()),
    }
}

fn render_text(result: &ExtractedLinkContent) -> String {
    let mut out = String::new();
    if let Some(title) = &result.title {
        out.push_str(title);
        out.push('\n');
        out.push('\n');
    }
    out.push_str(&result.content);
    out.push('\n');
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        print_banner();
    }

    Url::parse(&args.url).with_context(|| format!("Invalid URL: {}", args.url))?;

    let options = FetchLinkContentOptions {
        max_characters: args.length.map(LengthArg::max_characters),
        timeout_ms: args.timeout,
        youtube_transcript: args.youtube,
    };
    let deps = build_deps(&args);

    if args.verbose {
        print_step(1, 2, &format!("Resolving {}", args.url.bright_white().underline()));
        if deps.scraper.is_none() {
            print_info("Firecrawl fallback disabled");
        }
    }

    let result = fetch_link_content(&args.url, &options, &deps)
        .await
        .with_context(|| format!("Failed to resolve content for {}", args.url))?;

    if args.verbose {
        print_step(2, 2, "Writing output");
        let strategy = match result.diagnostics.strategy {
            Strategy::Firecrawl => "firecrawl",
            Strategy::Html => "html",
        };
        eprintln!("  {} {}", "Strategy:".dimmed(), strategy.bright_white());
        eprintln!(
            "  {} {}",
            "Content:".dimmed(),
            format_chars(result.content.chars().count()).bright_white()
        );
        if let Some(title) = &result.title {
            eprintln!("  {} {}", "Title:".dimmed(), title.bright_white());
        }
        for note in &result.diagnostics.firecrawl.notes {
            print_warning(note);
        }
        for note in &result.diagnostics.transcript.notes {
            print_warning(note);
        }
        eprintln!();
    }

    let output = match args.format {
        OutputFormat::Text => render_text(&result),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
            json.push('\n');
            json
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
