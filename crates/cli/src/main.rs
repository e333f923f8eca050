// ABOUTME: CLI for extracting page metadata with unfurl-core.
// ABOUTME: Fetches a URL or reads a file/stdin and prints the metadata as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use unfurl_core::Unfurl;

/// Extract page metadata and output JSON.
#[derive(Parser, Debug)]
#[command(name = "unfurl")]
#[command(about = "Extract page metadata with unfurl-core and print JSON", long_about = None)]
struct Args {
    /// Page URL (http/https) or a local HTML file path. Use "-" to read from stdin.
    target: String,

    /// Target URL for relative-path resolution when reading from a file or stdin.
    #[arg(long)]
    url: Option<String>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Include the re-serialized page HTML in the output.
    #[arg(long, default_value_t = false)]
    html: bool,

    /// Allow fetching from private/reserved addresses.
    #[arg(long, default_value_t = false)]
    allow_private: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let is_remote = args.target.starts_with("http://") || args.target.starts_with("https://");

    let mut metadata = if is_remote {
        if args.url.is_some() {
            bail!("--url is only valid when reading from a file or stdin");
        }
        let unfurl = Unfurl::builder()
            .allow_private_networks(args.allow_private)
            .build();
        let fetched = unfurl.fetch_and_parse(&args.target)?;
        if !fetched.is_html {
            bail!(
                "{} is not an HTML document ({})",
                args.target,
                fetched.content_type.unwrap_or_else(|| "unknown".to_string())
            );
        }
        fetched.metadata
    } else {
        let target_url = args
            .url
            .clone()
            .ok_or_else(|| anyhow!("--url is required when reading from a file or stdin"))?;
        let html = load_html(&args.target)?;
        // No live site to probe when parsing local input.
        let unfurl = Unfurl::builder().favicon_probe(false).build();
        unfurl.read_and_parse(&html, &target_url)?
    };

    if !args.html {
        metadata.html = String::new();
    }

    if args.compact {
        println!("{}", serde_json::to_string(&metadata)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    }

    Ok(())
}

fn load_html(target: &str) -> Result<String> {
    if target == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    Ok(fs::read_to_string(path)?)
}
