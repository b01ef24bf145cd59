//! Runs one extraction and prints the card as JSON.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use linkcard::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page to extract
    url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 15.0)]
    timeout: f64,

    /// Drop the preview image when a HEAD request reports it missing
    #[arg(long)]
    verify_images: bool,

    /// Treat scheme-less input as https
    #[arg(long)]
    assume_https: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_tracing(&LoggingConfig {
        format: if args.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..LoggingConfig::default()
    })
    .map_err(anyhow::Error::from_boxed)?;

    let config = ExtractorConfig::new()
        .with_fetch(
            FetchConfig::new()
                .with_timeout(args.timeout)
                .with_assume_https(args.assume_https),
        )
        .with_image_verification(args.verify_images);
    let extractor = CardExtractor::new(config)?.with_observer(Arc::new(LoggingObserver));

    match extractor.extract(&args.url).await {
        Ok(card) => {
            println!("{}", serde_json::to_string_pretty(&card)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err.to_dict())?);
            Ok(ExitCode::FAILURE)
        }
    }
}
