use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use podcast_rss_generator::config::{load_document, EngineSettings};
use podcast_rss_generator::feed::{FeedGenerator, GenerateError, GenerateOptions};
use podcast_rss_generator::podcast::validate;

#[derive(Parser, Debug)]
#[command(
    name = "podcast-rss-generator",
    version,
    about = "Generate a podcast RSS feed from a TOML or JSON description"
)]
struct Args {
    /// Podcast description to read (.toml or .json)
    #[arg(long, value_name = "FILE", default_value = "podcast_config.toml")]
    input_file: PathBuf,

    /// Where to write the feed
    #[arg(long, value_name = "FILE", default_value = "podcast_feed.xml")]
    output_file: PathBuf,

    /// Skip HTTP HEAD and ffprobe checks for asset URLs (use for testing/fake URLs)
    #[arg(long)]
    skip_asset_verification: bool,

    /// Validate the input and exit without generating
    #[arg(long)]
    validate_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let document = load_document(&args.input_file)
        .with_context(|| format!("Failed to load '{}'", args.input_file.display()))?;

    if args.validate_only {
        let report = validate(&document);
        if !report.is_valid() {
            eprint!("{}", report);
            std::process::exit(1);
        }
        println!("{} is valid", args.input_file.display());
        return Ok(());
    }

    let settings = EngineSettings::from_document(&document)?;
    let generator =
        FeedGenerator::from_settings(&settings).context("Failed to set up HTTP client")?;
    let options = GenerateOptions {
        skip_asset_verification: args.skip_asset_verification,
    };

    let feed = match generator
        .generate_to_path(&document, &args.output_file, options)
        .await
    {
        Ok(feed) => feed,
        Err(e) => {
            // Validation failures are listed one per line instead of as a chain
            if let Some(GenerateError::Invalid(report)) = e.downcast_ref::<GenerateError>() {
                eprint!("{}", report);
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    if feed.feed_guid_generated {
        println!("Warning: podcast_guid not found in metadata. Generated GUID: {}", feed.feed_guid);
        println!("It is recommended to explicitly set podcast_guid in your config file.");
    }

    println!(
        "Wrote {} episode(s) to {} ({} not yet published)",
        feed.included,
        args.output_file.display(),
        feed.skipped
    );

    Ok(())
}
