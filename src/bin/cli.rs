//! Web archive toolkit CLI
//!
//! One subcommand per toolkit operation. Structured results are printed to
//! stdout as JSON; progress goes to the log.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use wa_toolkit::{
    archive::PayloadExtractor,
    error::{AppError, Result},
    models::{Config, Timemap, parse_capture_timestamp},
    services::{ContentExtractor, IndexClient, MementoClient},
    storage::ObjectStore,
    visualize,
};

/// wa-toolkit - NLNZ web archive access
#[derive(Parser, Debug)]
#[command(
    name = "wa-toolkit",
    version,
    about = "Query, extract and visualize NLNZ web archive captures"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "wa-toolkit.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the CDX index for captures of a URL
    Cdx {
        url: String,

        /// Extra query parameter forwarded verbatim (key=value, repeatable)
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Request timeout in seconds (default from config)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Fetch the TimeMap of a URL
    Timemap {
        url: String,

        /// TimeMap format segment
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Query the Memento TimeGate of a URL
    Memento {
        url: String,

        /// Capture time to negotiate (14-digit timestamp or RFC 3339)
        #[arg(long)]
        at: Option<String>,

        /// Do not follow redirects; print the status and Location instead
        #[arg(long)]
        no_follow: bool,
    },

    /// Extract the response payload at an offset in a WARC file
    Extract {
        /// Local path, s3://bucket/key, or http(s):// URL
        location: String,

        /// Byte offset of the record
        offset: u64,

        /// Print extracted text sections instead of raw bytes
        #[arg(long)]
        text: bool,

        /// Write the payload to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List object keys in a bucket
    Ls {
        /// Bucket name (default from config)
        #[arg(long)]
        bucket: Option<String>,

        #[arg(default_value = "")]
        prefix: String,
    },

    /// Download one object to a local file
    Download {
        key: String,
        output: PathBuf,

        /// Bucket name (default from config)
        #[arg(long)]
        bucket: Option<String>,
    },

    /// Load an index file from the bucket and print its entries
    Index {
        key: String,

        /// Bucket name (default from config)
        #[arg(long)]
        bucket: Option<String>,
    },

    /// Capture a full-page screenshot of a URL
    #[cfg(feature = "screenshot")]
    Screenshot {
        url: String,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Settle delay in milliseconds (default from config)
        #[arg(long)]
        delay: Option<u64>,
    },

    /// Plot monthly capture counts of a URL
    Plot {
        url: String,

        #[arg(short, long, default_value = "captures.png")]
        output: PathBuf,
    },

    /// Render a word cloud from archived page text
    Wordcloud {
        /// Local path, s3://bucket/key, or http(s):// URL of a WARC file
        location: String,

        /// Byte offsets of the records to include
        #[arg(required = true)]
        offsets: Vec<u64>,

        #[arg(short, long, default_value = "wordcloud.png")]
        output: PathBuf,
    },

    /// Validate the configuration file
    Validate,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn parse_at_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| parse_capture_timestamp(raw))
}

fn bucket_or_default(bucket: Option<String>, config: &Config) -> Result<String> {
    bucket
        .or_else(|| config.storage.bucket.clone())
        .ok_or_else(|| AppError::config("No bucket given and storage.bucket is not set"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::load_or_default(&cli.config)
    };
    log::debug!("Archive base URL: {}", config.archive.base());

    match cli.command {
        Command::Cdx {
            url,
            params,
            timeout,
        } => {
            let client = IndexClient::new(&config.archive)?;
            let timeout = Duration::from_secs(timeout.unwrap_or(config.archive.cdx_timeout_secs));
            let params: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let captures = client.query_cdx_index(&url, timeout, &params).await?;
            for record in captures.iter() {
                println!("{}", serde_json::to_string(record)?);
            }
        }

        Command::Timemap { url, format } => {
            let client = IndexClient::new(&config.archive)?;
            match client.get_timemap(&url, &format).await? {
                Timemap::Records(captures) => {
                    for record in captures.iter() {
                        println!("{}", serde_json::to_string(record)?);
                    }
                }
                Timemap::Links(links) => print_json(&links)?,
                Timemap::Raw { body, .. } => print!("{body}"),
            }
        }

        Command::Memento { url, at, no_follow } => {
            let client = MementoClient::new(&config.archive)?;
            let at_time = at.as_deref().map(parse_at_time).transpose()?;

            if no_follow {
                let response = client.query_memento(&url, at_time, false).await?;
                println!("{}", response.status());
                if let Some(location) = response.headers().get(reqwest::header::LOCATION) {
                    println!("Location: {}", location.to_str().unwrap_or_default());
                }
            } else {
                let links = client.get_memento_urls(&url, at_time).await?;
                if links.is_empty() {
                    log::warn!("No Link headers returned for {url}");
                }
                print_json(&links)?;
            }
        }

        Command::Extract {
            location,
            offset,
            text,
            output,
        } => {
            let extractor = PayloadExtractor::from_config(&config).await?;
            let Some(payload) = extractor.extract_payload(&location, offset).await? else {
                log::warn!("No response record at {location} offset {offset}");
                return Ok(());
            };

            if text {
                let content = ContentExtractor::new(&config.content)?;
                let sections = content.extract_bytes(&payload);
                match output {
                    Some(path) => std::fs::write(&path, sections.join("\n"))?,
                    None => sections.iter().for_each(|s| println!("{s}")),
                }
            } else {
                match output {
                    Some(path) => {
                        std::fs::write(&path, &payload)?;
                        log::info!("Wrote {} bytes to {}", payload.len(), path.display());
                    }
                    None => {
                        use std::io::Write;
                        std::io::stdout().write_all(&payload)?;
                    }
                }
            }
        }

        Command::Ls { bucket, prefix } => {
            let bucket = bucket_or_default(bucket, &config)?;
            let store = ObjectStore::from_config(&config.storage).await;
            for key in store.list_objects(&bucket, &prefix).await? {
                println!("{key}");
            }
        }

        Command::Download {
            key,
            output,
            bucket,
        } => {
            let bucket = bucket_or_default(bucket, &config)?;
            let store = ObjectStore::from_config(&config.storage).await;
            if !store.download_object(&bucket, &key, &output).await {
                return Err(AppError::s3(format!("Download of s3://{bucket}/{key} failed")));
            }
        }

        Command::Index { key, bucket } => {
            let bucket = bucket_or_default(bucket, &config)?;
            let store = ObjectStore::from_config(&config.storage).await;
            for entry in store.load_index_file(&bucket, &key).await? {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }

        #[cfg(feature = "screenshot")]
        Command::Screenshot { url, output, delay } => {
            let capturer = wa_toolkit::services::ScreenshotCapturer::new(config.screenshot.clone());
            let delay = delay
                .map(Duration::from_millis)
                .unwrap_or_else(|| capturer.default_delay());
            match capturer
                .capture_screenshot(&url, output.as_deref(), delay)
                .await
            {
                Some(path) => println!("{}", path.display()),
                None => log::warn!("No screenshot captured for {url}"),
            }
        }

        Command::Plot { url, output } => {
            let client = IndexClient::new(&config.archive)?;
            let captures = client.query(&url, &[]).await?;
            let counts = visualize::monthly_counts(captures.timestamps());
            visualize::plot_monthly_captures(
                &counts,
                &output,
                config.visualize.chart_width,
                config.visualize.chart_height,
            )?;
            log::info!(
                "Plotted {} captures over {} months to {}",
                captures.len(),
                counts.len(),
                output.display()
            );
        }

        Command::Wordcloud {
            location,
            offsets,
            output,
        } => {
            let extractor = PayloadExtractor::from_config(&config).await?;
            let content = ContentExtractor::new(&config.content)?;

            let mut texts = Vec::new();
            for offset in offsets {
                match extractor.extract_payload(&location, offset).await? {
                    Some(payload) => texts.extend(
                        content
                            .extract_bytes(&payload)
                            .into_iter()
                            .filter(|s| *s != config.content.separator),
                    ),
                    None => log::warn!("No response record at offset {offset}, skipping"),
                }
            }

            visualize::render_word_cloud(
                &texts,
                &output,
                config.visualize.cloud_width,
                config.visualize.cloud_height,
                config.visualize.max_words,
            )?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
