use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;

use youtube_up::batch::{self, BatchItem};
use youtube_up::config::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS};
use youtube_up::cookies;
use youtube_up::metadata::{
    parse_timestamp, Category, CommentMode, CommentSortOrder, LanguageTag, License, Metadata,
    MetadataRecord, PremiereCountdown, PremiereTheme, Privacy,
};
use youtube_up::{Phase, RetryPolicy, Session, UploadOutcome, Uploader, UploaderConfig};

/// youtube-up: upload videos through YouTube Studio's internal API using browser cookies.
#[derive(Parser)]
#[command(name = "youtube-up", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload every video listed in a JSON file
    Json {
        /// JSON array of objects with "file" and "metadata" keys
        filename: PathBuf,

        /// Path to a Netscape cookies.txt file
        #[arg(long, alias = "cookies_file")]
        cookies_file: PathBuf,

        /// Number of videos to upload at once
        #[arg(long, default_value_t = 1)]
        jobs: usize,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Upload a single video
    Video {
        /// Video file to upload
        filename: PathBuf,

        /// Path to a Netscape cookies.txt file
        #[arg(long, alias = "cookies_file")]
        cookies_file: PathBuf,

        #[command(flatten)]
        metadata: MetadataArgs,

        #[command(flatten)]
        transfer: TransferArgs,
    },
}

#[derive(Args)]
struct TransferArgs {
    /// Upload chunk size in bytes
    #[arg(long, alias = "chunk_size", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Attempts per request before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout: u64,
}

impl TransferArgs {
    fn config(&self) -> UploaderConfig {
        UploaderConfig {
            chunk_size: self.chunk_size,
            retry: RetryPolicy {
                max_attempts: self.retries.max(1),
                ..Default::default()
            },
            request_timeout: Duration::from_secs(self.timeout),
            ..Default::default()
        }
    }
}

#[derive(Args)]
struct MetadataArgs {
    /// Title. Max length 100
    #[arg(long)]
    title: String,

    /// Description. Max length 5000
    #[arg(long, default_value = "")]
    description: String,

    /// Privacy
    #[arg(long, value_enum, ignore_case = true)]
    privacy: Privacy,

    /// Made for kids. If true comments will be disabled
    #[arg(long, alias = "made_for_kids", num_args = 0..=1, default_missing_value = "true")]
    made_for_kids: Option<bool>,

    /// List of tags
    #[arg(long, num_args = 1..)]
    tags: Vec<String>,

    /// Date to make the upload public, in ISO format. The video stays private
    /// until then, unless both premiere options are set, in which case it
    /// premieres publicly at that time
    #[arg(long, alias = "scheduled_upload", value_parser = parse_timestamp)]
    scheduled_upload: Option<DateTime<Utc>>,

    /// Duration of premiere countdown in seconds (60, 120, 180, 240 or 300)
    #[arg(long, alias = "premiere_countdown_duration")]
    premiere_countdown_duration: Option<PremiereCountdown>,

    /// Theme of premiere countdown
    #[arg(long, alias = "premiere_theme", value_enum, ignore_case = true)]
    premiere_theme: Option<PremiereTheme>,

    /// List of existing playlist IDs to add the video to
    #[arg(long, alias = "playlist_ids", num_args = 1..)]
    playlist_ids: Vec<String>,

    /// Path to thumbnail file to upload
    #[arg(long)]
    thumbnail: Option<PathBuf>,

    /// Whether to notify subscribers
    #[arg(long, alias = "publish_to_feed", num_args = 0..=1, default_missing_value = "true")]
    publish_to_feed: Option<bool>,

    /// Category
    #[arg(long, value_enum, ignore_case = true)]
    category: Option<Category>,

    /// Whether to use automatic video chapters
    #[arg(long, alias = "auto_chapter", num_args = 0..=1, default_missing_value = "true")]
    auto_chapter: Option<bool>,

    /// Whether to use automatic places
    #[arg(long, alias = "auto_places", num_args = 0..=1, default_missing_value = "true")]
    auto_places: Option<bool>,

    /// Whether to use automatic concepts
    #[arg(long, alias = "auto_concepts", num_args = 0..=1, default_missing_value = "true")]
    auto_concepts: Option<bool>,

    /// Whether the video has paid product placement
    #[arg(long, alias = "has_product_placement", num_args = 0..=1, default_missing_value = "true")]
    has_product_placement: Option<bool>,

    /// Whether to show the product placement overlay
    #[arg(long, alias = "show_product_placement_overlay", num_args = 0..=1, default_missing_value = "true")]
    show_product_placement_overlay: Option<bool>,

    /// Day the video was recorded, as YYYY-MM-DD
    #[arg(long, alias = "recorded_date")]
    recorded_date: Option<NaiveDate>,

    /// Whether the video is age restricted
    #[arg(long, alias = "restricted_to_over_18", num_args = 0..=1, default_missing_value = "true")]
    restricted_to_over_18: Option<bool>,

    /// Language of the audio, e.g. "en" or "pt-BR"
    #[arg(long, alias = "audio_language")]
    audio_language: Option<LanguageTag>,

    /// License
    #[arg(long, value_enum, ignore_case = true)]
    license: Option<License>,

    /// Whether to allow comments
    #[arg(long, alias = "allow_comments", num_args = 0..=1, default_missing_value = "true")]
    allow_comments: Option<bool>,

    /// Comment filtering mode
    #[arg(long, alias = "allow_comments_mode", value_enum, ignore_case = true)]
    allow_comments_mode: Option<CommentMode>,

    /// Whether likes can be seen
    #[arg(long, alias = "can_view_ratings", num_args = 0..=1, default_missing_value = "true")]
    can_view_ratings: Option<bool>,

    /// Default comment sort order
    #[arg(long, alias = "comments_sort_order", value_enum, ignore_case = true)]
    comments_sort_order: Option<CommentSortOrder>,

    /// Whether to allow embedding on 3rd party sites
    #[arg(long, alias = "allow_embedding", num_args = 0..=1, default_missing_value = "true")]
    allow_embedding: Option<bool>,
}

impl MetadataArgs {
    fn into_metadata(self) -> Metadata {
        Metadata {
            title: self.title,
            description: self.description,
            privacy: self.privacy,
            made_for_kids: self.made_for_kids.unwrap_or(false),
            tags: self.tags,
            scheduled_upload: self.scheduled_upload,
            premiere_countdown_duration: self.premiere_countdown_duration,
            premiere_theme: self.premiere_theme,
            playlist_ids: self.playlist_ids,
            thumbnail: self.thumbnail,
            publish_to_feed: self.publish_to_feed,
            category: self.category,
            auto_chapter: self.auto_chapter,
            auto_places: self.auto_places,
            auto_concepts: self.auto_concepts,
            has_product_placement: self.has_product_placement,
            show_product_placement_overlay: self.show_product_placement_overlay,
            recorded_date: self.recorded_date,
            restricted_to_over_18: self.restricted_to_over_18,
            audio_language: self.audio_language,
            license: self.license,
            allow_comments: self.allow_comments,
            allow_comments_mode: self.allow_comments_mode,
            can_view_ratings: self.can_view_ratings,
            comments_sort_order: self.comments_sort_order,
            allow_embedding: self.allow_embedding,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Video {
            filename,
            cookies_file,
            metadata,
            transfer,
        } => {
            let record = MetadataRecord::new(metadata.into_metadata())
                .context("invalid video metadata")?;
            let session = cookies::load(&cookies_file)?;
            let mut uploader = Uploader::with_session(session, transfer.config())?;

            let bar = progress_bar(100)?;
            let mut reporter = |phase: Phase, percent: u8| {
                bar.set_message(phase.as_str());
                bar.set_position(percent as u64);
            };
            let outcome = uploader.upload(&filename, &record, &mut reporter)?;
            bar.finish_with_message("done");
            print_outcome(&filename, &outcome);
        }

        Commands::Json {
            filename,
            cookies_file,
            jobs,
            transfer,
        } => {
            let items = batch::load(&filename)?;
            let session = cookies::load(&cookies_file)?;
            let cfg = transfer.config();

            let failures = if jobs > 1 {
                upload_parallel(&items, &session, &cfg, jobs)?
            } else {
                upload_sequential(&items, session, cfg)?
            };

            if failures > 0 {
                bail!("{failures} of {} uploads failed", items.len());
            }
            info!("all {} uploads finished", items.len());
        }
    }

    Ok(())
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len} {msg} ({eta})")?
            .progress_chars("##-"),
    );
    Ok(bar)
}

/// One bar across the whole batch, one session reused for every video.
fn upload_sequential(items: &[BatchItem], session: Session, cfg: UploaderConfig) -> Result<usize> {
    let mut uploader = Uploader::with_session(session, cfg)?;
    let bar = progress_bar(100 * items.len() as u64)?;
    let mut failures = 0;

    for (i, item) in items.iter().enumerate() {
        let base = 100 * i as u64;
        let mut reporter = |phase: Phase, percent: u8| {
            bar.set_message(format!("{} {}", item.file.display(), phase));
            bar.set_position(base + percent as u64);
        };
        match uploader.upload(&item.file, &item.metadata, &mut reporter) {
            Ok(outcome) => bar.suspend(|| print_outcome(&item.file, &outcome)),
            Err(e) => {
                failures += 1;
                bar.suspend(|| error!("{}: {e}", item.file.display()));
                bar.set_position(base + 100);
            }
        }
    }

    bar.finish_with_message("done");
    Ok(failures)
}

/// One bar and one uploader per video, `jobs` videos at a time.
fn upload_parallel(
    items: &[BatchItem],
    session: &Session,
    cfg: &UploaderConfig,
    jobs: usize,
) -> Result<usize> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("failed to build upload thread pool")?;
    let multi = MultiProgress::new();
    let bars = items
        .iter()
        .map(|item| {
            let bar = multi.add(progress_bar(100)?);
            bar.set_message(item.file.display().to_string());
            Ok(bar)
        })
        .collect::<Result<Vec<_>>>()?;

    let failures = pool.install(|| {
        items
            .par_iter()
            .zip(bars.par_iter())
            .filter(|(item, bar)| upload_one(item, session, cfg, bar).is_err())
            .count()
    });
    Ok(failures)
}

fn upload_one(item: &BatchItem, session: &Session, cfg: &UploaderConfig, bar: &ProgressBar) -> Result<()> {
    let label = item.file.display().to_string();
    let result = Uploader::with_session(session.clone(), cfg.clone())
        .context("failed to create uploader")
        .and_then(|mut uploader| {
            let mut reporter = |phase: Phase, percent: u8| {
                bar.set_message(format!("{label} {phase}"));
                bar.set_position(percent as u64);
            };
            Ok(uploader.upload(&item.file, &item.metadata, &mut reporter)?)
        });

    match result {
        Ok(outcome) => {
            bar.finish_with_message(format!("{label} done"));
            bar.suspend(|| print_outcome(&item.file, &outcome));
            Ok(())
        }
        Err(e) => {
            bar.abandon_with_message(format!("{label} failed"));
            bar.suspend(|| error!("{label}: {e:#}"));
            Err(e)
        }
    }
}

fn print_outcome(file: &Path, outcome: &UploadOutcome) {
    println!("{} -> {}", file.display(), outcome.url());
    for warning in &outcome.warnings {
        warn!("{}: {warning}", file.display());
    }
}
