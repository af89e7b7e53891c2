//! audio-trim Command Line Interface
//!
//! Fetch an audio file, keep a time window and save it as WAV.

use audio_trim::core::format_clock;
use audio_trim::decoder::Decoder;
use audio_trim::fetch::{FetchProgress, Fetcher, NoProgress};
use audio_trim::processor::{PRESET_TRIMS, PresetTrim};
use audio_trim::{
    DefaultFetcher, Orchestrator, PipelineState, ProgressDetail, SymphoniaDecoder, TimeRange,
    TrimError, TrimOptions, TrimOutcome, TrimRequest,
};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "audio-trim")]
#[command(about = "Trim remote or local audio files to WAV", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trim audio to a time window and save it as WAV
    Trim {
        /// Source URL (http, https, file) or local path
        #[arg(value_name = "URL")]
        url: String,

        /// Window start in seconds
        #[arg(short, long, requires = "end", conflicts_with = "preset")]
        start: Option<f64>,

        /// Window end in seconds
        #[arg(short, long, requires = "start", conflicts_with = "preset")]
        end: Option<f64>,

        /// Preset trim from the beginning (see `presets`)
        #[arg(short, long)]
        preset: Option<String>,

        /// Output file (defaults to the suggested filename)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// WAV conversion deadline in seconds
        #[arg(long, default_value = "30", conflicts_with = "no_timeout")]
        timeout: f64,

        /// Disable the WAV conversion deadline
        #[arg(long)]
        no_timeout: bool,

        /// Report stage transitions only
        #[arg(long)]
        coarse: bool,

        /// Save the untrimmed source if WAV conversion times out
        #[arg(long)]
        fallback_original: bool,
    },

    /// Fetch and decode audio, then print its properties
    Probe {
        /// Source URL (http, https, file) or local path
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List preset trims
    Presets,
}

struct TrimArgs {
    url: String,
    start: Option<f64>,
    end: Option<f64>,
    preset: Option<String>,
    output: Option<PathBuf>,
    timeout: f64,
    no_timeout: bool,
    coarse: bool,
    fallback_original: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    info!("audio-trim {}", audio_trim::VERSION);

    match cli.command {
        Commands::Trim {
            url,
            start,
            end,
            preset,
            output,
            timeout,
            no_timeout,
            coarse,
            fallback_original,
        } => trim(TrimArgs {
            url,
            start,
            end,
            preset,
            output,
            timeout,
            no_timeout,
            coarse,
            fallback_original,
        })?,
        Commands::Probe { url } => probe(&url)?,
        Commands::Presets => {
            for preset in PRESET_TRIMS.iter() {
                println!(
                    "{:<6} {:>5}  {}",
                    preset.label,
                    format_clock(preset.seconds),
                    preset.description
                );
            }
        }
    }

    Ok(())
}

fn requested_range(args: &TrimArgs) -> Result<TimeRange, TrimError> {
    match (&args.preset, args.start, args.end) {
        (Some(label), _, _) => {
            let preset = PresetTrim::find(label)
                .ok_or_else(|| TrimError::Range(format!("unknown preset '{}'", label)))?;
            // The selector clamps the end once the duration is known
            preset.range_for(None)
        }
        (None, Some(start), Some(end)) => TimeRange::new(start, end),
        _ => Err(TrimError::Range(
            "either --start and --end or --preset is required".to_string(),
        )),
    }
}

fn trim(args: TrimArgs) -> Result<(), Box<dyn std::error::Error>> {
    let range = requested_range(&args)?;

    let encode_timeout = if args.no_timeout {
        None
    } else {
        Some(Duration::try_from_secs_f64(args.timeout).map_err(|e| {
            TrimError::Range(format!("invalid timeout {}: {}", args.timeout, e))
        })?)
    };
    let detail = if args.coarse {
        ProgressDetail::Coarse
    } else {
        ProgressDetail::Detailed
    };
    let options = TrimOptions::default()
        .with_encode_timeout(encode_timeout)
        .with_progress_detail(detail);

    let orchestrator = Orchestrator::new(
        Arc::new(DefaultFetcher::new()?),
        Arc::new(SymphoniaDecoder::new()),
    )
    .with_options(options);

    println!(
        "Trimming {} from {} to {}",
        args.url,
        format_clock(range.start),
        format_clock(range.end)
    );

    let job = orchestrator.spawn(TrimRequest::new(args.url.clone(), range))?;
    for status in job.statuses() {
        if status.state != PipelineState::Error {
            println!("[{:>3}%] {}", status.progress, status.message);
        }
    }

    match job.wait() {
        TrimOutcome::Completed(artifact) => {
            let path = args
                .output
                .unwrap_or_else(|| PathBuf::from(artifact.filename()));
            artifact.write_to(&path)?;
            println!(
                "Saved {} ({} of audio, {} bytes)",
                path.display(),
                format_clock(artifact.duration().as_secs_f64()),
                artifact.bytes().len()
            );
            Ok(())
        }
        TrimOutcome::Failed {
            error,
            fallback: Some(original),
        } if args.fallback_original => {
            warn!("{}", error);
            println!("Downloading the original file instead...");
            let mut listener = |p: FetchProgress| {
                if let Some(fraction) = p.fraction() {
                    println!("[{:>3}%] Downloading original", (fraction * 100.0).round() as u8);
                }
            };
            let bytes = original.download(orchestrator.fetcher(), &mut listener)?;
            let path = PathBuf::from(original.filename());
            fs::write(&path, &bytes)?;
            println!("Saved {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }
        TrimOutcome::Failed { error, fallback } => {
            if let Some(original) = fallback {
                println!(
                    "The original file is still available: {} (rerun with --fallback-original)",
                    original.url()
                );
            }
            Err(error.into())
        }
        TrimOutcome::Cancelled => Err(TrimError::Cancelled.into()),
    }
}

fn probe(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = DefaultFetcher::new()?;
    let payload = fetcher.fetch(url, &mut NoProgress)?;
    let size = payload.len();
    let buffer = SymphoniaDecoder::new().decode(payload)?;

    println!("Source:      {}", url);
    println!("Size:        {} bytes", size);
    println!("Channels:    {}", buffer.channel_count());
    println!("Sample rate: {} Hz", buffer.sample_rate());
    println!("Frames:      {}", buffer.frames());
    println!("Duration:    {}", format_clock(buffer.duration_secs()));

    Ok(())
}
