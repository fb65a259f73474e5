use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use anime_motion::leonardo::{LeonardoClient, LeonardoError, PollConfig, LEONARDO_API_KEY_ENV};
use anime_motion::pipeline::{self, PipelineOptions};

/// Parse and validate clip duration (1-60 seconds)
fn parse_duration(s: &str) -> Result<u32, String> {
    let secs: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid duration", s))?;
    if !(1..=60).contains(&secs) {
        return Err(format!(
            "Duration must be between 1 and 60 seconds, got {}",
            secs
        ));
    }
    Ok(secs)
}

/// Parse and validate poll interval (1-60 seconds)
fn parse_poll_interval(s: &str) -> Result<u64, String> {
    let secs: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number of seconds", s))?;
    if !(1..=60).contains(&secs) {
        return Err(format!(
            "Poll interval must be between 1 and 60 seconds, got {}",
            secs
        ));
    }
    Ok(secs)
}

/// Parse and validate poll timeout (1-3600 seconds)
fn parse_poll_timeout(s: &str) -> Result<u64, String> {
    let secs: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number of seconds", s))?;
    if !(1..=3600).contains(&secs) {
        return Err(format!(
            "Timeout must be between 1 and 3600 seconds, got {}",
            secs
        ));
    }
    Ok(secs)
}

/// anime-motion: generate an anime still and animate it into a motion video
#[derive(Parser)]
#[command(name = "anime-motion")]
#[command(version, about = "Prompt-to-motion-video generator using Leonardo.ai")]
#[command(long_about = "Reads a text prompt from a file, generates an anime-style \
    image via the Leonardo.ai API, then animates that image into a short motion \
    video. The intermediate image is deleted once the video is downloaded.")]
#[command(after_help = "EXAMPLES:
    # Run with the defaults (prompt.txt -> anime_motion_video.mp4)
    anime-motion

    # Custom prompt file and output path
    anime-motion --prompt-file ideas/fox.txt --output fox.mp4

    # Zoom instead of pan, shorter clip
    anime-motion --direction zoom_in --duration 10

ENVIRONMENT:
    LEONARDO_API_KEY    Required. Your Leonardo.ai API key (also read from .env).")]
struct Cli {
    /// Path to the UTF-8 prompt file
    #[arg(long, default_value = "prompt.txt")]
    prompt_file: PathBuf,

    /// Path for the intermediate image (deleted after the video is ready)
    #[arg(long, default_value = "generated_anime.png")]
    image_output: PathBuf,

    /// Path for the final motion video
    #[arg(long, short = 'o', default_value = "anime_motion_video.mp4")]
    output: PathBuf,

    /// Camera motion direction (e.g. pan_left, pan_right, zoom_in, zoom_out)
    #[arg(long, short = 'd', default_value = "pan_left")]
    direction: String,

    /// Video clip duration in seconds (1-60)
    #[arg(long, default_value = "30", value_parser = parse_duration)]
    duration: u32,

    /// Seconds between job status queries (1-60)
    #[arg(long, default_value = "5", value_parser = parse_poll_interval)]
    poll_interval: u64,

    /// Seconds to wait for a job before giving up (1-3600)
    #[arg(long, default_value = "300", value_parser = parse_poll_timeout)]
    timeout: u64,
}

/// Load .env file before reading the API key.
///
/// Does not override variables already present in the environment.
fn load_env() {
    // dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

fn main() {
    load_env();

    let cli = Cli::parse();

    let client = match LeonardoClient::new() {
        Ok(client) => client,
        Err(LeonardoError::MissingApiKey) => {
            eprintln!("Error: {} environment variable is not set.", LEONARDO_API_KEY_ENV);
            eprintln!();
            eprintln!("Add your API key to a .env file:");
            eprintln!("    echo 'LEONARDO_API_KEY=your-api-key-here' >> .env");
            eprintln!();
            eprintln!("Or set it as an environment variable:");
            eprintln!("    export LEONARDO_API_KEY=\"your-api-key-here\"");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: Failed to create Leonardo.ai client: {}", e);
            std::process::exit(1);
        }
    };

    let options = PipelineOptions {
        prompt_file: cli.prompt_file,
        image_output: cli.image_output,
        video_output: cli.output,
        direction: cli.direction,
        duration_seconds: cli.duration,
        poll: PollConfig {
            interval: Duration::from_secs(cli.poll_interval),
            timeout: Duration::from_secs(cli.timeout),
        },
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            std::process::exit(1);
        }
    };

    match rt.block_on(pipeline::run(&client, &options)) {
        Ok(video_path) => {
            println!("Video ready! File saved at: {}", video_path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
