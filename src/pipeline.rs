//! End-to-end prompt-to-motion-video pipeline.
//!
//! Sequences the whole workflow: read a prompt file, generate an anime-style
//! image, download it, animate it into a motion video, download that, and
//! clean up the intermediate image. Each stage's output URL is the next
//! stage's input; any stage failure aborts the run.

use std::path::{Path, PathBuf};

use crate::leonardo::{
    validate_prompt, ImageParams, LeonardoClient, LeonardoError, MotionParams, PollConfig,
    IMAGE_GENERATIONS_ENDPOINT, MOTION_GENERATIONS_ENDPOINT,
};

/// Options for a pipeline run.
///
/// Defaults reproduce the stock workflow: `prompt.txt` in, a temporary
/// `generated_anime.png`, and `anime_motion_video.mp4` out.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Path to the UTF-8 prompt file.
    pub prompt_file: PathBuf,
    /// Where the intermediate image is written (deleted after use).
    pub image_output: PathBuf,
    /// Where the final video is written.
    pub video_output: PathBuf,
    /// Camera motion direction for the video stage.
    pub direction: String,
    /// Video clip duration in seconds.
    pub duration_seconds: u32,
    /// Polling interval and timeout, shared by both jobs.
    pub poll: PollConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            prompt_file: PathBuf::from("prompt.txt"),
            image_output: PathBuf::from("generated_anime.png"),
            video_output: PathBuf::from("anime_motion_video.mp4"),
            direction: "pan_left".to_string(),
            duration_seconds: 30,
            poll: PollConfig::default(),
        }
    }
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Prompt file '{path}' not found: {source}")]
    PromptFile {
        /// Path that was expected to contain the prompt.
        path: PathBuf,
        /// Underlying read error.
        source: std::io::Error,
    },

    #[error(transparent)]
    Leonardo(#[from] LeonardoError),
}

/// Read and trim the prompt file.
fn read_prompt(path: &Path) -> Result<String, PipelineError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PipelineError::PromptFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.trim().to_string())
}

/// Run the full image-to-motion-video workflow.
///
/// Steps:
/// 1. Read the prompt file (fails before any network call if missing/empty).
/// 2. Submit image generation, poll to completion, download the image.
/// 3. Submit motion generation against the image URL, poll, download the video.
/// 4. Best-effort delete of the intermediate image; a cleanup failure is
///    logged but does not fail the run.
///
/// Returns the path of the downloaded video.
pub async fn run(
    client: &LeonardoClient,
    options: &PipelineOptions,
) -> Result<PathBuf, PipelineError> {
    let prompt = read_prompt(&options.prompt_file)?;
    validate_prompt(&prompt).map_err(PipelineError::Leonardo)?;

    // Stage 1: anime image
    println!("Starting image generation...");
    let image_job_id = client
        .submit_image_generation(&prompt, &ImageParams::default())
        .await?;
    log::info!("Image generation submitted, job id: {}", image_job_id);

    let image_job = client
        .wait_for_completion(&image_job_id, IMAGE_GENERATIONS_ENDPOINT, &options.poll)
        .await?;
    let image_url = image_job
        .first_result_url()
        .ok_or(LeonardoError::MissingResultUrl)?
        .to_string();

    client.download_asset(&image_url, &options.image_output).await?;
    println!("Downloaded asset to {}", options.image_output.display());

    // Stage 2: motion video from the generated image
    println!(
        "Starting motion video generation ({}s)...",
        options.duration_seconds
    );
    let motion_params = MotionParams {
        direction: options.direction.clone(),
        duration_seconds: options.duration_seconds,
        ..MotionParams::default()
    };
    let video_job_id = client
        .submit_motion_generation(&image_url, &motion_params)
        .await?;
    log::info!("Motion generation submitted, job id: {}", video_job_id);

    let video_job = client
        .wait_for_completion(&video_job_id, MOTION_GENERATIONS_ENDPOINT, &options.poll)
        .await?;
    let video_url = video_job
        .first_result_url()
        .ok_or(LeonardoError::MissingResultUrl)?;

    client.download_asset(video_url, &options.video_output).await?;
    println!("Downloaded asset to {}", options.video_output.display());

    // Stage 3: cleanup of the intermediate image, best effort only
    match std::fs::remove_file(&options.image_output) {
        Ok(()) => println!(
            "Removed temporary image file: {}",
            options.image_output.display()
        ),
        Err(e) => log::warn!(
            "Could not remove image file {}: {}",
            options.image_output.display(),
            e
        ),
    }

    Ok(options.video_output.clone())
}
