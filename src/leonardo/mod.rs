//! Leonardo.ai API integration module.
//!
//! Provides a typed client for the text-to-image and image-to-motion-video
//! endpoints: job submission, fixed-interval status polling, and asset
//! download.

mod client;

pub use client::{
    validate_prompt, ImageParams, JobResponse, JobResult, JobStatus, LeonardoClient,
    LeonardoError, MotionParams, PollConfig, DEFAULT_IMAGE_MODEL, IMAGE_GENERATIONS_ENDPOINT,
    LEONARDO_API_BASE_URL, LEONARDO_API_KEY_ENV, MOTION_GENERATIONS_ENDPOINT,
};
