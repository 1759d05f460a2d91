//! Live-feed item recognition against a local inference endpoint.

pub mod frames;
pub mod poller;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use frames::DirFrames;
pub use poller::{PollError, PredictionPoller};

/// One of the endpoint's top-k guesses. Confidence is a percentage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub class: String,
    pub confidence: f64,
}

#[async_trait]
pub trait FrameSource: Send {
    /// Next JPEG frame, or `None` when the source is exhausted.
    async fn next_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>>;
}
