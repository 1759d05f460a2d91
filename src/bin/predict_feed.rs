//! Replays a directory of JPEG frames against the prediction endpoint and
//! logs the top guesses for each frame.

use anyhow::Context;
use fridgemate::camera::{DirFrames, PredictionPoller};
use fridgemate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fridgemate::init_tracing("fridgemate=info,predict_feed=info");

    let config = AppConfig::from_env()?;
    let dir = config
        .predict
        .frames_dir
        .context("PREDICT_FRAMES_DIR must point at a directory of JPEG frames")?;
    let mut frames = DirFrames::open(&dir, true)?;
    if frames.is_empty() {
        anyhow::bail!("no JPEG frames in {}", dir.display());
    }

    tracing::info!(endpoint = %config.predict.endpoint, frames = frames.len(), "starting live feed");
    let poller = PredictionPoller::new(config.predict.endpoint)?;
    let stats = poller
        .run(&mut frames, |predictions| {
            for p in predictions {
                tracing::info!(class = %p.class, confidence = p.confidence, "prediction");
            }
        })
        .await?;

    tracing::info!(?stats, "feed finished");
    Ok(())
}
