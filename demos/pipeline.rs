//! End-to-end ad generation: brief, prompt, video, history.
//!
//! Run with: `cargo run --example pipeline -- path/to/product.png`
//!
//! Requires `GOOGLE_API_KEY` for a billing-enabled project.

use adgenius::{AspectRatio, ImageAsset, ImageRole, PromptConfig, Settings, Studio};

#[tokio::main]
async fn main() -> adgenius::Result<()> {
    let settings = Settings::from_env()?;
    let mut studio = Studio::from_settings(&settings).await?;

    studio.set_config(
        PromptConfig::new("Kopi Senja")
            .with_target_audience("Young urban professionals")
            .with_duration_secs(10)
            .with_storyboard("Pour shot, steam rising, first sip at golden hour"),
    );
    if let Some(path) = std::env::args().nth(1) {
        studio.add_image(ImageAsset::from_path(ImageRole::Product, path)?);
    }
    studio.set_aspect_ratio(AspectRatio::Portrait);

    println!("Writing prompt...");
    println!("{}\n", studio.generate_prompt().await?);

    println!("Generating video (this may take a few minutes)...");
    let entry = studio
        .create_video(|state| println!("[{:>3}%] {}", state.progress, state.message))
        .await?;

    println!(
        "Saved {} ({} entries in history)",
        entry.video_url.as_deref().unwrap_or_default(),
        studio.history().len()
    );

    Ok(())
}
