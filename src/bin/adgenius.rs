//! CLI for AdGenius - advertising video generation.

use adgenius::history::{FileStorage, HistoryStore};
use adgenius::progress::VideoState;
use adgenius::{
    AdGeniusError, AspectRatio, GeminiPromptProvider, ImageAsset, ImageRole, PromptConfig,
    PromptProvider, Settings, Studio, VeoProvider, VideoProvider, DURATION_PRESETS, STYLES, TONES,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "adgenius")]
#[command(about = "Write cinematic ad prompts with Gemini and render them with Veo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video prompt from a product brief
    Prompt(BriefArgs),

    /// Generate a prompt (unless given) and render it as a video
    Video(VideoArgs),

    /// List recent generations
    History,

    /// List visual styles, tones and duration presets
    Styles,

    /// Check that both services are reachable with the current key
    Check,
}

#[derive(Args)]
struct BriefArgs {
    /// Product name
    #[arg(long)]
    product: String,

    /// Target audience
    #[arg(long)]
    audience: Option<String>,

    /// Visual style (see `adgenius styles`)
    #[arg(long)]
    style: Option<String>,

    /// Tone of voice
    #[arg(long)]
    tone: Option<String>,

    /// Target duration, e.g. "15" or "15 seconds"
    #[arg(long)]
    duration: Option<String>,

    /// Scene flow
    #[arg(long)]
    storyboard: Option<String>,

    /// Voice-over script
    #[arg(long)]
    voice_script: Option<String>,

    /// Mood reference image (repeatable)
    #[arg(long, value_name = "PATH")]
    mood: Vec<PathBuf>,

    /// Talent image (repeatable)
    #[arg(long, value_name = "PATH")]
    talent: Vec<PathBuf>,

    /// Product image (repeatable)
    #[arg(long, value_name = "PATH")]
    product_image: Vec<PathBuf>,
}

#[derive(Args)]
struct VideoArgs {
    #[command(flatten)]
    brief: BriefArgs,

    /// Use this prompt instead of generating one
    #[arg(long)]
    prompt: Option<String>,

    /// Aspect ratio
    #[arg(long, value_enum, default_value = "16:9")]
    aspect_ratio: AspectRatioArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    adgenius::logging::init(cli.verbose);

    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Prompt(args) => generate_prompt(&settings, args, cli.json).await?,
        Commands::Video(args) => generate_video(&settings, args, cli.json).await?,
        Commands::History => list_history(&settings, cli.json)?,
        Commands::Styles => list_styles(cli.json)?,
        Commands::Check => check(&settings, cli.json).await?,
    }

    Ok(())
}

/// Puts the re-authentication hint in front of errors that need it.
fn with_hint(err: AdGeniusError) -> anyhow::Error {
    match err.hint() {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}

fn apply_brief(studio: &mut Studio, brief: &BriefArgs) -> anyhow::Result<()> {
    let mut config = PromptConfig::new(&brief.product);
    if let Some(audience) = &brief.audience {
        config = config.with_target_audience(audience);
    }
    if let Some(style) = &brief.style {
        if !STYLES.contains(&style.as_str()) {
            tracing::warn!(style = %style, "style is not one of the presets");
        }
        config = config.with_style(style);
    }
    if let Some(tone) = &brief.tone {
        config = config.with_tone(tone);
    }
    if let Some(duration) = &brief.duration {
        config = config.with_duration(duration);
    }
    if let Some(storyboard) = &brief.storyboard {
        config = config.with_storyboard(storyboard);
    }
    if let Some(script) = &brief.voice_script {
        config = config.with_voice_script(script);
    }
    studio.set_config(config);

    for role in ImageRole::ALL {
        let paths = match role {
            ImageRole::Mood => &brief.mood,
            ImageRole::Talent => &brief.talent,
            ImageRole::Product => &brief.product_image,
        };
        for path in paths {
            studio.add_image(ImageAsset::from_path(role, path)?);
        }
    }
    Ok(())
}

async fn generate_prompt(
    settings: &Settings,
    args: BriefArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut studio = Studio::from_settings(settings).await?;
    apply_brief(&mut studio, &args)?;

    let prompt = studio
        .generate_prompt()
        .await
        .map_err(with_hint)?
        .to_string();

    if json_output {
        let result = serde_json::json!({
            "type": "prompt",
            "success": true,
            "product": args.product,
            "images": studio.images().len(),
            "prompt": prompt,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{prompt}");
    }

    Ok(())
}

async fn generate_video(
    settings: &Settings,
    args: VideoArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut studio = Studio::from_settings(settings).await?;
    apply_brief(&mut studio, &args.brief)?;
    studio.set_aspect_ratio(args.aspect_ratio.into());

    match args.prompt {
        Some(prompt) => studio.set_prompt(prompt),
        None => {
            let prompt = studio.generate_prompt().await.map_err(with_hint)?;
            if !json_output {
                eprintln!("Prompt:\n{prompt}\n");
            }
        }
    }

    let mut last_message = String::new();
    let entry = studio
        .create_video(|state: &VideoState| {
            if state.is_generating && state.message != last_message {
                eprintln!("[{:>3}%] {}", state.progress, state.message);
                last_message.clone_from(&state.message);
            }
        })
        .await
        .map_err(with_hint)?;

    let output = entry.video_url.clone().unwrap_or_default();
    if json_output {
        let result = serde_json::json!({
            "type": "video",
            "success": true,
            "output": output,
            "entry": entry,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Generated video: {output}");
        println!("Product: {}", entry.product_name);
        println!("History id: {}", entry.id);
    }

    Ok(())
}

fn list_history(settings: &Settings, json_output: bool) -> anyhow::Result<()> {
    let history = HistoryStore::load(Arc::new(FileStorage::new(&settings.data_dir)));

    if json_output {
        println!("{}", serde_json::to_string_pretty(history.entries())?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No generations yet.");
        return Ok(());
    }

    for entry in history.entries() {
        let when = entry
            .created_at()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| entry.id.clone());
        println!("{} {} [{:?}]", when, entry.product_name, entry.status);
        if let Some(url) = &entry.video_url {
            println!("    {url}");
        }
    }

    Ok(())
}

fn list_styles(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({
            "styles": STYLES,
            "tones": TONES,
            "durations": DURATION_PRESETS,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("STYLES:");
    for style in STYLES {
        println!("  {style}");
    }
    println!("\nTONES:");
    for tone in TONES {
        println!("  {tone}");
    }
    println!("\nDURATIONS:");
    for secs in DURATION_PRESETS {
        println!("  {secs} seconds");
    }

    Ok(())
}

async fn check(settings: &Settings, json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct CheckResult {
        name: String,
        ok: bool,
        error: Option<String>,
    }

    let mut prompt = GeminiPromptProvider::builder();
    let mut video = VeoProvider::builder();
    if let Some(key) = &settings.api_key {
        prompt = prompt.api_key(key.clone());
        video = video.api_key(key.clone());
    }
    let prompt: Arc<dyn PromptProvider> = Arc::new(prompt.build()?);
    let video: Arc<dyn VideoProvider> = Arc::new(video.build()?);

    let results = vec![
        result(prompt.name(), prompt.health_check().await),
        result(video.name(), video.health_check().await),
    ];

    fn result(name: &str, outcome: adgenius::Result<()>) -> CheckResult {
        CheckResult {
            name: name.to_string(),
            ok: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for r in &results {
            let status = if r.ok { "✓" } else { "✗" };
            println!("  {} {}", status, r.name);
            if let Some(error) = &r.error {
                println!("    {error}");
            }
        }
    }

    if results.iter().any(|r| !r.ok) {
        anyhow::bail!("one or more services are unavailable");
    }
    Ok(())
}
