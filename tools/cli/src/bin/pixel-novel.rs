use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pixel_novel::{
    compose_frame, story, Canvas, EditCommand, FileStore, FrameAssets, LayoutMode, Mode,
    OverridePersistence, SceneStore, Session, SystemClock,
};
use pixel_novel_assets::{AssetManifest, AssetStore};
use pixel_novel_runtime::{
    default_audio, run_winit, AsyncImageLoader, ImageSource, PresenterApp, PresenterConfig,
    PresenterInput, ResolvedConfig, SceneImages,
};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Pixel-art story presenter")]
struct Cli {
    /// Log ignored input and other debug detail.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the presenter window.
    Play {
        #[command(flatten)]
        settings: Settings,
        /// Window scale; picked from the monitor when omitted.
        #[arg(long)]
        scale: Option<u32>,
        #[arg(long, default_value_t = false)]
        mute: bool,
    },
    /// Print the story with stored overrides applied.
    Dump {
        #[command(flatten)]
        settings: Settings,
        #[arg(long, value_enum, default_value_t = DumpFormat::Json)]
        format: DumpFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render one scene to a PNG without opening a window.
    Frame {
        #[command(flatten)]
        settings: Settings,
        /// Zero-based scene index.
        #[arg(long, default_value_t = 0)]
        scene: usize,
        /// Draw the editor HUD.
        #[arg(long, default_value_t = false)]
        edit: bool,
        /// Draw the 8 px alignment grid.
        #[arg(long, default_value_t = false)]
        grid: bool,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Build an asset manifest with sha256 hashes.
    Manifest {
        assets: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Fail when an image the story needs is missing.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Forget every stored scene edit.
    Reset {
        #[command(flatten)]
        settings: Settings,
    },
}

/// Options shared by every command that reads the presenter config.
#[derive(clap::Args)]
struct Settings {
    /// Presenter TOML; defaults to the per-user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Directory holding the stored scene overrides.
    #[arg(long)]
    storage: Option<PathBuf>,
    #[arg(long, value_enum)]
    layout: Option<LayoutChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutChoice {
    Overlay,
    ReservedBand,
}

impl From<LayoutChoice> for LayoutMode {
    fn from(choice: LayoutChoice) -> Self {
        match choice {
            LayoutChoice::Overlay => LayoutMode::Overlay,
            LayoutChoice::ReservedBand => LayoutMode::ReservedBand,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Command::Play {
            settings,
            scale,
            mute,
        } => {
            let mut config = settings.load()?;
            config.scale = scale.or(config.scale);
            config.mute |= mute;
            play(&config)
        }
        Command::Dump {
            settings,
            format,
            output,
        } => {
            let config = settings.load()?.resolve(None);
            let text = dump_story(&load_story(&config)?, format)?;
            match output {
                Some(path) => write_output(&path, text.as_bytes()),
                None => {
                    println!("{text}");
                    Ok(())
                }
            }
        }
        Command::Frame {
            settings,
            scene,
            edit,
            grid,
            output,
        } => {
            let config = settings.load()?.resolve(None);
            render_frame(&config, scene, edit, grid, &output)
        }
        Command::Manifest {
            assets,
            output,
            strict,
        } => {
            let manifest = build_manifest(&assets)?;
            let missing = missing_story_assets(&manifest);
            for path in &missing {
                warn!("story asset missing from {}: {path}", assets.display());
            }
            if strict && !missing.is_empty() {
                bail!("{} story asset(s) missing", missing.len());
            }
            let json = manifest.to_json().context("serialize manifest")?;
            write_output(&output, json.as_bytes())?;
            info!(assets = manifest.assets.len(), "manifest written to {}", output.display());
            Ok(())
        }
        Command::Reset { settings } => {
            let config = settings.load()?.resolve(None);
            let mut persistence = OverridePersistence::new(FileStore::new(&config.storage_dir));
            persistence
                .reset()
                .with_context(|| format!("reset {}", config.storage_dir.display()))?;
            info!("stored scene edits removed");
            Ok(())
        }
    }
}

impl Settings {
    fn load(&self) -> Result<PresenterConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(PresenterConfig::default_config_path);
        let mut config = PresenterConfig::load_or_default(&path)
            .with_context(|| format!("read {}", path.display()))?;
        if let Some(assets) = &self.assets {
            config.assets_root = Some(assets.clone());
        }
        if let Some(storage) = &self.storage {
            config.storage_dir = Some(storage.clone());
        }
        if let Some(layout) = self.layout {
            config.layout = layout.into();
        }
        Ok(config)
    }
}

fn open_assets(config: &ResolvedConfig) -> Result<AssetStore> {
    let store = AssetStore::new(
        config.assets_root.clone(),
        config.security_mode,
        config.manifest_path.clone(),
        config.require_manifest,
    )
    .with_context(|| format!("open assets at {}", config.assets_root.display()))?;
    Ok(store.with_cache_budget(config.asset_cache_budget_bytes))
}

fn load_story(config: &ResolvedConfig) -> Result<SceneStore> {
    let mut store = story::default_store()?;
    let persistence = OverridePersistence::new(FileStore::new(&config.storage_dir));
    let applied = persistence.load(&mut store);
    info!(applied, "stored overrides loaded from {}", config.storage_dir.display());
    Ok(store)
}

fn play(config: &PresenterConfig) -> Result<()> {
    let resolved = config.resolve(None);
    let store = story::default_store()?;
    let assets = open_assets(&resolved)?;
    let loader = AsyncImageLoader::new(assets);
    let images = SceneImages::request_all(&loader, &store);

    let app = PresenterApp::new(
        store,
        Session::new().with_advance_delay(resolved.advance_delay),
        OverridePersistence::new(FileStore::new(&resolved.storage_dir)),
        PresenterInput::default(),
        default_audio(resolved.mute),
        SystemClock::new(),
        resolved.layout,
        images,
    );
    run_winit(app, config).context("presenter loop")?;
    drop(loader);
    Ok(())
}

fn dump_story(store: &SceneStore, format: DumpFormat) -> Result<String> {
    Ok(match format {
        DumpFormat::Json => store.to_pretty_json()?,
        DumpFormat::Yaml => serde_yaml::to_string(store.scenes()).context("serialize story")?,
    })
}

fn render_frame(
    config: &ResolvedConfig,
    scene: usize,
    edit: bool,
    grid: bool,
    output: &Path,
) -> Result<()> {
    let mut store = load_story(config)?;
    let mut session = Session::at(scene, &store)?;
    if edit || grid {
        session = session.with_mode(Mode::Editing);
    }
    if grid {
        session.apply(
            EditCommand::ToggleGrid,
            &mut store,
            config.layout.playfield(),
            None,
        );
    }
    if !edit {
        session = session.with_mode(Mode::Viewing);
    }

    let assets = open_assets(config)?;
    let load = |path: &str| match ImageSource::load_image(&assets, path) {
        Ok(image) => Some(image),
        Err(err) => {
            warn!("Failed to load {path}: {err}");
            None
        }
    };
    let background = load(&store.scene(scene)?.background);
    let sprite = load(story::SPRITE_PATH);

    let (width, height) = config.layout.canvas_size();
    let mut canvas = Canvas::new(width, height);
    let summary = compose_frame(
        &mut canvas,
        &store,
        &session,
        config.layout,
        FrameAssets {
            background: background.as_ref(),
            sprite: sprite.as_ref(),
        },
    );
    info!(?summary, "scene {scene} composed");

    let image = image::RgbaImage::from_raw(width, height, canvas.into_bytes())
        .context("frame buffer size")?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    image
        .save(output)
        .with_context(|| format!("write {}", output.display()))?;
    Ok(())
}

fn build_manifest(root: &Path) -> Result<AssetManifest> {
    let mut manifest = AssetManifest::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        manifest.insert(&rel.to_string_lossy(), &bytes);
    }
    Ok(manifest)
}

fn missing_story_assets(manifest: &AssetManifest) -> Vec<String> {
    let scenes = story::valley_of_light().len();
    story::asset_manifest(scenes)
        .into_iter()
        .filter(|path| manifest.get(path).is_none())
        .collect()
}

fn write_output(output: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, bytes).with_context(|| format!("write {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_novel::{KeyValueStore, OVERRIDES_KEY};

    fn config_for(dir: &Path) -> ResolvedConfig {
        PresenterConfig {
            assets_root: Some(dir.join("assets")),
            storage_dir: Some(dir.join("state")),
            ..PresenterConfig::default()
        }
        .resolve(None)
    }

    #[test]
    fn manifest_lists_nested_files_and_reports_missing_story_assets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("extra")).expect("mkdir");
        fs::write(root.join("background1.png"), b"one").expect("write");
        fs::write(root.join("extra").join("notes.txt"), b"two").expect("write");

        let manifest = build_manifest(root).expect("manifest");
        assert_eq!(manifest.assets.len(), 2);
        assert_eq!(manifest.get("extra/notes.txt").map(|e| e.size), Some(3));

        let missing = missing_story_assets(&manifest);
        assert_eq!(missing.len(), 10);
        assert!(!missing.contains(&"background1.png".to_string()));
        assert!(missing.contains(&story::SPRITE_PATH.to_string()));
    }

    #[test]
    fn dump_applies_stored_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_for(dir.path());
        FileStore::new(&config.storage_dir)
            .set(OVERRIDES_KEY, r#"[null,{"caption":"off"}]"#)
            .expect("seed overrides");

        let store = load_story(&config).expect("story");
        let json = dump_story(&store, DumpFormat::Json).expect("json");
        assert!(json.contains(r#""caption": "off""#));

        let yaml = dump_story(&store, DumpFormat::Yaml).expect("yaml");
        assert_eq!(yaml.matches("caption:").count(), 1);
        assert!(yaml.contains("In a quiet valley,"));
    }

    #[test]
    fn frame_renders_without_assets() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("assets")).expect("mkdir");
        let config = config_for(dir.path());
        let output = dir.path().join("out").join("scene.png");

        render_frame(&config, 3, true, true, &output).expect("render");
        let image = image::open(&output).expect("png").to_rgba8();
        assert_eq!(image.dimensions(), (160, 144));

        assert!(render_frame(&config, 10, false, false, &output).is_err());
    }
}
