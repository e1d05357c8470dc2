use std::path::Path;

use anyhow::{bail, Context, Result};
use lineconfig::{AntialiasSetting, SceneFile, DEFAULT_SCROLL_PAGES};
use renderer::{
    Antialiasing, RenderPolicy, Renderer, RendererConfig, RendererError, SurfaceAlpha,
};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;

const DEFAULT_SURFACE: (u32, u32) = (1280, 720);

pub fn run(args: RunArgs) -> Result<()> {
    let scene = args
        .config
        .as_deref()
        .map(|path| {
            SceneFile::load(path)
                .with_context(|| format!("failed to load scene file {}", path.display()))
        })
        .transpose()?;
    if let Some(path) = args.config.as_deref() {
        tracing::debug!(path = %path.display(), "loaded scene file");
    }

    let config = build_renderer_config(&args, scene.as_ref())?;
    tracing::info!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        policy = ?config.policy,
        lines = config.lines.resolve().visible_lines(),
        "starting floatlines"
    );

    match Renderer::new(config).run() {
        Ok(Some(path)) => {
            println!("{}", path.display());
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(RendererError::Unsupported(reason)) => {
            tracing::warn!(%reason, "rendering unavailable; exiting without drawing");
            Ok(())
        }
        Err(RendererError::Other(err)) => Err(err),
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merges the optional scene file with command-line overrides.
fn build_renderer_config(args: &RunArgs, scene: Option<&SceneFile>) -> Result<RendererConfig> {
    let mut lines = scene.map(|scene| scene.lines.clone()).unwrap_or_default();
    if let Some(waves) = &args.waves {
        lines.enabled_waves = waves.0.clone();
    }
    if let Some(gradient) = &args.gradient {
        lines.lines_gradient = Some(gradient.0.clone());
    }
    if args.no_interactive {
        lines.interactive = false;
    }
    if args.no_parallax {
        lines.parallax = false;
    }

    let scene_size = match scene {
        Some(scene) => scene.window.dimensions()?,
        None => None,
    };
    let surface_size = args.size.or(scene_size).unwrap_or(DEFAULT_SURFACE);

    let target_fps = args
        .fps
        .or_else(|| scene.and_then(|scene| scene.window.fps))
        .filter(|fps| *fps > 0.0);
    let time = args
        .still_time
        .or_else(|| scene.and_then(SceneFile::still_seconds));

    let policy = if let Some(path) = &args.export {
        ensure_png(path)?;
        RenderPolicy::Export {
            time,
            path: path.clone(),
        }
    } else if args.still {
        RenderPolicy::Still { time }
    } else {
        RenderPolicy::Animate { target_fps }
    };

    let antialiasing = args
        .antialias
        .or_else(|| scene.and_then(|scene| scene.window.antialias))
        .map(map_antialias)
        .unwrap_or_default();
    let transparent = args.transparent || scene.is_some_and(|scene| scene.window.transparent);

    Ok(RendererConfig {
        surface_size,
        lines,
        policy,
        antialiasing,
        color_space: args.color_space,
        surface_alpha: if transparent {
            SurfaceAlpha::Transparent
        } else {
            SurfaceAlpha::Opaque
        },
        scroll_pages: scene
            .map(|scene| scene.window.scroll_pages)
            .unwrap_or(DEFAULT_SCROLL_PAGES),
    })
}

fn ensure_png(path: &Path) -> Result<()> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Ok(()),
        None => bail!("export path has no extension; expected .png"),
        Some(other) => bail!("unsupported export format '.{other}'; expected .png"),
    }
}

fn map_antialias(setting: AntialiasSetting) -> Antialiasing {
    match setting {
        AntialiasSetting::Auto => Antialiasing::Auto,
        AntialiasSetting::Off => Antialiasing::Off,
        other => other
            .samples()
            .map(Antialiasing::Samples)
            .unwrap_or_default(),
    }
}
