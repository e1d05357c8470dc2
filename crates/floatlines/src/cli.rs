use std::path::PathBuf;

use clap::Parser;
use lineconfig::AntialiasSetting;
use linewave::Band;
use renderer::ColorSpaceMode;

#[derive(Parser, Debug)]
#[command(
    name = "floatlines",
    author,
    version,
    about = "Animated floating line-wave background",
    arg_required_else_help = false
)]
pub struct RunArgs {
    /// Scene TOML file; flags below override its values.
    #[arg(long, value_name = "FILE", env = "FLOATLINES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window size in logical pixels, or export size in pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = lineconfig::parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap for animation (0=uncapped).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Render a single still frame instead of animating continuously.
    #[arg(long)]
    pub still: bool,

    /// Timestamp in seconds to evaluate for still and export modes.
    #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
    pub still_time: Option<f32>,

    /// Render one frame on the CPU to the provided PNG path, then exit.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = lineconfig::parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,

    /// Bands to draw, comma separated (`top,middle,bottom`), or `none`.
    #[arg(long, value_name = "BANDS", value_parser = parse_waves)]
    pub waves: Option<WaveSelection>,

    /// Gradient stops as comma separated hex colours, or `none` for black lines.
    #[arg(long, value_name = "COLORS", value_parser = parse_gradient)]
    pub gradient: Option<GradientStops>,

    /// Ignore the pointer; lines never bend and clicks pass through.
    #[arg(long)]
    pub no_interactive: bool,

    /// Ignore scrolling; the scene never shifts.
    #[arg(long)]
    pub no_parallax: bool,

    /// Request a transparent window so the desktop shows between lines.
    #[arg(long)]
    pub transparent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveSelection(pub Vec<Band>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientStops(pub Vec<String>);

pub fn parse() -> RunArgs {
    RunArgs::parse()
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid FPS '{value}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err("FPS must be zero or positive".to_string());
    }
    Ok(fps)
}

pub fn parse_seconds(value: &str) -> Result<f32, String> {
    let seconds: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid timestamp '{value}'; expected seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("timestamp must be zero or positive".to_string());
    }
    Ok(seconds)
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_waves(value: &str) -> Result<WaveSelection, String> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(WaveSelection(Vec::new()));
    }

    let mut bands = Vec::with_capacity(3);
    for name in trimmed.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let band = Band::parse(name)
            .ok_or_else(|| format!("unknown wave '{name}'; expected top, middle, or bottom"))?;
        if !bands.contains(&band) {
            bands.push(band);
        }
    }
    if bands.is_empty() {
        return Err("wave list must not be empty; use `none` to hide every band".to_string());
    }
    Ok(WaveSelection(bands))
}

pub fn parse_gradient(value: &str) -> Result<GradientStops, String> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(GradientStops(Vec::new()));
    }

    let stops: Vec<String> = trimmed
        .split(',')
        .map(str::trim)
        .filter(|stop| !stop.is_empty())
        .map(str::to_string)
        .collect();
    if stops.is_empty() {
        return Err("gradient must list at least one colour, or `none`".to_string());
    }
    Ok(GradientStops(stops))
}
