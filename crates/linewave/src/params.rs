//! Parameter resolution for the line-wave background.
//!
//! `RenderConfig` is what callers (CLI flags, scene files, embedding code)
//! hand us: every field is optional in spirit and may carry nonsense. The
//! resolver never rejects input. Scalars broadcast to all three bands, arrays
//! index positionally as `[top, middle, bottom]`, and anything missing or
//! malformed falls back to the defaults below. The output, `ResolvedParams`,
//! is a small `Copy` value that the kernel and the GPU uniform block consume
//! directly.

use serde::{Deserialize, Deserializer, Serialize};

use crate::gradient::Gradient;

/// Kernel loop bound per band; counts above this are clamped.
pub const MAX_LINES_PER_BAND: u32 = 30;

pub const DEFAULT_LINE_COUNTS: [i64; 3] = [10, 15, 20];
pub const DEFAULT_LINE_DISTANCES: [f32; 3] = [8.0, 6.0, 4.0];
pub const DEFAULT_BEND_RADIUS: f32 = 5.0;
pub const DEFAULT_BEND_STRENGTH: f32 = -0.5;
pub const DEFAULT_PARALLAX_STRENGTH: f32 = 0.1;
pub const DEFAULT_GRADIENT: [&str; 3] = ["#D4A537", "#C9963A", "#A67C3D"];

pub const DEFAULT_TOP_POSITION: BandPosition = BandPosition::new(10.0, 0.5, -0.4);
pub const DEFAULT_MIDDLE_POSITION: BandPosition = BandPosition::new(5.0, 0.0, 0.2);
pub const DEFAULT_BOTTOM_POSITION: BandPosition = BandPosition::new(2.0, -0.7, 0.4);

/// One of the three independent groups of parallel lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Top,
    Middle,
    Bottom,
}

impl Band {
    /// Positional order used by per-band arrays.
    pub const ALL: [Band; 3] = [Band::Top, Band::Middle, Band::Bottom];

    /// Compositing order: the top band draws last.
    pub const DRAW_ORDER: [Band; 3] = [Band::Bottom, Band::Middle, Band::Top];

    pub const fn index(self) -> usize {
        match self {
            Band::Top => 0,
            Band::Middle => 1,
            Band::Bottom => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Band::Top => "top",
            Band::Middle => "middle",
            Band::Bottom => "bottom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Band::Top),
            "middle" => Some(Band::Middle),
            "bottom" => Some(Band::Bottom),
            _ => None,
        }
    }

    const fn default_position(self) -> BandPosition {
        match self {
            Band::Top => DEFAULT_TOP_POSITION,
            Band::Middle => DEFAULT_MIDDLE_POSITION,
            Band::Bottom => DEFAULT_BOTTOM_POSITION,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A per-band setting supplied either once for every band or as an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineSetting<T> {
    Uniform(T),
    PerBand(Vec<T>),
}

impl<T: Copy> LineSetting<T> {
    /// Value for `band`, or `None` when an array is too short.
    pub fn get(&self, band: Band) -> Option<T> {
        match self {
            LineSetting::Uniform(value) => Some(*value),
            LineSetting::PerBand(values) => values.get(band.index()).copied(),
        }
    }
}

/// Caller-facing placement override for a band; unset fields keep the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavePosition {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub rotate: Option<f32>,
}

/// Configuration of one mounted background, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Unknown names are dropped with a warning.
    #[serde(deserialize_with = "deserialize_bands")]
    pub enabled_waves: Vec<Band>,
    pub line_count: LineSetting<i64>,
    pub line_distance: LineSetting<f32>,
    pub bend_radius: f32,
    pub bend_strength: f32,
    pub interactive: bool,
    pub parallax: bool,
    pub parallax_strength: f32,
    /// `None` selects the default palette; an empty list means no stops.
    pub lines_gradient: Option<Vec<String>>,
    pub top_wave_position: Option<WavePosition>,
    pub middle_wave_position: Option<WavePosition>,
    pub bottom_wave_position: Option<WavePosition>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled_waves: Band::ALL.to_vec(),
            line_count: LineSetting::PerBand(DEFAULT_LINE_COUNTS.to_vec()),
            line_distance: LineSetting::PerBand(DEFAULT_LINE_DISTANCES.to_vec()),
            bend_radius: DEFAULT_BEND_RADIUS,
            bend_strength: DEFAULT_BEND_STRENGTH,
            interactive: true,
            parallax: true,
            parallax_strength: DEFAULT_PARALLAX_STRENGTH,
            lines_gradient: None,
            top_wave_position: None,
            middle_wave_position: None,
            bottom_wave_position: None,
        }
    }
}

impl RenderConfig {
    pub fn wave_position(&self, band: Band) -> Option<WavePosition> {
        match band {
            Band::Top => self.top_wave_position,
            Band::Middle => self.middle_wave_position,
            Band::Bottom => self.bottom_wave_position,
        }
    }

    /// Normalises the configuration into the uniform set the kernel consumes.
    pub fn resolve(&self) -> ResolvedParams {
        let bands = Band::ALL.map(|band| BandParams {
            enabled: self.enabled_waves.contains(&band),
            line_count: resolve_count(self.line_count.get(band), band),
            line_distance: resolve_distance(self.line_distance.get(band), band),
            position: resolve_position(self.wave_position(band), band),
        });

        let gradient = match &self.lines_gradient {
            Some(stops) => Gradient::from_hex(stops),
            None => Gradient::from_hex(&DEFAULT_GRADIENT),
        };

        ResolvedParams {
            bands,
            bend_radius: positive_or(self.bend_radius, DEFAULT_BEND_RADIUS),
            bend_strength: finite_or(self.bend_strength, DEFAULT_BEND_STRENGTH),
            interactive: self.interactive,
            parallax: self.parallax,
            parallax_strength: non_negative_or(self.parallax_strength, DEFAULT_PARALLAX_STRENGTH),
            gradient,
        }
    }
}

/// Resolved placement of a band in kernel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPosition {
    pub x: f32,
    pub y: f32,
    pub rotate: f32,
}

impl BandPosition {
    pub const fn new(x: f32, y: f32, rotate: f32) -> Self {
        Self { x, y, rotate }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandParams {
    pub enabled: bool,
    pub line_count: u32,
    pub line_distance: f32,
    pub position: BandPosition,
}

/// Fully resolved uniform set; one per mounted surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    /// Indexed by [`Band::index`].
    pub bands: [BandParams; 3],
    pub bend_radius: f32,
    pub bend_strength: f32,
    pub interactive: bool,
    pub parallax: bool,
    pub parallax_strength: f32,
    pub gradient: Gradient,
}

impl ResolvedParams {
    pub fn band(&self, band: Band) -> &BandParams {
        &self.bands[band.index()]
    }

    /// Number of lines the kernel will actually draw across enabled bands.
    pub fn visible_lines(&self) -> u32 {
        self.bands
            .iter()
            .filter(|band| band.enabled)
            .map(|band| band.line_count)
            .sum()
    }
}

impl Default for ResolvedParams {
    fn default() -> Self {
        RenderConfig::default().resolve()
    }
}

fn deserialize_bands<'de, D>(deserializer: D) -> Result<Vec<Band>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    let mut bands = Vec::with_capacity(names.len());
    for name in names {
        match Band::parse(&name) {
            Some(band) if !bands.contains(&band) => bands.push(band),
            Some(_) => {}
            None => tracing::warn!(%name, "ignoring unknown wave name"),
        }
    }
    Ok(bands)
}

fn resolve_count(value: Option<i64>, band: Band) -> u32 {
    let raw = value.unwrap_or(DEFAULT_LINE_COUNTS[band.index()]);
    raw.clamp(0, i64::from(MAX_LINES_PER_BAND)) as u32
}

fn resolve_distance(value: Option<f32>, band: Band) -> f32 {
    let fallback = DEFAULT_LINE_DISTANCES[band.index()];
    match value {
        Some(distance) if distance.is_finite() => distance.max(0.0),
        _ => fallback,
    }
}

fn resolve_position(value: Option<WavePosition>, band: Band) -> BandPosition {
    let fallback = band.default_position();
    let Some(position) = value else {
        return fallback;
    };
    BandPosition {
        x: position.x.map_or(fallback.x, |x| finite_or(x, fallback.x)),
        y: position.y.map_or(fallback.y, |y| finite_or(y, fallback.y)),
        rotate: position
            .rotate
            .map_or(fallback.rotate, |r| finite_or(r, fallback.rotate)),
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn non_negative_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let params = RenderConfig::default().resolve();
        assert_eq!(params.band(Band::Top).line_count, 10);
        assert_eq!(params.band(Band::Middle).line_count, 15);
        assert_eq!(params.band(Band::Bottom).line_count, 20);
        assert_eq!(params.band(Band::Top).line_distance, 8.0);
        assert_eq!(params.band(Band::Bottom).line_distance, 4.0);
        assert_eq!(params.band(Band::Middle).position, DEFAULT_MIDDLE_POSITION);
        assert_eq!(params.bend_radius, 5.0);
        assert_eq!(params.bend_strength, -0.5);
        assert_eq!(params.gradient.len(), 3);
        assert!(Band::ALL.iter().all(|band| params.band(*band).enabled));
    }

    #[test]
    fn scalar_settings_broadcast_to_every_band() {
        let config = RenderConfig {
            line_count: LineSetting::Uniform(7),
            line_distance: LineSetting::Uniform(2.5),
            ..RenderConfig::default()
        };
        let params = config.resolve();
        for band in Band::ALL {
            assert_eq!(params.band(band).line_count, 7);
            assert_eq!(params.band(band).line_distance, 2.5);
        }
    }

    #[test]
    fn short_arrays_fall_back_per_band() {
        let config = RenderConfig {
            line_count: LineSetting::PerBand(vec![3]),
            line_distance: LineSetting::PerBand(vec![]),
            ..RenderConfig::default()
        };
        let params = config.resolve();
        assert_eq!(params.band(Band::Top).line_count, 3);
        assert_eq!(params.band(Band::Middle).line_count, 15);
        assert_eq!(params.band(Band::Bottom).line_count, 20);
        assert_eq!(params.band(Band::Middle).line_distance, 6.0);
    }

    #[test]
    fn counts_and_distances_are_clamped() {
        let config = RenderConfig {
            line_count: LineSetting::PerBand(vec![-4, 500, 0]),
            line_distance: LineSetting::PerBand(vec![-1.0, f32::NAN, 0.5]),
            ..RenderConfig::default()
        };
        let params = config.resolve();
        assert_eq!(params.band(Band::Top).line_count, 0);
        assert_eq!(params.band(Band::Middle).line_count, MAX_LINES_PER_BAND);
        assert_eq!(params.band(Band::Bottom).line_count, 0);
        assert_eq!(params.band(Band::Top).line_distance, 0.0);
        assert_eq!(params.band(Band::Middle).line_distance, 6.0);
        assert_eq!(params.band(Band::Bottom).line_distance, 0.5);
    }

    #[test]
    fn invalid_scalars_take_defaults() {
        let config = RenderConfig {
            bend_radius: -2.0,
            bend_strength: f32::INFINITY,
            parallax_strength: -0.3,
            ..RenderConfig::default()
        };
        let params = config.resolve();
        assert_eq!(params.bend_radius, DEFAULT_BEND_RADIUS);
        assert_eq!(params.bend_strength, DEFAULT_BEND_STRENGTH);
        assert_eq!(params.parallax_strength, DEFAULT_PARALLAX_STRENGTH);
    }

    #[test]
    fn partial_positions_keep_remaining_defaults() {
        let config = RenderConfig {
            top_wave_position: Some(WavePosition {
                x: Some(1.0),
                y: None,
                rotate: Some(f32::NAN),
            }),
            ..RenderConfig::default()
        };
        let top = config.resolve().band(Band::Top).position;
        assert_eq!(top, BandPosition::new(1.0, 0.5, -0.4));
    }

    #[test]
    fn band_membership_controls_enablement() {
        let config = RenderConfig {
            enabled_waves: vec![Band::Middle, Band::Middle],
            ..RenderConfig::default()
        };
        let params = config.resolve();
        assert!(!params.band(Band::Top).enabled);
        assert!(params.band(Band::Middle).enabled);
        assert!(!params.band(Band::Bottom).enabled);
        assert_eq!(params.visible_lines(), 15);
    }

    #[test]
    fn explicit_empty_gradient_differs_from_missing() {
        let empty = RenderConfig {
            lines_gradient: Some(Vec::new()),
            ..RenderConfig::default()
        };
        assert!(empty.resolve().gradient.is_empty());
        assert_eq!(RenderConfig::default().resolve().gradient.len(), 3);
    }

    #[test]
    fn deserializes_scalar_or_array_settings() {
        let config: RenderConfig = toml::from_str(
            r##"
            enabled_waves = ["middle", "top"]
            line_count = 12
            line_distance = [1.0, 2.0, 3.0]
            lines_gradient = ["#fff"]
            bottom_wave_position = { rotate = 1.5 }
            "##,
        )
        .unwrap();
        assert_eq!(config.line_count, LineSetting::Uniform(12));
        assert_eq!(config.line_distance, LineSetting::PerBand(vec![1.0, 2.0, 3.0]));
        assert!(config.interactive);
        let params = config.resolve();
        assert_eq!(params.band(Band::Bottom).position.rotate, 1.5);
        assert_eq!(params.band(Band::Bottom).position.x, 2.0);
        assert!(!params.band(Band::Bottom).enabled);
    }

    #[test]
    fn unknown_wave_names_are_skipped() {
        let config: RenderConfig =
            toml::from_str(r#"enabled_waves = ["top", "sideways", "Bottom", "top"]"#).unwrap();
        assert_eq!(config.enabled_waves, vec![Band::Top, Band::Bottom]);
        let params = config.resolve();
        assert!(!params.band(Band::Middle).enabled);
        assert!(params.band(Band::Bottom).enabled);
    }

    #[test]
    fn parses_band_names_loosely() {
        assert_eq!(Band::parse(" Top "), Some(Band::Top));
        assert_eq!(Band::parse("MIDDLE"), Some(Band::Middle));
        assert_eq!(Band::parse("side"), None);
    }
}
