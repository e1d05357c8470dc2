use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use linewave::RenderConfig;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Scroll height of the virtual document, in viewports, when none is given.
pub const DEFAULT_SCROLL_PAGES: f32 = 3.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scene file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scene file: {0}")]
    Invalid(String),
}

/// A scene file: line-wave configuration plus window and still settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneFile {
    pub version: u32,
    #[serde(default)]
    pub lines: RenderConfig,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub still: StillSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowSettings {
    /// `WIDTHxHEIGHT` in logical pixels.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    #[serde(default = "default_scroll_pages")]
    pub scroll_pages: f32,
    #[serde(default)]
    pub transparent: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            size: None,
            fps: None,
            antialias: None,
            scroll_pages: DEFAULT_SCROLL_PAGES,
            transparent: false,
        }
    }
}

impl WindowSettings {
    pub fn dimensions(&self) -> Result<Option<(u32, u32)>, ConfigError> {
        self.size
            .as_deref()
            .map(|raw| parse_size(raw).map_err(ConfigError::Invalid))
            .transpose()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StillSettings {
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub time: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// MSAA sample count, `None` for automatic selection.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

fn default_scroll_pages() -> f32 {
    DEFAULT_SCROLL_PAGES
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off`, or an MSAA sample count.
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!(
            "invalid antialias setting '{other}'; use auto/off or 2/4/8/16"
        )),
    }
}

/// Parses `WIDTHxHEIGHT`; both sides must be non-zero.
pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in size '{value}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in size '{value}'"))?;
    if width == 0 || height == 0 {
        return Err("size dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

impl SceneFile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneFile = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn still_seconds(&self) -> Option<f32> {
        self.still.time.map(|time| time.as_secs_f32())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported scene version {}; expected 1",
                self.version
            )));
        }

        self.window.dimensions()?;

        if let Some(fps) = self.window.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        if !self.window.scroll_pages.is_finite() || self.window.scroll_pages < 1.0 {
            return Err(ConfigError::Invalid(
                "window.scroll_pages must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linewave::{Band, LineSetting};

    const SAMPLE: &str = r##"
version = 1

[lines]
enabled_waves = ["top", "bottom"]
line_count = [4, 8, 12]
line_distance = 5.0
bend_strength = 0.75
lines_gradient = ["#112233", "#445566"]
middle_wave_position = { y = 0.25 }

[window]
size = "1280x720"
fps = 30
antialias = 4
scroll_pages = 2.5

[still]
time = "1500ms"
"##;

    #[test]
    fn parses_sample_scene() {
        let scene = SceneFile::from_toml_str(SAMPLE).expect("parse scene");
        assert_eq!(scene.lines.enabled_waves, vec![Band::Top, Band::Bottom]);
        assert_eq!(scene.lines.line_count, LineSetting::PerBand(vec![4, 8, 12]));
        assert_eq!(scene.lines.line_distance, LineSetting::Uniform(5.0));
        assert!(scene.lines.parallax);
        assert_eq!(scene.window.dimensions().unwrap(), Some((1280, 720)));
        assert_eq!(scene.window.fps, Some(30.0));
        assert_eq!(scene.window.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(scene.still_seconds(), Some(1.5));

        let params = scene.lines.resolve();
        assert_eq!(params.band(Band::Middle).position.y, 0.25);
        assert_eq!(params.band(Band::Middle).position.x, 5.0);
        assert_eq!(params.gradient.len(), 2);
    }

    #[test]
    fn minimal_scene_uses_defaults() {
        let scene = SceneFile::from_toml_str("version = 1").unwrap();
        assert_eq!(scene.lines, RenderConfig::default());
        assert_eq!(scene.window.scroll_pages, DEFAULT_SCROLL_PAGES);
        assert_eq!(scene.window.dimensions().unwrap(), None);
        assert!(scene.still.time.is_none());
    }

    #[test]
    fn rejects_unknown_version() {
        let err = SceneFile::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_window_settings() {
        for body in [
            "version = 1\n[window]\nsize = \"wide\"",
            "version = 1\n[window]\nsize = \"0x10\"",
            "version = 1\n[window]\nfps = -5",
            "version = 1\n[window]\nscroll_pages = 0.5",
        ] {
            let err = SceneFile::from_toml_str(body).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{body}");
        }
    }

    #[test]
    fn wrong_types_are_parse_errors() {
        let err = SceneFile::from_toml_str("version = 1\n[lines]\ninteractive = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = SceneFile::from_toml_str("version = 1\n[window]\nantialias = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn stray_wave_names_do_not_fail_the_scene() {
        let scene =
            SceneFile::from_toml_str("version = 1\n[lines]\nenabled_waves = [\"middle\", \"left\"]")
                .unwrap();
        assert_eq!(scene.lines.enabled_waves, vec![Band::Middle]);
    }

    #[test]
    fn still_time_accepts_seconds() {
        let scene = SceneFile::from_toml_str("version = 1\n[still]\ntime = 2.25").unwrap();
        assert_eq!(scene.still_seconds(), Some(2.25));
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("800X600").unwrap(), (800, 600));
        assert!(parse_size("800").is_err());
        assert!(parse_size("axb").is_err());
    }
}
