//! Mix request model.
//!
//! [`MixRequestBody`] is the loosely-typed wire shape (JSON or YAML).
//! [`MixRequestBody::validate`] turns it into a [`MixRequest`], applying the
//! documented defaults and rejecting the whole request on the first missing
//! or malformed required field.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ComposeError, Result};

/// Default sound-effect gain in dB.
pub const DEFAULT_SFX_GAIN_DB: f64 = 0.0;
/// Default music gain in dB.
pub const DEFAULT_MUSIC_GAIN_DB: f64 = -14.0;
/// Default delay before the narration enters the music bed, in seconds.
pub const DEFAULT_INTRO_SECS: f64 = 2.0;

/// A number that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self, field: &str) -> Result<f64> {
        let v = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                ComposeError::validation(format!("{}: '{}' is not a number", field, s))
            })?,
        };
        finite(field, v)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Number(v)
    }
}

fn numeric_or(value: Option<&Numeric>, default: f64, field: &str) -> Result<f64> {
    value.map_or(Ok(default), |n| n.value(field))
}

fn finite(field: &str, v: f64) -> Result<f64> {
    if !v.is_finite() {
        return Err(ComposeError::validation(format!("{}: must be finite", field)));
    }
    Ok(v)
}

fn non_negative(field: &str, v: f64) -> Result<f64> {
    if finite(field, v)? < 0.0 {
        return Err(ComposeError::validation(format!("{} must be >= 0", field)));
    }
    Ok(v)
}

fn required(field: &str, source: &str) -> Result<()> {
    if source.trim().is_empty() {
        return Err(ComposeError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Wire shape of a mix request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MixRequestBody {
    /// Narration source reference (required).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_url: Option<String>,

    /// Sound effects, in placement order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sfx_list: Option<Vec<SfxBody>>,

    /// Background music source reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,

    /// Background music settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_settings: Option<MusicSettingsBody>,
}

/// Wire shape of one sound effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SfxBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Placement time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Numeric>,
    /// Gain in dB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Numeric>,
}

/// Wire shape of the music settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MusicSettingsBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_db: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_time: Option<Numeric>,
}

impl MixRequestBody {
    /// Validates the body and applies defaults.
    pub fn validate(&self) -> Result<MixRequest> {
        let narration = non_blank(self.narration_url.as_ref())
            .ok_or_else(|| ComposeError::validation("narration_url is required"))?;

        let mut sfx = Vec::new();
        for (index, body) in self.sfx_list.iter().flatten().enumerate() {
            let Some(source) = non_blank(body.url.as_ref()) else {
                debug!("skipping sfx[{}]: no source", index);
                continue;
            };
            let field = format!("sfx_list[{}].time", index);
            let time = body
                .time
                .as_ref()
                .ok_or_else(|| ComposeError::validation(format!("{} is required", field)))?
                .value(&field)?;
            let time = non_negative(&field, time)?;
            let gain_db = numeric_or(
                body.volume.as_ref(),
                DEFAULT_SFX_GAIN_DB,
                &format!("sfx_list[{}].volume", index),
            )?;
            sfx.push(SfxSpec {
                index,
                source,
                time_secs: time,
                gain_db,
            });
        }

        let music = match non_blank(self.music_url.as_ref()) {
            Some(source) => {
                let settings = self.music_settings.clone().unwrap_or_default();
                let gain_db = numeric_or(
                    settings.volume_db.as_ref(),
                    DEFAULT_MUSIC_GAIN_DB,
                    "music_settings.volume_db",
                )?;
                let intro_secs = numeric_or(
                    settings.intro_time.as_ref(),
                    DEFAULT_INTRO_SECS,
                    "music_settings.intro_time",
                )?;
                let intro_secs = non_negative("music_settings.intro_time", intro_secs)?;
                Some(MusicSpec {
                    source,
                    gain_db,
                    intro_secs,
                })
            }
            None => None,
        };

        Ok(MixRequest {
            narration,
            sfx,
            music,
        })
    }
}

/// A validated mix request.
#[derive(Debug, Clone, PartialEq)]
pub struct MixRequest {
    /// Narration source reference, never empty.
    pub narration: String,
    /// Sound effects in request order.
    pub sfx: Vec<SfxSpec>,
    /// Optional music bed.
    pub music: Option<MusicSpec>,
}

/// One validated sound effect.
#[derive(Debug, Clone, PartialEq)]
pub struct SfxSpec {
    /// Position in the request's `sfx_list`, counting skipped entries.
    pub index: usize,
    pub source: String,
    /// Placement time in seconds, >= 0.
    pub time_secs: f64,
    pub gain_db: f64,
}

impl SfxSpec {
    /// Placement in milliseconds.
    pub fn position_ms(&self) -> f64 {
        self.time_secs * 1000.0
    }
}

/// Validated music bed settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicSpec {
    pub source: String,
    pub gain_db: f64,
    /// Delay before the narration enters, in seconds, >= 0.
    pub intro_secs: f64,
}

impl MusicSpec {
    /// Creates music settings with the default gain and intro offset.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            gain_db: DEFAULT_MUSIC_GAIN_DB,
            intro_secs: DEFAULT_INTRO_SECS,
        }
    }

    /// Sets the gain in dB.
    pub fn with_gain(mut self, gain_db: f64) -> Self {
        self.gain_db = gain_db;
        self
    }

    /// Sets the intro offset in seconds.
    pub fn with_intro(mut self, intro_secs: f64) -> Self {
        self.intro_secs = intro_secs;
        self
    }

    /// Narration entry offset in milliseconds.
    pub fn intro_ms(&self) -> f64 {
        self.intro_secs * 1000.0
    }
}

impl MixRequest {
    /// Creates a narration-only request.
    pub fn new(narration: impl Into<String>) -> Result<Self> {
        let narration = narration.into();
        required("narration_url", &narration)?;
        Ok(Self {
            narration,
            sfx: Vec::new(),
            music: None,
        })
    }

    /// Appends a sound effect.
    pub fn with_sfx(mut self, source: impl Into<String>, time_secs: f64, gain_db: f64) -> Self {
        let index = self.sfx.len();
        self.sfx.push(SfxSpec {
            index,
            source: source.into(),
            time_secs,
            gain_db,
        });
        self
    }

    /// Sets the music bed.
    pub fn with_music(mut self, music: MusicSpec) -> Self {
        self.music = Some(music);
        self
    }

    /// Checks the rules [`MixRequestBody::validate`] enforces.
    ///
    /// Requests assembled through the builders or by hand are checked here
    /// before any source is fetched.
    pub fn check(&self) -> Result<()> {
        required("narration_url", &self.narration)?;
        for sfx in &self.sfx {
            required(&format!("sfx_list[{}].url", sfx.index), &sfx.source)?;
            non_negative(&format!("sfx_list[{}].time", sfx.index), sfx.time_secs)?;
            finite(&format!("sfx_list[{}].volume", sfx.index), sfx.gain_db)?;
        }
        if let Some(music) = &self.music {
            required("music_url", &music.source)?;
            finite("music_settings.volume_db", music.gain_db)?;
            non_negative("music_settings.intro_time", music.intro_secs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn parse(json: &str) -> MixRequestBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_narration_rejected() {
        let err = parse(r#"{"sfx_list": []}"#).validate().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationError);

        let err = parse(r#"{"narration_url": "   "}"#).validate().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationError);
    }

    #[test]
    fn test_defaults_applied() {
        let req = parse(
            r#"{
                "narration_url": "https://cdn.example.com/voice.mp3",
                "sfx_list": [{"url": "https://cdn.example.com/boom.mp3", "time": 1.5}],
                "music_url": "https://cdn.example.com/bed.mp3"
            }"#,
        )
        .validate()
        .unwrap();

        assert_eq!(req.narration, "https://cdn.example.com/voice.mp3");
        assert_eq!(req.sfx.len(), 1);
        assert_eq!(req.sfx[0].gain_db, 0.0);
        assert_eq!(req.sfx[0].position_ms(), 1500.0);

        let music = req.music.unwrap();
        assert_eq!(music.gain_db, -14.0);
        assert_eq!(music.intro_secs, 2.0);
        assert_eq!(music.intro_ms(), 2000.0);
    }

    #[test]
    fn test_sfx_without_source_skipped() {
        let req = parse(
            r#"{
                "narration_url": "n",
                "sfx_list": [
                    {"time": 1},
                    {"url": "", "time": 2},
                    {"url": "b", "time": 3, "volume": -6}
                ]
            }"#,
        )
        .validate()
        .unwrap();

        assert_eq!(req.sfx.len(), 1);
        assert_eq!(req.sfx[0].index, 2);
        assert_eq!(req.sfx[0].source, "b");
        assert_eq!(req.sfx[0].gain_db, -6.0);
    }

    #[test]
    fn test_sfx_time_required_and_non_negative() {
        let err = parse(r#"{"narration_url": "n", "sfx_list": [{"url": "a"}]}"#)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("sfx_list[0].time"));

        let err = parse(r#"{"narration_url": "n", "sfx_list": [{"url": "a", "time": -0.5}]}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationError);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let req = parse(
            r#"{
                "narration_url": "n",
                "sfx_list": [{"url": "a", "time": "2.5", "volume": "-3"}],
                "music_url": "m",
                "music_settings": {"volume_db": "-20", "intro_time": "0"}
            }"#,
        )
        .validate()
        .unwrap();
        assert_eq!(req.sfx[0].time_secs, 2.5);
        assert_eq!(req.sfx[0].gain_db, -3.0);
        let music = req.music.unwrap();
        assert_eq!(music.gain_db, -20.0);
        assert_eq!(music.intro_secs, 0.0);
    }

    #[test]
    fn test_malformed_number_rejected() {
        let err = parse(r#"{"narration_url": "n", "sfx_list": [{"url": "a", "time": "soon"}]}"#)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_music_settings_without_url_ignored() {
        let req = parse(r#"{"narration_url": "n", "music_settings": {"volume_db": -3}}"#)
            .validate()
            .unwrap();
        assert!(req.music.is_none());

        let req = parse(r#"{"narration_url": "n", "music_url": null}"#)
            .validate()
            .unwrap();
        assert!(req.music.is_none());
    }

    #[test]
    fn test_negative_intro_rejected() {
        let err = parse(
            r#"{"narration_url": "n", "music_url": "m", "music_settings": {"intro_time": -1}}"#,
        )
        .validate()
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationError);
    }

    #[test]
    fn test_yaml_body() {
        let body: MixRequestBody = serde_yaml::from_str(
            "narration_url: voice.wav\nsfx_list:\n  - url: boom.wav\n    time: 1\n",
        )
        .unwrap();
        let req = body.validate().unwrap();
        assert_eq!(req.sfx[0].time_secs, 1.0);
    }

    #[test]
    fn test_builder() {
        let req = MixRequest::new("n")
            .unwrap()
            .with_sfx("a", 1.0, 0.0)
            .with_sfx("b", 2.0, -3.0)
            .with_music(MusicSpec::new("m").with_intro(0.5));
        assert_eq!(req.sfx[1].index, 1);
        assert_eq!(req.music.unwrap().intro_ms(), 500.0);
        assert!(MixRequest::new("").is_err());
    }

    #[test]
    fn test_check_hand_built_requests() {
        let ok = MixRequest::new("n")
            .unwrap()
            .with_sfx("a", 0.0, -3.0)
            .with_music(MusicSpec::new("m"));
        assert!(ok.check().is_ok());

        let blank = MixRequest {
            narration: "  ".into(),
            sfx: Vec::new(),
            music: None,
        };
        let err = blank.check().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationError);

        let err = MixRequest::new("n")
            .unwrap()
            .with_sfx("a", -1.0, 0.0)
            .check()
            .unwrap_err();
        assert!(err.to_string().contains("sfx_list[0].time"));

        let err = MixRequest::new("n")
            .unwrap()
            .with_sfx("a", 1.0, f64::INFINITY)
            .check()
            .unwrap_err();
        assert!(err.to_string().contains("sfx_list[0].volume"));

        let err = MixRequest::new("n")
            .unwrap()
            .with_music(MusicSpec::new("m").with_gain(f64::NAN))
            .check()
            .unwrap_err();
        assert!(err.to_string().contains("music_settings.volume_db"));

        let err = MixRequest::new("n")
            .unwrap()
            .with_music(MusicSpec::new("m").with_intro(-0.5))
            .check()
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationError);
    }
}
