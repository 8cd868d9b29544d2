//! Tutorial configuration.
//!
//! - `TutorialConfig` and its sections deserialize from TOML; every field
//!   has a default reproducing the shipped tutorial.
//! - Distances are in scene units (centimetres), durations in milliseconds.
//! - `validate` reports every bad value at once, including narration cues
//!   that point past the end of the host's track table.

use crate::builder::error::{combine, ensure, pass, BuildError, Check, SetupIssue};
use crate::flow::Step;
use crate::host::{Language, TrackTable};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialConfig {
    /// First step entered by `TutorialFlow::start`
    pub start: Step,
    pub language: Language,
    pub playback_rate: f32,
    pub timing: Timing,
    pub narration: NarrationTracks,
    pub placement: Placement,
    pub monitor: MonitorConfig,
    pub watchdog: Watchdog,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            start: Step::GroundCalibration,
            language: Language::English,
            playback_rate: 1.0,
            timing: Timing::default(),
            narration: NarrationTracks::default(),
            placement: Placement::default(),
            monitor: MonitorConfig::default(),
            watchdog: Watchdog::default(),
        }
    }
}

/// Fixed pauses between narration and step changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Wait after the hand-height narration before sampling the controller
    pub hand_height_delay_ms: u64,
    pub pocket_delay_ms: u64,
    /// Pause between the second and third walker narration tracks
    pub walker_gap_ms: u64,
    /// Stand-straight panel swap delay
    pub stand_straight_first_ms: u64,
    /// Delay after the panel swap before following starts
    pub stand_straight_second_ms: u64,
    /// Pause between follow narration tracks
    pub follow_gap_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            hand_height_delay_ms: 5000,
            pocket_delay_ms: 4000,
            walker_gap_ms: 4000,
            stand_straight_first_ms: 3000,
            stand_straight_second_ms: 3000,
            follow_gap_ms: 2000,
        }
    }
}

impl Timing {
    pub fn hand_height_delay(&self) -> Duration {
        Duration::from_millis(self.hand_height_delay_ms)
    }
    pub fn pocket_delay(&self) -> Duration {
        Duration::from_millis(self.pocket_delay_ms)
    }
    pub fn walker_gap(&self) -> Duration {
        Duration::from_millis(self.walker_gap_ms)
    }
    pub fn stand_straight_first(&self) -> Duration {
        Duration::from_millis(self.stand_straight_first_ms)
    }
    pub fn stand_straight_second(&self) -> Duration {
        Duration::from_millis(self.stand_straight_second_ms)
    }
    pub fn follow_gap(&self) -> Duration {
        Duration::from_millis(self.follow_gap_ms)
    }
}

/// Positional indices into the host track table, per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationTracks {
    pub menu_prompt: usize,
    pub phone_intro: Vec<usize>,
    pub hand_height: usize,
    pub pocket: usize,
    pub walker: [usize; 3],
    pub stand_straight: Option<usize>,
    pub follow: Vec<usize>,
}

impl Default for NarrationTracks {
    fn default() -> Self {
        Self {
            menu_prompt: 12,
            phone_intro: vec![0, 1],
            hand_height: 2,
            pocket: 3,
            walker: [4, 5, 6],
            stand_straight: Some(7),
            follow: vec![8, 9, 10],
        }
    }
}

impl NarrationTracks {
    /// Every (cue, index) pair, for range checks.
    fn indices(&self) -> Vec<(&'static str, usize)> {
        let mut out = vec![
            ("menu_prompt", self.menu_prompt),
            ("hand_height", self.hand_height),
            ("pocket", self.pocket),
        ];
        out.extend(self.phone_intro.iter().map(|&i| ("phone_intro", i)));
        out.extend(self.walker.iter().map(|&i| ("walker", i)));
        out.extend(self.stand_straight.iter().map(|&i| ("stand_straight", i)));
        out.extend(self.follow.iter().map(|&i| ("follow", i)));
        out
    }
}

/// Forward distance and height relative to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub distance: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub menu_distance: f32,
    /// World-space offset added to the controller position for the walker marker
    pub marker_offset: [f32; 3],
    pub bubble: Offset,
    pub signs: Offset,
    pub sign_count: usize,
    pub sign_stagger_ms: u64,
    pub sign_reveal_ms: u64,
    /// Camera height above ground assumed when detection falls back
    pub fallback_eye_height: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            menu_distance: 80.0,
            marker_offset: [0.0, -20.0, -30.0],
            bubble: Offset {
                distance: 120.0,
                height: 0.0,
            },
            signs: Offset {
                distance: 150.0,
                height: -20.0,
            },
            sign_count: 3,
            sign_stagger_ms: 250,
            sign_reveal_ms: 600,
            fallback_eye_height: 160.0,
        }
    }
}

impl Placement {
    pub fn marker_offset(&self) -> Vector3<f32> {
        Vector3::from(self.marker_offset)
    }

    /// Time from the first sign starting to the last one landing, `None` on
    /// overflow.
    pub fn reveal_span_ms(&self) -> Option<u64> {
        let signs = u64::try_from(self.sign_count.saturating_sub(1)).ok()?;
        signs
            .checked_mul(self.sign_stagger_ms)?
            .checked_add(self.sign_reveal_ms)
    }
}

/// Head displacement monitor tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Signed vertical displacement below which the warning shows (negative)
    pub threshold: f32,
    /// Sample every Nth frame
    pub stride: u32,
    /// Fraction of the remaining distance covered per sample, in (0, 1]
    pub blend: f32,
    /// Distance in front of the camera where the warning floats
    pub warning_distance: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold: -15.0,
            stride: 10,
            blend: 0.2,
            warning_distance: 60.0,
        }
    }
}

/// What to do when a collaborator never completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Continue with a substitute result
    Advance,
    /// Re-enter the waiting step from scratch
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub after_ms: u64,
    pub fallback: Fallback,
}

impl Deadline {
    pub fn after(&self) -> Duration {
        Duration::from_millis(self.after_ms)
    }
}

/// Optional deadlines for external completions. Absent means wait forever.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Watchdog {
    pub ground_detection: Option<Deadline>,
    pub controller_tracking: Option<Deadline>,
}

/// Upper bound on follow signs.
pub const MAX_SIGNS: usize = 32;

/// Upper bound on the whole sign reveal, from first start to last landing.
pub const MAX_REVEAL_SPAN_MS: u64 = 60_000;

/// Parse a config from TOML text. Missing sections take their defaults.
pub fn load_toml(text: &str) -> Result<TutorialConfig, toml::de::Error> {
    toml::from_str(text)
}

fn positive_deadline(field: &'static str, deadline: Option<Deadline>) -> Check {
    match deadline {
        Some(d) => ensure(d.after_ms > 0, || SetupIssue::InvalidConfig {
            field,
            reason: "deadline must be > 0 ms".to_string(),
        }),
        None => pass(),
    }
}

impl TutorialConfig {
    /// Check every value, and every narration index against `tracks` for
    /// all languages.
    pub fn validate(&self, tracks: &dyn TrackTable) -> Result<(), BuildError> {
        let m = &self.monitor;
        let mut checks: Vec<Check> = vec![
            ensure(
                matches!(self.start, Step::Menu | Step::GroundCalibration),
                || SetupIssue::InvalidConfig {
                    field: "start",
                    reason: format!("must be Menu or GroundCalibration, got {:?}", self.start),
                },
            ),
            ensure(self.playback_rate > 0.0, || SetupIssue::InvalidConfig {
                field: "playback_rate",
                reason: "must be > 0".to_string(),
            }),
            ensure(m.stride > 0, || SetupIssue::InvalidConfig {
                field: "monitor.stride",
                reason: "must be > 0".to_string(),
            }),
            ensure(m.blend > 0.0 && m.blend <= 1.0, || SetupIssue::InvalidConfig {
                field: "monitor.blend",
                reason: format!("must be in (0, 1], got {}", m.blend),
            }),
            ensure(m.threshold < 0.0, || SetupIssue::InvalidConfig {
                field: "monitor.threshold",
                reason: format!("must be negative, got {}", m.threshold),
            }),
            ensure(!self.narration.follow.is_empty(), || SetupIssue::InvalidConfig {
                field: "narration.follow",
                reason: "needs at least one track".to_string(),
            }),
            ensure(!self.narration.phone_intro.is_empty(), || {
                SetupIssue::InvalidConfig {
                    field: "narration.phone_intro",
                    reason: "needs at least one track".to_string(),
                }
            }),
            ensure(self.placement.sign_count <= MAX_SIGNS, || {
                SetupIssue::InvalidConfig {
                    field: "placement.sign_count",
                    reason: format!(
                        "must be at most {MAX_SIGNS}, got {}",
                        self.placement.sign_count
                    ),
                }
            }),
            ensure(
                self.placement
                    .reveal_span_ms()
                    .is_some_and(|span| span <= MAX_REVEAL_SPAN_MS),
                || SetupIssue::InvalidConfig {
                    field: "placement.sign_stagger_ms",
                    reason: format!(
                        "sign reveal must finish within {MAX_REVEAL_SPAN_MS} ms"
                    ),
                },
            ),
            positive_deadline("watchdog.ground_detection", self.watchdog.ground_detection),
            positive_deadline(
                "watchdog.controller_tracking",
                self.watchdog.controller_tracking,
            ),
        ];

        for language in Language::ALL {
            let available = tracks.tracks(language).len();
            for (cue, index) in self.narration.indices() {
                checks.push(ensure(index < available, || SetupIssue::TrackOutOfRange {
                    cue,
                    index,
                    language: language.to_string(),
                    available,
                }));
            }
        }

        combine(checks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{StaticTracks, TrackId};

    fn tracks(n: u32) -> StaticTracks {
        StaticTracks {
            english: (0..n).map(TrackId).collect(),
            secondary: (100..100 + n).map(TrackId).collect(),
        }
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg, TutorialConfig::default());
        assert_eq!(cfg.timing.hand_height_delay(), Duration::from_secs(5));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = load_toml(
            r#"
start = "Menu"
language = "secondary"

[timing]
pocket_delay_ms = 3000

[monitor]
stride = 1

[watchdog.ground_detection]
after_ms = 20000
fallback = "advance"
"#,
        )
        .unwrap();

        assert_eq!(cfg.start, Step::Menu);
        assert_eq!(cfg.language, Language::Secondary);
        assert_eq!(cfg.timing.pocket_delay_ms, 3000);
        assert_eq!(cfg.timing.walker_gap_ms, 4000);
        assert_eq!(cfg.monitor.stride, 1);
        assert_eq!(cfg.monitor.threshold, -15.0);
        assert_eq!(
            cfg.watchdog.ground_detection,
            Some(Deadline {
                after_ms: 20000,
                fallback: Fallback::Advance
            })
        );
        assert!(cfg.watchdog.controller_tracking.is_none());
    }

    #[test]
    fn defaults_validate_against_full_table() {
        assert!(TutorialConfig::default().validate(&tracks(13)).is_ok());
    }

    #[test]
    fn short_table_reports_each_missing_track() {
        let err = TutorialConfig::default().validate(&tracks(12)).unwrap_err();

        // menu_prompt (12) is out of range for both languages
        assert_eq!(err.issues.len(), 2);
        assert!(err.has(|i| matches!(
            i,
            SetupIssue::TrackOutOfRange { cue: "menu_prompt", index: 12, .. }
        )));
    }

    #[test]
    fn invalid_values_are_reported_together() {
        let mut cfg = TutorialConfig::default();
        cfg.start = Step::Follow;
        cfg.monitor.stride = 0;
        cfg.monitor.blend = 1.5;
        cfg.monitor.threshold = 2.0;
        cfg.watchdog.controller_tracking = Some(Deadline {
            after_ms: 0,
            fallback: Fallback::Retry,
        });

        let err = cfg.validate(&tracks(13)).unwrap_err();

        let fields: Vec<&str> = err
            .issues
            .iter()
            .filter_map(|i| match i {
                SetupIssue::InvalidConfig { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "start",
                "monitor.stride",
                "monitor.blend",
                "monitor.threshold",
                "watchdog.controller_tracking"
            ]
        );
    }

    #[test]
    fn oversized_sign_reveal_is_rejected() {
        let cfg = load_toml(
            "[placement]\nsign_count = 3000\nsign_stagger_ms = 9000000000000000000",
        )
        .unwrap();

        let err = cfg.validate(&tracks(13)).unwrap_err();

        assert!(err.has(|i| matches!(
            i,
            SetupIssue::InvalidConfig { field: "placement.sign_count", .. }
        )));
        assert!(err.has(|i| matches!(
            i,
            SetupIssue::InvalidConfig { field: "placement.sign_stagger_ms", .. }
        )));
    }

    #[test]
    fn reveal_span_covers_stagger_and_last_sign() {
        let placement = Placement::default();
        assert_eq!(placement.reveal_span_ms(), Some(2 * 250 + 600));

        let mut long = Placement::default();
        long.sign_stagger_ms = 30_000;
        let mut cfg = TutorialConfig::default();
        cfg.placement = long;
        assert!(cfg.validate(&tracks(13)).is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(load_toml("[timing]\npocket_delay_ms = \"soon\"").is_err());
    }
}
