//! Collaborators supplied by the host runtime.
//!
//! Sensing, rendering and audio live outside this crate. The flow talks to
//! them only through these traits; their completions come back as method
//! calls on [`TutorialFlow`](crate::flow::TutorialFlow), never as callbacks
//! into the flow.

use crate::builder::error::{combine, ensure, BuildError, SetupIssue};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// World-space position and orientation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with identity rotation.
    pub fn at(position: Vector3<f32>) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// Viewing direction. Cameras look down their local -Z axis.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * -Vector3::z()
    }

    /// Point `distance` along the view direction, raised by `height`.
    pub fn ahead(&self, distance: f32, height: f32) -> Vector3<f32> {
        self.position + self.forward() * distance + Vector3::y() * height
    }

    /// Blend toward `target`: linear for position, spherical for rotation.
    ///
    /// Opposite rotations have no defined spherical path; the target rotation
    /// is taken as is in that case.
    pub fn blend(&self, target: &Pose, t: f32) -> Pose {
        let rotation = self
            .rotation
            .try_slerp(&target.rotation, t, 1.0e-6)
            .unwrap_or(target.rotation);
        Pose::new(self.position.lerp(&target.position, t), rotation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vector3::zeros())
    }
}

/// Narration language chosen in the menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Secondary,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Secondary];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => f.write_str("english"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Host handle of an audio asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub u32);

/// Scene elements the flow toggles and places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Instruction text shown during ground calibration
    Instruction,
    /// Language selection panel
    Menu,
    /// Numbered instruction panel, one per calibration step
    StepPanel(u8),
    /// Marker placed where the walker handles should be
    WalkerMarker,
    Bubble,
    Signs,
    /// One sign inside the signs panel
    Sign(usize),
    /// Lean-forward warning
    Warning,
}

/// Scene presentation.
pub trait Stage {
    fn set_enabled(&mut self, element: Element, enabled: bool);
    fn set_text(&mut self, element: Element, text: &str);
    fn set_pose(&mut self, element: Element, pose: Pose);
    fn set_scale(&mut self, element: Element, scale: f32);
}

/// Head-mounted camera pose source.
pub trait Camera {
    fn pose(&self) -> Pose;
}

/// Ground/surface detector. Completion is reported through
/// [`TutorialFlow::ground_detected`](crate::flow::TutorialFlow::ground_detected).
pub trait GroundDetector {
    fn start_detection(&mut self);
}

/// Phone motion controller. The start event is reported through
/// [`TutorialFlow::tracking_changed`](crate::flow::TutorialFlow::tracking_changed)
/// while a notification is requested.
pub trait ControllerTracker {
    fn notify_on_tracking_started(&mut self);
    fn clear_tracking_notification(&mut self);
    fn world_pose(&self) -> Pose;
    fn is_tracking(&self) -> bool;
}

/// Audio output. End of playback is reported through
/// [`TutorialFlow::audio_finished`](crate::flow::TutorialFlow::audio_finished).
pub trait AudioPlayer {
    fn set_track(&mut self, track: TrackId);
    fn play(&mut self, rate: f32);
    fn pause(&mut self);
}

/// Narration assets, indexed positionally per language.
pub trait TrackTable {
    fn tracks(&self, language: Language) -> &[TrackId];
}

/// Track table backed by one vector per language.
#[derive(Clone, Debug, Default)]
pub struct StaticTracks {
    pub english: Vec<TrackId>,
    pub secondary: Vec<TrackId>,
}

impl TrackTable for StaticTracks {
    fn tracks(&self, language: Language) -> &[TrackId] {
        match language {
            Language::English => &self.english,
            Language::Secondary => &self.secondary,
        }
    }
}

/// Every collaborator the flow needs.
pub struct Host {
    pub stage: Box<dyn Stage>,
    pub camera: Box<dyn Camera>,
    pub ground: Box<dyn GroundDetector>,
    pub controller: Box<dyn ControllerTracker>,
    pub audio: Box<dyn AudioPlayer>,
    pub tracks: Box<dyn TrackTable>,
}

/// Assembles a [`Host`], reporting every missing collaborator at once.
#[derive(Default)]
pub struct HostBuilder {
    stage: Option<Box<dyn Stage>>,
    camera: Option<Box<dyn Camera>>,
    ground: Option<Box<dyn GroundDetector>>,
    controller: Option<Box<dyn ControllerTracker>>,
    audio: Option<Box<dyn AudioPlayer>>,
    tracks: Option<Box<dyn TrackTable>>,
}

impl HostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stage = Some(Box::new(stage));
        self
    }

    pub fn camera(mut self, camera: impl Camera + 'static) -> Self {
        self.camera = Some(Box::new(camera));
        self
    }

    pub fn ground(mut self, ground: impl GroundDetector + 'static) -> Self {
        self.ground = Some(Box::new(ground));
        self
    }

    pub fn controller(mut self, controller: impl ControllerTracker + 'static) -> Self {
        self.controller = Some(Box::new(controller));
        self
    }

    pub fn audio(mut self, audio: impl AudioPlayer + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn tracks(mut self, tracks: impl TrackTable + 'static) -> Self {
        self.tracks = Some(Box::new(tracks));
        self
    }

    pub fn build(self) -> Result<Host, BuildError> {
        combine(vec![
            ensure(self.stage.is_some(), || SetupIssue::MissingCollaborator("stage")),
            ensure(self.camera.is_some(), || SetupIssue::MissingCollaborator("camera")),
            ensure(self.ground.is_some(), || SetupIssue::MissingCollaborator("ground detector")),
            ensure(self.controller.is_some(), || {
                SetupIssue::MissingCollaborator("controller tracker")
            }),
            ensure(self.audio.is_some(), || SetupIssue::MissingCollaborator("audio player")),
            ensure(self.tracks.is_some(), || SetupIssue::MissingCollaborator("track table")),
        ])?;

        match (
            self.stage,
            self.camera,
            self.ground,
            self.controller,
            self.audio,
            self.tracks,
        ) {
            (
                Some(stage),
                Some(camera),
                Some(ground),
                Some(controller),
                Some(audio),
                Some(tracks),
            ) => Ok(Host {
                stage,
                camera,
                ground,
                controller,
                audio,
                tracks,
            }),
            _ => Err(SetupIssue::MissingCollaborator("host").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    struct Fixed(Pose);

    impl Camera for Fixed {
        fn pose(&self) -> Pose {
            self.0
        }
    }

    #[test]
    fn forward_of_identity_is_negative_z() {
        let pose = Pose::default();
        assert!((pose.forward() - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn ahead_follows_rotation() {
        let turned = Pose::new(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
        );
        // Quarter turn left: -Z becomes -X.
        let point = turned.ahead(10.0, 5.0);
        assert!((point - Vector3::new(-9.0, 7.0, 3.0)).norm() < 1e-4);
    }

    #[test]
    fn blend_interpolates_position_and_rotation() {
        let from = Pose::default();
        let to = Pose::new(
            Vector3::new(10.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
        );

        let half = from.blend(&to, 0.5);

        assert!((half.position - Vector3::new(5.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((half.rotation.angle() - FRAC_PI_2 / 2.0).abs() < 1e-4);
    }

    #[test]
    fn static_tracks_select_language() {
        let table = StaticTracks {
            english: vec![TrackId(1), TrackId(2)],
            secondary: vec![TrackId(9)],
        };
        assert_eq!(table.tracks(Language::English).len(), 2);
        assert_eq!(table.tracks(Language::Secondary), &[TrackId(9)]);
    }

    #[test]
    fn host_builder_reports_every_missing_collaborator() {
        let err = HostBuilder::new()
            .camera(Fixed(Pose::default()))
            .build()
            .err()
            .unwrap();

        assert_eq!(err.issues.len(), 5);
        assert!(err.has(|i| *i == SetupIssue::MissingCollaborator("stage")));
        assert!(!err.has(|i| *i == SetupIssue::MissingCollaborator("camera")));
    }
}
