//! Recording host collaborators shared by the integration tests.

#![allow(dead_code)]

use nalgebra::Vector3;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use walkguide::host::{
    AudioPlayer, Camera, ControllerTracker, Element, GroundDetector, Stage, StaticTracks, TrackId,
};
use walkguide::{HostBuilder, Pose, TutorialConfig, TutorialFlow};

pub const FRAME: Duration = Duration::from_millis(16);

/// Everything the flow did to the host, plus the sensor values it reads.
#[derive(Debug)]
pub struct World {
    pub enabled: HashMap<Element, bool>,
    pub text: HashMap<Element, String>,
    pub poses: HashMap<Element, Pose>,
    pub scales: HashMap<Element, f32>,
    pub camera: Pose,
    pub controller_pose: Pose,
    pub controller_tracking: bool,
    pub tracking_requested: bool,
    pub detections: u32,
    pub played: Vec<(TrackId, f32)>,
    pub pauses: u32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            enabled: HashMap::new(),
            text: HashMap::new(),
            poses: HashMap::new(),
            scales: HashMap::new(),
            camera: Pose::at(Vector3::new(0.0, 170.0, 0.0)),
            controller_pose: Pose::default(),
            controller_tracking: true,
            tracking_requested: false,
            detections: 0,
            played: Vec::new(),
            pauses: 0,
        }
    }
}

impl World {
    pub fn shown(&self, element: Element) -> bool {
        self.enabled.get(&element).copied().unwrap_or(false)
    }

    pub fn last_track(&self) -> Option<TrackId> {
        self.played.last().map(|(track, _)| *track)
    }

    pub fn tracks_played(&self) -> Vec<u32> {
        self.played.iter().map(|(track, _)| track.0).collect()
    }
}

pub type Shared = Rc<RefCell<World>>;

#[derive(Clone)]
pub struct Rig(pub Shared);

impl Stage for Rig {
    fn set_enabled(&mut self, element: Element, enabled: bool) {
        self.0.borrow_mut().enabled.insert(element, enabled);
    }

    fn set_text(&mut self, element: Element, text: &str) {
        self.0.borrow_mut().text.insert(element, text.to_string());
    }

    fn set_pose(&mut self, element: Element, pose: Pose) {
        self.0.borrow_mut().poses.insert(element, pose);
    }

    fn set_scale(&mut self, element: Element, scale: f32) {
        self.0.borrow_mut().scales.insert(element, scale);
    }
}

impl Camera for Rig {
    fn pose(&self) -> Pose {
        self.0.borrow().camera
    }
}

impl GroundDetector for Rig {
    fn start_detection(&mut self) {
        self.0.borrow_mut().detections += 1;
    }
}

impl ControllerTracker for Rig {
    fn notify_on_tracking_started(&mut self) {
        self.0.borrow_mut().tracking_requested = true;
    }

    fn clear_tracking_notification(&mut self) {
        self.0.borrow_mut().tracking_requested = false;
    }

    fn world_pose(&self) -> Pose {
        self.0.borrow().controller_pose
    }

    fn is_tracking(&self) -> bool {
        self.0.borrow().controller_tracking
    }
}

/// Audio player that records which track was set when `play` is called.
#[derive(Clone)]
pub struct Speaker {
    world: Shared,
    track: Option<TrackId>,
}

impl AudioPlayer for Speaker {
    fn set_track(&mut self, track: TrackId) {
        self.track = Some(track);
    }

    fn play(&mut self, rate: f32) {
        if let Some(track) = self.track {
            self.world.borrow_mut().played.push((track, rate));
        }
    }

    fn pause(&mut self) {
        self.world.borrow_mut().pauses += 1;
    }
}

/// Thirteen English tracks numbered 0..13, secondary ones from 100.
pub fn tracks() -> StaticTracks {
    StaticTracks {
        english: (0..13).map(TrackId).collect(),
        secondary: (100..113).map(TrackId).collect(),
    }
}

pub fn flow_with(config: TutorialConfig) -> (TutorialFlow, Shared) {
    let world: Shared = Rc::new(RefCell::new(World::default()));
    let rig = Rig(world.clone());
    let host = HostBuilder::new()
        .stage(rig.clone())
        .camera(rig.clone())
        .ground(rig.clone())
        .controller(rig)
        .audio(Speaker {
            world: world.clone(),
            track: None,
        })
        .tracks(tracks())
        .build()
        .unwrap();
    let flow = TutorialFlow::new(config, host).unwrap();
    (flow, world)
}

pub fn started() -> (TutorialFlow, Shared) {
    let (mut flow, world) = flow_with(TutorialConfig::default());
    flow.start().unwrap();
    (flow, world)
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}
