//! Per-run tutorial context.
//!
//! [`Session`] is the context handed to every step hook. It owns the host
//! collaborators, the timer queue and everything the steps record along the
//! way (detected ground, walker marker, camera start). Step scripts live here
//! as methods; the flow wires them into the state machine.

use super::audio::AudioChannel;
use super::narration::{Narration, NarrationRun};
use super::reveal::SignReveal;
use super::step::Step;
use crate::config::{Deadline, Fallback, TutorialConfig};
use crate::core::State;
use crate::host::{
    Camera, ControllerTracker, Element, GroundDetector, Host, Language, Pose, Stage, TrackTable,
};
use crate::monitor::{Alert, HeadMonitor};
use crate::schedule::{Generation, Scheduler, TimerHandle};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

const GROUND_INSTRUCTION: &str = "Look at the floor in front of you";

/// Deferred work scheduled by step scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cue {
    /// Send the signal naming this step
    Advance(Step),
    /// Play the next narration track
    ResumeNarration,
    PlaceWalkerMarker,
    SwapStandPanel,
    /// The external completion awaited by this step is overdue
    Deadline(Step),
}

/// External completion the current step is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Ground,
    Tracking,
}

/// What the flow does about an overdue completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recovery {
    Signal(Step),
    Reenter(Step),
}

/// Context shared by every step hook of one tutorial run.
pub struct Session {
    id: Uuid,
    pub(crate) config: TutorialConfig,
    stage: Box<dyn Stage>,
    camera: Box<dyn Camera>,
    ground_detector: Box<dyn GroundDetector>,
    controller: Box<dyn ControllerTracker>,
    tracks: Box<dyn TrackTable>,
    audio: AudioChannel,
    pub(crate) scheduler: Scheduler<Cue>,
    generation: Generation,
    narration: Option<NarrationRun<Cue>>,
    awaiting: Option<Awaiting>,
    deadline: Option<TimerHandle>,
    reveal: Option<SignReveal>,
    monitor: HeadMonitor,
    language: Language,
    ground: Option<Pose>,
    walker_marker: Option<Vector3<f32>>,
    camera_start: Option<Vector3<f32>>,
}

impl Session {
    pub(crate) fn new(config: TutorialConfig, host: Host) -> Self {
        let Host {
            stage,
            camera,
            ground,
            controller,
            audio,
            tracks,
        } = host;
        Self {
            id: Uuid::new_v4(),
            audio: AudioChannel::new(audio, config.playback_rate),
            monitor: HeadMonitor::new(config.monitor.clone()),
            language: config.language,
            config,
            stage,
            camera,
            ground_detector: ground,
            controller,
            tracks,
            scheduler: Scheduler::new(),
            generation: Generation::default(),
            narration: None,
            awaiting: None,
            deadline: None,
            reveal: None,
            ground: None,
            walker_marker: None,
            camera_start: None,
        }
    }

    /// Session id, also attached to every log event of this run.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Configuration the session was validated and started with.
    pub fn config(&self) -> &TutorialConfig {
        &self.config
    }

    /// Activation token of the current step.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Narration language used for every track lookup.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Ground pose reported by detection (or substituted by the watchdog).
    pub fn ground(&self) -> Option<Pose> {
        self.ground
    }

    /// World position of the walker marker, once placed in the current
    /// calibration pass.
    pub fn walker_marker(&self) -> Option<Vector3<f32>> {
        self.walker_marker
    }

    /// Camera position captured when following started.
    pub fn camera_start(&self) -> Option<Vector3<f32>> {
        self.camera_start
    }

    /// Head displacement monitor, tracking only while following.
    pub fn monitor(&self) -> &HeadMonitor {
        &self.monitor
    }

    /// Time elapsed on the session clock.
    pub fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }

    pub(crate) fn set_language(&mut self, language: Language) {
        tracing::info!(session = %self.id, %language, "language selected");
        self.language = language;
    }

    fn schedule(&mut self, delay: Duration, cue: Cue) -> TimerHandle {
        self.scheduler.schedule(delay, self.generation, cue)
    }

    fn arm_deadline(&mut self, deadline: Option<Deadline>, step: Step) {
        if let Some(deadline) = deadline {
            self.deadline = Some(self.schedule(deadline.after(), Cue::Deadline(step)));
        }
    }

    fn disarm_deadline(&mut self) {
        if let Some(handle) = self.deadline.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn show(&mut self, element: Element) {
        self.stage.set_enabled(element, true);
    }

    fn hide(&mut self, element: Element) {
        self.stage.set_enabled(element, false);
    }

    /// Start a new activation. Everything scheduled or played before this
    /// point is stale from here on.
    pub(crate) fn begin(&mut self, step: Step, previous: Option<&Step>) {
        self.generation = self.generation.next();
        self.narration = None;
        self.awaiting = None;
        self.deadline = None;
        tracing::info!(
            session = %self.id,
            step = step.name(),
            previous = previous.map(|p| p.name()),
            generation = self.generation.value(),
            "step entered"
        );
    }

    /// Tear down what `step` set up: audio, pending notifications, its
    /// scene elements and, when following, the head monitor.
    pub(crate) fn leave(&mut self, step: Step) {
        self.audio.release();
        self.narration = None;
        if self.awaiting.take() == Some(Awaiting::Tracking) {
            self.controller.clear_tracking_notification();
        }
        self.disarm_deadline();
        if step == Step::Follow {
            self.monitor.stop();
            self.reveal = None;
        }
        for &element in step.elements() {
            self.hide(element);
        }
        tracing::debug!(session = %self.id, step = step.name(), "step left");
    }

    // -- narration --

    fn play(&mut self, track: usize) {
        let id = self.tracks.tracks(self.language).get(track).copied();
        match id {
            Some(id) => self.audio.play(id, self.generation),
            None => tracing::warn!(
                track,
                language = %self.language,
                "narration track missing from table"
            ),
        }
    }

    fn narrate(&mut self, narration: Narration<Cue>) {
        let run = NarrationRun::new(narration, self.generation);
        match run.current() {
            Some(step) => {
                self.narration = Some(run);
                self.play(step.track);
            }
            None => {
                if let Some(cue) = run.finish() {
                    self.schedule(Duration::ZERO, cue);
                }
            }
        }
    }

    /// End of playback reported by the host. Returns a cue to run right
    /// away when the chain continues without a pause.
    pub(crate) fn track_finished(&mut self) -> Option<Cue> {
        let Some(owner) = self.audio.finished() else {
            tracing::trace!("audio finished with no owner");
            return None;
        };
        if owner != self.generation {
            tracing::debug!(owner = owner.value(), "stale audio completion ignored");
            return None;
        }
        let gap = match &self.narration {
            Some(run) if run.generation() == self.generation => run.current()?.gap_after,
            _ => return None,
        };
        if gap.is_zero() {
            Some(Cue::ResumeNarration)
        } else {
            self.schedule(gap, Cue::ResumeNarration);
            None
        }
    }

    /// Play the next track, or hand back the chain's continuation.
    pub(crate) fn resume_narration(&mut self) -> Option<Cue> {
        let next = self.narration.as_mut()?.advance();
        match next {
            Some(step) => {
                self.play(step.track);
                None
            }
            None => self.narration.take().and_then(NarrationRun::finish),
        }
    }

    // -- step scripts --

    pub(crate) fn enter_menu(&mut self) {
        let camera = self.camera.pose();
        let pose = Pose::new(
            camera.ahead(self.config.placement.menu_distance, 0.0),
            camera.rotation,
        );
        self.stage.set_pose(Element::Menu, pose);
        self.show(Element::Menu);
        let prompt = self.config.narration.menu_prompt;
        self.narrate(Narration::new().track(prompt, Duration::ZERO));
    }

    /// Drop the marker from an earlier pass through the calibration chain.
    fn clear_walker_marker(&mut self) {
        if self.walker_marker.take().is_some() {
            tracing::debug!(session = %self.id, "walker marker cleared");
        }
        self.hide(Element::WalkerMarker);
    }

    pub(crate) fn enter_ground_calibration(&mut self) {
        self.clear_walker_marker();
        self.stage.set_text(Element::Instruction, GROUND_INSTRUCTION);
        self.show(Element::Instruction);
        self.awaiting = Some(Awaiting::Ground);
        self.ground_detector.start_detection();
        self.arm_deadline(self.config.watchdog.ground_detection, Step::GroundCalibration);
    }

    pub(crate) fn enter_phone_calibration(&mut self) {
        self.clear_walker_marker();
        self.show(Element::StepPanel(0));
        let intro = Narration::spaced(&self.config.narration.phone_intro, Duration::ZERO);
        self.narrate(intro);
        self.awaiting = Some(Awaiting::Tracking);
        self.controller.notify_on_tracking_started();
        self.arm_deadline(
            self.config.watchdog.controller_tracking,
            Step::PhoneCalibration,
        );
    }

    pub(crate) fn enter_set_hand_height(&mut self) {
        self.show(Element::StepPanel(1));
        let narration = Narration::new()
            .track(
                self.config.narration.hand_height,
                self.config.timing.hand_height_delay(),
            )
            .then(Cue::PlaceWalkerMarker);
        self.narrate(narration);
    }

    pub(crate) fn enter_phone_in_pocket(&mut self) {
        self.show(Element::StepPanel(2));
        let narration = Narration::new()
            .track(self.config.narration.pocket, self.config.timing.pocket_delay())
            .then(Cue::Advance(Step::GetWalker));
        self.narrate(narration);
    }

    pub(crate) fn enter_get_walker(&mut self) {
        self.show(Element::StepPanel(3));
        let [first, second, third] = self.config.narration.walker;
        let narration = Narration::new()
            .track(first, Duration::ZERO)
            .track(second, self.config.timing.walker_gap())
            .track(third, Duration::ZERO)
            .then(Cue::Advance(Step::StandStraight));
        self.narrate(narration);
    }

    pub(crate) fn enter_stand_straight(&mut self) {
        self.show(Element::StepPanel(4));
        if let Some(track) = self.config.narration.stand_straight {
            self.narrate(Narration::new().track(track, Duration::ZERO));
        }
        self.schedule(self.config.timing.stand_straight_first(), Cue::SwapStandPanel);
    }

    pub(crate) fn enter_follow(&mut self) {
        let camera = self.camera.pose();
        self.camera_start = Some(camera.position);
        self.monitor.start(camera.position);

        let placement = &self.config.placement;
        let bubble = Pose::new(
            camera.ahead(placement.bubble.distance, placement.bubble.height),
            camera.rotation,
        );
        let signs = Pose::new(
            camera.ahead(placement.signs.distance, placement.signs.height),
            camera.rotation,
        );
        let sign_count = placement.sign_count;
        let reveal = SignReveal::new(
            self.scheduler.now(),
            sign_count,
            Duration::from_millis(placement.sign_stagger_ms),
            Duration::from_millis(placement.sign_reveal_ms),
        );

        self.stage.set_pose(Element::Bubble, bubble);
        self.show(Element::Bubble);
        self.stage.set_pose(Element::Signs, signs);
        self.show(Element::Signs);
        for i in 0..sign_count {
            self.stage.set_scale(Element::Sign(i), 0.0);
            self.show(Element::Sign(i));
        }
        self.reveal = Some(reveal);

        let narration = Narration::spaced(
            &self.config.narration.follow,
            self.config.timing.follow_gap(),
        );
        self.narrate(narration);
    }

    // -- cues --

    pub(crate) fn place_walker_marker(&mut self) {
        if !self.controller.is_tracking() {
            tracing::warn!(session = %self.id, "controller not tracking, using last known pose");
        }
        let phone = self.controller.world_pose();
        let position = phone.position + self.config.placement.marker_offset();
        let rotation = self
            .ground
            .map(|g| g.rotation)
            .unwrap_or_else(UnitQuaternion::identity);

        self.stage
            .set_pose(Element::WalkerMarker, Pose::new(position, rotation));
        self.show(Element::WalkerMarker);
        self.walker_marker = Some(position);
        tracing::info!(
            session = %self.id,
            x = position.x,
            y = position.y,
            z = position.z,
            "walker marker placed"
        );
        self.schedule(Duration::ZERO, Cue::Advance(Step::PhoneInPocket));
    }

    pub(crate) fn swap_stand_panel(&mut self) {
        self.hide(Element::StepPanel(4));
        self.show(Element::StepPanel(5));
        self.schedule(
            self.config.timing.stand_straight_second(),
            Cue::Advance(Step::Follow),
        );
    }

    /// Ground reported by the detector. Accepted only while a calibration
    /// is waiting for it.
    pub(crate) fn accept_ground(&mut self, pose: Pose) -> bool {
        if self.awaiting != Some(Awaiting::Ground) {
            tracing::debug!(session = %self.id, "ground detection ignored");
            return false;
        }
        self.awaiting = None;
        self.disarm_deadline();
        self.ground = Some(pose);
        tracing::info!(session = %self.id, ground_y = pose.position.y, "ground detected");
        true
    }

    /// Tracking started on the controller. Accepted only while phone
    /// calibration is waiting for it.
    pub(crate) fn accept_tracking_started(&mut self) -> bool {
        if self.awaiting != Some(Awaiting::Tracking) {
            tracing::debug!(session = %self.id, "tracking start ignored");
            return false;
        }
        self.awaiting = None;
        self.disarm_deadline();
        self.controller.clear_tracking_notification();
        tracing::info!(session = %self.id, "controller tracking started");
        true
    }

    /// An awaited completion is overdue. Applies the configured fallback's
    /// side effects and tells the flow how to move on.
    pub(crate) fn deadline_passed(&mut self, step: Step) -> Option<Recovery> {
        let deadline = match step {
            Step::GroundCalibration => self.config.watchdog.ground_detection,
            Step::PhoneCalibration => self.config.watchdog.controller_tracking,
            _ => None,
        }?;
        self.deadline = None;
        tracing::warn!(
            session = %self.id,
            step = step.name(),
            after_ms = deadline.after_ms,
            fallback = ?deadline.fallback,
            "completion overdue"
        );

        match deadline.fallback {
            Fallback::Retry => Some(Recovery::Reenter(step)),
            Fallback::Advance => {
                if step == Step::GroundCalibration {
                    let camera = self.camera.pose();
                    let floor = camera.position
                        - Vector3::y() * self.config.placement.fallback_eye_height;
                    self.ground = Some(Pose::at(floor));
                } else if self.awaiting == Some(Awaiting::Tracking) {
                    self.controller.clear_tracking_notification();
                }
                self.awaiting = None;
                step.successor().map(Recovery::Signal)
            }
        }
    }

    // -- per frame --

    pub(crate) fn animate(&mut self) {
        let now = self.scheduler.now();
        let Some(reveal) = &self.reveal else {
            return;
        };
        for (i, scale) in reveal.scales(now) {
            self.stage.set_scale(Element::Sign(i), scale);
        }
        if reveal.is_complete(now) {
            self.reveal = None;
        }
    }

    pub(crate) fn sample_head(&mut self) {
        if !self.monitor.is_tracking() {
            return;
        }
        let camera = self.camera.pose();
        let Some(sample) = self.monitor.on_frame(&camera) else {
            return;
        };
        if let Some(pose) = sample.warning {
            self.stage.set_pose(Element::Warning, pose);
        }
        match sample.alert {
            Some(Alert::Raised) => {
                tracing::info!(session = %self.id, displacement = sample.displacement, "lean warning raised");
                self.show(Element::Warning);
            }
            Some(Alert::Cleared) => {
                tracing::info!(session = %self.id, displacement = sample.displacement, "lean warning cleared");
                self.hide(Element::Warning);
            }
            None => {}
        }
    }

    pub(crate) fn snapshot(&self, step: Option<Step>) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            step,
            generation: self.generation,
            language: self.language,
            ground: self.ground,
            walker_marker: self.walker_marker,
            camera_start: self.camera_start,
            warning_active: self.monitor.is_warning_active(),
            displacement: self.monitor.displacement(),
            elapsed_ms: u64::try_from(self.scheduler.now().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("language", &self.language)
            .field("awaiting", &self.awaiting)
            .field("audio", &self.audio)
            .field("pending_timers", &self.scheduler.pending())
            .finish()
    }
}

/// Serializable view of a session for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub step: Option<Step>,
    pub generation: Generation,
    pub language: Language,
    pub ground: Option<Pose>,
    pub walker_marker: Option<Vector3<f32>>,
    pub camera_start: Option<Vector3<f32>>,
    pub warning_active: bool,
    pub displacement: Option<f32>,
    pub elapsed_ms: u64,
}

impl SessionSnapshot {
    /// Pretty-printed JSON, for on-screen debugging.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a snapshot produced by [`to_json`](Self::to_json).
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
