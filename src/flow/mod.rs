//! Guided-walking tutorial flow.
//!
//! [`TutorialFlow`] wires the tutorial steps into a [`StateMachine`] whose
//! context is the [`Session`]. The host drives it from a single thread:
//!
//! - host completions arrive as method calls (`ground_detected`,
//!   `tracking_changed`, `audio_finished`, `select_language`)
//! - `update` advances the session clock once per frame, runs due timers,
//!   animates the signs and samples the head monitor
//!
//! Every step entry starts a new [`Generation`](crate::schedule::Generation).
//! Timers and audio completions from an older generation are dropped, so
//! re-entering a step never lets its previous activation signal a second
//! time. At most one state change happens per `update`.

mod audio;
mod narration;
mod reveal;
mod session;
mod step;

pub use audio::AudioChannel;
pub use narration::{Narration, NarrationRun, NarrationStep};
pub use reveal::{ease_out_bounce, SignReveal};
pub use session::{Session, SessionSnapshot};
pub use step::Step;

use crate::builder::{BuildError, StateMachineBuilder};
use crate::config::TutorialConfig;
use crate::core::{State, StateHistory};
use crate::error::FlowError;
use crate::host::{Host, Language, Pose};
use crate::machine::{StateDefinition, StateMachine, Transition};
use nalgebra::{UnitQuaternion, Vector3};
use session::{Cue, Recovery};
use std::time::Duration;

type StepMachine = StateMachine<Step, Step, Session>;
type Script = fn(&mut Session);

fn step(step: Step, script: Script) -> StateDefinition<Step, Step, Session> {
    let definition = StateDefinition::new(step).on_enter(move |session: &mut Session, previous| {
        session.begin(step, previous);
        script(session);
    });
    match step.successor() {
        Some(next) => definition.transition(
            Transition::to(next).on_execution(move |session: &mut Session| session.leave(step)),
        ),
        None => definition,
    }
}

fn definitions() -> Vec<StateDefinition<Step, Step, Session>> {
    vec![
        step(Step::Menu, Session::enter_menu),
        step(Step::GroundCalibration, Session::enter_ground_calibration),
        step(Step::PhoneCalibration, Session::enter_phone_calibration),
        step(Step::SetHandHeight, Session::enter_set_hand_height),
        step(Step::PhoneInPocket, Session::enter_phone_in_pocket),
        step(Step::GetWalker, Session::enter_get_walker),
        step(Step::StandStraight, Session::enter_stand_straight),
        step(Step::Follow, Session::enter_follow),
    ]
}

/// The tutorial controller owned by the host.
pub struct TutorialFlow {
    machine: StepMachine,
    session: Session,
}

impl TutorialFlow {
    /// Validate `config` against the host's track table and assemble the
    /// step machine. Nothing is entered until [`start`](Self::start).
    pub fn new(config: TutorialConfig, host: Host) -> Result<Self, BuildError> {
        config.validate(host.tracks.as_ref())?;
        let machine = StateMachineBuilder::new().states(definitions()).build()?;
        Ok(Self {
            machine,
            session: Session::new(config, host),
        })
    }

    /// Enter the configured first step.
    pub fn start(&mut self) -> Result<(), FlowError> {
        let first = self.session.config.start;
        tracing::info!(
            session = %self.session.id(),
            step = first.name(),
            "tutorial started"
        );
        self.enter(first)
    }

    /// Force entry into `step` from wherever the flow is, tearing down the
    /// current step first.
    pub fn enter(&mut self, step: Step) -> Result<(), FlowError> {
        if let Some(current) = self.current_step() {
            self.session.leave(current);
        }
        self.machine.enter_state(&step, &mut self.session)?;
        Ok(())
    }

    /// Signal the current step. Returns the step entered, if any.
    fn signal(&mut self, next: Step) -> Result<Option<Step>, FlowError> {
        Ok(self.machine.send_signal(&next, &mut self.session)?)
    }

    /// Step currently entered, `None` before [`start`](Self::start).
    pub fn current_step(&self) -> Option<Step> {
        self.machine.current_state().copied()
    }

    /// Whether the terminal step has been reached.
    pub fn is_finished(&self) -> bool {
        self.machine.is_final()
    }

    /// Every step entry so far, forced or signalled.
    pub fn history(&self) -> &StateHistory<Step> {
        self.machine.history()
    }

    /// Read-only view of the session context.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Serializable state for diagnostics.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot(self.current_step())
    }

    /// Language chosen in the menu. From the menu this advances normally;
    /// from any other step it restarts phone calibration with the new
    /// narration language.
    pub fn select_language(&mut self, language: Language) -> Result<(), FlowError> {
        self.session.set_language(language);
        if self.current_step() == Some(Step::Menu) {
            self.signal(Step::PhoneCalibration)?;
        } else {
            self.enter(Step::PhoneCalibration)?;
        }
        Ok(())
    }

    /// Ground detection finished.
    pub fn ground_detected(
        &mut self,
        position: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
    ) -> Result<(), FlowError> {
        if self.session.accept_ground(Pose::new(position, rotation)) {
            self.signal(Step::PhoneCalibration)?;
        }
        Ok(())
    }

    /// Controller tracking state changed. Only a start matters, and only
    /// while phone calibration waits for it.
    pub fn tracking_changed(&mut self, tracking: bool) -> Result<(), FlowError> {
        if tracking && self.session.accept_tracking_started() {
            self.signal(Step::SetHandHeight)?;
        }
        Ok(())
    }

    /// The audio player reached the end of the current track.
    pub fn audio_finished(&mut self) -> Result<(), FlowError> {
        if let Some(cue) = self.session.track_finished() {
            self.run_cue(cue)?;
        }
        Ok(())
    }

    /// Per-frame tick.
    pub fn update(&mut self, dt: Duration) -> Result<(), FlowError> {
        self.session.scheduler.advance(dt);
        while let Some(fired) = self.session.scheduler.pop_due() {
            if fired.generation != self.session.generation() {
                tracing::debug!(
                    cue = ?fired.payload,
                    generation = fired.generation.value(),
                    "stale timer dropped"
                );
                continue;
            }
            if self.run_cue(fired.payload)? {
                break;
            }
        }
        self.session.animate();
        self.session.sample_head();
        Ok(())
    }

    /// Run one cue. Returns true if the current step changed.
    fn run_cue(&mut self, cue: Cue) -> Result<bool, FlowError> {
        let mut cue = Some(cue);
        while let Some(current) = cue.take() {
            match current {
                Cue::Advance(next) => return Ok(self.signal(next)?.is_some()),
                Cue::ResumeNarration => cue = self.session.resume_narration(),
                Cue::PlaceWalkerMarker => self.session.place_walker_marker(),
                Cue::SwapStandPanel => self.session.swap_stand_panel(),
                Cue::Deadline(step) => match self.session.deadline_passed(step) {
                    Some(Recovery::Signal(next)) => return Ok(self.signal(next)?.is_some()),
                    Some(Recovery::Reenter(step)) => {
                        self.enter(step)?;
                        return Ok(true);
                    }
                    None => {}
                },
            }
        }
        Ok(false)
    }
}

impl std::fmt::Debug for TutorialFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorialFlow")
            .field("step", &self.current_step())
            .field("session", &self.session)
            .finish()
    }
}
