//! Walkguide: orchestration for an AR guided-walking tutorial
//!
//! The crate sequences a calibration-then-follow tutorial on top of host
//! supplied sensing, rendering and audio. It is built in three layers:
//!
//! - **State machine**: a generic, signal-gated engine (`machine`, `builder`)
//!   over types implementing [`State`]
//! - **Tutorial flow**: the concrete steps, their narration chains and timers
//!   ([`flow::TutorialFlow`])
//! - **Head monitor**: a lean-forward detector active while following
//!   ([`monitor::HeadMonitor`])
//!
//! Logging goes through `tracing`; install a subscriber in the host to see
//! it.
//!
//! # Example
//!
//! ```rust
//! use walkguide::core::State;
//! use walkguide::flow::Step;
//! use walkguide::machine::{StateDefinition, Transition};
//! use walkguide::StateMachineBuilder;
//!
//! let machine = StateMachineBuilder::<Step, Step, ()>::new()
//!     .state(StateDefinition::new(Step::StandStraight).transition(Transition::to(Step::Follow)))
//!     .state(StateDefinition::new(Step::Follow))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(machine.state_names().len(), 2);
//! assert!(Step::Follow.is_final());
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod flow;
pub mod host;
pub mod machine;
pub mod monitor;
pub mod schedule;

pub use builder::{BuildError, SetupIssue, StateMachineBuilder};
pub use config::{load_toml, TutorialConfig};
pub use core::{Guard, State, StateHistory};
pub use error::FlowError;
pub use flow::{SessionSnapshot, Step, TutorialFlow};
pub use host::{Host, HostBuilder, Language, Pose};
pub use machine::{MachineError, StateMachine};
pub use monitor::HeadMonitor;
