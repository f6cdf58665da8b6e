//! # sm_behaviour - Robot football behaviours on the sm_core stack engine
//!
//! Two control stacks share one [`RobotContext`]:
//! - the body stack picks a role decision and walks, waits, searches or kicks
//! - the head stack follows the head duty the body leaves on the blackboard
//!
//! [`Runner`] replays a [`Scenario`] of perception frames through both stacks.
//!
//! ```rust
//! use sm_behaviour::{BehaviourConfig, Frame, Runner};
//!
//! let mut runner = Runner::new(BehaviourConfig::default()).unwrap();
//! let report = runner.step(&Frame::at(0.0).with_ball(3.0, 0.0)).unwrap();
//! assert_eq!(report.body_stack.kinds(), vec!["BodyRoot", "SupporterDecision", "GoToBall"]);
//! ```

pub mod blackboard;
pub mod body;
pub mod catalog;
pub mod config;
pub mod context;
pub mod head;
pub mod scenario;
pub mod world;

pub use blackboard::{Blackboard, HeadMode, ThrowDirection};
pub use catalog::{body_catalog, head_catalog, RobotCatalog};
pub use config::{BehaviourConfig, ConfigError, PlayerRole};
pub use context::{MotionCommand, RobotContext};
pub use scenario::{Frame, FrameReport, RunReport, Runner, Scenario, ScenarioError};
pub use world::{Pose, WorldModel};
