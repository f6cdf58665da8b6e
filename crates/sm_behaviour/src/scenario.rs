//! Scenario replay
//!
//! A scenario is a recorded (or generated) sequence of perception frames.
//! The [`Runner`] feeds each frame into a shared [`RobotContext`], ticks the
//! body stack and then the head stack, and collects what every stack did.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sm_core::{Engine, EngineError, Payload, StackSnapshot, TickReport};
use thiserror::Error;

use crate::blackboard::ThrowDirection;
use crate::body::BodyRoot;
use crate::catalog::{body_catalog, head_catalog};
use crate::config::{BehaviourConfig, ConfigError};
use crate::context::{MotionCommand, RobotContext};
use crate::head::HeadRoot;
use crate::world::Pose;

/// Seconds between synthetic frames.
const SYNTHETIC_DT: f64 = 0.1;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn default_new_frame() -> bool {
    true
}

/// One perception update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    /// Relative ball position, if the ball was detected in this frame.
    #[serde(default)]
    pub ball: Option<(f64, f64)>,
    #[serde(default)]
    pub pose: Option<Pose>,
    #[serde(default = "default_new_frame")]
    pub new_frame: bool,
    /// The goalie threw itself during this frame.
    #[serde(default)]
    pub thrown: Option<ThrowDirection>,
}

impl Frame {
    pub fn at(time: f64) -> Self {
        Self { time, ball: None, pose: None, new_frame: true, thrown: None }
    }

    pub fn with_ball(mut self, u: f64, v: f64) -> Self {
        self.ball = Some((u, v));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub frames: Vec<Frame>,
}

impl Scenario {
    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    /// Deterministic ball random walk with occasional loss periods.
    ///
    /// The ball drifts toward the robot and is put back far away once it gets
    /// close, so every body branch gets exercised over a long run.
    pub fn synthetic(seed: u64, frames: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (mut u, mut v) = (3.0_f64, 0.5_f64);
        let mut lost_for = 0_u32;
        let mut out = Vec::with_capacity(frames);

        for i in 0..frames {
            let mut frame = Frame::at(i as f64 * SYNTHETIC_DT);
            frame.new_frame = !rng.gen_bool(0.2);

            u = (u + rng.gen_range(-0.25..0.1)).clamp(0.1, 4.0);
            v = (v + rng.gen_range(-0.1..0.1)).clamp(-1.5, 1.5);
            if u <= 0.15 {
                u = rng.gen_range(2.0..4.0);
            }

            if lost_for > 0 {
                lost_for -= 1;
            } else if rng.gen_bool(0.03) {
                lost_for = rng.gen_range(5..25);
            } else {
                frame.ball = Some((u, v));
            }
            out.push(frame);
        }

        Self { name: format!("synthetic-{seed}"), frames: out }
    }
}

/// What both stacks did for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub time: f64,
    pub body: TickReport,
    pub head: TickReport,
    pub body_stack: StackSnapshot,
    pub head_stack: StackSnapshot,
    pub commands: Vec<MotionCommand>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub scenario: String,
    pub frames: Vec<FrameReport>,
}

pub struct Runner {
    body: Engine<RobotContext>,
    head: Engine<RobotContext>,
    ctx: RobotContext,
}

impl Runner {
    pub fn new(config: BehaviourConfig) -> Result<Self, ScenarioError> {
        config.validate()?;
        let config = Arc::new(config);
        let body = Engine::with_config(
            body_catalog(Arc::clone(&config))?,
            BodyRoot::KIND,
            Payload::Null,
            config.engine.clone(),
        )?;
        let head = Engine::with_config(
            head_catalog(Arc::clone(&config))?,
            HeadRoot::KIND,
            Payload::Null,
            config.engine.clone(),
        )?;
        let ctx = RobotContext::new(&config);
        Ok(Self { body, head, ctx })
    }

    /// Apply one frame and tick body then head.
    pub fn step(&mut self, frame: &Frame) -> Result<FrameReport, ScenarioError> {
        self.ctx.now = frame.time;
        if let Some(pose) = frame.pose {
            self.ctx.world.set_pose(pose);
        }
        if let Some((u, v)) = frame.ball {
            self.ctx.world.observe_ball(u, v, frame.time);
        }
        self.ctx.world.set_new_frame(frame.new_frame);
        if let Some(direction) = frame.thrown {
            self.ctx.blackboard.record_throw(direction);
        }

        let body = self.body.tick(&mut self.ctx)?;
        let head = self.head.tick(&mut self.ctx)?;

        let mut body_stack = self.body.stack_snapshot();
        body_stack.restore_executed(&body.executed);
        let mut head_stack = self.head.stack_snapshot();
        head_stack.restore_executed(&head.executed);

        Ok(FrameReport {
            time: frame.time,
            body,
            head,
            body_stack,
            head_stack,
            commands: self.ctx.drain_commands(),
        })
    }

    pub fn run(&mut self, scenario: &Scenario) -> Result<RunReport, ScenarioError> {
        tracing::info!(scenario = %scenario.name, frames = scenario.frames.len(), "running scenario");
        let frames = scenario
            .frames
            .iter()
            .map(|frame| self.step(frame))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RunReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            scenario: scenario.name.clone(),
            frames,
        })
    }

    pub fn context(&self) -> &RobotContext {
        &self.ctx
    }

    pub fn body(&self) -> &Engine<RobotContext> {
        &self.body
    }

    pub fn head(&self) -> &Engine<RobotContext> {
        &self.head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::HeadMode;
    use crate::config::PlayerRole;

    #[test]
    fn frames_parse_with_defaults() {
        let scenario = Scenario::from_json_str(
            r#"{"name": "short", "frames": [
                {"time": 0.0},
                {"time": 0.1, "ball": [1.0, 0.2], "new_frame": false, "thrown": "left"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(scenario.frames[0], Frame::at(0.0));
        assert_eq!(scenario.frames[1].ball, Some((1.0, 0.2)));
        assert!(!scenario.frames[1].new_frame);
        assert_eq!(scenario.frames[1].thrown, Some(ThrowDirection::Left));
    }

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let a = Scenario::synthetic(7, 200);
        let b = Scenario::synthetic(7, 200);
        let c = Scenario::synthetic(8, 200);
        assert_eq!(a, b);
        assert_ne!(a.frames, c.frames);
        assert_eq!(a.frames.len(), 200);

        let long = Scenario::synthetic(7, 1000);
        assert!(long.frames.iter().any(|f| f.ball.is_none()));
        assert!(long.frames.iter().any(|f| f.ball.is_some()));
    }

    #[test]
    fn head_follows_the_duty_set_by_the_body_in_the_same_frame() {
        let mut config = BehaviourConfig::default();
        config.role = PlayerRole::Goalie;
        config.toggles.goalie_relocate_turn = false;
        let mut runner = Runner::new(config).unwrap();

        let report = runner.step(&Frame::at(0.0).with_ball(2.0, 0.0)).unwrap();
        assert_eq!(runner.context().blackboard.head_duty(), HeadMode::BallGoalTracking);
        assert_eq!(report.body_stack.kinds(), vec!["BodyRoot", "GoalieDecision", "CloseBallGoalie", "GoToBall"]);
        assert_eq!(report.head_stack.kinds(), vec!["HeadRoot", "TrackBall"]);
        assert!(report.commands.iter().any(|c| matches!(c, MotionCommand::HeadTrack { .. })));
    }

    #[test]
    fn stack_report_keeps_the_executed_debug_fields() {
        let mut runner = Runner::new(BehaviourConfig::default()).unwrap();
        let report = runner.step(&Frame::at(0.0).with_ball(3.0, 0.5)).unwrap();

        let top = report.body_stack.top().unwrap();
        assert_eq!(top.kind, "GoToBall");
        assert_eq!(top.debug.get("target"), Some(&serde_json::json!([3.0, 0.5])));
        assert_eq!(report.body.executed.debug, top.debug);
        assert!(report.body_stack.to_string().contains(r#"<Action: GoToBall>[{"target":[3.0,0.5]}]"#));
    }

    #[test]
    fn throw_is_handled_and_cleared() {
        let mut config = BehaviourConfig::default();
        config.role = PlayerRole::Goalie;
        config.toggles.goalie_relocate_turn = false;
        let mut runner = Runner::new(config).unwrap();

        runner.step(&Frame::at(0.0).with_ball(2.0, 0.0)).unwrap();
        let mut thrown = Frame::at(0.1).with_ball(2.0, 0.0);
        thrown.thrown = Some(ThrowDirection::Right);
        runner.step(&thrown).unwrap();

        // AfterThrowDecision cleared the flag and popped in the same tick
        assert!(!runner.context().blackboard.was_thrown());
        assert_eq!(runner.body().kinds(), vec!["BodyRoot", "GoalieDecision"]);

        runner.step(&Frame::at(0.2).with_ball(2.0, 0.0)).unwrap();
        assert_eq!(runner.body().kinds(), vec!["BodyRoot", "GoalieDecision", "CloseBallGoalie", "GoToBall"]);
    }

    #[test]
    fn synthetic_run_completes_without_faults() {
        let mut runner = Runner::new(BehaviourConfig::default()).unwrap();
        let report = runner.run(&Scenario::synthetic(42, 300)).unwrap();
        assert_eq!(report.frames.len(), 300);
        assert_eq!(report.scenario, "synthetic-42");
        assert!(!runner.body().is_faulted());
        assert!(!runner.head().is_faulted());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.generated_at).is_ok());
    }

    #[test]
    fn invalid_config_is_rejected_before_building() {
        let mut config = BehaviourConfig::default();
        config.search.pattern.clear();
        assert!(matches!(Runner::new(config), Err(ScenarioError::Config(ConfigError::Invalid(_)))));
    }
}
