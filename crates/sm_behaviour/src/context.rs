//! The context handed to every element step.

use serde::{Deserialize, Serialize};

use crate::blackboard::Blackboard;
use crate::config::BehaviourConfig;
use crate::world::WorldModel;

/// Effects requested by actions. The driver drains and executes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MotionCommand {
    StopWalking,
    /// Walk to a robot-relative target, optionally arriving with `heading`.
    WalkTo { u: f64, v: f64, heading: Option<f64> },
    /// Turn on the spot at `rate` rad/s.
    Turn { rate: f64 },
    Kick { penalty: bool },
    HeadPanTilt { pan: f64, tilt: f64 },
    /// Point the head at a robot-relative position.
    HeadTrack { u: f64, v: f64 },
}

pub struct RobotContext {
    /// Seconds on the driver's clock.
    pub now: f64,
    pub world: WorldModel,
    pub blackboard: Blackboard,
    commands: Vec<MotionCommand>,
}

impl RobotContext {
    pub fn new(config: &BehaviourConfig) -> Self {
        Self {
            now: 0.0,
            world: WorldModel::new(&config.field),
            blackboard: Blackboard::default(),
            commands: Vec::new(),
        }
    }

    pub fn request(&mut self, command: MotionCommand) {
        self.commands.push(command);
    }

    pub fn stop_walking(&mut self) {
        self.request(MotionCommand::StopWalking);
    }

    /// Commands requested since the last drain.
    pub fn pending(&self) -> &[MotionCommand] {
        &self.commands
    }

    pub fn drain_commands(&mut self) -> Vec<MotionCommand> {
        std::mem::take(&mut self.commands)
    }
}
