//! Shared flags between the body and head stacks.

use serde::{Deserialize, Serialize};

/// What the head should be doing, set by body elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadMode {
    /// Keep the ball in view, searching if it is lost.
    #[default]
    BallMode,
    /// Alternate between ball and goal while close to the ball.
    BallGoalTracking,
    /// Look for the opponent goal.
    GoalMode,
}

/// Side a goalie threw itself to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrowDirection {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Blackboard {
    head_duty: HeadMode,
    thrown: Option<ThrowDirection>,
    goalie_kicked: bool,
    first_kick_done: bool,
}

impl Blackboard {
    pub fn head_duty(&self) -> HeadMode {
        self.head_duty
    }

    pub fn set_head_duty(&mut self, mode: HeadMode) {
        self.head_duty = mode;
    }

    pub fn record_throw(&mut self, direction: ThrowDirection) {
        self.thrown = Some(direction);
    }

    pub fn was_thrown(&self) -> bool {
        self.thrown.is_some()
    }

    pub fn throw_direction(&self) -> Option<ThrowDirection> {
        self.thrown
    }

    pub fn delete_was_thrown(&mut self) {
        self.thrown = None;
    }

    pub fn goalie_kicked(&self) -> bool {
        self.goalie_kicked
    }

    pub fn set_goalie_kicked(&mut self, kicked: bool) {
        self.goalie_kicked = kicked;
    }

    pub fn first_kick_done(&self) -> bool {
        self.first_kick_done
    }

    pub fn set_first_kick_done(&mut self) {
        self.first_kick_done = true;
    }
}
