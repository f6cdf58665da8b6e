//! Head stack
//!
//! Runs beside the body stack and follows the head duty the body leaves on
//! the blackboard. The root reevaluates every tick, so a change of duty or a
//! ball sighting swaps the branch above it at once.

use sm_core::{DebugData, Directive, Element};

use crate::blackboard::HeadMode;
use crate::config::BehaviourConfig;
use crate::context::{MotionCommand, RobotContext};

pub struct HeadRoot {
    ball_seen_window: f64,
    debug: DebugData,
}

impl HeadRoot {
    pub const KIND: &'static str = "HeadRoot";

    pub fn new(config: &BehaviourConfig) -> Self {
        Self { ball_seen_window: config.world.ball_seen_window, debug: DebugData::new() }
    }
}

impl Element<RobotContext> for HeadRoot {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        let duty = ctx.blackboard.head_duty();
        self.debug.set("duty", format!("{duty:?}"));
        match duty {
            HeadMode::BallMode | HeadMode::BallGoalTracking => {
                if ctx.world.ball_seen(ctx.now, self.ball_seen_window) {
                    Directive::push(TrackBall::KIND)
                } else {
                    Directive::push(SearchForObject::BALL_KIND)
                }
            }
            HeadMode::GoalMode => Directive::push(SearchForObject::GOAL_KIND),
        }
    }

    fn reevaluates(&self) -> bool {
        true
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Ball,
    EnemyGoal,
}

/// Waits for a fresh camera frame, then hands over to the sweep pattern.
pub struct SearchForObject {
    target: SearchTarget,
}

impl SearchForObject {
    pub const BALL_KIND: &'static str = "SearchForBall";
    pub const GOAL_KIND: &'static str = "SearchForEnemyGoal";

    pub fn new(target: SearchTarget) -> Self {
        Self { target }
    }
}

impl Element<RobotContext> for SearchForObject {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        if !ctx.world.is_new_frame() {
            return Directive::cont();
        }
        tracing::trace!(search = ?self.target, "starting head sweep");
        Directive::push(ContinuousSearch::KIND)
    }
}

/// Sweeps the configured pan/tilt pattern, holding each point for a few frames.
pub struct ContinuousSearch {
    pattern: Vec<(f64, f64)>,
    frames_per_point: u32,
    index: usize,
    frames_here: u32,
    debug: DebugData,
}

impl ContinuousSearch {
    pub const KIND: &'static str = "ContinuousSearch";

    pub fn new(config: &BehaviourConfig) -> Self {
        Self {
            pattern: config.search.pattern.clone(),
            frames_per_point: config.search.frames_per_point.max(1),
            index: 0,
            frames_here: 0,
            debug: DebugData::new(),
        }
    }
}

impl Element<RobotContext> for ContinuousSearch {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        if self.pattern.is_empty() {
            return Directive::cont();
        }
        if ctx.world.is_new_frame() {
            self.frames_here += 1;
            if self.frames_here > self.frames_per_point {
                self.frames_here = 1;
                self.index = (self.index + 1) % self.pattern.len();
            }
        }
        let (pan, tilt) = self.pattern[self.index];
        self.debug.set("point", self.index);
        ctx.request(MotionCommand::HeadPanTilt { pan, tilt });
        Directive::cont()
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

/// Keep the head on the last ball sighting.
pub struct TrackBall;

impl TrackBall {
    pub const KIND: &'static str = "TrackBall";
}

impl Element<RobotContext> for TrackBall {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        let (u, v) = ctx.world.ball_uv();
        ctx.request(MotionCommand::HeadTrack { u, v });
        Directive::cont()
    }
}
