//! Body actions. Each one requests motion through the context and reports back
//! with `Continue` while busy or `Pop` when done.

use serde::Deserialize;
use sm_core::{decode_payload, DebugData, Directive, Element, Payload, Result};

use crate::blackboard::HeadMode;
use crate::config::BehaviourConfig;
use crate::context::{MotionCommand, RobotContext};

/// Seconds of standing search before the robot starts turning.
const SEARCH_TURN_AFTER: f64 = 3.0;
const SEARCH_TURN_RATE: f64 = 0.4;

/// Stand still until a deadline passes.
///
/// The payload is an optional duration in seconds. The deadline starts at the
/// first step, not at construction.
pub struct Wait {
    duration: f64,
    deadline: Option<f64>,
    pop_before_deadline: bool,
    ball_seen_window: f64,
}

impl Wait {
    pub const KIND: &'static str = "Wait";

    pub fn from_payload(payload: &Payload, config: &BehaviourConfig) -> Result<Self> {
        let duration: Option<f64> = decode_payload(Self::KIND, payload)?;
        Ok(Self {
            duration: duration.unwrap_or(config.wait.default_duration),
            deadline: None,
            pop_before_deadline: config.wait.legacy_pop_before_deadline,
            ball_seen_window: config.world.ball_seen_window,
        })
    }
}

impl Element<RobotContext> for Wait {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        let deadline = *self.deadline.get_or_insert(ctx.now + self.duration);

        if ctx.world.ball_seen(ctx.now, self.ball_seen_window) {
            ctx.blackboard.set_head_duty(HeadMode::BallMode);
        }
        ctx.stop_walking();

        let expired = ctx.now >= deadline;
        if expired != self.pop_before_deadline {
            Directive::pop()
        } else {
            Directive::cont()
        }
    }
}

/// Stand and look for the ball, turning on the spot if it stays lost.
pub struct Search {
    started: Option<f64>,
}

impl Search {
    pub const KIND: &'static str = "Search";

    pub fn new() -> Self {
        Self { started: None }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Element<RobotContext> for Search {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        let started = *self.started.get_or_insert(ctx.now);
        ctx.blackboard.set_head_duty(HeadMode::BallMode);
        if ctx.now - started >= SEARCH_TURN_AFTER {
            ctx.request(MotionCommand::Turn { rate: SEARCH_TURN_RATE });
        } else {
            ctx.stop_walking();
        }
        Directive::cont()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoToBallArgs {
    heading: Option<f64>,
}

/// Walk to the last known ball position.
pub struct GoToBall {
    heading: Option<f64>,
    debug: DebugData,
}

impl GoToBall {
    pub const KIND: &'static str = "GoToBall";

    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let args: GoToBallArgs = decode_payload(Self::KIND, payload)?;
        Ok(Self { heading: args.heading, debug: DebugData::new() })
    }
}

impl Element<RobotContext> for GoToBall {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        let (u, v) = ctx.world.ball_uv();
        self.debug.set("target", serde_json::json!([u, v]));
        ctx.request(MotionCommand::WalkTo { u, v, heading: self.heading });
        Directive::cont()
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

/// Walk to the configured duty position and pop on arrival.
pub struct GoToDutyPosition {
    target: (f64, f64),
    tolerance: f64,
}

impl GoToDutyPosition {
    pub const KIND: &'static str = "GoToDutyPosition";

    pub fn new(config: &BehaviourConfig) -> Self {
        Self {
            target: config.fieldie.duty_position,
            tolerance: config.fieldie.arrive_tolerance,
        }
    }
}

impl Element<RobotContext> for GoToDutyPosition {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        let (x, y) = self.target;
        if ctx.world.distance_to_xy(x, y) <= self.tolerance {
            ctx.blackboard.set_goalie_kicked(false);
            ctx.stop_walking();
            tracing::debug!(x, y, "arrived at duty position");
            return Directive::pop();
        }
        let (u, v) = ctx.world.uv_from_xy(x, y);
        ctx.request(MotionCommand::WalkTo { u, v, heading: None });
        Directive::cont()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KickArgs {
    penalty: bool,
    goalie: bool,
}

/// Fire a single kick and pop.
pub struct Kick {
    penalty: bool,
    goalie: bool,
}

impl Kick {
    pub const KIND: &'static str = "Kick";

    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let args: KickArgs = decode_payload(Self::KIND, payload)?;
        Ok(Self { penalty: args.penalty, goalie: args.goalie })
    }
}

impl Element<RobotContext> for Kick {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        ctx.request(MotionCommand::Kick { penalty: self.penalty });
        ctx.blackboard.set_first_kick_done();
        if self.goalie {
            ctx.blackboard.set_goalie_kicked(true);
        }
        tracing::info!(penalty = self.penalty, goalie = self.goalie, "kick");
        Directive::pop()
    }
}
