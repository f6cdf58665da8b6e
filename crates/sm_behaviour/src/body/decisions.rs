//! Body decisions
//!
//! Decisions only choose the next element. The one exception is the head duty:
//! ball handling decisions tell the head stack where to look.

use serde_json::json;
use sm_core::{DebugData, Directive, Element};

use crate::blackboard::{HeadMode, ThrowDirection};
use crate::body::actions::{GoToBall, GoToDutyPosition, Kick, Search, Wait};
use crate::config::{BehaviourConfig, PlayerRole};
use crate::context::RobotContext;

/// Bottom of the body stack: selects the role decision once.
pub struct BodyRoot {
    role: PlayerRole,
}

impl BodyRoot {
    pub const KIND: &'static str = "BodyRoot";

    pub fn new(config: &BehaviourConfig) -> Self {
        Self { role: config.role }
    }
}

impl Element<RobotContext> for BodyRoot {
    fn step(&mut self, _ctx: &mut RobotContext) -> Directive {
        match self.role {
            PlayerRole::Supporter => Directive::push(SupporterDecision::KIND),
            PlayerRole::Center => Directive::push(CenterDecision::KIND),
            PlayerRole::Goalie => Directive::push(GoalieDecision::KIND),
            PlayerRole::Penalty => Directive::push(CloseBall::PENALTY_KIND),
        }
    }
}

/// Search when the ball is lost, approach when it is far, otherwise wait.
pub struct SupporterDecision {
    ball_far_distance: f64,
    ball_lost_timeout: f64,
    ball_seen_window: f64,
    debug: DebugData,
}

impl SupporterDecision {
    pub const KIND: &'static str = "SupporterDecision";

    pub fn new(config: &BehaviourConfig) -> Self {
        Self {
            ball_far_distance: config.supporter.ball_far_distance,
            ball_lost_timeout: config.supporter.ball_lost_timeout,
            ball_seen_window: config.world.ball_seen_window,
            debug: DebugData::new(),
        }
    }
}

impl Element<RobotContext> for SupporterDecision {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        let world = &ctx.world;
        let seen = world.ball_seen(ctx.now, self.ball_seen_window);
        let recent = world.ball_last_seen().is_some_and(|t| ctx.now - t < self.ball_lost_timeout);

        if !(seen || recent) {
            self.debug.set("branch", "search");
            tracing::debug!(now = ctx.now, "supporter lost the ball");
            return Directive::push(Search::KIND);
        }

        let distance = world.ball_distance();
        self.debug.set("ball_distance", distance);
        if distance > self.ball_far_distance {
            self.debug.set("branch", "go_to_ball");
            Directive::push(GoToBall::KIND)
        } else {
            self.debug.set("branch", "wait");
            Directive::push(Wait::KIND)
        }
    }

    fn reevaluates(&self) -> bool {
        true
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

/// Center player: hold the duty position.
pub struct CenterDecision;

impl CenterDecision {
    pub const KIND: &'static str = "CenterDecision";
}

impl Element<RobotContext> for CenterDecision {
    fn step(&mut self, _ctx: &mut RobotContext) -> Directive {
        Directive::push(GoToDutyPosition::KIND)
    }
}

/// Goalie: recover from a throw, return after a kick, otherwise play the ball.
pub struct GoalieDecision {
    debug: DebugData,
}

impl GoalieDecision {
    pub const KIND: &'static str = "GoalieDecision";

    pub fn new() -> Self {
        Self { debug: DebugData::new() }
    }
}

impl Default for GoalieDecision {
    fn default() -> Self {
        Self::new()
    }
}

impl Element<RobotContext> for GoalieDecision {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        if ctx.blackboard.was_thrown() {
            self.debug.set("branch", "after_throw");
            return Directive::push(AfterThrowDecision::KIND);
        }
        if ctx.blackboard.goalie_kicked() {
            self.debug.set("branch", "return");
            return Directive::push(GoToDutyPosition::KIND);
        }
        self.debug.set("branch", "close_ball");
        Directive::push(CloseBall::GOALIE_KIND)
    }

    fn reevaluates(&self) -> bool {
        true
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

/// Decides how the goalie recovers after throwing itself.
pub struct AfterThrowDecision {
    relocate_turn: bool,
    relocated: bool,
}

impl AfterThrowDecision {
    pub const KIND: &'static str = "AfterThrowDecision";

    pub fn new(config: &BehaviourConfig) -> Self {
        Self { relocate_turn: config.toggles.goalie_relocate_turn, relocated: false }
    }
}

impl Element<RobotContext> for AfterThrowDecision {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        if ctx.blackboard.throw_direction() == Some(ThrowDirection::Middle) {
            ctx.blackboard.delete_was_thrown();
        }

        if self.relocate_turn && !self.relocated {
            // turn back to the duty heading first; we resume here once it pops
            self.relocated = true;
            return Directive::push(GoToDutyPosition::KIND);
        }
        ctx.blackboard.delete_was_thrown();
        Directive::pop()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseBallMode {
    Common,
    PenaltyKick,
    Goalie,
}

/// Kick when the ball is in range, otherwise approach it.
///
/// One struct backs three catalog kinds that differ only in the kick branch
/// and in the goalie's bail-out once it has kicked.
pub struct CloseBall {
    mode: CloseBallMode,
    kick_distance: f64,
    min_kick_distance: f64,
    kick_align: f64,
    direct_penalty_kick: bool,
    debug: DebugData,
}

impl CloseBall {
    pub const KIND: &'static str = "CloseBall";
    pub const PENALTY_KIND: &'static str = "CloseBallPenaltyKick";
    pub const GOALIE_KIND: &'static str = "CloseBallGoalie";

    pub fn new(mode: CloseBallMode, config: &BehaviourConfig) -> Self {
        Self {
            mode,
            kick_distance: config.fieldie.kick_distance,
            min_kick_distance: config.fieldie.min_kick_distance,
            kick_align: config.fieldie.kick_align,
            direct_penalty_kick: config.toggles.direct_penalty_kick,
            debug: DebugData::new(),
        }
    }

    fn in_kick_range(&self, ctx: &RobotContext) -> bool {
        let (u, _) = ctx.world.ball_uv();
        self.min_kick_distance < u
            && u <= self.kick_distance
            && ctx.world.ball_distance() <= self.kick_distance * 5.0
    }

    fn kick(&mut self, ctx: &RobotContext) -> Directive {
        match self.mode {
            CloseBallMode::Common => Directive::push(Kick::KIND),
            CloseBallMode::Goalie => Directive::push(Kick::KIND).with_payload(json!({"goalie": true})),
            CloseBallMode::PenaltyKick => {
                if !self.direct_penalty_kick && !ctx.blackboard.first_kick_done() {
                    self.debug.set("penalty", "first_kick");
                    return Directive::push(Kick::KIND).with_payload(json!({"penalty": true}));
                }
                let (_, v) = ctx.world.ball_uv();
                if v.abs() > self.kick_align {
                    self.debug.set("penalty", "align");
                    Directive::push(GoToBall::KIND)
                } else {
                    Directive::push(Kick::KIND).with_payload(json!({"penalty": true}))
                }
            }
        }
    }

    fn approach(&mut self, ctx: &RobotContext) -> Directive {
        match self.mode {
            CloseBallMode::PenaltyKick => Directive::push(GoToBall::KIND),
            CloseBallMode::Common | CloseBallMode::Goalie => {
                let (gx, gy) = ctx.world.opp_goal_center_xy();
                let heading = gy.atan2(gx);
                self.debug.set("heading", heading);
                Directive::push(GoToBall::KIND).with_payload(json!({ "heading": heading }))
            }
        }
    }
}

impl Element<RobotContext> for CloseBall {
    fn step(&mut self, ctx: &mut RobotContext) -> Directive {
        if self.mode == CloseBallMode::Goalie && ctx.blackboard.goalie_kicked() {
            self.debug.set("branch", "interrupt");
            return Directive::interrupt();
        }

        ctx.blackboard.set_head_duty(HeadMode::BallGoalTracking);
        if self.in_kick_range(ctx) {
            self.debug.set("branch", "kick");
            self.kick(ctx)
        } else {
            self.debug.set("branch", "approach");
            self.approach(ctx)
        }
    }

    fn reevaluates(&self) -> bool {
        true
    }

    fn take_debug(&mut self) -> DebugData {
        self.debug.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RobotContext {
        RobotContext::new(&BehaviourConfig::default())
    }

    #[test]
    fn supporter_branches() {
        let config = BehaviourConfig::default();
        let mut supporter = SupporterDecision::new(&config);
        let mut ctx = ctx();
        ctx.now = 10.0;

        assert_eq!(supporter.step(&mut ctx), Directive::push(Search::KIND));

        ctx.world.observe_ball(3.0, 0.0, 10.0);
        assert_eq!(supporter.step(&mut ctx), Directive::push(GoToBall::KIND));

        ctx.world.observe_ball(0.5, 0.2, 10.0);
        assert_eq!(supporter.step(&mut ctx), Directive::push(Wait::KIND));
        assert_eq!(supporter.take_debug().get("branch"), Some(&json!("wait")));
    }

    #[test]
    fn supporter_tolerates_short_ball_loss() {
        let config = BehaviourConfig::default();
        let mut supporter = SupporterDecision::new(&config);
        let mut ctx = ctx();
        ctx.world.observe_ball(3.0, 0.0, 10.0);

        // not seen (window 0.5 s) but within the 1 s loss timeout
        ctx.now = 10.8;
        assert_eq!(supporter.step(&mut ctx), Directive::push(GoToBall::KIND));
        ctx.now = 11.2;
        assert_eq!(supporter.step(&mut ctx), Directive::push(Search::KIND));
    }

    #[test]
    fn close_ball_kicks_in_range_and_approaches_otherwise() {
        let config = BehaviourConfig::default();
        let mut close = CloseBall::new(CloseBallMode::Common, &config);
        let mut ctx = ctx();

        ctx.world.observe_ball(0.2, 0.0, 0.0);
        assert_eq!(close.step(&mut ctx), Directive::push(Kick::KIND));
        assert_eq!(ctx.blackboard.head_duty(), HeadMode::BallGoalTracking);

        ctx.world.observe_ball(2.0, 0.0, 0.0);
        assert_eq!(
            close.step(&mut ctx),
            Directive::push(GoToBall::KIND).with_payload(json!({"heading": 0.0}))
        );
    }

    #[test]
    fn penalty_first_kick_then_align() {
        let config = BehaviourConfig::default();
        let mut close = CloseBall::new(CloseBallMode::PenaltyKick, &config);
        let mut ctx = ctx();
        ctx.world.observe_ball(0.2, 0.05, 0.0);

        assert_eq!(
            close.step(&mut ctx),
            Directive::push(Kick::KIND).with_payload(json!({"penalty": true}))
        );

        ctx.blackboard.set_first_kick_done();
        ctx.world.observe_ball(0.2, 0.15, 0.0);
        assert_eq!(close.step(&mut ctx), Directive::push(GoToBall::KIND));
    }

    #[test]
    fn goalie_close_ball_interrupts_after_kick() {
        let config = BehaviourConfig::default();
        let mut close = CloseBall::new(CloseBallMode::Goalie, &config);
        let mut ctx = ctx();
        ctx.blackboard.set_goalie_kicked(true);
        assert_eq!(close.step(&mut ctx), Directive::interrupt());
    }

    #[test]
    fn after_throw_relocates_then_pops() {
        let config = BehaviourConfig::default();
        let mut after = AfterThrowDecision::new(&config);
        let mut ctx = ctx();
        ctx.blackboard.record_throw(ThrowDirection::Left);

        assert_eq!(after.step(&mut ctx), Directive::push(GoToDutyPosition::KIND));
        assert!(ctx.blackboard.was_thrown());
        assert_eq!(after.step(&mut ctx), Directive::pop());
        assert!(!ctx.blackboard.was_thrown());
    }

    #[test]
    fn after_throw_without_relocation_pops_at_once() {
        let mut config = BehaviourConfig::default();
        config.toggles.goalie_relocate_turn = false;
        let mut after = AfterThrowDecision::new(&config);
        let mut ctx = ctx();
        ctx.blackboard.record_throw(ThrowDirection::Middle);

        assert_eq!(after.step(&mut ctx), Directive::pop());
        assert!(!ctx.blackboard.was_thrown());
    }

    #[test]
    fn root_follows_role() {
        let mut config = BehaviourConfig::default();
        config.role = PlayerRole::Penalty;
        let mut root = BodyRoot::new(&config);
        assert_eq!(root.step(&mut ctx()), Directive::push(CloseBall::PENALTY_KIND));
    }
}
