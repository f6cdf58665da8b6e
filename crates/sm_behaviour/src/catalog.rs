//! Catalog wiring for the body and head stacks.
//!
//! Factories capture a shared config so every element is built with the same
//! tunables the driver loaded.

use std::sync::Arc;

use sm_core::{Catalog, Element, Result, Role};

use crate::body::{
    AfterThrowDecision, BodyRoot, CenterDecision, CloseBall, CloseBallMode, GoToBall, GoToDutyPosition, GoalieDecision,
    Kick, Search, SupporterDecision, Wait,
};
use crate::config::BehaviourConfig;
use crate::context::RobotContext;
use crate::head::{ContinuousSearch, HeadRoot, SearchForObject, SearchTarget, TrackBall};

pub type RobotCatalog = Catalog<RobotContext>;

fn boxed<E: Element<RobotContext> + 'static>(element: E) -> Result<Box<dyn Element<RobotContext>>> {
    Ok(Box::new(element))
}

pub fn body_catalog(config: Arc<BehaviourConfig>) -> Result<RobotCatalog> {
    let mut catalog = RobotCatalog::new();

    // ========== Decisions ==========

    let cfg = Arc::clone(&config);
    catalog.register(BodyRoot::KIND, Role::Decision, move |_| boxed(BodyRoot::new(&cfg)))?;

    let cfg = Arc::clone(&config);
    catalog.register(SupporterDecision::KIND, Role::Decision, move |_| boxed(SupporterDecision::new(&cfg)))?;

    catalog.register(CenterDecision::KIND, Role::Decision, |_| boxed(CenterDecision))?;
    catalog.register(GoalieDecision::KIND, Role::Decision, |_| boxed(GoalieDecision::new()))?;

    let cfg = Arc::clone(&config);
    catalog.register(AfterThrowDecision::KIND, Role::Decision, move |_| boxed(AfterThrowDecision::new(&cfg)))?;

    for (kind, mode) in [
        (CloseBall::KIND, CloseBallMode::Common),
        (CloseBall::PENALTY_KIND, CloseBallMode::PenaltyKick),
        (CloseBall::GOALIE_KIND, CloseBallMode::Goalie),
    ] {
        let cfg = Arc::clone(&config);
        catalog.register(kind, Role::Decision, move |_| boxed(CloseBall::new(mode, &cfg)))?;
    }

    // ========== Actions ==========

    let cfg = Arc::clone(&config);
    catalog.register(Wait::KIND, Role::Action, move |payload| boxed(Wait::from_payload(payload, &cfg)?))?;
    catalog.register(Search::KIND, Role::Action, |_| boxed(Search::new()))?;
    catalog.register(GoToBall::KIND, Role::Action, |payload| boxed(GoToBall::from_payload(payload)?))?;

    let cfg = Arc::clone(&config);
    catalog.register(GoToDutyPosition::KIND, Role::Action, move |_| boxed(GoToDutyPosition::new(&cfg)))?;
    catalog.register(Kick::KIND, Role::Action, |payload| boxed(Kick::from_payload(payload)?))?;

    // last, so it resolves every kind above
    catalog.register_sequence()?;

    Ok(catalog)
}

pub fn head_catalog(config: Arc<BehaviourConfig>) -> Result<RobotCatalog> {
    let mut catalog = RobotCatalog::new();

    let cfg = Arc::clone(&config);
    catalog.register(HeadRoot::KIND, Role::Decision, move |_| boxed(HeadRoot::new(&cfg)))?;
    catalog.register(SearchForObject::BALL_KIND, Role::Decision, |_| {
        boxed(SearchForObject::new(SearchTarget::Ball))
    })?;
    catalog.register(SearchForObject::GOAL_KIND, Role::Decision, |_| {
        boxed(SearchForObject::new(SearchTarget::EnemyGoal))
    })?;

    let cfg = Arc::clone(&config);
    catalog.register(ContinuousSearch::KIND, Role::Action, move |_| boxed(ContinuousSearch::new(&cfg)))?;
    catalog.register(TrackBall::KIND, Role::Action, |_| boxed(TrackBall))?;

    Ok(catalog)
}
