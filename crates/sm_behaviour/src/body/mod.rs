//! Body stack: role decisions at the bottom, walking and kicking at the top.

pub mod actions;
pub mod decisions;

pub use actions::{GoToBall, GoToDutyPosition, Kick, Search, Wait};
pub use decisions::{
    AfterThrowDecision, BodyRoot, CenterDecision, CloseBall, CloseBallMode, GoalieDecision, SupporterDecision,
};
