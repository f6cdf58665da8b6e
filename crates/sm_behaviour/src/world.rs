//! World model as seen by the behaviour elements.
//!
//! Filled by the driver from perception and localization; elements only read it.
//! Relative coordinates (u, v) are robot-centric: u forward, v to the left.

use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;

/// Robot pose on the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldModel {
    pose: Pose,
    ball_uv: (f64, f64),
    ball_last_seen: Option<f64>,
    new_frame: bool,
    field_length: f64,
    goal_width: f64,
}

impl WorldModel {
    pub fn new(field: &FieldConfig) -> Self {
        Self {
            pose: Pose::default(),
            ball_uv: (0.0, 0.0),
            ball_last_seen: None,
            new_frame: false,
            field_length: field.length,
            goal_width: field.goal_width,
        }
    }

    // ========== Updates ==========

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Record a ball detection at relative position (u, v) taken at `stamp`.
    pub fn observe_ball(&mut self, u: f64, v: f64, stamp: f64) {
        self.ball_uv = (u, v);
        self.ball_last_seen = Some(stamp);
    }

    pub fn set_new_frame(&mut self, new_frame: bool) {
        self.new_frame = new_frame;
    }

    // ========== Ball ==========

    pub fn ball_seen(&self, now: f64, window: f64) -> bool {
        self.ball_last_seen.is_some_and(|stamp| now - stamp < window)
    }

    pub fn ball_last_seen(&self) -> Option<f64> {
        self.ball_last_seen
    }

    /// Last known relative ball position.
    pub fn ball_uv(&self) -> (f64, f64) {
        self.ball_uv
    }

    pub fn ball_distance(&self) -> f64 {
        let (u, v) = self.ball_uv;
        u.hypot(v)
    }

    /// Absolute ball position from the last relative sighting.
    pub fn ball_xy(&self) -> (f64, f64) {
        let (u, v) = self.ball_uv;
        self.xy_from_uv(u, v)
    }

    // ========== Goals ==========

    pub fn opp_goal_center_xy(&self) -> (f64, f64) {
        (self.field_length / 2.0, 0.0)
    }

    pub fn own_goal_center_xy(&self) -> (f64, f64) {
        (-self.field_length / 2.0, 0.0)
    }

    pub fn opp_goal_posts_xy(&self) -> [(f64, f64); 2] {
        let (x, y) = self.opp_goal_center_xy();
        let half = self.goal_width / 2.0;
        [(x, y - half), (x, y + half)]
    }

    /// Heading from the ball to the opponent goal center.
    pub fn opp_goal_angle_from_ball(&self) -> f64 {
        let (bx, by) = self.ball_xy();
        let (gx, gy) = self.opp_goal_center_xy();
        (gy - by).atan2(gx - bx)
    }

    // ========== Frames ==========

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_new_frame(&self) -> bool {
        self.new_frame
    }

    /// Absolute field position to robot-relative (u, v).
    pub fn uv_from_xy(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.pose.x;
        let dy = y - self.pose.y;
        let (sin, cos) = (-self.pose.theta).sin_cos();
        (cos * dx - sin * dy, sin * dx + cos * dy)
    }

    /// Robot-relative (u, v) to absolute field position.
    pub fn xy_from_uv(&self, u: f64, v: f64) -> (f64, f64) {
        let (sin, cos) = self.pose.theta.sin_cos();
        (self.pose.x + cos * u - sin * v, self.pose.y + sin * u + cos * v)
    }

    pub fn distance_to_xy(&self, x: f64, y: f64) -> f64 {
        let (u, v) = self.uv_from_xy(x, y);
        u.hypot(v)
    }
}
