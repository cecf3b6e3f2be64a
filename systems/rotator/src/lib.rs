#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-pendulum tool physics shared by every minigame.
//!
//! The tool hangs from the pointer. Gravity pulls the head towards the bottom
//! of its arc (angle zero) while mouse buttons apply torque in either
//! direction. Sustained spinning in one direction raises the speed stage and
//! with it the velocity cap; a fast pass through the bottom of the arc counts
//! as a strike.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

const FALLBACK_DT: f32 = 1.0 / 60.0;
const MIN_INERTIA: f32 = 1e-4;
const MAX_REVOLUTIONS: u32 = 12;
const REBOUND_FACTOR: f32 = 0.2;

/// Tunable physical constants of the tool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatorConfig {
    /// Gravitational acceleration; zero for a tool lying flat.
    pub gravity: f32,
    /// Velocity multiplier applied each step while no button is held.
    pub damping: f32,
    /// Mass of the tool head.
    pub head_mass: f32,
    /// Mass of the handle.
    pub handle_mass: f32,
    /// Distance from the anchor to the head's center of mass.
    pub head_radius: f32,
    /// Distance from the anchor to the handle's center of mass.
    pub handle_radius: f32,
    /// Torque applied per second while a mouse button is held.
    pub click_torque: f32,
    /// Velocity cap of each speed stage.
    pub max_velocities: [f32; 3],
    /// Below this speed revolutions and stage reset.
    pub min_decay_velocity: f32,
    /// Seconds below the first stage cap before one revolution decays.
    pub revolution_decay_delay: f32,
    /// Fraction of the stage cap a strike must reach.
    pub strike_ratio: f32,
    /// Initial angle in radians.
    pub start_angle: f32,
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            gravity: 100.0,
            damping: 0.995,
            head_mass: 3.0,
            handle_mass: 0.5,
            head_radius: 14.0,
            handle_radius: 9.0,
            click_torque: 500_000.0,
            max_velocities: [6.0, 9.0, 12.0],
            min_decay_velocity: 0.5,
            revolution_decay_delay: 0.5,
            strike_ratio: 0.7,
            start_angle: 0.5,
        }
    }
}

/// Speed stage unlocked by consecutive revolutions in one direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpeedStage {
    /// Default cap.
    First,
    /// Unlocked after three revolutions.
    Second,
    /// Unlocked after six revolutions.
    Third,
}

impl SpeedStage {
    fn from_revolutions(revolutions: u32) -> Self {
        match revolutions {
            6.. => Self::Third,
            3..=5 => Self::Second,
            _ => Self::First,
        }
    }

    /// Position of the stage inside [`RotatorConfig::max_velocities`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }

    /// One-based stage number, used as strike power.
    #[must_use]
    pub const fn number(self) -> u32 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

/// Mouse buttons held during a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RotatorInput {
    /// Left button; pushes towards positive angles.
    pub push_positive: bool,
    /// Right button; pushes towards negative angles.
    pub push_negative: bool,
}

/// Fast pass of the head through the bottom of its arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    /// Stage active at the moment of the strike.
    pub stage: SpeedStage,
    /// Signed angular velocity at the moment of the strike.
    pub angular_velocity: f32,
}

impl Strike {
    /// Strength of the strike, from one to three.
    #[must_use]
    pub const fn power(&self) -> u32 {
        self.stage.number()
    }
}

/// Pendulum state integrated once per frame.
#[derive(Clone, Debug)]
pub struct Rotator {
    config: RotatorConfig,
    angle: f32,
    angular_velocity: f32,
    accumulated_positive: f32,
    accumulated_negative: f32,
    revolutions_positive: u32,
    revolutions_negative: u32,
    stage: SpeedStage,
    decay_timer: f32,
}

impl Default for Rotator {
    fn default() -> Self {
        Self::new(RotatorConfig::default())
    }
}

impl Rotator {
    /// Creates a resting tool at the configured start angle.
    #[must_use]
    pub fn new(config: RotatorConfig) -> Self {
        Self {
            angle: config.start_angle,
            config,
            angular_velocity: 0.0,
            accumulated_positive: 0.0,
            accumulated_negative: 0.0,
            revolutions_positive: 0,
            revolutions_negative: 0,
            stage: SpeedStage::First,
            decay_timer: 0.0,
        }
    }

    /// Constants the tool was created with.
    #[must_use]
    pub fn config(&self) -> &RotatorConfig {
        &self.config
    }

    /// Current angle in radians; zero means the head hangs straight down.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Current signed angular velocity in radians per second.
    #[must_use]
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Active speed stage.
    #[must_use]
    pub fn stage(&self) -> SpeedStage {
        self.stage
    }

    /// Completed revolutions as `(positive, negative)`.
    #[must_use]
    pub fn revolutions(&self) -> (u32, u32) {
        (self.revolutions_positive, self.revolutions_negative)
    }

    /// Unit vector from the anchor towards the head in screen space (y down).
    #[must_use]
    pub fn head_direction(&self) -> Vec2 {
        Vec2::new(self.angle.sin(), self.angle.cos())
    }

    /// Reverses and weakens the swing after hitting something solid.
    pub fn rebound(&mut self) {
        self.angular_velocity = -self.angular_velocity * REBOUND_FACTOR;
    }

    fn stage_cap(&self) -> f32 {
        self.config.max_velocities[self.stage.index()]
    }

    /// Advances the simulation by `dt` seconds. A non-positive `dt` is treated
    /// as one frame at 60 Hz.
    pub fn step(&mut self, dt: f32, input: RotatorInput) -> Option<Strike> {
        let dt = if dt > 0.0 { dt } else { FALLBACK_DT };
        let config = self.config;

        let gravity_torque = -(config.handle_mass * config.gravity * config.handle_radius
            + config.head_mass * config.gravity * config.head_radius)
            * self.angle.sin();
        let inertia = (config.handle_mass * config.handle_radius * config.handle_radius
            + config.head_mass * config.head_radius * config.head_radius)
            .max(MIN_INERTIA);

        let mut click_torque = 0.0;
        if input.push_positive {
            click_torque += config.click_torque * dt;
        }
        if input.push_negative {
            click_torque -= config.click_torque * dt;
        }

        let acceleration = (click_torque + gravity_torque) / inertia;
        let cap = self.stage_cap();
        self.angular_velocity = (self.angular_velocity + acceleration * dt).clamp(-cap, cap);

        let previous = self.angle;
        self.angle += self.angular_velocity * dt;

        self.track_revolutions(wrap_angle(self.angle - previous));
        self.stage = SpeedStage::from_revolutions(
            self.revolutions_positive.max(self.revolutions_negative),
        );

        let strike = self.detect_strike(previous);

        if !(input.push_positive || input.push_negative) {
            self.angular_velocity *= config.damping;
        }
        self.decay_revolutions(dt);

        strike
    }

    fn track_revolutions(&mut self, delta: f32) {
        if delta > 0.0 {
            self.accumulated_positive += delta;
            while self.accumulated_positive >= TAU {
                self.accumulated_positive -= TAU;
                self.revolutions_positive = (self.revolutions_positive + 1).min(MAX_REVOLUTIONS);
                self.revolutions_negative = 0;
            }
        } else if delta < 0.0 {
            self.accumulated_negative -= delta;
            while self.accumulated_negative >= TAU {
                self.accumulated_negative -= TAU;
                self.revolutions_negative = (self.revolutions_negative + 1).min(MAX_REVOLUTIONS);
                self.revolutions_positive = 0;
            }
        }
    }

    fn detect_strike(&self, previous: f32) -> Option<Strike> {
        if !crosses_multiple_of_tau(previous, self.angle) {
            return None;
        }

        let threshold = self.stage_cap() * self.config.strike_ratio;
        (self.angular_velocity.abs() >= threshold).then_some(Strike {
            stage: self.stage,
            angular_velocity: self.angular_velocity,
        })
    }

    fn decay_revolutions(&mut self, dt: f32) {
        self.decay_timer += dt;
        let slow = self.angular_velocity.abs() < self.config.max_velocities[0];
        if slow && self.decay_timer > self.config.revolution_decay_delay {
            self.decay_timer = 0.0;
            self.revolutions_positive = self.revolutions_positive.saturating_sub(1);
            self.revolutions_negative = self.revolutions_negative.saturating_sub(1);
        }

        if self.angular_velocity.abs() < self.config.min_decay_velocity {
            self.revolutions_positive = 0;
            self.revolutions_negative = 0;
            self.accumulated_positive = 0.0;
            self.accumulated_negative = 0.0;
            self.stage = SpeedStage::First;
        }
    }
}

fn crosses_multiple_of_tau(from: f32, to: f32) -> bool {
    (from / TAU).floor() != (to / TAU).floor()
}

fn wrap_angle(mut radians: f32) -> f32 {
    while radians <= -PI {
        radians += TAU;
    }
    while radians > PI {
        radians -= TAU;
    }
    radians
}
