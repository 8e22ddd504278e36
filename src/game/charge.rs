//! Charge-to-velocity shot mechanic

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::constants::{CHARGE_RATE, CHARGE_TIERS, MAX_CHARGE, MAX_SHOT_SPEED, MIN_SHOT_SPEED};

/// Charge tuning
#[derive(Debug, Clone, Copy)]
pub struct ChargeSettings {
    /// Charge gained per second of holding
    pub charge_rate: f32,
    /// Upper clamp for accumulated charge
    pub max_charge: f32,
    /// Speed floor for any released shot
    pub min_speed: f32,
    /// Speed at full charge
    pub max_speed: f32,
}

impl Default for ChargeSettings {
    fn default() -> Self {
        Self {
            charge_rate: CHARGE_RATE,
            max_charge: MAX_CHARGE,
            min_speed: MIN_SHOT_SPEED,
            max_speed: MAX_SHOT_SPEED,
        }
    }
}

/// Discrete charge level used for aim feedback (0 = empty, 6 = full)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ChargeTier(pub u8);

/// A single fire event, real or replayed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotAttempt {
    pub is_ghost: bool,
    pub position: Vec3,
    /// Unit aim direction
    pub direction: Vec2,
    pub velocity: Vec2,
    pub charge: f32,
}

impl ShotAttempt {
    /// Copy of this shot marked as a ghost replay
    pub fn as_ghost(&self) -> Self {
        Self {
            is_ghost: true,
            ..*self
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Accumulates charge while the fire input is held
#[derive(Debug, Clone)]
pub struct ChargeController {
    settings: ChargeSettings,
    charge: f32,
    tier: ChargeTier,
}

impl ChargeController {
    pub fn new(settings: ChargeSettings) -> Self {
        Self {
            settings,
            charge: 0.0,
            tier: ChargeTier::default(),
        }
    }

    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn tier(&self) -> ChargeTier {
        self.tier
    }

    pub fn settings(&self) -> &ChargeSettings {
        &self.settings
    }

    /// Start a fresh hold
    pub fn begin_hold(&mut self) {
        self.charge = 0.0;
        self.tier = ChargeTier::default();
    }

    /// Accrue charge for one tick of held input
    pub fn on_hold_tick(&mut self, dt: f32) -> ChargeTier {
        if !dt.is_finite() {
            return self.tier;
        }
        self.charge = (self.charge + self.settings.charge_rate * dt).clamp(0.0, self.settings.max_charge);
        self.tier = self.tier_for(self.charge);
        self.tier
    }

    /// Release the held input. Returns `None` when nothing was charged.
    pub fn on_release(&mut self, position: Vec3, direction: Vec2) -> Option<ShotAttempt> {
        if self.charge <= 0.0 {
            return None;
        }

        let charge = self.charge;
        let direction = direction.try_normalize().unwrap_or(Vec2::X);
        let speed = self.speed_for(charge);
        self.begin_hold();

        Some(ShotAttempt {
            is_ghost: false,
            position,
            direction,
            velocity: direction * speed,
            charge,
        })
    }

    /// Drop any accumulated charge without firing
    pub fn cancel(&mut self) {
        self.begin_hold();
    }

    /// Map charge to projectile speed, floored at `min_speed`
    pub fn speed_for(&self, charge: f32) -> f32 {
        let ratio = (charge / self.settings.max_charge).clamp(0.0, 1.0);
        (self.settings.max_speed * ratio).max(self.settings.min_speed)
    }

    /// Tier whose upper edge is the first one at or above `charge`
    pub fn tier_for(&self, charge: f32) -> ChargeTier {
        if charge <= 0.0 {
            return ChargeTier(0);
        }
        let step = self.settings.max_charge / CHARGE_TIERS as f32;
        let tier = (charge / step).ceil() as i32 - 1;
        ChargeTier(tier.clamp(0, CHARGE_TIERS as i32 - 1) as u8)
    }
}

impl Default for ChargeController {
    fn default() -> Self {
        Self::new(ChargeSettings::default())
    }
}
