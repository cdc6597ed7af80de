//! consumables carried by the worm: gas, dynamite sticks, laser battery
use crate::config::{PickupConfig, SupplyConfig};
use crate::pickups::PickupKind;
use crate::tools::ToolCost;

/// Why a tool use was refused. Refusals are no‑ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRejection {
    OutOfReach,
    NoGas,
    NoDynamite,
    LowBattery,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Supplies {
    pub gas: u32,
    pub dynamite: u32,
    pub battery: f32,
    /// seconds left before the battery recharges again
    cooldown: f32,
    rapid_shots: u32,
    since_last_shot: f32,
    config: SupplyConfig,
}

impl Supplies {
    pub fn new(config: SupplyConfig) -> Self {
        Self {
            gas: config.starting_gas.min(config.max_gas),
            dynamite: config.starting_dynamite,
            battery: config.max_battery,
            cooldown: 0.0,
            rapid_shots: 0,
            since_last_shot: f32::INFINITY,
            config,
        }
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn check(&self, cost: &ToolCost) -> Result<(), ToolRejection> {
        if self.config.unlimited {
            return Ok(());
        }
        match *cost {
            ToolCost::Free => Ok(()),
            ToolCost::Gas(units) if self.gas >= units => Ok(()),
            ToolCost::Gas(_) => Err(ToolRejection::NoGas),
            ToolCost::Stick if self.dynamite > 0 => Ok(()),
            ToolCost::Stick => Err(ToolRejection::NoDynamite),
            ToolCost::Battery(charge) if self.battery >= charge.max(self.config.min_laser_charge) => {
                Ok(())
            }
            ToolCost::Battery(_) => Err(ToolRejection::LowBattery),
        }
    }

    /// Pay for one use, or refuse without touching anything.
    pub fn spend(&mut self, cost: &ToolCost) -> Result<(), ToolRejection> {
        self.check(cost)?;
        if self.config.unlimited {
            return Ok(());
        }
        match *cost {
            ToolCost::Free => {}
            ToolCost::Gas(units) => self.gas -= units,
            ToolCost::Stick => self.dynamite -= 1,
            ToolCost::Battery(charge) => {
                self.battery = (self.battery - charge).max(0.0);
                self.note_shot();
            }
        }
        Ok(())
    }

    /// rapid fire locks the recharge for a while
    fn note_shot(&mut self) {
        if self.since_last_shot < self.config.rapid_fire_window {
            self.rapid_shots += 1;
        } else {
            self.rapid_shots = 1;
        }
        self.since_last_shot = 0.0;
        if self.rapid_shots >= self.config.rapid_fire_limit {
            self.cooldown = self.config.laser_cooldown;
            self.rapid_shots = 0;
        }
    }

    pub fn recharge(&mut self, dt: f32) {
        self.since_last_shot += dt;
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        } else {
            self.battery = (self.battery + self.config.battery_recharge * dt).min(self.config.max_battery);
        }
    }

    pub fn absorb(&mut self, kind: PickupKind, pickups: &PickupConfig) {
        match kind {
            PickupKind::GasBottle => {
                self.gas = (self.gas + pickups.gas_per_bottle).min(self.config.max_gas);
            }
            PickupKind::Dynamite => self.dynamite += 1,
        }
    }
}
