use bevy::prelude::Component;
use tracing::{debug, warn};

use crate::{
    effects::{EffectAuditRegistry, EffectLedger, OngoingEffect},
    ids::{ConnectionId, EffectId, NodeId},
};

/// Discrete security state of a connection.
///
/// The ordinal is inverted relative to severity: `High` is ordinal 1 and
/// `Low` is ordinal 3, with 0 meaning no security at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SecurityLevel {
    #[default]
    None = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl SecurityLevel {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(SecurityLevel::None),
            1 => Some(SecurityLevel::High),
            2 => Some(SecurityLevel::Medium),
            3 => Some(SecurityLevel::Low),
            _ => None,
        }
    }

    /// Severity on a plain 0 (none) .. 3 (high) scale.
    pub fn strength(self) -> i32 {
        match self {
            SecurityLevel::None => 0,
            SecurityLevel::Low => 1,
            SecurityLevel::Medium => 2,
            SecurityLevel::High => 3,
        }
    }

    /// Saturates outside `0..=3`.
    pub fn from_strength(strength: i32) -> Self {
        match strength.clamp(0, 3) {
            0 => SecurityLevel::None,
            1 => SecurityLevel::Low,
            2 => SecurityLevel::Medium,
            _ => SecurityLevel::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::None => "None",
            SecurityLevel::High => "High",
            SecurityLevel::Medium => "Medium",
            SecurityLevel::Low => "Low",
        }
    }
}

/// Presentation tier derived from the effective level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityStyle {
    Open,
    Guarded,
    Fortified,
    Lockdown,
}

impl SecurityStyle {
    pub fn for_level(level: SecurityLevel) -> Self {
        match level {
            SecurityLevel::None => SecurityStyle::Open,
            SecurityLevel::Low => SecurityStyle::Guarded,
            SecurityLevel::Medium => SecurityStyle::Fortified,
            SecurityLevel::High => SecurityStyle::Lockdown,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
    pub(crate) level: SecurityLevel,
    pub(crate) saved_level: Option<SecurityLevel>,
    pub(crate) adjusted: bool,
    pub(crate) ledger: EffectLedger,
    pub(crate) style: SecurityStyle,
    pub(crate) style_revision: u32,
}

impl Connection {
    pub fn new(id: ConnectionId, from: NodeId, to: NodeId, level: SecurityLevel) -> Self {
        Self {
            id,
            from,
            to,
            level,
            saved_level: None,
            adjusted: false,
            ledger: EffectLedger::for_connection(id),
            style: SecurityStyle::for_level(level),
            style_revision: 0,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.from, self.to)
    }

    pub fn stored_level(&self) -> SecurityLevel {
        self.level
    }

    /// Stored level shifted by the unscoped ledger sum.
    ///
    /// From `None`, a positive sum raises the level toward `High` and a
    /// negative sum has no effect. Otherwise a positive sum lowers the
    /// ordinal and a negative sum raises it, clamped to `0..=3`.
    pub fn effective_level(&self) -> SecurityLevel {
        let sum = self.ledger.sum();
        if sum == 0 {
            return self.level;
        }
        let ordinal = i32::from(self.level.ordinal());
        let shifted = if ordinal == 0 {
            if sum < 0 {
                return self.level;
            }
            (4 - sum).max(1)
        } else {
            (ordinal - sum).clamp(0, 3)
        };
        u8::try_from(shifted)
            .ok()
            .and_then(SecurityLevel::from_ordinal)
            .unwrap_or(self.level)
    }

    pub fn style(&self) -> SecurityStyle {
        self.style
    }

    pub fn style_revision(&self) -> u32 {
        self.style_revision
    }

    pub fn is_adjusted(&self) -> bool {
        self.adjusted
    }

    /// Moves the stored level one step in the direction of `delta`
    /// (positive is stronger). Only one adjustment is allowed until
    /// [`Connection::reset_adjustment`] is called.
    pub fn change_security_level(&mut self, delta: i32) -> bool {
        if self.adjusted {
            warn!(
                target: "intrigue::security",
                connection = %self.id,
                delta,
                "security.change.already_adjusted"
            );
            return false;
        }
        if delta == 0 {
            return false;
        }

        let before = self.level;
        self.level = SecurityLevel::from_strength(before.strength() + delta.signum());
        self.adjusted = true;
        if self.level != before {
            self.refresh_style();
        }
        debug!(
            target: "intrigue::security",
            connection = %self.id,
            before = before.as_str(),
            after = self.level.as_str(),
            "security.change.step"
        );
        true
    }

    /// Unconditional set. Ignores the adjustment guard.
    pub fn set_security_level(&mut self, level: SecurityLevel) -> bool {
        if self.level == level {
            return false;
        }
        self.level = level;
        self.refresh_style();
        true
    }

    pub fn reset_adjustment(&mut self) {
        self.adjusted = false;
    }

    pub fn save_level(&mut self) {
        self.saved_level = Some(self.level);
    }

    pub fn saved_level(&self) -> Option<SecurityLevel> {
        self.saved_level
    }

    /// Reverts to the level captured by [`Connection::save_level`] and empties
    /// the snapshot slot. The ledger is not touched.
    pub fn restore_level(&mut self) -> bool {
        match self.saved_level.take() {
            Some(saved) => {
                self.set_security_level(saved);
                true
            }
            None => {
                warn!(
                    target: "intrigue::security",
                    connection = %self.id,
                    "security.restore.no_snapshot"
                );
                false
            }
        }
    }

    pub fn ledger(&self) -> &EffectLedger {
        &self.ledger
    }

    pub fn ongoing_effects(&self) -> impl Iterator<Item = &OngoingEffect> {
        self.ledger.iter()
    }

    pub fn add_ongoing_effect(
        &mut self,
        effect: &OngoingEffect,
        registry: &mut EffectAuditRegistry,
    ) -> bool {
        let before = self.effective_level();
        let added = self.ledger.add(effect, registry);
        if added && self.effective_level() != before {
            self.refresh_style();
        }
        added
    }

    pub fn tick_effects(&mut self, registry: &mut EffectAuditRegistry) -> Vec<OngoingEffect> {
        let before = self.effective_level();
        let expired = self.ledger.tick(registry);
        if self.effective_level() != before {
            self.refresh_style();
        }
        expired
    }

    pub fn cancel_effect(&mut self, id: &EffectId, registry: &mut EffectAuditRegistry) -> usize {
        let before = self.effective_level();
        let removed = self.ledger.remove_by_id(id, registry);
        if self.effective_level() != before {
            self.refresh_style();
        }
        removed
    }

    fn refresh_style(&mut self) {
        self.style = SecurityStyle::for_level(self.effective_level());
        self.style_revision = self.style_revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    fn connection(level: SecurityLevel) -> Connection {
        Connection::new(ConnectionId(1), NodeId(1), NodeId(2), level)
    }

    fn boost(id: &str, magnitude: i32) -> OngoingEffect {
        OngoingEffect::new(id, Attribute::Security, magnitude, 3)
    }

    #[test]
    fn ordinal_mapping_is_inverted() {
        assert_eq!(SecurityLevel::from_ordinal(1), Some(SecurityLevel::High));
        assert_eq!(SecurityLevel::from_ordinal(3), Some(SecurityLevel::Low));
        assert_eq!(SecurityLevel::from_ordinal(4), None);
        assert_eq!(SecurityLevel::High.strength(), 3);
        assert_eq!(SecurityLevel::from_strength(9), SecurityLevel::High);
        assert_eq!(SecurityLevel::from_strength(-2), SecurityLevel::None);
    }

    #[test]
    fn positive_sum_raises_from_none_towards_high() {
        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::None);
        link.add_ongoing_effect(&boost("a", 1), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::Low);
        link.add_ongoing_effect(&boost("b", 1), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::Medium);
        link.add_ongoing_effect(&boost("c", 5), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::High);
        assert_eq!(link.stored_level(), SecurityLevel::None);
    }

    #[test]
    fn negative_sum_from_none_stays_none() {
        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::None);
        link.add_ongoing_effect(&boost("a", -2), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::None);
    }

    #[test]
    fn sums_shift_non_zero_levels_and_saturate() {
        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::Medium);
        link.add_ongoing_effect(&boost("a", 1), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::High);
        link.add_ongoing_effect(&boost("b", 1), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::None, "ordinal clamps at 0");
        link.add_ongoing_effect(&boost("c", 4), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::None);

        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::Medium);
        link.add_ongoing_effect(&boost("a", -1), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::Low);
        link.add_ongoing_effect(&boost("b", -5), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::Low, "ordinal clamps at 3");
    }

    #[test]
    fn weakening_low_through_the_ledger_stays_low() {
        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::Low);
        link.add_ongoing_effect(&boost("a", -1), &mut registry);
        assert_eq!(link.effective_level(), SecurityLevel::Low);
        assert_eq!(link.style(), SecurityStyle::Guarded);
    }

    #[test]
    fn ledger_sum_is_unscoped() {
        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::Low);
        link.add_ongoing_effect(
            &OngoingEffect::new("odd", Attribute::Stability, 1, 2),
            &mut registry,
        );
        assert_eq!(link.effective_level(), SecurityLevel::Medium);
    }

    #[test]
    fn change_is_guarded_until_reset() {
        let mut link = connection(SecurityLevel::Low);
        assert!(link.change_security_level(1));
        assert_eq!(link.stored_level(), SecurityLevel::Medium);
        assert_eq!(link.style_revision(), 1);

        assert!(!link.change_security_level(1), "guard should block");
        assert_eq!(link.stored_level(), SecurityLevel::Medium);

        link.reset_adjustment();
        assert!(link.change_security_level(5), "steps are single");
        assert_eq!(link.stored_level(), SecurityLevel::High);
        assert_eq!(link.style(), SecurityStyle::Lockdown);
    }

    #[test]
    fn saturated_step_does_not_refresh_style() {
        let mut link = connection(SecurityLevel::High);
        assert!(link.change_security_level(1));
        assert_eq!(link.stored_level(), SecurityLevel::High);
        assert_eq!(link.style_revision(), 0);
        assert!(link.is_adjusted());
    }

    #[test]
    fn weakening_low_reaches_none() {
        let mut link = connection(SecurityLevel::Low);
        assert!(link.change_security_level(-1));
        assert_eq!(link.stored_level(), SecurityLevel::None);
        assert_eq!(link.style(), SecurityStyle::Open);
    }

    #[test]
    fn absolute_set_ignores_guard_and_refreshes_on_change() {
        let mut link = connection(SecurityLevel::Low);
        link.change_security_level(1);
        assert!(link.set_security_level(SecurityLevel::None));
        assert_eq!(link.style_revision(), 2);
        assert!(!link.set_security_level(SecurityLevel::None));
        assert_eq!(link.style_revision(), 2);
    }

    #[test]
    fn save_and_restore_leave_ledger_untouched() {
        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::Medium);
        link.add_ongoing_effect(&boost("a", -1), &mut registry);
        link.save_level();
        link.set_security_level(SecurityLevel::High);

        assert!(link.restore_level());
        assert_eq!(link.stored_level(), SecurityLevel::Medium);
        assert_eq!(link.ledger().len(), 1);
        assert_eq!(link.saved_level(), None);
        assert!(!link.restore_level(), "snapshot is single-use");
    }

    #[test]
    fn tick_refreshes_style_when_effect_expires() {
        let mut registry = EffectAuditRegistry::default();
        let mut link = connection(SecurityLevel::Low);
        link.add_ongoing_effect(&OngoingEffect::new("a", Attribute::Security, 2, 1), &mut registry);
        assert_eq!(link.style(), SecurityStyle::Lockdown);
        let revision = link.style_revision();

        let expired = link.tick_effects(&mut registry);
        assert_eq!(expired.len(), 1);
        assert_eq!(link.style(), SecurityStyle::Guarded);
        assert_eq!(link.style_revision(), revision + 1);
    }
}
