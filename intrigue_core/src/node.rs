use bevy::prelude::Component;
use tracing::warn;

use crate::{
    attributes::{clamp_attribute, Attribute},
    effects::{EffectAuditRegistry, EffectLedger, OngoingEffect},
    engine_config::AttributeConfig,
    ids::{EffectId, NodeId},
};

bitflags::bitflags! {
    /// Teams currently deployed at a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TeamPresence: u32 {
        const CIVIL = 1 << 0;
        const CONTROL = 1 << 1;
        const MEDIA = 1 << 2;
        const PROBE = 1 << 3;
        const SPIDER = 1 << 4;
        const ERASURE = 1 << 5;
        const DAMAGE = 1 << 6;
    }
}

/// Flat bonuses granted while a team of the matching category is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamModifiers {
    pub civil_stability: i32,
    pub control_security: i32,
    pub media_support: i32,
}

impl TeamModifiers {
    pub fn from_config(config: &AttributeConfig) -> Self {
        Self {
            civil_stability: config.civil_team_stability,
            control_security: config.control_team_security,
            media_support: config.media_team_support,
        }
    }
}

impl Default for TeamModifiers {
    fn default() -> Self {
        Self::from_config(&AttributeConfig::default())
    }
}

/// Map location with three base attributes and an effect ledger.
#[derive(Component, Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) stability: i32,
    pub(crate) support: i32,
    pub(crate) security: i32,
    pub(crate) teams: TeamPresence,
    pub(crate) ledger: EffectLedger,
    pub(crate) min: i32,
    pub(crate) max: i32,
    pub(crate) modifiers: TeamModifiers,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self::with_config(id, name, &AttributeConfig::default())
    }

    pub fn with_config(id: NodeId, name: impl Into<String>, config: &AttributeConfig) -> Self {
        Self {
            id,
            name: name.into(),
            stability: 0,
            support: 0,
            security: 0,
            teams: TeamPresence::empty(),
            ledger: EffectLedger::for_node(id),
            min: config.min,
            max: config.max,
            modifiers: TeamModifiers::from_config(config),
        }
    }

    /// Replaces the cached bounds and team modifiers. Base values and the
    /// ledger are kept.
    pub fn apply_config(&mut self, config: &AttributeConfig) {
        self.min = config.min;
        self.max = config.max;
        self.modifiers = TeamModifiers::from_config(config);
    }

    /// Builder used at map setup.
    pub fn with_base(mut self, stability: i32, support: i32, security: i32) -> Self {
        self.stability = clamp_attribute(stability);
        self.support = clamp_attribute(support);
        self.security = clamp_attribute(security);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    pub fn base(&self, attribute: Attribute) -> Option<i32> {
        match attribute {
            Attribute::Stability => Some(self.stability),
            Attribute::Support => Some(self.support),
            Attribute::Security => Some(self.security),
            Attribute::Opinion => None,
        }
    }

    /// Stores `value` clamped to `0..=3`. The ledger and team modifiers are
    /// left alone.
    pub fn set_base(&mut self, attribute: Attribute, value: i32) -> bool {
        let slot = match attribute {
            Attribute::Stability => &mut self.stability,
            Attribute::Support => &mut self.support,
            Attribute::Security => &mut self.security,
            Attribute::Opinion => {
                warn!(
                    target: "intrigue::nodes",
                    node = %self.id,
                    attribute = attribute.as_str(),
                    "node.set_base.invalid_attribute"
                );
                return false;
            }
        };
        let clamped = clamp_attribute(value);
        if *slot == clamped {
            warn!(
                target: "intrigue::nodes",
                node = %self.id,
                attribute = attribute.as_str(),
                value = clamped,
                "node.set_base.redundant"
            );
        }
        *slot = clamped;
        true
    }

    pub fn set_base_for_tag(&mut self, tag: &str, value: i32) -> bool {
        match Attribute::parse(tag) {
            Some(attribute) => self.set_base(attribute, value),
            None => {
                warn!(target: "intrigue::nodes", node = %self.id, tag, "node.set_base.unknown_tag");
                false
            }
        }
    }

    pub fn team_modifier(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Stability if self.teams.contains(TeamPresence::CIVIL) => {
                self.modifiers.civil_stability
            }
            Attribute::Security if self.teams.contains(TeamPresence::CONTROL) => {
                self.modifiers.control_security
            }
            Attribute::Support if self.teams.contains(TeamPresence::MEDIA) => {
                -self.modifiers.media_support
            }
            _ => 0,
        }
    }

    /// `clamp(base + ledger + team, min, max)`. Recomputed on every call.
    pub fn effective_value(&self, attribute: Attribute) -> Option<i32> {
        let Some(base) = self.base(attribute) else {
            warn!(
                target: "intrigue::nodes",
                node = %self.id,
                attribute = attribute.as_str(),
                "node.effective_value.invalid_attribute"
            );
            return None;
        };
        let raw = base + self.ledger.sum_for(attribute) + self.team_modifier(attribute);
        Some(raw.clamp(self.min, self.max))
    }

    pub fn effective_value_for_tag(&self, tag: &str) -> Option<i32> {
        match Attribute::parse(tag) {
            Some(attribute) => self.effective_value(attribute),
            None => {
                warn!(target: "intrigue::nodes", node = %self.id, tag, "node.effective_value.unknown_tag");
                None
            }
        }
    }

    pub fn teams(&self) -> TeamPresence {
        self.teams
    }

    pub fn has_team(&self, team: TeamPresence) -> bool {
        self.teams.contains(team)
    }

    pub fn set_team_present(&mut self, team: TeamPresence, present: bool) {
        self.teams.set(team, present);
    }

    pub fn ledger(&self) -> &EffectLedger {
        &self.ledger
    }

    pub fn ongoing_effects(&self) -> impl Iterator<Item = &OngoingEffect> {
        self.ledger.iter()
    }

    /// Node ledgers never reject a correlation id.
    pub fn add_ongoing_effect(
        &mut self,
        effect: &OngoingEffect,
        registry: &mut EffectAuditRegistry,
    ) -> bool {
        if !effect.attribute.is_node_attribute() {
            warn!(
                target: "intrigue::nodes",
                node = %self.id,
                effect = %effect.id,
                attribute = effect.attribute.as_str(),
                "node.effect.attribute_has_no_effect"
            );
        }
        self.ledger.add(effect, registry)
    }

    pub fn tick_effects(&mut self, registry: &mut EffectAuditRegistry) -> Vec<OngoingEffect> {
        self.ledger.tick(registry)
    }

    pub fn cancel_effect(&mut self, id: &EffectId, registry: &mut EffectAuditRegistry) -> usize {
        self.ledger.remove_by_id(id, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::NODE_ATTRIBUTES;

    fn node() -> Node {
        Node::new(NodeId(4), "Docks").with_base(2, 1, 2)
    }

    #[test]
    fn effective_value_folds_ledger_and_teams() {
        let mut registry = EffectAuditRegistry::default();
        let mut node = node();
        node.add_ongoing_effect(
            &OngoingEffect::new("curfew", Attribute::Stability, -1, 3),
            &mut registry,
        );
        node.set_team_present(TeamPresence::CIVIL, true);
        assert_eq!(node.effective_value(Attribute::Stability), Some(2));

        node.set_team_present(TeamPresence::MEDIA, true);
        assert_eq!(node.effective_value(Attribute::Support), Some(0));

        node.set_team_present(TeamPresence::CONTROL, true);
        assert_eq!(node.effective_value(Attribute::Security), Some(3));
    }

    #[test]
    fn effective_value_saturates_at_bounds() {
        let mut registry = EffectAuditRegistry::default();
        let mut node = node();
        for index in 0..4 {
            node.add_ongoing_effect(
                &OngoingEffect::new(format!("boost{index}"), Attribute::Security, 2, 5),
                &mut registry,
            );
            node.add_ongoing_effect(
                &OngoingEffect::new(format!("drain{index}"), Attribute::Support, -2, 5),
                &mut registry,
            );
        }
        node.set_team_present(TeamPresence::CONTROL, true);
        assert_eq!(node.effective_value(Attribute::Security), Some(3));
        assert_eq!(node.effective_value(Attribute::Support), Some(0));
    }

    #[test]
    fn effective_value_matches_formula_for_every_attribute() {
        let mut registry = EffectAuditRegistry::default();
        let mut node = node();
        node.add_ongoing_effect(
            &OngoingEffect::new("a", Attribute::Support, 1, 2),
            &mut registry,
        );
        node.set_team_present(TeamPresence::all(), true);
        for attribute in NODE_ATTRIBUTES {
            let base = node.base(attribute).expect("node attribute");
            let expected = (base + node.ledger().sum_for(attribute) + node.team_modifier(attribute))
                .clamp(0, 3);
            assert_eq!(node.effective_value(attribute), Some(expected));
        }
    }

    #[test]
    fn set_base_clamps_and_leaves_ledger_alone() {
        let mut registry = EffectAuditRegistry::default();
        let mut node = node();
        node.add_ongoing_effect(
            &OngoingEffect::new("a", Attribute::Stability, 1, 2),
            &mut registry,
        );
        assert!(node.set_base(Attribute::Stability, 9));
        assert_eq!(node.base(Attribute::Stability), Some(3));
        assert!(node.set_base(Attribute::Stability, -4));
        assert_eq!(node.base(Attribute::Stability), Some(0));
        assert_eq!(node.ledger().len(), 1);
        assert_eq!(node.effective_value(Attribute::Stability), Some(1));
    }

    #[test]
    fn unknown_tags_are_diagnostic_no_ops() {
        let mut node = node();
        assert_eq!(node.effective_value_for_tag("Loyalty"), None);
        assert!(!node.set_base_for_tag("Loyalty", 2));
        assert_eq!(node.effective_value(Attribute::Opinion), None);
        assert!(!node.set_base(Attribute::Opinion, 1));
        assert_eq!(node.effective_value_for_tag("security"), Some(2));
        assert!(node.set_base_for_tag("support", 3));
        assert_eq!(node.base(Attribute::Support), Some(3));
    }

    #[test]
    fn custom_team_modifiers_come_from_config() {
        let config = AttributeConfig {
            civil_team_stability: 2,
            media_team_support: 2,
            ..AttributeConfig::default()
        };
        let mut node = Node::with_config(NodeId(1), "Square", &config).with_base(0, 3, 0);
        node.set_team_present(TeamPresence::CIVIL | TeamPresence::MEDIA, true);
        assert_eq!(node.effective_value(Attribute::Stability), Some(2));
        assert_eq!(node.effective_value(Attribute::Support), Some(1));
        assert_eq!(node.team_modifier(Attribute::Security), 0);
    }
}
