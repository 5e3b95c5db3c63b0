use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::{
    actor::Actor,
    attributes::ParseTagError,
    engine_config::ConditionConfig,
    messages::{MessageLog, Notice, NoticeKind, NoticeSubject},
};

/// Status conditions an actor can carry, at most once each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionTag {
    Stressed,
    Corrupt,
    Unhappy,
    Blackmailer,
    Star,
    Questionable,
    Incompetent,
    Imaged,
    Wounded,
}

pub const ALL_CONDITION_TAGS: [ConditionTag; 9] = [
    ConditionTag::Stressed,
    ConditionTag::Corrupt,
    ConditionTag::Unhappy,
    ConditionTag::Blackmailer,
    ConditionTag::Star,
    ConditionTag::Questionable,
    ConditionTag::Incompetent,
    ConditionTag::Imaged,
    ConditionTag::Wounded,
];

/// Wording family used for history entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phrasing {
    Stress,
    Notoriety,
    Reputation,
    Plain,
}

impl ConditionTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionTag::Stressed => "STRESSED",
            ConditionTag::Corrupt => "CORRUPT",
            ConditionTag::Unhappy => "UNHAPPY",
            ConditionTag::Blackmailer => "BLACKMAILER",
            ConditionTag::Star => "STAR",
            ConditionTag::Questionable => "QUESTIONABLE",
            ConditionTag::Incompetent => "INCOMPETENT",
            ConditionTag::Imaged => "IMAGED",
            ConditionTag::Wounded => "WOUNDED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        ConditionTag::from_str(value).ok()
    }

    /// Trait effect that blocks this condition outright.
    pub fn immunity(self) -> Option<TraitEffect> {
        match self {
            ConditionTag::Stressed => Some(TraitEffect::NoStress),
            ConditionTag::Corrupt => Some(TraitEffect::NoCorruption),
            ConditionTag::Unhappy => Some(TraitEffect::NoUnhappy),
            ConditionTag::Blackmailer => Some(TraitEffect::NoBlackmail),
            ConditionTag::Star
            | ConditionTag::Questionable
            | ConditionTag::Incompetent
            | ConditionTag::Imaged
            | ConditionTag::Wounded => None,
        }
    }

    /// Grammar used when the caller does not supply one ("is now a STAR").
    pub fn default_is_now_a(self) -> bool {
        matches!(self, ConditionTag::Star | ConditionTag::Blackmailer)
    }

    fn phrasing(self) -> Phrasing {
        match self {
            ConditionTag::Stressed => Phrasing::Stress,
            ConditionTag::Star | ConditionTag::Blackmailer => Phrasing::Notoriety,
            ConditionTag::Questionable | ConditionTag::Incompetent => Phrasing::Reputation,
            ConditionTag::Corrupt
            | ConditionTag::Unhappy
            | ConditionTag::Imaged
            | ConditionTag::Wounded => Phrasing::Plain,
        }
    }
}

impl FromStr for ConditionTag {
    type Err = ParseTagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        ALL_CONDITION_TAGS
            .into_iter()
            .find(|tag| tag.as_str() == normalized)
            .ok_or_else(|| ParseTagError::Condition(value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Condition {
    pub tag: ConditionTag,
    pub is_now_a: bool,
}

impl Condition {
    pub fn new(tag: ConditionTag) -> Self {
        Self {
            tag,
            is_now_a: tag.default_is_now_a(),
        }
    }

    pub fn with_grammar(tag: ConditionTag, is_now_a: bool) -> Self {
        Self { tag, is_now_a }
    }

    fn article(&self) -> &'static str {
        if !self.is_now_a {
            return "";
        }
        match self.tag.as_str().chars().next() {
            Some('A' | 'E' | 'I' | 'O' | 'U') => "an ",
            _ => "a ",
        }
    }
}

/// Cached effects of an actor's personality trait that this gate cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraitEffect {
    NoStress,
    NoCorruption,
    NoUnhappy,
    NoBlackmail,
    BlackmailTimerLong,
    BlackmailTimerShort,
}

impl TraitEffect {
    pub fn as_str(self) -> &'static str {
        match self {
            TraitEffect::NoStress => "no_stress",
            TraitEffect::NoCorruption => "no_corruption",
            TraitEffect::NoUnhappy => "no_unhappy",
            TraitEffect::NoBlackmail => "no_blackmail",
            TraitEffect::BlackmailTimerLong => "blackmail_timer_long",
            TraitEffect::BlackmailTimerShort => "blackmail_timer_short",
        }
    }
}

impl FromStr for TraitEffect {
    type Err = ParseTagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "no_stress" => Ok(TraitEffect::NoStress),
            "no_corruption" => Ok(TraitEffect::NoCorruption),
            "no_unhappy" => Ok(TraitEffect::NoUnhappy),
            "no_blackmail" => Ok(TraitEffect::NoBlackmail),
            "blackmail_timer_long" => Ok(TraitEffect::BlackmailTimerLong),
            "blackmail_timer_short" => Ok(TraitEffect::BlackmailTimerShort),
            _ => Err(ParseTagError::TraitEffect(value.to_string())),
        }
    }
}

/// Collaborators needed to add or remove a condition.
pub struct ConditionContext<'a> {
    pub turn: u64,
    pub config: &'a ConditionConfig,
    pub messages: &'a mut MessageLog,
}

fn with_reason(text: String, reason: &str) -> String {
    if reason.is_empty() {
        text
    } else {
        format!("{text} ({reason})")
    }
}

impl Actor {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn check_condition_present(&self, tag: ConditionTag) -> bool {
        self.conditions.iter().any(|condition| condition.tag == tag)
    }

    /// Returns `true` only if the condition was actually added.
    pub fn add_condition(
        &mut self,
        condition: Condition,
        reason: &str,
        ctx: &mut ConditionContext<'_>,
    ) -> bool {
        let tag = condition.tag;

        if let Some(immunity) = tag.immunity() {
            if self.trait_effects.contains(&immunity) {
                info!(
                    target: "intrigue::conditions",
                    actor = %self.id,
                    condition = tag.as_str(),
                    trait_effect = immunity.as_str(),
                    "condition.add.trait_immunity"
                );
                ctx.messages.push(Notice {
                    turn: ctx.turn,
                    kind: NoticeKind::TraitTriggered,
                    subject: NoticeSubject::Actor(self.id),
                    text: format!("{} can't become {}", self.name, tag.as_str()),
                    magnitude: 0,
                });
                return false;
            }
        }

        if tag == ConditionTag::Blackmailer && self.secrets.is_empty() {
            debug!(
                target: "intrigue::conditions",
                actor = %self.id,
                "condition.add.blackmailer_without_secrets"
            );
            return false;
        }

        if self.check_condition_present(tag) {
            warn!(
                target: "intrigue::conditions",
                actor = %self.id,
                condition = tag.as_str(),
                "condition.add.already_present"
            );
            return false;
        }

        self.conditions.push(condition);

        if tag == ConditionTag::Blackmailer {
            self.threatening = true;
            self.blackmail_timer = self.blackmail_timer_for(ctx.config);
        }

        let text = match tag.phrasing() {
            Phrasing::Stress => format!("{} is now STRESSED", self.name),
            Phrasing::Notoriety => {
                format!("{} has become {}{}", self.name, condition.article(), tag.as_str())
            }
            Phrasing::Reputation => format!("{} is considered {}", self.name, tag.as_str()),
            Phrasing::Plain => {
                format!("{} is now {}{}", self.name, condition.article(), tag.as_str())
            }
        };
        let text = with_reason(text, reason);
        self.history.record_event(ctx.turn, text.clone());
        ctx.messages.push(Notice {
            turn: ctx.turn,
            kind: NoticeKind::ConditionAdded,
            subject: NoticeSubject::Actor(self.id),
            text,
            magnitude: 0,
        });
        info!(
            target: "intrigue::conditions",
            actor = %self.id,
            condition = tag.as_str(),
            "condition.added"
        );
        true
    }

    /// Returns `true` if a matching condition was removed.
    pub fn remove_condition(
        &mut self,
        tag: ConditionTag,
        reason: &str,
        ctx: &mut ConditionContext<'_>,
    ) -> bool {
        let Some(index) = self
            .conditions
            .iter()
            .position(|condition| condition.tag == tag)
        else {
            debug!(
                target: "intrigue::conditions",
                actor = %self.id,
                condition = tag.as_str(),
                "condition.remove.not_present"
            );
            return false;
        };
        let removed = self.conditions.remove(index);

        if tag == ConditionTag::Blackmailer {
            self.threatening = false;
            self.blackmail_timer = 0;
        }

        let text = with_reason(
            format!("{} is no longer {}{}", self.name, removed.article(), tag.as_str()),
            reason,
        );
        self.history.record_event(ctx.turn, text.clone());
        ctx.messages.push(Notice {
            turn: ctx.turn,
            kind: NoticeKind::ConditionRemoved,
            subject: NoticeSubject::Actor(self.id),
            text,
            magnitude: 0,
        });
        true
    }

    fn blackmail_timer_for(&self, config: &ConditionConfig) -> i32 {
        let mut timer = config.blackmail_timer;
        if self.trait_effects.contains(&TraitEffect::BlackmailTimerLong) {
            timer *= config.blackmail_long_multiplier;
        }
        if self.trait_effects.contains(&TraitEffect::BlackmailTimerShort)
            && config.blackmail_short_divisor > 0
        {
            timer = (timer / config.blackmail_short_divisor).max(0);
        }
        timer
    }
}
