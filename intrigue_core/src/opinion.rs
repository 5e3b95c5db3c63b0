use bevy::prelude::Resource;
use tracing::{debug, warn};

use crate::{
    actor::Actor,
    attributes::clamp_attribute,
    engine_config::OpinionConfig,
    history::HistoryOpinion,
    ids::Side,
    messages::{MessageLog, Notice, NoticeKind, NoticeSubject},
    rng::SimRng,
};

/// Running tally of opinion negations, split by which way the relationship
/// pulled.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpinionStatistics {
    pub good_negations: u64,
    pub bad_negations: u64,
    pub resolutions: u64,
}

impl OpinionStatistics {
    pub fn negations(&self) -> u64 {
        self.good_negations + self.bad_negations
    }
}

/// Collaborators consulted while resolving one opinion change.
pub struct OpinionContext<'a> {
    pub turn: u64,
    pub acting_side: Side,
    pub config: &'a OpinionConfig,
    pub rng: &'a mut SimRng,
    pub statistics: &'a mut OpinionStatistics,
    pub messages: &'a mut MessageLog,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Start,
    Gain,
    Loss,
    Negated,
}

impl Actor {
    /// Proposes a new Opinion value. A well-liked actor may shrug off a
    /// worsening change and a disliked one may refuse an improvement.
    ///
    /// Returns `true` when the proposal was accepted.
    pub fn resolve_opinion(
        &mut self,
        proposed: i32,
        reason: &str,
        ctx: &mut OpinionContext<'_>,
    ) -> bool {
        let proposed = clamp_attribute(proposed);
        let difference = proposed - self.opinion;

        if ctx.turn == 0 {
            self.opinion = proposed;
            self.record_opinion(ctx, difference, true, Outcome::Start, reason);
            return true;
        }

        if difference == 0 {
            warn!(
                target: "intrigue::opinion",
                actor = %self.id,
                value = proposed,
                "opinion.resolve.redundant"
            );
            return true;
        }

        ctx.statistics.resolutions += 1;

        let negated = self.side == ctx.acting_side && self.roll_negation(difference, ctx);
        if negated {
            self.record_opinion(ctx, difference, false, Outcome::Negated, reason);
            ctx.messages.push(Notice {
                turn: ctx.turn,
                kind: NoticeKind::OpinionNegated,
                subject: NoticeSubject::Actor(self.id),
                text: format!("{} ignores the change in Opinion", self.name),
                magnitude: difference,
            });
            return false;
        }

        self.opinion = proposed;
        let outcome = if difference > 0 { Outcome::Gain } else { Outcome::Loss };
        self.record_opinion(ctx, difference, true, outcome, reason);
        ctx.messages.push(Notice {
            turn: ctx.turn,
            kind: NoticeKind::OpinionChanged,
            subject: NoticeSubject::Actor(self.id),
            text: format!("{} Opinion {:+}", self.name, difference),
            magnitude: difference,
        });
        true
    }

    fn roll_negation(&self, difference: i32, ctx: &mut OpinionContext<'_>) -> bool {
        let contrary = (self.compatibility > 0 && difference < 0)
            || (self.compatibility < 0 && difference > 0);
        if !contrary {
            return false;
        }
        let tier = self.compatibility.unsigned_abs();
        let Some(threshold) = ctx.config.threshold_for(tier) else {
            return false;
        };
        let roll = ctx.rng.percentile();
        let negated = roll < threshold;
        debug!(
            target: "intrigue::opinion",
            actor = %self.id,
            compatibility = self.compatibility,
            roll,
            threshold,
            negated,
            "opinion.resolve.roll"
        );
        if negated {
            if self.compatibility > 0 {
                ctx.statistics.good_negations += 1;
            } else {
                ctx.statistics.bad_negations += 1;
            }
        }
        negated
    }

    fn record_opinion(
        &mut self,
        ctx: &OpinionContext<'_>,
        difference: i32,
        accepted: bool,
        outcome: Outcome,
        reason: &str,
    ) {
        let colours = &ctx.config.colours;
        let descriptor = match outcome {
            Outcome::Start => format!(
                "<color={}>Starting Opinion {}</color>",
                colours.start, self.opinion
            ),
            Outcome::Gain => format!("<color={}>{:+} Opinion</color>", colours.gain, difference),
            Outcome::Loss => format!("<color={}>{:+} Opinion</color>", colours.loss, difference),
            Outcome::Negated => format!(
                "<color={}>{:+} Opinion negated</color>",
                colours.negated, difference
            ),
        };
        let descriptor = if reason.is_empty() {
            descriptor
        } else {
            format!("{descriptor} {reason}")
        };
        self.history.record_opinion(HistoryOpinion {
            turn: ctx.turn,
            requested_change: difference,
            resulting_value: self.opinion,
            accepted,
            descriptor,
        });
    }
}
