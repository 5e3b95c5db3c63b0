use intrigue_core::{
    Actor, ActorId, EngineConfig, MessageLog, OpinionContext, OpinionStatistics, Side, SimRng,
};

const TRIALS: usize = 10_000;

struct Trials {
    negated: usize,
    statistics: OpinionStatistics,
}

fn run_trials(compatibility: i32, proposed: i32, seed: u64) -> Trials {
    let config = EngineConfig::default();
    let mut rng = SimRng::seeded(seed);
    let mut statistics = OpinionStatistics::default();
    let mut messages = MessageLog::default();
    let mut negated = 0;

    for index in 0..TRIALS {
        let mut actor = Actor::new(ActorId(index as u32), "Trial", Side::Authority)
            .with_datapoints(1, 2, 1)
            .with_compatibility(compatibility);
        let mut ctx = OpinionContext {
            turn: 1,
            acting_side: Side::Authority,
            config: config.opinion(),
            rng: &mut rng,
            statistics: &mut statistics,
            messages: &mut messages,
        };
        if !actor.resolve_opinion(proposed, "", &mut ctx) {
            negated += 1;
            assert_eq!(actor.opinion(), 2, "negated change must leave opinion unchanged");
        }
    }

    Trials {
        negated,
        statistics,
    }
}

#[test]
fn top_tier_negation_rate_matches_threshold() {
    let threshold = EngineConfig::default()
        .opinion()
        .threshold_for(3)
        .expect("tier three threshold") as f64
        / 100.0;
    let trials = run_trials(3, 1, 0x5eed);
    let rate = trials.negated as f64 / TRIALS as f64;

    assert!(
        (rate - threshold).abs() <= 0.02,
        "negation rate {rate:.4} should be within 2% of {threshold:.2}"
    );
    assert_eq!(trials.statistics.good_negations as usize, trials.negated);
    assert_eq!(trials.statistics.bad_negations, 0);
    assert_eq!(trials.statistics.resolutions as usize, TRIALS);
}

#[test]
fn neutral_compatibility_never_negates() {
    for proposed in [0, 1, 3] {
        let trials = run_trials(0, proposed, 99);
        assert_eq!(trials.negated, 0, "proposal {proposed} was negated");
        assert_eq!(trials.statistics.negations(), 0);
    }
}

#[test]
fn disliked_actors_resist_improvements_by_tier() {
    let tier_one = run_trials(-1, 3, 7).negated as f64 / TRIALS as f64;
    let tier_three = run_trials(-3, 3, 7).negated as f64 / TRIALS as f64;
    assert!(
        tier_one < tier_three,
        "tier one ({tier_one:.3}) should negate less often than tier three ({tier_three:.3})"
    );
}
