mod common;

use battle_core::{Alignment, BattleConfig, ClockMode, Condition, Tick};
use battle_runtime::{BattleOutcome, BattleSession, DeferReason, Event, SkipReason, Topic, TurnEvent};

use common::*;

fn started(events: &[Event]) -> Vec<(battle_core::CombatantId, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Turn(TurnEvent::Started {
                combatant, action, ..
            }) => Some((*combatant, action.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn hero_strikes_on_tenth_tick() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 1.0))
        .strategem(strategem(HERO, basic_attack(), Condition::any(Alignment::Enemy)))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..9 {
        session.tick();
    }
    assert!(!session.is_action_queued(HERO));
    assert_eq!(session.snapshot(HERO).unwrap().charge, 90.0);

    session.tick();

    // Locked and forecast synchronously, before any visual plays.
    let slime = session.snapshot(SLIME).unwrap();
    assert_eq!(slime.health, 40);
    assert_eq!(slime.forecast_health, 28);
    assert!(slime.is_hurt_locked);
    assert!(session.snapshot(HERO).unwrap().is_acting);

    let events = drain(&mut turns);
    assert!(events.contains(&Event::Turn(TurnEvent::ReadyToAct {
        combatant: HERO,
        activation_time: 10.0,
    })));
    assert_eq!(started(&events), vec![(HERO, "BasicAttack".to_owned())]);

    session.settle().await;

    let slime = session.snapshot(SLIME).unwrap();
    assert_eq!(slime.health, 28);
    assert_eq!(slime.forecast_health, 28);
    assert!(!slime.is_hurt_locked);

    let hero = session.snapshot(HERO).unwrap();
    assert!(!hero.is_acting);
    assert!(!hero.is_ready);
    assert_eq!(hero.charge, 0.0);
}

#[tokio::test(start_paused = true)]
async fn opposing_side_waits_for_the_actor() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 5.0).with_current_health(10))
        .combatant(unit(BAT, Alignment::Enemy, 40, 10.0))
        .strategem(strategem(
            HERO,
            basic_attack(),
            Condition::lowest_health(Alignment::Enemy),
        ))
        .strategem(strategem(BAT, basic_attack(), Condition::any(Alignment::Party)))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    assert!(session.snapshot(HERO).unwrap().is_acting);
    assert!(session.snapshot(SLIME).unwrap().is_hurt_locked);
    assert!(session.is_action_queued(BAT));

    // The bat is next in line but the hero is mid-swing.
    session.tick();
    assert!(drain(&mut turns).contains(&Event::Turn(TurnEvent::Deferred {
        combatant: BAT,
        reason: DeferReason::OpposingActing,
    })));
    assert!(!session.is_clock_running());
    assert!(session.is_action_queued(BAT));

    // A halted clock retries without advancing.
    session.tick();
    assert_eq!(session.current_tick(), Tick(11));

    session.settle().await;
    assert!(!session.snapshot(SLIME).unwrap().is_alive);

    session.tick();
    assert_eq!(session.current_tick(), Tick(11));
    assert!(session.is_clock_running());
    assert!(session.snapshot(BAT).unwrap().is_acting);
    assert_eq!(
        started(&drain(&mut turns)),
        vec![(BAT, "BasicAttack".to_owned())]
    );
}

#[tokio::test(start_paused = true)]
async fn strategem_without_targets_falls_through() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 1.0))
        .strategem(strategem(
            HERO,
            cure(),
            Condition::forecast_below(Alignment::Party, 50, true),
        ))
        .strategem(strategem(HERO, basic_attack(), Condition::any(Alignment::Enemy)))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    assert_eq!(
        started(&drain(&mut turns)),
        vec![(HERO, "BasicAttack".to_owned())]
    );
    session.settle().await;
}

#[tokio::test(start_paused = true)]
async fn heal_goes_to_the_most_injured_ally_below_threshold() {
    use battle_core::CombatantId;
    let (low, mid, high) = (CombatantId(4), CombatantId(5), CombatantId(6));

    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(low, Alignment::Party, 100, 0.5).with_current_health(10))
        .combatant(unit(mid, Alignment::Party, 100, 0.5).with_current_health(50))
        .combatant(unit(high, Alignment::Party, 100, 0.5).with_current_health(90))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 0.5))
        .strategem(strategem(
            HERO,
            cure(),
            Condition::forecast_below(Alignment::Party, 60, true),
        ))
        .build()
        .unwrap();

    for _ in 0..10 {
        session.tick();
    }
    let target = session.snapshot(low).unwrap();
    assert!(target.is_heal_locked);
    assert_eq!(target.forecast_health, 35);
    assert!(!session.snapshot(mid).unwrap().is_heal_locked);

    session.settle().await;
    assert_eq!(session.snapshot(low).unwrap().health, 35);
    assert_eq!(session.snapshot(mid).unwrap().health, 50);
    assert_eq!(session.snapshot(high).unwrap().health, 90);
}

#[tokio::test(start_paused = true)]
async fn unmatched_ai_turn_is_forfeited_and_retried() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 1.0))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..11 {
        session.tick();
    }

    let events = drain(&mut turns);
    let skipped = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                Event::Turn(TurnEvent::Skipped {
                    combatant: HERO,
                    reason: SkipReason::NoIntent,
                })
            )
        })
        .count();
    assert_eq!(skipped, 2);
    assert!(events.contains(&Event::Turn(TurnEvent::ReadyToAct {
        combatant: HERO,
        activation_time: 10.0,
    })));
    assert_eq!(session.snapshot(HERO).unwrap().charge, 100.0);
    assert!(session.is_clock_running());
}

#[tokio::test(start_paused = true)]
async fn active_mode_starts_every_eligible_turn_at_once() {
    use battle_core::CombatantId;
    let ally = CombatantId(4);

    let session = BattleSession::builder()
        .config(config().with_clock_mode(ClockMode::Active))
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(ally, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 100, 1.0))
        .strategem(strategem(HERO, basic_attack(), Condition::any(Alignment::Enemy)))
        .strategem(strategem(ally, basic_attack(), Condition::any(Alignment::Enemy)))
        .build()
        .unwrap();

    for _ in 0..10 {
        session.tick();
    }
    assert!(session.snapshot(HERO).unwrap().is_acting);
    assert!(session.snapshot(ally).unwrap().is_acting);
    assert_eq!(session.snapshot(SLIME).unwrap().forecast_health, 76);
    assert!(session.is_clock_running());

    session.settle().await;
    assert_eq!(session.snapshot(SLIME).unwrap().health, 76);
}

#[tokio::test(start_paused = true)]
async fn wait_mode_starts_one_turn_per_tick() {
    use battle_core::CombatantId;
    let ally = CombatantId(4);

    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(ally, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 100, 1.0))
        .strategem(strategem(HERO, basic_attack(), Condition::any(Alignment::Enemy)))
        .strategem(strategem(ally, basic_attack(), Condition::any(Alignment::Enemy)))
        .build()
        .unwrap();

    for _ in 0..10 {
        session.tick();
    }
    assert!(session.snapshot(HERO).unwrap().is_acting);
    assert!(!session.snapshot(ally).unwrap().is_acting);
    assert!(session.is_action_queued(ally));

    session.tick();
    assert!(session.snapshot(ally).unwrap().is_acting);
    session.settle().await;
}

#[tokio::test(start_paused = true)]
async fn removed_combatant_leaves_the_queue() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 1.0))
        .build()
        .unwrap();

    assert!(session.queue_action(SLIME, 3.0));
    assert!(!session.queue_action(SLIME, 1.0));

    let removed = session.remove_combatant(SLIME).unwrap();
    assert_eq!(removed.id(), SLIME);
    assert!(!session.is_action_queued(SLIME));
    assert!(session.snapshot(SLIME).is_none());
    assert!(session.remove_combatant(SLIME).is_none());
}

#[tokio::test(start_paused = true)]
async fn run_plays_a_battle_to_victory() {
    let session = BattleSession::builder()
        .config(config())
        .seed(11)
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 2.0))
        .strategem(strategem(HERO, basic_attack(), Condition::any(Alignment::Enemy)))
        .strategem(strategem(SLIME, basic_attack(), Condition::any(Alignment::Party)))
        .build()
        .unwrap();

    let outcome = session.run(Some(2_000)).await;
    session.teardown().await;

    assert_eq!(outcome, BattleOutcome::Victory);
    assert!(!session.snapshot(SLIME).unwrap().is_alive);
    assert!(session.snapshot(HERO).unwrap().is_alive);
    assert!(session.queued().is_empty());
}

#[tokio::test(start_paused = true)]
async fn tick_limit_stops_an_undecided_battle() {
    let session = BattleSession::builder()
        .config(BattleConfig::new())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 1.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 1.0))
        .build()
        .unwrap();

    assert_eq!(session.run(Some(5)).await, BattleOutcome::Ongoing);
    assert_eq!(session.current_tick(), Tick(5));
}

#[tokio::test(start_paused = true)]
async fn hurt_locked_head_waits_for_the_hit_to_land() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(BAT, Alignment::Enemy, 40, 20.0))
        .strategem(strategem(HERO, basic_attack(), Condition::any(Alignment::Enemy)))
        .strategem(strategem(BAT, basic_attack(), Condition::any(Alignment::Party)))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    let hero = session.snapshot(HERO).unwrap();
    assert!(hero.is_ready);
    assert!(hero.is_hurt_locked);
    assert!(drain(&mut turns).contains(&Event::Turn(TurnEvent::Deferred {
        combatant: HERO,
        reason: DeferReason::CannotAct,
    })));
    assert!(session.is_action_queued(HERO));
    assert!(!session.is_clock_running());

    // Retried on the halted clock until the bat's swing resolves.
    session.tick();
    assert_eq!(session.current_tick(), Tick(10));
    assert!(session.is_action_queued(HERO));

    session.settle().await;
    assert_eq!(session.snapshot(HERO).unwrap().health, 88);

    session.tick();
    assert_eq!(session.current_tick(), Tick(10));
    assert!(session.is_clock_running());
    assert_eq!(
        started(&drain(&mut turns)),
        vec![(HERO, "BasicAttack".to_owned())]
    );
    session.settle().await;
}

#[tokio::test(start_paused = true)]
async fn heal_locked_head_is_deferred() {
    use battle_core::CombatantId;
    let medic = CombatantId(4);

    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0).with_current_health(40))
        .combatant(unit(medic, Alignment::Party, 100, 20.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 0.5))
        .strategem(strategem(HERO, basic_attack(), Condition::any(Alignment::Enemy)))
        .strategem(strategem(
            medic,
            cure(),
            Condition::forecast_below(Alignment::Party, 60, true),
        ))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    assert!(session.snapshot(HERO).unwrap().is_heal_locked);
    assert!(drain(&mut turns).contains(&Event::Turn(TurnEvent::Deferred {
        combatant: HERO,
        reason: DeferReason::CannotAct,
    })));
    assert!(session.is_action_queued(HERO));

    session.settle().await;
    assert_eq!(session.snapshot(HERO).unwrap().health, 65);

    session.tick();
    assert!(session.snapshot(HERO).unwrap().is_acting);
    session.settle().await;
}

#[tokio::test(start_paused = true)]
async fn dead_head_is_dropped() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 1.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 1.0).with_current_health(0))
        .combatant(unit(BAT, Alignment::Enemy, 40, 1.0))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    assert!(session.queue_action(SLIME, 0.5));
    session.tick();

    assert!(drain(&mut turns).contains(&Event::Turn(TurnEvent::Skipped {
        combatant: SLIME,
        reason: SkipReason::Dead,
    })));
    assert!(!session.is_action_queued(SLIME));
    assert!(session.is_clock_running());
    assert_eq!(session.current_tick(), Tick(1));

    // Consumed, so the clock keeps advancing.
    session.tick();
    assert_eq!(session.current_tick(), Tick(2));
}

#[tokio::test(start_paused = true)]
async fn ally_mid_action_is_not_healed_until_done() {
    use battle_core::CombatantId;
    let fighter = CombatantId(4);

    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(unit(HERO, Alignment::Party, 100, 10.0))
        .combatant(unit(fighter, Alignment::Party, 100, 20.0).with_current_health(40))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 0.5))
        .strategem(strategem(
            HERO,
            cure(),
            Condition::forecast_below(Alignment::Party, 60, true),
        ))
        .strategem(strategem(fighter, basic_attack(), Condition::any(Alignment::Enemy)))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    assert!(session.snapshot(fighter).unwrap().is_acting);
    assert!(drain(&mut turns).contains(&Event::Turn(TurnEvent::Deferred {
        combatant: HERO,
        reason: DeferReason::TargetActing,
    })));
    assert!(session.is_action_queued(HERO));
    assert!(!session.is_clock_running());
    assert!(!session.snapshot(fighter).unwrap().is_heal_locked);

    session.tick();
    assert_eq!(session.current_tick(), Tick(10));
    assert!(!session.snapshot(HERO).unwrap().is_acting);

    session.settle().await;
    session.tick();

    assert_eq!(started(&drain(&mut turns)), vec![(HERO, "Cure".to_owned())]);
    assert!(session.snapshot(fighter).unwrap().is_heal_locked);
    session.settle().await;
    assert_eq!(session.snapshot(fighter).unwrap().health, 65);
}
