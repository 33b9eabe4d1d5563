mod common;

use std::sync::Arc;
use std::time::Duration;

use battle_core::{Alignment, Condition, Tick};
use battle_runtime::{
    BattleSession, BattleSessionBuilder, ChannelPrompt, Event, FirstChoicePrompt, Strategem, Topic,
    TurnEvent,
};

use common::*;

fn manual_duel() -> BattleSessionBuilder {
    BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(manual(HERO, 100, 10.0))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 0.5))
}

fn count(events: &[Event], pred: impl Fn(&TurnEvent) -> bool) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::Turn(turn) if pred(turn)))
        .count()
}

#[tokio::test(start_paused = true)]
async fn prompt_halts_the_clock_until_the_player_chooses() {
    let (prompt, mut responder) = ChannelPrompt::new();
    let session = manual_duel()
        // Never matches a full-health enemy, so the player is asked.
        .strategem(strategem(
            HERO,
            basic_attack(),
            Condition::forecast_below(Alignment::Enemy, 10, true),
        ))
        .prompt_provider(HERO, Arc::new(prompt))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    assert!(session.is_prompt_outstanding());
    assert!(!session.is_clock_running());

    for _ in 0..5 {
        session.tick();
    }
    assert_eq!(session.current_tick(), Tick(10));
    assert_eq!(session.snapshot(SLIME).unwrap().charge, 5.0);
    assert_eq!(session.snapshot(HERO).unwrap().charge, 100.0);

    let request = responder.next_request().await.unwrap();
    assert_eq!(request.combatant, HERO);
    assert_eq!(request.available.len(), 1);
    assert_eq!(request.available[0].name(), "BasicAttack");

    assert!(responder.respond(action(
        HERO,
        basic_attack(),
        Condition::any(Alignment::Enemy)
    )));
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Acting, but the clock waits out the debounce.
    assert!(session.snapshot(HERO).unwrap().is_acting);
    assert!(session.is_prompt_outstanding());
    assert!(!session.is_clock_running());

    session.settle().await;

    assert!(!session.is_prompt_outstanding());
    assert!(session.is_clock_running());
    assert_eq!(session.snapshot(SLIME).unwrap().health, 28);
    assert_eq!(session.snapshot(HERO).unwrap().charge, 0.0);

    let events = drain(&mut turns);
    assert_eq!(
        count(&events, |e| matches!(e, TurnEvent::PromptRequested { combatant: HERO })),
        1
    );
    assert!(events.contains(&Event::Turn(TurnEvent::PromptResolved {
        combatant: HERO,
        action: "BasicAttack".into(),
    })));
}

#[tokio::test(start_paused = true)]
async fn failed_prompt_keeps_charge_and_asks_again() {
    let session = manual_duel().build().unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    session.settle().await;

    assert!(!session.is_prompt_outstanding());
    assert!(session.is_clock_running());
    assert_eq!(session.snapshot(HERO).unwrap().charge, 100.0);

    session.tick();
    assert!(session.is_prompt_outstanding());

    let events = drain(&mut turns);
    assert_eq!(
        count(&events, |e| matches!(e, TurnEvent::PromptRequested { .. })),
        2
    );
    let failure = events.iter().find_map(|e| match e {
        Event::Turn(TurnEvent::PromptFailed { error, .. }) => Some(error.clone()),
        _ => None,
    });
    assert!(failure.unwrap().contains("no prompt provider"));

    session.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn foreign_action_is_rejected() {
    let (prompt, mut responder) = ChannelPrompt::new();
    let session = manual_duel()
        .prompt_provider(HERO, Arc::new(prompt))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    let request = responder.next_request().await.unwrap();
    assert!(request.available.is_empty());
    responder.respond(action(SLIME, basic_attack(), Condition::any(Alignment::Party)));
    session.settle().await;

    assert!(!session.snapshot(SLIME).unwrap().is_acting);
    assert_eq!(session.snapshot(HERO).unwrap().health, 100);
    assert_eq!(session.snapshot(HERO).unwrap().charge, 100.0);
    assert_eq!(
        count(&drain(&mut turns), |e| matches!(
            e,
            TurnEvent::PromptFailed { combatant: HERO, .. }
        )),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn chosen_action_pays_its_cost() {
    let session = BattleSession::builder()
        .config(config())
        .without_charge_entropy()
        .combatant(manual(HERO, 100, 10.0).with_current_health(40))
        .combatant(unit(SLIME, Alignment::Enemy, 40, 0.5))
        // Gated on a condition that never holds, so the player is asked.
        .strategem(
            Strategem::new(action(
                HERO,
                cure(),
                Condition::forecast_below(Alignment::Party, 50, true),
            ))
            .with_condition(Condition::forecast_below(Alignment::Enemy, 10, true)),
        )
        .prompt_provider(
            HERO,
            Arc::new(FirstChoicePrompt::new(Duration::from_millis(200))),
        )
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    session.settle().await;

    let events = drain(&mut turns);
    assert_eq!(
        count(&events, |e| matches!(e, TurnEvent::PromptRequested { combatant: HERO })),
        1
    );
    assert!(events.contains(&Event::Turn(TurnEvent::PromptResolved {
        combatant: HERO,
        action: "Cure".into(),
    })));
    assert_eq!(session.snapshot(HERO).unwrap().health, 65);
    assert_eq!(session.snapshot(HERO).unwrap().charge, 0.0);
    assert!(session.is_clock_running());
}

#[tokio::test(start_paused = true)]
async fn action_without_targets_is_refused() {
    let session = manual_duel()
        // Nobody in the party is hurt, so Cure has no one to heal.
        .strategem(strategem(
            HERO,
            cure(),
            Condition::forecast_below(Alignment::Party, 50, true),
        ))
        .prompt_provider(HERO, Arc::new(FirstChoicePrompt::new(Duration::ZERO)))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    session.settle().await;

    let hero = session.snapshot(HERO).unwrap();
    assert!(!hero.is_acting);
    assert_eq!(hero.health, 100);
    assert_eq!(hero.charge, 100.0);
    assert!(session.is_clock_running());

    let events = drain(&mut turns);
    assert_eq!(
        count(&events, |e| matches!(e, TurnEvent::PromptResolved { .. })),
        0
    );
    let failure = events.iter().find_map(|e| match e {
        Event::Turn(TurnEvent::PromptFailed { combatant: HERO, error }) => Some(error.clone()),
        _ => None,
    });
    assert!(failure.unwrap().contains("has no target"));

    // Readiness was re-armed, so the next tick asks again.
    session.tick();
    assert!(session.is_prompt_outstanding());
    session.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn removing_the_prompted_combatant_resumes_the_clock() {
    let (prompt, _responder) = ChannelPrompt::new();
    let session = manual_duel()
        .prompt_provider(HERO, Arc::new(prompt))
        .build()
        .unwrap();

    for _ in 0..10 {
        session.tick();
    }
    assert!(session.is_prompt_outstanding());

    session.remove_combatant(HERO);
    assert!(!session.is_prompt_outstanding());
    assert!(session.is_clock_running());

    session.tick();
    assert_eq!(session.current_tick(), Tick(11));

    // The abandoned prompt no longer holds up teardown.
    let torn_down = tokio::time::timeout(Duration::from_secs(5), session.teardown()).await;
    assert!(torn_down.is_ok());
}

#[tokio::test(start_paused = true)]
async fn teardown_abandons_an_unanswered_prompt() {
    let (prompt, mut responder) = ChannelPrompt::new();
    let session = manual_duel()
        .prompt_provider(HERO, Arc::new(prompt))
        .build()
        .unwrap();
    let mut turns = session.subscribe(Topic::Turn);

    for _ in 0..10 {
        session.tick();
    }
    assert!(responder.next_request().await.is_some());
    assert!(session.is_prompt_outstanding());

    let torn_down = tokio::time::timeout(Duration::from_secs(5), session.teardown()).await;
    assert!(torn_down.is_ok());
    assert!(!session.is_prompt_outstanding());
    assert!(!session.is_clock_running());

    // An answer after teardown goes nowhere.
    responder.respond(action(HERO, basic_attack(), Condition::any(Alignment::Enemy)));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!session.snapshot(HERO).unwrap().is_acting);
    assert_eq!(
        count(&drain(&mut turns), |e| matches!(
            e,
            TurnEvent::PromptResolved { .. } | TurnEvent::PromptFailed { .. }
        )),
        0
    );
}
