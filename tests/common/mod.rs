//! Shared setup for the integration suites.

use sixshooter::{
    CardPrototype, EncounterConfig, EncounterModifier, EnemyPrototype, GameController, InputEvent,
};

/// Prototypes used across the suites.
pub fn prototypes() -> Vec<CardPrototype> {
    vec![
        CardPrototype::bullet("standardBullet", 4, 1),
        CardPrototype::bullet("heavyBullet", 7, 3),
        CardPrototype::bullet("wraithBullet", 2, 1).undead(),
        CardPrototype::bullet("ironBullet", 3, 2).everlasting(),
        CardPrototype::bullet("sprayBullet", 4, 2).spray(),
    ]
}

/// A controller with no opening draw (so tests start in the free phase),
/// a configurable enemy line-up, and the given modifiers.
pub fn controller_with(
    modifiers: Vec<EncounterModifier>,
    enemies: &[EnemyPrototype],
) -> GameController {
    let config = EncounterConfig::default().with_draws(0, 2);
    let deck: Vec<String> = (0..10).map(|_| "standardBullet".to_string()).collect();
    GameController::new(config, prototypes(), "standardBullet", &deck, enemies, modifiers, 42)
}

/// The default single-enemy controller.
pub fn controller() -> GameController {
    controller_with(Vec::new(), &[EnemyPrototype::new("Outlaw", 20, 4)])
}

/// Run `n` logical ticks.
pub fn run_ticks(controller: &mut GameController, n: usize) {
    for _ in 0..n {
        controller.update();
    }
}

/// Run ticks until the UI unfreezes (the main schedule drained), failing
/// the test if it never does.
pub fn settle(controller: &mut GameController) {
    for _ in 0..64 {
        controller.update();
        if !controller.is_ui_frozen() && controller.state().phase() == sixshooter::GamePhase::Free {
            return;
        }
    }
    panic!("main schedule did not drain; waiting on an unanswered suspension?");
}

/// Run ticks until a draw phase opens, then click through it, counting the
/// cards drawn. Fails the test if no draw phase arrives.
pub fn complete_draw_phase(controller: &mut GameController) -> u32 {
    for _ in 0..64 {
        controller.update();
        if controller.state().phase().allows_drawing_cards() {
            let mut drawn = 0;
            while controller.state().phase().allows_drawing_cards() {
                controller.handle_event(InputEvent::DrawCard);
                drawn += 1;
            }
            return drawn;
        }
    }
    panic!("no draw phase opened");
}
