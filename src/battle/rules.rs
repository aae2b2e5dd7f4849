//! Deterministic combat resolution — item effects and the damage
//! formula. Everything here is pure game rules; the argument text and
//! its raw score come from the reasoning service and are trusted as-is.

use serde::{Deserialize, Serialize};

use crate::agent::{ActionKind, AgentState, Emotion, ItemKind};
use crate::reasoner::TurnResponse;

/// Scores at or below this deal no damage regardless of action.
pub const WEAK_ARGUMENT_CUTOFF: f64 = 45.0;
/// Base damage is `floor(score / 100 * BASE_DAMAGE_SCALE)`.
pub const BASE_DAMAGE_SCALE: f64 = 20.0;
/// Scores above this earn the critical-logic bonus.
pub const CRITICAL_CUTOFF: f64 = 80.0;
pub const CRITICAL_BONUS: u32 = 10;
/// Damage multiplier for `LOGIC_AMPLIFIER`.
pub const AMPLIFIER_MULTIPLIER: f64 = 1.5;
/// `FACT_CHECKER` raises the effective score to at least this.
pub const FACT_CHECKER_FLOOR: f64 = 85.0;
/// HP restored by `HEAL_MODULE`.
pub const HEAL_AMOUNT: u32 = 25;

/// The deterministic outcome of resolving one turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Item actually consumed; `NONE` if the request failed validation.
    pub item_used: ItemKind,
    /// Logic score after item adjustment.
    pub effective_score: f64,
    /// Damage dealt to the opponent (zero unless the action was an
    /// attack with a sufficient score).
    pub damage: u32,
}

/// Damage earned by an effective logic score. Weak arguments deal
/// nothing; strong ones get the critical bonus before amplification.
pub fn score_damage(effective_score: f64, amplified: bool) -> u32 {
    if effective_score <= WEAK_ARGUMENT_CUTOFF {
        return 0;
    }
    let mut damage = (effective_score / 100.0 * BASE_DAMAGE_SCALE).floor() as u32;
    if effective_score > CRITICAL_CUTOFF {
        damage += CRITICAL_BONUS;
    }
    if amplified {
        damage = (f64::from(damage) * AMPLIFIER_MULTIPLIER).floor() as u32;
    }
    damage
}

/// Apply one reasoning response to the pair of agents.
///
/// Order matters: the item request is validated against the inventory
/// first (the reasoning service is untrusted with respect to inventory
/// state), then item effects, then the damage formula, then position
/// and damage application.
pub fn resolve_turn(
    active: &mut AgentState,
    opponent: &mut AgentState,
    response: &TurnResponse,
) -> Resolution {
    let item_used = if response.item_used != ItemKind::None
        && active.consume_item(response.item_used)
    {
        response.item_used
    } else {
        ItemKind::None
    };

    if item_used == ItemKind::HealModule {
        active.heal(HEAL_AMOUNT);
    }

    let effective_score = if item_used == ItemKind::FactChecker {
        response.logic_score.max(FACT_CHECKER_FLOOR)
    } else {
        response.logic_score
    };

    let damage = score_damage(effective_score, item_used == ItemKind::LogicAmplifier);

    active.last_action = response.action;
    active.emotion = response.emotion;
    active.move_to(response.target_x, response.target_y);

    // Only an attack converts potential damage into actual damage.
    if response.action == ActionKind::Attack && damage > 0 {
        opponent.take_damage(damage);
        opponent.last_action = ActionKind::Defend;
        opponent.emotion = Emotion::Injured;
    }

    Resolution {
        item_used,
        effective_score,
        damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{starting_roster, MAX_HP};

    fn response(score: f64, action: ActionKind, item: ItemKind) -> TurnResponse {
        TurnResponse {
            message: "test argument".to_string(),
            action,
            target_x: None,
            target_y: None,
            emotion: Emotion::Confident,
            item_used: item,
            logic_score: score,
            judge_comment: "test verdict".to_string(),
        }
    }

    // ── Damage formula ─────────────────────────────────────────────

    #[test]
    fn test_mid_score_base_damage() {
        assert_eq!(score_damage(50.0, false), 10);
    }

    #[test]
    fn test_high_score_gets_critical_bonus() {
        assert_eq!(score_damage(90.0, false), 28);
    }

    #[test]
    fn test_amplifier_multiplies_after_bonus() {
        assert_eq!(score_damage(90.0, true), 42);
    }

    #[test]
    fn test_weak_argument_deals_nothing() {
        assert_eq!(score_damage(45.0, false), 0);
        assert_eq!(score_damage(45.0, true), 0);
        assert_eq!(score_damage(0.0, false), 0);
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        // Just above the cutoff: floor(45.1 / 100 * 20) = 9.
        assert_eq!(score_damage(45.1, false), 9);
    }

    #[test]
    fn test_critical_cutoff_is_exclusive() {
        assert_eq!(score_damage(80.0, false), 16);
        assert_eq!(score_damage(80.1, false), 26);
    }

    #[test]
    fn test_nan_score_deals_nothing() {
        assert_eq!(score_damage(f64::NAN, false), 0);
    }

    // ── Full resolution ────────────────────────────────────────────

    #[test]
    fn test_attack_applies_damage_and_marks_opponent() {
        let [mut active, mut opponent] = starting_roster();
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(90.0, ActionKind::Attack, ItemKind::None),
        );
        assert_eq!(outcome.damage, 28);
        assert_eq!(opponent.hp, 72);
        assert_eq!(opponent.last_action, ActionKind::Defend);
        assert_eq!(opponent.emotion, Emotion::Injured);
        assert_eq!(active.last_action, ActionKind::Attack);
    }

    #[test]
    fn test_non_attack_deals_no_damage_despite_score() {
        let [mut active, mut opponent] = starting_roster();
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(95.0, ActionKind::Defend, ItemKind::None),
        );
        // The potential damage still shows up in the resolution.
        assert_eq!(outcome.damage, 29);
        assert_eq!(opponent.hp, MAX_HP);
        assert_eq!(opponent.emotion, Emotion::Neutral);
    }

    #[test]
    fn test_heal_module_restores_and_is_consumed() {
        let [mut active, mut opponent] = starting_roster();
        active.hp = 40;
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(30.0, ActionKind::Idle, ItemKind::HealModule),
        );
        assert_eq!(outcome.item_used, ItemKind::HealModule);
        assert_eq!(active.hp, 65);
        assert!(!active.inventory.contains(&ItemKind::HealModule));
    }

    #[test]
    fn test_heal_never_exceeds_max() {
        let [mut active, mut opponent] = starting_roster();
        active.hp = 95;
        resolve_turn(
            &mut active,
            &mut opponent,
            &response(30.0, ActionKind::Idle, ItemKind::HealModule),
        );
        assert_eq!(active.hp, MAX_HP);
    }

    #[test]
    fn test_fact_checker_floors_the_score() {
        let [mut active, mut opponent] = starting_roster();
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(20.0, ActionKind::Attack, ItemKind::FactChecker),
        );
        assert_eq!(outcome.effective_score, 85.0);
        // floor(85 / 100 * 20) + critical bonus.
        assert_eq!(outcome.damage, 27);
        assert_eq!(opponent.hp, 73);
    }

    #[test]
    fn test_fact_checker_keeps_higher_raw_score() {
        let [mut active, mut opponent] = starting_roster();
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(92.0, ActionKind::Attack, ItemKind::FactChecker),
        );
        assert_eq!(outcome.effective_score, 92.0);
    }

    #[test]
    fn test_unheld_item_is_downgraded_silently() {
        let [mut active, mut opponent] = starting_roster();
        active.inventory.clear();
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(20.0, ActionKind::Attack, ItemKind::FactChecker),
        );
        assert_eq!(outcome.item_used, ItemKind::None);
        // No floor applied: the weak argument stays weak.
        assert_eq!(outcome.effective_score, 20.0);
        assert_eq!(outcome.damage, 0);
        assert!(active.inventory.is_empty());
    }

    #[test]
    fn test_each_item_instance_is_consumed_once() {
        let [mut active, mut opponent] = starting_roster();
        resolve_turn(
            &mut active,
            &mut opponent,
            &response(90.0, ActionKind::Attack, ItemKind::LogicAmplifier),
        );
        assert!(!active.inventory.contains(&ItemKind::LogicAmplifier));

        // Second request for the same item no longer validates.
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(90.0, ActionKind::Attack, ItemKind::LogicAmplifier),
        );
        assert_eq!(outcome.item_used, ItemKind::None);
        assert_eq!(outcome.damage, 28);
    }

    #[test]
    fn test_amplified_attack_end_to_end() {
        let [mut active, mut opponent] = starting_roster();
        let outcome = resolve_turn(
            &mut active,
            &mut opponent,
            &response(90.0, ActionKind::Attack, ItemKind::LogicAmplifier),
        );
        assert_eq!(outcome.damage, 42);
        assert_eq!(opponent.hp, 58);
    }

    #[test]
    fn test_damage_floors_opponent_at_zero() {
        let [mut active, mut opponent] = starting_roster();
        opponent.hp = 5;
        resolve_turn(
            &mut active,
            &mut opponent,
            &response(90.0, ActionKind::Attack, ItemKind::None),
        );
        assert_eq!(opponent.hp, 0);
        assert!(opponent.is_eliminated());
    }

    #[test]
    fn test_position_updates_are_clamped() {
        let [mut active, mut opponent] = starting_roster();
        let mut resp = response(50.0, ActionKind::Move, ItemKind::None);
        resp.target_x = Some(99.0);
        resp.target_y = Some(0.0);
        resolve_turn(&mut active, &mut opponent, &resp);
        assert_eq!(active.x, 90.0);
        assert_eq!(active.y, 20.0);
    }
}
