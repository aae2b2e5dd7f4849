//! Combatant data model — sides, actions, emotions, items, and agent state.

use serde::{Deserialize, Serialize};

/// Maximum (and starting) hit points.
pub const MAX_HP: u32 = 100;

/// Horizontal arena bounds an agent may occupy, in percent.
pub const X_BOUNDS: (f64, f64) = (10.0, 90.0);
/// Vertical arena bounds an agent may occupy, in percent.
pub const Y_BOUNDS: (f64, f64) = (20.0, 80.0);

/// Debate position held by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// Argues for the topic.
    Pro,
    /// Argues against the topic.
    Con,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Self::Pro => Self::Con,
            Self::Con => Self::Pro,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pro => write!(f, "PRO"),
            Self::Con => write!(f, "CON"),
        }
    }
}

/// Physical action an agent performs in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Idle,
    Move,
    Attack,
    Defend,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Move => write!(f, "move"),
            Self::Attack => write!(f, "attack"),
            Self::Defend => write!(f, "defend"),
        }
    }
}

/// Emotional state reported by the reasoning service and mirrored back
/// into the arena display. Passed through without interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Angry,
    Confident,
    Confused,
    Happy,
    Injured,
    Triumphant,
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::Angry => write!(f, "angry"),
            Self::Confident => write!(f, "confident"),
            Self::Confused => write!(f, "confused"),
            Self::Happy => write!(f, "happy"),
            Self::Injured => write!(f, "injured"),
            Self::Triumphant => write!(f, "triumphant"),
        }
    }
}

/// Single-use consumable. `None` is the sentinel for "no item used".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    /// Restores 25 HP to the user, capped at [`MAX_HP`].
    HealModule,
    /// Multiplies this turn's damage by 1.5.
    LogicAmplifier,
    /// Raises this turn's logic score to at least 85.
    FactChecker,
    None,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HealModule => write!(f, "HEAL_MODULE"),
            Self::LogicAmplifier => write!(f, "LOGIC_AMPLIFIER"),
            Self::FactChecker => write!(f, "FACT_CHECKER"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// One combatant. Position is presentation-only; HP and inventory are
/// game state mutated exclusively through turn resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: String,
    pub side: Side,
    pub name: String,
    /// Horizontal position, percent of arena width.
    pub x: f64,
    /// Vertical position, percent of arena height.
    pub y: f64,
    /// Hit points, always within `[0, MAX_HP]`.
    pub hp: u32,
    pub emotion: Emotion,
    pub last_action: ActionKind,
    /// Ordered multiset of consumables; each instance is used once.
    pub inventory: Vec<ItemKind>,
}

impl AgentState {
    /// An agent at 0 HP is out of the match and takes no further turns.
    pub fn is_eliminated(&self) -> bool {
        self.hp == 0
    }

    /// Restore hit points, capped at [`MAX_HP`].
    pub fn heal(&mut self, amount: u32) {
        self.hp = (self.hp + amount).min(MAX_HP);
    }

    /// Lose hit points, floored at zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Remove exactly one instance of `item` from the inventory.
    /// Returns false (and removes nothing) if no instance is present.
    pub fn consume_item(&mut self, item: ItemKind) -> bool {
        match self.inventory.iter().position(|&held| held == item) {
            Some(index) => {
                self.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move toward the requested coordinates, clamped to the arena
    /// bounds. Axes without a requested target are left unchanged.
    pub fn move_to(&mut self, target_x: Option<f64>, target_y: Option<f64>) {
        if let Some(x) = target_x {
            self.x = x.clamp(X_BOUNDS.0, X_BOUNDS.1);
        }
        if let Some(y) = target_y {
            self.y = y.clamp(Y_BOUNDS.0, Y_BOUNDS.1);
        }
    }
}

/// The fixed two-agent roster every match starts from: the proponent on
/// the left, the opponent on the right, both at full HP with one of
/// each item.
pub fn starting_roster() -> [AgentState; 2] {
    let inventory = vec![
        ItemKind::HealModule,
        ItemKind::LogicAmplifier,
        ItemKind::FactChecker,
    ];
    [
        AgentState {
            id: "agent-pro".to_string(),
            side: Side::Pro,
            name: "Proponent Bot".to_string(),
            x: 20.0,
            y: 50.0,
            hp: MAX_HP,
            emotion: Emotion::Neutral,
            last_action: ActionKind::Idle,
            inventory: inventory.clone(),
        },
        AgentState {
            id: "agent-con".to_string(),
            side: Side::Con,
            name: "Opponent Bot".to_string(),
            x: 80.0,
            y: 50.0,
            hp: MAX_HP,
            emotion: Emotion::Neutral,
            last_action: ActionKind::Idle,
            inventory,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_roster() {
        let [pro, con] = starting_roster();
        assert_eq!(pro.side, Side::Pro);
        assert_eq!(con.side, Side::Con);
        assert_eq!(pro.hp, MAX_HP);
        assert_eq!(con.hp, MAX_HP);
        assert_eq!(pro.inventory.len(), 3);
        assert!(!pro.is_eliminated());
    }

    #[test]
    fn test_heal_caps_at_max() {
        let [mut agent, _] = starting_roster();
        agent.hp = 90;
        agent.heal(25);
        assert_eq!(agent.hp, MAX_HP);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let [mut agent, _] = starting_roster();
        agent.hp = 10;
        agent.take_damage(42);
        assert_eq!(agent.hp, 0);
        assert!(agent.is_eliminated());
    }

    #[test]
    fn test_consume_item_removes_one_instance() {
        let [mut agent, _] = starting_roster();
        agent.inventory.push(ItemKind::HealModule);
        assert!(agent.consume_item(ItemKind::HealModule));
        assert_eq!(
            agent
                .inventory
                .iter()
                .filter(|&&i| i == ItemKind::HealModule)
                .count(),
            1
        );
    }

    #[test]
    fn test_consume_missing_item_is_noop() {
        let [mut agent, _] = starting_roster();
        agent.inventory.clear();
        assert!(!agent.consume_item(ItemKind::FactChecker));
        assert!(agent.inventory.is_empty());
    }

    #[test]
    fn test_move_clamps_to_bounds() {
        let [mut agent, _] = starting_roster();
        agent.move_to(Some(120.0), Some(-5.0));
        assert_eq!(agent.x, X_BOUNDS.1);
        assert_eq!(agent.y, Y_BOUNDS.0);
    }

    #[test]
    fn test_move_without_target_is_unchanged() {
        let [mut agent, _] = starting_roster();
        let (x, y) = (agent.x, agent.y);
        agent.move_to(None, None);
        assert_eq!((agent.x, agent.y), (x, y));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Side::Pro).unwrap(), "\"PRO\"");
        assert_eq!(
            serde_json::to_string(&ItemKind::HealModule).unwrap(),
            "\"HEAL_MODULE\""
        );
        assert_eq!(
            serde_json::to_string(&ActionKind::Attack).unwrap(),
            "\"attack\""
        );
        assert_eq!(
            serde_json::to_string(&Emotion::Triumphant).unwrap(),
            "\"triumphant\""
        );
        let item: ItemKind = serde_json::from_str("\"NONE\"").unwrap();
        assert_eq!(item, ItemKind::None);
    }

    #[test]
    fn test_side_other() {
        assert_eq!(Side::Pro.other(), Side::Con);
        assert_eq!(Side::Con.other(), Side::Pro);
    }
}
