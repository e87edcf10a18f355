//! Active combat encounter

use serde::{Deserialize, Serialize};

use crate::ids::CombatantId;
use crate::value_objects::Defenses;

/// Condition appended to a combatant reduced to zero hit points.
pub const DEFEATED: &str = "Defeated";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub armor_class: i32,
    #[serde(default)]
    pub temp_hp: i32,
    pub initiative: i32,
    #[serde(default)]
    pub is_player: bool,
    #[serde(default)]
    pub defenses: Defenses,
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl Combatant {
    pub fn is_defeated(&self) -> bool {
        self.conditions.iter().any(|c| c == DEFEATED)
    }

    /// Clamp at zero and mark defeat once; returns hit points lost.
    pub fn lose_hp(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(0);
        if self.hp == 0 && !self.is_defeated() {
            self.conditions.push(DEFEATED.to_string());
        }
        before - self.hp
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub round: u32,
    /// Index into `combatants` of whoever is acting
    pub turn: usize,
    /// Sorted by initiative, highest first
    pub combatants: Vec<Combatant>,
}

impl Encounter {
    /// Start at round one with combatants ordered by initiative.
    pub fn new(mut combatants: Vec<Combatant>) -> Self {
        combatants.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        Self {
            round: 1,
            turn: 0,
            combatants,
        }
    }

    /// Move to the next combatant; returns true when a new round starts.
    pub fn advance_turn(&mut self) -> bool {
        if self.combatants.is_empty() {
            self.round += 1;
            return true;
        }
        self.turn += 1;
        if self.turn >= self.combatants.len() {
            self.turn = 0;
            self.round += 1;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&Combatant> {
        self.combatants.get(self.turn)
    }

    pub fn player_mut(&mut self) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.is_player)
    }

    /// Resolve a non-player target by exact id, exact name, then substring.
    pub fn find_index(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let lowered = query.to_lowercase();
        let enemies = || self.combatants.iter().enumerate().filter(|(_, c)| !c.is_player);

        enemies()
            .find(|(_, c)| c.id.to_string() == query)
            .or_else(|| enemies().find(|(_, c)| c.name == query))
            .or_else(|| enemies().find(|(_, c)| c.name.eq_ignore_ascii_case(query)))
            .or_else(|| enemies().find(|(_, c)| c.name.to_lowercase().contains(&lowered)))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant(name: &str, initiative: i32, is_player: bool) -> Combatant {
        Combatant {
            id: CombatantId::new(),
            name: name.to_string(),
            hp: 7,
            max_hp: 7,
            armor_class: 15,
            temp_hp: 0,
            initiative,
            is_player,
            defenses: Defenses::default(),
            conditions: Vec::new(),
        }
    }

    #[test]
    fn combatants_sorted_by_initiative() {
        let encounter = Encounter::new(vec![
            combatant("Goblin", 8, false),
            combatant("Hero", 17, true),
            combatant("Goblin 2", 12, false),
        ]);
        let names: Vec<_> = encounter.combatants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Hero", "Goblin 2", "Goblin"]);
    }

    #[test]
    fn advance_turn_wraps_into_new_round() {
        let mut encounter = Encounter::new(vec![
            combatant("Hero", 10, true),
            combatant("Wolf", 5, false),
        ]);
        assert!(!encounter.advance_turn());
        assert!(encounter.advance_turn());
        assert_eq!((encounter.round, encounter.turn), (2, 0));
    }

    #[test]
    fn find_index_prefers_exact_name_over_substring() {
        let encounter = Encounter::new(vec![
            combatant("Goblin Boss", 15, false),
            combatant("Goblin", 10, false),
            combatant("Hero", 5, true),
        ]);
        assert_eq!(encounter.find_index("goblin"), Some(1));
        assert_eq!(encounter.find_index("boss"), Some(0));
        assert_eq!(encounter.find_index("hero"), None);
        assert_eq!(encounter.find_index("dragon"), None);

        let id = encounter.combatants[0].id.to_string();
        assert_eq!(encounter.find_index(&id), Some(0));
    }

    #[test]
    fn reaching_zero_marks_defeat_once() {
        let mut goblin = combatant("Goblin", 10, false);
        assert_eq!(goblin.lose_hp(20), 7);
        goblin.lose_hp(3);
        assert_eq!(goblin.conditions, vec![DEFEATED.to_string()]);
    }
}
