//! Leveling as a caller-owned, multi-step draft.
//!
//! `begin` opens a draft once XP allows it, `choose_improvement` records the
//! ability score improvement (when the new level grants one), and `commit`
//! writes everything to the character. The draft is plain data so a UI can
//! hold it across requests.

use chronicler_domain::game_systems::dnd5e::{self, ABILITY_SCORE_CAP, MAX_LEVEL};
use chronicler_domain::{Ability, CharacterState};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LevelUpError {
    #[error("Already at the maximum level")]
    MaxLevel,
    #[error("Not enough XP: need {needed}, have {have}")]
    NotEnoughXp { needed: u32, have: u32 },
    #[error("Level {0} does not grant an ability score improvement")]
    NoImprovement(u8),
    #[error("An ability score improvement must be chosen first")]
    ImprovementRequired,
    #[error("Split improvements need two different abilities")]
    SameAbility,
    #[error("{ability} would exceed {cap}")]
    ScoreCap { ability: Ability, cap: i32 },
    #[error("Draft is for level {draft}, character is level {current}")]
    Stale { draft: u8, current: u8 },
}

/// The two-point improvement budget: one ability +2, or two abilities +1 each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AbilityImprovement {
    Single { ability: Ability },
    Split { first: Ability, second: Ability },
}

impl AbilityImprovement {
    fn increases(&self) -> Vec<(Ability, i32)> {
        match *self {
            Self::Single { ability } => vec![(ability, 2)],
            Self::Split { first, second } => vec![(first, 1), (second, 1)],
        }
    }

    fn increase_for(&self, target: Ability) -> i32 {
        self.increases()
            .into_iter()
            .filter(|(ability, _)| *ability == target)
            .map(|(_, increase)| increase)
            .sum()
    }

    fn validate(&self, character: &CharacterState) -> Result<(), LevelUpError> {
        if let Self::Split { first, second } = self {
            if first == second {
                return Err(LevelUpError::SameAbility);
            }
        }
        for (ability, increase) in self.increases() {
            if character.abilities.get(ability) + increase > ABILITY_SCORE_CAP {
                return Err(LevelUpError::ScoreCap {
                    ability,
                    cap: ABILITY_SCORE_CAP,
                });
            }
        }
        Ok(())
    }
}

/// Half the hit die plus one, plus CON, at least 1
fn fixed_hp_gain(character: &CharacterState, constitution_increase: i32) -> i32 {
    let die = i32::from(character.hit_dice.die_size);
    let constitution = character.abilities.get(Ability::Constitution) + constitution_increase;
    (die / 2 + 1 + dnd5e::ability_modifier(constitution)).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpDraft {
    pub target_level: u8,
    /// Expected hit point gain, including a chosen CON increase. `commit`
    /// recomputes it from the improved scores.
    pub hp_gain: i32,
    pub grants_improvement: bool,
    #[serde(default)]
    pub improvement: Option<AbilityImprovement>,
}

impl LevelUpDraft {
    pub fn begin(character: &CharacterState) -> Result<Self, LevelUpError> {
        if character.level >= MAX_LEVEL {
            return Err(LevelUpError::MaxLevel);
        }
        let needed = character.xp_for_next_level().ok_or(LevelUpError::MaxLevel)?;
        if character.xp < needed {
            return Err(LevelUpError::NotEnoughXp {
                needed,
                have: character.xp,
            });
        }

        let target_level = character.level + 1;
        Ok(Self {
            target_level,
            hp_gain: fixed_hp_gain(character, 0),
            grants_improvement: dnd5e::grants_ability_improvement(target_level),
            improvement: None,
        })
    }

    /// Record the improvement, replacing any earlier choice.
    pub fn choose_improvement(
        mut self,
        character: &CharacterState,
        choice: AbilityImprovement,
    ) -> Result<Self, LevelUpError> {
        if !self.grants_improvement {
            return Err(LevelUpError::NoImprovement(self.target_level));
        }
        choice.validate(character)?;
        self.hp_gain = fixed_hp_gain(character, choice.increase_for(Ability::Constitution));
        self.improvement = Some(choice);
        Ok(self)
    }

    /// Apply the draft. Armor Class is derived from equipment, so callers
    /// re-derive it afterwards.
    pub fn commit(self, character: &mut CharacterState) -> Result<(), LevelUpError> {
        if character.level + 1 != self.target_level {
            return Err(LevelUpError::Stale {
                draft: self.target_level,
                current: character.level,
            });
        }
        let improvement = match (self.grants_improvement, self.improvement) {
            (true, None) => return Err(LevelUpError::ImprovementRequired),
            (true, Some(choice)) => {
                choice.validate(character)?;
                Some(choice)
            }
            (false, _) => None,
        };

        if let Some(choice) = improvement {
            for (ability, increase) in choice.increases() {
                *character.abilities.get_mut(ability) += increase;
            }
        }
        let hp_gain = fixed_hp_gain(character, 0);
        character.level = self.target_level;
        character.max_hp += hp_gain;
        character.hp += hp_gain;
        character.hit_dice.max += 1;
        character.hit_dice.current += 1;
        if let Some(maxima) = dnd5e::full_caster_slots(&character.class_name, character.level) {
            character.spell_slots.apply_maxima(maxima);
        }

        tracing::info!(
            character = %character.name,
            level = character.level,
            hp_gain,
            "Level up committed"
        );
        Ok(())
    }
}
