//! The closed set of directive kinds
//!
//! Identifiers are resolved to a variant once, at parse time. Unknown
//! identifiers never become directives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DirectiveKind {
    // Inventory and equipment
    InventoryAdd,
    InventoryRemove,
    Equip,
    Unequip,
    Gold,
    Buy,
    UseItem,
    StatusAdd,
    StatusRemove,
    // Combat
    Damage,
    Heal,
    TempHp,
    ResistanceAdd,
    ResistanceRemove,
    ImmunityAdd,
    ImmunityRemove,
    VulnerabilityAdd,
    VulnerabilityRemove,
    NextTurn,
    // Spellcasting
    Cast,
    ConcentrationEnd,
    TimePass,
    // Narrative
    Location,
    Relationship,
    Suggest,
    QuestAdd,
    QuestComplete,
    XpGain,
    // Rests and class resources
    ShortRest,
    LongRest,
    UseResource,
    RestoreResource,
    // Dice
    Roll,
    // Encounter lifecycle (terminal pass)
    CombatStart,
    CombatEnd,
}

const IDENTIFIERS: &[(DirectiveKind, &str)] = &[
    (DirectiveKind::InventoryAdd, "INVENTORY_ADD"),
    (DirectiveKind::InventoryRemove, "INVENTORY_REMOVE"),
    (DirectiveKind::Equip, "EQUIP"),
    (DirectiveKind::Unequip, "UNEQUIP"),
    (DirectiveKind::Gold, "GOLD"),
    (DirectiveKind::Buy, "BUY"),
    (DirectiveKind::UseItem, "USE_ITEM"),
    (DirectiveKind::StatusAdd, "STATUS_ADD"),
    (DirectiveKind::StatusRemove, "STATUS_REMOVE"),
    (DirectiveKind::Damage, "DAMAGE"),
    (DirectiveKind::Heal, "HEAL"),
    (DirectiveKind::TempHp, "TEMP_HP"),
    (DirectiveKind::ResistanceAdd, "RESISTANCE_ADD"),
    (DirectiveKind::ResistanceRemove, "RESISTANCE_REMOVE"),
    (DirectiveKind::ImmunityAdd, "IMMUNITY_ADD"),
    (DirectiveKind::ImmunityRemove, "IMMUNITY_REMOVE"),
    (DirectiveKind::VulnerabilityAdd, "VULNERABILITY_ADD"),
    (DirectiveKind::VulnerabilityRemove, "VULNERABILITY_REMOVE"),
    (DirectiveKind::NextTurn, "NEXT_TURN"),
    (DirectiveKind::Cast, "CAST"),
    (DirectiveKind::ConcentrationEnd, "CONCENTRATION_END"),
    (DirectiveKind::TimePass, "TIME_PASS"),
    (DirectiveKind::Location, "LOCATION"),
    (DirectiveKind::Relationship, "RELATIONSHIP"),
    (DirectiveKind::Suggest, "SUGGEST"),
    (DirectiveKind::QuestAdd, "QUEST_ADD"),
    (DirectiveKind::QuestComplete, "QUEST_COMPLETE"),
    (DirectiveKind::XpGain, "XP_GAIN"),
    (DirectiveKind::ShortRest, "SHORT_REST"),
    (DirectiveKind::LongRest, "LONG_REST"),
    (DirectiveKind::UseResource, "USE_RESOURCE"),
    (DirectiveKind::RestoreResource, "RESTORE_RESOURCE"),
    (DirectiveKind::Roll, "ROLL"),
    (DirectiveKind::CombatStart, "COMBAT_START"),
    (DirectiveKind::CombatEnd, "COMBAT_END"),
];

impl DirectiveKind {
    /// Resolve an uppercase identifier; `None` for anything unknown.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        IDENTIFIERS
            .iter()
            .find(|(_, ident)| *ident == identifier)
            .map(|(kind, _)| *kind)
    }

    pub fn identifier(&self) -> &'static str {
        IDENTIFIERS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, ident)| *ident)
            .unwrap_or("UNKNOWN")
    }

    /// Kinds that need world context and only run in the terminal pass.
    pub fn is_terminal_only(&self) -> bool {
        matches!(self, Self::CombatStart | Self::CombatEnd)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for DirectiveKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s)
            .ok_or_else(|| DomainError::parse(format!("Unknown directive identifier: {}", s)))
    }
}
