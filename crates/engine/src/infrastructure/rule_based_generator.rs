//! Offline item generator.
//!
//! Builds a definition from the item's name alone: category and stats come
//! from the shared inference rules, and an enhancement bonus written into the
//! name ("Longsword +1") becomes effect text.

use std::sync::LazyLock;

use async_trait::async_trait;
use chronicler_domain::catalog::infer_item;
use chronicler_domain::entities::slugify;
use chronicler_domain::{ItemCategory, ItemDefinition};
use regex_lite::Regex;

use crate::infrastructure::ports::{GenerationError, ItemGeneratorPort};

static BONUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+(\d)\b").expect("valid regex"));
static RESISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bof\s+([a-z]+)\s+resistance\b").expect("valid regex")
});

#[derive(Debug, Default)]
pub struct RuleBasedItemGenerator;

impl RuleBasedItemGenerator {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, name: &str, context: &str) -> ItemDefinition {
        let mut item = infer_item(slugify(name), name);

        if let Some(bonus) = BONUS_RE
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
        {
            match item.category {
                ItemCategory::Weapon => {
                    item.effects.push(format!("+{} attack rolls", bonus));
                    item.effects.push(format!("+{} damage rolls", bonus));
                }
                ItemCategory::Armor | ItemCategory::Shield | ItemCategory::Magic => {
                    item.effects.push(format!("+{} AC", bonus));
                }
                _ => {}
            }
        }
        if let Some(damage_type) = RESISTANCE_RE.captures(name).and_then(|caps| caps.get(1)) {
            item.effects
                .push(format!("resistance to {}", damage_type.as_str().to_lowercase()));
        }

        let context = context.trim();
        item.description = if context.is_empty() {
            format!("A {} of uncertain origin.", item.category)
        } else {
            format!("A {} found in {}.", item.category, context)
        };
        item
    }
}

#[async_trait]
impl ItemGeneratorPort for RuleBasedItemGenerator {
    async fn generate(&self, name: &str, context: &str) -> Result<ItemDefinition, GenerationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GenerationError::Failed("empty item name".into()));
        }
        let item = self.build(name, context);
        tracing::debug!(item = %item.id, category = %item.category, "Generated item from rules");
        Ok(item)
    }
}
