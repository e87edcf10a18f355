//! In-memory creature lookup backed by the built-in templates.

use async_trait::async_trait;
use chronicler_domain::catalog::builtin_creatures;
use chronicler_domain::CreatureTemplate;

use crate::infrastructure::ports::{LookupError, WorldLookupPort};

pub struct BuiltinBestiary {
    creatures: Vec<CreatureTemplate>,
}

impl Default for BuiltinBestiary {
    fn default() -> Self {
        Self::new(builtin_creatures())
    }
}

impl BuiltinBestiary {
    pub fn new(creatures: Vec<CreatureTemplate>) -> Self {
        Self { creatures }
    }

    fn find(&self, name: &str) -> Option<&CreatureTemplate> {
        self.creatures
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// "Wolves" -> "Wolf", "Goblins" -> "Goblin"
fn singular_forms(name: &str) -> Vec<String> {
    let mut forms = Vec::new();
    if let Some(stem) = name.strip_suffix("ves") {
        forms.push(format!("{}f", stem));
    }
    if let Some(stem) = name.strip_suffix("es") {
        forms.push(stem.to_string());
    }
    if let Some(stem) = name.strip_suffix('s') {
        forms.push(stem.to_string());
    }
    forms
}

#[async_trait]
impl WorldLookupPort for BuiltinBestiary {
    async fn find_creature(&self, name: &str) -> Result<Option<CreatureTemplate>, LookupError> {
        let name = name.trim();
        if let Some(template) = self.find(name) {
            return Ok(Some(template.clone()));
        }
        for form in singular_forms(name) {
            if let Some(template) = self.find(&form) {
                // Keep the singular name so combatants read naturally
                return Ok(Some(template.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_ignores_case_and_plurals() {
        let bestiary = BuiltinBestiary::default();

        let goblin = bestiary.find_creature("goblin").await.unwrap().unwrap();
        assert_eq!(goblin.max_hp, 7);
        assert_eq!(
            bestiary.find_creature("Wolves").await.unwrap().map(|c| c.name),
            Some("Wolf".to_string())
        );
        assert_eq!(
            bestiary.find_creature("Skeletons").await.unwrap().map(|c| c.name),
            Some("Skeleton".to_string())
        );
        assert!(bestiary.find_creature("Tarrasque").await.unwrap().is_none());
    }
}
