//! Inventory, currency, and status conditions.
//!
//! Equip transitions route through the equipment service so derived AC and
//! item-sourced modifiers stay in step with the equipped set.

mod error;

pub use error::InventoryError;

use chronicler_domain::catalog::infer_item;
use chronicler_domain::directive::{parse_count, parse_decimal, round_currency};
use chronicler_domain::entities::slugify;
use chronicler_domain::{
    Condition, Directive, DirectiveKind, DomainError, InventorySlot, ItemDefinition,
    PendingItemRequest, SessionState,
};

use crate::use_cases::dispatch::{DirectiveHandler, DispatchContext, Outcome};
use crate::use_cases::effects::resolve_effects;
use crate::use_cases::equipment::{
    apply_item_effects, occupies_same_slot, refresh_armor_class, remove_item_effects, resolve_item,
};

pub struct InventoryHandler;

impl DirectiveHandler for InventoryHandler {
    fn name(&self) -> &'static str {
        "inventory"
    }

    fn handles(&self, kind: DirectiveKind) -> bool {
        matches!(
            kind,
            DirectiveKind::InventoryAdd
                | DirectiveKind::InventoryRemove
                | DirectiveKind::Equip
                | DirectiveKind::Unequip
                | DirectiveKind::Gold
                | DirectiveKind::Buy
                | DirectiveKind::UseItem
                | DirectiveKind::StatusAdd
                | DirectiveKind::StatusRemove
        )
    }

    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        let result = match directive.kind {
            DirectiveKind::InventoryAdd => add_item(directive, ctx),
            DirectiveKind::InventoryRemove => remove_item(directive, ctx),
            DirectiveKind::Equip => equip(directive, ctx),
            DirectiveKind::Unequip => unequip(directive, ctx),
            DirectiveKind::Gold => adjust_gold(directive, ctx),
            DirectiveKind::Buy => buy(directive, ctx),
            DirectiveKind::UseItem => use_item(directive, ctx),
            DirectiveKind::StatusAdd => add_status(directive, ctx),
            DirectiveKind::StatusRemove => remove_status(directive, ctx),
            _ => Ok(Outcome::Ignored),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) if err.is_refusal() => ctx.refuse(err.to_string()),
            Err(err) => {
                tracing::debug!(directive = %directive.raw, error = %err, "Inventory directive skipped");
                Outcome::Ignored
            }
        }
    }
}

fn item_name(directive: &Directive) -> Result<&str, InventoryError> {
    directive
        .field(0)
        .map(str::trim)
        .ok_or_else(|| DomainError::validation("Item name is required").into())
}

fn add_item(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = item_name(directive)?;
    let quantity = parse_count(directive.field(1), 1)?;
    if quantity == 0 {
        return Ok(Outcome::Ignored);
    }

    let item = match resolve_item(ctx.catalog, ctx.session, name) {
        Some(item) => item,
        None => register_placeholder(ctx, name),
    };
    add_to_inventory(ctx.session, &item, quantity);
    tracing::info!(item = %item.name, quantity, "Item added to inventory");
    Ok(Outcome::Applied)
}

/// Define an unknown item from its name and queue a generation request for it.
fn register_placeholder(ctx: &mut DispatchContext<'_>, name: &str) -> ItemDefinition {
    let id = format!("custom-{}-{}", slugify(name), ctx.random.gen_uuid().simple());
    let mut item = infer_item(id, name);
    item.placeholder = true;

    ctx.session.pending_items.push(PendingItemRequest {
        placeholder_id: item.id.clone(),
        name: item.name.clone(),
        context: ctx.session.location.clone().unwrap_or_default(),
    });
    ctx.session.catalog.push(item.clone());
    tracing::info!(item = %name, placeholder = %item.id, "Unknown item, queued for generation");
    item
}

fn add_to_inventory(session: &mut SessionState, item: &ItemDefinition, quantity: u32) {
    match session.slot_index(&item.id) {
        Some(index) => {
            let slot = &mut session.inventory[index];
            slot.quantity = slot.quantity.saturating_add(quantity);
        }
        None => session.inventory.push(InventorySlot {
            item_id: item.id.clone(),
            name: item.name.clone(),
            quantity,
            equipped: false,
        }),
    }
}

/// Slot for a directive's item reference: inventory name first, then catalogue identity.
fn find_slot(ctx: &DispatchContext<'_>, name: &str) -> Option<usize> {
    ctx.session.find_slot_index(name).or_else(|| {
        resolve_item(ctx.catalog, ctx.session, name).and_then(|item| ctx.session.slot_index(&item.id))
    })
}

fn remove_item(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = item_name(directive)?;
    let quantity = parse_count(directive.field(1), 1)?;
    let Some(index) = find_slot(ctx, name) else {
        return Ok(Outcome::Ignored);
    };
    if quantity == 0 {
        return Ok(Outcome::Ignored);
    }

    take_from_slot(ctx, index, quantity);
    Ok(Outcome::Applied)
}

/// Remove up to `quantity` units, dropping the slot (and unequipping it) when it empties.
fn take_from_slot(ctx: &mut DispatchContext<'_>, index: usize, quantity: u32) {
    if ctx.session.inventory[index].quantity > quantity {
        ctx.session.inventory[index].quantity -= quantity;
        return;
    }
    if ctx.session.inventory[index].equipped {
        unequip_slot(ctx, index);
    }
    let slot = ctx.session.inventory.remove(index);
    tracing::debug!(item = %slot.name, "Inventory slot emptied");
}

fn equip(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = item_name(directive)?;
    let Some(index) = find_slot(ctx, name) else {
        return Ok(Outcome::Ignored);
    };
    if ctx.session.inventory[index].equipped {
        return Ok(Outcome::Ignored);
    }

    let item_id = ctx.session.inventory[index].item_id.clone();
    let item = resolve_item(ctx.catalog, ctx.session, &item_id);

    if let Some(item) = &item {
        let displaced: Vec<usize> = (0..ctx.session.inventory.len())
            .filter(|&other| other != index && ctx.session.inventory[other].equipped)
            .filter(|&other| {
                resolve_item(ctx.catalog, ctx.session, &ctx.session.inventory[other].item_id)
                    .is_some_and(|equipped| occupies_same_slot(item, &equipped))
            })
            .collect();
        for other in displaced {
            unequip_slot(ctx, other);
        }
    }

    ctx.session.inventory[index].equipped = true;
    if let Some(item) = &item {
        for raw in apply_item_effects(ctx.character, item) {
            ctx.inject(raw);
        }
    }
    refresh_armor_class(ctx.character, ctx.session, ctx.catalog);
    tracing::info!(item = %item_id, armor_class = ctx.character.armor_class, "Item equipped");
    Ok(Outcome::Applied)
}

fn unequip(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = item_name(directive)?;
    match find_slot(ctx, name) {
        Some(index) if ctx.session.inventory[index].equipped => {
            unequip_slot(ctx, index);
            Ok(Outcome::Applied)
        }
        _ => Ok(Outcome::Ignored),
    }
}

fn unequip_slot(ctx: &mut DispatchContext<'_>, index: usize) {
    let slot = &mut ctx.session.inventory[index];
    slot.equipped = false;
    let item_id = slot.item_id.clone();
    remove_item_effects(ctx.character, &item_id);
    refresh_armor_class(ctx.character, ctx.session, ctx.catalog);
    tracing::info!(item = %item_id, armor_class = ctx.character.armor_class, "Item unequipped");
}

fn adjust_gold(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let delta = parse_decimal(directive.field(0).unwrap_or_default())?;
    if delta == 0.0 {
        return Ok(Outcome::Ignored);
    }
    ctx.session.currency = round_currency((ctx.session.currency + delta).max(0.0));
    tracing::debug!(delta, balance = ctx.session.currency, "Currency adjusted");
    Ok(Outcome::Applied)
}

fn buy(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = item_name(directive)?;
    let cost = round_currency(parse_decimal(directive.field(1).unwrap_or("0"))?.max(0.0));
    let quantity = parse_count(directive.field(2), 1)?;
    if quantity == 0 {
        return Ok(Outcome::Ignored);
    }
    if cost > ctx.session.currency {
        return Err(InventoryError::InsufficientFunds {
            item: name.to_string(),
            cost,
            available: ctx.session.currency,
        });
    }

    let item = match resolve_item(ctx.catalog, ctx.session, name) {
        Some(item) => item,
        None => register_placeholder(ctx, name),
    };
    ctx.session.currency = round_currency(ctx.session.currency - cost);
    add_to_inventory(ctx.session, &item, quantity);
    tracing::info!(item = %item.name, quantity, cost, "Item bought");
    Ok(Outcome::Applied)
}

fn use_item(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = item_name(directive)?;
    let Some(index) = find_slot(ctx, name) else {
        return Err(InventoryError::ItemNotFound(name.to_string()));
    };
    let slot_name = ctx.session.inventory[index].name.clone();
    let item = resolve_item(ctx.catalog, ctx.session, &ctx.session.inventory[index].item_id)
        .filter(|item| item.consumable)
        .ok_or(InventoryError::NotUsable(slot_name))?;

    take_from_slot(ctx, index, 1);
    let resolved = resolve_effects(&item.effects);
    for raw in resolved.directives {
        ctx.inject(raw);
    }
    ctx.info(format!("Used {}", item.name));
    tracing::info!(item = %item.id, "Consumable used");
    Ok(Outcome::Applied)
}

fn add_status(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = directive
        .field(0)
        .map(str::trim)
        .ok_or_else(|| DomainError::validation("Condition name is required"))?;
    if ctx.session.has_condition(name) {
        return Ok(Outcome::Ignored);
    }
    ctx.session.conditions.push(Condition {
        name: name.to_string(),
        note: directive.field(1).map(|note| note.trim().to_string()),
    });
    Ok(Outcome::Applied)
}

fn remove_status(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, InventoryError> {
    let name = directive
        .field(0)
        .map(str::trim)
        .ok_or_else(|| DomainError::validation("Condition name is required"))?;
    let before = ctx.session.conditions.len();
    ctx.session
        .conditions
        .retain(|condition| !condition.name.eq_ignore_ascii_case(name));
    if ctx.session.conditions.len() == before {
        return Ok(Outcome::Ignored);
    }
    Ok(Outcome::Applied)
}

#[cfg(test)]
mod tests {
    use crate::use_cases::dispatch::testing::Fixture;
    use crate::use_cases::dispatch::NotificationKind;
    use chronicler_domain::ModifierTarget;

    #[test]
    fn add_merges_into_existing_slot_and_remove_drops_empty_slot() {
        let mut fixture = Fixture::new();
        fixture.dispatch("INVENTORY_ADD[Torch|2] then INVENTORY_ADD[torch|3]");
        assert_eq!(fixture.session.inventory.len(), 1);
        assert_eq!(fixture.session.inventory[0].quantity, 5);

        fixture.dispatch("INVENTORY_ADD[Torch|2] then INVENTORY_ADD[torch|3] INVENTORY_REMOVE[Torch|9]");
        assert!(fixture.session.inventory.is_empty());
    }

    #[test]
    fn unknown_items_get_a_placeholder_and_a_pending_request() {
        let mut fixture = Fixture::new();
        fixture.session.location = Some("Sunken Vault".into());
        fixture.dispatch("INVENTORY_ADD[Whispering Plate]");

        let placeholder = &fixture.session.catalog[0];
        assert!(placeholder.placeholder);
        assert!(placeholder.armor.is_some());
        assert_eq!(fixture.session.inventory[0].item_id, placeholder.id);
        assert_eq!(fixture.session.pending_items.len(), 1);
        assert_eq!(fixture.session.pending_items[0].context, "Sunken Vault");
    }

    #[test]
    fn equip_recomputes_armor_class_and_swaps_armor() {
        let mut fixture = Fixture::new();
        // DEX 14 unarmored
        fixture.character.armor_class = 12;
        fixture.dispatch("INVENTORY_ADD[Chain Mail] INVENTORY_ADD[Leather Armor] INVENTORY_ADD[Shield] EQUIP[Chain Mail] EQUIP[Shield]");
        assert_eq!(fixture.character.armor_class, 18);

        fixture.dispatch("INVENTORY_ADD[Chain Mail] INVENTORY_ADD[Leather Armor] INVENTORY_ADD[Shield] EQUIP[Chain Mail] EQUIP[Shield] EQUIP[Leather Armor]");
        let chain = fixture.session.find_slot_index("chain mail").unwrap();
        assert!(!fixture.session.inventory[chain].equipped);
        // 11 + 2 + 2
        assert_eq!(fixture.character.armor_class, 15);
    }

    #[test]
    fn equip_twice_is_a_no_op_and_unequip_removes_modifiers() {
        let mut fixture = Fixture::new();
        let text = "INVENTORY_ADD[Ring of Protection] EQUIP[Ring of Protection] EQUIP[ring of protection]";
        fixture.dispatch(text);
        assert_eq!(fixture.character.modifiers.total(ModifierTarget::ArmorClass), 1);
        assert_eq!(fixture.character.armor_class, 13);

        fixture.dispatch(&format!("{} UNEQUIP[Ring of Protection]", text));
        assert!(fixture.character.modifiers.is_empty());
        assert_eq!(fixture.character.armor_class, 12);
    }

    #[test]
    fn removing_last_equipped_unit_unequips_first() {
        let mut fixture = Fixture::new();
        let text = "INVENTORY_ADD[Cloak of Protection] EQUIP[Cloak of Protection]";
        fixture.dispatch(text);
        fixture.dispatch(&format!("{} INVENTORY_REMOVE[Cloak of Protection]", text));

        assert!(fixture.session.inventory.is_empty());
        assert!(fixture.character.modifiers.is_empty());
        assert_eq!(fixture.character.armor_class, 12);
    }

    #[test]
    fn gold_clamps_at_zero_and_rounds() {
        let mut fixture = Fixture::new();
        fixture.dispatch("GOLD[10] GOLD[-2.875]");
        assert_eq!(fixture.session.currency, 7.13);

        fixture.dispatch("GOLD[10] GOLD[-2.875] GOLD[-100]");
        assert_eq!(fixture.session.currency, 0.0);
    }

    #[test]
    fn buy_is_refused_without_enough_gold() {
        let mut fixture = Fixture::new();
        fixture.session.currency = 10.0;

        let notifications = fixture.dispatch("BUY[Longsword|15]");
        assert_eq!(notifications[0].kind, NotificationKind::Refusal);
        assert!(fixture.session.inventory.is_empty());
        assert_eq!(fixture.session.currency, 10.0);

        fixture.dispatch("BUY[Longsword|15] BUY[Rope|1.5|2]");
        assert_eq!(fixture.session.currency, 8.5);
        assert_eq!(fixture.session.inventory[0].quantity, 2);
    }

    #[test]
    fn use_item_reports_missing_and_unusable_items() {
        let mut fixture = Fixture::new();
        let notifications = fixture.dispatch("USE_ITEM[Healing Potion] INVENTORY_ADD[Rope] USE_ITEM[Rope]");

        assert_eq!(notifications.len(), 2);
        assert!(notifications
            .iter()
            .all(|n| n.kind == NotificationKind::Refusal));
        assert_eq!(notifications[1].message, "Rope cannot be used");
        assert_eq!(fixture.session.inventory[0].quantity, 1);
    }

    #[test]
    fn status_conditions_dedupe_ignoring_case_and_keep_notes() {
        let mut fixture = Fixture::new();
        fixture.dispatch("STATUS_ADD[Blessed|ROLL[1d4]] STATUS_ADD[blessed] STATUS_ADD[Poisoned]");
        assert_eq!(fixture.session.conditions.len(), 2);
        assert_eq!(fixture.session.conditions[0].note.as_deref(), Some("ROLL[1d4]"));

        fixture.dispatch("STATUS_ADD[Blessed|ROLL[1d4]] STATUS_ADD[blessed] STATUS_ADD[Poisoned] STATUS_REMOVE[POISONED]");
        assert_eq!(fixture.session.conditions.len(), 1);
    }
}
