//! Free-standing dice rolls requested by the narrator.

use chronicler_domain::{DiceFormula, Directive, DirectiveKind};

use crate::use_cases::dispatch::{DirectiveHandler, DispatchContext, NotificationKind, Outcome};

pub struct DiceRollHandler;

impl DirectiveHandler for DiceRollHandler {
    fn name(&self) -> &'static str {
        "dice_roll"
    }

    fn handles(&self, kind: DirectiveKind) -> bool {
        kind == DirectiveKind::Roll
    }

    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        let formula = match DiceFormula::parse(directive.field(0).unwrap_or_default()) {
            Ok(formula) => formula,
            Err(err) => {
                tracing::debug!(directive = %directive.raw, error = %err, "Roll skipped");
                return Outcome::Ignored;
            }
        };

        let mut roll = ctx.roller();
        let result = formula.roll_with(&mut roll);
        let message = match directive.field(1).map(str::trim) {
            Some(label) => format!("{}: {}", label, result.breakdown()),
            None => result.breakdown(),
        };
        tracing::info!(formula = %formula, total = result.total, "Dice rolled");
        ctx.notify(NotificationKind::Roll, message);
        Outcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use crate::infrastructure::clock::ScriptedRandom;
    use crate::use_cases::dispatch::testing::Fixture;
    use crate::use_cases::dispatch::NotificationKind;

    #[test]
    fn reports_total_and_breakdown_with_label() {
        let mut fixture = Fixture::new().with_random(ScriptedRandom::new([4, 6]));
        let notifications = fixture.dispatch("ROLL[2d6+3|Perception]");

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Roll);
        assert_eq!(notifications[0].message, "Perception: 2d6[4, 6] + 3 = 13");
    }

    #[test]
    fn shorthand_and_malformed_formulas() {
        let mut fixture = Fixture::new();
        let notifications = fixture.dispatch("ROLL[d20] ROLL[banana]");

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, "1d20[3] = 3");
    }

    #[test]
    fn huge_modifiers_saturate() {
        let mut fixture = Fixture::new();
        let notifications = fixture.dispatch("ROLL[1d4+2147483647]");
        assert_eq!(notifications[0].message, "1d4[3] + 2147483647 = 2147483647");
    }

    #[test]
    fn rolls_run_after_state_changing_handlers() {
        let mut fixture = Fixture::new();
        let notifications = fixture.dispatch("ROLL[1d4] GOLD[5]");
        assert_eq!(fixture.session.currency, 5.0);
        assert_eq!(notifications.len(), 1);
    }
}
