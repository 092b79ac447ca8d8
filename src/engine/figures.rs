//! The per-period figures every hierarchy level shares, and the ratios
//! derived from them.

use rust_decimal::Decimal;
use serde::Serialize;

/// Flows, position and realized result of one entity over one window.
///
/// Amounts are in the ledger's product scale (quantity x100 times price
/// x100). `balance` is `None` while the window is open or when no price is
/// known; `profit` is `None` when nothing was disposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodFigures {
    /// Whether the window had ended as of the engine's today
    pub closed: bool,
    pub input: Decimal,
    pub output: Decimal,
    pub disposed: bool,
    pub balance: Option<Decimal>,
    pub profit: Option<Decimal>,
}

impl PeriodFigures {
    /// Sum child figures into a parent. Absent children count as zero;
    /// the parent balance is absent only when the window is open, and the
    /// parent profit only when every child profit is absent.
    pub fn rollup<'a>(closed: bool, children: impl IntoIterator<Item = &'a PeriodFigures>) -> Self {
        let mut parent = PeriodFigures {
            closed,
            balance: closed.then_some(Decimal::ZERO),
            ..Default::default()
        };
        for child in children {
            parent.input += child.input;
            parent.output += child.output;
            parent.disposed |= child.disposed;
            if let (Some(total), Some(value)) = (parent.balance.as_mut(), child.balance) {
                *total += value;
            }
            parent.profit = add_optional(parent.profit, child.profit);
        }
        parent
    }

    /// Visibility predicate for reports
    pub fn show(&self) -> bool {
        self.input > Decimal::ZERO
            || self.output < Decimal::ZERO
            || self.balance.is_some_and(|b| b > Decimal::ZERO)
    }

    /// `balance - output`: what the entity is worth plus what it paid out
    fn gross_value(&self) -> Decimal {
        self.balance.unwrap_or_default() - self.output
    }
}

/// Sum two optional amounts; absent only when both are absent
pub fn add_optional(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or_default() + b.unwrap_or_default()),
    }
}

/// Return of a period over the capital at its start.
///
/// `(balance + (-output) - base) / base` with `base = previous_balance +
/// input`. Absent while the window is open, when there is neither a
/// non-negative balance nor a disposal, and when `base` is zero.
pub fn profitability(current: &PeriodFigures, previous_balance: Option<Decimal>) -> Option<Decimal> {
    if !current.closed {
        return None;
    }
    let has_balance = current.balance.is_some_and(|b| b >= Decimal::ZERO);
    if !has_balance && !current.disposed {
        return None;
    }
    let base = previous_balance.unwrap_or_default() + current.input;
    if base.is_zero() {
        return None;
    }
    Some((current.gross_value() - base) / base)
}

/// Share of `part` in `whole`, both measured as `balance - output`.
///
/// Absent while the window is open, when the part neither holds a positive
/// balance nor disposed anything, and when the whole is zero.
pub fn weight(part: &PeriodFigures, whole: &PeriodFigures) -> Option<Decimal> {
    if !part.closed {
        return None;
    }
    let holds = part.balance.is_some_and(|b| b > Decimal::ZERO);
    if !holds && !part.disposed {
        return None;
    }
    let denominator = whole.gross_value();
    if denominator.is_zero() {
        return None;
    }
    Some(part.gross_value() / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn figures(input: Decimal, output: Decimal, balance: Option<Decimal>) -> PeriodFigures {
        PeriodFigures {
            closed: true,
            input,
            output,
            disposed: output < Decimal::ZERO,
            balance,
            profit: None,
        }
    }

    #[test]
    fn test_rollup_treats_absent_as_zero() {
        let a = PeriodFigures {
            profit: Some(dec!(10)),
            ..figures(dec!(100), dec!(-20), Some(dec!(500)))
        };
        let b = figures(dec!(50), Decimal::ZERO, None);

        let parent = PeriodFigures::rollup(true, [&a, &b]);
        assert_eq!(parent.input, dec!(150));
        assert_eq!(parent.output, dec!(-20));
        assert_eq!(parent.balance, Some(dec!(500)));
        assert_eq!(parent.profit, Some(dec!(10)));
        assert!(parent.disposed);
    }

    #[test]
    fn test_rollup_of_open_window_has_no_balance() {
        let a = PeriodFigures {
            closed: false,
            ..figures(dec!(100), Decimal::ZERO, None)
        };
        let parent = PeriodFigures::rollup(false, [&a]);
        assert!(!parent.closed);
        assert_eq!(parent.balance, None);
        assert_eq!(parent.profit, None);
    }

    #[test]
    fn test_rollup_of_nothing_is_zero() {
        let parent = PeriodFigures::rollup(true, Vec::<&PeriodFigures>::new());
        assert_eq!(parent.balance, Some(Decimal::ZERO));
        assert_eq!(parent.input, Decimal::ZERO);
        assert!(!parent.show());
    }

    #[test]
    fn test_profitability_formula() {
        // 1000 at start, 100 added, now worth 1210 after paying out 0
        let current = figures(dec!(100), Decimal::ZERO, Some(dec!(1210)));
        assert_eq!(
            profitability(&current, Some(dec!(1000))),
            Some(dec!(0.1))
        );
    }

    #[test]
    fn test_profitability_guards() {
        let current = figures(Decimal::ZERO, Decimal::ZERO, Some(dec!(10)));
        // Zero base
        assert_eq!(profitability(&current, None), None);
        // Open window
        let open = PeriodFigures {
            closed: false,
            ..current.clone()
        };
        assert_eq!(profitability(&open, Some(dec!(5))), None);
        // No balance and no disposal
        let empty = figures(dec!(10), Decimal::ZERO, None);
        assert_eq!(profitability(&empty, Some(dec!(5))), None);
        // Disposal without balance still counts, balance read as zero
        let sold = figures(Decimal::ZERO, dec!(-120), None);
        assert_eq!(profitability(&sold, Some(dec!(100))), Some(dec!(0.2)));
    }

    #[test]
    fn test_weight_formula_and_guards() {
        let part = figures(Decimal::ZERO, dec!(-50), Some(dec!(150)));
        let whole = figures(Decimal::ZERO, dec!(-50), Some(dec!(750)));
        assert_eq!(weight(&part, &whole), Some(dec!(0.25)));

        let zero_whole = figures(Decimal::ZERO, Decimal::ZERO, Some(Decimal::ZERO));
        assert_eq!(weight(&part, &zero_whole), None);

        let open = PeriodFigures {
            closed: false,
            ..part.clone()
        };
        assert_eq!(weight(&open, &whole), None);

        let idle = figures(Decimal::ZERO, Decimal::ZERO, Some(Decimal::ZERO));
        assert_eq!(weight(&idle, &whole), None);
    }

    #[test]
    fn test_show() {
        assert!(figures(dec!(1), Decimal::ZERO, None).show());
        assert!(figures(Decimal::ZERO, dec!(-1), None).show());
        assert!(figures(Decimal::ZERO, Decimal::ZERO, Some(dec!(1))).show());
        assert!(!figures(Decimal::ZERO, Decimal::ZERO, Some(Decimal::ZERO)).show());
    }

    #[test]
    fn test_add_optional() {
        assert_eq!(add_optional(None, None), None);
        assert_eq!(add_optional(Some(dec!(1)), None), Some(dec!(1)));
        assert_eq!(add_optional(Some(dec!(1)), Some(dec!(2))), Some(dec!(3)));
    }
}
