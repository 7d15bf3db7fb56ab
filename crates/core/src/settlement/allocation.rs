//! Deterministic allocation of funds against open bills.
//!
//! "On Account" payments sweep a party's open bills oldest-first: each bill
//! is paid fully or partially in creation order until the funds run out.
//! No bill skipping, no largest-first heuristics. "Agst Ref" payments target
//! a single bill and are capped at that bill's remaining due.

use rust_decimal::Decimal;
use uuid::Uuid;

use khata_shared::types::round2;

/// A bill with an outstanding due, candidate for allocation.
///
/// Callers supply these in ascending creation order; the allocator preserves
/// that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBill {
    /// Bill identifier (a sale ID or a supplier ledger row ID).
    pub id: Uuid,
    /// Remaining amount due on the bill.
    pub amount_due: Decimal,
}

/// The amount applied to one bill by an allocation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillApplication {
    /// The bill the funds were applied to.
    pub bill_id: Uuid,
    /// Amount applied (never exceeds the bill's due).
    pub applied: Decimal,
    /// Due remaining on the bill after application.
    pub remaining_due: Decimal,
}

/// Allocates `amount` against `bills` oldest-first.
///
/// Bills with a non-positive due are skipped (already settled). Returns one
/// application per bill touched; bills after the point of exhaustion are
/// never touched. The sum of applied amounts never exceeds `amount`.
#[must_use]
pub fn allocate_oldest_first(amount: Decimal, bills: &[OpenBill]) -> Vec<BillApplication> {
    let mut remaining = round2(amount);
    let mut applications = Vec::new();

    for bill in bills {
        if remaining <= Decimal::ZERO {
            break;
        }
        let due = round2(bill.amount_due);
        if due <= Decimal::ZERO {
            continue;
        }

        let applied = remaining.min(due);
        remaining -= applied;
        applications.push(BillApplication {
            bill_id: bill.id,
            applied,
            remaining_due: due - applied,
        });
    }

    applications
}

/// Caps a targeted ("Agst Ref") payment at the referenced bill's due.
///
/// The excess beyond the bill's due is discarded by the engine — it is not
/// swept on-account and not refunded. See DESIGN.md Open Questions.
#[must_use]
pub fn cap_against_bill(amount: Decimal, amount_due: Decimal) -> Decimal {
    round2(amount).min(round2(amount_due)).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn bill(due: Decimal) -> OpenBill {
        OpenBill {
            id: Uuid::new_v4(),
            amount_due: due,
        }
    }

    #[test]
    fn test_oldest_first_sweep() {
        // B1 (due 100, oldest), B2 (due 50, newer), payment 120:
        // B1 fully settled, B2 partially settled at 30 due.
        let bills = vec![bill(dec!(100)), bill(dec!(50)), bill(dec!(75))];
        let apps = allocate_oldest_first(dec!(120), &bills);

        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].bill_id, bills[0].id);
        assert_eq!(apps[0].applied, dec!(100));
        assert_eq!(apps[0].remaining_due, dec!(0));
        assert_eq!(apps[1].bill_id, bills[1].id);
        assert_eq!(apps[1].applied, dec!(20));
        assert_eq!(apps[1].remaining_due, dec!(30));
        // The bill created after B2 is never touched.
    }

    #[test]
    fn test_exact_exhaustion_stops() {
        let bills = vec![bill(dec!(40)), bill(dec!(60))];
        let apps = allocate_oldest_first(dec!(40), &bills);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].applied, dec!(40));
    }

    #[test]
    fn test_settled_bills_are_skipped() {
        let bills = vec![bill(dec!(0)), bill(dec!(25))];
        let apps = allocate_oldest_first(dec!(10), &bills);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].bill_id, bills[1].id);
        assert_eq!(apps[0].applied, dec!(10));
        assert_eq!(apps[0].remaining_due, dec!(15));
    }

    #[test]
    fn test_no_bills_no_applications() {
        assert!(allocate_oldest_first(dec!(100), &[]).is_empty());
    }

    #[test]
    fn test_cap_against_bill() {
        assert_eq!(cap_against_bill(dec!(500), dec!(354)), dec!(354));
        assert_eq!(cap_against_bill(dec!(200), dec!(354)), dec!(200));
        assert_eq!(cap_against_bill(dec!(354), dec!(354)), dec!(354));
        assert_eq!(cap_against_bill(dec!(10), dec!(0)), dec!(0));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn bills_strategy() -> impl Strategy<Value = Vec<OpenBill>> {
        prop::collection::vec(amount_strategy().prop_map(bill), 0..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Conservation: the allocator never applies more than the payment.
        #[test]
        fn prop_conservation(amount in amount_strategy(), bills in bills_strategy()) {
            let apps = allocate_oldest_first(amount, &bills);
            let total: Decimal = apps.iter().map(|a| a.applied).sum();
            prop_assert!(total <= amount);
        }

        /// No bill is ever driven negative.
        #[test]
        fn prop_no_overpayment(amount in amount_strategy(), bills in bills_strategy()) {
            let apps = allocate_oldest_first(amount, &bills);
            for app in &apps {
                let due = bills.iter().find(|b| b.id == app.bill_id).unwrap().amount_due;
                prop_assert!(app.applied <= due);
                prop_assert!(app.remaining_due >= Decimal::ZERO);
                prop_assert_eq!(app.applied + app.remaining_due, due);
            }
        }

        /// Order preservation: applications follow bill order, and every
        /// application except possibly the last settles its bill in full.
        #[test]
        fn prop_greedy_prefix(amount in amount_strategy(), bills in bills_strategy()) {
            let apps = allocate_oldest_first(amount, &bills);
            let order: Vec<Uuid> = bills
                .iter()
                .filter(|b| b.amount_due > Decimal::ZERO)
                .map(|b| b.id)
                .collect();
            for (i, app) in apps.iter().enumerate() {
                prop_assert_eq!(app.bill_id, order[i]);
                if i + 1 < apps.len() {
                    prop_assert_eq!(app.remaining_due, Decimal::ZERO);
                }
            }
        }

        /// Funds are exhausted before any open bill is left untouched.
        #[test]
        fn prop_exhaustive_before_skipping(amount in amount_strategy(), bills in bills_strategy()) {
            let apps = allocate_oldest_first(amount, &bills);
            let applied: Decimal = apps.iter().map(|a| a.applied).sum();
            let open_count = bills.iter().filter(|b| b.amount_due > Decimal::ZERO).count();
            if apps.len() < open_count {
                // Some open bill went unpaid, so the payment must be used up.
                prop_assert_eq!(applied, round2(amount));
            }
        }
    }
}
