//! Property-based tests for the production derivation rules.
//!
//! These use proptest to verify invariants across a wide range of quantities,
//! catching boundary cases that example-based tests might miss.

use plantops_api::services::production::ProductionStatus;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    // Mantissa with up to four decimal places, the storage scale.
    (0i64..10_000_000, 0u32..=4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn positive_quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000, 0u32..=4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn waste_is_never_negative(extruded in quantity_strategy(), produced in quantity_strategy()) {
        let waste = (extruded - produced).max(Decimal::ZERO);
        prop_assert!(waste >= Decimal::ZERO);
    }

    #[test]
    fn waste_plus_produced_covers_extruded(extruded in quantity_strategy(), produced in quantity_strategy()) {
        let waste = (extruded - produced).max(Decimal::ZERO);
        prop_assert!(produced + waste >= extruded);
    }
}

proptest! {
    #[test]
    fn zero_produced_is_always_not_started(ordered in quantity_strategy()) {
        prop_assert_eq!(
            ProductionStatus::derive(Decimal::ZERO, ordered),
            ProductionStatus::NotStarted
        );
    }

    #[test]
    fn derive_matches_the_ordering_of_produced_and_ordered(
        produced in positive_quantity_strategy(),
        ordered in positive_quantity_strategy(),
    ) {
        let status = ProductionStatus::derive(produced, ordered);
        let expected = match produced.cmp(&ordered) {
            std::cmp::Ordering::Less => ProductionStatus::InProgress,
            std::cmp::Ordering::Equal => ProductionStatus::Completed,
            std::cmp::Ordering::Greater => ProductionStatus::Overproduced,
        };
        prop_assert_eq!(status, expected);
    }

    #[test]
    fn derive_is_scale_insensitive(mantissa in 1i64..1_000_000) {
        // 5 and 5.0000 are the same quantity and must derive the same status.
        let coarse = Decimal::new(mantissa, 0);
        let fine = Decimal::new(mantissa * 10_000, 4);
        prop_assert_eq!(
            ProductionStatus::derive(coarse, fine),
            ProductionStatus::Completed
        );
    }
}

proptest! {
    #[test]
    fn status_labels_are_stable(produced in quantity_strategy(), ordered in quantity_strategy()) {
        let label = ProductionStatus::derive(produced, ordered).to_string();
        prop_assert!(
            ["Not Started", "In Progress", "Completed", "Overproduced"].contains(&label.as_str())
        );
    }
}
