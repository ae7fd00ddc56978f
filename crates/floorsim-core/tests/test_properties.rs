//! Property tests for geometry, shelves and load batches.

use floorsim_core::prelude::*;
use floorsim_core::systems::change_storage_load;
use proptest::prelude::*;

fn ref_type() -> impl Strategy<Value = RefPointType> {
    prop_oneof![Just(RefPointType::Center), Just(RefPointType::Corner)]
}

proptest! {
    #[test]
    fn record_round_trip_is_stable(
        length in 0.01f64..50.0,
        width in 0.01f64..50.0,
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        rt in ref_type(),
    ) {
        let shape = Shape::rectangle(length, width, Position::new(x, y), rt).unwrap();
        let record = shape.record();
        let rebuilt = Shape::from_record(&record).unwrap();
        prop_assert_eq!(rebuilt.record(), record);
        prop_assert_eq!(rebuilt.description(), shape.description());
    }

    #[test]
    fn far_apart_rectangles_do_not_interfere(
        l1 in 0.1f64..10.0, w1 in 0.1f64..10.0,
        l2 in 0.1f64..10.0, w2 in 0.1f64..10.0,
        angle in 0.0f64..std::f64::consts::TAU,
        extra in 0.01f64..20.0,
    ) {
        let a = Shape::rectangle(l1, w1, Position::ORIGIN, RefPointType::Center).unwrap();
        let half_diagonals = (l1.hypot(w1) + l2.hypot(w2)) / 2.0;
        let d = half_diagonals + extra;
        let center = Position::new(d * angle.cos(), d * angle.sin());
        let b = Shape::rectangle(l2, w2, center, RefPointType::Center).unwrap();
        prop_assert!(!a.interferes(&b));
        prop_assert!(!b.interferes(&a));
        prop_assert!(a.interferes(&a.clone()));
    }

    #[test]
    fn negative_entry_leaves_loads_untouched(
        amounts in prop::collection::vec(0.0f64..5.0, 0..6),
        negative in -50.0f64..-0.001,
        insert_at in 0usize..6,
    ) {
        let mut storage = Storage::new();
        for (i, x) in [2.0, 5.0, 8.0].into_iter().enumerate() {
            let (front, back) = (Position::new(x, 2.0), Position::new(x, 3.0));
            let unit = StorageUnit::new(format!("S{}", i), front, back, 1.0, 100.0)
                .unwrap()
                .with_load(10.0)
                .unwrap();
            storage.add(unit, None, None).unwrap();
        }
        let mut entries: Vec<LoadEntry> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| LoadEntry::new(format!("S{}", i % 3), LoadAction::Load, *a))
            .collect();
        let at = insert_at.min(entries.len());
        entries.insert(at, LoadEntry::new("S1", LoadAction::Unload, negative));

        let outcome = change_storage_load(&mut storage, &entries, true);
        prop_assert!(!outcome.success);
        prop_assert!(storage.iter().all(|s| s.load() == 10.0));
    }

    #[test]
    fn shelf_load_sequence_stays_in_bounds(
        ops in prop::collection::vec((any::<bool>(), 0u32..40), 0..30),
    ) {
        let mut unit =
            StorageUnit::new("S", Position::ORIGIN, Position::ORIGIN, 1.0, 100.0).unwrap();
        let mut expected = 0.0f64;
        for (load, amount) in ops {
            let amount = f64::from(amount);
            let before = unit.load();
            if load {
                let result = unit.apply_load(amount);
                if expected + amount > 100.0 {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(unit.load(), before);
                } else {
                    prop_assert!(result.is_ok());
                    expected += amount;
                }
            } else {
                let result = unit.apply_unload(amount);
                if expected - amount < 0.0 {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(unit.load(), before);
                } else {
                    prop_assert!(result.is_ok());
                    expected -= amount;
                }
            }
            prop_assert_eq!(unit.load(), expected);
        }
    }
}
