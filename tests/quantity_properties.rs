use kube_requests::{Quantity, ResourceMap};
use proptest::prelude::*;

const SUFFIXES: [&str; 17] = [
    "", "n", "u", "m", "k", "M", "G", "T", "Ki", "Mi", "Gi", "Ti", "e3", "e-3", "E6", "e0", "P",
];

fn quantity_text() -> impl Strategy<Value = String> {
    (0u32..1_000_000, 0usize..SUFFIXES.len(), prop::option::of(0u32..1000))
        .prop_map(|(whole, suffix, fraction)| match fraction {
            Some(fraction) => format!("{whole}.{fraction}{}", SUFFIXES[suffix]),
            None => format!("{whole}{}", SUFFIXES[suffix]),
        })
}

fn resource_map() -> impl Strategy<Value = ResourceMap> {
    prop::collection::vec(
        (prop::sample::select(vec!["cpu", "memory", "nvidia.com/gpu"]), quantity_text()),
        0..4,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, text)| (name.to_string(), Quantity::parse(&text).unwrap()))
            .collect()
    })
}

proptest! {
    #[test]
    fn canonical_text_round_trips(text in quantity_text()) {
        let quantity = Quantity::parse(&text).unwrap();
        let reparsed = Quantity::parse(&quantity.to_string()).unwrap();
        prop_assert_eq!(&reparsed, &quantity);
        prop_assert_eq!(reparsed.to_string(), quantity.to_string());
    }

    #[test]
    fn multiply_matches_repeated_addition(text in quantity_text(), factor in 0u64..20) {
        let quantity = Quantity::parse(&text).unwrap();
        let mut repeated = Quantity::zero();
        for _ in 0..factor {
            repeated = repeated.checked_add(&quantity).unwrap();
        }
        prop_assert_eq!(quantity.multiply_by_factor(factor).unwrap(), repeated);
    }

    #[test]
    fn addition_is_commutative(a in quantity_text(), b in quantity_text()) {
        let a = Quantity::parse(&a).unwrap();
        let b = Quantity::parse(&b).unwrap();
        prop_assert_eq!(a.checked_add(&b).unwrap(), b.checked_add(&a).unwrap());
    }

    #[test]
    fn map_sum_is_associative_and_commutative(
        a in resource_map(),
        b in resource_map(),
        c in resource_map(),
    ) {
        let left = ResourceMap::sum([&ResourceMap::sum([&a, &b]).unwrap(), &c]).unwrap();
        let right = ResourceMap::sum([&a, &ResourceMap::sum([&b, &c]).unwrap()]).unwrap();
        let flat = ResourceMap::sum([&c, &b, &a]).unwrap();
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(&left, &flat);
    }

    #[test]
    fn scaled_value_rounds_up(text in quantity_text()) {
        let quantity = Quantity::parse(&text).unwrap();
        let milli = quantity.milli_value();
        let milli_text = format!("{milli}m");
        prop_assert!(Quantity::parse(&milli_text).unwrap() >= quantity);
    }
}
