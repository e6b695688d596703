//! Variant reconciler: keep operator input across regeneration.
//!
//! Regenerating combinations after an attribute edit must not wipe the price, stock
//! or SKU already typed in for combinations that still exist.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::attribute::VariantAttributeMap;
use crate::variant::Variant;

/// Combinations the operator removed from the working table during this session.
///
/// Membership is by attribute-map equality. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeletedCombinationSet(BTreeSet<VariantAttributeMap>);

impl DeletedCombinationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the combination was already deleted.
    pub fn insert(&mut self, combination: VariantAttributeMap) -> bool {
        self.0.insert(combination)
    }

    /// Returns `false` if the combination was not deleted.
    pub fn remove(&mut self, combination: &VariantAttributeMap) -> bool {
        self.0.remove(combination)
    }

    pub fn contains(&self, combination: &VariantAttributeMap) -> bool {
        self.0.contains(combination)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantAttributeMap> {
        self.0.iter()
    }
}

impl FromIterator<VariantAttributeMap> for DeletedCombinationSet {
    fn from_iter<T: IntoIterator<Item = VariantAttributeMap>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Merge freshly generated combinations with the current variant list.
///
/// - deleted combinations are dropped
/// - combinations matching a current variant keep its `id`, `price`, `stock`, `sku`
///   (the first match wins if `current` repeats a map)
/// - a combination that only extends a current variant's map with new groups (an
///   attribute group was added) inherits that variant's `price`; the most specific
///   such variant wins. Stock, SKU and id stay at their defaults
/// - other new combinations start at zero with an empty SKU and no id
/// - repeated generated maps are emitted once, in first-seen position
///
/// Output order follows `generated`.
pub fn reconcile_variants(
    generated: &[VariantAttributeMap],
    current: &[Variant],
    deleted: &DeletedCombinationSet,
) -> Vec<Variant> {
    let mut existing: HashMap<&VariantAttributeMap, &Variant> =
        HashMap::with_capacity(current.len());
    for variant in current {
        existing.entry(&variant.attributes).or_insert(variant);
    }

    let mut emitted: HashSet<&VariantAttributeMap> = HashSet::with_capacity(generated.len());
    let mut out = Vec::with_capacity(generated.len());

    for combination in generated {
        if deleted.contains(combination) || !emitted.insert(combination) {
            continue;
        }
        let variant = match existing.get(combination) {
            Some(prev) => (*prev).clone(),
            None => match closest_ancestor(combination, current) {
                Some(prev) => {
                    let mut variant = Variant::new(combination.clone());
                    variant.price = prev.price;
                    variant
                }
                None => Variant::new(combination.clone()),
            },
        };
        out.push(variant);
    }

    out
}

fn closest_ancestor<'a>(
    combination: &VariantAttributeMap,
    current: &'a [Variant],
) -> Option<&'a Variant> {
    let mut best: Option<&Variant> = None;
    for variant in current {
        if !variant.attributes.is_strict_subset_of(combination) {
            continue;
        }
        if best.is_none_or(|b| variant.attributes.len() > b.attributes.len()) {
            best = Some(variant);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeGroup;
    use crate::combination::generate_combinations;
    use storefront_core::VariantId;

    fn map(pairs: &[(&str, &str)]) -> VariantAttributeMap {
        pairs.iter().copied().collect()
    }

    fn priced(attributes: VariantAttributeMap, price: u64, stock: u64, sku: &str) -> Variant {
        Variant {
            id: None,
            attributes,
            price,
            stock,
            sku: sku.to_string(),
        }
    }

    #[test]
    fn new_combinations_start_at_defaults() {
        let generated = vec![map(&[("Size", "M")])];
        let out = reconcile_variants(&generated, &[], &DeletedCombinationSet::new());
        assert_eq!(out, vec![Variant::new(map(&[("Size", "M")]))]);
        assert_eq!(out[0].price, 0);
        assert_eq!(out[0].stock, 0);
        assert_eq!(out[0].sku, "");
        assert!(out[0].id.is_none());
    }

    #[test]
    fn existing_data_is_carried_over_including_id() {
        let id = VariantId::new();
        let mut current = priced(map(&[("Size", "M")]), 120_000, 5, "SKU-M");
        current.id = Some(id);

        let generated = vec![map(&[("Size", "S")]), map(&[("Size", "M")])];
        let out = reconcile_variants(
            &generated,
            std::slice::from_ref(&current),
            &DeletedCombinationSet::new(),
        );

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Variant::new(map(&[("Size", "S")])));
        assert_eq!(out[1], current);
    }

    #[test]
    fn deleted_combinations_are_excluded() {
        let generated = vec![map(&[("Size", "M")]), map(&[("Size", "L")])];
        let deleted: DeletedCombinationSet = [map(&[("Size", "L")])].into_iter().collect();
        let out = reconcile_variants(&generated, &[], &deleted);
        assert_eq!(out, vec![Variant::new(map(&[("Size", "M")]))]);
    }

    #[test]
    fn repeated_generated_maps_are_emitted_once() {
        let generated = vec![map(&[("Size", "M")]), map(&[("Size", "M")])];
        let out = reconcile_variants(&generated, &[], &DeletedCombinationSet::new());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn adding_a_group_keeps_prices_for_extended_combinations() {
        let mut groups = vec![
            AttributeGroup::new("Màu sắc", ["Đỏ", "Xanh"]),
            AttributeGroup::new("Size", ["M", "L"]),
        ];
        let deleted = DeletedCombinationSet::new();
        let mut variants = reconcile_variants(&generate_combinations(&groups), &[], &deleted);
        assert_eq!(variants[0].attributes, map(&[("Màu sắc", "Đỏ"), ("Size", "M")]));
        variants[0].price = 100_000;
        variants[0].id = Some(VariantId::new());

        groups.push(AttributeGroup::new("Material", ["Cotton"]));
        let out = reconcile_variants(&generate_combinations(&groups), &variants, &deleted);

        assert_eq!(out.len(), 4);
        let red_m = out
            .iter()
            .find(|v| {
                v.attributes == map(&[("Màu sắc", "Đỏ"), ("Size", "M"), ("Material", "Cotton")])
            })
            .unwrap();
        assert_eq!(red_m.price, 100_000);
        assert!(red_m.id.is_none());
        assert!(
            out.iter()
                .filter(|v| v.attributes != red_m.attributes)
                .all(|v| v.price == 0)
        );
    }

    #[test]
    fn extended_combinations_do_not_inherit_stock_or_sku() {
        let mut parent = priced(map(&[("Màu sắc", "Đỏ")]), 100_000, 3, "DO");
        parent.id = Some(VariantId::new());
        let groups = vec![
            AttributeGroup::new("Màu sắc", ["Đỏ"]),
            AttributeGroup::new("Size", ["M", "L", "XL"]),
        ];

        let out = reconcile_variants(
            &generate_combinations(&groups),
            &[parent],
            &DeletedCombinationSet::new(),
        );

        assert_eq!(out.len(), 3);
        for child in &out {
            assert_eq!(child.price, 100_000);
            assert_eq!(child.stock, 0);
            assert_eq!(child.sku, "");
            assert!(child.id.is_none());
        }
    }

    #[test]
    fn adding_a_value_keeps_untouched_combinations() {
        let mut groups = vec![
            AttributeGroup::new("Màu sắc", ["Đỏ", "Xanh"]),
            AttributeGroup::new("Size", ["M", "L"]),
        ];
        let deleted = DeletedCombinationSet::new();
        let mut variants = reconcile_variants(&generate_combinations(&groups), &[], &deleted);
        variants[3].price = 250_000;
        variants[3].stock = 7;
        variants[3].sku = "L-BLUE".to_string();

        groups[1].add_value("XL").unwrap();
        let out = reconcile_variants(&generate_combinations(&groups), &variants, &deleted);

        assert_eq!(out.len(), 6);
        let blue_l = out
            .iter()
            .find(|v| v.attributes == map(&[("Màu sắc", "Xanh"), ("Size", "L")]))
            .unwrap();
        assert_eq!(blue_l, &variants[3]);
    }

    #[test]
    fn most_specific_ancestor_wins() {
        let current = vec![
            priced(map(&[("Color", "Red")]), 10, 1, "R"),
            priced(map(&[("Color", "Red"), ("Size", "M")]), 20, 2, "RM"),
        ];
        let generated = vec![map(&[("Color", "Red"), ("Size", "M"), ("Fit", "Slim")])];
        let out = reconcile_variants(&generated, &current, &DeletedCombinationSet::new());
        assert_eq!(out[0].price, 20);
        assert_eq!(out[0].stock, 0);
        assert_eq!(out[0].sku, "");
    }

    #[test]
    fn deleted_combination_stays_deleted_after_value_added() {
        let mut groups = vec![
            AttributeGroup::new("Màu sắc", ["Đỏ", "Xanh"]),
            AttributeGroup::new("Size", ["M", "L"]),
        ];
        let mut deleted = DeletedCombinationSet::new();
        deleted.insert(map(&[("Màu sắc", "Xanh"), ("Size", "L")]));

        let variants = reconcile_variants(&generate_combinations(&groups), &[], &deleted);
        assert_eq!(variants.len(), 3);

        groups[1].add_value("XL").unwrap();
        let out = reconcile_variants(&generate_combinations(&groups), &variants, &deleted);
        assert_eq!(out.len(), 5);
        assert!(!out.iter().any(|v| deleted.contains(&v.attributes)));
        let blue_xl = map(&[("Màu sắc", "Xanh"), ("Size", "XL")]);
        assert!(out.iter().any(|v| v.attributes == blue_xl));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn groups_strategy() -> impl Strategy<Value = Vec<AttributeGroup>> {
            prop::collection::vec(prop::collection::hash_set("[a-d]", 1..4), 1..4).prop_map(
                |sets| {
                    sets.into_iter()
                        .enumerate()
                        .map(|(i, values)| AttributeGroup::new(format!("attr{i}"), values))
                        .collect()
                },
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: deleted combinations never reappear, however often we regenerate.
            #[test]
            fn deleted_never_reappear(
                groups in groups_strategy(),
                picks in prop::collection::vec(any::<prop::sample::Index>(), 0..4),
                rounds in 1usize..4,
            ) {
                let generated = generate_combinations(&groups);
                let deleted: DeletedCombinationSet =
                    picks.iter().map(|i| i.get(&generated).clone()).collect();

                let mut variants = Vec::new();
                for _ in 0..rounds {
                    variants = reconcile_variants(&generated, &variants, &deleted);
                    prop_assert!(variants.iter().all(|v| !deleted.contains(&v.attributes)));
                }
            }

            /// Property: surviving combinations keep their data after a value is added.
            #[test]
            fn data_survives_regeneration(
                groups in groups_strategy(),
                price in 1u64..1_000_000,
                stock in 1u64..1000,
            ) {
                let deleted = DeletedCombinationSet::new();
                let mut variants =
                    reconcile_variants(&generate_combinations(&groups), &[], &deleted);
                for (i, v) in variants.iter_mut().enumerate() {
                    v.price = price + i as u64;
                    v.stock = stock;
                    v.sku = format!("SKU-{i}");
                    v.id = Some(VariantId::new());
                }

                let mut extended = groups.clone();
                extended[0] = AttributeGroup::new(
                    groups[0].name(),
                    groups[0].values().iter().cloned().chain(["zz".to_string()]),
                );
                let out =
                    reconcile_variants(&generate_combinations(&extended), &variants, &deleted);

                for before in &variants {
                    let after = out.iter().find(|v| v.attributes == before.attributes);
                    prop_assert_eq!(after, Some(before));
                }
                for fresh in out.iter().filter(|v| v.attributes.get("attr0") == Some("zz")) {
                    prop_assert_eq!(fresh, &Variant::new(fresh.attributes.clone()));
                }
            }
        }
    }
}
