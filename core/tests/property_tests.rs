//! Property-based tests for collection matching.
//!
//! Collections are generated from a random type (one to three tokens) and a
//! random sequence of element counts, so sibling sub-collections may differ
//! in size while every leaf stays at the same depth.

use collection_match_core::{
    CollectionTypeDescriptionFactory, CollectionsToMatch, DatasetCollection, DatasetRef,
    MatchingCollections, get_structure,
};
use proptest::prelude::*;

/// Builds a regular collection of the given type, taking element counts from
/// `counts` in depth-first order.
fn build(tokens: &[&str], counts: &[usize], cursor: &mut usize) -> DatasetCollection {
    let mut collection = DatasetCollection::new(tokens.join(":"));
    let count = counts[*cursor % counts.len()];
    *cursor += 1;

    for i in 0..count {
        let identifier = format!("element{i}");
        collection = if tokens.len() == 1 {
            collection.with_dataset(&identifier, DatasetRef::new(format!("{cursor}-{i}")))
        } else {
            collection.with_collection(&identifier, build(&tokens[1..], counts, cursor))
        };
    }
    collection
}

fn collection_strategy() -> impl Strategy<Value = DatasetCollection> {
    (
        prop::collection::vec(prop::sample::select(vec!["list", "paired", "record"]), 1..=3),
        prop::collection::vec(0usize..4, 1..32),
    )
        .prop_map(|(tokens, counts)| build(&tokens, &counts, &mut 0))
}

proptest! {
    #[test]
    fn matching_a_collection_with_itself_succeeds(collection in collection_strategy()) {
        let factory = CollectionTypeDescriptionFactory::default();
        let mut to_match = CollectionsToMatch::new();
        to_match.add("a", &collection, None).add("b", &collection, None);

        let matched = MatchingCollections::for_collections(&to_match, &factory).unwrap();
        let description = factory.for_collection_type(&collection.collection_type).unwrap();
        let expected = get_structure(&collection, &description, None).unwrap();

        prop_assert_eq!(matched.structure(), &expected);
        prop_assert_eq!(matched.slices().unwrap().len(), expected.leaf_paths().len());
    }

    #[test]
    fn projected_collection_matches_flat_outer_level(collection in collection_strategy()) {
        let factory = CollectionTypeDescriptionFactory::default();
        let description = factory.for_collection_type(&collection.collection_type).unwrap();
        prop_assume!(description.has_subcollections());

        let subtype = description.child_description().unwrap();
        let flat = (0..collection.len()).fold(
            DatasetCollection::new(description.root_token()),
            |c, i| c.with_dataset(&format!("flat{i}"), DatasetRef::new(i.to_string())),
        );

        let mut to_match = CollectionsToMatch::new();
        to_match.add("nested", &collection, Some(subtype));
        to_match.add("flat", &flat, None);

        let matched = MatchingCollections::for_collections(&to_match, &factory).unwrap();
        prop_assert_eq!(matched.structure().children().len(), collection.len());
        prop_assert!(matched.structure().children().iter().all(|(_, c)| c.is_leaf()));
    }
}
