use collection_match_core::{
    CollectionTypeDescription, CollectionTypeDescriptionFactory, CollectionsToMatch,
    DatasetCollection, DatasetRef, MatchError, MatchingCollections, Structure, get_structure,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn factory() -> CollectionTypeDescriptionFactory {
    CollectionTypeDescriptionFactory::default()
}

fn description(collection_type: &str) -> CollectionTypeDescription {
    factory().for_collection_type(collection_type).unwrap()
}

fn pair_instance() -> DatasetCollection {
    DatasetCollection::new("paired")
        .with_dataset("left", DatasetRef::new("left"))
        .with_dataset("right", DatasetRef::new("right"))
}

fn list_instance(ids: &[&str]) -> DatasetCollection {
    ids.iter().fold(DatasetCollection::new("list"), |c, id| {
        c.with_dataset(id, DatasetRef::new(*id))
    })
}

fn list_paired_instance() -> DatasetCollection {
    DatasetCollection::new("list:paired")
        .with_collection("data1", pair_instance())
        .with_collection("data2", pair_instance())
        .with_collection("data3", pair_instance())
}

fn list_list_instance() -> DatasetCollection {
    DatasetCollection::new("list:list")
        .with_collection("outer1", list_instance(&["a", "b"]))
        .with_collection("outer2", list_instance(&["c", "d"]))
        .with_collection("outer3", list_instance(&["e", "f"]))
}

fn match_pair<'a>(
    a: (&'a DatasetCollection, Option<&str>),
    b: (&'a DatasetCollection, Option<&str>),
) -> Result<MatchingCollections<'a>, MatchError> {
    let f = factory();
    let mut to_match = CollectionsToMatch::new();
    to_match.add("input1", a.0, a.1.map(|s| f.for_collection_type(s).unwrap()));
    to_match.add("input2", b.0, b.1.map(|s| f.for_collection_type(s).unwrap()));
    MatchingCollections::for_collections(&to_match, &f)
}

fn assert_structure_mismatch(result: Result<MatchingCollections<'_>, MatchError>) {
    match result {
        Err(MatchError::CollectionStructureMismatch { .. }) => {}
        Err(other) => panic!("expected a structure mismatch, got {other:?}"),
        Ok(matched) => panic!("expected a structure mismatch, matched {}", matched.structure()),
    }
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_pairs_match() {
    let a = pair_instance();
    let b = pair_instance();

    let matched = match_pair((&a, None), (&b, None)).unwrap();
    let structure = matched.structure();
    assert_eq!(structure.children().len(), 2);
    assert_eq!(structure.children()[0].0, "left");
    assert!(structure.children()[0].1.is_leaf());
}

#[test]
fn test_lists_of_different_length_do_not_match() {
    let two = list_instance(&["data1", "data2"]);
    let three = list_instance(&["data1", "data2", "data3"]);

    assert_structure_mismatch(match_pair((&two, None), (&three, None)));
    assert_structure_mismatch(match_pair((&three, None), (&two, None)));
}

#[test]
fn test_get_structure_paired() {
    let structure = get_structure(&pair_instance(), &description("paired"), None).unwrap();
    assert_eq!(structure.children().len(), 2);
    assert_eq!(structure.children()[0], ("left".to_string(), Structure::Leaf));
}

#[test]
fn test_get_structure_list_paired_over_paired() {
    let structure = get_structure(
        &list_paired_instance(),
        &description("list:paired"),
        Some(&description("paired")),
    )
    .unwrap();

    assert_eq!(structure.collection_type(), Some(&description("list")));
    let identifiers: Vec<&str> = structure.children().iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(identifiers, vec!["data1", "data2", "data3"]);
    assert!(structure.children().iter().all(|(_, child)| child.is_leaf()));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_paired_never_matches_list() {
    let pair = pair_instance();
    let list = list_instance(&["forward", "reverse"]);

    for result in [
        match_pair((&pair, None), (&list, None)),
        match_pair((&list, None), (&pair, None)),
    ] {
        assert!(matches!(result, Err(MatchError::CollectionTypeMismatch { .. })));
    }
}

#[test]
fn test_equal_length_lists_match() {
    for ids in [&["x", "y"][..], &["x", "y", "z"][..]] {
        let a = list_instance(ids);
        let b = list_instance(ids);
        let matched = match_pair((&a, None), (&b, None)).unwrap();
        assert_eq!(matched.structure().children().len(), ids.len());
    }
}

#[test]
fn test_subcollection_projection() {
    let nested = list_paired_instance();
    let flat = list_instance(&["x", "y", "z"]);

    let matched = match_pair((&nested, Some("paired")), (&flat, None)).unwrap();
    assert_eq!(matched.collection_type(), &description("list"));

    let slices = matched.slices().unwrap();
    assert_eq!(slices.len(), 3);
    let bound = slices[1].bindings["input1"].as_collection().unwrap();
    assert_eq!(bound.collection_type, "paired");
    assert_eq!(slices[1].bindings["input2"].as_dataset().unwrap().id, "y");

    for result in [
        match_pair((&nested, None), (&flat, None)),
        match_pair((&flat, None), (&nested, None)),
    ] {
        assert!(matches!(result, Err(MatchError::CollectionTypeMismatch { .. })));
    }
}

#[test]
fn test_nested_consistency() {
    let nested = list_list_instance();

    let full = match_pair((&nested, None), (&nested, None)).unwrap();
    assert_eq!(full.structure().leaf_count(), 6);
    assert!(full.structure().children().iter().all(|(_, c)| !c.is_leaf()));

    let flat = list_instance(&["p", "q", "r"]);
    let projected = match_pair((&nested, Some("list")), (&flat, None)).unwrap();
    assert_eq!(projected.structure().children().len(), 3);
    assert!(projected.structure().children().iter().all(|(_, c)| c.is_leaf()));

    let too_short = list_instance(&["p", "q"]);
    assert_structure_mismatch(match_pair((&nested, Some("list")), (&too_short, None)));
}

#[test]
fn test_reflexive_match_reproduces_structure() {
    let nested = list_paired_instance();
    let matched = match_pair((&nested, None), (&nested, None)).unwrap();
    let expected = get_structure(&nested, &description("list:paired"), None).unwrap();
    assert_eq!(matched.structure(), &expected);
}

#[test]
fn test_empty_lists_match_with_no_slices() {
    let a = list_instance(&[]);
    let b = list_instance(&[]);
    let matched = match_pair((&a, None), (&b, None)).unwrap();
    assert!(matched.structure().children().is_empty());
    assert!(matched.slices().unwrap().is_empty());
}

#[test]
fn test_subcollection_type_must_be_proper_suffix() {
    let pair = pair_instance();
    let list = list_instance(&["a", "b"]);

    let err = match_pair((&pair, Some("paired")), (&list, None)).unwrap_err();
    assert_eq!(
        err,
        MatchError::SubcollectionTypeMismatch {
            name: "input1".to_string(),
            collection_type: "paired".to_string(),
            subcollection_type: "paired".to_string(),
        }
    );
}

#[test]
fn test_matching_is_independent_per_call() {
    let nested = list_paired_instance();
    let flat = list_instance(&["x", "y", "z"]);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| match_pair((&nested, Some("paired")), (&flat, None)).is_ok()))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
}
