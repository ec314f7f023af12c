//! End-to-end tests for the query engine.

use std::collections::BTreeSet;
use std::sync::Once;

use standout_sieve::{
    set_ops, ClauseValue, CompareType, Comparison, IndexSet, Logic, Number, PropertyMap, Query,
    QueryParameter, SieveError, SortedIndex, Timestamp, Value,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Contact {
    id: u32,
    name: String,
    city: Option<String>,
    age: i64,
    joined: Timestamp,
}

fn contact(id: u32, name: &str, city: Option<&str>, age: i64, joined_day: i64) -> Contact {
    Contact {
        id,
        name: name.to_string(),
        city: city.map(str::to_string),
        age,
        joined: Timestamp::from_days(joined_day),
    }
}

fn contacts() -> Vec<Contact> {
    vec![
        contact(1, "Ada Lovelace", Some("London"), 36, 100),
        contact(2, "alan turing", Some("london"), 41, 200),
        contact(3, "Grace Hopper", Some("New York"), 85, 300),
        contact(4, "Edsger Dijkstra", None, 72, 400),
        contact(5, "Barbara Liskov", Some("Los Angeles"), 84, 500),
        contact(6, "Donald Knuth", Some("Milwaukee"), 86, 600),
    ]
}

fn contact_props() -> PropertyMap<Contact> {
    let mut props = PropertyMap::<Contact>::new();
    props
        .register("id", |c| Value::Number(Number::from(c.id)))
        .unwrap()
        .register("name", |c| Value::String(&c.name))
        .unwrap()
        .register("city", |c| c.city.as_deref().map_or(Value::Missing, Value::String))
        .unwrap()
        .register("age", |c| Value::Number(Number::I64(c.age)))
        .unwrap()
        .register("joined", |c| Value::Timestamp(c.joined))
        .unwrap();
    props
}

fn ids(results: &[&Contact]) -> Vec<u32> {
    results.iter().map(|c| c.id).collect()
}

fn id_set(results: &[&Contact]) -> BTreeSet<u32> {
    results.iter().map(|c| c.id).collect()
}

fn numbers() -> Vec<i64> {
    (1..=10).collect()
}

fn number_props() -> PropertyMap<i64> {
    let mut props = PropertyMap::<i64>::new();
    props
        .register("value", |n| Value::Number(Number::I64(*n)))
        .unwrap()
        .register("half", |n| {
            if n % 2 == 0 {
                Value::Number(Number::I64(n / 2))
            } else {
                Value::Missing
            }
        })
        .unwrap()
        .register("mod3", |n| Value::Number(Number::I64(n % 3)))
        .unwrap();
    props
}

fn values(results: &[&i64]) -> BTreeSet<i64> {
    results.iter().map(|n| **n).collect()
}

// ============================================================================
// Fold semantics
// ============================================================================

#[test]
fn or_fold_unites_even_and_divisible_by_three() {
    init_tracing();
    let items = numbers();
    let props = number_props();
    let query = Query::builder(&props)
        .filter("half", CompareType::Is.negated(), ClauseValue::Missing)
        .or_eq("mod3", 0)
        .build()
        .unwrap();

    let results = query.filter(&items).unwrap();
    assert_eq!(values(&results), BTreeSet::from([2, 3, 4, 6, 8, 9, 10]));
    assert_eq!(results.len(), 7);
}

#[test]
fn and_not_fold_is_symmetric_difference() {
    let items = numbers();
    let props = number_props();
    let query = Query::builder(&props)
        .filter("half", CompareType::Is.negated(), ClauseValue::Missing)
        .and_not("mod3", CompareType::Equal, 0)
        .build()
        .unwrap();

    let results = query.filter(&items).unwrap();
    assert_eq!(values(&results), BTreeSet::from([2, 3, 4, 8, 9, 10]));
}

#[test]
fn or_not_fold_is_relative_complement() {
    let items = numbers();
    let props = number_props();
    let query = Query::builder(&props)
        .filter("half", CompareType::Is.negated(), ClauseValue::Missing)
        .or_not("mod3", CompareType::Equal, 0)
        .build()
        .unwrap();

    let results = query.filter(&items).unwrap();
    assert_eq!(values(&results), BTreeSet::from([2, 4, 8, 10]));
}

#[test]
fn then_fold_keeps_duplicates() {
    let items = numbers();
    let props = number_props();
    let query = Query::builder(&props)
        .filter("value", CompareType::LessOrEqual, 3)
        .then("value", CompareType::GreaterOrEqual, 3)
        .build()
        .unwrap();

    let results = query.filter(&items).unwrap();
    assert_eq!(results.len(), 11);
    assert_eq!(results.iter().filter(|n| ***n == 3).count(), 2);
}

#[test]
fn comparison_not_and_logic_not_are_independent() {
    let items = numbers();
    let props = number_props();

    // Comparison not: the primitive test is inverted.
    let odd = Query::builder(&props)
        .filter("half", CompareType::Is, ClauseValue::Missing)
        .build()
        .unwrap();
    // Logic not on a non-inverted test: the fold step changes instead.
    let folded = Query::builder(&props)
        .filter("value", CompareType::Greater, 0)
        .or_not("half", CompareType::Is.negated(), ClauseValue::Missing)
        .build()
        .unwrap();

    assert_eq!(
        values(&odd.filter(&items).unwrap()),
        values(&folded.filter(&items).unwrap())
    );
}

#[test]
fn unsupported_operator_never_matches_even_negated() {
    let items = numbers();
    let props = number_props();
    for comparison in [Comparison::from(CompareType::Contains), CompareType::Distinct.negated()] {
        let query = Query::builder(&props)
            .filter("value", comparison, 3)
            .build()
            .unwrap();
        assert!(query.filter(&items).unwrap().is_empty());
    }
}

// ============================================================================
// Predicates over structs
// ============================================================================

#[test]
fn equality_ignores_case() {
    let items = contacts();
    let props = contact_props();
    let query = Query::builder(&props).and_eq("city", "LONDON").build().unwrap();
    assert_eq!(ids(&query.filter(&items).unwrap()), [1, 2]);

    let negated = Query::builder(&props)
        .and("city", CompareType::Equal.negated(), "london")
        .build()
        .unwrap();
    assert_eq!(ids(&negated.filter(&items).unwrap()), [3, 4, 5, 6]);
}

#[test]
fn like_trims_percent() {
    let items = contacts();
    let props = contact_props();
    let query = Query::builder(&props).and_like("name", "%LOVE%").build().unwrap();
    assert_eq!(ids(&query.filter(&items).unwrap()), [1]);

    // Plain operands treat `_` literally; patterns do not.
    let literal = Query::builder(&props).and_like("name", "Ad_").build().unwrap();
    assert!(literal.filter(&items).unwrap().is_empty());
    let pattern = Query::builder(&props)
        .and_like_pattern("name", "Ad_ %")
        .build()
        .unwrap();
    assert_eq!(ids(&pattern.filter(&items).unwrap()), [1]);
}

#[test]
fn in_list_and_comma_string() {
    let items = contacts();
    let props = contact_props();
    let list = Query::builder(&props).and_in("age", [36, 86, 99]).build().unwrap();
    assert_eq!(ids(&list.filter(&items).unwrap()), [1, 6]);

    let joined = Query::builder(&props)
        .and_in("city", "milwaukee, new york")
        .build()
        .unwrap();
    assert_eq!(ids(&joined.filter(&items).unwrap()), [3, 6]);

    // Numbers are coerced to strings against a comma-separated operand.
    let coerced = Query::builder(&props).and_in("age", "41,72").build().unwrap();
    assert_eq!(ids(&coerced.filter(&items).unwrap()), [2, 4]);
}

#[test]
fn malformed_operands_fail_closed() {
    let items = contacts();
    let props = contact_props();
    let in_scalar = Query::builder(&props).and_in("age", 36).build().unwrap();
    assert!(in_scalar.filter(&items).unwrap().is_empty());

    let between_three = Query::builder(&props)
        .and("age", CompareType::Between, ClauseValue::list([1, 2, 3]))
        .build()
        .unwrap();
    assert!(between_three.filter(&items).unwrap().is_empty());
}

#[test]
fn between_is_inclusive() {
    let items = contacts();
    let props = contact_props();
    let query = Query::builder(&props).and_between("age", 41, 84).build().unwrap();
    assert_eq!(ids(&query.filter(&items).unwrap()), [2, 4, 5]);
}

#[test]
fn missing_values() {
    let items = contacts();
    let props = contact_props();
    let missing = Query::builder(&props).and_missing("city").build().unwrap();
    assert_eq!(ids(&missing.filter(&items).unwrap()), [4]);

    // Missing sorts before any present value.
    let below = Query::builder(&props).and_lt("city", "a").build().unwrap();
    assert_eq!(ids(&below.filter(&items).unwrap()), [4]);
}

#[test]
fn timestamps_at_midnight_compare_by_date() {
    let mut items = contacts();
    items[2].joined = Timestamp::from_millis(Timestamp::from_days(300).as_millis() + 3_600_000);
    let props = contact_props();

    let query = Query::builder(&props)
        .and_eq("joined", Timestamp::from_days(300))
        .build()
        .unwrap();
    assert_eq!(ids(&query.filter(&items).unwrap()), [3]);

    let exact = Query::builder(&props)
        .and_eq("joined", Timestamp::from_millis(Timestamp::from_days(300).as_millis() + 1))
        .build()
        .unwrap();
    assert!(exact.filter(&items).unwrap().is_empty());
}

#[test]
fn incompatible_ordering_is_an_error() {
    let items = contacts();
    let props = contact_props();
    let query = Query::builder(&props).and_gt("age", true).build().unwrap();
    assert!(matches!(query.filter(&items), Err(SieveError::Comparison(_))));

    let list = Query::builder(&props)
        .and("age", CompareType::Less, ClauseValue::list([1, 2]))
        .build()
        .unwrap();
    assert!(matches!(list.filter(&items), Err(SieveError::Comparison(_))));
}

#[test]
fn nested_properties() {
    struct Address {
        city: String,
    }
    struct Person {
        name: String,
        address: Address,
    }

    let mut address = PropertyMap::<Address>::new();
    address.register("city", |a| Value::String(&a.city)).unwrap();
    let mut props = PropertyMap::<Person>::new();
    props
        .register("name", |p| Value::String(&p.name))
        .unwrap()
        .mount("address", &address, |p| &p.address)
        .unwrap();

    let people = [
        Person {
            name: "a".into(),
            address: Address { city: "Oslo".into() },
        },
        Person {
            name: "b".into(),
            address: Address { city: "Lima".into() },
        },
    ];
    let query = Query::builder(&props)
        .and_eq("address.city", "lima")
        .build()
        .unwrap();
    let results = query.filter(&people).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "b");
}

// ============================================================================
// Indexes
// ============================================================================

fn index_set<'a>(props: &PropertyMap<Contact>, items: &'a [Contact]) -> IndexSet<'a, Contact> {
    let mut set = IndexSet::new();
    for path in ["name", "city", "age", "joined"] {
        set.add(SortedIndex::build(props, path, items).unwrap());
    }
    set
}

#[test]
fn index_presence_never_changes_results() {
    init_tracing();
    let items = contacts();
    let props = contact_props();
    let indexes = index_set(&props, &items);

    let queries = [
        Query::builder(&props).and_eq("city", "london").build().unwrap(),
        Query::builder(&props)
            .and_gt("age", 41)
            .or_missing("city")
            .build()
            .unwrap(),
        Query::builder(&props)
            .and_between("age", 40, 85)
            .and_not("city", CompareType::Equal, "london")
            .build()
            .unwrap(),
        Query::builder(&props)
            .and_like("name", "a")
            .or_not("age", CompareType::Less.negated(), 80)
            .then("joined", CompareType::LessOrEqual, Timestamp::from_days(200))
            .build()
            .unwrap(),
        Query::builder(&props)
            .and_gte("joined", Timestamp::from_days(300))
            .order_desc("age")
            .limit(2)
            .build()
            .unwrap(),
    ];

    for query in &queries {
        let scanned = query.filter(&items).unwrap();
        let indexed = query.select(&items, Some(&indexes)).unwrap();
        assert_eq!(ids(&scanned), ids(&indexed), "{query:?}");
    }
}

#[test]
fn single_index_as_registry() {
    let items = contacts();
    let props = contact_props();
    let index = SortedIndex::build(&props, "age", &items).unwrap();
    let query = Query::builder(&props).and_lte("age", 72).build().unwrap();
    assert_eq!(ids(&query.select(&items, Some(&index)).unwrap()), [1, 2, 4]);
}

#[test]
fn index_maintenance_tracks_collection() {
    let items = contacts();
    let props = contact_props();
    let mut indexes = index_set(&props, &items[..4]);

    let query = Query::builder(&props).and_gte("age", 80).build().unwrap();
    assert_eq!(id_set(&query.select(&items[..4], Some(&indexes)).unwrap()), BTreeSet::from([3]));

    indexes.insert_item(&items[4]);
    indexes.insert_item(&items[5]);
    assert_eq!(
        id_set(&query.select(&items, Some(&indexes)).unwrap()),
        BTreeSet::from([3, 5, 6])
    );

    indexes.remove_item(&items[2]);
    indexes.rebuild(&items[..2]);
    assert_eq!(indexes.get("age").map(SortedIndex::len), Some(2));
}

// ============================================================================
// Ordering and pagination
// ============================================================================

#[test]
fn ordering_uses_comparator_and_position() {
    let items = contacts();
    let props = contact_props();
    let query = Query::builder(&props).order_asc("city").build().unwrap();
    // Missing first, then case-insensitive; "London"/"london" keep input order.
    assert_eq!(ids(&query.filter(&items).unwrap()), [4, 1, 2, 5, 6, 3]);

    let desc = Query::builder(&props).order_desc("city").build().unwrap();
    assert_eq!(ids(&desc.filter(&items).unwrap()), [3, 6, 5, 1, 2, 4]);
}

#[test]
fn empty_query_is_identity() {
    let items = contacts();
    let props = contact_props();
    let query = Query::builder(&props).build().unwrap();
    let results = query.select(&items, None).unwrap();
    assert_eq!(ids(&results), [1, 2, 3, 4, 5, 6]);

    let ordered = Query::builder(&props).order_desc("id").build().unwrap();
    assert_eq!(ids(&ordered.filter(&items).unwrap()), [6, 5, 4, 3, 2, 1]);
}

#[test]
fn prebuilt_parameters() {
    let items = numbers();
    let props = number_props();
    let accessor = props.resolve("value").unwrap();
    let query = Query::from_parts(
        vec![
            QueryParameter::new("value", accessor.clone(), CompareType::Less, 3),
            QueryParameter::new("value", accessor, CompareType::Greater, 8).with_logic(Logic::OR),
        ],
        vec![],
    );
    assert_eq!(values(&query.filter(&items).unwrap()), BTreeSet::from([1, 2, 9, 10]));
}

// ============================================================================
// Standalone primitives
// ============================================================================

#[test]
fn set_algebra_examples() {
    let cmp = |a: &i32, b: &i32| a.cmp(b);
    let set = |v: Vec<i32>| v.into_iter().collect::<BTreeSet<i32>>();

    assert_eq!(set(set_ops::and(&mut vec![1, 2, 3], &mut vec![2, 3, 4], &cmp)), set(vec![2, 3]));
    assert_eq!(set(set_ops::or(&mut vec![1, 2, 3], &mut vec![2, 3, 4], &cmp)), set(vec![1, 2, 3, 4]));
    assert_eq!(set(set_ops::and_not(&mut vec![1, 2, 3], &mut vec![2, 3, 4], &cmp)), set(vec![1]));
    assert_eq!(set(set_ops::or_not(&mut vec![1, 2, 3], &mut vec![2, 3, 4], &cmp)), set(vec![1, 4]));
}
