use super::*;
use smartpy_runtime::{Heap, HeapConfig, Object};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone)]
struct Tracked {
    tag: usize,
    drops: Arc<AtomicUsize>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl BoxedRecord for Tracked {
    const TYPE_NAME: &'static str = "Tracked";
}

fn tracked(count: usize) -> (Vec<Tracked>, Arc<AtomicUsize>) {
    let drops = Arc::new(AtomicUsize::new(0));
    let items = (0..count)
        .map(|tag| Tracked {
            tag,
            drops: drops.clone(),
        })
        .collect();
    (items, drops)
}

fn floats(heap: &Heap, values: &[f64]) -> Object {
    Object::List(heap.list_from(values.iter().copied().map(Object::Float)).unwrap())
}

#[test]
fn test_f64_round_trip_preserves_order() {
    let heap = Heap::new();
    let list = f64s_to_list(&heap, &[1.0, 2.5, 3.25]).unwrap();

    assert_eq!(format!("{:?}", list), "[1.0, 2.5, 3.25]");

    let back = list_to_f64s(&heap, &Object::List(list)).unwrap();
    assert_eq!(back, vec![1.0, 2.5, 3.25]);
}

#[test]
fn test_empty_sequences() {
    let heap = Heap::new();

    let list = i32s_to_list(&heap, &[]).unwrap();
    assert!(list.is_empty());

    let back = list_to_i32s(&heap, &Object::List(list)).unwrap();
    assert!(back.is_empty());

    let back: Vec<String> = to_native(&heap, &Object::tuple([])).unwrap();
    assert!(back.is_empty());
}

#[test]
fn test_tuple_is_accepted() {
    let heap = Heap::new();
    let tuple = Object::tuple([Object::Int(7), Object::Int(-3), Object::Bool(true)]);

    assert_eq!(list_to_i32s(&heap, &tuple).unwrap(), vec![7, -3, 1]);
}

#[test]
fn test_float_accepts_ints() {
    let heap = Heap::new();
    let mixed = Object::tuple([Object::Int(2), Object::Float(0.5)]);

    assert_eq!(list_to_f64s(&heap, &mixed).unwrap(), vec![2.0, 0.5]);
}

#[test]
fn test_conversion_error_reports_index() {
    let heap = Heap::new();
    let list = heap
        .list_from([Object::Float(1.0), Object::Float(2.0), Object::str("x")])
        .unwrap();

    let err = list_to_f64s(&heap, &Object::List(list)).unwrap_err();
    assert!(err.is_conversion());
    assert_eq!(
        err,
        MarshalError::Conversion(ConversionError::Element {
            index: 2,
            expected: "float",
            found: "str".into(),
        })
    );
}

#[test]
fn test_int_rejects_float_and_overflow() {
    let heap = Heap::new();

    let err = list_to_i32s(&heap, &floats(&heap, &[1.0])).unwrap_err();
    assert_eq!(
        err,
        MarshalError::Conversion(ConversionError::Element {
            index: 0,
            expected: "int",
            found: "float".into(),
        })
    );

    let too_big = Object::tuple([Object::Int(1), Object::Int(i64::from(i32::MAX) + 1)]);
    match list_to_i32s(&heap, &too_big).unwrap_err() {
        MarshalError::Conversion(ConversionError::Element { index, expected, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(expected, "int");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_non_iterable_input() {
    let heap = Heap::new();

    let err = list_to_f64s(&heap, &Object::Int(5)).unwrap_err();
    assert_eq!(
        err,
        MarshalError::Conversion(ConversionError::NotIterable { found: "int".into() })
    );

    let err = list_to_strings(&heap, &Object::None).unwrap_err();
    assert_eq!(err.to_string(), "conversion failed: 'NoneType' object is not iterable");
}

#[test]
fn test_str_iterates_by_character() {
    let heap = Heap::new();

    let chars = list_to_strings(&heap, &Object::str("né")).unwrap();
    assert_eq!(chars, vec!["n".to_string(), "é".to_string()]);
}

#[test]
fn test_strings_to_list() {
    let heap = Heap::new();
    let names = vec!["E".to_string(), "nu".to_string()];

    let list = strings_to_list(&heap, &names).unwrap();
    assert_eq!(format!("{:?}", list), "['E', 'nu']");
    assert_eq!(list_to_strings(&heap, &Object::List(list)).unwrap(), names);
}

#[test]
fn test_records_cross_as_independent_copies() {
    let heap = Heap::new();
    let mut consts = vec![Constants::new(1, 2), Constants::new(2, 2)];
    consts[0].key = "@E".into();
    consts[1].value = 0.3;

    let list = constants_to_list(&heap, &consts).unwrap();
    assert_eq!(heap.stats().live_records, 2);

    // The native side stays untouched by later edits on either side
    consts[0].value = 99.0;
    let back = list_to_constants(&heap, &Object::List(list.clone())).unwrap();
    assert_eq!(back[0].key, "@E");
    assert_eq!(back[0].value, 0.0);
    assert_eq!(back[1].value, 0.3);

    drop(list);
    assert_eq!(heap.stats().live_records, 0);
    assert_eq!(heap.stats().live_objects, 0);
}

#[test]
fn test_record_type_mismatch() {
    let heap = Heap::new();
    let params = parameters_to_list(&heap, &[Parameters::new(1, 0.0, 1.0)]).unwrap();

    let err = list_to_constants(&heap, &Object::List(params)).unwrap_err();
    assert_eq!(
        err,
        MarshalError::Conversion(ConversionError::Element {
            index: 0,
            expected: "Constants",
            found: "Parameters".into(),
        })
    );

    let err = list_to_parameters(&heap, &floats(&heap, &[1.0])).unwrap_err();
    assert!(err.to_string().contains("expected Parameters, found float"));
}

#[test]
fn test_to_foreign_needs_room_for_the_list() {
    let heap = Heap::with_config(HeapConfig::bounded(0));

    let err = f64s_to_list(&heap, &[1.0]).unwrap_err();
    assert_eq!(err, MarshalError::Allocation(TransferFailure::Exhausted { limit: 0 }));
}

#[test]
fn test_each_record_destroyed_once() {
    let heap = Heap::new();
    let (items, drops) = tracked(3);

    let list = to_foreign(&heap, &items).unwrap();
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(list);
    assert_eq!(drops.load(Ordering::SeqCst), 3);

    drop(items);
    assert_eq!(drops.load(Ordering::SeqCst), 6);
}

#[test]
fn test_partial_failure_keeps_prefix() {
    // One slot for the list, two for records
    let heap = Heap::with_config(HeapConfig::bounded(3));
    let list = heap.new_list(0).unwrap();
    let (items, drops) = tracked(4);

    let err = extend_foreign(&heap, &list, &items).unwrap_err();
    assert_eq!(
        err,
        MarshalError::Transfer {
            index: 2,
            source: TransferFailure::Exhausted { limit: 3 },
        }
    );

    // Element 2's copy is gone, 0 and 1 live on in the list
    assert_eq!(list.len(), 2);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(heap.stats().live_records, 2);

    let kept: Vec<usize> = to_native::<_, Tracked>(&heap, &Object::List(list.clone()))
        .unwrap()
        .iter()
        .map(|item| item.tag)
        .collect();
    assert_eq!(kept, vec![0, 1]);

    drop(list);
    assert_eq!(heap.stats().live_records, 0);
}
