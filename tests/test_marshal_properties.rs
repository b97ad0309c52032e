use proptest::prelude::*;
use smartpy::marshal::{f64s_to_list, i32s_to_list, list_to_f64s, list_to_i32s, list_to_strings, strings_to_list};
use smartpy::runtime::{Heap, Object};

proptest! {
    #[test]
    fn f64_sequences_survive_both_directions(values in prop::collection::vec(-1.0e12f64..1.0e12, 0..64)) {
        let heap = Heap::new();
        let list = f64s_to_list(&heap, &values).unwrap();
        prop_assert_eq!(list.len(), values.len());

        let back = list_to_f64s(&heap, &Object::List(list)).unwrap();
        prop_assert_eq!(back, values);
    }

    #[test]
    fn i32_sequences_survive_both_directions(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let heap = Heap::new();
        let list = i32s_to_list(&heap, &values).unwrap();
        let back = list_to_i32s(&heap, &Object::List(list)).unwrap();
        prop_assert_eq!(back, values);
    }

    #[test]
    fn string_sequences_survive_both_directions(values in prop::collection::vec(".{0,12}", 0..32)) {
        let heap = Heap::new();
        let list = strings_to_list(&heap, &values).unwrap();
        let back = list_to_strings(&heap, &Object::List(list)).unwrap();
        prop_assert_eq!(back, values);
        prop_assert_eq!(heap.stats().live_objects, 0);
    }

    #[test]
    fn first_bad_element_is_reported(prefix in prop::collection::vec(any::<i32>(), 0..16)) {
        let heap = Heap::new();
        let list = heap
            .list_from(prefix.iter().map(|&i| Object::Int(i64::from(i))).chain([Object::str("x"), Object::None]))
            .unwrap();

        let err = list_to_i32s(&heap, &Object::List(list)).unwrap_err();
        let expected = format!("element {}: expected int, found str", prefix.len());
        prop_assert!(err.to_string().contains(&expected));
    }
}
