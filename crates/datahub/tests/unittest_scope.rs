use std::cell::Cell;
use std::rc::Rc;

use datahub::{ElementToken, FieldPath, Record, Schema, Scope, ScopeSchema, registry};

/// The `unittest` scope: three scalars and a collection of titled elements.
fn unittest() -> Rc<Scope> {
    let fields = Schema::builder()
        .value("teststring", "unittest")
        .value("testvalue", 99)
        .value("testbool", true)
        .collection("testarray", |element| element.value("teststring", "title"))
        .build()
        .expect("unittest schema is valid");
    let schema = ScopeSchema::new("unittest", fields).expect("scope name is valid");
    registry::get_or_register(&schema)
}

fn counter() -> Rc<Cell<u32>> {
    Rc::new(Cell::new(0))
}

#[test]
fn initial_values() {
    let scope = unittest();
    assert!(*scope.value("teststring").unwrap() == "unittest");
    assert!(*scope.value("testvalue").unwrap() == 99);
    assert!(*scope.value("testbool").unwrap() == true);
}

#[test]
fn event_handler_subscriptions() {
    let scope = unittest();
    let teststring = scope.value("teststring").unwrap();
    let fired = counter();

    let f = Rc::clone(&fired);
    let token0 = teststring
        .on_value_changed
        .subscribe(move |_| f.set(f.get() + 1));
    let f = Rc::clone(&fired);
    let token1 = teststring
        .on_value_changed
        .subscribe(move |_| f.set(f.get() + 1));

    assert_eq!(fired.get(), 0);
    teststring.assign("aaa").unwrap();
    assert_eq!(fired.get(), 2);

    teststring.on_value_changed.unsubscribe(token0);
    teststring.assign("bbb").unwrap();
    assert_eq!(fired.get(), 3);

    teststring.on_value_changed.unsubscribe(token1);
    teststring.assign("ccc").unwrap();
    assert_eq!(fired.get(), 3);

    // Stale tokens are ignored.
    assert!(!teststring.on_value_changed.unsubscribe(token0));
}

#[test]
fn value_coercions() {
    let scope = unittest();
    let teststring = scope.value("teststring").unwrap();

    teststring.assign(10).unwrap();
    assert!((teststring.get::<f32>() - 10.0).abs() <= f32::EPSILON);
    assert_eq!(teststring.get::<u32>(), 10);
    assert_eq!(teststring.text(), "10");
    assert!(!teststring.get::<bool>());

    teststring.assign(10.01).unwrap();
    assert!((teststring.get::<f32>() - 10.01).abs() <= f32::EPSILON);
    assert_eq!(teststring.get::<u32>(), 10);
    assert_eq!(teststring.text(), "10.01");

    let testvalue = scope.value("testvalue").unwrap();
    testvalue.assign(10.01).unwrap();
    assert!((testvalue.get::<f32>() - 10.01).abs() <= f32::EPSILON);
    assert_eq!(testvalue.get::<u32>(), 10);
    assert_eq!(testvalue.text(), "10.01");
    assert!(testvalue.get::<bool>());

    let testbool = scope.value("testbool").unwrap();
    testbool.assign(true).unwrap();
    assert!(testbool.get::<f32>() >= f32::EPSILON);
    assert_eq!(testbool.get::<u32>(), 1);
    assert_eq!(testbool.text(), "true");
    assert!(testbool.get::<bool>());
}

#[test]
fn boolean_write_notifies() {
    let scope = unittest();
    let testbool = scope.value("testbool").unwrap();
    let seen = Rc::new(Cell::new(None));
    let s = Rc::clone(&seen);
    testbool
        .on_value_changed
        .subscribe(move |content| s.set(Some(content.as_bool())));

    testbool.assign("false").unwrap();
    assert_eq!(seen.get(), Some(false));
}

#[test]
fn collection_lifecycle() {
    let scope = unittest();
    let testarray = scope.collection("testarray").unwrap();
    let added = counter();
    let removing = counter();

    let a = Rc::clone(&added);
    let event_add = testarray
        .on_element_added
        .subscribe(move |_| a.set(a.get() + 1));
    let r = Rc::clone(&removing);
    let event_remove = testarray
        .on_element_removing
        .subscribe(move |_| r.set(r.get() + 1));

    let set_title = |element: &mut Record, title: i32| {
        element.value("teststring").unwrap().assign(title).unwrap();
    };
    let token0 = testarray.add(|element| set_title(element, 1));
    assert_eq!(added.get(), 1);
    let token1 = testarray.add(|element| set_title(element, 2));
    assert_eq!(added.get(), 2);
    assert!(token1 > token0);

    let title = |token: ElementToken| {
        testarray
            .get(token)
            .unwrap()
            .value("teststring")
            .unwrap()
            .text()
    };
    assert_eq!(title(token0), "1");
    assert_eq!(title(token1), "2");

    testarray.remove(token0).unwrap();
    assert_eq!(removing.get(), 1);
    assert_eq!(added.get(), 2);
    assert_eq!(title(token1), "2");
    assert!(testarray.get(token0).is_err());

    testarray.remove(token1).unwrap();
    assert!(testarray.on_element_added.unsubscribe(event_add));
    assert!(testarray.on_element_removing.unsubscribe(event_remove));
    assert!(testarray.is_empty());
}

#[test]
fn field_paths_address_scope_content() {
    let scope = unittest();
    let testarray = scope.collection("testarray").unwrap();
    let token = testarray.add(|_| {});

    let path = format!("testarray[{}].teststring", token.get());
    let path: FieldPath = path.parse().unwrap();
    scope.with_value(&path, |v| v.assign_text("renamed")).unwrap();
    assert_eq!(scope.with_value(&path, |v| v.text()).unwrap(), "renamed");

    testarray.remove(token).unwrap();
    assert!(scope.with_value(&path, |v| v.text()).is_err());
}
