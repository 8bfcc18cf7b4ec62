mod common;

use common::{standard, Fixtures, TEST_DATA};
use std::sync::Arc;
use std::thread;
use xmlfixture::{Error, Value};

#[test]
fn test_cases_under_scope() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");

    assert_eq!(reader.lookup_map("Login/Case/0/user").unwrap().as_str(), Some("alice"));
    assert_eq!(reader.lookup_map("Login/Case/0/password").unwrap().as_str(), Some("secret"));
    assert_eq!(reader.lookup_map("Login/Case/1/password").unwrap().as_str(), Some("pw"));

    let case = reader.lookup_map("Login/Case/1").unwrap();
    assert_eq!(case.attribute("name"), Some("B"));
}

#[test]
fn test_pointer_resolves_outside_scope() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");
    assert_eq!(reader.lookup_map("Login/Case/1/user").unwrap().as_str(), Some("root"));
}

#[test]
fn test_other_scope() {
    let fixtures = standard();
    let reader = fixtures.reader("PROD");
    assert_eq!(reader.lookup_map("Login/Case/user").unwrap().as_str(), Some("prod"));
    assert!(!reader.path_exists("Menu"));
}

#[test]
fn test_unscoped_sees_every_environment() {
    let fixtures = standard();
    let reader = fixtures.reader("");
    let logins = reader.lookup_list("Login").unwrap();
    assert_eq!(logins.len(), 2);
    assert_eq!(reader.lookup_map("Login/1/Case/user").unwrap().as_str(), Some("prod"));

    // a single leaf match yields its raw text
    assert_eq!(reader.lookup_map("adminUser").unwrap(), Value::from("root"));
}

#[test]
fn test_list_and_prefix_count() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");

    let items: Vec<_> = reader
        .lookup_list("Menu")
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(items, vec!["Home", "Reports", "Help"]);

    assert_eq!(reader.count_children_starting_with("Menu", "item").unwrap(), 2);
    assert_eq!(reader.count_children_starting_with("Menu", "none").unwrap(), 0);
    assert_eq!(reader.lookup_list("Menu/item1").unwrap(), vec![Value::from("Home")]);
}

#[test]
fn test_attributed_leaf() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");
    let title = reader.lookup_map("Labels/title").unwrap();
    assert_eq!(title.as_str(), Some("Welcome"));
    assert_eq!(title.attribute("lang"), Some("en"));
    assert_eq!(reader.lookup_map("Labels/title/__attributes/lang").unwrap().as_str(), Some("en"));
}

#[test]
fn test_path_exists_misses() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");
    assert!(reader.path_exists("Login/Case/0/user"));
    assert!(!reader.path_exists("Login/Case/0/missing"));
    assert!(!reader.path_exists("Login/Case/7"));
    assert!(!reader.path_exists("NoSuchRoot"));
    assert!(!reader.path_exists(""));
}

#[test]
fn test_lookup_errors() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");
    assert!(matches!(reader.lookup_map(""), Err(Error::InvalidPath)));
    assert!(matches!(reader.lookup_map("NoSuchRoot/x"), Err(Error::NoDataFound { .. })));
    assert!(matches!(reader.lookup_map("Login/Nope"), Err(Error::NodeNotFound { .. })));
}

#[test]
fn test_fixture_cached_per_root() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");
    let first = reader.fixture("Login").unwrap();
    reader.lookup_map("Login/Case/0/user").unwrap();
    let second = reader.fixture("Login").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(reader.cache().build_count(), 1);

    reader.clear();
    reader.fixture("Login").unwrap();
    assert_eq!(reader.cache().build_count(), 2);
}

#[test]
fn test_preload_then_concurrent_lookups() {
    let fixtures = standard();
    let reader = Arc::new(fixtures.reader("QA"));
    reader.preload(&["Login", "Menu", "Labels"]).unwrap();
    assert_eq!(reader.cache().len(), 3);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reader = Arc::clone(&reader);
            thread::spawn(move || reader.lookup_map("Login/Case/0/user").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::from("alice"));
    }
    assert_eq!(reader.cache().build_count(), 3);
}

#[test]
fn test_initialize_switches_documents() {
    let fixtures = Fixtures::new(&[
        ("TestData.xml", TEST_DATA),
        ("Other.xml", "<Root><APP_QA><Login><Case><user>bob</user></Case></Login></APP_QA></Root>"),
    ]);
    let reader = fixtures.reader("QA");
    assert_eq!(reader.lookup_map("Login/Case/0/user").unwrap().as_str(), Some("alice"));

    reader.initialize(Some("Other.xml")).unwrap();
    assert_eq!(reader.lookup_map("Login/Case/user").unwrap().as_str(), Some("bob"));

    reader.initialize(None).unwrap();
    assert_eq!(reader.lookup_map("Login/Case/0/user").unwrap().as_str(), Some("alice"));
}

#[test]
fn test_missing_and_malformed_resources() {
    let fixtures = Fixtures::new(&[("Broken.xml", "<Root><a></b></Root>")]);
    let reader = xmlfixture::TestDataReader::new(fixtures.config("QA"));

    reader.initialize(Some("Absent.xml")).unwrap();
    assert!(matches!(reader.lookup_map("Root"), Err(Error::ResourceNotFound { .. })));
    assert!(!reader.path_exists("Root"));

    reader.initialize(Some("Broken.xml")).unwrap();
    assert!(matches!(reader.lookup_map("Root"), Err(Error::MalformedDocument { .. })));
    // failures are not cached
    assert!(reader.cache().is_empty());
}

#[test]
fn test_repeated_lookups_are_stable() {
    let fixtures = standard();
    let reader = fixtures.reader("QA");
    let a = reader.lookup_map("Login").unwrap();
    let b = reader.lookup_map("Login").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.child("Case").unwrap().as_group().map(<[Value]>::len), Some(2));
}
