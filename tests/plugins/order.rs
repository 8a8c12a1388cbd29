use apizza::core::db::Database;
use apizza::core::error::ApizzaError;
use apizza::core::model::{Address, Order, ServiceMethod};
use apizza::plugins::order::{OrderRepository, order_key};
use apizza::plugins::service::{LocalCatalog, OrderingService};
use tempfile::tempdir;

fn white_house() -> Address {
    Address {
        street: "1600 Pennsylvania Ave NW".to_string(),
        city_name: "Washington DC".to_string(),
        state: String::new(),
        zipcode: "20500".to_string(),
    }
}

fn order_with(codes: &[&str]) -> Order {
    let catalog = LocalCatalog::builtin().unwrap();
    let store = catalog
        .nearest_store(&white_house(), ServiceMethod::Carryout)
        .unwrap();
    let mut order = store.new_order();
    for code in codes {
        order.add_product(&store.get_product(code).unwrap());
    }
    order.price = Some(store.price(&order).unwrap());
    order
}

#[test]
fn test_save_then_load_round_trips() {
    let tmp = tempdir().unwrap();
    let db = Database::open(tmp.path().join("cache.db")).unwrap();
    let repo = OrderRepository::new(&db);

    for (name, codes) in [
        ("single", vec!["12SCMEATZA"]),
        ("empty", vec![]),
        ("mixed", vec!["14SCREEN", "14SCREEN", "20BCOKE"]),
        ("spaces in name", vec!["B8PCGT"]),
    ] {
        let order = order_with(&codes);
        repo.save(name, &order).unwrap();
        assert_eq!(repo.load(name).unwrap(), order, "round trip of {}", name);
    }
}

#[test]
fn test_delete_then_load_is_order_not_found() {
    let tmp = tempdir().unwrap();
    let db = Database::open(tmp.path().join("cache.db")).unwrap();
    let repo = OrderRepository::new(&db);

    repo.save("dinner", &order_with(&["12SCMEATZA"])).unwrap();
    repo.delete("dinner").unwrap();
    match repo.load("dinner") {
        Err(ApizzaError::OrderNotFound(name)) => assert_eq!(name, "dinner"),
        other => panic!("expected OrderNotFound, got {:?}", other),
    }
}

#[test]
fn test_list_names_after_delete() {
    let tmp = tempdir().unwrap();
    let db = Database::open(tmp.path().join("cache.db")).unwrap();
    let repo = OrderRepository::new(&db);

    repo.save("a", &order_with(&["12SCMEATZA"])).unwrap();
    repo.save("b", &order_with(&["W08PBNLW"])).unwrap();
    repo.delete("a").unwrap();
    assert_eq!(repo.list_names().unwrap(), vec!["b".to_string()]);
}

#[test]
fn test_list_names_on_empty_store() {
    let tmp = tempdir().unwrap();
    let db = Database::open(tmp.path().join("cache.db")).unwrap();
    let repo = OrderRepository::new(&db);
    assert!(repo.list_names().unwrap().is_empty());
}

#[test]
fn test_delete_missing_order_fails() {
    let tmp = tempdir().unwrap();
    let db = Database::open(tmp.path().join("cache.db")).unwrap();
    let repo = OrderRepository::new(&db);
    assert!(matches!(
        repo.delete("not_a_real_order"),
        Err(ApizzaError::OrderNotFound(_))
    ));
}

#[test]
fn test_saving_existing_name_overwrites() {
    let tmp = tempdir().unwrap();
    let db = Database::open(tmp.path().join("cache.db")).unwrap();
    let repo = OrderRepository::new(&db);

    repo.save("dup", &order_with(&["12SCMEATZA"])).unwrap();
    repo.save("dup", &order_with(&["20BCOKE"])).unwrap();
    assert_eq!(repo.load("dup").unwrap().product_codes(), vec!["20BCOKE"]);
    assert_eq!(repo.list_names().unwrap().len(), 1);
}

#[test]
fn test_testorder_scenario() {
    let tmp = tempdir().unwrap();
    let db = Database::open(tmp.path().join("cache.db")).unwrap();
    let repo = OrderRepository::new(&db);

    repo.save("testorder", &order_with(&["12SCMEATZA"])).unwrap();
    let loaded = repo.load("testorder").unwrap();
    assert_eq!(loaded.product_codes(), vec!["12SCMEATZA"]);
    assert_eq!(loaded.store_id, "4336");
    assert_eq!(loaded.service_method, ServiceMethod::Carryout);
    assert_eq!(loaded.address, white_house());

    let raw: serde_json::Value =
        serde_json::from_slice(&db.get(&order_key("testorder")).unwrap()).unwrap();
    assert_eq!(raw["StoreID"], "4336");
    assert_eq!(raw["ServiceMethod"], "Carryout");
    assert_eq!(raw["Address"]["Street"], "1600 Pennsylvania Ave NW");
    assert_eq!(raw["Address"]["CityName"], "Washington DC");
    assert_eq!(raw["Address"]["Zipcode"], "20500");
    assert_eq!(raw["Products"][0]["Code"], "12SCMEATZA");

    let catalog = LocalCatalog::builtin().unwrap();
    let store = catalog
        .nearest_store(&loaded.address, loaded.service_method)
        .unwrap();
    let mut updated = loaded;
    for code in ["W08PBNLW", "W08PPLNW"] {
        updated.add_product(&store.get_product(code).unwrap());
    }
    updated.price = Some(store.price(&updated).unwrap());
    repo.save("testorder", &updated).unwrap();

    let reloaded = repo.load("testorder").unwrap();
    assert_eq!(
        reloaded.product_codes(),
        vec!["12SCMEATZA", "W08PBNLW", "W08PPLNW"]
    );
    assert_eq!(reloaded.price, Some(34.07));
}
