use apizza::cli::Cli;
use apizza::core::db::Database;
use apizza::core::error::ApizzaError;
use apizza::core::model::{Address, Order, ServiceMethod};
use apizza::core::schemas;
use apizza::core::session::{Session, SessionState, with_session};
use apizza::core::settings::Settings;
use apizza::execute;
use clap::Parser;
use std::path::Path;
use tempfile::tempdir;

fn run_with(settings: Settings, args: &[&str]) -> Result<String, ApizzaError> {
    let mut argv = vec!["apizza"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    let mut buf = Vec::new();
    execute(cli, settings, &mut buf)?;
    Ok(String::from_utf8(buf).expect("utf8 output"))
}

fn run(db_path: &Path, args: &[&str]) -> Result<String, ApizzaError> {
    run_with(Settings::with_db_path(db_path), args)
}

fn setup_profile(db_path: &Path) {
    run(
        db_path,
        &[
            "config",
            "set",
            "name=joe",
            "email=nojoe@mail.com",
            "address.street=1600 Pennsylvania Ave NW",
            "address.cityname=Washington DC",
            "address.zipcode=20500",
            "service=Carryout",
        ],
    )
    .expect("config set");
}

#[test]
fn db_survives_session_round_trip() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("cache.db");
    with_session(Settings::with_db_path(&path), |s| {
        s.db()?.put("test", b"this is some test data")
    })
    .unwrap();

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get("test").unwrap(), b"this is some test data");
}

#[test]
fn reset_deletes_file_and_blocks_further_use() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("reset.db");
    let mut session = Session::new(Settings::with_db_path(&path));
    session.open().unwrap();
    session.orders().unwrap().list_names().unwrap();
    let expected_path = session.db().unwrap().path().to_path_buf();

    let mut buf = Vec::new();
    let removed = session.reset(&mut buf).unwrap();
    assert_eq!(removed, expected_path);
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        format!("removing {}\n", expected_path.display())
    );
    assert!(!path.exists());
    assert_eq!(session.state(), SessionState::Cleared);

    assert!(matches!(session.orders(), Err(ApizzaError::StoreClosed)));
    assert!(matches!(session.db(), Err(ApizzaError::StoreClosed)));
    session.close().unwrap();
    assert!(!path.exists(), "closing a cleared session must not recreate the file");
}

#[test]
fn clear_cache_flag_removes_the_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("flag.db");
    setup_profile(&path);
    assert!(path.exists());

    let out = run(&path, &["--clear-cache"]).unwrap();
    assert!(out.starts_with("removing "));
    assert!(out.trim_end().ends_with("flag.db"));
    assert!(!path.exists());
}

#[test]
fn clear_cache_recovers_from_corrupt_config() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("corrupt.db");
    {
        let db = Database::open(&path).unwrap();
        db.put(schemas::CONFIG_KEY, b"{ nope").unwrap();
    }

    assert!(matches!(
        run(&path, &["cart"]),
        Err(ApizzaError::Deserialization(_))
    ));
    assert!(path.exists());

    let out = run(&path, &["--clear-cache"]).unwrap();
    assert!(out.starts_with("removing "));
    assert!(!path.exists());
    assert_eq!(run(&path, &["cart"]).unwrap(), "No orders saved.\n");
}

#[test]
fn bad_catalog_only_blocks_commands_that_need_it() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nomenu.db");
    let settings = || Settings {
        menu_path: Some(tmp.path().join("missing.toml")),
        ..Settings::with_db_path(&path)
    };

    run_with(settings(), &["config", "set", "name=joe"]).unwrap();
    assert_eq!(run_with(settings(), &["config", "get", "name"]).unwrap(), "joe\n");

    let err = run_with(settings(), &["menu"]).unwrap_err();
    assert!(
        matches!(&err, ApizzaError::Service(msg) if msg.contains("missing.toml")),
        "unexpected error: {err:?}"
    );

    run_with(settings(), &["--clear-cache"]).unwrap();
    assert!(!path.exists());
}

fn save_raw_order(path: &Path, name: &str, store_id: &str) {
    with_session(Settings::with_db_path(path), |s| {
        let order = Order {
            store_id: store_id.to_string(),
            service_method: ServiceMethod::Carryout,
            address: Address {
                street: "1600 Pennsylvania Ave NW".to_string(),
                city_name: "Washington DC".to_string(),
                state: String::new(),
                zipcode: "20500".to_string(),
            },
            ..Order::default()
        };
        s.orders()?.save(name, &order)
    })
    .unwrap();
}

fn saved_store_id(path: &Path, name: &str) -> String {
    with_session(Settings::with_db_path(path), |s| {
        Ok(s.orders()?.load(name)?.store_id)
    })
    .unwrap()
}

#[test]
fn cart_updates_price_at_the_saved_store() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("stores.db");
    save_raw_order(&path, "faraway", "3674");
    save_raw_order(&path, "orphan", "9999");

    run(&path, &["cart", "faraway", "--add", "B8PCGT"]).unwrap();
    assert_eq!(saved_store_id(&path, "faraway"), "3674");

    run(&path, &["cart", "orphan", "--add", "B8PCGT"]).unwrap();
    assert_eq!(saved_store_id(&path, "orphan"), "4336");

    let out = run(&path, &["cart", "faraway", "--price"]).unwrap();
    assert!(out.contains("  Price: 5.99\n"), "output was: {out}");
    assert!(out.contains("StoreID: 3674"), "output was: {out}");
}

#[test]
fn open_failure_is_fatal() {
    let tmp = tempdir().unwrap();
    let err = run(tmp.path(), &["cart"]).unwrap_err();
    assert!(matches!(err, ApizzaError::StorageOpen(_)));
}

#[test]
fn order_lifecycle_through_commands() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("orders.db");
    setup_profile(&path);

    assert_eq!(run(&path, &["cart"]).unwrap(), "No orders saved.\n");

    let out = run(&path, &["new", "--name=testorder", "--products=12SCMEATZA"]).unwrap();
    assert_eq!(out, "Price: 14.09\n");

    let out = run(&path, &["cart", "testorder"]).unwrap();
    let expected = "testorder
  Products:
    12SCMEATZA
  StoreID: 4336
  Method:  Carryout
  Address: 1600 Pennsylvania Ave NW
           Washington DC, 20500
";
    assert_eq!(out, expected);

    assert_eq!(run(&path, &["cart"]).unwrap(), "Your Orders:\n  testorder\n");

    let out = run(&path, &["cart", "--add", "W08PBNLW,W08PPLNW", "testorder"]).unwrap();
    assert_eq!(out, "updated order successfully saved.\n");

    let out = run(&path, &["order", "testorder", "--price"]).unwrap();
    let expected = "testorder
  Price: 34.07
  Products:
    12SCMEATZA
    W08PBNLW
    W08PPLNW
  StoreID: 4336
  Method:  Carryout
  Address: 1600 Pennsylvania Ave NW
           Washington DC, 20500
";
    assert_eq!(out, expected);

    assert!(matches!(
        run(&path, &["cart", "too-many", "args"]),
        Err(ApizzaError::UsageError(_))
    ));

    let out = run(&path, &["cart", "-d", "testorder"]).unwrap();
    assert_eq!(out, "testorder successfully deleted.\n");
    assert_eq!(run(&path, &["cart"]).unwrap(), "No orders saved.\n");

    assert!(matches!(
        run(&path, &["cart", "not_a_real_order"]),
        Err(ApizzaError::OrderNotFound(_))
    ));
    assert!(matches!(
        run(&path, &["cart", "--delete", "not_a_real_order"]),
        Err(ApizzaError::OrderNotFound(_))
    ));
}

#[test]
fn new_order_requires_a_name() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("noname.db");
    assert!(matches!(
        run(&path, &["new", "--products=12SCMEATZA"]),
        Err(ApizzaError::UsageError(_))
    ));
    assert_eq!(run(&path, &["cart"]).unwrap(), "No orders saved.\n");
}

#[test]
fn unknown_product_leaves_no_order_behind() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("badproduct.db");
    setup_profile(&path);
    assert!(matches!(
        run(&path, &["new", "--name=x", "--products=NOTAPIZZA"]),
        Err(ApizzaError::Service(_))
    ));
    assert_eq!(run(&path, &["cart"]).unwrap(), "No orders saved.\n");
}

#[test]
fn config_commands_persist_between_invocations() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("config.db");
    setup_profile(&path);

    assert_eq!(run(&path, &["config", "get", "name", "email"]).unwrap(), "joe\nnojoe@mail.com\n");

    assert!(matches!(
        run(&path, &["config", "set", "name=jane", "service=hovercraft"]),
        Err(ApizzaError::ValidationError(_))
    ));
    assert_eq!(run(&path, &["config", "get", "name"]).unwrap(), "joe\n");

    assert!(matches!(
        run(&path, &["config", "get", "favorite"]),
        Err(ApizzaError::UnknownField(_))
    ));
    assert!(matches!(
        run(&path, &["config", "set", "name"]),
        Err(ApizzaError::UsageError(_))
    ));
}

#[test]
fn menu_lists_nearest_store_products() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("menu.db");
    setup_profile(&path);
    let out = run(&path, &["menu", "--category", "wings"]).unwrap();
    assert!(out.starts_with("Menu for store 4336\nWings\n"));
    assert!(out.contains("W08PBNLW"));
    assert!(!out.contains("12SCMEATZA"));
}
