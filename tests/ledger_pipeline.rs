// End-to-end: store on a real database file → filter → aggregate → reload

use chrono::NaiveDate;
use expense_tracker::{
    category_ranking, filter_expenses, load_csv, monthly_totals, save_csv, summarize, Expense,
    ExpenseStore, FilterCriteria, KeyValueStore, SqliteKeyValueStore, EXPENSES_KEY,
};

fn seed(store: &mut ExpenseStore<SqliteKeyValueStore>) {
    for (amount, description, date, category, method) in [
        (45.0, "Groceries", "2024-02-03", "Food", "Debit Card"),
        (2.8, "Bus fare", "2024-02-05", "Transport", "Cash"),
        (60.0, "Groceries", "2024-03-02", "Food", "Debit Card"),
        (15.0, "Cinema", "2024-03-08", "Leisure", "Credit Card"),
        (2.8, "Bus fare", "2024-03-09", "Transport", "cash"),
    ] {
        store
            .add_expense(Expense::new(amount, description, date, category, method))
            .unwrap();
    }
}

#[test]
fn test_pipeline_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("expenses.db");

    let snapshot = {
        let mut store = ExpenseStore::open(SqliteKeyValueStore::open(&db_path).unwrap()).unwrap();
        seed(&mut store);

        let cinema_id = store
            .list_expenses()
            .iter()
            .find(|e| e.description == "Cinema")
            .map(|e| e.id.clone())
            .unwrap();
        assert!(store.delete_expense(&cinema_id).unwrap());

        store.list_expenses().to_vec()
    };

    let store = ExpenseStore::open(SqliteKeyValueStore::open(&db_path).unwrap()).unwrap();
    assert_eq!(store.list_expenses(), snapshot.as_slice());
    assert_eq!(store.len(), 4);
    assert_eq!(store.list_expenses()[3].payment_method.as_str(), "cash");

    let march = FilterCriteria::new().with_date_range("2024-03-01", "2024-03-31");
    let in_march = filter_expenses(store.list_expenses(), &march);
    assert_eq!(in_march.len(), 2);

    let cash = filter_expenses(
        store.list_expenses(),
        &FilterCriteria::new().with_payment_method("CASH"),
    );
    assert_eq!(cash.len(), 2);

    let months = monthly_totals(store.list_expenses());
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].label, "Feb 2024");
    assert_eq!(months[1].total, 62.8);

    let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    let summary = summarize(store.list_expenses(), today);
    assert_eq!(summary.current_month_total, 62.8);
    assert_eq!(summary.previous_month_total, 47.8);
    assert_eq!(summary.trend, 31.38);

    let ranking = category_ranking(store.list_expenses());
    assert_eq!(ranking[0].category, "Food");
    assert_eq!(ranking[1].category, "Transport");
}

#[test]
fn test_foreign_fields_round_trip_through_store() {
    let mut storage = SqliteKeyValueStore::open_in_memory().unwrap();
    storage
        .set(
            EXPENSES_KEY,
            r#"[{"id":"1","amount":9.5,"description":"Book","date":"2024-01-02",
                "category":"Leisure","paymentMethod":"Gift voucher","note":"birthday"}]"#,
        )
        .unwrap();

    let mut store = ExpenseStore::open(storage).unwrap();
    store
        .add_expense(Expense::new(3.0, "Tea", "2024-01-03", "Food", "Cash"))
        .unwrap();

    let raw = store.into_storage().get(EXPENSES_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["note"], "birthday");
    assert_eq!(value[0]["paymentMethod"], "Gift voucher");
    assert_eq!(value[1]["description"], "Tea");
}

#[test]
fn test_csv_export_import_into_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("ledger.csv");

    let mut source = ExpenseStore::open(SqliteKeyValueStore::open_in_memory().unwrap()).unwrap();
    seed(&mut source);
    save_csv(&csv_path, source.list_expenses()).unwrap();

    let mut target = ExpenseStore::open(SqliteKeyValueStore::open_in_memory().unwrap()).unwrap();
    for candidate in load_csv(&csv_path).unwrap() {
        target.add_expense(candidate).unwrap();
    }

    assert_eq!(target.len(), source.len());
    for (a, b) in source.list_expenses().iter().zip(target.list_expenses()) {
        assert_eq!(a.description, b.description);
        assert_eq!(a.amount, b.amount);
        assert_eq!(a.date, b.date);
        assert_eq!(a.payment_method, b.payment_method);
    }
}
