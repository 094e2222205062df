use anyhow::Result;
use rusqlite::Connection;
use sales_etl::config::{Config, DataSources, TargetConfig};
use sales_etl::infra::csv_extractor::CsvFileExtractor;
use sales_etl::infra::sqlite_loader::SqliteLoader;
use sales_etl::{EtlOrchestrator, RunStatus};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const CUSTOMERS_CSV: &str = "\
CustomerID,FirstName,LastName,Email,Phone,City,Country
1, Ana ,Lopez,  ANA@Example.COM ,+1 (206) 555-0101,Seattle,USA
2,Ben,Smith,not-an-email,206-555-0102,Tacoma,USA
1,Ana,Lopez,ana@example.com,206-555-0101,Seattle,USA
3,Cam,Reed,cam@example.com,206-555-0103,Olympia,USA
";

const PRODUCTS_CSV: &str = "\
ProductID,ProductName,Category,Price,Stock
1, Widget ,Tools,9.99,5
2,Free Sample,Tools,0.0,10
3,Gadget,Tools,14.50,0
";

const ORDERS_CSV: &str = "\
OrderID,CustomerID,OrderDate,Status
10,1,2024-01-15 10:30:00, shipped
11,3,2024-01-16,pending
12,1,,pending
";

const ORDER_DETAILS_CSV: &str = "\
OrderID,ProductID,Quantity,TotalPrice
10,1,2,19.98
10,1,2,19.98
10,3,1,14.50
11,1,1,9.99
";

fn setup(dir: &TempDir) -> Result<Config> {
    let write = |name: &str, content: &str| -> Result<String> {
        let path = dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path.to_string_lossy().to_string())
    };

    Ok(Config {
        data_sources: DataSources {
            customers: Some(write("customers.csv", CUSTOMERS_CSV)?),
            products: Some(write("products.csv", PRODUCTS_CSV)?),
            orders: Some(write("orders.csv", ORDERS_CSV)?),
            order_details: Some(write("order_details.csv", ORDER_DETAILS_CSV)?),
        },
        target: TargetConfig {
            database: dir.path().join("target.db").to_string_lossy().to_string(),
            clear_timeout_secs: 5,
            bulk_timeout_secs: 5,
        },
    })
}

fn orchestrator_for(config: &Config) -> Result<EtlOrchestrator> {
    let loader = SqliteLoader::new(
        config.target.database.clone(),
        Duration::from_secs(config.target.clear_timeout_secs),
        Duration::from_secs(config.target.bulk_timeout_secs),
    )?;
    Ok(EtlOrchestrator::new(
        Arc::new(CsvFileExtractor::new()),
        Arc::new(loader),
        config.clone(),
    ))
}

fn table_count(db: &str, table: &str) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[tokio::test]
async fn full_run_cleans_dedupes_and_loads() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = setup(&dir)?;
    let db = config.target.database.clone();

    let summary = orchestrator_for(&config)?.run().await?;

    // every surviving order references a loaded customer
    assert_eq!(summary.status, RunStatus::Succeeded);

    // customers: one invalid email, one duplicate id
    assert_eq!(summary.customers.extracted, 4);
    assert_eq!(summary.customers.invalid_dropped, 1);
    assert_eq!(summary.customers.duplicates_removed, 1);
    assert_eq!(summary.customers.loaded, 2);

    // products: zero price dropped, zero stock kept
    assert_eq!(summary.products.loaded, 2);

    // orders: the one with an empty date dropped
    assert_eq!(summary.orders.invalid_dropped, 1);
    assert_eq!(summary.orders.loaded, 2);

    // order details: one duplicate composite key removed
    assert_eq!(summary.order_details.duplicates_removed, 1);
    assert_eq!(summary.order_details.loaded, 3);

    assert_eq!(table_count(&db, "customers"), 2);
    assert_eq!(table_count(&db, "products"), 2);
    assert_eq!(table_count(&db, "orders"), 2);
    assert_eq!(table_count(&db, "order_details"), 3);

    // cleaning reached the persisted rows
    let conn = Connection::open(&db)?;
    let email: String = conn.query_row(
        "SELECT email FROM customers WHERE customerid = 1",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(email, "ana@example.com");

    Ok(())
}

#[tokio::test]
async fn rerun_replaces_previous_target_contents() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = setup(&dir)?;
    let db = config.target.database.clone();

    orchestrator_for(&config)?.run().await?;
    orchestrator_for(&config)?.run().await?;

    // clear-before-load keeps reruns from accumulating rows
    assert_eq!(table_count(&db, "customers"), 2);
    assert_eq!(table_count(&db, "order_details"), 3);
    Ok(())
}

#[tokio::test]
async fn dangling_order_reference_completes_with_warning() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = setup(&dir)?;

    // order 13 references customer 42, which no source file provides
    let orders_path = dir.path().join("orders.csv");
    fs::write(
        &orders_path,
        "OrderID,CustomerID,OrderDate,Status\n13,42,2024-02-01 09:00:00,pending\n",
    )?;
    config.data_sources.orders = Some(orders_path.to_string_lossy().to_string());

    let summary = orchestrator_for(&config)?.run().await?;
    assert_eq!(summary.status, RunStatus::SucceededWithWarning);
    Ok(())
}

#[tokio::test]
async fn missing_source_file_fails_the_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = setup(&dir)?;
    config.data_sources.products = Some(
        dir.path()
            .join("does-not-exist.csv")
            .to_string_lossy()
            .to_string(),
    );

    assert!(orchestrator_for(&config)?.run().await.is_err());
    Ok(())
}

#[tokio::test]
async fn unset_source_path_fails_the_run_up_front() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("untouched.db");
    let config = Config {
        data_sources: DataSources {
            customers: None,
            products: None,
            orders: None,
            order_details: None,
        },
        target: TargetConfig {
            database: db_path.to_string_lossy().to_string(),
            clear_timeout_secs: 5,
            bulk_timeout_secs: 5,
        },
    };

    let err = orchestrator_for(&config)?.run().await.unwrap_err();
    assert!(err.to_string().contains("data_sources.customers"));
    Ok(())
}
