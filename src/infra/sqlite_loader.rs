//! SQLite adapter for the loader port.
//!
//! Each call opens its own connection and wraps its writes in one
//! transaction; dropping an uncommitted transaction on an early return rolls
//! back every insert made by that call. No transaction spans two calls, so a
//! failed orders load leaves an already-committed products load in place.

use crate::app::ports::DataLoader;
use crate::domain::{Customer, Order, OrderDetail, Product};
use crate::error::Result;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Rows per insert chunk when loading order line items. All chunks of one
/// call share a single transaction.
pub const ORDER_DETAIL_BATCH_SIZE: usize = 5000;

pub struct SqliteLoader {
    db_path: PathBuf,
    clear_timeout: Duration,
    bulk_timeout: Duration,
}

impl SqliteLoader {
    pub fn new(
        db_path: impl Into<PathBuf>,
        clear_timeout: Duration,
        bulk_timeout: Duration,
    ) -> Result<Self> {
        let loader = Self {
            db_path: db_path.into(),
            clear_timeout,
            bulk_timeout,
        };
        loader.ensure_schema()?;
        Ok(loader)
    }

    /// Each call owns its own connection; nothing is shared across loads.
    fn open(&self, timeout: Duration) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(timeout)?;
        Ok(conn)
    }

    fn ensure_schema(&self) -> Result<()> {
        let conn = self.open(self.clear_timeout)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                customerid INTEGER PRIMARY KEY,
                firstname  TEXT NOT NULL,
                lastname   TEXT NOT NULL,
                email      TEXT NOT NULL,
                phone      TEXT NOT NULL,
                city       TEXT NOT NULL,
                country    TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS products (
                productid   INTEGER PRIMARY KEY,
                productname TEXT NOT NULL,
                category    TEXT NOT NULL,
                price       REAL NOT NULL,
                stock       INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS orders (
                orderid    INTEGER PRIMARY KEY,
                customerid INTEGER NOT NULL,
                orderdate  TEXT NOT NULL,
                status     TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS order_details (
                orderid    INTEGER NOT NULL,
                productid  INTEGER NOT NULL,
                quantity   INTEGER NOT NULL,
                totalprice REAL NOT NULL,
                PRIMARY KEY (orderid, productid)
            );
            "#,
        )?;
        Ok(())
    }
}

#[async_trait]
impl DataLoader for SqliteLoader {
    async fn clear_all(&self) -> Result<()> {
        let mut conn = self.open(self.clear_timeout)?;
        let tx = conn.transaction()?;
        // reverse dependency order so no delete strands a referencing row
        tx.execute("DELETE FROM order_details", [])?;
        tx.execute("DELETE FROM orders", [])?;
        tx.execute("DELETE FROM products", [])?;
        tx.execute("DELETE FROM customers", [])?;
        tx.commit()?;
        info!("destination tables cleared");
        Ok(())
    }

    async fn load_customers(&self, customers: &[Customer]) -> Result<()> {
        if customers.is_empty() {
            info!("no customers to load");
            return Ok(());
        }
        let mut conn = self.open(self.bulk_timeout)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO customers (customerid, firstname, lastname, email, phone, city, country)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for c in customers {
                stmt.execute(params![
                    c.customer_id,
                    c.first_name,
                    c.last_name,
                    c.email,
                    c.phone,
                    c.city,
                    c.country
                ])?;
            }
        }
        tx.commit()?;
        info!(count = customers.len(), "customers loaded");
        Ok(())
    }

    async fn load_products(&self, products: &[Product]) -> Result<()> {
        if products.is_empty() {
            info!("no products to load");
            return Ok(());
        }
        let mut conn = self.open(self.bulk_timeout)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO products (productid, productname, category, price, stock)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for p in products {
                stmt.execute(params![
                    p.product_id,
                    p.product_name,
                    p.category,
                    p.price,
                    p.stock
                ])?;
            }
        }
        tx.commit()?;
        info!(count = products.len(), "products loaded");
        Ok(())
    }

    async fn load_orders(&self, orders: &[Order]) -> Result<()> {
        if orders.is_empty() {
            info!("no orders to load");
            return Ok(());
        }
        let mut conn = self.open(self.bulk_timeout)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO orders (orderid, customerid, orderdate, status)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for o in orders {
                // a None date binds as NULL and trips the NOT NULL constraint;
                // the cleanser is expected to have filtered those out
                let order_date = o
                    .order_date
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string());
                stmt.execute(params![o.order_id, o.customer_id, order_date, o.status])?;
            }
        }
        tx.commit()?;
        info!(count = orders.len(), "orders loaded");
        Ok(())
    }

    async fn load_order_details(&self, order_details: &[OrderDetail]) -> Result<()> {
        if order_details.is_empty() {
            info!("no order details to load");
            return Ok(());
        }
        let mut conn = self.open(self.bulk_timeout)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO order_details (orderid, productid, quantity, totalprice)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            let total_chunks = order_details.len().div_ceil(ORDER_DETAIL_BATCH_SIZE);
            for (i, chunk) in order_details.chunks(ORDER_DETAIL_BATCH_SIZE).enumerate() {
                for d in chunk {
                    stmt.execute(params![d.order_id, d.product_id, d.quantity, d.total_price])?;
                }
                debug!(
                    chunk = i + 1,
                    total = total_chunks,
                    rows = chunk.len(),
                    "order detail chunk written"
                );
            }
        }
        tx.commit()?;
        info!(count = order_details.len(), "order details loaded");
        Ok(())
    }

    async fn validate_foreign_keys(&self) -> Result<bool> {
        let conn = self.open(self.clear_timeout)?;
        let dangling: i64 = conn.query_row(
            "SELECT COUNT(*) FROM orders o
             LEFT JOIN customers c ON o.customerid = c.customerid
             WHERE c.customerid IS NULL",
            [],
            |row| row.get(0),
        )?;
        if dangling > 0 {
            debug!(dangling, "orders with no matching customer");
        }
        Ok(dangling == 0)
    }
}
