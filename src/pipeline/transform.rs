//! Cleaning and deduplication of extracted entity sets.
//!
//! The two core algorithms ([`clean`] and [`dedupe`]) are generic over the
//! [`Record`] strategy trait; adding an entity shape means adding one trait
//! impl, not extending a chain of type tests. Filtering never raises: invalid
//! and duplicate records are silently excluded and counted.

use crate::domain::{Customer, Order, OrderDetail, Product};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::hash::Hash;

/// Everything that is not a digit, `+`, `-`, `(`, `)`, or whitespace gets
/// stripped from phone numbers.
static PHONE_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d\+\-\(\)\s]").unwrap());

/// Per-entity cleaning strategy: field normalization, the validity predicate,
/// and the deduplication key.
pub trait Record {
    type Key: Eq + Hash;

    /// Normalizes field values in place. Runs before [`Record::is_valid`].
    fn normalize(&mut self);

    /// Records failing this predicate are dropped, never mutated into shape.
    fn is_valid(&self) -> bool;

    fn key(&self) -> Self::Key;
}

/// Surviving records of a cleaning pass plus the count of dropped ones.
#[derive(Debug)]
pub struct CleanReport<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

/// Surviving records of a deduplication pass plus the count of removed ones.
#[derive(Debug)]
pub struct DedupeReport<T> {
    pub records: Vec<T>,
    pub removed: usize,
}

/// Normalizes every record, then drops those failing their validity
/// predicate. Input order is preserved among survivors.
pub fn clean<T: Record>(records: Vec<T>) -> CleanReport<T> {
    let original = records.len();
    let mut cleaned = Vec::with_capacity(original);
    for mut record in records {
        record.normalize();
        if record.is_valid() {
            cleaned.push(record);
        }
    }
    let dropped = original - cleaned.len();
    CleanReport {
        records: cleaned,
        dropped,
    }
}

/// Drops records whose key has already been seen; the first record of each
/// key group, in original order, wins.
pub fn dedupe<T: Record>(records: Vec<T>) -> DedupeReport<T> {
    let original = records.len();
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(original);
    for record in records {
        if seen.insert(record.key()) {
            unique.push(record);
        }
    }
    let removed = original - unique.len();
    DedupeReport {
        records: unique,
        removed,
    }
}

/// Deliberately weak check that a set survived the transform at all. Deeper
/// integrity checks run against the target after loading.
pub fn validate_non_empty<T>(records: &[T]) -> bool {
    !records.is_empty()
}

fn clean_string(input: &str) -> String {
    input.trim().to_string()
}

fn clean_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn clean_phone(phone: &str) -> String {
    PHONE_JUNK.replace_all(phone.trim(), "").into_owned()
}

impl Record for Customer {
    type Key = i64;

    fn normalize(&mut self) {
        self.first_name = clean_string(&self.first_name);
        self.last_name = clean_string(&self.last_name);
        self.email = clean_email(&self.email);
        self.phone = clean_phone(&self.phone);
        self.city = clean_string(&self.city);
        self.country = clean_string(&self.country);
    }

    fn is_valid(&self) -> bool {
        self.customer_id > 0 && !self.email.is_empty() && self.email.contains('@')
    }

    fn key(&self) -> i64 {
        self.customer_id
    }
}

impl Record for Product {
    type Key = i64;

    fn normalize(&mut self) {
        self.product_name = clean_string(&self.product_name);
        self.category = clean_string(&self.category);
    }

    fn is_valid(&self) -> bool {
        self.product_id > 0 && self.price > 0.0 && self.stock >= 0
    }

    fn key(&self) -> i64 {
        self.product_id
    }
}

impl Record for Order {
    type Key = i64;

    fn normalize(&mut self) {
        self.status = clean_string(&self.status);
    }

    fn is_valid(&self) -> bool {
        self.order_id > 0 && self.customer_id > 0 && self.order_date.is_some()
    }

    fn key(&self) -> i64 {
        self.order_id
    }
}

impl Record for OrderDetail {
    type Key = (i64, i64);

    // Line items carry no free-text fields
    fn normalize(&mut self) {}

    fn is_valid(&self) -> bool {
        self.order_id > 0 && self.product_id > 0 && self.quantity > 0 && self.total_price > 0.0
    }

    fn key(&self) -> (i64, i64) {
        (self.order_id, self.product_id)
    }
}
