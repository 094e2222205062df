//! CSV file adapter for the extractor port. Header-to-field mappings live on
//! the domain types themselves (serde renames), so this adapter stays
//! entirely generic.

use crate::app::ports::DataExtractor;
use crate::domain::{Customer, Order, OrderDetail, Product};
use crate::error::Result;
use async_trait::async_trait;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct CsvFileExtractor;

impl CsvFileExtractor {
    pub fn new() -> Self {
        Self
    }

    fn read_records<T: DeserializeOwned>(source: &Path) -> Result<Vec<T>> {
        let file = File::open(source)?;
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record?);
        }

        debug!(
            source = %source.display(),
            count = records.len(),
            "extracted records"
        );
        Ok(records)
    }
}

#[async_trait]
impl DataExtractor for CsvFileExtractor {
    async fn extract_customers(&self, source: &Path) -> Result<Vec<Customer>> {
        Self::read_records(source)
    }

    async fn extract_products(&self, source: &Path) -> Result<Vec<Product>> {
        Self::read_records(source)
    }

    async fn extract_orders(&self, source: &Path) -> Result<Vec<Order>> {
        Self::read_records(source)
    }

    async fn extract_order_details(&self, source: &Path) -> Result<Vec<OrderDetail>> {
        Self::read_records(source)
    }
}
