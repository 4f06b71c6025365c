// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use gridbind_app::{
    ColumnMetadata, DataSource, Grid, GridBuilder, OperatorFamily, Row, SortDirection,
};
use rusqlite::{Connection, params};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use time::macros::date;
use time::{Date, Duration};

const PRODUCT_NOUNS: [&str; 12] = [
    "Bolt", "Washer", "Hinge", "Bracket", "Anchor", "Clamp", "Spring", "Gasket", "Rivet",
    "Hook", "Latch", "Pulley",
];

const PRODUCT_FINISHES: [&str; 6] = ["Zinc", "Brass", "Steel", "Nylon", "Copper", "Chrome"];

const PRODUCT_CATEGORIES: [&str; 5] = ["Fasteners", "Hardware", "Plumbing", "Garden", "Tools"];

const FIRST_STOCKED: Date = date!(2026-01-05);

/// Operation seen by a [`RecordingSource`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOp {
    Where(String),
    OrderBy(String),
    OrderByDescending(String),
    Take(i64),
    Skip(i64),
    Count,
    Materialize,
}

/// In-memory [`DataSource`] that records what the composer asks of it.
///
/// Clones share one journal, so a test keeps a handle and hands a clone to
/// the grid. Predicates and ordering are only recorded; `materialize` windows
/// the fixed rows with the last take/skip.
#[derive(Debug, Clone)]
pub struct RecordingSource {
    journal: Rc<RefCell<Vec<SourceOp>>>,
    rows: Rc<Vec<Row>>,
    total: Option<i64>,
    failure: Option<String>,
    take: Option<i64>,
    skip: i64,
}

impl RecordingSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            journal: Rc::default(),
            rows: Rc::new(rows),
            total: None,
            failure: None,
            take: None,
            skip: 0,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Reports `total` from `count` instead of the number of fixed rows.
    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    /// Fails every `count` and `materialize` with `message`.
    pub fn failing(message: &str) -> Self {
        let mut source = Self::empty();
        source.failure = Some(message.to_owned());
        source
    }

    pub fn ops(&self) -> Vec<SourceOp> {
        self.journal.borrow().clone()
    }

    pub fn count_calls(&self) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|op| **op == SourceOp::Count)
            .count()
    }

    pub fn predicates(&self) -> Vec<String> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|op| match op {
                SourceOp::Where(predicate) => Some(predicate.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn orderings(&self) -> Vec<(String, SortDirection)> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|op| match op {
                SourceOp::OrderBy(expression) => Some((expression.clone(), SortDirection::Asc)),
                SourceOp::OrderByDescending(expression) => {
                    Some((expression.clone(), SortDirection::Desc))
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: SourceOp) {
        self.journal.borrow_mut().push(op);
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

impl DataSource for RecordingSource {
    fn and_where(&mut self, predicate: &str) {
        self.record(SourceOp::Where(predicate.to_owned()));
    }

    fn order_by(&mut self, expression: &str) {
        self.record(SourceOp::OrderBy(expression.to_owned()));
    }

    fn order_by_descending(&mut self, expression: &str) {
        self.record(SourceOp::OrderByDescending(expression.to_owned()));
    }

    fn take(&mut self, count: i64) {
        self.record(SourceOp::Take(count));
        self.take = Some(count.max(0));
    }

    fn skip(&mut self, count: i64) {
        self.record(SourceOp::Skip(count));
        self.skip = count.max(0);
    }

    fn count(self) -> Result<i64> {
        self.record(SourceOp::Count);
        self.check_failure()?;
        Ok(self.total.unwrap_or(self.rows.len() as i64))
    }

    fn materialize(self) -> Result<Vec<Row>> {
        self.record(SourceOp::Materialize);
        self.check_failure()?;
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .take
            .map_or(usize::MAX, |take| usize::try_from(take).unwrap_or(usize::MAX));
        Ok(self.rows.iter().skip(skip).take(take).cloned().collect())
    }
}

/// Deterministic catalog entry used by the demo grid and the tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub stocked_on: Date,
}

impl Product {
    pub fn nth(index: usize) -> Self {
        let noun = PRODUCT_NOUNS[index % PRODUCT_NOUNS.len()];
        let finish = PRODUCT_FINISHES[(index / PRODUCT_NOUNS.len()) % PRODUCT_FINISHES.len()];
        let index_i64 = index as i64;
        Self {
            id: index_i64 + 1,
            name: format!("{finish} {noun}"),
            category: PRODUCT_CATEGORIES[index % PRODUCT_CATEGORIES.len()].to_owned(),
            price_cents: 150 + (index_i64 * 137) % 4_850,
            quantity: (index_i64 * 7) % 23,
            stocked_on: FIRST_STOCKED + Duration::days(index_i64 % 60),
        }
    }

    pub fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("category", self.category.as_str())
            .with("price_cents", self.price_cents)
            .with("quantity", self.quantity)
            .with("stocked_on", self.stocked_on.to_string())
    }
}

pub fn products(count: usize) -> Vec<Product> {
    (0..count).map(Product::nth).collect()
}

pub fn product_records(count: usize) -> Vec<Row> {
    products(count).iter().map(Product::to_row).collect()
}

pub fn product_categories() -> &'static [&'static str] {
    &PRODUCT_CATEGORIES
}

pub fn create_products_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS products (
            id          INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            category    TEXT NOT NULL,
            price_cents INTEGER NOT NULL,
            quantity    INTEGER NOT NULL,
            stocked_on  TEXT NOT NULL
        );
        ",
    )
    .context("create products table")
}

pub fn seed_products(conn: &Connection, count: usize) -> Result<()> {
    create_products_table(conn)?;
    let mut stmt = conn
        .prepare(
            "
            INSERT INTO products (id, name, category, price_cents, quantity, stocked_on)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .context("prepare product insert")?;
    for product in products(count) {
        stmt.execute(params![
            product.id,
            product.name,
            product.category,
            product.price_cents,
            product.quantity,
            product.stocked_on.to_string(),
        ])
        .with_context(|| format!("insert product {}", product.id))?;
    }
    Ok(())
}

/// Column layout of the product catalog listing, without grouping.
pub fn products_grid_builder() -> GridBuilder {
    Grid::builder("products")
        .column(ColumnMetadata::number("id", "Id").not_exportable())
        .column(ColumnMetadata::text("name", "Name").searchable("name"))
        .column(
            ColumnMetadata::text("category", "Category")
                .searchable_with("category", OperatorFamily::Literal),
        )
        .column(
            ColumnMetadata::money("price", "Price")
                .bind_to("price_cents")
                .searchable("price_cents"),
        )
        .column(ColumnMetadata::number("quantity", "Qty").searchable("quantity"))
        .column(ColumnMetadata::date("stocked_on", "Stocked").searchable("stocked_on"))
        .column(ColumnMetadata::command("edit", "Edit"))
        .filter("In stock", "quantity > 0")
        .filter("Premium", "price_cents >= 2500")
        .page_size(10)
}

pub fn products_grid() -> Result<Grid> {
    Ok(products_grid_builder().build()?)
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("gridbind.db");
    Ok((dir, db_path))
}
