// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Document generators.

use chrono::NaiveDate;
use crpt_throttle::{Document, Product};

/// Participant INN used by generated documents.
pub const TEST_INN: &str = "7700000000";

/// Generate a single document with the given id.
pub fn document(doc_id: &str) -> Document {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    Document::introduce_goods(doc_id, TEST_INN, date).with_product(Product {
        owner_inn: TEST_INN.to_string(),
        producer_inn: TEST_INN.to_string(),
        production_date: Some(date),
        tnved_code: "6403".to_string(),
        uit_code: Some(format!("0104600000000000{doc_id}")),
        ..Default::default()
    })
}

/// Generate `count` documents with ids `doc-0`, `doc-1`, ...
pub fn documents(count: usize) -> Vec<Document> {
    (0..count).map(|i| document(&format!("doc-{i}"))).collect()
}
