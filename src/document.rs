// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Goods-introduction document accepted by the CRPT create endpoint.
//!
//! Field names follow the wire format. Contents are not validated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document type for introducing domestically produced goods
pub const INTRODUCE_GOODS: &str = "LP_INTRODUCE_GOODS";

/// Participant description block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

/// Document submitted for creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    pub doc_id: String,
    pub doc_status: String,
    pub doc_type: String,
    #[serde(rename = "importRequest", default)]
    pub import_request: bool,
    pub owner_inn: String,
    pub participant_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub production_type: String,
    #[serde(default)]
    pub products: Vec<Product>,
    pub reg_date: NaiveDate,
    pub reg_number: String,
}

/// Product line within a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_number: Option<String>,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: Option<NaiveDate>,
    pub tnved_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uit_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uitu_code: Option<String>,
}

impl Document {
    /// Create a goods-introduction document where one participant owns and
    /// produces the goods.
    pub fn introduce_goods(doc_id: impl Into<String>, inn: impl Into<String>, date: NaiveDate) -> Self {
        let inn = inn.into();
        Self {
            description: Some(Description {
                participant_inn: inn.clone(),
            }),
            doc_id: doc_id.into(),
            doc_status: "NEW".to_string(),
            doc_type: INTRODUCE_GOODS.to_string(),
            import_request: false,
            owner_inn: inn.clone(),
            participant_inn: inn.clone(),
            producer_inn: inn,
            production_date: date,
            production_type: "OWN_PRODUCTION".to_string(),
            products: Vec::new(),
            reg_date: date,
            reg_number: String::new(),
        }
    }

    /// Builder-style: append a product line
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }
}
