//! The typed shape of a bulk-import row and its validation failures.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::database_id::DatabaseId;

/// A bulk-import row as received from the OCR/upload source.
///
/// Every field is optional at the wire level; validation decides which
/// absences are fatal for the row. Rows echo back verbatim in the
/// `inserted` list of the import response, so the struct round-trips
/// through serde unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// The lump amount of the row's transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<AmountField>,
    /// The mark code identifying the wholesaler the row belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
    /// The row's date, in one of several loosely specified formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// An amount that may arrive as a JSON number or as text, possibly with
/// thousands-separator commas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    /// A plain JSON number.
    Number(f64),
    /// Text such as `"1,250.50"`.
    Text(String),
}

impl AmountField {
    /// The amount as a number, with thousands separators stripped.
    ///
    /// Empty text counts as absent, not as a parse failure.
    pub fn parse(&self) -> Result<f64, RowIssue> {
        match self {
            AmountField::Number(amount) => Ok(*amount),
            AmountField::Text(text) => {
                let cleaned = text.replace(',', "");
                let trimmed = cleaned.trim();

                if trimmed.is_empty() {
                    return Err(RowIssue::MissingAmount);
                }

                trimmed
                    .parse()
                    .map_err(|_| RowIssue::InvalidAmount(text.clone()))
            }
        }
    }
}

/// Why a bulk-import row was rejected.
///
/// Row issues are collected per batch and reported back to the caller;
/// they never abort the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    /// The row had no amount.
    MissingAmount,
    /// The row's amount could not be parsed as a number.
    InvalidAmount(String),
    /// A wholesaler-batch row had no mark to match on.
    MissingMark,
    /// The row had no date.
    MissingDate,
    /// The row's date matched none of the accepted formats.
    UnparseableDate(String),
    /// No wholesaler carries the row's mark and auto-creation was off.
    UnknownMark(String),
    /// A pan-shop batch did not name a target pan shop.
    MissingPanShop,
    /// The pan shop the batch targets does not exist.
    UnknownPanShop(DatabaseId),
    /// The store rejected the row.
    Store(String),
}

impl Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowIssue::MissingAmount => write!(f, "missing amount"),
            RowIssue::InvalidAmount(text) => write!(f, "invalid amount \"{text}\""),
            RowIssue::MissingMark => write!(f, "missing mark"),
            RowIssue::MissingDate => write!(f, "missing date"),
            RowIssue::UnparseableDate(text) => write!(f, "could not parse date \"{text}\""),
            RowIssue::UnknownMark(mark) => {
                write!(f, "wholesaler with mark \"{mark}\" not found")
            }
            RowIssue::MissingPanShop => write!(f, "no pan shop selected"),
            RowIssue::UnknownPanShop(id) => write!(f, "pan shop with ID {id} not found"),
            RowIssue::Store(message) => write!(f, "store error: {message}"),
        }
    }
}
