// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod aggregate;
mod columns;

pub use aggregate::{aggregate, aggregate_lot};
pub use columns::{
    chemical_columns, chemical_entries, physical_columns, physical_entries, resolve_columns,
    MatrixRow, ParameterMatrix,
};

pub const CRATE_NAME: &str = "millcert-ingest";
