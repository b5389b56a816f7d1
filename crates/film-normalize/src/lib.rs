//! Column normalization for heterogeneous film datasets.
//!
//! Every raw source arrives with its own header spelling and cell encoding.
//! This crate brings a source into the canonical schema before it joins a
//! dataset.
//!
//! # Features
//!
//! - **Renaming**: positional replacement names, `_` placeholders dropped,
//!   plural headers folded onto their canonical form
//! - **Multi-value splitting**: free-text cells split on `,`/`;` into lists
//! - **Dates**: permissive parsing rendered in a target strftime format
//! - **Booleans**: token pairs mapped onto flags
//!
//! # Example
//!
//! ```ignore
//! use film_normalize::{NormalizeOptions, normalize, to_date, DEFAULT_DATE_FORMAT};
//!
//! let table = normalize(raw, &["movie_name", "movie_date", "director"], &NormalizeOptions::default())?;
//! let table = to_date(table, "movie_date", DEFAULT_DATE_FORMAT)?;
//! ```

mod boolean;
mod columns;
mod date;
mod error;
mod source;

// === Error Types ===
pub use error::{NormalizeError, Result};

// === Column Normalizer ===
pub use columns::{DEFAULT_NO_SPLIT, NormalizeOptions, PLACEHOLDER_PREFIX, normalize, split_cell};

// === Value Coercion ===
pub use boolean::to_boolean;
pub use date::{DEFAULT_DATE_FORMAT, parse_date, parse_date_cell, to_date};

// === Source Recipes ===
pub use source::{BooleanTokens, SourceRecipe, normalize_source};
