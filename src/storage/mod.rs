pub mod database;
pub mod filter;
pub mod pattern;
pub mod result;
pub mod schema;
pub mod table;

pub use database::{Database, Transaction};
pub use filter::Filter;
pub use result::{Record, RowSet};
pub use table::{Column, Table, TableSchema};
