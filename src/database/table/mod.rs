//! Typed table and record layer
//!
//! - `record`: the [`Record`] type and its conversion to statement parameters
//! - `query`: statement construction, including predicate filters
//! - `manager`: [`TableManager`], the entry point tying both to a connection

mod manager;
mod query;
mod record;

pub use manager::{ManagerState, TableManager};
pub use query::{CompareOp, Condition, Predicate, QueryBuilder, Statement};
pub use record::{decode_row, encode_for_insert, encode_for_update, Record};
