//! Data source collaborators.
//!
//! Two ingestion seams feed the pipelines: a relational source queried
//! through sqlx and a remote delimited file fetched over HTTP. Both
//! return plain DataFrames; a source that yields zero rows is an error
//! distinct from a connection or fetch failure.

pub mod database;
pub mod remote;

pub use database::query_to_dataframe;
pub use remote::RemoteCsvClient;
