pub mod changeset;
pub mod listing;
pub mod pool;
pub mod records;
pub mod uniqueness;
