// Run building blocks
pub mod batch;
pub mod dedup;
pub mod identity;
pub mod page;
pub mod paginate;
pub mod resolve;
