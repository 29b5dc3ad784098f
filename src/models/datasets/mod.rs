pub mod blocks;
pub mod traces;
pub mod transactions;
