pub mod cross_chain;
pub mod fees;
pub mod traces;
pub mod transactions;
