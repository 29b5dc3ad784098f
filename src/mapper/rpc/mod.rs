pub mod blocks;
pub mod receipts;
pub mod traces;
