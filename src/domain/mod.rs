pub mod order;
pub mod review;
