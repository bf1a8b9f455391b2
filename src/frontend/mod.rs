pub mod aig;

pub use aig::{Aig, AigerError};
