use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("projected annual dividend for {year} is not finite")]
    NonFiniteIncome { year: i32 },
}
