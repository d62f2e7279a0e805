pub mod netting_solver;
pub mod share_calculator;

pub use netting_solver::NettingSolver;
pub use share_calculator::ShareCalculator;
