pub mod attendance;
pub mod export;
pub mod subsidy;
