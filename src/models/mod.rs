pub mod attendance;
pub mod audit;
pub mod money;
pub mod payment;
pub mod site;
pub mod worker;
