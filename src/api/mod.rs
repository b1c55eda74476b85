pub mod broker;
pub mod broker_dto;
pub mod stockq;
pub mod utils;
