pub mod dto;
pub mod error;
pub mod report;
pub mod util;
