pub mod encode;
pub mod features;
pub mod stats;
