pub mod bio;
pub mod cli;
pub mod config;
pub mod encoding;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod utils;

pub use crate::bio::sequence::{Dataset, SequenceRecord};
pub use crate::config::{default_config, load_config, Config};
pub use crate::error::{ProtlocError, ProtlocResult};
pub use crate::features::{FeatureId, FeatureTable, Scope};
pub use crate::pipeline::{handcrafted, handcrafted_raw, load_data, sequences};
