//! Titanic survival classifier built on a small hand-written neural network:
//! CSV loading, column transforms, min-max scaling, an Adam-trained MLP and
//! binary classification metrics.
//!
//! - Lazy, restartable CSV batches with a declarative row transform
//! - Min-max scaling onto [-1, 1], fitted per dataset
//! - 7→64→64→32→16→1 MLP, ReLU hidden layers, sigmoid output, MSE loss
//! - Accuracy / precision / recall / F1 report

pub mod activations;
pub mod batcher;
pub mod config;
pub mod datasets;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod normalize;
pub mod optimizer;
pub mod pipeline;
pub mod schema;
pub mod trainer;
pub mod transform;
pub mod utils;

pub use activations::{Activation, ActivationKind, ReLU, Sigmoid};
pub use batcher::{Batch, BatchIterator};
pub use config::PipelineConfig;
pub use datasets::{RawRecord, RecordReader};
pub use error::DataError;
pub use layers::DenseLayer;
pub use metrics::{ConfusionMatrix, Evaluation};
pub use network::{NetworkConfig, MLP};
pub use normalize::MinMaxScaler;
pub use optimizer::Adam;
pub use schema::{ColumnType, Schema};
pub use trainer::{Trainer, TrainingHistory};
pub use transform::{TransformProcess, TransformStep};
pub use utils::{print_model_summary, print_summary_table};
