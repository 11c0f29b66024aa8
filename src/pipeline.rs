//! The run as a straight sequence of stages:
//! load → transform → batch → normalize → build → train → evaluate.
use crate::batcher::BatchIterator;
use crate::config::PipelineConfig;
use crate::datasets::RecordReader;
use crate::metrics::Evaluation;
use crate::network::{NetworkConfig, MLP};
use crate::normalize::MinMaxScaler;
use crate::optimizer::Adam;
use crate::trainer::{Trainer, TrainingHistory};
use crate::transform::TransformProcess;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Target range of the feature scaler.
pub const SCALE_RANGE: (f64, f64) = (-1.0, 1.0);

pub const LABEL_COLUMN: &str = "Survived";

/// Everything a finished run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub model: MLP,
    pub history: TrainingHistory,
    pub evaluation: Evaluation,
    pub train_scaler: MinMaxScaler,
    pub test_scaler: MinMaxScaler,
}

/// Open `path` and wrap it in a batch iterator over transformed Titanic rows.
/// The skipped header line, if any, must match the schema.
pub fn build_iterator(path: &Path, config: &PipelineConfig) -> Result<BatchIterator> {
    let reader = RecordReader::open(path, config.skip_lines)?;
    let process = TransformProcess::titanic()?;
    if let Some(header) = reader.header() {
        process
            .input_schema()
            .check_header(header.iter().map(String::as_str))
            .with_context(|| format!("reading {}", path.display()))?;
    }
    let label_index = process.output_index_of(LABEL_COLUMN)?;
    Ok(BatchIterator::new(reader, process, config.batch_size, label_index)?)
}

/// Fit a scaler on one full pass of `iter` and attach it as the iterator's
/// preprocessor.
pub fn fit_normalizer(iter: &mut BatchIterator) -> Result<MinMaxScaler> {
    let (lo, hi) = SCALE_RANGE;
    let scaler = MinMaxScaler::fit_iterator(iter, lo, hi)?;
    iter.set_preprocessor(scaler.clone());
    Ok(scaler)
}

pub fn build_model(config: &PipelineConfig, input_size: usize) -> MLP {
    let mut network = NetworkConfig::titanic(config.seed);
    network.input_size = input_size;
    MLP::new(&network)
}

pub fn train(model: MLP, iter: &mut BatchIterator, config: &PipelineConfig) -> Result<(MLP, TrainingHistory)> {
    let mut trainer = Trainer::new(model, Adam::new(config.learning_rate), config.score_every);
    let history = trainer.fit(iter, config.epochs)?;
    Ok((trainer.into_model(), history))
}

pub fn evaluate(model: &MLP, iter: &mut BatchIterator) -> Result<Evaluation> {
    Ok(Evaluation::evaluate(model, iter)?)
}

/// Write the model and, next to it, the training scaler as JSON.
pub fn save_artifacts(model: &MLP, scaler: &MinMaxScaler, path: &Path) -> Result<PathBuf> {
    model.save(path)?;
    let scaler_path = path.with_extension("scaler.json");
    std::fs::write(&scaler_path, serde_json::to_vec_pretty(scaler)?)
        .with_context(|| format!("writing {}", scaler_path.display()))?;
    Ok(scaler_path)
}

/// Run every stage in order.
///
/// Train and test each get their own scaler fitted on their own data.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;

    let mut train_iter = build_iterator(&config.train_path, config)?;
    let mut test_iter = build_iterator(&config.test_path, config)?;

    let train_scaler = fit_normalizer(&mut train_iter)?;
    let test_scaler = fit_normalizer(&mut test_iter)?;
    tracing::info!(
        "Fitted scalers on {} features (train: {}, test: {})",
        train_scaler.num_features(),
        config.train_path.display(),
        config.test_path.display()
    );

    let model = build_model(config, train_iter.num_features());
    tracing::info!("Training {} for {} epochs", model, config.epochs);
    let (model, history) = train(model, &mut train_iter, config)?;
    tracing::info!("Training finished after {} iterations", history.iterations);

    let evaluation = evaluate(&model, &mut test_iter)?;

    if let Some(path) = &config.model_out {
        let scaler_path = save_artifacts(&model, &train_scaler, path)?;
        tracing::info!(
            "Saved model to {} and scaler to {}",
            path.display(),
            scaler_path.display()
        );
    }

    Ok(PipelineReport {
        model,
        history,
        evaluation,
        train_scaler,
        test_scaler,
    })
}
