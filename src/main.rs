use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use titanic_mlp::{pipeline, print_model_summary, print_summary_table, PipelineConfig};

/// Train the Titanic survival network and print its evaluation on the test set.
#[derive(Parser, Debug)]
#[command(name = "titanic", version)]
struct Cli {
    /// JSON file with a full or partial run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Training CSV (header line + 12 passenger columns)
    #[arg(long)]
    train: Option<PathBuf>,

    /// Labelled test CSV with the same layout as the training file
    #[arg(long)]
    test: Option<PathBuf>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    /// Weight initialization seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log the training score every N iterations
    #[arg(long)]
    score_every: Option<usize>,

    /// Save the trained model (gzipped JSON) to this path
    #[arg(long)]
    model_out: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(v) = self.train {
            config.train_path = v;
        }
        if let Some(v) = self.test {
            config.test_path = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.epochs {
            config.epochs = v;
        }
        if let Some(v) = self.learning_rate {
            config.learning_rate = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.score_every {
            config.score_every = v;
        }
        if self.model_out.is_some() {
            config.model_out = self.model_out;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("titanic_mlp=info,titanic=info")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    tracing::info!("Running with {:?}", config);

    let report = pipeline::run(&config)?;
    print_model_summary(&report.model);
    print_summary_table(&report.history, "Training Score");
    println!("\n{}", report.evaluation);
    Ok(())
}
