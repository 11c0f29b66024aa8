//! Fixed-epoch training loop.
use crate::batcher::BatchIterator;
use crate::network::MLP;
use crate::optimizer::Adam;
use anyhow::{anyhow, Result};

/// Scores recorded while training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    /// Mean batch score of each epoch, in order.
    pub epoch_scores: Vec<f64>,
    /// Total parameter updates performed.
    pub iterations: usize,
}

/// Owns the model and optimizer state for the duration of training.
#[derive(Debug)]
pub struct Trainer {
    model: MLP,
    optimizer: Adam,
    score_every: usize,
    iteration: usize,
}

impl Trainer {
    /// `score_every`: log the batch score every this many iterations.
    pub fn new(model: MLP, optimizer: Adam, score_every: usize) -> Self {
        Self {
            model,
            optimizer,
            score_every: score_every.max(1),
            iteration: 0,
        }
    }

    /// Iterations run so far, across every call to `fit`.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn model(&self) -> &MLP {
        &self.model
    }

    pub fn into_model(self) -> MLP {
        self.model
    }

    /// Run `epochs` full passes over `iter`, one Adam step per batch.
    /// No early stopping and no checkpoints.
    pub fn fit(&mut self, iter: &mut BatchIterator, epochs: usize) -> Result<TrainingHistory> {
        let mut history = TrainingHistory::default();
        for epoch in 0..epochs {
            iter.reset()?;
            let mut total = 0.0;
            let mut batches = 0usize;
            for batch in iter.by_ref() {
                let batch = batch?;
                let score = self.model.fit_batch(&batch, &mut self.optimizer)?;
                if !score.is_finite() {
                    return Err(anyhow!("Score diverged at iteration {}", self.iteration));
                }
                if should_log(self.iteration, self.score_every) {
                    tracing::info!("Score at iteration {} is {}", self.iteration, score);
                }
                self.iteration += 1;
                history.iterations += 1;
                total += score;
                batches += 1;
            }
            if batches == 0 {
                return Err(anyhow!("Training iterator produced no batches"));
            }
            let avg = total / batches as f64;
            tracing::debug!(epoch = epoch + 1, score = avg, "epoch complete");
            history.epoch_scores.push(avg);
        }
        Ok(history)
    }
}

/// Score is logged at iteration 0 and every `every` iterations after.
fn should_log(iteration: usize, every: usize) -> bool {
    iteration % every == 0
}
