//! Multi-Layer Perceptron (MLP) with minibatch gradients and persistence.
use crate::activations::ActivationKind;
use crate::batcher::Batch;
use crate::layers::{DenseLayer, Matrix};
use crate::loss::{mse_deriv, mse_loss};
use crate::optimizer::Adam;
use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Layer sizes and activations for an [`MLP`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
    pub output_size: usize,
    pub hidden_activation: ActivationKind,
    pub output_activation: ActivationKind,
    /// Seed for weight initialization.
    pub seed: u64,
}

impl NetworkConfig {
    /// 7 → 64 → 64 → 32 → 16 → 1, ReLU hidden, sigmoid output.
    pub fn titanic(seed: u64) -> Self {
        Self {
            input_size: 7,
            hidden_sizes: vec![64, 64, 32, 16],
            output_size: 1,
            hidden_activation: ActivationKind::ReLU,
            output_activation: ActivationKind::Sigmoid,
            seed,
        }
    }
}

/// MLP
#[derive(Debug)]
pub struct MLP {
    /// Ordered list of dense layers from input to output.
    pub layers: Vec<DenseLayer>,
    input_size: usize,
    output_size: usize,
}

/// Gradients for all layers in order
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub d_w: Vec<Matrix>,
    pub db: Vec<Vec<f64>>,
}

impl Gradients {
    fn zeros(layers: &[DenseLayer]) -> Self {
        Self {
            d_w: layers
                .iter()
                .map(|l| vec![vec![0.0; l.input_size()]; l.output_size()])
                .collect(),
            db: layers.iter().map(|l| vec![0.0; l.output_size()]).collect(),
        }
    }

    fn add_scaled(&mut self, other: &Gradients, scale: f64) {
        for (acc, g) in self.d_w.iter_mut().zip(&other.d_w) {
            for (acc_row, g_row) in acc.iter_mut().zip(g) {
                for (a, &x) in acc_row.iter_mut().zip(g_row) {
                    *a += scale * x;
                }
            }
        }
        for (acc, g) in self.db.iter_mut().zip(&other.db) {
            for (a, &x) in acc.iter_mut().zip(g) {
                *a += scale * x;
            }
        }
    }
}

impl MLP {
    pub fn new(config: &NetworkConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let hidden = config.hidden_activation.to_arc();
        let mut layers = Vec::with_capacity(config.hidden_sizes.len() + 1);
        let mut prev_size = config.input_size;
        for &size in &config.hidden_sizes {
            layers.push(DenseLayer::new(prev_size, size, hidden.clone(), &mut rng));
            prev_size = size;
        }
        // Output layer
        layers.push(DenseLayer::new(
            prev_size,
            config.output_size,
            config.output_activation.to_arc(),
            &mut rng,
        ));
        Self {
            layers,
            input_size: config.input_size,
            output_size: config.output_size,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn num_params(&self) -> usize {
        self.layers.iter().map(DenseLayer::num_params).sum()
    }

    /// Forward pass from input to output.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            let (_, a) = layer.forward(&current);
            current = a;
        }
        current
    }

    /// Predict outputs for a single input.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        self.forward(input)
    }

    /// Compute MSE gradients (dW, db) and the loss for a single sample.
    pub fn compute_gradients(&self, input: &[f64], target: &[f64]) -> Result<(Gradients, f64)> {
        if input.len() != self.input_size || target.len() != self.output_size {
            return Err(anyhow!(
                "Input/target size mismatch: got {}/{}, expected {}/{}",
                input.len(),
                target.len(),
                self.input_size,
                self.output_size
            ));
        }
        // Forward cache
        let mut activations = vec![input.to_vec()];
        let mut zs: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len());
        let mut current = input.to_vec();
        for layer in &self.layers {
            let (z, a) = layer.forward(&current);
            zs.push(z);
            activations.push(a.clone());
            current = a;
        }
        let loss = mse_loss(&current, target);
        let mut delta = mse_deriv(&current, target);

        let mut d_w: Vec<Matrix> = Vec::with_capacity(self.layers.len());
        let mut db: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len());
        for layer_idx in (0..self.layers.len()).rev() {
            let layer = &self.layers[layer_idx];
            let z = &zs[layer_idx];
            let a_prev = &activations[layer_idx];
            // dz = da * act'(z)
            let dz: Vec<f64> = delta
                .iter()
                .zip(z)
                .map(|(&d, &val)| d * layer.activation.derivative(val))
                .collect();
            // dW = dz (outer) a_prev
            d_w.push(
                dz.iter()
                    .map(|&dz_i| a_prev.iter().map(|&a| dz_i * a).collect())
                    .collect(),
            );
            delta = layer.propagate(&dz);
            db.push(dz);
        }
        // reverse back to layer order
        d_w.reverse();
        db.reverse();
        Ok((Gradients { d_w, db }, loss))
    }

    /// Gradients averaged over a batch with single-output binary labels,
    /// together with the batch score (mean loss).
    pub fn batch_gradients(&self, batch: &Batch) -> Result<(Gradients, f64)> {
        if batch.is_empty() {
            return Err(anyhow!("Batch is empty"));
        }
        let scale = 1.0 / batch.len() as f64;
        let mut total = Gradients::zeros(&self.layers);
        let mut score = 0.0;
        for (input, &label) in batch.features.iter().zip(&batch.labels) {
            let (grads, loss) = self.compute_gradients(input, &[label])?;
            total.add_scaled(&grads, scale);
            score += loss * scale;
        }
        Ok((total, score))
    }

    /// One optimizer step on `batch`. Returns the score before the update.
    pub fn fit_batch(&mut self, batch: &Batch, optimizer: &mut Adam) -> Result<f64> {
        let (grads, score) = self.batch_gradients(batch)?;
        optimizer.step(&mut self.layers, &grads);
        Ok(score)
    }

    /// Save model as gzipped JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dto = MlpDto::from_mlp(self);
        let json = serde_json::to_vec(&dto)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(&json)?;
        enc.finish()?;
        Ok(())
    }

    /// Load model from gzipped JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut dec = GzDecoder::new(file);
        let mut buf = Vec::new();
        dec.read_to_end(&mut buf)?;
        let dto: MlpDto = serde_json::from_slice(&buf)?;
        dto.into_mlp()
    }
}

impl fmt::Display for MLP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sizes = vec![self.input_size];
        for layer in &self.layers {
            sizes.push(layer.output_size());
        }
        write!(f, "MLP: {:?}", sizes)
    }
}

// ============ Persistence DTOs ============

#[derive(Debug, Serialize, Deserialize)]
struct LayerDto {
    input_size: usize,
    output_size: usize,
    weights: Vec<Vec<f64>>, // [output_size][input_size]
    bias: Vec<f64>,         // [output_size]
    activation: ActivationKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct MlpDto {
    input_size: usize,
    output_size: usize,
    layers: Vec<LayerDto>,
}

impl MlpDto {
    fn from_mlp(mlp: &MLP) -> Self {
        fn sanitize(v: &[f64]) -> Vec<f64> {
            v.iter().map(|&x| if x.is_finite() { x } else { 0.0 }).collect()
        }
        let layers = mlp
            .layers
            .iter()
            .map(|layer| LayerDto {
                input_size: layer.input_size(),
                output_size: layer.output_size(),
                weights: layer.weights.iter().map(|row| sanitize(row)).collect(),
                bias: sanitize(&layer.bias),
                activation: layer.activation.kind(),
            })
            .collect();
        Self {
            input_size: mlp.input_size,
            output_size: mlp.output_size,
            layers,
        }
    }

    fn into_mlp(self) -> Result<MLP> {
        let mut prev = self.input_size;
        let mut layers: Vec<DenseLayer> = Vec::with_capacity(self.layers.len());
        for (idx, ld) in self.layers.into_iter().enumerate() {
            let shape_ok = ld.input_size == prev
                && ld.bias.len() == ld.output_size
                && ld.weights.len() == ld.output_size
                && ld.weights.iter().all(|row| row.len() == ld.input_size);
            if !shape_ok {
                return Err(anyhow!("Layer {} has inconsistent shape", idx));
            }
            prev = ld.output_size;
            layers.push(DenseLayer {
                weights: ld.weights,
                bias: ld.bias,
                activation: ld.activation.to_arc(),
            });
        }
        if prev != self.output_size {
            return Err(anyhow!("Output size {} does not match last layer {}", self.output_size, prev));
        }
        Ok(MLP {
            layers,
            input_size: self.input_size,
            output_size: self.output_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> MLP {
        MLP::new(&NetworkConfig {
            input_size: 2,
            hidden_sizes: vec![4],
            output_size: 1,
            hidden_activation: ActivationKind::ReLU,
            output_activation: ActivationKind::Sigmoid,
            seed: 11,
        })
    }

    #[test]
    fn titanic_topology() {
        let mlp = MLP::new(&NetworkConfig::titanic(123));
        assert_eq!(mlp.to_string(), "MLP: [7, 64, 64, 32, 16, 1]");
        assert_eq!(mlp.num_params(), 7 * 64 + 64 + 64 * 64 + 64 + 64 * 32 + 32 + 32 * 16 + 16 + 16 + 1);
        let out = mlp.forward(&[0.0; 7]);
        assert_eq!(out.len(), 1);
        assert!((0.0..=1.0).contains(&out[0]));
    }

    #[test]
    fn same_seed_same_weights() {
        let a = MLP::new(&NetworkConfig::titanic(5));
        let b = MLP::new(&NetworkConfig::titanic(5));
        assert_eq!(a.forward(&[0.3; 7]), b.forward(&[0.3; 7]));
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut mlp = tiny();
        let input = [0.4, -0.7];
        let target = [1.0];
        let (grads, _) = mlp.compute_gradients(&input, &target).unwrap();
        let h = 1e-6;
        for (i, j) in [(0usize, 0usize), (2, 1), (3, 0)] {
            let orig = mlp.layers[0].weights[i][j];
            mlp.layers[0].weights[i][j] = orig + h;
            let up = mse_loss(&mlp.forward(&input), &target);
            mlp.layers[0].weights[i][j] = orig - h;
            let down = mse_loss(&mlp.forward(&input), &target);
            mlp.layers[0].weights[i][j] = orig;
            let numeric = (up - down) / (2.0 * h);
            assert!((numeric - grads.d_w[0][i][j]).abs() < 1e-5);
        }
    }

    #[test]
    fn fit_batch_reduces_score() {
        let mut mlp = tiny();
        let batch = Batch::new(
            vec![vec![1.0, 1.0], vec![-1.0, -1.0], vec![1.0, -1.0], vec![-1.0, 1.0]],
            vec![1.0, 0.0, 1.0, 0.0],
        );
        let mut adam = Adam::new(0.01);
        let first = mlp.fit_batch(&batch, &mut adam).unwrap();
        let mut last = first;
        for _ in 0..300 {
            last = mlp.fit_batch(&batch, &mut adam).unwrap();
        }
        assert!(last < first, "score {} did not drop below {}", last, first);
    }

    #[test]
    fn size_mismatch_is_error() {
        let mlp = tiny();
        assert!(mlp.compute_gradients(&[1.0], &[1.0]).is_err());
        let empty = Batch::new(Vec::new(), Vec::new());
        assert!(mlp.batch_gradients(&empty).is_err());
    }

    #[test]
    fn save_and_load_preserve_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models/titanic.json.gz");
        let mlp = MLP::new(&NetworkConfig::titanic(9));
        mlp.save(&path).unwrap();
        let loaded = MLP::load(&path).unwrap();
        let input = [0.1, -0.2, 0.3, -0.4, 0.5, -0.6, 0.7];
        let (a, b) = (mlp.forward(&input), loaded.forward(&input));
        assert!((a[0] - b[0]).abs() < 1e-12);
        assert_eq!(loaded.to_string(), mlp.to_string());
    }
}
