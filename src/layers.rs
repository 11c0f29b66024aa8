//! Dense layer with weights, bias, and activation function.
use crate::activations::Activation;
use rand::Rng;
use std::sync::Arc;

/// Row-major matrix; for layer weights the shape is `[output][input]`.
pub type Matrix = Vec<Vec<f64>>;

/// A fully-connected (dense) layer with weights, bias, and an activation function.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub weights: Matrix,
    pub bias: Vec<f64>,
    pub activation: Arc<dyn Activation>,
}

impl DenseLayer {
    /// Xavier uniform weights, U(-sqrt(6/(fan_in+fan_out)), +sqrt(..)), zero bias.
    pub fn new<R: Rng>(
        input_size: usize,
        output_size: usize,
        activation: Arc<dyn Activation>,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0f64 / (input_size + output_size) as f64).sqrt();
        let weights: Matrix = (0..output_size)
            .map(|_| (0..input_size).map(|_| rng.gen_range(-limit..limit)).collect())
            .collect();
        let bias = vec![0.0; output_size];
        Self { weights, bias, activation }
    }

    pub fn input_size(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn output_size(&self) -> usize {
        self.bias.len()
    }

    pub fn num_params(&self) -> usize {
        self.input_size() * self.output_size() + self.output_size()
    }

    /// Forward pass: computes pre-activations `z = W·x + b` and activations `a = act(z)`.
    pub fn forward(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let z: Vec<f64> = self.weights.iter().zip(&self.bias).map(|(row, &b)| {
            row.iter().zip(input).map(|(&w, &i)| w * i).sum::<f64>() + b
        }).collect();
        let a: Vec<f64> = z.iter().map(|&val| self.activation.apply(val)).collect();
        (z, a)
    }

    /// `dL/da_prev = W^T · dz`
    pub fn propagate(&self, dz: &[f64]) -> Vec<f64> {
        let mut da_prev = vec![0.0; self.input_size()];
        for (row, &d) in self.weights.iter().zip(dz) {
            for (acc, &w) in da_prev.iter_mut().zip(row) {
                *acc += w * d;
            }
        }
        da_prev
    }
}
