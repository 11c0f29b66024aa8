//! Adam optimizer over dense-layer parameters.
use crate::layers::{DenseLayer, Matrix};
use crate::network::Gradients;

/// Adam (Kingma & Ba) with bias-corrected moment estimates and a fixed
/// learning rate.
#[derive(Debug, Clone)]
pub struct Adam {
    pub lr: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: u32,
    m_w: Vec<Matrix>,
    v_w: Vec<Matrix>,
    m_b: Vec<Vec<f64>>,
    v_b: Vec<Vec<f64>>,
}

impl Adam {
    pub fn new(lr: f64) -> Self {
        Self::with_params(lr, 0.9, 0.999, 1e-8)
    }

    pub fn with_params(lr: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            t: 0,
            m_w: Vec::new(),
            v_w: Vec::new(),
            m_b: Vec::new(),
            v_b: Vec::new(),
        }
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u32 {
        self.t
    }

    fn init_state(&mut self, layers: &[DenseLayer]) {
        let zeros_w = |l: &DenseLayer| vec![vec![0.0; l.input_size()]; l.output_size()];
        self.m_w = layers.iter().map(zeros_w).collect();
        self.v_w = layers.iter().map(zeros_w).collect();
        self.m_b = layers.iter().map(|l| vec![0.0; l.output_size()]).collect();
        self.v_b = self.m_b.clone();
    }

    /// One update of every layer from `grads` (same layer order).
    pub fn step(&mut self, layers: &mut [DenseLayer], grads: &Gradients) {
        if self.m_w.len() != layers.len() {
            self.init_state(layers);
        }
        self.t += 1;
        let bc1 = 1.0 - self.beta1.powi(self.t as i32);
        let bc2 = 1.0 - self.beta2.powi(self.t as i32);
        let hp = (self.lr, self.beta1, self.beta2, self.epsilon, bc1, bc2);

        for (k, layer) in layers.iter_mut().enumerate() {
            for (i, row) in layer.weights.iter_mut().enumerate() {
                for (j, w) in row.iter_mut().enumerate() {
                    update(w, grads.d_w[k][i][j], &mut self.m_w[k][i][j], &mut self.v_w[k][i][j], hp);
                }
            }
            for (i, b) in layer.bias.iter_mut().enumerate() {
                update(b, grads.db[k][i], &mut self.m_b[k][i], &mut self.v_b[k][i], hp);
            }
        }
    }
}

#[inline]
fn update(p: &mut f64, g: f64, m: &mut f64, v: &mut f64, hp: (f64, f64, f64, f64, f64, f64)) {
    let (lr, beta1, beta2, epsilon, bc1, bc2) = hp;
    *m = beta1 * *m + (1.0 - beta1) * g;
    *v = beta2 * *v + (1.0 - beta2) * g * g;
    let m_hat = *m / bc1;
    let v_hat = *v / bc2;
    *p -= lr * m_hat / (v_hat.sqrt() + epsilon);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Sigmoid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn first_step_moves_by_learning_rate_against_gradient() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layers = vec![DenseLayer::new(2, 1, Arc::new(Sigmoid), &mut rng)];
        layers[0].weights = vec![vec![0.5, -0.5]];
        let grads = Gradients {
            d_w: vec![vec![vec![0.2, -3.0]]],
            db: vec![vec![0.0]],
        };
        let mut adam = Adam::new(0.01);
        adam.step(&mut layers, &grads);
        assert_eq!(adam.steps(), 1);
        // Bias-corrected first step is lr * sign(g), up to epsilon.
        assert!((layers[0].weights[0][0] - 0.49).abs() < 1e-6);
        assert!((layers[0].weights[0][1] + 0.49).abs() < 1e-6);
        assert_eq!(layers[0].bias[0], 0.0);
    }
}
