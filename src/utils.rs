//! Console summaries for models and training runs.
use crate::network::MLP;
use crate::trainer::TrainingHistory;

/// Print model summary
pub fn print_model_summary(mlp: &MLP) {
    println!("Model Summary:\n{}", mlp);
    println!("+-------+--------+---------+------------+");
    println!("| Layer | Inputs | Outputs | Activation |");
    println!("+-------+--------+---------+------------+");
    for (i, layer) in mlp.layers.iter().enumerate() {
        println!(
            "| {:>5} | {:>6} | {:>7} | {:<10} |",
            i,
            layer.input_size(),
            layer.output_size(),
            format!("{:?}", layer.activation.kind())
        );
    }
    println!("+-------+--------+---------+------------+");
    println!("Total parameters: {}", mlp.num_params());
}

/// Print simple table for per-epoch scores
pub fn print_summary_table(history: &TrainingHistory, title: &str) {
    let values = &history.epoch_scores;
    println!("\n{} Summary Table:", title);
    println!("+----------------+----------+");
    println!("| Epoch Range    | Avg Value|");
    println!("+----------------+----------+");
    if let (Some(first), Some(last)) = (values.first(), values.last()) {
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        println!("| First Epoch    | {:>8.6} |", first);
        println!("| Last Epoch     | {:>8.6} |", last);
        println!("| All Epochs     | {:>8.6} |", avg);
    }
    println!("+----------------+----------+");
    println!("Iterations: {}", history.iterations);
}
