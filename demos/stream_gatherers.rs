//! Imperative loops next to their gatherer equivalents.

use gather_rs::prelude::*;

fn main() {
    env_logger::init();

    println!("=== Pipelines ===\n");
    let sentences = ["java is powerful", "streams make code clean", "functional style is cool"];

    let mut loud_words = Vec::new();
    for sentence in &sentences {
        for word in sentence.split(' ') {
            if word.len() > 3 {
                loud_words.push(word.to_uppercase());
            }
        }
    }
    println!("loops:    {:?}", loud_words);

    let piped: Vec<String> = sentences
        .iter()
        .flat_map(|s| s.split(' '))
        .filter(|w| w.len() > 3)
        .map(str::to_uppercase)
        .collect();
    println!("pipeline: {:?}", piped);

    println!("\n=== Fold ===\n");
    let numbers = [10, 25, 40, 15];
    println!("sum with Iterator::sum: {}", numbers.iter().sum::<i32>());
    println!("sum with fold:          {}", fold(numbers, 0, |a, x| a + x));

    println!("\n=== Scan ===\n");
    let transactions = [1000, -200, -500, 200, -300];
    let mut balance = 0;
    let mut history = Vec::new();
    for t in transactions {
        balance += t;
        history.push(balance);
    }
    println!("loop: {:?}", history);
    println!("scan: {:?}", scan(transactions, 0, |a, x| a + x));

    println!("\n=== Fixed windows ===\n");
    let orders = [101, 102, 103, 104, 105, 106, 107];
    let batch_size = 3;
    let batches: Vec<Vec<i32>> = (0..orders.len().div_ceil(batch_size))
        .map(|i| orders[i * batch_size..((i + 1) * batch_size).min(orders.len())].to_vec())
        .collect();
    println!("index math:   {:?}", batches);
    println!("window_fixed: {:?}", window_fixed(&orders, batch_size));

    println!("\n=== Sliding windows ===\n");
    let order_ids = [101, 102, 103, 104, 105];
    let window = 3;
    let by_index: Vec<Vec<i32>> = (0..=order_ids.len() - window)
        .map(|i| order_ids[i..i + window].to_vec())
        .collect();
    println!("index math:     {:?}", by_index);
    println!("window_sliding: {:?}", window_sliding(&order_ids, window));
    println!("lazy adaptor:   {:?}", order_ids.iter().window_sliding(window).collect::<Vec<_>>());
}
