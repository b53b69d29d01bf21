//! Output formatting for CLI

use crate::pipeline::TrainingResult;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print the outcome counts and returns of a run
pub fn print_result(result: &TrainingResult) {
    print_kv("Episodes", &format_number(result.total_episodes));
    print_kv("Steps", &format_number(result.total_steps));
    print_kv(
        "Captures",
        &format!(
            "{} ({:.1}%)",
            result.captures,
            result.capture_rate * 100.0
        ),
    );
    print_kv("Step limits", &result.step_limits.to_string());
    if result.escapes > 0 {
        print_kv("Escapes", &result.escapes.to_string());
    }
    print_kv("Mean return", &format!("{:.2}", result.mean_return));
    print_kv("Average return", &format!("{:.2}", result.average_return));
}
