//! Demo 01: Basic Usage
//!
//! This demo walks through adding, completing, filtering and deleting tasks
//! with a TaskStore, reading the derived views after each step.
//!
//! Run with: cargo run --example 01_basic_usage

use eyre::Result;
use tasklist::{Priority, TaskFilter, TaskStore};

fn print_view(store: &TaskStore) {
    println!("   Filter: {}", store.filter().label());
    for task in store.filtered_tasks() {
        let check = if task.completed { "x" } else { " " };
        println!("   [{}] #{} {} ({})", check, task.id, task.description, task.priority);
    }
    let counts = store.counts();
    println!(
        "   Total: {}, Completed: {}, Pending: {}\n",
        counts.total, counts.completed, counts.pending
    );
}

fn main() -> Result<()> {
    println!("tasklist Basic Usage Demo");
    println!("=========================\n");

    let mut store = TaskStore::new();

    // ADD: Create a few tasks
    println!("1. ADD - Creating tasks...");
    let milk = store.add("Buy milk", Priority::Low);
    let release = store.add("Ship release", Priority::High);
    store.add("Water plants", store.selected_priority());
    println!("   Created: {:?}, {:?}", milk, release);
    print_view(&store);

    // ADD (no-op): Whitespace-only text is ignored
    println!("2. ADD - Whitespace-only text...");
    let ignored = store.add("   ", Priority::Medium);
    println!("   Result: {:?}", ignored);
    print_view(&store);

    // TOGGLE: Complete a task
    println!("3. TOGGLE - Completing \"Buy milk\"...");
    if let Some(id) = milk {
        store.toggle_completed(id);
    }
    print_view(&store);

    // FILTER: Show each tab
    for filter in TaskFilter::ALL {
        println!("4. FILTER - {}...", filter.label());
        store.set_filter(filter);
        print_view(&store);
    }

    // DELETE: Remove a task
    println!("5. DELETE - Removing \"Ship release\"...");
    if let Some(id) = release {
        store.delete(id);
    }
    print_view(&store);

    // JSON: Snapshot of the derived views
    println!("6. JSON - Snapshot...");
    let snapshot = serde_json::json!({
        "tasks": store.filtered_tasks(),
        "counts": store.counts(),
    });
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    println!("\nDemo complete!");
    Ok(())
}
