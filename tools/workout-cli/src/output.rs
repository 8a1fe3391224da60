//! Output formatting for the CLI.

use console::style;
use workout_core::ledger::SetEntry;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("    {}", formatted.join("  "));
    }

    /// Print the sets of one exercise as a table.
    pub fn set_table(&self, sets: &[SetEntry]) {
        if self.json {
            return;
        }
        self.table_row(&["SET", "PREVIOUS", "KG", "REPS", "✓"], &SET_COLUMNS);
        for set in sets {
            let done = if set.completed {
                style("✓").green().to_string()
            } else {
                style("·").dim().to_string()
            };
            self.table_row(
                &[
                    &set.set_number.to_string(),
                    &set.previous,
                    &format_kg(set.kg),
                    &set.reps.to_string(),
                    &done,
                ],
                &SET_COLUMNS,
            );
        }
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

const SET_COLUMNS: [usize; 5] = [4, 10, 8, 6, 4];

/// Weight without a trailing `.0` for whole numbers.
pub fn format_kg(kg: f64) -> String {
    if kg.fract() == 0.0 {
        format!("{:.0}", kg)
    } else {
        format!("{}", kg)
    }
}

/// Label for a superset badge.
pub fn superset_badge(index: usize) -> String {
    style(format!("[superset {}]", index + 1)).cyan().to_string()
}
