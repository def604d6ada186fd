//! Delivery status transition table.

use vendor_hub_core::{DeliveryStatus, QueueTier};

/// One line per status: `Confirmed -> Driver Picking Up, Delivering`.
fn table() -> Vec<String> {
    DeliveryStatus::ALL
        .iter()
        .map(|status| {
            let next = status.next_statuses();
            let targets = if next.is_empty() {
                "(none)".to_string()
            } else {
                next.iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("{:<18} -> {targets}", status.as_str())
        })
        .collect()
}

fn queue_lines() -> Vec<String> {
    QueueTier::ALL
        .iter()
        .map(|tier| format!("{:<18} dispatches at {} orders", tier.shipping_method(), tier.min_batch()))
        .collect()
}

/// Print the transition table and the queue thresholds.
pub fn print_table() {
    #[allow(clippy::print_stdout)]
    {
        for line in table() {
            println!("{line}");
        }
        println!();
        for line in queue_lines() {
            println!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_status() {
        let lines = table();
        assert_eq!(lines.len(), DeliveryStatus::ALL.len());
        assert!(lines.iter().any(|l| l.starts_with("Confirmed") && l.ends_with("Driver Picking Up, Delivering")));
        assert!(lines.iter().any(|l| l.starts_with("Delivered") && l.ends_with("(none)")));
    }

    #[test]
    fn test_queue_lines() {
        let lines = queue_lines();
        assert!(lines.iter().any(|l| l.starts_with("Standard") && l.contains("10 orders")));
        assert!(lines.iter().any(|l| l.starts_with("Economy") && l.contains("25 orders")));
    }
}
