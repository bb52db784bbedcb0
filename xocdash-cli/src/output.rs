//! Terminal output

use alloy::primitives::utils::format_units;
use xocdash::{DashboardSnapshot, RefreshReport, SlotName, SlotValue};

/// Decimals the UI applies to each amount slot
fn decimals(slot: SlotName) -> u8 {
    match slot {
        SlotName::WethToXoc => 8,
        _ => 18,
    }
}

fn render(slot: SlotName, value: Option<SlotValue>) -> String {
    match value {
        None => "-".to_string(),
        Some(SlotValue::Ratio(r)) => format!("{r}"),
        Some(SlotValue::Amount(v)) => match format_units(v, decimals(slot)) {
            Ok(human) => format!("{human} ({v})"),
            Err(_) => v.to_string(),
        },
    }
}

pub fn print_snapshot(snapshot: &DashboardSnapshot) {
    println!("\n{:<24} VALUE", "SLOT");
    println!("{}", "-".repeat(72));
    for (slot, value) in &snapshot.values {
        println!("{:<24} {}", slot.as_str(), render(*slot, *value));
    }
}

pub fn print_report(report: &RefreshReport) {
    let failures = report.failures();
    if failures.is_empty() {
        println!("\n✅ {} reads in {:?}", report.entries().len(), report.elapsed());
        return;
    }
    println!("\n❌ {} failed:", failures.len());
    for (read, err) in failures {
        println!("  {:<24} {err}", read.to_string());
    }
}

pub fn print_change(slot: SlotName, value: Option<SlotValue>) {
    println!("{:<24} → {}", slot.as_str(), render(slot, value));
}
