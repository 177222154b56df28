use anyhow::{Context, Result};
use std::env;
use std::fs;

use tab_split::{
    compute_settlements, decode_state, encode_state, exceeds_url_budget, AppState,
    URL_LENGTH_BUDGET,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("encode") => run_encode(args.get(2).map(String::as_str))?,
        Some("decode") => run_decode(args.get(2).map(String::as_str))?,
        _ => run_demo(),
    }

    Ok(())
}

/// Encode a state JSON file into a share string.
fn run_encode(path: Option<&str>) -> Result<()> {
    let path = path.context("usage: tab-split encode <state.json>")?;

    let json = fs::read_to_string(path).context("Failed to read state file")?;
    let state: AppState = serde_json::from_str(&json).context("File is not a valid state")?;

    let encoded = encode_state(&state);
    println!("🔗 Share string ({} chars):", encoded.len());
    println!("{}", encoded);

    if exceeds_url_budget("https://tabsplit.app/", &state) {
        println!(
            "\n⚠️  Too big for a share link (> {} chars) - use a persisted list instead",
            URL_LENGTH_BUDGET
        );
    }

    Ok(())
}

/// Decode a share string back into pretty JSON.
fn run_decode(encoded: Option<&str>) -> Result<()> {
    let encoded = encoded.context("usage: tab-split decode <share-string>")?;

    match decode_state(encoded) {
        Some(state) => {
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        None => {
            // Bad links are recoverable, not fatal: start fresh
            println!("⚠️  Could not decode - falling back to a fresh session");
            println!("{}", serde_json::to_string_pretty(&AppState::new_session())?);
        }
    }

    Ok(())
}

/// Demo: a three-person dinner, settled.
fn run_demo() {
    println!("💵 Tab Split - who owes whom");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut state = AppState::new_session();
    state.set_event_name("Team dinner");

    let ana = state.people[0].id.clone();
    state.rename_person(&ana, "Ana");
    state.add_item(&ana, "Mains", 5000);

    let bruno = state.add_person();
    state.rename_person(&bruno, "Bruno");
    state.add_item(&bruno, "Drinks", 1500);

    let carla = state.add_person();
    state.rename_person(&carla, "Carla");

    let symbol = state.currency_symbol().to_string();
    for person in &state.people {
        println!(
            "  {} paid {}{:.2}",
            person.name,
            symbol,
            person.paid_total() as f64 / 100.0
        );
    }

    println!("\n💸 Settlements:");
    for s in compute_settlements(&state.people) {
        println!(
            "  {} → {}  {}{:.2}",
            s.from,
            s.to,
            symbol,
            s.amount_cents as f64 / 100.0
        );
    }

    let encoded = encode_state(&state);
    println!("\n🔗 Share string ({} chars):", encoded.len());
    println!("{}", encoded);
}
