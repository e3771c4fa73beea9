//! Note table listing command.

use clap::Args;
use lutsynth_core::{NOTE_COUNT, TABLE_SIZE, note_increment, note_name};

#[derive(Args)]
pub struct NotesArgs {
    /// Sample rate used to show frequencies
    #[arg(short, long, default_value = "48000")]
    sample_rate: u32,
}

pub fn run(args: NotesArgs) -> anyhow::Result<()> {
    let base = f64::from(args.sample_rate) / TABLE_SIZE as f64;

    println!("Note Table ({NOTE_COUNT} notes, {} Hz)", args.sample_rate);
    println!("==========\n");
    println!("  {:>5}  {:<5}  {:>10}  {:>10}", "index", "name", "increment", "Hz");
    for index in 0..NOTE_COUNT {
        let Some(increment) = note_increment(index) else {
            continue;
        };
        println!(
            "  {:>5}  {:<5}  {:>10.5}  {:>10.2}",
            index,
            note_name(index).unwrap_or("-"),
            increment,
            base * f64::from(increment)
        );
    }

    Ok(())
}
