use trendscribe::generator::{Length, Tone};
use trendscribe::models::{Region, Timeframe};

/// Print every selectable tone, length, timeframe and region
pub fn tones() {
    println!("Tones:");
    for tone in Tone::ALL {
        println!("  {tone}");
    }

    println!("\nLengths:");
    for length in Length::ALL {
        let range = length.paragraph_range();
        println!(
            "  {:<8} {} ({}-{} body paragraphs)",
            length.as_str(),
            length.word_hint(),
            range.start(),
            range.end()
        );
    }

    println!("\nTimeframes:");
    for timeframe in Timeframe::all() {
        println!("  {:<16} {}", timeframe.as_str(), timeframe.label());
    }

    println!("\nRegions:");
    for region in Region::all() {
        let code = if region.code().is_empty() { "-" } else { region.code() };
        println!("  {code:<4} {}", region.name());
    }
}
