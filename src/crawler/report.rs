use chrono::Local;
use colored::{Color, Colorize};

use super::listing::Listing;

const TITLE_WIDTH: usize = 40;

/// Prints each batch of new listings to stdout under an `[HH:MM]` stamp.
/// This is the detailed side channel; notifications stay generic.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    color: Color,
}

impl ConsoleReporter {
    pub fn for_source(source_name: &str) -> Self {
        let color = match source_name {
            "subito" => Color::Yellow,
            "wallapop" => Color::BrightGreen,
            _ => Color::BrightBlue,
        };
        Self { color }
    }

    pub fn report(&self, listings: &[Listing]) {
        if listings.is_empty() {
            return;
        }
        println!("{}", self.render(listings));
    }

    pub fn render(&self, listings: &[Listing]) -> String {
        let mut out = format!("[{}]\n", Local::now().format("%H:%M"));
        for listing in listings {
            out.push_str(&format!(
                "    {} {} {} {}\n",
                listing.url.color(self.color),
                truncate(&listing.title, TITLE_WIDTH).dimmed(),
                listing.price,
                listing.shipping_cost.as_deref().unwrap_or(""),
            ));
        }
        out
    }
}

/// Shortens `text` to at most `max_chars` characters, marking the cut with "...".
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("short", 40), "short");
        assert_eq!(truncate("àèìòùàèìòù", 8), "àèìòù...");
        assert_eq!(truncate("abcdef", 3), "...");
    }

    #[test]
    fn test_render_lists_every_listing() {
        colored::control::set_override(false);
        let reporter = ConsoleReporter::for_source("subito");
        let rendered = reporter.render(&[
            Listing::new("https://x.it/a", "10").with_title("Console"),
            Listing::new("https://x.it/b", 20.0).with_shipping_cost("5"),
        ]);

        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('['));
        assert!(lines[1].contains("https://x.it/a Console 10"));
        assert!(lines[2].contains("https://x.it/b  20 5"));
    }
}
