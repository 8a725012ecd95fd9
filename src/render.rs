use colored::*;

use crate::history::HistoryEntry;
use crate::meter::{MeterBand, MeterReading};
use crate::score::{format_score, ring_gauge, Badge};
use crate::ui::{ResultView, UiState};

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

/// Escape text for interpolation into HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

fn list_html(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect()
}

const IMPROVEMENTS_HEADING: &str = "<h4>Improvements</h4>";

/// Feedback card markup, as persisted with each history entry.
pub fn feedback_html(strengths: &[String], improvements: &[String]) -> String {
    format!(
        "<h4>Strengths</h4><ul>{}</ul>{IMPROVEMENTS_HEADING}<ul>{}</ul>",
        list_html(strengths),
        list_html(improvements)
    )
}

fn list_items(html: &str) -> Vec<String> {
    html.split("<li>")
        .skip(1)
        .filter_map(|chunk| chunk.split_once("</li>").map(|(item, _)| unescape_html(item)))
        .collect()
}

/// Recover the strength and improvement items from [`feedback_html`] output.
pub fn feedback_items(html: &str) -> (Vec<String>, Vec<String>) {
    match html.split_once(IMPROVEMENTS_HEADING) {
        Some((strengths, improvements)) => (list_items(strengths), list_items(improvements)),
        None => (list_items(html), Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

fn badge_color(badge: Badge, text: &str) -> ColoredString {
    match badge {
        Badge::Excellent => text.bright_green().bold(),
        Badge::Strong => text.green(),
        Badge::Mixed => text.yellow(),
        Badge::NeedsWork => text.bright_red(),
    }
}

fn meter_color(band: MeterBand, text: &str) -> ColoredString {
    match band {
        MeterBand::Good => text.bright_green(),
        MeterBand::Long => text.yellow(),
        MeterBand::Empty => text.dimmed(),
        MeterBand::TooShort | MeterBand::TooLong => text.bright_red(),
    }
}

/// Plain lines of the result card.
pub fn result_lines(view: &ResultView) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", ring_gauge(view.score), view.badge.label()),
        view.score_text(),
        view.level_text(),
        "Strengths".to_string(),
    ];
    lines.extend(view.strengths.iter().map(|s| format!("  + {s}")));
    lines.push("Improvements".to_string());
    lines.extend(view.improvements.iter().map(|s| format!("  - {s}")));
    lines
}

pub fn meter_line(reading: &MeterReading) -> String {
    const CELLS: usize = 20;
    let filled = (reading.percent as usize * CELLS + 50) / 100;
    format!(
        "[{}{}] {:>3}% {} ({} words)",
        "=".repeat(filled),
        " ".repeat(CELLS - filled),
        reading.percent,
        reading.label(),
        reading.words
    )
}

pub fn history_line(index: usize, entry: &HistoryEntry) -> String {
    let mut scenario: String = entry.scenario.chars().take(48).collect();
    if entry.scenario.chars().count() > 48 {
        scenario.push_str("...");
    }
    format!(
        "{index}. {:>5}/100  {:<10}  {scenario}",
        format_score(entry.score),
        entry.level
    )
}

pub fn print_scenario(ui: &UiState) {
    println!("{}", "Scenario".bright_cyan().bold());
    println!("  {}", ui.scenario);
    println!("  {}", ui.meta.to_string().dimmed());
}

pub fn print_meter(reading: &MeterReading) {
    println!("{}", meter_color(reading.band, &meter_line(reading)));
}

pub fn print_result(view: &ResultView) {
    let lines = result_lines(view);
    println!();
    println!("{}", badge_color(view.badge, &lines[0]));
    for line in &lines[1..] {
        if line == "Strengths" || line == "Improvements" {
            println!("{}", line.bright_white().bold());
        } else if line.starts_with("  + ") {
            println!("{}", line.green());
        } else if line.starts_with("  - ") {
            println!("{}", line.yellow());
        } else {
            println!("{}", line.bold());
        }
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No attempts yet.".dimmed());
        return;
    }
    println!("{}", "Recent attempts".bright_cyan().bold());
    for (i, entry) in entries.iter().enumerate() {
        println!("  {}", history_line(i, entry));
    }
}

/// Flush alerts and the toast, then bring a focused result into view.
pub fn render(ui: &mut UiState) {
    for alert in ui.take_alerts() {
        eprintln!("{} {}", "[!]".bright_red().bold(), alert.bright_red());
    }
    if let Some(toast) = ui.toast.announce() {
        eprintln!("{} {}", "[i]".bright_blue(), toast.as_str().bright_blue());
    }
    if let Some(view) = ui.result.as_mut() {
        if view.focused {
            print_result(view);
            view.focused = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::EvaluationResult;

    #[test]
    fn test_render_prints_each_toast_once() {
        let mut ui = UiState::new(Default::default(), std::time::Duration::from_secs(3));
        ui.toast.show("Attempt scored, but history could not be saved.");
        ui.alert("first");
        render(&mut ui);
        assert!(ui.pending_alerts().is_empty());
        assert_eq!(ui.toast.announce(), None);
        assert!(ui.toast.visible().is_some());
    }

    #[test]
    fn test_escape_html_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_then_unescape() {
        let s = "Tom & Jerry's <deal> \"now\" &amp;";
        assert_eq!(unescape_html(&escape_html(s)), s);
    }

    #[test]
    fn test_feedback_html_shape() {
        let html = feedback_html(&["Clear ask".to_string()], &[]);
        assert_eq!(
            html,
            "<h4>Strengths</h4><ul><li>Clear ask</li></ul><h4>Improvements</h4><ul></ul>"
        );
    }

    #[test]
    fn test_feedback_html_escapes_items() {
        let html = feedback_html(&["<script>x</script>".to_string()], &[]);
        assert!(html.contains("<li>&lt;script&gt;x&lt;/script&gt;</li>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_feedback_items_roundtrip_through_markup() {
        let strengths = vec!["a".to_string(), "b & c".to_string()];
        let improvements = vec!["<d>".to_string()];
        let html = feedback_html(&strengths, &improvements);
        assert_eq!(feedback_items(&html), (strengths, improvements));
    }

    #[test]
    fn test_result_lines() {
        let view = ResultView::from_evaluation(&EvaluationResult {
            score: 92.0,
            level: "Excellent".to_string(),
            strengths: vec!["Clear ask".to_string()],
            improvements: vec![],
        });
        let lines = result_lines(&view);
        assert!(lines[0].ends_with("Excellent"));
        assert_eq!(lines[1], "Score: 92/100");
        assert_eq!(lines[2], "Level: Excellent");
        assert_eq!(lines[3], "Strengths");
        assert_eq!(lines[4], "  + Clear ask");
        assert_eq!(lines[5], "Improvements");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_meter_line() {
        let reading = crate::meter::reading_for_words(90);
        let line = meter_line(&reading);
        assert!(line.starts_with(&format!("[{}]", "=".repeat(20))));
        assert!(line.contains("100% Good length (90 words)"));
    }

    #[test]
    fn test_history_line_truncates_long_scenarios() {
        let entry = HistoryEntry {
            ts: 0,
            score: 55.0,
            level: "Mixed".to_string(),
            scenario: "x".repeat(80),
            response: String::new(),
            feedback_html: String::new(),
        };
        let line = history_line(2, &entry);
        assert!(line.starts_with("2."));
        assert!(line.ends_with(&format!("{}...", "x".repeat(48))));
    }
}
