//! The three report layouts.
//!
//! Field omission follows one rule everywhere: empty strings, zero piece
//! sizes, and zero timestamps drop their line entirely rather than render
//! an empty value.

use super::format::{format_date, human_size};
use super::ReportInput;

fn chars(s: &str) -> usize {
    s.chars().count()
}

/// Line-oriented key/value dump.
pub(super) fn render_minimal(d: &ReportInput) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(d.name.clone());
    lines.push(String::new());
    lines.push(format!("Size:      {}", human_size(d.total_size as f64)));
    lines.push(format!("Hash:      {}", d.hash));
    if !d.tracker.is_empty() {
        lines.push(format!("Tracker:   {}", d.tracker));
    }
    if d.date_added != 0 {
        lines.push(format!("Added:     {}", format_date(d.date_added)));
    }
    if d.piece_size > 0 {
        lines.push(format!(
            "Pieces:    {} x {}",
            d.num_pieces,
            human_size(d.piece_size as f64)
        ));
    }
    if !d.comment.is_empty() {
        lines.push(format!("Comment:   {}", d.comment));
    }
    if !d.creator.is_empty() {
        lines.push(format!("Creator:   {}", d.creator));
    }

    if !d.files.is_empty() {
        lines.push(String::new());
        lines.push("Files:".to_string());
        for f in &d.files {
            lines.push(format!("  {} ({})", f.path, human_size(f.size as f64)));
        }
    }

    if !d.notes.is_empty() {
        lines.push(String::new());
        lines.push("Notes:".to_string());
        lines.push(d.notes.clone());
    }

    lines.join("\n")
}

/// Bordered layout with section headers and dot-filled field labels.
pub(super) fn render_detailed(d: &ReportInput) -> String {
    let sep = "─".repeat(60);
    let section_rule = format!("  {}", "─".repeat(40));
    let mut lines: Vec<String> = Vec::new();

    lines.push(sep.clone());
    lines.push(format!("  {}", d.name));
    lines.push(sep.clone());
    lines.push(String::new());
    lines.push("  General Information".to_string());
    lines.push(section_rule.clone());
    lines.push(format!("  Name .......... {}", d.name));
    lines.push(format!(
        "  Size .......... {}",
        human_size(d.total_size as f64)
    ));
    lines.push(format!("  Hash .......... {}", d.hash));
    if !d.tracker.is_empty() {
        lines.push(format!("  Tracker ....... {}", d.tracker));
    }
    if d.date_added != 0 {
        lines.push(format!("  Added ......... {}", format_date(d.date_added)));
    }
    if d.piece_size > 0 {
        lines.push(format!(
            "  Piece Size .... {}",
            human_size(d.piece_size as f64)
        ));
        lines.push(format!("  Pieces ........ {}", d.num_pieces));
    }
    if !d.comment.is_empty() {
        lines.push(format!("  Comment ....... {}", d.comment));
    }
    if !d.creator.is_empty() {
        lines.push(format!("  Creator ....... {}", d.creator));
    }

    if !d.files.is_empty() {
        lines.push(String::new());
        lines.push("  File Listing".to_string());
        lines.push(section_rule.clone());
        let max_path_len = d.files.iter().map(|f| chars(&f.path)).max().unwrap_or(0).max(10);
        for f in &d.files {
            let size_str = human_size(f.size as f64);
            lines.push(format!(
                "  {:<width$} {}",
                f.path,
                size_str,
                width = max_path_len + 2
            ));
        }
        lines.push(String::new());
        let plural = if d.files.len() != 1 { "s" } else { "" };
        lines.push(format!(
            "  {} file{}, {} total",
            d.files.len(),
            plural,
            human_size(d.total_size as f64)
        ));
    }

    if !d.notes.is_empty() {
        lines.push(String::new());
        lines.push("  Notes".to_string());
        lines.push(section_rule.clone());
        for line in d.notes.split('\n') {
            lines.push(format!("  {line}"));
        }
    }

    lines.push(String::new());
    lines.push(sep);
    lines.join("\n")
}

/// Fixed-width box-drawing card, 64 columns.
pub(super) fn render_fancy(d: &ReportInput) -> String {
    const W: usize = 64;

    fn pad(s: &str, width: usize) -> String {
        if chars(s) >= width {
            return s.chars().take(width).collect();
        }
        format!("{s:<width$}")
    }

    fn center(s: &str, width: usize) -> String {
        let len = chars(s);
        if len >= width {
            return s.chars().take(width).collect();
        }
        let left = (width - len) / 2;
        let right = width - len - left;
        format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
    }

    fn box_line(content: &str) -> String {
        format!("║ {} ║", pad(content, W - 4))
    }

    fn box_center(content: &str) -> String {
        format!("║ {} ║", center(content, W - 4))
    }

    let top_border = format!("╔{}╗", "═".repeat(W - 2));
    let bottom_border = format!("╚{}╝", "═".repeat(W - 2));
    let mid_border = format!("╠{}╣", "═".repeat(W - 2));
    let empty_line = format!("║{}║", " ".repeat(W - 2));

    let mut lines: Vec<String> = Vec::new();

    // Title, word-wrapped to fit inside the border
    lines.push(top_border);
    lines.push(empty_line.clone());
    let name_width = W - 6;
    if chars(&d.name) <= name_width {
        lines.push(box_center(&d.name));
    } else {
        let words = d
            .name
            .split(|c: char| c.is_whitespace() || c == '.' || c == '_' || c == '-')
            .filter(|word| !word.is_empty());
        let mut current = String::new();
        for word in words {
            if !current.is_empty() && chars(&current) + 1 + chars(word) > name_width {
                lines.push(box_center(&current));
                current = word.to_string();
            } else if current.is_empty() {
                current = word.to_string();
            } else {
                current.push(' ');
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(box_center(&current));
        }
    }
    lines.push(empty_line.clone());
    lines.push(mid_border.clone());

    // Info section
    lines.push(empty_line.clone());
    lines.push(box_line(&format!(
        "Size:       {}",
        human_size(d.total_size as f64)
    )));
    lines.push(box_line(&format!("Hash:       {}", d.hash)));
    if !d.tracker.is_empty() {
        lines.push(box_line(&format!("Tracker:    {}", d.tracker)));
    }
    if d.date_added != 0 {
        lines.push(box_line(&format!("Added:      {}", format_date(d.date_added))));
    }
    if d.piece_size > 0 {
        lines.push(box_line(&format!(
            "Pieces:     {} x {}",
            d.num_pieces,
            human_size(d.piece_size as f64)
        )));
    }
    if !d.comment.is_empty() {
        lines.push(box_line(&format!("Comment:    {}", d.comment)));
    }
    if !d.creator.is_empty() {
        lines.push(box_line(&format!("Creator:    {}", d.creator)));
    }

    // Files section, paths truncated from the left to fit
    if !d.files.is_empty() {
        lines.push(empty_line.clone());
        lines.push(mid_border.clone());
        lines.push(empty_line.clone());
        lines.push(box_center("File Listing"));
        lines.push(empty_line.clone());
        for f in &d.files {
            let size_str = human_size(f.size as f64);
            let max_path = W - 8 - chars(&size_str);
            let path = if chars(&f.path) > max_path {
                let tail: String = f
                    .path
                    .chars()
                    .skip(chars(&f.path) - (max_path - 3))
                    .collect();
                format!("...{tail}")
            } else {
                f.path.clone()
            };
            lines.push(box_line(&format!(
                "{:<width$} {}",
                path,
                size_str,
                width = max_path + 2
            )));
        }
        lines.push(empty_line.clone());
        let plural = if d.files.len() != 1 { "s" } else { "" };
        lines.push(box_center(&format!(
            "{} file{} — {}",
            d.files.len(),
            plural,
            human_size(d.total_size as f64)
        )));
    }

    // Notes section
    if !d.notes.is_empty() {
        lines.push(empty_line.clone());
        lines.push(mid_border);
        lines.push(empty_line.clone());
        for line in d.notes.split('\n') {
            lines.push(box_line(line));
        }
    }

    lines.push(empty_line);
    lines.push(bottom_border);
    lines.join("\n")
}

#[cfg(test)]
mod template_tests {
    use super::super::{ReportFile, ReportInput, TemplateId, generate};
    use super::*;

    fn create_test_input() -> ReportInput {
        ReportInput {
            name: "Ubuntu 24.04 Desktop".to_string(),
            hash: "0123456789abcdef0123456789abcdef01234567".to_string(),
            total_size: 3 * 1024 * 1024 * 1024,
            files: vec![
                ReportFile {
                    path: "ubuntu-24.04-desktop-amd64.iso".to_string(),
                    size: 3 * 1024 * 1024 * 1024 - 512,
                },
                ReportFile {
                    path: "SHA256SUMS".to_string(),
                    size: 512,
                },
            ],
            tracker: "torrent.ubuntu.com".to_string(),
            date_added: 1_700_000_000,
            piece_size: 256 * 1024,
            num_pieces: 12288,
            creator: "mktorrent 1.1".to_string(),
            comment: "Official release".to_string(),
            notes: "Verified against SHA256SUMS.".to_string(),
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let input = create_test_input();
        for template in TemplateId::ALL {
            assert_eq!(generate(&input, template), generate(&input, template));
        }
    }

    #[test]
    fn test_minimal_full_layout() {
        let report = render_minimal(&create_test_input());
        let expected = "\
Ubuntu 24.04 Desktop

Size:      3.0 GiB
Hash:      0123456789abcdef0123456789abcdef01234567
Tracker:   torrent.ubuntu.com
Added:     2023-11-14 22:13
Pieces:    12288 x 256.0 KiB
Comment:   Official release
Creator:   mktorrent 1.1

Files:
  ubuntu-24.04-desktop-amd64.iso (3.0 GiB)
  SHA256SUMS (512.0 B)

Notes:
Verified against SHA256SUMS.";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_minimal_omits_absent_fields() {
        let input = ReportInput {
            name: "bare".to_string(),
            hash: "ffff".to_string(),
            total_size: 1024,
            ..ReportInput::default()
        };
        let report = render_minimal(&input);
        assert!(!report.contains("Comment:"));
        assert!(!report.contains("Creator:"));
        assert!(!report.contains("Pieces:"));
        assert!(!report.contains("Tracker:"));
        assert!(!report.contains("Added:"));
        assert!(!report.contains("Files:"));
        assert!(!report.contains("Notes:"));
    }

    #[test]
    fn test_detailed_sections_and_summary() {
        let report = render_detailed(&create_test_input());
        assert!(report.starts_with(&"─".repeat(60)));
        assert!(report.ends_with(&"─".repeat(60)));
        assert!(report.contains("  General Information"));
        assert!(report.contains("  File Listing"));
        assert!(report.contains("  Name .......... Ubuntu 24.04 Desktop"));
        assert!(report.contains("  2 files, 3.0 GiB total"));
    }

    #[test]
    fn test_detailed_aligns_to_longest_path() {
        let report = render_detailed(&create_test_input());
        // Longest path is 30 chars; every file row pads the path to 32.
        assert!(report.contains("  ubuntu-24.04-desktop-amd64.iso   3.0 GiB"));
        assert!(report.contains("  SHA256SUMS                       512.0 B"));
    }

    #[test]
    fn test_detailed_singular_summary() {
        let mut input = create_test_input();
        input.files.truncate(1);
        let report = render_detailed(&input);
        assert!(report.contains("  1 file, 3.0 GiB total"));
    }

    #[test]
    fn test_fancy_every_line_is_64_columns() {
        let report = render_fancy(&create_test_input());
        for line in report.lines() {
            assert_eq!(line.chars().count(), 64, "uneven line: {line:?}");
        }
    }

    #[test]
    fn test_fancy_wraps_long_title_on_separators() {
        let mut input = create_test_input();
        input.name = "Some.Very.Long.Release.Name.With.Many.Dot.Separated.Components.2024.Edition"
            .to_string();
        let report = render_fancy(&input);
        // The wrapped title re-joins words with spaces inside the border.
        assert!(report.contains("Some Very Long Release Name"));
        for line in report.lines() {
            assert_eq!(line.chars().count(), 64);
        }
    }

    #[test]
    fn test_fancy_truncates_long_paths_from_the_left() {
        let mut input = create_test_input();
        input.files = vec![ReportFile {
            path: "a-directory-with-a-remarkably-long-name/and-a-nested-one/payload-file.mkv"
                .to_string(),
            size: 1024,
        }];
        let report = render_fancy(&input);
        assert!(report.contains("..."));
        assert!(report.contains("payload-file.mkv"));
        for line in report.lines() {
            assert_eq!(line.chars().count(), 64);
        }
    }

    #[test]
    fn test_fancy_summary_uses_em_dash() {
        let report = render_fancy(&create_test_input());
        assert!(report.contains("2 files — 3.0 GiB"));
    }
}
