//! Tutorial page rendering — pure HTML string building.
//!
//! The page is self-contained: inline styles, no network references, and
//! images referenced by bare file name so the session directory can be
//! moved or zipped as a unit.

use crate::session::Capture;
use chrono::{DateTime, Local};

const STYLE: &str = r#"        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background: #f5f5f5;
        }
        h1 {
            color: #333;
            text-align: center;
        }
        .info {
            text-align: center;
            color: #666;
            margin-bottom: 30px;
        }
        .screenshot {
            background: white;
            margin: 30px 0;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .screenshot h2 {
            color: #0066cc;
            margin-top: 0;
        }
        .screenshot img {
            max-width: 100%;
            border: 1px solid #ddd;
            border-radius: 4px;
        }
        .metadata {
            margin-top: 10px;
            padding: 10px;
            background: #f8f9fa;
            border-radius: 4px;
            font-size: 14px;
            color: #666;
        }
"#;

/// Renders the tutorial page for `captures`.
///
/// Steps are emitted in sequence order regardless of slice order. Zero
/// captures yields a header-only page.
pub fn render(
    captures: &[Capture],
    session_started: &DateTime<Local>,
    generated_at: &DateTime<Local>,
) -> String {
    let mut ordered: Vec<&Capture> = captures.iter().collect();
    ordered.sort_by_key(|c| c.sequence);

    let mut html = String::with_capacity(4096 + ordered.len() * 512);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(&format!(
        "    <title>Tutorial Screenshots - {}</title>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    html.push_str("    <style>\n");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n");
    html.push_str("    <h1>📸 Tutorial Screenshots</h1>\n");
    html.push_str("    <div class=\"info\">\n");
    html.push_str(&format!(
        "        <p>Generated on {}</p>\n",
        generated_at.format("%B %d, %Y at %I:%M:%S %p")
    ));
    html.push_str(&format!(
        "        <p>Session started {}</p>\n",
        session_started.format("%B %d, %Y at %I:%M:%S %p")
    ));
    html.push_str(&format!(
        "        <p>Total screenshots: {}</p>\n",
        ordered.len()
    ));
    html.push_str("    </div>\n");

    for capture in ordered {
        push_step(&mut html, capture);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn push_step(html: &mut String, capture: &Capture) {
    let n = capture.sequence;
    html.push_str("\n    <div class=\"screenshot\">\n");
    html.push_str(&format!("        <h2>Step {}</h2>\n", n));
    html.push_str(&format!(
        "        <img src=\"{}\" alt=\"Screenshot {}\">\n",
        escape(&capture.file_name),
        n
    ));
    html.push_str("        <div class=\"metadata\">\n");
    html.push_str(&format!(
        "            <strong>Time:</strong> {}<br>\n",
        capture.captured_at.format("%I:%M:%S %p")
    ));
    html.push_str(&format!(
        "            <strong>Click Position:</strong> ({}, {})\n",
        capture.click.x, capture.click.y
    ));
    html.push_str("        </div>\n    </div>\n");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ClickPoint;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap()
    }

    fn capture(sequence: u32) -> Capture {
        let file_name = format!("screenshot_{:03}.png", sequence);
        Capture {
            sequence,
            path: PathBuf::from("/tmp/session_x").join(&file_name),
            file_name,
            captured_at: at(15, 4, sequence),
            click: ClickPoint::new(10 * sequence as i32, 20),
        }
    }

    #[test]
    fn empty_session_renders_header_only() {
        let html = render(&[], &at(9, 0, 0), &at(9, 5, 0));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(html.contains("Total screenshots: 0"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("Step "));
    }

    #[test]
    fn steps_and_images_follow_sequence_order() {
        let captures = vec![capture(2), capture(3), capture(1)];
        let html = render(&captures, &at(9, 0, 0), &at(9, 5, 0));

        let positions: Vec<usize> = ["screenshot_001.png", "screenshot_002.png", "screenshot_003.png"]
            .iter()
            .map(|name| html.find(name).expect("missing image reference"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let steps: Vec<usize> = ["Step 1", "Step 2", "Step 3"]
            .iter()
            .map(|s| html.find(s).expect("missing step heading"))
            .collect();
        assert!(steps.windows(2).all(|w| w[0] < w[1]));

        assert!(html.contains("Total screenshots: 3"));
        assert_eq!(html.matches("<img ").count(), 3);
    }

    #[test]
    fn images_use_bare_file_names() {
        let html = render(&[capture(1)], &at(9, 0, 0), &at(9, 5, 0));
        assert!(html.contains("src=\"screenshot_001.png\""));
        assert!(!html.contains("/tmp/session_x"));
    }

    #[test]
    fn metadata_uses_twelve_hour_clock() {
        let html = render(&[capture(1)], &at(9, 0, 0), &at(16, 30, 0));
        assert!(html.contains("<strong>Time:</strong> 03:04:01 PM"));
        assert!(html.contains("<strong>Click Position:</strong> (10, 20)"));
        assert!(html.contains("Generated on March 09, 2024 at 04:30:00 PM"));
        assert!(html.contains("Session started March 09, 2024 at 09:00:00 AM"));
    }

    #[test]
    fn page_is_self_contained() {
        let html = render(&[capture(1)], &at(9, 0, 0), &at(9, 5, 0));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(!html.contains("http://"));
        assert!(!html.contains("https://"));
    }

    #[test]
    fn escapes_markup_in_file_names() {
        assert_eq!(escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }
}
