use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Flattens model markdown into plain lines for terminal display.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();
    let mut list_depth = 0usize;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { .. }) => out.push_str("# "),
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
            Event::Start(Tag::Item) => {
                out.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                out.push_str("• ");
            }
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => out.push_str("\n\n"),
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::markdown_to_text;

    #[test]
    fn flattens_markdown() {
        let text = markdown_to_text("## Key points\n\n- **Fast** start\n- `code` sample\n\nDone.");
        assert_eq!(text, "# Key points\n\n• Fast start\n• code sample\nDone.");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(markdown_to_text("just words"), "just words");
    }
}
