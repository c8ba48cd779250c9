use std::fmt::Write;

use super::{Block, Dialog};

/// Plain-text rendering of a dialog, actions numbered from 1.
pub fn render(dialog: &Dialog) -> String {
    let mut out = String::new();
    let rule = "=".repeat(dialog.title.chars().count().max(8));

    let _ = writeln!(out, "{}", dialog.title);
    let _ = writeln!(out, "{}", rule);

    for block in &dialog.body {
        match block {
            Block::Heading(text) => {
                let _ = writeln!(out, "\n{}", text);
            }
            Block::Paragraph(text) => {
                for line in text.lines() {
                    let _ = writeln!(out, "  {}", line.trim_end());
                }
            }
            Block::Fact(label, value) => {
                let _ = writeln!(out, "  {}: {}", label, value);
            }
            Block::Item(text) => {
                let _ = writeln!(out, "  - {}", text);
            }
        }
    }

    if !dialog.fields.is_empty() {
        let _ = writeln!(out, "\nFields:");
        for field in &dialog.fields {
            if field.value.is_empty() {
                let _ = writeln!(out, "  {}", field.label);
            } else {
                let _ = writeln!(out, "  {} [{}]", field.label, field.value);
            }
        }
    }

    if !dialog.actions.is_empty() {
        let _ = writeln!(out);
        for (index, action) in dialog.actions.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", index + 1, action.label);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{ActionKey, FormField};

    #[test]
    fn test_render_lists_body_fields_and_actions() {
        let dialog = Dialog::new("Legal text")
            .heading("Loi X")
            .fact("Status", "published")
            .paragraph("Article 1\nArticle 2")
            .item("Identity card")
            .field(FormField::new("title", "Title", "Loi X"))
            .action(ActionKey::Download, "Download PDF")
            .action(ActionKey::Close, "Close");

        let text = render(&dialog);
        assert!(text.starts_with("Legal text\n"));
        assert!(text.contains("  Status: published\n"));
        assert!(text.contains("  Article 2\n"));
        assert!(text.contains("  - Identity card\n"));
        assert!(text.contains("  Title [Loi X]\n"));
        assert!(text.contains("  [1] Download PDF\n"));
        assert!(text.contains("  [2] Close\n"));
    }
}
