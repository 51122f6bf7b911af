//! Shopping list service - cart aggregation and PDF rendering
//!
//! The cart is flattened into one line per (ingredient name, unit)
//! pair with summed amounts, then rendered into a small self-contained
//! PDF: single Helvetica font, WinAnsi encoding, one column of text,
//! paginated at a fixed line count.

use crate::error::ApiError;
use crate::repositories::{CartRepository, ShoppingListRow};
use sqlx::PgPool;
use uuid::Uuid;

const TITLE: &str = "Shopping list";
const LINES_PER_PAGE: usize = 50;

/// Shopping list service
pub struct ShoppingListService;

impl ShoppingListService {
    /// Aggregate the user's cart and render it as a PDF document
    ///
    /// An empty cart still yields a valid document with only the title.
    pub async fn generate(db: &PgPool, user_id: Uuid) -> Result<Vec<u8>, ApiError> {
        let rows = CartRepository::aggregate_ingredients(db, user_id)
            .await
            .map_err(ApiError::Internal)?;

        let lines = format_lines(&rows);
        let pdf = render_pdf(&lines);

        metrics::counter!("shopping_lists_generated_total").increment(1);

        Ok(pdf)
    }
}

/// One text line per aggregated ingredient
fn format_lines(rows: &[ShoppingListRow]) -> Vec<String> {
    rows.iter()
        .map(|row| format!("{} ({}) — {}", row.name, row.measurement_unit, row.total))
        .collect()
}

/// Render text lines into a minimal PDF document
fn render_pdf(lines: &[String]) -> Vec<u8> {
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };
    let page_count = chunks.len();

    // Fixed numbering: 1 catalog, 2 page tree, 3 font, then one
    // page/content object pair per page.
    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(3 + 2 * page_count);

    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

    let kids: Vec<String> = (0..page_count)
        .map(|k| format!("{} 0 R", 4 + 2 * k))
        .collect();
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        )
        .into_bytes(),
    );

    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );

    for (k, chunk) in chunks.iter().enumerate() {
        let content_id = 5 + 2 * k;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                content_id
            )
            .into_bytes(),
        );

        let stream = page_stream(chunk, k == 0);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"\nendstream");
        objects.push(body);
    }

    let mut out: Vec<u8> = Vec::from(&b"%PDF-1.4\n"[..]);
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );

    out
}

/// Text operations for one page; the first page carries the title
fn page_stream(lines: &[String], first_page: bool) -> Vec<u8> {
    let mut stream: Vec<u8> = Vec::new();

    let body_start = if first_page {
        stream.extend_from_slice(b"BT\n/F1 16 Tf\n50 790 Td\n(");
        stream.extend_from_slice(&encode_text(TITLE));
        stream.extend_from_slice(b") Tj\nET\n");
        760
    } else {
        790
    };

    if !lines.is_empty() {
        stream.extend_from_slice(format!("BT\n/F1 12 Tf\n50 {} Td\n14 TL\n", body_start).as_bytes());
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                stream.extend_from_slice(b"T*\n");
            }
            stream.push(b'(');
            stream.extend_from_slice(&encode_text(line));
            stream.extend_from_slice(b") Tj\n");
        }
        stream.extend_from_slice(b"ET\n");
    }

    stream
}

/// Encode text as a WinAnsi byte string with PDF delimiter escaping
///
/// ASCII passes through, the em dash maps to its WinAnsi slot, other
/// Latin-1 characters map to their own byte, and everything else
/// degrades to '?'.
fn encode_text(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let byte = match ch as u32 {
            0x2014 => 0x97,
            code if code < 0x20 => b' ',
            code if code <= 0x7E => code as u8,
            code if (0xA0..=0xFF).contains(&code) => code as u8,
            _ => b'?',
        };
        if byte == b'(' || byte == b')' || byte == b'\\' {
            bytes.push(b'\\');
        }
        bytes.push(byte);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, total: i64) -> ShoppingListRow {
        ShoppingListRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total,
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_format_lines_shape() {
        let rows = vec![row("Flour", "g", 500), row("Milk", "ml", 250)];
        let lines = format_lines(&rows);

        assert_eq!(lines, vec!["Flour (g) — 500", "Milk (ml) — 250"]);
    }

    #[test]
    fn test_pdf_framing() {
        let pdf = render_pdf(&["Flour (g) — 500".to_string()]);

        assert!(pdf.starts_with(b"%PDF-"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(contains(&pdf, b"startxref"));
        assert!(contains(&pdf, b"/BaseFont /Helvetica"));
    }

    #[test]
    fn test_pdf_embeds_lines_with_escaped_parens() {
        let pdf = render_pdf(&["Flour (g) — 500".to_string()]);

        // Parens inside text are escaped, and the em dash lands on
        // its WinAnsi byte.
        assert!(contains(&pdf, b"Flour \\(g\\) \x97 500"));
    }

    #[test]
    fn test_empty_cart_renders_single_page() {
        let pdf = render_pdf(&[]);

        assert!(pdf.starts_with(b"%PDF-"));
        assert!(contains(&pdf, b"/Count 1"));
        assert!(contains(&pdf, b"Shopping list"));
    }

    #[test]
    fn test_long_lists_paginate() {
        let lines: Vec<String> = (0..120).map(|i| format!("Item {} (g) — {}", i, i)).collect();
        let pdf = render_pdf(&lines);

        assert!(contains(&pdf, b"/Count 3"));
    }

    #[test]
    fn test_non_latin_text_degrades_gracefully() {
        let encoded = encode_text("Tofu 豆腐");
        assert_eq!(encoded, b"Tofu ??".to_vec());
    }
}
