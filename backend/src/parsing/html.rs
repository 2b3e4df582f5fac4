//! Minimal tolerant scanner for solver-generated HTML.
//!
//! Generated reports carry no formal schema and vary in surrounding
//! markup, so this is not a general HTML parser: it reduces a document
//! to the fragments the report pipeline cares about (headings,
//! paragraphs, tables of cell text) and ignores everything else.
//! Unknown and unclosed tags are skipped rather than rejected.

/// A document fragment in source order. All text is entity-decoded and
/// whitespace-normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Text of an `<h1>`..`<h6>` element.
    Heading(String),
    /// Text of a `<p>` element.
    Paragraph(String),
    /// Cell text of a `<table>`, row-major.
    Table(Vec<Vec<String>>),
}

#[derive(Debug, Default)]
struct Scanner {
    fragments: Vec<Fragment>,
    buf: String,
    in_heading: bool,
    in_paragraph: bool,
    in_table: usize,
    in_skip: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    in_cell: bool,
}

/// Reduce an HTML document to its headings, paragraphs, and tables.
pub fn fragments(html: &str) -> Vec<Fragment> {
    let mut scanner = Scanner::default();
    let mut pos = 0;

    while pos < html.len() {
        if html.as_bytes()[pos] == b'<' {
            if html[pos..].starts_with("<!--") {
                pos = html[pos..]
                    .find("-->")
                    .map(|i| pos + i + 3)
                    .unwrap_or(html.len());
                continue;
            }
            if html[pos..].starts_with("<!") || html[pos..].starts_with("<?") {
                pos = tag_end(html, pos);
                continue;
            }
            let end = tag_end(html, pos);
            // A document truncated mid-tag has no closing '>'; drop the
            // partial tag instead of slicing off a char boundary.
            let body = html
                .get(pos + 1..end.saturating_sub(1))
                .unwrap_or("")
                .trim();
            scanner.tag(body);
            pos = end;
        } else {
            let next = html[pos..].find('<').map(|i| pos + i).unwrap_or(html.len());
            scanner.text(&html[pos..next]);
            pos = next;
        }
    }

    scanner.finish();
    scanner.fragments
}

/// Index just past the closing `>` of the tag starting at `start`,
/// skipping over quoted attribute values.
fn tag_end(html: &str, start: usize) -> usize {
    let bytes = html.as_bytes();
    let mut quote: Option<u8> = None;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return start + offset + 1,
            None => {}
        }
    }
    html.len()
}

impl Scanner {
    fn tag(&mut self, body: &str) {
        let (closing, name) = parse_tag_name(body);
        match name.as_str() {
            "script" | "style" => {
                if closing {
                    self.in_skip = self.in_skip.saturating_sub(1);
                } else {
                    self.in_skip += 1;
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if closing {
                    self.flush_heading();
                } else {
                    self.flush_all();
                    self.in_heading = true;
                }
            }
            "p" => {
                if closing {
                    self.flush_paragraph();
                } else {
                    self.flush_all();
                    self.in_paragraph = true;
                }
            }
            "table" => {
                if closing {
                    self.close_table();
                } else {
                    if self.in_table == 0 {
                        self.flush_all();
                        self.rows.clear();
                        self.row = None;
                        self.in_cell = false;
                    }
                    self.in_table += 1;
                }
            }
            "tr" if self.in_table == 1 => {
                self.close_cell();
                if closing {
                    self.close_row();
                } else {
                    self.close_row();
                    self.row = Some(Vec::new());
                }
            }
            "td" | "th" if self.in_table == 1 => {
                self.close_cell();
                if !closing {
                    if self.row.is_none() {
                        self.row = Some(Vec::new());
                    }
                    self.in_cell = true;
                    self.buf.clear();
                }
            }
            "br" => self.buf.push(' '),
            // Inline markup (<b>, <i>, <span>, ...) is irrelevant here.
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        if self.in_skip > 0 {
            return;
        }
        if self.in_cell || self.in_heading || self.in_paragraph {
            self.buf.push_str(&decode_entities(raw));
        }
    }

    fn flush_heading(&mut self) {
        if self.in_heading {
            let text = normalize_whitespace(&self.buf);
            if !text.is_empty() {
                self.fragments.push(Fragment::Heading(text));
            }
        }
        self.in_heading = false;
        self.buf.clear();
    }

    fn flush_paragraph(&mut self) {
        if self.in_paragraph {
            let text = normalize_whitespace(&self.buf);
            if !text.is_empty() {
                self.fragments.push(Fragment::Paragraph(text));
            }
        }
        self.in_paragraph = false;
        self.buf.clear();
    }

    fn flush_all(&mut self) {
        self.flush_heading();
        self.flush_paragraph();
    }

    fn close_cell(&mut self) {
        if self.in_cell {
            let text = normalize_whitespace(&self.buf);
            if let Some(row) = self.row.as_mut() {
                row.push(text);
            }
            self.in_cell = false;
            self.buf.clear();
        }
    }

    fn close_row(&mut self) {
        if let Some(row) = self.row.take() {
            if !row.is_empty() {
                self.rows.push(row);
            }
        }
    }

    fn close_table(&mut self) {
        if self.in_table == 0 {
            return;
        }
        self.in_table -= 1;
        if self.in_table == 0 {
            self.close_cell();
            self.close_row();
            if !self.rows.is_empty() {
                self.fragments.push(Fragment::Table(std::mem::take(&mut self.rows)));
            }
        }
    }

    fn finish(&mut self) {
        self.flush_all();
        // Tolerate a document truncated inside a table.
        self.in_table = self.in_table.min(1);
        if self.in_table == 1 {
            self.close_table();
        }
    }
}

fn parse_tag_name(body: &str) -> (bool, String) {
    let body = body.trim();
    let (closing, rest) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (closing, name)
}

/// Decode the entities that show up in generated reports. Unknown
/// entities are kept verbatim rather than rejected.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let semi = rest.find(';').filter(|&i| i <= 9);
        match semi {
            Some(semi) => {
                let entity = &rest[1..semi];
                let decoded = match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                        .or_else(|| {
                            entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok())
                        })
                        .and_then(char::from_u32),
                };
                match decoded {
                    Some(c) => {
                        out.push(c);
                        rest = &rest[semi + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_paragraphs_and_tables() {
        let html = r#"
            <html><body>
            <h1>Report</h1>
            <p>Institution name: Example School</p>
            <table>
              <tr><th>Sum</th><th>Average</th></tr>
              <tr><td>120</td><td>24</td></tr>
            </table>
            </body></html>
        "#;
        let frags = fragments(html);
        assert_eq!(
            frags,
            vec![
                Fragment::Heading("Report".to_string()),
                Fragment::Paragraph("Institution name: Example School".to_string()),
                Fragment::Table(vec![
                    vec!["Sum".to_string(), "Average".to_string()],
                    vec!["120".to_string(), "24".to_string()],
                ]),
            ]
        );
    }

    #[test]
    fn test_inline_markup_and_entities_in_cells() {
        let html = "<table><tr><td><b>18&nbsp;-&nbsp;24</b></td><td>A &amp; B</td></tr></table>";
        let frags = fragments(html);
        assert_eq!(
            frags,
            vec![Fragment::Table(vec![vec![
                "18 - 24".to_string(),
                "A & B".to_string()
            ]])]
        );
    }

    #[test]
    fn test_unclosed_row_and_table_are_tolerated() {
        let html = "<table><tr><td>1</td><td>2";
        let frags = fragments(html);
        assert_eq!(
            frags,
            vec![Fragment::Table(vec![vec!["1".to_string(), "2".to_string()]])]
        );
    }

    #[test]
    fn test_attributes_comments_and_scripts_are_ignored() {
        let html = r#"
            <!-- generated -->
            <script>var x = "<p>not a paragraph</p>";</script>
            <p class="meta" title="a>b">Generated with: FET 6.2.5</p>
        "#;
        let frags = fragments(html);
        assert_eq!(
            frags,
            vec![Fragment::Paragraph("Generated with: FET 6.2.5".to_string())]
        );
    }

    #[test]
    fn test_nested_table_content_folds_into_outer_cell() {
        let html = "<table><tr><td>outer<table><tr><td>inner</td></tr></table></td></tr></table>";
        let frags = fragments(html);
        // Inner markup is not modeled; its text accrues to the outer cell.
        assert_eq!(frags.len(), 1);
        match &frags[0] {
            Fragment::Table(rows) => {
                assert_eq!(rows.len(), 1);
                assert!(rows[0][0].contains("outer"));
            }
            other => panic!("unexpected fragment: {other:?}"),
        }
    }

    #[test]
    fn test_numeric_entities() {
        let html = "<p>&#8230; and &#x2013;</p>";
        let frags = fragments(html);
        assert_eq!(frags, vec![Fragment::Paragraph("… and –".to_string())]);
    }
}
