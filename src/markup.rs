// Output assembly: a frame's glyph grid as monospace markup. Rows are
// newline-terminated, HTML-sensitive glyphs are escaped, recolored glyphs are
// wrapped in a color span. `parse_markup` reads that format back for export.

use crate::glyph::Glyph;
use crate::types::Rgb;

const SPAN_OPEN: &str = "<span style=\"color:";
const SPAN_CLOSE: &str = "</span>";

/// A rendered frame before it becomes a string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl GlyphGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![Glyph::BLANK; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize and blank every cell, keeping the allocation.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, Glyph::BLANK);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Glyph {
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, glyph: Glyph) {
        self.cells[y * self.width + x] = glyph;
    }

    pub fn row(&self, y: usize) -> &[Glyph] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Glyph::is_blank)
    }

    /// The frame as markup: escaped glyphs, color spans, `\n` after every row.
    pub fn to_markup(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for g in self.row(y) {
                match g.color {
                    Some(color) if !g.is_blank() => {
                        out.push_str(SPAN_OPEN);
                        out.push_str(&color.to_string());
                        out.push_str("\">");
                        escape_into(&mut out, g.ch);
                        out.push_str(SPAN_CLOSE);
                    }
                    _ => escape_into(&mut out, g.ch),
                }
            }
            out.push('\n');
        }
        out
    }

    /// The frame as plain text, no escaping or colors.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            out.extend(self.row(y).iter().map(|g| g.ch));
            out.push('\n');
        }
        out
    }
}

/// Append `ch`, escaped for markup. Space is always a literal blank.
#[inline]
pub fn escape_into(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        c => out.push(c),
    }
}

/// Read one possibly-escaped character from the front of `s`.
fn take_char(s: &str) -> Option<(char, &str)> {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&nbsp;", ' '),
    ];
    for (entity, ch) in ENTITIES {
        if let Some(rest) = s.strip_prefix(entity) {
            return Some((ch, rest));
        }
    }
    let mut chars = s.chars();
    let c = chars.next()?;
    Some((c, chars.as_str()))
}

fn parse_line(mut s: &str) -> Vec<Glyph> {
    let mut glyphs = Vec::new();
    while !s.is_empty() {
        if let Some(rest) = s.strip_prefix(SPAN_OPEN) {
            let Some(end) = rest.find("\">") else { break };
            let color = Rgb::from_hex(&rest[..end]);
            let inner = &rest[end + 2..];
            let Some((ch, after)) = take_char(inner) else { break };
            glyphs.push(Glyph { ch, color: if ch == ' ' { None } else { color } });
            s = after.strip_prefix(SPAN_CLOSE).unwrap_or(after);
        } else if s.starts_with('<') {
            // Any other tag: skip it.
            s = match s.find('>') {
                Some(end) => &s[end + 1..],
                None => "",
            };
        } else if let Some((ch, rest)) = take_char(s) {
            glyphs.push(Glyph::plain(ch));
            s = rest;
        }
    }
    glyphs
}

/// Parse markup produced by `to_markup` back into a grid. Short rows are
/// padded with blanks.
pub fn parse_markup(markup: &str) -> GlyphGrid {
    let body = markup.strip_suffix('\n').unwrap_or(markup);
    if body.is_empty() {
        return GlyphGrid::new(0, 0);
    }
    let rows: Vec<Vec<Glyph>> = body.split('\n').map(|l| parse_line(l.trim_end_matches('\r'))).collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut grid = GlyphGrid::new(width, rows.len());
    for (y, row) in rows.iter().enumerate() {
        for (x, g) in row.iter().enumerate() {
            grid.set(x, y, *g);
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_grid_is_spaces_and_newlines() {
        let g = GlyphGrid::new(3, 2);
        assert_eq!(g.to_markup(), "   \n   \n");
        assert!(g.is_blank());
    }

    #[test]
    fn escapes_html_sensitive_glyphs() {
        let mut g = GlyphGrid::new(5, 1);
        for (x, c) in ['<', '>', '&', '"', '\''].into_iter().enumerate() {
            g.set(x, 0, Glyph::plain(c));
        }
        assert_eq!(g.to_markup(), "&lt;&gt;&amp;&quot;&#39;\n");
        assert_eq!(g.to_text(), "<>&\"'\n");
    }

    #[test]
    fn colored_glyphs_get_a_span_but_spaces_do_not() {
        let mut g = GlyphGrid::new(2, 1);
        g.set(0, 0, Glyph { ch: '@', color: Some(Rgb::new(255, 0, 16)) });
        g.set(1, 0, Glyph { ch: ' ', color: Some(Rgb::WHITE) });
        assert_eq!(g.to_markup(), "<span style=\"color:#ff0010\">@</span> \n");
    }

    #[test]
    fn parse_reads_back_markup() {
        let mut g = GlyphGrid::new(4, 2);
        g.set(0, 0, Glyph::plain('&'));
        g.set(1, 0, Glyph { ch: '<', color: Some(Rgb::new(1, 2, 3)) });
        g.set(3, 1, Glyph { ch: '▓', color: Some(Rgb::WHITE) });
        assert_eq!(parse_markup(&g.to_markup()), g);
    }

    #[test]
    fn parse_pads_ragged_rows_and_skips_unknown_tags() {
        let grid = parse_markup("ab\n<b>c</b>\n");
        assert_eq!((grid.width(), grid.height()), (2, 2));
        assert_eq!(grid.get(0, 1).ch, 'c');
        assert!(grid.get(1, 1).is_blank());
    }

    #[test]
    fn parse_empty() {
        let grid = parse_markup("");
        assert_eq!((grid.width(), grid.height()), (0, 0));
    }
}
