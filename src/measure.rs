use serde::Deserialize;
use unicode_width::UnicodeWidthStr;

/// Approximates the on-canvas size of a table card.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub header_height: f64,
    pub min_table_width: f64,
    pub min_table_height: f64,
    pub max_table_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 16.0,
            padding_y: 8.0,
            header_height: 40.0,
            min_table_width: 180.0,
            min_table_height: 80.0,
            max_table_height: 400.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Card size for a table showing `visible_fields` rows.
    pub fn table_size(&self, name: &str, visible_fields: usize) -> (f64, f64) {
        let width = (self.text_width(name) + self.padding_x * 2.0).max(self.min_table_width);

        let body_height = if visible_fields == 0 {
            0.0
        } else {
            visible_fields as f64 * self.line_height + self.padding_y * 2.0
        };

        let height = (self.header_height + body_height)
            .max(self.min_table_height)
            .min(self.max_table_height.max(self.min_table_height));

        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("Sales"), 5.0 * 8.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::default();
        // 全角文字は幅2
        assert_eq!(m.text_width("売上"), 4.0 * 8.0);
    }

    #[test]
    fn test_short_name_uses_min_width() {
        let m = TextMetrics::default();
        let (w, h) = m.table_size("Date", 0);
        assert_eq!(w, m.min_table_width);
        assert_eq!(h, m.min_table_height);
    }

    #[test]
    fn test_long_name_widens_table() {
        let m = TextMetrics::default();
        let name = "A_really_long_bridge_table_name_for_testing";
        let (w, _) = m.table_size(name, 1);
        assert_eq!(w, m.text_width(name) + m.padding_x * 2.0);
    }

    #[test]
    fn test_height_grows_then_caps() {
        let m = TextMetrics::default();
        let (_, small) = m.table_size("Product", 3);
        let (_, large) = m.table_size("Product", 8);
        let (_, huge) = m.table_size("Product", 500);
        assert!(small < large);
        assert_eq!(huge, m.max_table_height);
    }
}
