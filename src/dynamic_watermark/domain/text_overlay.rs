use crate::domain::position::AnchorRule;
use crate::domain::watermark::{TEXT_FILL, TEXT_FONT_FAMILY, TEXT_FONT_SIZE, TEXT_OPACITY};

/// Text watermark laid out as an SVG document covering the whole base image.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub width: u32,
    pub height: u32,
    pub x_percent: f32,
    pub y_percent: f32,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, width: u32, height: u32, rule: &AnchorRule) -> Self {
        Self {
            text: text.into(),
            width,
            height,
            x_percent: rule.x_percent,
            y_percent: rule.y_percent,
        }
    }

    /// Pixel coordinates the text is centered on.
    pub fn anchor_point(&self) -> (f32, f32) {
        (
            self.width as f32 * self.x_percent / 100.0,
            self.height as f32 * self.y_percent / 100.0,
        )
    }

    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">
    <text x="{x}%" y="{y}%" dominant-baseline="middle" text-anchor="middle" font-family="{family}" font-size="{size}" fill="{fill}" opacity="{opacity}">{text}</text>
</svg>"#,
            width = self.width,
            height = self.height,
            x = self.x_percent,
            y = self.y_percent,
            family = TEXT_FONT_FAMILY,
            size = TEXT_FONT_SIZE,
            fill = TEXT_FILL,
            opacity = TEXT_OPACITY,
            text = escape_xml(&self.text),
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::resolve;

    #[test]
    fn test_bottom_left_text_overlay() {
        let overlay = TextOverlay::new("SALE", 800, 600, &resolve("bottom-left"));
        assert_eq!(overlay.anchor_point(), (80.0, 570.0));

        let svg = overlay.to_svg();
        assert!(svg.contains(r#"width="800" height="600""#));
        assert!(svg.contains(r#"x="10%" y="95%""#));
        assert!(svg.contains(r#"font-size="30""#));
        assert!(svg.contains(r#"opacity="0.5""#));
        assert!(svg.contains(r#"fill="white""#));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"font-family="Arial""#));
        assert!(svg.contains(">SALE</text>"));
    }

    #[test]
    fn test_center_fallback_coordinates() {
        let overlay = TextOverlay::new("x", 1000, 500, &resolve("nowhere"));
        assert_eq!(overlay.anchor_point(), (500.0, 250.0));
        assert!(overlay.to_svg().contains(r#"x="50%" y="50%""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let overlay = TextOverlay::new(r#"<b>Tom & "Jerry"</b>"#, 10, 10, &resolve("center"));
        let svg = overlay.to_svg();
        assert!(svg.contains("&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"));
        assert!(!svg.contains("<b>"));
    }
}
