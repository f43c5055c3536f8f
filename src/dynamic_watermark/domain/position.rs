/// Where the watermark goes on the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    TopLeft,
    TopRight,
    Center,
    BottomLeft,
    BottomRight,
}

impl Position {
    /// Parses a position tag such as `"bottom-left"`. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "top-left" => Some(Position::TopLeft),
            "top-right" => Some(Position::TopRight),
            "center" => Some(Position::Center),
            "bottom-left" => Some(Position::BottomLeft),
            "bottom-right" => Some(Position::BottomRight),
            _ => None,
        }
    }

    pub fn resolve(self) -> AnchorRule {
        resolve_position(Some(self))
    }
}

/// Compass anchor used to place an overlay inside a larger canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Anchor {
    /// Top-left offset of an `overlay` sized box anchored inside `canvas`.
    ///
    /// Offsets are negative when the overlay is larger than the canvas;
    /// callers decide whether that is acceptable.
    pub fn offset(self, canvas: (u32, u32), overlay: (u32, u32)) -> (i64, i64) {
        let free_x = canvas.0 as i64 - overlay.0 as i64;
        let free_y = canvas.1 as i64 - overlay.1 as i64;

        let x = match self {
            Anchor::NorthWest | Anchor::West | Anchor::SouthWest => 0,
            Anchor::North | Anchor::Center | Anchor::South => free_x.div_euclid(2),
            Anchor::NorthEast | Anchor::East | Anchor::SouthEast => free_x,
        };
        let y = match self {
            Anchor::NorthWest | Anchor::North | Anchor::NorthEast => 0,
            Anchor::West | Anchor::Center | Anchor::East => free_y.div_euclid(2),
            Anchor::SouthWest | Anchor::South | Anchor::SouthEast => free_y,
        };
        (x, y)
    }
}

/// Anchor for raster compositing plus percentage coordinates for markup placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorRule {
    pub anchor: Anchor,
    pub x_percent: f32,
    pub y_percent: f32,
}

impl AnchorRule {
    const fn new(anchor: Anchor, x_percent: f32, y_percent: f32) -> Self {
        Self {
            anchor,
            x_percent,
            y_percent,
        }
    }
}

pub fn resolve_position(position: Option<Position>) -> AnchorRule {
    match position {
        Some(Position::TopLeft) => AnchorRule::new(Anchor::NorthWest, 10.0, 10.0),
        Some(Position::TopRight) => AnchorRule::new(Anchor::NorthEast, 90.0, 10.0),
        Some(Position::Center) => AnchorRule::new(Anchor::Center, 50.0, 50.0),
        Some(Position::BottomLeft) => AnchorRule::new(Anchor::SouthWest, 10.0, 95.0),
        Some(Position::BottomRight) => AnchorRule::new(Anchor::SouthEast, 90.0, 95.0),
        // Unrecognised tags are placed in the center instead of failing the call.
        None => AnchorRule::new(Anchor::Center, 50.0, 50.0),
    }
}

/// Resolves a raw position tag; anything unrecognised falls back to center.
pub fn resolve(tag: &str) -> AnchorRule {
    resolve_position(Position::parse(tag))
}
