use serde::{Deserialize, Serialize};

use crate::error::{Result, ShError};

/// Axis-aligned bounding box. Corners are always normalized so that `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    /// Create a bounding box from two opposite corners given in any order
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Parse `x1,y1,x2,y2`
    pub fn parse(text: &str) -> Result<Self> {
        let coords: Vec<f64> = text
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ShError::validation(format!("Invalid bounding box '{}': {}", text, e)))?;

        match coords.as_slice() {
            [x1, y1, x2, y2] => Ok(Self::new(*x1, *y1, *x2, *y2)),
            _ => Err(ShError::validation(format!(
                "Invalid bounding box '{}': expected 4 comma-separated values",
                text
            ))),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let bbox = BBox::new(10.0, 21.0, 11.0, 20.0);
        assert_eq!(bbox, BBox { min_x: 10.0, min_y: 20.0, max_x: 11.0, max_y: 21.0 });
    }

    #[test]
    fn test_parse() {
        let bbox = BBox::parse("10, 20, 11, 21").unwrap();
        assert_eq!(bbox.width(), 1.0);
        assert_eq!(bbox.center(), (10.5, 20.5));
        assert!(BBox::parse("10,20,11").is_err());
        assert!(BBox::parse("a,b,c,d").is_err());
    }
}
