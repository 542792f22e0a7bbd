//! Crease regions: the physical non-display strip at the hinge.
//!
//! The crease is configured as `"x,y,width,height"` in the panel's natural
//! (portrait) orientation. Landscape orientations see it transposed.

use foldwm_core::types::{DisplayOrientation, Rect};
use serde_json::{json, Value};
use tracing::warn;

use super::types::FoldDisplayMode;
use crate::window::DisplayId;

const CREASE_RECT_FIELDS: usize = 4;

/// Parses a crease override. Separators may be `,` or `;`.
///
/// Returns `None` when the field count is wrong, a field is not an integer
/// or a size is negative.
pub fn parse_crease_rect(spec: &str) -> Option<Rect> {
    let fields: Vec<&str> = spec
        .split([',', ';'])
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() != CREASE_RECT_FIELDS {
        warn!("Crease region '{}' has {} fields, expected {}", spec, fields.len(), CREASE_RECT_FIELDS);
        return None;
    }
    let mut values = [0i32; CREASE_RECT_FIELDS];
    for (slot, field) in values.iter_mut().zip(&fields) {
        match field.parse::<i32>() {
            Ok(value) => *slot = value,
            Err(_) => {
                warn!("Crease region '{}' has a non-integer field '{}'", spec, field);
                return None;
            }
        }
    }
    let (Ok(width), Ok(height)) = (u32::try_from(values[2]), u32::try_from(values[3])) else {
        warn!("Crease region '{}' has a negative size", spec);
        return None;
    };
    Some(Rect::new(values[0], values[1], width, height))
}

/// Swaps the axes of a crease rect for a quarter-turned screen.
pub fn transpose(rect: &Rect) -> Rect {
    Rect::new(rect.pos_y, rect.pos_x, rect.height, rect.width)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FoldCreaseRegion {
    pub display_id: DisplayId,
    pub crease_rects: Vec<Rect>,
}

impl FoldCreaseRegion {
    pub fn new(display_id: DisplayId, crease_rects: Vec<Rect>) -> Self {
        Self { display_id, crease_rects }
    }

    pub fn empty(display_id: DisplayId) -> Self {
        Self::new(display_id, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.crease_rects.is_empty()
    }

    /// `{"displayId": 0, "creaseRects": [{"posX": .., "posY": .., "width": .., "height": ..}]}`
    pub fn to_json(&self) -> Value {
        json!({
            "displayId": self.display_id,
            "creaseRects": self.rects_json(),
        })
    }

    fn rects_json(&self) -> Vec<Value> {
        self.crease_rects
            .iter()
            .map(|rect| {
                json!({
                    "posX": rect.pos_x,
                    "posY": rect.pos_y,
                    "width": rect.width,
                    "height": rect.height,
                })
            })
            .collect()
    }
}

/// The crease seen in one display mode and orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldCreaseRegionItem {
    pub orientation: DisplayOrientation,
    pub display_mode: FoldDisplayMode,
    pub region: FoldCreaseRegion,
}

impl FoldCreaseRegionItem {
    pub fn new(orientation: DisplayOrientation, display_mode: FoldDisplayMode, region: FoldCreaseRegion) -> Self {
        Self { orientation, display_mode, region }
    }

    /// Capability entry as published to clients. Enum values are stringified
    /// integers.
    pub fn to_capability_json(&self) -> Value {
        let orientation = match self.orientation {
            DisplayOrientation::Portrait => 0,
            DisplayOrientation::Landscape => 1,
        };
        json!({
            "foldDisplayMode": self.display_mode.as_i32().to_string(),
            "displayOrientation": orientation.to_string(),
            "creaseRects": {
                "displayId": self.region.display_id.to_string(),
                "rects": self.region.rects_json(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0,1064,2496,171", Some(Rect::new(0, 1064, 2496, 171)))]
    #[case("0;994;1320;132", Some(Rect::new(0, 994, 1320, 132)))]
    #[case(" 10 , 20 ; 30 , 40 ", Some(Rect::new(10, 20, 30, 40)))]
    #[case("0,1064,2496", None)]
    #[case("0,1064,2496,171,5", None)]
    #[case("0,abc,2496,171", None)]
    #[case("0,0,-1,171", None)]
    #[case("", None)]
    fn parses_crease_override(#[case] spec: &str, #[case] expected: Option<Rect>) {
        assert_eq!(parse_crease_rect(spec), expected);
    }

    #[test]
    fn transposes_for_landscape() {
        assert_eq!(transpose(&Rect::new(0, 1064, 2496, 171)), Rect::new(1064, 0, 171, 2496));
    }

    #[test]
    fn region_json_layout() {
        let region = FoldCreaseRegion::new(0, vec![Rect::new(0, 1256, 1136, 184)]);
        let json = region.to_json();
        assert_eq!(json["displayId"], 0);
        assert_eq!(json["creaseRects"][0]["posY"], 1256);
        assert_eq!(json["creaseRects"][0]["height"], 184);
        assert_eq!(FoldCreaseRegion::empty(0).to_json()["creaseRects"], json!([]));
    }

    #[test]
    fn capability_json_stringifies_enums() {
        let item = FoldCreaseRegionItem::new(
            DisplayOrientation::Landscape,
            FoldDisplayMode::Full,
            FoldCreaseRegion::new(0, vec![Rect::new(1, 2, 3, 4)]),
        );
        let json = item.to_capability_json();
        assert_eq!(json["foldDisplayMode"], "1");
        assert_eq!(json["displayOrientation"], "1");
        assert_eq!(json["creaseRects"]["displayId"], "0");
        assert_eq!(json["creaseRects"]["rects"][0]["posX"], 1);
    }
}
