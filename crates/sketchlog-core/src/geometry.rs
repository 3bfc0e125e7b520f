//! Coordinate transforms between capture-frame logical units and device pixels.
//!
//! Every operation remembers the surface size it was captured against (its
//! capture frame). Dispatching it to a surface of a different size rescales
//! the stored points; transform updates reported back by the surface are
//! mapped into the original capture frame again.

use crate::error::TransformError;
use kurbo::{Point, Size, Vec2};

/// Number of decimal places kept on the command channel.
pub const PRECISION_DIGITS: i32 = 2;

/// Round a value to the fixed two-decimal precision used on the wire.
pub fn round2(value: f64) -> f64 {
    let factor = 10f64.powi(PRECISION_DIGITS);
    (value * factor).round() / factor
}

/// Round both coordinates of a point to two decimals.
pub fn round_point(point: Point) -> Point {
    Point::new(round2(point.x), round2(point.y))
}

/// Check whether a size can be divided by.
pub fn is_degenerate(size: Size) -> bool {
    size.width == 0.0 || size.height == 0.0 || !size.width.is_finite() || !size.height.is_finite()
}

/// Map a logical point captured against `capture` onto a surface that is
/// currently `current` logical units large and renders `screen_scale` device
/// pixels per logical unit.
///
/// Only the logical input is rounded to the wire precision. Scaling the
/// rounded point is not rounded again, so mapping the result back with
/// [`to_logical`] lands within 0.01 of the input at any screen scale.
pub fn to_device(
    point: Point,
    capture: Size,
    current: Size,
    screen_scale: f64,
) -> Result<Point, TransformError> {
    if is_degenerate(capture) {
        return Err(TransformError::ZeroCaptureFrame);
    }
    let point = round_point(point);
    Ok(Point::new(
        point.x * screen_scale * current.width / capture.width,
        point.y * screen_scale * current.height / capture.height,
    ))
}

/// Map a device point reported by the surface back into the `reference`
/// frame (usually the capture frame of the operation being updated).
pub fn to_logical(
    device: Point,
    current: Size,
    screen_scale: f64,
    reference: Size,
) -> Result<Point, TransformError> {
    let r = ratio(reference, current, screen_scale)?;
    Ok(Point::new(device.x * r.x, device.y * r.y))
}

/// Per-axis factors converting device pixels on the current surface into
/// units of `reference`.
pub fn ratio(reference: Size, current: Size, screen_scale: f64) -> Result<Vec2, TransformError> {
    if is_degenerate(current) || screen_scale == 0.0 {
        return Err(TransformError::ZeroSurface);
    }
    Ok(Vec2::new(
        reference.width / (screen_scale * current.width),
        reference.height / (screen_scale * current.height),
    ))
}

/// The surface as it currently is: its logical size and device pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    pub size: Size,
    pub screen_scale: f64,
}

impl SurfaceFrame {
    pub fn new(size: Size, screen_scale: f64) -> Self {
        Self { size, screen_scale }
    }

    /// Whether commands can be scaled onto this surface yet.
    pub fn is_ready(&self) -> bool {
        !is_degenerate(self.size) && self.screen_scale > 0.0
    }

    /// See [`to_device`].
    pub fn to_device(&self, point: Point, capture: Size) -> Result<Point, TransformError> {
        to_device(point, capture, self.size, self.screen_scale)
    }

    /// See [`to_logical`].
    pub fn to_logical(&self, device: Point, reference: Size) -> Result<Point, TransformError> {
        to_logical(device, self.size, self.screen_scale, reference)
    }

    /// See [`ratio`].
    pub fn ratio(&self, reference: Size) -> Result<Vec2, TransformError> {
        ratio(reference, self.size, self.screen_scale)
    }
}

/// Format a point as the `"x,y"` string used by the command channel.
pub fn format_point(point: Point) -> String {
    let p = round_point(point);
    format!("{},{}", p.x, p.y)
}

/// Parse an `"x,y"` string.
pub fn parse_point(s: &str) -> Option<Point> {
    let (x, y) = s.split_once(',')?;
    let x = x.trim().parse::<f64>().ok()?;
    let y = y.trim().parse::<f64>().ok()?;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point::new(x, y))
}

/// Serde adapter storing a [`Point`] as an `"x,y"` string.
pub mod point_string {
    use super::{format_point, parse_point};
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_point(*point))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_point(&s).ok_or_else(|| D::Error::custom(format!("invalid point: {s:?}")))
    }

    /// Same as the parent module, for `Option<Point>`.
    pub mod option {
        use super::{format_point, parse_point};
        use kurbo::Point;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(
            point: &Option<Point>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match point {
                Some(p) => serializer.serialize_some(&format_point(*p)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Point>, D::Error> {
            let s = Option::<String>::deserialize(deserializer)?;
            match s {
                Some(s) => parse_point(&s)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid point: {s:?}"))),
                None => Ok(None),
            }
        }
    }

    /// Same as the parent module, for `Vec<Point>`.
    pub mod vec {
        use super::{format_point, parse_point};
        use kurbo::Point;
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer, de::Error};

        pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(points.len()))?;
            for p in points {
                seq.serialize_element(&format_point(*p))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Point>, D::Error> {
            let raw = Vec::<String>::deserialize(deserializer)?;
            raw.iter()
                .map(|s| {
                    parse_point(s).ok_or_else(|| D::Error::custom(format!("invalid point: {s:?}")))
                })
                .collect()
        }
    }
}

/// Serde adapter for [`Size`] as `{ "width": .., "height": .. }`.
pub mod size_object {
    use kurbo::Size;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct SizeObject {
        width: f64,
        height: f64,
    }

    pub fn serialize<S: Serializer>(size: &Size, serializer: S) -> Result<S::Ok, S::Error> {
        SizeObject {
            width: size.width,
            height: size.height,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Size, D::Error> {
        let s = SizeObject::deserialize(deserializer)?;
        Ok(Size::new(s.width, s.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point, eps: f64) -> bool {
        (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps
    }

    #[test]
    fn test_to_device_same_size() {
        let capture = Size::new(300.0, 500.0);
        let device = to_device(Point::new(60.0, 100.0), capture, capture, 1.0).unwrap();
        assert_eq!(device, Point::new(60.0, 100.0));
    }

    #[test]
    fn test_to_device_double_size() {
        let capture = Size::new(300.0, 500.0);
        let current = Size::new(600.0, 1000.0);
        let device = to_device(Point::new(60.0, 100.0), capture, current, 1.0).unwrap();
        assert_eq!(device, Point::new(120.0, 200.0));
    }

    #[test]
    fn test_to_device_applies_screen_scale() {
        let capture = Size::new(300.0, 500.0);
        let device = to_device(Point::new(10.0, 20.0), capture, capture, 3.0).unwrap();
        assert_eq!(device, Point::new(30.0, 60.0));
    }

    #[test]
    fn test_zero_capture_frame_rejected() {
        let err = to_device(Point::new(1.0, 1.0), Size::ZERO, Size::new(10.0, 10.0), 1.0);
        assert_eq!(err, Err(TransformError::ZeroCaptureFrame));
    }

    #[test]
    fn test_zero_surface_rejected() {
        let err = to_logical(Point::new(1.0, 1.0), Size::ZERO, 1.0, Size::new(10.0, 10.0));
        assert_eq!(err, Err(TransformError::ZeroSurface));
        let err = ratio(Size::new(1.0, 1.0), Size::new(1.0, 1.0), 0.0);
        assert_eq!(err, Err(TransformError::ZeroSurface));
    }

    #[test]
    fn test_round_trip() {
        let capture = Size::new(300.0, 500.0);
        let scale = 2.625;
        let p = Point::new(123.456, 78.9);
        let device = to_device(p, capture, capture, scale).unwrap();
        let back = to_logical(device, capture, scale, capture).unwrap();
        assert!(approx(back, p, 0.01), "{back:?} vs {p:?}");
    }

    #[test]
    fn test_round_trip_below_unit_scale() {
        let capture = Size::new(300.0, 500.0);
        let scale = 0.75;
        let p = Point::new(32.455, 10.0);
        let device = to_device(p, capture, capture, scale).unwrap();
        let back = to_logical(device, capture, scale, capture).unwrap();
        assert!(approx(back, p, 0.01), "{back:?} vs {p:?}");
    }

    #[test]
    fn test_ratio() {
        let r = ratio(Size::new(300.0, 500.0), Size::new(600.0, 1000.0), 2.0).unwrap();
        assert_eq!(r, Vec2::new(0.25, 0.25));
    }

    #[test]
    fn test_surface_frame() {
        let frame = SurfaceFrame::new(Size::new(600.0, 1000.0), 1.0);
        assert!(frame.is_ready());
        assert!(!SurfaceFrame::new(Size::new(600.0, 0.0), 1.0).is_ready());

        let capture = Size::new(300.0, 500.0);
        let device = frame.to_device(Point::new(60.0, 100.0), capture).unwrap();
        assert_eq!(device, Point::new(120.0, 200.0));
        assert_eq!(frame.to_logical(device, capture).unwrap(), Point::new(60.0, 100.0));
    }

    #[test]
    fn test_point_string_codec() {
        assert_eq!(format_point(Point::new(1.005, 2.0)), "1,2");
        assert_eq!(format_point(Point::new(12.345678, -3.5)), "12.35,-3.5");
        assert_eq!(parse_point(" 4.5 , 6"), Some(Point::new(4.5, 6.0)));
        assert_eq!(parse_point("4.5"), None);
        assert_eq!(parse_point("a,b"), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-0.004), 0.0);
    }
}
