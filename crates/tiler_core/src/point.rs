//! Integer 2D coordinates used for world tiles, cells and local tile indices

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// An integer (x, y) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };
    pub const ONE: Point = Point { x: 1, y: 1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{X={},Y={}}}", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Adds the scalar to both components
impl Add<i32> for Point {
    type Output = Point;

    fn add(self, rhs: i32) -> Point {
        Point::new(self.x + rhs, self.y + rhs)
    }
}

/// Subtracts the scalar from both components
impl Sub<i32> for Point {
    type Output = Point;

    fn sub(self, rhs: i32) -> Point {
        Point::new(self.x - rhs, self.y - rhs)
    }
}

impl Mul<i32> for Point {
    type Output = Point;

    fn mul(self, rhs: i32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Truncating division of both components
impl Div<i32> for Point {
    type Output = Point;

    fn div(self, rhs: i32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3, -4);
        let b = Point::new(1, 2);

        assert_eq!(a + b, Point::new(4, -2));
        assert_eq!(a - b, Point::new(2, -6));
        assert_eq!(a + 1, Point::new(4, -3));
        assert_eq!(a - 1, Point::new(2, -5));
        assert_eq!(a * 2, Point::new(6, -8));
        assert_eq!(a / 2, Point::new(1, -2));
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(0, -1).to_string(), "{X=0,Y=-1}");
    }
}
