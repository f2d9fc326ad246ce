use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in integer diagram coordinates, y growing downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> i32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> i32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Integer centre, truncated toward the origin corner.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.max_x() && point.y >= self.y && point.y <= self.max_y()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grows the rectangle by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inflated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + 2 * dx,
            self.height + 2 * dy,
        )
    }

    /// Union of every rectangle yielded, or `None` for an empty iterator.
    pub fn union_all<I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Rect>,
    {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, rect| match acc {
                Some(current) => Some(current.union(&rect)),
                None => Some(rect),
            })
    }
}

/// Compass direction used to request a boundary intersection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit vector in screen coordinates.
    pub fn vector(self) -> (f64, f64) {
        let d = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            Direction::North => (0.0, -1.0),
            Direction::NorthEast => (d, -d),
            Direction::East => (1.0, 0.0),
            Direction::SouthEast => (d, d),
            Direction::South => (0.0, 1.0),
            Direction::SouthWest => (-d, d),
            Direction::West => (-1.0, 0.0),
            Direction::NorthWest => (-d, -d),
        }
    }
}

/// Point where a ray from the centre of `bounds` along `direction` leaves the rectangle.
pub fn rectangular_connection_point(bounds: &Rect, direction: Direction) -> Point {
    let (ex, ey) = direction.vector();
    let center = bounds.center();
    let mut x = center.x;
    let mut y = center.y;
    if bounds.width == 0 {
        return center;
    }
    let slope = bounds.height as f64 / bounds.width as f64;
    if ex != 0.0 && -slope <= ey / ex && ey / ex <= slope {
        // left or right edge
        let offset = (bounds.width as f64 / 2.0 * ey / ex) as i32;
        if ex > 0.0 {
            x = bounds.max_x();
            y += offset;
        } else {
            x = bounds.x;
            y -= offset;
        }
    } else if ey != 0.0 {
        let offset = (bounds.height as f64 / 2.0 * ex / ey) as i32;
        if ey > 0.0 {
            x += offset;
            y = bounds.max_y();
        } else {
            x -= offset;
            y = bounds.y;
        }
    }
    Point::new(x, y)
}
