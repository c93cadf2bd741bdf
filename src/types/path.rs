//! Vertex paths for polygons and zone outlines.

use super::angle::Angle;
use super::length::PositiveLength;
use super::point::{Orientation, Point};

/// One vertex of a [`Path`].
///
/// The angle is the arc of the edge leaving this vertex towards the next one
/// (zero for a straight edge). On the last vertex it denotes the closing
/// edge back to the first vertex, which only exists when the path is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vertex {
    /// Position of the vertex.
    pub pos: Point,
    /// Arc angle of the outgoing edge.
    pub angle: Angle,
}

impl Vertex {
    /// Creates a vertex with a straight outgoing edge.
    #[must_use]
    pub const fn new(pos: Point) -> Self {
        Self {
            pos,
            angle: Angle::DEG_0,
        }
    }

    /// Creates a vertex with an arced outgoing edge.
    #[must_use]
    pub const fn with_angle(pos: Point, angle: Angle) -> Self {
        Self { pos, angle }
    }
}

/// An ordered list of vertices describing an open polyline or a closed
/// polygon outline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    vertices: Vec<Vertex>,
}

impl Path {
    /// Creates a path from vertices.
    #[must_use]
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// Creates an axis-aligned rectangle between two corners, closed.
    #[must_use]
    pub fn rect(corner1: Point, corner2: Point) -> Self {
        Self::new(vec![
            Vertex::new(corner1),
            Vertex::new(Point::new(corner2.x, corner1.y)),
            Vertex::new(corner2),
            Vertex::new(Point::new(corner1.x, corner2.y)),
            Vertex::new(corner1),
        ])
    }

    /// The vertices in order.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Mutable access to the vertices.
    pub fn vertices_mut(&mut self) -> &mut Vec<Vertex> {
        &mut self.vertices
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the path has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the last vertex coincides with the first one.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) if self.vertices.len() >= 2 => first.pos == last.pos,
            _ => false,
        }
    }

    /// Returns the path translated by `delta`.
    #[must_use]
    pub fn translated(&self, delta: Point) -> Self {
        self.mapped(|v| Vertex::with_angle(v.pos + delta, v.angle))
    }

    /// Returns the path rotated around `center`.
    #[must_use]
    pub fn rotated(&self, angle: Angle, center: Point) -> Self {
        self.mapped(|v| Vertex::with_angle(v.pos.rotated(angle, center), v.angle))
    }

    /// Returns the path mirrored across the axis through `center`.
    ///
    /// Arc angles are negated so the mirrored edges keep bulging to the
    /// matching side.
    #[must_use]
    pub fn mirrored(&self, orientation: Orientation, center: Point) -> Self {
        self.mapped(|v| Vertex::with_angle(v.pos.mirrored(orientation, center), -v.angle))
    }

    /// Returns the path with every vertex snapped to the grid.
    #[must_use]
    pub fn mapped_to_grid(&self, interval: PositiveLength) -> Self {
        self.mapped(|v| Vertex::with_angle(v.pos.mapped_to_grid(interval), v.angle))
    }

    fn mapped(&self, f: impl Fn(&Vertex) -> Vertex) -> Self {
        Self::new(self.vertices.iter().map(f).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Path {
        Path::new(vec![
            Vertex::new(Point::from_nm(0, 0)),
            Vertex::new(Point::from_nm(1_000_000, 0)),
            Vertex::new(Point::from_nm(1_000_000, 1_000_000)),
        ])
    }

    #[test]
    fn open_and_closed() {
        let mut path = triangle();
        assert!(!path.is_closed());
        path.vertices_mut().push(Vertex::new(Point::from_nm(0, 0)));
        assert!(path.is_closed());
        assert!(!Path::default().is_closed());
    }

    #[test]
    fn rect_is_closed_with_five_vertices() {
        let rect = Path::rect(Point::from_nm(0, 0), Point::from_nm(2_000_000, 1_000_000));
        assert_eq!(rect.len(), 5);
        assert!(rect.is_closed());
        assert_eq!(rect.vertices()[1].pos, Point::from_nm(2_000_000, 0));
    }

    #[test]
    fn translate_back_and_forth_is_identity() {
        let path = triangle();
        let delta = Point::from_nm(300_000, -200_000);
        assert_eq!(path.translated(delta).translated(-delta), path);
    }

    #[test]
    fn mirror_negates_arc_angles() {
        let path = Path::new(vec![
            Vertex::with_angle(Point::from_nm(0, 0), Angle::DEG_90),
            Vertex::new(Point::from_nm(1_000_000, 0)),
        ]);
        let mirrored = path.mirrored(Orientation::Horizontal, Point::ORIGIN);
        assert_eq!(mirrored.vertices()[0].angle, -Angle::DEG_90);
        assert_eq!(mirrored.vertices()[0].pos, Point::from_nm(0, 0));
        assert_eq!(mirrored.vertices()[1].pos, Point::from_nm(-1_000_000, 0));
    }
}
