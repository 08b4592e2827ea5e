use crate::foundation::core::{BezPath, Hsb, Point};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    pub color: Hsb,
    pub weight: f64,
}

/// Backend-agnostic drawing instruction produced by a sketch tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DrawCommand {
    /// Fill the whole surface.
    Background(Hsb),
    /// Open, unfilled polyline through `points`.
    Polyline {
        points: Vec<Point>,
        stroke: StrokeStyle,
    },
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
}

impl DrawCommand {
    pub fn stroke(&self) -> Option<StrokeStyle> {
        match self {
            DrawCommand::Background(_) => None,
            DrawCommand::Polyline { stroke, .. } | DrawCommand::Line { stroke, .. } => {
                Some(*stroke)
            }
        }
    }

    /// Centerline path of a stroked command.
    pub fn to_path(&self) -> Option<BezPath> {
        match self {
            DrawCommand::Background(_) => None,
            DrawCommand::Polyline { points, .. } => {
                let mut it = points.iter();
                let first = it.next()?;
                let mut path = BezPath::new();
                path.move_to(*first);
                for p in it {
                    path.line_to(*p);
                }
                Some(path)
            }
            DrawCommand::Line { from, to, .. } => {
                let mut path = BezPath::new();
                path.move_to(*from);
                path.line_to(*to);
                Some(path)
            }
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            DrawCommand::Background(_) => true,
            DrawCommand::Polyline { points, .. } => points.iter().all(|p| p.is_finite()),
            DrawCommand::Line { from, to, .. } => from.is_finite() && to.is_finite(),
        }
    }
}

/// Draw commands of one tick, in paint order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> StrokeStyle {
        StrokeStyle {
            color: Hsb::new(0.0, 100.0, 100.0),
            weight: 1.0,
        }
    }

    #[test]
    fn polyline_path_visits_every_point() {
        let cmd = DrawCommand::Polyline {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
            stroke: style(),
        };
        let path = cmd.to_path().unwrap();
        assert_eq!(path.elements().len(), 3);
    }

    #[test]
    fn empty_polyline_has_no_path() {
        let cmd = DrawCommand::Polyline {
            points: vec![],
            stroke: style(),
        };
        assert!(cmd.to_path().is_none());
        assert!(DrawCommand::Background(Hsb::new(0.0, 0.0, 0.0)).to_path().is_none());
    }

    #[test]
    fn non_finite_points_are_detected() {
        let cmd = DrawCommand::Line {
            from: Point::new(0.0, f64::INFINITY),
            to: Point::new(1.0, 1.0),
            stroke: style(),
        };
        assert!(!cmd.is_finite());
    }
}
