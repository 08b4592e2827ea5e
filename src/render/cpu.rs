use kurbo::{Cap, Join, Stroke, StrokeOpts};

use crate::{
    foundation::{
        core::{BezPath, Canvas, Hsb},
        error::{SketchError, SketchResult},
    },
    render::{FrameRGBA, RenderBackend, RenderSettings},
    sketch::draw::{DrawCommand, DrawList, StrokeStyle},
};

const DEFAULT_TOLERANCE: f64 = 0.1;

/// Software rasterizer built on `vello_cpu`.
pub struct CpuBackend {
    settings: RenderSettings,
    surface: Option<CpuSurface>,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            surface: None,
        }
    }

    fn ensure_surface(&mut self, canvas: Canvas) -> SketchResult<CpuSurface> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| SketchError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| SketchError::render("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(SketchError::render("surface width/height must be non-zero"));
        }

        // Reuse the previous tick's pixmap when the size is unchanged.
        let mut surface = match self.surface.take() {
            Some(s) if s.width == width && s.height == height => s,
            _ => CpuSurface {
                width,
                height,
                pixmap: vello_cpu::Pixmap::new(width, height),
            },
        };

        clear_pixmap(&mut surface.pixmap, [0, 0, 0, 0]);
        Ok(surface)
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(level = "trace", skip(self, list), fields(commands = list.len()))]
    fn render_draw_list(&mut self, canvas: Canvas, list: &DrawList) -> SketchResult<FrameRGBA> {
        let mut surface = self.ensure_surface(canvas)?;
        let tolerance = self.settings.tolerance.unwrap_or(DEFAULT_TOLERANCE);

        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if let Some([r, g, b, a]) = self.settings.clear_rgba {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&canvas_rect(canvas));
        }
        for cmd in list {
            draw_command(&mut ctx, canvas, cmd, tolerance);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);

        let frame = FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: surface.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        };
        self.surface = Some(surface);
        Ok(frame)
    }
}

fn draw_command(
    ctx: &mut vello_cpu::RenderContext,
    canvas: Canvas,
    cmd: &DrawCommand,
    tolerance: f64,
) {
    match cmd {
        DrawCommand::Background(color) => {
            set_color(ctx, *color);
            ctx.fill_rect(&canvas_rect(canvas));
        }
        DrawCommand::Polyline { stroke, .. } | DrawCommand::Line { stroke, .. } => {
            if !cmd.is_finite() {
                tracing::debug!("dropping draw command with non-finite coordinates");
                return;
            }
            let Some(centerline) = cmd.to_path() else {
                return;
            };
            let outline = stroke_outline(&centerline, *stroke, tolerance);
            set_color(ctx, stroke.color);
            ctx.fill_path(&bezpath_to_cpu(&outline));
        }
    }
}

fn canvas_rect(canvas: Canvas) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height))
}

fn set_color(ctx: &mut vello_cpu::RenderContext, color: Hsb) {
    let [r, g, b, a] = color.to_rgba8();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

/// Fillable outline of a stroked centerline. Round caps, mitered joins.
pub(crate) fn stroke_outline(centerline: &BezPath, style: StrokeStyle, tolerance: f64) -> BezPath {
    let stroke = Stroke::new(style.weight.max(0.0))
        .with_caps(Cap::Round)
        .with_join(Join::Miter);
    kurbo::stroke(
        centerline.elements().iter().copied(),
        &stroke,
        &StrokeOpts::default(),
        tolerance,
    )
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Point;

    fn canvas() -> Canvas {
        Canvas {
            width: 32,
            height: 32,
        }
    }

    #[test]
    fn empty_list_yields_clear_color() {
        let mut be = CpuBackend::new(RenderSettings {
            clear_rgba: Some([1, 2, 3, 255]),
            tolerance: None,
        });
        let frame = be.render_draw_list(canvas(), &DrawList::new()).unwrap();
        assert_eq!(frame.data.len(), 32 * 32 * 4);
        assert_eq!(frame.pixel(5, 5), Some([1, 2, 3, 255]));
    }

    #[test]
    fn background_covers_every_pixel() {
        let mut list = DrawList::new();
        list.push(DrawCommand::Background(Hsb::new(0.0, 100.0, 100.0)));
        let frame = CpuBackend::default().render_draw_list(canvas(), &list).unwrap();
        for px in frame.data.chunks_exact(4) {
            assert_eq!(px, [255, 0, 0, 255]);
        }
    }

    #[test]
    fn stroked_line_marks_its_path_only() {
        let mut list = DrawList::new();
        list.push(DrawCommand::Background(Hsb::new(0.0, 0.0, 0.0)));
        list.push(DrawCommand::Line {
            from: Point::new(0.0, 16.0),
            to: Point::new(32.0, 16.0),
            stroke: StrokeStyle {
                color: Hsb::new(0.0, 0.0, 100.0),
                weight: 4.0,
            },
        });
        let frame = CpuBackend::default().render_draw_list(canvas(), &list).unwrap();
        assert_eq!(frame.pixel(16, 15), Some([255, 255, 255, 255]));
        assert_eq!(frame.pixel(16, 2), Some([0, 0, 0, 255]));
    }

    #[test]
    fn non_finite_commands_are_dropped() {
        let mut list = DrawList::new();
        list.push(DrawCommand::Polyline {
            points: vec![Point::new(0.0, f64::NAN), Point::new(10.0, 10.0)],
            stroke: StrokeStyle {
                color: Hsb::new(0.0, 0.0, 100.0),
                weight: 1.0,
            },
        });
        let frame = CpuBackend::default().render_draw_list(canvas(), &list).unwrap();
        assert!(frame.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn stroke_outline_is_closed_area() {
        let mut line = BezPath::new();
        line.move_to((0.0, 0.0));
        line.line_to((10.0, 0.0));
        let outline = stroke_outline(
            &line,
            StrokeStyle {
                color: Hsb::new(0.0, 0.0, 0.0),
                weight: 2.0,
            },
            0.1,
        );
        let bbox = kurbo::Shape::bounding_box(&outline);
        assert!(bbox.height() >= 1.9);
        assert!(bbox.width() >= 10.0);
    }
}
