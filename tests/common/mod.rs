use std::path::Path;

use dxf::entities::{Entity, EntityType, Line, MText, Text};
use dxf::enums::AcadVersion;
use dxf::{Drawing, Point};

pub enum Fixture<'a> {
    Line((f64, f64), (f64, f64)),
    Text(f64, f64, &'a str),
    MText(f64, f64, &'a str),
}

/// Vertical and horizontal lines spanning the full extent of `xs` x `ys`.
pub fn grid_lines(xs: &[f64], ys: &[f64]) -> Vec<Fixture<'static>> {
    let (x_min, x_max) = (xs[0], xs[xs.len() - 1]);
    let (y_min, y_max) = (ys[0], ys[ys.len() - 1]);
    let mut out = Vec::new();
    for &x in xs {
        out.push(Fixture::Line((x, y_min), (x, y_max)));
    }
    for &y in ys {
        out.push(Fixture::Line((x_min, y), (x_max, y)));
    }
    out
}

pub fn create_test_dxf(
    path: &Path,
    fixtures: &[Fixture<'_>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut drawing = Drawing::new();
    drawing.header.version = AcadVersion::R2000;

    for fixture in fixtures {
        let specific = match fixture {
            Fixture::Line(start, end) => EntityType::Line(Line::new(
                Point::new(start.0, start.1, 0.0),
                Point::new(end.0, end.1, 0.0),
            )),
            Fixture::Text(x, y, value) => {
                let mut text = Text::default();
                text.location = Point::new(*x, *y, 0.0);
                text.value = (*value).to_string();
                EntityType::Text(text)
            }
            Fixture::MText(x, y, value) => {
                let mut mtext = MText::default();
                mtext.insertion_point = Point::new(*x, *y, 0.0);
                mtext.text = (*value).to_string();
                EntityType::MText(mtext)
            }
        };
        drawing.add_entity(Entity::new(specific));
    }

    drawing.save_file(path)?;
    Ok(())
}
