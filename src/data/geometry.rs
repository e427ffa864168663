use super::error::InvalidGeometry;

/// A map position in standard GIS order: `x` is longitude, `y` latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    pub fn lon(&self) -> f64 {
        self.x
    }

    pub fn lat(&self) -> f64 {
        self.y
    }
}

/// Parse a storm-center WKT point and swap its axes.
///
/// The catalog writes storm centers as `POINT (lat lon)`. Until the items are
/// corrected upstream this is the only place that knows about it; the rest of
/// the code sees `(lon, lat)`. Only the SST and historic storm-center fields
/// go through here.
pub fn to_geo_point(wkt: &str) -> Result<GeoPoint, InvalidGeometry> {
    let (first, second) = parse_point(wkt)?;
    Ok(GeoPoint {
        x: second,
        y: first,
    })
}

/// The two ordinates of `POINT (a b)` in the order they are written.
fn parse_point(wkt: &str) -> Result<(f64, f64), InvalidGeometry> {
    let fail = |reason| InvalidGeometry {
        input: wkt.to_string(),
        reason,
    };

    let text = wkt.trim();
    let keyword = text.get(..5).ok_or_else(|| fail("too short"))?;
    if !keyword.eq_ignore_ascii_case("point") {
        return Err(fail("not a POINT"));
    }

    let rest = text[5..].trim_start();
    let body = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| {
            if rest.eq_ignore_ascii_case("empty") {
                fail("empty point")
            } else if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
                fail("only 2-D points are supported")
            } else {
                fail("expected parenthesised coordinates")
            }
        })?;

    let mut ordinates = body.split_whitespace().map(|tok| {
        tok.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| fail("coordinate is not a number"))
    });

    let a = ordinates.next().ok_or_else(|| fail("missing coordinates"))??;
    let b = ordinates.next().ok_or_else(|| fail("missing second coordinate"))??;
    if ordinates.next().is_some() {
        return Err(fail("only 2-D points are supported"));
    }
    Ok((a, b))
}
