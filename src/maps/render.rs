// SVG choropleth maps.

use std::path::{Path, PathBuf};

use geo::{BoundingRect, Coord};

use crate::maps::join::{DrawLayer, DrawPath};
use crate::maps::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses a "#rrggbb" colour.
    pub fn from_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Linear interpolation in RGB, t in [0, 1].
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }
}

/// How the share of one party is drawn.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyStyle {
    /// Also the name of the output file.
    pub party: String,
    /// The share in the tidy table that drives the fill.
    pub field: String,
    pub label: String,
    pub low_color: Rgb,
    pub mid_color: Rgb,
    pub high_color: Rgb,
    pub midpoint: f64,
    pub legend_low: f64,
    pub legend_high: f64,
    pub legend_breaks: Vec<f64>,
    pub title: String,
    pub subtitle: String,
}

impl PartyStyle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        party: &str,
        label: &str,
        low_color: Rgb,
        mid_color: Rgb,
        high_color: Rgb,
        midpoint: f64,
        limits: (f64, f64),
        breaks: &[f64],
    ) -> PartyStyle {
        PartyStyle {
            party: party.to_string(),
            field: party.to_string(),
            label: label.to_string(),
            low_color,
            mid_color,
            high_color,
            midpoint,
            legend_low: limits.0,
            legend_high: limits.1,
            legend_breaks: breaks.to_vec(),
            title: "German Federal Election 2017".to_string(),
            subtitle: format!("Share of the {} Vote (%)", label),
        }
    }

    /// The six maps of the 2017 election.
    pub fn defaults() -> Vec<PartyStyle> {
        let c = |s: &str| Rgb::from_hex(s).unwrap_or(Rgb(0, 0, 0));
        vec![
            PartyStyle::new(
                "CDU_CSU",
                "CDU/CSU",
                c("#f0f0f0"),
                c("#737373"),
                c("#000000"),
                30.0,
                (20.0, 40.0),
                &[20.0, 25.0, 30.0, 35.0, 40.0],
            ),
            PartyStyle::new(
                "SPD",
                "SPD",
                c("#fee0d2"),
                c("#fb6a4a"),
                c("#a50f15"),
                20.0,
                (10.0, 30.0),
                &[10.0, 15.0, 20.0, 25.0, 30.0],
            ),
            PartyStyle::new(
                "LINKE",
                "Linke",
                c("#f2e6f2"),
                c("#c51b7d"),
                c("#67001f"),
                12.5,
                (5.0, 20.0),
                &[5.0, 10.0, 15.0, 20.0],
            ),
            PartyStyle::new(
                "GRUENE",
                "Green",
                c("#e5f5e0"),
                c("#74c476"),
                c("#00441b"),
                8.0,
                (2.0, 14.0),
                &[2.0, 5.0, 8.0, 11.0, 14.0],
            ),
            PartyStyle::new(
                "FDP",
                "FDP",
                c("#ffffcc"),
                c("#fed976"),
                c("#e3b505"),
                10.0,
                (6.0, 14.0),
                &[6.0, 8.0, 10.0, 12.0, 14.0],
            ),
            PartyStyle::new(
                "AFD",
                "AfD",
                c("#deebf7"),
                c("#6baed6"),
                c("#08306b"),
                15.0,
                (5.0, 30.0),
                &[5.0, 10.0, 15.0, 20.0, 25.0, 30.0],
            ),
        ]
    }

    /// Three-stop gradient low -> mid -> high. Values outside of the legend
    /// limits get the colour of the nearest limit.
    pub fn color_for(&self, value: f64) -> Rgb {
        let v = value.clamp(self.legend_low, self.legend_high);
        if v <= self.midpoint {
            let span = self.midpoint - self.legend_low;
            if span <= 0.0 {
                return self.mid_color;
            }
            self.low_color
                .lerp(&self.mid_color, (v - self.legend_low) / span)
        } else {
            let span = self.legend_high - self.midpoint;
            if span <= 0.0 {
                return self.mid_color;
            }
            self.mid_color
                .lerp(&self.high_color, (v - self.midpoint) / span)
        }
    }

    fn position(&self, value: f64) -> f64 {
        ((value - self.legend_low) / (self.legend_high - self.legend_low)).clamp(0.0, 1.0)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Theme {
    pub width: f64,
    pub height: f64,
    pub background: Rgb,
    /// Outline of the states.
    pub border: Rgb,
    pub no_data: Rgb,
    pub text: Rgb,
    pub font_family: String,
    pub caption: String,
    pub caption_size: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            width: 800.0,
            height: 900.0,
            background: Rgb(0xf7, 0xf7, 0xf7),
            border: Rgb(0x4d, 0x4d, 0x4d),
            no_data: Rgb(0xbd, 0xbd, 0xbd),
            text: Rgb(0x25, 0x25, 0x25),
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            caption: "Source: Der Bundeswahlleiter, Wiesbaden 2017".to_string(),
            caption_size: 10.0,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum PlotVariant {
    /// Title, subtitle, caption and themed background.
    Styled,
    /// White background with the title and the legend only.
    Basic,
}

impl PlotVariant {
    fn file_suffix(&self) -> &'static str {
        match self {
            PlotVariant::Styled => "",
            PlotVariant::Basic => "_basic",
        }
    }
}

const MARGIN: f64 = 20.0;
const BAR_HEIGHT: f64 = 12.0;
const BAR_FRACTION: f64 = 0.4;

/// Equirectangular projection fitted to a panel, north up.
#[derive(PartialEq, Debug, Clone, Copy)]
struct Projection {
    min_x: f64,
    max_y: f64,
    kx: f64,
    scale: f64,
    off_x: f64,
    off_y: f64,
}

impl Projection {
    fn fit(paths: &[DrawPath], panel: (f64, f64, f64, f64)) -> Option<Projection> {
        let (px, py, pw, ph) = panel;
        let mut bounds: Option<(Coord<f64>, Coord<f64>)> = None;
        for r in paths.iter().filter_map(|p| p.ring.bounding_rect()) {
            bounds = Some(match bounds {
                None => (r.min(), r.max()),
                Some((lo, hi)) => (
                    Coord {
                        x: lo.x.min(r.min().x),
                        y: lo.y.min(r.min().y),
                    },
                    Coord {
                        x: hi.x.max(r.max().x),
                        y: hi.y.max(r.max().y),
                    },
                ),
            });
        }
        let (lo, hi) = bounds?;
        // Degrees get shrunk in x by the cosine of the mean latitude.
        let lon_lat = lo.x >= -180.0 && hi.x <= 180.0 && lo.y >= -90.0 && hi.y <= 90.0;
        let kx = if lon_lat {
            ((lo.y + hi.y) / 2.0).to_radians().cos()
        } else {
            1.0
        };
        let dx = (hi.x - lo.x) * kx;
        let dy = hi.y - lo.y;
        let scale = match (dx > 0.0, dy > 0.0) {
            (true, true) => (pw / dx).min(ph / dy),
            (true, false) => pw / dx,
            (false, true) => ph / dy,
            (false, false) => 1.0,
        };
        Some(Projection {
            min_x: lo.x,
            max_y: hi.y,
            kx,
            scale,
            off_x: px + (pw - dx * scale) / 2.0,
            off_y: py + (ph - dy * scale) / 2.0,
        })
    }

    fn apply(&self, c: &Coord<f64>) -> (f64, f64) {
        (
            self.off_x + (c.x - self.min_x) * self.kx * self.scale,
            self.off_y + (self.max_y - c.y) * self.scale,
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_break(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x as i64)
    } else {
        format!("{:.1}", x)
    }
}

fn layer_name(layer: DrawLayer) -> &'static str {
    match layer {
        DrawLayer::Main => "main",
        DrawLayer::Enclosed => "enclosed",
    }
}

/// Draws the paths of one layer. The rings of a polygon are written as a
/// single path so that the even-odd rule cuts the holes.
fn draw_layer(
    out: &mut String,
    paths: &[DrawPath],
    layer: DrawLayer,
    style: &PartyStyle,
    theme: &Theme,
    proj: &Projection,
) {
    let layer_paths: Vec<&DrawPath> = paths.iter().filter(|p| p.layer == layer).collect();
    out.push_str(&format!(r##"<g id="{}-layer">"##, layer_name(layer)));
    out.push('\n');
    let mut idx = 0;
    while idx < layer_paths.len() {
        let first = layer_paths[idx];
        let mut d = String::new();
        while idx < layer_paths.len() && layer_paths[idx].group == first.group {
            for (i, c) in layer_paths[idx].ring.0.iter().enumerate() {
                let (x, y) = proj.apply(c);
                let cmd = if i == 0 { "M" } else { "L" };
                d.push_str(&format!("{}{:.1},{:.1} ", cmd, x, y));
            }
            d.push('Z');
            idx += 1;
        }
        let (fill, dash) = match first.share(&style.field) {
            Some(v) => (style.color_for(v), ""),
            None => (theme.no_data, r##" stroke-dasharray="3,2""##),
        };
        out.push_str(&format!(
            r##"<path d="{}" fill="{}" fill-rule="evenodd" stroke="{}" stroke-width="0.6"{} data-layer="{}" data-state="{}"/>"##,
            d.trim_end(),
            fill.to_hex(),
            theme.border.to_hex(),
            dash,
            layer_name(layer),
            escape(&first.state_name)
        ));
        out.push('\n');
    }
    out.push_str("</g>\n");
}

/// The horizontal colour bar with its ticks, and the "No data" swatch when
/// some states have no data.
fn draw_legend(
    out: &mut String,
    style: &PartyStyle,
    theme: &Theme,
    top: f64,
    with_no_data: bool,
) {
    let panel_w = theme.width - 2.0 * MARGIN;
    let bar_w = panel_w * BAR_FRACTION;
    let bar_x = MARGIN + (panel_w - bar_w) / 2.0;
    let grad_id = format!("bar-{}", style.party);
    let mid_offset = style.position(style.midpoint) * 100.0;
    out.push_str(&format!(
        r##"<defs><linearGradient id="{}" x1="0" x2="1" y1="0" y2="0">
<stop offset="0%" stop-color="{}"/>
<stop offset="{:.1}%" stop-color="{}"/>
<stop offset="100%" stop-color="{}"/>
</linearGradient></defs>
"##,
        grad_id,
        style.low_color.to_hex(),
        mid_offset,
        style.mid_color.to_hex(),
        style.high_color.to_hex()
    ));
    out.push_str(&format!(
        r##"<g id="legend" font-family="{}" font-size="10" fill="{}">
<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="url(#{})"/>
"##,
        escape(&theme.font_family),
        theme.text.to_hex(),
        bar_x,
        top,
        bar_w,
        BAR_HEIGHT,
        grad_id
    ));
    for b in style.legend_breaks.iter() {
        let x = bar_x + style.position(*b) * bar_w;
        out.push_str(&format!(
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>
<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>
"##,
            x,
            top + BAR_HEIGHT,
            x,
            top + BAR_HEIGHT + 4.0,
            theme.text.to_hex(),
            x,
            top + BAR_HEIGHT + 16.0,
            format_break(*b)
        ));
    }
    if with_no_data {
        let x = bar_x + bar_w + 24.0;
        out.push_str(&format!(
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" stroke="{}" stroke-dasharray="3,2"/>
<text x="{:.1}" y="{:.1}">No data</text>
"##,
            x,
            top,
            BAR_HEIGHT,
            BAR_HEIGHT,
            theme.no_data.to_hex(),
            theme.border.to_hex(),
            x + BAR_HEIGHT + 6.0,
            top + BAR_HEIGHT - 2.0
        ));
    }
    out.push_str("</g>\n");
}

/// Renders the map of one party.
pub fn render_map(
    paths: &[DrawPath],
    style: &PartyStyle,
    theme: &Theme,
    variant: PlotVariant,
) -> MapsResult<String> {
    // Unjoined boundaries have no shares at all: only the joined ones tell
    // whether the field exists.
    let joined: Vec<&DrawPath> = paths.iter().filter(|p| p.shares.is_some()).collect();
    if !joined.is_empty() && joined.iter().all(|p| p.share(&style.field).is_none()) {
        return InvalidConfigSnafu {
            message: format!("{}: no share {} in the tidy table", style.party, style.field),
        }
        .fail();
    }
    let (top, bottom) = match variant {
        PlotVariant::Styled => (90.0, 100.0),
        PlotVariant::Basic => (50.0, 70.0),
    };
    let panel = (
        MARGIN,
        top,
        theme.width - 2.0 * MARGIN,
        theme.height - top - bottom,
    );
    let proj = match Projection::fit(paths, panel) {
        Some(proj) => proj,
        None => whatever!("{}: nothing to draw", style.party),
    };
    let with_no_data = paths.iter().any(|p| p.share(&style.field).is_none());
    debug!(
        "render_map: {} {:?}: {} paths, no data: {}",
        style.party,
        variant,
        paths.len(),
        with_no_data
    );

    let background = match variant {
        PlotVariant::Styled => theme.background,
        PlotVariant::Basic => Rgb(0xff, 0xff, 0xff),
    };
    let mut out = String::new();
    out.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<rect width="100%" height="100%" fill="{}"/>
<text x="{:.1}" y="{:.1}" font-family="{}" font-size="20" font-weight="600" fill="{}">{}</text>
"##,
        theme.width,
        theme.height,
        theme.width,
        theme.height,
        background.to_hex(),
        MARGIN,
        MARGIN + 16.0,
        escape(&theme.font_family),
        theme.text.to_hex(),
        escape(&style.title)
    ));
    if variant == PlotVariant::Styled {
        out.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="14" fill="{}">{}</text>
"##,
            MARGIN,
            MARGIN + 40.0,
            escape(&theme.font_family),
            theme.text.to_hex(),
            escape(&style.subtitle)
        ));
    }

    // City-states go last so that they are not hidden by their neighbours.
    draw_layer(&mut out, paths, DrawLayer::Main, style, theme, &proj);
    draw_layer(&mut out, paths, DrawLayer::Enclosed, style, theme, &proj);

    let legend_top = theme.height - bottom + 20.0;
    draw_legend(&mut out, style, theme, legend_top, with_no_data);

    if variant == PlotVariant::Styled {
        out.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="{}" font-size="{}" fill="{}">{}</text>
"##,
            theme.width - MARGIN,
            theme.height - MARGIN,
            escape(&theme.font_family),
            theme.caption_size,
            theme.text.to_hex(),
            escape(&theme.caption)
        ));
    }
    out.push_str("</svg>\n");
    Ok(out)
}

/// Writes `<party>.svg` or `<party>_basic.svg` in the output directory.
pub fn write_map(
    paths: &[DrawPath],
    style: &PartyStyle,
    theme: &Theme,
    variant: PlotVariant,
    out_dir: &Path,
) -> MapsResult<PathBuf> {
    let svg = render_map(paths, style, theme, variant)?;
    let p = out_dir.join(format!("{}{}.svg", style.party, variant.file_suffix()));
    fs::write(&p, svg).context(WritingOutputSnafu {
        path: p.display().to_string(),
    })?;
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

    fn ring(x: f64, y: f64, size: f64) -> LineString<f64> {
        LineString::from(vec![
            (x, y),
            (x + size, y),
            (x + size, y + size),
            (x, y + size),
            (x, y),
        ])
    }

    fn path(name: &str, layer: DrawLayer, piece: usize, ring: LineString<f64>, spd: Option<f64>) -> DrawPath {
        DrawPath {
            state_id: name.to_lowercase(),
            state_name: name.to_string(),
            group: format!("{}.0", name.to_lowercase()),
            piece,
            hole: piece > 0,
            layer,
            ring,
            shares: spd.map(|x| vec![("SPD".to_string(), x)]),
        }
    }

    fn paths() -> Vec<DrawPath> {
        vec![
            path("Brandenburg", DrawLayer::Main, 0, ring(11.0, 51.0, 3.0), Some(17.6)),
            path("Brandenburg", DrawLayer::Main, 1, ring(12.5, 52.0, 0.5), Some(17.6)),
            path("Sachsen", DrawLayer::Main, 0, ring(12.0, 50.0, 2.0), Some(10.5)),
            path("Berlin", DrawLayer::Enclosed, 0, ring(12.5, 52.0, 0.5), Some(17.9)),
        ]
    }

    fn spd() -> PartyStyle {
        PartyStyle::defaults().remove(1)
    }

    #[test]
    fn hex_colours() {
        assert_eq!(Rgb::from_hex("#fb6a4a"), Some(Rgb(0xfb, 0x6a, 0x4a)));
        assert_eq!(Rgb::from_hex("#FB6A4A").unwrap().to_hex(), "#fb6a4a");
        assert_eq!(Rgb::from_hex("fb6a4a"), None);
        assert_eq!(Rgb::from_hex("#fb6a4"), None);
        assert_eq!(Rgb::from_hex("#gb6a4a"), None);
    }

    #[test]
    fn default_styles() {
        let styles = PartyStyle::defaults();
        let parties: Vec<&str> = styles.iter().map(|s| s.party.as_str()).collect();
        assert_eq!(parties, vec!["CDU_CSU", "SPD", "LINKE", "GRUENE", "FDP", "AFD"]);
        for s in styles.iter() {
            assert!(s.legend_low <= s.midpoint && s.midpoint <= s.legend_high);
            assert_eq!(s.legend_breaks.first(), Some(&s.legend_low));
            assert_eq!(s.legend_breaks.last(), Some(&s.legend_high));
            assert_eq!(s.title, "German Federal Election 2017");
        }
        assert_eq!(styles[0].subtitle, "Share of the CDU/CSU Vote (%)");
    }

    #[test]
    fn three_stop_gradient() {
        let s = spd();
        assert_eq!(s.color_for(10.0), s.low_color);
        assert_eq!(s.color_for(20.0), s.mid_color);
        assert_eq!(s.color_for(30.0), s.high_color);
        // Clamped to the legend limits.
        assert_eq!(s.color_for(2.0), s.low_color);
        assert_eq!(s.color_for(45.0), s.high_color);
        // Halfway between low and mid.
        assert_eq!(s.color_for(15.0), Rgb(0xfd, 0xa5, 0x8e));
    }

    #[test]
    fn city_states_drawn_on_top() {
        for variant in [PlotVariant::Styled, PlotVariant::Basic] {
            let svg = render_map(&paths(), &spd(), &Theme::default(), variant).unwrap();
            let last_main = svg.rfind(r#"data-layer="main""#).unwrap();
            let first_enclosed = svg.find(r#"data-layer="enclosed""#).unwrap();
            assert!(last_main < first_enclosed);
            assert!(svg.find(r#"<g id="main-layer">"#).unwrap() < svg.find(r#"<g id="enclosed-layer">"#).unwrap());
        }
    }

    #[test]
    fn holes_share_a_path() {
        let svg = render_map(&paths(), &spd(), &Theme::default(), PlotVariant::Basic).unwrap();
        assert_eq!(svg.matches("<path ").count(), 3);
        let brandenburg = svg
            .lines()
            .find(|l| l.contains(r#"data-state="Brandenburg""#))
            .unwrap();
        assert_eq!(brandenburg.matches('M').count(), 2);
        assert!(brandenburg.contains(r#"fill-rule="evenodd""#));
    }

    #[test]
    fn variants() {
        let theme = Theme::default();
        let styled = render_map(&paths(), &spd(), &theme, PlotVariant::Styled).unwrap();
        assert!(styled.contains("Share of the SPD Vote (%)"));
        assert!(styled.contains("Der Bundeswahlleiter"));
        assert!(styled.contains(&theme.background.to_hex()));
        let basic = render_map(&paths(), &spd(), &theme, PlotVariant::Basic).unwrap();
        assert!(basic.contains("German Federal Election 2017"));
        assert!(!basic.contains("Der Bundeswahlleiter"));
        assert!(!basic.contains("Share of the SPD Vote (%)"));
        assert!(basic.contains(r##"fill="#ffffff""##));
        // Ticks of the colour bar.
        for tick in [">10<", ">15<", ">20<", ">25<", ">30<"] {
            assert!(basic.contains(tick), "{}", tick);
        }
    }

    #[test]
    fn no_data_only_when_needed() {
        let theme = Theme::default();
        let svg = render_map(&paths(), &spd(), &theme, PlotVariant::Styled).unwrap();
        assert!(!svg.contains("No data"));
        assert!(!svg.contains("stroke-dasharray"));

        let mut ps = paths();
        ps[2].shares = None;
        let svg = render_map(&ps, &spd(), &theme, PlotVariant::Styled).unwrap();
        assert!(svg.contains("No data"));
        let sachsen = svg
            .lines()
            .find(|l| l.contains(r#"data-state="Sachsen""#))
            .unwrap();
        assert!(sachsen.contains(r##"fill="#bdbdbd""##));
        assert!(sachsen.contains("stroke-dasharray"));
    }

    #[test]
    fn unknown_field() {
        let mut style = spd();
        style.field = "PIRATEN".to_string();
        let res = render_map(&paths(), &style, &Theme::default(), PlotVariant::Styled);
        assert!(matches!(res, Err(MapsError::InvalidConfig { .. })));
        assert!(render_map(&[], &spd(), &Theme::default(), PlotVariant::Styled).is_err());
    }

    #[test]
    fn unknown_field_with_unjoined_states() {
        let mut style = spd();
        style.field = "PIRATEN".to_string();
        let mut ps = paths();
        ps[2].shares = None;
        let res = render_map(&ps, &style, &Theme::default(), PlotVariant::Styled);
        assert!(matches!(res, Err(MapsError::InvalidConfig { .. })));

        // Nothing joined: drawn entirely as no data.
        for p in ps.iter_mut() {
            p.shares = None;
        }
        let svg = render_map(&ps, &style, &Theme::default(), PlotVariant::Basic).unwrap();
        assert!(svg.contains("No data"));
    }

    #[test]
    fn projection_keeps_the_aspect() {
        // 1 degree of longitude at 60N is half a degree of latitude.
        let ps = vec![path("A", DrawLayer::Main, 0, LineString::from(vec![(0.0, 59.0), (4.0, 61.0)]), Some(1.0))];
        let proj = Projection::fit(&ps, (0.0, 0.0, 100.0, 100.0)).unwrap();
        let (x0, y0) = proj.apply(&Coord { x: 0.0, y: 61.0 });
        let (x1, y1) = proj.apply(&Coord { x: 4.0, y: 59.0 });
        assert!(((x1 - x0) - (y1 - y0)).abs() < 1.0);
        assert!(y1 > y0);
    }

    #[test]
    fn file_names() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_map(&paths(), &spd(), &Theme::default(), PlotVariant::Basic, dir.path()).unwrap();
        assert_eq!(p, dir.path().join("SPD_basic.svg"));
        let p = write_map(&paths(), &spd(), &Theme::default(), PlotVariant::Styled, dir.path()).unwrap();
        assert_eq!(p, dir.path().join("SPD.svg"));
        assert!(fs::read_to_string(p).unwrap().starts_with("<svg"));
    }
}
