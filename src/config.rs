//! Command line configuration for the comparison viewer.

use crate::options::{Color, TouchMode, ViewOptions};
use anyhow::{bail, Context as _, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use regex::Regex;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub left: PathBuf,
    pub right: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
    pub density: f32,
    pub touch_mode: TouchMode,
    pub delimiter_color: Color,
    pub delimiter_width: i32,
    pub delimiter_padding: i32,
    pub arrow_visible: bool,
    pub arrow_color: Color,
    pub arrow_width: Option<i32>,
    pub arrow_height: Option<i32>,
    pub arrow_stroke_width: i32,
    pub arrow_fill: bool,
    pub arrow_margin: Option<i32>,
    pub arrow_corner_radius: f32,
    pub text_color: Color,
    pub text_size: Option<f32>,
    pub left_text: Option<String>,
    pub right_text: Option<String>,
    /// Initial delimiter position in percent of the width.
    pub position: Option<i32>,
    /// Render one frame to this file instead of opening a window.
    pub snapshot: Option<PathBuf>,
}

pub fn command() -> Command {
    Command::new("image_comparison_view")
        .version("1.0")
        .about("Compares two images with a draggable delimiter")
        .arg(
            Arg::new("left")
                .short('l')
                .long("left")
                .action(ArgAction::Set)
                .value_name("IMAGE")
                .help("Image revealed on the left of the delimiter")
                .required(true),
        )
        .arg(
            Arg::new("right")
                .short('r')
                .long("right")
                .action(ArgAction::Set)
                .value_name("IMAGE")
                .help("Image shown on the right of the delimiter")
                .required(true),
        )
        .arg(
            Arg::new("window_size")
                .short('w')
                .long("window-size")
                .action(ArgAction::Set)
                .value_name("WIDTHxHEIGHT")
                .help("Window size in format WIDTHxHEIGHT (e.g. 1280x720)")
                .default_value("1280x720"),
        )
        .arg(
            Arg::new("density")
                .long("density")
                .action(ArgAction::Set)
                .value_name("FACTOR")
                .help("Pixels per density-independent unit")
                .default_value("1.0"),
        )
        .arg(
            Arg::new("touch_mode")
                .long("touch-mode")
                .action(ArgAction::Set)
                .value_parser(["all", "delimiter"])
                .help("Where a drag may start")
                .default_value("all"),
        )
        .arg(color_arg("delimiter_color", "delimiter-color", "Delimiter line color"))
        .arg(number_arg("delimiter_width", "delimiter-width", "Delimiter line width in pixels", "3"))
        .arg(number_arg(
            "delimiter_padding",
            "delimiter-padding",
            "Grab distance around the delimiter in delimiter touch mode",
            "20",
        ))
        .arg(
            Arg::new("arrows")
                .long("arrows")
                .action(ArgAction::SetTrue)
                .help("Show arrows next to the delimiter"),
        )
        .arg(color_arg("arrow_color", "arrow-color", "Arrow color"))
        .arg(optional_number_arg("arrow_width", "arrow-width", "Arrow length in pixels"))
        .arg(optional_number_arg("arrow_height", "arrow-height", "Arrow height in pixels"))
        .arg(number_arg(
            "arrow_stroke_width",
            "arrow-stroke-width",
            "Outline width for unfilled arrows",
            "5",
        ))
        .arg(
            Arg::new("arrow_outline")
                .long("arrow-outline")
                .action(ArgAction::SetTrue)
                .help("Stroke arrows instead of filling them"),
        )
        .arg(optional_number_arg(
            "arrow_margin",
            "arrow-margin",
            "Gap between the delimiter and the arrows",
        ))
        .arg(number_arg(
            "arrow_corner_radius",
            "arrow-corner-radius",
            "Corner rounding of the arrows",
            "0",
        ))
        .arg(color_arg("text_color", "text-color", "Label color"))
        .arg(optional_number_arg("text_size", "text-size", "Label font size in pixels"))
        .arg(text_arg("left_text", "left-text", "Label for the left image"))
        .arg(text_arg("right_text", "right-text", "Label for the right image"))
        .arg(
            Arg::new("position")
                .long("position")
                .action(ArgAction::Set)
                .value_name("PERCENT")
                .help("Initial delimiter position in percent"),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .action(ArgAction::Set)
                .value_name("FILE")
                .help("Render a single frame to FILE and exit"),
        )
}

fn color_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .action(ArgAction::Set)
        .value_name("COLOR")
        .help(help)
        .default_value("white")
}

fn number_arg(
    id: &'static str,
    long: &'static str,
    help: &'static str,
    default: &'static str,
) -> Arg {
    Arg::new(id)
        .long(long)
        .action(ArgAction::Set)
        .value_name("PIXELS")
        .help(help)
        .default_value(default)
}

fn optional_number_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .action(ArgAction::Set)
        .value_name("PIXELS")
        .help(help)
}

fn text_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .action(ArgAction::Set)
        .value_name("TEXT")
        .help(help)
}

impl ViewerConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let (window_width, window_height) = parse_window_size(required(matches, "window_size")?)?;
        let touch_mode = match required(matches, "touch_mode")? {
            "delimiter" => TouchMode::Delimiter,
            _ => TouchMode::All,
        };

        Ok(Self {
            left: PathBuf::from(required(matches, "left")?),
            right: PathBuf::from(required(matches, "right")?),
            window_width,
            window_height,
            density: parse_required(matches, "density")?,
            touch_mode,
            delimiter_color: parse_color(required(matches, "delimiter_color")?)?,
            delimiter_width: parse_required(matches, "delimiter_width")?,
            delimiter_padding: parse_required(matches, "delimiter_padding")?,
            arrow_visible: matches.get_flag("arrows"),
            arrow_color: parse_color(required(matches, "arrow_color")?)?,
            arrow_width: parse_optional(matches, "arrow_width")?,
            arrow_height: parse_optional(matches, "arrow_height")?,
            arrow_stroke_width: parse_required(matches, "arrow_stroke_width")?,
            arrow_fill: !matches.get_flag("arrow_outline"),
            arrow_margin: parse_optional(matches, "arrow_margin")?,
            arrow_corner_radius: parse_required(matches, "arrow_corner_radius")?,
            text_color: parse_color(required(matches, "text_color")?)?,
            text_size: parse_optional(matches, "text_size")?,
            left_text: matches.get_one::<String>("left_text").cloned(),
            right_text: matches.get_one::<String>("right_text").cloned(),
            position: parse_optional(matches, "position")?,
            snapshot: matches.get_one::<String>("snapshot").map(PathBuf::from),
        })
    }

    /// Builds view options, falling back to density-scaled defaults for
    /// sizes that were not given.
    pub fn view_options<S>(&self, left: Option<S>, right: Option<S>) -> ViewOptions<S> {
        let defaults = ViewOptions::<S>::for_density(self.density);
        ViewOptions {
            delimiter_color: self.delimiter_color,
            delimiter_width: self.delimiter_width,
            delimiter_padding: self.delimiter_padding,
            arrow_color: self.arrow_color,
            arrow_visible: self.arrow_visible,
            arrow_width: self.arrow_width.unwrap_or(defaults.arrow_width),
            arrow_height: self.arrow_height.unwrap_or(defaults.arrow_height),
            arrow_stroke_width: self.arrow_stroke_width,
            arrow_fill: self.arrow_fill,
            arrow_margin: self.arrow_margin.unwrap_or(defaults.arrow_margin),
            arrow_corner_radius: self.arrow_corner_radius,
            text_color: self.text_color,
            text_size: self.text_size.unwrap_or(defaults.text_size),
            left_text: self.left_text.clone(),
            right_text: self.right_text.clone(),
            touch_mode: self.touch_mode,
            left_surface: left,
            right_surface: right,
            density: self.density,
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("Missing value for '{id}'"))
}

fn parse_required<T>(matches: &ArgMatches, id: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = required(matches, id)?;
    raw.parse()
        .with_context(|| format!("Invalid value '{raw}' for '{id}'"))
}

fn parse_optional<T>(matches: &ArgMatches, id: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    matches
        .get_one::<String>(id)
        .map(|raw| {
            raw.parse()
                .with_context(|| format!("Invalid value '{raw}' for '{id}'"))
        })
        .transpose()
}

pub fn parse_window_size(size: &str) -> Result<(u32, u32)> {
    let pattern = Regex::new(r"^(\d+)x(\d+)$")?;
    let Some(caps) = pattern.captures(size.trim()) else {
        bail!("Invalid window size format '{size}'. Use WIDTHxHEIGHT");
    };
    let width = caps[1].parse::<u32>().context("Invalid width")?;
    let height = caps[2].parse::<u32>().context("Invalid height")?;
    Ok((width, height))
}

/// Accepts `#RRGGBB`, `#AARRGGBB`, `white`, `black` and `transparent`.
pub fn parse_color(value: &str) -> Result<Color> {
    match value.trim().to_ascii_lowercase().as_str() {
        "white" => return Ok(Color::WHITE),
        "black" => return Ok(Color::BLACK),
        "transparent" => return Ok(Color::TRANSPARENT),
        _ => {}
    }
    let pattern = Regex::new(r"^#([0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")?;
    let Some(caps) = pattern.captures(value.trim()) else {
        bail!("Invalid color '{value}'. Use #RRGGBB, #AARRGGBB or a color name");
    };
    let hex = &caps[1];
    let packed = u32::from_str_radix(hex, 16).context("Invalid color digits")?;
    Ok(if hex.len() == 6 {
        Color(0xFF00_0000 | packed)
    } else {
        Color(packed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ViewerConfig> {
        let mut argv = vec!["image_comparison_view", "--left", "a.png", "--right", "b.png"];
        argv.extend_from_slice(args);
        let matches = command().try_get_matches_from(argv)?;
        ViewerConfig::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.left, PathBuf::from("a.png"));
        assert_eq!((config.window_width, config.window_height), (1280, 720));
        assert_eq!(config.touch_mode, TouchMode::All);
        assert_eq!(config.delimiter_width, 3);
        assert_eq!(config.delimiter_padding, 20);
        assert!(!config.arrow_visible);
        assert!(config.arrow_fill);
        assert_eq!(config.snapshot, None);

        let options = config.view_options::<()>(None, None);
        assert_eq!(options.arrow_width, 12);
        assert_eq!(options.text_size, 14.0);
    }

    #[test]
    fn explicit_values() {
        let config = parse(&[
            "--window-size",
            "400x200",
            "--touch-mode",
            "delimiter",
            "--arrows",
            "--arrow-outline",
            "--arrow-width",
            "30",
            "--delimiter-color",
            "#ff0000",
            "--left-text",
            "Before",
            "--position",
            "25",
            "--snapshot",
            "out.png",
        ])
        .unwrap();
        assert_eq!((config.window_width, config.window_height), (400, 200));
        assert_eq!(config.touch_mode, TouchMode::Delimiter);
        assert!(config.arrow_visible);
        assert!(!config.arrow_fill);
        assert_eq!(config.delimiter_color, Color(0xFFFF_0000));
        assert_eq!(config.position, Some(25));
        assert_eq!(config.snapshot, Some(PathBuf::from("out.png")));

        let options = config.view_options::<()>(None, None);
        assert_eq!(options.arrow_width, 30);
        assert_eq!(options.left_text.as_deref(), Some("Before"));
    }

    #[test]
    fn density_scales_unset_sizes() {
        let config = parse(&["--density", "2", "--arrow-margin", "1"]).unwrap();
        let options = config.view_options::<()>(None, None);
        assert_eq!(options.arrow_width, 24);
        assert_eq!(options.arrow_margin, 1);
        assert_eq!(options.text_size, 28.0);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = parse(&["--delimiter-width", "wide"]).unwrap_err();
        assert!(err.to_string().contains("delimiter_width"));
        assert!(parse(&["--touch-mode", "edges"]).is_err());
    }

    #[test]
    fn window_size_format() {
        assert_eq!(parse_window_size("1920x1080").unwrap(), (1920, 1080));
        assert!(parse_window_size("1920*1080").is_err());
        assert!(parse_window_size("x1080").is_err());
    }

    #[test]
    fn color_formats() {
        assert_eq!(parse_color("White").unwrap(), Color::WHITE);
        assert_eq!(parse_color("#00ff00").unwrap(), Color(0xFF00_FF00));
        assert_eq!(parse_color("#8000ff00").unwrap(), Color(0x8000_FF00));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("teal").is_err());
    }
}
