/// Responsive width descriptors
///
/// Resolves a `sizes`-style hint such as
/// `(max-width: 768px) 100vw, (max-width: 1200px) 50vw, 33vw` against a
/// viewport width. The first entry whose condition matches wins; an entry
/// without a condition always matches. Malformed entries are skipped and an
/// unresolvable hint means the full viewport width.

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Condition {
    MaxWidth(f32),
    MinWidth(f32),
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Length {
    ViewportPercent(f32),
    Pixels(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizesHint {
    entries: Vec<(Condition, Length)>,
}

impl SizesHint {
    pub fn parse(hint: &str) -> Self {
        let entries = hint
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                let parsed = parse_entry(entry);
                if parsed.is_none() {
                    warn!("⚠️  Ignoring malformed sizes entry {:?}", entry);
                }
                parsed
            })
            .collect();

        Self { entries }
    }

    /// Rendered slot width in pixels for a viewport width
    pub fn resolve(&self, viewport_width: f32) -> f32 {
        self.entries
            .iter()
            .find(|(condition, _)| match *condition {
                Condition::MaxWidth(max) => viewport_width <= max,
                Condition::MinWidth(min) => viewport_width >= min,
                Condition::Always => true,
            })
            .map(|(_, length)| match *length {
                Length::ViewportPercent(vw) => viewport_width * vw / 100.0,
                Length::Pixels(px) => px,
            })
            .unwrap_or(viewport_width)
    }
}

fn parse_entry(entry: &str) -> Option<(Condition, Length)> {
    if let Some(rest) = entry.strip_prefix('(') {
        let (condition, length) = rest.split_once(')')?;
        Some((parse_condition(condition)?, parse_length(length.trim())?))
    } else {
        Some((Condition::Always, parse_length(entry)?))
    }
}

fn parse_condition(condition: &str) -> Option<Condition> {
    let (feature, value) = condition.split_once(':')?;
    let value = parse_pixels(value.trim())?;
    match feature.trim() {
        "max-width" => Some(Condition::MaxWidth(value)),
        "min-width" => Some(Condition::MinWidth(value)),
        _ => None,
    }
}

fn parse_length(length: &str) -> Option<Length> {
    if let Some(vw) = length.strip_suffix("vw") {
        vw.trim().parse().ok().map(Length::ViewportPercent)
    } else {
        parse_pixels(length).map(Length::Pixels)
    }
}

fn parse_pixels(value: &str) -> Option<f32> {
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse()
        .ok()
        .filter(|px: &f32| px.is_finite() && *px >= 0.0)
}
