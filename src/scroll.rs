//! Scroll-driven numbers: progress bar width, hero parallax, current section.

/// Percentage of the scrollable distance already covered, in `[0, 100]`.
///
/// A page that does not scroll reports 0.
pub fn scroll_progress_percent(scroll_y: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height;
    if !(scrollable > 0.0) || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

/// Hero transform for one scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxFrame {
    pub translate_y: f64,
    pub opacity: f64,
}

impl ParallaxFrame {
    pub fn transform_css(&self) -> String {
        format!("translateY({}px)", self.translate_y)
    }
}

/// The hero drifts at `factor` of the scroll speed and fades out over `fade_distance`.
pub fn parallax_frame(scroll_y: f64, factor: f64, fade_distance: f64) -> ParallaxFrame {
    let scroll_y = scroll_y.max(0.0);
    let opacity = if fade_distance > 0.0 {
        (1.0 - scroll_y / fade_distance).clamp(0.0, 1.0)
    } else {
        1.0
    };
    ParallaxFrame {
        translate_y: scroll_y * factor,
        opacity,
    }
}

/// A navigable section: its anchor id and document offset.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOffset {
    pub id: String,
    pub top: f64,
}

impl SectionOffset {
    pub fn new(id: impl Into<String>, top: f64) -> Self {
        Self { id: id.into(), top }
    }
}

/// Id of the section the reader is in: the last one (in document order) whose
/// top, less `offset`, has been scrolled past.
pub fn active_section(scroll_y: f64, sections: &[SectionOffset], offset: f64) -> Option<&str> {
    sections
        .iter()
        .filter(|section| !section.id.is_empty() && scroll_y >= section.top - offset)
        .last()
        .map(|section| section.id.as_str())
}

/// Scroll position that puts a section's top just under a fixed nav bar.
pub fn anchor_scroll_target(section_top: f64, nav_height: f64) -> f64 {
    (section_top - nav_height).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn progress_spans_zero_to_hundred() {
        assert_eq!(scroll_progress_percent(0.0, 3000.0, 1000.0), 0.0);
        assert_eq!(scroll_progress_percent(1000.0, 3000.0, 1000.0), 50.0);
        assert_eq!(scroll_progress_percent(2000.0, 3000.0, 1000.0), 100.0);
        // Overscroll on touch devices.
        assert_eq!(scroll_progress_percent(2100.0, 3000.0, 1000.0), 100.0);
        assert_eq!(scroll_progress_percent(-40.0, 3000.0, 1000.0), 0.0);
    }

    #[test]
    fn progress_on_page_that_does_not_scroll() {
        assert_eq!(scroll_progress_percent(0.0, 800.0, 800.0), 0.0);
        assert_eq!(scroll_progress_percent(10.0, 600.0, 800.0), 0.0);
    }

    #[test]
    fn parallax_moves_and_fades() {
        let top = parallax_frame(0.0, 0.3, 600.0);
        assert_eq!(top, ParallaxFrame { translate_y: 0.0, opacity: 1.0 });

        let mid = parallax_frame(300.0, 0.3, 600.0);
        assert!((mid.translate_y - 90.0).abs() < 1e-9);
        assert_eq!(mid.opacity, 0.5);

        let past = parallax_frame(900.0, 0.3, 600.0);
        assert_eq!(past.opacity, 0.0);
        assert_eq!(parallax_frame(100.0, 0.5, 0.0).opacity, 1.0);
        assert_eq!(parallax_frame(10.0, 0.5, 600.0).transform_css(), "translateY(5px)");
    }

    #[test]
    fn active_section_tracks_scroll_position() {
        let sections = vec![
            SectionOffset::new("home", 0.0),
            SectionOffset::new("about", 800.0),
            SectionOffset::new("projects", 1600.0),
        ];
        assert_eq!(active_section(0.0, &sections, 200.0), Some("home"));
        assert_eq!(active_section(599.0, &sections, 200.0), Some("home"));
        assert_eq!(active_section(600.0, &sections, 200.0), Some("about"));
        assert_eq!(active_section(5000.0, &sections, 200.0), Some("projects"));
        assert_eq!(active_section(0.0, &sections[1..], 200.0), None);
    }

    #[test]
    fn sections_without_ids_are_skipped() {
        let sections = vec![SectionOffset::new("home", 0.0), SectionOffset::new("", 400.0)];
        assert_eq!(active_section(1000.0, &sections, 0.0), Some("home"));
    }

    #[test]
    fn anchor_target_clears_nav_bar() {
        assert_eq!(anchor_scroll_target(900.0, 70.0), 830.0);
        assert_eq!(anchor_scroll_target(20.0, 70.0), 0.0);
    }
}
