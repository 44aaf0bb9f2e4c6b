//! Audio preview: the audible copy's waveform with a playback cursor

use crate::draw::{DrawCommand, TextureId};
use crate::geometry::{Point, Rect};
use crate::theme;
use ace_analysis::CopyLabel;

const LABEL_INSET: f32 = 6.0;

/// Instructions for one audio preview frame plus the label being heard
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPreview {
    pub commands: Vec<DrawCommand>,
    pub label: CopyLabel,
}

/// Build the audio preview.
///
/// `cursor` is normalized playback progress; out-of-range values are clamped.
/// Without a waveform for the audible copy a placeholder is drawn instead.
pub fn audio_preview(
    viewport: Rect,
    audible: CopyLabel,
    cursor: f32,
    waveform_ready: bool,
) -> AudioPreview {
    let mut commands = vec![DrawCommand::FillRect {
        rect: viewport,
        color: theme::PANEL,
    }];

    if waveform_ready {
        commands.push(DrawCommand::Image {
            texture: TextureId::Waveform(audible),
            dest: viewport,
            uv: Rect::unit(),
        });
    } else {
        commands.push(DrawCommand::FillRect {
            rect: viewport,
            color: theme::PLACEHOLDER,
        });
        commands.push(DrawCommand::Text {
            at: viewport.center(),
            text: "no waveform".to_string(),
            color: theme::TEXT,
        });
    }

    let x = viewport.x + viewport.width * cursor.clamp(0.0, 1.0);
    commands.push(DrawCommand::Line {
        from: Point::new(x, viewport.y),
        to: Point::new(x, viewport.bottom()),
        color: theme::CURSOR,
    });
    commands.push(DrawCommand::Text {
        at: Point::new(viewport.x + LABEL_INSET, viewport.y + LABEL_INSET),
        text: audible.to_string(),
        color: theme::copy_color(audible),
    });

    AudioPreview {
        commands,
        label: audible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shows_audible_waveform() {
        let preview = audio_preview(Rect::new(0.0, 0.0, 400.0, 100.0), CopyLabel::B, 0.5, true);
        assert_eq!(preview.label, CopyLabel::B);
        assert!(preview.commands.contains(&DrawCommand::Image {
            texture: TextureId::Waveform(CopyLabel::B),
            dest: Rect::new(0.0, 0.0, 400.0, 100.0),
            uv: Rect::unit(),
        }));
        assert!(preview.commands.contains(&DrawCommand::Line {
            from: Point::new(200.0, 0.0),
            to: Point::new(200.0, 100.0),
            color: theme::CURSOR,
        }));
    }

    #[test]
    fn test_placeholder_without_waveform() {
        let preview = audio_preview(Rect::new(0.0, 0.0, 400.0, 100.0), CopyLabel::A, 3.0, false);
        assert!(!preview
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Image { .. })));
        // Cursor clamped to the right edge
        assert!(preview.commands.iter().any(|c| matches!(
            c,
            DrawCommand::Line { from, .. } if from.x == 400.0
        )));
    }
}
