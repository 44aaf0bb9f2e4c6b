use image::Rgba;

// Color palette
pub const BACKGROUND: Rgba<u8> = Rgba([0x0a, 0x0a, 0x0a, 0xff]);
pub const PANEL: Rgba<u8> = Rgba([0x12, 0x12, 0x12, 0xff]);
pub const PLACEHOLDER: Rgba<u8> = Rgba([0x28, 0x28, 0x28, 0xff]);
pub const DIVIDER: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
pub const CURSOR: Rgba<u8> = Rgba([0xff, 0x32, 0x32, 0xff]);
pub const TEXT: Rgba<u8> = Rgba([0xb4, 0xff, 0xb4, 0xff]);
pub const DANGER: Rgba<u8> = Rgba([0xff, 0x32, 0x32, 0xff]);
pub const COPY_A: Rgba<u8> = Rgba([0x00, 0xff, 0x41, 0xff]);
pub const COPY_B: Rgba<u8> = Rgba([0x00, 0xff, 0xcc, 0xff]);

/// Accent color for a copy label
pub fn copy_color(label: ace_analysis::CopyLabel) -> Rgba<u8> {
    match label {
        ace_analysis::CopyLabel::A => COPY_A,
        ace_analysis::CopyLabel::B => COPY_B,
    }
}
