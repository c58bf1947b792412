//! Tray icon management

use tray_icon::Icon;

/// Shown while no preset is active
const IDLE_DATA: &[u8] = include_bytes!("../../assets/icons/tray_idle.png");
/// Shown while a preset is active
const ACTIVE_DATA: &[u8] = include_bytes!("../../assets/icons/tray_active.png");

/// Tray icons for the two preset states
pub struct TrayIcon {
    pub idle: Icon,
    pub active: Icon,
}

impl TrayIcon {
    /// Create tray icons from embedded data
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            idle: load_icon_from_png(IDLE_DATA)?,
            active: load_icon_from_png(ACTIVE_DATA)?,
        })
    }

    pub fn for_state(&self, preset_active: bool) -> &Icon {
        if preset_active {
            &self.active
        } else {
            &self.idle
        }
    }
}

/// Decode PNG data into tightly packed RGBA
fn decode_rgba(data: &[u8]) -> anyhow::Result<(Vec<u8>, u32, u32)> {
    let decoder = png::Decoder::new(std::io::Cursor::new(data));
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let rgba = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::Indexed => anyhow::bail!("Indexed color not supported"),
    };

    Ok((rgba, info.width, info.height))
}

fn load_icon_from_png(data: &[u8]) -> anyhow::Result<Icon> {
    let (rgba, width, height) = decode_rgba(data)?;
    Icon::from_rgba(rgba, width, height).map_err(|e| anyhow::anyhow!("Failed to create icon: {}", e))
}
