//! Terminal QR code display.

use qrcode::{Color, QrCode};

/// Quiet zone around the terminal symbol, in modules
const QUIET_MODULES: usize = 2;

/// Print a QR code to the terminal.
///
/// Each character cell stacks 2 modules vertically using half blocks.
pub fn print_qr_code(data: &str) {
    match render_half_blocks(data) {
        Some(text) => print!("{}", text),
        None => eprintln!("\x1b[1;31m✗\x1b[0m QR code unavailable, use the code below"),
    }
}

/// Render `data` as rows of half-block characters with a light quiet zone.
///
/// Dark modules are drawn as spaces on a light terminal cell, so the
/// symbol scans from dark-background terminals too.
fn render_half_blocks(data: &str) -> Option<String> {
    let code = QrCode::new(data.as_bytes()).ok()?;
    let width = code.width();
    let colors = code.to_colors();
    let side = width + 2 * QUIET_MODULES;

    let is_dark = |x: usize, y: usize| -> bool {
        if x < QUIET_MODULES || y < QUIET_MODULES {
            return false;
        }
        let (mx, my) = (x - QUIET_MODULES, y - QUIET_MODULES);
        mx < width && my < width && colors[my * width + mx] == Color::Dark
    };

    let mut out = String::new();
    for y in (0..side).step_by(2) {
        out.push_str("  ");
        for x in 0..side {
            let ch = match (is_dark(x, y), is_dark(x, y + 1)) {
                (false, false) => '█',
                (false, true) => '▀',
                (true, false) => '▄',
                (true, true) => ' ',
            };
            out.push(ch);
        }
        out.push('\n');
    }
    Some(out)
}
