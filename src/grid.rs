/// Generate SVG path commands for the background grid
///
/// Lines run at every multiple of `spacing` across a `width` x `height`
/// canvas, both edges included: horizontal lines first, then vertical.
/// Coordinates are canvas units; the drawing context applies `scale`.
///
/// Returns an empty string when the grid would be drawn denser than one
/// line every 4 viewport pixels.
pub fn generate_grid_commands(width: f32, height: f32, spacing: f32, scale: f32) -> String {
    if spacing <= 0.0 || spacing * scale < 4.0 {
        return String::new();
    }

    let rows = (height / spacing).floor() as usize;
    let columns = (width / spacing).floor() as usize;
    let mut commands = String::with_capacity((rows + columns + 2) * 24);

    for i in 0..=rows {
        if !commands.is_empty() {
            commands.push(' ');
        }
        let y = i as f32 * spacing;
        commands.push_str(&format!("M 0 {} L {} {}", y, width, y));
    }

    for i in 0..=columns {
        commands.push(' ');
        let x = i as f32 * spacing;
        commands.push_str(&format!("M {} 0 L {} {}", x, x, height));
    }

    commands
}
