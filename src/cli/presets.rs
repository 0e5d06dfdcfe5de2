//! `sketchpad presets`

use sketchpad_canvas::ViewportSize;

pub fn run() {
    println!("Canvas presets (any WxH in inches is accepted):\n");
    for preset in ViewportSize::presets() {
        println!(
            "  {:<8} {:>6} x {:<6} in   {:>5} x {:<5} px",
            preset.label,
            preset.width,
            preset.height,
            preset.pixel_width().round(),
            preset.pixel_height().round()
        );
    }
}
