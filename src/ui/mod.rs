mod button;

pub use button::Button;

// Layout is computed per frame so the window can be resized
use macroquad::prelude::{screen_width, screen_height};

pub const PANEL_WIDTH: f32 = 200.0;
pub const BUTTON_HEIGHT: f32 = 40.0;

/// X position where the side panel starts (right side)
pub fn panel_x() -> f32 {
    screen_width() - PANEL_WIDTH
}

/// Width of the 3-D view
pub fn view_width() -> f32 {
    screen_width() - PANEL_WIDTH
}

pub fn view_height() -> f32 {
    screen_height()
}

/// What a button press or key asks the viewer to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Step,
    ToggleRun,
    Reset,
    Faster,
    Slower,
    FrameStack,
}

/// Panel buttons, top to bottom
pub fn create_buttons(running: bool, complete: bool) -> Vec<(Button, Command)> {
    let px = panel_x();
    vec![
        (
            Button::new(px, 20.0, PANEL_WIDTH, BUTTON_HEIGHT, "Step").enabled(!complete),
            Command::Step,
        ),
        (
            Button::new(px, 70.0, PANEL_WIDTH, BUTTON_HEIGHT, if running { "Pause" } else { "Run" })
                .enabled(!complete),
            Command::ToggleRun,
        ),
        (Button::new(px, 120.0, PANEL_WIDTH, BUTTON_HEIGHT, "Reset"), Command::Reset),
    ]
}
