use macroquad::prelude::*;

use crate::application::OrbitCamera;
use crate::ui::{view_width, Button, Command};

/// Mouse state carried between frames
#[derive(Default)]
pub struct InputState {
    last_drag: Option<(f32, f32)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orbit with a left or right drag inside the 3-D view
    pub fn handle_orbit(&mut self, camera: &mut OrbitCamera, mouse_pos: (f32, f32)) {
        let dragging =
            is_mouse_button_down(MouseButton::Left) || is_mouse_button_down(MouseButton::Right);
        if !dragging {
            self.last_drag = None;
            return;
        }
        match self.last_drag {
            Some(last) => camera.orbit(mouse_pos.0 - last.0, mouse_pos.1 - last.1),
            // A drag must start in the view, not on the panel
            None if mouse_pos.0 >= view_width() => return,
            None => {}
        }
        self.last_drag = Some(mouse_pos);
    }
}

/// Zoom with the mouse wheel
pub fn handle_zoom(camera: &mut OrbitCamera) {
    let wheel = mouse_wheel().1;
    if wheel > 0.0 {
        camera.zoom_in(1.1);
    } else if wheel < 0.0 {
        camera.zoom_out(1.1);
    }
}

/// Commands for keys pressed this frame
pub fn keyboard_commands(camera: &mut OrbitCamera) -> Vec<Command> {
    let bindings = [
        (KeyCode::N, Command::Step),
        (KeyCode::Space, Command::ToggleRun),
        (KeyCode::R, Command::Reset),
        (KeyCode::Up, Command::Faster),
        (KeyCode::Down, Command::Slower),
        (KeyCode::F, Command::FrameStack),
    ];

    // Home view with 'H'
    if is_key_pressed(KeyCode::H) {
        camera.reset();
    }

    bindings
        .iter()
        .filter(|(key, _)| is_key_pressed(*key))
        .map(|&(_, command)| command)
        .collect()
}

/// Commands for buttons clicked this frame
pub fn button_commands(buttons: &[(Button, Command)], mouse_pos: (f32, f32)) -> Vec<Command> {
    buttons
        .iter()
        .filter(|(button, _)| button.is_clicked(mouse_pos))
        .map(|&(_, command)| command)
        .collect()
}
