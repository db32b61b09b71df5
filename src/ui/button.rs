use macroquad::prelude::*;

/// Panel button with hover, click and disabled states
#[derive(Clone)]
pub struct Button {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    label: String,
    enabled: bool,
}

const COLOR: Color = Color::new(0.27, 0.51, 0.71, 1.0);
const HOVER_COLOR: Color = Color::new(0.39, 0.58, 0.93, 1.0);
const DISABLED_COLOR: Color = Color::new(0.25, 0.25, 0.25, 1.0);

impl Button {
    pub fn new(x: f32, y: f32, width: f32, height: f32, label: impl Into<String>) -> Self {
        Self { x, y, width, height, label: label.into(), enabled: true }
    }

    /// Set whether the button reacts to clicks (builder pattern)
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_hovered(&self, mouse_pos: (f32, f32)) -> bool {
        mouse_pos.0 >= self.x
            && mouse_pos.0 <= self.x + self.width
            && mouse_pos.1 >= self.y
            && mouse_pos.1 <= self.y + self.height
    }

    pub fn draw(&self, mouse_pos: (f32, f32)) {
        let (fill, text) = match (self.enabled, self.is_hovered(mouse_pos)) {
            (false, _) => (DISABLED_COLOR, GRAY),
            (true, true) => (HOVER_COLOR, WHITE),
            (true, false) => (COLOR, WHITE),
        };
        draw_rectangle(self.x, self.y, self.width, self.height, fill);
        draw_rectangle_lines(self.x, self.y, self.width, self.height, 2.0, text);

        let size = measure_text(&self.label, None, 20, 1.0);
        draw_text(
            &self.label,
            self.x + (self.width - size.width) / 2.0,
            self.y + (self.height + size.height) / 2.0,
            20.0,
            text,
        );
    }

    /// Clicked this frame; disabled buttons never are
    pub fn is_clicked(&self, mouse_pos: (f32, f32)) -> bool {
        self.enabled && self.is_hovered(mouse_pos) && is_mouse_button_pressed(MouseButton::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_bounds() {
        let button = Button::new(10.0, 20.0, 100.0, 40.0, "Step");
        assert!(button.is_hovered((10.0, 20.0)));
        assert!(button.is_hovered((110.0, 60.0)));
        assert!(!button.is_hovered((111.0, 30.0)));
        assert!(!button.is_hovered((50.0, 19.0)));
    }
}
