use macroquad::prelude::*;

use crate::application::{OrbitCamera, Playback, RenderEvent, RenderSink};
use crate::domain::Rgb;
use crate::ui::{panel_x, Button, Command, PANEL_WIDTH};

/// Boxes drawn at most; later cells are counted but not kept
pub const MAX_BOXES: usize = 25_000;
/// World height of one layer
pub const LAYER_HEIGHT: f32 = 1.0;

/// One alive cell as drawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBox {
    pub x: i32,
    pub y: i32,
    pub layer: usize,
    pub color: Rgb,
}

/// Scene collects render events into the box list the viewer draws.
#[derive(Debug, Default)]
pub struct Scene {
    boxes: Vec<CellBox>,
    dropped: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxes(&self) -> &[CellBox] {
        &self.boxes
    }

    /// Cells past the box cap
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Highest layer with a box, plus one
    pub fn height(&self) -> usize {
        self.boxes.iter().map(|b| b.layer + 1).max().unwrap_or(0)
    }
}

impl RenderSink for Scene {
    fn emit(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::Clear => {
                self.boxes.clear();
                self.dropped = 0;
            }
            RenderEvent::CellAlive { x, y, layer, color } => {
                if self.boxes.len() < MAX_BOXES {
                    self.boxes.push(CellBox { x, y, layer, color });
                } else {
                    self.dropped += 1;
                }
            }
        }
    }
}

/// Format large numbers with K/M suffixes
fn format_number(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

fn to_color(c: Rgb) -> Color {
    Color::from_rgba(c.0, c.1, c.2, 255)
}

/// World center of a cell box; the grid is centered on the origin
fn box_center(b: &CellBox, cols: i32, rows: i32) -> Vec3 {
    vec3(
        b.x as f32 - cols as f32 / 2.0 + 0.5,
        b.layer as f32 * LAYER_HEIGHT + LAYER_HEIGHT / 2.0,
        b.y as f32 - rows as f32 / 2.0 + 0.5,
    )
}

/// Point the camera at the middle of the stack
pub fn frame_stack(camera: &mut OrbitCamera, scene: &Scene, cols: i32, rows: i32) {
    let height = scene.height() as f32 * LAYER_HEIGHT;
    let extent = (cols.max(rows) as f32).max(height);
    camera.frame(::glam::Vec3::new(0.0, height / 2.0, 0.0), extent);
}

/// Draw the stack as boxes on a ground grid
pub fn draw_scene(scene: &Scene, camera: &OrbitCamera, cols: i32, rows: i32) {
    let eye = camera.eye();
    let target = camera.target;
    set_camera(&Camera3D {
        position: vec3(eye.x, eye.y, eye.z),
        target: vec3(target.x, target.y, target.z),
        up: vec3(0.0, 1.0, 0.0),
        ..Default::default()
    });

    draw_grid(
        cols.max(rows) as u32,
        1.0,
        Color::from_rgba(90, 90, 90, 255),
        Color::from_rgba(40, 40, 40, 255),
    );

    let size = vec3(1.0, LAYER_HEIGHT, 1.0);
    let edge = Color::from_rgba(20, 20, 20, 255);
    for b in scene.boxes() {
        let center = box_center(b, cols, rows);
        draw_cube(center, size, None, to_color(b.color));
        draw_cube_wires(center, size, edge);
    }

    set_default_camera();
}

fn draw_text_label(text: &str, x: f32, y: f32, size: f32, color: Color) {
    draw_text(text, x, y, size, color);
}

/// Side panel with buttons, run info and key help
pub fn draw_controls(
    playback: &Playback,
    scene: &Scene,
    camera: &OrbitCamera,
    buttons: &[(Button, Command)],
    mouse_pos: (f32, f32),
) {
    let px = panel_x();
    draw_rectangle(px, 0.0, PANEL_WIDTH, screen_height(), Color::from_rgba(30, 30, 30, 255));
    buttons.iter().for_each(|(btn, _)| btn.draw(mouse_pos));

    let stack = playback.stack();
    let current = stack.layers().last();
    let info_color = Color::from_rgba(180, 180, 180, 255);
    let status = if stack.is_complete() {
        ("Complete", Color::from_rgba(0, 200, 255, 255))
    } else if playback.is_running {
        ("Running", Color::from_rgba(0, 255, 0, 255))
    } else {
        ("Paused", Color::from_rgba(255, 165, 0, 255))
    };

    let labels = [
        ("Layer:", 190.0, 16.0, WHITE),
        (
            &format!("{} / {}", stack.layers().len(), stack.planned_layers()),
            210.0,
            20.0,
            info_color,
        ),
        (current.map_or("-", |l| l.function.as_str()), 230.0, 14.0, info_color),
        ("Cells:", 260.0, 16.0, WHITE),
        (&format_number(stack.total_cells()), 280.0, 20.0, Color::from_rgba(0, 255, 150, 255)),
        (&format!("Vertical holes: {}", stack.holes().len()), 305.0, 13.0, info_color),
        (&format!("Boxes: {}", format_number(scene.boxes().len())), 320.0, 13.0, info_color),
        ("Status:", 350.0, 16.0, WHITE),
        (status.0, 370.0, 16.0, status.1),
        (&format!("{:.1} layers/s", playback.layers_per_second), 390.0, 13.0, info_color),
        (
            &format!("Step: {:.1}ms ({})", playback.last_step_ms, stack.mode()),
            405.0,
            13.0,
            info_color,
        ),
        (&format!("Seed: {} | FPS: {:.0}", playback.seed(), get_fps()), 420.0, 12.0, GRAY),
        (&format!("Distance: {:.0}", camera.distance), 435.0, 12.0, GRAY),
    ];
    labels.iter().for_each(|(text, y, size, color)| {
        draw_text_label(text, px, *y, *size, *color);
    });

    if scene.dropped() > 0 {
        draw_text_label(
            &format!("{} cells over the box cap", format_number(scene.dropped())),
            px,
            455.0,
            12.0,
            Color::from_rgba(255, 80, 80, 255),
        );
    }

    let controls = [
        ("Controls:", 490.0, 14.0, WHITE),
        ("N: Step", 505.0, 12.0, GRAY),
        ("Space: Run/Pause", 518.0, 12.0, GRAY),
        ("R: Reset", 531.0, 12.0, GRAY),
        ("Up/Down: Speed", 544.0, 12.0, GRAY),
        ("Drag: Orbit  Wheel: Zoom", 557.0, 12.0, GRAY),
        ("F: Frame stack  H: Home", 570.0, 12.0, GRAY),
    ];
    controls.iter().for_each(|(text, y, size, color)| {
        draw_text_label(text, px, *y, *size, *color);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alive(x: i32, layer: usize) -> RenderEvent {
        RenderEvent::CellAlive { x, y: 0, layer, color: Rgb(1, 2, 3) }
    }

    #[test]
    fn test_scene_caps_boxes() {
        let mut scene = Scene::new();
        for i in 0..MAX_BOXES + 7 {
            scene.emit(alive(i as i32, 0));
        }
        assert_eq!(scene.boxes().len(), MAX_BOXES);
        assert_eq!(scene.dropped(), 7);

        scene.clear_all();
        assert!(scene.boxes().is_empty());
        assert_eq!(scene.dropped(), 0);
    }

    #[test]
    fn test_scene_height() {
        let mut scene = Scene::new();
        assert_eq!(scene.height(), 0);
        scene.emit(alive(0, 0));
        scene.emit(alive(0, 4));
        assert_eq!(scene.height(), 5);
    }

    #[test]
    fn test_box_center_is_grid_centered() {
        let b = CellBox { x: 0, y: 9, layer: 2, color: Rgb(0, 0, 0) };
        let c = box_center(&b, 10, 10);
        assert_eq!((c.x, c.y, c.z), (-4.5, 2.5, 4.5));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(25_000), "25.0K");
        assert_eq!(format_number(3_400_000), "3.4M");
    }
}
