use rand::{Rng, SeedableRng};

use crate::delaunay::{FrameConfig, Point};
use crate::models::PointCloud;
use crate::ui::{Canvas, CanvasView};

/// 演示点集（以 20 像素为单位，平移到画布内）
const DEMO_POINTS: [(f64, f64); 29] = [
    (-2.0, 2.0),
    (2.0, 2.0),
    (2.0, -2.0),
    (-2.0, -2.0),
    (-3.0, 0.0),
    (3.0, 0.0),
    (8.0, -6.0),
    (-8.0, -6.0),
    (-8.0, 6.0),
    (8.0, 6.0),
    (6.0, -8.0),
    (-6.0, -8.0),
    (-6.0, 8.0),
    (6.0, 8.0),
    (10.0, 0.0),
    (0.0, 10.0),
    (0.0, -10.0),
    (0.0, 10.0),
    (3.0, 10.0),
    (-3.0, 10.0),
    (3.0, -10.0),
    (-3.0, -10.0),
    (10.0, 3.0),
    (-10.0, 3.0),
    (10.0, -3.0),
    (-10.0, -3.0),
    (-10.0, 0.0),
    (-12.0, 0.0),
    (-14.0, 0.0),
];
const DEMO_OFFSET: f64 = 15.0;
const DEMO_SCALE: f64 = 20.0;

const ALPHA_RANGE: std::ops::RangeInclusive<f64> = 0.001..=0.2;
const NUDGE_STEP: f64 = 10.0;
const SCALE_STEP: f64 = 1.25;

pub fn demo_points() -> Vec<Point> {
    DEMO_POINTS
        .iter()
        .map(|&(x, y)| Point::new((x + DEMO_OFFSET) * DEMO_SCALE, (y + DEMO_OFFSET) * DEMO_SCALE))
        .chain(std::iter::once(Point::new(100.0, 100.0)))
        .collect()
}

/// 界面开关与参数
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct UiState {
    pub alpha: f64,
    pub show_probe_radius: bool,
    pub show_voronoi: bool,
    pub show_filled: bool,
    pub show_wireframe: bool,
    pub add_point_mode: bool,
    pub scatter_count: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            show_probe_radius: true,
            show_voronoi: true,
            show_filled: true,
            show_wireframe: true,
            add_point_mode: false,
            scatter_count: 30,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct AlphaShapeApp {
    state: UiState,
    points: Vec<Point>,
    frame: FrameConfig,
    seed: u64,

    #[serde(skip)]
    cloud: PointCloud,
    #[serde(skip)]
    canvas: Canvas,
    #[serde(skip)]
    canvas_size: egui::Vec2,
}

impl Default for AlphaShapeApp {
    fn default() -> Self {
        let points = demo_points();
        let frame = FrameConfig::default();
        let cloud = PointCloud::with_frame(points.clone(), frame);
        Self {
            state: UiState::default(),
            points,
            frame,
            seed: 1,
            cloud,
            canvas: Canvas::default(),
            canvas_size: egui::vec2(1000.0, 800.0),
        }
    }
}

impl AlphaShapeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        if let Some(storage) = cc.storage {
            if let Some(mut app) = eframe::get_value::<AlphaShapeApp>(storage, eframe::APP_KEY) {
                app.cloud = PointCloud::with_frame(app.points.clone(), app.frame);
                log::info!("restored {} points from storage", app.cloud.len());
                return app;
            }
        }
        Default::default()
    }

    fn replace_cloud(&mut self, cloud: PointCloud) {
        self.canvas.input_state_manager.reset();
        self.cloud = cloud;
    }

    fn reset_demo(&mut self) {
        self.replace_cloud(PointCloud::with_frame(demo_points(), self.frame));
    }

    fn scatter_random(&mut self) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        self.seed = self.seed.wrapping_add(1);

        let width = f64::from(self.canvas_size.x.max(1.0));
        let height = f64::from(self.canvas_size.y.max(1.0));
        let points = (0..self.state.scatter_count)
            .map(|_| {
                Point::new(
                    rng.random_range(0.0..width),
                    rng.random_range(0.0..height),
                )
            })
            .collect();
        self.replace_cloud(PointCloud::with_frame(points, self.frame));
    }

    /// 把点集质心移到画布中心
    fn center_cloud(&mut self) {
        if self.cloud.is_empty() {
            return;
        }
        let target = Point::new(
            f64::from(self.canvas_size.x) / 2.0,
            f64::from(self.canvas_size.y) / 2.0,
        );
        let offset = target - Point::centroid(self.cloud.points());
        let moved = self.cloud.translated(offset);
        self.replace_cloud(moved);
    }

    /// 以质心为中心缩放
    fn scale_cloud(&mut self, factor: f64) {
        if self.cloud.is_empty() {
            return;
        }
        let centroid = Point::centroid(self.cloud.points());
        let scaled = self
            .cloud
            .translated(centroid * -1.0)
            .scaled(factor)
            .translated(centroid);
        self.replace_cloud(scaled);
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let (dx, dy, reset) = ctx.input(|i| {
            let mut dx = 0.0;
            let mut dy = 0.0;
            if i.key_pressed(egui::Key::ArrowLeft) {
                dx -= NUDGE_STEP;
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                dx += NUDGE_STEP;
            }
            if i.key_pressed(egui::Key::ArrowUp) {
                dy -= NUDGE_STEP;
            }
            if i.key_pressed(egui::Key::ArrowDown) {
                dy += NUDGE_STEP;
            }
            let reset =
                i.key_pressed(egui::Key::R) && i.modifiers.matches_logically(egui::Modifiers::CTRL);
            (dx, dy, reset)
        });

        if dx != 0.0 || dy != 0.0 {
            self.cloud.move_all(dx, dy);
        }
        if reset {
            self.reset_demo();
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Alpha");
        ui.add(
            egui::Slider::new(&mut self.state.alpha, ALPHA_RANGE)
                .logarithmic(true)
                .text("alpha"),
        );
        ui.label(format!("Probe radius: {:.1}", 1.0 / self.state.alpha));

        ui.separator();
        ui.heading("Layers");
        ui.checkbox(&mut self.state.show_probe_radius, "Alpha radius");
        ui.checkbox(&mut self.state.show_voronoi, "Voronoi");
        ui.checkbox(&mut self.state.show_filled, "Filled faces");
        ui.checkbox(&mut self.state.show_wireframe, "Wireframe");

        ui.separator();
        ui.heading("Points");
        ui.checkbox(&mut self.state.add_point_mode, "Add point on click");
        if ui.button("Reset demo set").clicked() {
            self.reset_demo();
        }
        ui.horizontal(|ui| {
            ui.add(egui::DragValue::new(&mut self.state.scatter_count).range(3..=500));
            if ui.button("Scatter random").clicked() {
                self.scatter_random();
            }
        });
        if ui.button("Center").clicked() {
            self.center_cloud();
        }
        ui.horizontal(|ui| {
            if ui.button("Scale up").clicked() {
                self.scale_cloud(SCALE_STEP);
            }
            if ui.button("Scale down").clicked() {
                self.scale_cloud(1.0 / SCALE_STEP);
            }
        });

        ui.separator();
        let diagnostics = self.cloud.triangulation().diagnostics();
        ui.label(format!(
            "{} points | {} triangles",
            self.cloud.len(),
            self.cloud.triangles().len()
        ));
        if !diagnostics.skipped_points.is_empty() {
            ui.label(format!(
                "Skipped points: {:?}",
                diagnostics.skipped_points
            ));
        }
    }
}

impl eframe::App for AlphaShapeApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.points = self.cloud.points().to_vec();
        self.frame = *self.cloud.frame();
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::right("controls").show(ctx, |ui| {
            self.controls(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.canvas_size = ui.available_size();
                ui.add(CanvasView {
                    canvas: &mut self.canvas,
                    cloud: &mut self.cloud,
                    state: &self.state,
                });
            });

        self.handle_keyboard(ctx);
    }
}
