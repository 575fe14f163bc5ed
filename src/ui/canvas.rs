use egui::Widget;

use crate::app::UiState;
use crate::models::PointCloud;
use crate::rendering::{Palette, SceneRenderer};

use super::input::{CanvasAction, InputStateManager};

/// 画布：输入状态与绘制样式
#[derive(Debug, Default)]
pub struct Canvas {
    pub input_state_manager: InputStateManager,
    pub palette: Palette,
}

/// 一帧的画布视图，借用点云和界面状态
pub struct CanvasView<'a> {
    pub canvas: &'a mut Canvas,
    pub cloud: &'a mut PointCloud,
    pub state: &'a UiState,
}

impl CanvasView<'_> {
    fn apply(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::None => {}
            CanvasAction::MovePoint { index, position } => {
                if let Err(err) = self.cloud.move_selected(index, position.x, position.y) {
                    log::warn!("drag target lost: {err}");
                    self.canvas.input_state_manager.reset();
                }
            }
            CanvasAction::AddPoint(point) => {
                log::debug!("adding point ({:.1}, {:.1})", point.x, point.y);
                self.cloud.add_point(point);
            }
        }
    }
}

impl Widget for CanvasView<'_> {
    fn ui(mut self, ui: &mut egui::Ui) -> egui::Response {
        let desired_size = ui.available_size();
        let (screen_rect, canvas_response) =
            ui.allocate_exact_size(desired_size, egui::Sense::click_and_drag());

        let action = self.canvas.input_state_manager.update(
            ui,
            &canvas_response,
            screen_rect,
            self.cloud.points(),
            self.state.add_point_mode,
        );
        self.apply(action);

        let painter = ui.painter_at(screen_rect);
        SceneRenderer::new(&self.canvas.palette, screen_rect).paint(
            &painter,
            self.cloud,
            self.state,
            self.canvas.input_state_manager.selected(),
        );

        canvas_response
    }
}
