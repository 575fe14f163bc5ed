use egui::{PointerButton, Rect};

use crate::delaunay::Point;

/// 点的拾取半径（画布像素）
pub const HIT_RADIUS: f64 = 5.0;

/// 查找位于 `pos` 拾取半径内的点
///
/// 多个点重叠时返回索引最大的那个，也就是最后绘制、位于最上层的点。
pub fn hit_test(points: &[Point], pos: Point, radius: f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.distance(pos) <= radius)
        .map(|(index, _)| index)
        .last()
}

/// 拖拽状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    /// 空闲状态，等待按下
    Idle,

    /// 正在拖拽第 `index` 个点，`offset` 为点相对光标的偏移
    Dragging { index: usize, offset: Point },
}

/// 画布输入产生的点云修改
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    None,
    /// 把点移动到绝对位置
    MovePoint { index: usize, position: Point },
    AddPoint(Point),
}

/// 输入状态管理器，只处理点的拖拽和添加
#[derive(Debug)]
pub struct InputStateManager {
    /// 当前输入状态
    pub current_state: DragState,

    /// 光标最近一次的画布坐标
    pub cursor: Point,
}

impl Default for InputStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputStateManager {
    pub fn new() -> Self {
        Self {
            current_state: DragState::Idle,
            cursor: Point::ZERO,
        }
    }

    /// 转换到新状态
    pub fn transition_to(&mut self, new_state: DragState) {
        log::debug!(
            "Input state transition: {:?} -> {:?}",
            self.current_state,
            new_state
        );
        self.current_state = new_state;
    }

    /// 正在拖拽的点
    pub fn selected(&self) -> Option<usize> {
        match self.current_state {
            DragState::Dragging { index, .. } => Some(index),
            DragState::Idle => None,
        }
    }

    /// 每帧读取指针事件，返回需要应用到点云上的修改
    ///
    /// `rect` 是画布在屏幕上的区域，画布坐标以其左上角为原点。
    pub fn update(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        rect: Rect,
        points: &[Point],
        add_mode: bool,
    ) -> CanvasAction {
        let (hover, pressed, released, moved) = ui.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.button_pressed(PointerButton::Primary),
                i.pointer.button_released(PointerButton::Primary),
                i.pointer.delta() != egui::Vec2::ZERO,
            )
        });

        if let Some(pos) = hover {
            let local = pos - rect.min;
            self.cursor = Point::new(local.x as f64, local.y as f64);
        }

        let mut action = CanvasAction::None;
        if pressed && response.hovered() {
            action = self.handle_press(points, self.cursor, add_mode);
        } else if moved {
            action = self.handle_motion(self.cursor);
        }

        if released {
            self.handle_release();
        }

        ui.ctx().set_cursor_icon(match self.current_state {
            DragState::Idle if hit_test(points, self.cursor, HIT_RADIUS).is_some() => {
                egui::CursorIcon::Grab
            }
            DragState::Idle => egui::CursorIcon::Default,
            DragState::Dragging { .. } => egui::CursorIcon::Grabbing,
        });

        action
    }

    /// 按下：命中点则开始拖拽，否则在添加模式下添加新点
    pub fn handle_press(&mut self, points: &[Point], pos: Point, add_mode: bool) -> CanvasAction {
        if let Some(index) = hit_test(points, pos, HIT_RADIUS) {
            self.transition_to(DragState::Dragging {
                index,
                offset: points[index] - pos,
            });
            CanvasAction::None
        } else if add_mode {
            CanvasAction::AddPoint(pos)
        } else {
            CanvasAction::None
        }
    }

    pub fn handle_motion(&mut self, pos: Point) -> CanvasAction {
        match self.current_state {
            DragState::Dragging { index, offset } => CanvasAction::MovePoint {
                index,
                position: pos + offset,
            },
            DragState::Idle => CanvasAction::None,
        }
    }

    pub fn handle_release(&mut self) {
        if matches!(self.current_state, DragState::Dragging { .. }) {
            self.transition_to(DragState::Idle);
        }
    }

    /// 点集被整体替换后，之前的拖拽目标可能已经不存在
    pub fn reset(&mut self) {
        if self.current_state != DragState::Idle {
            self.transition_to(DragState::Idle);
        }
    }
}
