//! Application state for the viewer.

use std::collections::HashSet;

use comment_tree::{
    model::Snapshot,
    tree::{find_node_at, CommentNode, CommentTree, LayoutConfig, NodeKey, NodeRadii},
};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, info};

use super::canvas::{TreeCanvas, ViewState, ROW_UNITS};
use crate::tui_ipc::Message;

/// Canvas units moved per arrow key press.
const PAN_STEP: f64 = 4.0;
const ZOOM_STEP: f64 = 1.25;

/// What the viewer is waiting for or showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Waiting(String),
    Ready,
    Error(String),
}

/// Application state.
pub struct App {
    config: LayoutConfig,
    pub radii: NodeRadii,
    /// Tree built from the most recently applied snapshot.
    pub tree: Option<CommentTree>,
    /// Sequence number of that snapshot, if it had one.
    applied_seq: Option<u64>,
    pub selection: Option<NodeKey>,
    pub status: Status,
    pub view: ViewState,
    /// Canvas drawn in the last frame, used to resolve mouse positions.
    pub canvas: Option<TreeCanvas>,
    drag_from: Option<(u16, u16)>,
    pub should_exit: bool,
}

impl App {
    pub fn new(config: LayoutConfig, waiting_for: String) -> Self {
        Self {
            config,
            radii: NodeRadii::default(),
            tree: None,
            applied_seq: None,
            selection: None,
            status: Status::Waiting(waiting_for),
            view: ViewState::default(),
            canvas: None,
            drag_from: None,
            should_exit: false,
        }
    }

    /// Handle a burst of messages, rebuilding the tree at most once.
    pub fn handle_messages(&mut self, messages: Vec<Message>) {
        for msg in Message::coalesce(messages) {
            self.handle_message(msg);
        }
    }

    fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Connected => {
                debug!("Producer session started");
                self.applied_seq = None;
            }
            Message::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            Message::Error { error } => {
                self.status = Status::Error(error);
            }
        }
    }

    /// Replace the tree with one built from `snapshot`, unless the snapshot
    /// is older than the one already shown.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        if !snapshot.is_newer_than(self.applied_seq) {
            debug!(seq = snapshot.seq, applied = self.applied_seq, "Ignoring stale snapshot");
            return;
        }

        let collapsed: HashSet<NodeKey> = self
            .tree
            .as_ref()
            .map(CommentTree::collapsed_keys)
            .unwrap_or_default();

        let mut tree = CommentTree::from_snapshot(snapshot, &self.config);
        tree.restore_collapsed(&collapsed);
        info!(
            seq = tree.seq,
            comments = tree.comment_count(),
            skipped = tree.skipped.len(),
            "Applied snapshot"
        );

        if self.selection.is_some_and(|key| tree.get(key).is_none()) {
            self.selection = None;
        }
        self.applied_seq = tree.seq;
        self.tree = Some(tree);
        self.status = Status::Ready;
    }

    pub fn selected_node(&self) -> Option<&CommentNode> {
        self.tree.as_ref()?.get(self.selection?)
    }

    /// Keys of drawn nodes in pre-order, skipping collapsed subtrees.
    pub fn visible_keys(&self) -> Vec<NodeKey> {
        let mut keys = Vec::new();
        if let Some(tree) = &self.tree {
            collect_visible(&tree.root, &mut keys);
        }
        keys
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_exit = true,
            KeyCode::Char('+' | '=') => self.view.zoom_by(ZOOM_STEP),
            KeyCode::Char('-') => self.view.zoom_by(1.0 / ZOOM_STEP),
            KeyCode::Left => self.view.pan(PAN_STEP, 0.0),
            KeyCode::Right => self.view.pan(-PAN_STEP, 0.0),
            KeyCode::Up => self.view.pan(0.0, PAN_STEP),
            KeyCode::Down => self.view.pan(0.0, -PAN_STEP),
            KeyCode::Char('r') => self.view = ViewState::default(),
            KeyCode::Char('c' | ' ') => self.toggle_selected(),
            KeyCode::Char('j') | KeyCode::Tab => self.step_selection(1),
            KeyCode::Char('k') | KeyCode::BackTab => self.step_selection(-1),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some((mouse.column, mouse.row));
                self.click(mouse.column, mouse.row);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((from_col, from_row)) = self.drag_from {
                    let dx = f64::from(mouse.column) - f64::from(from_col);
                    let dy = (f64::from(mouse.row) - f64::from(from_row)) * ROW_UNITS;
                    self.view.pan(dx, dy);
                }
                self.drag_from = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(_) => self.drag_from = None,
            MouseEventKind::ScrollUp => self.zoom_at(mouse.column, mouse.row, ZOOM_STEP),
            MouseEventKind::ScrollDown => self.zoom_at(mouse.column, mouse.row, 1.0 / ZOOM_STEP),
            _ => {}
        }
    }

    /// Zoom so that the layout point under the cursor stays where it is.
    fn zoom_at(&mut self, column: u16, row: u16, factor: f64) {
        let anchor = self.canvas.and_then(|canvas| {
            let point = canvas.cell_to_canvas(column, row)?;
            let world = canvas.viewport.to_world(point.0, point.1)?;
            Some((canvas.area, point, world))
        });
        self.view.zoom_by(factor);

        let Some((area, point, world)) = anchor else {
            return;
        };
        self.set_canvas_area(area);
        if let Some(canvas) = self.canvas {
            let (x, y) = canvas.viewport.to_canvas(world.0, world.1);
            self.view.pan(point.0 - x, point.1 - y);
            self.set_canvas_area(area);
        }
    }

    /// Select the node under a terminal cell. Clicking empty space clears
    /// the selection.
    pub fn click(&mut self, column: u16, row: u16) {
        let (Some(tree), Some(canvas)) = (&self.tree, &self.canvas) else {
            return;
        };
        let Some(point) = canvas.cell_to_canvas(column, row) else {
            return;
        };
        self.selection =
            find_node_at(&tree.root, &canvas.viewport, &self.radii, point).map(CommentNode::key);
        debug!(column, row, selection = ?self.selection, "Click");
    }

    fn toggle_selected(&mut self) {
        let (Some(tree), Some(key)) = (self.tree.as_mut(), self.selection) else {
            return;
        };
        tree.toggle_collapsed(key);
    }

    fn step_selection(&mut self, delta: isize) {
        let keys = self.visible_keys();
        if keys.is_empty() {
            return;
        }
        let current = self
            .selection
            .and_then(|key| keys.iter().position(|k| *k == key));
        let next = match current {
            Some(i) => i.saturating_add_signed(delta).min(keys.len() - 1),
            None => 0,
        };
        self.selection = Some(keys[next]);
    }

    /// Remember the drawing area so mouse positions can be resolved.
    pub fn set_canvas_area(&mut self, area: Rect) {
        let root_y = self
            .tree
            .as_ref()
            .and_then(|t| t.root.y)
            .unwrap_or_default();
        self.canvas = Some(TreeCanvas::new(area, &self.view, root_y));
    }
}

fn collect_visible(node: &CommentNode, keys: &mut Vec<NodeKey>) {
    keys.push(node.key());
    if node.collapsed {
        return;
    }
    for child in &node.children {
        collect_visible(child, keys);
    }
}
