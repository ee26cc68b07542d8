//! UI rendering for the viewer.

use comment_tree::tree::{CommentNode, CommentTree};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, Borders, Paragraph, Wrap,
    },
};

use super::{
    app::{App, Status},
    canvas::TreeCanvas,
    theme::Theme,
};

/// Width of the detail panel on the right.
const DETAIL_WIDTH: u16 = 36;

/// Below this zoom index labels would overlap, so they are left out.
const LABEL_MIN_ZOOM: f64 = 0.06;

/// Render the UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let [header_area, main_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, app, header_area);
    render_help(frame, app, help_area);

    let [tree_area, detail_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(DETAIL_WIDTH)])
            .areas(main_area);

    render_tree(frame, app, tree_area);
    render_detail(frame, app, detail_area);
}

/// Render the post title and tree statistics.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.tree {
        Some(tree) => {
            let mut spans = vec![
                Span::styled(tree.root.title.clone().unwrap_or_default(), Theme::TITLE),
                Span::raw("  "),
                Span::styled(format!("{:+}", tree.root.vote_score), score_style(tree.root.vote_score)),
                Span::styled(format!("  {} comments", tree.comment_count()), Theme::DIM),
            ];
            if let Some(seq) = tree.seq {
                spans.push(Span::styled(format!("  seq {seq}"), Theme::DIM));
            }
            if !tree.skipped.is_empty() {
                spans.push(Span::styled(
                    format!("  {} skipped", tree.skipped.len()),
                    Theme::ERROR,
                ));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled(" comment-tree ", Theme::TITLE)),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the node graph.
fn render_tree(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(tree) = &app.tree else {
        let text = match &app.status {
            Status::Waiting(source) => format!("Waiting for {source}..."),
            Status::Error(error) => format!("Error: {error}"),
            Status::Ready => String::new(),
        };
        frame.render_widget(Paragraph::new(text).style(Theme::DIM), inner);
        return;
    };
    let empty = tree.is_empty();

    app.set_canvas_area(inner);
    let Some(canvas) = app.canvas else {
        return;
    };
    let Some(tree) = &app.tree else {
        return;
    };

    let painter = Painter {
        canvas: &canvas,
        app: &*app,
        show_labels: app.view.zoom >= LABEL_MIN_ZOOM,
    };
    let widget = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, canvas.width_units()])
        .y_bounds([0.0, canvas.height_units()])
        .paint(|ctx| painter.paint(ctx, tree));
    frame.render_widget(widget, inner);

    if empty {
        let [_, message_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(inner);
        frame.render_widget(
            Paragraph::new("No comments yet").style(Theme::DIM).centered(),
            message_area,
        );
    }
}

/// Draws edges, then nodes, then labels, each on its own layer.
struct Painter<'a> {
    canvas: &'a TreeCanvas,
    app: &'a App,
    show_labels: bool,
}

impl Painter<'_> {
    fn paint(&self, ctx: &mut Context, tree: &CommentTree) {
        self.paint_edges(ctx, &tree.root);
        ctx.layer();
        self.paint_nodes(ctx, &tree.root);
        if self.show_labels {
            ctx.layer();
            self.paint_labels(ctx, &tree.root);
        }
    }

    fn paint_edges(&self, ctx: &mut Context, node: &CommentNode) {
        if node.collapsed {
            return;
        }
        let Some((x1, y1)) = node.position() else {
            return;
        };
        let (x1, y1) = self.canvas.to_draw(x1, y1);
        for child in &node.children {
            if let Some((x2, y2)) = child.position() {
                let (x2, y2) = self.canvas.to_draw(x2, y2);
                let on_path = child.highlighted && (node.highlighted || node.is_post);
                let color = if on_path { Theme::BEST_PATH } else { Theme::EDGE };
                ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
            }
            self.paint_edges(ctx, child);
        }
    }

    fn paint_nodes(&self, ctx: &mut Context, node: &CommentNode) {
        if let Some((x, y)) = node.position() {
            let (x, y) = self.canvas.to_draw(x, y);
            let radius = self.app.radii.for_node(node) * self.app.view.zoom;
            ctx.draw(&Circle {
                x,
                y,
                radius,
                color: node_color(node),
            });
            if self.app.selection == Some(node.key()) {
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: radius + 1.0,
                    color: Theme::SELECTED,
                });
            }
        }
        if !node.collapsed {
            for child in &node.children {
                self.paint_nodes(ctx, child);
            }
        }
    }

    fn paint_labels(&self, ctx: &mut Context, node: &CommentNode) {
        if let Some((x, y)) = node.position() {
            let (x, y) = self.canvas.to_draw(x, y);
            let label = if node.is_post {
                "post".to_string()
            } else if node.collapsed && !node.is_leaf() {
                format!("{} +{}", node.index, node.descendant_count())
            } else {
                node.index.clone()
            };
            ctx.print(x, y, Span::styled(label, Theme::INDEX_LABEL));
        }
        if !node.collapsed {
            for child in &node.children {
                self.paint_labels(ctx, child);
            }
        }
    }
}

fn node_color(node: &CommentNode) -> Color {
    if node.is_post {
        Theme::POST
    } else if node.highlighted {
        Theme::BEST_PATH
    } else if node.negative_score {
        Theme::NEGATIVE
    } else {
        Theme::level_color(node.level)
    }
}

fn score_style(score: i64) -> Style {
    if score < 0 {
        Theme::DOWNVOTE
    } else {
        Theme::UPVOTE
    }
}

/// Render details of the selected node.
fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::BORDER));

    let lines = app
        .selected_node()
        .map_or_else(|| vec![Line::styled("Click a node", Theme::DIM)], detail_lines);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn detail_lines(node: &CommentNode) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if node.is_post {
        lines.push(Line::styled(
            node.title.clone().unwrap_or_else(|| "Post".to_string()),
            Theme::TITLE,
        ));
    } else {
        lines.push(Line::styled(format!("#{}", node.index), Theme::TITLE));
    }

    let mut author = vec![Span::styled(
        node.author.display_name().to_string(),
        Theme::NORMAL,
    )];
    if let Some(role) = &node.author.role {
        author.push(Span::styled(format!(" ({role})"), Theme::DIM));
    }
    lines.push(Line::from(author));
    if !node.author.badges.is_empty() {
        lines.push(Line::styled(node.author.badges.join(", "), Theme::KEY_HINT));
    }

    lines.push(Line::from(vec![
        Span::styled(format!("+{}", node.upvotes), Theme::UPVOTE),
        Span::raw(" "),
        Span::styled(format!("-{}", node.downvotes), Theme::DOWNVOTE),
        Span::raw("  score "),
        Span::styled(format!("{:+}", node.vote_score), score_style(node.vote_score)),
    ]));
    if let Some(created_at) = &node.created_at {
        lines.push(Line::styled(created_at.clone(), Theme::DIM));
    }
    if !node.is_leaf() {
        lines.push(Line::styled(
            format!("{} replies below", node.descendant_count()),
            Theme::DIM,
        ));
    }
    lines.push(Line::default());
    lines.extend(
        node.content
            .lines()
            .map(|l| Line::styled(l.to_string(), Theme::NORMAL)),
    );
    lines
}

/// Render the help bar, or the status when something went wrong.
fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    if let Status::Error(error) = &app.status {
        frame.render_widget(
            Paragraph::new(Line::styled(format!("Error: {error}"), Theme::ERROR)),
            area,
        );
        return;
    }

    let hints = [
        ("click", "select"),
        ("drag", "pan"),
        ("+/-", "zoom"),
        ("j/k", "next/prev"),
        ("c", "collapse"),
        ("r", "reset"),
        ("q", "quit"),
    ];
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Theme::KEY_HINT),
                Span::styled(format!(": {action}  "), Theme::DIM),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
