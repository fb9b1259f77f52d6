//! Pie Menu UI Module
//!
//! Renders the mapped menus with iced on a full-screen layer surface and feeds
//! pointer and keyboard events to the [`Navigator`].
//!
//! Wayland does not tell clients where the pointer is until it moves over one
//! of their surfaces, so the root menu is placed lazily: either at the first
//! pointer event, at the position captured by `draw()`, or at `--at`.

use cosmic::iced::alignment::{Horizontal, Vertical};
use cosmic::iced::keyboard::{self, key::Named, Key as KeyCode, Modifiers};
use cosmic::iced::platform_specific::runtime::wayland::layer_surface::SctkLayerSurfaceSettings;
use cosmic::iced::platform_specific::shell::commands::layer_surface::{
    get_layer_surface, Anchor, KeyboardInteractivity, Layer,
};
use cosmic::iced::time;
use cosmic::iced::widget::canvas;
use cosmic::iced::widget::canvas::{Event, Frame, Geometry, Path, Program, Stroke, Text};
use cosmic::iced::window::Id;
use cosmic::iced::{mouse, Color, Font, Point, Rectangle, Renderer, Theme};
use cosmic::iced::{Element, Length, Subscription, Task};
use cosmic::iced_core::image::{Handle as ImageHandle, Image};
use cosmic::iced_core::svg::{Handle as SvgHandle, Svg};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::config::{ColorOverrides, PieGeometry, PieMenuConfig};
use crate::error::{Error, Result};
use crate::exec;
use crate::generate::Generator;
use crate::grab::{self, GrabGuard, GrabPolicy, LockGrab};
use crate::icons::IconResolver;
use crate::layout::{self, EstimatedText, LayoutEngine, Rect};
use crate::menu::{MenuId, MenuTree, SliceId};
use crate::nav::{Effect, Input, Key, NavOptions, Navigator, Outcome};

/// Theme colors for the pie menu
/// Integrates with COSMIC theme system for consistent colors
struct PieTheme {
    /// Whether the desktop uses a dark palette
    dark: bool,
    /// Color of a slice when not selected
    segment_color: Color,
    /// Color of the selected slice
    segment_selected_color: Color,
    /// Dead zone background
    center_color: Color,
    /// Outer border
    border_color: Color,
    /// Separators between slices
    separator_color: Color,
    /// Label color
    text_color: Color,
    /// Label color on the selected slice
    text_selected_color: Color,
}

/// Convert a COSMIC Srgba color to iced Color with custom alpha
fn srgba_to_color(srgba: cosmic::theme::CosmicColor, alpha: f32) -> Color {
    Color::from_rgba(srgba.red, srgba.green, srgba.blue, alpha)
}

/// Convert a COSMIC Srgba color to iced Color preserving alpha
fn srgba_to_color_full(srgba: cosmic::theme::CosmicColor) -> Color {
    Color::from_rgba(srgba.red, srgba.green, srgba.blue, srgba.alpha)
}

impl PieTheme {
    /// Get theme from COSMIC's system preference
    fn current(colors: &ColorOverrides) -> Self {
        let theme = cosmic::theme::system_preference();
        Self::from_cosmic(theme.cosmic(), colors)
    }

    fn from_cosmic(cosmic: &cosmic::cosmic_theme::Theme, colors: &ColorOverrides) -> Self {
        let bg = &cosmic.background;
        let primary = &cosmic.primary;
        let accent = &cosmic.accent;

        let pick = |value: &Option<String>, fallback: Color| {
            ColorOverrides::resolve(value.as_deref())
                .map(|[r, g, b, a]| Color::from_rgba(r, g, b, a))
                .unwrap_or(fallback)
        };

        Self {
            dark: cosmic.is_dark,
            segment_color: pick(&colors.background, srgba_to_color(primary.component.base, 0.95)),
            segment_selected_color: pick(&colors.selected_background, srgba_to_color(accent.base, 0.95)),
            center_color: pick(&colors.background, srgba_to_color(bg.base, 0.98)),
            border_color: pick(&colors.border, srgba_to_color(bg.divider, 0.9)),
            separator_color: pick(&colors.separator, srgba_to_color(bg.divider, 0.6)),
            text_color: pick(&colors.foreground, srgba_to_color_full(bg.on)),
            text_selected_color: pick(&colors.selected_foreground, srgba_to_color_full(accent.on)),
        }
    }
}

/// Messages for the pie menu
#[derive(Debug, Clone)]
pub enum Message {
    /// Pointer event from the canvas, with the surface size
    Pointer { input: Input, width: f32, height: f32 },
    /// Key pressed
    Key(Key),
    /// Periodic tick until the root menu is placed
    Tick,
}

/// Translate a key press into a navigation command
pub fn map_key(key: KeyCode, modifiers: Modifiers) -> Option<Key> {
    match key {
        KeyCode::Named(Named::Tab) if modifiers.shift() => Some(Key::CycleBackward),
        KeyCode::Named(Named::Tab) => Some(Key::CycleForward),
        KeyCode::Named(Named::Enter) => Some(Key::Confirm),
        KeyCode::Named(Named::Escape) => Some(Key::Escape),
        _ => None,
    }
}

/// Loaded icon ready for drawing
#[derive(Debug, Clone)]
enum IconHandle {
    Raster(ImageHandle),
    Vector(SvgHandle),
}

/// Surface size and pointer position seen by the last draw
type Probe = Arc<Mutex<Option<(Rectangle, Option<Point>)>>>;

/// State for the pie menu application
struct PieMenuApp {
    tree: MenuTree,
    nav: Navigator,
    /// Owns the layout engine used for every menu
    generator: Generator,
    /// Input capture, released before the process ends
    grab: Option<GrabGuard<LockGrab>>,
    handles: HashMap<SliceId, IconHandle>,
    theme: PieTheme,
    font: Font,
    font_size: f32,
    /// Requested root centre
    at: Option<layout::Point>,
    pointer: Option<layout::Point>,
    placed: bool,
    probe: Probe,
    tick_count: u32,
}

impl PieMenuApp {
    fn new(
        tree: MenuTree,
        root: MenuId,
        config: &PieMenuConfig,
        at: Option<layout::Point>,
        grab: GrabGuard<LockGrab>,
    ) -> (Self, Task<Message>) {
        let mut settings = SctkLayerSurfaceSettings::default();
        settings.keyboard_interactivity = KeyboardInteractivity::Exclusive;
        settings.layer = Layer::Overlay;
        // Full-screen anchored surface; menus are drawn at their own positions
        settings.anchor = Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT;
        settings.size = Some((None, None));
        settings.exclusive_zone = -1;

        let geometry = PieGeometry::from(config);
        let engine = LayoutEngine::new(
            geometry,
            Box::new(EstimatedText {
                font_size: config.font_size,
            }),
            Box::new(IconResolver::new(config.icon_search_path())),
        );
        let mut tree = tree;
        engine.layout(&mut tree, root);

        let app = Self {
            tree,
            nav: Navigator::new(root, geometry, NavOptions::from(config)),
            generator: Generator::new(config.shell.clone(), engine, Rect::default()),
            grab: Some(grab),
            handles: HashMap::new(),
            theme: PieTheme::current(&config.colors),
            // iced keeps font names for the whole process
            font: config
                .font
                .clone()
                .map_or(Font::DEFAULT, |name| Font::with_name(Box::leak(name.into_boxed_str()))),
            font_size: config.font_size,
            at,
            pointer: None,
            placed: false,
            probe: Arc::new(Mutex::new(None)),
            tick_count: 0,
        };

        (app, get_layer_surface(settings))
    }

    fn title(&self, _id: Id) -> String {
        String::from("Pie Menu")
    }

    /// Place the root menu once the surface size is known
    fn place_root(&mut self, width: f32, height: f32) {
        if self.placed {
            return;
        }
        let monitor = Rect::new(0.0, 0.0, f64::from(width), f64::from(height));
        self.generator.set_monitor(monitor);

        let root = self.nav.root();
        let centre = self.at.or(self.pointer).unwrap_or_else(|| monitor.center());
        let engine = self.generator.layout();
        let placed = engine
            .place(&mut self.tree, root, monitor, Some(centre))
            .and_then(|()| engine.place_subtree(&mut self.tree, root, monitor));
        if let Err(e) = placed {
            self.fail(&e);
        }
        self.placed = true;
        info!(x = centre.x, y = centre.y, "root menu placed");

        let effects = self.nav.handle(&mut self.tree, Input::Start, &mut self.generator);
        self.apply(effects);
    }

    fn feed(&mut self, input: Input) {
        let effects = self.nav.handle(&mut self.tree, input, &mut self.generator);
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        let mut entered = Vec::new();
        for effect in effects {
            match effect {
                Effect::Map(menu) => {
                    debug!(%menu, "map");
                    self.load_icons(menu);
                }
                Effect::Unmap(menu) => debug!(%menu, "unmap"),
                Effect::Discard { menu, slices } => {
                    debug!(%menu, "discard");
                    for slice in slices {
                        self.handles.remove(&slice);
                    }
                }
                Effect::Warp(menu) => {
                    if self.recentre(menu) {
                        entered.push(menu);
                    }
                }
                Effect::Redraw => {}
                Effect::Finish(outcome) => self.finish(outcome),
            }
        }
        for menu in entered {
            if self.tree.contains(menu) {
                self.feed(Input::Enter(menu));
            }
        }
    }

    fn load_icons(&mut self, menu: MenuId) {
        if !self.tree.contains(menu) {
            return;
        }
        for (id, slice) in self.tree.slices_of(menu) {
            if let Some(icon) = &slice.icon_image {
                let handle = if icon.vector {
                    IconHandle::Vector(SvgHandle::from_path(&icon.path))
                } else {
                    IconHandle::Raster(ImageHandle::from_path(&icon.path))
                };
                self.handles.insert(id, handle);
            }
        }
    }

    /// Move `menu` (and the menus below it) under the pointer
    ///
    /// False when the pointer position is not known yet.
    fn recentre(&mut self, menu: MenuId) -> bool {
        let Some(pointer) = self.pointer else {
            return false;
        };
        let monitor = self.generator.monitor();
        let engine = self.generator.layout();
        let moved = engine
            .place(&mut self.tree, menu, monitor, Some(pointer))
            .and_then(|()| engine.place_subtree(&mut self.tree, menu, monitor));
        if let Err(e) = moved {
            self.fail(&e);
        }
        true
    }

    fn finish(&mut self, outcome: Outcome) -> ! {
        self.grab.take();
        match outcome {
            Outcome::Emit(output) => {
                let mut stdout = io::stdout().lock();
                if writeln!(stdout, "{output}").and_then(|()| stdout.flush()).is_err() {
                    std::process::exit(1);
                }
            }
            Outcome::RunShell(command) => {
                if let Err(e) = exec::spawn_detached(self.generator.shell(), &command) {
                    self.fail(&e);
                }
            }
            Outcome::Cancelled => info!("cancelled"),
        }
        std::process::exit(0);
    }

    fn fail(&mut self, e: &Error) -> ! {
        self.grab.take();
        error!("{e}");
        eprintln!("cosmic-pmenu: {e}");
        std::process::exit(1);
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Pointer { input, width, height } => {
                if let Input::Motion(p) | Input::ButtonPress(p) | Input::ButtonRelease(p) = input {
                    self.pointer = Some(p);
                }
                if !self.placed {
                    self.place_root(width, height);
                }
                self.feed(input);
            }
            Message::Key(key) => {
                if self.placed {
                    self.feed(Input::Key(key));
                }
            }
            Message::Tick => {
                // Keep ticking for a bit to trigger layout recalculation on scaled displays
                self.tick_count += 1;
                if !self.placed {
                    let probed = self.probe.lock().ok().and_then(|guard| *guard);
                    if let Some((bounds, cursor)) = probed {
                        if let Some(c) = cursor {
                            self.pointer = Some(layout::Point::new(f64::from(c.x), f64::from(c.y)));
                        }
                        self.place_root(bounds.width, bounds.height);
                    }
                }
            }
        }
        Task::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let keyboard_sub = keyboard::on_key_press(|key, modifiers| map_key(key, modifiers).map(Message::Key));

        // Tick until placed, and for the first 500ms to settle layout on scaled displays
        if !self.placed || self.tick_count < 10 {
            let tick_sub = time::every(Duration::from_millis(50)).map(|_| Message::Tick);
            Subscription::batch([keyboard_sub, tick_sub])
        } else {
            keyboard_sub
        }
    }

    fn view(&self, _id: Id) -> Element<'_, Message> {
        canvas(PieCanvas { app: self })
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self, _id: Id) -> Theme {
        if self.theme.dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

fn to_iced(p: layout::Point) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

/// Points along an arc in screen coordinates (y down), `steps + 1` of them
pub fn arc_points(center: layout::Point, radius: f64, start: f64, width: f64, steps: usize) -> Vec<layout::Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let angle = start + width * i as f64 / steps as f64;
            layout::Point::new(center.x + radius * angle.cos(), center.y - radius * angle.sin())
        })
        .collect()
}

/// Canvas widget for rendering the mapped menus
struct PieCanvas<'a> {
    app: &'a PieMenuApp,
}

impl PieCanvas<'_> {
    fn draw_menu(&self, frame: &mut Frame, theme: &PieTheme, menu: MenuId) {
        let app = self.app;
        let tree = &app.tree;
        let engine = app.generator.layout();
        let g = engine.geometry();
        let Some(center) = engine.center(tree, menu) else {
            return;
        };
        let screen = |local: layout::Point| {
            let p = engine.to_screen(tree, menu, local).unwrap_or(local);
            to_iced(p)
        };
        let selected = tree[menu].selected;

        // Pie body and border
        let body = Path::circle(to_iced(center), g.radius as f32);
        frame.fill(&body, theme.segment_color);
        if g.border > 0.0 {
            frame.stroke(
                &body,
                Stroke::default()
                    .with_color(theme.border_color)
                    .with_width(g.border as f32),
            );
        }

        // Selected wedge
        if let Some(slice) = selected {
            let sg = tree[slice].geometry;
            let steps = ((sg.width() / TAU) * 64.0).ceil() as usize;
            let wedge = Path::new(|builder| {
                builder.move_to(to_iced(center));
                for p in arc_points(center, g.radius, sg.angle_a, sg.width(), steps) {
                    builder.line_to(to_iced(p));
                }
                builder.close();
            });
            frame.fill(&wedge, theme.segment_selected_color);
        }

        for (id, slice) in tree.slices_of(menu) {
            let sg = &slice.geometry;
            let is_selected = selected == Some(id);
            let text_color = if is_selected {
                theme.text_selected_color
            } else {
                theme.text_color
            };

            if let Some(quad) = sg.separator {
                let separator = Path::new(|builder| {
                    builder.move_to(screen(quad[0]));
                    for p in &quad[1..] {
                        builder.line_to(screen(*p));
                    }
                    builder.close();
                });
                frame.fill(&separator, theme.separator_color);
            }

            match (app.handles.get(&id), slice.icon_image.as_ref(), sg.icon_anchor) {
                (Some(handle), Some(icon), Some(anchor)) => {
                    let top_left = screen(anchor);
                    let bounds = Rectangle {
                        x: top_left.x,
                        y: top_left.y,
                        width: icon.width as f32,
                        height: icon.height as f32,
                    };
                    match handle {
                        IconHandle::Vector(h) => frame.draw_svg(bounds, Svg::new(h.clone())),
                        IconHandle::Raster(h) => frame.draw_image(bounds, Image::new(h.clone())),
                    }
                }
                _ => {
                    if let Some(label) = &slice.label {
                        frame.fill_text(Text {
                            content: label.clone(),
                            position: screen(sg.label_anchor),
                            color: text_color,
                            size: app.font_size.into(),
                            font: app.font,
                            horizontal_alignment: Horizontal::Left,
                            vertical_alignment: Vertical::Center,
                            ..Text::default()
                        });
                    }
                }
            }

            if let Some([a, b, c]) = sg.indicator {
                let triangle = Path::new(|builder| {
                    builder.move_to(screen(a));
                    builder.line_to(screen(b));
                    builder.line_to(screen(c));
                    builder.close();
                });
                frame.fill(&triangle, text_color);
            }
        }

        // Dead zone
        let hub = Path::circle(to_iced(center), g.dead_zone as f32);
        frame.fill(&hub, theme.center_color);
        frame.stroke(
            &hub,
            Stroke::default()
                .with_color(theme.separator_color)
                .with_width(1.0),
        );
    }

    /// Name of the selected icon slice on a pill in the menu centre
    fn draw_pill(&self, frame: &mut Frame, menu: MenuId) {
        let app = self.app;
        let tree = &app.tree;
        let Some(slice) = tree[menu].selected.map(|s| &tree[s]) else {
            return;
        };
        if slice.icon_image.is_none() {
            return;
        }
        let Some(name) = slice.label.as_deref().or(slice.icon.as_deref()) else {
            return;
        };
        let Some(center) = app.generator.layout().center(tree, menu) else {
            return;
        };
        let center = to_iced(center);

        let font_size = app.font_size;
        let text_width = (unicode_width::UnicodeWidthStr::width(name) as f32 * font_size * 0.6).max(40.0);
        let padding_x = 12.0;
        let padding_y = 6.0;
        let pill_width = text_width + padding_x * 2.0;
        let pill_height = font_size + padding_y * 2.0;
        let r = (pill_height / 2.0).min(pill_width / 2.0);

        let pill = Path::new(|builder| {
            let left = center.x - pill_width / 2.0;
            let right = center.x + pill_width / 2.0;
            let top = center.y - pill_height / 2.0;
            let bottom = center.y + pill_height / 2.0;
            // Fully rounded ends, approximated with line segments
            let rc = layout::Point::new(f64::from(right - r), f64::from(center.y));
            let lc = layout::Point::new(f64::from(left + r), f64::from(center.y));
            builder.move_to(Point::new(left + r, top));
            builder.line_to(Point::new(right - r, top));
            for p in arc_points(rc, f64::from(r), TAU / 4.0, -TAU / 2.0, 8) {
                builder.line_to(to_iced(p));
            }
            builder.line_to(Point::new(left + r, bottom));
            for p in arc_points(lc, f64::from(r), -TAU / 4.0, -TAU / 2.0, 8) {
                builder.line_to(to_iced(p));
            }
            builder.close();
        });
        frame.fill(&pill, Color::from_rgba(0.0, 0.0, 0.0, 0.7));
        frame.fill_text(Text {
            content: name.to_string(),
            position: center,
            color: Color::WHITE,
            size: font_size.into(),
            font: app.font,
            horizontal_alignment: Horizontal::Center,
            vertical_alignment: Vertical::Center,
            ..Text::default()
        });
    }
}

impl Program<Message> for PieCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        // The pointer went to another output
        if let Event::Mouse(mouse::Event::CursorLeft) = event {
            if !self.app.placed {
                return (canvas::event::Status::Ignored, None);
            }
            return (
                canvas::event::Status::Captured,
                Some(Message::Pointer {
                    input: Input::Leave(self.app.nav.current()),
                    width: bounds.width,
                    height: bounds.height,
                }),
            );
        }

        let Some(pos) = cursor.position_in(bounds) else {
            return (canvas::event::Status::Ignored, None);
        };
        let p = layout::Point::new(f64::from(pos.x), f64::from(pos.y));

        let input = match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => Input::Motion(p),
            Event::Mouse(mouse::Event::ButtonPressed(_)) => Input::ButtonPress(p),
            Event::Mouse(mouse::Event::ButtonReleased(_)) => Input::ButtonRelease(p),
            _ => return (canvas::event::Status::Ignored, None),
        };
        (
            canvas::event::Status::Captured,
            Some(Message::Pointer {
                input,
                width: bounds.width,
                height: bounds.height,
            }),
        )
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        // Record surface size and pointer for placing the root menu
        if !self.app.placed {
            if let Ok(mut guard) = self.app.probe.lock() {
                *guard = Some((bounds, cursor.position_in(bounds)));
            }
        }

        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::new(0.0, 0.0), bounds.size(), Color::TRANSPARENT);

        if self.app.placed {
            // Parents first so submenus are drawn on top
            for menu in self.app.nav.visible(&self.app.tree) {
                self.draw_menu(&mut frame, &self.app.theme, menu);
            }
            self.draw_pill(&mut frame, self.app.nav.current());
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Style function for transparent background
fn app_style(_state: &PieMenuApp, _theme: &Theme) -> cosmic::iced_runtime::Appearance {
    cosmic::iced_runtime::Appearance {
        background_color: Color::TRANSPARENT,
        text_color: Color::WHITE,
        icon_color: Color::WHITE,
    }
}

/// Capture input and run the menu until a slice is chosen or it is cancelled
///
/// Does not return on a finished run: the process exits with the outcome.
/// Errors are returned for failures before the menu is shown.
pub fn show_pie_menu(tree: MenuTree, root: MenuId, config: &PieMenuConfig, at: Option<layout::Point>) -> Result<()> {
    let guard = grab::acquire(LockGrab::default(), GrabPolicy::from(config))?;
    info!(slices = tree[root].len(), "launching pie menu");

    let config = config.clone();
    cosmic::iced::daemon(PieMenuApp::title, PieMenuApp::update, PieMenuApp::view)
        .subscription(PieMenuApp::subscription)
        .theme(PieMenuApp::theme)
        .style(app_style)
        .run_with(move || PieMenuApp::new(tree, root, &config, at, guard))
        .map_err(|e| Error::Display(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let tab = KeyCode::Named(Named::Tab);
        assert_eq!(map_key(tab.clone(), Modifiers::empty()), Some(Key::CycleForward));
        assert_eq!(map_key(tab, Modifiers::SHIFT), Some(Key::CycleBackward));
        assert_eq!(map_key(KeyCode::Named(Named::Enter), Modifiers::empty()), Some(Key::Confirm));
        assert_eq!(map_key(KeyCode::Named(Named::Escape), Modifiers::CTRL), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::Character("a".into()), Modifiers::empty()), None);
    }

    #[test]
    fn test_arc_points_follow_screen_orientation() {
        let c = layout::Point::new(10.0, 10.0);
        let points = arc_points(c, 5.0, 0.0, TAU / 4.0, 4);
        assert_eq!(points.len(), 5);
        assert!((points[0].x - 15.0).abs() < 1e-9 && (points[0].y - 10.0).abs() < 1e-9);
        // a quarter turn counter-clockwise ends above the centre on screen
        assert!((points[4].x - 10.0).abs() < 1e-9 && (points[4].y - 5.0).abs() < 1e-9);
    }
    #[test]
    fn test_theme_follows_palette_and_overrides() {
        let dark = cosmic::cosmic_theme::Theme::dark_default();
        let plain = PieTheme::from_cosmic(&dark, &ColorOverrides::default());
        assert!(plain.dark);

        let colors = ColorOverrides {
            background: Some("#000000".into()),
            border: Some("bogus".into()),
            ..Default::default()
        };
        let themed = PieTheme::from_cosmic(&dark, &colors);
        assert_eq!(themed.segment_color, Color::BLACK);
        assert_eq!(themed.center_color, Color::BLACK);
        assert_eq!(themed.border_color, plain.border_color);
        assert_eq!(themed.text_color, plain.text_color);

        let light = cosmic::cosmic_theme::Theme::light_default();
        assert!(!PieTheme::from_cosmic(&light, &ColorOverrides::default()).dark);
    }
}
