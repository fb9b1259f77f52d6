//! Navigation state machine
//!
//! [`Navigator`] consumes abstract input events and answers with [`Effect`]s
//! for the front end: which menus to map or unmap, when to redraw, and how
//! the run ends. It owns the "current menu" cursor; every menu keeps its own
//! `selected` slice in the tree so ancestors remember their highlight while a
//! submenu is focused.

use tracing::{debug, info};

use crate::config::{PieGeometry, PieMenuConfig};
use crate::hit::{self, Region};
use crate::layout::{self, Point};
use crate::menu::{MenuId, MenuTree, SliceId};

/// Keyboard commands, already translated from key symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    CycleForward,
    CycleBackward,
    Confirm,
    Escape,
}

/// Input events in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// The root menu is ready to be shown.
    Start,
    Motion(Point),
    ButtonPress(Point),
    ButtonRelease(Point),
    Key(Key),
    /// The pointer entered a menu's window.
    Enter(MenuId),
    /// The pointer left a menu's window.
    Leave(MenuId),
    /// A menu's window was moved.
    Configure { menu: MenuId, position: Point },
}

/// How a run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this value.
    Emit(String),
    /// Run this value through the shell.
    RunShell(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    SliceHighlighted(SliceId),
    Terminated(Outcome),
}

/// Requests for the front end, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Map(MenuId),
    Unmap(MenuId),
    /// A generated menu was removed from the tree; release what was
    /// allocated for it.
    Discard { menu: MenuId, slices: Vec<SliceId> },
    /// Bring the menu under the pointer. Answered with [`Input::Enter`] once
    /// it is there.
    Warp(MenuId),
    Redraw,
    Finish(Outcome),
}

/// Builds submenus for deferred-command slices.
pub trait Expander {
    /// Run `slice`'s command and hang the resulting menu below it, laid out
    /// and placed. `None` when the command produced nothing usable.
    fn expand(&mut self, tree: &mut MenuTree, slice: SliceId) -> Option<MenuId>;
}

/// Expander for runs where deferred commands are inert.
pub struct NoExpand;

impl Expander for NoExpand {
    fn expand(&mut self, _tree: &mut MenuTree, _slice: SliceId) -> Option<MenuId> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavOptions {
    /// Re-centre opened submenus on the pointer.
    pub warp: bool,
    /// Run chosen outputs instead of printing them.
    pub execute: bool,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self::from(&PieMenuConfig::default())
    }
}

impl From<&PieMenuConfig> for NavOptions {
    fn from(config: &PieMenuConfig) -> Self {
        Self {
            warp: config.warp,
            execute: config.execute,
        }
    }
}

/// Next (or previous) slice of `menu` after its selection, wrapping around.
/// With nothing selected, forward starts at the first slice and backward at
/// the last.
pub fn cycle(tree: &MenuTree, menu: MenuId, forward: bool) -> Option<SliceId> {
    let slices = &tree[menu].slices;
    let (first, last) = (slices.first().copied(), slices.last().copied());
    match (tree[menu].selected, forward) {
        (None, true) => first,
        (None, false) => last,
        (Some(s), true) => tree.next_slice(s).or(first),
        (Some(s), false) => tree.prev_slice(s).or(last),
    }
}

/// Deepest menu that is an ancestor of (or equal to) both `a` and `b`.
pub fn lowest_common_ancestor(tree: &MenuTree, a: MenuId, b: MenuId) -> MenuId {
    let (mut deep, mut shallow) = if tree[a].level >= tree[b].level { (a, b) } else { (b, a) };
    let min = tree[shallow].level;
    while tree[deep].level > min {
        match tree[deep].parent {
            Some(parent) => deep = parent,
            None => break,
        }
    }
    while deep != shallow {
        match (tree[deep].parent, tree[shallow].parent) {
            (Some(p), Some(q)) => {
                deep = p;
                shallow = q;
            }
            _ => break,
        }
    }
    deep
}

/// Menus to hide and to show when focus moves from `from` to `to`.
///
/// Unmaps run from `from` upward, maps from just below the common ancestor
/// down to `to`; the ancestor itself stays as it is.
pub fn remap_plan(tree: &MenuTree, from: Option<MenuId>, to: MenuId) -> (Vec<MenuId>, Vec<MenuId>) {
    let Some(from) = from else {
        return (Vec::new(), vec![to]);
    };
    if from == to {
        return (Vec::new(), Vec::new());
    }
    let lca = lowest_common_ancestor(tree, from, to);
    let unmap: Vec<MenuId> = tree.ancestors(from).take_while(|&m| m != lca).collect();
    let mut map: Vec<MenuId> = tree.ancestors(to).take_while(|&m| m != lca).collect();
    map.reverse();
    (unmap, map)
}

pub struct Navigator {
    root: MenuId,
    current: MenuId,
    /// Menu whose chain is currently mapped.
    mapped: Option<MenuId>,
    state: State,
    /// Menu the pointer was last seen over.
    inside: Option<MenuId>,
    /// A pointer button is down.
    held: bool,
    /// The held pointer has been over a slice of the current menu.
    armed: bool,
    /// A drag opened a submenu during this press.
    dragged: bool,
    geometry: PieGeometry,
    options: NavOptions,
    dirty: bool,
}

impl Navigator {
    pub fn new(root: MenuId, geometry: PieGeometry, options: NavOptions) -> Self {
        Self {
            root,
            current: root,
            mapped: None,
            state: State::Idle,
            inside: None,
            held: false,
            armed: false,
            dragged: false,
            geometry,
            options,
            dirty: false,
        }
    }

    pub fn root(&self) -> MenuId {
        self.root
    }

    pub fn current(&self) -> MenuId {
        self.current
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Terminated(_))
    }

    /// The mapped menus, root first.
    pub fn visible(&self, tree: &MenuTree) -> Vec<MenuId> {
        let mut chain: Vec<MenuId> = match self.mapped {
            Some(m) if tree.contains(m) => tree.ancestors(m).collect(),
            _ => Vec::new(),
        };
        chain.reverse();
        chain
    }

    /// Feed one event through the machine.
    pub fn handle(&mut self, tree: &mut MenuTree, input: Input, expander: &mut dyn Expander) -> Vec<Effect> {
        let mut fx = Vec::new();
        if self.is_finished() {
            return fx;
        }

        match input {
            Input::Start => {
                self.focus(tree, self.root, &mut fx);
                self.dirty = true;
            }
            Input::Motion(p) => self.motion(tree, p, expander, &mut fx),
            Input::ButtonPress(p) => {
                self.held = true;
                self.dragged = false;
                match self.menu_at(tree, p) {
                    None => self.terminate(tree, Outcome::Cancelled, &mut fx),
                    Some((m, Region::Slice(_))) => self.armed = m == self.current,
                    Some(_) => self.armed = false,
                }
            }
            Input::ButtonRelease(p) => self.release(tree, p, expander, &mut fx),
            Input::Key(key) => self.key(tree, key, expander, &mut fx),
            Input::Enter(menu) => {
                if tree.contains(menu) {
                    self.inside = Some(menu);
                    self.dirty = true;
                }
            }
            Input::Leave(menu) => {
                if tree.contains(menu) {
                    if self.inside == Some(menu) {
                        self.inside = None;
                    }
                    self.leave(tree, menu, None, &mut fx);
                }
            }
            Input::Configure { menu, position } => {
                if tree.contains(menu) {
                    tree[menu].position = Some(position);
                }
            }
        }

        if !self.is_finished() {
            self.state = match tree[self.current].selected {
                Some(slice) => State::SliceHighlighted(slice),
                None => State::Idle,
            };
            if std::mem::take(&mut self.dirty) {
                fx.push(Effect::Redraw);
            }
        }
        fx
    }

    /// Innermost mapped menu whose circle contains `p`, with what `p` hits.
    pub fn menu_at(&self, tree: &MenuTree, p: Point) -> Option<(MenuId, Region)> {
        tree.ancestors(self.current).find_map(|menu| {
            let local = self.local(tree, menu, p)?;
            let (r, _) = hit::polar(&self.geometry, local);
            (r <= self.geometry.radius).then(|| (menu, hit::region(tree, &self.geometry, menu, local)))
        })
    }

    fn local(&self, tree: &MenuTree, menu: MenuId, p: Point) -> Option<Point> {
        layout::to_local(&self.geometry, tree, menu, p)
    }

    fn outside_ring(&self, tree: &MenuTree, menu: MenuId, p: Point) -> bool {
        self.local(tree, menu, p)
            .is_some_and(|local| hit::polar(&self.geometry, local).0 > self.geometry.radius)
    }

    fn select(&mut self, tree: &mut MenuTree, menu: MenuId, slice: Option<SliceId>) {
        if tree[menu].selected != slice {
            tree[menu].selected = slice;
            self.dirty = true;
        }
    }

    fn motion(&mut self, tree: &mut MenuTree, p: Point, expander: &mut dyn Expander, fx: &mut Vec<Effect>) {
        // dragging a highlighted slice across the rim opens it
        if self.held && self.armed && self.outside_ring(tree, self.current, p) {
            if let Some(slice) = tree[self.current].selected {
                self.armed = false;
                let before = self.current;
                self.activate(tree, slice, expander, fx);
                self.dragged = self.current != before;
                if !self.options.warp {
                    self.inside = self.menu_at(tree, p).map(|(m, _)| m);
                }
                return;
            }
        }

        let hit = self.menu_at(tree, p);
        let now = hit.map(|(m, _)| m);
        if now != self.inside {
            if let Some(old) = self.inside {
                self.leave(tree, old, now, fx);
            }
            self.inside = now;
            self.dirty = true;
        }

        match hit {
            Some((menu, Region::Slice(slice))) => {
                self.select(tree, menu, Some(slice));
                if self.held && menu == self.current {
                    self.armed = true;
                }
            }
            Some((menu, _)) => self.select(tree, menu, None),
            None => self.select(tree, self.current, None),
        }
    }

    /// The pointer left `menu`. Leaving the focused submenu closes it, back
    /// to `towards` when that is an ancestor the pointer moved onto.
    fn leave(&mut self, tree: &mut MenuTree, menu: MenuId, towards: Option<MenuId>, fx: &mut Vec<Effect>) {
        if menu == self.current && menu != self.root {
            let target = match towards {
                Some(m) if m != menu && tree.is_ancestor(m, menu) => Some(m),
                _ => tree[menu].parent,
            };
            if let Some(target) = target {
                debug!(from = %menu, to = %target, "left submenu");
                self.focus(tree, target, fx);
            }
        }
        let current = self.current;
        self.select(tree, current, None);
    }

    fn release(&mut self, tree: &mut MenuTree, p: Point, expander: &mut dyn Expander, fx: &mut Vec<Effect>) {
        let pressed = std::mem::take(&mut self.held);
        let dragged = std::mem::take(&mut self.dragged);
        self.armed = false;

        match self.menu_at(tree, p) {
            Some((menu, Region::Slice(slice))) => {
                self.select(tree, menu, Some(slice));
                self.activate(tree, slice, expander, fx);
            }
            // the release that ends a drag lands in the new submenu's hub
            Some((menu, Region::DeadZone)) if pressed && !dragged => match tree[menu].parent {
                Some(parent) => {
                    debug!(%menu, "closed from its centre");
                    self.focus(tree, parent, fx);
                    self.inside = Some(parent);
                }
                None => self.terminate(tree, Outcome::Cancelled, fx),
            },
            None if pressed => self.terminate(tree, Outcome::Cancelled, fx),
            _ => {}
        }
    }

    fn key(&mut self, tree: &mut MenuTree, key: Key, expander: &mut dyn Expander, fx: &mut Vec<Effect>) {
        let current = self.current;
        match key {
            Key::CycleForward | Key::CycleBackward => {
                let slice = cycle(tree, current, key == Key::CycleForward);
                self.select(tree, current, slice);
            }
            Key::Confirm => {
                if let Some(slice) = tree[current].selected {
                    self.activate(tree, slice, expander, fx);
                }
            }
            Key::Escape => match tree[current].parent {
                // the parent still has the slice that opened us selected
                Some(parent) => self.focus(tree, parent, fx),
                None => self.terminate(tree, Outcome::Cancelled, fx),
            },
        }
    }

    /// Open `slice`'s submenu, expand its command, or end the run with it.
    pub fn activate(&mut self, tree: &mut MenuTree, slice: SliceId, expander: &mut dyn Expander, fx: &mut Vec<Effect>) {
        let owner = tree[slice].menu;
        let mut submenu = tree[slice].submenu;

        if tree[slice].deferred {
            // generated menus are never reused
            if let Some(old) = submenu {
                if tree.is_ancestor(old, self.current) {
                    self.focus(tree, owner, fx);
                }
                if tree.contains(old) {
                    self.discard(tree, old, fx);
                }
            }
            submenu = expander.expand(tree, slice);
            if submenu.is_none() {
                debug!(%slice, "deferred command gave no menu");
                return;
            }
        }

        match submenu {
            Some(sub) => {
                self.select(tree, owner, Some(slice));
                self.focus(tree, sub, fx);
                let first = tree[sub].slices.first().copied();
                self.select(tree, sub, first);
                // the front end reports Enter once the menu is under the pointer
                if self.options.warp {
                    fx.push(Effect::Warp(sub));
                }
                debug!(%slice, menu = %sub, "submenu opened");
            }
            None => {
                let output = tree[slice].output().to_string();
                let outcome = if self.options.execute {
                    Outcome::RunShell(output)
                } else {
                    Outcome::Emit(output)
                };
                self.terminate(tree, outcome, fx);
            }
        }
    }

    /// Make `menu` current, mapping and unmapping along the way.
    fn focus(&mut self, tree: &mut MenuTree, menu: MenuId, fx: &mut Vec<Effect>) {
        let from = self.mapped.filter(|&m| tree.contains(m));
        let (unmap, map) = remap_plan(tree, from, menu);

        for &m in &unmap {
            tree[m].selected = None;
            fx.push(Effect::Unmap(m));
        }
        for m in unmap {
            if tree.contains(m) && tree[m].generated {
                self.discard(tree, m, fx);
            }
        }
        for m in map {
            fx.push(Effect::Map(m));
        }

        self.current = menu;
        self.mapped = Some(menu);
        self.dirty = true;
    }

    fn discard(&mut self, tree: &mut MenuTree, menu: MenuId, fx: &mut Vec<Effect>) {
        let slices = tree.remove_menu(menu);
        // freed ids are handed out again by the next build
        if self.inside.is_some_and(|m| !tree.contains(m)) {
            self.inside = None;
        }
        fx.push(Effect::Discard { menu, slices });
    }

    fn terminate(&mut self, tree: &mut MenuTree, outcome: Outcome, fx: &mut Vec<Effect>) {
        if let Some(mapped) = self.mapped.take().filter(|&m| tree.contains(m)) {
            for m in tree.ancestors(mapped) {
                fx.push(Effect::Unmap(m));
            }
        }
        info!(?outcome, "menu finished");
        self.state = State::Terminated(outcome.clone());
        fx.push(Effect::Finish(outcome));
    }
}
