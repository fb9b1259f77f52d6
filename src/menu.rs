//! Menu tree
//!
//! Menus and slices live in an arena owned by [`MenuTree`] and refer to each
//! other through [`MenuId`] / [`SliceId`] handles. A menu owns its slice list,
//! a slice owns the submenu it spawns, and every back-reference (parent menu,
//! caller slice, owning menu) is just an id.
//!
//! [`TreeBuilder`] turns the entry stream from [`crate::input`] into that
//! tree, inferring nesting purely from indentation deltas.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::ops::{Index, IndexMut};

use tracing::debug;

use crate::error::{Error, Result};
use crate::icons::IconImage;
use crate::input::{Entries, Entry, COMMAND_SIGIL, ICON_PREFIX};
use crate::layout::{Point, SliceGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SliceId(usize);

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

impl fmt::Display for SliceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slice#{}", self.0)
    }
}

/// One wedge of a pie.
#[derive(Debug, Clone)]
pub struct Slice {
    pub label: Option<String>,
    pub icon: Option<String>,
    /// Explicit output; `None` means "same as the label".
    pub output: Option<String>,
    /// Output is a command whose stdout is the submenu.
    pub deferred: bool,
    /// Owning menu.
    pub menu: MenuId,
    /// Position in the owning menu's slice list.
    pub index: usize,
    pub submenu: Option<MenuId>,
    /// Filled in by the layout engine.
    pub geometry: SliceGeometry,
    /// Loaded icon, `None` if the slice has no icon or it failed to load.
    pub icon_image: Option<IconImage>,
}

impl Slice {
    fn from_entry(entry: Entry, menu: MenuId, index: usize) -> Self {
        Self {
            label: entry.label,
            icon: entry.icon,
            output: entry.output,
            deferred: entry.deferred,
            menu,
            index,
            submenu: None,
            geometry: SliceGeometry::default(),
            icon_image: None,
        }
    }

    /// The value emitted (or run) when this slice is chosen.
    pub fn output(&self) -> &str {
        self.output
            .as_deref()
            .or(self.label.as_deref())
            .or(self.icon.as_deref())
            .unwrap_or_default()
    }

    /// Whether the slice opens something instead of terminating.
    pub fn has_indicator(&self) -> bool {
        self.submenu.is_some() || self.deferred
    }
}

/// One pie: an ordered ring of slices sharing a centre.
#[derive(Debug, Clone)]
pub struct Menu {
    pub parent: Option<MenuId>,
    /// Slice that spawned this menu.
    pub caller: Option<SliceId>,
    pub slices: Vec<SliceId>,
    /// Highlighted slice; ancestors keep theirs while a submenu is focused.
    pub selected: Option<SliceId>,
    pub level: usize,
    /// Half the angular width of one slice, in radians.
    pub half: f64,
    /// Top-left corner of the menu's bounding box on screen.
    pub position: Option<Point>,
    /// Built from a deferred command; discarded when closed.
    pub generated: bool,
}

impl Menu {
    fn new(parent: Option<MenuId>, level: usize) -> Self {
        Self {
            parent,
            caller: None,
            slices: Vec::new(),
            selected: None,
            level,
            half: 0.0,
            position: None,
            generated: false,
        }
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Arena holding every menu and slice.
#[derive(Debug, Clone, Default)]
pub struct MenuTree {
    menus: Vec<Option<Menu>>,
    slices: Vec<Option<Slice>>,
    /// Vacant slots left by removed menus, reused before growing.
    free_menus: Vec<usize>,
    free_slices: Vec<usize>,
}

impl MenuTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole menu description. Returns the tree and its root.
    pub fn parse<R: BufRead>(reader: R) -> Result<(Self, MenuId)> {
        let mut tree = Self::new();
        let root = tree.build(Entries::new(reader), 0)?.ok_or(Error::EmptyMenu)?;
        Ok((tree, root))
    }

    /// Build a detached subtree from `entries` whose first level is `base`.
    ///
    /// Returns `None` when the stream was empty. On error the partial subtree
    /// is removed again, leaving the rest of the tree untouched.
    pub fn build<I>(&mut self, entries: I, base: usize) -> Result<Option<MenuId>>
    where
        I: IntoIterator<Item = Result<Entry>>,
    {
        let mut builder = TreeBuilder::new(self, base);
        for entry in entries {
            let pushed = entry.and_then(|entry| builder.push(entry));
            if let Err(e) = pushed {
                if let Some(root) = builder.root {
                    builder.tree.remove_menu(root);
                }
                return Err(e);
            }
        }
        Ok(builder.finish())
    }

    pub fn get_menu(&self, id: MenuId) -> Option<&Menu> {
        self.menus.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_slice(&self, id: SliceId) -> Option<&Slice> {
        self.slices.get(id.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: MenuId) -> bool {
        self.get_menu(id).is_some()
    }

    /// Number of live menus.
    pub fn menu_count(&self) -> usize {
        self.menus.iter().flatten().count()
    }

    /// Number of live slices.
    pub fn slice_count(&self) -> usize {
        self.slices.iter().flatten().count()
    }

    /// Slices of `menu` in input order.
    pub fn slices_of(&self, menu: MenuId) -> impl Iterator<Item = (SliceId, &Slice)> + '_ {
        self[menu].slices.iter().map(move |&id| (id, &self[id]))
    }

    /// Sibling after `slice`, if any.
    pub fn next_slice(&self, slice: SliceId) -> Option<SliceId> {
        let s = &self[slice];
        self[s.menu].slices.get(s.index + 1).copied()
    }

    /// Sibling before `slice`, if any.
    pub fn prev_slice(&self, slice: SliceId) -> Option<SliceId> {
        let s = &self[slice];
        s.index.checked_sub(1).map(|i| self[s.menu].slices[i])
    }

    /// `menu` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, menu: MenuId) -> impl Iterator<Item = MenuId> + '_ {
        std::iter::successors(Some(menu), move |&m| self[m].parent)
    }

    /// Whether `ancestor` is `menu` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: MenuId, menu: MenuId) -> bool {
        self.ancestors(menu).any(|m| m == ancestor)
    }

    /// Every menu in the subtree under `menu`, pre-order, `menu` first.
    pub fn subtree(&self, menu: MenuId) -> Vec<MenuId> {
        let mut out = vec![menu];
        let mut i = 0;
        while i < out.len() {
            let m = out[i];
            out.extend(self.slices_of(m).filter_map(|(_, s)| s.submenu));
            i += 1;
        }
        out
    }

    /// Hang the detached menu `submenu` below `slice`.
    pub fn attach(&mut self, slice: SliceId, submenu: MenuId) {
        let parent = self[slice].menu;
        let menu = &mut self[submenu];
        menu.parent = Some(parent);
        menu.caller = Some(slice);
        self[slice].submenu = Some(submenu);
    }

    /// Remove `menu` and everything below it, unlinking it from its caller.
    ///
    /// Returns the removed slices so owners of per-slice resources can drop
    /// them.
    pub fn remove_menu(&mut self, menu: MenuId) -> Vec<SliceId> {
        if let Some(caller) = self.get_menu(menu).and_then(|m| m.caller) {
            if let Some(slot) = self.slices.get_mut(caller.0).and_then(Option::as_mut) {
                slot.submenu = None;
            }
        }

        let mut removed = Vec::new();
        for m in self.subtree(menu) {
            if let Some(dead) = self.menus[m.0].take() {
                self.free_menus.push(m.0);
                for id in dead.slices {
                    self.slices[id.0] = None;
                    self.free_slices.push(id.0);
                    removed.push(id);
                }
            }
        }
        debug!(%menu, slices = removed.len(), "menu removed");
        removed
    }

    /// Write the subtree under `menu` back in input syntax, pre-order.
    pub fn write_input<W: Write>(&self, menu: MenuId, w: &mut W) -> io::Result<()> {
        for (_, slice) in self.slices_of(menu) {
            let mut fields: Vec<String> = Vec::new();
            if let Some(icon) = &slice.icon {
                fields.push(format!("{ICON_PREFIX}{icon}"));
            }
            if let Some(label) = &slice.label {
                fields.push(label.clone());
            }
            if let Some(output) = &slice.output {
                if slice.deferred {
                    fields.push(format!("{COMMAND_SIGIL} {output}"));
                } else {
                    fields.push(output.clone());
                }
            }
            writeln!(w, "{}{}", "\t".repeat(self[menu].level), fields.join("\t"))?;
            if let Some(sub) = slice.submenu {
                self.write_input(sub, w)?;
            }
        }
        Ok(())
    }

    fn alloc_menu(&mut self, parent: Option<MenuId>, level: usize) -> MenuId {
        let menu = Some(Menu::new(parent, level));
        match self.free_menus.pop() {
            Some(i) => {
                self.menus[i] = menu;
                MenuId(i)
            }
            None => {
                self.menus.push(menu);
                MenuId(self.menus.len() - 1)
            }
        }
    }

    fn append_slice(&mut self, menu: MenuId, entry: Entry) -> SliceId {
        let index = self[menu].slices.len();
        let slice = Some(Slice::from_entry(entry, menu, index));
        let id = match self.free_slices.pop() {
            Some(i) => {
                self.slices[i] = slice;
                SliceId(i)
            }
            None => {
                self.slices.push(slice);
                SliceId(self.slices.len() - 1)
            }
        };
        self[menu].slices.push(id);
        id
    }
}

impl Index<MenuId> for MenuTree {
    type Output = Menu;

    fn index(&self, id: MenuId) -> &Menu {
        match self.get_menu(id) {
            Some(menu) => menu,
            None => panic!("stale {id}"),
        }
    }
}

impl IndexMut<MenuId> for MenuTree {
    fn index_mut(&mut self, id: MenuId) -> &mut Menu {
        match self.menus.get_mut(id.0).and_then(Option::as_mut) {
            Some(menu) => menu,
            None => panic!("stale {id}"),
        }
    }
}

impl Index<SliceId> for MenuTree {
    type Output = Slice;

    fn index(&self, id: SliceId) -> &Slice {
        match self.get_slice(id) {
            Some(slice) => slice,
            None => panic!("stale {id}"),
        }
    }
}

impl IndexMut<SliceId> for MenuTree {
    fn index_mut(&mut self, id: SliceId) -> &mut Slice {
        match self.slices.get_mut(id.0).and_then(Option::as_mut) {
            Some(slice) => slice,
            None => panic!("stale {id}"),
        }
    }
}

/// Incremental tree construction from successive entries.
///
/// The cursor is the menu the previous entry went into; comparing the next
/// entry's level against it is enough to place the entry without rescanning
/// the tree.
pub struct TreeBuilder<'t> {
    tree: &'t mut MenuTree,
    base: usize,
    root: Option<MenuId>,
    cursor: Option<MenuId>,
}

impl<'t> TreeBuilder<'t> {
    pub fn new(tree: &'t mut MenuTree, base: usize) -> Self {
        Self {
            tree,
            base,
            root: None,
            cursor: None,
        }
    }

    /// Place one entry. Returns the root of the menu being built.
    ///
    /// Indentation may only grow one level at a time, stepping into a
    /// submenu of the slice read just before.
    pub fn push(&mut self, entry: Entry) -> Result<MenuId> {
        let (line, level) = (entry.line, entry.level);
        let indentation = || Error::Indentation { line, level };

        let Some(cursor) = self.cursor else {
            if level != self.base {
                return Err(indentation());
            }
            let root = self.tree.alloc_menu(None, level);
            self.tree.append_slice(root, entry);
            self.root = Some(root);
            self.cursor = Some(root);
            return Ok(root);
        };

        let current = self.tree[cursor].level;
        let target = if level == current {
            cursor
        } else if level < current {
            let mut menu = cursor;
            for _ in level..current {
                menu = self.tree[menu].parent.ok_or_else(indentation)?;
            }
            menu
        } else if level == current + 1 {
            let caller = *self.tree[cursor]
                .slices
                .last()
                .ok_or_else(indentation)?;
            let submenu = self.tree.alloc_menu(Some(cursor), level);
            self.tree[submenu].caller = Some(caller);
            self.tree[caller].submenu = Some(submenu);
            submenu
        } else {
            return Err(indentation());
        };

        self.tree.append_slice(target, entry);
        self.cursor = Some(target);
        self.root.ok_or_else(indentation)
    }

    /// Root of the built menu, `None` if nothing was pushed.
    pub fn finish(self) -> Option<MenuId> {
        self.root
    }
}
