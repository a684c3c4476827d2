//! The toroidal quadruply-linked dancing matrix, [`CoverageLinks`], and its
//! hide/unhide primitives.
//!
//! ```text
//!        root
//!         |
//!   +-----+-----+-----+
//!   |     |     |     |
//! Bug  Dark  Dragon  ...         <- item header table (circular, horizontal)
//!   |     |     |
//!   o     o     o                <- column nodes, one per (option, item) pair
//!   |     |
//!   o     o
//! ```
//!
//! Three parallel structures form the matrix: an item header table, an
//! option name table, and a single arena of link nodes multiplexed across
//! three roles (header, spacer, item). All cross-links are `usize` indices
//! into the arena rather than pointers, so the whole structure is just
//! data — there is nothing unsafe here and nothing to drop by hand.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use crate::error::{CoverError, HiddenStackKind};
use crate::resistance::{Multiplier, Resistance};
use crate::type_encoding::TypeEncoding;

type Index = usize;

/// Sentinel `tag` value marking a header or spacer as user-hidden.
const HIDDEN: i32 = -1;

/// Which side of the interaction table a matrix was built to search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverageMode {
    /// Items are attacking types; options are defending typings.
    Defense,
    /// Items are defending typings; options are attacking types.
    Attack,
}

#[derive(Clone, Debug)]
struct ItemHeader {
    name: TypeEncoding,
    left: Index,
    right: Index,
}

#[derive(Clone, Debug)]
struct OptionEntry {
    name: TypeEncoding,
    start: Index,
}

#[derive(Clone, Debug)]
struct Link {
    top_or_len: i64,
    up: Index,
    down: Index,
    multiplier: Multiplier,
    tag: i32,
}

#[derive(Clone, Copy, Debug, Default)]
struct EncodingScore {
    name: TypeEncoding,
    score: i64,
}

/// The dancing-links matrix for one coverage search.
///
/// Built once from an interaction table and a [`CoverageMode`]; mutated in
/// place by the cover/uncover primitives (used internally by the search
/// drivers in [`crate::solver`]) and by the user-facing hide/unhide API.
pub struct CoverageLinks {
    item_table: Vec<ItemHeader>,
    option_table: Vec<OptionEntry>,
    links: Vec<Link>,
    hidden_items: Vec<Index>,
    hidden_options: Vec<Index>,
    max_output: usize,
    hit_limit: bool,
    num_items: u64,
    num_options: u64,
    mode: CoverageMode,
}

/// Default cap on the number of solutions a search will enumerate before
/// it sets [`CoverageLinks::reached_output_limit`] and unwinds.
pub const DEFAULT_MAX_OUTPUT: usize = 200_000;

impl CoverageLinks {
    /// Builds a matrix from an interaction table and a coverage mode.
    ///
    /// In [`CoverageMode::Defense`], items are the attacking types drawn
    /// from the first entry's resistance set (generation tables are
    /// uniform: every defender lists the same attacker universe) and
    /// options are the map's keys. In [`CoverageMode::Attack`], the table
    /// is inverted first: each (defender, attacker, multiplier) triple
    /// becomes an (attacker, defender, multiplier) option row.
    pub fn build(
        interactions: &BTreeMap<TypeEncoding, BTreeSet<Resistance>>,
        mode: CoverageMode,
    ) -> CoverageLinks {
        let mut links = CoverageLinks {
            item_table: Vec::new(),
            option_table: Vec::new(),
            links: Vec::new(),
            hidden_items: Vec::new(),
            hidden_options: Vec::new(),
            max_output: DEFAULT_MAX_OUTPUT,
            hit_limit: false,
            num_items: 0,
            num_options: 0,
            mode,
        };
        match mode {
            CoverageMode::Defense => links.build_defense_links(interactions),
            CoverageMode::Attack => links.build_attack_links(interactions),
        }
        debug!(
            ?mode,
            items = links.num_items,
            options = links.num_options,
            "built coverage matrix"
        );
        links
    }

    /// Overrides the solution-count cap (default [`DEFAULT_MAX_OUTPUT`]).
    pub fn with_max_output(mut self, max_output: usize) -> CoverageLinks {
        self.max_output = max_output;
        self
    }

    /// The configured solution-count cap.
    pub fn max_output(&self) -> usize {
        self.max_output
    }

    /// `true` once a search has hit the solution-count cap.
    pub fn reached_output_limit(&self) -> bool {
        self.hit_limit
    }

    /// The coverage mode this matrix was built for.
    pub fn coverage_mode(&self) -> CoverageMode {
        self.mode
    }

    // ---- construction -----------------------------------------------

    fn build_defense_links(&mut self, interactions: &BTreeMap<TypeEncoding, BTreeSet<Resistance>>) {
        let generation_types: BTreeSet<TypeEncoding> = interactions
            .values()
            .next()
            .into_iter()
            .flat_map(|set| set.iter().map(|r| r.type_encoding()))
            .collect();
        let mut column_builder = HashMap::new();
        self.push_item_headers(&generation_types, &mut column_builder);
        let mode = self.mode;
        self.initialize_columns(interactions, &mut column_builder, mode);
    }

    fn build_attack_links(&mut self, interactions: &BTreeMap<TypeEncoding, BTreeSet<Resistance>>) {
        let defending_types: BTreeSet<TypeEncoding> = interactions.keys().copied().collect();
        let mut column_builder = HashMap::new();
        self.push_item_headers(&defending_types, &mut column_builder);

        let mut inverted: BTreeMap<TypeEncoding, BTreeSet<Resistance>> = BTreeMap::new();
        for (defending, resistances) in interactions {
            for res in resistances {
                inverted
                    .entry(res.type_encoding())
                    .or_default()
                    .insert(Resistance::new(*defending, res.multiplier()));
            }
        }
        let mode = self.mode;
        self.initialize_columns(&inverted, &mut column_builder, mode);
    }

    fn push_item_headers(
        &mut self,
        names: &BTreeSet<TypeEncoding>,
        column_builder: &mut HashMap<TypeEncoding, Index>,
    ) {
        self.option_table.push(OptionEntry {
            name: TypeEncoding::default(),
            start: 0,
        });
        self.item_table.push(ItemHeader {
            name: TypeEncoding::default(),
            left: 0,
            right: 1,
        });
        self.links.push(Link {
            top_or_len: 0,
            up: 0,
            down: 0,
            multiplier: Multiplier::Empty,
            tag: 0,
        });

        let mut index = 1usize;
        for name in names {
            column_builder.insert(*name, index);
            self.item_table.push(ItemHeader {
                name: *name,
                left: index - 1,
                right: index + 1,
            });
            self.item_table[0].left += 1;
            self.links.push(Link {
                top_or_len: 0,
                up: index,
                down: index,
                multiplier: Multiplier::Empty,
                tag: 0,
            });
            self.num_items += 1;
            index += 1;
        }
        let last = self.item_table.len() - 1;
        self.item_table[last].right = 0;
    }

    /// Appends one spacer-plus-row per option in `interactions`, which must
    /// iterate in name-sorted order (true of any `BTreeMap`).
    fn initialize_columns(
        &mut self,
        interactions: &BTreeMap<TypeEncoding, BTreeSet<Resistance>>,
        column_builder: &mut HashMap<TypeEncoding, Index>,
        mode: CoverageMode,
    ) {
        let mut previous_set_size = self.links.len();
        let mut current_links_index = self.links.len();
        let mut type_lookup_index: i64 = 1;

        for (name, resistances) in interactions {
            let type_title = current_links_index;
            let mut set_size = 0i64;
            self.links.push(Link {
                top_or_len: -type_lookup_index,
                up: current_links_index - previous_set_size,
                down: current_links_index,
                multiplier: Multiplier::Empty,
                tag: 0,
            });
            self.option_table.push(OptionEntry {
                name: *name,
                start: current_links_index,
            });

            for res in resistances {
                let include = match mode {
                    CoverageMode::Defense => res.multiplier().useful_for_defense(),
                    CoverageMode::Attack => res.multiplier().useful_for_attack(),
                };
                if !include {
                    continue;
                }
                current_links_index += 1;
                self.links[type_title].down += 1;
                set_size += 1;

                let s_type = res.type_encoding();
                let tail = column_builder[&s_type];
                let tail_down = self.links[tail].down;
                self.links[tail_down].top_or_len += 1;

                self.links.push(Link {
                    top_or_len: tail_down as i64,
                    up: current_links_index,
                    down: current_links_index,
                    multiplier: res.multiplier(),
                    tag: 0,
                });

                self.links[tail_down].up = current_links_index;
                self.links[current_links_index].up = tail;
                self.links[current_links_index].down = tail_down;
                self.links[tail].down = current_links_index;
                column_builder.insert(s_type, current_links_index);
            }

            type_lookup_index += 1;
            current_links_index += 1;
            self.num_options += 1;
            previous_set_size = set_size as usize;
        }

        self.links.push(Link {
            top_or_len: i64::MIN,
            up: current_links_index - previous_set_size,
            down: usize::MAX,
            multiplier: Multiplier::Empty,
            tag: 0,
        });
    }

    // ---- cover / uncover (exact search) ------------------------------

    /// Covers the row containing item node `index_in_option`, unlinking
    /// every other row sharing a column with it. Returns the option name
    /// and the accumulated score.
    pub(crate) fn cover_type(&mut self, index_in_option: Index) -> (TypeEncoding, i64) {
        let mut i = index_in_option;
        let mut result = EncodingScore::default();
        loop {
            let top = self.links[i].top_or_len;
            if top <= 0 {
                i = self.links[i].up;
                let prev_top = self.links[i - 1].top_or_len;
                result.name = self.option_table[(-prev_top) as usize].name;
            } else {
                let top_idx = top as usize;
                if self.links[top_idx].tag != HIDDEN {
                    let left = self.item_table[top_idx].left;
                    let right = self.item_table[top_idx].right;
                    self.item_table[left].right = right;
                    self.item_table[right].left = left;
                    self.hide_rows_sharing_columns(i);
                    result.score += self.links[i].multiplier.score();
                }
                i += 1;
            }
            if i == index_in_option {
                break;
            }
        }
        trace!(name = %result.name, score = result.score, "covered option");
        (result.name, result.score)
    }

    /// Exact inverse of [`CoverageLinks::cover_type`].
    pub(crate) fn uncover_type(&mut self, index_in_option: Index) {
        trace!(index = index_in_option, "uncovering option");
        let stop = index_in_option - 1;
        let mut i = stop;
        loop {
            let top = self.links[i].top_or_len;
            if top <= 0 {
                i = self.links[i].down;
            } else {
                let top_idx = top as usize;
                if self.links[top_idx].tag != HIDDEN {
                    let left = self.item_table[top_idx].left;
                    let right = self.item_table[top_idx].right;
                    self.item_table[left].right = top_idx;
                    self.item_table[right].left = top_idx;
                    self.unhide_rows_sharing_columns(i);
                }
                i -= 1;
            }
            if i == stop {
                break;
            }
        }
    }

    fn hide_rows_sharing_columns(&mut self, index_in_option: Index) {
        let top_idx = self.links[index_in_option].top_or_len as usize;
        let mut row = self.links[index_in_option].down;
        while row != index_in_option {
            if row == top_idx {
                row = self.links[row].down;
                continue;
            }
            let mut col = row + 1;
            while col != row {
                let top = self.links[col].top_or_len;
                if top <= 0 {
                    col = self.links[col].up;
                    continue;
                }
                let top_col = top as usize;
                let up = self.links[col].up;
                let down = self.links[col].down;
                self.links[up].down = down;
                self.links[down].up = up;
                self.links[top_col].top_or_len -= 1;
                col += 1;
            }
            row = self.links[row].down;
        }
    }

    fn unhide_rows_sharing_columns(&mut self, index_in_option: Index) {
        let top_idx = self.links[index_in_option].top_or_len as usize;
        let mut row = self.links[index_in_option].up;
        while row != index_in_option {
            if row == top_idx {
                row = self.links[row].up;
                continue;
            }
            let mut col = row - 1;
            while col != row {
                let top = self.links[col].top_or_len;
                if top <= 0 {
                    col = self.links[col].down;
                    continue;
                }
                let top_col = top as usize;
                let up = self.links[col].up;
                let down = self.links[col].down;
                self.links[up].down = col;
                self.links[down].up = col;
                self.links[top_col].top_or_len += 1;
                col -= 1;
            }
            row = self.links[row].up;
        }
    }

    // ---- cover / uncover (overlapping search) ------------------------

    pub(crate) fn overlapping_cover_type(
        &mut self,
        index_in_option: Index,
        depth_tag: i32,
    ) -> (TypeEncoding, i64) {
        let mut i = index_in_option;
        let mut result = EncodingScore::default();
        loop {
            let top = self.links[i].top_or_len;
            if top <= 0 {
                i = self.links[i].up;
                let prev_top = self.links[i - 1].top_or_len;
                result.name = self.option_table[(-prev_top) as usize].name;
            } else {
                let top_idx = top as usize;
                if self.links[top_idx].tag == 0 {
                    self.links[top_idx].tag = depth_tag;
                    let left = self.item_table[top_idx].left;
                    let right = self.item_table[top_idx].right;
                    self.item_table[left].right = right;
                    self.item_table[right].left = left;
                    result.score += self.links[i].multiplier.score();
                }
                if self.links[top_idx].tag != HIDDEN {
                    self.links[i].tag = depth_tag;
                }
                i += 1;
            }
            if i == index_in_option {
                break;
            }
        }
        trace!(name = %result.name, score = result.score, depth_tag, "overlapping-covered option");
        (result.name, result.score)
    }

    pub(crate) fn overlapping_uncover_type(&mut self, index_in_option: Index) {
        trace!(index = index_in_option, "overlapping-uncovering option");
        let stop = index_in_option - 1;
        let mut i = stop;
        loop {
            let top = self.links[i].top_or_len;
            if top < 0 {
                i = self.links[i].down;
            } else {
                let top_idx = top as usize;
                if self.links[top_idx].tag == self.links[i].tag {
                    self.links[top_idx].tag = 0;
                    let left = self.item_table[top_idx].left;
                    let right = self.item_table[top_idx].right;
                    self.item_table[left].right = top_idx;
                    self.item_table[right].left = top_idx;
                }
                if self.links[top_idx].tag != HIDDEN {
                    self.links[i].tag = 0;
                }
                i -= 1;
            }
            if i == stop {
                break;
            }
        }
    }

    // ---- item chooser --------------------------------------------------

    /// The "S-heuristic": the visible column with the fewest active rows,
    /// first wins ties. Returns `0` if any visible column is already
    /// exhausted (the branch is infeasible).
    pub(crate) fn choose_item(&self) -> Index {
        let mut min_len = i64::MAX;
        let mut chosen = 0;
        let mut cur = self.item_table[0].right;
        while cur != 0 {
            let len = self.links[cur].top_or_len;
            if len <= 0 {
                return 0;
            }
            if len < min_len {
                min_len = len;
                chosen = cur;
            }
            cur = self.item_table[cur].right;
        }
        chosen
    }

    pub(crate) fn column_head(&self, index_in_option: Index) -> Index {
        self.links[index_in_option].down
    }

    pub(crate) fn column_len(&self, header: Index) -> i64 {
        self.links[header].top_or_len
    }

    /// The next node below `index_in_option` in its column's vertical ring.
    /// Valid to call before and after a matched cover/uncover (or
    /// overlapping-cover/uncover) pair on that same node, since neither
    /// primitive splices the chosen row's own vertical links.
    pub(crate) fn next_in_column(&self, index_in_option: Index) -> Index {
        self.links[index_in_option].down
    }

    /// `true` once every visible item has been covered (the root's `right`
    /// chain is empty).
    pub(crate) fn items_ring_empty(&self) -> bool {
        self.item_table[0].right == 0
    }

    /// Records that a search hit [`CoverageLinks::max_output`].
    pub(crate) fn set_hit_limit(&mut self) {
        self.hit_limit = true;
    }

    /// Clears the output-cap flag at the start of a fresh search.
    pub(crate) fn clear_hit_limit(&mut self) {
        self.hit_limit = false;
    }

    // ---- item hide/unhide API ------------------------------------------

    fn find_item_index(&self, name: TypeEncoding) -> Index {
        match self.item_table[1..].binary_search_by(|h| h.name.cmp(&name)) {
            Ok(pos) => pos + 1,
            Err(_) => 0,
        }
    }

    /// Hides the item named `name`. Returns `false` if the name is
    /// unknown or already hidden.
    pub fn hide_item(&mut self, name: TypeEncoding) -> bool {
        let idx = self.find_item_index(name);
        idx != 0 && self.hide_item_at(idx)
    }

    fn hide_item_at(&mut self, idx: Index) -> bool {
        if self.links[idx].tag == HIDDEN {
            return false;
        }
        let left = self.item_table[idx].left;
        let right = self.item_table[idx].right;
        self.item_table[left].right = right;
        self.item_table[right].left = left;
        self.links[idx].tag = HIDDEN;
        self.hidden_items.push(idx);
        self.num_items -= 1;
        trace!(name = %self.item_table[idx].name, "hid item");
        true
    }

    fn unhide_item_at(&mut self, idx: Index) {
        let left = self.item_table[idx].left;
        let right = self.item_table[idx].right;
        self.item_table[left].right = idx;
        self.item_table[right].left = idx;
        self.links[idx].tag = 0;
        self.num_items += 1;
        trace!(name = %self.item_table[idx].name, "unhid item");
    }

    /// Hides every name in `names`. Returns `(all succeeded, failed names)`.
    pub fn hide_item_list(&mut self, names: &[TypeEncoding]) -> (bool, Vec<TypeEncoding>) {
        let mut failed = Vec::new();
        for &name in names {
            if !self.hide_item(name) {
                failed.push(name);
            }
        }
        if !failed.is_empty() {
            warn!(failed = ?failed, "batch item hide had unresolved names");
        }
        (failed.is_empty(), failed)
    }

    /// Hides every visible item not named in `keep`.
    pub fn hide_all_items_except(&mut self, keep: &BTreeSet<TypeEncoding>) {
        let mut cur = self.item_table[0].right;
        while cur != 0 {
            let next = self.item_table[cur].right;
            if !keep.contains(&self.item_table[cur].name) {
                self.hide_item_at(cur);
            }
            cur = next;
        }
    }

    /// Unhides the most recently hidden item. Errors if the stack is empty.
    pub fn pop_hid_item(&mut self) -> Result<(), CoverError> {
        match self.hidden_items.pop() {
            Some(idx) => {
                self.unhide_item_at(idx);
                Ok(())
            }
            None => Err(CoverError::EmptyHiddenStack(HiddenStackKind::Items)),
        }
    }

    /// The name of the most recently hidden item, without unhiding it.
    pub fn peek_hid_item(&self) -> Result<TypeEncoding, CoverError> {
        self.hidden_items
            .last()
            .map(|&idx| self.item_table[idx].name)
            .ok_or(CoverError::EmptyHiddenStack(HiddenStackKind::Items))
    }

    /// `true` if no items are currently hidden.
    pub fn hid_items_empty(&self) -> bool {
        self.hidden_items.is_empty()
    }

    /// The number of currently hidden items.
    pub fn num_hid_items(&self) -> u64 {
        self.hidden_items.len() as u64
    }

    /// The names of all currently hidden items, oldest hide first.
    pub fn hid_items(&self) -> Vec<TypeEncoding> {
        self.hidden_items
            .iter()
            .map(|&idx| self.item_table[idx].name)
            .collect()
    }

    /// Unhides every hidden item, restoring the item ring to its state
    /// before any `hide_item` call.
    pub fn reset_items(&mut self) {
        while self.pop_hid_item().is_ok() {}
    }

    /// `true` if `name` is a known, currently visible item.
    pub fn has_item(&self, name: TypeEncoding) -> bool {
        let idx = self.find_item_index(name);
        idx != 0 && self.links[idx].tag != HIDDEN
    }

    /// The currently visible items, in table order.
    pub fn items(&self) -> Vec<TypeEncoding> {
        let mut out = Vec::new();
        let mut cur = self.item_table[0].right;
        while cur != 0 {
            out.push(self.item_table[cur].name);
            cur = self.item_table[cur].right;
        }
        out
    }

    /// The number of currently visible items.
    pub fn num_items(&self) -> u64 {
        self.num_items
    }

    // ---- option hide/unhide API -----------------------------------------

    fn find_option_index(&self, name: TypeEncoding) -> Index {
        match self.option_table[1..].binary_search_by(|o| o.name.cmp(&name)) {
            Ok(pos) => self.option_table[pos + 1].start,
            Err(_) => 0,
        }
    }

    /// Hides the option named `name`. Returns `false` if the name is
    /// unknown or already hidden.
    pub fn hide_option(&mut self, name: TypeEncoding) -> bool {
        let spacer = self.find_option_index(name);
        spacer != 0 && self.hide_option_at(spacer)
    }

    fn hide_option_at(&mut self, spacer: Index) -> bool {
        if self.links[spacer].tag == HIDDEN {
            return false;
        }
        let mut i = spacer + 1;
        while self.links[i].top_or_len > 0 {
            let top = self.links[i].top_or_len as usize;
            let up = self.links[i].up;
            let down = self.links[i].down;
            self.links[up].down = down;
            self.links[down].up = up;
            self.links[top].top_or_len -= 1;
            i += 1;
        }
        self.links[spacer].tag = HIDDEN;
        self.hidden_options.push(spacer);
        self.num_options -= 1;
        trace!(name = %self.option_table[self.spacer_option_table_index(spacer)].name, "hid option");
        true
    }

    fn unhide_option_at(&mut self, spacer: Index) {
        let mut i = spacer + 1;
        while self.links[i].top_or_len > 0 {
            let top = self.links[i].top_or_len as usize;
            let up = self.links[i].up;
            let down = self.links[i].down;
            self.links[up].down = i;
            self.links[down].up = i;
            self.links[top].top_or_len += 1;
            i += 1;
        }
        self.links[spacer].tag = 0;
        self.num_options += 1;
        trace!(name = %self.option_table[self.spacer_option_table_index(spacer)].name, "unhid option");
    }

    /// Hides every name in `names`. Returns `(all succeeded, failed names)`.
    pub fn hide_option_list(&mut self, names: &[TypeEncoding]) -> (bool, Vec<TypeEncoding>) {
        let mut failed = Vec::new();
        for &name in names {
            if !self.hide_option(name) {
                failed.push(name);
            }
        }
        if !failed.is_empty() {
            warn!(failed = ?failed, "batch option hide had unresolved names");
        }
        (failed.is_empty(), failed)
    }

    /// Hides every visible option not named in `keep`.
    pub fn hide_all_options_except(&mut self, keep: &BTreeSet<TypeEncoding>) {
        let spacers: Vec<Index> = self.option_table[1..]
            .iter()
            .map(|o| o.start)
            .filter(|&s| self.links[s].tag != HIDDEN)
            .collect();
        for spacer in spacers {
            let name = self.option_table[self.spacer_option_table_index(spacer)].name;
            if !keep.contains(&name) {
                self.hide_option_at(spacer);
            }
        }
    }

    fn spacer_option_table_index(&self, spacer: Index) -> usize {
        (-self.links[spacer].top_or_len) as usize
    }

    /// Unhides the most recently hidden option. Errors if the stack is
    /// empty.
    pub fn pop_hid_option(&mut self) -> Result<(), CoverError> {
        match self.hidden_options.pop() {
            Some(spacer) => {
                self.unhide_option_at(spacer);
                Ok(())
            }
            None => Err(CoverError::EmptyHiddenStack(HiddenStackKind::Options)),
        }
    }

    /// The name of the most recently hidden option, without unhiding it.
    pub fn peek_hid_option(&self) -> Result<TypeEncoding, CoverError> {
        self.hidden_options
            .last()
            .map(|&spacer| self.option_table[self.spacer_option_table_index(spacer)].name)
            .ok_or(CoverError::EmptyHiddenStack(HiddenStackKind::Options))
    }

    /// `true` if no options are currently hidden.
    pub fn hid_options_empty(&self) -> bool {
        self.hidden_options.is_empty()
    }

    /// The number of currently hidden options.
    pub fn num_hid_options(&self) -> u64 {
        self.hidden_options.len() as u64
    }

    /// The names of all currently hidden options, oldest hide first.
    pub fn hid_options(&self) -> Vec<TypeEncoding> {
        self.hidden_options
            .iter()
            .map(|&spacer| self.option_table[self.spacer_option_table_index(spacer)].name)
            .collect()
    }

    /// Unhides every hidden option.
    pub fn reset_options(&mut self) {
        while self.pop_hid_option().is_ok() {}
    }

    /// `true` if `name` is a known, currently visible option.
    pub fn has_option(&self, name: TypeEncoding) -> bool {
        let spacer = self.find_option_index(name);
        spacer != 0 && self.links[spacer].tag != HIDDEN
    }

    /// The currently visible options, in table order.
    pub fn options(&self) -> Vec<TypeEncoding> {
        self.option_table[1..]
            .iter()
            .filter(|o| self.links[o.start].tag != HIDDEN)
            .map(|o| o.name)
            .collect()
    }

    /// The number of currently visible options.
    pub fn num_options(&self) -> u64 {
        self.num_options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> BTreeMap<TypeEncoding, BTreeSet<Resistance>> {
        let mut map = BTreeMap::new();
        map.insert(
            TypeEncoding::new("Ghost"),
            BTreeSet::from([
                Resistance::new(TypeEncoding::new("Fire"), Multiplier::Normal),
                Resistance::new(TypeEncoding::new("Normal"), Multiplier::Immune),
                Resistance::new(TypeEncoding::new("Water"), Multiplier::Normal),
            ]),
        );
        map.insert(
            TypeEncoding::new("Water"),
            BTreeSet::from([
                Resistance::new(TypeEncoding::new("Fire"), Multiplier::Half),
                Resistance::new(TypeEncoding::new("Normal"), Multiplier::Normal),
                Resistance::new(TypeEncoding::new("Water"), Multiplier::Half),
            ]),
        );
        map
    }

    #[test]
    fn build_defense_counts_items_and_options() {
        let links = CoverageLinks::build(&fixture(), CoverageMode::Defense);
        assert_eq!(links.num_items(), 3);
        assert_eq!(links.num_options(), 2);
        assert_eq!(
            links.items(),
            vec![
                TypeEncoding::new("Fire"),
                TypeEncoding::new("Normal"),
                TypeEncoding::new("Water"),
            ]
        );
    }

    #[test]
    fn cover_then_uncover_is_identity() {
        let mut links = CoverageLinks::build(&fixture(), CoverageMode::Defense);
        let before_items = links.items();
        let before_options = links.options();
        let header = links.choose_item();
        let cell = links.column_head(header);
        links.cover_type(cell);
        links.uncover_type(cell);
        assert_eq!(links.items(), before_items);
        assert_eq!(links.options(), before_options);
    }

    #[test]
    fn hide_then_reset_is_identity() {
        let mut links = CoverageLinks::build(&fixture(), CoverageMode::Defense);
        let before = links.items();
        assert!(links.hide_item(TypeEncoding::new("Fire")));
        assert!(!links.has_item(TypeEncoding::new("Fire")));
        links.reset_items();
        assert_eq!(links.items(), before);
    }

    #[test]
    fn hide_item_list_reports_failures() {
        let mut links = CoverageLinks::build(&fixture(), CoverageMode::Defense);
        let (ok, failed) = links.hide_item_list(&[TypeEncoding::new("Fire"), TypeEncoding::new("Nonsense")]);
        assert!(!ok);
        assert_eq!(failed, vec![TypeEncoding::new("Nonsense")]);
    }

    #[test]
    fn pop_hid_item_errors_when_empty() {
        let mut links = CoverageLinks::build(&fixture(), CoverageMode::Defense);
        assert_eq!(
            links.pop_hid_item(),
            Err(CoverError::EmptyHiddenStack(HiddenStackKind::Items))
        );
    }
}
