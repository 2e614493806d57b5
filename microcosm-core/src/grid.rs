use microcosm_types::Occupant;

/// Eight neighborhood offsets, clockwise from north. Scans that touch the
/// neighborhood (density sensors, vision rays, area attacks) all walk this
/// order so a given seed replays identically.
pub(crate) const DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Dense occupancy index over the bounded world rectangle. Cells hold slot
/// references into the population arrays, never entity data.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub(crate) fn width(&self) -> i32 {
        self.width
    }

    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.in_bounds(x, y), "cell ({x}, {y}) is out of bounds");
        (y * self.width + x) as usize
    }

    pub(crate) fn get(&self, x: i32, y: i32) -> Option<Occupant> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells[self.index(x, y)]
    }

    /// Claims an empty cell. Double-claiming means the occupancy index and the
    /// population arrays disagree, so this traps in every build.
    pub(crate) fn claim(&mut self, x: i32, y: i32, occupant: Occupant) {
        let idx = self.index(x, y);
        assert!(
            self.cells[idx].is_none(),
            "cell ({x}, {y}) already holds {:?} while claiming for {occupant:?}",
            self.cells[idx],
        );
        self.cells[idx] = Some(occupant);
    }

    /// Vacates a cell that must currently hold `occupant`.
    pub(crate) fn release(&mut self, x: i32, y: i32, occupant: Occupant) {
        let idx = self.index(x, y);
        assert_eq!(
            self.cells[idx],
            Some(occupant),
            "cell ({x}, {y}) does not hold {occupant:?} at release",
        );
        self.cells[idx] = None;
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(None);
    }
}
